use anyhow::Context as _;
use clap::Parser;
use raymarcher::driver::{DriverEvent, FrameDriver, PngSequence, StatsLog};
use raymarcher::marcher::camera::Camera;
use raymarcher::marcher::scene::Scene;
use raymarcher::MarchConfig;
use std::f64::consts::PI;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 512)]
    size: u32,

    /// Image height, defaults to `size`.
    #[arg(long)]
    height: Option<u32>,

    #[arg(short, long, default_value_t = 120)]
    frames: u64,

    /// Directory the PNG frames are written to.
    #[arg(short, long, default_value = "frames")]
    out: PathBuf,

    /// Initial pointer position in pixels.
    #[arg(short, long, num_args = 2, value_names = ["X", "Y"])]
    pointer: Option<Vec<f64>>,

    /// Move the pointer around the image center from a separate thread.
    #[arg(long, default_value_t = false)]
    orbit: bool,

    #[arg(long, default_value_t = 0.001)]
    epsilon: f64,

    #[arg(long, default_value_t = 20.0)]
    max_distance: f64,

    #[arg(long, default_value_t = 200)]
    max_steps: u32,

    #[arg(long, default_value_t = 0.1)]
    box_sphere_k: f64,

    #[arg(long, default_value_t = 0.6)]
    pointer_k: f64,

    /// Write per-frame statistics to this JSON file.
    #[arg(long)]
    stats: Option<PathBuf>,
}

/// Sends one pointer position per ~frame, circling the image center.
fn orbit_pointer(events: Sender<DriverEvent>, width: f64, height: f64, frames: u64) {
    let radius = 0.35 * width.min(height);
    for i in 0..frames {
        let angle = 2. * PI * i as f64 / 120.;
        let event = DriverEvent::PointerMoved {
            x: 0.5 * width + radius * angle.cos(),
            y: 0.5 * height + radius * angle.sin(),
        };
        if events.send(event).is_err() {
            return;
        }
        thread::sleep(Duration::from_millis(16));
    }
}

/// Waits for the pointer thread, turning a panic payload into its message.
fn join_producer(handle: thread::JoinHandle<()>) -> Result<(), String> {
    handle.join().map_err(|payload| {
        payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string())
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let width = args.size;
    let height = args.height.unwrap_or(args.size);

    let scene = Scene {
        box_sphere_k: args.box_sphere_k,
        pointer_k: args.pointer_k,
        ..Scene::default()
    };
    let config = MarchConfig {
        epsilon: args.epsilon,
        max_distance: args.max_distance,
        max_steps: args.max_steps,
    };
    let (mut driver, events) = FrameDriver::new(scene, Camera::default(), config, width, height)
        .context("invalid render settings")?;

    if let Some(p) = &args.pointer {
        events.send(DriverEvent::PointerMoved { x: p[0], y: p[1] })?;
    }
    let producer = if args.orbit {
        let events = events.clone();
        let frames = args.frames;
        Some(thread::spawn(move || {
            orbit_pointer(events, width as f64, height as f64, frames)
        }))
    } else {
        None
    };

    let sink = PngSequence::create(&args.out)
        .with_context(|| format!("create output directory '{}'", args.out.display()))?;
    let mut presenter = StatsLog::new(sink);

    tracing::info!("Starting image generation!");
    let start = Instant::now();
    let rendered = driver.run(&mut presenter, Some(args.frames))?;
    tracing::info!(
        "Render of {} frames took {} s",
        rendered,
        start.elapsed().as_secs_f32()
    );

    drop(events);
    drop(driver);
    if let Some(handle) = producer {
        if let Err(panic) = join_producer(handle) {
            tracing::warn!("pointer producer panicked: {panic}");
        }
    }

    if let Some(path) = &args.stats {
        let body = serde_json::to_string_pretty(&presenter.to_json())?;
        fs::write(path, body).with_context(|| format!("write stats '{}'", path.display()))?;
        tracing::info!(path = %path.display(), "wrote frame statistics");
    }
    Ok(())
}
