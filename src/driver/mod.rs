//! Per-frame scheduling around the tracer.
//!
//! Pointer input arrives as [`DriverEvent`]s on a channel and is applied only between
//! frames. Each tick freezes a [`SceneParameters`] snapshot, renders every pixel of
//! the frame in parallel against it, then hands the frame to a [`Present`] sink.

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

use image::{ImageBuffer, Rgba as Pixel, RgbaImage};
use rayon::prelude::*;
use serde_json::json;

use crate::error::{RenderError, RenderResult};
use crate::marcher::camera::{pixel_uv, Camera};
use crate::marcher::scene::{Scene, SceneParameters};
use crate::marcher::{march, shade, MarchConfig, MarchResult, Rgba};

/// Converts a pointer position in window pixels to normalized device coordinates,
/// with y pointing up.
pub fn pointer_from_screen(x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
    (2. * x / width - 1., -(2. * y / height - 1.))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DriverEvent {
    /// Pointer position in window pixels.
    PointerMoved { x: f64, y: f64 },
    Stop,
}

#[derive(Clone, Debug)]
pub struct Frame {
    /// Frame number, used to name the frame when it is presented.
    pub index: u64,
    pub params: SceneParameters,
    pub width: u32,
    pub height: u32,
    /// Row-major, top row first.
    pub samples: Vec<MarchResult>,
    pub pixels: Vec<Rgba>,
}

impl Frame {
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.pixels[x as usize + y as usize * self.width as usize]
    }

    pub fn to_image(&self) -> RgbaImage {
        ImageBuffer::from_fn(self.width, self.height, |x, y| {
            Pixel(self.pixel(x, y).map(to_u8))
        })
    }
}

fn to_u8(c: f64) -> u8 {
    (c.clamp(0., 1.) * 255.).round() as u8
}

/// Number of pixels in a `width` x `height` frame. Empty frames and frames with more
/// than `u32::MAX` pixels are rejected.
fn pixel_count(width: u32, height: u32) -> RenderResult<usize> {
    match width.checked_mul(height) {
        Some(n) if n > 0 => Ok(n as usize),
        _ => Err(RenderError::InvalidFrameSize { width, height }),
    }
}

/// Renders frame number `index`. `params` is shared read-only by every pixel.
pub fn render_frame(
    scene: &Scene,
    camera: &Camera,
    config: &MarchConfig,
    params: &SceneParameters,
    index: u64,
    width: u32,
    height: u32,
) -> RenderResult<Frame> {
    let count = pixel_count(width, height)?;
    let field = scene.at(params);
    let row = width as usize;
    let samples: Vec<MarchResult> = (0..count)
        .into_par_iter()
        .map(|i| ((i % row) as u32, (i / row) as u32))
        .map(|(x, y)| {
            let (u, v) = pixel_uv(x, y, width, height);
            march(&field, &camera.ray(u, v), config)
        })
        .collect();
    let pixels = samples.iter().map(|r| shade(r, config)).collect();
    Ok(Frame {
        index,
        params: *params,
        width,
        height,
        samples,
        pixels,
    })
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub hits: usize,
    pub misses: usize,
    pub mean_steps: f64,
    pub max_steps_seen: u32,
    pub elapsed_ms: f64,
}

impl FrameStats {
    pub fn collect(frame: &Frame, elapsed: Duration) -> Self {
        let hits = frame.samples.iter().filter(|r| r.hit).count();
        let total_steps: u64 = frame.samples.iter().map(|r| r.step_count as u64).sum();
        FrameStats {
            frame: frame.index,
            hits,
            misses: frame.samples.len() - hits,
            mean_steps: total_steps as f64 / frame.samples.len().max(1) as f64,
            max_steps_seen: frame
                .samples
                .iter()
                .map(|r| r.step_count)
                .max()
                .unwrap_or(0),
            elapsed_ms: elapsed.as_secs_f64() * 1000.,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "frame": self.frame,
            "hits": self.hits,
            "misses": self.misses,
            "mean_steps": self.mean_steps,
            "max_steps_seen": self.max_steps_seen,
            "elapsed_ms": self.elapsed_ms,
        })
    }
}

/// Receives each finished frame.
pub trait Present {
    fn present(&mut self, frame: &Frame, stats: &FrameStats) -> RenderResult<()>;
}

/// Writes `frame_00001.png`, `frame_00002.png`, ... into a directory.
pub struct PngSequence {
    dir: PathBuf,
}

impl PngSequence {
    pub fn create(dir: impl Into<PathBuf>) -> RenderResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(PngSequence { dir })
    }

    pub fn path_for(&self, frame: u64) -> PathBuf {
        self.dir.join(format!("frame_{frame:05}.png"))
    }
}

impl Present for PngSequence {
    fn present(&mut self, frame: &Frame, _stats: &FrameStats) -> RenderResult<()> {
        let path = self.path_for(frame.index);
        frame.to_image().save(&path)?;
        tracing::trace!(path = %path.display(), "wrote frame");
        Ok(())
    }
}

pub struct Discard;

impl Present for Discard {
    fn present(&mut self, _frame: &Frame, _stats: &FrameStats) -> RenderResult<()> {
        Ok(())
    }
}

/// Keeps the stats of every frame and forwards the frame to `inner`.
pub struct StatsLog<P: Present> {
    pub inner: P,
    pub stats: Vec<FrameStats>,
}

impl<P: Present> StatsLog<P> {
    pub fn new(inner: P) -> Self {
        StatsLog {
            inner,
            stats: Vec::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.stats.iter().map(FrameStats::to_json).collect())
    }
}

impl<P: Present> Present for StatsLog<P> {
    fn present(&mut self, frame: &Frame, stats: &FrameStats) -> RenderResult<()> {
        self.stats.push(*stats);
        self.inner.present(frame, stats)
    }
}

pub struct FrameDriver {
    scene: Scene,
    camera: Camera,
    config: MarchConfig,
    width: u32,
    height: u32,
    params: SceneParameters,
    frame: u64,
    events: Receiver<DriverEvent>,
    stopped: bool,
}

impl FrameDriver {
    /// Builds a driver and the sender its input events come through.
    pub fn new(
        scene: Scene,
        camera: Camera,
        config: MarchConfig,
        width: u32,
        height: u32,
    ) -> RenderResult<(Self, Sender<DriverEvent>)> {
        scene.validate()?;
        config.validate()?;
        pixel_count(width, height)?;
        let (tx, rx) = mpsc::channel();
        let driver = FrameDriver {
            scene,
            camera,
            config,
            width,
            height,
            params: SceneParameters::default(),
            frame: 0,
            events: rx,
            stopped: false,
        };
        Ok((driver, tx))
    }

    /// Parameters the most recent frame was rendered with.
    pub fn params(&self) -> SceneParameters {
        self.params
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(DriverEvent::PointerMoved { x, y }) => {
                    self.params.pointer =
                        pointer_from_screen(x, y, self.width as f64, self.height as f64);
                    tracing::trace!(x, y, pointer = ?self.params.pointer, "pointer moved");
                }
                Ok(DriverEvent::Stop) => {
                    tracing::debug!(frame = self.frame, "stop requested");
                    self.stopped = true;
                }
                // A closed channel leaves the pointer where it was.
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return,
            }
        }
    }

    /// Renders and presents the next frame. Returns `None` once a stop was requested.
    pub fn tick(&mut self, presenter: &mut impl Present) -> RenderResult<Option<FrameStats>> {
        self.drain_events();
        if self.stopped {
            return Ok(None);
        }
        self.frame += 1;
        self.params.elapsed_time = self.frame as f64;
        let snapshot = self.params;

        let start = Instant::now();
        let frame = render_frame(
            &self.scene,
            &self.camera,
            &self.config,
            &snapshot,
            self.frame,
            self.width,
            self.height,
        )?;
        let stats = FrameStats::collect(&frame, start.elapsed());
        tracing::debug!(
            frame = stats.frame,
            hits = stats.hits,
            mean_steps = stats.mean_steps,
            elapsed_ms = stats.elapsed_ms,
            "rendered frame"
        );
        presenter.present(&frame, &stats)?;
        Ok(Some(stats))
    }

    /// Ticks until a stop event arrives or `max_frames` frames have been rendered by
    /// this call. Returns the number rendered.
    pub fn run(
        &mut self,
        presenter: &mut impl Present,
        max_frames: Option<u64>,
    ) -> RenderResult<u64> {
        tracing::info!(
            width = self.width,
            height = self.height,
            max_frames = ?max_frames,
            "frame driver started"
        );
        let mut rendered = 0;
        while max_frames.map_or(true, |max| rendered < max) {
            match self.tick(presenter)? {
                Some(_) => rendered += 1,
                None => break,
            }
        }
        tracing::info!(rendered, last_frame = self.frame, "frame driver stopped");
        Ok(rendered)
    }
}
