use crate::error::{RenderError, RenderResult};
use crate::math::{Ray, V3};

pub mod camera;
pub mod primitives;
pub mod scene;

use camera::Camera;
use scene::{Scene, SceneParameters};

/// Opaque grayscale comes out as `[b, b, b, 1.0]`.
pub type Rgba = [f64; 4];

pub trait Renderable {
    fn sdf(&self, x: &V3) -> f64;
}

/// Limits of the sphere tracer.
///
/// Raising `max_steps` or `max_distance` sharpens the shading along silhouettes, where
/// rays graze the surface and take many small steps, at the cost of more work for the
/// worst-case ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchConfig {
    /// A sample closer than this to the scene counts as a hit.
    pub epsilon: f64,
    /// Rays that travel further than this have escaped.
    pub max_distance: f64,
    pub max_steps: u32,
}

impl Default for MarchConfig {
    fn default() -> Self {
        MarchConfig {
            epsilon: 0.001,
            max_distance: 20.,
            max_steps: 200,
        }
    }
}

impl MarchConfig {
    pub fn validate(&self) -> RenderResult<()> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.) {
            return Err(RenderError::march(format!(
                "epsilon must be positive and finite, got {}",
                self.epsilon
            )));
        }
        if !(self.max_distance.is_finite() && self.max_distance > 0.) {
            return Err(RenderError::march(format!(
                "max_distance must be positive and finite, got {}",
                self.max_distance
            )));
        }
        if self.max_steps == 0 {
            return Err(RenderError::march("max_steps must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MarchState {
    pub traveled: f64,
    pub steps: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchResult {
    /// Index of the iteration that terminated the march, or `max_steps` if none did.
    pub step_count: u32,
    /// The last sample was within `epsilon` of the scene.
    pub hit: bool,
    /// Distance traveled along the ray when the march stopped.
    pub distance: f64,
}

/// Sphere traces `ray` through `field`. `ray.d` must be unit length.
///
/// A single test ends the march whether the ray reached the surface or left the
/// scene; `hit` records which of the two happened.
pub fn march(field: &impl Renderable, ray: &Ray, config: &MarchConfig) -> MarchResult {
    let mut state = MarchState::default();
    while state.steps < config.max_steps {
        let sdf = field.sdf(&ray.at(state.traveled));
        state.traveled += sdf;
        if sdf < config.epsilon || state.traveled > config.max_distance {
            return MarchResult {
                step_count: state.steps,
                hit: sdf < config.epsilon,
                distance: state.traveled,
            };
        }
        state.steps += 1;
    }
    MarchResult {
        step_count: config.max_steps,
        hit: false,
        distance: state.traveled,
    }
}

/// Fewer steps is brighter. Only the step count matters, hits and misses are not
/// told apart.
pub fn shade(result: &MarchResult, config: &MarchConfig) -> Rgba {
    let b = 1. - result.step_count as f64 / config.max_steps as f64;
    [b, b, b, 1.]
}

pub fn render_sample_with(
    scene: &Scene,
    camera: &Camera,
    config: &MarchConfig,
    params: &SceneParameters,
    u: f64,
    v: f64,
) -> Rgba {
    let result = march(&scene.at(params), &camera.ray(u, v), config);
    shade(&result, config)
}

/// Color of one screen sample with the default scene, camera and limits.
pub fn render_sample(u: f64, v: f64, elapsed_time: f64, pointer: (f64, f64)) -> Rgba {
    render_sample_with(
        &Scene::default(),
        &Camera::default(),
        &MarchConfig::default(),
        &SceneParameters::new(elapsed_time, pointer),
        u,
        v,
    )
}

#[cfg(test)]
mod tests {
    use super::primitives::Sphere;
    use super::*;
    use crate::math::{normalize, v, O};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::{Distribution, StandardNormal};

    struct Nothing;

    impl Renderable for Nothing {
        fn sdf(&self, _x: &V3) -> f64 {
            1e9
        }
    }

    /// Creeps along without ever getting close.
    struct Fog;

    impl Renderable for Fog {
        fn sdf(&self, _x: &V3) -> f64 {
            0.01
        }
    }

    fn down_z() -> Ray {
        Ray {
            x: v(0., 0., 3.),
            d: v(0., 0., -1.),
        }
    }

    #[test]
    fn default_limits() {
        let c = MarchConfig::default();
        assert_eq!(c.epsilon, 0.001);
        assert_eq!(c.max_distance, 20.);
        assert_eq!(c.max_steps, 200);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn invalid_limits_are_rejected() {
        for bad in [
            MarchConfig {
                epsilon: 0.,
                ..MarchConfig::default()
            },
            MarchConfig {
                max_distance: f64::INFINITY,
                ..MarchConfig::default()
            },
            MarchConfig {
                max_steps: 0,
                ..MarchConfig::default()
            },
        ] {
            assert!(matches!(bad.validate(), Err(RenderError::InvalidMarch(_))));
        }
    }

    #[test]
    fn unit_sphere_hit_on_second_step() {
        let r = march(&Sphere { radius: 1. }, &down_z(), &MarchConfig::default());
        assert_eq!(r.step_count, 1);
        assert!(r.hit);
        assert_eq!(r.distance, 2.);
    }

    #[test]
    fn escape_is_not_a_hit() {
        let r = march(&Nothing, &down_z(), &MarchConfig::default());
        assert_eq!(r.step_count, 0);
        assert!(!r.hit);
        assert!(r.distance > 20.);
    }

    #[test]
    fn exhausted_budget_reports_max_steps() {
        let config = MarchConfig::default();
        let r = march(&Fog, &down_z(), &config);
        assert_eq!(r.step_count, config.max_steps);
        assert!(!r.hit);
        assert!((r.distance - 2.).abs() < 1e-9);
        assert_eq!(shade(&r, &config), [0., 0., 0., 1.]);
    }

    #[test]
    fn starting_inside_is_an_immediate_hit() {
        let ray = Ray { x: O, d: v(1., 0., 0.) };
        let r = march(&Sphere { radius: 1. }, &ray, &MarchConfig::default());
        assert_eq!(r.step_count, 0);
        assert!(r.hit);
    }

    #[test]
    fn tracer_terminates_for_random_rays() {
        let mut rng = StdRng::seed_from_u64(7);
        let scene = Scene::default();
        let config = MarchConfig::default();
        for _ in 0..500 {
            let d = normalize(&v(
                StandardNormal.sample(&mut rng),
                StandardNormal.sample(&mut rng),
                StandardNormal.sample(&mut rng),
            ));
            let o = v(
                rng.gen_range(-4.0..4.0),
                rng.gen_range(-4.0..4.0),
                rng.gen_range(-4.0..4.0),
            );
            let params = SceneParameters::new(
                rng.gen_range(0.0..10_000.0),
                (rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
            );
            let r = march(&scene.at(&params), &Ray { x: o, d }, &config);
            assert!(r.step_count <= config.max_steps);
            if r.hit {
                assert!(r.step_count < config.max_steps);
            }
        }
    }

    #[test]
    fn brightness_endpoints_and_monotonicity() {
        let config = MarchConfig::default();
        let at = |step_count| {
            shade(
                &MarchResult {
                    step_count,
                    hit: false,
                    distance: 0.,
                },
                &config,
            )
        };
        assert_eq!(at(0), [1., 1., 1., 1.]);
        assert_eq!(at(200), [0., 0., 0., 1.]);
        let mut last = at(0)[0];
        for steps in 1..=200 {
            let b = at(steps)[0];
            assert!(b <= last);
            last = b;
        }
    }

    #[test]
    fn direct_hit_regression() {
        // Straight down the optical axis at the sphere's near pole, pointer out of the way.
        let scene = Scene::default();
        let params = SceneParameters::new(0., (100., 100.));
        let ray = Camera::default().ray(0.5, 0.5);
        let r = march(&scene.at(&params), &ray, &MarchConfig::default());
        assert!(r.hit);
        assert_eq!(r.step_count, 1);
        assert!((r.distance - 2.3).abs() < 1e-9);
    }

    #[test]
    fn rotated_hit_stays_cheap() {
        let scene = Scene::default();
        let params = SceneParameters::new(30., (100., 100.));
        let ray = Camera::default().ray(0.6, 0.55);
        let r = march(&scene.at(&params), &ray, &MarchConfig::default());
        assert!(r.hit);
        assert!(r.step_count < 50);
    }

    #[test]
    fn edge_ray_escapes() {
        let scene = Scene::default();
        let params = SceneParameters::new(0., (100., 100.));
        let ray = Camera::default().ray(0., 0.);
        let r = march(&scene.at(&params), &ray, &MarchConfig::default());
        assert!(!r.hit);
        assert_eq!(r.step_count, 5);
    }

    #[test]
    fn render_sample_matches_explicit_pipeline() {
        let c = render_sample(0.5, 0.5, 1., (0., 0.));
        assert_eq!(c, [0.995, 0.995, 0.995, 1.]);
        let edge = render_sample(0., 0., 0., (100., 100.));
        assert_eq!(edge[0], 1. - 5. / 200.);
        assert_eq!(edge[3], 1.);
    }

    #[test]
    fn nan_pointer_gives_a_pixel_not_a_panic() {
        let c = render_sample(0.5, 0.5, 1., (f64::NAN, 0.));
        assert_eq!(c[3], 1.);
        assert!((0.0..=1.0).contains(&c[0]));
    }
}
