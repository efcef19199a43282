//! The animated scene: a box fused with a sphere, spinning about the (1,1,1)
//! diagonal, smoothly merged with a sphere that follows the pointer.

use crate::error::{RenderError, RenderResult};
use crate::marcher::primitives::{Cuboid, PointerSphere, Primitive, Sphere};
use crate::marcher::Renderable;
use crate::math::{rotate, smooth_min, v, V3};

/// Per-frame inputs. Frozen for the whole sampling pass of one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneParameters {
    /// Frame count, one unit per frame.
    pub elapsed_time: f64,
    /// Pointer in normalized device coordinates.
    pub pointer: (f64, f64),
}

impl SceneParameters {
    pub fn new(elapsed_time: f64, pointer: (f64, f64)) -> Self {
        Self {
            elapsed_time,
            pointer,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Scene {
    pub half_extents: V3,
    pub sphere_radius: f64,
    pub pointer_radius: f64,
    pub axis: V3,
    /// Radians of rotation per unit of elapsed time.
    pub angular_rate: f64,
    /// Blend radius between the box and the sphere.
    pub box_sphere_k: f64,
    /// Blend radius between the rotating body and the pointer sphere.
    pub pointer_k: f64,
}

impl Default for Scene {
    fn default() -> Self {
        Scene {
            half_extents: v(0.5, 0.5, 0.5),
            sphere_radius: 0.7,
            pointer_radius: 0.4,
            axis: v(1., 1., 1.),
            angular_rate: 1. / 60.,
            box_sphere_k: 0.1,
            pointer_k: 0.6,
        }
    }
}

fn positive(name: &str, value: f64) -> RenderResult<()> {
    if value.is_finite() && value > 0. {
        Ok(())
    } else {
        Err(RenderError::scene(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

impl Scene {
    pub fn validate(&self) -> RenderResult<()> {
        positive("box_sphere_k", self.box_sphere_k)?;
        positive("pointer_k", self.pointer_k)?;
        positive("sphere_radius", self.sphere_radius)?;
        positive("pointer_radius", self.pointer_radius)?;
        positive("half_extents.x", self.half_extents.x)?;
        positive("half_extents.y", self.half_extents.y)?;
        positive("half_extents.z", self.half_extents.z)?;
        if !self.angular_rate.is_finite() {
            return Err(RenderError::scene("angular_rate must be finite"));
        }
        if crate::math::abs2(&self.axis) == 0. {
            return Err(RenderError::scene("rotation axis must be non-zero"));
        }
        Ok(())
    }

    /// The box, the sphere and the pointer sphere, in that order.
    pub fn primitives(&self, pointer: (f64, f64)) -> [Primitive; 3] {
        [
            Primitive::Cuboid(Cuboid {
                half_extents: self.half_extents,
            }),
            Primitive::Sphere(Sphere {
                radius: self.sphere_radius,
            }),
            Primitive::PointerSphere(PointerSphere {
                radius: self.pointer_radius,
                center: pointer,
            }),
        ]
    }

    /// Box and sphere, blended together and rotated by `time * angular_rate`.
    pub fn rotating_body(&self, p: &V3, time: f64) -> f64 {
        let [cuboid, sphere, _] = self.primitives((0., 0.));
        let rotated = rotate(p, &self.axis, time * self.angular_rate);
        smooth_min(cuboid.sdf(&rotated), sphere.sdf(&rotated), self.box_sphere_k)
    }

    /// The pointer sphere. Evaluated on the unrotated point.
    pub fn pointer_body(&self, p: &V3, pointer: (f64, f64)) -> f64 {
        let [_, _, pointer_sphere] = self.primitives(pointer);
        pointer_sphere.sdf(p)
    }

    pub fn distance(&self, p: &V3, params: &SceneParameters) -> f64 {
        smooth_min(
            self.pointer_body(p, params.pointer),
            self.rotating_body(p, params.elapsed_time),
            self.pointer_k,
        )
    }

    pub fn at<'a>(&'a self, params: &'a SceneParameters) -> FrameField<'a> {
        FrameField {
            scene: self,
            params,
        }
    }
}

/// A scene bound to one frame's parameters.
#[derive(Clone, Copy, Debug)]
pub struct FrameField<'a> {
    pub scene: &'a Scene,
    pub params: &'a SceneParameters,
}

impl Renderable for FrameField<'_> {
    fn sdf(&self, x: &V3) -> f64 {
        self.scene.distance(x, self.params)
    }
}
