use crate::math::{normalize, v, Ray, V3};

/// Fixed pinhole camera looking down -Z.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub origin: V3,
    /// Distance from the origin to the image plane. Sets the field of view.
    pub focal_depth: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            origin: v(0., 0., 3.),
            focal_depth: 0.5,
        }
    }
}

impl Camera {
    /// Ray through `(u, v)` in `[0, 1]^2`, with `(0.5, 0.5)` on the optical axis.
    pub fn ray(&self, u: f64, v_: f64) -> Ray {
        Ray {
            x: self.origin,
            d: normalize(&v(u - 0.5, v_ - 0.5, -self.focal_depth)),
        }
    }
}

/// UV of the center of pixel `(x, y)`. Rows count down from the top of the image,
/// `v` counts up.
pub fn pixel_uv(x: u32, y: u32, width: u32, height: u32) -> (f64, f64) {
    (
        (x as f64 + 0.5) / width as f64,
        1. - (y as f64 + 0.5) / height as f64,
    )
}
