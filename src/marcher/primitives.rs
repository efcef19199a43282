use crate::marcher::Renderable;
use crate::math::{abs, max_component, sub, v, vabs, vmax_scalar, V3};

/// Axis-aligned box centered at the origin.
#[derive(Clone, Copy, Debug)]
pub struct Cuboid {
    pub half_extents: V3,
}

/// Sphere centered at the origin.
#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub radius: f64,
}

/// Sphere that follows the pointer in the XY plane and sits at the depth of
/// whatever point is queried.
#[derive(Clone, Copy, Debug)]
pub struct PointerSphere {
    pub radius: f64,
    pub center: (f64, f64),
}

/// The shapes a scene is built from. `Scene::primitives` hands them out with the
/// scene's current settings.
#[derive(Clone, Copy, Debug)]
pub enum Primitive {
    Cuboid(Cuboid),
    Sphere(Sphere),
    PointerSphere(PointerSphere),
}

impl Renderable for Cuboid {
    fn sdf(&self, x: &V3) -> f64 {
        let q = sub(&vabs(x), &self.half_extents);
        abs(&vmax_scalar(&q, 0.)) + max_component(&q).min(0.)
    }
}

impl Renderable for Sphere {
    fn sdf(&self, x: &V3) -> f64 {
        abs(x) - self.radius
    }
}

impl Renderable for PointerSphere {
    fn sdf(&self, x: &V3) -> f64 {
        let (cx, cy) = self.center;
        abs(&v(x.x - cx, x.y - cy, x.z)) - self.radius
    }
}

impl Renderable for Primitive {
    fn sdf(&self, x: &V3) -> f64 {
        match self {
            Primitive::Cuboid(c) => c.sdf(x),
            Primitive::Sphere(s) => s.sdf(x),
            Primitive::PointerSphere(p) => p.sdf(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::O;

    const UNIT: Sphere = Sphere { radius: 1. };
    const HALF_BOX: Cuboid = Cuboid {
        half_extents: V3 {
            x: 0.5,
            y: 0.5,
            z: 0.5,
        },
    };

    #[test]
    fn sphere_is_signed() {
        assert_eq!(UNIT.sdf(&O), -1.);
        assert_eq!(UNIT.sdf(&v(2., 0., 0.)), 1.);
        assert_eq!(UNIT.sdf(&v(1., 0., 0.)), 0.);
    }

    #[test]
    fn box_center_is_nearest_face() {
        assert_eq!(HALF_BOX.sdf(&O), -0.5);
    }

    #[test]
    fn box_outside_face_edge_and_corner() {
        assert_eq!(HALF_BOX.sdf(&v(1.5, 0., 0.)), 1.);
        assert!((HALF_BOX.sdf(&v(1.5, 1.5, 0.)) - 2f64.sqrt()).abs() < 1e-12);
        assert!((HALF_BOX.sdf(&v(1.5, 1.5, 1.5)) - 3f64.sqrt()).abs() < 1e-12);
        assert_eq!(HALF_BOX.sdf(&v(0.5, 0.2, -0.1)), 0.);
    }

    #[test]
    fn box_is_symmetric() {
        let p = v(0.7, -0.3, 0.9);
        assert_eq!(HALF_BOX.sdf(&p), HALF_BOX.sdf(&(-p)));
    }

    #[test]
    fn pointer_sphere_floats_at_query_depth() {
        let s = PointerSphere {
            radius: 0.4,
            center: (0.5, -0.25),
        };
        assert!((s.sdf(&v(0.5, -0.25, 0.)) + 0.4).abs() < 1e-12);
        assert!((s.sdf(&v(0.5, -0.25, 3.)) - 2.6).abs() < 1e-12);
        assert!((s.sdf(&v(1.5, -0.25, 0.)) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn primitive_dispatches() {
        let p = v(0.1, 0.2, 0.3);
        assert_eq!(Primitive::Sphere(UNIT).sdf(&p), UNIT.sdf(&p));
        assert_eq!(Primitive::Cuboid(HALF_BOX).sdf(&p), HALF_BOX.sdf(&p));
        let ps = PointerSphere {
            radius: 0.4,
            center: (0., 0.),
        };
        assert_eq!(Primitive::PointerSphere(ps).sdf(&p), ps.sdf(&p));
    }
}
