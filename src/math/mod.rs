use std::ops;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct V3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// 3x3 matrix stored as three columns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct M3 {
    pub v0: V3,
    pub v1: V3,
    pub v2: V3,
}

impl M3 {
    pub fn t(&self) -> M3 {
        M3 {
            v0: v(self.v0.x, self.v1.x, self.v2.x),
            v1: v(self.v0.y, self.v1.y, self.v2.y),
            v2: v(self.v0.z, self.v1.z, self.v2.z),
        }
    }

    /// Rotation of `angle` radians about `axis`. The axis does not need to be unit
    /// length, it is normalized here.
    pub fn axis_angle(axis: &V3, angle: f64) -> M3 {
        let V3 { x, y, z } = normalize(axis);
        let (s, c) = angle.sin_cos();
        let oc = 1. - c;
        M3 {
            v0: v(oc * x * x + c, oc * x * y - z * s, oc * z * x + y * s),
            v1: v(oc * x * y + z * s, oc * y * y + c, oc * y * z - x * s),
            v2: v(oc * z * x - y * s, oc * y * z + x * s, oc * z * z + c),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub x: V3,
    pub d: V3,
}

impl Ray {
    pub fn at(&self, t: f64) -> V3 {
        self.x + t * self.d
    }
}

pub fn sub(x: &V3, y: &V3) -> V3 {
    V3 {
        x: x.x - y.x,
        y: x.y - y.y,
        z: x.z - y.z,
    }
}

pub fn abs2(x: &V3) -> f64 {
    x.x * x.x + x.y * x.y + x.z * x.z
}

pub fn abs(x: &V3) -> f64 {
    abs2(x).sqrt()
}
pub fn v(x: f64, y: f64, z: f64) -> V3 {
    V3 { x, y, z }
}
pub fn mul(scalar: f64, x: &V3) -> V3 {
    V3 {
        x: x.x * scalar,
        y: x.y * scalar,
        z: x.z * scalar,
    }
}

pub fn add(x: &V3, y: &V3) -> V3 {
    V3 {
        x: x.x + y.x,
        y: x.y + y.y,
        z: x.z + y.z,
    }
}

pub fn dist(x: &V3, y: &V3) -> f64 {
    abs(&sub(x, y))
}

pub fn normalize(x: &V3) -> V3 {
    mul(1. / abs(x), x)
}

/// Component-wise absolute value.
pub fn vabs(x: &V3) -> V3 {
    v(x.x.abs(), x.y.abs(), x.z.abs())
}

/// Component-wise `max(x, s)`.
pub fn vmax_scalar(x: &V3, s: f64) -> V3 {
    v(x.x.max(s), x.y.max(s), x.z.max(s))
}

pub fn max_component(x: &V3) -> f64 {
    x.x.max(x.y.max(x.z))
}

pub fn rotate(x: &V3, axis: &V3, angle: f64) -> V3 {
    M3::axis_angle(axis, angle) * *x
}

/// Linear blend, `a = 0` gives `x` and `a = 1` gives `y`.
pub fn mix(x: f64, y: f64, a: f64) -> f64 {
    x + (y - x) * a
}

/// Polynomial smooth minimum of `a` and `b` with blend radius `k`.
///
/// Never exceeds `min(a, b)` and approaches it as `k` goes to zero. `k` must be
/// strictly positive; `k = 0` divides by zero.
pub fn smooth_min(a: f64, b: f64, k: f64) -> f64 {
    let h = (0.5 + 0.5 * (b - a) / k).clamp(0., 1.);
    mix(b, a, h) - k * h * (1. - h)
}

impl ops::Add<V3> for V3 {
    type Output = V3;

    fn add(self, rhs: V3) -> V3 {
        return add(&self, &rhs)
    }
}

impl ops::Sub<V3> for V3 {
    type Output = V3;

    fn sub(self, rhs: V3) -> V3 {
        return sub(&self, &rhs)
    }
}

impl ops::Neg for V3 {
    type Output = V3;

    fn neg(self) -> V3 {
        return mul(-1., &self)
    }
}

impl ops::Mul<V3> for f64 {
    type Output = V3;

    fn mul(self, rhs: V3) -> Self::Output {
        return mul(self, &rhs)
    }
}

impl ops::Mul<V3> for M3 {
    type Output = V3;

    fn mul(self, rhs: V3) -> Self::Output {
        return rhs.x * self.v0 + rhs.y * self.v1 + rhs.z * self.v2
    }
}

impl ops::Mul<M3> for M3 {
    type Output = M3;

    fn mul(self, rhs: M3) -> Self::Output {
        return M3 {
            v0: self * rhs.v0,
            v1: self * rhs.v1,
            v2: self * rhs.v2,
        }
    }
}


pub const B1: V3 = V3 {
    x: 1.,
    y: 0.,
    z: 0.,
};

pub const B2: V3 = V3 {
    x: 0.,
    y: 1.,
    z: 0.,
};

pub const B3: V3 = V3 {
    x: 0.,
    y: 0.,
    z: 1.,
};

pub const O: V3 = V3 {
    x: 0.,
    y: 0.,
    z: 0.,
};
