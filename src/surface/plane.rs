use crate::math::{Point3, Vector3, FP_COINCIDENT};

use super::Surface;

/// An infinite plane `n . r = d`.
///
/// The positive half-space is the side the normal points into. The
/// coefficients are stored as given; the surface function is linear in
/// them, so no normalization is required.
#[derive(Debug, Clone)]
pub struct Plane {
    id: i32,
    normal: Vector3,
    offset: f64,
}

impl Plane {
    /// Creates a plane from a normal vector and offset `d`.
    #[must_use]
    pub fn new(id: i32, normal: Vector3, offset: f64) -> Self {
        Self { id, normal, offset }
    }

    /// Creates the plane `x = x0`, positive side `x > x0`.
    #[must_use]
    pub fn x(id: i32, x0: f64) -> Self {
        Self::new(id, Vector3::x(), x0)
    }

    /// Creates the plane `y = y0`, positive side `y > y0`.
    #[must_use]
    pub fn y(id: i32, y0: f64) -> Self {
        Self::new(id, Vector3::y(), y0)
    }

    /// Creates the plane `z = z0`, positive side `z > z0`.
    #[must_use]
    pub fn z(id: i32, z0: f64) -> Self {
        Self::new(id, Vector3::z(), z0)
    }
}

impl Surface for Plane {
    fn id(&self) -> i32 {
        self.id
    }

    fn evaluate(&self, r: &Point3) -> f64 {
        self.normal.dot(&r.coords) - self.offset
    }

    fn normal(&self, _r: &Point3) -> Vector3 {
        self.normal
    }

    fn distance(&self, r: &Point3, u: &Vector3, coincident: bool) -> f64 {
        let f = self.normal.dot(u);
        if coincident || f.abs() < FP_COINCIDENT {
            return f64::INFINITY;
        }
        let d = -self.evaluate(r) / f;
        if d < 0.0 {
            f64::INFINITY
        } else {
            d
        }
    }
}
