use crate::math::{Point3, Vector3, FP_COINCIDENT};

use super::Surface;

/// A sphere `|r - c|^2 = R^2`; the positive half-space is the outside.
#[derive(Debug, Clone)]
pub struct Sphere {
    id: i32,
    center: Point3,
    radius: f64,
}

impl Sphere {
    /// Creates a sphere from its center and radius.
    #[must_use]
    pub fn new(id: i32, center: Point3, radius: f64) -> Self {
        Self { id, center, radius }
    }
}

impl Surface for Sphere {
    fn id(&self) -> i32 {
        self.id
    }

    fn evaluate(&self, r: &Point3) -> f64 {
        (r - self.center).norm_squared() - self.radius * self.radius
    }

    fn normal(&self, r: &Point3) -> Vector3 {
        2.0 * (r - self.center)
    }

    fn distance(&self, r: &Point3, u: &Vector3, coincident: bool) -> f64 {
        let p = r - self.center;
        let k = p.dot(u);
        let c = p.norm_squared() - self.radius * self.radius;
        let quad = k * k - c;

        if quad < 0.0 {
            // The ray's line misses the sphere entirely.
            return f64::INFINITY;
        }

        if coincident || c.abs() < FP_COINCIDENT {
            // On the surface: the only admissible crossing is the far one.
            if k >= 0.0 {
                return f64::INFINITY;
            }
            return -k + quad.sqrt();
        }

        if c < 0.0 {
            // Inside: exits through the far intersection.
            return -k + quad.sqrt();
        }

        // Outside: the near intersection, if it lies ahead.
        let d = -k - quad.sqrt();
        if d < 0.0 {
            f64::INFINITY
        } else {
            d
        }
    }
}
