mod plane;
mod sphere;

pub use plane::Plane;
pub use sphere::Sphere;

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, FP_COINCIDENT};

/// A surface primitive dividing 3-space into two half-spaces.
///
/// Implementations provide the signed surface function and its gradient
/// direction; `sense` is derived from those and shared by every
/// primitive.
pub trait Surface: fmt::Debug + Send + Sync {
    /// User-visible surface id (a positive integer).
    fn id(&self) -> i32;

    /// Evaluates the signed surface function at `r`: positive on the
    /// positive side, negative on the negative side, zero on the surface.
    fn evaluate(&self, r: &Point3) -> f64;

    /// Outward (positive-side) normal direction at `r`. Need not be
    /// unit length.
    fn normal(&self, r: &Point3) -> Vector3;

    /// Distance along the ray `r + d*u` to this surface, or infinity if
    /// the ray never crosses it. `coincident` signals that the particle
    /// currently sits on this surface, so the crossing at distance zero
    /// must not be returned.
    fn distance(&self, r: &Point3, u: &Vector3, coincident: bool) -> f64;

    /// Which half-space contains `r`: true for positive, false for
    /// negative. A point within [`FP_COINCIDENT`] of the surface is
    /// classified by the direction of motion instead.
    fn sense(&self, r: &Point3, u: &Vector3) -> bool {
        let f = self.evaluate(r);
        if f.abs() < FP_COINCIDENT {
            return u.dot(&self.normal(r)) > 0.0;
        }
        f > 0.0
    }
}

/// Owns every surface of a geometry and maps user ids to dense indices.
///
/// Half-space tokens in compiled regions store an internal index into
/// this registry; all id-to-index conversion goes through here.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: Vec<Box<dyn Surface>>,
    index: HashMap<i32, usize>,
}

impl SurfaceRegistry {
    /// Creates a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a surface, returning its internal index.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface id is not positive or repeats an
    /// id already registered.
    pub fn add(&mut self, surface: Box<dyn Surface>) -> Result<usize> {
        let id = surface.id();
        if id <= 0 {
            return Err(GeometryError::InvalidSurfaceId(id).into());
        }
        if self.index.contains_key(&id) {
            return Err(GeometryError::DuplicateSurfaceId(id).into());
        }
        let i = self.surfaces.len();
        self.index.insert(id, i);
        self.surfaces.push(surface);
        Ok(i)
    }

    /// Returns the internal index of the surface with the given user id.
    #[must_use]
    pub fn index_of(&self, id: i32) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Returns the number of registered surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Returns true if no surfaces are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl Index<usize> for SurfaceRegistry {
    type Output = dyn Surface;

    fn index(&self, i: usize) -> &Self::Output {
        self.surfaces[i].as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MontecellError;

    #[test]
    fn registry_assigns_dense_indices() {
        let mut reg = SurfaceRegistry::new();
        let i = reg.add(Box::new(Plane::x(10, 0.0))).unwrap();
        let j = reg.add(Box::new(Plane::x(3, 1.0))).unwrap();
        assert_eq!((i, j), (0, 1));
        assert_eq!(reg.index_of(10), Some(0));
        assert_eq!(reg.index_of(3), Some(1));
        assert_eq!(reg.index_of(99), None);
        assert_eq!(reg[1].id(), 3);
    }

    #[test]
    fn rejects_non_positive_id() {
        let mut reg = SurfaceRegistry::new();
        let err = reg.add(Box::new(Plane::x(0, 0.0))).unwrap_err();
        assert!(matches!(
            err,
            MontecellError::Geometry(GeometryError::InvalidSurfaceId(0))
        ));
    }

    #[test]
    fn rejects_duplicate_id() {
        let mut reg = SurfaceRegistry::new();
        reg.add(Box::new(Plane::x(5, 0.0))).unwrap();
        let err = reg.add(Box::new(Plane::y(5, 2.0))).unwrap_err();
        assert!(matches!(
            err,
            MontecellError::Geometry(GeometryError::DuplicateSurfaceId(5))
        ));
    }
}
