use crate::math::{Point3, Vector3, FP_PRECISION};
use crate::region::{OpKind, Token};
use crate::surface::SurfaceRegistry;

use super::Cell;

impl Cell {
    /// Does the point `r`, moving along `u`, lie inside this cell?
    ///
    /// `on_surface` is the signed half-space token of the surface the
    /// particle currently sits on (0 for none); it overrides the sense
    /// computation for that surface so that a particle crossing a
    /// boundary is classified consistently on both sides.
    #[must_use]
    pub fn contains(
        &self,
        r: &Point3,
        u: &Vector3,
        on_surface: i32,
        surfaces: &SurfaceRegistry,
    ) -> bool {
        if self.simple {
            self.contains_simple(r, u, on_surface, surfaces)
        } else {
            self.contains_complex(r, u, on_surface, surfaces)
        }
    }

    /// Fast path for pure-intersection regions: every half-space must
    /// contain the point.
    fn contains_simple(
        &self,
        r: &Point3,
        u: &Vector3,
        on_surface: i32,
        surfaces: &SurfaceRegistry,
    ) -> bool {
        for &token in &self.rpn {
            if let Token::Halfspace(t) = token {
                if !halfspace_contains(t, r, u, on_surface, surfaces) {
                    return false;
                }
            }
        }
        true
    }

    /// General path: evaluates the postfix expression on a boolean
    /// stack. The stack never grows past `rpn.len()`, so one reserve up
    /// front is the only allocation a query makes.
    fn contains_complex(
        &self,
        r: &Point3,
        u: &Vector3,
        on_surface: i32,
        surfaces: &SurfaceRegistry,
    ) -> bool {
        let mut stack: Vec<bool> = Vec::with_capacity(self.rpn.len());

        for &token in &self.rpn {
            match token {
                Token::Op(OpKind::Union) => {
                    let b = stack.pop().unwrap_or(true);
                    let a = stack.pop().unwrap_or(true);
                    stack.push(a || b);
                }
                Token::Op(OpKind::Intersection) => {
                    let b = stack.pop().unwrap_or(true);
                    let a = stack.pop().unwrap_or(true);
                    stack.push(a && b);
                }
                Token::Op(OpKind::Complement) => {
                    if let Some(top) = stack.last_mut() {
                        *top = !*top;
                    }
                }
                Token::Halfspace(t) => {
                    stack.push(halfspace_contains(t, r, u, on_surface, surfaces));
                }
                Token::Op(_) => {}
            }
        }

        // An empty region contains everything.
        stack.pop().unwrap_or(true)
    }

    /// Distance along the ray `r + d*u` to the nearest surface bounding
    /// this cell, together with the signed token of the half-space the
    /// particle would be leaving.
    ///
    /// Each half-space referenced by the region is considered exactly
    /// once. A candidate replaces the running minimum only when it is
    /// smaller by more than [`FP_PRECISION`] in relative terms, so
    /// effectively coincident surfaces do not thrash the result; the
    /// first finite candidate always replaces the infinite initial
    /// minimum. With no crossing ahead the result is
    /// `(f64::INFINITY, i32::MAX)`.
    #[must_use]
    pub fn distance(
        &self,
        r: &Point3,
        u: &Vector3,
        on_surface: i32,
        surfaces: &SurfaceRegistry,
    ) -> (f64, i32) {
        let mut min_dist = f64::INFINITY;
        let mut i_surf = i32::MAX;

        for &token in &self.rpn {
            let Token::Halfspace(t) = token else {
                continue;
            };

            let coincident = t == on_surface;
            let d = surfaces[(t.abs() - 1) as usize].distance(r, u, coincident);

            if d < min_dist
                && (min_dist.is_infinite() || (d - min_dist).abs() / min_dist >= FP_PRECISION)
            {
                min_dist = d;
                i_surf = -t;
            }
        }

        (min_dist, i_surf)
    }
}

/// Evaluates one signed half-space token for a particle at `r` moving
/// along `u`. A matching `on_surface` token overrides the geometric
/// sense: the particle counts as being on the token's own side.
fn halfspace_contains(
    t: i32,
    r: &Point3,
    u: &Vector3,
    on_surface: i32,
    surfaces: &SurfaceRegistry,
) -> bool {
    if t == on_surface {
        true
    } else if -t == on_surface {
        false
    } else {
        let sense = surfaces[(t.abs() - 1) as usize].sense(r, u);
        sense == (t > 0)
    }
}
