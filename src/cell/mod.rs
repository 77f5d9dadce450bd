pub(crate) mod build;
mod query;

pub use build::CellSpec;

use crate::math::{Matrix3, Vector3};
use crate::region::Token;

/// Sentinel material index meaning "no matter present"; the region
/// interacts with transport as vacuum.
pub const MATERIAL_VOID: i32 = -1;

/// What a cell is filled with.
///
/// Material entries are internal indices into the material table (or
/// [`MATERIAL_VOID`]); universe and lattice variants hold the index into
/// the respective table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fill {
    Material(Vec<i32>),
    Universe(usize),
    Lattice(usize),
}

/// A rotation applied to a filled universe: the three Euler angles in
/// degrees plus the world-to-local matrix they generate.
#[derive(Debug, Clone, PartialEq)]
pub struct Rotation {
    pub angles: [f64; 3],
    pub matrix: Matrix3,
}

/// A cell: a region of space bounded by surface half-spaces, together
/// with its fill.
///
/// The region is kept in two compiled forms: the infix token sequence
/// (used to reserialize the specification) and its postfix equivalent
/// (used by every particle query). Both are immutable after
/// construction.
#[derive(Debug, Clone)]
pub struct Cell {
    pub(crate) id: i32,
    pub(crate) name: Option<String>,
    pub(crate) universe_id: i32,
    pub(crate) fill: Fill,
    pub(crate) sqrtkt: Vec<f64>,
    pub(crate) translation: Option<Vector3>,
    pub(crate) rotation: Option<Rotation>,
    pub(crate) region: Vec<Token>,
    pub(crate) rpn: Vec<Token>,
    pub(crate) simple: bool,
}

impl Cell {
    /// User-visible cell id.
    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Optional cell name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// User id of the universe this cell belongs to (0 if unspecified).
    #[must_use]
    pub fn universe_id(&self) -> i32 {
        self.universe_id
    }

    /// The cell's fill.
    #[must_use]
    pub fn fill(&self) -> &Fill {
        &self.fill
    }

    /// Stored temperatures, one sqrt(k*T) value per instance (or a
    /// single shared value). Empty for cells without a temperature.
    #[must_use]
    pub fn sqrtkt(&self) -> &[f64] {
        &self.sqrtkt
    }

    /// Translation applied to the filled universe, if any.
    #[must_use]
    pub fn translation(&self) -> Option<&Vector3> {
        self.translation.as_ref()
    }

    /// Rotation applied to the filled universe, if any.
    #[must_use]
    pub fn rotation(&self) -> Option<&Rotation> {
        self.rotation.as_ref()
    }

    /// The compiled infix region token sequence.
    #[must_use]
    pub fn region(&self) -> &[Token] {
        &self.region
    }

    /// The compiled postfix region token sequence.
    #[must_use]
    pub fn rpn(&self) -> &[Token] {
        &self.rpn
    }

    /// True if the region is a pure intersection of half-spaces, which
    /// enables the fast containment path.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.simple
    }
}
