use thiserror::Error;

/// Top-level error type for the montecell CSG kernel.
#[derive(Debug, Error)]
pub enum MontecellError {
    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Cell(#[from] CellError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Errors raised while compiling a region specification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegionError {
    #[error("region specification contains invalid character {0:?}")]
    InvalidCharacter(char),

    #[error("mismatched parentheses in region specification for cell {0}")]
    MismatchedParens(i32),
}

/// Errors raised while building a cell from its structured description.
#[derive(Debug, Error, PartialEq)]
pub enum CellError {
    #[error("cell description is missing an id")]
    MissingId,

    #[error(
        "cell {0} has both a material and a fill specified; only one can be specified per cell"
    )]
    FillAmbiguity(i32),

    #[error("neither material nor fill was specified for cell {0}")]
    FillMissing(i32),

    #[error("an empty material element was specified for cell {0}")]
    EmptyMaterial(i32),

    #[error("cell {cell_id} has an invalid material element {word:?}")]
    BadMaterial { cell_id: i32, word: String },

    #[error("cell {cell_id} references unknown material {material_id}")]
    UnknownMaterial { cell_id: i32, material_id: i32 },

    #[error(
        "cell {0} was specified with a temperature but no material; \
         temperatures are only valid for cells filled with a material"
    )]
    TemperatureWithoutMaterial(i32),

    #[error("cell {cell_id} has an invalid temperature element {word:?}")]
    BadTemperature { cell_id: i32, word: String },

    #[error("cell {0} was specified with a negative temperature")]
    NegativeTemperature(i32),

    #[error("cell {cell_id} has {n_temps} temperatures for {n_mats} material instances")]
    TemperatureLengthMismatch {
        cell_id: i32,
        n_temps: usize,
        n_mats: usize,
    },

    #[error("cell {cell_id} references unknown surface {surface_id}")]
    UnknownSurface { cell_id: i32, surface_id: i32 },

    #[error("cell {cell_id} is filled with unknown universe or lattice {fill_id}")]
    UnknownFill { cell_id: i32, fill_id: i32 },

    #[error(
        "cannot apply a {transform} to cell {cell_id} because it is not \
         filled with another universe"
    )]
    IllegalTransformOnMaterialCell {
        cell_id: i32,
        transform: &'static str,
    },

    #[error("non-3D {transform} vector applied to cell {cell_id}")]
    BadVectorDimension {
        cell_id: i32,
        transform: &'static str,
    },
}

/// Errors raised by the geometry context and its indexed access API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("no cells found in the geometry description")]
    NoCells,

    #[error("two or more cells use the same id {0}")]
    DuplicateCellId(i32),

    #[error("surface id {0} is not a positive integer")]
    InvalidSurfaceId(i32),

    #[error("two or more surfaces use the same id {0}")]
    DuplicateSurfaceId(i32),

    #[error("index in {0} array is out of bounds")]
    OutOfBounds(&'static str),
}

/// Convenience type alias for results using [`MontecellError`].
pub type Result<T> = std::result::Result<T, MontecellError>;
