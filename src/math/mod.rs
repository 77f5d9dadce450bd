pub mod rotation;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 matrix type.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Relative tolerance below which two ray distances count as equal.
pub const FP_PRECISION: f64 = 1e-14;

/// Absolute tolerance below which a point counts as lying on a surface.
pub const FP_COINCIDENT: f64 = 1e-12;

/// Boltzmann constant in MeV/K; temperatures are stored as sqrt(k*T).
pub const K_BOLTZMANN: f64 = 8.617_330_3e-11;
