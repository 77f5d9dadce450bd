use super::Matrix3;

/// Builds the rotation matrix for the Euler angles `(phi, theta, psi)`,
/// given in degrees.
///
/// The matrix is the row-major product `Rz(psi) * Ry(theta) * Rx(phi)`
/// evaluated with the angles negated, so it transforms world-frame
/// coordinates into the local frame of a rotated filled universe.
#[must_use]
pub fn rotation_matrix(phi: f64, theta: f64, psi: f64) -> Matrix3 {
    let phi = -phi.to_radians();
    let theta = -theta.to_radians();
    let psi = -psi.to_radians();

    let (sp, cp) = phi.sin_cos();
    let (st, ct) = theta.sin_cos();
    let (ss, cs) = psi.sin_cos();

    Matrix3::new(
        ct * cs,
        -cp * ss + sp * st * cs,
        sp * ss + cp * st * cs,
        ct * ss,
        cp * cs + sp * st * ss,
        -sp * cs + cp * st * ss,
        -st,
        sp * ct,
        cp * ct,
    )
}
