//! Small numeric kernels shared by the pixel crates.
//!
//! Side lengths come from [`Vector3::angle_to`](crate::Vector3::angle_to); the
//! spherical law of cosines here turns three sides into the *angle* the margin
//! test needs.

use crate::{PixelError, PixelResult};

/// Angle at the vertex between sides `a` and `c` of a spherical triangle, radians.
///
/// Sides are arc lengths in radians; `b` is the side opposite the angle. Solves
/// the spherical law of cosines `cos b = cos a cos c + sin a sin c cos B`.
///
/// # Errors
/// [`PixelError::DegenerateGeometry`] when either adjacent side has zero length
/// (the angle is undefined) or the result is not finite.
pub fn spherical_vertex_angle(a: f64, b: f64, c: f64) -> PixelResult<f64> {
    let den = libm::sin(a) * libm::sin(c);
    if den == 0.0 || !den.is_finite() {
        return Err(PixelError::degenerate_geometry(
            "spherical_vertex_angle",
            format!("zero-length side (a = {:e}, c = {:e})", a, c),
        ));
    }
    let cos_angle = (libm::cos(b) - libm::cos(a) * libm::cos(c)) / den;
    if !cos_angle.is_finite() {
        return Err(PixelError::degenerate_geometry(
            "spherical_vertex_angle",
            "cosine of vertex angle is not finite",
        ));
    }
    Ok(libm::acos(cos_angle.clamp(-1.0, 1.0)))
}

/// Integer square root, exact for the full `u64` range.
pub fn isqrt(value: u64) -> u64 {
    let mut root = libm::sqrt(value as f64) as u64;
    while root > 0 && root.checked_mul(root).is_none_or(|sq| sq > value) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).is_some_and(|sq| sq <= value) {
        root += 1;
    }
    root
}
