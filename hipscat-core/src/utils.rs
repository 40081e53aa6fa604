//! Angle normalization helpers in degrees.
//!
//! | Function | Input | Output Range |
//! |----------|-------|--------------|
//! | [`normalize_ra`] | degrees | [0°, 360°) |
//! | [`normalize_longitude`] | degrees | (-180°, 180°] |
//! | [`normalize_latitude`] | degrees | [-90°, 90°] (clamped) |
//! | [`unwrap_ra_about`] | degrees | (centre - 180°, centre + 180°] |
//!
//! Scaling a polygon about its centroid only works if every vertex RA is
//! expressed on the same branch as the centroid, which is what
//! [`unwrap_ra_about`] does.

/// Wraps a right ascension into [0°, 360°).
#[inline]
pub fn normalize_ra(ra: f64) -> f64 {
    let mut normalized = ra % 360.0;
    if normalized < 0.0 {
        normalized += 360.0;
    }
    if normalized >= 360.0 {
        normalized -= 360.0;
    }
    normalized
}

/// Normalizes longitude to the range (-180°, 180°].
#[inline]
pub fn normalize_longitude(lon: f64) -> f64 {
    let mut normalized = lon % 360.0;
    if normalized > 180.0 {
        normalized -= 360.0;
    } else if normalized <= -180.0 {
        normalized += 360.0;
    }
    normalized
}

#[inline]
pub fn normalize_latitude(lat: f64) -> f64 {
    lat.clamp(-90.0, 90.0)
}

/// Re-expresses `ra` on the branch closest to `centre`.
///
/// # Example
///
/// ```
/// use hipscat_core::utils::unwrap_ra_about;
///
/// assert!((unwrap_ra_about(1.0, 359.0) - 361.0).abs() < 1e-12);
/// assert!((unwrap_ra_about(359.0, 1.0) + 1.0).abs() < 1e-12);
/// ```
#[inline]
pub fn unwrap_ra_about(ra: f64, centre: f64) -> f64 {
    centre + normalize_longitude(ra - centre)
}
