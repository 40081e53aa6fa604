//! Unit-sphere vectors for sky geometry.
//!
//! Pixel centres, boundary samples and query points all live on the unit
//! sphere. Angular tests (is this point inside that polygon, how far is it
//! from this arc) are cleanest in Cartesian form, so positions are lifted into
//! [`Vector3`] for the geometry and dropped back to (RA, Dec) for output.
//!
//! ```
//! use hipscat_core::Vector3;
//!
//! let v = Vector3::from_radec_deg(45.0, 30.0);
//! let (ra, dec) = v.to_radec_deg();
//! assert!((ra - 45.0).abs() < 1e-12);
//! assert!((dec - 30.0).abs() < 1e-12);
//! ```
//!
//! # Conventions
//!
//! `x` points toward RA = 0 on the equator, `y` toward RA = 90° and `z` toward
//! the north pole. [`to_radec_deg`](Vector3::to_radec_deg) returns RA in
//! [0°, 360°).

use crate::constants::{DEG_TO_RAD, RAD_TO_DEG};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn z_axis() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    #[inline]
    pub fn magnitude(&self) -> f64 {
        libm::sqrt(self.x * self.x + self.y * self.y + self.z * self.z)
    }

    /// Returns a unit vector in the same direction; the zero vector is returned unchanged.
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            *self
        } else {
            Self::new(self.x / mag, self.y / mag, self.z / mag)
        }
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Angle between two directions in radians, stable for tiny separations.
    pub fn angle_to(&self, other: &Self) -> f64 {
        libm::atan2(self.cross(other).magnitude(), self.dot(other))
    }

    /// Lifts a sky position given in radians onto the unit sphere.
    pub fn from_spherical(ra: f64, dec: f64) -> Self {
        let (sin_ra, cos_ra) = libm::sincos(ra);
        let (sin_dec, cos_dec) = libm::sincos(dec);
        Self::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
    }

    pub fn from_radec_deg(ra_deg: f64, dec_deg: f64) -> Self {
        Self::from_spherical(ra_deg * DEG_TO_RAD, dec_deg * DEG_TO_RAD)
    }

    /// Returns `(ra, dec)` in radians, with `ra` in (-π, π].
    pub fn to_spherical(&self) -> (f64, f64) {
        let d2 = self.x * self.x + self.y * self.y;

        let ra = if d2 == 0.0 {
            0.0
        } else {
            libm::atan2(self.y, self.x)
        };
        let dec = if self.z == 0.0 {
            0.0
        } else {
            libm::atan2(self.z, libm::sqrt(d2))
        };

        (ra, dec)
    }

    pub fn to_radec_deg(&self) -> (f64, f64) {
        let (ra, dec) = self.to_spherical();
        let mut ra_deg = ra * RAD_TO_DEG;
        if ra_deg < 0.0 {
            ra_deg += 360.0;
        }
        if ra_deg >= 360.0 {
            ra_deg -= 360.0;
        }
        (ra_deg, dec * RAD_TO_DEG)
    }

    /// Orthonormal (east, north) basis of the plane tangent to the sphere at `self`.
    ///
    /// `self` must be a unit vector. At either pole the east direction is taken
    /// along +y.
    pub fn tangent_basis(&self) -> (Self, Self) {
        let east = Self::new(-self.y, self.x, 0.0);
        let east = if east.magnitude() < 1e-15 {
            Self::new(0.0, 1.0, 0.0)
        } else {
            east.normalize()
        };
        let north = self.cross(&east);
        (east, north)
    }
}

impl std::ops::Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector3({:.9}, {:.9}, {:.9})", self.x, self.y, self.z)
    }
}
