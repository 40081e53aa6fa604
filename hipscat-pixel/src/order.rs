//! Order and index arithmetic for the NEST scheme.
//!
//! An *order* `k` splits each of the 12 base faces into `4^k` pixels, so
//! `pixel_count(k) = 12·4^k` and `nside(k) = 2^k`. Orders run from 0 to
//! [`MAX_ORDER`]; 29 is the deepest order whose indices still fit a signed
//! 64-bit integer, which keeps every intermediate of the ring conversion exact.
//!
//! | Function | Result |
//! |----------|--------|
//! | [`pixel_count`] | `12·4^order` |
//! | [`nside`] | `2^order` |
//! | [`pixel_area_deg2`] | Area of one pixel in square degrees |
//! | [`pixel_resolution_deg`] | Square root of the area |
//! | [`to_ring_index`] / [`from_ring_index`] | NEST ↔ RING |
//! | [`is_polar`] / [`polar_side`] | Pixel lies in one of the four first or last rings |
//!
//! Every function validates its order and index and returns a
//! [`PixelError::Range`] rather than computing garbage.

use hipscat_core::constants::SPHERE_AREA_DEG2;
use hipscat_core::{PixelError, PixelResult};

use crate::healpix::{Nested, SpherePixelization};
use crate::pixel::HealpixPixel;

pub const MAX_ORDER: u8 = 29;

/// Which pole a polar pixel touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pole {
    North,
    South,
}

pub(crate) fn validate_order(operation: &str, order: u8) -> PixelResult<()> {
    if order > MAX_ORDER {
        return Err(PixelError::range(
            operation,
            format!("order {} exceeds maximum {}", order, MAX_ORDER),
        ));
    }
    Ok(())
}

pub(crate) fn validate_pixel(operation: &str, order: u8, index: u64) -> PixelResult<()> {
    let npix = pixel_count(order)?;
    if index >= npix {
        return Err(PixelError::range(
            operation,
            format!("pixel {} out of range for order {} ({} pixels)", index, order, npix),
        ));
    }
    Ok(())
}

/// Number of pixels covering the sphere at `order`.
///
/// ```
/// use hipscat_pixel::order::pixel_count;
///
/// assert_eq!(pixel_count(0).unwrap(), 12);
/// assert_eq!(pixel_count(3).unwrap(), 768);
/// assert!(pixel_count(30).is_err());
/// ```
pub fn pixel_count(order: u8) -> PixelResult<u64> {
    validate_order("pixel_count", order)?;
    Ok(12u64 << (2 * order as u32))
}

pub fn nside(order: u8) -> PixelResult<u64> {
    validate_order("nside", order)?;
    Ok(1u64 << order)
}

pub fn pixel_area_deg2(order: u8) -> PixelResult<f64> {
    Ok(SPHERE_AREA_DEG2 / pixel_count(order)? as f64)
}

/// Approximate side length of a pixel, `sqrt(area)`, in degrees.
pub fn pixel_resolution_deg(order: u8) -> PixelResult<f64> {
    Ok(libm::sqrt(pixel_area_deg2(order)?))
}

pub fn to_ring_index(order: u8, nest_index: u64) -> PixelResult<u64> {
    validate_pixel("to_ring_index", order, nest_index)?;
    Ok(Nested.to_ring(order, nest_index))
}

pub fn from_ring_index(order: u8, ring_index: u64) -> PixelResult<u64> {
    validate_pixel("from_ring_index", order, ring_index)?;
    Ok(Nested.from_ring(order, ring_index))
}

/// Returns the pole a pixel touches, if it sits in the first or last four RING indices.
pub fn polar_side(order: u8, nest_index: u64) -> PixelResult<Option<Pole>> {
    let npix = pixel_count(order)?;
    let ring = to_ring_index(order, nest_index)?;
    Ok(if ring <= 3 {
        Some(Pole::North)
    } else if ring >= npix - 4 {
        Some(Pole::South)
    } else {
        None
    })
}

/// True for the eight pixels at each order that touch a pole.
///
/// At order 0 these are the four northern and four southern base faces.
pub fn is_polar(order: u8, nest_index: u64) -> PixelResult<bool> {
    Ok(polar_side(order, nest_index)?.is_some())
}

/// Index at `margin_order` of the southernmost descendant of `pixel`.
///
/// The south child of a NEST pixel is always `4·p`, so the chain collapses to
/// `p · 4^(margin_order − order)`.
pub fn south_pole_excluded_pixel(pixel: HealpixPixel, margin_order: u8) -> PixelResult<u64> {
    validate_order("south_pole_excluded_pixel", margin_order)?;
    if margin_order < pixel.order() {
        return Err(PixelError::range(
            "south_pole_excluded_pixel",
            format!(
                "margin order {} is below pixel order {}",
                margin_order,
                pixel.order()
            ),
        ));
    }
    let delta = (margin_order - pixel.order()) as u32;
    Ok(pixel.pixel() << (2 * delta))
}
