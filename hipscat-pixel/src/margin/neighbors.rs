//! Margin pixels: the ring of finer pixels just outside a tile.
//!
//! For every neighbour of a tile we ask for the neighbour's descendants along
//! the edge (or corner) that faces the tile. Away from the poles the facing
//! edge is simply the one opposite the direction of approach, so direction
//! `k` in [`Direction::ALL`] requests [`Edge`] `k` (the south-west neighbour
//! contributes its north-east edge, and so on).
//!
//! Around a pole the four polar faces meet rotated by 90° relative to each
//! other. Crossing from face `f` to face `g` on the same cap turns the
//! neighbour's frame by `g − f` quarter turns, which shifts the requested edge
//! by `2·(g − f)` positions in the northern cap and `−2·(g − f)` in the
//! southern one.
//!
//! The result is the same set as "all neighbours of the tile's descendants,
//! minus those descendants" without ever materialising the descendants.

use hipscat_core::{PixelError, PixelResult};

use crate::healpix::{Direction, Nested, SpherePixelization};
use crate::margin::edge::{get_edge, Edge};
use crate::order::{validate_pixel, MAX_ORDER};

/// Latitude band of a base face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceClass {
    NorthPolar,
    Equatorial,
    SouthPolar,
}

impl FaceClass {
    pub fn of_face(face: u64) -> Self {
        match face {
            0..=3 => FaceClass::NorthPolar,
            4..=7 => FaceClass::Equatorial,
            _ => FaceClass::SouthPolar,
        }
    }

    /// Quarter-turn correction, in edge-table steps, from `pixel_face` to `neighbour_face`.
    pub fn edge_rotation(pixel_face: u64, neighbour_face: u64) -> i64 {
        let delta = neighbour_face as i64 - pixel_face as i64;
        match (Self::of_face(pixel_face), Self::of_face(neighbour_face)) {
            (FaceClass::NorthPolar, FaceClass::NorthPolar) => 2 * delta,
            (FaceClass::SouthPolar, FaceClass::SouthPolar) => -2 * delta,
            _ => 0,
        }
    }
}

/// One neighbour and the edge it must contribute to the margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarginRequest {
    pub direction: Direction,
    pub neighbour: u64,
    pub edge: Edge,
}

/// Neighbours of `pixel` with the facing edge each one contributes.
///
/// Absent neighbours (three-face vertices) are skipped, so the result has 7 or
/// 8 entries (6 at order 0 where every face has two such vertices).
pub fn margin_requests_with<P>(backend: &P, order: u8, pixel: u64) -> PixelResult<Vec<MarginRequest>>
where
    P: SpherePixelization + ?Sized,
{
    validate_pixel("margin_requests", order, pixel)?;
    let shift = 2 * order as u32;
    let pixel_face = pixel >> shift;

    let mut requests = Vec::with_capacity(8);
    for (direction, neighbour) in Direction::ALL.into_iter().zip(backend.neighbours(order, pixel)) {
        let Some(neighbour) = neighbour else {
            continue;
        };
        let rotation = FaceClass::edge_rotation(pixel_face, neighbour >> shift);
        let edge = Edge::try_from(direction.index() as u8)?.rotated(rotation);
        requests.push(MarginRequest {
            direction,
            neighbour,
            edge,
        });
    }
    Ok(requests)
}

pub fn margin_requests(order: u8, pixel: u64) -> PixelResult<Vec<MarginRequest>> {
    margin_requests_with(&Nested, order, pixel)
}

/// Margin pixels of `pixel` at order `order + dk`, grouped by neighbour in
/// [`Direction::ALL`] order.
///
/// # Errors
///
/// [`PixelError::Range`] if `dk` is 0, `order + dk` exceeds 29, or `pixel`
/// is not a valid index at `order`.
///
/// ```
/// use hipscat_pixel::margin::get_margin;
///
/// let margin = get_margin(2, 5, 2).unwrap();
/// assert_eq!(margin.len(), 19);
/// assert_eq!(&margin[..4], &[69, 71, 77, 79]);
/// ```
pub fn get_margin_with<P>(backend: &P, order: u8, pixel: u64, dk: u8) -> PixelResult<Vec<u64>>
where
    P: SpherePixelization + ?Sized,
{
    if dk < 1 {
        return Err(PixelError::range("get_margin", "margin order offset must be at least 1"));
    }
    if order as u32 + dk as u32 > MAX_ORDER as u32 {
        return Err(PixelError::range(
            "get_margin",
            format!("order {} + offset {} exceeds maximum {}", order, dk, MAX_ORDER),
        ));
    }

    let requests = margin_requests_with(backend, order, pixel)?;
    let mut margin = Vec::with_capacity(4 * (1usize << dk) + 4);
    for request in requests {
        margin.extend(get_edge(dk, request.neighbour, request.edge)?);
    }
    Ok(margin)
}

pub fn get_margin(order: u8, pixel: u64, dk: u8) -> PixelResult<Vec<u64>> {
    get_margin_with(&Nested, order, pixel, dk)
}
