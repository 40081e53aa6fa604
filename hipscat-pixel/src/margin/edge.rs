//! Edge and corner suffixes.
//!
//! A pixel's descendants `dk` orders down are `(pixel << 2·dk) + s` for
//! `s in 0..4^dk`, where each base-4 digit of `s` picks one child (0 = south,
//! 1 = east, 2 = west, 3 = north) at one level. The descendants that touch a
//! given edge are the ones whose every digit comes from the two children on
//! that edge; a corner keeps a single digit at every level.
//!
//! | Id | [`Edge`] | Digits | Suffix length |
//! |----|----------|--------|---------------|
//! | 0 | NE edge | {1, 3} | `2^dk` |
//! | 1 | E corner | {1} | 1 |
//! | 2 | SE edge | {0, 1} | `2^dk` |
//! | 3 | S corner | {0} | 1 |
//! | 4 | SW edge | {0, 2} | `2^dk` |
//! | 5 | W corner | {2} | 1 |
//! | 6 | NW edge | {2, 3} | `2^dk` |
//! | 7 | N corner | {3} | 1 |
//!
//! Suffixes depend only on `(edge, dk)`, so they are computed once per process
//! and shared. The cache is a fixed `8 × 30` table of write-once cells.

use once_cell::sync::{Lazy, OnceCell};
use tracing::debug;

use hipscat_core::{PixelError, PixelResult};

use crate::order::{validate_order, MAX_ORDER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Edge {
    NorthEast = 0,
    East = 1,
    SouthEast = 2,
    South = 3,
    SouthWest = 4,
    West = 5,
    NorthWest = 6,
    North = 7,
}

const EDGE_DIGITS: [&[u64]; 8] = [&[1, 3], &[1], &[0, 1], &[0], &[0, 2], &[2], &[2, 3], &[3]];

const ALL_EDGES: [Edge; 8] = [
    Edge::NorthEast,
    Edge::East,
    Edge::SouthEast,
    Edge::South,
    Edge::SouthWest,
    Edge::West,
    Edge::NorthWest,
    Edge::North,
];

impl Edge {
    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Corners are shared with a single descendant at every depth.
    pub fn is_corner(self) -> bool {
        self.id() % 2 == 1
    }

    /// The edge `steps` positions further round the table, modulo 8.
    pub fn rotated(self, steps: i64) -> Self {
        ALL_EDGES[(self.id() as i64 + steps).rem_euclid(8) as usize]
    }

    fn digits(self) -> &'static [u64] {
        EDGE_DIGITS[self.id() as usize]
    }
}

impl TryFrom<u8> for Edge {
    type Error = PixelError;

    fn try_from(id: u8) -> PixelResult<Self> {
        ALL_EDGES.get(id as usize).copied().ok_or_else(|| {
            PixelError::argument("Edge::try_from", format!("edge id {} is not in 0..=7", id))
        })
    }
}

type SuffixTable = [[OnceCell<Box<[u64]>>; MAX_ORDER as usize + 1]; 8];

static SUFFIX_CACHE: Lazy<SuffixTable> =
    Lazy::new(|| std::array::from_fn(|_| std::array::from_fn(|_| OnceCell::new())));

fn compute_suffix(edge: Edge, dk: u8) -> Box<[u64]> {
    let digits = edge.digits();
    let mut suffix = vec![0u64];
    for _ in 0..dk {
        suffix = suffix
            .iter()
            .flat_map(|&s| digits.iter().map(move |&d| (s << 2) + d))
            .collect();
    }
    suffix.into_boxed_slice()
}

/// Suffixes selecting the descendants on `edge` at relative depth `dk`.
///
/// The returned slice lives for the rest of the process; repeated calls return
/// the same allocation.
pub fn get_suffix(edge: Edge, dk: u8) -> PixelResult<&'static [u64]> {
    validate_order("get_suffix", dk)?;
    let cell = &SUFFIX_CACHE[edge.id() as usize][dk as usize];
    let suffix: &'static [u64] = cell.get_or_init(|| {
        debug!(edge = edge.id(), dk, "computing edge suffix");
        compute_suffix(edge, dk)
    });
    Ok(suffix)
}

/// Descendants of `pixel`, `dk` orders down, that lie on `edge`.
///
/// ```
/// use hipscat_pixel::margin::{get_edge, Edge};
///
/// assert_eq!(get_edge(2, 71, Edge::NorthEast).unwrap(), vec![1141, 1143, 1149, 1151]);
/// assert_eq!(get_edge(2, 80, Edge::East).unwrap(), vec![1285]);
/// ```
pub fn get_edge(dk: u8, pixel: u64, edge: Edge) -> PixelResult<Vec<u64>> {
    validate_order("get_edge", dk)?;
    let shift = 2 * dk as u32;
    if pixel.leading_zeros() < shift {
        return Err(PixelError::overflow(
            "get_edge",
            format!("pixel {} shifted by {} bits exceeds 64 bits", pixel, shift),
        ));
    }
    let suffix = get_suffix(edge, dk)?;
    let base = pixel << shift;
    Ok(suffix.iter().map(|&s| base + s).collect())
}
