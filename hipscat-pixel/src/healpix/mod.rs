//! Sphere pixelization primitives.
//!
//! The margin and identifier code never talks to a concrete HEALPix
//! implementation directly; it goes through [`SpherePixelization`], which
//! names the handful of primitives the rest of the crate needs. [`Nested`] is
//! the native bit-manipulation backend.
//!
//! | Primitive | Returns |
//! |-----------|---------|
//! | [`neighbours`](SpherePixelization::neighbours) | 8 neighbours in [`Direction`] order, `None` where absent |
//! | [`to_ring`](SpherePixelization::to_ring) / [`from_ring`](SpherePixelization::from_ring) | NEST ↔ RING index |
//! | [`boundary_samples`](SpherePixelization::boundary_samples) | `4·step` (RA, Dec) points around the pixel edge |
//! | [`center`](SpherePixelization::center) | (RA, Dec) of the pixel centre |
//! | [`ang2pix`](SpherePixelization::ang2pix) | NEST index containing a position |
//!
//! All angles are degrees.

mod nested;

pub use nested::Nested;

use std::fmt;

/// Compass direction of a neighbouring pixel, in the order returned by
/// [`SpherePixelization::neighbours`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    SouthWest = 0,
    West = 1,
    NorthWest = 2,
    North = 3,
    NorthEast = 4,
    East = 5,
    SouthEast = 6,
    South = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Self {
        Self::ALL[(self.index() + 4) % 8]
    }

    /// Pixels are diamonds with their corners at N, E, S and W, so the
    /// intercardinal neighbours share a whole edge and the cardinal ones share
    /// a single vertex.
    pub fn shares_edge(self) -> bool {
        self.index() % 2 == 0
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::SouthWest => "SW",
            Direction::West => "W",
            Direction::NorthWest => "NW",
            Direction::North => "N",
            Direction::NorthEast => "NE",
            Direction::East => "E",
            Direction::SouthEast => "SE",
            Direction::South => "S",
        };
        f.write_str(name)
    }
}

/// Primitive operations of a hierarchical equal-area pixelization.
///
/// Implementations may assume `order <= 29` and `index < 12·4^order`.
pub trait SpherePixelization {
    /// Neighbours of `index` at the same order, in [`Direction::ALL`] order.
    ///
    /// An entry is `None` where the pixel touches a base-face vertex shared by
    /// only three faces.
    fn neighbours(&self, order: u8, index: u64) -> [Option<u64>; 8];

    fn to_ring(&self, order: u8, index: u64) -> u64;

    fn from_ring(&self, order: u8, ring: u64) -> u64;

    /// Walks the pixel edge starting at the north corner, through the west,
    /// south and east corners, `step` samples per side.
    fn boundary_samples(&self, order: u8, index: u64, step: u32) -> Vec<(f64, f64)>;

    fn center(&self, order: u8, index: u64) -> (f64, f64);

    /// Any finite RA is accepted and wrapped; Dec is clamped to [-90, 90].
    fn ang2pix(&self, order: u8, ra_deg: f64, dec_deg: f64) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::SouthWest.opposite(), Direction::NorthEast);
        assert_eq!(Direction::North.opposite(), Direction::South);
        assert_eq!(Direction::East.opposite(), Direction::West);
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn test_direction_shares_edge() {
        let edge_sharing: Vec<_> = Direction::ALL
            .into_iter()
            .filter(|d| d.shares_edge())
            .collect();
        assert_eq!(
            edge_sharing,
            vec![
                Direction::SouthWest,
                Direction::NorthWest,
                Direction::NorthEast,
                Direction::SouthEast
            ]
        );
        assert_eq!(Direction::SouthEast.to_string(), "SE");
    }
}
