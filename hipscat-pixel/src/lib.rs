//! HEALPix NEST index math for hierarchically partitioned sky catalogs.
//!
//! A catalog is split into tiles of varying HEALPix order so that each tile
//! holds a bounded number of objects. This crate provides the pixel-level
//! pieces of that scheme: which finer pixels border a tile, whether a point
//! lies within a margin of a tile, how rows are assigned sortable 64-bit
//! identifiers, and how a fine histogram is merged into tiles.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`healpix`] | [`SpherePixelization`](healpix::SpherePixelization), the [`Nested`](healpix::Nested) scheme, [`Direction`](healpix::Direction) |
//! | [`order`] | Pixel counts, resolution, ring conversion, polar detection |
//! | [`pixel`] | [`HealpixPixel`] hierarchy and breadth-first ordering |
//! | [`margin`] | Edge descendants, margin pixels, margin bounds checks |
//! | [`hipscat_id`] | Spatial index identifiers and their inverse |
//! | [`partition`] | Histograms and [`generate_alignment`](partition::generate_alignment) |
//!
//! # Quick Start
//!
//! ```
//! use hipscat_pixel::margin::get_margin;
//! use hipscat_pixel::{breadth_first_argsort, HealpixPixel};
//!
//! // Order-1 pixels bordering order-0 pixel 4, with face rotation at the pole.
//! let margin = get_margin(0, 4, 1).unwrap();
//! assert_eq!(margin, vec![45, 47, 29, 12, 13, 0, 2, 22, 34, 35]);
//!
//! let tiles = [
//!     HealpixPixel::new(0, 1).unwrap(),
//!     HealpixPixel::new(2, 5).unwrap(),
//! ];
//! assert_eq!(breadth_first_argsort(&tiles), vec![1, 0]);
//! ```
//!
//! # Features
//!
//! - **`serde`**: derive `Serialize`/`Deserialize` on parameter and result types.
//!
//! # Logging
//!
//! Diagnostics are emitted through [`tracing`]; install a subscriber to see
//! cache fills, degenerate-geometry fallbacks and forced partition leaves.

pub mod healpix;
pub mod hipscat_id;
pub mod margin;
pub mod order;
pub mod partition;
pub mod pixel;

pub use healpix::{Direction, Nested, SpherePixelization};
pub use order::{Pole, MAX_ORDER};
pub use pixel::{breadth_first_argsort, HealpixPixel};
