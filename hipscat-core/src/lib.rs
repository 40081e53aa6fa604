//! Core numerics for hierarchical sky partitioning.
//!
//! This crate holds the pieces that every pixel-level computation shares:
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`errors`] | [`PixelError`] and the [`PixelResult`] alias |
//! | [`constants`] | Angle conversion factors, sphere area |
//! | [`math`] | Spherical vertex angle, integer square root |
//! | [`utils`] | RA/Dec normalization and RA unwrapping |
//! | [`vector3`] | [`Vector3`] unit-sphere vectors and tangent-plane bases |
//!
//! The HEALPix index math itself lives in `hipscat-pixel`.
//!
//! # Features
//!
//! - `serde`: derive `Serialize`/`Deserialize` for [`Vector3`].

pub mod constants;
pub mod errors;
pub mod math;
pub mod utils;
pub mod vector3;

pub use errors::{PixelError, PixelResult};
pub use vector3::Vector3;
