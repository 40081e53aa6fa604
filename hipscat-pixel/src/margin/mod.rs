//! Margin pixels and margin membership.
//!
//! - [`edge`]: descendants of a pixel along one edge or corner, memoised per `(edge, dk)`
//! - [`neighbors`]: the ring of finer pixels around a tile, with polar face rotation
//! - [`bounds`]: whether individual points lie within the margin threshold of a tile

pub mod bounds;
pub mod edge;
pub mod neighbors;
mod polygon;

pub use bounds::{
    margin_scale, MarginBounds, MarginParams, MarginStrategy, DEFAULT_BOUNDARY_STEP,
    DEFAULT_MARGIN_THRESHOLD_ARCSEC,
};
pub use edge::{get_edge, get_suffix, Edge};
pub use neighbors::{get_margin, get_margin_with, margin_requests, margin_requests_with, FaceClass, MarginRequest};

use hipscat_core::PixelResult;

/// One-shot form of [`MarginBounds::build`] followed by [`MarginBounds::check`].
pub fn check_margin_bounds(
    coords: &[(f64, f64)],
    pixel: u64,
    params: &MarginParams,
) -> PixelResult<Vec<bool>> {
    MarginBounds::build(params, pixel)?.check(coords)
}
