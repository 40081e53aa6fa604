//! Point-in-margin tests for a single tile.
//!
//! A point belongs to the margin of a tile if it lies within
//! `margin_threshold_arcsec` of the tile's boundary. Two strategies are
//! available:
//!
//! | Strategy | Candidate test | Final test |
//! |----------|----------------|------------|
//! | [`MarginStrategy::BoundingBox`] | Affine-enlarged boundary polygon(s) | Perpendicular bisector |
//! | [`MarginStrategy::PerpendicularBisector`] | none | Perpendicular bisector |
//!
//! The enlarged polygon is the tile boundary scaled about the tile centre by
//! [`margin_scale`] in (RA, Dec) space, then widened in the tangent plane by
//! the threshold plus the boundary sample spacing. The scaling alone does not
//! reach the threshold everywhere on a HEALPix tile; the widening keeps the
//! candidate region a superset of what the bisector accepts, so both
//! strategies return the same mask. Orders 0 and 1 are too large for a single
//! polygon, so they are covered by their order-2 descendants, each enlarged by
//! `margin_scale(2, threshold)`. Tiles touching a pole make the affine scaling
//! singular and always use the bisector alone.
//!
//! # Perpendicular bisector
//!
//! With `B1` and `B2` the two boundary samples closest to the point `P`, the
//! spherical law of cosines gives the angle at `B1` of the triangle
//! `P B1 B2`, and `asin(sin(angle) · sin(|P B1|))` is the arc from `P` to the
//! great circle through `B1` and `B2`. The point is accepted if either that arc
//! or `|P B1|` itself is within the threshold (both comparisons inclusive).
//! A collapsed triangle falls back to `|P B1|` alone.
//!
//! ```
//! use hipscat_pixel::margin::{MarginBounds, MarginParams};
//!
//! let params = MarginParams { order: 3, ..MarginParams::default() };
//! let bounds = MarginBounds::build(&params, 100).unwrap();
//! let mask = bounds.check(&[(0.0, 0.0), (120.0, 40.0)]).unwrap();
//! assert_eq!(mask.len(), 2);
//! ```

use rayon::prelude::*;
use tracing::{debug, trace};

use hipscat_core::constants::{ARCSEC_PER_DEGREE, ARCSEC_TO_RAD};
use hipscat_core::math::spherical_vertex_angle;
use hipscat_core::utils::{normalize_latitude, unwrap_ra_about};
use hipscat_core::{PixelError, PixelResult, Vector3};

use crate::healpix::{Nested, SpherePixelization};
use crate::margin::polygon::TangentPolygon;
use crate::order::{is_polar, pixel_area_deg2, pixel_resolution_deg, validate_order};
use crate::pixel::HealpixPixel;

/// 0.1°, the conventional margin width.
pub const DEFAULT_MARGIN_THRESHOLD_ARCSEC: f64 = 360.0;

pub const DEFAULT_BOUNDARY_STEP: u32 = 1000;

/// Orders below this are split into descendants at this order before scaling.
const SUBREGION_ORDER: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarginStrategy {
    /// Enlarged-polygon prefilter followed by the bisector test.
    #[default]
    BoundingBox,
    /// Bisector test on every point.
    PerpendicularBisector,
}

/// Parameters for building a [`MarginBounds`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarginParams {
    /// Order of the tile whose margin is tested.
    pub order: u8,
    /// Margin width, in arcseconds.
    pub margin_threshold_arcsec: f64,
    /// Boundary samples per tile side.
    pub boundary_step: u32,
    pub strategy: MarginStrategy,
}

impl Default for MarginParams {
    fn default() -> Self {
        Self {
            order: 0,
            margin_threshold_arcsec: DEFAULT_MARGIN_THRESHOLD_ARCSEC,
            boundary_step: DEFAULT_BOUNDARY_STEP,
            strategy: MarginStrategy::default(),
        }
    }
}

impl MarginParams {
    pub fn validate(&self) -> PixelResult<()> {
        validate_order("MarginParams::validate", self.order)?;
        validate_threshold("MarginParams::validate", self.margin_threshold_arcsec)?;
        if self.boundary_step == 0 {
            return Err(PixelError::range(
                "MarginParams::validate",
                "boundary_step must be at least 1",
            ));
        }
        Ok(())
    }
}

fn validate_threshold(operation: &str, threshold_arcsec: f64) -> PixelResult<()> {
    if !(threshold_arcsec > 0.0 && threshold_arcsec.is_finite()) {
        return Err(PixelError::range(
            operation,
            format!("margin threshold must be positive, got {}", threshold_arcsec),
        ));
    }
    Ok(())
}

/// Area ratio between a tile grown by the margin and the tile itself.
///
/// `(resolution + threshold)² / area`, with the resolution and threshold in
/// degrees.
///
/// ```
/// use hipscat_pixel::margin::margin_scale;
///
/// let scale = margin_scale(3, 360.0).unwrap();
/// assert!((scale - 1.0274748806654526).abs() < 1e-12);
/// ```
pub fn margin_scale(order: u8, margin_threshold_arcsec: f64) -> PixelResult<f64> {
    validate_threshold("margin_scale", margin_threshold_arcsec)?;
    let resolution = pixel_resolution_deg(order)?;
    let threshold_deg = margin_threshold_arcsec / ARCSEC_PER_DEGREE;
    let grown = resolution + threshold_deg;
    Ok(grown * grown / pixel_area_deg2(order)?)
}

/// Precomputed margin test for one tile.
#[derive(Debug, Clone)]
pub struct MarginBounds {
    pixel: HealpixPixel,
    threshold_rad: f64,
    samples: Vec<Vector3>,
    prefilter: Option<Vec<TangentPolygon>>,
}

impl MarginBounds {
    pub fn build(params: &MarginParams, pixel: u64) -> PixelResult<Self> {
        params.validate()?;
        let tile = HealpixPixel::new(params.order, pixel)?;
        let step = params.boundary_step;

        let threshold_rad = params.margin_threshold_arcsec * ARCSEC_TO_RAD;

        let samples: Vec<Vector3> = Nested
            .boundary_samples(tile.order(), tile.pixel(), step)
            .into_iter()
            .map(|(ra, dec)| Vector3::from_radec_deg(ra, normalize_latitude(dec)))
            .collect();

        let prefilter = if is_polar(tile.order(), tile.pixel())? {
            debug!(%tile, "polar tile, using perpendicular bisector only");
            None
        } else {
            match params.strategy {
                MarginStrategy::BoundingBox => {
                    // The bisector rejects anything farther than threshold + spacing from every sample.
                    let pad_rad = threshold_rad + max_sample_spacing(&samples);
                    enlarged_regions(tile, params.margin_threshold_arcsec, step, pad_rad)?
                }
                MarginStrategy::PerpendicularBisector => None,
            }
        };

        Ok(Self {
            pixel: tile,
            threshold_rad,
            samples,
            prefilter,
        })
    }

    pub fn pixel(&self) -> HealpixPixel {
        self.pixel
    }

    /// Number of enlarged polygons in the prefilter; 0 when only the bisector runs.
    pub fn prefilter_regions(&self) -> usize {
        self.prefilter.as_ref().map_or(0, Vec::len)
    }

    pub fn contains(&self, ra_deg: f64, dec_deg: f64) -> bool {
        let point = Vector3::from_radec_deg(ra_deg, normalize_latitude(dec_deg));
        if let Some(regions) = &self.prefilter {
            if !regions.iter().any(|region| region.contains(&point)) {
                return false;
            }
        }
        self.within_bisector(&point)
    }

    /// Evaluates [`contains`](Self::contains) over a batch in parallel.
    pub fn check(&self, coords: &[(f64, f64)]) -> PixelResult<Vec<bool>> {
        if coords.is_empty() {
            return Err(PixelError::argument("MarginBounds::check", "coordinate batch is empty"));
        }
        Ok(coords
            .par_iter()
            .map(|&(ra, dec)| self.contains(ra, dec))
            .collect())
    }

    fn within_bisector(&self, point: &Vector3) -> bool {
        let mut nearest = (f64::INFINITY, 0usize);
        let mut second = (f64::INFINITY, 0usize);
        for (i, sample) in self.samples.iter().enumerate() {
            let d = point.angle_to(sample);
            if d < nearest.0 {
                second = nearest;
                nearest = (d, i);
            } else if d < second.0 {
                second = (d, i);
            }
        }

        let c = self.samples[nearest.1].angle_to(&self.samples[second.1]);
        within_threshold(nearest.0, second.0, c, self.threshold_rad)
    }
}

/// Bisector acceptance from the distances to the two nearest samples (`a`, `b`)
/// and between them (`c`). Both comparisons are inclusive.
fn within_threshold(a: f64, b: f64, c: f64, threshold_rad: f64) -> bool {
    if a <= threshold_rad {
        return true;
    }
    // Any point whose perpendicular foot lies on the sampled arc is within c of B1.
    if a > threshold_rad + c {
        return false;
    }
    match perpendicular_distance(a, b, c) {
        Ok(h) => h <= threshold_rad,
        Err(err) => {
            trace!(%err, "falling back to nearest boundary sample");
            a <= threshold_rad
        }
    }
}

/// Largest arc between consecutive samples of a closed boundary.
fn max_sample_spacing(samples: &[Vector3]) -> f64 {
    samples
        .iter()
        .zip(samples.iter().cycle().skip(1))
        .map(|(a, b)| a.angle_to(b))
        .fold(0.0, f64::max)
}

/// Arc from a point to the great circle through its two nearest samples.
///
/// `a` and `b` are the distances to the nearest and second-nearest sample,
/// `c` the distance between the samples, all in radians.
fn perpendicular_distance(a: f64, b: f64, c: f64) -> PixelResult<f64> {
    let angle = spherical_vertex_angle(a, b, c)?;
    Ok(libm::asin((libm::sin(angle) * libm::sin(a)).clamp(-1.0, 1.0)))
}

fn enlarged_regions(
    tile: HealpixPixel,
    threshold_arcsec: f64,
    step: u32,
    pad_rad: f64,
) -> PixelResult<Option<Vec<TangentPolygon>>> {
    let regions = if tile.order() < SUBREGION_ORDER {
        tile.convert_to_higher_order(SUBREGION_ORDER - tile.order())?
    } else {
        vec![tile]
    };
    let scale = margin_scale(regions[0].order(), threshold_arcsec)?;

    let mut polygons = Vec::with_capacity(regions.len());
    for region in regions {
        match enlarged_polygon(region, scale, step) {
            Some(polygon) => polygons.push(polygon.widened(pad_rad)),
            None => {
                debug!(%tile, %region, "enlarged region not projectable, using perpendicular bisector only");
                return Ok(None);
            }
        }
    }
    Ok(Some(polygons))
}

fn enlarged_polygon(region: HealpixPixel, scale: f64, step: u32) -> Option<TangentPolygon> {
    let (centre_ra, centre_dec) = Nested.center(region.order(), region.pixel());
    let vertices: Vec<(f64, f64)> = Nested
        .boundary_samples(region.order(), region.pixel(), step)
        .into_iter()
        .map(|(ra, dec)| {
            let ra = unwrap_ra_about(ra, centre_ra);
            (
                centre_ra + scale * (ra - centre_ra),
                normalize_latitude(centre_dec + scale * (dec - centre_dec)),
            )
        })
        .collect();
    TangentPolygon::from_radec((centre_ra, centre_dec), &vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hipscat_core::constants::DEG_TO_RAD;

    /// Moves from `centre` through `through` and `offset_deg` beyond it, along the same great circle.
    fn step_outward(centre: (f64, f64), through: (f64, f64), offset_deg: f64) -> (f64, f64) {
        let c = Vector3::from_radec_deg(centre.0, centre.1);
        let b = Vector3::from_radec_deg(through.0, through.1);
        let tangent = (b * b.dot(&c) - c).normalize();
        let delta = offset_deg * DEG_TO_RAD;
        let p = b * libm::cos(delta) + tangent * libm::sin(delta);
        p.to_radec_deg()
    }

    fn point_off_mid_edge(order: u8, pixel: u64, offset_deg: f64) -> (f64, f64) {
        let samples = Nested.boundary_samples(order, pixel, 10);
        let centre = Nested.center(order, pixel);
        step_outward(centre, samples[5], offset_deg)
    }

    #[test]
    fn test_margin_scale_reference_values() {
        assert_relative_eq!(margin_scale(3, 360.0).unwrap(), 1.0274748806654526, epsilon = 1e-12);
        assert_relative_eq!(margin_scale(0, 360.0).unwrap(), 1.0034139979085752, epsilon = 1e-12);
        assert!(margin_scale(12, 1.0).unwrap() > 1.0);
    }

    #[test]
    fn test_margin_scale_rejects_bad_threshold() {
        assert!(matches!(margin_scale(3, 0.0), Err(PixelError::Range { .. })));
        assert!(matches!(margin_scale(3, -5.0), Err(PixelError::Range { .. })));
        assert!(margin_scale(3, f64::NAN).is_err());
        assert!(margin_scale(30, 10.0).is_err());
    }

    #[test]
    fn test_params_validate() {
        assert!(MarginParams::default().validate().is_ok());

        let params = MarginParams {
            boundary_step: 0,
            ..MarginParams::default()
        };
        assert!(params.validate().is_err());

        let params = MarginParams {
            order: 30,
            ..MarginParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_prefilter_regions() {
        let params = MarginParams::default();
        assert_eq!(MarginBounds::build(&params, 4).unwrap().prefilter_regions(), 16);
        assert_eq!(MarginBounds::build(&params, 0).unwrap().prefilter_regions(), 0);

        let params = MarginParams { order: 1, ..MarginParams::default() };
        assert_eq!(MarginBounds::build(&params, 20).unwrap().prefilter_regions(), 4);
        assert_eq!(MarginBounds::build(&params, 3).unwrap().prefilter_regions(), 0);

        let params = MarginParams { order: 3, ..MarginParams::default() };
        assert_eq!(MarginBounds::build(&params, 100).unwrap().prefilter_regions(), 1);

        let params = MarginParams {
            order: 3,
            strategy: MarginStrategy::PerpendicularBisector,
            ..MarginParams::default()
        };
        assert_eq!(MarginBounds::build(&params, 100).unwrap().prefilter_regions(), 0);
    }

    #[test]
    fn test_build_rejects_bad_pixel() {
        let params = MarginParams { order: 1, ..MarginParams::default() };
        assert!(matches!(MarginBounds::build(&params, 48), Err(PixelError::Range { .. })));
    }

    #[test]
    fn test_points_near_boundary() {
        for strategy in [MarginStrategy::BoundingBox, MarginStrategy::PerpendicularBisector] {
            for &(order, pixel) in &[(3u8, 100u64), (2, 100), (1, 20), (0, 5)] {
                let params = MarginParams {
                    order,
                    strategy,
                    ..MarginParams::default()
                };
                let bounds = MarginBounds::build(&params, pixel).unwrap();

                let (ra, dec) = point_off_mid_edge(order, pixel, 0.05);
                assert!(bounds.contains(ra, dec), "{:?} ({}, {}) near", strategy, order, pixel);

                let (ra, dec) = point_off_mid_edge(order, pixel, 0.4);
                assert!(!bounds.contains(ra, dec), "{:?} ({}, {}) far", strategy, order, pixel);
            }
        }
    }

    fn both_strategies(order: u8, pixel: u64) -> [MarginBounds; 2] {
        [MarginStrategy::BoundingBox, MarginStrategy::PerpendicularBisector].map(|strategy| {
            let params = MarginParams {
                order,
                strategy,
                ..MarginParams::default()
            };
            MarginBounds::build(&params, pixel).unwrap()
        })
    }

    #[test]
    fn test_strategies_agree_near_boundary() {
        for &(order, pixel) in &[(2u8, 5u64), (2, 7), (3, 4), (0, 4), (1, 20), (4, 1000)] {
            let [bounding_box, bisector] = both_strategies(order, pixel);
            let centre = Nested.center(order, pixel);
            let coords: Vec<(f64, f64)> = Nested
                .boundary_samples(order, pixel, 4)
                .into_iter()
                .flat_map(|sample| {
                    [0.05, 0.08, 0.095, 0.1, 0.12, 0.2]
                        .map(|offset| step_outward(centre, sample, offset))
                })
                .collect();
            assert_eq!(
                bounding_box.check(&coords).unwrap(),
                bisector.check(&coords).unwrap(),
                "({}, {})",
                order,
                pixel
            );
        }
    }

    #[test]
    fn test_bounding_box_keeps_points_inside_threshold() {
        let [bounding_box, bisector] = both_strategies(2, 5);
        assert!(bisector.contains(74.94286, 46.95623));
        assert!(bounding_box.contains(74.94286, 46.95623));

        let [bounding_box, bisector] = both_strategies(2, 7);
        assert!(bisector.contains(70.51964, 59.90143));
        assert!(bounding_box.contains(70.51964, 59.90143));
    }

    #[test]
    fn test_margin_fixture_order3() {
        let coords = [
            (42.4704538, 1.4593925),
            (56.25, 9.6),
            (56.25, 10.0),
            (50.61225197, 14.4767556),
        ];
        for bounds in both_strategies(3, 4) {
            assert_eq!(bounds.check(&coords).unwrap(), vec![false, true, false, true]);
        }
    }

    #[test]
    fn test_margin_fixture_order0() {
        let coords = [
            (142.4704538, 1.4593925),
            (45.09, 0.0),
            (45.2, 0.0),
            (37.31343956517391, 6.566326903165274),
            (42.649354753311535, 2.005185097251452),
            (32.62796809350278, 10.597884275167646),
            (39.89468227954832, 4.465967883812584),
            (27.718121934039974, 14.959672304191956),
        ];
        for bounds in both_strategies(0, 4) {
            assert_eq!(
                bounds.check(&coords).unwrap(),
                vec![false, true, false, true, true, true, true, true]
            );
        }
    }

    #[test]
    fn test_margin_fixture_poles() {
        let north = [(89.0, 89.9), (-179.0, 89.9), (-45.0, 85.0)];
        for bounds in both_strategies(0, 1) {
            assert_eq!(bounds.check(&north).unwrap(), vec![true, true, false]);
        }

        let south = [(89.0, -89.9), (-179.0, -89.9), (-45.0, -85.0)];
        for bounds in both_strategies(0, 9) {
            assert_eq!(bounds.check(&south).unwrap(), vec![true, true, false]);
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let threshold = 0.01;
        assert!(within_threshold(threshold, 0.0101, 0.001, threshold));

        // Right angle at the nearest sample: the perpendicular arc equals `a`.
        let a = threshold * (1.0 + 1e-9);
        let b = libm::acos(libm::cos(a) * libm::cos(0.001));
        assert!(!within_threshold(a, b, 0.001, threshold));
        assert!(!within_threshold(0.0111, 0.0112, 0.001, threshold));

        let h = perpendicular_distance(0.01, 0.0101, 0.001).unwrap();
        assert!(within_threshold(0.01, 0.0101, 0.001, h));
        assert!(!within_threshold(0.01, 0.0101, 0.001, h * (1.0 - 1e-12)));

        // Collapsed triangle: only the nearest-sample distance decides.
        assert!(within_threshold(threshold, threshold, 0.0, threshold));
        assert!(!within_threshold(0.0100001, 0.0100001, 0.0, threshold));
    }

    #[test]
    fn test_tile_centre_is_not_margin() {
        let params = MarginParams { order: 3, ..MarginParams::default() };
        let bounds = MarginBounds::build(&params, 100).unwrap();
        let (ra, dec) = Nested.center(3, 100);
        assert!(!bounds.contains(ra, dec));
    }

    #[test]
    fn test_polar_tile() {
        let params = MarginParams { order: 1, ..MarginParams::default() };
        let bounds = MarginBounds::build(&params, 3).unwrap();

        assert!(bounds.contains(45.0, 89.99));
        assert!(bounds.contains(135.0, 89.99));
        assert!(!bounds.contains(135.0, 80.0));
        assert!(!bounds.contains(45.0, 0.0));
    }

    #[test]
    fn test_check_batch() {
        let params = MarginParams { order: 3, ..MarginParams::default() };
        let bounds = MarginBounds::build(&params, 100).unwrap();

        let coords: Vec<(f64, f64)> = (0..200)
            .map(|i| point_off_mid_edge(3, 100, i as f64 * 0.005))
            .collect();
        let mask = bounds.check(&coords).unwrap();
        assert_eq!(mask.len(), coords.len());
        for (&(ra, dec), &inside) in coords.iter().zip(&mask) {
            assert_eq!(inside, bounds.contains(ra, dec));
        }
        assert!(mask[0]);
        assert!(!mask[199]);
    }

    #[test]
    fn test_check_empty_batch() {
        let bounds = MarginBounds::build(&MarginParams::default(), 5).unwrap();
        assert!(matches!(bounds.check(&[]), Err(PixelError::Argument { .. })));
    }

    #[test]
    fn test_perpendicular_distance_degenerate() {
        let err = perpendicular_distance(0.01, 0.01, 0.0).unwrap_err();
        assert!(err.is_recoverable());
        let h = perpendicular_distance(0.01, 0.0101, 0.001).unwrap();
        assert!(h > 0.0 && h <= 0.01);
    }
}
