//! 64-bit spatial identifiers.
//!
//! ```text
//! |<-------  pixel at order 19 (42 bits)  ------->|<-- counter (22 bits) -->|
//! ```
//!
//! The high bits hold the NEST pixel at [`HIPSCAT_ID_HEALPIX_ORDER`], so
//! sorting identifiers sorts points along the NEST curve and any coarser pixel
//! is a contiguous identifier range. The low [`HIPSCAT_ID_COUNTER_BITS`] bits
//! separate points that share an order-19 pixel: the `k`-th point (in input
//! order) landing in a pixel gets counter `k`.
//!
//! ```
//! use hipscat_pixel::hipscat_id::compute_hipscat_id;
//!
//! let ids = compute_hipscat_id(&[(5.0, 5.0), (1.0, 1.0), (5.0, 5.0)]).unwrap();
//! assert_eq!(ids, vec![5482513871577022464, 5476738131329810432, 5482513871577022465]);
//! ```

use rayon::prelude::*;

use hipscat_core::{PixelError, PixelResult};

use crate::healpix::{Nested, SpherePixelization};
use crate::order::{validate_order, validate_pixel};

pub const HIPSCAT_ID_HEALPIX_ORDER: u8 = 19;

/// `64 − (4 + 2·19)`: the order-19 pixel needs 4 bits for the base face plus 2 per order.
pub const HIPSCAT_ID_COUNTER_BITS: u32 = 64 - (4 + 2 * HIPSCAT_ID_HEALPIX_ORDER as u32);

pub const HIPSCAT_ID_MAX: u64 = u64::MAX;

const MAX_COUNTER: u64 = (1u64 << HIPSCAT_ID_COUNTER_BITS) - 1;

/// Bits to drop from an identifier to leave the pixel at `order`.
fn order_shift(order: u8) -> u32 {
    64 - (4 + 2 * order as u32)
}

/// Identifiers for a batch of (RA, Dec) positions in degrees.
///
/// # Errors
///
/// [`PixelError::Argument`] for an empty batch; [`PixelError::Overflow`] if
/// more than `2^22` points share one order-19 pixel.
pub fn compute_hipscat_id(coords: &[(f64, f64)]) -> PixelResult<Vec<u64>> {
    if coords.is_empty() {
        return Err(PixelError::argument("compute_hipscat_id", "coordinate batch is empty"));
    }
    let pixels: Vec<u64> = coords
        .par_iter()
        .map(|&(ra, dec)| Nested.ang2pix(HIPSCAT_ID_HEALPIX_ORDER, ra, dec))
        .collect();
    let counters = assign_counters(&pixels)?;
    let shift = order_shift(HIPSCAT_ID_HEALPIX_ORDER);
    Ok(pixels
        .iter()
        .zip(&counters)
        .map(|(&pixel, &counter)| (pixel << shift) + counter)
        .collect())
}

/// Duplicate counters for a sequence of pixel values.
///
/// Each value's occurrences are numbered 0, 1, 2, ... in input order; the
/// result is aligned with the input.
///
/// ```
/// use hipscat_pixel::hipscat_id::assign_counters;
///
/// let counters = assign_counters(&[0xbeee, 0xbeef, 0xbeee, 0xfeed, 0xbeef]).unwrap();
/// assert_eq!(counters, vec![0, 0, 1, 0, 1]);
/// ```
pub fn assign_counters(pixels: &[u64]) -> PixelResult<Vec<u64>> {
    let mut order: Vec<usize> = (0..pixels.len()).collect();
    order.par_sort_by_key(|&i| pixels[i]);

    let mut counters = vec![0u64; pixels.len()];
    let mut run_start = 0usize;
    for (rank, &i) in order.iter().enumerate() {
        if rank > 0 && pixels[order[rank - 1]] != pixels[i] {
            run_start = rank;
        }
        let counter = (rank - run_start) as u64;
        if counter > MAX_COUNTER {
            return Err(PixelError::overflow(
                "assign_counters",
                format!(
                    "pixel {} has more than {} duplicates ({} counter bits)",
                    pixels[i],
                    MAX_COUNTER + 1,
                    HIPSCAT_ID_COUNTER_BITS
                ),
            ));
        }
        counters[i] = counter;
    }
    Ok(counters)
}

/// Pixel at `target_order` that each identifier falls in.
pub fn hipscat_id_to_healpix(ids: &[u64], target_order: u8) -> PixelResult<Vec<u64>> {
    validate_order("hipscat_id_to_healpix", target_order)?;
    let shift = order_shift(target_order);
    Ok(ids.iter().map(|&id| id >> shift).collect())
}

/// Identifier of the first order-19 descendant of `pixel`, plus `counter`.
///
/// Useful as a range bound: every point inside `pixel` has an identifier in
/// `healpix_to_hipscat_id(order, pixel, 0)..healpix_to_hipscat_id(order, pixel + 1, 0)`.
pub fn healpix_to_hipscat_id(order: u8, pixel: u64, counter: u64) -> PixelResult<u64> {
    if order > HIPSCAT_ID_HEALPIX_ORDER {
        return Err(PixelError::range(
            "healpix_to_hipscat_id",
            format!("order {} exceeds {}", order, HIPSCAT_ID_HEALPIX_ORDER),
        ));
    }
    validate_pixel("healpix_to_hipscat_id", order, pixel)?;
    if counter > MAX_COUNTER {
        return Err(PixelError::overflow(
            "healpix_to_hipscat_id",
            format!("counter {} needs more than {} bits", counter, HIPSCAT_ID_COUNTER_BITS),
        ));
    }
    let fine = pixel << (2 * (HIPSCAT_ID_HEALPIX_ORDER - order) as u32);
    Ok((fine << order_shift(HIPSCAT_ID_HEALPIX_ORDER)) + counter)
}
