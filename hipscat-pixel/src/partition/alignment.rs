//! Merging fine histogram bins into balanced partitions.
//!
//! Given object counts at `highest_order`, every fine pixel is mapped to a
//! *destination*: the coarsest ancestor (no coarser than `lowest_order`) whose
//! subtree holds at most `threshold` objects. Working top-down, a pixel
//!
//! 1. inherits its parent's destination if the parent has one;
//! 2. otherwise gets none if its subtree is empty;
//! 3. otherwise becomes a destination if its subtree count is within the
//!    threshold, or if it is already at `highest_order` and cannot be split.
//!
//! This is exactly the bottom-up greedy merge of sibling quartets: a group of
//! four merges into its parent precisely when the parent's total fits.
//!
//! Subtree counts are reduced level by level with `par_chunks(4)`; each level
//! of the top-down pass is also evaluated in parallel.

use rayon::prelude::*;
use tracing::{debug, warn};

use hipscat_core::{PixelError, PixelResult};

use crate::order::{pixel_count, validate_order};

/// Parameters for [`generate_alignment`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignmentParams {
    /// Order of the input histogram, and the finest destination order.
    pub highest_order: u8,
    /// Coarsest destination order.
    pub lowest_order: u8,
    /// Maximum objects per destination, except forced leaves at `highest_order`.
    pub threshold: u64,
}

impl Default for AlignmentParams {
    fn default() -> Self {
        Self {
            highest_order: 10,
            lowest_order: 0,
            threshold: 1_000_000,
        }
    }
}

impl AlignmentParams {
    pub fn validate(&self) -> PixelResult<()> {
        validate_order("AlignmentParams::validate", self.highest_order)?;
        if self.lowest_order > self.highest_order {
            return Err(PixelError::range(
                "AlignmentParams::validate",
                format!(
                    "lowest_order {} exceeds highest_order {}",
                    self.lowest_order, self.highest_order
                ),
            ));
        }
        if self.threshold == 0 {
            return Err(PixelError::range(
                "AlignmentParams::validate",
                "threshold must be positive",
            ));
        }
        Ok(())
    }
}

/// A partition that fine pixels are merged into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Destination {
    pub order: u8,
    pub pixel: u64,
    /// Objects in the whole destination subtree.
    pub row_count: u64,
}

impl Destination {
    /// Range of `highest_order` pixels covered by this destination.
    pub fn fine_range(&self, highest_order: u8) -> std::ops::Range<u64> {
        let shift = 2 * (highest_order - self.order) as u32;
        (self.pixel << shift)..((self.pixel + 1) << shift)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignmentEntry {
    pub destination: Destination,
    /// Rank among the destination's non-empty fine pixels; `None` for an empty fine pixel.
    pub position: Option<u64>,
}

/// Per-fine-pixel destinations produced by [`generate_alignment`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignmentTable {
    highest_order: u8,
    entries: Vec<Option<AlignmentEntry>>,
}

impl AlignmentTable {
    pub fn highest_order(&self) -> u8 {
        self.highest_order
    }

    pub fn entries(&self) -> &[Option<AlignmentEntry>] {
        &self.entries
    }

    pub fn get(&self, fine_pixel: u64) -> Option<&AlignmentEntry> {
        self.entries.get(fine_pixel as usize)?.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct destinations, in ascending order of the fine pixels they cover.
    pub fn destinations(&self) -> Vec<Destination> {
        let mut destinations: Vec<Destination> = Vec::new();
        for entry in self.entries.iter().flatten() {
            if destinations.last() != Some(&entry.destination) {
                destinations.push(entry.destination);
            }
        }
        destinations
    }

    /// Each destination with the indexes of its non-empty fine pixels.
    pub fn destination_pixel_map(&self, histogram: &[u64]) -> PixelResult<Vec<(Destination, Vec<u64>)>> {
        if histogram.len() != self.entries.len() {
            return Err(PixelError::argument(
                "destination_pixel_map",
                format!(
                    "histogram has {} bins, alignment has {}",
                    histogram.len(),
                    self.entries.len()
                ),
            ));
        }
        Ok(self
            .destinations()
            .into_iter()
            .map(|destination| {
                let fine = destination
                    .fine_range(self.highest_order)
                    .filter(|&i| histogram[i as usize] > 0)
                    .collect();
                (destination, fine)
            })
            .collect())
    }
}

/// Maps every bin of `histogram` (at `params.highest_order`) to its destination.
///
/// # Errors
///
/// [`PixelError::Range`] for invalid parameters; [`PixelError::Argument`] if
/// the histogram is empty or not `pixel_count(highest_order)` long.
///
/// ```
/// use hipscat_pixel::partition::{generate_alignment, AlignmentParams};
///
/// let mut histogram = vec![0u64; 48];
/// histogram[44..].copy_from_slice(&[42, 29, 42, 18]);
/// let params = AlignmentParams { highest_order: 1, lowest_order: 0, threshold: 250 };
///
/// let table = generate_alignment(&histogram, &params).unwrap();
/// let entry = table.get(45).unwrap();
/// assert_eq!((entry.destination.order, entry.destination.pixel), (0, 11));
/// assert_eq!(entry.destination.row_count, 131);
/// assert_eq!(entry.position, Some(1));
/// assert!(table.get(0).is_none());
/// ```
pub fn generate_alignment(histogram: &[u64], params: &AlignmentParams) -> PixelResult<AlignmentTable> {
    params.validate()?;
    if histogram.is_empty() {
        return Err(PixelError::argument("generate_alignment", "histogram is empty"));
    }
    let expected = pixel_count(params.highest_order)?;
    if histogram.len() as u64 != expected {
        return Err(PixelError::argument(
            "generate_alignment",
            format!(
                "histogram has {} bins, order {} needs {}",
                histogram.len(),
                params.highest_order,
                expected
            ),
        ));
    }

    let sums = level_sums(histogram, params.highest_order - params.lowest_order);
    let destinations = assign_destinations(&sums, params);
    let entries = assign_positions(histogram, destinations);
    let table = AlignmentTable {
        highest_order: params.highest_order,
        entries,
    };

    let found = table.destinations();
    debug!(
        destinations = found.len(),
        min_order = found.iter().map(|d| d.order).min(),
        max_order = found.iter().map(|d| d.order).max(),
        "generated alignment"
    );
    Ok(table)
}

/// Subtree counts from `highest_order` up `levels` orders; index 0 is the coarsest.
fn level_sums(histogram: &[u64], levels: u8) -> Vec<Vec<u64>> {
    let mut sums = vec![histogram.to_vec()];
    for _ in 0..levels {
        let finer = &sums[sums.len() - 1];
        let coarser: Vec<u64> = finer.par_chunks(4).map(|quad| quad.iter().sum()).collect();
        sums.push(coarser);
    }
    sums.reverse();
    sums
}

fn assign_destinations(sums: &[Vec<u64>], params: &AlignmentParams) -> Vec<Option<Destination>> {
    let mut parent: Vec<Option<Destination>> = Vec::new();
    for (level, counts) in sums.iter().enumerate() {
        let order = params.lowest_order + level as u8;
        let at_leaf = order == params.highest_order;
        parent = counts
            .par_iter()
            .enumerate()
            .map(|(index, &count)| {
                if let Some(inherited) = parent.get(index >> 2).copied().flatten() {
                    return Some(inherited);
                }
                if count == 0 || (count > params.threshold && !at_leaf) {
                    return None;
                }
                if count > params.threshold {
                    warn!(
                        order,
                        pixel = index,
                        count,
                        threshold = params.threshold,
                        "pixel exceeds threshold at highest order, keeping as leaf"
                    );
                }
                Some(Destination {
                    order,
                    pixel: index as u64,
                    row_count: count,
                })
            })
            .collect();
    }
    parent
}

fn assign_positions(histogram: &[u64], destinations: Vec<Option<Destination>>) -> Vec<Option<AlignmentEntry>> {
    let mut current: Option<Destination> = None;
    let mut next_position = 0u64;
    destinations
        .into_iter()
        .zip(histogram)
        .map(|(destination, &count)| {
            let destination = destination?;
            if current != Some(destination) {
                current = Some(destination);
                next_position = 0;
            }
            let position = if count > 0 {
                next_position += 1;
                Some(next_position - 1)
            } else {
                None
            };
            Some(AlignmentEntry {
                destination,
                position,
            })
        })
        .collect()
}
