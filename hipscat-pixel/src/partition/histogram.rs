//! Object-count histograms over the pixels of one order.
//!
//! A dense histogram is a plain `Vec<u64>` of length `pixel_count(order)`,
//! indexed by NEST pixel. [`SparseHistogram`] holds only the non-zero bins and
//! is the convenient form for accumulating partial counts from many input
//! chunks before densifying once.

use std::collections::BTreeMap;

use rayon::prelude::*;

use hipscat_core::{PixelError, PixelResult};

use crate::healpix::{Nested, SpherePixelization};
use crate::order::{pixel_count, validate_pixel};

/// All-zero histogram for `order`.
pub fn empty_histogram(order: u8) -> PixelResult<Vec<u64>> {
    Ok(vec![0; pixel_count(order)? as usize])
}

/// Counts the (RA, Dec) positions falling in each pixel at `order`.
///
/// ```
/// use hipscat_pixel::partition::generate_histogram;
///
/// let histogram = generate_histogram(&[(282.5, -58.5), (299.5, -48.5)], 0).unwrap();
/// assert_eq!(histogram, vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2]);
/// ```
pub fn generate_histogram(coords: &[(f64, f64)], order: u8) -> PixelResult<Vec<u64>> {
    let mut histogram = empty_histogram(order)?;
    let pixels: Vec<u64> = coords
        .par_iter()
        .map(|&(ra, dec)| Nested.ang2pix(order, ra, dec))
        .collect();
    for pixel in pixels {
        histogram[pixel as usize] += 1;
    }
    Ok(histogram)
}

/// Histogram storing only non-zero bins.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseHistogram {
    order: u8,
    counts: BTreeMap<u64, u64>,
}

impl SparseHistogram {
    pub fn make_empty(order: u8) -> PixelResult<Self> {
        pixel_count(order)?;
        Ok(Self {
            order,
            counts: BTreeMap::new(),
        })
    }

    /// Histogram with `counts[k]` objects at pixel `indexes[k]`.
    ///
    /// Repeated indexes accumulate.
    pub fn make_from_counts(indexes: &[u64], counts: &[u64], order: u8) -> PixelResult<Self> {
        if indexes.len() != counts.len() {
            return Err(PixelError::argument(
                "SparseHistogram::make_from_counts",
                format!(
                    "{} indexes but {} counts",
                    indexes.len(),
                    counts.len()
                ),
            ));
        }
        let mut histogram = Self::make_empty(order)?;
        for (&index, &count) in indexes.iter().zip(counts) {
            validate_pixel("SparseHistogram::make_from_counts", order, index)?;
            histogram.insert(index, count);
        }
        Ok(histogram)
    }

    fn insert(&mut self, index: u64, count: u64) {
        if count > 0 {
            *self.counts.entry(index).or_insert(0) += count;
        }
    }

    pub fn order(&self) -> u8 {
        self.order
    }

    pub fn get(&self, index: u64) -> u64 {
        self.counts.get(&index).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Adds `other` into this histogram; both must share an order.
    pub fn add(&mut self, other: &SparseHistogram) -> PixelResult<()> {
        if self.order != other.order {
            return Err(PixelError::argument(
                "SparseHistogram::add",
                format!(
                    "histogram orders differ ({} vs {})",
                    self.order, other.order
                ),
            ));
        }
        for (&index, &count) in &other.counts {
            self.insert(index, count);
        }
        Ok(())
    }

    /// Dense form, `pixel_count(order)` bins long.
    pub fn to_array(&self) -> PixelResult<Vec<u64>> {
        let mut dense = empty_histogram(self.order)?;
        for (&index, &count) in &self.counts {
            dense[index as usize] = count;
        }
        Ok(dense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_histogram() {
        assert_eq!(empty_histogram(0).unwrap(), vec![0; 12]);
        assert_eq!(empty_histogram(2).unwrap().len(), 192);
        assert!(empty_histogram(30).is_err());
    }

    #[test]
    fn test_generate_histogram_order2() {
        let histogram = generate_histogram(&[(282.5, -58.5), (299.5, -48.5)], 2).unwrap();
        assert_eq!(histogram[184], 1);
        assert_eq!(histogram[185], 1);
        assert_eq!(histogram.iter().sum::<u64>(), 2);
    }

    #[test]
    fn test_generate_histogram_empty_input() {
        assert_eq!(generate_histogram(&[], 0).unwrap(), vec![0; 12]);
    }

    #[test]
    fn test_sparse_from_counts() {
        let sparse = SparseHistogram::make_from_counts(&[1, 8], &[4, 9], 0).unwrap();
        assert_eq!(sparse.to_array().unwrap(), vec![0, 4, 0, 0, 0, 0, 0, 0, 9, 0, 0, 0]);
        assert_eq!(sparse.get(8), 9);
        assert_eq!(sparse.get(2), 0);
        assert_eq!(sparse.total(), 13);
    }

    #[test]
    fn test_sparse_from_counts_errors() {
        assert!(matches!(
            SparseHistogram::make_from_counts(&[1, 8], &[4], 0),
            Err(PixelError::Argument { .. })
        ));
        assert!(matches!(
            SparseHistogram::make_from_counts(&[12], &[4], 0),
            Err(PixelError::Range { .. })
        ));
    }

    #[test]
    fn test_sparse_add() {
        let mut total = SparseHistogram::make_empty(0).unwrap();
        let a = SparseHistogram::make_from_counts(&[1, 8], &[4, 9], 0).unwrap();
        let b = SparseHistogram::make_from_counts(&[1, 11], &[1, 2], 0).unwrap();
        total.add(&a).unwrap();
        total.add(&b).unwrap();
        assert_eq!(total.to_array().unwrap(), vec![0, 5, 0, 0, 0, 0, 0, 0, 9, 0, 0, 2]);

        let other_order = SparseHistogram::make_empty(1).unwrap();
        assert!(matches!(total.add(&other_order), Err(PixelError::Argument { .. })));
    }

    #[test]
    fn test_sparse_to_array_length() {
        for order in 0..=4 {
            let sparse = SparseHistogram::make_empty(order).unwrap();
            assert_eq!(sparse.to_array().unwrap().len() as u64, pixel_count(order).unwrap());
        }
    }

    #[test]
    fn test_sparse_matches_dense() {
        let coords = [(282.5, -58.5), (299.5, -48.5), (10.0, 10.0), (10.0, 10.0)];
        let dense = generate_histogram(&coords, 3).unwrap();
        let indexes: Vec<u64> = (0..dense.len() as u64).filter(|&i| dense[i as usize] > 0).collect();
        let counts: Vec<u64> = indexes.iter().map(|&i| dense[i as usize]).collect();
        let sparse = SparseHistogram::make_from_counts(&indexes, &counts, 3).unwrap();
        assert_eq!(sparse.to_array().unwrap(), dense);
    }
}
