//! The `(order, pixel)` value type and hierarchy helpers.

use std::fmt;

use hipscat_core::{PixelError, PixelResult};

use crate::order::{validate_order, validate_pixel, MAX_ORDER};

/// A single NEST pixel at a given order.
///
/// Ordering compares `order` first, then `pixel`. For a breadth-first order
/// that interleaves orders by sky position, use [`breadth_first_argsort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealpixPixel {
    order: u8,
    pixel: u64,
}

impl HealpixPixel {
    pub fn new(order: u8, pixel: u64) -> PixelResult<Self> {
        validate_pixel("HealpixPixel::new", order, pixel)?;
        Ok(Self { order, pixel })
    }

    #[inline]
    pub fn order(&self) -> u8 {
        self.order
    }

    #[inline]
    pub fn pixel(&self) -> u64 {
        self.pixel
    }

    /// The pixel one order up, or `None` at order 0.
    pub fn parent(&self) -> Option<Self> {
        self.convert_to_lower_order(1).ok()
    }

    pub fn convert_to_lower_order(&self, delta_order: u8) -> PixelResult<Self> {
        if delta_order > self.order {
            return Err(PixelError::range(
                "convert_to_lower_order",
                format!(
                    "cannot lower order {} by {}",
                    self.order, delta_order
                ),
            ));
        }
        Ok(Self {
            order: self.order - delta_order,
            pixel: self.pixel >> (2 * delta_order as u32),
        })
    }

    /// All `4^delta_order` descendants, in ascending index order.
    pub fn convert_to_higher_order(&self, delta_order: u8) -> PixelResult<Vec<Self>> {
        let target = self.order.checked_add(delta_order).unwrap_or(u8::MAX);
        validate_order("convert_to_higher_order", target)?;
        let shift = 2 * delta_order as u32;
        let first = self.pixel << shift;
        Ok((first..first + (1u64 << shift))
            .map(|pixel| Self {
                order: target,
                pixel,
            })
            .collect())
    }

    /// True if `other` is this pixel or one of its descendants.
    pub fn contains(&self, other: &Self) -> bool {
        other.order >= self.order && other.pixel >> (2 * (other.order - self.order) as u32) == self.pixel
    }
}

impl fmt::Display for HealpixPixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Order: {}, Pixel: {}", self.order, self.pixel)
    }
}

/// Indices that sort `pixels` breadth-first through the pixel hierarchy.
///
/// Each pixel is keyed by its first descendant at the deepest order present,
/// so pixels follow the NEST curve regardless of order. A pixel and its
/// first-child chain share a key; ties keep input order.
///
/// ```
/// use hipscat_pixel::{breadth_first_argsort, HealpixPixel};
///
/// let pixels = [
///     HealpixPixel::new(1, 5).unwrap(),
///     HealpixPixel::new(0, 0).unwrap(),
///     HealpixPixel::new(1, 4).unwrap(),
/// ];
/// assert_eq!(breadth_first_argsort(&pixels), vec![1, 2, 0]);
/// ```
pub fn breadth_first_argsort(pixels: &[HealpixPixel]) -> Vec<usize> {
    let max_order = pixels.iter().map(|p| p.order).max().unwrap_or(0).min(MAX_ORDER);
    let mut indices: Vec<usize> = (0..pixels.len()).collect();
    indices.sort_by_key(|&i| {
        let p = pixels[i];
        p.pixel << (2 * (max_order - p.order) as u32)
    });
    indices
}
