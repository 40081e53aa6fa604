//! Error types for pixel-index computations.
//!
//! This module provides a unified error type [`PixelError`] covering the failure
//! modes of the partitioning math: out-of-range orders and thresholds, identifier
//! counters that outgrow their bit budget, degenerate spherical triangles, and
//! malformed input arrays.
//!
//! # Error Categories
//!
//! | Variant | Use Case | Recoverable? |
//! |---------|----------|--------------|
//! | [`Range`](PixelError::Range) | Order > 29, `lowest_order > highest_order`, zero threshold | No |
//! | [`Overflow`](PixelError::Overflow) | Duplicate counter exceeds its bit field | No |
//! | [`DegenerateGeometry`](PixelError::DegenerateGeometry) | Zero-length arc in a bisector computation | Yes |
//! | [`Argument`](PixelError::Argument) | Empty or mis-sized input arrays, bad edge ids | No |
//!
//! `DegenerateGeometry` is recoverable in the sense that the caller that raises
//! it always has a local fallback (the nearest-sample distance); it never
//! crosses the public margin API.
//!
//! # Usage
//!
//! Most functions return [`PixelResult<T>`], which is `Result<T, PixelError>`.
//!
//! ```
//! use hipscat_core::{PixelError, PixelResult};
//!
//! fn checked_order(order: u8) -> PixelResult<u8> {
//!     if order > 29 {
//!         return Err(PixelError::range("checked_order", format!("order {} exceeds 29", order)));
//!     }
//!     Ok(order)
//! }
//!
//! assert!(checked_order(30).is_err());
//! ```

use thiserror::Error;

/// Convenience alias for `Result<T, PixelError>`.
pub type PixelResult<T> = Result<T, PixelError>;

/// Unified error type for pixel-index computations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PixelError {
    /// An order, threshold or index is outside its valid range.
    #[error("Range error in {operation}: {message}")]
    Range { operation: String, message: String },

    /// A packed identifier field ran out of bits.
    #[error("Overflow in {operation}: {message}")]
    Overflow { operation: String, message: String },

    /// A spherical triangle collapsed (zero-length side); the result is undefined.
    #[error("Degenerate geometry in {operation}: {message}")]
    DegenerateGeometry { operation: String, message: String },

    /// Input arrays are empty, mismatched, or otherwise malformed.
    #[error("Invalid argument to {operation}: {message}")]
    Argument { operation: String, message: String },
}

impl PixelError {
    /// Creates a [`Range`](Self::Range) error.
    pub fn range(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Range {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates an [`Overflow`](Self::Overflow) error.
    pub fn overflow(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Overflow {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a [`DegenerateGeometry`](Self::DegenerateGeometry) error.
    pub fn degenerate_geometry(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates an [`Argument`](Self::Argument) error.
    pub fn argument(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Argument {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if a local fallback exists for this failure.
    ///
    /// Only [`DegenerateGeometry`](Self::DegenerateGeometry) qualifies. Retrying any
    /// other variant with the same input yields the same error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DegenerateGeometry { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error() {
        let err = PixelError::range("pixel_count", "order 30 exceeds maximum 29");
        assert_eq!(
            err.to_string(),
            "Range error in pixel_count: order 30 exceeds maximum 29"
        );
    }

    #[test]
    fn test_overflow_error() {
        let err = PixelError::overflow("assign_counters", "counter 4194304 needs more than 22 bits");
        assert!(err.to_string().contains("Overflow in assign_counters"));
        assert!(err.to_string().contains("22 bits"));
    }

    #[test]
    fn test_degenerate_geometry_error() {
        let err = PixelError::degenerate_geometry("bisector_distance", "zero-length arc");
        assert!(err.to_string().contains("Degenerate geometry"));
        assert!(err.to_string().contains("zero-length arc"));
    }

    #[test]
    fn test_argument_error() {
        let err = PixelError::argument("generate_alignment", "histogram is empty");
        assert!(err
            .to_string()
            .contains("Invalid argument to generate_alignment"));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(PixelError::degenerate_geometry("a", "b").is_recoverable());
        assert!(!PixelError::range("a", "b").is_recoverable());
        assert!(!PixelError::overflow("a", "b").is_recoverable());
        assert!(!PixelError::argument("a", "b").is_recoverable());
    }

    #[test]
    fn test_send_sync() {
        fn _assert_send<T: Send>() {}
        fn _assert_sync<T: Sync>() {}
        _assert_send::<PixelError>();
        _assert_sync::<PixelError>();
    }
}
