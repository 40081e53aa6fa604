//! Histogram binning and partition alignment.

pub mod alignment;
pub mod histogram;

pub use alignment::{
    generate_alignment, AlignmentEntry, AlignmentParams, AlignmentTable, Destination,
};
pub use histogram::{empty_histogram, generate_histogram, SparseHistogram};
