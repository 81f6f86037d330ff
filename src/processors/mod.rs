//! Per-slice processing: normalization, rasterization, and alignment.

pub mod alignment;
pub mod normalization;
pub mod rasterize;

pub use alignment::{align_labels, label_counts, overlap_matrix};
pub use normalization::{data_range, normalize};
pub use rasterize::rasterize;
