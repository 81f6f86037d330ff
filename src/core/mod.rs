//! Core error handling, configuration, and the mask generator seam.

pub mod config;
pub mod errors;
pub mod traits;

pub use config::{DEFAULT_ALIGNMENT_THRESHOLD, DEFAULT_TARGET_RANGE, SegmentationConfig};
pub use errors::{SegError, SegResult};
pub use traits::MaskGenerator;
