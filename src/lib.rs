//! # stackseg
//!
//! Streaming instance segmentation of 2D/3D microscopy image stacks.
//! Large stacks are processed slice-by-slice to bound memory, with the
//! evolving label volume checkpointed to disk after every slice so a
//! crashed run can be resumed or inspected externally.
//!
//! ## Pipeline
//!
//! For each slice: normalize intensities against stack-wide limits,
//! obtain candidate instance masks from an external [`MaskGenerator`],
//! rasterize them into an integer label array (smaller objects win
//! overlapping pixels), align the labels against the previous slice so
//! object identities persist along the stack axis, and write the volume
//! to a checkpoint artifact that supersedes the previous one. At most one
//! intermediate checkpoint exists at a time; completion replaces it with
//! a terminal artifact.
//!
//! The segmentation model itself is out of scope: implement
//! [`MaskGenerator`] over whatever model produces candidate binary masks
//! with areas.
//!
//! ## Modules
//!
//! * [`core`] - Errors, configuration, and the mask generator trait
//! * [`domain`] - Candidate masks and the task/model registry
//! * [`processors`] - Normalization, rasterization, and label alignment
//! * [`pipeline`] - The checkpoint writer and the stack segmenter
//! * [`utils`] - Image/stack helpers and artifact naming
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stackseg::prelude::*;
//! use std::path::Path;
//!
//! # struct MyModel;
//! # impl MaskGenerator for MyModel {
//! #     fn generate(&self, _: &image::RgbImage) -> SegResult<Vec<CandidateMask>> {
//! #         Ok(vec![])
//! #     }
//! # }
//! # fn main() -> SegResult<()> {
//! let segmenter = StackSegmenter::new(
//!     MyModel,
//!     SegmentationConfig::default().with_alignment_threshold(0.5),
//! )?;
//! let volume = segmenter.segment_path(
//!     Path::new("stacks/cell_04.npy"),
//!     Path::new("out/masks"),
//! )?;
//! println!("{} labeled slices", volume.shape()[0]);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Commonly used types and functions.
pub mod prelude {
    pub use crate::core::{MaskGenerator, SegError, SegResult, SegmentationConfig};
    pub use crate::domain::{CandidateMask, ModelRegistry};
    pub use crate::pipeline::{CheckpointWriter, StackSegmenter};
    pub use crate::processors::{align_labels, data_range, normalize, overlap_matrix, rasterize};
    pub use crate::utils::{guess_rgb, read_stack, slice_to_rgb};
}

pub use crate::core::{MaskGenerator, SegError, SegResult, SegmentationConfig};
pub use crate::domain::CandidateMask;
pub use crate::pipeline::{CheckpointWriter, StackSegmenter};
