//! The streaming segmentation pipeline: checkpoint writer and segmenter.

pub mod checkpoint;
pub mod segmenter;

pub use checkpoint::CheckpointWriter;
pub use segmenter::StackSegmenter;
