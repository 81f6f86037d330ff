//! Configuration for the segmentation pipeline.

use crate::core::errors::{SegError, SegResult};
use serde::{Deserialize, Serialize};

/// Default continuity-alignment overlap threshold.
pub const DEFAULT_ALIGNMENT_THRESHOLD: f32 = 0.5;

/// Default intensity target range handed to the mask generator.
pub const DEFAULT_TARGET_RANGE: (f32, f32) = (0.0, 255.0);

/// Configuration for one stack's segmentation run.
///
/// Values are plain data: the stack source, mask generator, and output
/// directory are passed to the segmenter explicitly rather than held here,
/// so a single config can be shared across independent stacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Minimum overlap ratio for a current-slice label to inherit the
    /// identity of a previous-slice label.
    pub alignment_threshold: f32,
    /// Intensity range slices are rescaled into before mask generation.
    pub target_range: (f32, f32),
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            alignment_threshold: DEFAULT_ALIGNMENT_THRESHOLD,
            target_range: DEFAULT_TARGET_RANGE,
        }
    }
}

impl SegmentationConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the continuity-alignment threshold.
    pub fn with_alignment_threshold(mut self, threshold: f32) -> Self {
        self.alignment_threshold = threshold;
        self
    }

    /// Sets the normalization target range.
    pub fn with_target_range(mut self, lo: f32, hi: f32) -> Self {
        self.target_range = (lo, hi);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the threshold is not a finite
    /// value in `[0, 1]` or the target range is not finite.
    pub fn validate(&self) -> SegResult<()> {
        if !self.alignment_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.alignment_threshold)
        {
            return Err(SegError::config_error(format!(
                "alignment threshold must be in [0, 1], got {}",
                self.alignment_threshold
            )));
        }

        let (lo, hi) = self.target_range;
        if !lo.is_finite() || !hi.is_finite() {
            return Err(SegError::config_error(format!(
                "target range must be finite, got ({lo}, {hi})"
            )));
        }

        Ok(())
    }
}
