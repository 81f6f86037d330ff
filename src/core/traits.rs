//! The mask generator trait — the seam to the external segmentation model.
//!
//! The segmentation model itself (network weights, runtime, prompting) is
//! a caller concern. The pipeline only requires a capability that turns a
//! 3-channel 8-bit slice into an unordered set of candidate instance
//! masks. The model must already be loaded and parameterized before the
//! segmenter is invoked.

use crate::core::errors::SegResult;
use crate::domain::CandidateMask;
use image::RgbImage;

/// Produces candidate instance masks for a single 2D slice.
///
/// Implementations are invoked once per slice, strictly in slice order.
/// Candidate order matters only for area ties during rasterization, where
/// generator output order is preserved.
pub trait MaskGenerator: Send + Sync {
    /// Generates candidate masks for one slice.
    ///
    /// Every returned region must have the same height and width as the
    /// input slice.
    fn generate(&self, slice: &RgbImage) -> SegResult<Vec<CandidateMask>>;
}

impl<G: MaskGenerator + ?Sized> MaskGenerator for &G {
    fn generate(&self, slice: &RgbImage) -> SegResult<Vec<CandidateMask>> {
        (**self).generate(slice)
    }
}
