//! Candidate mask value type.

use ndarray::Array2;

/// One proposed object region from the segmentation model, before any
/// identity assignment.
#[derive(Debug, Clone)]
pub struct CandidateMask {
    /// Boolean region, same height and width as the source slice.
    pub region: Array2<bool>,
    /// Pixel count of the region, as reported by the generator.
    pub area: usize,
}

impl CandidateMask {
    /// Creates a candidate mask with an explicit area.
    ///
    /// Generators that report their own area statistic (possibly computed
    /// before post-filtering) can pass it through unchanged.
    pub fn new(region: Array2<bool>, area: usize) -> Self {
        Self { region, area }
    }

    /// Creates a candidate mask, deriving the area from the region.
    pub fn from_region(region: Array2<bool>) -> Self {
        let area = region.iter().filter(|&&m| m).count();
        Self { region, area }
    }
}
