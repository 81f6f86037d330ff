//! Candidate mask rasterization.
//!
//! Collapses one slice's unordered candidate set into a single integer
//! label array. Candidates are painted in area-descending order, so on any
//! pixel covered by multiple candidates the smallest-area candidate wins.
//! Small objects are assumed to be detail sitting on top of larger ones;
//! this precedence is part of the contract, not an artifact. The sort is
//! stable, so candidates with equal areas keep generator output order.

use crate::core::errors::{SegError, SegResult};
use crate::domain::CandidateMask;
use ndarray::{Array2, Zip};

/// Rasterizes a slice's candidate masks into a label array.
///
/// Identifiers 1..N are assigned in area-descending order; 0 is
/// background. Identifiers are unique within the slice only — continuity
/// across slices is the aligner's job.
///
/// # Errors
///
/// Returns [`SegError::EmptyInput`] for an empty candidate set (the
/// output shape would be undefined) and [`SegError::InvalidInput`] if the
/// candidate regions disagree on shape.
pub fn rasterize(candidates: &[CandidateMask]) -> SegResult<Array2<u32>> {
    if candidates.is_empty() {
        return Err(SegError::empty_input("no candidate masks to rasterize"));
    }

    let mut order: Vec<&CandidateMask> = candidates.iter().collect();
    // Stable: equal areas keep generator output order.
    order.sort_by(|a, b| b.area.cmp(&a.area));

    let shape = order[0].region.dim();
    for candidate in &order {
        if candidate.region.dim() != shape {
            return Err(SegError::invalid_input(format!(
                "candidate region shape {:?} does not match slice shape {:?}",
                candidate.region.dim(),
                shape
            )));
        }
    }

    let mut labels = Array2::<u32>::zeros(shape);
    for (i, candidate) in order.iter().enumerate() {
        let id = (i + 1) as u32;
        Zip::from(&mut labels)
            .and(&candidate.region)
            .for_each(|label, &covered| {
                if covered {
                    *label = id;
                }
            });
    }

    Ok(labels)
}
