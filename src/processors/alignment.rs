//! Cross-slice label continuity alignment.
//!
//! The rasterizer assigns identifiers independently per slice, so the same
//! physical object can carry a different integer in consecutive slices.
//! This module re-maps the current slice's identifiers onto the previous
//! slice's wherever overlap evidence is strong enough, keeping a stable
//! per-object identity along the stack axis.
//!
//! The matching is a greedy, single-pass heuristic: each current label is
//! resolved independently against its best-overlapping previous label.
//! Two current labels can therefore map onto the same previous label, and
//! splits are not detected. This locality is intentional — an optimal
//! bipartite assignment over the overlap matrix would be a drop-in
//! replacement built on [`overlap_matrix`], but the greedy rule is the
//! shipped default.

use crate::core::errors::{SegError, SegResult};
use ndarray::{Array2, ArrayView2};
use std::collections::BTreeMap;

/// Pixel counts of each non-zero label in a label array.
pub fn label_counts(labels: ArrayView2<'_, u32>) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for &label in labels.iter() {
        if label != 0 {
            *counts.entry(label).or_insert(0) += 1;
        }
    }
    counts
}

/// Pairwise overlap counts between non-zero labels of two aligned arrays.
///
/// Keyed by `(current_label, previous_label)`; only co-occurrences where
/// both labels are non-zero are counted. This is the cost matrix an
/// optimal-assignment variant would consume.
pub fn overlap_matrix(
    previous: ArrayView2<'_, u32>,
    current: ArrayView2<'_, u32>,
) -> BTreeMap<(u32, u32), usize> {
    let mut overlaps = BTreeMap::new();
    for (&prev, &cur) in previous.iter().zip(current.iter()) {
        if prev != 0 && cur != 0 {
            *overlaps.entry((cur, prev)).or_insert(0) += 1;
        }
    }
    overlaps
}

/// Relabels `current` so object identities persist from `previous`.
///
/// For each non-zero label `L` in `current`, the previous-slice label with
/// the largest pixel count under `L`'s footprint is found; if that count
/// divided by `L`'s own pixel count reaches `threshold`, every pixel of
/// `L` takes the previous label. Labels with no non-zero overlap, or with
/// an overlap ratio below the threshold, are left unchanged. Background
/// (0) never participates. Equal overlap counts resolve to the smallest
/// previous label.
///
/// The result does not depend on label processing order: each label's
/// relabeling only writes pixels carrying that exact label in `current`.
///
/// # Errors
///
/// Returns [`SegError::InvalidInput`] if the two arrays differ in shape.
pub fn align_labels(
    previous: ArrayView2<'_, u32>,
    current: ArrayView2<'_, u32>,
    threshold: f32,
) -> SegResult<Array2<u32>> {
    if previous.dim() != current.dim() {
        return Err(SegError::invalid_input(format!(
            "label array shapes differ: previous {:?} vs current {:?}",
            previous.dim(),
            current.dim()
        )));
    }

    let counts = label_counts(current);
    let overlaps = overlap_matrix(previous, current);

    let mut remap: BTreeMap<u32, u32> = BTreeMap::new();
    for (&label, &count) in &counts {
        let mut best: Option<(u32, usize)> = None;
        for ((_, prev), &overlap) in overlaps.range((label, u32::MIN)..=(label, u32::MAX)) {
            // Strict comparison: ties resolve to the smallest previous
            // label, matching ascending iteration order.
            if best.is_none_or(|(_, best_count)| overlap > best_count) {
                best = Some((*prev, overlap));
            }
        }
        if let Some((best_prev, overlap_count)) = best {
            let overlap_ratio = overlap_count as f32 / count as f32;
            if overlap_ratio >= threshold {
                remap.insert(label, best_prev);
            }
        }
    }

    Ok(current.mapv(|label| *remap.get(&label).unwrap_or(&label)))
}
