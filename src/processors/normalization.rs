//! Slice intensity normalization.
//!
//! Slices are rescaled into a fixed target range before being handed to
//! the mask generator. The source range is computed once for the entire
//! stack (not per slice), so that intensity scaling is consistent across
//! slices and an object does not change appearance between neighbours.

use ndarray::{Array, ArrayView, Dimension};

/// Computes the intensity range of a whole stack.
///
/// Returns `(min, max)`. An empty array yields `(0.0, 0.0)`, which
/// downstream normalization treats as a degenerate zero-width range.
pub fn data_range<D: Dimension>(data: ArrayView<'_, f32, D>) -> (f32, f32) {
    let mut iter = data.iter().copied();
    let Some(first) = iter.next() else {
        return (0.0, 0.0);
    };
    iter.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x)))
}

/// Linearly rescales a slice from `source` into `target`.
///
/// A zero-width source or target range yields an all-zero slice of the
/// same shape; this degenerate case never fails. No side effects.
pub fn normalize<D: Dimension>(
    slice: ArrayView<'_, f32, D>,
    source: (f32, f32),
    target: (f32, f32),
) -> Array<f32, D> {
    let (src_lo, src_hi) = source;
    let (tgt_lo, tgt_hi) = target;
    if src_lo == src_hi || tgt_lo == tgt_hi {
        return Array::zeros(slice.raw_dim());
    }
    let scale = (tgt_hi - tgt_lo) / (src_hi - src_lo);
    slice.mapv(|x| (x - src_lo) * scale + tgt_lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_rescale() {
        let slice = array![[0.0_f32, 5.0], [10.0, 2.5]];
        let out = normalize(slice.view(), (0.0, 10.0), (0.0, 255.0));
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[0, 1]], 127.5);
        assert_eq!(out[[1, 0]], 255.0);
        assert_eq!(out[[1, 1]], 63.75);
    }

    #[test]
    fn test_zero_width_source_range_yields_zeros() {
        let slice = array![[5.0_f32, 5.0], [5.0, 5.0]];
        let out = normalize(slice.view(), (5.0, 5.0), (0.0, 255.0));
        assert_eq!(out.dim(), (2, 2));
        assert!(out.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_zero_width_target_range_yields_zeros() {
        let slice = array![[1.0_f32, 2.0]];
        let out = normalize(slice.view(), (0.0, 10.0), (3.0, 3.0));
        assert!(out.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_nonzero_target_floor() {
        let slice = array![[0.0_f32, 1.0]];
        let out = normalize(slice.view(), (0.0, 1.0), (10.0, 20.0));
        assert_eq!(out[[0, 0]], 10.0);
        assert_eq!(out[[0, 1]], 20.0);
    }

    #[test]
    fn test_data_range_over_stack() {
        let stack = array![[[3.0_f32, 1.0]], [[7.0, 4.0]]];
        assert_eq!(data_range(stack.view()), (1.0, 7.0));
    }

    #[test]
    fn test_data_range_empty() {
        let empty = ndarray::Array2::<f32>::zeros((0, 0));
        assert_eq!(data_range(empty.view()), (0.0, 0.0));
    }
}
