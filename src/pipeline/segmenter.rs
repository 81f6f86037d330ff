//! The streaming stack segmentation pipeline.
//!
//! Drives the per-slice loop: normalize → generate candidates → rasterize
//! → align against the previous slice → accumulate into the volume →
//! checkpoint. Data flows strictly forward; no component depends on
//! anything produced later in the pipeline.
//!
//! Processing is single-threaded and strictly sequential along the slice
//! axis: aligning slice `i` requires the finalized result of slice `i-1`,
//! so slices of one stack can never run out of order or in parallel.
//! Parallelism only happens across independent stacks ([`StackSegmenter::segment_all`]).

use crate::core::config::SegmentationConfig;
use crate::core::errors::{SegError, SegResult};
use crate::core::traits::MaskGenerator;
use crate::pipeline::checkpoint::CheckpointWriter;
use crate::processors::{align_labels, data_range, rasterize};
use crate::utils::image::{guess_rgb, read_stack, slice_to_rgb};
use ndarray::{Array3, ArrayViewD, Axis};
use rayon::prelude::*;
use std::path::Path;

/// Segments image stacks slice-by-slice into labeled volumes.
///
/// The segmenter owns nothing beyond its configuration and the mask
/// generator handle; the stack source and output directory are passed per
/// call, and each call exclusively owns the label volume it builds.
#[derive(Debug)]
pub struct StackSegmenter<G> {
    generator: G,
    config: SegmentationConfig,
}

impl<G: MaskGenerator> StackSegmenter<G> {
    /// Creates a segmenter after validating the configuration.
    pub fn new(generator: G, config: SegmentationConfig) -> SegResult<Self> {
        config.validate()?;
        Ok(Self { generator, config })
    }

    /// The active configuration.
    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Segments one stack, returning the finalized label volume.
    ///
    /// `stem` names the checkpoint artifacts written under `output_dir`.
    /// A 2D input (optionally 3-channel) takes the single-slice path:
    /// no stack normalization, no alignment, and only a terminal artifact.
    /// A 3D input is processed slice-by-slice with one intermediate
    /// checkpoint alive at a time. Any failure inside a slice aborts the
    /// stack; the last checkpoint stays on disk for recovery.
    ///
    /// # Errors
    ///
    /// Returns [`SegError::UnsupportedShape`] before any processing if the
    /// dimensionality (after channel-axis disambiguation) is not 2 or 3,
    /// and propagates generation, rasterization, and checkpoint errors.
    pub fn segment(
        &self,
        stack: ArrayViewD<'_, f32>,
        stem: &str,
        output_dir: &Path,
    ) -> SegResult<Array3<u32>> {
        let rgb = guess_rgb(stack.shape());
        let ndim = if rgb { stack.ndim() - 1 } else { stack.ndim() };
        let writer = CheckpointWriter::new(output_dir, stem);
        match ndim {
            2 => self.segment_single(stack, &writer),
            3 => self.segment_stack(stack, &writer),
            ndim => Err(SegError::UnsupportedShape { ndim }),
        }
    }

    /// Reads a stack from `path` and segments it, deriving the artifact
    /// stem from the file stem.
    pub fn segment_path(&self, path: &Path, output_dir: &Path) -> SegResult<Array3<u32>> {
        let stack = read_stack(path)?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("stack");
        self.segment(stack.view(), stem, output_dir)
    }

    /// Segments independent stacks in parallel.
    ///
    /// Each `(stack, stem)` pair is a separate run with its own label
    /// volume and checkpoint lineage; slices within any one stack remain
    /// strictly sequential.
    pub fn segment_all(
        &self,
        stacks: &[(ArrayViewD<'_, f32>, &str)],
        output_dir: &Path,
    ) -> Vec<SegResult<Array3<u32>>> {
        stacks
            .par_iter()
            .map(|(stack, stem)| self.segment(stack.view(), stem, output_dir))
            .collect()
    }

    /// Single-slice path: generate, rasterize, terminal write. The slice
    /// goes to the generator as-is (identity rescale, clamped to u8).
    fn segment_single(
        &self,
        slice: ArrayViewD<'_, f32>,
        writer: &CheckpointWriter,
    ) -> SegResult<Array3<u32>> {
        let image = slice_to_rgb(slice, self.config.target_range, self.config.target_range)?;
        let candidates = self.generator.generate(&image)?;
        let labels = rasterize(&candidates)?;

        let (h, w) = labels.dim();
        let mut volume = Array3::zeros((1, h, w));
        volume.index_axis_mut(Axis(0), 0).assign(&labels);
        writer.write_final(&volume)?;
        Ok(volume)
    }

    /// Per-slice loop over a 3D stack.
    fn segment_stack(
        &self,
        stack: ArrayViewD<'_, f32>,
        writer: &CheckpointWriter,
    ) -> SegResult<Array3<u32>> {
        let (slices, height, width) = (stack.shape()[0], stack.shape()[1], stack.shape()[2]);
        if slices == 0 {
            return Err(SegError::invalid_input("stack has no slices"));
        }

        // Stack-wide limits, so intensity scaling is consistent across
        // slices.
        let source_range = data_range(stack.view());
        tracing::info!(slices, height, width, "segmenting stack");

        let mut volume = Array3::<u32>::zeros((slices, height, width));
        for i in 0..slices {
            let slice = stack.index_axis(Axis(0), i);
            let image = slice_to_rgb(slice, source_range, self.config.target_range)?;

            tracing::debug!(slice = i, total = slices, "running mask generation");
            let candidates = self.generator.generate(&image)?;
            let mut labels = rasterize(&candidates)?;
            if labels.dim() != (height, width) {
                return Err(SegError::invalid_input(format!(
                    "slice {i} rasterized to {:?}, expected {:?}",
                    labels.dim(),
                    (height, width)
                )));
            }

            if i > 0 {
                // Slice i-1 is finalized; its identifiers never change
                // again.
                let previous = volume.index_axis(Axis(0), i - 1);
                labels = align_labels(previous, labels.view(), self.config.alignment_threshold)?;
            }
            volume.index_axis_mut(Axis(0), i).assign(&labels);

            if i + 1 < slices {
                writer.write_intermediate(&volume, i)?;
            } else {
                writer.write_final(&volume)?;
            }
        }
        Ok(volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CandidateMask;
    use image::RgbImage;
    use ndarray::{Array2, ArrayD, IxDyn, s};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Returns scripted candidate sets, one per generate call.
    struct ScriptedGenerator {
        frames: Vec<Vec<CandidateMask>>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn new(frames: Vec<Vec<CandidateMask>>) -> Self {
            Self {
                frames,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl MaskGenerator for ScriptedGenerator {
        fn generate(&self, _slice: &RgbImage) -> SegResult<Vec<CandidateMask>> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst);
            self.frames.get(i).cloned().ok_or_else(|| {
                SegError::inference(std::io::Error::other("no scripted frame left"))
            })
        }
    }

    fn block(h: usize, w: usize, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) -> CandidateMask {
        let mut region = Array2::from_elem((h, w), false);
        region.slice_mut(s![rows, cols]).fill(true);
        CandidateMask::from_region(region)
    }

    fn gray_stack(n: usize, h: usize, w: usize) -> ArrayD<f32> {
        ArrayD::zeros(IxDyn(&[n, h, w]))
    }

    fn segmenter(frames: Vec<Vec<CandidateMask>>) -> StackSegmenter<ScriptedGenerator> {
        StackSegmenter::new(
            ScriptedGenerator::new(frames),
            SegmentationConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_single_slice_full_frame() {
        let dir = TempDir::new().unwrap();
        let seg = segmenter(vec![vec![block(10, 10, 0..10, 0..10)]]);

        let slice = ArrayD::<f32>::zeros(IxDyn(&[10, 10]));
        let volume = seg.segment(slice.view(), "single", dir.path()).unwrap();

        assert_eq!(volume.dim(), (1, 10, 10));
        assert!(volume.iter().all(|&l| l == 1));
        assert_eq!(seg.generator.calls(), 1);

        // Only the terminal artifact, no intermediates.
        let writer = CheckpointWriter::new(dir.path(), "single");
        assert!(writer.final_path().exists());
        assert!(writer.intermediate_artifacts().unwrap().is_empty());
    }

    #[test]
    fn test_one_slice_stack_writes_only_terminal_artifact() {
        // A 1x10x10 stack has no neighbour to align against and no
        // intermediate checkpoints to keep.
        let dir = TempDir::new().unwrap();
        let seg = segmenter(vec![vec![block(10, 10, 0..10, 0..10)]]);

        let volume = seg
            .segment(gray_stack(1, 10, 10).view(), "one", dir.path())
            .unwrap();
        assert_eq!(volume.dim(), (1, 10, 10));
        assert!(volume.iter().all(|&l| l == 1));

        let writer = CheckpointWriter::new(dir.path(), "one");
        assert!(writer.final_path().exists());
        assert!(writer.intermediate_artifacts().unwrap().is_empty());
    }

    #[test]
    fn test_continuity_relabels_raw_id() {
        // Slice 0 has two objects: id 1 (larger) and id 2 (smaller, top
        // left). Slice 1's only candidate sits on the id-2 object, so its
        // raw id 1 must come out as 2.
        let dir = TempDir::new().unwrap();
        let seg = segmenter(vec![
            vec![block(10, 10, 5..10, 0..10), block(10, 10, 0..4, 0..4)],
            vec![block(10, 10, 0..4, 0..4)],
        ]);

        let volume = seg
            .segment(gray_stack(2, 10, 10).view(), "pair", dir.path())
            .unwrap();

        assert_eq!(volume[[0, 0, 0]], 2);
        assert_eq!(volume[[0, 7, 3]], 1);
        // Raw rasterization of slice 1 would give 1; continuity gives 2.
        assert_eq!(volume[[1, 0, 0]], 2);
        assert_eq!(volume[[1, 3, 3]], 2);
        assert_eq!(volume[[1, 9, 9]], 0);
    }

    #[test]
    fn test_terminal_state_after_full_run() {
        let dir = TempDir::new().unwrap();
        let frames = (0..3)
            .map(|_| vec![block(4, 4, 0..4, 0..4)])
            .collect();
        let seg = segmenter(frames);

        let volume = seg
            .segment(gray_stack(3, 4, 4).view(), "full", dir.path())
            .unwrap();

        // No zero-filled unprocessed slices remain.
        for i in 0..3 {
            assert!(volume.index_axis(Axis(0), i).iter().all(|&l| l != 0));
        }
        let writer = CheckpointWriter::new(dir.path(), "full");
        assert!(writer.final_path().exists());
        assert!(writer.intermediate_artifacts().unwrap().is_empty());
    }

    #[test]
    fn test_failure_mid_stack_preserves_last_checkpoint() {
        let dir = TempDir::new().unwrap();
        // Frames for slices 0 and 1 only; slice 2 fails inside generate.
        let seg = segmenter(vec![
            vec![block(4, 4, 0..2, 0..2)],
            vec![block(4, 4, 0..2, 0..2)],
        ]);

        let err = seg
            .segment(gray_stack(4, 4, 4).view(), "crash", dir.path())
            .unwrap_err();
        assert!(matches!(err, SegError::Inference(_)));

        // Exactly one intermediate remains, named for the last completed
        // slice, and no terminal artifact exists.
        let writer = CheckpointWriter::new(dir.path(), "crash");
        let leftover = writer.intermediate_artifacts().unwrap();
        assert_eq!(leftover, vec![writer.intermediate_path(1)]);
        assert!(!writer.final_path().exists());
    }

    #[test]
    fn test_empty_candidate_set_aborts_stack() {
        let dir = TempDir::new().unwrap();
        let seg = segmenter(vec![vec![]]);
        let err = seg
            .segment(gray_stack(2, 4, 4).view(), "empty", dir.path())
            .unwrap_err();
        assert!(matches!(err, SegError::EmptyInput { .. }));
    }

    #[test]
    fn test_unsupported_shapes_rejected_before_processing() {
        let dir = TempDir::new().unwrap();
        let seg = segmenter(vec![]);

        let one_d = ArrayD::<f32>::zeros(IxDyn(&[5]));
        assert!(matches!(
            seg.segment(one_d.view(), "bad", dir.path()),
            Err(SegError::UnsupportedShape { ndim: 1 })
        ));

        // Last axis is 4, so this is a genuine 4D array, not a color
        // stack.
        let four_d = ArrayD::<f32>::zeros(IxDyn(&[2, 2, 4, 4]));
        assert!(matches!(
            seg.segment(four_d.view(), "bad", dir.path()),
            Err(SegError::UnsupportedShape { ndim: 4 })
        ));

        assert_eq!(seg.generator.calls(), 0);
    }

    #[test]
    fn test_color_stack_dispatches_as_3d() {
        let dir = TempDir::new().unwrap();
        let frames = (0..2)
            .map(|_| vec![block(4, 4, 0..4, 0..4)])
            .collect();
        let seg = segmenter(frames);

        let color = ArrayD::<f32>::zeros(IxDyn(&[2, 4, 4, 3]));
        let volume = seg.segment(color.view(), "color", dir.path()).unwrap();
        assert_eq!(volume.dim(), (2, 4, 4));
        assert_eq!(seg.generator.calls(), 2);
    }

    #[test]
    fn test_single_color_slice_dispatches_as_2d() {
        let dir = TempDir::new().unwrap();
        let seg = segmenter(vec![vec![block(4, 6, 0..4, 0..6)]]);

        let color = ArrayD::<f32>::zeros(IxDyn(&[4, 6, 3]));
        let volume = seg.segment(color.view(), "rgb", dir.path()).unwrap();
        assert_eq!(volume.dim(), (1, 4, 6));

        let writer = CheckpointWriter::new(dir.path(), "rgb");
        assert!(writer.final_path().exists());
        assert!(writer.intermediate_artifacts().unwrap().is_empty());
    }

    #[test]
    fn test_segment_all_runs_each_stack() {
        let dir = TempDir::new().unwrap();
        // Enough identical frames for two 2-slice stacks in any order.
        let frames = (0..4)
            .map(|_| vec![block(4, 4, 0..4, 0..4)])
            .collect();
        let seg = segmenter(frames);

        let a = gray_stack(2, 4, 4);
        let b = gray_stack(2, 4, 4);
        let results = seg.segment_all(
            &[(a.view(), "stack-a"), (b.view(), "stack-b")],
            dir.path(),
        );

        assert_eq!(results.len(), 2);
        for result in &results {
            assert!(result.is_ok());
        }
        assert!(dir.path().join("stack-a_masks_all.npy").exists());
        assert!(dir.path().join("stack-b_masks_all.npy").exists());
    }
}
