//! Streaming checkpoint persistence.
//!
//! After every completed slice the full (partially zero-filled) label
//! volume is written to durable storage, superseding the previous
//! intermediate artifact so at most one exists for an in-progress stack.
//! On completion the volume is written under a terminal name and every
//! remaining intermediate is swept away. An external layer may poll the
//! checkpoint directory to infer progress or to recover after a crash.
//!
//! Artifacts are plain `.npy` integer arrays: `{stem}_masks_{i}.npy` for
//! an intermediate at slice `i`, `{stem}_masks_all.npy` once every slice
//! is in.

use crate::core::errors::{SegError, SegResult};
use crate::utils::sanitise_name;
use ndarray::Array3;
use ndarray_npy::write_npy;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes checkpoint artifacts for one stack's segmentation run.
#[derive(Debug, Clone)]
pub struct CheckpointWriter {
    dir: PathBuf,
    stem: String,
}

impl CheckpointWriter {
    /// Creates a writer for the stack named `stem`, persisting into
    /// `output_dir`. The stem is sanitised for filename use.
    pub fn new(output_dir: &Path, stem: &str) -> Self {
        Self {
            dir: output_dir.to_path_buf(),
            stem: sanitise_name(stem),
        }
    }

    /// Path of the intermediate artifact for `slice_index`.
    pub fn intermediate_path(&self, slice_index: usize) -> PathBuf {
        self.dir.join(format!("{}_masks_{slice_index}.npy", self.stem))
    }

    /// Path of the terminal artifact.
    pub fn final_path(&self) -> PathBuf {
        self.dir.join(format!("{}_masks_all.npy", self.stem))
    }

    /// Persists the volume after slice `slice_index`, then deletes the
    /// artifact for the previous slice if one exists.
    ///
    /// The delete is best-effort: a missing prior artifact (always the
    /// case for slice 0) is silently accepted, and any other removal
    /// failure is logged and swallowed. A failed write is fatal.
    pub fn write_intermediate(&self, volume: &Array3<u32>, slice_index: usize) -> SegResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.intermediate_path(slice_index);
        write_npy(&path, volume).map_err(|e| SegError::checkpoint_write(&path, e))?;
        tracing::debug!(slice = slice_index, path = %path.display(), "wrote intermediate checkpoint");

        if slice_index > 0 {
            self.remove_stale(&self.intermediate_path(slice_index - 1));
        }
        Ok(())
    }

    /// Persists the fully-processed volume under the terminal name and
    /// sweeps every remaining intermediate artifact for this stack.
    ///
    /// Returns the terminal artifact's path. After success, no
    /// intermediate checkpoint remains (barring swallowed delete
    /// failures, which are logged).
    pub fn write_final(&self, volume: &Array3<u32>) -> SegResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.final_path();
        write_npy(&path, volume).map_err(|e| SegError::checkpoint_write(&path, e))?;
        tracing::info!(path = %path.display(), "wrote terminal mask volume");

        for stale in self.intermediate_artifacts()? {
            self.remove_stale(&stale);
        }
        Ok(path)
    }

    /// Lists intermediate artifacts currently on disk for this stack.
    pub fn intermediate_artifacts(&self) -> SegResult<Vec<PathBuf>> {
        let prefix = format!("{}_masks_", self.stem);
        let mut found = Vec::new();
        if !self.dir.exists() {
            return Ok(found);
        }
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with(&prefix)
                && name.ends_with(".npy")
                && path != self.final_path()
            {
                found.push(path);
            }
        }
        Ok(found)
    }

    fn remove_stale(&self, path: &Path) {
        if let Err(source) = fs::remove_file(path) {
            if source.kind() == std::io::ErrorKind::NotFound {
                return;
            }
            let err = SegError::StaleCheckpointCleanup {
                path: path.to_path_buf(),
                source,
            };
            tracing::warn!(error = %err, "continuing despite stale checkpoint");
        }
    }
}
