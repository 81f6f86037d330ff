//! Error types for the stack segmentation pipeline.
//!
//! This module defines the error taxonomy for the streaming segmentation
//! core: empty candidate sets, unsupported stack shapes, checkpoint
//! persistence failures, and the ambient I/O and configuration errors.
//! Constructor helpers are provided for the variants that carry context.
//!
//! Propagation policy: stale-checkpoint cleanup failures are logged and
//! swallowed at the call site; everything else propagates to the caller.
//! The core performs no internal retries — re-running a failed slice is a
//! caller-level decision because slice processing is expensive and
//! side-effecting (model inference).

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the segmentation core.
#[derive(Error, Debug)]
pub enum SegError {
    /// The mask generator produced no candidates for a slice. A shape-less
    /// rasterization result is unrecoverable downstream, so this is fatal
    /// for the stack.
    #[error("empty candidate set: {context}")]
    EmptyInput {
        /// Where the empty set was encountered.
        context: String,
    },

    /// Stack dimensionality (after channel-axis disambiguation) is not 2
    /// or 3. Raised before any slice is processed.
    #[error("unsupported stack dimensionality {ndim}, expected 2 or 3")]
    UnsupportedShape {
        /// Effective dimensionality of the rejected input.
        ndim: usize,
    },

    /// A checkpoint artifact could not be written. Fatal: the stack is
    /// aborted and the previous checkpoint is left on disk for recovery.
    #[error("checkpoint write failed: {path}")]
    CheckpointWrite {
        /// Destination path of the failed write.
        path: PathBuf,
        /// The underlying serialization or I/O error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A stale intermediate checkpoint could not be removed. Never
    /// propagated: the writer logs this and continues.
    #[error("stale checkpoint cleanup failed: {path}")]
    StaleCheckpointCleanup {
        /// Path of the artifact that could not be removed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A raw image stack could not be read from storage.
    #[error("failed to read stack from {path}")]
    StackRead {
        /// Source path of the stack.
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred while decoding an image file.
    #[error("image load")]
    ImageLoad(#[from] image::ImageError),

    /// Error raised by the external mask generator.
    #[error("mask generation")]
    Inference(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Error indicating invalid input data.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl SegError {
    /// Creates an empty-candidate-set error with context.
    pub fn empty_input(context: impl Into<String>) -> Self {
        SegError::EmptyInput {
            context: context.into(),
        }
    }

    /// Creates a checkpoint-write error from any underlying error.
    pub fn checkpoint_write(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        SegError::CheckpointWrite {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Creates a stack-read error from any underlying error.
    pub fn stack_read(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        SegError::StackRead {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Creates an inference error from any underlying error.
    pub fn inference(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        SegError::Inference(Box::new(source))
    }

    /// Creates an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        SegError::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        SegError::Config {
            message: message.into(),
        }
    }
}

/// Convenient result alias for segmentation operations.
pub type SegResult<T> = Result<T, SegError>;
