//! Domain value types: candidate masks and the task/model registry.

pub mod mask;
pub mod registry;

pub use mask::CandidateMask;
pub use registry::{ModelRegistry, TaskEntry};
