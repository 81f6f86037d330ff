//! Immutable task/model registry.
//!
//! Maps segmentation tasks (organelles) to the models able to serve them,
//! with human-readable display names. This is a lookup table loaded once
//! at startup — selection of a task or model for a given run is the
//! caller's responsibility, and the segmentation core itself never
//! consults this table.

use crate::core::errors::{SegError, SegResult};
use crate::utils::sanitise_name;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One segmentation task (e.g. an organelle class).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEntry {
    /// Human-readable name for display surfaces.
    pub display: String,
    /// Identifiers of the models able to serve this task.
    pub models: Vec<String>,
}

/// Registry of available models and the tasks they serve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRegistry {
    /// Model identifier to display name.
    models: BTreeMap<String, String>,
    /// Task identifier to task entry.
    tasks: BTreeMap<String, TaskEntry>,
}

static BUILTIN: Lazy<ModelRegistry> = Lazy::new(ModelRegistry::builtin);

impl ModelRegistry {
    /// The built-in registry shipped with the crate.
    pub fn global() -> &'static ModelRegistry {
        &BUILTIN
    }

    /// Builds the default registry: a general-purpose promptable model
    /// plus a dedicated electron-microscopy model, keyed by the organelle
    /// tasks they can segment.
    pub fn builtin() -> Self {
        let models = BTreeMap::from([
            ("unet".to_string(), "UNet".to_string()),
            ("sam".to_string(), "Segment Anything".to_string()),
        ]);
        let tasks = BTreeMap::from([
            (
                "mito".to_string(),
                TaskEntry {
                    display: "Mitochondria".to_string(),
                    models: vec!["unet".to_string()],
                },
            ),
            (
                "er".to_string(),
                TaskEntry {
                    display: "Endoplasmic Reticulum".to_string(),
                    models: vec!["unet".to_string()],
                },
            ),
            (
                "ne".to_string(),
                TaskEntry {
                    display: "Nuclear Envelope".to_string(),
                    models: vec!["unet".to_string()],
                },
            ),
            (
                "everything".to_string(),
                TaskEntry {
                    display: "Everything".to_string(),
                    models: vec!["sam".to_string()],
                },
            ),
        ]);
        Self { models, tasks }
    }

    /// Creates a registry from caller-supplied entries.
    pub fn from_parts(
        models: BTreeMap<String, String>,
        tasks: BTreeMap<String, TaskEntry>,
    ) -> SegResult<Self> {
        let registry = Self { models, tasks };
        registry.validate()?;
        Ok(registry)
    }

    /// Checks that every task references only known models.
    pub fn validate(&self) -> SegResult<()> {
        for (task, entry) in &self.tasks {
            for model in &entry.models {
                if !self.models.contains_key(model) {
                    return Err(SegError::config_error(format!(
                        "task {task} references unknown model {model}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Display name for a model identifier.
    pub fn model_display(&self, model: &str) -> Option<&str> {
        self.models.get(model).map(String::as_str)
    }

    /// Model identifiers able to serve a task.
    pub fn models_for_task(&self, task: &str) -> Option<&[String]> {
        self.tasks.get(task).map(|entry| entry.models.as_slice())
    }

    /// Task identifiers, in deterministic order.
    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// Filename-safe variant of a model or task display name.
    pub fn sanitised_display(&self, model: &str) -> Option<String> {
        self.model_display(model).map(sanitise_name)
    }
}
