//! Model descriptor loader
//!
//! Hosts that cannot link against the checkers export their model metadata
//! as JSON descriptors:
//! - one `*.json` file per model, or one file holding an array of models
//! - non-JSON files are skipped
//! - duplicate model names or duplicate columns abort loading

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::definition::ModelDefinition;
use super::errors::{ModelError, ModelResult};

/// Reads model descriptors from a directory and keeps them by model name.
pub struct ModelLoader {
    /// Directory containing descriptor files
    model_dir: PathBuf,
    /// Loaded models indexed by name
    models: BTreeMap<String, ModelDefinition>,
}

impl ModelLoader {
    pub fn new(model_dir: &Path) -> Self {
        Self {
            model_dir: model_dir.to_path_buf(),
            models: BTreeMap::new(),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Loads every descriptor file in the directory.
    ///
    /// Files are read in name order so duplicate detection is deterministic.
    pub fn load_all(&mut self) -> ModelResult<()> {
        let entries = fs::read_dir(&self.model_dir).map_err(|e| io_error(&self.model_dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(&self.model_dir, e))?;
            let path = entry.path();

            // Skip non-JSON files
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        for path in paths {
            self.load_file(&path)?;
        }

        Ok(())
    }

    /// Loads a single descriptor file.
    pub fn load_file(&mut self, path: &Path) -> ModelResult<()> {
        let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;

        let value: Value = serde_json::from_str(&content).map_err(|e| ModelError::Malformed {
            path: path.display().to_string(),
            reason: format!("Invalid JSON: {}", e),
        })?;

        let values = match value {
            Value::Array(values) => values,
            other => vec![other],
        };

        for value in values {
            let model = ModelDefinition::from_value(value).map_err(|e| match e {
                ModelError::Malformed { reason, .. } => ModelError::Malformed {
                    path: path.display().to_string(),
                    reason,
                },
                other => other,
            })?;
            self.register(model)?;
        }

        Ok(())
    }

    /// Registers a model directly.
    pub fn register(&mut self, model: ModelDefinition) -> ModelResult<()> {
        model.validate()?;

        if self.models.contains_key(&model.name) {
            return Err(ModelError::DuplicateModel(model.name));
        }

        self.models.insert(model.name.clone(), model);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.get(name)
    }

    /// Returns all loaded models, ordered by name.
    pub fn models(&self) -> impl Iterator<Item = &ModelDefinition> {
        self.models.values()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Writes a descriptor to `<model_dir>/<table_name>.json`.
    pub fn save_model(&self, model: &ModelDefinition) -> ModelResult<PathBuf> {
        if !self.model_dir.exists() {
            fs::create_dir_all(&self.model_dir).map_err(|e| io_error(&self.model_dir, e))?;
        }

        let path = self.model_dir.join(format!("{}.json", model.table_name));
        let content = serde_json::to_string_pretty(model).map_err(|e| ModelError::Malformed {
            path: path.display().to_string(),
            reason: format!("Failed to serialize model: {}", e),
        })?;

        fs::write(&path, content).map_err(|e| io_error(&path, e))?;
        Ok(path)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ModelError {
    ModelError::Io {
        path: path.display().to_string(),
        source,
    }
}
