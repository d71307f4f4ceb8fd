//! Data source resolution for merge-on-load

use crate::loader::ModelLoader;
use rexs_ir::ValidationResult;
use rexs_model::Model;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Provides the referenced model behind a data source label
pub trait DataSourceResolver {
    /// Model for `label`, or `None` if it is unavailable
    ///
    /// Issues found while reading the referenced model go into `result`.
    fn resolve(
        &self,
        loader: &ModelLoader,
        result: &mut ValidationResult,
        label: &str,
    ) -> Option<Model>;
}

/// Reads data sources as model documents relative to a base directory
#[derive(Debug, Clone)]
pub struct FileResolver {
    base_dir: PathBuf,
}

impl FileResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl DataSourceResolver for FileResolver {
    fn resolve(
        &self,
        loader: &ModelLoader,
        result: &mut ValidationResult,
        label: &str,
    ) -> Option<Model> {
        let path = self.base_dir.join(label);
        debug!(label, path = %path.display(), "Resolving data source from file");
        loader.parse_file(&path, result)
    }
}

/// Serves pre-built models by label
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    models: HashMap<String, Model>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `model` under `label`, replacing any earlier one
    pub fn insert(&mut self, label: impl Into<String>, model: Model) {
        self.models.insert(label.into(), model);
    }
}

impl DataSourceResolver for MemoryResolver {
    fn resolve(
        &self,
        _loader: &ModelLoader,
        _result: &mut ValidationResult,
        label: &str,
    ) -> Option<Model> {
        self.models.get(label).cloned()
    }
}
