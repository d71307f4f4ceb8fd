//! Pipeline orchestration
//!
//! Loads the schema registry once from the configured directory and
//! validates model files against it, resolving their data sources from disk.

use crate::config::PipelineConfig;
use crate::loader::ModelLoader;
use crate::resolver::{DataSourceResolver, FileResolver};
use crate::Result;
use rexs_ir::ValidationResult;
use rexs_model::Model;
use rexs_schema::SchemaLoader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Result of validating a single model file
#[derive(Debug)]
pub struct FileReport {
    /// File path
    pub path: PathBuf,
    /// Merged model, present when validation succeeded
    pub model: Option<Model>,
    /// Issues recorded for the file and its data sources
    pub result: ValidationResult,
    /// Processing duration
    pub duration: Duration,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        self.model.is_some() && self.result.is_success()
    }
}

/// Statistics for pipeline processing
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineStats {
    /// Total files processed
    pub files_processed: usize,
    /// Total files successful
    pub files_successful: usize,
    /// Total files failed
    pub files_failed: usize,
    /// Total issues recorded across all files
    pub issues: usize,
}

/// Validates model files against the configured schemas
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    loader: ModelLoader,
    schema_issues: ValidationResult,
    stats: PipelineStats,
}

impl Pipeline {
    /// Load the schemas named by `config`
    ///
    /// Schema files that fail to load are recorded in
    /// [`Pipeline::schema_issues`]; the others are still registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the packaged rule tables cannot be parsed.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let (registry, schema_issues) =
            SchemaLoader::new(vec![config.schema_dir.clone()]).load();
        if !schema_issues.is_empty() {
            warn!(issues = schema_issues.len(), "Schema directory loaded with issues");
        }
        info!(
            schema_dir = %config.schema_dir.display(),
            schemas = registry.len(),
            mode = ?config.mode,
            "Pipeline ready"
        );

        let loader = ModelLoader::new(Arc::new(registry))?
            .with_default_language(config.default_language.clone());
        Ok(Self {
            config,
            loader,
            schema_issues,
            stats: PipelineStats::default(),
        })
    }

    /// Validate one model file and merge its data sources
    pub fn validate_file<P: AsRef<Path>>(&mut self, path: P) -> FileReport {
        let start = Instant::now();
        let path = path.as_ref();
        let base_dir = self.config.data_source_dir.clone().unwrap_or_else(|| {
            path.parent().map_or_else(PathBuf::new, Path::to_path_buf)
        });
        let resolver: &dyn DataSourceResolver = &FileResolver::new(base_dir);

        let mut result = ValidationResult::with_mode(self.config.mode);
        let model = self.loader.load_file(path, &mut result, Some(resolver));

        let report = FileReport {
            path: path.to_path_buf(),
            model,
            result,
            duration: start.elapsed(),
        };

        self.stats.files_processed += 1;
        self.stats.issues += report.result.len();
        if report.is_success() {
            self.stats.files_successful += 1;
        } else {
            self.stats.files_failed += 1;
        }
        info!(
            path = %path.display(),
            success = report.is_success(),
            issues = report.result.len(),
            "Validated model file"
        );
        report
    }

    /// Validate several model files in order
    pub fn validate_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Vec<FileReport> {
        paths.iter().map(|p| self.validate_file(p)).collect()
    }

    /// Issues recorded while loading the schema directory
    pub fn schema_issues(&self) -> &ValidationResult {
        &self.schema_issues
    }

    pub fn loader(&self) -> &ModelLoader {
        &self.loader
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
