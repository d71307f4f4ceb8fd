//! Pipeline configuration
//!
//! ```yaml
//! mode: relaxed
//! schema_dir: /opt/rexs/schemas
//! default_language: de
//! data_source_dir: /data/models
//! ```

use crate::{Error, Result};
use rexs_ir::Mode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_language() -> String {
    "en".to_string()
}

fn default_schema_dir() -> PathBuf {
    PathBuf::from("schemas")
}

/// Configuration for the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// How schema violations are recorded
    #[serde(default)]
    pub mode: Mode,
    /// Directory scanned for schema documents
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,
    /// Schema language used when a document does not name one
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Base directory for data source labels; the model's own directory
    /// when unset
    #[serde(default)]
    pub data_source_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            schema_dir: default_schema_dir(),
            default_language: default_language(),
            data_source_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from YAML
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] for malformed YAML or unknown keys.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a configuration file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the file if it cannot be read or
    /// parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(path.display().to_string(), e.to_string()))?;
        Self::from_yaml_str(&content)
            .map_err(|e| Error::config(path.display().to_string(), e.to_string()))
    }
}
