#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # rexs-pipeline
//!
//! Loading of REXS model documents end to end.
//!
//! A [`ModelLoader`] reads a JSON model document, builds it against the
//! registered schema of its version and checks every relation. Components
//! kept in other documents are merged in through a [`DataSourceResolver`].
//! [`Pipeline`] ties schema loading, configuration and file validation
//! together for the command line.

pub mod config;
pub mod document;
pub mod loader;
pub mod pipeline;
pub mod resolver;

pub use config::PipelineConfig;
pub use document::ModelDocument;
pub use loader::ModelLoader;
pub use pipeline::{FileReport, Pipeline, PipelineStats};
pub use resolver::{DataSourceResolver, FileResolver, MemoryResolver};

use thiserror::Error;

/// Errors that can occur while loading documents and configuration
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error at offset {offset}: {message}")]
    Parse { message: String, offset: usize },

    #[error("Invalid document: {0}")]
    Document(String),

    #[error("Configuration error in '{path}': {message}")]
    Config { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] rexs_validation::Error),
}

impl Error {
    /// Create a configuration error naming the offending file.
    pub fn config(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_keeps_path() {
        match Error::config("/etc/rexs.yaml", "unknown mode") {
            Error::Config { path, message } => {
                assert_eq!(path, "/etc/rexs.yaml");
                assert_eq!(message, "unknown mode");
            }
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_io_error_converts() {
        let error = std::fs::read_to_string("/path/that/does/not/exist").map_err(Error::from);
        assert!(matches!(error, Err(Error::Io(_))));
    }
}
