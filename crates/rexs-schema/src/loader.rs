//! Schema loader for JSON and YAML database model documents

use crate::raw::RawSchema;
use crate::registry::SchemaRegistry;
use crate::{Error, Result};
use rexs_ir::{Issue, Severity, ValidationResult, byte_offset};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// Loads database model documents from search directories
pub struct SchemaLoader {
    schema_paths: Vec<PathBuf>,
}

impl SchemaLoader {
    /// Create a new schema loader with the given search paths
    pub fn new(schema_paths: Vec<PathBuf>) -> Self {
        Self { schema_paths }
    }

    /// Add a search path for schema files
    pub fn add_path(&mut self, path: PathBuf) {
        self.schema_paths.push(path);
    }

    /// Parse a schema document from a JSON string
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] with the byte offset of the syntax error.
    pub fn parse_json(json: &str) -> Result<RawSchema> {
        serde_json::from_str(json).map_err(|e| {
            Error::parse(
                format!("JSON parse error: {e}"),
                byte_offset(json, e.line(), e.column()),
            )
        })
    }

    /// Parse a schema document from a YAML string
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] with the byte offset of the syntax error.
    pub fn parse_yaml(yaml: &str) -> Result<RawSchema> {
        serde_yaml::from_str(yaml).map_err(|e| {
            let offset = e.location().map_or(0, |l| l.index());
            Error::parse(format!("YAML parse error: {e}"), offset)
        })
    }

    /// Parse a schema document from a file, choosing the format by extension
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a parse error.
    pub fn load_file(path: &Path) -> Result<RawSchema> {
        trace!("Loading schema from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;

        if is_yaml(path) {
            Self::parse_yaml(&content)
        } else {
            Self::parse_json(&content)
        }
    }

    /// Schema files found in the search paths, sorted per directory
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a search path cannot be listed.
    pub fn schema_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for dir in &self.schema_paths {
            let mut found: Vec<PathBuf> = std::fs::read_dir(dir)?
                .filter_map(std::result::Result::ok)
                .map(|entry| entry.path())
                .filter(|p| p.is_file() && (is_yaml(p) || has_extension(p, "json")))
                .collect();
            found.sort();
            files.extend(found);
        }
        Ok(files)
    }

    /// Load every schema file into a registry
    ///
    /// A file that cannot be read or parsed, or whose content violates the
    /// schema invariants, is recorded as a critical issue; all other files
    /// still load.
    pub fn load(&self) -> (SchemaRegistry, ValidationResult) {
        let mut result = ValidationResult::new();
        let mut records = Vec::new();

        let files = match self.schema_files() {
            Ok(files) => files,
            Err(e) => {
                result.critical(format!("cannot list schema directories: {e}"));
                return (SchemaRegistry::new(), result);
            }
        };

        for file in files {
            match Self::load_file(&file) {
                Ok(raw) => {
                    debug!(
                        file = %file.display(),
                        version = %raw.version,
                        language = %raw.language,
                        "Parsed schema file"
                    );
                    records.push(raw);
                }
                Err(Error::Parse { message, offset }) => {
                    result.add_issue(
                        Issue::new(Severity::Critical, format!("{}: {message}", file.display()))
                            .at(offset),
                    );
                }
                Err(e) => result.critical(format!("{}: {e}", file.display())),
            }
        }

        let (registry, conversion) = SchemaRegistry::from_records(records);
        for issue in conversion.issues() {
            result.add_issue(issue.clone());
        }

        info!(
            models = registry.len(),
            issues = result.len(),
            "Loaded database models from {} path(s)",
            self.schema_paths.len()
        );
        (registry, result)
    }
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new(vec![PathBuf::from(".")])
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

fn is_yaml(path: &Path) -> bool {
    has_extension(path, "yaml") || has_extension(path, "yml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "version": "1.4", "language": "en",
            "units": [], "attributes": [], "components": []
        }"#;
        let raw = SchemaLoader::parse_json(json).unwrap();
        assert_eq!(raw.version, "1.4");
        assert_eq!(raw.language, "en");
    }

    #[test]
    fn test_parse_json_reports_offset() {
        let json = "{\n  \"version\": 1.4,\n  \"language\": }";
        match SchemaLoader::parse_json(json) {
            Err(Error::Parse { offset, .. }) => assert!(offset > 0 && offset <= json.len()),
            other => panic!("Expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = "version: '1.5'\nlanguage: de\ncomponents:\n  - id: gear\n    name: Zahnrad\n";
        let raw = SchemaLoader::parse_yaml(yaml).unwrap();
        assert_eq!(raw.version, "1.5");
        assert_eq!(raw.components[0].name, "Zahnrad");
    }

    #[test]
    fn test_parse_yaml_invalid() {
        let yaml = "version: [";
        assert!(matches!(
            SchemaLoader::parse_yaml(yaml),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_load_missing_directory() {
        let loader = SchemaLoader::new(vec![PathBuf::from("/definitely/not/here")]);
        let (registry, result) = loader.load();
        assert!(registry.is_empty());
        assert!(result.has_critical());
    }
}
