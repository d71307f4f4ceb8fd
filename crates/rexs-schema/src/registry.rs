//! Schema registry keyed by (version, language)

use crate::model::SchemaModel;
use crate::raw::RawSchema;
use crate::{Error, Result};
use rexs_ir::{ValidationResult, Version};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Read-only index of every successfully loaded database model
///
/// The registry is built once and may be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    models: HashMap<(Version, String), Arc<SchemaModel>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from raw schema records
    ///
    /// Every record that fails to convert is recorded as a critical issue and
    /// skipped; the remaining records are still registered. A second record
    /// for an already registered (version, language) pair is reported as an
    /// error and ignored.
    pub fn from_records(records: impl IntoIterator<Item = RawSchema>) -> (Self, ValidationResult) {
        let mut registry = Self::new();
        let mut result = ValidationResult::new();

        for raw in records {
            let label = format!("{}/{}", raw.version, raw.language);
            match SchemaModel::try_from(raw) {
                Ok(model) => {
                    if registry.contains(model.version, &model.language) {
                        result.error(format!("duplicate database model {label}"));
                        continue;
                    }
                    debug!(
                        version = %model.version,
                        language = %model.language,
                        "Registered database model"
                    );
                    registry.register(model);
                }
                Err(e) => result.critical(format!("cannot load database model {label}: {e}")),
            }
        }

        info!(models = registry.len(), issues = result.len(), "Schema registry ready");
        (registry, result)
    }

    /// Register a model, replacing any model for the same pair
    pub fn register(&mut self, model: SchemaModel) {
        self.models
            .insert((model.version, model.language.clone()), Arc::new(model));
    }

    /// Get the model for an exact (version, language) pair
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such model was loaded.
    pub fn get_model(&self, version: Version, language: &str) -> Result<Arc<SchemaModel>> {
        self.models
            .get(&(version, language.to_string()))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("database model {version}/{language}")))
    }

    /// Check if a model exists for the pair
    pub fn contains(&self, version: Version, language: &str) -> bool {
        self.models.contains_key(&(version, language.to_string()))
    }

    /// Loaded (version, language) pairs, sorted
    pub fn keys(&self) -> Vec<(Version, String)> {
        let mut keys: Vec<_> = self.models.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rexs_ir::Severity;

    fn raw(version: &str, language: &str) -> RawSchema {
        RawSchema {
            version: version.to_string(),
            language: language.to_string(),
            date: None,
            status: crate::Status::Released,
            units: vec![],
            attributes: vec![],
            components: vec![],
        }
    }

    #[test]
    fn test_get_model_exact_match() {
        let (registry, result) =
            SchemaRegistry::from_records(vec![raw("1.4", "en"), raw("1.4", "de")]);
        assert!(result.is_empty());
        assert_eq!(registry.len(), 2);

        let model = registry.get_model(Version::new(1, 4), "de").unwrap();
        assert_eq!(model.language, "de");
    }

    #[test]
    fn test_get_model_has_no_fallback() {
        let (registry, _) = SchemaRegistry::from_records(vec![raw("1.4", "en")]);
        assert!(matches!(
            registry.get_model(Version::new(1, 5), "en"),
            Err(Error::NotFound(_))
        ));
        assert!(registry.get_model(Version::new(1, 4), "fr").is_err());
    }

    #[test]
    fn test_partial_success() {
        let records = vec![raw("1.4", "en"), raw("broken", "en"), raw("1.5", "en")];
        let (registry, result) = SchemaRegistry::from_records(records);

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(Version::new(1, 5), "en"));
        assert_eq!(result.len(), 1);
        assert_eq!(result.issues()[0].severity, Severity::Critical);
        assert!(result.issues()[0].message.contains("broken/en"));
    }

    #[test]
    fn test_duplicate_pair_is_reported() {
        let (registry, result) =
            SchemaRegistry::from_records(vec![raw("1.4", "en"), raw("1.4", "en")]);
        assert_eq!(registry.len(), 1);
        assert_eq!(result.errors().count(), 1);
    }

    #[test]
    fn test_keys_are_sorted() {
        let records = vec![raw("1.5", "en"), raw("1.4", "en"), raw("1.4", "de")];
        let (registry, _) = SchemaRegistry::from_records(records);
        let keys = registry.keys();
        assert_eq!(keys[0], (Version::new(1, 4), "de".to_string()));
        assert_eq!(keys[2], (Version::new(1, 5), "en".to_string()));
    }
}
