//! External subcomponent checker

use crate::{Error, Result};
use rexs_ir::{ValidationResult, Version};
use rexs_model::Component;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

const EXTERNAL_SUBCOMPONENTS: &str = include_str!("resources/external_subcomponents.json");
const RESOURCE_NAME: &str = "external_subcomponents.json";

#[derive(Deserialize)]
struct SubcomponentTable {
    versions: Vec<VersionEntry>,
}

#[derive(Deserialize)]
struct VersionEntry {
    version: Version,
    components: HashMap<String, Vec<String>>,
}

/// Decides which component types may be nested under a main component
///
/// Configured with one schema version; the sub-types permitted per main type
/// for that version are taken from the packaged table.
#[derive(Debug, Clone)]
pub struct ExternalSubcomponentsChecker {
    version: Version,
    permitted: Option<HashMap<String, HashSet<String>>>,
}

impl ExternalSubcomponentsChecker {
    /// Load the packaged table for `version`
    ///
    /// A version without rules still yields a checker; every check then
    /// reports the version as unsupported.
    ///
    /// # Errors
    ///
    /// Returns an error if the packaged resource is malformed.
    pub fn new(version: Version) -> Result<Self> {
        Self::from_json(EXTERNAL_SUBCOMPONENTS, version)
    }

    /// Load the table for `version` from JSON
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for unparsable input and
    /// [`Error::InvalidResource`] when a version is listed twice.
    pub fn from_json(json: &str, version: Version) -> Result<Self> {
        let table: SubcomponentTable = serde_json::from_str(json)?;

        let mut seen = HashSet::new();
        let mut permitted = None;
        for entry in table.versions {
            if !seen.insert(entry.version) {
                return Err(Error::invalid_resource(
                    RESOURCE_NAME,
                    format!("version {} is listed twice", entry.version),
                ));
            }
            if entry.version == version {
                permitted = Some(
                    entry
                        .components
                        .into_iter()
                        .map(|(main, subs)| (main, subs.into_iter().collect()))
                        .collect(),
                );
            }
        }

        if permitted.is_none() {
            warn!(version = %version, "No external subcomponent rules for version");
        } else {
            debug!(version = %version, "Loaded external subcomponent rules");
        }
        Ok(Self { version, permitted })
    }

    /// Version the checker was configured with
    pub fn version(&self) -> Version {
        self.version
    }

    /// Check if the configured version has rules
    pub fn is_supported(&self) -> bool {
        self.permitted.is_some()
    }

    /// Check if type `sub` may be nested under type `main` without recording
    ///
    /// Always false for an unsupported version.
    pub fn permits(&self, main: &str, sub: &str) -> bool {
        self.permitted
            .as_ref()
            .and_then(|permitted| permitted.get(main))
            .is_some_and(|subs| subs.contains(sub))
    }

    /// Check if `sub` may be nested under `main`
    ///
    /// Records a critical issue when the configured version is unsupported
    /// and an error naming both types when the sub-type is not permitted.
    pub fn is_permissible_sub_component(
        &self,
        result: &mut ValidationResult,
        main: &Component,
        sub: &Component,
    ) -> bool {
        if !self.is_supported() {
            result.critical(format!(
                "external subcomponents are not supported for version {}",
                self.version
            ));
            return false;
        }

        let allowed = self.permits(main.type_id(), sub.type_id());
        if !allowed {
            result.error(format!(
                "component type '{}' is not a permissible subcomponent of '{}'",
                sub.type_id(),
                main.type_id()
            ));
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rexs_ir::Severity;
    use rexs_model::next_internal_id;

    fn component(type_id: &str) -> Component {
        Component::new(next_internal_id(), type_id, None, vec![])
    }

    #[test]
    fn test_permitted_subcomponent() {
        let checker = ExternalSubcomponentsChecker::new(Version::new(1, 4)).unwrap();
        let mut result = ValidationResult::new();

        assert!(checker.is_permissible_sub_component(
            &mut result,
            &component("rolling_bearing_with_detailed_geometry"),
            &component("rolling_element"),
        ));
        assert!(result.is_empty());
    }

    #[test]
    fn test_not_permitted_names_both_types() {
        let checker = ExternalSubcomponentsChecker::new(Version::new(1, 4)).unwrap();
        let mut result = ValidationResult::new();

        assert!(!checker.is_permissible_sub_component(
            &mut result,
            &component("shaft"),
            &component("rolling_element"),
        ));
        let issue = &result.issues()[0];
        assert_eq!(issue.severity, Severity::Error);
        assert!(issue.message.contains("shaft"));
        assert!(issue.message.contains("rolling_element"));
    }

    #[test]
    fn test_permits_records_nothing() {
        let checker = ExternalSubcomponentsChecker::new(Version::new(1, 4)).unwrap();
        assert!(checker.permits("shaft", "shaft_section"));
        assert!(!checker.permits("rolling_bearing_with_detailed_geometry", "shaft"));
        assert!(!checker.permits("unknown", "shaft_section"));

        let unsupported = ExternalSubcomponentsChecker::new(Version::new(0, 9)).unwrap();
        assert!(!unsupported.permits("shaft", "shaft_section"));
    }

    #[test]
    fn test_rules_differ_between_versions() {
        let mut result = ValidationResult::new();
        let main = component("rolling_bearing_with_detailed_geometry");
        let row = component("rolling_bearing_row");

        let v14 = ExternalSubcomponentsChecker::new(Version::new(1, 4)).unwrap();
        let v15 = ExternalSubcomponentsChecker::new(Version::new(1, 5)).unwrap();
        assert!(!v14.is_permissible_sub_component(&mut result, &main, &row));
        assert!(v15.is_permissible_sub_component(&mut result, &main, &row));
    }

    #[test]
    fn test_unsupported_version_is_critical() {
        let checker = ExternalSubcomponentsChecker::new(Version::new(0, 9)).unwrap();
        assert!(!checker.is_supported());

        let mut result = ValidationResult::new();
        assert!(!checker.is_permissible_sub_component(
            &mut result,
            &component("shaft"),
            &component("shaft_section"),
        ));
        assert_eq!(result.criticals().count(), 1);
    }

    #[test]
    fn test_malformed_resource() {
        assert!(ExternalSubcomponentsChecker::from_json("[]", Version::new(1, 4)).is_err());

        let twice = r#"{"versions": [
            {"version": "1.4", "components": {}},
            {"version": "1.4", "components": {}}
        ]}"#;
        assert!(matches!(
            ExternalSubcomponentsChecker::from_json(twice, Version::new(1, 4)),
            Err(Error::InvalidResource { .. })
        ));
    }
}
