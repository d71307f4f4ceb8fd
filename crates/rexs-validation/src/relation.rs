//! Relation type checker
//!
//! Every relation type has one or more rules, each valid from a minimum
//! schema version on. The rule in force for a model is the newest one whose
//! minimum version does not exceed the model's version.

use crate::{Error, Result};
use rexs_ir::{ValidationResult, Version};
use rexs_model::Relation;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

const RELATION_TYPES: &str = include_str!("resources/relation_types.json");
const RESOURCE_NAME: &str = "relation_types.json";

/// Occurrence bounds of one role
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleRule {
    pub role: String,
    pub min: u32,
    pub max: u32,
}

/// Rule for one relation type from a minimum version on
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelationRule {
    #[serde(rename = "type")]
    pub relation_type: String,
    pub min_version: Version,
    /// Whether the relation must declare an order and list its references in
    /// role order
    #[serde(default)]
    pub ordered: bool,
    pub roles: Vec<RoleRule>,
}

impl RelationRule {
    fn role(&self, role: &str) -> Option<&RoleRule> {
        self.roles.iter().find(|r| r.role == role)
    }

    fn position(&self, role: &str) -> Option<usize> {
        self.roles.iter().position(|r| r.role == role)
    }
}

#[derive(Deserialize)]
struct RelationTypes {
    relation_types: Vec<RelationRule>,
}

/// Version-scoped rule table for relation role references
#[derive(Debug, Clone)]
pub struct RelationTypeChecker {
    /// Rules per relation type, ascending by minimum version
    rules: HashMap<String, Vec<RelationRule>>,
}

impl RelationTypeChecker {
    /// Load the packaged rule table
    ///
    /// # Errors
    ///
    /// Returns an error if the packaged resource is malformed.
    pub fn new() -> Result<Self> {
        Self::from_json(RELATION_TYPES)
    }

    /// Load a rule table from JSON
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for unparsable input and
    /// [`Error::InvalidResource`] for inconsistent rules.
    pub fn from_json(json: &str) -> Result<Self> {
        let table: RelationTypes = serde_json::from_str(json)?;

        let mut rules: HashMap<String, Vec<RelationRule>> = HashMap::new();
        for rule in table.relation_types {
            validate_rule(&rule)?;
            let versions = rules.entry(rule.relation_type.clone()).or_default();
            if versions.iter().any(|r| r.min_version == rule.min_version) {
                return Err(Error::invalid_resource(
                    RESOURCE_NAME,
                    format!(
                        "relation type '{}' has two rules for version {}",
                        rule.relation_type, rule.min_version
                    ),
                ));
            }
            versions.push(rule);
        }
        for versions in rules.values_mut() {
            versions.sort_by_key(|r| r.min_version);
        }

        debug!(relation_types = rules.len(), "Loaded relation type rules");
        Ok(Self { rules })
    }

    /// Rule in force for `relation_type` at `version`
    pub fn rule(&self, relation_type: &str, version: Version) -> Option<&RelationRule> {
        self.rules
            .get(relation_type)?
            .iter()
            .rev()
            .find(|r| r.min_version <= version)
    }

    /// Known relation types, sorted
    pub fn relation_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Check the role references of a relation
    ///
    /// Missing required roles are recorded as critical, every other violation
    /// as an error. Returns `true` without recording anything when the
    /// relation complies.
    pub fn check(
        &self,
        result: &mut ValidationResult,
        version: Version,
        relation: &Relation,
    ) -> bool {
        let relation_type = relation.relation_type();
        let Some(rule) = self.rule(relation_type, version) else {
            result.error(format!(
                "unknown relation type '{relation_type}' for version {version}"
            ));
            return false;
        };
        trace!(
            relation_type,
            version = %version,
            rule_version = %rule.min_version,
            "Selected relation rule"
        );

        let mut valid = true;
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for reference in relation.references() {
            *counts.entry(reference.role()).or_default() += 1;
        }

        let mut disallowed: Vec<&str> = counts
            .keys()
            .copied()
            .filter(|role| rule.role(role).is_none())
            .collect();
        disallowed.sort_unstable();
        for role in disallowed {
            result.error(format!(
                "role '{role}' is not permitted in relation '{relation_type}'"
            ));
            valid = false;
        }

        for role in &rule.roles {
            let count = counts.get(role.role.as_str()).copied().unwrap_or(0);
            if count < role.min {
                result.critical(format!(
                    "relation '{relation_type}' is missing required role '{}' \
                     ({count} of at least {})",
                    role.role, role.min
                ));
                valid = false;
            } else if count > role.max {
                result.error(format!(
                    "relation '{relation_type}' has too many '{}' references \
                     ({count} of at most {})",
                    role.role, role.max
                ));
                valid = false;
            }
        }

        if rule.ordered && relation.order().is_none() {
            result.error(format!("relation '{relation_type}' requires an order"));
            valid = false;
        }

        if (rule.ordered || relation.order().is_some()) && !in_role_order(rule, relation) {
            result.error(format!(
                "references of relation '{relation_type}' are not in role order: expected {}",
                rule.roles
                    .iter()
                    .map(|r| r.role.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
            valid = false;
        }

        valid
    }
}

/// Check that the references follow the rule's role sequence
///
/// Roles unknown to the rule are reported separately and skipped here.
fn in_role_order(rule: &RelationRule, relation: &Relation) -> bool {
    let positions: Vec<usize> = relation
        .references()
        .iter()
        .filter_map(|r| rule.position(r.role()))
        .collect();
    positions.windows(2).all(|w| w[0] <= w[1])
}

fn validate_rule(rule: &RelationRule) -> Result<()> {
    let context = format!("{} ({})", rule.relation_type, rule.min_version);
    if rule.roles.is_empty() {
        return Err(Error::invalid_resource(
            RESOURCE_NAME,
            format!("{context} declares no roles"),
        ));
    }

    let mut seen = HashSet::new();
    for role in &rule.roles {
        if !seen.insert(role.role.as_str()) {
            return Err(Error::invalid_resource(
                RESOURCE_NAME,
                format!("{context} declares role '{}' twice", role.role),
            ));
        }
        if role.max == 0 || role.min > role.max {
            return Err(Error::invalid_resource(
                RESOURCE_NAME,
                format!(
                    "{context} has invalid bounds [{}, {}] for role '{}'",
                    role.min, role.max, role.role
                ),
            ));
        }
    }
    Ok(())
}
