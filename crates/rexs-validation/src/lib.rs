#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # rexs-validation
//!
//! Checks applied while models are built and merged.
//!
//! - [`value::check`] validates a value against the range or enum constraints
//!   of its schema attribute.
//! - [`RelationTypeChecker`] validates the role references of a relation
//!   against the rule for its type and schema version.
//! - [`ExternalSubcomponentsChecker`] decides whether one component type may
//!   be nested under another when components are imported from an external
//!   data source.
//!
//! The rule tables for the two checkers are packaged with the crate and
//! parsed once at construction. Findings go into a
//! [`rexs_ir::ValidationResult`]; the checkers never downgrade severities
//! themselves.
//!
//! ## Example Usage
//!
//! ```rust
//! use rexs_ir::{ValidationResult, Version};
//! use rexs_model::{ComponentIndex, Relation, RelationReference};
//! use rexs_validation::RelationTypeChecker;
//!
//! let checker = RelationTypeChecker::new().unwrap();
//! let relation = Relation::new(
//!     "planet_shaft",
//!     None,
//!     vec![
//!         RelationReference::new("planetary_stage", None, ComponentIndex::new(0)),
//!         RelationReference::new("shaft", None, ComponentIndex::new(1)),
//!     ],
//! );
//!
//! let mut result = ValidationResult::new();
//! assert!(checker.check(&mut result, Version::new(1, 4), &relation));
//! assert!(result.is_empty());
//! ```

pub mod relation;
pub mod subcomponent;
pub mod value;

pub use relation::{RelationRule, RelationTypeChecker, RoleRule};
pub use subcomponent::ExternalSubcomponentsChecker;

use thiserror::Error;

/// Errors raised when a rule resource cannot be loaded
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed rule resource '{resource}': {message}")]
    InvalidResource { resource: String, message: String },

    #[error("JSON error in rule resource: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a malformed-resource error naming the resource.
    pub fn invalid_resource(resource: &str, message: impl Into<String>) -> Self {
        Self::InvalidResource {
            resource: resource.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
