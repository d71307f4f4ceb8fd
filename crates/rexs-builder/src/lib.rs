#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # rexs-builder
//!
//! Assembles immutable [`rexs_model::Model`]s against one schema version and
//! merges models split across data sources.
//!
//! Building happens in two stages. A [`ComponentBuilder`] collects
//! components and their attributes; it is consumed by a [`ModelBuilder`],
//! which adds relations and the load spectrum and finally produces the
//! model. Every call is checked against the schema immediately, so a
//! violation surfaces at the call that caused it.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let mut components = ComponentBuilder::new(schema);
//! let casing = components.add_component("gear_casing")?;
//! components.add_attribute("temperature_lubricant")?.value(73.2)?;
//!
//! let builder = ModelBuilder::new(components);
//! let model = builder.build("my-app", "1.0", Some("en"))?;
//! ```

mod attribute;
pub mod component;
pub mod id;
pub mod merger;
pub mod model;
#[cfg(test)]
mod testing;

pub use attribute::AttributeBuilder;
pub use component::ComponentBuilder;
pub use id::ComponentId;
pub use merger::ModelMerger;
pub use model::{LoadCaseBuilder, ModelBuilder, RelationBuilder};

use rexs_ir::{CodedType, ValueType};
use thiserror::Error;

/// Errors raised by builder misuse or schema violations
#[derive(Error, Debug)]
pub enum Error {
    #[error("No component has been added yet")]
    NoComponent,

    #[error("Component id '{0}' is already in use")]
    DuplicateComponentId(ComponentId),

    #[error("Unknown component '{0}'")]
    UnknownComponent(ComponentId),

    #[error("Attribute '{attribute}' is already set on component '{component}'")]
    DuplicateAttribute { component: String, attribute: String },

    #[error("Value {value} is not valid for attribute '{attribute}'")]
    InvalidValue { attribute: String, value: String },

    #[error("Attribute '{attribute}' requires unit '{expected}', got '{found}'")]
    UnitMismatch {
        attribute: String,
        expected: String,
        found: String,
    },

    #[error("Attribute '{attribute}' of type {value_type} cannot be coded as {coded}")]
    InvalidCoding {
        attribute: String,
        value_type: ValueType,
        coded: CodedType,
    },

    #[error("Attribute '{attribute}': {source}")]
    Value {
        attribute: String,
        #[source]
        source: rexs_ir::Error,
    },

    #[error(transparent)]
    Schema(#[from] rexs_schema::Error),

    #[error(transparent)]
    Model(#[from] rexs_model::Error),
}

impl Error {
    /// Build an invalid-value error from the attribute id and offending value.
    pub fn invalid_value(attribute: &str, value: impl std::fmt::Display) -> Self {
        Self::InvalidValue {
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }

    /// Wrap a value conversion error with the attribute it occurred on.
    pub fn value(attribute: &str, source: rexs_ir::Error) -> Self {
        Self::Value {
            attribute: attribute.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
