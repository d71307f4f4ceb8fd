//! # rexs-schema
//!
//! The REXS database model: one immutable catalog of component types,
//! attributes and units per (version, language) pair.
//!
//! Schema documents are parsed into raw records by the [`SchemaLoader`],
//! converted into [`SchemaModel`]s and indexed by the [`SchemaRegistry`].
//! A malformed schema document is reported but never blocks the others.

pub mod loader;
pub mod model;
pub mod raw;
pub mod registry;

pub use loader::SchemaLoader;
pub use model::{
    Bound, EnumValue, EnumValueSet, Interval, SchemaAttribute, SchemaComponent, SchemaModel,
    SchemaUnit, Status,
};
pub use raw::{RawAttribute, RawBound, RawComponent, RawEnumValue, RawInterval, RawSchema, RawUnit};
pub use registry::SchemaRegistry;

use thiserror::Error;

/// Errors that can occur when working with schemas
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema not found: {0}")]
    NotFound(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("Parse error at offset {offset}: {message}")]
    Parse { message: String, offset: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Value(#[from] rexs_ir::Error),
}

impl Error {
    /// Build a not-found error naming the kind of entity and its id.
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{kind} '{id}'"))
    }

    /// Build a parse error at a byte offset.
    pub fn parse(message: impl Into<String>, offset: usize) -> Self {
        Self::Parse {
            message: message.into(),
            offset,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
