#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # rexs-ir
//!
//! Value types, schema versions and diagnostics shared by every crate of the
//! REXS engine.
//!
//! The types here are format-neutral: they carry no knowledge of a particular
//! schema or document layout, only the closed set of value shapes a REXS
//! attribute may take and the severity model used to report findings.

/// Severity, processing mode and the accumulated validation result.
pub mod diagnostics;
/// Closed value type system for attribute values.
pub mod value;
/// `major.minor` schema versions.
pub mod version;

/// Diagnostics recorded while loading, building and merging models.
pub use diagnostics::{Issue, Mode, Severity, ValidationResult, byte_offset};
/// Value primitives for typed attribute data.
pub use value::{CodedType, Matrix, Value, ValueData, ValueType};
/// Totally ordered schema version.
pub use version::Version;

use thiserror::Error;

/// Errors that can occur when working with values and versions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown value type: {0}")]
    UnknownValueType(String),

    #[error("Unknown coded type: {0}")]
    UnknownCodedType(String),

    #[error("Invalid version '{0}': expected <major>.<minor>")]
    InvalidVersion(String),

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Matrix is not rectangular: row {row} has {found} columns, expected {expected}")]
    NotRectangular {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl Error {
    /// Build a type mismatch error from the expected and found type names.
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Crate-local result type for value operations.
pub type Result<T> = std::result::Result<T, Error>;
