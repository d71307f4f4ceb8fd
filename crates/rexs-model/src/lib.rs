#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # rexs-model
//!
//! Immutable REXS instance model.
//!
//! A [`Model`] owns its components in an arena; relations and load
//! components refer to them by [`ComponentIndex`], so cross references stay
//! valid for as long as the model lives and never dangle.

/// Attribute instances and units.
pub mod attribute;
/// Components, their arena index and placeholder detection.
pub mod component;
/// Load spectrum overlays.
pub mod load;
/// Model root and provenance.
pub mod model;
/// Relations between components.
pub mod relation;

pub use attribute::{Attribute, Unit};
pub use component::{
    Component, ComponentIndex, DATA_SOURCE, Placeholder, REFERENCED_COMPONENT_ID, next_internal_id,
};
pub use load::{Accumulation, LoadCase, LoadComponent, LoadSpectrum};
pub use model::{Model, ModelInfo};
pub use relation::{Relation, RelationReference};

use thiserror::Error;

/// Errors raised when assembling a model from inconsistent parts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Duplicate component internal id {0}")]
    DuplicateComponent(u64),

    #[error("Relation '{relation_type}' references component index {index} outside the model")]
    DanglingRelationReference { relation_type: String, index: usize },

    #[error("Load component references component index {index} outside the model")]
    DanglingLoadComponent { index: usize },
}

/// Crate-local result type for model assembly.
pub type Result<T> = std::result::Result<T, Error>;
