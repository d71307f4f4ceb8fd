//! Component ids used while building

use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// Handle to a component added to a builder
///
/// Components are addressed by the id generated when they were added, by
/// the numeric id they carry in their source document, or by a caller
/// supplied name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentId {
    /// Process-unique id generated by the builder
    Internal(u64),
    /// Id from the source document, kept as the component's external id
    External(u64),
    /// Caller supplied name
    Named(String),
}

impl From<u64> for ComponentId {
    fn from(id: u64) -> Self {
        Self::External(id)
    }
}

impl From<&str> for ComponentId {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for ComponentId {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<&ComponentId> for ComponentId {
    fn from(id: &ComponentId) -> Self {
        id.clone()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal(id) => write!(f, "#{id}"),
            Self::External(id) => write!(f, "{id}"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Arena positions, generated ids and types of the components added so far
#[derive(Debug, Default)]
pub(crate) struct ComponentIds {
    keys: HashMap<ComponentId, usize>,
    entries: Vec<(u64, String)>,
}

impl ComponentIds {
    /// Register the next component, returning its arena position
    pub(crate) fn insert(
        &mut self,
        internal_id: u64,
        type_id: &str,
        key: Option<&ComponentId>,
    ) -> Result<usize> {
        if let Some(key) = key.filter(|k| self.keys.contains_key(*k)) {
            return Err(Error::DuplicateComponentId(key.clone()));
        }

        let index = self.entries.len();
        self.entries.push((internal_id, type_id.to_string()));
        self.keys.insert(ComponentId::Internal(internal_id), index);
        if let Some(key) = key {
            self.keys.insert(key.clone(), index);
        }
        Ok(index)
    }

    pub(crate) fn resolve(&self, id: &ComponentId) -> Result<usize> {
        self.keys
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownComponent(id.clone()))
    }

    pub(crate) fn internal_id(&self, index: usize) -> u64 {
        self.entries[index].0
    }

    pub(crate) fn type_id(&self, index: usize) -> &str {
        &self.entries[index].1
    }
}
