//! Components
#![allow(clippy::must_use_candidate)] // Accessors are clear at call sites without #[must_use].

use crate::attribute::Attribute;
use rexs_ir::ValueData;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Attribute naming the data source of a placeholder component
pub const DATA_SOURCE: &str = "data_source";
/// Attribute holding the external id a placeholder stands for
pub const REFERENCED_COMPONENT_ID: &str = "referenced_component_id";

static NEXT_INTERNAL_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique component id
pub fn next_internal_id() -> u64 {
    NEXT_INTERNAL_ID.fetch_add(1, Ordering::Relaxed)
}

/// Position of a component in its model's component arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentIndex(usize);

impl ComponentIndex {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for ComponentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// External reference carried by a placeholder component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub data_source: &'a str,
    pub referenced_id: u64,
}

/// A component instance
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    internal_id: u64,
    external_id: Option<u64>,
    type_id: String,
    name: Option<String>,
    attributes: Vec<Attribute>,
}

impl Component {
    pub fn new(
        internal_id: u64,
        type_id: impl Into<String>,
        name: Option<String>,
        attributes: Vec<Attribute>,
    ) -> Self {
        Self {
            internal_id,
            external_id: None,
            type_id: type_id.into(),
            name,
            attributes,
        }
    }

    /// Record the id the component carries in its source document
    #[must_use]
    pub fn with_external_id(mut self, external_id: u64) -> Self {
        self.external_id = Some(external_id);
        self
    }

    pub fn internal_id(&self) -> u64 {
        self.internal_id
    }

    pub fn external_id(&self) -> Option<u64> {
        self.external_id
    }

    /// Schema component id
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, id: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.id() == id)
    }

    pub fn has_attribute(&self, id: &str) -> bool {
        self.attribute(id).is_some()
    }

    /// External reference if this component is a placeholder
    ///
    /// A placeholder carries a string `data_source` and an integer
    /// `referenced_component_id` attribute.
    pub fn placeholder(&self) -> Option<Placeholder<'_>> {
        let data_source = match self.attribute(DATA_SOURCE)?.data() {
            ValueData::String(s) | ValueData::FileReference(s) => s.as_str(),
            _ => return None,
        };
        let referenced_id = match self.attribute(REFERENCED_COMPONENT_ID)?.data() {
            ValueData::Integer(id) => u64::try_from(*id).ok()?,
            _ => return None,
        };
        Some(Placeholder {
            data_source,
            referenced_id,
        })
    }

    /// Attributes without the placeholder markers
    pub fn own_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.id() != DATA_SOURCE && a.id() != REFERENCED_COMPONENT_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Unit;
    use rexs_ir::{Value, ValueType};

    fn custom(id: &str, value_type: ValueType, value: impl Into<ValueData>) -> Attribute {
        Attribute::custom(id, value_type, Unit::Custom("none".to_string()), Value::new(value))
    }

    #[test]
    fn test_internal_ids_are_unique() {
        let a = next_internal_id();
        let b = next_internal_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_placeholder_detection() {
        let component = Component::new(
            next_internal_id(),
            "gear",
            None,
            vec![
                custom(DATA_SOURCE, ValueType::String, "bearings.rexsj"),
                custom(REFERENCED_COMPONENT_ID, ValueType::Integer, 7_i64),
                custom("width", ValueType::FloatingPoint, 3.0),
            ],
        );

        let placeholder = component.placeholder().unwrap();
        assert_eq!(placeholder.data_source, "bearings.rexsj");
        assert_eq!(placeholder.referenced_id, 7);
        assert_eq!(component.own_attributes().count(), 1);
    }

    #[test]
    fn test_not_a_placeholder() {
        let plain = Component::new(next_internal_id(), "gear", Some("Gear 1".to_string()), vec![]);
        assert!(plain.placeholder().is_none());

        let negative = Component::new(
            next_internal_id(),
            "gear",
            None,
            vec![
                custom(DATA_SOURCE, ValueType::String, "x"),
                custom(REFERENCED_COMPONENT_ID, ValueType::Integer, -1_i64),
            ],
        );
        assert!(negative.placeholder().is_none());
    }
}
