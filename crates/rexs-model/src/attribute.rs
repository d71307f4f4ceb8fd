//! Attribute instances
#![allow(clippy::must_use_candidate)] // Accessors are clear at call sites without #[must_use].

use rexs_ir::{Value, ValueData, ValueType};
use rexs_schema::{SchemaAttribute, SchemaUnit};
use std::fmt;
use std::sync::Arc;

/// Unit of an attribute value
///
/// Units compare by name only, so a custom unit equals the schema unit of
/// the same name.
#[derive(Debug, Clone)]
pub enum Unit {
    Schema(SchemaUnit),
    Custom(String),
}

impl Unit {
    pub fn name(&self) -> &str {
        match self {
            Self::Schema(unit) => &unit.name,
            Self::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Unit {}

impl From<SchemaUnit> for Unit {
    fn from(unit: SchemaUnit) -> Self {
        Self::Schema(unit)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An attribute of a component or load component
///
/// Either backed by a schema attribute, whose id and value type it takes, or
/// custom with caller-chosen id, type and unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    id: String,
    unit: Unit,
    value_type: ValueType,
    value: Value,
    schema: Option<Arc<SchemaAttribute>>,
}

impl Attribute {
    /// Create a schema-backed attribute
    pub fn new(schema: Arc<SchemaAttribute>, unit: Unit, value: Value) -> Self {
        Self {
            id: schema.id.clone(),
            unit,
            value_type: schema.value_type,
            value,
            schema: Some(schema),
        }
    }

    /// Create a custom attribute outside the schema
    pub fn custom(id: impl Into<String>, value_type: ValueType, unit: Unit, value: Value) -> Self {
        Self {
            id: id.into(),
            unit,
            value_type,
            value,
            schema: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Localized name from the schema, `None` for custom attributes
    pub fn name(&self) -> Option<&str> {
        self.schema.as_deref().map(|s| s.name.as_str())
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Payload of the value
    pub fn data(&self) -> &ValueData {
        self.value.data()
    }

    pub fn schema_attribute(&self) -> Option<&SchemaAttribute> {
        self.schema.as_deref()
    }

    pub fn is_custom(&self) -> bool {
        self.schema.is_none()
    }

    /// Copy of this attribute carrying a different value
    #[must_use]
    pub fn with_value(&self, value: Value) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_equality_by_name() {
        let schema = Unit::from(SchemaUnit::new(2, "mm"));
        let custom = Unit::Custom("mm".to_string());
        assert_eq!(schema, custom);
        assert_ne!(schema, Unit::Custom("m".to_string()));
        assert!(custom.is_custom());
    }

    #[test]
    fn test_schema_attribute_takes_id_and_type() {
        let mm = SchemaUnit::new(2, "mm");
        let schema =
            Arc::new(SchemaAttribute::new("width", "Width", ValueType::FloatingPoint, mm).unwrap());
        let attribute = Attribute::new(schema.clone(), schema.unit.clone().into(), Value::new(3.5));

        assert_eq!(attribute.id(), "width");
        assert_eq!(attribute.name(), Some("Width"));
        assert_eq!(attribute.value_type(), ValueType::FloatingPoint);
        assert_eq!(attribute.data(), &ValueData::FloatingPoint(3.5));
        assert!(!attribute.is_custom());
    }

    #[test]
    fn test_custom_attribute() {
        let attribute = Attribute::custom(
            "custom_note",
            ValueType::String,
            Unit::Custom("none".to_string()),
            Value::new("hello"),
        );
        assert!(attribute.is_custom());
        assert_eq!(attribute.name(), None);
        assert_eq!(attribute.unit().name(), "none");
    }
}
