//! Schema model definitions

use crate::{Error, Result};
use chrono::NaiveDate;
use rexs_ir::{ValueType, Version};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Release status of a schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Released,
    InDevelopment,
}

/// A unit known to the schema
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaUnit {
    pub id: u64,
    pub name: String,
}

impl SchemaUnit {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One endpoint of an [`Interval`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Bound {
    /// No limit, every value passes
    #[default]
    Unset,
    /// Exclusive limit
    Open(f64),
    /// Inclusive limit
    Closed(f64),
}

/// Permitted numeric range of an attribute
///
/// The two endpoints are independent, so left-open/right-closed ranges and
/// half-bounded ranges are all expressible. The default interval accepts
/// every value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Interval {
    pub min: Bound,
    pub max: Bound,
}

impl Interval {
    pub fn new(min: Bound, max: Bound) -> Self {
        Self { min, max }
    }

    /// Check if `value` lies within both endpoints
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        let above_min = match self.min {
            Bound::Unset => true,
            Bound::Open(min) => value > min,
            Bound::Closed(min) => value >= min,
        };
        let below_max = match self.max {
            Bound::Unset => true,
            Bound::Open(max) => value < max,
            Bound::Closed(max) => value <= max,
        };
        above_min && below_max
    }
}

/// A permitted enum code with its display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub value: String,
    pub name: String,
}

impl EnumValue {
    pub fn new(value: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            name: name.into(),
        }
    }
}

/// Allowed codes of an enum attribute
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumValueSet {
    values: Vec<EnumValue>,
}

impl EnumValueSet {
    pub fn new(values: Vec<EnumValue>) -> Self {
        Self { values }
    }

    /// Check membership by code only
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.values.iter().any(|v| v.value == code)
    }

    #[must_use]
    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Definition of an attribute
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaAttribute {
    pub id: String,
    pub name: String,
    pub value_type: ValueType,
    pub unit: SchemaUnit,
    pub symbol: Option<String>,
    pub interval: Option<Interval>,
    enum_values: Option<EnumValueSet>,
}

impl SchemaAttribute {
    /// Create a non-enum attribute
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] for enum value types, which need an
    /// enum value set; use [`SchemaAttribute::new_enum`] for those.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        value_type: ValueType,
        unit: SchemaUnit,
    ) -> Result<Self> {
        let id = id.into();
        if value_type.is_enum() {
            return Err(Error::InvalidSchema(format!(
                "attribute '{id}' of type {value_type} has no enum values"
            )));
        }
        Ok(Self {
            id,
            name: name.into(),
            value_type,
            unit,
            symbol: None,
            interval: None,
            enum_values: None,
        })
    }

    /// Create an enum attribute with its permitted codes
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] if the type is not an enum type or the
    /// value set is empty.
    pub fn new_enum(
        id: impl Into<String>,
        name: impl Into<String>,
        value_type: ValueType,
        unit: SchemaUnit,
        values: EnumValueSet,
    ) -> Result<Self> {
        let id = id.into();
        if !value_type.is_enum() {
            return Err(Error::InvalidSchema(format!(
                "attribute '{id}' of type {value_type} cannot carry enum values"
            )));
        }
        if values.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "attribute '{id}' of type {value_type} has no enum values"
            )));
        }
        Ok(Self {
            id,
            name: name.into(),
            value_type,
            unit,
            symbol: None,
            interval: None,
            enum_values: Some(values),
        })
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Permitted codes, present for enum types only
    #[must_use]
    pub fn enum_values(&self) -> Option<&EnumValueSet> {
        self.enum_values.as_ref()
    }
}

/// Definition of a component type and the attributes it permits
#[derive(Debug, Clone)]
pub struct SchemaComponent {
    pub id: String,
    pub name: String,
    attributes: Vec<Arc<SchemaAttribute>>,
}

impl SchemaComponent {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        attributes: Vec<Arc<SchemaAttribute>>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            attributes,
        }
    }

    #[must_use]
    pub fn attributes(&self) -> &[Arc<SchemaAttribute>] {
        &self.attributes
    }

    /// Find a permitted attribute by id
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the attribute is not permitted on this
    /// component type.
    pub fn find_attribute(&self, id: &str) -> Result<&Arc<SchemaAttribute>> {
        self.attributes
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::NotFound(format!("attribute '{id}' for component '{}'", self.id)))
    }

    #[must_use]
    pub fn has_attribute(&self, id: &str) -> bool {
        self.attributes.iter().any(|a| a.id == id)
    }
}

/// Complete database model for one (version, language) pair
#[derive(Debug, Clone)]
pub struct SchemaModel {
    pub version: Version,
    pub language: String,
    pub date: Option<NaiveDate>,
    pub status: Status,
    units: HashMap<u64, SchemaUnit>,
    attributes: HashMap<String, Arc<SchemaAttribute>>,
    components: HashMap<String, SchemaComponent>,
}

impl SchemaModel {
    /// Index units, attributes and components
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] on duplicate ids or unit names.
    pub fn new(
        version: Version,
        language: impl Into<String>,
        units: Vec<SchemaUnit>,
        attributes: Vec<Arc<SchemaAttribute>>,
        components: Vec<SchemaComponent>,
    ) -> Result<Self> {
        let language = language.into();
        let context = format!("{version}/{language}");

        let mut unit_map = HashMap::with_capacity(units.len());
        for unit in units {
            if unit_map.values().any(|u: &SchemaUnit| u.name == unit.name) {
                return Err(Error::InvalidSchema(format!(
                    "{context}: duplicate unit name '{}'",
                    unit.name
                )));
            }
            if let Some(previous) = unit_map.insert(unit.id, unit) {
                return Err(Error::InvalidSchema(format!(
                    "{context}: duplicate unit id {}",
                    previous.id
                )));
            }
        }

        let mut attribute_map = HashMap::with_capacity(attributes.len());
        for attribute in attributes {
            if let Some(previous) = attribute_map.insert(attribute.id.clone(), attribute) {
                return Err(Error::InvalidSchema(format!(
                    "{context}: duplicate attribute id '{}'",
                    previous.id
                )));
            }
        }

        let mut component_map = HashMap::with_capacity(components.len());
        for component in components {
            if let Some(previous) = component_map.insert(component.id.clone(), component) {
                return Err(Error::InvalidSchema(format!(
                    "{context}: duplicate component id '{}'",
                    previous.id
                )));
            }
        }

        Ok(Self {
            version,
            language,
            date: None,
            status: Status::default(),
            units: unit_map,
            attributes: attribute_map,
            components: component_map,
        })
    }

    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Find a component type by id
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] naming the missing id.
    pub fn find_component_by_id(&self, id: &str) -> Result<&SchemaComponent> {
        self.components
            .get(id)
            .ok_or_else(|| Error::not_found("component", id))
    }

    /// Find an attribute by id
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] naming the missing id.
    pub fn find_attribute_by_id(&self, id: &str) -> Result<&Arc<SchemaAttribute>> {
        self.attributes
            .get(id)
            .ok_or_else(|| Error::not_found("attribute", id))
    }

    /// Find a unit by id
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] naming the missing id.
    pub fn find_unit_by_id(&self, id: u64) -> Result<&SchemaUnit> {
        self.units.get(&id).ok_or_else(|| Error::not_found("unit", id))
    }

    /// Find a unit by its unique name
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] naming the missing unit.
    pub fn find_unit_by_name(&self, name: &str) -> Result<&SchemaUnit> {
        self.units
            .values()
            .find(|u| u.name == name)
            .ok_or_else(|| Error::not_found("unit", name))
    }

    pub fn components(&self) -> impl Iterator<Item = &SchemaComponent> {
        self.components.values()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Arc<SchemaAttribute>> {
        self.attributes.values()
    }

    pub fn units(&self) -> impl Iterator<Item = &SchemaUnit> {
        self.units.values()
    }
}
