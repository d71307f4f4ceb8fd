//! Fluent attribute descriptions

use crate::id::{ComponentId, ComponentIds};
use crate::{Error, Result};
use rexs_ir::{CodedType, Value, ValueData, ValueType};
use rexs_model::{Attribute, Unit};
use rexs_schema::{SchemaAttribute, SchemaModel};
use std::sync::Arc;
use tracing::trace;

/// Unit given to custom attributes until one is set explicitly
const DEFAULT_UNIT: &str = "none";

/// Attribute under construction
#[derive(Debug, Clone)]
pub(crate) struct AttributeDraft {
    id: String,
    value_type: ValueType,
    unit: Unit,
    value: Value,
    schema: Option<Arc<SchemaAttribute>>,
}

impl AttributeDraft {
    pub(crate) fn from_schema(schema: Arc<SchemaAttribute>) -> Self {
        Self {
            id: schema.id.clone(),
            value_type: schema.value_type,
            unit: Unit::Schema(schema.unit.clone()),
            value: Value::empty(),
            schema: Some(schema),
        }
    }

    pub(crate) fn custom(id: &str, value_type: ValueType, schema: &SchemaModel) -> Self {
        let unit = schema
            .find_unit_by_name(DEFAULT_UNIT)
            .map_or_else(|_| Unit::Custom(DEFAULT_UNIT.to_string()), |u| Unit::Schema(u.clone()));
        Self {
            id: id.to_string(),
            value_type,
            unit,
            value: Value::empty(),
            schema: None,
        }
    }

    pub(crate) fn into_attribute(self) -> Attribute {
        match self.schema {
            Some(schema) => Attribute::new(schema, self.unit, self.value),
            None => Attribute::custom(self.id, self.value_type, self.unit, self.value),
        }
    }
}

/// Append `draft` to `attributes` and open it for description
///
/// Fails if an attribute with the same id is already present.
pub(crate) fn open<'a>(
    attributes: &'a mut Vec<AttributeDraft>,
    draft: AttributeDraft,
    owner: &str,
    schema: &'a SchemaModel,
    ids: &'a ComponentIds,
) -> Result<AttributeBuilder<'a>> {
    if attributes.iter().any(|a| a.id == draft.id) {
        return Err(Error::DuplicateAttribute {
            component: owner.to_string(),
            attribute: draft.id,
        });
    }
    attributes.push(draft);
    let index = attributes.len() - 1;
    Ok(AttributeBuilder {
        draft: &mut attributes[index],
        schema,
        ids,
    })
}

/// Describes the attribute just added to a component or load component
///
/// Every call is checked on the spot; an error leaves the attribute with the
/// state it had before the call.
#[derive(Debug)]
pub struct AttributeBuilder<'a> {
    draft: &'a mut AttributeDraft,
    schema: &'a SchemaModel,
    ids: &'a ComponentIds,
}

impl AttributeBuilder<'_> {
    pub fn id(&self) -> &str {
        &self.draft.id
    }

    pub fn value_type(&self) -> ValueType {
        self.draft.value_type
    }

    /// Set the unit by name
    ///
    /// Schema attributes only accept their schema unit; custom attributes
    /// take any unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnitMismatch`] if a schema attribute is given a
    /// different unit.
    pub fn unit(self, name: &str) -> Result<Self> {
        if let Some(schema) = &self.draft.schema {
            if schema.unit.name != name {
                return Err(Error::UnitMismatch {
                    attribute: self.draft.id.clone(),
                    expected: schema.unit.name.clone(),
                    found: name.to_string(),
                });
            }
            return Ok(self);
        }

        self.draft.unit = self
            .schema
            .find_unit_by_name(name)
            .map_or_else(|_| Unit::Custom(name.to_string()), |u| Unit::Schema(u.clone()));
        Ok(self)
    }

    /// Set the value
    ///
    /// The value is converted to the attribute's type and, for schema
    /// attributes, checked against the range or enum constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] when the value has the wrong shape and
    /// [`Error::InvalidValue`] when it violates the schema constraints.
    pub fn value(self, data: impl Into<ValueData>) -> Result<Self> {
        let data: ValueData = data.into();
        let data = data
            .conform(self.draft.value_type)
            .map_err(|e| Error::value(&self.draft.id, e))?;

        let mut value = Value::new(data);
        if let Some(coded) = self.draft.value.coded() {
            value = value.with_coded(coded);
        }
        if let Some(schema) = &self.draft.schema {
            if !rexs_validation::value::check(schema, &value) {
                return Err(Error::invalid_value(&self.draft.id, &value));
            }
        }

        trace!(attribute = %self.draft.id, value = %value, "Set attribute value");
        self.draft.value = value;
        Ok(self)
    }

    /// Flag the value for coded output
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoding`] unless the attribute is an integer or
    /// floating point array or matrix the encoding supports.
    pub fn coded(self, coded: CodedType) -> Result<Self> {
        if !coded.supports(self.draft.value_type) {
            return Err(Error::InvalidCoding {
                attribute: self.draft.id.clone(),
                value_type: self.draft.value_type,
                coded,
            });
        }
        let value = std::mem::take(&mut self.draft.value);
        self.draft.value = value.with_coded(coded);
        Ok(self)
    }

    /// Set the value to a reference to an already added component
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] if the attribute is not a component reference
    /// and [`Error::UnknownComponent`] if no such component was added.
    pub fn reference(self, id: impl Into<ComponentId>) -> Result<Self> {
        if self.draft.value_type != ValueType::ReferenceComponent {
            return Err(Error::value(
                &self.draft.id,
                rexs_ir::Error::type_mismatch(
                    self.draft.value_type.as_str(),
                    ValueType::ReferenceComponent.as_str(),
                ),
            ));
        }
        let index = self.ids.resolve(&id.into())?;
        self.draft.value = Value::new(ValueData::ReferenceComponent(self.ids.internal_id(index)));
        Ok(self)
    }
}
