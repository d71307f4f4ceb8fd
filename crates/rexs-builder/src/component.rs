//! Component builder, the first building stage
#![allow(clippy::must_use_candidate)] // Accessors are clear at call sites without #[must_use].

use crate::attribute::{self, AttributeBuilder, AttributeDraft};
use crate::id::{ComponentId, ComponentIds};
use crate::{Error, Result};
use rexs_ir::ValueType;
use rexs_model::{Component, next_internal_id};
use rexs_schema::SchemaModel;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
struct ComponentDraft {
    internal_id: u64,
    external_id: Option<u64>,
    type_id: String,
    name: Option<String>,
    attributes: Vec<AttributeDraft>,
}

impl ComponentDraft {
    fn into_component(self) -> Component {
        let component = Component::new(
            self.internal_id,
            self.type_id,
            self.name,
            self.attributes
                .into_iter()
                .map(AttributeDraft::into_attribute)
                .collect(),
        );
        match self.external_id {
            Some(id) => component.with_external_id(id),
            None => component,
        }
    }
}

/// Collects components and their attributes against one schema
///
/// Attributes attach to the most recently added or selected component.
/// Components and attributes can only be appended, never edited or removed.
#[derive(Debug)]
pub struct ComponentBuilder {
    pub(crate) schema: Arc<SchemaModel>,
    pub(crate) ids: ComponentIds,
    components: Vec<ComponentDraft>,
    current: Option<usize>,
}

impl ComponentBuilder {
    pub fn new(schema: Arc<SchemaModel>) -> Self {
        Self {
            schema,
            ids: ComponentIds::default(),
            components: Vec::new(),
            current: None,
        }
    }

    /// Schema the builder checks against
    pub fn schema(&self) -> &SchemaModel {
        &self.schema
    }

    /// Add a component of a schema component type
    ///
    /// Returns the generated id of the new component.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema has no such component type.
    pub fn add_component(&mut self, type_id: &str) -> Result<ComponentId> {
        self.push_component(type_id, None)
    }

    /// Add a component addressable by a caller supplied id
    ///
    /// A numeric id becomes the component's external id.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema has no such component type or the id is
    /// already in use.
    pub fn add_component_with_id(
        &mut self,
        type_id: &str,
        id: impl Into<ComponentId>,
    ) -> Result<ComponentId> {
        self.push_component(type_id, Some(id.into()))
    }

    fn push_component(&mut self, type_id: &str, key: Option<ComponentId>) -> Result<ComponentId> {
        self.schema.find_component_by_id(type_id)?;

        let internal_id = next_internal_id();
        let index = self.ids.insert(internal_id, type_id, key.as_ref())?;
        let external_id = match key {
            Some(ComponentId::External(id)) => Some(id),
            _ => None,
        };

        self.components.push(ComponentDraft {
            internal_id,
            external_id,
            type_id: type_id.to_string(),
            name: None,
            attributes: Vec::new(),
        });
        self.current = Some(index);
        debug!(type_id, internal_id, "Added component");

        Ok(key.unwrap_or(ComponentId::Internal(internal_id)))
    }

    /// Name the current component
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoComponent`] if no component was added yet.
    pub fn name(&mut self, name: impl Into<String>) -> Result<()> {
        let index = self.current.ok_or(Error::NoComponent)?;
        self.components[index].name = Some(name.into());
        Ok(())
    }

    /// Make an already added component the current one
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`] if no such component was added.
    pub fn select_component(&mut self, id: impl Into<ComponentId>) -> Result<()> {
        self.current = Some(self.ids.resolve(&id.into())?);
        Ok(())
    }

    /// Add a schema attribute to the current component
    ///
    /// # Errors
    ///
    /// Returns an error if no component was added, the attribute is not
    /// permitted for the component's type, or it is already set.
    pub fn add_attribute(&mut self, id: &str) -> Result<AttributeBuilder<'_>> {
        let index = self.current.ok_or(Error::NoComponent)?;
        let component = &mut self.components[index];
        let schema_attribute = self
            .schema
            .find_component_by_id(&component.type_id)?
            .find_attribute(id)?
            .clone();

        attribute::open(
            &mut component.attributes,
            AttributeDraft::from_schema(schema_attribute),
            &component.type_id,
            &self.schema,
            &self.ids,
        )
    }

    /// Add an attribute outside the schema to the current component
    ///
    /// # Errors
    ///
    /// Returns an error if no component was added or the id is already set.
    pub fn add_custom_attribute(
        &mut self,
        id: &str,
        value_type: ValueType,
    ) -> Result<AttributeBuilder<'_>> {
        let index = self.current.ok_or(Error::NoComponent)?;
        let component = &mut self.components[index];

        attribute::open(
            &mut component.attributes,
            AttributeDraft::custom(id, value_type, &self.schema),
            &component.type_id,
            &self.schema,
            &self.ids,
        )
    }

    /// Check if a component with this id was added
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.ids.resolve(id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub(crate) fn into_components(self) -> Vec<Component> {
        self.components
            .into_iter()
            .map(ComponentDraft::into_component)
            .collect()
    }
}
