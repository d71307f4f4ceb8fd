//! Model builder, the second building stage

use crate::attribute::{self, AttributeBuilder, AttributeDraft};
use crate::component::ComponentBuilder;
use crate::id::{ComponentId, ComponentIds};
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, Utc};
use rexs_ir::ValueType;
use rexs_model::{
    Accumulation, ComponentIndex, LoadCase, LoadComponent, LoadSpectrum, Model, ModelInfo,
    Relation, RelationReference,
};
use rexs_schema::SchemaModel;
use tracing::info;

#[derive(Debug)]
struct RelationDraft {
    relation_type: String,
    order: Option<u32>,
    references: Vec<RelationReference>,
}

#[derive(Debug)]
struct LoadComponentDraft {
    component: usize,
    attributes: Vec<AttributeDraft>,
}

fn into_load_components(drafts: Vec<LoadComponentDraft>) -> Vec<LoadComponent> {
    drafts
        .into_iter()
        .map(|d| {
            LoadComponent::new(
                ComponentIndex::new(d.component),
                d.attributes
                    .into_iter()
                    .map(AttributeDraft::into_attribute)
                    .collect(),
            )
        })
        .collect()
}

/// Adds relations and the load spectrum, then builds the model
///
/// Created by consuming a [`ComponentBuilder`]; components and attributes can
/// still be added.
#[derive(Debug)]
pub struct ModelBuilder {
    components: ComponentBuilder,
    relations: Vec<RelationDraft>,
    load_cases: Vec<Vec<LoadComponentDraft>>,
    accumulation: Option<Vec<LoadComponentDraft>>,
    date: Option<DateTime<FixedOffset>>,
}

impl ModelBuilder {
    pub fn new(components: ComponentBuilder) -> Self {
        Self {
            components,
            relations: Vec::new(),
            load_cases: Vec::new(),
            accumulation: None,
            date: None,
        }
    }

    /// See [`ComponentBuilder::add_component`]
    ///
    /// # Errors
    ///
    /// Returns an error if the schema has no such component type.
    pub fn add_component(&mut self, type_id: &str) -> Result<ComponentId> {
        self.components.add_component(type_id)
    }

    /// See [`ComponentBuilder::add_component_with_id`]
    ///
    /// # Errors
    ///
    /// Returns an error for unknown types and ids already in use.
    pub fn add_component_with_id(
        &mut self,
        type_id: &str,
        id: impl Into<ComponentId>,
    ) -> Result<ComponentId> {
        self.components.add_component_with_id(type_id, id)
    }

    /// See [`ComponentBuilder::name`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoComponent`] if no component was added yet.
    pub fn name(&mut self, name: impl Into<String>) -> Result<()> {
        self.components.name(name)
    }

    /// See [`ComponentBuilder::select_component`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`] if no such component was added.
    pub fn select_component(&mut self, id: impl Into<ComponentId>) -> Result<()> {
        self.components.select_component(id)
    }

    /// See [`ComponentBuilder::add_attribute`]
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute is not permitted or already set.
    pub fn add_attribute(&mut self, id: &str) -> Result<AttributeBuilder<'_>> {
        self.components.add_attribute(id)
    }

    /// See [`ComponentBuilder::add_custom_attribute`]
    ///
    /// # Errors
    ///
    /// Returns an error if no component was added or the id is already set.
    pub fn add_custom_attribute(
        &mut self,
        id: &str,
        value_type: ValueType,
    ) -> Result<AttributeBuilder<'_>> {
        self.components.add_custom_attribute(id, value_type)
    }

    /// Start a relation of the given type
    ///
    /// A relation whose reference fails to resolve is discarded as a whole.
    pub fn add_relation(&mut self, relation_type: &str) -> RelationBuilder<'_> {
        self.relations.push(RelationDraft {
            relation_type: relation_type.to_string(),
            order: None,
            references: Vec::new(),
        });
        RelationBuilder {
            relations: &mut self.relations,
            ids: &self.components.ids,
        }
    }

    /// Start a new load case
    pub fn add_load_case(&mut self) -> LoadCaseBuilder<'_> {
        self.load_cases.push(Vec::new());
        let index = self.load_cases.len() - 1;
        LoadCaseBuilder {
            components: &mut self.load_cases[index],
            schema: &self.components.schema,
            ids: &self.components.ids,
            current: None,
        }
    }

    /// Open the accumulation, creating it on first use
    pub fn add_accumulation(&mut self) -> LoadCaseBuilder<'_> {
        LoadCaseBuilder {
            components: self.accumulation.get_or_insert_with(Vec::new),
            schema: &self.components.schema,
            ids: &self.components.ids,
            current: None,
        }
    }

    /// Set the model date, defaulting to the build time
    pub fn date(&mut self, date: DateTime<FixedOffset>) {
        self.date = Some(date);
    }

    /// Finish the immutable model
    ///
    /// The model takes the version of the builder's schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the collected parts are inconsistent.
    pub fn build(
        self,
        application_id: &str,
        application_version: &str,
        language: Option<&str>,
    ) -> Result<Model> {
        let info = ModelInfo {
            application_id: application_id.to_string(),
            application_version: application_version.to_string(),
            date: self.date.unwrap_or_else(|| Utc::now().fixed_offset()),
            version: self.components.schema().version,
            language: language.map(str::to_string),
        };

        let relations: Vec<Relation> = self
            .relations
            .into_iter()
            .map(|d| Relation::new(d.relation_type, d.order, d.references))
            .collect();
        let load_spectrum = LoadSpectrum::new(
            self.load_cases
                .into_iter()
                .map(|c| LoadCase::new(into_load_components(c)))
                .collect(),
            self.accumulation
                .map(|a| Accumulation::new(into_load_components(a))),
        );

        let components = self.components.into_components();
        info!(
            application_id,
            version = %info.version,
            components = components.len(),
            relations = relations.len(),
            load_cases = load_spectrum.load_cases().len(),
            "Built model"
        );
        Ok(Model::new(info, components, relations, load_spectrum)?)
    }
}

impl From<ComponentBuilder> for ModelBuilder {
    fn from(components: ComponentBuilder) -> Self {
        Self::new(components)
    }
}

/// Collects the role references of one relation
///
/// The relation under construction is always the last draft.
pub struct RelationBuilder<'a> {
    relations: &'a mut Vec<RelationDraft>,
    ids: &'a ComponentIds,
}

impl RelationBuilder<'_> {
    /// Declare the reference order
    #[must_use]
    pub fn order(self, order: u32) -> Self {
        if let Some(draft) = self.relations.last_mut() {
            draft.order = Some(order);
        }
        self
    }

    /// Add a role reference to an already added component
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`] if no such component was added.
    pub fn add_ref(self, role: &str, id: impl Into<ComponentId>) -> Result<Self> {
        self.push(role, id.into(), None)
    }

    /// Add a role reference carrying a free-text hint
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`] if no such component was added.
    pub fn add_ref_with_hint(
        self,
        role: &str,
        id: impl Into<ComponentId>,
        hint: impl Into<String>,
    ) -> Result<Self> {
        self.push(role, id.into(), Some(hint.into()))
    }

    fn push(self, role: &str, id: ComponentId, hint: Option<String>) -> Result<Self> {
        let index = match self.ids.resolve(&id) {
            Ok(index) => index,
            Err(e) => {
                self.relations.pop();
                return Err(e);
            }
        };
        if let Some(draft) = self.relations.last_mut() {
            draft
                .references
                .push(RelationReference::new(role, hint, ComponentIndex::new(index)));
        }
        Ok(self)
    }
}

/// Attaches overlay attributes to built components for one load case or
/// the accumulation
pub struct LoadCaseBuilder<'a> {
    components: &'a mut Vec<LoadComponentDraft>,
    schema: &'a SchemaModel,
    ids: &'a ComponentIds,
    current: Option<usize>,
}

impl LoadCaseBuilder<'_> {
    /// Select the component subsequent attributes apply to
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`] if no such component was added.
    pub fn add_component(&mut self, id: impl Into<ComponentId>) -> Result<()> {
        let component = self.ids.resolve(&id.into())?;
        let position = match self.components.iter().position(|c| c.component == component) {
            Some(position) => position,
            None => {
                self.components.push(LoadComponentDraft {
                    component,
                    attributes: Vec::new(),
                });
                self.components.len() - 1
            }
        };
        self.current = Some(position);
        Ok(())
    }

    /// Add a schema attribute of the selected component's type
    ///
    /// # Errors
    ///
    /// Returns an error if no component was selected, the attribute is not
    /// permitted for the component's type, or it is already set.
    pub fn add_attribute(&mut self, id: &str) -> Result<AttributeBuilder<'_>> {
        let position = self.current.ok_or(Error::NoComponent)?;
        let draft = &mut self.components[position];
        let type_id = self.ids.type_id(draft.component);
        let schema_attribute = self
            .schema
            .find_component_by_id(type_id)?
            .find_attribute(id)?
            .clone();

        attribute::open(
            &mut draft.attributes,
            AttributeDraft::from_schema(schema_attribute),
            type_id,
            self.schema,
            self.ids,
        )
    }

    /// Add an attribute outside the schema to the selected component
    ///
    /// # Errors
    ///
    /// Returns an error if no component was selected or the id is already set.
    pub fn add_custom_attribute(
        &mut self,
        id: &str,
        value_type: ValueType,
    ) -> Result<AttributeBuilder<'_>> {
        let position = self.current.ok_or(Error::NoComponent)?;
        let draft = &mut self.components[position];
        let type_id = self.ids.type_id(draft.component);

        attribute::open(
            &mut draft.attributes,
            AttributeDraft::custom(id, value_type, self.schema),
            type_id,
            self.schema,
            self.ids,
        )
    }
}
