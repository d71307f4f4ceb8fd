//! Model document loader
//!
//! Turns a parsed [`ModelDocument`] into a [`Model`] through the builder of
//! the document's schema version. Loading runs in this order:
//!
//! 1. components with every attribute that is not a component reference;
//! 2. component reference attributes, once all targets exist;
//! 3. relations and the load spectrum;
//! 4. relation type checks on the built model;
//! 5. with [`ModelLoader::load_str`], merging of every data source the
//!    model's placeholders name.
//!
//! A component or relation that cannot be built is reported as an error and
//! skipped, so a relaxed load still yields a model. An attribute whose value
//! fails its checks stays on its component without a value. Attributes the
//! schema does not permit for a component are kept as custom attributes.

use crate::document::{
    ModelDocument, RawAttribute, RawLoadCase, RawModel, RawRelation, TypedValue,
};
use crate::resolver::DataSourceResolver;
use crate::{Error, Result};
use chrono::DateTime;
use rexs_builder::{
    AttributeBuilder, ComponentBuilder, LoadCaseBuilder, ModelBuilder, ModelMerger,
};
use rexs_ir::{Issue, Severity, ValidationResult, ValueType, Version};
use rexs_model::{DATA_SOURCE, Model, REFERENCED_COMPONENT_ID};
use rexs_schema::{SchemaModel, SchemaRegistry};
use rexs_validation::{ExternalSubcomponentsChecker, RelationTypeChecker};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, trace};

const CUSTOM_PREFIX: &str = "custom_";

/// Attribute ids accepted outside the schema without a finding
fn is_custom_id(id: &str) -> bool {
    id.starts_with(CUSTOM_PREFIX) || id == DATA_SOURCE || id == REFERENCED_COMPONENT_ID
}

/// Either building stage that attributes can be added to
trait AttributeSink {
    fn schema_attribute(&mut self, id: &str) -> rexs_builder::Result<AttributeBuilder<'_>>;

    fn custom_attribute(
        &mut self,
        id: &str,
        value_type: ValueType,
    ) -> rexs_builder::Result<AttributeBuilder<'_>>;
}

impl AttributeSink for ModelBuilder {
    fn schema_attribute(&mut self, id: &str) -> rexs_builder::Result<AttributeBuilder<'_>> {
        self.add_attribute(id)
    }

    fn custom_attribute(
        &mut self,
        id: &str,
        value_type: ValueType,
    ) -> rexs_builder::Result<AttributeBuilder<'_>> {
        self.add_custom_attribute(id, value_type)
    }
}

impl AttributeSink for LoadCaseBuilder<'_> {
    fn schema_attribute(&mut self, id: &str) -> rexs_builder::Result<AttributeBuilder<'_>> {
        self.add_attribute(id)
    }

    fn custom_attribute(
        &mut self,
        id: &str,
        value_type: ValueType,
    ) -> rexs_builder::Result<AttributeBuilder<'_>> {
        self.add_custom_attribute(id, value_type)
    }
}

fn fill(
    attribute: AttributeBuilder<'_>,
    raw: &RawAttribute,
    value: TypedValue,
) -> rexs_builder::Result<()> {
    let mut attribute = match value {
        TypedValue::Data(data) => attribute.value(data)?,
        TypedValue::Reference(target) => attribute.reference(target)?,
    };
    if let Some(coded) = raw.coded {
        attribute = attribute.coded(coded)?;
    }
    if let Some(unit) = &raw.unit {
        attribute.unit(unit)?;
    }
    Ok(())
}

/// Document ids of the components built so far with their types
type ComponentTypes = HashMap<u64, String>;

/// Shared state while one document is built
struct Context<'a> {
    schema: &'a SchemaModel,
    types: ComponentTypes,
    result: &'a mut ValidationResult,
}

impl Context<'_> {
    fn add_attribute(
        &mut self,
        sink: &mut impl AttributeSink,
        component: u64,
        raw: &RawAttribute,
        value_type: ValueType,
        value: TypedValue,
    ) {
        let Some(type_id) = self.types.get(&component) else {
            return;
        };
        let permitted = self
            .schema
            .find_component_by_id(type_id)
            .is_ok_and(|c| c.has_attribute(&raw.id));

        let opened = if permitted {
            sink.schema_attribute(&raw.id)
        } else {
            if !is_custom_id(&raw.id) {
                self.result.error(format!(
                    "attribute '{}' is not permitted for component {component} of type '{type_id}'",
                    raw.id
                ));
            }
            sink.custom_attribute(&raw.id, value_type)
        };

        if let Err(e) = opened.and_then(|attribute| fill(attribute, raw, value)) {
            self.result.error(format!("component {component}: {e}"));
        }
    }

    fn add_load_case(&mut self, load_case: &mut LoadCaseBuilder<'_>, raw: &RawLoadCase) {
        for component in &raw.components {
            if let Err(e) = load_case.add_component(component.id) {
                self.result.error(format!("load case: {e}"));
                continue;
            }
            for attribute in &component.attributes {
                match attribute.typed_value() {
                    Ok((value_type, value)) => {
                        self.add_attribute(load_case, component.id, attribute, value_type, value);
                    }
                    Err(e) => self
                        .result
                        .error(format!("load case component {}: {e}", component.id)),
                }
            }
        }
    }
}

fn add_relation(builder: &mut ModelBuilder, raw: &RawRelation) -> rexs_builder::Result<()> {
    let mut relation = builder.add_relation(&raw.relation_type);
    if let Some(order) = raw.order {
        relation = relation.order(order);
    }
    for reference in &raw.refs {
        relation = match &reference.hint {
            Some(hint) => relation.add_ref_with_hint(&reference.role, reference.id, hint.clone())?,
            None => relation.add_ref(&reference.role, reference.id)?,
        };
    }
    Ok(())
}

/// Loads model documents against a schema registry
#[derive(Debug)]
pub struct ModelLoader {
    registry: Arc<SchemaRegistry>,
    relations: RelationTypeChecker,
    default_language: String,
}

impl ModelLoader {
    /// Create a loader with the packaged relation type rules
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the packaged rules cannot be parsed.
    pub fn new(registry: Arc<SchemaRegistry>) -> Result<Self> {
        Ok(Self {
            registry,
            relations: RelationTypeChecker::new()?,
            default_language: "en".to_string(),
        })
    }

    /// Schema language used when a document names none
    #[must_use]
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Build the model of one document without resolving data sources
    ///
    /// Returns `None` if the document cannot be built or `result` holds an
    /// error or critical issue afterwards.
    pub fn parse_str(&self, json: &str, result: &mut ValidationResult) -> Option<Model> {
        let document = match ModelDocument::parse(json) {
            Ok(document) => document,
            Err(Error::Parse { message, offset }) => {
                result.add_issue(Issue::new(Severity::Critical, message).at(offset));
                return None;
            }
            Err(e) => {
                result.critical(e.to_string());
                return None;
            }
        };

        let model = self.build(&document.model, result)?;
        result.is_success().then_some(model)
    }

    /// Read and build one model file without resolving data sources
    pub fn parse_file(&self, path: &Path, result: &mut ValidationResult) -> Option<Model> {
        trace!("Loading model from file: {:?}", path);
        match std::fs::read_to_string(path) {
            Ok(json) => self.parse_str(&json, result),
            Err(e) => {
                result.critical(format!("cannot read model file '{}': {e}", path.display()));
                None
            }
        }
    }

    /// Build a model and merge every data source its placeholders name
    pub fn load_str(
        &self,
        json: &str,
        result: &mut ValidationResult,
        resolver: Option<&dyn DataSourceResolver>,
    ) -> Option<Model> {
        let model = self.parse_str(json, result)?;
        self.merge_data_sources(model, result, resolver)
    }

    /// Read a model file and merge every data source its placeholders name
    pub fn load_file(
        &self,
        path: &Path,
        result: &mut ValidationResult,
        resolver: Option<&dyn DataSourceResolver>,
    ) -> Option<Model> {
        let model = self.parse_file(path, result)?;
        self.merge_data_sources(model, result, resolver)
    }

    /// Resolve the placeholders of `model`, one data source after another
    pub fn merge_data_sources(
        &self,
        mut model: Model,
        result: &mut ValidationResult,
        resolver: Option<&dyn DataSourceResolver>,
    ) -> Option<Model> {
        let labels: Vec<String> = model.data_sources().into_iter().map(str::to_string).collect();
        if labels.is_empty() {
            return Some(model);
        }
        let Some(resolver) = resolver else {
            result.critical(format!(
                "model references data sources ({}) but no resolver is available",
                labels.join(", ")
            ));
            return None;
        };

        let merger = merger_for(model.version(), result)?;
        for label in &labels {
            let Some(referenced) = resolver.resolve(self, result, label) else {
                result.critical(format!("cannot resolve data source '{label}'"));
                return None;
            };
            let Some(merged) = merger.merge(result, &model, label, &referenced) else {
                result.critical(format!("cannot merge data source '{label}'"));
                return None;
            };
            info!(label = %label, components = merged.components().len(), "Merged data source");
            model = merged;
        }

        result.is_success().then_some(model)
    }

    fn build(&self, raw: &RawModel, result: &mut ValidationResult) -> Option<Model> {
        let version = match Version::parse(&raw.version) {
            Ok(version) => version,
            Err(e) => {
                result.critical(format!("invalid model version: {e}"));
                return None;
            }
        };
        let language = raw.language.as_deref().unwrap_or(&self.default_language);
        let schema = match self.registry.get_model(version, language) {
            Ok(schema) => schema,
            Err(e) => {
                result.critical(format!(
                    "no schema for version {version} in language '{language}': {e}"
                ));
                return None;
            }
        };

        let mut builder = ModelBuilder::new(ComponentBuilder::new(Arc::clone(&schema)));
        if let Some(date) = &raw.date {
            match DateTime::parse_from_rfc3339(date) {
                Ok(date) => builder.date(date),
                Err(e) => result.error(format!("invalid model date '{date}': {e}")),
            }
        }

        let mut context = Context {
            schema: &schema,
            types: ComponentTypes::new(),
            result,
        };
        let mut references = Vec::new();

        for component in &raw.components {
            if let Err(e) = builder.add_component_with_id(&component.type_id, component.id) {
                context.result.error(format!("component {}: {e}", component.id));
                continue;
            }
            context.types.insert(component.id, component.type_id.clone());
            if let Some(name) = &component.name {
                if let Err(e) = builder.name(name.clone()) {
                    context.result.error(format!("component {}: {e}", component.id));
                }
            }

            for attribute in &component.attributes {
                match attribute.typed_value() {
                    Ok((value_type, TypedValue::Reference(target))) => {
                        references.push((component.id, attribute, value_type, target));
                    }
                    Ok((value_type, value)) => context.add_attribute(
                        &mut builder,
                        component.id,
                        attribute,
                        value_type,
                        value,
                    ),
                    Err(e) => context.result.error(format!("component {}: {e}", component.id)),
                }
            }
        }
        debug!(
            components = context.types.len(),
            references = references.len(),
            "Added components"
        );

        for (component, attribute, value_type, target) in references {
            if let Err(e) = builder.select_component(component) {
                context.result.error(format!("component {component}: {e}"));
                continue;
            }
            context.add_attribute(
                &mut builder,
                component,
                attribute,
                value_type,
                TypedValue::Reference(target),
            );
        }

        for relation in &raw.relations {
            let missing = relation
                .refs
                .iter()
                .find(|r| !context.types.contains_key(&r.id));
            if let Some(missing) = missing {
                context.result.error(format!(
                    "relation '{}' references unknown component {}",
                    relation.relation_type, missing.id
                ));
                continue;
            }
            if let Err(e) = add_relation(&mut builder, relation) {
                context.result.error(format!("relation '{}': {e}", relation.relation_type));
            }
        }

        if let Some(spectrum) = &raw.load_spectrum {
            for load_case in &spectrum.load_cases {
                context.add_load_case(&mut builder.add_load_case(), load_case);
            }
            if let Some(accumulation) = &spectrum.accumulation {
                context.add_load_case(&mut builder.add_accumulation(), accumulation);
            }
        }

        let model = match builder.build(
            &raw.application_id,
            &raw.application_version,
            raw.language.as_deref(),
        ) {
            Ok(model) => model,
            Err(e) => {
                result.critical(format!("cannot build model: {e}"));
                return None;
            }
        };

        for relation in model.relations() {
            self.relations.check(result, version, relation);
        }

        info!(
            application_id = %raw.application_id,
            version = %version,
            components = model.components().len(),
            issues = result.len(),
            "Loaded model"
        );
        Some(model)
    }
}

fn merger_for(version: Version, result: &mut ValidationResult) -> Option<ModelMerger> {
    match ExternalSubcomponentsChecker::new(version) {
        Ok(checker) if checker.is_supported() => {
            Some(ModelMerger::with_subcomponent_checker(checker))
        }
        Ok(_) => {
            debug!(%version, "No subcomponent rules for version, merging without imports");
            Some(ModelMerger::new())
        }
        Err(e) => {
            result.critical(format!("cannot load subcomponent rules: {e}"));
            None
        }
    }
}
