//! Merging of models split across data sources
//!
//! A main model refers to components kept in another document through
//! placeholder components. A placeholder names its data source and the
//! external id of the component it stands for. Merging one data source
//! replaces each of its placeholders by the referenced component:
//!
//! - the resolved component keeps the placeholder's internal id, position
//!   and name, so relations of the main model stay valid;
//! - its type and attributes come from the referenced component, with the
//!   placeholder's own attributes taking precedence.
//!
//! With an [`ExternalSubcomponentsChecker`] configured, relations in which a
//! resolved component holds a container role (such as `assembly`) and every
//! other member is a permissible sub-component are imported along with those
//! sub-components. Other relations of the referenced model are left behind.

use rexs_ir::{Value, ValueData, ValidationResult};
use rexs_model::{
    Attribute, Component, ComponentIndex, Model, Relation, RelationReference, next_internal_id,
};
use rexs_validation::ExternalSubcomponentsChecker;
use std::collections::HashMap;
use tracing::{debug, info};

/// Resolves placeholders of one data source at a time
#[derive(Debug, Clone, Default)]
pub struct ModelMerger {
    subcomponents: Option<ExternalSubcomponentsChecker>,
}

/// Index bookkeeping for one merge
#[derive(Default)]
struct Mapping<'m> {
    /// Main model position per resolved placeholder, with its source component
    resolved: Vec<(ComponentIndex, ComponentIndex)>,
    /// Referenced model position to merged model position
    positions: HashMap<ComponentIndex, ComponentIndex>,
    /// Referenced model internal id to merged model internal id
    internal_ids: HashMap<u64, u64>,
    /// Referenced components appended to the merged model
    imports: Vec<ComponentIndex>,
    relations: Vec<&'m Relation>,
}

impl ModelMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merger that also imports permissible sub-components
    pub fn with_subcomponent_checker(checker: ExternalSubcomponentsChecker) -> Self {
        Self {
            subcomponents: Some(checker),
        }
    }

    /// Resolve every placeholder of `data_source` in `main` from `referenced`
    ///
    /// Returns a new model and leaves both inputs untouched. Returns `None`
    /// with one critical issue if the versions differ, and `None` with one
    /// error per placeholder whose referenced id is missing.
    pub fn merge(
        &self,
        result: &mut ValidationResult,
        main: &Model,
        data_source: &str,
        referenced: &Model,
    ) -> Option<Model> {
        if main.version() != referenced.version() {
            result.critical(format!(
                "cannot reference components from different versions: \
                 main model has {}, data source '{data_source}' has {}",
                main.version(),
                referenced.version()
            ));
            return None;
        }

        let mut mapping = Mapping::default();
        let mut unresolved = false;
        for (index, placeholder) in main.placeholders(data_source) {
            match referenced.find_by_external_id(placeholder.referenced_id) {
                Some((source, _)) => {
                    mapping.resolved.push((index, source));
                    mapping.positions.insert(source, index);
                }
                None => {
                    result.error(format!(
                        "referenced component id {} not found in data source '{data_source}'",
                        placeholder.referenced_id
                    ));
                    unresolved = true;
                }
            }
        }
        if unresolved {
            return None;
        }

        for &(index, source) in &mapping.resolved {
            if let Some(placeholder) = main.component(index) {
                let source_id = referenced.components()[source.get()].internal_id();
                mapping
                    .internal_ids
                    .insert(source_id, placeholder.internal_id());
            }
        }

        if let Some(checker) = &self.subcomponents {
            collect_imports(checker, result, referenced, &mut mapping, main.components().len());
        }

        let mut components: Vec<Component> = main.components().to_vec();
        for &(index, source) in &mapping.resolved {
            let placeholder = &main.components()[index.get()];
            let source = &referenced.components()[source.get()];
            components[index.get()] = resolve(placeholder, source, &mapping, data_source, result);
        }
        for &source in &mapping.imports {
            let component = &referenced.components()[source.get()];
            let internal_id = mapping.internal_ids[&component.internal_id()];
            let attributes =
                remap_attributes(component.attributes().iter(), &mapping, data_source, result);
            components.push(Component::new(
                internal_id,
                component.type_id(),
                component.name().map(str::to_string),
                attributes,
            ));
        }

        let mut relations = main.relations().to_vec();
        relations.extend(
            mapping
                .relations
                .iter()
                .map(|r| r.remapped(|i| mapping.positions[&i])),
        );

        info!(
            data_source,
            resolved = mapping.resolved.len(),
            imported = mapping.imports.len(),
            "Merged data source"
        );

        match Model::new(
            main.info().clone(),
            components,
            relations,
            main.load_spectrum().clone(),
        ) {
            Ok(model) => Some(model),
            Err(e) => {
                result.critical(format!("cannot merge data source '{data_source}': {e}"));
                None
            }
        }
    }
}

/// Roles that make the referencing component the container of the others
const CONTAINER_ROLES: [&str; 4] = ["assembly", "gear", "stage", "planetary_stage"];

fn collect_imports<'m>(
    checker: &ExternalSubcomponentsChecker,
    result: &mut ValidationResult,
    referenced: &'m Model,
    mapping: &mut Mapping<'m>,
    main_len: usize,
) {
    if !checker.is_supported() {
        result.critical(format!(
            "external subcomponents are not supported for version {}",
            checker.version()
        ));
        return;
    }
    let resolved: Vec<ComponentIndex> = mapping.resolved.iter().map(|&(_, s)| s).collect();

    for (position, relation) in referenced.relations().iter().enumerate() {
        let Some(owner) = relation
            .references()
            .iter()
            .find(|r| CONTAINER_ROLES.contains(&r.role()) && resolved.contains(&r.component()))
            .map(RelationReference::component)
        else {
            continue;
        };
        let owner_type = referenced.components()[owner.get()].type_id();
        let others: Vec<ComponentIndex> = relation
            .references()
            .iter()
            .map(RelationReference::component)
            .filter(|&c| c != owner)
            .collect();

        let permissible = others.iter().all(|&c| {
            mapping.positions.contains_key(&c)
                || checker.permits(owner_type, referenced.components()[c.get()].type_id())
        });
        if !permissible {
            debug!(
                relation = position,
                relation_type = relation.relation_type(),
                owner_type,
                "Skipping relation to components that are not subcomponents"
            );
            continue;
        }

        for c in others {
            if mapping.positions.contains_key(&c) {
                continue;
            }
            let merged = ComponentIndex::new(main_len + mapping.imports.len());
            mapping.positions.insert(c, merged);
            mapping
                .internal_ids
                .insert(referenced.components()[c.get()].internal_id(), next_internal_id());
            mapping.imports.push(c);
        }
        mapping.relations.push(relation);
    }
}

fn resolve(
    placeholder: &Component,
    source: &Component,
    mapping: &Mapping<'_>,
    data_source: &str,
    result: &mut ValidationResult,
) -> Component {
    let mut attributes = remap_attributes(source.attributes().iter(), mapping, data_source, result);
    for own in placeholder.own_attributes() {
        match attributes.iter_mut().find(|a| a.id() == own.id()) {
            Some(existing) => *existing = own.clone(),
            None => attributes.push(own.clone()),
        }
    }

    let name = placeholder
        .name()
        .or_else(|| source.name())
        .map(str::to_string);
    let component = Component::new(placeholder.internal_id(), source.type_id(), name, attributes);
    match placeholder.external_id() {
        Some(id) => component.with_external_id(id),
        None => component,
    }
}

/// Rewrite component references to merged internal ids
///
/// References to components that were not merged are dropped with a warning.
fn remap_attributes<'a>(
    attributes: impl Iterator<Item = &'a Attribute>,
    mapping: &Mapping<'_>,
    data_source: &str,
    result: &mut ValidationResult,
) -> Vec<Attribute> {
    attributes
        .filter_map(|attribute| match attribute.data() {
            ValueData::ReferenceComponent(id) => match mapping.internal_ids.get(id) {
                Some(&merged) => {
                    Some(attribute.with_value(Value::new(ValueData::ReferenceComponent(merged))))
                }
                None => {
                    result.warning(format!(
                        "dropping attribute '{}': it references a component of \
                         data source '{data_source}' that was not merged",
                        attribute.id()
                    ));
                    None
                }
            },
            _ => Some(attribute.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{schema, schema_1_4};
    use crate::{ComponentBuilder, ModelBuilder};
    use rexs_ir::{Severity, ValueType, Version};
    use rexs_model::{DATA_SOURCE, REFERENCED_COMPONENT_ID};

    fn placeholder(
        builder: &mut ModelBuilder,
        type_id: &str,
        id: u64,
        source: &str,
        referenced: i64,
    ) {
        builder.add_component_with_id(type_id, id).unwrap();
        builder
            .add_custom_attribute(DATA_SOURCE, ValueType::String)
            .unwrap()
            .value(source)
            .unwrap();
        builder
            .add_custom_attribute(REFERENCED_COMPONENT_ID, ValueType::Integer)
            .unwrap()
            .value(referenced)
            .unwrap();
    }

    fn main_model(version: Version) -> Model {
        let mut builder = ModelBuilder::new(ComponentBuilder::new(schema(version)));
        builder.add_component_with_id("shaft", 1_u64).unwrap();
        let bearing = "rolling_bearing_with_detailed_geometry";
        placeholder(&mut builder, bearing, 2, "bearings.rexsj", 10);
        builder.name("Bearing A").unwrap();
        builder.add_attribute("width").unwrap().value(25.0).unwrap();
        builder
            .add_relation("assembly")
            .add_ref("assembly", 1_u64)
            .unwrap()
            .add_ref("part", 2_u64)
            .unwrap();
        builder.build("main", "1.0", Some("en")).unwrap()
    }

    fn bearing_model(version: Version) -> Model {
        let mut builder = ModelBuilder::new(ComponentBuilder::new(schema(version)));
        builder.add_component_with_id("rolling_bearing_with_detailed_geometry", 10_u64).unwrap();
        builder.name("Vendor bearing").unwrap();
        builder.add_attribute("width").unwrap().value(20.0).unwrap();
        builder.add_component_with_id("rolling_element", 11_u64).unwrap();
        builder.add_attribute("width").unwrap().value(5.0).unwrap();
        builder.add_component_with_id("shaft", 12_u64).unwrap();
        builder
            .add_relation("assembly")
            .add_ref("assembly", 10_u64)
            .unwrap()
            .add_ref("part", 11_u64)
            .unwrap();
        builder
            .add_relation("assembly")
            .add_ref("assembly", 12_u64)
            .unwrap()
            .add_ref("part", 10_u64)
            .unwrap();
        builder.build("vendor", "2.0", Some("en")).unwrap()
    }

    #[test]
    fn test_version_mismatch_is_single_critical() {
        let main = main_model(Version::new(1, 4));
        let referenced = bearing_model(Version::new(1, 5));
        let mut result = ValidationResult::new();

        let merged = ModelMerger::new().merge(&mut result, &main, "bearings.rexsj", &referenced);
        assert!(merged.is_none());
        assert_eq!(result.len(), 1);
        assert_eq!(result.issues()[0].severity, Severity::Critical);
    }

    #[test]
    fn test_resolve_placeholders() {
        let main = main_model(Version::new(1, 4));
        let referenced = bearing_model(Version::new(1, 4));
        let mut result = ValidationResult::new();

        let merged = ModelMerger::new()
            .merge(&mut result, &main, "bearings.rexsj", &referenced)
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(merged.placeholders("bearings.rexsj").count(), 0);

        let bearing = &merged.components()[1];
        assert_eq!(bearing.internal_id(), main.components()[1].internal_id());
        assert_eq!(bearing.name(), Some("Bearing A"));
        assert_eq!(bearing.attribute("width").unwrap().data(), &ValueData::FloatingPoint(25.0));
        assert!(!bearing.has_attribute(DATA_SOURCE));
        assert_eq!(merged.components().len(), 2);
        assert_eq!(merged.relations(), main.relations());
    }

    #[test]
    fn test_unresolved_ids_are_reported_each() {
        let mut builder = ModelBuilder::new(ComponentBuilder::new(schema_1_4()));
        placeholder(&mut builder, "shaft", 1, "parts.rexsj", 98);
        placeholder(&mut builder, "shaft", 2, "parts.rexsj", 99);
        placeholder(&mut builder, "shaft", 3, "parts.rexsj", 12);
        let main = builder.build("main", "1.0", None).unwrap();
        let referenced = bearing_model(Version::new(1, 4));

        let mut result = ValidationResult::new();
        assert!(ModelMerger::new().merge(&mut result, &main, "parts.rexsj", &referenced).is_none());
        assert_eq!(result.errors().count(), 2);
        assert!(result.issues()[0].message.contains("98"));
        assert!(result.issues()[1].message.contains("parts.rexsj"));
    }

    #[test]
    fn test_other_data_sources_are_left_alone() {
        let main = main_model(Version::new(1, 4));
        let referenced = bearing_model(Version::new(1, 4));
        let mut result = ValidationResult::new();

        let merged = ModelMerger::new()
            .merge(&mut result, &main, "gears.rexsj", &referenced)
            .unwrap();
        assert!(result.is_empty());
        assert!(merged.structurally_eq(&main));
        assert_eq!(merged.placeholders("bearings.rexsj").count(), 1);
    }

    #[test]
    fn test_import_permissible_subcomponents() {
        let main = main_model(Version::new(1, 4));
        let referenced = bearing_model(Version::new(1, 4));
        let checker = ExternalSubcomponentsChecker::new(Version::new(1, 4)).unwrap();
        let mut result = ValidationResult::new();

        let merged = ModelMerger::with_subcomponent_checker(checker)
            .merge(&mut result, &main, "bearings.rexsj", &referenced)
            .unwrap();

        // rolling element imported, the vendor shaft holding the bearing is not
        assert!(result.is_empty(), "{result}");
        assert_eq!(merged.components().len(), 3);
        assert_eq!(merged.components()[2].type_id(), "rolling_element");
        assert_eq!(merged.relations().len(), 2);
        let imported = &merged.relations()[1];
        assert_eq!(merged.resolve(&imported.references()[0]).name(), Some("Bearing A"));
    }

    #[test]
    fn test_container_relation_to_foreign_type_is_skipped() {
        let main = main_model(Version::new(1, 4));
        let mut builder = ModelBuilder::new(ComponentBuilder::new(schema(Version::new(1, 4))));
        builder
            .add_component_with_id("rolling_bearing_with_detailed_geometry", 10_u64)
            .unwrap();
        builder.add_component_with_id("shaft", 12_u64).unwrap();
        builder
            .add_relation("assembly")
            .add_ref("assembly", 10_u64)
            .unwrap()
            .add_ref("part", 12_u64)
            .unwrap();
        let referenced = builder.build("vendor", "2.0", Some("en")).unwrap();

        let checker = ExternalSubcomponentsChecker::new(Version::new(1, 4)).unwrap();
        let mut result = ValidationResult::new();
        let merged = ModelMerger::with_subcomponent_checker(checker)
            .merge(&mut result, &main, "bearings.rexsj", &referenced)
            .unwrap();

        assert!(result.is_empty(), "{result}");
        assert_eq!(merged.components().len(), 2);
        assert_eq!(merged.relations(), main.relations());
    }
}
