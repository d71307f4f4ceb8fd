//! Model root and provenance
#![allow(clippy::must_use_candidate)] // Accessors are clear at call sites without #[must_use].

use crate::attribute::Attribute;
use crate::component::{Component, ComponentIndex, Placeholder};
use crate::load::LoadSpectrum;
use crate::relation::{Relation, RelationReference};
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset};
use rexs_ir::{ValueData, Version};
use std::collections::{HashMap, HashSet};

/// Provenance every model carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub application_id: String,
    pub application_version: String,
    pub date: DateTime<FixedOffset>,
    pub version: Version,
    pub language: Option<String>,
}

/// Immutable root of a REXS model
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    info: ModelInfo,
    components: Vec<Component>,
    relations: Vec<Relation>,
    load_spectrum: LoadSpectrum,
}

impl Model {
    /// Assemble a model, checking that every index resolves
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate internal ids or on relation and load
    /// component indices outside the component arena.
    pub fn new(
        info: ModelInfo,
        components: Vec<Component>,
        relations: Vec<Relation>,
        load_spectrum: LoadSpectrum,
    ) -> Result<Self> {
        let mut seen = HashSet::with_capacity(components.len());
        for component in &components {
            if !seen.insert(component.internal_id()) {
                return Err(Error::DuplicateComponent(component.internal_id()));
            }
        }

        let count = components.len();
        for relation in &relations {
            let dangling = relation
                .references()
                .iter()
                .find(|r| r.component().get() >= count);
            if let Some(reference) = dangling {
                return Err(Error::DanglingRelationReference {
                    relation_type: relation.relation_type().to_string(),
                    index: reference.component().get(),
                });
            }
        }

        if let Some(load) = load_spectrum.load_components().find(|l| l.component().get() >= count) {
            return Err(Error::DanglingLoadComponent {
                index: load.component().get(),
            });
        }

        Ok(Self {
            info,
            components,
            relations,
            load_spectrum,
        })
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    /// Schema version the model was built against
    pub fn version(&self) -> Version {
        self.info.version
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, index: ComponentIndex) -> Option<&Component> {
        self.components.get(index.get())
    }

    /// Component referenced by a relation reference of this model
    pub fn resolve(&self, reference: &RelationReference) -> &Component {
        &self.components[reference.component().get()]
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn load_spectrum(&self) -> &LoadSpectrum {
        &self.load_spectrum
    }

    pub fn find_by_internal_id(&self, internal_id: u64) -> Option<(ComponentIndex, &Component)> {
        self.indexed()
            .find(|(_, c)| c.internal_id() == internal_id)
    }

    pub fn find_by_external_id(&self, external_id: u64) -> Option<(ComponentIndex, &Component)> {
        self.indexed()
            .find(|(_, c)| c.external_id() == Some(external_id))
    }

    /// Components with their arena index
    pub fn indexed(&self) -> impl Iterator<Item = (ComponentIndex, &Component)> {
        self.components
            .iter()
            .enumerate()
            .map(|(i, c)| (ComponentIndex::new(i), c))
    }

    /// Placeholders awaiting resolution from `data_source`
    pub fn placeholders<'a>(
        &'a self,
        data_source: &'a str,
    ) -> impl Iterator<Item = (ComponentIndex, Placeholder<'a>)> + 'a {
        self.indexed().filter_map(move |(i, c)| {
            c.placeholder()
                .filter(|p| p.data_source == data_source)
                .map(|p| (i, p))
        })
    }

    /// Distinct data sources referenced by placeholders, in first-seen order
    pub fn data_sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for placeholder in self.components.iter().filter_map(Component::placeholder) {
            if !sources.contains(&placeholder.data_source) {
                sources.push(placeholder.data_source);
            }
        }
        sources
    }

    /// Compare structure while ignoring process-unique internal ids
    ///
    /// Component references inside attribute values are compared by the
    /// position of the referenced component.
    pub fn structurally_eq(&self, other: &Model) -> bool {
        let positions = |model: &Model| -> HashMap<u64, usize> {
            model
                .components
                .iter()
                .enumerate()
                .map(|(i, c)| (c.internal_id(), i))
                .collect()
        };
        let (left_pos, right_pos) = (positions(self), positions(other));

        let attributes_eq = |left: &[Attribute], right: &[Attribute]| {
            left.len() == right.len()
                && left.iter().zip(right).all(|(l, r)| match (l.data(), r.data()) {
                    (ValueData::ReferenceComponent(a), ValueData::ReferenceComponent(b)) => {
                        l.id() == r.id() && left_pos.get(a) == right_pos.get(b)
                    }
                    _ => l == r,
                })
        };

        let components_eq = self.components.len() == other.components.len()
            && self.components.iter().zip(&other.components).all(|(l, r)| {
                l.type_id() == r.type_id()
                    && l.external_id() == r.external_id()
                    && l.name() == r.name()
                    && attributes_eq(l.attributes(), r.attributes())
            });

        let (mine, theirs) = (&self.load_spectrum, &other.load_spectrum);
        let load_eq = mine.load_cases().len() == theirs.load_cases().len()
            && mine.accumulation().is_some() == theirs.accumulation().is_some()
            && mine.load_components().count() == theirs.load_components().count()
            && mine
                .load_components()
                .zip(theirs.load_components())
                .all(|(l, r)| {
                    l.component() == r.component() && attributes_eq(l.attributes(), r.attributes())
                });

        self.info == other.info && components_eq && self.relations == other.relations && load_eq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::next_internal_id;
    use crate::load::{LoadCase, LoadComponent};

    fn info() -> ModelInfo {
        ModelInfo {
            application_id: "test".to_string(),
            application_version: "1.0".to_string(),
            date: DateTime::parse_from_rfc3339("2023-03-28T13:49:36+02:00").unwrap(),
            version: Version::new(1, 4),
            language: Some("en".to_string()),
        }
    }

    fn component(type_id: &str) -> Component {
        Component::new(next_internal_id(), type_id, None, vec![])
    }

    fn build(components: Vec<Component>, relations: Vec<Relation>) -> Result<Model> {
        Model::new(info(), components, relations, LoadSpectrum::default())
    }

    #[test]
    fn test_model_indexes_components() {
        let stage = component("planetary_stage");
        let shaft = component("shaft").with_external_id(12);
        let relation = Relation::new(
            "planet_shaft",
            None,
            vec![
                RelationReference::new("planetary_stage", None, ComponentIndex::new(0)),
                RelationReference::new("shaft", None, ComponentIndex::new(1)),
            ],
        );
        let model = build(vec![stage, shaft], vec![relation]).unwrap();

        let reference = &model.relations()[0].references()[1];
        assert_eq!(model.resolve(reference).type_id(), "shaft");
        assert_eq!(model.find_by_external_id(12).unwrap().0, ComponentIndex::new(1));
        assert!(model.find_by_external_id(13).is_none());
    }

    #[test]
    fn test_model_rejects_dangling_relation() {
        let relation = Relation::new(
            "reference",
            None,
            vec![RelationReference::new("origin", None, ComponentIndex::new(3))],
        );
        let err = build(vec![component("gear")], vec![relation]).unwrap_err();
        assert_eq!(
            err,
            Error::DanglingRelationReference {
                relation_type: "reference".to_string(),
                index: 3
            }
        );
    }

    #[test]
    fn test_model_rejects_dangling_load_component() {
        let spectrum = LoadSpectrum::new(
            vec![LoadCase::new(vec![LoadComponent::new(ComponentIndex::new(1), vec![])])],
            None,
        );
        let err = Model::new(info(), vec![component("gear")], vec![], spectrum).unwrap_err();
        assert_eq!(err, Error::DanglingLoadComponent { index: 1 });
    }

    #[test]
    fn test_model_rejects_duplicate_internal_ids() {
        let gear = component("gear");
        let err = build(vec![gear.clone(), gear.clone()], vec![]).unwrap_err();
        assert_eq!(err, Error::DuplicateComponent(gear.internal_id()));
    }

    #[test]
    fn test_structural_equality_ignores_internal_ids() {
        let left = build(vec![component("gear")], vec![]).unwrap();
        let right = build(vec![component("gear")], vec![]).unwrap();
        assert_ne!(left, right);
        assert!(left.structurally_eq(&right));

        let other = build(vec![component("shaft")], vec![]).unwrap();
        assert!(!left.structurally_eq(&other));
    }
}
