//! Load spectrum overlays
#![allow(clippy::must_use_candidate)] // Accessors are clear at call sites without #[must_use].

use crate::attribute::Attribute;
use crate::component::ComponentIndex;

/// Extra attributes applied to an existing component
#[derive(Debug, Clone, PartialEq)]
pub struct LoadComponent {
    component: ComponentIndex,
    attributes: Vec<Attribute>,
}

impl LoadComponent {
    pub fn new(component: ComponentIndex, attributes: Vec<Attribute>) -> Self {
        Self {
            component,
            attributes,
        }
    }

    pub fn component(&self) -> ComponentIndex {
        self.component
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

/// Overlay attributes for one operating condition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadCase {
    components: Vec<LoadComponent>,
}

impl LoadCase {
    pub fn new(components: Vec<LoadComponent>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[LoadComponent] {
        &self.components
    }
}

/// Overlay attributes accumulated over all load cases
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Accumulation {
    components: Vec<LoadComponent>,
}

impl Accumulation {
    pub fn new(components: Vec<LoadComponent>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[LoadComponent] {
        &self.components
    }
}

/// Zero or more load cases and at most one accumulation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadSpectrum {
    load_cases: Vec<LoadCase>,
    accumulation: Option<Accumulation>,
}

impl LoadSpectrum {
    pub fn new(load_cases: Vec<LoadCase>, accumulation: Option<Accumulation>) -> Self {
        Self {
            load_cases,
            accumulation,
        }
    }

    pub fn load_cases(&self) -> &[LoadCase] {
        &self.load_cases
    }

    pub fn accumulation(&self) -> Option<&Accumulation> {
        self.accumulation.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.load_cases.is_empty() && self.accumulation.is_none()
    }

    /// Every load component of every load case and the accumulation
    pub fn load_components(&self) -> impl Iterator<Item = &LoadComponent> {
        self.load_cases
            .iter()
            .flat_map(LoadCase::components)
            .chain(self.accumulation.iter().flat_map(Accumulation::components))
    }
}
