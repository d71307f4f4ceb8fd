//! Relations between components
#![allow(clippy::must_use_candidate)] // Accessors are clear at call sites without #[must_use].

use crate::component::ComponentIndex;

/// One role-tagged reference of a relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationReference {
    role: String,
    hint: Option<String>,
    component: ComponentIndex,
}

impl RelationReference {
    pub fn new(role: impl Into<String>, hint: Option<String>, component: ComponentIndex) -> Self {
        Self {
            role: role.into(),
            hint,
            component,
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// Free-text hint
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Referenced component in the owning model
    pub fn component(&self) -> ComponentIndex {
        self.component
    }
}

/// A typed relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    relation_type: String,
    order: Option<u32>,
    references: Vec<RelationReference>,
}

impl Relation {
    pub fn new(
        relation_type: impl Into<String>,
        order: Option<u32>,
        references: Vec<RelationReference>,
    ) -> Self {
        Self {
            relation_type: relation_type.into(),
            order,
            references,
        }
    }

    pub fn relation_type(&self) -> &str {
        &self.relation_type
    }

    /// Declared order, if any
    pub fn order(&self) -> Option<u32> {
        self.order
    }

    pub fn references(&self) -> &[RelationReference] {
        &self.references
    }

    /// Check if any reference points at `component`
    pub fn involves(&self, component: ComponentIndex) -> bool {
        self.references.iter().any(|r| r.component == component)
    }

    /// Copy with every component index passed through `remap`
    #[must_use]
    pub fn remapped(&self, remap: impl Fn(ComponentIndex) -> ComponentIndex) -> Self {
        Self {
            relation_type: self.relation_type.clone(),
            order: self.order,
            references: self
                .references
                .iter()
                .map(|r| RelationReference {
                    component: remap(r.component),
                    ..r.clone()
                })
                .collect(),
        }
    }
}
