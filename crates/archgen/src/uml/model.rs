//! UML model and builder
//!
//! Accumulates parsed items into a deduplicated, first-seen-ordered class set
//! and an ordered relationship list. Relationships are never deduplicated and
//! may reference names that were never declared.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, span, Level};

use crate::core::{CallEdge, Database, Declaration, ParsedItem};

/// A class in the diagram, one per distinct declared name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UmlClass {
    pub name: String,
    /// Line of the first declaration of this name
    pub line: usize,
}

impl UmlClass {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
        }
    }
}

impl From<Declaration> for UmlClass {
    fn from(value: Declaration) -> Self {
        Self::new(value.name, value.line)
    }
}

/// Classes and call relationships extracted from pseudocode
#[derive(Debug, Clone, Default, Serialize)]
pub struct UmlModel {
    classes: Vec<UmlClass>,
    #[serde(skip)]
    index: HashSet<String>,
    relationships: Vec<CallEdge>,
}

impl UmlModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from parsed items in one pass
    pub fn from_items(items: impl IntoIterator<Item = ParsedItem>) -> Self {
        let mut builder = ModelBuilder::new();
        builder.extend(items);
        builder.finish()
    }

    /// Add a class unless a class of the same name exists
    ///
    /// Empty names are rejected. Returns true if the class was inserted.
    pub fn add_class(&mut self, class: UmlClass) -> bool {
        if class.name.is_empty() || self.index.contains(&class.name) {
            return false;
        }
        self.index.insert(class.name.clone());
        self.classes.push(class);
        true
    }

    /// Append a relationship, keeping duplicates
    ///
    /// Edges with an empty endpoint are rejected. Returns true if the edge
    /// was appended.
    pub fn add_relationship(&mut self, edge: CallEdge) -> bool {
        if !edge.is_complete() {
            return false;
        }
        self.relationships.push(edge);
        true
    }

    /// Classes in first-seen order
    pub fn classes(&self) -> &[UmlClass] {
        &self.classes
    }

    /// Relationships in insertion order
    pub fn relationships(&self) -> &[CallEdge] {
        &self.relationships
    }

    pub fn contains_class(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.relationships.is_empty()
    }

    /// Relationship endpoints that have no class of their own, in first-seen order
    pub fn undeclared_participants(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.relationships
            .iter()
            .flat_map(|edge| [edge.caller.as_str(), edge.callee.as_str()])
            .filter(|name| !self.contains_class(name) && seen.insert(*name))
            .collect()
    }
}

impl PartialEq for UmlModel {
    fn eq(&self, other: &Self) -> bool {
        self.classes == other.classes && self.relationships == other.relationships
    }
}

impl Eq for UmlModel {}

impl Database for UmlModel {
    type Node = UmlClass;
    type Edge = CallEdge;

    fn add_node(&mut self, node: Self::Node) -> bool {
        self.add_class(node)
    }

    fn add_edge(&mut self, edge: Self::Edge) -> bool {
        self.add_relationship(edge)
    }

    fn get_node(&self, id: &str) -> Option<&Self::Node> {
        if !self.contains_class(id) {
            return None;
        }
        self.classes.iter().find(|c| c.name == id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.classes.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &Self::Edge> {
        self.relationships.iter()
    }

    fn clear(&mut self) {
        self.classes.clear();
        self.index.clear();
        self.relationships.clear();
    }

    fn node_count(&self) -> usize {
        self.classes.len()
    }

    fn edge_count(&self) -> usize {
        self.relationships.len()
    }
}

/// Single-pass builder that folds parsed items into a [`UmlModel`]
#[derive(Debug, Default)]
pub struct ModelBuilder {
    model: UmlModel,
    skipped: usize,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one parsed item to the model
    pub fn push(&mut self, item: ParsedItem) {
        match item {
            ParsedItem::Declaration(decl) => {
                if decl.name.is_empty() {
                    debug!(line = decl.line, "Skipping declaration with empty name");
                    self.skipped += 1;
                } else {
                    self.model.add_class(decl.into());
                }
            }
            ParsedItem::Call(edge) => {
                if !self.model.add_relationship(edge.clone()) {
                    debug!(
                        line = edge.line,
                        caller = %edge.caller,
                        callee = %edge.callee,
                        "Skipping call with empty endpoint"
                    );
                    self.skipped += 1;
                }
            }
        }
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = ParsedItem>) {
        for item in items {
            self.push(item);
        }
    }

    /// Number of items rejected for having an empty name
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self) -> UmlModel {
        let build_span = span!(Level::DEBUG, "build_model");
        let _enter = build_span.enter();
        debug!(
            class_count = self.model.class_count(),
            relationship_count = self.model.relationship_count(),
            skipped = self.skipped,
            "Model built"
        );
        self.model
    }
}
