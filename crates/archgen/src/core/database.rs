//! Core database trait for diagram model storage
//!
//! This trait defines the interface for accumulating parsed records into
//! a diagram model. Insertion never fails: a model decides for itself
//! whether to keep or discard what it is given.

/// Core trait for diagram databases
///
/// The associated types allow each model to define its own node and edge
/// structures with model-specific metadata.
pub trait Database: Send + Sync {
    /// The node data type for this database
    type Node: Clone + Send + Sync;

    /// The edge data type for this database
    type Edge: Clone + Send + Sync;

    /// Add a node, returning true if it was stored
    fn add_node(&mut self, node: Self::Node) -> bool;

    /// Add an edge, returning true if it was stored
    fn add_edge(&mut self, edge: Self::Edge) -> bool;

    /// Get a node by ID
    fn get_node(&self, id: &str) -> Option<&Self::Node>;

    /// Iterate over all nodes
    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;

    /// Iterate over all edges
    fn edges(&self) -> impl Iterator<Item = &Self::Edge>;

    /// Clear all data from the database
    fn clear(&mut self);

    /// Get the number of nodes
    fn node_count(&self) -> usize;

    /// Get the number of edges
    fn edge_count(&self) -> usize;
}
