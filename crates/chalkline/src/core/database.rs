//! Core database trait for graph-shaped builders
//!
//! Builders whose data is a set of nodes and edges (flowchart, sequence,
//! ER, architecture) store it behind this interface. Nodes keep their
//! declaration order so layouts are deterministic.

use super::Result;

/// Core trait for diagram databases
pub trait Database: Send + Sync {
    /// The node data type for this database
    type Node: Clone + Send + Sync;

    /// The edge data type for this database
    type Edge: Clone + Send + Sync;

    /// Add a node to the database
    fn add_node(&mut self, node: Self::Node) -> Result<()>;

    /// Add an edge to the database
    fn add_edge(&mut self, edge: Self::Edge) -> Result<()>;

    /// Get a node by ID
    fn get_node(&self, id: &str) -> Option<&Self::Node>;

    /// Iterate over all nodes in declaration order
    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;

    /// Iterate over all edges in declaration order
    fn edges(&self) -> impl Iterator<Item = &Self::Edge>;

    /// Clear all data from the database
    fn clear(&mut self);

    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    fn has_node(&self, id: &str) -> bool {
        self.get_node(id).is_some()
    }
}
