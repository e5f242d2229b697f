//! Flowchart database implementation
//!
//! Stores flowchart nodes with their kinds and the edges between them.
//! Nodes keep creation order and edges keep declaration order; the layout
//! depends on both.

use std::collections::HashMap;
use tracing::{debug, trace};

use crate::core::{Color, ColorName, Database, Result, ShapeKind, StrokeStyle};

/// Reserved id of the node created by `start()`
pub const START_ID: &str = "__start__";
/// Reserved id of the node created by `end()`
pub const END_ID: &str = "__end__";

/// Kind of a flowchart node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// Start or end of the flow
    Terminal,
    #[default]
    Process,
    Decision,
}

impl NodeKind {
    pub fn shape(&self) -> ShapeKind {
        match self {
            NodeKind::Terminal => ShapeKind::Ellipse,
            NodeKind::Process => ShapeKind::Rectangle,
            NodeKind::Decision => ShapeKind::Diamond,
        }
    }

    /// Color used when the node has none of its own
    pub fn default_color(&self) -> ColorName {
        match self {
            NodeKind::Terminal => ColorName::Green,
            NodeKind::Process => ColorName::Blue,
            NodeKind::Decision => ColorName::Yellow,
        }
    }
}

/// A logical flowchart node
#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub color: Option<Color>,
}

impl FlowNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            color: None,
        }
    }

    /// The explicit color, or the kind's default (red for the end node)
    pub fn effective_color(&self) -> Color {
        match &self.color {
            Some(color) => color.clone(),
            None if self.id == END_ID => Color::Named(ColorName::Red),
            None => Color::Named(self.kind.default_color()),
        }
    }
}

/// A logical flowchart edge
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub stroke_style: StrokeStyle,
}

impl FlowEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
            stroke_style: StrokeStyle::Solid,
        }
    }

    /// Set the edge label
    pub fn label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    pub fn style(&mut self, stroke_style: StrokeStyle) -> &mut Self {
        self.stroke_style = stroke_style;
        self
    }

    pub fn dashed(&mut self) -> &mut Self {
        self.style(StrokeStyle::Dashed)
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Flowchart database implementation
#[derive(Debug, Default, Clone)]
pub struct FlowchartDatabase {
    /// Nodes indexed by ID
    nodes: HashMap<String, FlowNode>,
    /// Node IDs in creation order
    node_order: Vec<String>,
    /// Edges in declaration order
    edges: Vec<FlowEdge>,
}

impl FlowchartDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of a node in creation order
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.node_order.iter().position(|n| n == id)
    }

    /// Get in-degree (number of incoming edges) for a node
    pub fn in_degree(&self, node_id: &str) -> usize {
        self.edges.iter().filter(|e| e.to == node_id).count()
    }

    /// Get out-degree (number of outgoing edges) for a node
    pub fn out_degree(&self, node_id: &str) -> usize {
        self.edges.iter().filter(|e| e.from == node_id).count()
    }

    /// Get IDs of nodes that this node points to, in edge order
    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.from == node_id)
            .map(|e| e.to.as_str())
            .collect()
    }

    /// Get IDs of nodes that point to this node
    pub fn predecessors(&self, node_id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.to == node_id)
            .map(|e| e.from.as_str())
            .collect()
    }

    /// Get source nodes (no incoming edges) in creation order
    pub fn source_nodes(&self) -> Vec<&str> {
        self.node_order
            .iter()
            .filter(|id| self.in_degree(id) == 0)
            .map(|id| id.as_str())
            .collect()
    }

    /// Get sink nodes (no outgoing edges) in creation order
    pub fn sink_nodes(&self) -> Vec<&str> {
        self.node_order
            .iter()
            .filter(|id| self.out_degree(id) == 0)
            .map(|id| id.as_str())
            .collect()
    }

    pub fn edge_mut(&mut self, index: usize) -> Option<&mut FlowEdge> {
        self.edges.get_mut(index)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut FlowNode> {
        self.nodes.get_mut(id)
    }

    /// Insert or replace a node; a replaced node keeps its creation position
    pub fn insert(&mut self, node: FlowNode) {
        trace!(node_id = %node.id, node_label = %node.label, node_kind = ?node.kind, "Adding node to database");
        if !self.nodes.contains_key(&node.id) {
            self.node_order.push(node.id.clone());
        }
        self.nodes.insert(node.id.clone(), node);
        debug!(node_count = self.node_count(), "Node added");
    }

    /// Push an edge and hand it back for further configuration
    pub fn push_edge(&mut self, edge: FlowEdge) -> &mut FlowEdge {
        trace!(edge_from = %edge.from, edge_to = %edge.to, "Adding edge to database");
        let index = self.edges.len();
        self.edges.push(edge);
        &mut self.edges[index]
    }
}

impl Database for FlowchartDatabase {
    type Node = FlowNode;
    type Edge = FlowEdge;

    fn add_node(&mut self, node: FlowNode) -> Result<()> {
        self.insert(node);
        Ok(())
    }

    /// Endpoints are checked at layout time, so edges may precede nodes
    fn add_edge(&mut self, edge: FlowEdge) -> Result<()> {
        self.push_edge(edge);
        debug!(edge_count = self.edge_count(), "Edge added");
        Ok(())
    }

    fn get_node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.get(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &FlowNode> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    fn edges(&self) -> impl Iterator<Item = &FlowEdge> {
        self.edges.iter()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.node_order.clear();
        self.edges.clear();
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_keep_creation_order() {
        let mut db = FlowchartDatabase::new();
        db.add_node(FlowNode::new("b", "B", NodeKind::Process)).unwrap();
        db.add_node(FlowNode::new("a", "A", NodeKind::Process)).unwrap();
        db.add_node(FlowNode::new("b", "B2", NodeKind::Decision)).unwrap();

        let ids: Vec<_> = db.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(db.get_node("b").unwrap().kind, NodeKind::Decision);
        assert_eq!(db.node_index("a"), Some(1));
    }

    #[test]
    fn test_degrees_sources_and_sinks() {
        let mut db = FlowchartDatabase::new();
        for id in ["a", "b", "c"] {
            db.add_node(FlowNode::new(id, id, NodeKind::Process)).unwrap();
        }
        db.add_edge(FlowEdge::new("a", "b")).unwrap();
        db.add_edge(FlowEdge::new("a", "c")).unwrap();
        db.add_edge(FlowEdge::new("b", "c")).unwrap();

        assert_eq!(db.out_degree("a"), 2);
        assert_eq!(db.in_degree("c"), 2);
        assert_eq!(db.source_nodes(), vec!["a"]);
        assert_eq!(db.sink_nodes(), vec!["c"]);
        assert_eq!(db.successors("a"), vec!["b", "c"]);
        assert_eq!(db.predecessors("c"), vec!["a", "b"]);
    }

    #[test]
    fn test_edge_builder_methods() {
        let mut db = FlowchartDatabase::new();
        db.push_edge(FlowEdge::new("a", "a")).label("retry").dashed();
        let edge = db.edges().next().unwrap();
        assert_eq!(edge.label.as_deref(), Some("retry"));
        assert_eq!(edge.stroke_style, StrokeStyle::Dashed);
        assert!(edge.is_self_loop());
    }

    #[test]
    fn test_node_kind_shapes_and_colors() {
        assert_eq!(NodeKind::Terminal.shape(), ShapeKind::Ellipse);
        assert_eq!(NodeKind::Process.shape(), ShapeKind::Rectangle);
        assert_eq!(NodeKind::Decision.shape(), ShapeKind::Diamond);
        let end = FlowNode::new(END_ID, "End", NodeKind::Terminal);
        assert_eq!(end.effective_color(), Color::Named(ColorName::Red));
    }
}
