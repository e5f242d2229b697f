//! Flowchart diagram plugin
//!
//! Terminals, processes and decisions joined by labelled edges, laid out in
//! ranked rows. [`Flowchart::auto_layout`] additionally folds long charts
//! into two columns.

use tracing::debug;

use crate::core::{
    Color, Database, Diagram, DiagramError, DiagramKind, Direction, Layout, LayoutAlgorithm,
    Result,
};

mod database;
mod detector;
mod layout;

pub use database::*;
pub use detector::*;
pub use layout::*;

/// Flowchart builder
///
/// # Example
/// ```
/// use chalkline::prelude::*;
///
/// let mut chart = Flowchart::new();
/// chart.start("Start").decision("ok", "Valid?").end("Done");
/// chart.connect("__start__", "ok");
/// chart.connect("ok", "__end__").label("Yes");
/// let layout = chart.layout().unwrap();
/// assert_eq!(layout.shapes.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Flowchart {
    database: FlowchartDatabase,
    config: FlowchartConfig,
    title: Option<String>,
}

impl Flowchart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FlowchartConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// A flowchart that packs long rank sequences into two columns
    pub fn auto_layout() -> Self {
        Self::with_config(FlowchartConfig::default().with_packing(PackingConfig::default()))
    }

    pub fn direction(&mut self, direction: Direction) -> &mut Self {
        self.config.direction = direction;
        self
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    /// Add the `__start__` terminal
    pub fn start(&mut self, label: impl Into<String>) -> &mut Self {
        self.terminal(START_ID, label)
    }

    /// Add the `__end__` terminal
    pub fn end(&mut self, label: impl Into<String>) -> &mut Self {
        self.terminal(END_ID, label)
    }

    pub fn terminal(&mut self, id: impl Into<String>, label: impl Into<String>) -> &mut Self {
        self.node(FlowNode::new(id, label, NodeKind::Terminal))
    }

    pub fn process(&mut self, id: impl Into<String>, label: impl Into<String>) -> &mut Self {
        self.node(FlowNode::new(id, label, NodeKind::Process))
    }

    pub fn decision(&mut self, id: impl Into<String>, label: impl Into<String>) -> &mut Self {
        self.node(FlowNode::new(id, label, NodeKind::Decision))
    }

    /// Add a node; redeclaring an id replaces it in place
    pub fn node(&mut self, node: FlowNode) -> &mut Self {
        self.database.insert(node);
        self
    }

    /// Override a node's color
    pub fn set_color(&mut self, id: &str, color: impl Into<Color>) -> Result<()> {
        let node = self
            .database
            .node_mut(id)
            .ok_or_else(|| DiagramError::dangling("node", id, "set_color"))?;
        node.color = Some(color.into());
        Ok(())
    }

    /// Connect two nodes; endpoints are resolved at layout time
    pub fn connect(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut FlowEdge {
        self.database.push_edge(FlowEdge::new(from, to))
    }

    pub fn database(&self) -> &FlowchartDatabase {
        &self.database
    }

    pub fn config(&self) -> &FlowchartConfig {
        &self.config
    }

    /// Ranks and feedback edges as the layout will see them
    pub fn ranks(&self) -> Result<RankAssignment> {
        assign_ranks(&self.database)
    }
}

impl Diagram for Flowchart {
    fn kind(&self) -> DiagramKind {
        DiagramKind::Flowchart
    }

    fn layout(&self) -> Result<Layout> {
        debug!(
            nodes = self.database.node_count(),
            edges = self.database.edge_count(),
            packing = self.config.packing.is_some(),
            "Laying out flowchart"
        );
        let algorithm = FlowchartLayoutAlgorithm::with_config(self.config.clone());
        Ok(algorithm.layout(&self.database)?.with_title(self.title.clone()))
    }
}
