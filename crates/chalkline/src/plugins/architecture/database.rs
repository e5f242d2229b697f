//! Architecture diagram database implementation
//!
//! Components sit at caller-given positions. Links and boundaries refer to
//! components by id and are only resolved during layout.

use tracing::trace;

use crate::core::{Color, Database, Point, Result, StrokeStyle};

/// A system component
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub id: String,
    pub label: String,
    /// Top-left corner
    pub position: Point,
    pub color: Option<Color>,
    /// Explicit `(width, height)`; the box still grows to fit its label
    pub size: Option<(f64, f64)>,
}

impl Component {
    pub fn new(id: impl Into<String>, label: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            position: Point::new(x, y),
            color: None,
            size: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<Color>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some((width, height));
        self
    }
}

/// A connection between two components labelled with its protocol
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub from: String,
    pub to: String,
    pub protocol: String,
    pub stroke_style: StrokeStyle,
}

impl Link {
    pub fn new(from: impl Into<String>, to: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            protocol: protocol.into(),
            stroke_style: StrokeStyle::Solid,
        }
    }

    pub fn with_stroke(mut self, stroke_style: StrokeStyle) -> Self {
        self.stroke_style = stroke_style;
        self
    }
}

/// A labelled region drawn behind a set of components
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub label: String,
    pub members: Vec<String>,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Default)]
pub struct ArchitectureDatabase {
    components: Vec<Component>,
    links: Vec<Link>,
    boundaries: Vec<Boundary>,
}

impl ArchitectureDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component; redeclaring an id replaces it in place
    pub fn add_component(&mut self, component: Component) {
        trace!(component = %component.id, x = component.position.x, y = component.position.y, "Adding component");
        match self.components.iter_mut().find(|c| c.id == component.id) {
            Some(existing) => *existing = component,
            None => self.components.push(component),
        }
    }

    pub fn add_link(&mut self, link: Link) {
        trace!(from = %link.from, to = %link.to, protocol = %link.protocol, "Adding link");
        self.links.push(link);
    }

    pub fn add_boundary(&mut self, boundary: Boundary) {
        trace!(label = %boundary.label, members = boundary.members.len(), "Adding boundary");
        self.boundaries.push(boundary);
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn component_index(&self, id: &str) -> Option<usize> {
        self.components.iter().position(|c| c.id == id)
    }
}

impl Database for ArchitectureDatabase {
    type Node = Component;
    type Edge = Link;

    fn add_node(&mut self, node: Component) -> Result<()> {
        self.add_component(node);
        Ok(())
    }

    fn add_edge(&mut self, edge: Link) -> Result<()> {
        self.add_link(edge);
        Ok(())
    }

    fn get_node(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    fn clear(&mut self) {
        self.components.clear();
        self.links.clear();
        self.boundaries.clear();
    }

    fn node_count(&self) -> usize {
        self.components.len()
    }

    fn edge_count(&self) -> usize {
        self.links.len()
    }
}
