//! Mind map diagram plugin
//!
//! A central topic with branches and leaves, addressed by [`TopicId`].

use crate::core::{Color, Diagram, DiagramKind, Layout, LayoutAlgorithm, Result};

mod database;
mod detector;
mod layout;

pub use database::*;
pub use detector::*;
pub use layout::*;

/// Mind map builder
///
/// # Example
/// ```
/// use chalkline::prelude::*;
///
/// let mut map = MindMap::new();
/// map.central("Rust", ColorName::Blue);
/// let traits = map.branch(TopicId::CENTRAL, "Traits", ColorName::Green).unwrap();
/// map.leaf(traits, "Generics").unwrap();
/// assert_eq!(map.layout().unwrap().shapes.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MindMap {
    database: MindMapDatabase,
    config: MindMapConfig,
    title: Option<String>,
}

impl MindMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MindMapConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn style(&mut self, style: MindMapStyle) -> &mut Self {
        self.config.style = style;
        self
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    /// Label and color the central topic
    pub fn central(&mut self, label: impl Into<String>, color: impl Into<Color>) -> &mut Self {
        self.database.set_central(label, Some(color.into()));
        self
    }

    pub fn branch(
        &mut self,
        parent: TopicId,
        label: impl Into<String>,
        color: impl Into<Color>,
    ) -> Result<TopicId> {
        self.database
            .add_topic(parent, label, Some(color.into()), TopicKind::Branch)
    }

    /// A leaf takes its parent's color
    pub fn leaf(&mut self, parent: TopicId, label: impl Into<String>) -> Result<()> {
        self.database
            .add_topic(parent, label, None, TopicKind::Leaf)
            .map(|_| ())
    }

    pub fn database(&self) -> &MindMapDatabase {
        &self.database
    }
}

impl Diagram for MindMap {
    fn kind(&self) -> DiagramKind {
        DiagramKind::MindMap
    }

    fn layout(&self) -> Result<Layout> {
        let algorithm = MindMapLayoutAlgorithm::with_config(self.config.clone());
        Ok(algorithm.layout(&self.database)?.with_title(self.title.clone()))
    }
}
