//! Timeline diagram plugin
//!
//! Events, milestones and periods on one axis, in declaration order.

use crate::core::{Color, Diagram, DiagramKind, Direction, Layout, LayoutAlgorithm, Result};

mod database;
mod detector;
mod layout;

pub use database::*;
pub use detector::*;
pub use layout::*;

/// Timeline builder
///
/// # Example
/// ```
/// use chalkline::prelude::*;
///
/// let mut timeline = TimelineDiagram::new();
/// let start = timeline.event("2008", "Founded", "Two people in a garage", ColorName::Blue);
/// let end = timeline.milestone("2012", "IPO", ColorName::Red);
/// timeline.period(start, end, "Startup years", ColorName::Gray).unwrap();
/// assert!(timeline.layout().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimelineDiagram {
    database: TimelineDatabase,
    config: TimelineConfig,
    title: Option<String>,
}

impl TimelineDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TimelineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn direction(&mut self, direction: Direction) -> &mut Self {
        self.config.direction = direction;
        self
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn event(
        &mut self,
        date: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        color: impl Into<Color>,
    ) -> ItemId {
        self.database.add_item(TimelineItem {
            date: date.into(),
            title: title.into(),
            description: description.into(),
            color: Some(color.into()),
            kind: ItemKind::Event,
        })
    }

    pub fn milestone(
        &mut self,
        date: impl Into<String>,
        title: impl Into<String>,
        color: impl Into<Color>,
    ) -> ItemId {
        self.database.add_item(TimelineItem {
            date: date.into(),
            title: title.into(),
            description: String::new(),
            color: Some(color.into()),
            kind: ItemKind::Milestone,
        })
    }

    /// A span between two declared items
    pub fn period(
        &mut self,
        start: ItemId,
        end: ItemId,
        label: impl Into<String>,
        color: impl Into<Color>,
    ) -> Result<()> {
        self.database.add_period(Period {
            start,
            end,
            label: label.into(),
            color: Some(color.into()),
        })
    }

    pub fn database(&self) -> &TimelineDatabase {
        &self.database
    }
}

impl Diagram for TimelineDiagram {
    fn kind(&self) -> DiagramKind {
        DiagramKind::Timeline
    }

    fn layout(&self) -> Result<Layout> {
        let algorithm = TimelineLayoutAlgorithm::with_config(self.config.clone());
        Ok(algorithm.layout(&self.database)?.with_title(self.title.clone()))
    }
}
