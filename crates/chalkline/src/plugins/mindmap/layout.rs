//! Mind map layout algorithm
//!
//! The central topic sits at the origin. First-tier branches go around it
//! (radial) or down both sides (alternating); deeper tiers stack in columns
//! pushed outward from their branch.

use std::f64::consts::PI;
use tracing::{debug, span, trace, Level};

use super::database::{MindMapDatabase, TopicId, TopicKind};
use crate::core::{
    geometry, text, AnchorTarget, DiagramKind, Layout, LayoutAlgorithm, LayoutConnector,
    LayoutShape, Point, Rect, Result, ShapeKind, ShapeStyle,
};

/// How first-tier branches are arranged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MindMapStyle {
    #[default]
    Radial,
    Alternating,
}

/// Mind map layout configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MindMapConfig {
    pub style: MindMapStyle,
    /// Distance from the center to first-tier branches
    pub radius: f64,
    /// Horizontal step per tier beyond the first
    pub tier_step: f64,
    /// Vertical pitch of stacked descendants
    pub child_spacing: f64,
    /// Minimum vertical pitch of alternating branches
    pub branch_spacing: f64,
    pub font_size: f64,
    pub gap: f64,
}

impl Default for MindMapConfig {
    fn default() -> Self {
        Self {
            style: MindMapStyle::Radial,
            radius: 300.0,
            tier_step: 220.0,
            child_spacing: 64.0,
            branch_spacing: 140.0,
            font_size: 20.0,
            gap: geometry::DEFAULT_GAP,
        }
    }
}

impl MindMapConfig {
    pub fn with_style(mut self, style: MindMapStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }
}

/// Mind map layout algorithm
#[derive(Debug, Clone, Default)]
pub struct MindMapLayoutAlgorithm {
    config: MindMapConfig,
}

impl MindMapLayoutAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MindMapConfig) -> Self {
        Self { config }
    }

    fn font_size(&self, kind: TopicKind) -> f64 {
        match kind {
            TopicKind::Central => self.config.font_size * 1.2,
            TopicKind::Branch => self.config.font_size,
            TopicKind::Leaf => self.config.font_size * 0.8,
        }
    }

    fn topic_size(&self, label: &str, kind: TopicKind) -> (f64, f64) {
        let metrics = text::measure(&text::wrap_for_box(label, 24), self.font_size(kind));
        match kind {
            TopicKind::Central => ((metrics.width * 1.4 + 40.0).max(180.0), (metrics.height * 1.6 + 30.0).max(90.0)),
            TopicKind::Branch => ((metrics.width + 40.0).max(140.0), (metrics.height + 24.0).max(60.0)),
            TopicKind::Leaf => ((metrics.width + 30.0).max(110.0), (metrics.height + 16.0).max(44.0)),
        }
    }

    /// Centers of first-tier branches and the side (+1 right, -1 left)
    /// their subtrees grow towards
    fn branch_anchors(&self, database: &MindMapDatabase, branches: &[TopicId]) -> Vec<(Point, f64)> {
        let n = branches.len();
        match self.config.style {
            MindMapStyle::Radial => (0..n)
                .map(|i| {
                    let angle = -PI / 2.0 + 2.0 * PI * i as f64 / n as f64;
                    let (sin, cos) = angle.sin_cos();
                    let center = Point::new(self.config.radius * cos, self.config.radius * sin);
                    let side = if cos >= -1e-9 { 1.0 } else { -1.0 };
                    (center, side)
                })
                .collect(),
            MindMapStyle::Alternating => {
                let pitch = branches
                    .iter()
                    .map(|b| self.subtree_height(database, *b) + self.config.child_spacing)
                    .fold(self.config.branch_spacing, f64::max);
                let right = n.div_ceil(2);
                let left = n / 2;
                (0..n)
                    .map(|i| {
                        let (slot, count, side) = if i % 2 == 0 {
                            (i / 2, right, 1.0)
                        } else {
                            (i / 2, left, -1.0)
                        };
                        let y = (slot as f64 - (count as f64 - 1.0) / 2.0) * pitch;
                        (Point::new(side * self.config.radius, y), side)
                    })
                    .collect()
            }
        }
    }

    /// Height of the tallest descendant column below a branch
    fn subtree_height(&self, database: &MindMapDatabase, branch: TopicId) -> f64 {
        let base = database.get(branch).map_or(1, |t| t.depth);
        let columns = self.columns(database, branch, base);
        columns
            .iter()
            .map(|column| column.len() as f64 * self.config.child_spacing)
            .fold(0.0, f64::max)
    }

    /// Descendants grouped by tier below the branch, preorder within a tier
    fn columns(&self, database: &MindMapDatabase, branch: TopicId, base: usize) -> Vec<Vec<TopicId>> {
        let mut columns: Vec<Vec<TopicId>> = Vec::new();
        for id in database.descendants(branch) {
            let Some(topic) = database.get(id) else {
                continue;
            };
            let tier = topic.depth - base - 1;
            if columns.len() <= tier {
                columns.resize_with(tier + 1, Vec::new);
            }
            columns[tier].push(id);
        }
        columns
    }
}

impl LayoutAlgorithm<MindMapDatabase> for MindMapLayoutAlgorithm {
    fn layout(&self, database: &MindMapDatabase) -> Result<Layout> {
        let layout_span = span!(
            Level::INFO,
            "layout_mindmap",
            topics = database.len(),
            style = ?self.config.style
        );
        let _enter = layout_span.enter();

        let mut centers = vec![Point::default(); database.len()];
        let branches = database.children(TopicId::CENTRAL);
        for (branch, (center, side)) in branches
            .iter()
            .zip(self.branch_anchors(database, &branches))
        {
            centers[branch.index()] = center;
            let base = database.get(*branch).map_or(1, |t| t.depth);
            for (tier, column) in self.columns(database, *branch, base).iter().enumerate() {
                let x = center.x + side * (tier as f64 + 1.0) * self.config.tier_step;
                let offset = (column.len() as f64 - 1.0) / 2.0;
                for (row, id) in column.iter().enumerate() {
                    let y = center.y + (row as f64 - offset) * self.config.child_spacing;
                    centers[id.index()] = Point::new(x, y);
                    trace!(topic = id.index(), tier = tier + 2, x, y, "Placed topic");
                }
            }
        }

        let mut layout = Layout::new(DiagramKind::MindMap);
        let mut rects = Vec::with_capacity(database.len());
        for (index, topic) in database.topics().iter().enumerate() {
            let (width, height) = self.topic_size(&topic.label, topic.kind);
            let rect = Rect::centered(centers[index], width, height);
            rects.push(rect);
            let shape = match topic.kind {
                TopicKind::Central => ShapeKind::Ellipse,
                TopicKind::Branch | TopicKind::Leaf => ShapeKind::Rectangle,
            };
            let mut style = ShapeStyle::colored(database.effective_color(TopicId(index)))
                .with_font_size(self.font_size(topic.kind));
            if shape == ShapeKind::Rectangle {
                style = style.rounded();
            }
            layout.push_shape(
                LayoutShape::new(format!("topic{}", index), shape, rect)
                    .with_label(text::wrap_for_box(&topic.label, 24))
                    .with_style(style),
            );
        }

        for (index, topic) in database.topics().iter().enumerate() {
            let Some(parent) = topic.parent else {
                continue;
            };
            let (parent_rect, child_rect) = (rects[parent.index()], rects[index]);
            let parent_kind = layout.shapes[parent.index()].kind;
            let child_kind = layout.shapes[index].kind;
            let start = geometry::anchor_point(
                parent_kind,
                &parent_rect,
                AnchorTarget::Toward(child_rect.center()),
                self.config.gap,
            )?;
            let end = geometry::anchor_point(
                child_kind,
                &child_rect,
                AnchorTarget::Toward(parent_rect.center()),
                self.config.gap,
            )?;
            layout.push_connector(
                LayoutConnector::arrow(
                    format!("link{}", index),
                    format!("topic{}", parent.index()),
                    format!("topic{}", index),
                    vec![start, end],
                )
                .without_arrowheads()
                .with_color(database.effective_color(TopicId(index))),
            );
        }

        debug!(
            branches = branches.len(),
            shapes = layout.shapes.len(),
            "Mind map layout completed"
        );
        Ok(layout)
    }

    fn name(&self) -> &'static str {
        "mindmap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MindMapDatabase {
        let mut db = MindMapDatabase::new();
        db.set_central("Rust", None);
        for label in ["Ownership", "Traits", "Async", "Macros"] {
            let branch = db
                .add_topic(TopicId::CENTRAL, label, None, TopicKind::Branch)
                .unwrap();
            db.add_topic(branch, "detail one", None, TopicKind::Leaf).unwrap();
            db.add_topic(branch, "detail two", None, TopicKind::Leaf).unwrap();
        }
        db
    }

    #[test]
    fn test_central_at_origin() {
        let layout = MindMapLayoutAlgorithm::new().layout(&sample()).unwrap();
        let central = layout.shape("topic0").unwrap();
        assert_eq!(central.kind, ShapeKind::Ellipse);
        assert_eq!(central.rect.center(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_radial_branches_at_radius() {
        let layout = MindMapLayoutAlgorithm::new().layout(&sample()).unwrap();
        // Branches are topics 1, 4, 7, 10
        for key in ["topic1", "topic4", "topic7", "topic10"] {
            let c = layout.shape(key).unwrap().rect.center();
            let distance = c.distance(Point::new(0.0, 0.0));
            assert!((distance - 300.0).abs() < 1e-6, "{key} at {distance}");
        }
    }

    #[test]
    fn test_children_pushed_outward() {
        let layout = MindMapLayoutAlgorithm::new().layout(&sample()).unwrap();
        // Topic 10 is the branch at 180 degrees
        let left = layout.shape("topic10").unwrap().rect.center();
        let child = layout.shape("topic11").unwrap().rect.center();
        assert!(child.x < left.x);
        let right = layout.shape("topic4").unwrap().rect.center();
        let right_child = layout.shape("topic5").unwrap().rect.center();
        assert!(right_child.x > right.x);
    }

    #[test]
    fn test_alternating_sides() {
        let config = MindMapConfig::default().with_style(MindMapStyle::Alternating);
        let layout = MindMapLayoutAlgorithm::with_config(config)
            .layout(&sample())
            .unwrap();
        let first = layout.shape("topic1").unwrap().rect.center();
        let second = layout.shape("topic4").unwrap().rect.center();
        assert!(first.x > 0.0);
        assert!(second.x < 0.0);
    }

    #[test]
    fn test_links_have_no_arrowheads() {
        let layout = MindMapLayoutAlgorithm::new().layout(&sample()).unwrap();
        assert_eq!(layout.connectors.len(), 12);
        assert!(layout
            .connectors
            .iter()
            .all(|c| c.end_arrowhead.is_none() && c.from.is_some()));
    }
}
