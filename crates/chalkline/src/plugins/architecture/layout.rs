//! Architecture layout algorithm
//!
//! Components keep the positions they were declared with. Boxes grow to
//! fit their labels, boundaries wrap their members and are emitted first so
//! they render behind them.

use tracing::{debug, span, trace, Level};

use super::database::{ArchitectureDatabase, Component};
use crate::core::{
    geometry, text, Database, DiagramError, DiagramKind, LabelPlacement, Layout, LayoutAlgorithm,
    LayoutConnector, LayoutShape, LayoutText, Point, Rect, Result, ShapeKind, ShapeStyle, Side,
};

/// Architecture layout configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ArchitectureConfig {
    pub component_width: f64,
    pub component_height: f64,
    /// Space kept around a component label
    pub label_padding: f64,
    /// Space between a boundary and its members
    pub boundary_padding: f64,
    /// Extra room above members for the boundary caption
    pub boundary_caption: f64,
    pub font_size: f64,
    pub align_tolerance: f64,
    pub gap: f64,
}

impl Default for ArchitectureConfig {
    fn default() -> Self {
        Self {
            component_width: 160.0,
            component_height: 80.0,
            label_padding: 20.0,
            boundary_padding: 30.0,
            boundary_caption: 30.0,
            font_size: 20.0,
            align_tolerance: geometry::DEFAULT_ALIGN_TOLERANCE,
            gap: geometry::DEFAULT_GAP,
        }
    }
}

impl ArchitectureConfig {
    pub fn with_component_size(mut self, width: f64, height: f64) -> Self {
        self.component_width = width;
        self.component_height = height;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArchitectureLayoutAlgorithm {
    config: ArchitectureConfig,
}

impl ArchitectureLayoutAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ArchitectureConfig) -> Self {
        Self { config }
    }

    /// Final box of a component
    pub fn component_rect(&self, component: &Component) -> Result<Rect> {
        let config = &self.config;
        let (width, height) = match component.size {
            Some((width, height)) => {
                let explicit = Rect::new(component.position.x, component.position.y, width, height);
                geometry::ensure_valid(&explicit, &component.id)?;
                (width, height)
            }
            None => (config.component_width, config.component_height),
        };
        let metrics = text::measure(&text::wrap_for_box(&component.label, 20), config.font_size);
        let rect = Rect::new(
            component.position.x,
            component.position.y,
            width.max(metrics.width + 2.0 * config.label_padding),
            height.max(metrics.height + 2.0 * config.label_padding),
        );
        geometry::ensure_valid(&rect, &component.id)?;
        Ok(rect)
    }
}

impl LayoutAlgorithm<ArchitectureDatabase> for ArchitectureLayoutAlgorithm {
    fn layout(&self, database: &ArchitectureDatabase) -> Result<Layout> {
        let layout_span = span!(
            Level::INFO,
            "layout_architecture",
            components = database.node_count(),
            links = database.edge_count(),
            boundaries = database.boundaries().len()
        );
        let _enter = layout_span.enter();

        let config = &self.config;
        let rects = database
            .components()
            .iter()
            .map(|c| self.component_rect(c))
            .collect::<Result<Vec<Rect>>>()?;
        let resolve = |id: &str, context: String| {
            database
                .component_index(id)
                .ok_or_else(|| DiagramError::dangling("component", id, context))
        };

        let mut layout = Layout::new(DiagramKind::Architecture);
        let mut memberships: Vec<Vec<String>> = vec![Vec::new(); rects.len()];

        for (index, boundary) in database.boundaries().iter().enumerate() {
            let group = format!("boundary:{}", index);
            let mut members = Vec::with_capacity(boundary.members.len());
            for id in &boundary.members {
                let member = resolve(id, format!("boundary '{}'", boundary.label))?;
                memberships[member].push(group.clone());
                members.push(rects[member]);
            }
            let enclosed = geometry::bounding_box(&members).ok_or_else(|| {
                DiagramError::invalid_geometry(
                    format!("boundary '{}'", boundary.label),
                    "boundary encloses no components",
                )
            })?;
            let padded = enclosed.inflate(config.boundary_padding);
            let rect = Rect::new(
                padded.x,
                padded.y - config.boundary_caption,
                padded.width,
                padded.height + config.boundary_caption,
            );
            trace!(boundary = %boundary.label, x = rect.x, y = rect.y, width = rect.width, height = rect.height, "Placed boundary");

            layout.push_shape(
                LayoutShape::new(format!("boundary{}", index), ShapeKind::Rectangle, rect)
                    .with_style(ShapeStyle::colored(boundary.color.clone()).dashed().transparent())
                    .in_group(group.clone()),
            );
            layout.push_text(
                LayoutText::new(
                    format!("boundary{}:label", index),
                    boundary.label.clone(),
                    Point::new(rect.x + 12.0, rect.y + 8.0),
                )
                .with_font_size(config.font_size * 0.8)
                .with_color(boundary.color.clone())
                .in_group(group),
            );
        }

        for (index, component) in database.components().iter().enumerate() {
            let mut shape = LayoutShape::new(component.id.clone(), ShapeKind::Rectangle, rects[index])
                .with_label(text::wrap_for_box(&component.label, 20))
                .with_style(
                    ShapeStyle::colored(component.color.clone())
                        .rounded()
                        .with_font_size(config.font_size),
                );
            for group in &memberships[index] {
                shape = shape.in_group(group.clone());
            }
            layout.push_shape(shape);
        }

        for (index, link) in database.links().iter().enumerate() {
            let context = format!("link {} -> {}", link.from, link.to);
            let from = resolve(&link.from, context.clone())?;
            let to = resolve(&link.to, context)?;
            let points = if from == to {
                geometry::self_loop(&rects[from], Side::Right, config.gap)?
            } else {
                geometry::route(
                    (ShapeKind::Rectangle, &rects[from]),
                    (ShapeKind::Rectangle, &rects[to]),
                    config.align_tolerance,
                    config.gap,
                )?
            };
            let mut connector = LayoutConnector::arrow(
                format!("link{}", index),
                link.from.clone(),
                link.to.clone(),
                points,
            )
            .with_stroke(link.stroke_style);
            if !link.protocol.is_empty() {
                connector = connector.with_label(link.protocol.clone(), LabelPlacement::Bound);
            }
            layout.push_connector(connector);
        }

        debug!(
            shapes = layout.shapes.len(),
            connectors = layout.connectors.len(),
            "Architecture layout completed"
        );
        Ok(layout)
    }

    fn name(&self) -> &'static str {
        "positioned"
    }
}
