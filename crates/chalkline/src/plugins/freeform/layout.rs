//! Freeform layout algorithm
//!
//! Everything keeps its caller-given position; only box sizes and arrow
//! paths are computed here.

use tracing::{debug, span, Level};

use super::database::{FreeShape, FreeformDatabase, ShapeHandle};
use crate::core::{
    geometry, text, Database, DiagramError, DiagramKind, LabelPlacement, Layout, LayoutAlgorithm,
    LayoutConnector, LayoutShape, LayoutText, Rect, Result, ShapeKind, ShapeStyle, Side,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FreeformConfig {
    pub box_width: f64,
    pub box_height: f64,
    pub label_padding: f64,
    pub font_size: f64,
    pub align_tolerance: f64,
    pub gap: f64,
}

impl Default for FreeformConfig {
    fn default() -> Self {
        Self {
            box_width: 150.0,
            box_height: 70.0,
            label_padding: 20.0,
            font_size: 20.0,
            align_tolerance: geometry::DEFAULT_ALIGN_TOLERANCE,
            gap: geometry::DEFAULT_GAP,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FreeformLayoutAlgorithm {
    config: FreeformConfig,
}

impl FreeformLayoutAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FreeformConfig) -> Self {
        Self { config }
    }

    /// Final box of a shape, grown to fit its label
    pub fn shape_rect(&self, handle: ShapeHandle, shape: &FreeShape) -> Result<Rect> {
        let config = &self.config;
        let (width, height) = match shape.size {
            Some((width, height)) => {
                let explicit = Rect::new(shape.position.x, shape.position.y, width, height);
                geometry::ensure_valid(&explicit, &handle.key())?;
                (width, height)
            }
            None => (config.box_width, config.box_height),
        };
        let metrics = text::measure(&text::wrap_for_box(&shape.label, 20), config.font_size);
        // Ellipses and diamonds only fit text in their middle
        let scale = match shape.kind {
            ShapeKind::Rectangle => 1.0,
            ShapeKind::Ellipse => 1.4,
            ShapeKind::Diamond => 2.0,
        };
        let rect = Rect::new(
            shape.position.x,
            shape.position.y,
            width.max(metrics.width * scale + 2.0 * config.label_padding),
            height.max(metrics.height * scale + 2.0 * config.label_padding),
        );
        geometry::ensure_valid(&rect, &handle.key())?;
        Ok(rect)
    }
}

impl LayoutAlgorithm<FreeformDatabase> for FreeformLayoutAlgorithm {
    fn layout(&self, database: &FreeformDatabase) -> Result<Layout> {
        let layout_span = span!(
            Level::INFO,
            "layout_freeform",
            shapes = database.node_count(),
            arrows = database.edge_count()
        );
        let _enter = layout_span.enter();

        let config = &self.config;
        let mut layout = Layout::new(DiagramKind::Freeform);
        let mut rects = Vec::with_capacity(database.shapes().len());

        for (index, shape) in database.shapes().iter().enumerate() {
            let handle = ShapeHandle(index);
            let rect = self.shape_rect(handle, shape)?;
            rects.push(rect);
            let mut style = ShapeStyle::colored(shape.color.clone()).with_font_size(config.font_size);
            if shape.kind == ShapeKind::Rectangle {
                style = style.rounded();
            }
            let mut item = LayoutShape::new(handle.key(), shape.kind, rect).with_style(style);
            if !shape.label.is_empty() {
                item = item.with_label(text::wrap_for_box(&shape.label, 20));
            }
            layout.push_shape(item);
        }

        for (index, free) in database.texts().iter().enumerate() {
            let mut item = LayoutText::new(format!("text{}", index), free.text.clone(), free.position)
                .with_color(free.color.clone());
            if let Some(size) = free.font_size {
                item = item.with_font_size(size);
            }
            layout.push_text(item);
        }

        for (index, arrow) in database.arrows().iter().enumerate() {
            let context = format!("arrow {} -> {}", arrow.from, arrow.to);
            let lookup = |handle: ShapeHandle| {
                rects
                    .get(handle.0)
                    .copied()
                    .ok_or_else(|| DiagramError::dangling("shape", handle.key(), context.clone()))
            };
            let (from_rect, to_rect) = (lookup(arrow.from)?, lookup(arrow.to)?);
            let from_kind = database.shapes()[arrow.from.0].kind;
            let to_kind = database.shapes()[arrow.to.0].kind;

            let points = if arrow.from == arrow.to {
                geometry::self_loop(&from_rect, Side::Right, config.gap)?
            } else {
                geometry::route(
                    (from_kind, &from_rect),
                    (to_kind, &to_rect),
                    config.align_tolerance,
                    config.gap,
                )?
            };
            let mut connector = LayoutConnector::arrow(
                format!("arrow{}", index),
                arrow.from.key(),
                arrow.to.key(),
                points,
            )
            .with_stroke(arrow.stroke_style);
            if !arrow.label.is_empty() {
                connector = connector.with_label(arrow.label.clone(), LabelPlacement::Bound);
            }
            layout.push_connector(connector);
        }

        for (index, line) in database.lines().iter().enumerate() {
            if line.points.len() < 2 {
                return Err(DiagramError::invalid_geometry(
                    format!("line{}", index),
                    "a line needs at least two points",
                ));
            }
            layout.push_connector(
                LayoutConnector::line(format!("line{}", index), line.points.clone())
                    .with_stroke(line.stroke_style)
                    .with_color(line.color.clone()),
            );
        }

        debug!(
            shapes = layout.shapes.len(),
            connectors = layout.connectors.len(),
            "Freeform layout completed"
        );
        Ok(layout)
    }

    fn name(&self) -> &'static str {
        "freeform"
    }
}
