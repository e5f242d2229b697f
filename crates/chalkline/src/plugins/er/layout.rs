//! Entity-relationship layout algorithm
//!
//! Each entity is an outlined box with a filled header and its attributes
//! listed underneath, all in one group. Entities without a position fill a
//! grid row by row.

use tracing::{debug, span, trace, Level};

use super::database::{Entity, ErDatabase};
use crate::core::{
    geometry, text, Database, DiagramError, DiagramKind, LabelPlacement, Layout, LayoutAlgorithm,
    LayoutConnector, LayoutShape, LayoutText, Point, Rect, Result, ShapeKind, ShapeStyle, Side,
};

/// ER layout configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ErConfig {
    /// Grid columns for automatically placed entities
    pub columns: usize,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
    pub min_width: f64,
    pub header_height: f64,
    pub padding: f64,
    pub font_size: f64,
    pub attribute_font_size: f64,
    pub align_tolerance: f64,
    pub gap: f64,
}

impl Default for ErConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            horizontal_spacing: 140.0,
            vertical_spacing: 100.0,
            min_width: 180.0,
            header_height: 40.0,
            padding: 12.0,
            font_size: 20.0,
            attribute_font_size: 16.0,
            align_tolerance: geometry::DEFAULT_ALIGN_TOLERANCE,
            gap: geometry::DEFAULT_GAP,
        }
    }
}

impl ErConfig {
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    pub fn with_spacing(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_spacing = horizontal;
        self.vertical_spacing = vertical;
        self
    }
}

/// ER layout algorithm
#[derive(Debug, Clone, Default)]
pub struct ErLayoutAlgorithm {
    config: ErConfig,
}

impl ErLayoutAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ErConfig) -> Self {
        Self { config }
    }

    /// Width grows with the longest line, height with the attribute count
    pub fn entity_size(&self, entity: &Entity) -> (f64, f64) {
        let config = &self.config;
        let title = text::measure(&entity.label, config.font_size);
        let body = attribute_block(entity)
            .map(|block| text::measure(&block, config.attribute_font_size))
            .map_or((0.0, 0.0), |m| (m.width, m.height));
        let width = (title.width.max(body.0) + 2.0 * config.padding).max(config.min_width);
        let body_height = if entity.attributes.is_empty() {
            config.padding * 2.0
        } else {
            body.1 + 2.0 * config.padding
        };
        (width, config.header_height + body_height)
    }
}

fn attribute_block(entity: &Entity) -> Option<String> {
    if entity.attributes.is_empty() {
        None
    } else {
        Some(entity.attributes.join("\n"))
    }
}

impl LayoutAlgorithm<ErDatabase> for ErLayoutAlgorithm {
    fn layout(&self, database: &ErDatabase) -> Result<Layout> {
        let layout_span = span!(
            Level::INFO,
            "layout_er",
            entities = database.node_count(),
            relationships = database.edge_count()
        );
        let _enter = layout_span.enter();

        let config = &self.config;
        let entities: Vec<&Entity> = database.nodes().collect();
        let sizes: Vec<(f64, f64)> = entities.iter().map(|e| self.entity_size(e)).collect();

        // Grid pitch covers the largest auto-placed entity
        let auto: Vec<usize> = (0..entities.len())
            .filter(|&i| entities[i].position.is_none())
            .collect();
        let cell_width = auto.iter().map(|&i| sizes[i].0).fold(0.0, f64::max);
        let cell_height = auto.iter().map(|&i| sizes[i].1).fold(0.0, f64::max);
        let columns = config.columns.max(1);

        let mut rects: Vec<Rect> = vec![Rect::default(); entities.len()];
        for (index, entity) in entities.iter().enumerate() {
            let (width, height) = sizes[index];
            let origin = match entity.position {
                Some(point) => point,
                None => {
                    let slot = auto.iter().position(|&i| i == index).unwrap_or(0);
                    Point::new(
                        (slot % columns) as f64 * (cell_width + config.horizontal_spacing),
                        (slot / columns) as f64 * (cell_height + config.vertical_spacing),
                    )
                }
            };
            rects[index] = Rect::new(origin.x, origin.y, width, height);
            trace!(entity = %entity.id, x = origin.x, y = origin.y, width, height, "Placed entity");
        }

        let mut layout = Layout::new(DiagramKind::Er);
        for (index, entity) in entities.iter().enumerate() {
            let rect = rects[index];
            let group = format!("entity:{}", entity.id);

            layout.push_shape(
                LayoutShape::new(entity.id.clone(), ShapeKind::Rectangle, rect)
                    .with_style(ShapeStyle::colored(entity.color.clone()).transparent())
                    .in_group(group.clone()),
            );
            let header = Rect::new(rect.x, rect.y, rect.width, config.header_height);
            layout.push_shape(
                LayoutShape::new(format!("{}:header", entity.id), ShapeKind::Rectangle, header)
                    .with_label(entity.label.clone())
                    .with_style(ShapeStyle::colored(entity.color.clone()).with_font_size(config.font_size))
                    .in_group(group.clone()),
            );
            if let Some(block) = attribute_block(entity) {
                layout.push_text(
                    LayoutText::new(
                        format!("{}:attributes", entity.id),
                        block,
                        Point::new(
                            rect.x + config.padding,
                            rect.y + config.header_height + config.padding,
                        ),
                    )
                    .with_font_size(config.attribute_font_size)
                    .in_group(group),
                );
            }
        }

        for (index, relationship) in database.relationships().iter().enumerate() {
            let from = entities
                .iter()
                .position(|e| e.id == relationship.from)
                .ok_or_else(|| DiagramError::dangling("entity", relationship.from.clone(), "er layout"))?;
            let to = entities
                .iter()
                .position(|e| e.id == relationship.to)
                .ok_or_else(|| DiagramError::dangling("entity", relationship.to.clone(), "er layout"))?;

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
                format!("relationship{}", index),
                relationship.from.clone(),
                relationship.to.clone(),
                points,
            )
            .without_arrowheads();
            let caption = relationship.caption();
            if !caption.is_empty() {
                connector = connector.with_label(caption, LabelPlacement::Bound);
            }
            layout.push_connector(connector);
        }

        debug!(shapes = layout.shapes.len(), "ER layout completed");
        Ok(layout)
    }

    fn name(&self) -> &'static str {
        "entity-grid"
    }
}
