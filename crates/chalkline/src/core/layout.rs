//! Shared layout result and the layout algorithm trait
//!
//! Every builder's layout produces a [`Layout`]: positioned shapes,
//! routed connectors and free text, keyed by logical names. The scene
//! emitter turns it into elements without knowing which builder made it.

use super::{
    geometry, Arrowhead, Color, DiagramKind, FontFamily, Point, Rect, Result, ShapeKind,
    StrokeStyle, TextAlign,
};

/// Core trait for layout algorithms
///
/// A layout reads a builder's accumulated data and assigns coordinates.
/// It never mutates the builder, so repeated layouts of the same input
/// give the same result.
pub trait LayoutAlgorithm<D>: Send + Sync {
    /// Arrange the elements described by `data`
    fn layout(&self, data: &D) -> Result<Layout>;

    /// Get the name of this layout algorithm
    fn name(&self) -> &'static str;
}

/// Visual options of a positioned shape
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeStyle {
    /// `None` takes the next color of the scheme cycle
    pub color: Option<Color>,
    pub stroke_style: StrokeStyle,
    pub rounded: bool,
    /// Draw the outline only
    pub transparent: bool,
    pub font_size: Option<f64>,
    pub font_family: Option<FontFamily>,
    pub text_align: TextAlign,
}

impl ShapeStyle {
    pub fn colored(color: Option<Color>) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn rounded(mut self) -> Self {
        self.rounded = true;
        self
    }

    pub fn dashed(mut self) -> Self {
        self.stroke_style = StrokeStyle::Dashed;
        self
    }

    pub fn transparent(mut self) -> Self {
        self.transparent = true;
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn aligned(mut self, align: TextAlign) -> Self {
        self.text_align = align;
        self
    }
}

/// A shape with its final box
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutShape {
    pub key: String,
    pub kind: ShapeKind,
    pub rect: Rect,
    /// Text bound inside the shape
    pub label: Option<String>,
    pub style: ShapeStyle,
    /// Logical group names this shape belongs to
    pub groups: Vec<String>,
}

impl LayoutShape {
    pub fn new(key: impl Into<String>, kind: ShapeKind, rect: Rect) -> Self {
        Self {
            key: key.into(),
            kind,
            rect,
            label: None,
            style: ShapeStyle::default(),
            groups: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }
}

/// Where a connector label goes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelPlacement {
    /// Text contained by the connector, centered on its midpoint
    Bound,
    /// Free text displaced perpendicular to the midpoint segment, grouped
    /// with its connector
    Offset(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorLabel {
    pub text: String,
    pub placement: LabelPlacement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectorKind {
    #[default]
    Arrow,
    Line,
}

/// A routed connector with absolute path points
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConnector {
    pub key: String,
    pub kind: ConnectorKind,
    /// Shape key the start is bound to
    pub from: Option<String>,
    /// Shape key the end is bound to
    pub to: Option<String>,
    pub points: Vec<Point>,
    pub label: Option<ConnectorLabel>,
    pub stroke_style: StrokeStyle,
    pub start_arrowhead: Option<Arrowhead>,
    pub end_arrowhead: Option<Arrowhead>,
    /// `None` draws in the style sheet ink
    pub color: Option<Color>,
    pub groups: Vec<String>,
}

impl LayoutConnector {
    /// An arrow with an end arrowhead, bound at both ends
    pub fn arrow(
        key: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        points: Vec<Point>,
    ) -> Self {
        Self {
            key: key.into(),
            kind: ConnectorKind::Arrow,
            from: Some(from.into()),
            to: Some(to.into()),
            points,
            label: None,
            stroke_style: StrokeStyle::Solid,
            start_arrowhead: None,
            end_arrowhead: Some(Arrowhead::Arrow),
            color: None,
            groups: Vec::new(),
        }
    }

    /// An unbound line without arrowheads
    pub fn line(key: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            key: key.into(),
            kind: ConnectorKind::Line,
            from: None,
            to: None,
            points,
            label: None,
            stroke_style: StrokeStyle::Solid,
            start_arrowhead: None,
            end_arrowhead: None,
            color: None,
            groups: Vec::new(),
        }
    }

    /// An arrow with an end arrowhead and no bindings
    pub fn free_arrow(key: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            kind: ConnectorKind::Arrow,
            end_arrowhead: Some(Arrowhead::Arrow),
            ..Self::line(key, points)
        }
    }

    pub fn with_label(mut self, text: impl Into<String>, placement: LabelPlacement) -> Self {
        self.label = Some(ConnectorLabel {
            text: text.into(),
            placement,
        });
        self
    }

    pub fn with_stroke(mut self, stroke_style: StrokeStyle) -> Self {
        self.stroke_style = stroke_style;
        self
    }

    pub fn without_arrowheads(mut self) -> Self {
        self.start_arrowhead = None;
        self.end_arrowhead = None;
        self
    }

    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Extent of the path, which may be flat on one axis
    pub fn extent(&self) -> Option<(f64, f64, f64, f64)> {
        geometry::point_extents(&self.points)
    }
}

/// Standalone text placed at an absolute position
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutText {
    pub key: String,
    pub text: String,
    /// Top-left corner
    pub position: Point,
    pub font_size: Option<f64>,
    pub align: TextAlign,
    pub color: Option<Color>,
    pub groups: Vec<String>,
}

impl LayoutText {
    pub fn new(key: impl Into<String>, text: impl Into<String>, position: Point) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
            position,
            font_size: None,
            align: TextAlign::Left,
            color: None,
            groups: Vec::new(),
        }
    }

    /// Text whose measured box is centered on `center`
    pub fn centered_on(
        key: impl Into<String>,
        text: impl Into<String>,
        center: Point,
        font_size: f64,
    ) -> Self {
        let text = text.into();
        let metrics = super::text::measure(&text, font_size);
        let mut item = Self::new(
            key,
            text,
            Point::new(center.x - metrics.width / 2.0, center.y - metrics.height / 2.0),
        );
        item.font_size = Some(font_size);
        item.align = TextAlign::Center;
        item
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }
}

/// The positioned output of a layout algorithm
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub kind: DiagramKind,
    /// In drawing order; earlier shapes render behind later ones
    pub shapes: Vec<LayoutShape>,
    pub connectors: Vec<LayoutConnector>,
    pub texts: Vec<LayoutText>,
    /// Centered above the content when present
    pub title: Option<String>,
}

impl Layout {
    pub fn new(kind: DiagramKind) -> Self {
        Self {
            kind,
            shapes: Vec::new(),
            connectors: Vec::new(),
            texts: Vec::new(),
            title: None,
        }
    }

    pub fn push_shape(&mut self, shape: LayoutShape) {
        self.shapes.push(shape);
    }

    pub fn push_connector(&mut self, connector: LayoutConnector) {
        self.connectors.push(connector);
    }

    pub fn push_text(&mut self, text: LayoutText) {
        self.texts.push(text);
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn shape(&self, key: &str) -> Option<&LayoutShape> {
        self.shapes.iter().find(|s| s.key == key)
    }

    /// Bounding box of every shape, connector and text
    pub fn bounds(&self) -> Option<Rect> {
        let mut rects: Vec<Rect> = self.shapes.iter().map(|s| s.rect).collect();
        for connector in &self.connectors {
            if let Some((min_x, min_y, max_x, max_y)) = connector.extent() {
                rects.push(Rect::new(
                    min_x,
                    min_y,
                    (max_x - min_x).max(1.0),
                    (max_y - min_y).max(1.0),
                ));
            }
        }
        for text in &self.texts {
            let metrics = super::text::measure(&text.text, text.font_size.unwrap_or(16.0));
            rects.push(Rect::new(
                text.position.x,
                text.position.y,
                metrics.width,
                metrics.height,
            ));
        }
        geometry::bounding_box(&rects)
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.connectors.is_empty() && self.texts.is_empty()
    }
}
