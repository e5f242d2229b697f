//! Freeform diagram plugin
//!
//! Boxes, ellipses and diamonds at explicit positions, free text and
//! arrows between shapes addressed by [`ShapeHandle`].

use crate::core::{
    Color, Diagram, DiagramKind, Layout, LayoutAlgorithm, Point, Result, ShapeKind, StrokeStyle,
};

mod database;
mod layout;

pub use database::*;
pub use layout::*;

/// Freeform diagram builder
///
/// # Example
/// ```
/// use chalkline::prelude::*;
///
/// let mut diagram = FreeformDiagram::new();
/// let a = diagram.rectangle(100.0, 100.0, "Item 1", ColorName::Blue);
/// let b = diagram.rectangle(300.0, 100.0, "Item 2", ColorName::Green);
/// diagram.arrow_between(a, b, "connection");
/// assert_eq!(diagram.layout().unwrap().connectors.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FreeformDiagram {
    database: FreeformDatabase,
    config: FreeformConfig,
    title: Option<String>,
}

impl FreeformDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FreeformConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    fn add(
        &mut self,
        kind: ShapeKind,
        x: f64,
        y: f64,
        label: impl Into<String>,
        color: impl Into<Color>,
    ) -> ShapeHandle {
        self.database.add_shape(FreeShape {
            kind,
            position: Point::new(x, y),
            label: label.into(),
            color: Some(color.into()),
            size: None,
        })
    }

    pub fn rectangle(&mut self, x: f64, y: f64, label: impl Into<String>, color: impl Into<Color>) -> ShapeHandle {
        self.add(ShapeKind::Rectangle, x, y, label, color)
    }

    pub fn ellipse(&mut self, x: f64, y: f64, label: impl Into<String>, color: impl Into<Color>) -> ShapeHandle {
        self.add(ShapeKind::Ellipse, x, y, label, color)
    }

    pub fn diamond(&mut self, x: f64, y: f64, label: impl Into<String>, color: impl Into<Color>) -> ShapeHandle {
        self.add(ShapeKind::Diamond, x, y, label, color)
    }

    /// A shape with an explicit minimum size
    #[allow(clippy::too_many_arguments)]
    pub fn sized(
        &mut self,
        kind: ShapeKind,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        label: impl Into<String>,
        color: impl Into<Color>,
    ) -> ShapeHandle {
        self.database.add_shape(FreeShape {
            kind,
            position: Point::new(x, y),
            label: label.into(),
            color: Some(color.into()),
            size: Some((width, height)),
        })
    }

    /// Free text with its top-left corner at `(x, y)`
    pub fn text(&mut self, x: f64, y: f64, content: impl Into<String>) -> &mut Self {
        self.database.add_text(FreeText {
            position: Point::new(x, y),
            text: content.into(),
            font_size: None,
            color: None,
        });
        self
    }

    /// Arrow bound to both shapes; an empty label draws none
    pub fn arrow_between(&mut self, from: ShapeHandle, to: ShapeHandle, label: impl Into<String>) -> &mut Self {
        self.database.add_arrow(FreeArrow {
            from,
            to,
            label: label.into(),
            stroke_style: StrokeStyle::Solid,
        });
        self
    }

    /// Unbound polyline through the given points
    pub fn line(&mut self, points: impl IntoIterator<Item = Point>, stroke_style: StrokeStyle) -> &mut Self {
        self.database.add_line(FreeLine {
            points: points.into_iter().collect(),
            stroke_style,
            color: None,
        });
        self
    }

    pub fn database(&self) -> &FreeformDatabase {
        &self.database
    }
}

impl Diagram for FreeformDiagram {
    fn kind(&self) -> DiagramKind {
        DiagramKind::Freeform
    }

    fn layout(&self) -> Result<Layout> {
        let algorithm = FreeformLayoutAlgorithm::with_config(self.config.clone());
        Ok(algorithm.layout(&self.database)?.with_title(self.title.clone()))
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::core::{ColorName, DiagramError, SceneConfig};

    #[test]
    fn test_full_pipeline() {
        let mut diagram = FreeformDiagram::new();
        let a = diagram.rectangle(100.0, 100.0, "Item 1", ColorName::Blue);
        let b = diagram.ellipse(350.0, 100.0, "Item 2", ColorName::Green);
        let c = diagram.diamond(350.0, 300.0, "Item 3", ColorName::Red);
        diagram
            .arrow_between(a, b, "connection")
            .arrow_between(b, c, "")
            .text(100.0, 20.0, "Notes")
            .line([Point::new(0.0, 400.0), Point::new(500.0, 400.0)], StrokeStyle::Dotted);

        let document = diagram.to_document(&SceneConfig::default()).unwrap();
        assert_eq!(document.shapes().count(), 3);
        assert_eq!(document.connectors().count(), 3);
        document.validate().unwrap();
    }

    #[test]
    fn test_saving_twice_is_identical() {
        let mut diagram = FreeformDiagram::new();
        let a = diagram.rectangle(0.0, 0.0, "a", ColorName::Blue);
        let b = diagram.rectangle(300.0, 200.0, "b", ColorName::Blue);
        diagram.arrow_between(a, b, "x");
        let config = SceneConfig::default();
        assert_eq!(
            diagram.to_document(&config).unwrap(),
            diagram.to_document(&config).unwrap()
        );
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut diagram = FreeformDiagram::new();
        diagram.sized(ShapeKind::Rectangle, 0.0, 0.0, 0.0, 0.0, "", ColorName::Gray);
        assert!(matches!(
            diagram.layout().unwrap_err(),
            DiagramError::InvalidGeometry { .. }
        ));
    }
}
