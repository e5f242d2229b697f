//! Freeform diagram database implementation
//!
//! Shapes are kept in an arena addressed by [`ShapeHandle`]. Arrows store
//! handles and are resolved during layout.

use std::fmt;
use tracing::trace;

use crate::core::{Color, Database, Point, Result, ShapeKind, StrokeStyle};

/// Handle of a shape added to a freeform diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeHandle(pub usize);

impl ShapeHandle {
    pub fn index(&self) -> usize {
        self.0
    }

    /// Key of the shape in the layout
    pub fn key(&self) -> String {
        format!("shape{}", self.0)
    }
}

impl fmt::Display for ShapeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FreeShape {
    pub kind: ShapeKind,
    /// Top-left corner
    pub position: Point,
    pub label: String,
    pub color: Option<Color>,
    pub size: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FreeText {
    pub position: Point,
    pub text: String,
    pub font_size: Option<f64>,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FreeArrow {
    pub from: ShapeHandle,
    pub to: ShapeHandle,
    pub label: String,
    pub stroke_style: StrokeStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FreeLine {
    pub points: Vec<Point>,
    pub stroke_style: StrokeStyle,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Default)]
pub struct FreeformDatabase {
    shapes: Vec<FreeShape>,
    texts: Vec<FreeText>,
    arrows: Vec<FreeArrow>,
    lines: Vec<FreeLine>,
}

impl FreeformDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shape(&mut self, shape: FreeShape) -> ShapeHandle {
        let handle = ShapeHandle(self.shapes.len());
        trace!(%handle, kind = ?shape.kind, "Adding shape");
        self.shapes.push(shape);
        handle
    }

    pub fn add_text(&mut self, text: FreeText) {
        self.texts.push(text);
    }

    pub fn add_arrow(&mut self, arrow: FreeArrow) {
        trace!(from = %arrow.from, to = %arrow.to, "Adding arrow");
        self.arrows.push(arrow);
    }

    pub fn add_line(&mut self, line: FreeLine) {
        self.lines.push(line);
    }

    pub fn shape(&self, handle: ShapeHandle) -> Option<&FreeShape> {
        self.shapes.get(handle.0)
    }

    pub fn shapes(&self) -> &[FreeShape] {
        &self.shapes
    }

    pub fn texts(&self) -> &[FreeText] {
        &self.texts
    }

    pub fn arrows(&self) -> &[FreeArrow] {
        &self.arrows
    }

    pub fn lines(&self) -> &[FreeLine] {
        &self.lines
    }
}

/// Shapes are nodes addressed by their handle keys, arrows are edges
impl Database for FreeformDatabase {
    type Node = FreeShape;
    type Edge = FreeArrow;

    fn add_node(&mut self, node: FreeShape) -> Result<()> {
        self.add_shape(node);
        Ok(())
    }

    fn add_edge(&mut self, edge: FreeArrow) -> Result<()> {
        self.add_arrow(edge);
        Ok(())
    }

    fn get_node(&self, id: &str) -> Option<&FreeShape> {
        let index = id.strip_prefix("shape")?.parse::<usize>().ok()?;
        self.shapes.get(index)
    }

    fn nodes(&self) -> impl Iterator<Item = &FreeShape> {
        self.shapes.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &FreeArrow> {
        self.arrows.iter()
    }

    fn clear(&mut self) {
        self.shapes.clear();
        self.texts.clear();
        self.arrows.clear();
        self.lines.clear();
    }

    fn node_count(&self) -> usize {
        self.shapes.len()
    }

    fn edge_count(&self) -> usize {
        self.arrows.len()
    }
}
