//! Core type definitions for diagram construction
//!
//! Coordinates, boxes, sides, shape kinds, arrowheads, flow direction and
//! the diagram kind enumeration shared by every plugin.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DiagramError;

/// A point in scene coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Translate by a vector
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// An axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a box of the given size centered on a point
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Returns true if both dimensions are positive and finite
    pub fn is_valid(&self) -> bool {
        self.width.is_finite()
            && self.height.is_finite()
            && self.x.is_finite()
            && self.y.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Smallest box enclosing both boxes
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Grow the box by `amount` on every side
    pub fn inflate(&self, amount: f64) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Returns true if the horizontal extents overlap
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right()
    }

    /// Returns true if the vertical extents overlap
    pub fn overlaps_y(&self, other: &Rect) -> bool {
        self.y < other.bottom() && other.y < self.bottom()
    }
}

/// A side of a box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// Outward unit normal of this side
    pub fn normal(&self) -> (f64, f64) {
        match self {
            Side::Top => (0.0, -1.0),
            Side::Bottom => (0.0, 1.0),
            Side::Left => (-1.0, 0.0),
            Side::Right => (1.0, 0.0),
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

/// Outline of a shape element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
    Diamond,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Rectangle => write!(f, "rectangle"),
            ShapeKind::Ellipse => write!(f, "ellipse"),
            ShapeKind::Diamond => write!(f, "diamond"),
        }
    }
}

/// Arrowhead drawn at a connector endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrowhead {
    Arrow,
    Triangle,
    Bar,
    Dot,
}

/// Flow direction for ranked layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Direction {
    /// Ranks become rows, top to bottom
    #[default]
    Vertical,
    /// Ranks become columns, left to right
    Horizontal,
}

impl Direction {
    pub fn is_vertical(&self) -> bool {
        matches!(self, Direction::Vertical)
    }
}

impl FromStr for Direction {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vertical" | "td" | "tb" => Ok(Direction::Vertical),
            "horizontal" | "lr" => Ok(Direction::Horizontal),
            _ => Err(DiagramError::style(format!("Unknown direction: {}", s))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Vertical => write!(f, "vertical"),
            Direction::Horizontal => write!(f, "horizontal"),
        }
    }
}

/// The diagram kinds chalkline can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    Flowchart,
    Architecture,
    Sequence,
    #[serde(rename = "mindmap")]
    MindMap,
    Timeline,
    Er,
    /// The generic box-and-arrow diagram
    #[serde(rename = "simple", alias = "freeform")]
    Freeform,
}

impl DiagramKind {
    /// All kinds in classifier priority order
    pub fn all() -> &'static [DiagramKind] {
        &[
            DiagramKind::Flowchart,
            DiagramKind::Architecture,
            DiagramKind::Sequence,
            DiagramKind::MindMap,
            DiagramKind::Timeline,
            DiagramKind::Er,
            DiagramKind::Freeform,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramKind::Flowchart => "flowchart",
            DiagramKind::Architecture => "architecture",
            DiagramKind::Sequence => "sequence",
            DiagramKind::MindMap => "mindmap",
            DiagramKind::Timeline => "timeline",
            DiagramKind::Er => "er",
            DiagramKind::Freeform => "simple",
        }
    }

    /// One-line description used by `chalkline types`
    pub fn description(&self) -> &'static str {
        match self {
            DiagramKind::Flowchart => "Steps and decisions with automatic ranked layout",
            DiagramKind::Architecture => "Components, services and protocol links",
            DiagramKind::Sequence => "Messages between participants over time",
            DiagramKind::MindMap => "Central concept with nested branches",
            DiagramKind::Timeline => "Events, milestones and periods along an axis",
            DiagramKind::Er => "Entities with attributes and relationships",
            DiagramKind::Freeform => "Boxes and arrows placed by hand",
        }
    }
}

impl FromStr for DiagramKind {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flowchart" => Ok(DiagramKind::Flowchart),
            "architecture" => Ok(DiagramKind::Architecture),
            "sequence" => Ok(DiagramKind::Sequence),
            "mindmap" | "mind-map" => Ok(DiagramKind::MindMap),
            "timeline" => Ok(DiagramKind::Timeline),
            "er" | "entity-relationship" => Ok(DiagramKind::Er),
            "simple" | "freeform" => Ok(DiagramKind::Freeform),
            _ => Err(DiagramError::UnknownDiagramType {
                diagram_type: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_geometry() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.center(), Point::new(60.0, 45.0));
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
        assert!(rect.is_valid());
        assert!(!Rect::new(0.0, 0.0, 0.0, 10.0).is_valid());
        assert!(!Rect::new(0.0, 0.0, 10.0, -1.0).is_valid());
        assert!(!Rect::new(0.0, 0.0, f64::NAN, 10.0).is_valid());
    }

    #[test]
    fn test_rect_union_and_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 20.0, 10.0, 10.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 15.0, 30.0));
        assert!(a.overlaps_x(&b));
        assert!(!a.overlaps_y(&b));
    }

    #[test]
    fn test_side_properties() {
        assert_eq!(Side::Top.opposite(), Side::Bottom);
        assert_eq!(Side::Left.normal(), (-1.0, 0.0));
        assert!(Side::Bottom.is_vertical());
        assert!(!Side::Right.is_vertical());
    }

    #[test]
    fn test_diagram_kind_parsing() {
        assert_eq!("flowchart".parse::<DiagramKind>().unwrap(), DiagramKind::Flowchart);
        assert_eq!("MindMap".parse::<DiagramKind>().unwrap(), DiagramKind::MindMap);
        assert_eq!("simple".parse::<DiagramKind>().unwrap(), DiagramKind::Freeform);
        assert_eq!("freeform".parse::<DiagramKind>().unwrap(), DiagramKind::Freeform);
        assert!("gantt".parse::<DiagramKind>().is_err());
    }

    #[test]
    fn test_diagram_kind_display_roundtrip() {
        for kind in DiagramKind::all() {
            assert_eq!(kind.to_string().parse::<DiagramKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("TD".parse::<Direction>().unwrap(), Direction::Vertical);
        assert_eq!("horizontal".parse::<Direction>().unwrap(), Direction::Horizontal);
        assert!("diagonal".parse::<Direction>().is_err());
    }
}
