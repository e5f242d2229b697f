//! Scene element records
//!
//! The drawable primitives of a scene document and their on-disk shape.
//! Field names follow the whiteboard JSON format (camelCase); the element
//! `type` tag selects the kind-specific fields.

use serde::{Deserialize, Deserializer, Serialize};

use super::{Arrowhead, FillStyle, Point, Rect, ShapeKind, StrokeStyle};

/// One record in the `elements` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    #[serde(flatten)]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub angle: f64,
    pub stroke_color: String,
    pub background_color: String,
    #[serde(default)]
    pub fill_style: FillStyle,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default)]
    pub stroke_style: StrokeStyle,
    #[serde(default)]
    pub roughness: u8,
    #[serde(default = "default_opacity")]
    pub opacity: u8,
    #[serde(default)]
    pub group_ids: Vec<String>,
    #[serde(default)]
    pub frame_id: Option<String>,
    #[serde(default)]
    pub roundness: Option<Roundness>,
    #[serde(default)]
    pub seed: u32,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub version_nonce: u32,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bound_elements: Vec<BoundElement>,
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub locked: bool,
}

fn default_stroke_width() -> f64 {
    2.0
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<BoundElement>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<BoundElement>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn default_opacity() -> u8 {
    100
}

fn default_version() -> u32 {
    1
}

/// Kind-specific element data, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Ellipse,
    Diamond,
    Text(TextData),
    Arrow(LinearData),
    Line(LinearData),
}

impl ElementKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Rectangle => "rectangle",
            ElementKind::Ellipse => "ellipse",
            ElementKind::Diamond => "diamond",
            ElementKind::Text(_) => "text",
            ElementKind::Arrow(_) => "arrow",
            ElementKind::Line(_) => "line",
        }
    }
}

impl From<ShapeKind> for ElementKind {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Rectangle => ElementKind::Rectangle,
            ShapeKind::Ellipse => ElementKind::Ellipse,
            ShapeKind::Diamond => ElementKind::Diamond,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextData {
    pub text: String,
    pub font_size: f64,
    pub font_family: u8,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
    #[serde(default)]
    pub container_id: Option<String>,
    #[serde(default)]
    pub original_text: String,
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    #[serde(default = "default_auto_resize")]
    pub auto_resize: bool,
}

fn default_line_height() -> f64 {
    super::text::LINE_HEIGHT
}

fn default_auto_resize() -> bool {
    true
}

/// Points and bindings of an arrow or line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearData {
    /// Offsets relative to the element's `(x, y)`; the first is `[0, 0]`
    pub points: Vec<[f64; 2]>,
    #[serde(default)]
    pub start_binding: Option<Binding>,
    #[serde(default)]
    pub end_binding: Option<Binding>,
    #[serde(default)]
    pub start_arrowhead: Option<Arrowhead>,
    #[serde(default)]
    pub end_arrowhead: Option<Arrowhead>,
    #[serde(default)]
    pub last_committed_point: Option<[f64; 2]>,
    #[serde(default)]
    pub elbowed: bool,
}

/// A connector endpoint attached to a shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub element_id: String,
    pub focus: f64,
    pub gap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundKind {
    Text,
    Arrow,
}

/// Back-reference from a shape to text or connectors attached to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BoundKind,
}

/// Corner rounding; type 3 is adaptive radius
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roundness {
    #[serde(rename = "type")]
    pub kind: u8,
}

impl Roundness {
    pub const ADAPTIVE: Roundness = Roundness { kind: 3 };
    pub const PROPORTIONAL: Roundness = Roundness { kind: 2 };
}

impl Element {
    /// A record with neutral styling; the emitter fills in the rest
    pub fn new(id: impl Into<String>, kind: ElementKind, rect: Rect) -> Self {
        Self {
            id: id.into(),
            kind,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            angle: 0.0,
            stroke_color: "#1e1e1e".to_string(),
            background_color: "transparent".to_string(),
            fill_style: FillStyle::Solid,
            stroke_width: default_stroke_width(),
            stroke_style: StrokeStyle::Solid,
            roughness: 1,
            opacity: default_opacity(),
            group_ids: Vec::new(),
            frame_id: None,
            roundness: None,
            seed: 0,
            version: default_version(),
            version_nonce: 0,
            is_deleted: false,
            bound_elements: Vec::new(),
            updated: 1,
            link: None,
            locked: false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// The outline kind, for rectangle/ellipse/diamond records
    pub fn shape_kind(&self) -> Option<ShapeKind> {
        match self.kind {
            ElementKind::Rectangle => Some(ShapeKind::Rectangle),
            ElementKind::Ellipse => Some(ShapeKind::Ellipse),
            ElementKind::Diamond => Some(ShapeKind::Diamond),
            _ => None,
        }
    }

    pub fn is_shape(&self) -> bool {
        self.shape_kind().is_some()
    }

    pub fn text(&self) -> Option<&TextData> {
        match &self.kind {
            ElementKind::Text(data) => Some(data),
            _ => None,
        }
    }

    pub fn linear(&self) -> Option<&LinearData> {
        match &self.kind {
            ElementKind::Arrow(data) | ElementKind::Line(data) => Some(data),
            _ => None,
        }
    }

    pub fn linear_mut(&mut self) -> Option<&mut LinearData> {
        match &mut self.kind {
            ElementKind::Arrow(data) | ElementKind::Line(data) => Some(data),
            _ => None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Absolute path of an arrow or line, empty for other kinds
    pub fn absolute_points(&self) -> Vec<Point> {
        self.linear()
            .map(|data| {
                data.points
                    .iter()
                    .map(|[dx, dy]| Point::new(self.x + dx, self.y + dy))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn add_bound(&mut self, id: impl Into<String>, kind: BoundKind) {
        let id = id.into();
        if !self.bound_elements.iter().any(|b| b.id == id) {
            self.bound_elements.push(BoundElement { id, kind });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape_serializes_with_type_tag() {
        let mut element = Element::new(
            "abc",
            ElementKind::Rectangle,
            Rect::new(1.0, 2.0, 30.0, 40.0),
        );
        element.roundness = Some(Roundness::ADAPTIVE);
        let value = serde_json::to_value(&element).unwrap();
        assert_eq!(value["type"], "rectangle");
        assert_eq!(value["id"], "abc");
        assert_eq!(value["strokeColor"], "#1e1e1e");
        assert_eq!(value["roundness"], json!({"type": 3}));
        assert_eq!(value["boundElements"], json!([]));
        assert_eq!(value["isDeleted"], false);
    }

    #[test]
    fn test_text_fields_are_camel_case() {
        let element = Element::new(
            "t1",
            ElementKind::Text(TextData {
                text: "hi".into(),
                font_size: 20.0,
                font_family: 1,
                text_align: TextAlign::Center,
                vertical_align: VerticalAlign::Middle,
                container_id: Some("box".into()),
                original_text: "hi".into(),
                line_height: 1.25,
                auto_resize: true,
            }),
            Rect::new(0.0, 0.0, 24.0, 25.0),
        );
        let value = serde_json::to_value(&element).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["containerId"], "box");
        assert_eq!(value["fontFamily"], 1);
        assert_eq!(value["verticalAlign"], "middle");
        assert_eq!(value["textAlign"], "center");
    }

    #[test]
    fn test_arrow_parses_back() {
        let raw = json!({
            "id": "a1",
            "type": "arrow",
            "x": 10.0, "y": 20.0, "width": 100.0, "height": 0.0,
            "strokeColor": "#1e1e1e",
            "backgroundColor": "transparent",
            "points": [[0.0, 0.0], [100.0, 0.0]],
            "startBinding": {"elementId": "s", "focus": 0.0, "gap": 4.0},
            "endBinding": null,
            "endArrowhead": "arrow"
        });
        let element: Element = serde_json::from_value(raw).unwrap();
        let linear = element.linear().unwrap();
        assert_eq!(linear.start_binding.as_ref().unwrap().element_id, "s");
        assert_eq!(linear.end_arrowhead, Some(Arrowhead::Arrow));
        assert_eq!(
            element.absolute_points(),
            vec![Point::new(10.0, 20.0), Point::new(110.0, 20.0)]
        );
    }

    #[test]
    fn test_add_bound_skips_duplicates() {
        let mut element = Element::new("s", ElementKind::Ellipse, Rect::new(0.0, 0.0, 10.0, 10.0));
        element.add_bound("a", BoundKind::Arrow);
        element.add_bound("a", BoundKind::Arrow);
        element.add_bound("t", BoundKind::Text);
        assert_eq!(element.bound_elements.len(), 2);
        assert_eq!(element.shape_kind(), Some(ShapeKind::Ellipse));
    }
}
