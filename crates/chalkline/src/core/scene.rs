//! Scene emission: [`Layout`] to element records
//!
//! The emitter assigns element ids and seeds from a seeded RNG, resolves
//! styles and wires bindings in both directions: a bound connector
//! references its shapes, and each shape lists the connector in
//! `boundElements`.

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashMap;
use tracing::{debug, span, trace, Level};

use super::element::{
    Binding, BoundKind, Element, ElementKind, LinearData, Roundness, TextAlign, TextData,
    VerticalAlign,
};
use super::geometry::{self, DEFAULT_GAP};
use super::layout::{ConnectorKind, LabelPlacement, Layout, LayoutConnector, LayoutShape, LayoutText};
use super::text::{measure, LINE_HEIGHT};
use super::{DiagramError, Point, Rect, Result, StyleSheet};

/// Default RNG seed; fixed so identical input gives identical documents
pub const DEFAULT_SEED: u64 = 0x00C0_FFEE;

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const ID_LEN: usize = 20;

/// Space between the content and a diagram title
const TITLE_MARGIN: f64 = 40.0;

/// Scene-wide emission settings
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub seed: u64,
    pub style: StyleSheet,
    /// `appState.viewBackgroundColor`
    pub background: String,
    /// Document `source` field
    pub source: String,
    /// Binding gap between a connector end and its shape
    pub gap: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            style: StyleSheet::default(),
            background: "#ffffff".to_string(),
            source: "chalkline".to_string(),
            gap: DEFAULT_GAP,
        }
    }
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_style(mut self, style: StyleSheet) -> Self {
        self.style = style;
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }
}

/// Converts one [`Layout`] into element records
pub struct SceneEmitter<'a> {
    config: &'a SceneConfig,
    rng: StdRng,
    elements: Vec<Element>,
    /// Shape key -> index into `elements`
    shapes: HashMap<String, usize>,
    /// Logical group name -> group id
    groups: HashMap<String, String>,
}

impl<'a> SceneEmitter<'a> {
    pub fn new(config: &'a SceneConfig) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(config.seed),
            elements: Vec::new(),
            shapes: HashMap::new(),
            groups: HashMap::new(),
        }
    }

    /// Emit every part of the layout, shapes first
    pub fn emit(mut self, layout: &Layout) -> Result<Vec<Element>> {
        let emit_span = span!(
            Level::INFO,
            "emit_scene",
            kind = %layout.kind,
            shape_count = layout.shapes.len(),
            connector_count = layout.connectors.len(),
            text_count = layout.texts.len()
        );
        let _enter = emit_span.enter();

        for (index, shape) in layout.shapes.iter().enumerate() {
            self.emit_shape(shape, index)?;
        }
        debug!(shapes = self.shapes.len(), "Emitted shapes");

        for connector in &layout.connectors {
            self.emit_connector(connector)?;
        }

        for text in &layout.texts {
            self.emit_text(text)?;
        }

        if let Some(title) = &layout.title {
            self.emit_title(title, layout.bounds())?;
        }

        debug!(element_count = self.elements.len(), "Scene emission completed");
        Ok(self.elements)
    }

    fn next_id(&mut self) -> String {
        (0..ID_LEN)
            .map(|_| {
                let idx = self.rng.random_range(0..ID_ALPHABET.len());
                ID_ALPHABET[idx] as char
            })
            .collect()
    }

    fn next_seed(&mut self) -> u32 {
        self.rng.random_range(1..i32::MAX as u32)
    }

    /// A record with fresh id, seed and nonce plus style-sheet defaults
    fn base(&mut self, kind: ElementKind, rect: Rect) -> Element {
        let id = self.next_id();
        let mut element = Element::new(id, kind, rect);
        element.seed = self.next_seed();
        element.version_nonce = self.next_seed();
        element.roughness = self.config.style.roughness.value();
        element.stroke_width = self.config.style.stroke_width;
        element.fill_style = self.config.style.fill_style;
        element.stroke_color = self.config.style.ink.clone();
        element
    }

    fn group_ids(&mut self, names: &[String]) -> Vec<String> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let id = match self.groups.get(name) {
                Some(id) => id.clone(),
                None => {
                    let id = self.next_id();
                    self.groups.insert(name.clone(), id.clone());
                    id
                }
            };
            ids.push(id);
        }
        ids
    }

    fn text_element(
        &mut self,
        text: &str,
        rect: Rect,
        font_size: f64,
        align: TextAlign,
        container_id: Option<String>,
    ) -> Element {
        let data = TextData {
            text: text.to_string(),
            font_size,
            font_family: self.config.style.font_family.code(),
            text_align: align,
            vertical_align: if container_id.is_some() {
                VerticalAlign::Middle
            } else {
                VerticalAlign::Top
            },
            container_id,
            original_text: text.to_string(),
            line_height: LINE_HEIGHT,
            auto_resize: true,
        };
        let mut element = self.base(ElementKind::Text(data), rect);
        element.roughness = 0;
        element
    }

    fn emit_shape(&mut self, shape: &LayoutShape, index: usize) -> Result<()> {
        geometry::ensure_valid(&shape.rect, &shape.key)?;
        if self.shapes.contains_key(&shape.key) {
            return Err(DiagramError::invalid_geometry(
                shape.key.clone(),
                "shape key declared twice in one layout",
            ));
        }

        let color = self
            .config
            .style
            .resolve(shape.style.color.as_ref(), index);
        let mut element = self.base(shape.kind.into(), shape.rect);
        element.stroke_color = color.stroke;
        element.background_color = if shape.style.transparent {
            "transparent".to_string()
        } else {
            color.background
        };
        element.stroke_style = shape.style.stroke_style;
        if shape.style.rounded {
            element.roundness = Some(Roundness::ADAPTIVE);
        }
        element.group_ids = self.group_ids(&shape.groups);
        trace!(key = %shape.key, id = %element.id, kind = %shape.kind, "Emitting shape");

        let label = match &shape.label {
            Some(label) => {
                let font_size = shape.style.font_size.unwrap_or(self.config.style.font_size);
                let metrics = measure(label, font_size);
                let rect = Rect::centered(shape.rect.center(), metrics.width, metrics.height);
                let mut text = self.text_element(
                    label,
                    rect,
                    font_size,
                    shape.style.text_align,
                    Some(element.id.clone()),
                );
                if let Some(family) = shape.style.font_family {
                    if let ElementKind::Text(data) = &mut text.kind {
                        data.font_family = family.code();
                    }
                }
                text.group_ids = element.group_ids.clone();
                element.add_bound(text.id.clone(), BoundKind::Text);
                Some(text)
            }
            None => None,
        };

        self.shapes.insert(shape.key.clone(), self.elements.len());
        self.elements.push(element);
        if let Some(text) = label {
            self.elements.push(text);
        }
        Ok(())
    }

    fn resolve_endpoint(&self, key: &Option<String>, connector: &str) -> Result<Option<usize>> {
        match key {
            None => Ok(None),
            Some(key) => self.shapes.get(key).copied().map(Some).ok_or_else(|| {
                DiagramError::dangling("shape", key.clone(), format!("connector '{}'", connector))
            }),
        }
    }

    fn emit_connector(&mut self, connector: &LayoutConnector) -> Result<()> {
        if connector.points.len() < 2 {
            return Err(DiagramError::invalid_geometry(
                connector.key.clone(),
                "a connector needs at least two points",
            ));
        }
        if connector
            .points
            .iter()
            .any(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(DiagramError::invalid_geometry(
                connector.key.clone(),
                "connector point is not finite",
            ));
        }

        let from = self.resolve_endpoint(&connector.from, &connector.key)?;
        let to = self.resolve_endpoint(&connector.to, &connector.key)?;

        let origin = connector.points[0];
        let (min_x, min_y, max_x, max_y) = connector
            .extent()
            .unwrap_or((origin.x, origin.y, origin.x, origin.y));
        let points: Vec<[f64; 2]> = connector
            .points
            .iter()
            .map(|p| [p.x - origin.x, p.y - origin.y])
            .collect();

        let binding = |index: Option<usize>, elements: &[Element], gap: f64| {
            index.map(|i| Binding {
                element_id: elements[i].id.clone(),
                focus: 0.0,
                gap,
            })
        };
        let data = LinearData {
            points,
            start_binding: binding(from, &self.elements, self.config.gap),
            end_binding: binding(to, &self.elements, self.config.gap),
            start_arrowhead: connector.start_arrowhead,
            end_arrowhead: connector.end_arrowhead,
            last_committed_point: None,
            elbowed: false,
        };
        let kind = match connector.kind {
            ConnectorKind::Arrow => ElementKind::Arrow(data),
            ConnectorKind::Line => ElementKind::Line(data),
        };

        let mut element = self.base(
            kind,
            Rect::new(origin.x, origin.y, max_x - min_x, max_y - min_y),
        );
        element.stroke_style = connector.stroke_style;
        element.roundness = Some(Roundness::PROPORTIONAL);
        if let Some(color) = &connector.color {
            element.stroke_color = self.config.style.scheme.resolve(color).stroke;
        }

        let mut groups = connector.groups.clone();
        if let Some(label) = &connector.label {
            if let LabelPlacement::Offset(_) = label.placement {
                groups.push(format!("label:{}", connector.key));
            }
        }
        element.group_ids = self.group_ids(&groups);

        for index in [from, to].into_iter().flatten() {
            let id = element.id.clone();
            self.elements[index].add_bound(id, BoundKind::Arrow);
        }
        trace!(
            key = %connector.key,
            id = %element.id,
            points = connector.points.len(),
            "Emitting connector"
        );

        let label = match &connector.label {
            Some(label) => Some(self.connector_label(
                &element,
                &label.text,
                label.placement,
                &connector.points,
            )?),
            None => None,
        };

        if let Some(text) = &label {
            if text.text().and_then(|t| t.container_id.as_ref()).is_some() {
                element.add_bound(text.id.clone(), BoundKind::Text);
            }
        }
        self.elements.push(element);
        if let Some(text) = label {
            self.elements.push(text);
        }
        Ok(())
    }

    fn connector_label(
        &mut self,
        connector: &Element,
        text: &str,
        placement: LabelPlacement,
        points: &[Point],
    ) -> Result<Element> {
        let font_size = self.config.style.label_font_size;
        let metrics = measure(text, font_size);
        let (mid, dir) = geometry::path_midpoint(points).ok_or_else(|| {
            DiagramError::invalid_geometry(connector.id.clone(), "connector has no midpoint")
        })?;

        let element = match placement {
            LabelPlacement::Bound => {
                let rect = Rect::centered(mid, metrics.width, metrics.height);
                self.text_element(text, rect, font_size, TextAlign::Center, Some(connector.id.clone()))
            }
            LabelPlacement::Offset(distance) => {
                // Perpendicular to the midpoint segment, clear of the text box
                let normal = (-dir.1, dir.0);
                let clearance = distance + (metrics.width * normal.0.abs() + metrics.height * normal.1.abs()) / 2.0;
                let center = mid.offset(normal.0 * clearance, normal.1 * clearance);
                let rect = Rect::centered(center, metrics.width, metrics.height);
                let mut label = self.text_element(text, rect, font_size, TextAlign::Center, None);
                label.group_ids = connector.group_ids.clone();
                label
            }
        };
        Ok(element)
    }

    fn emit_text(&mut self, text: &LayoutText) -> Result<()> {
        let font_size = text.font_size.unwrap_or(self.config.style.label_font_size);
        let metrics = measure(&text.text, font_size);
        let rect = Rect::new(text.position.x, text.position.y, metrics.width, metrics.height);
        if !rect.is_valid() {
            return Err(DiagramError::invalid_geometry(
                text.key.clone(),
                "text position is not finite",
            ));
        }
        let mut element = self.text_element(&text.text, rect, font_size, text.align, None);
        if let Some(color) = &text.color {
            element.stroke_color = self.config.style.scheme.resolve(color).stroke;
        }
        element.group_ids = self.group_ids(&text.groups);
        self.elements.push(element);
        Ok(())
    }

    fn emit_title(&mut self, title: &str, bounds: Option<Rect>) -> Result<()> {
        let font_size = self.config.style.title_font_size;
        let metrics = measure(title, font_size);
        let (center_x, top) = match bounds {
            Some(bounds) => (bounds.center().x, bounds.y - TITLE_MARGIN - metrics.height),
            None => (metrics.width / 2.0, 0.0),
        };
        let rect = Rect::new(center_x - metrics.width / 2.0, top, metrics.width, metrics.height);
        let element = self.text_element(title, rect, font_size, TextAlign::Center, None);
        trace!(id = %element.id, "Emitting title");
        self.elements.push(element);
        Ok(())
    }
}
