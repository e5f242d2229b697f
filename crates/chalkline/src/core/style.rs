//! Symbolic styles and their concrete attribute tables
//!
//! Every lookup is a `match` over a closed enum, so each table is total.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{DiagramError, Result};

/// Named colors available to every builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorName {
    Blue,
    Green,
    Orange,
    Red,
    Purple,
    Cyan,
    Yellow,
    Gray,
    Black,
    Pink,
}

impl ColorName {
    pub fn all() -> &'static [ColorName] {
        &[
            ColorName::Blue,
            ColorName::Green,
            ColorName::Orange,
            ColorName::Red,
            ColorName::Purple,
            ColorName::Cyan,
            ColorName::Yellow,
            ColorName::Gray,
            ColorName::Black,
            ColorName::Pink,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorName::Blue => "blue",
            ColorName::Green => "green",
            ColorName::Orange => "orange",
            ColorName::Red => "red",
            ColorName::Purple => "purple",
            ColorName::Cyan => "cyan",
            ColorName::Yellow => "yellow",
            ColorName::Gray => "gray",
            ColorName::Black => "black",
            ColorName::Pink => "pink",
        }
    }

    /// `(stroke, background)` in the default scheme
    pub fn palette(&self) -> (&'static str, &'static str) {
        match self {
            ColorName::Blue => ("#1971c2", "#a5d8ff"),
            ColorName::Green => ("#2f9e44", "#b2f2bb"),
            ColorName::Orange => ("#e8590c", "#ffd8a8"),
            ColorName::Red => ("#e03131", "#ffc9c9"),
            ColorName::Purple => ("#6741d9", "#d0bfff"),
            ColorName::Cyan => ("#0c8599", "#99e9f2"),
            ColorName::Yellow => ("#f08c00", "#ffec99"),
            ColorName::Gray => ("#495057", "#e9ecef"),
            ColorName::Black => ("#1e1e1e", "#ced4da"),
            ColorName::Pink => ("#c2255c", "#fcc2d7"),
        }
    }

    fn pastel_background(&self) -> &'static str {
        match self {
            ColorName::Blue => "#e7f5ff",
            ColorName::Green => "#ebfbee",
            ColorName::Orange => "#fff4e6",
            ColorName::Red => "#fff5f5",
            ColorName::Purple => "#f3f0ff",
            ColorName::Cyan => "#e3fafc",
            ColorName::Yellow => "#fff9db",
            ColorName::Gray => "#f8f9fa",
            ColorName::Black => "#f1f3f5",
            ColorName::Pink => "#fff0f6",
        }
    }

    fn vivid_background(&self) -> &'static str {
        match self {
            ColorName::Blue => "#4dabf7",
            ColorName::Green => "#69db7c",
            ColorName::Orange => "#ffa94d",
            ColorName::Red => "#ff8787",
            ColorName::Purple => "#9775fa",
            ColorName::Cyan => "#3bc9db",
            ColorName::Yellow => "#ffd43b",
            ColorName::Gray => "#adb5bd",
            ColorName::Black => "#868e96",
            ColorName::Pink => "#f783ac",
        }
    }
}

impl FromStr for ColorName {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "blue" => Ok(ColorName::Blue),
            "green" => Ok(ColorName::Green),
            "orange" => Ok(ColorName::Orange),
            "red" => Ok(ColorName::Red),
            "purple" | "violet" => Ok(ColorName::Purple),
            "cyan" | "teal" => Ok(ColorName::Cyan),
            "yellow" => Ok(ColorName::Yellow),
            "gray" | "grey" => Ok(ColorName::Gray),
            "black" => Ok(ColorName::Black),
            "pink" => Ok(ColorName::Pink),
            _ => Err(DiagramError::style(format!("Unknown color name: {}", s))),
        }
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named color or a raw `#rrggbb` value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Color {
    Named(ColorName),
    Custom(String),
}

impl Color {
    /// Parse a color name or `#rrggbb`
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl From<ColorName> for Color {
    fn from(name: ColorName) -> Self {
        Color::Named(name)
    }
}

impl FromStr for Color {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Ok(Color::Custom(format!("#{}", hex.to_lowercase())));
            }
            return Err(DiagramError::style(format!(
                "Custom colors must be #rrggbb, got {}",
                s
            )));
        }
        trimmed.parse::<ColorName>().map(Color::Named)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Named(name) => write!(f, "{}", name),
            Color::Custom(hex) => f.write_str(hex),
        }
    }
}

/// Concrete stroke and fill colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColor {
    pub stroke: String,
    pub background: String,
}

/// Palette family applied to every named color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Default,
    Pastel,
    Monochrome,
    Vivid,
}

impl ColorScheme {
    /// Colors handed out in order to items without an explicit color
    pub fn cycle(&self) -> &'static [ColorName] {
        match self {
            ColorScheme::Default | ColorScheme::Vivid => &[
                ColorName::Blue,
                ColorName::Green,
                ColorName::Orange,
                ColorName::Red,
                ColorName::Purple,
                ColorName::Cyan,
                ColorName::Yellow,
            ],
            ColorScheme::Pastel => &[
                ColorName::Blue,
                ColorName::Pink,
                ColorName::Green,
                ColorName::Yellow,
                ColorName::Purple,
                ColorName::Cyan,
            ],
            ColorScheme::Monochrome => &[ColorName::Black, ColorName::Gray],
        }
    }

    /// The n-th color of the cycle
    pub fn cycled(&self, index: usize) -> ColorName {
        let cycle = self.cycle();
        cycle[index % cycle.len()]
    }

    pub fn resolve(&self, color: &Color) -> ResolvedColor {
        match (self, color) {
            (ColorScheme::Monochrome, Color::Named(ColorName::Gray)) => ResolvedColor {
                stroke: "#495057".to_string(),
                background: "#f1f3f5".to_string(),
            },
            (ColorScheme::Monochrome, _) => ResolvedColor {
                stroke: "#1e1e1e".to_string(),
                background: "#ffffff".to_string(),
            },
            (_, Color::Custom(hex)) => ResolvedColor {
                stroke: hex.clone(),
                background: hex.clone(),
            },
            (ColorScheme::Default, Color::Named(name)) => {
                let (stroke, background) = name.palette();
                ResolvedColor {
                    stroke: stroke.to_string(),
                    background: background.to_string(),
                }
            }
            (ColorScheme::Pastel, Color::Named(name)) => ResolvedColor {
                stroke: name.palette().0.to_string(),
                background: name.pastel_background().to_string(),
            },
            (ColorScheme::Vivid, Color::Named(name)) => ResolvedColor {
                stroke: name.palette().0.to_string(),
                background: name.vivid_background().to_string(),
            },
        }
    }
}

impl FromStr for ColorScheme {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "default" => Ok(ColorScheme::Default),
            "pastel" => Ok(ColorScheme::Pastel),
            "monochrome" | "mono" => Ok(ColorScheme::Monochrome),
            "vivid" => Ok(ColorScheme::Vivid),
            _ => Err(DiagramError::style(format!("Unknown color scheme: {}", s))),
        }
    }
}

/// Hand-drawn jitter level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Roughness {
    Architect,
    #[default]
    Artist,
    Cartoonist,
}

impl Roughness {
    pub fn value(&self) -> u8 {
        match self {
            Roughness::Architect => 0,
            Roughness::Artist => 1,
            Roughness::Cartoonist => 2,
        }
    }
}

impl FromStr for Roughness {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "architect" | "0" => Ok(Roughness::Architect),
            "artist" | "1" => Ok(Roughness::Artist),
            "cartoonist" | "2" => Ok(Roughness::Cartoonist),
            _ => Err(DiagramError::style(format!("Unknown roughness: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FontFamily {
    #[default]
    HandDrawn,
    Normal,
    Code,
}

impl FontFamily {
    /// Numeric font family id stored on text records
    pub fn code(&self) -> u8 {
        match self {
            FontFamily::HandDrawn => 1,
            FontFamily::Normal => 2,
            FontFamily::Code => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(FontFamily::HandDrawn),
            2 => Some(FontFamily::Normal),
            3 => Some(FontFamily::Code),
            _ => None,
        }
    }
}

impl FromStr for FontFamily {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hand-drawn" | "handdrawn" | "virgil" => Ok(FontFamily::HandDrawn),
            "normal" | "helvetica" => Ok(FontFamily::Normal),
            "code" | "cascadia" | "mono" => Ok(FontFamily::Code),
            _ => Err(DiagramError::style(format!("Unknown font family: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl FromStr for StrokeStyle {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "solid" => Ok(StrokeStyle::Solid),
            "dashed" => Ok(StrokeStyle::Dashed),
            "dotted" => Ok(StrokeStyle::Dotted),
            _ => Err(DiagramError::style(format!("Unknown stroke style: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillStyle {
    #[default]
    Solid,
    Hachure,
    CrossHatch,
}

impl FromStr for FillStyle {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "solid" => Ok(FillStyle::Solid),
            "hachure" => Ok(FillStyle::Hachure),
            "cross-hatch" | "crosshatch" => Ok(FillStyle::CrossHatch),
            _ => Err(DiagramError::style(format!("Unknown fill style: {}", s))),
        }
    }
}

/// Style defaults applied while emitting a scene
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub scheme: ColorScheme,
    pub roughness: Roughness,
    pub font_family: FontFamily,
    pub fill_style: FillStyle,
    pub stroke_width: f64,
    /// Text inside shapes
    pub font_size: f64,
    /// Connector labels and annotations
    pub label_font_size: f64,
    pub title_font_size: f64,
    /// Stroke for connectors and free text
    pub ink: String,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            scheme: ColorScheme::Default,
            roughness: Roughness::Artist,
            font_family: FontFamily::HandDrawn,
            fill_style: FillStyle::Solid,
            stroke_width: 2.0,
            font_size: 20.0,
            label_font_size: 16.0,
            title_font_size: 28.0,
            ink: "#1e1e1e".to_string(),
        }
    }
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scheme(mut self, scheme: ColorScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_roughness(mut self, roughness: Roughness) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_font_family(mut self, font_family: FontFamily) -> Self {
        self.font_family = font_family;
        self
    }

    pub fn with_fill_style(mut self, fill_style: FillStyle) -> Self {
        self.fill_style = fill_style;
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: f64) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Resolve an explicit color, or the n-th scheme color when absent
    pub fn resolve(&self, color: Option<&Color>, index: usize) -> ResolvedColor {
        match color {
            Some(color) => self.scheme.resolve(color),
            None => self.scheme.resolve(&Color::Named(self.scheme.cycled(index))),
        }
    }
}
