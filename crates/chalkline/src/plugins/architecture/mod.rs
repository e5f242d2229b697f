//! Architecture diagram plugin
//!
//! Components at explicit positions, protocol-labelled links and dashed
//! boundaries around groups of components.

use crate::core::{Color, Diagram, DiagramKind, Layout, LayoutAlgorithm, Result, StrokeStyle};

mod database;
mod detector;
mod layout;

pub use database::*;
pub use detector::*;
pub use layout::*;

/// Architecture diagram builder
///
/// # Example
/// ```
/// use chalkline::prelude::*;
///
/// let mut arch = ArchitectureDiagram::new();
/// arch.component("web", "Web", 100.0, 100.0, ColorName::Blue)
///     .component("api", "API", 400.0, 100.0, ColorName::Green)
///     .connect("web", "api", "HTTPS");
/// assert_eq!(arch.layout().unwrap().connectors.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchitectureDiagram {
    database: ArchitectureDatabase,
    config: ArchitectureConfig,
    title: Option<String>,
}

impl ArchitectureDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ArchitectureConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    /// Add a component with its top-left corner at `(x, y)`
    pub fn component(
        &mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        x: f64,
        y: f64,
        color: impl Into<Color>,
    ) -> &mut Self {
        self.database
            .add_component(Component::new(id, label, x, y).with_color(color));
        self
    }

    /// Add a component with an explicit minimum size
    #[allow(clippy::too_many_arguments)]
    pub fn sized_component(
        &mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: impl Into<Color>,
    ) -> &mut Self {
        self.database.add_component(
            Component::new(id, label, x, y)
                .with_color(color)
                .with_size(width, height),
        );
        self
    }

    /// Endpoints are checked when the diagram is laid out
    pub fn connect(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        protocol: impl Into<String>,
    ) -> &mut Self {
        self.database.add_link(Link::new(from, to, protocol));
        self
    }

    pub fn connect_styled(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        protocol: impl Into<String>,
        stroke_style: StrokeStyle,
    ) -> &mut Self {
        self.database
            .add_link(Link::new(from, to, protocol).with_stroke(stroke_style));
        self
    }

    /// Draw a labelled dashed region behind the given components
    pub fn boundary<I, S>(&mut self, label: impl Into<String>, members: I, color: impl Into<Color>) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.database.add_boundary(Boundary {
            label: label.into(),
            members: members.into_iter().map(Into::into).collect(),
            color: Some(color.into()),
        });
        self
    }

    pub fn database(&self) -> &ArchitectureDatabase {
        &self.database
    }
}

impl Diagram for ArchitectureDiagram {
    fn kind(&self) -> DiagramKind {
        DiagramKind::Architecture
    }

    fn layout(&self) -> Result<Layout> {
        let algorithm = ArchitectureLayoutAlgorithm::with_config(self.config.clone());
        Ok(algorithm.layout(&self.database)?.with_title(self.title.clone()))
    }
}
