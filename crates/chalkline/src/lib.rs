//! Chalkline - Build hand-drawn style diagrams as Excalidraw scenes
//!
//! Builders for flowcharts, architecture, sequence, mind map, timeline,
//! entity-relationship and freeform diagrams. Each builder holds pure data;
//! a layout algorithm turns it into positioned shapes and the scene emitter
//! writes an Excalidraw document.
//!
//! # Quick Start
//!
//! ```rust
//! use chalkline::prelude::*;
//!
//! let mut chart = Flowchart::new();
//! chart.start("Start").process("work", "Do the work").end("Done");
//! chart.connect("__start__", "work");
//! chart.connect("work", "__end__");
//!
//! let document = chart.to_document(&SceneConfig::default()).unwrap();
//! assert_eq!(document.shapes().count(), 3);
//! ```
//!
//! # From Text
//!
//! ```rust
//! use chalkline::prelude::*;
//!
//! let result = chalkline::classify("2008: founded, 2012: IPO, 2020: acquired");
//! assert_eq!(result.diagram_type, DiagramKind::Timeline);
//!
//! let analysis = Analysis::from_text("Research, then design, then build", None);
//! let generated = generate(&analysis);
//! assert!(generated.diagram.layout().is_ok());
//! ```

pub mod core;
pub mod export;
pub mod plugins;

pub use core::{DiagramError, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Classification, Color, ColorName, Database, Detector, Diagram, DiagramError, DiagramKind,
        Direction, Layout, LayoutAlgorithm, Point, Rect, SceneConfig, SceneDocument, ShapeKind,
        StrokeStyle,
    };
    pub use crate::export::{Delivery, DeliveryReport, DeliveryRequest, Rasterizer};
    pub use crate::plugins::{
        generate, Analysis, ArchitectureDiagram, Connection, ErDiagram, Flowchart,
        FreeformDiagram, Generated, ItemId, MessageId, MindMap, MindMapStyle, NoteSide, Router,
        SequenceDiagram, ShapeHandle, TimelineDiagram, TopicId,
    };
}

/// Classify free text into a diagram type
///
/// # Example
/// ```rust
/// use chalkline::core::DiagramKind;
///
/// let result = chalkline::classify("Client sends request to Server, Server responds");
/// assert_eq!(result.diagram_type, DiagramKind::Sequence);
/// ```
pub fn classify(text: &str) -> core::Classification {
    plugins::router::classify(text)
}

/// Generate a diagram from text and save it to `path`
///
/// `diagram_type` forces a type; otherwise the text is classified.
pub fn generate_to_file(
    text: &str,
    diagram_type: Option<core::DiagramKind>,
    path: &std::path::Path,
) -> Result<(plugins::Analysis, std::path::PathBuf)> {
    let analysis = plugins::Analysis::from_text(text, diagram_type);
    let generated = plugins::generate(&analysis);
    let written = generated.diagram.save(path)?;
    Ok((analysis, written))
}
