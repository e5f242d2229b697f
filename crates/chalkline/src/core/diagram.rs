//! Core diagram trait for all builders
//!
//! A builder accumulates pure data; coordinates exist only inside the
//! [`Layout`] produced on demand. Saving borrows the builder, so saving it
//! twice yields the same document.

use std::path::{Path, PathBuf};
use tracing::{info, span, Level};

use super::document::SceneDocument;
use super::layout::Layout;
use super::scene::SceneConfig;
use super::{DiagramKind, Result};

/// Core trait for diagram builders
///
/// # Example
/// ```
/// use chalkline::prelude::*;
///
/// let mut chart = Flowchart::new();
/// chart.start("Start");
/// chart.end("End");
/// chart.connect("__start__", "__end__");
/// let document = chart.to_document(&SceneConfig::default()).unwrap();
/// assert_eq!(document.shapes().count(), 2);
/// ```
pub trait Diagram {
    /// The kind of diagram this builder produces
    fn kind(&self) -> DiagramKind;

    /// Run the builder's layout algorithm
    fn layout(&self) -> Result<Layout>;

    /// Lay out, emit and validate a scene document
    fn to_document(&self, config: &SceneConfig) -> Result<SceneDocument> {
        let layout = self.layout()?;
        SceneDocument::from_layout(&layout, config)
    }

    /// Save with the default scene configuration
    fn save(&self, path: &Path) -> Result<PathBuf> {
        self.save_with(path, &SceneConfig::default())
    }

    /// Save with an explicit scene configuration
    fn save_with(&self, path: &Path, config: &SceneConfig) -> Result<PathBuf> {
        let save_span = span!(Level::INFO, "save_diagram", kind = %self.kind(), path = %path.display());
        let _enter = save_span.enter();

        let document = self.to_document(config)?;
        let written = document.write_to(path)?;
        info!(elements = document.elements.len(), "Diagram saved");
        Ok(written)
    }
}
