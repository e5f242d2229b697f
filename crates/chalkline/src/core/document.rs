//! Scene document assembly, validation and persistence
//!
//! A document is written through a temporary file in the destination
//! directory and persisted with an atomic rename, so a failed save never
//! leaves a partial file at the target path.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, span, trace, Level};

use super::element::Element;
use super::layout::Layout;
use super::scene::{SceneConfig, SceneEmitter};
use super::{geometry, DiagramError, Rect, Result};

/// Value of the document `type` field
pub const DOCUMENT_TYPE: &str = "excalidraw";
/// Document format version
pub const DOCUMENT_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub view_background_color: String,
    #[serde(default)]
    pub grid_size: Option<u32>,
}

/// A complete scene document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub version: u32,
    #[serde(default)]
    pub source: String,
    pub elements: Vec<Element>,
    pub app_state: AppState,
    #[serde(default)]
    pub files: serde_json::Map<String, serde_json::Value>,
}

impl SceneDocument {
    pub fn new(elements: Vec<Element>, config: &SceneConfig) -> Self {
        Self {
            doc_type: DOCUMENT_TYPE.to_string(),
            version: DOCUMENT_VERSION,
            source: config.source.clone(),
            elements,
            app_state: AppState {
                view_background_color: config.background.clone(),
                grid_size: None,
            },
            files: serde_json::Map::new(),
        }
    }

    /// Emit a layout and validate the result
    pub fn from_layout(layout: &Layout, config: &SceneConfig) -> Result<Self> {
        let elements = SceneEmitter::new(config).emit(layout)?;
        let document = Self::new(elements, config);
        document.validate()?;
        Ok(document)
    }

    /// Check the structural invariants of the document
    ///
    /// Ids are unique, every binding targets a shape, every `containerId`
    /// targets a shape or connector, every `boundElements` entry exists and
    /// every shape has a positive size.
    pub fn validate(&self) -> Result<()> {
        let mut by_id: HashMap<&str, &Element> = HashMap::new();
        for element in &self.elements {
            if by_id.insert(element.id.as_str(), element).is_some() {
                return Err(DiagramError::DuplicateId {
                    id: element.id.clone(),
                });
            }
        }

        for element in &self.elements {
            if element.is_deleted {
                continue;
            }
            if element.is_shape() {
                geometry::ensure_valid(&element.rect(), &element.id)?;
            }

            if let Some(data) = element.linear() {
                if data.points.len() < 2 {
                    return Err(DiagramError::invalid_geometry(
                        element.id.clone(),
                        "a connector needs at least two points",
                    ));
                }
                for binding in [&data.start_binding, &data.end_binding].into_iter().flatten() {
                    match by_id.get(binding.element_id.as_str()) {
                        Some(target) if target.is_shape() => {}
                        _ => {
                            return Err(DiagramError::dangling(
                                "shape",
                                binding.element_id.clone(),
                                format!("binding of connector '{}'", element.id),
                            ))
                        }
                    }
                }
            }

            if let Some(container) = element.text().and_then(|t| t.container_id.as_ref()) {
                match by_id.get(container.as_str()) {
                    Some(target) if target.is_shape() || target.linear().is_some() => {}
                    _ => {
                        return Err(DiagramError::dangling(
                            "container",
                            container.clone(),
                            format!("text '{}'", element.id),
                        ))
                    }
                }
            }

            for bound in &element.bound_elements {
                if !by_id.contains_key(bound.id.as_str()) {
                    return Err(DiagramError::dangling(
                        "bound element",
                        bound.id.clone(),
                        format!("boundElements of '{}'", element.id),
                    ));
                }
            }
        }

        trace!(element_count = self.elements.len(), "Document validated");
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(input: &str) -> Result<Self> {
        let document: SceneDocument = serde_json::from_str(input)?;
        if document.doc_type != DOCUMENT_TYPE {
            return Err(DiagramError::Serialize {
                source: <serde_json::Error as serde::de::Error>::custom(format!(
                    "expected document type '{}', found '{}'",
                    DOCUMENT_TYPE, document.doc_type
                )),
            });
        }
        Ok(document)
    }

    /// Read a document back from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading scene document");
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Validate and atomically write the document to `path`
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let write_span = span!(
            Level::INFO,
            "write_document",
            path = %path.display(),
            element_count = self.elements.len()
        );
        let _enter = write_span.enter();

        self.validate()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        // Dropping the temp file on any error below removes it
        let mut temp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| DiagramError::from(e.error))?;

        info!(path = %path.display(), "Scene document written");
        Ok(path.to_path_buf())
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.is_shape())
    }

    pub fn texts(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.text().is_some())
    }

    pub fn connectors(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.linear().is_some())
    }

    /// The text bound inside a shape or connector, if any
    pub fn label_of(&self, element: &Element) -> Option<&str> {
        self.texts()
            .find(|t| t.text().and_then(|d| d.container_id.as_deref()) == Some(element.id.as_str()))
            .and_then(|t| t.text().map(|d| d.text.as_str()))
    }

    /// The shape whose bound label reads `label`
    pub fn shape_labelled(&self, label: &str) -> Option<&Element> {
        self.shapes().find(|s| self.label_of(s) == Some(label))
    }

    pub fn bounds(&self) -> Option<Rect> {
        let rects: Vec<Rect> = self
            .elements
            .iter()
            .filter(|e| !e.is_deleted)
            .map(|e| e.rect())
            .collect();
        geometry::bounding_box(&rects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::element::{Binding, ElementKind, LinearData};
    use crate::core::layout::{LayoutConnector, LayoutShape};
    use crate::core::{DiagramKind, Point, ShapeKind};
    use tempfile::TempDir;

    fn sample() -> SceneDocument {
        let mut layout = Layout::new(DiagramKind::Freeform);
        layout.push_shape(
            LayoutShape::new("a", ShapeKind::Rectangle, Rect::new(0.0, 0.0, 80.0, 40.0))
                .with_label("Alpha"),
        );
        layout.push_shape(LayoutShape::new(
            "b",
            ShapeKind::Diamond,
            Rect::new(0.0, 200.0, 80.0, 40.0),
        ));
        layout.push_connector(LayoutConnector::arrow(
            "a->b",
            "a",
            "b",
            vec![Point::new(40.0, 44.0), Point::new(40.0, 196.0)],
        ));
        SceneDocument::from_layout(&layout, &SceneConfig::default()).unwrap()
    }

    #[test]
    fn test_document_header() {
        let doc = sample();
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "excalidraw");
        assert_eq!(value["version"], 2);
        assert_eq!(value["source"], "chalkline");
        assert_eq!(value["appState"]["viewBackgroundColor"], "#ffffff");
        assert!(value["appState"]["gridSize"].is_null());
        assert!(value["files"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_write_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("scene.excalidraw");
        let doc = sample();
        let written = doc.write_to(&path).unwrap();
        assert_eq!(written, path);

        let loaded = SceneDocument::load(&path).unwrap();
        assert_eq!(loaded, doc);
        assert_eq!(loaded.shape_labelled("Alpha").unwrap().type_name(), "rectangle");
    }

    #[test]
    fn test_invalid_document_is_not_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.excalidraw");
        let mut doc = sample();
        let dangling = Element::new(
            "stray",
            ElementKind::Arrow(LinearData {
                points: vec![[0.0, 0.0], [10.0, 0.0]],
                start_binding: Some(Binding {
                    element_id: "nowhere".into(),
                    focus: 0.0,
                    gap: 4.0,
                }),
                end_binding: None,
                start_arrowhead: None,
                end_arrowhead: None,
                last_committed_point: None,
                elbowed: false,
            }),
            Rect::new(0.0, 0.0, 10.0, 0.0),
        );
        doc.elements.push(dangling);

        assert!(matches!(
            doc.write_to(&path),
            Err(DiagramError::DanglingReference { .. })
        ));
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut doc = sample();
        let copy = doc.elements[0].clone();
        let id = copy.id.clone();
        doc.elements.push(copy);
        assert!(matches!(
            doc.validate(),
            Err(DiagramError::DuplicateId { id: ref dup }) if *dup == id
        ));
    }

    #[test]
    fn test_wrong_document_type_rejected() {
        let json = r##"{"type":"drawing","version":2,"elements":[],"appState":{"viewBackgroundColor":"#fff"}}"##;
        assert!(matches!(
            SceneDocument::from_json(json),
            Err(DiagramError::Serialize { .. })
        ));
    }
}
