//! Entity-relationship diagram plugin
//!
//! Entities with attribute lists, joined by labelled relationships. Entities
//! go on an automatic grid unless given a position.

use crate::core::{Color, Diagram, DiagramKind, Layout, LayoutAlgorithm, Result};

mod database;
mod detector;
mod layout;

pub use database::*;
pub use detector::*;
pub use layout::*;

/// ER diagram builder
///
/// # Example
/// ```
/// use chalkline::prelude::*;
///
/// let mut er = ErDiagram::new();
/// er.entity("user", "User", ["id", "name", "email"], ColorName::Blue)
///     .entity("post", "Post", ["id", "title"], ColorName::Green);
/// er.relationship("user", "post", "writes", "1:N").unwrap();
/// assert_eq!(er.layout().unwrap().connectors.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ErDiagram {
    database: ErDatabase,
    config: ErConfig,
    title: Option<String>,
}

impl ErDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ErConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    /// Declare an entity placed on the grid
    pub fn entity<I, S>(
        &mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        attributes: I,
        color: impl Into<Color>,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.database.insert(
            Entity::new(id, label)
                .with_attributes(attributes)
                .with_color(color),
        );
        self
    }

    /// Declare an entity with its top-left corner at `(x, y)`
    pub fn entity_at<I, S>(
        &mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        attributes: I,
        color: impl Into<Color>,
        x: f64,
        y: f64,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.database.insert(
            Entity::new(id, label)
                .with_attributes(attributes)
                .with_color(color)
                .at(x, y),
        );
        self
    }

    /// Both entities must already be declared
    pub fn relationship(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        label: impl Into<String>,
        cardinality: impl Into<String>,
    ) -> Result<()> {
        self.database.relate(Relationship {
            from: from.into(),
            to: to.into(),
            label: label.into(),
            cardinality: cardinality.into(),
        })
    }

    pub fn database(&self) -> &ErDatabase {
        &self.database
    }
}

impl Diagram for ErDiagram {
    fn kind(&self) -> DiagramKind {
        DiagramKind::Er
    }

    fn layout(&self) -> Result<Layout> {
        let algorithm = ErLayoutAlgorithm::with_config(self.config.clone());
        Ok(algorithm.layout(&self.database)?.with_title(self.title.clone()))
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::core::{ColorName, DiagramError, SceneConfig};

    fn blog() -> ErDiagram {
        let mut er = ErDiagram::new();
        er.entity(
            "user",
            "User",
            ["id", "name", "email", "password_hash", "created_at"],
            ColorName::Blue,
        )
        .entity("tag", "Tag", ["id", "label"], ColorName::Orange)
        .entity("post", "Post", ["id", "title", "body"], ColorName::Green);
        er.relationship("user", "post", "writes", "1:N").unwrap();
        er.relationship("post", "tag", "tagged", "N:M").unwrap();
        er
    }

    #[test]
    fn test_user_taller_than_tag() {
        let layout = blog().layout().unwrap();
        let user = layout.shape("user").unwrap().rect;
        let tag = layout.shape("tag").unwrap().rect;
        assert!(user.height > tag.height);
    }

    #[test]
    fn test_full_pipeline() {
        let document = blog().to_document(&SceneConfig::default()).unwrap();
        // Outline and header per entity
        assert_eq!(document.shapes().count(), 6);
        assert_eq!(document.connectors().count(), 2);
        document.validate().unwrap();
    }

    #[test]
    fn test_relationship_to_undeclared_entity() {
        let mut er = blog();
        let err = er
            .relationship("user", "comment", "writes", "1:N")
            .unwrap_err();
        assert!(matches!(err, DiagramError::PrecedenceViolation { ref id, .. } if id == "comment"));
    }

    #[test]
    fn test_self_relationship() {
        let mut er = ErDiagram::new();
        er.entity("employee", "Employee", ["id", "manager_id"], ColorName::Purple);
        er.relationship("employee", "employee", "manages", "1:N")
            .unwrap();
        let layout = er.layout().unwrap();
        assert_eq!(layout.connectors[0].points.len(), 4);
    }

    #[test]
    fn test_explicit_position() {
        let mut er = ErDiagram::new();
        er.entity_at("a", "A", ["id"], ColorName::Gray, 500.0, 250.0);
        let rect = er.layout().unwrap().shape("a").unwrap().rect;
        assert_eq!((rect.x, rect.y), (500.0, 250.0));
    }
}
