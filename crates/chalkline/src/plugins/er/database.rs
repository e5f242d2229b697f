//! Entity-relationship database implementation

use std::collections::HashMap;
use tracing::trace;

use crate::core::{Color, Database, DiagramError, Point, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub label: String,
    /// Attribute lines in declaration order
    pub attributes: Vec<String>,
    pub color: Option<Color>,
    /// Top-left corner; `None` places the entity on the grid
    pub position: Option<Point>,
}

impl Entity {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            attributes: Vec::new(),
            color: None,
            position: None,
        }
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_color(mut self, color: impl Into<Color>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Point::new(x, y));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    pub label: String,
    /// Free-form, e.g. `1:N`
    pub cardinality: String,
}

impl Relationship {
    /// Connector text: `label (cardinality)`
    pub fn caption(&self) -> String {
        match (self.label.is_empty(), self.cardinality.is_empty()) {
            (_, true) => self.label.clone(),
            (true, false) => format!("({})", self.cardinality),
            (false, false) => format!("{} ({})", self.label, self.cardinality),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ErDatabase {
    entities: HashMap<String, Entity>,
    order: Vec<String>,
    relationships: Vec<Relationship>,
}

impl ErDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity; a replaced entity keeps its grid slot
    pub fn insert(&mut self, entity: Entity) {
        trace!(entity = %entity.id, attributes = entity.attributes.len(), "Adding entity");
        if !self.entities.contains_key(&entity.id) {
            self.order.push(entity.id.clone());
        }
        self.entities.insert(entity.id.clone(), entity);
    }

    /// Add a relationship between two declared entities
    pub fn relate(&mut self, relationship: Relationship) -> Result<()> {
        for endpoint in [&relationship.from, &relationship.to] {
            if !self.entities.contains_key(endpoint) {
                return Err(DiagramError::precedence(
                    "entity",
                    endpoint.clone(),
                    format!(
                        "relationship {} -> {}",
                        relationship.from, relationship.to
                    ),
                ));
            }
        }
        self.relationships.push(relationship);
        Ok(())
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }
}

impl Database for ErDatabase {
    type Node = Entity;
    type Edge = Relationship;

    fn add_node(&mut self, node: Entity) -> Result<()> {
        self.insert(node);
        Ok(())
    }

    fn add_edge(&mut self, edge: Relationship) -> Result<()> {
        self.relate(edge)
    }

    fn get_node(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    fn edges(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter()
    }

    fn clear(&mut self) {
        self.entities.clear();
        self.order.clear();
        self.relationships.clear();
    }

    fn node_count(&self) -> usize {
        self.entities.len()
    }

    fn edge_count(&self) -> usize {
        self.relationships.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_needs_both_entities() {
        let mut db = ErDatabase::new();
        db.insert(Entity::new("user", "User"));
        let rel = Relationship {
            from: "user".into(),
            to: "order".into(),
            label: "places".into(),
            cardinality: "1:N".into(),
        };
        let err = db.relate(rel.clone()).unwrap_err();
        assert!(matches!(err, DiagramError::PrecedenceViolation { ref id, .. } if id == "order"));

        db.insert(Entity::new("order", "Order"));
        db.relate(rel).unwrap();
        assert_eq!(db.edge_count(), 1);
    }

    #[test]
    fn test_caption_formats() {
        let mut rel = Relationship {
            from: "a".into(),
            to: "b".into(),
            label: "has".into(),
            cardinality: "1:N".into(),
        };
        assert_eq!(rel.caption(), "has (1:N)");
        rel.cardinality.clear();
        assert_eq!(rel.caption(), "has");
        rel.label.clear();
        rel.cardinality = "N:M".into();
        assert_eq!(rel.caption(), "(N:M)");
    }

    #[test]
    fn test_entities_keep_order() {
        let mut db = ErDatabase::new();
        db.insert(Entity::new("b", "B"));
        db.insert(Entity::new("a", "A"));
        db.insert(Entity::new("b", "B2").with_attributes(["id"]));
        let ids: Vec<_> = db.nodes().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(db.get_node("b").unwrap().attributes, vec!["id"]);
    }
}
