//! Mind map database implementation
//!
//! Topics live in an arena indexed by [`TopicId`]. The central topic is
//! created with the database and always sits at index 0.

use tracing::trace;

use crate::core::{Color, DiagramError, Result};

/// Handle of a topic in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicId(pub usize);

impl TopicId {
    /// The central topic
    pub const CENTRAL: TopicId = TopicId(0);

    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    Central,
    Branch,
    Leaf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    /// `None` only for the central topic
    pub parent: Option<TopicId>,
    pub label: String,
    pub color: Option<Color>,
    pub kind: TopicKind,
    /// Tier below the central topic
    pub depth: usize,
}

/// Topic arena
#[derive(Debug, Clone)]
pub struct MindMapDatabase {
    topics: Vec<Topic>,
}

impl Default for MindMapDatabase {
    fn default() -> Self {
        Self {
            topics: vec![Topic {
                parent: None,
                label: "Main Topic".to_string(),
                color: None,
                kind: TopicKind::Central,
                depth: 0,
            }],
        }
    }
}

impl MindMapDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_central(&mut self, label: impl Into<String>, color: Option<Color>) {
        let central = &mut self.topics[0];
        central.label = label.into();
        central.color = color;
    }

    /// Attach a topic under `parent`
    pub fn add_topic(
        &mut self,
        parent: TopicId,
        label: impl Into<String>,
        color: Option<Color>,
        kind: TopicKind,
    ) -> Result<TopicId> {
        let label = label.into();
        let depth = self
            .get(parent)
            .map(|p| p.depth + 1)
            .ok_or_else(|| {
                DiagramError::dangling("topic", parent.0.to_string(), format!("topic '{}'", label))
            })?;

        let id = TopicId(self.topics.len());
        trace!(topic = id.0, parent = parent.0, depth, "Adding topic");
        self.topics.push(Topic {
            parent: Some(parent),
            label,
            color,
            kind,
            depth,
        });
        Ok(id)
    }

    pub fn get(&self, id: TopicId) -> Option<&Topic> {
        self.topics.get(id.0)
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Children of a topic in declaration order
    pub fn children(&self, id: TopicId) -> Vec<TopicId> {
        self.topics
            .iter()
            .enumerate()
            .filter(|(_, t)| t.parent == Some(id))
            .map(|(i, _)| TopicId(i))
            .collect()
    }

    /// A topic's own color, or the nearest ancestor's
    pub fn effective_color(&self, id: TopicId) -> Option<Color> {
        let mut current = self.get(id);
        while let Some(topic) = current {
            if let Some(color) = &topic.color {
                return Some(color.clone());
            }
            current = topic.parent.and_then(|p| self.get(p));
        }
        None
    }

    /// Topics below `id` in preorder, excluding `id`
    pub fn descendants(&self, id: TopicId) -> Vec<TopicId> {
        let mut out = Vec::new();
        let mut stack: Vec<TopicId> = self.children(id).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Never true: the central topic always exists
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ColorName;

    #[test]
    fn test_central_always_exists() {
        let db = MindMapDatabase::new();
        assert_eq!(db.len(), 1);
        assert_eq!(db.get(TopicId::CENTRAL).unwrap().kind, TopicKind::Central);
    }

    #[test]
    fn test_depth_and_children() {
        let mut db = MindMapDatabase::new();
        let a = db
            .add_topic(TopicId::CENTRAL, "A", None, TopicKind::Branch)
            .unwrap();
        let leaf = db.add_topic(a, "a1", None, TopicKind::Leaf).unwrap();
        assert_eq!(db.get(leaf).unwrap().depth, 2);
        assert_eq!(db.children(TopicId::CENTRAL), vec![a]);
        assert_eq!(db.descendants(TopicId::CENTRAL), vec![a, leaf]);
    }

    #[test]
    fn test_unknown_parent_is_dangling() {
        let mut db = MindMapDatabase::new();
        let err = db
            .add_topic(TopicId(7), "lost", None, TopicKind::Leaf)
            .unwrap_err();
        assert!(matches!(err, DiagramError::DanglingReference { .. }));
    }

    #[test]
    fn test_leaf_inherits_color() {
        let mut db = MindMapDatabase::new();
        let a = db
            .add_topic(
                TopicId::CENTRAL,
                "A",
                Some(Color::Named(ColorName::Green)),
                TopicKind::Branch,
            )
            .unwrap();
        let leaf = db.add_topic(a, "a1", None, TopicKind::Leaf).unwrap();
        assert_eq!(db.effective_color(leaf), Some(Color::Named(ColorName::Green)));
    }
}
