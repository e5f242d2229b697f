//! Sequence diagram plugin
//!
//! Participants on fixed lanes exchanging messages in declaration order.

use crate::core::{
    Color, Diagram, DiagramKind, Layout, LayoutAlgorithm, Result, StrokeStyle,
};

mod database;
mod detector;
mod layout;

pub use database::*;
pub use detector::*;
pub use layout::*;

/// Sequence diagram builder
///
/// Messages and notes are checked against the declared participants when
/// they are added.
#[derive(Debug, Clone, Default)]
pub struct SequenceDiagram {
    database: SequenceDatabase,
    config: SequenceConfig,
    title: Option<String>,
}

impl SequenceDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SequenceConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn participant(
        &mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        color: impl Into<Color>,
    ) -> &mut Self {
        self.database
            .add_participant(Participant::new(id, label).with_color(color));
        self
    }

    pub fn message(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<MessageId> {
        self.database.add_message(Message::new(from, to, label))
    }

    /// A dashed return message
    pub fn reply(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<MessageId> {
        self.database
            .add_message(Message::new(from, to, label).with_stroke(StrokeStyle::Dashed))
    }

    pub fn note(
        &mut self,
        participant: impl Into<String>,
        text: impl Into<String>,
        side: NoteSide,
        at: MessageId,
    ) -> Result<()> {
        self.database.add_note(Note {
            participant: participant.into(),
            text: text.into(),
            side,
            message: at,
        })
    }

    pub fn database(&self) -> &SequenceDatabase {
        &self.database
    }
}

impl Diagram for SequenceDiagram {
    fn kind(&self) -> DiagramKind {
        DiagramKind::Sequence
    }

    fn layout(&self) -> Result<Layout> {
        let algorithm = SequenceLayoutAlgorithm::with_config(self.config.clone());
        Ok(algorithm.layout(&self.database)?.with_title(self.title.clone()))
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::core::{ColorName, DiagramError, SceneConfig};

    fn login() -> SequenceDiagram {
        let mut seq = SequenceDiagram::new();
        seq.participant("user", "User", ColorName::Blue)
            .participant("api", "API", ColorName::Green)
            .participant("db", "Database", ColorName::Orange);
        seq.message("user", "api", "POST /login").unwrap();
        seq.message("api", "db", "SELECT user").unwrap();
        let reply = seq.reply("db", "api", "row").unwrap();
        seq.message("api", "api", "hash password").unwrap();
        seq.note("api", "bcrypt", NoteSide::Right, reply).unwrap();
        seq.reply("api", "user", "token").unwrap();
        seq
    }

    #[test]
    fn test_full_pipeline() {
        let document = login().to_document(&SceneConfig::default()).unwrap();
        // Three participants and one note
        assert_eq!(document.shapes().count(), 4);
        // Three lifelines and five messages
        assert_eq!(document.connectors().count(), 8);
        document.validate().unwrap();
    }

    #[test]
    fn test_unknown_participant_fails_immediately() {
        let mut seq = login();
        let err = seq.message("user", "cache", "GET").unwrap_err();
        assert!(matches!(err, DiagramError::DanglingReference { .. }));
        let err = seq
            .note("cache", "warm", NoteSide::Left, MessageId(0))
            .unwrap_err();
        assert!(matches!(err, DiagramError::DanglingReference { .. }));
    }

    #[test]
    fn test_note_on_missing_message_fails() {
        let mut seq = login();
        assert!(seq.note("api", "late", NoteSide::Left, MessageId(99)).is_err());
    }

    #[test]
    fn test_replies_are_dashed() {
        let seq = login();
        let styles: Vec<_> = seq
            .database()
            .messages()
            .iter()
            .map(|m| m.stroke_style)
            .collect();
        assert_eq!(styles[2], StrokeStyle::Dashed);
        assert_eq!(styles[0], StrokeStyle::Solid);
    }
}
