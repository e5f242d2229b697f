//! Sequence diagram database implementation
//!
//! Stores participants, messages and notes. Messages get their ordinal
//! from declaration order and are checked against the declared
//! participants as they arrive.

use tracing::{debug, trace};

use crate::core::{Color, Database, DiagramError, Result, StrokeStyle};

/// Handle of a declared message; its value is the message ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub usize);

impl MessageId {
    pub fn ordinal(&self) -> usize {
        self.0
    }
}

/// A participant in the sequence diagram
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    /// Unique identifier used in messages
    pub id: String,
    pub label: String,
    pub color: Option<Color>,
}

impl Participant {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<Color>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A message between participants
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub label: String,
    /// Position in declaration order, assigned by the database
    pub ordinal: usize,
    pub stroke_style: StrokeStyle,
}

impl Message {
    pub fn new(from: impl Into<String>, to: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: label.into(),
            ordinal: 0,
            stroke_style: StrokeStyle::Solid,
        }
    }

    pub fn with_stroke(mut self, stroke_style: StrokeStyle) -> Self {
        self.stroke_style = stroke_style;
        self
    }

    pub fn is_self(&self) -> bool {
        self.from == self.to
    }
}

/// Which side of the lifeline a note sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteSide {
    Left,
    #[default]
    Right,
}

/// A note beside one lifeline, level with a message
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub participant: String,
    pub text: String,
    pub side: NoteSide,
    pub message: MessageId,
}

/// Sequence diagram database
#[derive(Debug, Default, Clone)]
pub struct SequenceDatabase {
    participants: Vec<Participant>,
    messages: Vec<Message>,
    notes: Vec<Note>,
}

impl SequenceDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant; redeclaring an id keeps its lane
    pub fn add_participant(&mut self, participant: Participant) {
        trace!(participant = %participant.id, "Adding participant");
        match self.participants.iter_mut().find(|p| p.id == participant.id) {
            Some(existing) => *existing = participant,
            None => self.participants.push(participant),
        }
    }

    fn require_participant(&self, id: &str, context: impl Into<String>) -> Result<()> {
        if self.participant_index(id).is_some() {
            Ok(())
        } else {
            Err(DiagramError::dangling("participant", id, context))
        }
    }

    /// Add a message, assigning the next ordinal
    pub fn add_message(&mut self, mut message: Message) -> Result<MessageId> {
        let context = format!("message '{}'", message.label);
        self.require_participant(&message.from, context.clone())?;
        self.require_participant(&message.to, context)?;

        message.ordinal = self.messages.len();
        let id = MessageId(message.ordinal);
        trace!(from = %message.from, to = %message.to, ordinal = message.ordinal, "Adding message");
        self.messages.push(message);
        debug!(message_count = self.messages.len(), "Message added");
        Ok(id)
    }

    pub fn add_note(&mut self, note: Note) -> Result<()> {
        self.require_participant(&note.participant, format!("note '{}'", note.text))?;
        if note.message.0 >= self.messages.len() {
            return Err(DiagramError::dangling(
                "message",
                note.message.0.to_string(),
                format!("note '{}'", note.text),
            ));
        }
        self.notes.push(note);
        Ok(())
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Lane index of a participant
    pub fn participant_index(&self, id: &str) -> Option<usize> {
        self.participants.iter().position(|p| p.id == id)
    }
}

/// Participants are nodes and messages are edges
impl Database for SequenceDatabase {
    type Node = Participant;
    type Edge = Message;

    fn add_node(&mut self, node: Self::Node) -> Result<()> {
        self.add_participant(node);
        Ok(())
    }

    fn add_edge(&mut self, edge: Self::Edge) -> Result<()> {
        self.add_message(edge).map(|_| ())
    }

    fn get_node(&self, id: &str) -> Option<&Self::Node> {
        self.participants.iter().find(|p| p.id == id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.participants.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &Self::Edge> {
        self.messages.iter()
    }

    fn clear(&mut self) {
        self.participants.clear();
        self.messages.clear();
        self.notes.clear();
    }

    fn node_count(&self) -> usize {
        self.participants.len()
    }

    fn edge_count(&self) -> usize {
        self.messages.len()
    }
}
