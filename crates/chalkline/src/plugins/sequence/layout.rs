//! Sequence diagram layout algorithm
//!
//! Lanes in participant order, one row per message ordinal.

use tracing::{debug, span, trace, Level};

use super::database::{NoteSide, SequenceDatabase};
use crate::core::{
    geometry, text, Color, ColorName, Database, DiagramError, DiagramKind, LabelPlacement, Layout,
    LayoutAlgorithm, LayoutConnector, LayoutShape, Point, Rect, Result, ShapeKind, ShapeStyle, Side,
    StrokeStyle,
};

/// Sequence layout configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceConfig {
    /// Distance between lane centers
    pub participant_spacing: f64,
    /// Vertical distance between message rows
    pub message_spacing: f64,
    pub box_width: f64,
    pub box_height: f64,
    pub note_width: f64,
    /// Gap between a lifeline and the notes beside it
    pub note_offset: f64,
    pub font_size: f64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            participant_spacing: 220.0,
            message_spacing: 60.0,
            box_width: 150.0,
            box_height: 60.0,
            note_width: 140.0,
            note_offset: 16.0,
            font_size: 20.0,
        }
    }
}

impl SequenceConfig {
    pub fn with_participant_spacing(mut self, spacing: f64) -> Self {
        self.participant_spacing = spacing;
        self
    }

    pub fn with_message_spacing(mut self, spacing: f64) -> Self {
        self.message_spacing = spacing;
        self
    }
}

/// Sequence diagram layout algorithm
#[derive(Debug, Clone, Default)]
pub struct SequenceLayoutAlgorithm {
    config: SequenceConfig,
}

impl SequenceLayoutAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SequenceConfig) -> Self {
        Self { config }
    }

    /// Center x of a lane
    pub fn lane_x(&self, lane: usize) -> f64 {
        lane as f64 * self.config.participant_spacing
    }

    /// Y of the message with the given ordinal
    pub fn message_y(&self, ordinal: usize) -> f64 {
        self.config.box_height + (ordinal as f64 + 1.0) * self.config.message_spacing
    }

    fn lane(&self, database: &SequenceDatabase, id: &str) -> Result<usize> {
        database
            .participant_index(id)
            .ok_or_else(|| DiagramError::dangling("participant", id, "sequence layout"))
    }
}

impl LayoutAlgorithm<SequenceDatabase> for SequenceLayoutAlgorithm {
    fn layout(&self, database: &SequenceDatabase) -> Result<Layout> {
        let layout_span = span!(
            Level::INFO,
            "layout_sequence",
            participants = database.node_count(),
            messages = database.edge_count()
        );
        let _enter = layout_span.enter();

        let mut layout = Layout::new(DiagramKind::Sequence);
        let config = &self.config;
        let lifeline_end = self.message_y(database.messages().len()) + config.message_spacing / 2.0;

        for (lane, participant) in database.participants().iter().enumerate() {
            let x = self.lane_x(lane);
            let metrics = text::measure(&participant.label, config.font_size);
            let width = (metrics.width + 30.0).max(config.box_width);
            let rect = Rect::centered(Point::new(x, config.box_height / 2.0), width, config.box_height);
            trace!(participant = %participant.id, lane, x, "Placed participant");

            layout.push_shape(
                LayoutShape::new(participant.id.clone(), ShapeKind::Rectangle, rect)
                    .with_label(participant.label.clone())
                    .with_style(ShapeStyle::colored(participant.color.clone()).rounded()),
            );
            layout.push_connector(
                LayoutConnector::line(
                    format!("lifeline:{}", participant.id),
                    vec![Point::new(x, rect.bottom()), Point::new(x, lifeline_end)],
                )
                .with_stroke(StrokeStyle::Dashed)
                .with_color(Some(Color::Named(ColorName::Gray))),
            );
        }

        for message in database.messages() {
            let from = self.lane_x(self.lane(database, &message.from)?);
            let to = self.lane_x(self.lane(database, &message.to)?);
            let y = self.message_y(message.ordinal);

            let points = if message.is_self() {
                let height = config.message_spacing * 0.8;
                let anchor = Rect::centered(Point::new(from, y + height / 4.0), 2.0, height);
                geometry::self_loop(&anchor, Side::Right, 0.0)?
            } else {
                vec![Point::new(from, y), Point::new(to, y)]
            };
            trace!(ordinal = message.ordinal, y, is_self = message.is_self(), "Placed message");

            let mut connector =
                LayoutConnector::free_arrow(format!("message{}", message.ordinal), points)
                    .with_stroke(message.stroke_style);
            if !message.label.is_empty() {
                connector = connector.with_label(message.label.clone(), LabelPlacement::Bound);
            }
            layout.push_connector(connector);
        }

        for (index, note) in database.notes().iter().enumerate() {
            let x = self.lane_x(self.lane(database, &note.participant)?);
            let y = self.message_y(note.message.ordinal());
            let label = text::wrap_for_box(&note.text, 16);
            let metrics = text::measure(&label, config.font_size * 0.8);
            let width = (metrics.width + 20.0).max(config.note_width);
            let height = metrics.height + 16.0;
            let left = match note.side {
                NoteSide::Right => x + config.note_offset,
                NoteSide::Left => x - config.note_offset - width,
            };
            let rect = Rect::new(left, y - height / 2.0, width, height);

            layout.push_shape(
                LayoutShape::new(format!("note{}", index), ShapeKind::Rectangle, rect)
                    .with_label(label)
                    .with_style(
                        ShapeStyle::colored(Some(Color::Named(ColorName::Yellow)))
                            .with_font_size(config.font_size * 0.8),
                    ),
            );
        }

        debug!(
            shapes = layout.shapes.len(),
            connectors = layout.connectors.len(),
            "Sequence layout completed"
        );
        Ok(layout)
    }

    fn name(&self) -> &'static str {
        "lanes"
    }
}

#[cfg(test)]
mod tests {
    use super::super::database::{Message, MessageId, Note, Participant};
    use super::*;

    fn chat() -> SequenceDatabase {
        let mut db = SequenceDatabase::new();
        db.add_participant(Participant::new("alice", "Alice"));
        db.add_participant(Participant::new("bob", "Bob"));
        db.add_message(Message::new("alice", "bob", "Hello")).unwrap();
        db.add_message(Message::new("bob", "alice", "Hi").with_stroke(StrokeStyle::Dashed))
            .unwrap();
        db
    }

    #[test]
    fn test_empty_layout() {
        let layout = SequenceLayoutAlgorithm::new()
            .layout(&SequenceDatabase::new())
            .unwrap();
        assert!(layout.is_empty());
    }

    #[test]
    fn test_lanes_follow_participant_order() {
        let layout = SequenceLayoutAlgorithm::new().layout(&chat()).unwrap();
        let alice = layout.shape("alice").unwrap().rect.center();
        let bob = layout.shape("bob").unwrap().rect.center();
        assert_eq!(alice.x, 0.0);
        assert_eq!(bob.x, 220.0);
    }

    #[test]
    fn test_messages_step_down() {
        let layout = SequenceLayoutAlgorithm::new().layout(&chat()).unwrap();
        let first = layout.connectors.iter().find(|c| c.key == "message0").unwrap();
        let second = layout.connectors.iter().find(|c| c.key == "message1").unwrap();
        assert_eq!(first.points[0].y, 120.0);
        assert!(second.points[0].y > first.points[0].y);
        assert!(first.points[0].x < first.points[1].x);
        assert!(second.points[0].x > second.points[1].x);
        assert_eq!(second.stroke_style, StrokeStyle::Dashed);
    }

    #[test]
    fn test_lifelines_reach_past_last_message() {
        let layout = SequenceLayoutAlgorithm::new().layout(&chat()).unwrap();
        let lifeline = layout
            .connectors
            .iter()
            .find(|c| c.key == "lifeline:alice")
            .unwrap();
        assert_eq!(lifeline.stroke_style, StrokeStyle::Dashed);
        assert!(lifeline.points[1].y > 180.0);
        assert!(lifeline.from.is_none());
    }

    #[test]
    fn test_self_message_loops_right() {
        let mut db = chat();
        db.add_message(Message::new("bob", "bob", "think")).unwrap();
        let layout = SequenceLayoutAlgorithm::new().layout(&db).unwrap();
        let loop_path = &layout.connectors.iter().find(|c| c.key == "message2").unwrap().points;
        assert_eq!(loop_path.len(), 4);
        assert!(loop_path.iter().all(|p| p.x >= 220.0));
        assert!(loop_path[1].x > 220.0);
    }

    #[test]
    fn test_note_sides() {
        let mut db = chat();
        for side in [NoteSide::Left, NoteSide::Right] {
            db.add_note(Note {
                participant: "bob".into(),
                text: "note".into(),
                side,
                message: MessageId(1),
            })
            .unwrap();
        }
        let layout = SequenceLayoutAlgorithm::new().layout(&db).unwrap();
        let left = layout.shape("note0").unwrap().rect;
        let right = layout.shape("note1").unwrap().rect;
        assert!(left.right() < 220.0);
        assert!(right.x > 220.0);
        assert_eq!(left.center().y, 180.0);
    }
}
