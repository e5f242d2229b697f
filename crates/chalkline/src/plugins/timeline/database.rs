//! Timeline database implementation
//!
//! Events and milestones share one axis ordered by declaration; periods
//! refer back to already declared items.

use tracing::trace;

use crate::core::{Color, DiagramError, Result};

/// Handle of an event or milestone; its value is the axis slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Event,
    Milestone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineItem {
    /// Free-form date label; never parsed
    pub date: String,
    pub title: String,
    pub description: String,
    pub color: Option<Color>,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub start: ItemId,
    pub end: ItemId,
    pub label: String,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Default)]
pub struct TimelineDatabase {
    items: Vec<TimelineItem>,
    periods: Vec<Period>,
}

impl TimelineDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, item: TimelineItem) -> ItemId {
        let id = ItemId(self.items.len());
        trace!(slot = id.0, date = %item.date, kind = ?item.kind, "Adding timeline item");
        self.items.push(item);
        id
    }

    /// Add a period between two declared items
    pub fn add_period(&mut self, period: Period) -> Result<()> {
        for endpoint in [period.start, period.end] {
            if endpoint.0 >= self.items.len() {
                return Err(DiagramError::precedence(
                    "timeline item",
                    endpoint.0.to_string(),
                    format!("period '{}'", period.label),
                ));
            }
        }
        self.periods.push(period);
        Ok(())
    }

    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(date: &str) -> TimelineItem {
        TimelineItem {
            date: date.to_string(),
            title: format!("in {}", date),
            description: String::new(),
            color: None,
            kind: ItemKind::Event,
        }
    }

    #[test]
    fn test_slots_follow_declaration() {
        let mut db = TimelineDatabase::new();
        assert_eq!(db.add_item(item("2010")), ItemId(0));
        assert_eq!(db.add_item(item("1999")), ItemId(1));
        assert_eq!(db.items()[1].date, "1999");
    }

    #[test]
    fn test_period_needs_declared_items() {
        let mut db = TimelineDatabase::new();
        let start = db.add_item(item("2001"));
        let period = Period {
            start,
            end: ItemId(1),
            label: "early".into(),
            color: None,
        };
        let err = db.add_period(period.clone()).unwrap_err();
        assert!(matches!(err, DiagramError::PrecedenceViolation { .. }));

        db.add_item(item("2002"));
        db.add_period(period).unwrap();
        assert_eq!(db.periods().len(), 1);
    }
}
