//! Timeline layout algorithm
//!
//! The n-th item sits at `n * event_spacing` along the axis. Event boxes
//! go on one side of the axis, dates on the other, periods beyond the
//! dates.

use tracing::{debug, span, trace, Level};

use super::database::{ItemKind, TimelineDatabase};
use crate::core::{
    geometry, text, AnchorTarget, DiagramKind, Direction, Layout, LayoutAlgorithm,
    LayoutConnector, LayoutShape, LayoutText, Point, Rect, Result, ShapeKind, ShapeStyle,
};

/// Timeline layout configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineConfig {
    /// Horizontal axis by default
    pub direction: Direction,
    pub event_spacing: f64,
    /// Distance from the axis to event box centers
    pub box_offset: f64,
    /// Distance from the axis to date label centers
    pub date_offset: f64,
    /// Distance from the axis to the first period row
    pub period_offset: f64,
    pub period_height: f64,
    pub box_width: f64,
    pub marker_size: f64,
    pub font_size: f64,
    pub gap: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Horizontal,
            event_spacing: 200.0,
            box_offset: 110.0,
            date_offset: 36.0,
            period_offset: 70.0,
            period_height: 40.0,
            box_width: 160.0,
            marker_size: 20.0,
            font_size: 16.0,
            gap: geometry::DEFAULT_GAP,
        }
    }
}

impl TimelineConfig {
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_event_spacing(mut self, spacing: f64) -> Self {
        self.event_spacing = spacing;
        self
    }
}

/// Timeline layout algorithm
#[derive(Debug, Clone, Default)]
pub struct TimelineLayoutAlgorithm {
    config: TimelineConfig,
}

impl TimelineLayoutAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TimelineConfig) -> Self {
        Self { config }
    }

    /// Axis coordinate of a slot
    pub fn position(&self, slot: usize) -> f64 {
        slot as f64 * self.config.event_spacing
    }

    /// Map axis and cross coordinates to the page; positive cross is the
    /// event-box side
    fn place(&self, along: f64, cross: f64) -> Point {
        match self.config.direction {
            Direction::Horizontal => Point::new(along, -cross),
            Direction::Vertical => Point::new(cross, along),
        }
    }

    fn span_rect(&self, a: Point, b: Point) -> Rect {
        let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
        let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

impl LayoutAlgorithm<TimelineDatabase> for TimelineLayoutAlgorithm {
    fn layout(&self, database: &TimelineDatabase) -> Result<Layout> {
        let layout_span = span!(
            Level::INFO,
            "layout_timeline",
            items = database.items().len(),
            periods = database.periods().len(),
            direction = %self.config.direction
        );
        let _enter = layout_span.enter();

        let config = &self.config;
        let mut layout = Layout::new(DiagramKind::Timeline);
        let count = database.items().len();
        if count == 0 {
            return Ok(layout);
        }

        let reach = config.event_spacing / 2.0;
        layout.push_connector(LayoutConnector::line(
            "axis",
            vec![
                self.place(-reach, 0.0),
                self.place(self.position(count - 1) + reach, 0.0),
            ],
        ));

        for (slot, item) in database.items().iter().enumerate() {
            let along = self.position(slot);
            let axis_point = self.place(along, 0.0);
            trace!(slot, along, date = %item.date, "Placing timeline item");

            let (marker_kind, marker_size) = match item.kind {
                ItemKind::Event => (ShapeKind::Ellipse, config.marker_size),
                ItemKind::Milestone => (ShapeKind::Diamond, config.marker_size * 1.8),
            };
            let marker = Rect::centered(axis_point, marker_size, marker_size);
            layout.push_shape(
                LayoutShape::new(format!("marker{}", slot), marker_kind, marker)
                    .with_style(ShapeStyle::colored(item.color.clone())),
            );

            layout.push_text(
                LayoutText::centered_on(
                    format!("date{}", slot),
                    item.date.clone(),
                    self.place(along, -config.date_offset),
                    config.font_size,
                ),
            );

            match item.kind {
                ItemKind::Event => {
                    let mut label = text::wrap_for_box(&item.title, 16);
                    if !item.description.is_empty() {
                        label.push('\n');
                        label.push_str(&text::wrap_for_box(&item.description, 16));
                    }
                    let metrics = text::measure(&label, config.font_size);
                    let width = (metrics.width + 24.0).max(config.box_width);
                    let height = metrics.height + 20.0;
                    let rect = Rect::centered(self.place(along, config.box_offset), width, height);
                    let key = format!("event{}", slot);
                    layout.push_shape(
                        LayoutShape::new(key.clone(), ShapeKind::Rectangle, rect)
                            .with_label(label)
                            .with_style(
                                ShapeStyle::colored(item.color.clone())
                                    .rounded()
                                    .with_font_size(config.font_size),
                            ),
                    );

                    let start = geometry::anchor_point(
                        ShapeKind::Ellipse,
                        &marker,
                        AnchorTarget::Toward(rect.center()),
                        config.gap,
                    )?;
                    let end = geometry::anchor_point(
                        ShapeKind::Rectangle,
                        &rect,
                        AnchorTarget::Toward(marker.center()),
                        config.gap,
                    )?;
                    layout.push_connector(
                        LayoutConnector::arrow(
                            format!("stem{}", slot),
                            format!("marker{}", slot),
                            key,
                            vec![start, end],
                        )
                        .without_arrowheads()
                        .with_color(item.color.clone()),
                    );
                }
                ItemKind::Milestone => {
                    let offset = marker_size / 2.0 + config.date_offset;
                    layout.push_text(
                        LayoutText::centered_on(
                            format!("milestone{}", slot),
                            text::wrap_for_box(&item.title, 16),
                            self.place(along, offset),
                            config.font_size,
                        )
                        .with_color(item.color.clone()),
                    );
                }
            }
        }

        for (row, period) in database.periods().iter().enumerate() {
            let (a, b) = (self.position(period.start.0), self.position(period.end.0));
            let (low, high) = (a.min(b), a.max(b));
            let near = config.period_offset + row as f64 * (config.period_height + 10.0);
            let pad = config.marker_size;
            let rect = self.span_rect(
                self.place(low - pad, -near),
                self.place(high + pad, -(near + config.period_height)),
            );
            trace!(row, low, high, "Placing period");
            layout.push_shape(
                LayoutShape::new(format!("period{}", row), ShapeKind::Rectangle, rect)
                    .with_label(period.label.clone())
                    .with_style(
                        ShapeStyle::colored(period.color.clone())
                            .rounded()
                            .with_font_size(config.font_size),
                    ),
            );
        }

        debug!(
            shapes = layout.shapes.len(),
            texts = layout.texts.len(),
            "Timeline layout completed"
        );
        Ok(layout)
    }

    fn name(&self) -> &'static str {
        "axis"
    }
}
