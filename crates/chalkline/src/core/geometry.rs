//! Geometry primitives shared by every layout
//!
//! Perimeter anchors, straight-or-elbow connector paths, self loops and
//! bounding boxes. All functions reject degenerate boxes with
//! [`DiagramError::InvalidGeometry`].

use tracing::trace;

use super::{DiagramError, Point, Rect, Result, ShapeKind, Side};

/// Distance a connector stops short of a shape outline
pub const DEFAULT_GAP: f64 = 4.0;

/// Center offset under which two boxes count as aligned
pub const DEFAULT_ALIGN_TOLERANCE: f64 = 8.0;

/// Extent of a self loop beyond the shape outline
const SELF_LOOP_REACH: f64 = 36.0;

/// What an anchor should face
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorTarget {
    /// Midpoint of a fixed side
    Side(Side),
    /// Outline point on the ray from the box center toward a point
    Toward(Point),
}

/// Fail with `InvalidGeometry` unless the box has a positive, finite size
pub fn ensure_valid(rect: &Rect, element: &str) -> Result<()> {
    if rect.is_valid() {
        Ok(())
    } else {
        Err(DiagramError::invalid_geometry(
            element,
            format!(
                "box {}x{} at ({}, {}) must have positive width and height",
                rect.width, rect.height, rect.x, rect.y
            ),
        ))
    }
}

/// Compute the anchor point on a shape outline, pushed `gap` outward
pub fn anchor_point(kind: ShapeKind, rect: &Rect, target: AnchorTarget, gap: f64) -> Result<Point> {
    ensure_valid(rect, "anchor")?;
    let center = rect.center();

    let side = match target {
        AnchorTarget::Side(side) => side,
        AnchorTarget::Toward(point) => {
            let dx = point.x - center.x;
            let dy = point.y - center.y;
            let len = (dx * dx + dy * dy).sqrt();
            if len < f64::EPSILON {
                // Target on the center: no direction, use the right side
                Side::Right
            } else {
                let hw = rect.width / 2.0;
                let hh = rect.height / 2.0;
                let t = match kind {
                    ShapeKind::Rectangle => {
                        let tx = if dx.abs() > f64::EPSILON { hw / dx.abs() } else { f64::INFINITY };
                        let ty = if dy.abs() > f64::EPSILON { hh / dy.abs() } else { f64::INFINITY };
                        tx.min(ty)
                    }
                    ShapeKind::Ellipse => 1.0 / ((dx / hw).powi(2) + (dy / hh).powi(2)).sqrt(),
                    ShapeKind::Diamond => 1.0 / (dx.abs() / hw + dy.abs() / hh),
                };
                let (ux, uy) = (dx / len, dy / len);
                return Ok(Point::new(
                    center.x + dx * t + ux * gap,
                    center.y + dy * t + uy * gap,
                ));
            }
        }
    };

    let (nx, ny) = side.normal();
    let base = match side {
        Side::Top => Point::new(center.x, rect.y),
        Side::Bottom => Point::new(center.x, rect.bottom()),
        Side::Left => Point::new(rect.x, center.y),
        Side::Right => Point::new(rect.right(), center.y),
    };
    Ok(base.offset(nx * gap, ny * gap))
}

/// The side of `rect` that faces `toward`, judged on the dominant axis
pub fn facing_side(rect: &Rect, toward: Point) -> Side {
    let center = rect.center();
    let dx = (toward.x - center.x) / (rect.width / 2.0).max(f64::EPSILON);
    let dy = (toward.y - center.y) / (rect.height / 2.0).max(f64::EPSILON);
    if dy.abs() >= dx.abs() {
        if dy >= 0.0 {
            Side::Bottom
        } else {
            Side::Top
        }
    } else if dx >= 0.0 {
        Side::Right
    } else {
        Side::Left
    }
}

/// Where the line at `along`, perpendicular to `side`, leaves the outline on
/// that side, pushed `gap` outward
///
/// `along` is an x coordinate for top and bottom, a y coordinate otherwise.
/// Lines past the box extent clamp to the outermost point.
fn outline_at(kind: ShapeKind, rect: &Rect, side: Side, along: f64, gap: f64) -> Point {
    let c = rect.center();
    let depth = |offset: f64, half_across: f64, half_depth: f64| {
        let r = (offset / half_across).abs().min(1.0);
        match kind {
            ShapeKind::Rectangle => half_depth,
            ShapeKind::Ellipse => half_depth * (1.0 - r * r).sqrt(),
            ShapeKind::Diamond => half_depth * (1.0 - r),
        }
    };
    let (hw, hh) = (rect.width / 2.0, rect.height / 2.0);
    match side {
        Side::Top => Point::new(along, c.y - depth(along - c.x, hw, hh) - gap),
        Side::Bottom => Point::new(along, c.y + depth(along - c.x, hw, hh) + gap),
        Side::Left => Point::new(c.x - depth(along - c.y, hh, hw) - gap, along),
        Side::Right => Point::new(c.x + depth(along - c.y, hh, hw) + gap, along),
    }
}

/// Route a connector between two shapes
///
/// Boxes whose extents overlap on one axis only get a straight two-point
/// path between their facing sides, on the source's center line when the
/// centers are within `tolerance`. Both ends meet the real outline of
/// ellipses and diamonds. Everything else gets an elbow with exactly one
/// bend that leaves the source and enters the target perpendicular to
/// their sides.
pub fn route(
    from: (ShapeKind, &Rect),
    to: (ShapeKind, &Rect),
    tolerance: f64,
    gap: f64,
) -> Result<Vec<Point>> {
    let (from_kind, a) = from;
    let (to_kind, b) = to;
    ensure_valid(a, "route source")?;
    ensure_valid(b, "route target")?;

    let ac = a.center();
    let bc = b.center();
    let dx = bc.x - ac.x;
    let dy = bc.y - ac.y;

    // Overlapping boxes have no clean facing sides; aim center to center.
    if a.overlaps_x(b) && a.overlaps_y(b) {
        trace!("Boxes overlap, routing center to center");
        let start = anchor_point(from_kind, a, AnchorTarget::Toward(bc), gap)?;
        let end = anchor_point(to_kind, b, AnchorTarget::Toward(ac), gap)?;
        return Ok(vec![start, end]);
    }

    // Straight only when the extents overlap on the perpendicular axis, on
    // the center line if the centers are within tolerance
    if a.overlaps_x(b) && !a.overlaps_y(b) {
        let x = if dx.abs() <= tolerance && ac.x > b.x && ac.x < b.right() {
            ac.x
        } else {
            (a.x.max(b.x) + a.right().min(b.right())) / 2.0
        };
        let exit = if dy >= 0.0 { Side::Bottom } else { Side::Top };
        return Ok(vec![
            outline_at(from_kind, a, exit, x, gap),
            outline_at(to_kind, b, exit.opposite(), x, gap),
        ]);
    }

    if a.overlaps_y(b) && !a.overlaps_x(b) {
        let y = if dy.abs() <= tolerance && ac.y > b.y && ac.y < b.bottom() {
            ac.y
        } else {
            (a.y.max(b.y) + a.bottom().min(b.bottom())) / 2.0
        };
        let exit = if dx >= 0.0 { Side::Right } else { Side::Left };
        return Ok(vec![
            outline_at(from_kind, a, exit, y, gap),
            outline_at(to_kind, b, exit.opposite(), y, gap),
        ]);
    }

    // Boxes are disjoint on both axes: one bend is always enough.
    let path = if dy.abs() >= dx.abs() {
        let start = Point::new(ac.x, if dy > 0.0 { a.bottom() + gap } else { a.y - gap });
        let end = Point::new(if dx > 0.0 { b.x - gap } else { b.right() + gap }, bc.y);
        vec![start, Point::new(ac.x, bc.y), end]
    } else {
        let start = Point::new(if dx > 0.0 { a.right() + gap } else { a.x - gap }, ac.y);
        let end = Point::new(bc.x, if dy > 0.0 { b.y - gap } else { b.bottom() + gap });
        vec![start, Point::new(bc.x, ac.y), end]
    };
    Ok(path)
}

/// A loop that leaves and re-enters the same side of a box
pub fn self_loop(rect: &Rect, side: Side, gap: f64) -> Result<Vec<Point>> {
    ensure_valid(rect, "self loop")?;
    let c = rect.center();
    let reach = SELF_LOOP_REACH + gap;
    let points = match side {
        Side::Right | Side::Left => {
            let sign = if side == Side::Right { 1.0 } else { -1.0 };
            let edge = if side == Side::Right { rect.right() } else { rect.x };
            let spread = (rect.height / 4.0).max(6.0);
            vec![
                Point::new(edge + sign * gap, c.y - spread),
                Point::new(edge + sign * reach, c.y - spread),
                Point::new(edge + sign * reach, c.y + spread),
                Point::new(edge + sign * gap, c.y + spread),
            ]
        }
        Side::Top | Side::Bottom => {
            let sign = if side == Side::Bottom { 1.0 } else { -1.0 };
            let edge = if side == Side::Bottom { rect.bottom() } else { rect.y };
            let spread = (rect.width / 4.0).max(6.0);
            vec![
                Point::new(c.x - spread, edge + sign * gap),
                Point::new(c.x - spread, edge + sign * reach),
                Point::new(c.x + spread, edge + sign * reach),
                Point::new(c.x + spread, edge + sign * gap),
            ]
        }
    };
    Ok(points)
}

/// Midpoint of a polyline by arc length, with the unit direction there
pub fn path_midpoint(points: &[Point]) -> Option<(Point, (f64, f64))> {
    if points.len() < 2 {
        return None;
    }
    let total: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    let mut remaining = total / 2.0;

    for w in points.windows(2) {
        let len = w[0].distance(w[1]);
        if len <= f64::EPSILON {
            continue;
        }
        let dir = ((w[1].x - w[0].x) / len, (w[1].y - w[0].y) / len);
        if remaining <= len {
            return Some((w[0].offset(dir.0 * remaining, dir.1 * remaining), dir));
        }
        remaining -= len;
    }

    // Every segment had zero length
    Some((points[0], (1.0, 0.0)))
}

/// Smallest box enclosing every given box, `None` when empty
pub fn bounding_box<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
    rects.into_iter().fold(None, |acc, rect| match acc {
        None => Some(*rect),
        Some(bounds) => Some(bounds.union(rect)),
    })
}

/// Min/max extents of a set of points as `(min_x, min_y, max_x, max_y)`
pub fn point_extents(points: &[Point]) -> Option<(f64, f64, f64, f64)> {
    let first = points.first()?;
    Some(points.iter().fold(
        (first.x, first.y, first.x, first.y),
        |(min_x, min_y, max_x, max_y), p| {
            (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
        },
    ))
}
