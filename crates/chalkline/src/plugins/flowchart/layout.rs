//! Flowchart layout implementation
//!
//! Ranked rows and columns with deterministic placement:
//!
//! 1. a depth-first pass from the sources marks feedback edges,
//! 2. ranks are longest paths over the remaining edges,
//! 3. each rank becomes a row (a column when horizontal), ordered by
//!    breadth-first discovery and centered on the flow axis,
//! 4. optionally the ranks fold into two bands to approach a target
//!    aspect ratio.

use std::collections::{HashMap, VecDeque};
use tracing::{debug, info, span, trace, warn, Level};

use super::{FlowNode, FlowchartDatabase, NodeKind};
use crate::core::geometry::{self, DEFAULT_ALIGN_TOLERANCE, DEFAULT_GAP};
use crate::core::{
    text, Database, DiagramError, DiagramKind, Direction, LabelPlacement, Layout,
    LayoutAlgorithm, LayoutConnector, LayoutShape, Point, Rect, Result, ShapeStyle, Side,
};

/// Two-column packing settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackingConfig {
    /// Width divided by height the packed layout should approach
    pub target_aspect: f64,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self { target_aspect: 0.8 }
    }
}

/// Layout configuration
#[derive(Debug, Clone, PartialEq)]
pub struct FlowchartConfig {
    pub direction: Direction,
    /// Minimum node width
    pub box_width: f64,
    /// Minimum node height
    pub box_height: f64,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
    /// Center offset under which two nodes count as aligned
    pub align_tolerance: f64,
    /// Distance connectors stop short of an outline
    pub gap: f64,
    /// Perpendicular offset of decision branch labels
    pub label_offset: f64,
    /// Node labels wrap beyond this many columns
    pub max_label_columns: usize,
    pub font_size: f64,
    /// `None` disables two-column packing
    pub packing: Option<PackingConfig>,
}

impl Default for FlowchartConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Vertical,
            box_width: 160.0,
            box_height: 70.0,
            horizontal_spacing: 80.0,
            vertical_spacing: 80.0,
            align_tolerance: DEFAULT_ALIGN_TOLERANCE,
            gap: DEFAULT_GAP,
            label_offset: 10.0,
            max_label_columns: 20,
            font_size: 20.0,
            packing: None,
        }
    }
}

impl FlowchartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_spacing(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_spacing = horizontal;
        self.vertical_spacing = vertical;
        self
    }

    pub fn with_box_size(mut self, width: f64, height: f64) -> Self {
        self.box_width = width;
        self.box_height = height;
        self
    }

    pub fn with_packing(mut self, packing: PackingConfig) -> Self {
        self.packing = Some(packing);
        self
    }
}

/// Ranks, feedback edges and column order of a flowchart graph
#[derive(Debug, Clone, PartialEq)]
pub struct RankAssignment {
    /// Node ids in creation order
    pub nodes: Vec<String>,
    /// Rank per node, by creation index
    pub ranks: Vec<usize>,
    /// `(from, to)` creation indices per edge, in declaration order
    pub edges: Vec<(usize, usize)>,
    /// Feedback flag per edge
    pub feedback: Vec<bool>,
    /// Creation indices in column discovery order
    pub order: Vec<usize>,
    /// True when no node was a source
    pub degenerate: bool,
}

impl RankAssignment {
    pub fn rank_of(&self, id: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n == id)
            .map(|index| self.ranks[index])
    }

    pub fn is_feedback(&self, edge_index: usize) -> bool {
        self.feedback.get(edge_index).copied().unwrap_or(false)
    }

    pub fn rank_count(&self) -> usize {
        self.ranks.iter().max().map(|r| r + 1).unwrap_or(0)
    }

    /// Creation indices per rank, each ordered by discovery
    pub fn rows(&self) -> Vec<Vec<usize>> {
        let mut rows = vec![Vec::new(); self.rank_count()];
        for &node in &self.order {
            rows[self.ranks[node]].push(node);
        }
        rows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Classify feedback edges and assign ranks
///
/// Fails with `DanglingReference` when an edge names an unknown node.
pub fn assign_ranks(database: &FlowchartDatabase) -> Result<RankAssignment> {
    let rank_span = span!(Level::DEBUG, "assign_ranks", node_count = database.node_count());
    let _enter = rank_span.enter();

    let nodes: Vec<&FlowNode> = database.nodes().collect();
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();

    let mut edges = Vec::with_capacity(database.edge_count());
    for edge in database.edges() {
        let context = format!("edge {} -> {}", edge.from, edge.to);
        let from = *index
            .get(edge.from.as_str())
            .ok_or_else(|| DiagramError::dangling("node", edge.from.clone(), context.clone()))?;
        let to = *index
            .get(edge.to.as_str())
            .ok_or_else(|| DiagramError::dangling("node", edge.to.clone(), context))?;
        edges.push((from, to));
    }

    let n = nodes.len();
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];
    for (e, &(from, to)) in edges.iter().enumerate() {
        outgoing[from].push(e);
        in_degree[to] += 1;
    }

    let sources: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let degenerate = n > 0 && sources.is_empty();
    if degenerate {
        let error = DiagramError::degenerate("every node has an incoming edge");
        warn!(%error, "Starting traversal from node creation order");
    }

    // Depth-first from the sources, then from anything left unvisited
    let mut mark = vec![Mark::Unvisited; n];
    let mut feedback = vec![false; edges.len()];
    for root in sources.iter().copied().chain(0..n) {
        if mark[root] != Mark::Unvisited {
            continue;
        }
        mark[root] = Mark::OnStack;
        let mut stack = vec![(root, 0usize)];
        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            if next < outgoing[node].len() {
                top.1 += 1;
                let e = outgoing[node][next];
                let target = edges[e].1;
                match mark[target] {
                    Mark::OnStack => {
                        trace!(edge = e, from = node, to = target, "Feedback edge");
                        feedback[e] = true;
                    }
                    Mark::Unvisited => {
                        mark[target] = Mark::OnStack;
                        stack.push((target, 0));
                    }
                    Mark::Done => {}
                }
            } else {
                mark[node] = Mark::Done;
                stack.pop();
            }
        }
    }

    // Longest path over the acyclic remainder, in Kahn order
    let mut remaining = vec![0usize; n];
    for (e, &(_, to)) in edges.iter().enumerate() {
        if !feedback[e] {
            remaining[to] += 1;
        }
    }
    let mut queue: VecDeque<usize> = (0..n).filter(|&i| remaining[i] == 0).collect();
    let mut ranks = vec![0usize; n];
    while let Some(node) = queue.pop_front() {
        for &e in &outgoing[node] {
            if feedback[e] {
                continue;
            }
            let target = edges[e].1;
            ranks[target] = ranks[target].max(ranks[node] + 1);
            remaining[target] -= 1;
            if remaining[target] == 0 {
                queue.push_back(target);
            }
        }
    }

    // Column order: breadth-first discovery over forward edges
    let starts: Vec<usize> = if sources.is_empty() {
        (0..n).collect()
    } else {
        sources.clone()
    };
    let mut discovered = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut bfs: VecDeque<usize> = VecDeque::new();
    for start in starts {
        if !discovered[start] {
            discovered[start] = true;
            bfs.push_back(start);
        }
    }
    while let Some(node) = bfs.pop_front() {
        order.push(node);
        for &e in &outgoing[node] {
            let target = edges[e].1;
            if !feedback[e] && !discovered[target] {
                discovered[target] = true;
                bfs.push_back(target);
            }
        }
    }
    for node in 0..n {
        if !discovered[node] {
            order.push(node);
        }
    }

    debug!(
        feedback_edges = feedback.iter().filter(|f| **f).count(),
        max_rank = ranks.iter().max().copied().unwrap_or(0),
        degenerate,
        "Assigned ranks"
    );

    Ok(RankAssignment {
        nodes: nodes.iter().map(|node| node.id.clone()).collect(),
        ranks,
        edges,
        feedback,
        order,
        degenerate,
    })
}

/// A run of consecutive ranks laid out around one cross-axis offset
#[derive(Debug, Clone, Copy)]
struct Band {
    first_rank: usize,
    end_rank: usize,
    axis: f64,
}

/// Connector channels of a placed chart, in flow-axis (main) and
/// cross-axis coordinates
///
/// Every band shares one row grid, so the spacing between rows is free
/// space across the whole chart. Each band also owns a lane just past its
/// far cross edge.
struct Channels<'a> {
    vertical: bool,
    bands: &'a [Band],
    band_of_rank: Vec<usize>,
    main_size: f64,
    main_pitch: f64,
    main_spacing: f64,
    cross_spacing: f64,
    far_edges: Vec<f64>,
    lanes_used: Vec<usize>,
    gap: f64,
}

impl Channels<'_> {
    fn point(&self, main: f64, cross: f64) -> Point {
        if self.vertical {
            Point::new(cross, main)
        } else {
            Point::new(main, cross)
        }
    }

    fn main_span(&self, rect: &Rect) -> (f64, f64) {
        if self.vertical {
            (rect.y, rect.bottom())
        } else {
            (rect.x, rect.right())
        }
    }

    fn cross_center(&self, rect: &Rect) -> f64 {
        let c = rect.center();
        if self.vertical {
            c.x
        } else {
            c.y
        }
    }

    fn row_start(&self, rank: usize) -> f64 {
        let band = &self.bands[self.band_of_rank[rank]];
        (rank - band.first_rank) as f64 * self.main_pitch
    }

    /// Middle of the spacing after a rank's row
    fn gap_after(&self, rank: usize) -> f64 {
        self.row_start(rank) + self.main_size + self.main_spacing / 2.0
    }

    /// Middle of the spacing before a rank's row
    fn gap_before(&self, rank: usize) -> f64 {
        self.row_start(rank) - self.main_spacing / 2.0
    }

    /// Next lane beside a band, staggered so parallel lanes stay apart
    fn next_lane(&mut self, band: usize) -> f64 {
        let step = self.lanes_used[band] % 3;
        self.lanes_used[band] += 1;
        self.far_edges[band] + self.cross_spacing * (0.5 + step as f64 / 8.0)
    }

    /// Leave the source's downstream side, follow the spacing after its row
    /// and enter the target from its upstream side
    ///
    /// Adjacent ranks of one band jog once in the spacing between them.
    /// Anything else travels up or down a lane beside the lower band, which
    /// lies outside every band.
    fn path(&mut self, from: (&Rect, usize), to: (&Rect, usize), adjacent: bool) -> Vec<Point> {
        let (from_rect, from_rank) = from;
        let (to_rect, to_rank) = to;
        let (cf, ct) = (self.cross_center(from_rect), self.cross_center(to_rect));
        let below = self.gap_after(from_rank);
        let above = self.gap_before(to_rank);
        let exit = self.point((self.main_span(from_rect).1 + self.gap).min(below), cf);
        let entry = self.point((self.main_span(to_rect).0 - self.gap).max(above), ct);

        if adjacent {
            return vec![exit, self.point(below, cf), self.point(below, ct), entry];
        }
        let band = self.band_of_rank[from_rank].min(self.band_of_rank[to_rank]);
        let lane = self.next_lane(band);
        vec![
            exit,
            self.point(below, cf),
            self.point(below, lane),
            self.point(above, lane),
            self.point(above, ct),
            entry,
        ]
    }
}

/// Flowchart layout algorithm implementation
#[derive(Debug, Clone, Default)]
pub struct FlowchartLayoutAlgorithm {
    config: FlowchartConfig,
}

impl FlowchartLayoutAlgorithm {
    pub fn new() -> Self {
        Self {
            config: FlowchartConfig::default(),
        }
    }

    pub fn with_config(config: FlowchartConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlowchartConfig {
        &self.config
    }

    fn node_label(&self, node: &FlowNode) -> String {
        text::wrap_for_box(&node.label, self.config.max_label_columns)
    }

    /// Calculate node dimensions based on kind and label
    fn node_size(&self, node: &FlowNode) -> (f64, f64) {
        let metrics = text::measure(&self.node_label(node), self.config.font_size);
        let (width, height) = match node.kind {
            NodeKind::Process => (metrics.width + 40.0, metrics.height + 30.0),
            NodeKind::Terminal => (metrics.width * 1.3 + 40.0, metrics.height + 30.0),
            // A diamond's inscribed box is half its width and height
            NodeKind::Decision => (metrics.width * 2.0 + 20.0, metrics.height * 2.0 + 20.0),
        };
        (width.max(self.config.box_width), height.max(self.config.box_height))
    }

    /// Width over height of a block with the given main/cross extents
    fn aspect(&self, main: f64, cross: f64) -> f64 {
        if self.config.direction.is_vertical() {
            cross / main.max(1.0)
        } else {
            main / cross.max(1.0)
        }
    }

    fn bands(&self, rows: &[Vec<usize>], main_pitch: f64, main_spacing: f64, cross_pitch: f64, cross_spacing: f64) -> Vec<Band> {
        let rank_count = rows.len();
        let widest = |range: std::ops::Range<usize>| {
            rows[range].iter().map(|row| row.len()).max().unwrap_or(0) as f64
        };
        let single = vec![Band {
            first_rank: 0,
            end_rank: rank_count,
            axis: 0.0,
        }];

        let Some(packing) = self.config.packing else {
            return single;
        };
        if rank_count < 2 {
            return single;
        }

        let unpacked = self.aspect(
            rank_count as f64 * main_pitch - main_spacing,
            widest(0..rank_count) * cross_pitch - cross_spacing,
        );

        let fold = rank_count.div_ceil(2);
        let first = widest(0..fold);
        let second = widest(fold..rank_count);
        let packed = self.aspect(
            fold as f64 * main_pitch - main_spacing,
            (first + second) * cross_pitch,
        );

        let target = packing.target_aspect;
        debug!(unpacked, packed, target, "Evaluating two-column packing");
        if (packed - target).abs() < (unpacked - target).abs() {
            let offset = (first + second) * cross_pitch / 2.0 + cross_spacing;
            vec![
                Band {
                    first_rank: 0,
                    end_rank: fold,
                    axis: 0.0,
                },
                Band {
                    first_rank: fold,
                    end_rank: rank_count,
                    axis: offset,
                },
            ]
        } else {
            single
        }
    }

    fn self_loop_side(&self) -> Side {
        if self.config.direction.is_vertical() {
            Side::Right
        } else {
            Side::Bottom
        }
    }
}

impl LayoutAlgorithm<FlowchartDatabase> for FlowchartLayoutAlgorithm {
    fn layout(&self, database: &FlowchartDatabase) -> Result<Layout> {
        let layout_span = span!(
            Level::INFO,
            "layout_flowchart",
            node_count = database.node_count(),
            edge_count = database.edge_count(),
            direction = %self.config.direction
        );
        let _enter = layout_span.enter();

        let mut layout = Layout::new(DiagramKind::Flowchart);
        let assignment = assign_ranks(database)?;
        if assignment.nodes.is_empty() {
            debug!("Empty database, returning empty layout");
            return Ok(layout);
        }

        let nodes: Vec<&FlowNode> = database.nodes().collect();
        let sizes: Vec<(f64, f64)> = nodes.iter().map(|node| self.node_size(node)).collect();
        let max_width = sizes.iter().map(|s| s.0).fold(0.0, f64::max);
        let max_height = sizes.iter().map(|s| s.1).fold(0.0, f64::max);

        let vertical = self.config.direction.is_vertical();
        let (main_size, main_spacing, cross_spacing) = if vertical {
            (max_height, self.config.vertical_spacing, self.config.horizontal_spacing)
        } else {
            (max_width, self.config.horizontal_spacing, self.config.vertical_spacing)
        };
        let cross_size = if vertical { max_width } else { max_height };
        let main_pitch = main_size + main_spacing;
        let cross_pitch = cross_size + cross_spacing;

        let rows = assignment.rows();
        let bands = self.bands(&rows, main_pitch, main_spacing, cross_pitch, cross_spacing);
        debug!(ranks = rows.len(), bands = bands.len(), "Placing ranks");

        let mut rects = vec![Rect::default(); nodes.len()];
        for band in &bands {
            for rank in band.first_rank..band.end_rank {
                let row = &rows[rank];
                let main = (rank - band.first_rank) as f64 * main_pitch + main_size / 2.0;
                let centre_offset = (row.len() as f64 - 1.0) / 2.0;
                for (column, &node) in row.iter().enumerate() {
                    let cross = band.axis + (column as f64 - centre_offset) * cross_pitch;
                    let center = if vertical {
                        Point::new(cross, main)
                    } else {
                        Point::new(main, cross)
                    };
                    let (width, height) = sizes[node];
                    rects[node] = Rect::centered(center, width, height);
                    trace!(node = %nodes[node].id, rank, column, "Placed node");
                }
            }
        }

        for (index, node) in nodes.iter().enumerate() {
            let mut style = ShapeStyle::colored(Some(node.effective_color()));
            if node.kind == NodeKind::Process {
                style = style.rounded();
            }
            layout.push_shape(
                LayoutShape::new(node.id.clone(), node.kind.shape(), rects[index])
                    .with_label(self.node_label(node))
                    .with_style(style),
            );
        }

        let mut band_of_rank = vec![0; rows.len()];
        let mut far_edges = vec![f64::NEG_INFINITY; bands.len()];
        for (b, band) in bands.iter().enumerate() {
            for rank in band.first_rank..band.end_rank {
                band_of_rank[rank] = b;
                for &node in &rows[rank] {
                    let far = if vertical { rects[node].right() } else { rects[node].bottom() };
                    far_edges[b] = far_edges[b].max(far);
                }
            }
        }
        let mut channels = Channels {
            vertical,
            bands: &bands,
            band_of_rank,
            main_size,
            main_pitch,
            main_spacing,
            cross_spacing,
            lanes_used: vec![0; far_edges.len()],
            far_edges,
            gap: self.config.gap,
        };

        for (e, edge) in database.edges().enumerate() {
            let (from, to) = assignment.edges[e];
            let (from_rect, to_rect) = (&rects[from], &rects[to]);
            let (from_rank, to_rank) = (assignment.ranks[from], assignment.ranks[to]);
            let adjacent = !assignment.is_feedback(e)
                && to_rank == from_rank + 1
                && channels.band_of_rank[from_rank] == channels.band_of_rank[to_rank];
            let aligned = (channels.cross_center(from_rect) - channels.cross_center(to_rect)).abs()
                <= self.config.align_tolerance;

            let points = if from == to {
                geometry::self_loop(from_rect, self.self_loop_side(), self.config.gap)?
            } else if adjacent && aligned {
                geometry::route(
                    (nodes[from].kind.shape(), from_rect),
                    (nodes[to].kind.shape(), to_rect),
                    self.config.align_tolerance,
                    self.config.gap,
                )?
            } else {
                channels.path((from_rect, from_rank), (to_rect, to_rank), adjacent)
            };
            trace!(edge = e, points = points.len(), "Routed edge");

            let mut connector = LayoutConnector::arrow(
                format!("edge{}:{}->{}", e, edge.from, edge.to),
                edge.from.clone(),
                edge.to.clone(),
                points,
            )
            .with_stroke(edge.stroke_style);
            if let Some(label) = &edge.label {
                let placement = if nodes[from].kind == NodeKind::Decision {
                    LabelPlacement::Offset(self.config.label_offset)
                } else {
                    LabelPlacement::Bound
                };
                connector = connector.with_label(label.clone(), placement);
            }
            layout.push_connector(connector);
        }

        info!(
            ranks = rows.len(),
            packed = bands.len() > 1,
            degenerate = assignment.degenerate,
            "Flowchart layout completed"
        );
        Ok(layout)
    }

    fn name(&self) -> &'static str {
        "ranked"
    }
}
