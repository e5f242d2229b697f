//! Rank assignment and layout properties over generated graphs

use chalkline::core::{
    Database, Diagram, Direction, Layout, LayoutAlgorithm, Point, Rect, SceneConfig, SceneDocument,
};
use chalkline::plugins::flowchart::{
    assign_ranks, FlowEdge, FlowNode, FlowchartConfig, FlowchartDatabase,
    FlowchartLayoutAlgorithm, NodeKind, PackingConfig,
};
use chalkline::prelude::Flowchart;
use proptest::prelude::*;

fn graph(node_count: usize, edges: &[(usize, usize)]) -> FlowchartDatabase {
    let mut db = FlowchartDatabase::new();
    for i in 0..node_count {
        let kind = if i % 3 == 2 {
            NodeKind::Decision
        } else {
            NodeKind::Process
        };
        db.add_node(FlowNode::new(format!("n{}", i), format!("Step {}", i), kind))
            .unwrap();
    }
    for &(from, to) in edges {
        db.add_edge(FlowEdge::new(
            format!("n{}", from % node_count),
            format!("n{}", to % node_count),
        ))
        .unwrap();
    }
    db
}

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..12).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..24)))
}

/// Whether the segment enters the interior of the rectangle
fn segment_enters(a: Point, b: Point, rect: &Rect) -> bool {
    let inset = 0.5;
    let (left, right) = (rect.x + inset, rect.right() - inset);
    let (top, bottom) = (rect.y + inset, rect.bottom() - inset);
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for (p, q) in [
        (-dx, a.x - left),
        (dx, right - a.x),
        (-dy, a.y - top),
        (dy, bottom - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return false;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
        }
    }
    t0 < t1
}

/// Connector and shape keys for every connector segment that passes through
/// a shape other than its own endpoints
fn crossings(layout: &Layout) -> Vec<(String, String)> {
    let mut found = Vec::new();
    for connector in &layout.connectors {
        for shape in &layout.shapes {
            let own = connector.from.as_deref() == Some(shape.key.as_str())
                || connector.to.as_deref() == Some(shape.key.as_str());
            if own {
                continue;
            }
            let hit = connector
                .points
                .windows(2)
                .any(|pair| segment_enters(pair[0], pair[1], &shape.rect));
            if hit {
                found.push((connector.key.clone(), shape.key.clone()));
            }
        }
    }
    found
}

proptest! {
    #[test]
    fn forward_edges_increase_rank((n, edges) in graph_strategy()) {
        let db = graph(n, &edges);
        let ranks = assign_ranks(&db).unwrap();
        for (index, &(from, to)) in ranks.edges.iter().enumerate() {
            if !ranks.is_feedback(index) {
                prop_assert!(ranks.ranks[to] > ranks.ranks[from]);
            }
        }
        prop_assert_eq!(ranks.ranks.len(), n);
        prop_assert_eq!(ranks.order.len(), n);
    }

    #[test]
    fn self_edges_are_feedback((n, edges) in graph_strategy()) {
        let db = graph(n, &edges);
        let ranks = assign_ranks(&db).unwrap();
        for (index, &(from, to)) in ranks.edges.iter().enumerate() {
            if from == to {
                prop_assert!(ranks.is_feedback(index));
            }
        }
    }

    #[test]
    fn layouts_emit_valid_documents((n, edges) in graph_strategy(), packed in any::<bool>()) {
        let db = graph(n, &edges);
        let mut config = FlowchartConfig::default();
        if packed {
            config = config.with_packing(PackingConfig::default());
        }
        let layout = FlowchartLayoutAlgorithm::with_config(config).layout(&db).unwrap();
        prop_assert_eq!(layout.shapes.len(), n);
        prop_assert!(layout.shapes.iter().all(|s| s.rect.width > 0.0 && s.rect.height > 0.0));

        let document = SceneDocument::from_layout(&layout, &SceneConfig::default()).unwrap();
        prop_assert!(document.validate().is_ok());
    }

    #[test]
    fn connectors_go_around_other_nodes(
        (n, edges) in graph_strategy(),
        packed in any::<bool>(),
        horizontal in any::<bool>(),
    ) {
        let db = graph(n, &edges);
        let mut config = FlowchartConfig::default();
        if packed {
            config = config.with_packing(PackingConfig::default());
        }
        if horizontal {
            config = config.with_direction(Direction::Horizontal);
        }
        let layout = FlowchartLayoutAlgorithm::with_config(config).layout(&db).unwrap();
        prop_assert_eq!(crossings(&layout), Vec::<(String, String)>::new());
        for connector in &layout.connectors {
            for pair in connector.points.windows(2) {
                prop_assert!(pair[0].x == pair[1].x || pair[0].y == pair[1].y);
            }
        }
    }
}

#[test]
fn test_packed_chain_routes_around_nodes() {
    let ids = ["s1", "s2", "s3", "s4", "s5", "s6", "s7", "s8"];
    let mut db = FlowchartDatabase::new();
    for id in ids {
        db.add_node(FlowNode::new(id, id, NodeKind::Process)).unwrap();
    }
    for pair in ids.windows(2) {
        db.add_edge(FlowEdge::new(pair[0], pair[1])).unwrap();
    }
    db.add_edge(FlowEdge::new("s7", "s2")).unwrap();

    let config = FlowchartConfig::default().with_packing(PackingConfig::default());
    let layout = FlowchartLayoutAlgorithm::with_config(config).layout(&db).unwrap();
    assert_eq!(
        layout.shape("s1").unwrap().rect.y,
        layout.shape("s5").unwrap().rect.y
    );
    assert_eq!(crossings(&layout), Vec::<(String, String)>::new());
}

#[test]
fn test_crossing_check_sees_through_routes() {
    let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    assert!(segment_enters(Point::new(50.0, -20.0), Point::new(50.0, 80.0), &rect));
    assert!(!segment_enters(Point::new(-10.0, -20.0), Point::new(-10.0, 80.0), &rect));
    assert!(!segment_enters(Point::new(0.0, -20.0), Point::new(0.0, 80.0), &rect));
}

#[test]
fn test_longest_path_wins() {
    let db = graph(4, &[(0, 1), (1, 2), (2, 3), (0, 3)]);
    let ranks = assign_ranks(&db).unwrap();
    assert_eq!(ranks.ranks, vec![0, 1, 2, 3]);
    assert!(!ranks.feedback.iter().any(|f| *f));
}

#[test]
fn test_disjoint_components_start_from_each_source() {
    let db = graph(4, &[(0, 1), (2, 3)]);
    let ranks = assign_ranks(&db).unwrap();
    assert_eq!(ranks.ranks, vec![0, 1, 0, 1]);
    assert_eq!(ranks.rows(), vec![vec![0, 2], vec![1, 3]]);
}

#[test]
fn test_cycle_without_source_still_lays_out() {
    let db = graph(3, &[(0, 1), (1, 2), (2, 0)]);
    let ranks = assign_ranks(&db).unwrap();
    assert!(ranks.degenerate);
    assert_eq!(ranks.feedback.iter().filter(|f| **f).count(), 1);
    assert!(FlowchartLayoutAlgorithm::new().layout(&db).is_ok());
}

#[test]
fn test_saving_twice_gives_identical_positions() {
    let mut chart = Flowchart::new();
    chart.start("Start").process("a", "A").decision("b", "B?").end("End");
    chart.connect("__start__", "a");
    chart.connect("a", "b");
    chart.connect("b", "__end__").label("yes");
    chart.connect("b", "a").label("no");

    let dir = tempfile::tempdir().unwrap();
    let first = SceneDocument::load(chart.save(&dir.path().join("one.excalidraw")).unwrap()).unwrap();
    let second = SceneDocument::load(chart.save(&dir.path().join("two.excalidraw")).unwrap()).unwrap();
    let positions = |d: &SceneDocument| {
        d.elements
            .iter()
            .map(|e| (e.id.clone(), e.x, e.y, e.width, e.height))
            .collect::<Vec<_>>()
    };
    assert_eq!(positions(&first), positions(&second));
}
