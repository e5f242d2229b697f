//! Integration tests for the public API

use chalkline::plugins::flowchart::{END_ID, START_ID};
use chalkline::prelude::*;

fn login_flow() -> Flowchart {
    let mut chart = Flowchart::new();
    chart
        .start("Start")
        .decision("check", "Logged in?")
        .process("dashboard", "Show dashboard")
        .process("login", "Show login")
        .process("creds", "Enter credentials")
        .process("error", "Show error")
        .end("End");
    chart.connect(START_ID, "check");
    chart.connect("check", "dashboard").label("Yes");
    chart.connect("check", "login").label("No");
    chart.connect("login", "creds");
    chart.connect("creds", END_ID);
    chart.connect("creds", "error");
    chart.connect("error", "creds").label("Retry");
    chart
}

#[test]
fn test_login_flow_ranks() {
    let chart = login_flow();
    let ranks = chart.ranks().unwrap();
    assert_eq!(ranks.rank_of("dashboard"), ranks.rank_of("login"));
    assert_eq!(ranks.rank_of("creds"), Some(3));
    assert!(ranks.is_feedback(6));

    let layout = chart.layout().unwrap();
    let dashboard = layout.shape("dashboard").unwrap().rect;
    let login = layout.shape("login").unwrap().rect;
    assert_eq!(dashboard.center().y, login.center().y);
    assert!(dashboard.center().x != login.center().x);
}

#[test]
fn test_flowchart_document_is_valid() {
    let document = login_flow().to_document(&SceneConfig::default()).unwrap();
    assert_eq!(document.doc_type, "excalidraw");
    assert_eq!(document.shapes().count(), 7);
    assert!(document.shape_labelled("Logged in?").is_some());
    document.validate().unwrap();
}

#[test]
fn test_auto_layout_chart_saves() {
    let mut chart = Flowchart::auto_layout();
    chart.start("Start");
    let steps = ["a", "b", "c", "d", "e", "f", "g", "h"];
    for step in steps {
        chart.process(step, step.to_uppercase());
    }
    chart.end("End");
    chart.connect(START_ID, "a");
    for pair in steps.windows(2) {
        chart.connect(pair[0], pair[1]);
    }
    chart.connect("h", END_ID);

    let dir = tempfile::tempdir().unwrap();
    let path = chart.save(&dir.path().join("long.excalidraw")).unwrap();
    let document = SceneDocument::load(&path).unwrap();
    document.validate().unwrap();
    assert_eq!(document.shapes().count(), 10);
}

#[test]
fn test_er_user_taller_than_tag() {
    let mut diagram = ErDiagram::new();
    diagram
        .entity(
            "user",
            "User",
            ["id", "email", "name", "created_at", "role"],
            ColorName::Blue,
        )
        .entity("tag", "Tag", ["id", "label"], ColorName::Green);
    diagram.relationship("user", "tag", "follows", "N:M").unwrap();

    let layout = diagram.layout().unwrap();
    let user = layout.shape("user").unwrap().rect;
    let tag = layout.shape("tag").unwrap().rect;
    assert!(user.height > tag.height);
    diagram.to_document(&SceneConfig::default()).unwrap();
}

#[test]
fn test_timeline_positions_increase() {
    let mut timeline = TimelineDiagram::new();
    timeline.title("Company history");
    timeline.event("2008", "Founded", "", ColorName::Blue);
    timeline.event("2009", "Seed round", "", ColorName::Green);
    timeline.event("2010", "Launch", "", ColorName::Orange);

    let layout = timeline.layout().unwrap();
    let xs: Vec<f64> = (0..3)
        .map(|i| layout.shape(&format!("marker{}", i)).unwrap().rect.center().x)
        .collect();
    assert!(xs.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn test_sequence_messages_in_order() {
    let mut diagram = SequenceDiagram::new();
    diagram
        .participant("client", "Client", ColorName::Blue)
        .participant("server", "Server", ColorName::Green);
    let first = diagram.message("client", "server", "GET /").unwrap();
    let second = diagram.reply("server", "client", "200 OK").unwrap();
    let own = diagram.message("server", "server", "log").unwrap();
    assert!(first < second && second < own);
    diagram
        .note("server", "cached", NoteSide::Right, second)
        .unwrap();

    let document = diagram.to_document(&SceneConfig::default()).unwrap();
    assert!(document.connectors().count() >= 3);
}

#[test]
fn test_mindmap_styles_all_lay_out() {
    for style in [MindMapStyle::Radial, MindMapStyle::Alternating] {
        let mut map = MindMap::new();
        map.style(style).central("Rust", ColorName::Orange);
        let traits = map.branch(TopicId::CENTRAL, "Traits", ColorName::Green).unwrap();
        map.leaf(traits, "Send").unwrap();
        map.leaf(traits, "Sync").unwrap();
        map.branch(TopicId::CENTRAL, "Ownership", ColorName::Blue).unwrap();

        let document = map.to_document(&SceneConfig::default()).unwrap();
        assert_eq!(document.shapes().count(), 5);
    }
}

#[test]
fn test_architecture_with_boundary() {
    let mut diagram = ArchitectureDiagram::new();
    diagram
        .component("web", "Web App", 100.0, 100.0, ColorName::Blue)
        .component("api", "API", 400.0, 100.0, ColorName::Green)
        .component("db", "Postgres", 400.0, 300.0, ColorName::Purple)
        .connect("web", "api", "HTTPS")
        .connect("api", "db", "SQL")
        .boundary("Backend", ["api", "db"], ColorName::Gray);

    let document = diagram.to_document(&SceneConfig::default()).unwrap();
    assert_eq!(document.connectors().count(), 2);
    assert!(document.shape_labelled("Postgres").is_some());
}

#[test]
fn test_freeform_round_trip_through_disk() {
    let mut diagram = FreeformDiagram::new();
    let a = diagram.rectangle(100.0, 100.0, "Item 1", ColorName::Blue);
    let b = diagram.ellipse(350.0, 100.0, "Item 2", ColorName::Green);
    diagram.arrow_between(a, b, "connection");

    let dir = tempfile::tempdir().unwrap();
    let path = diagram.save(&dir.path().join("free.excalidraw")).unwrap();
    let loaded = SceneDocument::load(&path).unwrap();
    let emitted = diagram.to_document(&SceneConfig::default()).unwrap();
    let ids = |d: &SceneDocument| d.elements.iter().map(|e| e.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&loaded), ids(&emitted));
    loaded.validate().unwrap();
}

#[test]
fn test_classify_and_generate() {
    let classification = chalkline::classify("User has many Orders, Order belongs to User");
    assert_eq!(classification.diagram_type, DiagramKind::Er);

    let analysis = Analysis::from_text("Frontend, API gateway, Database", Some(DiagramKind::Architecture));
    assert_eq!(analysis.confidence, 1.0);
    let generated = generate(&analysis);
    assert_eq!(generated.kind, DiagramKind::Architecture);
    assert!(generated.diagram.to_document(&SceneConfig::default()).is_ok());
}

#[test]
fn test_generate_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.excalidraw");
    let (analysis, written) =
        chalkline::generate_to_file("2008: founded, 2012: IPO, 2020: acquired", None, &path).unwrap();
    assert_eq!(analysis.diagram_type, DiagramKind::Timeline);
    assert_eq!(written, path);
    SceneDocument::load(&written).unwrap().validate().unwrap();
}

#[test]
fn test_every_kind_builds_from_elements() {
    let elements = ["Alpha", "Beta", "Gamma", "Delta"];
    for kind in DiagramKind::all() {
        let analysis = Analysis {
            diagram_type: *kind,
            confidence: 1.0,
            reasoning: String::new(),
            elements: elements.iter().map(|e| e.to_string()).collect(),
            connections: Vec::new(),
        };
        let generated = generate(&analysis);
        assert_eq!(generated.kind, *kind, "{} fell back", kind);
        generated
            .diagram
            .to_document(&SceneConfig::default())
            .unwrap()
            .validate()
            .unwrap();
    }
}
