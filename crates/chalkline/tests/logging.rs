//! Logging configuration and the events emitted while building diagrams

use std::io;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chalkline::core::logging::{build_filter, init_logging, resolve_format, resolve_level, LogFormat};
use chalkline::plugins::flowchart::{FlowEdge, FlowNode, FlowchartDatabase, NodeKind};
use chalkline::plugins::FlowchartLayoutAlgorithm;
use chalkline::prelude::*;
use tracing::level_filters::LevelFilter;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

/// Run `f` with a trace-level subscriber writing into the returned buffer
fn captured<F: FnOnce()>(f: F) -> String {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    capture.contents()
}

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
    assert_eq!(LogFormat::from_str("Pretty").unwrap(), LogFormat::Pretty);
    assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
    assert!(LogFormat::from_str("yaml").is_err());
}

#[test]
fn test_explicit_settings_take_precedence() {
    assert_eq!(resolve_level(Some("trace")), "trace");
    assert_eq!(resolve_format(Some("pretty")).unwrap(), LogFormat::Pretty);
}

#[test]
fn test_filter_directives() {
    assert_eq!(build_filter("off").max_level_hint(), Some(LevelFilter::OFF));
    assert_eq!(build_filter("debug").max_level_hint(), Some(LevelFilter::DEBUG));
    assert_eq!(
        build_filter("warn,chalkline::plugins::flowchart=trace").max_level_hint(),
        Some(LevelFilter::TRACE)
    );
}

#[test]
fn test_init_logging_rejects_unknown_format() {
    assert!(init_logging(Some("info"), Some("xml")).is_err());
}

#[test]
fn test_layout_and_emission_are_traced() {
    let output = captured(|| {
        let mut chart = Flowchart::new();
        chart.start("Start").process("a", "Work").end("End");
        chart.connect("__start__", "a");
        chart.connect("a", "__end__");
        chart.to_document(&SceneConfig::default()).unwrap();
    });
    assert!(output.contains("layout_flowchart"));
    assert!(output.contains("emit_scene"));
    assert!(output.contains("Assigned ranks"));
}

#[test]
fn test_degenerate_layout_warns() {
    let output = captured(|| {
        let mut db = FlowchartDatabase::new();
        for id in ["a", "b"] {
            db.add_node(FlowNode::new(id, id, NodeKind::Process)).unwrap();
        }
        db.add_edge(FlowEdge::new("a", "b")).unwrap();
        db.add_edge(FlowEdge::new("b", "a")).unwrap();
        assert!(FlowchartLayoutAlgorithm::new().layout(&db).is_ok());
    });
    assert!(output.contains("WARN"));
    assert!(output.contains("every node has an incoming edge"));
}

#[test]
fn test_classification_is_logged() {
    let output = captured(|| {
        Router::new().classify("2008: founded, 2012: IPO");
    });
    assert!(output.contains("classify"));
    assert!(output.contains("Classified text"));
}
