//! Text-to-diagram generator
//!
//! Splits a description into elements and builds the matching diagram with
//! the builders' own APIs. A builder that fails to lay out is replaced by a
//! freeform diagram of the same elements.

use regex::Regex;
use std::sync::LazyLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, span, warn, Level};

use super::architecture::ArchitectureDiagram;
use super::er::ErDiagram;
use super::flowchart::Flowchart;
use super::freeform::{FreeformDiagram, ShapeHandle};
use super::mindmap::MindMap;
use super::sequence::SequenceDiagram;
use super::timeline::TimelineDiagram;
use crate::core::{ColorName, Diagram, DiagramKind, Result};

const COLORS: &[ColorName] = &[
    ColorName::Blue,
    ColorName::Green,
    ColorName::Orange,
    ColorName::Red,
    ColorName::Purple,
    ColorName::Cyan,
    ColorName::Yellow,
];

const DECISION_WORDS: &[&str] = &["check", "if", "validate", "verify", "decision", "?"];

const MILESTONE_WORDS: &[&str] = &["milestone", "launch", "release", "completion"];

const ENTITY_ATTRIBUTES: &[&str] = &["id", "name", "created_at"];

/// A directed link between two elements, matched by element text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Classified text broken into diagram elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub diagram_type: DiagramKind,
    pub confidence: f64,
    pub reasoning: String,
    pub elements: Vec<String>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Analysis {
    /// Classify the text, unless a type is forced, and split it into elements
    pub fn from_text(text: &str, forced: Option<DiagramKind>) -> Self {
        let (diagram_type, confidence, reasoning) = match forced {
            Some(kind) => (kind, 1.0, format!("Forced diagram type: {}", kind.as_str())),
            None => {
                let classification = super::router::classify(text);
                (
                    classification.diagram_type,
                    classification.confidence,
                    classification.reasoning,
                )
            }
        };
        Self {
            diagram_type,
            confidence,
            reasoning,
            elements: split_elements(text),
            connections: Vec::new(),
        }
    }
}

static SEPARATOR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)[,;\n]|\bthen\b").ok());

/// Split on commas, semicolons, newlines and the word "then"
pub fn split_elements(text: &str) -> Vec<String> {
    let Some(separator) = SEPARATOR.as_ref() else {
        return vec![text.trim().to_string()];
    };
    separator
        .split(text)
        .map(|part| part.trim())
        .map(|part| part.strip_prefix("and ").unwrap_or(part).trim())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// A built diagram and the kind that was actually used
pub struct Generated {
    pub kind: DiagramKind,
    pub diagram: Box<dyn Diagram>,
}

/// Build the analysed diagram, falling back to freeform when it fails
pub fn generate(analysis: &Analysis) -> Generated {
    let generate_span = span!(
        Level::INFO,
        "generate",
        diagram_type = %analysis.diagram_type,
        elements = analysis.elements.len()
    );
    let _enter = generate_span.enter();

    let built = build(analysis.diagram_type, &analysis.elements, &analysis.connections)
        .and_then(|diagram| diagram.layout().map(|_| diagram));
    match built {
        Ok(diagram) => {
            info!(kind = %analysis.diagram_type, "Diagram generated");
            Generated {
                kind: analysis.diagram_type,
                diagram,
            }
        }
        Err(err) => {
            warn!(kind = %analysis.diagram_type, error = %err, "Falling back to simple diagram");
            Generated {
                kind: DiagramKind::Freeform,
                diagram: Box::new(freeform(&analysis.elements, &analysis.connections)),
            }
        }
    }
}

/// Build a diagram of the given kind from elements
pub fn build(kind: DiagramKind, elements: &[String], connections: &[Connection]) -> Result<Box<dyn Diagram>> {
    debug!(%kind, elements = elements.len(), connections = connections.len(), "Building diagram");
    let diagram: Box<dyn Diagram> = match kind {
        DiagramKind::Flowchart => Box::new(flowchart(elements, connections)),
        DiagramKind::Architecture => Box::new(architecture(elements, connections)),
        DiagramKind::Sequence => Box::new(sequence(elements, connections)?),
        DiagramKind::MindMap => Box::new(mindmap(elements)?),
        DiagramKind::Timeline => Box::new(timeline(elements)),
        DiagramKind::Er => Box::new(er(elements, connections)?),
        DiagramKind::Freeform => Box::new(freeform(elements, connections)),
    };
    Ok(diagram)
}

fn color(index: usize) -> ColorName {
    COLORS[index % COLORS.len()]
}

fn slug(element: &str) -> String {
    element.to_lowercase().replace(' ', "_")
}

/// Capitalize the first letter of every word
fn title_case(element: &str) -> String {
    let mut out = String::with_capacity(element.len());
    let mut at_word_start = true;
    for ch in element.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

fn lookup<'a>(ids: &'a [(String, String)], element: &str) -> Option<&'a str> {
    ids.iter()
        .find(|(text, _)| text == element)
        .map(|(_, id)| id.as_str())
}

fn flowchart(elements: &[String], connections: &[Connection]) -> Flowchart {
    let mut chart = Flowchart::new();
    chart.start("Start");

    if elements.is_empty() {
        chart.process("main", "Main Process").end("End");
        chart.connect("__start__", "main");
        chart.connect("main", "__end__");
        return chart;
    }

    let mut previous = "__start__".to_string();
    for (i, element) in elements.iter().enumerate() {
        let clean = element.trim().trim_end_matches(['.', '!', '?']);
        let lowered = clean.to_lowercase();
        if DECISION_WORDS.iter().any(|w| lowered.contains(w)) {
            let id = format!("decision_{}", i);
            chart.decision(id.clone(), clean);
            chart.connect(previous, id.clone());

            let branch = connections
                .iter()
                .find(|c| !c.from.is_empty() && lowered.contains(&c.from.to_lowercase()));
            let (next, label) = match branch {
                Some(c) => (format!("process_{}_yes", i), c.to.clone()),
                None => (format!("process_{}_continue", i), "Continue".to_string()),
            };
            chart.process(next.clone(), label);
            chart.connect(id, next.clone()).label("yes");
            previous = next;
        } else {
            let id = format!("process_{}", i);
            chart.process(id.clone(), clean);
            chart.connect(previous, id.clone());
            previous = id;
        }
    }

    chart.end("End");
    chart.connect(previous, "__end__");
    chart
}

fn architecture(elements: &[String], connections: &[Connection]) -> ArchitectureDiagram {
    let mut arch = ArchitectureDiagram::new();
    if elements.is_empty() {
        arch.component("frontend", "Frontend", 100.0, 100.0, ColorName::Blue)
            .component("backend", "Backend", 400.0, 100.0, ColorName::Green)
            .component("database", "Database", 700.0, 100.0, ColorName::Orange)
            .connect("frontend", "backend", "API")
            .connect("backend", "database", "SQL");
        return arch;
    }

    let columns = elements.len().min(4);
    let mut ids = Vec::with_capacity(elements.len());
    for (i, element) in elements.iter().enumerate() {
        let id = slug(element);
        let x = 150.0 + (i % columns) as f64 * 200.0;
        let y = 100.0 + (i / columns) as f64 * 150.0;
        arch.component(id.clone(), title_case(element), x, y, color(i));
        ids.push((element.clone(), id));
    }

    for connection in connections {
        if let (Some(from), Some(to)) = (lookup(&ids, &connection.from), lookup(&ids, &connection.to)) {
            arch.connect(from, to, connection.label.clone().unwrap_or_default());
        }
    }
    arch
}

fn sequence(elements: &[String], connections: &[Connection]) -> Result<SequenceDiagram> {
    let mut seq = SequenceDiagram::new();
    if elements.is_empty() {
        seq.participant("user", "User", ColorName::Blue)
            .participant("server", "Server", ColorName::Green);
        seq.message("user", "server", "Request")?;
        seq.message("server", "user", "Response")?;
        return Ok(seq);
    }

    let mut ids = Vec::with_capacity(elements.len());
    for (i, element) in elements.iter().enumerate() {
        let id = slug(element);
        seq.participant(id.clone(), title_case(element), COLORS[i % 5]);
        ids.push((element.clone(), id));
    }

    if connections.is_empty() {
        for (step, pair) in ids.windows(2).enumerate() {
            seq.message(pair[0].1.clone(), pair[1].1.clone(), format!("Step {}", step + 1))?;
        }
    } else {
        for connection in connections {
            if let (Some(from), Some(to)) = (lookup(&ids, &connection.from), lookup(&ids, &connection.to)) {
                let label = connection.label.clone().unwrap_or_else(|| "Message".to_string());
                seq.message(from, to, label)?;
            }
        }
    }
    Ok(seq)
}

fn mindmap(elements: &[String]) -> Result<MindMap> {
    use super::mindmap::TopicId;

    let mut map = MindMap::new();
    let Some((central, branches)) = elements.split_first() else {
        map.central("Central Concept", ColorName::Blue);
        map.branch(TopicId::CENTRAL, "Branch 1", ColorName::Green)?;
        map.branch(TopicId::CENTRAL, "Branch 2", ColorName::Orange)?;
        return Ok(map);
    };

    map.central(central.clone(), ColorName::Blue);
    for (i, element) in branches.iter().enumerate() {
        // The cycle starts after the central topic's blue
        map.branch(TopicId::CENTRAL, element.clone(), COLORS[1 + i % (COLORS.len() - 1)])?;
    }
    Ok(map)
}

fn timeline(elements: &[String]) -> TimelineDiagram {
    let mut timeline = TimelineDiagram::new();
    if elements.is_empty() {
        timeline.event("2020", "Start", "Beginning", ColorName::Blue);
        timeline.milestone("2021", "Milestone", ColorName::Red);
        timeline.event("2022", "Progress", "Continue", ColorName::Green);
        timeline.event("2023", "Current", "Today", ColorName::Orange);
        return timeline;
    }

    for (i, element) in elements.iter().enumerate() {
        let color = COLORS[i % 5];
        match element.split_once(':') {
            Some((date, event)) => {
                let (date, event) = (date.trim(), event.trim());
                let lowered = event.to_lowercase();
                if MILESTONE_WORDS.iter().any(|w| lowered.contains(w)) {
                    timeline.milestone(date, event, ColorName::Red);
                } else {
                    timeline.event(date, event, "", color);
                }
            }
            None => {
                timeline.event(format!("Step {}", i + 1), element.clone(), "", color);
            }
        }
    }
    timeline
}

fn er(elements: &[String], connections: &[Connection]) -> Result<ErDiagram> {
    let mut diagram = ErDiagram::new();
    if elements.is_empty() {
        diagram
            .entity("user", "User", ["id", "name", "email"], ColorName::Blue)
            .entity("order", "Order", ["id", "user_id", "total"], ColorName::Green);
        diagram.relationship("user", "order", "has", "1:N")?;
        return Ok(diagram);
    }

    let mut ids = Vec::with_capacity(elements.len());
    for (i, element) in elements.iter().enumerate() {
        let id = slug(element);
        diagram.entity(id.clone(), title_case(element), ENTITY_ATTRIBUTES.iter().copied(), COLORS[i % 5]);
        ids.push((element.clone(), id));
    }

    for connection in connections {
        if let (Some(from), Some(to)) = (lookup(&ids, &connection.from), lookup(&ids, &connection.to)) {
            let label = connection.label.clone().unwrap_or_else(|| "related to".to_string());
            diagram.relationship(from, to, label, "1:N")?;
        }
    }
    Ok(diagram)
}

fn freeform(elements: &[String], connections: &[Connection]) -> FreeformDiagram {
    let mut diagram = FreeformDiagram::new();
    if elements.is_empty() {
        let a = diagram.rectangle(100.0, 100.0, "Item 1", ColorName::Blue);
        let b = diagram.rectangle(300.0, 100.0, "Item 2", ColorName::Green);
        diagram.arrow_between(a, b, "connection");
        return diagram;
    }

    let mut handles: Vec<(String, ShapeHandle)> = Vec::with_capacity(elements.len());
    for (i, element) in elements.iter().enumerate() {
        let (x, y) = if elements.len() <= 4 {
            (100.0 + i as f64 * 200.0, 150.0)
        } else {
            (100.0 + (i % 3) as f64 * 200.0, 100.0 + (i / 3) as f64 * 120.0)
        };
        let handle = diagram.rectangle(x, y, element.clone(), color(i));
        handles.push((element.clone(), handle));
    }

    let find = |element: &str| handles.iter().find(|(text, _)| text == element).map(|(_, h)| *h);
    if connections.is_empty() {
        for pair in handles.windows(2) {
            diagram.arrow_between(pair[0].1, pair[1].1, "");
        }
    } else {
        for connection in connections {
            if let (Some(from), Some(to)) = (find(&connection.from), find(&connection.to)) {
                diagram.arrow_between(from, to, connection.label.clone().unwrap_or_default());
            }
        }
    }
    diagram
}
