//! Delivery of written scenes: validation, rasterization, vault copies and cleanup

use std::fs;
use std::path::{Path, PathBuf};

use chalkline::export::{Delivery, DeliveryRequest, Rasterizer};
use chalkline::prelude::*;
use tempfile::TempDir;

fn write_scene(dir: &Path, name: &str) -> PathBuf {
    let mut diagram = FreeformDiagram::new();
    let a = diagram.rectangle(0.0, 0.0, "A", ColorName::Blue);
    let b = diagram.rectangle(300.0, 0.0, "B", ColorName::Green);
    diagram.arrow_between(a, b, "");
    diagram.save(&dir.join(name)).unwrap()
}

/// Rasterizer that copies the scene to the image path
#[cfg(unix)]
fn copying_rasterizer() -> Rasterizer {
    Rasterizer::new(vec![
        "sh".to_string(),
        "-c".to_string(),
        r#"cp "$0" "$1""#.to_string(),
    ])
    .unwrap()
}

#[cfg(unix)]
#[test]
fn test_delivers_into_output_dir() {
    let work = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let scene = write_scene(work.path(), "draft.excalidraw");

    let delivery = Delivery::new(copying_rasterizer(), None);
    let report = delivery
        .deliver(
            &DeliveryRequest::new(&scene)
                .with_name("final")
                .with_output_dir(out.path()),
        )
        .unwrap();

    assert!(report.validation);
    assert!(report.excalidraw.ends_with("final.excalidraw"));
    assert!(report.excalidraw.exists());
    assert!(report.png.as_ref().is_some_and(|p| p.exists()));
    assert!(report.vault_error.is_none());
    assert!(scene.exists());
}

#[cfg(unix)]
#[test]
fn test_vault_copy_and_cleanup() {
    let work = TempDir::new().unwrap();
    let vault = TempDir::new().unwrap();
    let scene = write_scene(work.path(), "arch.excalidraw");
    let script = work.path().join("arch.draft.json");
    fs::write(&script, "{}").unwrap();

    let delivery = Delivery::new(copying_rasterizer(), Some(vault.path().join("diagrams")));
    let report = delivery
        .deliver(
            &DeliveryRequest::new(&scene)
                .with_vault(true)
                .with_cleanup([script.clone()]),
        )
        .unwrap();

    assert_eq!(
        report.vault_excalidraw,
        Some(vault.path().join("diagrams").join("arch.excalidraw"))
    );
    assert!(report.vault_png.as_ref().is_some_and(|p| p.exists()));
    assert_eq!(report.cleaned, vec![script.clone()]);
    assert!(!script.exists());
}

#[cfg(unix)]
#[test]
fn test_failed_render_keeps_cleanup_files() {
    let work = TempDir::new().unwrap();
    let scene = write_scene(work.path(), "seq.excalidraw");
    let script = work.path().join("seq.draft.json");
    fs::write(&script, "").unwrap();

    let delivery = Delivery::new(Rasterizer::from_command_line("false").unwrap(), None);
    let report = delivery
        .deliver(&DeliveryRequest::new(&scene).with_cleanup([script.clone()]))
        .unwrap();

    assert!(report.validation);
    assert!(report.png.is_none());
    assert!(report.render_error.is_some());
    assert!(report.cleaned.is_empty());
    assert!(script.exists());
}

#[cfg(unix)]
#[test]
fn test_missing_vault_variable_is_not_fatal() {
    let work = TempDir::new().unwrap();
    let scene = write_scene(work.path(), "map.excalidraw");

    let delivery = Delivery::new(copying_rasterizer(), None);
    let report = delivery
        .deliver(&DeliveryRequest::new(&scene).with_vault(true))
        .unwrap();
    assert!(report.png.is_some());
    assert_eq!(report.vault_error.as_deref(), Some("CHALKLINE_VAULT_DIR not set"));
}

#[test]
fn test_invalid_scene_reports_validation_error() {
    let work = TempDir::new().unwrap();
    let scene = work.path().join("broken.excalidraw");
    fs::write(&scene, "{ not json").unwrap();

    let delivery = Delivery::new(Rasterizer::from_command_line("chalkline-missing-rasterizer").unwrap(), None);
    let report = delivery.deliver(&DeliveryRequest::new(&scene)).unwrap();
    assert!(!report.validation);
    assert!(report.validation_error.is_some());
    assert!(report.png.is_none());
}

#[test]
fn test_report_serializes_for_the_cli() {
    let work = TempDir::new().unwrap();
    let scene = write_scene(work.path(), "plain.excalidraw");
    let delivery = Delivery::new(Rasterizer::from_command_line("chalkline-missing-rasterizer").unwrap(), None);
    let report = delivery.deliver(&DeliveryRequest::new(&scene)).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["validation"], true);
    assert!(json["png"].is_null());
    assert!(json.get("render_error").is_some());
    assert!(json.get("cleaned").is_none());
}

#[cfg(unix)]
#[test]
fn test_hung_rasterizer_times_out() {
    let work = TempDir::new().unwrap();
    let scene = write_scene(work.path(), "slow.excalidraw");
    let rasterizer = Rasterizer::new(vec![
        "sh".to_string(),
        "-c".to_string(),
        "exec sleep 5".to_string(),
    ])
    .unwrap()
    .with_timeout(std::time::Duration::from_millis(200));

    let started = std::time::Instant::now();
    let report = Delivery::new(rasterizer, None)
        .deliver(&DeliveryRequest::new(&scene))
        .unwrap();

    assert!(started.elapsed() < std::time::Duration::from_secs(5));
    assert!(report.validation);
    assert!(report.png.is_none());
    assert!(report
        .render_error
        .as_deref()
        .is_some_and(|e| e.contains("timed out")));
    assert!(scene.exists());
}
