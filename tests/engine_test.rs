//! Engine round trips through a universe file on disk.

mod common;

use common::fixtures::{descriptor, shop_universe, universe_json};
use plantarch::app::dto::{DiagramParams, RenderJob};
use plantarch::app::engine::DiagramEngine;
use plantarch::domain::model::DeclaredKind;
use std::io::Write;
use tempfile::NamedTempFile;

fn shop_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(universe_json(&shop_universe()).as_bytes())
        .unwrap();
    file
}

#[test]
fn test_load_and_health() {
    let file = shop_file();
    let engine = DiagramEngine::load_from_json(file.path()).unwrap();
    let health = engine.health().unwrap();
    assert_eq!(health.type_count, 8);
    assert_eq!(health.universe_path, file.path().to_string_lossy());
}

#[test]
fn test_missing_universe_fails_to_load() {
    assert!(DiagramEngine::load_from_json(std::path::Path::new("/nonexistent/universe.json")).is_err());
}

#[test]
fn test_class_job_line_with_hidden_classes() {
    let file = shop_file();
    let engine = DiagramEngine::load_from_json(file.path()).unwrap();

    let line = r#"{"classDiagrams":{"title":"Garage","description":"Usage","classesToAnalyze":["shop.Garage"],"classesToHide":["Car"]}}"#;
    let out = engine.render_line(line).unwrap();

    assert!(out.starts_with("@startuml\n"));
    assert!(out.contains("\nclass shop.Garage\n"));
    assert!(out.contains("\nshop.Garage --> c_clock_1_0_jar\n"));
    assert!(!out.contains("shop.Car"));
}

#[test]
fn test_erm_job_and_hidden_containers() {
    let engine = DiagramEngine::from_universe(shop_universe());
    let job = RenderJob::entity(DiagramParams {
        title: "Shop".into(),
        classes_to_analyze: vec!["shop.Car".into(), "shop.Seat".into()],
        ..Default::default()
    });
    let response = engine.render(&job).unwrap();
    assert_eq!(response.kind, "erm");
    assert!(response.diagram.contains("\nshop.Car ||--o{ shop.Seat\n"));

    let job = RenderJob::class(DiagramParams {
        classes_to_analyze: vec!["shop.Garage".into()],
        containers_to_hide: vec!["clock-1.0.jar".into()],
        ..Default::default()
    });
    let response = engine.render(&job).unwrap();
    assert_eq!(response.kind, "class");
    assert!(!response.diagram.contains("c_clock_1_0_jar"));
}

#[test]
fn test_hidden_container_stays_hidden_in_entity_mode() {
    let engine = DiagramEngine::from_universe(shop_universe());
    let line = r#"{"ermDiagrams":{"classesToAnalyze":["shop.Car"],"containersToHide":["shop"]}}"#;
    let out = engine.render_line(line).unwrap();

    assert!(out.starts_with("@startuml\n"));
    assert!(!out.contains("class shop.Car"));
    assert!(!out.contains("shop.Seat"));

    let line = r#"{"ermDiagrams":{"classesToAnalyze":["shop.Car"]}}"#;
    assert!(engine.render_line(line).unwrap().contains("class shop.Car"));
}

#[test]
fn test_unknown_focus_type_is_an_error() {
    let engine = DiagramEngine::from_universe(shop_universe());
    let err = engine
        .render_line(r#"{"classDiagrams":{"classesToAnalyze":["shop.Nope"]}}"#)
        .unwrap_err();
    assert!(format!("{err:#}").contains("shop.Nope"));
}

#[test]
fn test_malformed_line_is_an_error() {
    let engine = DiagramEngine::from_universe(shop_universe());
    let err = engine.render_line("{not json").unwrap_err();
    assert!(err.to_string().contains("Malformed job"));
}

#[test]
fn test_container_summary() {
    let engine = DiagramEngine::from_universe(shop_universe());
    let containers = engine.containers(None, &[]).unwrap();
    let names: Vec<&str> = containers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["clock-1.0.jar", "jrt", "shop", "unknown"]);

    let shop = containers.iter().find(|c| c.name == "shop").unwrap();
    assert_eq!(shop.member_count, 5);
    assert!(!shop.hidden);
    assert!(containers.iter().find(|c| c.name == "unknown").unwrap().hidden);
}

#[test]
fn test_module_dirs_take_precedence_over_build_output() {
    let engine = DiagramEngine::from_universe(shop_universe());
    let containers = engine.containers(None, &["/repo".to_string()]).unwrap();
    assert!(containers.iter().any(|c| c.name == "repo" && c.member_count == 5));
    assert!(!containers.iter().any(|c| c.name == "shop"));
}

#[test]
fn test_reload_picks_up_new_types() {
    let file = shop_file();
    let engine = DiagramEngine::load_from_json(file.path()).unwrap();

    let mut universe = shop_universe();
    universe.types.push(descriptor(
        "shop.Wheel",
        DeclaredKind::Class,
        "file:/repo/shop/target/classes/shop/Wheel.class",
    ));
    std::fs::write(file.path(), universe_json(&universe)).unwrap();

    let health = engine.reload().unwrap();
    assert_eq!(health.type_count, 9);
    assert_eq!(engine.health().unwrap().type_count, 9);
}
