//! Tests for planner configuration loading.

use craftplan::config::PlannerConfig;
use craftplan::error::ConfigError;
use craftplan::models::{ActionKind, CraftLocation};

#[test]
fn test_default_weights() {
    let config = PlannerConfig::default();
    let w = &config.weights;

    assert_eq!(w.weight(ActionKind::Craft, Some(CraftLocation::Inventory)), 1.0);
    assert_eq!(w.weight(ActionKind::Craft, Some(CraftLocation::Table)), 2.0);
    assert_eq!(w.weight(ActionKind::Smelt, None), 5.0);
    assert_eq!(w.weight(ActionKind::Mine, None), 10.0);
    assert_eq!(w.weight(ActionKind::Hunt, None), 25.0);
    assert_eq!(config.per_generator_limit, 20);
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config = PlannerConfig::from_json_str(
        r#"{ "prune_with_world": false, "weights": { "mine": 3.0 } }"#,
    )
    .unwrap();

    assert!(!config.prune_with_world);
    assert!(config.combine_similar);
    assert_eq!(config.weights.mine, 3.0);
    assert_eq!(config.weights.hunt, 25.0);
    assert_eq!(config.biases.tool, 0.01);
}

#[test]
fn test_invalid_json_is_rejected() {
    let err = PlannerConfig::from_json_str("{ per_generator_limit: ").unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn test_missing_config_file() {
    let err = PlannerConfig::load(std::path::Path::new("/nonexistent/craftplan.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
