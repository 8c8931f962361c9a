//! End-to-end tests for planning and ranking.

mod common;

use common::{fixture_db, holdings, products, repeated_persistent, species_db};
use craftplan::config::PlannerConfig;
use craftplan::data::GameData;
use craftplan::models::{ActionKind, Holdings, WorldSnapshot};
use craftplan::planner::{find_best_paths, plan, plan_with, rank_paths, PlanOptions};
use craftplan::validate::simulate;

fn spruce_world() -> WorldSnapshot {
    let mut world = WorldSnapshot::default();
    world.blocks.insert("spruce_log".to_string(), 8);
    world
}

#[test]
fn test_best_paths_are_valid_and_ranked() {
    let db = fixture_db();
    let config = PlannerConfig::default();
    for item in ["wooden_pickaxe", "torch", "stone", "furnace"] {
        let options = PlanOptions::default();
        let paths = find_best_paths(&db, item, 1, &options, &config);
        assert!(!paths.is_empty(), "{item}");
        assert!(paths.windows(2).all(|pair| pair[0].cost <= pair[1].cost));
        for path in &paths {
            assert!(simulate(&path.steps, &options.holdings, true), "{item}");
            assert!(repeated_persistent(path).is_empty(), "{item}");
        }
        for (index, path) in paths.iter().enumerate() {
            assert!(paths[..index].iter().all(|other| other.steps != path.steps));
        }
    }
}

#[test]
fn test_ranking_a_built_tree_matches_planning_from_scratch() {
    let db = fixture_db();
    let config = PlannerConfig::default();
    let options = PlanOptions::with_holdings(holdings(&[("planks", 3)]));

    let tree = plan_with(&db, "wooden_pickaxe", 1, &options, &config);
    let ranked = rank_paths(&tree, &options, &config);
    assert!(!ranked.is_empty());
    assert_eq!(
        ranked,
        find_best_paths(&db, "wooden_pickaxe", 1, &options, &config)
    );
}

#[test]
fn test_best_path_hoists_log_mining() {
    let db = fixture_db();
    let paths = find_best_paths(
        &db,
        "wooden_pickaxe",
        1,
        &PlanOptions::default(),
        &PlannerConfig::default(),
    );
    let best = &paths[0];
    let mining: Vec<_> = best
        .steps
        .iter()
        .filter(|step| step.kind() == ActionKind::Mine)
        .collect();
    assert_eq!(mining.len(), 1);
    assert_eq!(mining[0].count, 3);
    assert_eq!(products(best).last().map(String::as_str), Some("wooden_pickaxe"));
}

#[test]
fn test_held_target_gives_one_empty_path() {
    let db = fixture_db();
    let options = PlanOptions::with_holdings(holdings(&[("stick", 8)]));
    let paths = find_best_paths(&db, "stick", 4, &options, &PlannerConfig::default());
    assert_eq!(paths.len(), 1);
    assert!(paths[0].is_empty());
}

#[test]
fn test_unobtainable_gives_no_paths() {
    let db = fixture_db();
    let paths = find_best_paths(
        &db,
        "diamond",
        1,
        &PlanOptions::default(),
        &PlannerConfig::default(),
    );
    assert!(paths.is_empty());
}

#[test]
fn test_world_selects_species() {
    let db = species_db();
    let options = PlanOptions {
        holdings: Holdings::new(),
        world: Some(spruce_world()),
    };
    let paths = find_best_paths(&db, "stick", 4, &options, &PlannerConfig::default());
    assert!(!paths.is_empty());
    for path in &paths {
        let made = products(path);
        assert!(made.contains(&"spruce_planks".to_string()));
        assert!(!made.iter().any(|item| item.starts_with("oak_")));
    }
}

#[test]
fn test_pruning_can_be_disabled() {
    let db = species_db();
    let options = PlanOptions {
        holdings: Holdings::new(),
        world: Some(WorldSnapshot::default()),
    };

    let pruned = plan_with(&db, "stick", 4, &options, &PlannerConfig::default());
    assert!(pruned.children.is_empty());

    let config = PlannerConfig {
        prune_with_world: false,
        ..PlannerConfig::default()
    };
    let kept = plan_with(&db, "stick", 4, &options, &config);
    assert!(!kept.children.is_empty());
}

#[test]
fn test_combining_can_be_disabled() {
    let db = species_db();
    let options = PlanOptions::default();
    let combined = plan(&db, "stick", 4, &options);
    assert_eq!(combined.children.len(), 1);

    let config = PlannerConfig {
        combine_similar: false,
        ..PlannerConfig::default()
    };
    let separate = plan_with(&db, "stick", 4, &options, &config);
    assert_eq!(separate.children.len(), 2);
}

#[test]
fn test_per_generator_limit_caps_results() {
    let data = GameData::embedded().unwrap();
    let config = PlannerConfig {
        per_generator_limit: 1,
        ..PlannerConfig::default()
    };
    let paths = find_best_paths(&data, "stick", 4, &PlanOptions::default(), &config);
    assert!(!paths.is_empty());
    assert!(paths.len() <= 3);
}

#[test]
fn test_plan_options_from_json() {
    let options: PlanOptions = serde_json::from_str(
        r#"{ "holdings": { "oak_planks": 2 }, "world": { "blocks": { "oak_log": 4 } } }"#,
    )
    .unwrap();
    assert_eq!(options.holdings.get("oak_planks"), 2);
    assert_eq!(options.world.map(|w| w.blocks.len()), Some(1));
}
