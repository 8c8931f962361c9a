//! Tests for world-availability pruning.

mod common;

use common::{fixture_db, holdings, mined_blocks, sources, species_db};
use craftplan::builder::{build, PlanContext};
use craftplan::combine::combine_similar;
use craftplan::data::ItemDatabase;
use craftplan::models::{Holdings, TreeNode, WorldSnapshot};
use craftplan::planner::{enumerate, Strategy};
use craftplan::world::{family_hint, prune_unavailable, restrict, SourceKind, WorldBudget};

fn world(blocks: &[(&str, u32)], entities: &[(&str, u32)]) -> WorldSnapshot {
    WorldSnapshot {
        blocks: blocks.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        entities: entities.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        ..WorldSnapshot::default()
    }
}

fn pruned(
    db: &dyn ItemDatabase,
    item: &str,
    count: u32,
    have: &Holdings,
    snapshot: &WorldSnapshot,
) -> TreeNode {
    let tree = combine_similar(build(item, count, have, &PlanContext::new(db)));
    prune_unavailable(tree, &WorldBudget::new(snapshot))
}

#[test]
fn test_budget_queries() {
    let snapshot = world(&[("stone", 4), ("cobblestone", 2)], &[("cow", 1)]);
    let budget = WorldBudget::new(&snapshot);

    assert_eq!(budget.available(SourceKind::Block, "stone"), 4);
    assert_eq!(budget.available(SourceKind::Block, "cow"), 0);
    assert_eq!(budget.available(SourceKind::Entity, "cow"), 1);
    assert_eq!(budget.sum(SourceKind::Block, ["stone", "cobblestone", "dirt"]), 6);
    assert!(budget.can(SourceKind::Block, "stone", 4));
    assert!(!budget.can(SourceKind::Block, "cobblestone", 3));
}

#[test]
fn test_family_hint_ignores_other_blocks() {
    let snapshot = world(&[("stone", 50), ("spruce_log", 2)], &[]);
    assert_eq!(family_hint(&snapshot).as_deref(), Some("spruce"));
    assert_eq!(family_hint(&world(&[("stone", 50)], &[])), None);
}

#[test]
fn test_only_available_species_survives() {
    let db = species_db();
    let snapshot = world(&[("spruce_log", 5)], &[]);
    let tree = pruned(&db, "stick", 1, &Holdings::new(), &snapshot);

    let craft = &tree.children[0];
    assert_eq!(craft.what(), vec!["stick"]);
    let planks = &craft.children[0];
    assert_eq!(planks.what(), vec!["spruce_planks"]);

    let empty = Holdings::new();
    let path = enumerate(&tree, &empty, Strategy::Shortest)
        .next()
        .expect("spruce path");
    let mined: Vec<String> = path.steps.iter().flat_map(mined_blocks).collect();
    assert_eq!(mined, vec!["spruce_log"]);
}

#[test]
fn test_no_sources_prunes_everything() {
    let db = species_db();
    let tree = pruned(&db, "stick", 1, &Holdings::new(), &WorldSnapshot::default());

    assert_eq!(tree.what(), vec!["stick"]);
    assert!(tree.children.is_empty());
    let empty = Holdings::new();
    assert_eq!(enumerate(&tree, &empty, Strategy::All).count(), 0);
}

#[test]
fn test_any_of_group_sums_sources() {
    let db = fixture_db();
    let have = holdings(&[("wooden_pickaxe", 1)]);

    let split = world(&[("stone", 2), ("cobblestone", 2)], &[]);
    let tree = pruned(&db, "cobblestone", 3, &have, &split);
    assert_eq!(sources(&tree.children[0]), vec!["stone", "cobblestone"]);

    let short = world(&[("stone", 1), ("cobblestone", 1)], &[]);
    let tree = pruned(&db, "cobblestone", 3, &have, &short);
    assert!(tree.children.is_empty());
}

#[test]
fn test_missing_block_promotes_next_option() {
    let db = fixture_db();
    let have = holdings(&[("wooden_pickaxe", 1)]);
    let snapshot = world(&[("cobblestone", 10)], &[]);
    let tree = pruned(&db, "cobblestone", 3, &have, &snapshot);

    assert_eq!(sources(&tree.children[0]), vec!["cobblestone"]);
    let path = enumerate(&tree, &have, Strategy::Shortest).next().unwrap();
    assert_eq!(mined_blocks(&path.steps[0]), vec!["cobblestone"]);
}

#[test]
fn test_entities_are_checked() {
    let db = fixture_db();
    let snapshot = world(&[], &[("cow", 0), ("mooshroom", 3)]);
    let tree = pruned(&db, "beef", 2, &Holdings::new(), &snapshot);
    assert_eq!(sources(&tree.children[0]), vec!["mooshroom"]);

    let none = world(&[], &[("cow", 1)]);
    let tree = pruned(&db, "beef", 2, &Holdings::new(), &none);
    assert!(tree.children.is_empty());
}

#[test]
fn test_held_target_is_kept() {
    let db = fixture_db();
    let tree = pruned(&db, "planks", 2, &holdings(&[("planks", 2)]), &WorldSnapshot::default());
    assert_eq!(tree.count, 0);
    assert!(tree.is_satisfiable());
}

#[test]
fn test_restrict_narrows_variants() {
    let db = species_db();
    let tree = combine_similar(build("stick", 1, &Holdings::new(), &PlanContext::new(&db)));
    let planks = tree.children[0].children[0].clone();
    assert_eq!(planks.what(), vec!["oak_planks", "spruce_planks"]);

    let allowed = vec!["spruce_planks".to_string()];
    let kept = restrict(planks.clone(), &allowed).expect("spruce planks allowed");
    assert_eq!(kept.what(), vec!["spruce_planks"]);
    let log = &kept.children[0].children[0];
    assert_eq!(log.what(), vec!["spruce_log"]);
    assert_eq!(sources(&log.children[0]), vec!["spruce_log"]);

    let none = vec!["birch_planks".to_string()];
    assert!(restrict(planks, &none).is_none());
}
