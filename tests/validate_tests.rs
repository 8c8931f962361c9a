//! Tests for path simulation and sanitization.

mod common;

use common::{craft, holdings, hunt, mine, products, smelt};
use craftplan::models::{ActionPath, Holdings};
use craftplan::validate::{sanitize, simulate};

#[test]
fn test_simulate_resource_flow() {
    let steps = vec![
        mine(1, "log", "log", None),
        craft(1, ("planks", 4), &[("log", 1)], false),
        craft(1, ("stick", 4), &[("planks", 2)], false),
    ];
    assert!(simulate(&steps, &Holdings::new(), true));
    assert!(simulate(&steps, &Holdings::new(), false));
}

#[test]
fn test_simulate_rejects_overdraw() {
    let steps = vec![craft(1, ("stick", 4), &[("planks", 2)], false)];
    assert!(!simulate(&steps, &holdings(&[("planks", 1)]), false));
    assert!(simulate(&steps, &holdings(&[("planks", 2)]), false));
}

#[test]
fn test_simulate_station_checks() {
    let pickaxe = vec![craft(
        1,
        ("wooden_pickaxe", 1),
        &[("planks", 3), ("stick", 2)],
        true,
    )];
    let have = holdings(&[("planks", 3), ("stick", 2)]);
    assert!(simulate(&pickaxe, &have, false));
    assert!(!simulate(&pickaxe, &have, true));

    let stone = vec![smelt(1, "cobblestone", "stone", ("coal", 1))];
    let have = holdings(&[("cobblestone", 1), ("coal", 1)]);
    assert!(simulate(&stone, &have, false));
    assert!(!simulate(&stone, &have, true));

    let mut have = have;
    have.add("furnace", 1);
    assert!(simulate(&stone, &have, true));
}

#[test]
fn test_simulate_tool_checks() {
    let steps = vec![mine(3, "stone", "cobblestone", Some("wooden_pickaxe"))];
    assert!(simulate(&steps, &Holdings::new(), false));
    assert!(!simulate(&steps, &Holdings::new(), true));
    assert!(simulate(&steps, &holdings(&[("wooden_pickaxe", 1)]), true));
}

#[test]
fn test_simulate_hunting_uses_expected_drops() {
    let frame = craft(1, ("item_frame", 1), &[("leather", 3)], false);
    let enough = vec![hunt(6, "cow", "leather", 0.5), frame.clone()];
    assert!(simulate(&enough, &Holdings::new(), true));

    let short = vec![hunt(5, "cow", "leather", 0.5), frame];
    assert!(!simulate(&short, &Holdings::new(), true));
}

#[test]
fn test_sanitize_removes_duplicate_station() {
    let steps = vec![
        craft(1, ("crafting_table", 1), &[("planks", 4)], false),
        craft(1, ("crafting_table", 1), &[("planks", 4)], false),
        craft(1, ("wooden_pickaxe", 1), &[("planks", 3), ("stick", 2)], true),
    ];
    let have = holdings(&[("planks", 11), ("stick", 2)]);
    assert!(simulate(&steps, &have, true));

    let cleaned = sanitize(&steps, &have);
    assert_eq!(cleaned.len(), 2);
    assert!(simulate(&cleaned, &have, true));
}

#[test]
fn test_sanitize_drops_unused_production() {
    let steps = vec![
        mine(1, "log", "log", None),
        craft(1, ("planks", 4), &[("log", 1)], false),
        mine(1, "log", "log", None),
        craft(1, ("planks", 4), &[("log", 1)], false),
        craft(1, ("stick", 4), &[("planks", 2)], false),
    ];
    let cleaned = sanitize(&steps, &Holdings::new());
    assert_eq!(cleaned.len(), 3);
    assert_eq!(
        products(&ActionPath::new(cleaned, 0.0)),
        vec!["log", "planks", "stick"]
    );
}

#[test]
fn test_sanitize_skips_held_station() {
    let steps = vec![
        mine(1, "log", "log", None),
        craft(1, ("planks", 4), &[("log", 1)], false),
        craft(1, ("crafting_table", 1), &[("planks", 4)], false),
        mine(1, "log", "log", None),
        craft(1, ("planks", 4), &[("log", 1)], false),
        craft(1, ("wooden_pickaxe", 1), &[("planks", 3), ("stick", 2)], true),
    ];
    let have = holdings(&[("crafting_table", 1), ("stick", 2)]);
    let cleaned = sanitize(&steps, &have);

    let path = ActionPath::new(cleaned, 0.0);
    assert!(!products(&path).contains(&"crafting_table".to_string()));
    assert_eq!(path.len(), 3);
    assert!(simulate(&path.steps, &have, true));
}

#[test]
fn test_sanitize_keeps_minimal_path() {
    let steps = vec![
        mine(1, "log", "log", None),
        craft(1, ("planks", 4), &[("log", 1)], false),
    ];
    assert_eq!(sanitize(&steps, &Holdings::new()), steps);
}

#[test]
fn test_sanitize_keeps_repeated_target() {
    let pickaxe = craft(1, ("wooden_pickaxe", 1), &[("planks", 3), ("stick", 2)], true);
    let steps = vec![pickaxe.clone(), pickaxe];
    let have = holdings(&[("crafting_table", 1), ("planks", 6), ("stick", 4)]);
    assert_eq!(sanitize(&steps, &have).len(), 2);
}

#[test]
fn test_sanitize_empty_path() {
    assert!(sanitize(&[], &Holdings::new()).is_empty());
}
