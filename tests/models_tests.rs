//! Tests for data models and structures.

use craftplan::models::{
    family_prefix, family_suffix, is_persistent, is_tool, Alternatives, CombineMode, Fuel,
    Holdings, HuntOp, NodeKind, Recipe, TreeNode,
};

#[test]
fn test_holdings_take_and_consume() {
    let mut holdings: Holdings = [("planks", 5), ("stick", 2)].into_iter().collect();

    assert_eq!(holdings.take("planks", 3), 3);
    assert_eq!(holdings.get("planks"), 2);

    // Taking more than held only takes what is there
    assert_eq!(holdings.take("planks", 10), 2);
    assert!(!holdings.has("planks"));

    // Consume is all-or-nothing
    assert!(!holdings.consume("stick", 3));
    assert_eq!(holdings.get("stick"), 2);
    assert!(holdings.consume("stick", 2));
    assert!(holdings.is_empty());
}

#[test]
fn test_holdings_add_ignores_zero() {
    let mut holdings = Holdings::new();
    holdings.add("log", 0);
    assert!(holdings.is_empty());

    holdings.add("log", 2);
    holdings.add("log", 3);
    assert_eq!(holdings.get("log"), 5);
}

#[test]
fn test_holdings_json_is_plain_map() {
    let holdings: Holdings = serde_json::from_str(r#"{"furnace": 1, "coal": 4}"#).unwrap();
    assert_eq!(holdings.get("coal"), 4);
    assert!(holdings.has("furnace"));
}

#[test]
fn test_persistent_items() {
    assert!(is_persistent("crafting_table"));
    assert!(is_persistent("furnace"));
    assert!(is_persistent("iron_pickaxe"));
    assert!(is_persistent("stone_axe"));
    assert!(is_persistent("shears"));
    assert!(!is_persistent("stick"));
    assert!(!is_persistent("cobblestone"));

    assert!(is_tool("wooden_sword"));
    assert!(!is_tool("crafting_table"));
}

#[test]
fn test_family_suffix() {
    assert_eq!(family_suffix("oak_planks"), "planks");
    assert_eq!(family_suffix("dark_oak_planks"), "planks");
    assert_eq!(family_suffix("light_blue_wool"), "wool");
    assert_eq!(family_suffix("blue_wool"), "wool");
    assert_eq!(family_suffix("cobblestone"), "cobblestone");

    // A bare family name is not stripped
    assert_eq!(family_suffix("bamboo"), "bamboo");
    // Prefix must end at an underscore
    assert_eq!(family_suffix("oakwood"), "oakwood");

    assert_eq!(family_prefix("spruce_log"), Some("spruce"));
    assert_eq!(family_prefix("pale_oak_log"), Some("pale_oak"));
    assert_eq!(family_prefix("stick"), None);
}

#[test]
fn test_alternatives_retain_promotes_and_resets_mode() {
    let mut set = Alternatives::new(
        CombineMode::OneOf,
        vec!["oak_log".to_string(), "spruce_log".to_string()],
    );
    assert!(set.is_grouped());
    assert_eq!(set.primary().map(String::as_str), Some("oak_log"));

    set.retain(|name| name != "oak_log");
    assert_eq!(set.primary().map(String::as_str), Some("spruce_log"));
    assert_eq!(set.mode, CombineMode::None);
}

#[test]
fn test_alternatives_new_single_has_no_mode() {
    let set = Alternatives::new(CombineMode::AnyOf, vec![1]);
    assert_eq!(set.mode, CombineMode::None);
}

#[test]
fn test_hunt_kill_counts() {
    assert_eq!(HuntOp::kills_needed(3, 1.0), 3);
    assert_eq!(HuntOp::kills_needed(3, 0.5), 6);
    assert_eq!(HuntOp::kills_needed(3, 0.3), 10);

    let op = HuntOp {
        mob: "spider".to_string(),
        drop: "string".to_string(),
        chance: 0.3,
    };
    assert_eq!(op.expected_drops(10), 3);
    assert_eq!(op.expected_drops(3), 0);
}

#[test]
fn test_fuel_units() {
    let coal = Fuel::new("coal", 8.0);
    assert_eq!(coal.units_for(1), 1);
    assert_eq!(coal.units_for(8), 1);
    assert_eq!(coal.units_for(9), 2);

    let stick = Fuel::new("stick", 0.5);
    assert_eq!(stick.units_for(3), 6);
}

#[test]
fn test_recipe_ingredient_counts_sums_repeats() {
    let recipe = Recipe::new(
        ("bed", 1),
        &[("wool", 1), ("planks", 3), ("wool", 2)],
        true,
    );
    let counts = recipe.ingredient_counts();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].item, "wool");
    assert_eq!(counts[0].count, 3);
    assert_eq!(counts[1].count, 3);
}

#[test]
fn test_tree_node_helpers() {
    let held = TreeNode::root("stick", 0);
    assert!(held.is_satisfiable());

    let missing = TreeNode::root("diamond", 2);
    assert!(!missing.is_satisfiable());
    assert!(missing.as_step().is_none());

    let gate = TreeNode::require("crafting_table", TreeNode::root("crafting_table", 0), held);
    assert!(matches!(gate.kind, NodeKind::Require(ref item) if item == "crafting_table"));
    assert_eq!(gate.node_count(), 3);
    assert_eq!(gate.what(), vec!["crafting_table"]);
}
