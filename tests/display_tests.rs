//! Tests for display formatting functions.

mod common;

use common::{craft, fixture_db, holdings, hunt, smelt};
use craftplan::builder::{build, PlanContext};
use craftplan::display::{describe_step, format_path, format_tree};
use craftplan::models::{
    ActionPath, ActionStep, Alternatives, CombineMode, CraftLocation, CraftOp, Holdings,
    ItemCount, StepAction,
};

#[test]
fn test_describe_craft() {
    let step = craft(2, ("stick", 4), &[("planks", 2)], false);
    assert_eq!(
        describe_step(&step),
        "craft 8 stick from 4 planks at inventory"
    );

    let pickaxe = craft(1, ("wooden_pickaxe", 1), &[("planks", 3), ("stick", 2)], true);
    assert_eq!(
        describe_step(&pickaxe),
        "craft 1 wooden_pickaxe from 3 planks + 2 stick at crafting table"
    );
}

#[test]
fn test_describe_smelt_and_hunt() {
    let step = smelt(3, "cobblestone", "stone", ("coal", 1));
    assert_eq!(
        describe_step(&step),
        "smelt 3 cobblestone into 3 stone burning 1 coal"
    );

    let step = hunt(6, "cow", "leather", 0.5);
    assert_eq!(describe_step(&step), "hunt 6 x cow for ~3 leather");
}

#[test]
fn test_describe_lists_variants() {
    let op = |wood: &str| CraftOp {
        location: CraftLocation::Inventory,
        result: ItemCount::new("stick", 4),
        ingredients: vec![ItemCount::new(format!("{wood}_planks"), 2)],
    };
    let step = ActionStep {
        count: 1,
        action: StepAction::Craft(Alternatives::new(
            CombineMode::OneOf,
            vec![op("oak"), op("spruce"), op("birch")],
        )),
    };
    assert_eq!(
        describe_step(&step),
        "craft 4 stick from 2 oak_planks at inventory (or spruce_planks, birch_planks)"
    );
}

#[test]
fn test_format_path_numbers_steps() {
    let path = ActionPath::new(
        vec![
            craft(1, ("planks", 4), &[("log", 1)], false),
            craft(1, ("stick", 4), &[("planks", 2)], false),
        ],
        2.0,
    );
    let text = format_path(&path);
    assert!(text.contains(" 1. craft 4 planks"));
    assert!(text.contains(" 2. craft 4 stick"));
}

#[test]
fn test_format_empty_path() {
    let text = format_path(&ActionPath::default());
    assert!(text.contains("already held"));
}

#[test]
fn test_format_tree_indents_children() {
    let db = fixture_db();
    let tree = build("planks", 4, &Holdings::new(), &PlanContext::new(&db));
    let text = format_tree(&tree);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("root planks"));
    assert!(lines[1].starts_with("  craft planks"));
    assert!(lines[3].starts_with("      mine log"));
}

#[test]
fn test_format_tree_marks_held_and_unobtainable() {
    let db = fixture_db();
    let held = build("planks", 1, &holdings(&[("planks", 1)]), &PlanContext::new(&db));
    assert!(format_tree(&held).contains("(held)"));

    let missing = build("diamond", 1, &Holdings::new(), &PlanContext::new(&db));
    assert!(format_tree(&missing).contains("(unobtainable)"));
}
