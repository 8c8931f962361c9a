//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use craftplan::data::GameData;
use craftplan::models::{
    ActionPath, ActionStep, Alternatives, BlockDrop, CraftLocation, CraftOp, Fuel, Holdings,
    HuntOp, ItemCount, MineOp, MobDrop, NodeKind, Recipe, SmeltOp, SmeltingRecipe, StepAction,
    TreeNode,
};

const PICKAXES: [&str; 3] = ["wooden_pickaxe", "stone_pickaxe", "iron_pickaxe"];

/// A small world with one material family.
pub fn fixture_db() -> GameData {
    let mut db = GameData::new();
    db.add_recipe(Recipe::new(("planks", 4), &[("log", 1)], false));
    db.add_recipe(Recipe::new(("stick", 4), &[("planks", 2)], false));
    db.add_recipe(Recipe::new(("crafting_table", 1), &[("planks", 4)], false));
    db.add_recipe(Recipe::new(("wooden_pickaxe", 1), &[("planks", 3), ("stick", 2)], true));
    db.add_recipe(Recipe::new(("stone_pickaxe", 1), &[("cobblestone", 3), ("stick", 2)], true));
    db.add_recipe(Recipe::new(("furnace", 1), &[("cobblestone", 8)], true));
    db.add_recipe(Recipe::new(("torch", 4), &[("coal", 1), ("stick", 1)], false));
    db.add_recipe(Recipe::new(("torch", 4), &[("charcoal", 1), ("stick", 1)], false));
    db.add_recipe(Recipe::new(("snow_block", 1), &[("snowball", 4)], false));
    db.add_recipe(Recipe::new(("snowball", 4), &[("snow_block", 1)], false));

    db.add_smelting(SmeltingRecipe::new("cobblestone", ("stone", 1)));
    db.add_smelting(SmeltingRecipe::new("log", ("charcoal", 1)));
    db.add_smelting(SmeltingRecipe::new("raw_iron", ("iron_ingot", 1)));
    db.add_fuel(Fuel::new("coal", 8.0));

    db.add_block(BlockDrop::new("log", ("log", 1), &[]));
    db.add_block(BlockDrop::new("stone", ("cobblestone", 1), &PICKAXES));
    db.add_block(BlockDrop::new("cobblestone", ("cobblestone", 1), &PICKAXES));
    db.add_block(BlockDrop::new("coal_ore", ("coal", 1), &PICKAXES));
    db.add_block(BlockDrop::new("iron_ore", ("raw_iron", 1), &PICKAXES[1..]));
    db.add_block(BlockDrop::new("snow", ("snowball", 4), &[]));

    db.add_mob(MobDrop::new("cow", "beef", 1.0));
    db.add_mob(MobDrop::new("mooshroom", "beef", 1.0));
    db.add_mob(MobDrop::new("cow", "leather", 0.5));

    db.add_tool("wooden_pickaxe", 1);
    db.add_tool("stone_pickaxe", 2);
    db.add_tool("iron_pickaxe", 3);
    db
}

/// Two interchangeable wood species.
pub fn species_db() -> GameData {
    let mut db = GameData::new();
    for wood in ["oak", "spruce"] {
        let log = format!("{wood}_log");
        let planks = format!("{wood}_planks");
        let (log, planks) = (log.as_str(), planks.as_str());
        db.add_recipe(Recipe::new((planks, 4), &[(log, 1)], false));
        db.add_recipe(Recipe::new(("stick", 4), &[(planks, 2)], false));
        db.add_recipe(Recipe::new(("crafting_table", 1), &[(planks, 4)], false));
        db.add_recipe(Recipe::new(
            ("wooden_pickaxe", 1),
            &[(planks, 3), ("stick", 2)],
            true,
        ));
        db.add_block(BlockDrop::new(log, (log, 1), &[]));
    }
    db.add_block(BlockDrop::new("stone", ("cobblestone", 1), &["wooden_pickaxe"]));
    db.add_block(BlockDrop::new("cobblestone", ("cobblestone", 1), &["wooden_pickaxe"]));
    db.add_block(BlockDrop::new("coal_ore", ("coal", 1), &["wooden_pickaxe"]));
    db.add_block(BlockDrop::new("deepslate_coal_ore", ("coal", 1), &["stone_pickaxe"]));
    db.add_tool("wooden_pickaxe", 1);
    db.add_tool("stone_pickaxe", 2);
    db
}

pub fn holdings(items: &[(&str, u32)]) -> Holdings {
    items.iter().map(|(item, count)| (*item, *count)).collect()
}

/// Products of each step's primary option, in order.
pub fn products(path: &ActionPath) -> Vec<String> {
    path.steps
        .iter()
        .filter_map(|step| step.product().map(str::to_string))
        .collect()
}

pub fn mined_blocks(step: &ActionStep) -> Vec<String> {
    match &step.action {
        StepAction::Mine(ops) => ops.iter().map(|op| op.block.clone()).collect(),
        _ => Vec::new(),
    }
}

/// Blocks or creatures a mining or hunting node draws from.
pub fn sources(node: &TreeNode) -> Vec<String> {
    match &node.kind {
        NodeKind::Mine(ops) => ops.iter().map(|op| op.block.clone()).collect(),
        NodeKind::Hunt(ops) => ops.iter().map(|op| op.mob.clone()).collect(),
        _ => Vec::new(),
    }
}

pub fn craft(
    count: u32,
    result: (&str, u32),
    ingredients: &[(&str, u32)],
    table: bool,
) -> ActionStep {
    ActionStep {
        count,
        action: StepAction::Craft(Alternatives::single(CraftOp {
            location: if table {
                CraftLocation::Table
            } else {
                CraftLocation::Inventory
            },
            result: ItemCount::new(result.0, result.1),
            ingredients: ingredients
                .iter()
                .map(|(item, n)| ItemCount::new(*item, *n))
                .collect(),
        })),
    }
}

pub fn smelt(count: u32, input: &str, result: &str, fuel: (&str, u32)) -> ActionStep {
    ActionStep {
        count,
        action: StepAction::Smelt(Alternatives::single(SmeltOp {
            input: ItemCount::new(input, 1),
            result: ItemCount::new(result, 1),
            fuel: ItemCount::new(fuel.0, fuel.1),
        })),
    }
}

pub fn mine(count: u32, block: &str, drop: &str, tool: Option<&str>) -> ActionStep {
    ActionStep {
        count,
        action: StepAction::Mine(Alternatives::single(MineOp {
            block: block.to_string(),
            drop: ItemCount::new(drop, 1),
            tool: tool.map(str::to_string),
        })),
    }
}

pub fn hunt(count: u32, mob: &str, drop: &str, chance: f64) -> ActionStep {
    ActionStep {
        count,
        action: StepAction::Hunt(Alternatives::single(HuntOp {
            mob: mob.to_string(),
            drop: drop.to_string(),
            chance,
        })),
    }
}

/// Steps that produce a persistent item more than once.
pub fn repeated_persistent(path: &ActionPath) -> Vec<String> {
    let mut seen = Vec::new();
    let mut repeated = Vec::new();
    for item in products(path) {
        if craftplan::models::is_persistent(&item) {
            if seen.contains(&item) {
                repeated.push(item);
            } else {
                seen.push(item);
            }
        }
    }
    repeated
}
