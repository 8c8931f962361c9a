//! Display and formatting utilities for craftplan.
//!
//! This module provides functions for formatting acquisition trees and
//! action paths, and for printing planning results in a readable format.

use crate::models::{
    ActionPath, ActionStep, Alternatives, CombineMode, CraftLocation, NodeKind, StepAction,
    TreeNode,
};

/// Lists the options after the primary as `" (or a, b)"`.
fn variants<T>(set: &Alternatives<T>, name: impl Fn(&T) -> String) -> String {
    if !set.is_grouped() {
        return String::new();
    }
    let joiner = match set.mode {
        CombineMode::AnyOf => "any of",
        _ => "or",
    };
    let others: Vec<String> = set.iter().skip(1).map(name).collect();
    format!(" ({} {})", joiner, others.join(", "))
}

/// Formats a single step as a human-readable instruction.
///
/// # Arguments
///
/// * `step` - The step to describe
///
/// # Returns
///
/// One line such as "craft 4 stick from 2 oak_planks at inventory", with
/// interchangeable variants listed after the primary option
///
/// # Example
///
/// ```
/// use craftplan::display::describe_step;
/// use craftplan::models::{ActionStep, Alternatives, ItemCount, MineOp, StepAction};
///
/// let step = ActionStep {
///     count: 3,
///     action: StepAction::Mine(Alternatives::single(MineOp {
///         block: "stone".to_string(),
///         drop: ItemCount::new("cobblestone", 1),
///         tool: Some("wooden_pickaxe".to_string()),
///     })),
/// };
/// assert_eq!(
///     describe_step(&step),
///     "mine 3 x stone for 3 cobblestone with wooden_pickaxe"
/// );
/// ```
pub fn describe_step(step: &ActionStep) -> String {
    match &step.action {
        StepAction::Craft(ops) => {
            let Some(op) = ops.primary() else {
                return "craft (no recipe)".to_string();
            };
            let ingredients: Vec<String> = op
                .ingredients
                .iter()
                .map(|i| format!("{} {}", i.count.saturating_mul(step.count), i.item))
                .collect();
            let place = match op.location {
                CraftLocation::Inventory => "inventory",
                CraftLocation::Table => "crafting table",
            };
            format!(
                "craft {} {} from {} at {}{}",
                step.produced(),
                op.result.item,
                ingredients.join(" + "),
                place,
                variants(ops, |o| {
                    o.ingredients
                        .iter()
                        .map(|i| i.item.as_str())
                        .collect::<Vec<_>>()
                        .join("+")
                })
            )
        }
        StepAction::Smelt(ops) => {
            let Some(op) = ops.primary() else {
                return "smelt (no recipe)".to_string();
            };
            format!(
                "smelt {} {} into {} {} burning {} {}{}",
                op.input.count.saturating_mul(step.count),
                op.input.item,
                step.produced(),
                op.result.item,
                op.fuel.count,
                op.fuel.item,
                variants(ops, |o| o.input.item.clone())
            )
        }
        StepAction::Mine(ops) => {
            let Some(op) = ops.primary() else {
                return "mine (no block)".to_string();
            };
            let tool = op
                .tool
                .as_deref()
                .map(|t| format!(" with {t}"))
                .unwrap_or_default();
            format!(
                "mine {} x {} for {} {}{}{}",
                step.count,
                op.block,
                step.produced(),
                op.drop.item,
                tool,
                variants(ops, |o| o.block.clone())
            )
        }
        StepAction::Hunt(ops) => {
            let Some(op) = ops.primary() else {
                return "hunt (no creature)".to_string();
            };
            format!(
                "hunt {} x {} for ~{} {}{}",
                step.count,
                op.mob,
                step.produced(),
                op.drop,
                variants(ops, |o| o.mob.clone())
            )
        }
    }
}

/// Formats a path as numbered lines.
///
/// # Arguments
///
/// * `path` - The path to format
///
/// # Returns
///
/// One indented, numbered line per step, or a single note when the path is
/// empty
pub fn format_path(path: &ActionPath) -> String {
    if path.is_empty() {
        return "  (nothing to do, target already held)\n".to_string();
    }
    path.steps
        .iter()
        .enumerate()
        .map(|(index, step)| format!("  {:>2}. {}\n", index + 1, describe_step(step)))
        .collect()
}

fn node_label(node: &TreeNode) -> String {
    let names = node.what();
    let mut label = format!("{} {}", node.action(), names.first().copied().unwrap_or("?"));
    if names.len() > 1 {
        label.push_str(&format!(" [+{} variants]", names.len() - 1));
    }
    match &node.kind {
        NodeKind::Root(_) if node.count == 0 => label.push_str(" (held)"),
        NodeKind::Root(_) if node.children.is_empty() => label.push_str(" (unobtainable)"),
        NodeKind::Require(_) => {}
        _ => label.push_str(&format!(" x{}", node.count)),
    }
    label
}

fn write_tree(node: &TreeNode, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&node_label(node));
    out.push('\n');
    for child in &node.children {
        write_tree(child, depth + 1, out);
    }
}

/// Formats a tree with two-space indentation per level.
///
/// # Arguments
///
/// * `tree` - Root of the acquisition tree
///
/// # Returns
///
/// One line per node, labelled with its action, item and count
pub fn format_tree(tree: &TreeNode) -> String {
    let mut out = String::new();
    write_tree(tree, 0, &mut out);
    out
}

/// Prints the acquisition tree to stdout.
pub fn display_tree(tree: &TreeNode) {
    println!();
    println!("[ACQUISITION TREE]");
    println!("----------------------------------------------------------------");
    print!("{}", format_tree(tree));
}

/// Displays ranked paths to stdout.
///
/// The first path is shown as the recommendation, the rest as alternatives
/// with their cost only.
///
/// # Arguments
///
/// * `item` - Name of the requested item
/// * `count` - Requested quantity
/// * `paths` - Ranked paths, best first
pub fn display_paths(item: &str, count: u32, paths: &[ActionPath]) {
    println!();
    println!("+================================================================+");
    println!("|                 CRAFTPLAN ACQUISITION PLANS                    |");
    println!("+================================================================+");
    println!();

    let Some(best) = paths.first() else {
        println!("[WARNING] No way to obtain {} x {} was found.", count, item);
        return;
    };

    println!("[BEST PATH] {} x {}", count, item);
    println!("----------------------------------------------------------------");
    print!("{}", format_path(best));
    println!();
    println!("  Steps: {}    Cost: {:.3}", best.len(), best.cost);

    if paths.len() > 1 {
        println!();
        println!("[ALTERNATIVES]");
        println!("----------------------------------------------------------------");
        println!("  {:>4}  {:>6}  {:>9}  First step", "Rank", "Steps", "Cost");
        for (rank, path) in paths.iter().enumerate().skip(1) {
            let first = path.steps.first().map(describe_step).unwrap_or_default();
            println!(
                "  {:>4}  {:>6}  {:>9.3}  {}",
                rank + 1,
                path.len(),
                path.cost,
                first
            );
        }
    }
}
