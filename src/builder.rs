//! Acquisition tree construction.
//!
//! [`build`] expands a target item into an AND/OR tree covering every known
//! way to obtain it: crafting, smelting, mining and hunting. Holdings are
//! deducted as the tree is built, copied per alternative and consumed in
//! order within one alternative, so each node's `count` is the demand still
//! unmet at that point.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::data::ItemDatabase;
use crate::models::{
    family_prefix, family_suffix, is_persistent, Alternatives, BlockDrop, CombineMode,
    CraftLocation, CraftOp, Fuel, Holdings, HuntOp, ItemCount, MineOp, NodeKind, Recipe,
    SmeltOp, SmeltingRecipe, TreeNode, CRAFTING_TABLE, FURNACE,
};

/// Items already being expanded on the current branch.
type Visited = BTreeSet<String>;

/// One alternative and the supply left on its branch once it is done.
type Branch = (TreeNode, Holdings);

/// Planning context passed explicitly through tree construction.
pub struct PlanContext<'a> {
    pub db: &'a dyn ItemDatabase,
    /// Preferred material family (e.g. `"spruce"`), used to order recipes
    pub family_hint: Option<String>,
}

impl<'a> PlanContext<'a> {
    pub fn new(db: &'a dyn ItemDatabase) -> Self {
        Self {
            db,
            family_hint: None,
        }
    }

    pub fn with_family_hint(mut self, hint: Option<String>) -> Self {
        self.family_hint = hint;
        self
    }
}

/// Builds the acquisition tree for `count` of `item`.
///
/// The returned root has `count == 0` when holdings already cover the
/// demand, and no children when the item cannot be obtained at all.
pub fn build(item: &str, count: u32, holdings: &Holdings, ctx: &PlanContext<'_>) -> TreeNode {
    let mut supply = holdings.clone();
    let tree = expand_item(ctx, item, count, &mut supply, &Visited::new());
    normalize(tree, holdings, &BTreeSet::new())
}

/// Expands one item into a root node, deducting what `supply` already holds.
fn expand_item(
    ctx: &PlanContext<'_>,
    item: &str,
    count: u32,
    supply: &mut Holdings,
    visited: &Visited,
) -> TreeNode {
    let remaining = count.saturating_sub(supply.get(item));
    if !is_persistent(item) {
        supply.take(item, count);
    }
    if remaining == 0 {
        return TreeNode::root(item, 0);
    }
    if visited.contains(item) {
        trace!(item, "item already on this branch");
        return TreeNode::root(item, remaining);
    }

    let mut path = visited.clone();
    path.insert(item.to_string());

    let mut branches = craft_branches(ctx, item, remaining, supply, &path);
    branches.extend(smelt_branches(ctx, item, remaining, supply, &path));
    branches.extend(mine_branches(ctx, item, remaining, supply, &path));
    branches.extend(hunt_branches(ctx, item, remaining, supply));

    if branches.is_empty() {
        debug!(item, remaining, "no way to obtain item");
    } else {
        settle(supply, &branches);
        if is_persistent(item) {
            supply.add(item, remaining);
        }
    }
    TreeNode::new(
        NodeKind::Root(Alternatives::single(item.to_string())),
        remaining,
        branches.into_iter().map(|(node, _)| node).collect(),
    )
}

/// Replaces `supply` with what is left whichever alternative is taken: the
/// smallest count of each item across the branches.
fn settle(supply: &mut Holdings, branches: &[Branch]) {
    let Some(((_, first), rest)) = branches.split_first() else {
        return;
    };
    *supply = first
        .iter()
        .map(|(item, count)| {
            let least = rest
                .iter()
                .map(|(_, branch)| branch.get(item))
                .fold(count, u32::min);
            (item, least)
        })
        .collect();
}

struct RankedRecipe {
    crafts: u32,
    missing: u32,
    off_hint: bool,
    recipe: Recipe,
    ingredients: Vec<ItemCount>,
}

/// Ingredients ordered so that interchangeable variants line up by position
/// across recipes.
fn ordered_ingredients(recipe: &Recipe) -> Vec<ItemCount> {
    let mut ingredients = recipe.ingredient_counts();
    ingredients.sort_by(|a, b| {
        family_suffix(&a.item)
            .cmp(family_suffix(&b.item))
            .then_with(|| a.item.cmp(&b.item))
    });
    ingredients
}

fn craft_branches(
    ctx: &PlanContext<'_>,
    item: &str,
    remaining: u32,
    supply: &Holdings,
    path: &Visited,
) -> Vec<Branch> {
    let mut ranked: Vec<RankedRecipe> = ctx
        .db
        .recipes_for(item)
        .into_iter()
        .filter(|recipe| recipe.result.count > 0)
        .map(|recipe| {
            let crafts = remaining.div_ceil(recipe.result.count);
            let ingredients = ordered_ingredients(&recipe);
            let missing = ingredients
                .iter()
                .map(|i| {
                    i.count
                        .saturating_mul(crafts)
                        .saturating_sub(supply.get(&i.item))
                })
                .fold(0u32, u32::saturating_add);
            let off_hint = ctx.family_hint.as_deref().is_some_and(|hint| {
                ingredients
                    .iter()
                    .any(|i| family_prefix(&i.item).is_some_and(|family| family != hint))
            });
            RankedRecipe {
                crafts,
                missing,
                off_hint,
                recipe,
                ingredients,
            }
        })
        .collect();

    // Most affordable first, then the hinted family, then the larger yield.
    ranked.sort_by(|a, b| {
        a.missing
            .cmp(&b.missing)
            .then(a.off_hint.cmp(&b.off_hint))
            .then(b.recipe.result.count.cmp(&a.recipe.result.count))
    });

    ranked
        .into_iter()
        .filter_map(|candidate| craft_node(ctx, candidate, supply, path))
        .collect()
}

fn craft_node(
    ctx: &PlanContext<'_>,
    candidate: RankedRecipe,
    supply: &Holdings,
    path: &Visited,
) -> Option<Branch> {
    let RankedRecipe {
        crafts,
        recipe,
        ingredients,
        ..
    } = candidate;
    let mut branch = supply.clone();

    let location = if recipe.needs_table {
        CraftLocation::Table
    } else {
        CraftLocation::Inventory
    };
    let gate = if recipe.needs_table {
        station_gate(ctx, CRAFTING_TABLE, &mut branch, path)?
    } else {
        None
    };

    let mut children = Vec::with_capacity(ingredients.len());
    for ingredient in &ingredients {
        let need = ingredient.count.saturating_mul(crafts);
        let child = if path.contains(&ingredient.item) {
            mining_fallback(ctx, &ingredient.item, need, &mut branch, path)
        } else {
            expand_item(ctx, &ingredient.item, need, &mut branch, path)
        };
        if !child.is_satisfiable() {
            debug!(
                result = %recipe.result.item,
                ingredient = %ingredient.item,
                "skipping recipe with unobtainable ingredient"
            );
            return None;
        }
        children.push(child);
    }

    let op = CraftOp {
        location,
        result: recipe.result.clone(),
        ingredients,
    };
    let node = TreeNode::new(NodeKind::Craft(Alternatives::single(op)), crafts, children);
    let node = match gate {
        Some(acquire) => TreeNode::require(CRAFTING_TABLE, acquire, node),
        None => node,
    };
    Some((node, branch))
}

/// Ensures a station is available on this branch.
///
/// Returns `Some(None)` when it is already held, `Some(Some(tree))` with its
/// acquisition subtree when it must be obtained first, and `None` when it
/// cannot be obtained. An acquired station is credited to `branch`.
fn station_gate(
    ctx: &PlanContext<'_>,
    station: &str,
    branch: &mut Holdings,
    path: &Visited,
) -> Option<Option<TreeNode>> {
    if branch.has(station) {
        return Some(None);
    }
    if path.contains(station) {
        trace!(station, "station is being built on this branch");
        return None;
    }
    let acquire = expand_item(ctx, station, 1, branch, path);
    if !acquire.is_satisfiable() {
        debug!(station, "station cannot be obtained");
        return None;
    }
    Some(Some(acquire))
}

/// Resolves an ingredient already on the branch by mining only.
fn mining_fallback(
    ctx: &PlanContext<'_>,
    item: &str,
    need: u32,
    supply: &mut Holdings,
    path: &Visited,
) -> TreeNode {
    let remaining = need.saturating_sub(supply.get(item));
    if !is_persistent(item) {
        supply.take(item, need);
    }
    if remaining == 0 {
        return TreeNode::root(item, 0);
    }
    trace!(item, "cyclic ingredient, falling back to mining");
    let branches = mine_branches(ctx, item, remaining, supply, path);
    settle(supply, &branches);
    TreeNode::new(
        NodeKind::Root(Alternatives::single(item.to_string())),
        remaining,
        branches.into_iter().map(|(node, _)| node).collect(),
    )
}

fn smelt_branches(
    ctx: &PlanContext<'_>,
    item: &str,
    remaining: u32,
    supply: &Holdings,
    path: &Visited,
) -> Vec<Branch> {
    let inputs = ctx.db.smelting_inputs_for(item);
    if inputs.is_empty() {
        return Vec::new();
    }
    let Some(fuel) = ctx.db.minimal_fuel() else {
        debug!(item, "no fuel known, skipping smelting");
        return Vec::new();
    };
    inputs
        .iter()
        .filter_map(|smelt| smelt_node(ctx, remaining, smelt, &fuel, supply, path))
        .collect()
}

fn smelt_node(
    ctx: &PlanContext<'_>,
    remaining: u32,
    smelt: &SmeltingRecipe,
    fuel: &Fuel,
    supply: &Holdings,
    path: &Visited,
) -> Option<Branch> {
    if smelt.result.count == 0 || path.contains(&smelt.input) {
        return None;
    }
    let smelts = remaining.div_ceil(smelt.result.count);
    let fuel_units = fuel.units_for(smelts);

    let mut branch = supply.clone();
    let gate = station_gate(ctx, FURNACE, &mut branch, path)?;

    let input = expand_item(ctx, &smelt.input, smelts, &mut branch, path);
    if !input.is_satisfiable() {
        return None;
    }
    let fuel_root = expand_item(ctx, &fuel.item, fuel_units, &mut branch, path);
    if !fuel_root.is_satisfiable() {
        debug!(fuel = %fuel.item, "fuel cannot be obtained");
        return None;
    }

    let op = SmeltOp {
        input: ItemCount::new(smelt.input.clone(), 1),
        result: smelt.result.clone(),
        fuel: ItemCount::new(fuel.item.clone(), fuel_units),
    };
    let node = TreeNode::new(
        NodeKind::Smelt(Alternatives::single(op)),
        smelts,
        vec![input, fuel_root],
    );
    let node = match gate {
        Some(acquire) => TreeNode::require(FURNACE, acquire, node),
        None => node,
    };
    Some((node, branch))
}

fn mine_branches(
    ctx: &PlanContext<'_>,
    item: &str,
    remaining: u32,
    supply: &Holdings,
    path: &Visited,
) -> Vec<Branch> {
    // Blocks grouped by the minimal tool that harvests them, in table order.
    let mut tiers: Vec<(Option<String>, Vec<MineOp>)> = Vec::new();
    for BlockDrop {
        block,
        drop,
        harvest_tools,
    } in ctx.db.blocks_dropping(item)
    {
        if drop.count == 0 {
            continue;
        }
        let tool = if harvest_tools.is_empty() {
            None
        } else {
            match ctx.db.minimal_tool(&harvest_tools) {
                Some(tool) => Some(tool),
                None => continue,
            }
        };
        let op = MineOp {
            block,
            drop,
            tool: tool.clone(),
        };
        match tiers.iter_mut().find(|(t, _)| *t == tool) {
            Some((_, ops)) => ops.push(op),
            None => tiers.push((tool, vec![op])),
        }
    }

    tiers
        .into_iter()
        .filter_map(|(tool, ops)| mine_tier(ctx, remaining, tool, ops, supply, path))
        .collect()
}

fn mine_tier(
    ctx: &PlanContext<'_>,
    remaining: u32,
    tool: Option<String>,
    ops: Vec<MineOp>,
    supply: &Holdings,
    path: &Visited,
) -> Option<Branch> {
    let mut leaves: Vec<TreeNode> = ops
        .into_iter()
        .map(|op| {
            let blocks = remaining.div_ceil(op.drop.count);
            TreeNode::new(NodeKind::Mine(Alternatives::single(op)), blocks, Vec::new())
        })
        .collect();
    let node = if leaves.len() == 1 {
        leaves.pop()?
    } else {
        let options = leaves
            .iter()
            .filter_map(|leaf| match &leaf.kind {
                NodeKind::Mine(ops) => ops.primary().cloned(),
                _ => None,
            })
            .collect();
        TreeNode::new(
            NodeKind::Mine(Alternatives::new(CombineMode::AnyOf, options)),
            remaining,
            leaves,
        )
    };

    let Some(tool) = tool else {
        return Some((node, supply.clone()));
    };
    if supply.has(&tool) {
        return Some((node, supply.clone()));
    }
    if path.contains(&tool) {
        trace!(tool = %tool, "tool is an ancestor, skipping tier");
        return None;
    }
    // The acquisition credits the tool to the branch for later siblings.
    let mut branch = supply.clone();
    let acquire = expand_item(ctx, &tool, 1, &mut branch, path);
    if !acquire.is_satisfiable() {
        debug!(tool = %tool, "harvest tool cannot be obtained");
        return None;
    }
    Some((TreeNode::require(&tool, acquire, node), branch))
}

fn hunt_branches(
    ctx: &PlanContext<'_>,
    item: &str,
    remaining: u32,
    supply: &Holdings,
) -> Vec<Branch> {
    let leaves: Vec<TreeNode> = ctx
        .db
        .mobs_dropping(item)
        .into_iter()
        .filter(|mob| mob.chance > 0.0)
        .map(|mob| {
            let kills = HuntOp::kills_needed(remaining, mob.chance);
            let op = HuntOp {
                mob: mob.mob,
                drop: mob.drop,
                chance: mob.chance,
            };
            TreeNode::new(NodeKind::Hunt(Alternatives::single(op)), kills, Vec::new())
        })
        .collect();
    if leaves.len() <= 1 {
        return leaves
            .into_iter()
            .map(|leaf| (leaf, supply.clone()))
            .collect();
    }
    let options = leaves
        .iter()
        .filter_map(|leaf| match &leaf.kind {
            NodeKind::Hunt(ops) => ops.primary().cloned(),
            _ => None,
        })
        .collect();
    let group = TreeNode::new(
        NodeKind::Hunt(Alternatives::new(CombineMode::AnyOf, options)),
        remaining,
        leaves,
    );
    vec![(group, supply.clone())]
}

/// Collapses gates on items that are held, already acquired by an enclosing
/// gate, or acquired by an earlier sibling of the same AND node.
fn normalize(node: TreeNode, holdings: &Holdings, acquired: &BTreeSet<String>) -> TreeNode {
    let TreeNode {
        kind,
        count,
        children,
    } = node;
    match kind {
        NodeKind::Require(item) => {
            let mut parts = children.into_iter();
            let (Some(acquire), Some(then)) = (parts.next(), parts.next()) else {
                return TreeNode::new(NodeKind::Require(item), count, Vec::new());
            };
            if holdings.has(&item) || acquired.contains(&item) {
                trace!(item = %item, "collapsing satisfied gate");
                return normalize(then, holdings, acquired);
            }
            let acquire = normalize(acquire, holdings, acquired);
            let mut inner = acquired.clone();
            inner.extend(acquisitions(&acquire));
            inner.insert(item.clone());
            let then = normalize(then, holdings, &inner);
            TreeNode::require(&item, acquire, then)
        }
        kind @ (NodeKind::Craft(_) | NodeKind::Smelt(_)) => {
            let mut scope = acquired.clone();
            let mut normalized = Vec::with_capacity(children.len());
            for child in children {
                let child = normalize(child, holdings, &scope);
                scope.extend(acquisitions(&child));
                normalized.push(child);
            }
            TreeNode::new(kind, count, normalized)
        }
        kind => TreeNode::new(
            kind,
            count,
            children
                .into_iter()
                .map(|child| normalize(child, holdings, acquired))
                .collect(),
        ),
    }
}

/// Persistent items that every path through `node` acquires.
fn acquisitions(node: &TreeNode) -> BTreeSet<String> {
    let mut items = match &node.kind {
        NodeKind::Root(_) | NodeKind::Mine(_) | NodeKind::Hunt(_) => {
            if node.count == 0 {
                return BTreeSet::new();
            }
            let mut each = node.children.iter().map(acquisitions);
            let first = each.next().unwrap_or_default();
            each.fold(first, |common, other| {
                common.intersection(&other).cloned().collect()
            })
        }
        NodeKind::Craft(_) | NodeKind::Smelt(_) | NodeKind::Require(_) => {
            node.children.iter().flat_map(acquisitions).collect()
        }
    };
    let what = node.what();
    if let [item] = what.as_slice() {
        let acquires = match node.kind {
            NodeKind::Root(_) => node.count > 0 && !node.children.is_empty(),
            NodeKind::Craft(_) | NodeKind::Smelt(_) | NodeKind::Require(_) => true,
            NodeKind::Mine(_) | NodeKind::Hunt(_) => false,
        };
        if acquires && is_persistent(item) {
            items.insert(item.to_string());
        }
    }
    items
}
