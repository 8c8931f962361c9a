//! Pruning of the acquisition tree against what the world actually offers.
//!
//! Mining and hunting leaves are checked against the counts in a
//! [`WorldSnapshot`]. Options with no nearby source are dropped, the first
//! survivor becomes the primary, and the tree is then repaired upwards so
//! that crafts only keep variants whose ingredients can still be supplied.

use tracing::debug;

use crate::models::{
    family_prefix, family_suffix, Alternatives, CombineMode, CraftOp, NodeKind, SmeltOp,
    TreeNode, WorldSnapshot,
};

/// Which table of the snapshot a source name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Block,
    Entity,
}

/// Read-only view over the source counts of a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct WorldBudget<'a> {
    snapshot: &'a WorldSnapshot,
}

impl<'a> WorldBudget<'a> {
    pub fn new(snapshot: &'a WorldSnapshot) -> Self {
        Self { snapshot }
    }

    /// Sources of `name` available nearby.
    pub fn available(&self, kind: SourceKind, name: &str) -> u32 {
        let table = match kind {
            SourceKind::Block => &self.snapshot.blocks,
            SourceKind::Entity => &self.snapshot.entities,
        };
        table.get(name).copied().unwrap_or(0)
    }

    /// Total sources across `names`.
    pub fn sum<'n>(&self, kind: SourceKind, names: impl IntoIterator<Item = &'n str>) -> u32 {
        names
            .into_iter()
            .map(|name| self.available(kind, name))
            .fold(0, u32::saturating_add)
    }

    /// Whether `name` alone covers `needed`.
    pub fn can(&self, kind: SourceKind, name: &str, needed: u32) -> bool {
        self.available(kind, name) >= needed
    }
}

/// The material family most abundant among nearby logs.
///
/// # Example
///
/// ```
/// use craftplan::models::WorldSnapshot;
/// use craftplan::world::family_hint;
///
/// let mut world = WorldSnapshot::default();
/// world.blocks.insert("birch_log".to_string(), 12);
/// world.blocks.insert("oak_log".to_string(), 3);
/// assert_eq!(family_hint(&world).as_deref(), Some("birch"));
/// ```
pub fn family_hint(snapshot: &WorldSnapshot) -> Option<String> {
    snapshot
        .blocks
        .iter()
        .filter(|(name, count)| **count > 0 && family_suffix(name) == "log")
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .and_then(|(name, _)| family_prefix(name))
        .map(str::to_string)
}

/// Prunes everything the world cannot supply. The top-level root is always
/// returned, possibly without children.
pub fn prune_unavailable(root: TreeNode, budget: &WorldBudget<'_>) -> TreeNode {
    let fallback = TreeNode::new(root.kind.clone(), root.count, Vec::new());
    filter_node(root, budget).unwrap_or_else(|| {
        debug!("world cannot supply any strategy for the target");
        fallback
    })
}

fn filter_node(node: TreeNode, budget: &WorldBudget<'_>) -> Option<TreeNode> {
    let TreeNode {
        kind,
        count,
        children,
    } = node;

    if children.is_empty() {
        return match kind {
            NodeKind::Mine(ops) => filter_sources(ops, count, SourceKind::Block, budget, |op| {
                op.block.as_str()
            })
            .map(|ops| TreeNode::new(NodeKind::Mine(ops), count, Vec::new())),
            NodeKind::Hunt(ops) => filter_sources(ops, count, SourceKind::Entity, budget, |op| {
                op.mob.as_str()
            })
            .map(|ops| TreeNode::new(NodeKind::Hunt(ops), count, Vec::new())),
            NodeKind::Root(_) if count > 0 => None,
            kind => Some(TreeNode::new(kind, count, Vec::new())),
        };
    }

    match kind {
        // OR nodes keep whatever survives.
        NodeKind::Root(mut what) => {
            let children: Vec<TreeNode> = children
                .into_iter()
                .filter_map(|child| filter_node(child, budget))
                .collect();
            if children.is_empty() {
                return None;
            }
            let produced: Vec<&str> = children.iter().flat_map(products).collect();
            if what.iter().any(|name| produced.contains(&name.as_str())) {
                what.retain(|name| produced.contains(&name.as_str()));
            }
            Some(TreeNode::new(NodeKind::Root(what), count, children))
        }
        NodeKind::Mine(ops) => {
            let children = filter_or(children, budget)?;
            let ops = regroup(ops, &children, |child| match &child.kind {
                NodeKind::Mine(member) => Some(member.options.clone()),
                _ => None,
            });
            Some(TreeNode::new(NodeKind::Mine(ops), count, children))
        }
        NodeKind::Hunt(ops) => {
            let children = filter_or(children, budget)?;
            let ops = regroup(ops, &children, |child| match &child.kind {
                NodeKind::Hunt(member) => Some(member.options.clone()),
                _ => None,
            });
            Some(TreeNode::new(NodeKind::Hunt(ops), count, children))
        }
        // AND nodes need every child.
        kind => {
            let width = children.len();
            let children: Vec<TreeNode> = children
                .into_iter()
                .map_while(|child| filter_node(child, budget))
                .collect();
            if children.len() != width {
                return None;
            }
            match kind {
                NodeKind::Craft(ops) => repair_craft(ops, children, count),
                NodeKind::Smelt(ops) => repair_smelt(ops, children, count),
                kind => Some(TreeNode::new(kind, count, children)),
            }
        }
    }
}

fn filter_or(children: Vec<TreeNode>, budget: &WorldBudget<'_>) -> Option<Vec<TreeNode>> {
    let children: Vec<TreeNode> = children
        .into_iter()
        .filter_map(|child| filter_node(child, budget))
        .collect();
    (!children.is_empty()).then_some(children)
}

/// Rebuilds a group node's options from its surviving members.
fn regroup<T, F>(ops: Alternatives<T>, children: &[TreeNode], options_of: F) -> Alternatives<T>
where
    F: Fn(&TreeNode) -> Option<Vec<T>>,
{
    let options: Vec<T> = children.iter().filter_map(options_of).flatten().collect();
    Alternatives::new(ops.mode, options)
}

/// Applies the world budget to a mining or hunting leaf.
fn filter_sources<T, F>(
    mut set: Alternatives<T>,
    needed: u32,
    kind: SourceKind,
    budget: &WorldBudget<'_>,
    source: F,
) -> Option<Alternatives<T>>
where
    F: Fn(&T) -> &str,
{
    if !set.is_grouped() {
        let total = budget.sum(kind, set.iter().map(&source));
        return (total >= needed).then_some(set);
    }

    let mode = set.mode;
    set.retain(|option| budget.available(kind, source(option)) > 0);
    match mode {
        CombineMode::AnyOf => {
            if budget.sum(kind, set.iter().map(&source)) < needed {
                return None;
            }
        }
        _ => set.retain(|option| budget.can(kind, source(option), needed)),
    }
    if set.is_empty() {
        debug!("no nearby source for grouped leaf");
        return None;
    }
    Some(set)
}

/// Items a subtree can hand to its parent.
fn products(node: &TreeNode) -> Vec<&str> {
    match &node.kind {
        NodeKind::Require(_) => node.children.get(1).map(products).unwrap_or_default(),
        NodeKind::Mine(_) | NodeKind::Hunt(_) if !node.children.is_empty() => {
            node.children.iter().flat_map(products).collect()
        }
        _ => node.what(),
    }
}

/// Names a child can supply to the ingredient slot it fills.
fn supplied(node: &TreeNode) -> Vec<&str> {
    match &node.kind {
        NodeKind::Root(what) => what.iter().map(String::as_str).collect(),
        _ => products(node),
    }
}

/// Keeps craft variants whose ingredients the surviving children still
/// supply, then narrows each child to the ingredients of those variants.
fn repair_craft(
    mut ops: Alternatives<CraftOp>,
    children: Vec<TreeNode>,
    count: u32,
) -> Option<TreeNode> {
    if ops.is_grouped() {
        let slots: Vec<Vec<&str>> = children.iter().map(supplied).collect();
        ops.retain(|op| {
            op.ingredients.iter().enumerate().all(|(slot, ingredient)| {
                slots
                    .get(slot)
                    .is_some_and(|names| names.contains(&ingredient.item.as_str()))
            })
        });
        if ops.is_empty() {
            debug!("no craft variant survives the world budget");
            return None;
        }
    }
    let children = restrict_slots(children, |slot| {
        ops.iter()
            .filter_map(|op| op.ingredients.get(slot))
            .map(|ingredient| ingredient.item.clone())
            .collect()
    })?;
    Some(TreeNode::new(NodeKind::Craft(ops), count, children))
}

fn repair_smelt(
    mut ops: Alternatives<SmeltOp>,
    children: Vec<TreeNode>,
    count: u32,
) -> Option<TreeNode> {
    if ops.is_grouped() {
        let inputs: Vec<&str> = children.first().map(supplied).unwrap_or_default();
        ops.retain(|op| inputs.contains(&op.input.item.as_str()));
        if ops.is_empty() {
            return None;
        }
    }
    let children = restrict_slots(children, |slot| match slot {
        0 => ops.iter().map(|op| op.input.item.clone()).collect(),
        _ => Vec::new(),
    })?;
    Some(TreeNode::new(NodeKind::Smelt(ops), count, children))
}

/// Restricts each child to the names its slot allows. An empty allow-list
/// leaves the child untouched.
fn restrict_slots<F>(children: Vec<TreeNode>, allowed_for: F) -> Option<Vec<TreeNode>>
where
    F: Fn(usize) -> Vec<String>,
{
    children
        .into_iter()
        .enumerate()
        .map(|(slot, child)| {
            let allowed = allowed_for(slot);
            if allowed.is_empty() {
                Some(child)
            } else {
                restrict(child, &allowed)
            }
        })
        .collect()
}

/// Narrows a subtree so it only produces names in `allowed`.
///
/// Returns `None` when nothing in the subtree can produce an allowed name.
pub fn restrict(node: TreeNode, allowed: &[String]) -> Option<TreeNode> {
    let TreeNode {
        kind,
        count,
        children,
    } = node;
    let permits = |name: &str| allowed.iter().any(|a| a == name);

    match kind {
        NodeKind::Root(mut what) => {
            what.retain(|name| permits(name.as_str()));
            if what.is_empty() {
                return None;
            }
            if count == 0 || children.is_empty() {
                return Some(TreeNode::new(NodeKind::Root(what), count, children));
            }
            let children: Vec<TreeNode> = children
                .into_iter()
                .filter_map(|child| restrict(child, allowed))
                .collect();
            if children.is_empty() {
                return None;
            }
            Some(TreeNode::new(NodeKind::Root(what), count, children))
        }
        NodeKind::Craft(mut ops) => {
            ops.retain(|op| permits(op.result.item.as_str()));
            if ops.is_empty() {
                return None;
            }
            let children = restrict_slots(children, |slot| {
                ops.iter()
                    .filter_map(|op| op.ingredients.get(slot))
                    .map(|ingredient| ingredient.item.clone())
                    .collect()
            })?;
            Some(TreeNode::new(NodeKind::Craft(ops), count, children))
        }
        NodeKind::Smelt(mut ops) => {
            ops.retain(|op| permits(op.result.item.as_str()));
            if ops.is_empty() {
                return None;
            }
            let children = restrict_slots(children, |slot| match slot {
                0 => ops.iter().map(|op| op.input.item.clone()).collect(),
                _ => Vec::new(),
            })?;
            Some(TreeNode::new(NodeKind::Smelt(ops), count, children))
        }
        NodeKind::Mine(mut ops) => {
            ops.retain(|op| permits(op.drop.item.as_str()));
            if ops.is_empty() {
                return None;
            }
            let children = restrict_group(children, allowed)?;
            Some(TreeNode::new(NodeKind::Mine(ops), count, children))
        }
        NodeKind::Hunt(mut ops) => {
            ops.retain(|op| permits(op.drop.as_str()));
            if ops.is_empty() {
                return None;
            }
            let children = restrict_group(children, allowed)?;
            Some(TreeNode::new(NodeKind::Hunt(ops), count, children))
        }
        NodeKind::Require(item) => {
            let mut parts = children.into_iter();
            let acquire = parts.next()?;
            let then = restrict(parts.next()?, allowed)?;
            Some(TreeNode::require(&item, acquire, then))
        }
    }
}

fn restrict_group(children: Vec<TreeNode>, allowed: &[String]) -> Option<Vec<TreeNode>> {
    if children.is_empty() {
        return Some(children);
    }
    let children: Vec<TreeNode> = children
        .into_iter()
        .filter_map(|child| restrict(child, allowed))
        .collect();
    (!children.is_empty()).then_some(children)
}
