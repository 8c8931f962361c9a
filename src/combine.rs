//! Merging of interchangeable sibling subtrees into variant sets.
//!
//! Recipes and blocks that differ only in material family (oak versus spruce
//! planks, stone versus cobblestone) produce sibling subtrees with the same
//! shape. [`combine_similar`] folds such siblings into one node whose
//! [`Alternatives`] carries every concrete option, so the enumerators see
//! one branch instead of many.
//!
//! Siblings are only merged when their whole subtrees agree once material
//! families are stripped, and children are merged position by position, so
//! the option sets of a merged subtree stay aligned level by level.

use tracing::trace;

use crate::models::{
    family_suffix, Alternatives, CombineMode, CraftOp, ItemCount, NodeKind, TreeNode,
};

/// Merges structurally identical sibling subtrees, bottom-up.
pub fn combine_similar(node: TreeNode) -> TreeNode {
    let TreeNode {
        kind,
        count,
        children,
    } = node;
    let children: Vec<TreeNode> = children.into_iter().map(combine_similar).collect();
    let mut children = merge_siblings(children);

    // A mining or hunting group left with a single member is that member.
    if matches!(kind, NodeKind::Mine(_) | NodeKind::Hunt(_)) && children.len() == 1 {
        if let Some(only) = children.pop() {
            return only;
        }
    }

    match kind {
        NodeKind::Mine(ops) if !children.is_empty() => {
            let options = children
                .iter()
                .filter_map(|child| match &child.kind {
                    NodeKind::Mine(member) => Some(member.clone()),
                    _ => None,
                })
                .fold(Alternatives::new(ops.mode, Vec::new()), append);
            let options = settle(options, |op| op.drop.item.as_str());
            TreeNode::new(NodeKind::Mine(options), count, children)
        }
        NodeKind::Hunt(ops) if !children.is_empty() => {
            let options = children
                .iter()
                .filter_map(|child| match &child.kind {
                    NodeKind::Hunt(member) => Some(member.clone()),
                    _ => None,
                })
                .fold(Alternatives::new(ops.mode, Vec::new()), append);
            let options = settle(options, |op| op.drop.as_str());
            TreeNode::new(NodeKind::Hunt(options), count, children)
        }
        kind => TreeNode::new(kind, count, children),
    }
}

/// Groups siblings by key and signature, keeping first-seen positions.
fn merge_siblings(children: Vec<TreeNode>) -> Vec<TreeNode> {
    let mut buckets: Vec<(Option<String>, Vec<TreeNode>)> = Vec::new();
    for child in children {
        let key = group_key(&child).map(|key| format!("{key}#{}", signature(&child)));
        let position = key
            .as_ref()
            .and_then(|key| buckets.iter().position(|(k, _)| k.as_ref() == Some(key)));
        match position {
            Some(index) => buckets[index].1.push(child),
            None => buckets.push((key, vec![child])),
        }
    }
    buckets
        .into_iter()
        .filter_map(|(_, members)| {
            if members.len() > 1 {
                trace!(members = members.len(), "merging sibling variants");
            }
            merge_members(members)
        })
        .collect()
}

fn ingredient_pattern(ingredients: &[ItemCount]) -> String {
    ingredients
        .iter()
        .map(|i| format!("{}x{}", family_suffix(&i.item), i.count))
        .collect::<Vec<_>>()
        .join(";")
}

fn craft_key(op: &CraftOp) -> String {
    format!(
        "craft|{:?}|{}|{}",
        op.location,
        op.result.count,
        ingredient_pattern(&op.ingredients)
    )
}

/// Key of the group a node may join, or `None` for nodes that never merge.
fn group_key(node: &TreeNode) -> Option<String> {
    match &node.kind {
        NodeKind::Craft(ops) => ops.primary().map(craft_key),
        NodeKind::Mine(ops) if node.children.is_empty() => ops.primary().map(|op| {
            format!(
                "mine|{}|{}|{}",
                op.tool.as_deref().unwrap_or("-"),
                op.drop.item,
                op.drop.count
            )
        }),
        NodeKind::Hunt(ops) if node.children.is_empty() => ops
            .primary()
            .map(|op| format!("hunt|{}|{}", op.drop, node.count)),
        NodeKind::Require(item) => node
            .children
            .get(1)
            .and_then(group_key)
            .map(|inner| format!("require|{item}|{inner}")),
        _ => None,
    }
}

/// Family-independent shape of a whole subtree.
fn signature(node: &TreeNode) -> String {
    let head = match &node.kind {
        NodeKind::Root(what) => format!(
            "root:{}",
            what.primary().map_or("", |name| family_suffix(name))
        ),
        NodeKind::Craft(ops) => ops.primary().map_or_else(String::new, |op| {
            format!(
                "craft:{:?}:{}x{}:{}",
                op.location,
                family_suffix(&op.result.item),
                op.result.count,
                ingredient_pattern(&op.ingredients)
            )
        }),
        NodeKind::Smelt(ops) => ops.primary().map_or_else(String::new, |op| {
            format!(
                "smelt:{}:{}x{}:{}x{}",
                family_suffix(&op.input.item),
                family_suffix(&op.result.item),
                op.result.count,
                op.fuel.item,
                op.fuel.count
            )
        }),
        NodeKind::Mine(ops) => ops.primary().map_or_else(String::new, |op| {
            format!(
                "mine:{}:{}x{}",
                op.tool.as_deref().unwrap_or("-"),
                family_suffix(&op.drop.item),
                op.drop.count
            )
        }),
        NodeKind::Hunt(ops) => ops
            .primary()
            .map_or_else(String::new, |op| format!("hunt:{}", family_suffix(&op.drop))),
        NodeKind::Require(item) => format!("require:{item}"),
    };
    let inner: Vec<String> = node.children.iter().map(signature).collect();
    format!("{head}/{}({})", node.count, inner.join(","))
}

/// Merges a bucket of same-shaped nodes, children position by position.
fn merge_members(members: Vec<TreeNode>) -> Option<TreeNode> {
    let first = members.first()?;
    if members.iter().all(|member| member == first) {
        return members.into_iter().next();
    }

    let count = first.count;
    let width = first.children.len();
    let mut kinds = Vec::with_capacity(members.len());
    let mut columns: Vec<Vec<TreeNode>> = (0..width).map(|_| Vec::new()).collect();
    for member in members {
        kinds.push(member.kind);
        for (column, child) in columns.iter_mut().zip(member.children) {
            column.push(child);
        }
    }

    let kind = merge_kinds(kinds)?;
    let children = columns.into_iter().filter_map(merge_members).collect();
    Some(TreeNode::new(kind, count, children))
}

fn merge_kinds(kinds: Vec<NodeKind>) -> Option<NodeKind> {
    let mut iter = kinds.into_iter();
    let first = iter.next()?;
    let merged = match first {
        NodeKind::Root(what) => {
            let rest = iter.filter_map(|kind| match kind {
                NodeKind::Root(set) => Some(set),
                _ => None,
            });
            NodeKind::Root(with_mode(rest.fold(what, append), CombineMode::OneOf))
        }
        NodeKind::Craft(ops) => {
            let rest = iter.filter_map(|kind| match kind {
                NodeKind::Craft(set) => Some(set),
                _ => None,
            });
            NodeKind::Craft(with_mode(rest.fold(ops, append), CombineMode::OneOf))
        }
        NodeKind::Smelt(ops) => {
            let rest = iter.filter_map(|kind| match kind {
                NodeKind::Smelt(set) => Some(set),
                _ => None,
            });
            NodeKind::Smelt(with_mode(rest.fold(ops, append), CombineMode::OneOf))
        }
        NodeKind::Mine(ops) => {
            let rest = iter.filter_map(|kind| match kind {
                NodeKind::Mine(set) => Some(set),
                _ => None,
            });
            NodeKind::Mine(settle(rest.fold(ops, append), |op| op.drop.item.as_str()))
        }
        NodeKind::Hunt(ops) => {
            let rest = iter.filter_map(|kind| match kind {
                NodeKind::Hunt(set) => Some(set),
                _ => None,
            });
            NodeKind::Hunt(settle(rest.fold(ops, append), |op| op.drop.as_str()))
        }
        NodeKind::Require(item) => NodeKind::Require(item),
    };
    Some(merged)
}

/// Appends the options of `other` not already present.
fn append<T: PartialEq>(mut set: Alternatives<T>, other: Alternatives<T>) -> Alternatives<T> {
    for option in other.options {
        if !set.options.contains(&option) {
            set.options.push(option);
        }
    }
    set
}

fn with_mode<T>(set: Alternatives<T>, mode: CombineMode) -> Alternatives<T> {
    Alternatives::new(mode, set.options)
}

/// `AnyOf` when every option yields the same item, `OneOf` otherwise.
fn settle<T, F>(set: Alternatives<T>, product: F) -> Alternatives<T>
where
    F: Fn(&T) -> &str,
{
    let same = set
        .options
        .windows(2)
        .all(|pair| product(&pair[0]) == product(&pair[1]));
    let mode = if same {
        CombineMode::AnyOf
    } else {
        CombineMode::OneOf
    };
    Alternatives::new(mode, set.options)
}
