//! High-level planning entry points.
//!
//! [`plan`] builds, combines and prunes the acquisition tree for a target;
//! [`enumerate`] walks it lazily; [`rank_paths`] runs every strategy over a
//! built tree and returns the aggregated, ranked union, which
//! [`find_best_paths`] does from scratch.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::aggregate;
use crate::builder::{build, PlanContext};
use crate::combine::combine_similar;
use crate::config::PlannerConfig;
use crate::data::ItemDatabase;
use crate::models::{ActionPath, Holdings, TreeNode, WorldSnapshot};
use crate::stream::ActionWeight;
use crate::world::{family_hint, prune_unavailable, WorldBudget};

pub use crate::enumerate::{enumerate, enumerate_with, PathEnumerator, Strategy};

/// What the agent has and what is around it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanOptions {
    #[serde(default)]
    pub holdings: Holdings,
    #[serde(default)]
    pub world: Option<WorldSnapshot>,
}

impl PlanOptions {
    pub fn with_holdings(holdings: Holdings) -> Self {
        Self {
            holdings,
            world: None,
        }
    }
}

/// Builds the acquisition tree for `count` of `item` with default settings.
///
/// # Arguments
///
/// * `db` - Item database to plan against
/// * `item` - Name of the item to obtain
/// * `count` - How many are wanted
/// * `options` - Holdings and optional world snapshot
///
/// # Returns
///
/// The root of the tree. It has `count == 0` when holdings already cover
/// the demand and no children when the item cannot be obtained.
///
/// # Example
///
/// ```
/// use craftplan::data::GameData;
/// use craftplan::planner::{plan, PlanOptions};
///
/// let data = GameData::embedded().unwrap();
/// let tree = plan(&data, "stick", 4, &PlanOptions::default());
/// assert_eq!(tree.count, 4);
/// assert!(!tree.children.is_empty());
/// ```
pub fn plan(db: &dyn ItemDatabase, item: &str, count: u32, options: &PlanOptions) -> TreeNode {
    plan_with(db, item, count, options, &PlannerConfig::default())
}

/// Builds the acquisition tree, combining variants and pruning against the
/// world snapshot as `config` allows.
///
/// # Arguments
///
/// * `db` - Item database to plan against
/// * `item` - Name of the item to obtain
/// * `count` - How many are wanted
/// * `options` - Holdings and optional world snapshot
/// * `config` - Planner settings
///
/// # Returns
///
/// The root of the finished tree
pub fn plan_with(
    db: &dyn ItemDatabase,
    item: &str,
    count: u32,
    options: &PlanOptions,
    config: &PlannerConfig,
) -> TreeNode {
    let hint = options.world.as_ref().and_then(family_hint);
    let ctx = PlanContext::new(db).with_family_hint(hint);

    let mut tree = build(item, count, &options.holdings, &ctx);
    if config.combine_similar {
        tree = combine_similar(tree);
    }
    if let Some(world) = options.world.as_ref().filter(|_| config.prune_with_world) {
        tree = prune_unavailable(tree, &WorldBudget::new(world));
    }
    info!(
        item,
        count,
        nodes = tree.node_count(),
        strategies = tree.children.len(),
        "built acquisition tree"
    );
    tree
}

/// Runs every enumeration strategy and returns the ranked union of their
/// first `config.per_generator_limit` paths.
///
/// # Arguments
///
/// * `db` - Item database to plan against
/// * `item` - Name of the item to obtain
/// * `count` - How many are wanted
/// * `options` - Holdings and optional world snapshot
/// * `config` - Planner settings, weights and limits
///
/// # Returns
///
/// Ranked paths, best first. An empty result means the target cannot be
/// obtained.
pub fn find_best_paths(
    db: &dyn ItemDatabase,
    item: &str,
    count: u32,
    options: &PlanOptions,
    config: &PlannerConfig,
) -> Vec<ActionPath> {
    let tree = plan_with(db, item, count, options, config);
    rank_paths(&tree, options, config)
}

/// Runs every enumeration strategy over an already built tree and ranks the
/// union of their first `config.per_generator_limit` paths.
///
/// # Arguments
///
/// * `tree` - Tree returned by [`plan_with`] for the same holdings
/// * `options` - Holdings and optional world snapshot
/// * `config` - Planner settings, weights and limits
///
/// # Returns
///
/// Ranked paths, best first
pub fn rank_paths(
    tree: &TreeNode,
    options: &PlanOptions,
    config: &PlannerConfig,
) -> Vec<ActionPath> {
    let batches = Strategy::ALL
        .iter()
        .map(|&strategy| {
            enumerate_with(tree, &options.holdings, strategy, config)
                .take(config.per_generator_limit)
                .collect()
        })
        .collect();
    let paths = aggregate(
        batches,
        &options.holdings,
        &ActionWeight::from_config(config),
        options.world.as_ref(),
    );
    info!(
        item = tree.what().first().copied().unwrap_or_default(),
        paths = paths.len(),
        "ranked candidate paths"
    );
    paths
}
