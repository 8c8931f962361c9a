//! Data models and structures for craftplan.
//!
//! This module contains the core data structures used throughout the planner:
//! the acquisition tree, the tagged alternative sets attached to its nodes,
//! concrete action steps and paths, holdings, world snapshots, and the raw
//! CSV row structures used by the item tables.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the crafting station required by table recipes.
pub const CRAFTING_TABLE: &str = "crafting_table";

/// Name of the station required by every smelting operation.
pub const FURNACE: &str = "furnace";

const TOOL_SUFFIXES: [&str; 5] = ["_pickaxe", "_axe", "_shovel", "_hoe", "_sword"];

// Material families whose members are interchangeable in recipes.
const FAMILY_PREFIXES: [&str; 28] = [
    "dark_oak", "pale_oak", "oak", "spruce", "birch", "jungle", "acacia", "mangrove", "cherry",
    "bamboo", "crimson", "warped", "light_blue", "light_gray", "white", "orange", "magenta",
    "yellow", "lime", "pink", "gray", "cyan", "purple", "blue", "brown", "green", "red", "black",
];

/// Returns `true` for tool items (pickaxes, axes, shovels, hoes, swords, shears).
pub fn is_tool(name: &str) -> bool {
    name == "shears" || TOOL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Returns `true` for crafting stations.
pub fn is_station(name: &str) -> bool {
    name == CRAFTING_TABLE || name == FURNACE
}

/// Returns `true` for items that are never consumed once acquired.
///
/// # Example
///
/// ```
/// use craftplan::models::is_persistent;
///
/// assert!(is_persistent("crafting_table"));
/// assert!(is_persistent("stone_pickaxe"));
/// assert!(!is_persistent("stick"));
/// ```
pub fn is_persistent(name: &str) -> bool {
    is_station(name) || is_tool(name)
}

/// Returns the material family of an item, if it belongs to one.
pub fn family_prefix(name: &str) -> Option<&'static str> {
    FAMILY_PREFIXES.iter().copied().find(|family| {
        name.len() > family.len() + 1
            && name.starts_with(family)
            && name.as_bytes()[family.len()] == b'_'
    })
}

/// Strips the material family from an item name.
///
/// # Example
///
/// ```
/// use craftplan::models::family_suffix;
///
/// assert_eq!(family_suffix("spruce_planks"), "planks");
/// assert_eq!(family_suffix("dark_oak_log"), "log");
/// assert_eq!(family_suffix("stick"), "stick");
/// ```
pub fn family_suffix(name: &str) -> &str {
    match family_prefix(name) {
        Some(family) => &name[family.len() + 1..],
        None => name,
    }
}

// ============================================================================
// Alternatives
// ============================================================================

/// How the options of an [`Alternatives`] set relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineMode {
    /// A single concrete option.
    #[default]
    None,
    /// Options produce different outputs; exactly one may be realized.
    OneOf,
    /// Options all produce the same output; any of them suffices.
    AnyOf,
}

/// A tagged set of concrete options. The first option is the primary one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternatives<T> {
    pub mode: CombineMode,
    pub options: Vec<T>,
}

impl<T> Alternatives<T> {
    pub fn single(option: T) -> Self {
        Self {
            mode: CombineMode::None,
            options: vec![option],
        }
    }

    pub fn new(mode: CombineMode, options: Vec<T>) -> Self {
        let mode = if options.len() > 1 { mode } else { CombineMode::None };
        Self { mode, options }
    }

    pub fn primary(&self) -> Option<&T> {
        self.options.first()
    }

    /// Whether more than one option is carried.
    pub fn is_grouped(&self) -> bool {
        self.options.len() > 1
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.options.iter()
    }

    /// Keeps only matching options, preserving order so the first survivor
    /// becomes the primary.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.options.retain(keep);
        if self.options.len() <= 1 {
            self.mode = CombineMode::None;
        }
    }
}

// ============================================================================
// Operations
// ============================================================================

/// An item name with a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemCount {
    pub item: String,
    pub count: u32,
}

impl ItemCount {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }
}

/// Where a recipe is crafted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraftLocation {
    Inventory,
    Table,
}

/// One concrete crafting recipe, quantities per craft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftOp {
    pub location: CraftLocation,
    pub result: ItemCount,
    pub ingredients: Vec<ItemCount>,
}

/// One concrete smelting operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmeltOp {
    /// Input consumed per smelt
    pub input: ItemCount,
    /// Output produced per smelt
    pub result: ItemCount,
    /// Fuel consumed by the whole step
    pub fuel: ItemCount,
}

/// Breaking one kind of block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineOp {
    pub block: String,
    /// Item dropped per block broken
    pub drop: ItemCount,
    /// Minimal tool able to harvest the block, if one is needed
    pub tool: Option<String>,
}

/// Killing one kind of creature for a drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HuntOp {
    pub mob: String,
    pub drop: String,
    /// Probability of the drop per kill, in `(0, 1]`
    pub chance: f64,
}

impl HuntOp {
    /// Number of kills needed to expect `count` drops.
    pub fn kills_needed(count: u32, chance: f64) -> u32 {
        if chance <= 0.0 {
            return u32::MAX;
        }
        ((count as f64 / chance) - 1e-9).ceil().max(0.0) as u32
    }

    /// Drops expected from `kills` kills.
    pub fn expected_drops(&self, kills: u32) -> u32 {
        (kills as f64 * self.chance + 1e-9).floor() as u32
    }
}

// ============================================================================
// Tree
// ============================================================================

/// Kind of a tree node or action step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Root,
    Craft,
    Smelt,
    Mine,
    Hunt,
    Require,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Root => "root",
            ActionKind::Craft => "craft",
            ActionKind::Smelt => "smelt",
            ActionKind::Mine => "mine",
            ActionKind::Hunt => "hunt",
            ActionKind::Require => "require",
        };
        f.write_str(name)
    }
}

/// Kind-specific payload of a [`TreeNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// OR over the strategies for obtaining an item.
    Root(Alternatives<String>),
    /// AND over ingredient subtrees, followed by the craft itself.
    Craft(Alternatives<CraftOp>),
    /// AND over input and fuel subtrees, followed by the smelt itself.
    Smelt(Alternatives<SmeltOp>),
    /// A mining step when childless, otherwise an OR group over mining steps.
    Mine(Alternatives<MineOp>),
    /// A hunting step when childless, otherwise an OR group over hunting steps.
    Hunt(Alternatives<HuntOp>),
    /// A gate on a persistent item; children are `[acquisition, continuation]`.
    Require(String),
}

/// A node of the acquisition tree.
///
/// `count` is always the demand still unmet after holdings were deducted:
/// items for roots, crafts for craft nodes, smelts for smelt nodes, blocks for
/// mining nodes and kills for hunting nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub kind: NodeKind,
    pub count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(kind: NodeKind, count: u32, children: Vec<TreeNode>) -> Self {
        Self {
            kind,
            count,
            children,
        }
    }

    /// A childless root for `item`.
    pub fn root(item: &str, count: u32) -> Self {
        Self::new(NodeKind::Root(Alternatives::single(item.to_string())), count, Vec::new())
    }

    /// A gate that acquires `item` before running `then`.
    pub fn require(item: &str, acquire: TreeNode, then: TreeNode) -> Self {
        Self::new(NodeKind::Require(item.to_string()), 1, vec![acquire, then])
    }

    pub fn action(&self) -> ActionKind {
        match &self.kind {
            NodeKind::Root(_) => ActionKind::Root,
            NodeKind::Craft(_) => ActionKind::Craft,
            NodeKind::Smelt(_) => ActionKind::Smelt,
            NodeKind::Mine(_) => ActionKind::Mine,
            NodeKind::Hunt(_) => ActionKind::Hunt,
            NodeKind::Require(_) => ActionKind::Require,
        }
    }

    pub fn mode(&self) -> CombineMode {
        match &self.kind {
            NodeKind::Root(what) => what.mode,
            NodeKind::Craft(ops) => ops.mode,
            NodeKind::Smelt(ops) => ops.mode,
            NodeKind::Mine(ops) => ops.mode,
            NodeKind::Hunt(ops) => ops.mode,
            NodeKind::Require(_) => CombineMode::None,
        }
    }

    /// Names of the items this node targets, primary first.
    pub fn what(&self) -> Vec<&str> {
        match &self.kind {
            NodeKind::Root(what) => what.iter().map(String::as_str).collect(),
            NodeKind::Craft(ops) => ops.iter().map(|op| op.result.item.as_str()).collect(),
            NodeKind::Smelt(ops) => ops.iter().map(|op| op.result.item.as_str()).collect(),
            NodeKind::Mine(ops) => ops.iter().map(|op| op.drop.item.as_str()).collect(),
            NodeKind::Hunt(ops) => ops.iter().map(|op| op.drop.as_str()).collect(),
            NodeKind::Require(item) => vec![item.as_str()],
        }
    }

    /// Whether the node still has a way to be satisfied: unmet roots need at
    /// least one strategy left.
    pub fn is_satisfiable(&self) -> bool {
        match self.kind {
            NodeKind::Root(_) => self.count == 0 || !self.children.is_empty(),
            _ => true,
        }
    }

    /// The concrete step this node performs, if it is a step node.
    pub fn as_step(&self) -> Option<ActionStep> {
        let action = match &self.kind {
            NodeKind::Craft(ops) => StepAction::Craft(ops.clone()),
            NodeKind::Smelt(ops) => StepAction::Smelt(ops.clone()),
            NodeKind::Mine(ops) if self.children.is_empty() => StepAction::Mine(ops.clone()),
            NodeKind::Hunt(ops) if self.children.is_empty() => StepAction::Hunt(ops.clone()),
            _ => return None,
        };
        Some(ActionStep {
            count: self.count,
            action,
        })
    }

    /// Total number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// Visits every node of the subtree, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TreeNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

// ============================================================================
// Steps and paths
// ============================================================================

/// The concrete operation of an [`ActionStep`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Craft(Alternatives<CraftOp>),
    Smelt(Alternatives<SmeltOp>),
    Mine(Alternatives<MineOp>),
    Hunt(Alternatives<HuntOp>),
}

/// A single executable step. Options beyond the primary are carried through
/// so the executor can substitute one at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    pub count: u32,
    pub action: StepAction,
}

impl ActionStep {
    pub fn kind(&self) -> ActionKind {
        match self.action {
            StepAction::Craft(_) => ActionKind::Craft,
            StepAction::Smelt(_) => ActionKind::Smelt,
            StepAction::Mine(_) => ActionKind::Mine,
            StepAction::Hunt(_) => ActionKind::Hunt,
        }
    }

    /// The item the primary option produces.
    pub fn product(&self) -> Option<&str> {
        match &self.action {
            StepAction::Craft(ops) => ops.primary().map(|op| op.result.item.as_str()),
            StepAction::Smelt(ops) => ops.primary().map(|op| op.result.item.as_str()),
            StepAction::Mine(ops) => ops.primary().map(|op| op.drop.item.as_str()),
            StepAction::Hunt(ops) => ops.primary().map(|op| op.drop.as_str()),
        }
    }

    /// Quantity of [`product`](Self::product) the primary option yields.
    pub fn produced(&self) -> u32 {
        match &self.action {
            StepAction::Craft(ops) => ops
                .primary()
                .map_or(0, |op| op.result.count.saturating_mul(self.count)),
            StepAction::Smelt(ops) => ops
                .primary()
                .map_or(0, |op| op.result.count.saturating_mul(self.count)),
            StepAction::Mine(ops) => ops
                .primary()
                .map_or(0, |op| op.drop.count.saturating_mul(self.count)),
            StepAction::Hunt(ops) => ops.primary().map_or(0, |op| op.expected_drops(self.count)),
        }
    }
}

/// An ordered, executable sequence of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPath {
    pub steps: Vec<ActionStep>,
    /// Search cost under the cost model that produced the path
    pub cost: f64,
}

impl ActionPath {
    pub fn new(steps: Vec<ActionStep>, cost: f64) -> Self {
        Self { steps, cost }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

// ============================================================================
// Holdings and world
// ============================================================================

/// Items currently available, by name.
///
/// # Example
///
/// ```
/// use craftplan::models::Holdings;
///
/// let mut holdings: Holdings = [("planks", 3)].into_iter().collect();
/// assert_eq!(holdings.take("planks", 5), 3);
/// assert!(!holdings.has("planks"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Holdings(BTreeMap<String, u32>);

impl Holdings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, item: &str) -> u32 {
        self.0.get(item).copied().unwrap_or(0)
    }

    pub fn has(&self, item: &str) -> bool {
        self.get(item) > 0
    }

    pub fn add(&mut self, item: &str, count: u32) {
        if count == 0 {
            return;
        }
        let entry = self.0.entry(item.to_string()).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Removes up to `count` of `item`, returning how many were taken.
    pub fn take(&mut self, item: &str, count: u32) -> u32 {
        let held = self.get(item);
        let taken = held.min(count);
        if taken == held {
            self.0.remove(item);
        } else {
            self.0.insert(item.to_string(), held - taken);
        }
        taken
    }

    /// Removes exactly `count` of `item`; leaves holdings untouched and
    /// returns `false` when not enough is held.
    pub fn consume(&mut self, item: &str, count: u32) -> bool {
        if self.get(item) < count {
            return false;
        }
        self.take(item, count);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(item, count)| (item.as_str(), *count))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Holdings {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut holdings = Holdings::new();
        for (item, count) in iter {
            holdings.add(&item.into(), count);
        }
        holdings
    }
}

/// Counts of resource sources near the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    #[serde(default)]
    pub blocks: BTreeMap<String, u32>,
    #[serde(default)]
    pub entities: BTreeMap<String, u32>,
    /// Distance to the nearest instance of a block or entity
    #[serde(default)]
    pub distances: BTreeMap<String, f64>,
}

// ============================================================================
// Item database records
// ============================================================================

/// A crafting recipe as stored in the item tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub result: ItemCount,
    pub ingredients: Vec<ItemCount>,
    pub needs_table: bool,
}

impl Recipe {
    pub fn new(result: (&str, u32), ingredients: &[(&str, u32)], needs_table: bool) -> Self {
        Self {
            result: ItemCount::new(result.0, result.1),
            ingredients: ingredients
                .iter()
                .map(|(item, count)| ItemCount::new(*item, *count))
                .collect(),
            needs_table,
        }
    }

    /// Ingredient quantities per craft, with repeated entries summed.
    pub fn ingredient_counts(&self) -> Vec<ItemCount> {
        let mut counts: Vec<ItemCount> = Vec::new();
        for ingredient in &self.ingredients {
            match counts.iter_mut().find(|c| c.item == ingredient.item) {
                Some(existing) => existing.count = existing.count.saturating_add(ingredient.count),
                None => counts.push(ingredient.clone()),
            }
        }
        counts
    }
}

/// A furnace mapping from one input item to a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmeltingRecipe {
    pub input: String,
    pub result: ItemCount,
}

impl SmeltingRecipe {
    pub fn new(input: &str, result: (&str, u32)) -> Self {
        Self {
            input: input.to_string(),
            result: ItemCount::new(result.0, result.1),
        }
    }
}

/// A furnace fuel and how many smelts one unit powers.
#[derive(Debug, Clone, PartialEq)]
pub struct Fuel {
    pub item: String,
    pub smelts_per_unit: f64,
}

impl Fuel {
    pub fn new(item: &str, smelts_per_unit: f64) -> Self {
        Self {
            item: item.to_string(),
            smelts_per_unit,
        }
    }

    /// Fuel units needed for `smelts` operations.
    pub fn units_for(&self, smelts: u32) -> u32 {
        if self.smelts_per_unit <= 0.0 {
            return smelts;
        }
        ((smelts as f64 / self.smelts_per_unit) - 1e-9).ceil().max(1.0) as u32
    }
}

/// A block and what it drops when broken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDrop {
    pub block: String,
    pub drop: ItemCount,
    /// Tools able to harvest the block; empty when no tool is needed
    pub harvest_tools: Vec<String>,
}

impl BlockDrop {
    pub fn new(block: &str, drop: (&str, u32), harvest_tools: &[&str]) -> Self {
        Self {
            block: block.to_string(),
            drop: ItemCount::new(drop.0, drop.1),
            harvest_tools: harvest_tools.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// A creature and one of its drops.
#[derive(Debug, Clone, PartialEq)]
pub struct MobDrop {
    pub mob: String,
    pub drop: String,
    pub chance: f64,
}

impl MobDrop {
    pub fn new(mob: &str, drop: &str, chance: f64) -> Self {
        Self {
            mob: mob.to_string(),
            drop: drop.to_string(),
            chance,
        }
    }
}

// ============================================================================
// CSV Row Structures
// ============================================================================

/// CSV row structure for crafting recipes.
#[derive(Debug, Deserialize)]
pub struct RecipeRow {
    /// Crafted item
    pub result: String,
    /// Items produced per craft
    pub count: u32,
    /// Semicolon-separated `item:count` pairs
    pub ingredients: String,
    /// Whether a crafting table is required
    pub table: bool,
}

/// CSV row structure for furnace recipes.
#[derive(Debug, Deserialize)]
pub struct SmeltingRow {
    pub result: String,
    pub input: String,
    /// Items produced per smelt
    pub count: u32,
}

/// CSV row structure for fuels, in order of preference.
#[derive(Debug, Deserialize)]
pub struct FuelRow {
    pub item: String,
    pub smelts: f64,
}

/// CSV row structure for block drops.
#[derive(Debug, Deserialize)]
pub struct BlockRow {
    pub block: String,
    pub drop: String,
    pub count: u32,
    /// Semicolon-separated harvest tools (empty = none needed)
    pub tools: Option<String>,
}

/// CSV row structure for creature drops.
#[derive(Debug, Deserialize)]
pub struct MobRow {
    pub mob: String,
    pub drop: String,
    pub chance: f64,
}

/// CSV row structure for tool tiers.
#[derive(Debug, Deserialize)]
pub struct ToolRow {
    pub tool: String,
    pub tier: u32,
}
