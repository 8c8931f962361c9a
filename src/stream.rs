//! Lazy path streams over the acquisition tree.
//!
//! Every node is turned into a boxed iterator of [`ActionPath`]s. Leaves
//! yield one single-step path, OR nodes merge their children's streams and
//! AND nodes combine one path from each child, then append their own step.
//!
//! Under an ordered [`CostModel`], child streams are non-decreasing in cost,
//! so the OR merge is a k-way heap merge and the AND merge walks the lattice
//! of index vectors with a min-heap, which keeps every stream non-decreasing.
//! An unordered model takes branches in insertion order and combinations in
//! odometer order instead.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::config::{ActionWeights, Biases, PlannerConfig};
use crate::models::{
    is_tool, ActionPath, ActionStep, Holdings, NodeKind, StepAction, TreeNode,
};
use crate::validate::simulate;

/// A lazily evaluated sequence of candidate paths.
pub type PathStream<'a> = Box<dyn Iterator<Item = ActionPath> + 'a>;

/// Assigns a cost to each step of a path.
pub trait CostModel {
    /// Whether streams must be merged in cost order.
    fn ordered(&self) -> bool {
        true
    }

    fn step_cost(&self, step: &ActionStep, holdings: &Holdings) -> f64;

    fn path_cost(&self, steps: &[ActionStep], holdings: &Holdings) -> f64 {
        steps.iter().map(|step| self.step_cost(step, holdings)).sum()
    }
}

/// Offset applied to crafts whose ingredients are not all held yet.
fn missing_ingredient_bias(step: &ActionStep, holdings: &Holdings, biases: &Biases) -> f64 {
    let StepAction::Craft(ops) = &step.action else {
        return 0.0;
    };
    let Some(op) = ops.primary() else {
        return 0.0;
    };
    let missing = op
        .ingredients
        .iter()
        .any(|i| holdings.get(&i.item) < i.count.saturating_mul(step.count));
    match (missing, is_tool(&op.result.item)) {
        (false, _) => 0.0,
        (true, true) => biases.tool,
        (true, false) => biases.consumable,
    }
}

/// No ordering; every path costs nothing.
#[derive(Debug, Clone, Default)]
pub struct Unordered;

impl CostModel for Unordered {
    fn ordered(&self) -> bool {
        false
    }

    fn step_cost(&self, _step: &ActionStep, _holdings: &Holdings) -> f64 {
        0.0
    }
}

/// One unit per step, plus the missing-ingredient bias.
#[derive(Debug, Clone, Default)]
pub struct PathLength {
    pub biases: Biases,
}

impl CostModel for PathLength {
    fn step_cost(&self, step: &ActionStep, holdings: &Holdings) -> f64 {
        1.0 + missing_ingredient_bias(step, holdings, &self.biases)
    }
}

/// Per-kind step weights, plus the missing-ingredient bias.
#[derive(Debug, Clone, Default)]
pub struct ActionWeight {
    pub weights: ActionWeights,
    pub biases: Biases,
}

impl ActionWeight {
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            weights: config.weights.clone(),
            biases: config.biases.clone(),
        }
    }
}

impl CostModel for ActionWeight {
    fn step_cost(&self, step: &ActionStep, holdings: &Holdings) -> f64 {
        let location = match &step.action {
            StepAction::Craft(ops) => ops.primary().map(|op| op.location),
            _ => None,
        };
        let weight = self.weights.weight(step.kind(), location);
        weight + missing_ingredient_bias(step, holdings, &self.biases)
    }
}

/// What every stream of one enumeration shares.
#[derive(Clone)]
pub struct StreamContext<'a> {
    pub holdings: &'a Holdings,
    pub model: Rc<dyn CostModel>,
    /// Combinations an AND merge may examine before giving up
    pub max_expansions: usize,
}

impl<'a> StreamContext<'a> {
    pub fn new(holdings: &'a Holdings, model: Rc<dyn CostModel>, max_expansions: usize) -> Self {
        Self {
            holdings,
            model,
            max_expansions,
        }
    }
}

/// Builds the stream for a subtree.
pub fn node_stream<'a>(node: &'a TreeNode, cx: &StreamContext<'a>) -> PathStream<'a> {
    let children = || -> Vec<PathStream<'a>> {
        node.children
            .iter()
            .map(|child| node_stream(child, cx))
            .collect()
    };
    match &node.kind {
        NodeKind::Root(_) if node.count == 0 => empty_path(),
        NodeKind::Root(_) => or_merge(children(), cx),
        NodeKind::Require(_) => and_merge(children(), None, cx),
        NodeKind::Craft(_) | NodeKind::Smelt(_) => and_merge(children(), node.as_step(), cx),
        NodeKind::Mine(_) | NodeKind::Hunt(_) => match node.as_step() {
            Some(step) => leaf(step, cx),
            None => or_merge(children(), cx),
        },
    }
}

/// A stream yielding the single empty path.
pub fn empty_path<'a>() -> PathStream<'a> {
    Box::new(std::iter::once(ActionPath::default()))
}

/// A stream yielding one single-step path.
pub fn leaf<'a>(step: ActionStep, cx: &StreamContext<'a>) -> PathStream<'a> {
    let cost = cx.model.step_cost(&step, cx.holdings);
    Box::new(std::iter::once(ActionPath::new(vec![step], cost)))
}

/// Merges alternative streams.
pub fn or_merge<'a>(sources: Vec<PathStream<'a>>, cx: &StreamContext<'a>) -> PathStream<'a> {
    if cx.model.ordered() {
        Box::new(OrMerge::new(sources))
    } else {
        Box::new(sources.into_iter().flatten())
    }
}

/// Combines one path from each part, in order, then appends `step`.
///
/// Combinations whose resource flow fails against the enumeration's
/// holdings are skipped.
pub fn and_merge<'a>(
    parts: Vec<PathStream<'a>>,
    step: Option<ActionStep>,
    cx: &StreamContext<'a>,
) -> PathStream<'a> {
    let step_cost = step
        .as_ref()
        .map_or(0.0, |step| cx.model.step_cost(step, cx.holdings));
    let combiner = Combiner {
        parts: parts.into_iter().map(Buffered::new).collect(),
        step,
        step_cost,
        holdings: cx.holdings,
        max_expansions: cx.max_expansions,
        examined: 0,
    };
    if cx.model.ordered() {
        Box::new(LatticeMerge::new(combiner))
    } else {
        Box::new(ProductMerge::new(combiner))
    }
}

// ============================================================================
// OR merge
// ============================================================================

struct Pending {
    cost: f64,
    seq: u64,
    source: usize,
    path: ActionPath,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; earlier arrivals win ties.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct OrMerge<'a> {
    sources: Vec<PathStream<'a>>,
    heap: BinaryHeap<Pending>,
    primed: bool,
    seq: u64,
}

impl<'a> OrMerge<'a> {
    fn new(sources: Vec<PathStream<'a>>) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(sources.len()),
            sources,
            primed: false,
            seq: 0,
        }
    }

    fn pull(&mut self, source: usize) {
        let Some(stream) = self.sources.get_mut(source) else {
            return;
        };
        if let Some(path) = stream.next() {
            self.heap.push(Pending {
                cost: path.cost,
                seq: self.seq,
                source,
                path,
            });
            self.seq += 1;
        }
    }
}

impl Iterator for OrMerge<'_> {
    type Item = ActionPath;

    fn next(&mut self) -> Option<ActionPath> {
        if !self.primed {
            self.primed = true;
            for source in 0..self.sources.len() {
                self.pull(source);
            }
        }
        let best = self.heap.pop()?;
        self.pull(best.source);
        Some(best.path)
    }
}

// ============================================================================
// AND merge
// ============================================================================

/// A child stream with the paths pulled from it so far.
struct Buffered<'a> {
    source: PathStream<'a>,
    items: Vec<ActionPath>,
    exhausted: bool,
}

impl<'a> Buffered<'a> {
    fn new(source: PathStream<'a>) -> Self {
        Self {
            source,
            items: Vec::new(),
            exhausted: false,
        }
    }

    /// Pulls until `index` is buffered; returns whether it exists.
    fn fill(&mut self, index: usize) -> bool {
        while self.items.len() <= index && !self.exhausted {
            match self.source.next() {
                Some(path) => self.items.push(path),
                None => self.exhausted = true,
            }
        }
        index < self.items.len()
    }

    fn cost(&self, index: usize) -> f64 {
        self.items.get(index).map_or(f64::INFINITY, |path| path.cost)
    }
}

/// Shared state of both AND merge strategies.
struct Combiner<'a> {
    parts: Vec<Buffered<'a>>,
    step: Option<ActionStep>,
    step_cost: f64,
    holdings: &'a Holdings,
    max_expansions: usize,
    examined: usize,
}

impl Combiner<'_> {
    fn cost_of(&self, indices: &[usize]) -> f64 {
        self.parts
            .iter()
            .zip(indices)
            .map(|(part, &index)| part.cost(index))
            .sum()
    }

    fn fill_all(&mut self, indices: &[usize]) -> bool {
        self.parts
            .iter_mut()
            .zip(indices)
            .all(|(part, &index)| part.fill(index))
    }

    /// Counts one examined combination; false once the budget is spent.
    fn charge(&mut self) -> bool {
        self.examined += 1;
        if self.examined > self.max_expansions {
            debug!(
                examined = self.examined,
                "combination budget exhausted, closing stream"
            );
            return false;
        }
        true
    }

    /// Concatenates the chosen paths and the own step, if the result is
    /// resource-feasible.
    fn assemble(&self, indices: &[usize], cost: f64) -> Option<ActionPath> {
        let mut steps = Vec::new();
        for (part, &index) in self.parts.iter().zip(indices) {
            steps.extend(part.items.get(index)?.steps.iter().cloned());
        }
        steps.extend(self.step.iter().cloned());
        if !simulate(&steps, self.holdings, false) {
            trace!(steps = steps.len(), "combination overdraws holdings");
            return None;
        }
        Some(ActionPath::new(steps, cost + self.step_cost))
    }
}

struct Frontier {
    cost: f64,
    seq: u64,
    indices: Vec<usize>,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Best-first walk over the lattice of child index vectors.
struct LatticeMerge<'a> {
    combiner: Combiner<'a>,
    heap: BinaryHeap<Frontier>,
    seen: HashSet<Vec<usize>>,
    started: bool,
    seq: u64,
}

impl<'a> LatticeMerge<'a> {
    fn new(combiner: Combiner<'a>) -> Self {
        Self {
            combiner,
            heap: BinaryHeap::new(),
            seen: HashSet::new(),
            started: false,
            seq: 0,
        }
    }

    fn push(&mut self, indices: Vec<usize>) {
        if self.seen.contains(&indices) || !self.combiner.fill_all(&indices) {
            return;
        }
        let cost = self.combiner.cost_of(&indices);
        self.seen.insert(indices.clone());
        self.heap.push(Frontier {
            cost,
            seq: self.seq,
            indices,
        });
        self.seq += 1;
    }
}

impl Iterator for LatticeMerge<'_> {
    type Item = ActionPath;

    fn next(&mut self) -> Option<ActionPath> {
        if !self.started {
            self.started = true;
            self.push(vec![0; self.combiner.parts.len()]);
        }
        while let Some(frontier) = self.heap.pop() {
            if !self.combiner.charge() {
                self.heap.clear();
                return None;
            }
            for position in 0..frontier.indices.len() {
                let mut successor = frontier.indices.clone();
                successor[position] += 1;
                self.push(successor);
            }
            if let Some(path) = self.combiner.assemble(&frontier.indices, frontier.cost) {
                return Some(path);
            }
        }
        None
    }
}

/// Odometer walk over child index vectors, last child fastest.
struct ProductMerge<'a> {
    combiner: Combiner<'a>,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl<'a> ProductMerge<'a> {
    fn new(combiner: Combiner<'a>) -> Self {
        let width = combiner.parts.len();
        Self {
            combiner,
            indices: vec![0; width],
            started: false,
            done: false,
        }
    }

    fn advance(&mut self) -> bool {
        if !self.started {
            self.started = true;
            return self.combiner.fill_all(&self.indices);
        }
        for position in (0..self.indices.len()).rev() {
            self.indices[position] += 1;
            if self.combiner.parts[position].fill(self.indices[position]) {
                return true;
            }
            self.indices[position] = 0;
        }
        false
    }
}

impl Iterator for ProductMerge<'_> {
    type Item = ActionPath;

    fn next(&mut self) -> Option<ActionPath> {
        while !self.done {
            if !self.advance() || !self.combiner.charge() {
                self.done = true;
                break;
            }
            let cost = self.combiner.cost_of(&self.indices);
            if let Some(path) = self.combiner.assemble(&self.indices, cost) {
                return Some(path);
            }
        }
        None
    }
}
