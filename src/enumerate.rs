//! Path enumerators over a finished acquisition tree.
//!
//! A [`PathEnumerator`] pulls raw paths from the node streams, sanitizes each
//! one and only yields it when it simulates with stations and tools
//! required. Yielded costs are those of the sanitized steps. Enumerators hold
//! no state beyond their own streams, so calling [`enumerate`] again restarts
//! from scratch.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::PlannerConfig;
use crate::models::{ActionPath, Holdings, TreeNode};
use crate::stream::{
    node_stream, ActionWeight, CostModel, PathLength, PathStream, StreamContext, Unordered,
};
use crate::validate::{sanitize, simulate};

/// Order in which an enumerator yields paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Every valid path, alternatives in tree order.
    All,
    /// Fewest steps first.
    Shortest,
    /// Lowest summed action weight first.
    LowestWeight,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::All, Strategy::Shortest, Strategy::LowestWeight];

    fn cost_model(self, config: &PlannerConfig) -> Rc<dyn CostModel> {
        match self {
            Strategy::All => Rc::new(Unordered),
            Strategy::Shortest => Rc::new(PathLength {
                biases: config.biases.clone(),
            }),
            Strategy::LowestWeight => Rc::new(ActionWeight::from_config(config)),
        }
    }
}

/// A sanitized path waiting to be yielded.
struct Ready {
    seq: u64,
    path: ActionPath,
}

impl PartialEq for Ready {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ready {}

impl PartialOrd for Ready {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ready {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; earlier arrivals win ties.
        other
            .path
            .cost
            .total_cmp(&self.path.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Lazy sequence of executable paths for one tree.
///
/// Sanitizing can only remove steps, so a cleaned path never costs more than
/// its raw path. Cleaned paths are held back until the next raw path costs
/// at least as much as the cheapest of them. Sibling gates on one item are
/// collapsed when the tree is built, so raw paths are normally already clean
/// and the output is non-decreasing in the cost of the steps yielded.
pub struct PathEnumerator<'a> {
    inner: PathStream<'a>,
    holdings: &'a Holdings,
    strategy: Strategy,
    model: Rc<dyn CostModel>,
    /// Next raw path, pulled one ahead of the ready buffer.
    lookahead: Option<ActionPath>,
    ready: BinaryHeap<Ready>,
    started: bool,
    seq: u64,
}

impl PathEnumerator<'_> {
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Sanitizes a raw path and recosts it if any step was dropped.
    fn clean(&self, raw: ActionPath) -> Option<ActionPath> {
        let cleaned = sanitize(&raw.steps, self.holdings);
        if !simulate(&cleaned, self.holdings, true) {
            debug!(
                strategy = ?self.strategy,
                steps = raw.steps.len(),
                "rejecting path that fails station or tool checks"
            );
            return None;
        }
        if cleaned == raw.steps {
            return Some(raw);
        }
        let cost = self.model.path_cost(&cleaned, self.holdings);
        trace!(
            before = raw.steps.len(),
            after = cleaned.len(),
            cost,
            "recosted sanitized path"
        );
        Some(ActionPath::new(cleaned, cost))
    }
}

impl Iterator for PathEnumerator<'_> {
    type Item = ActionPath;

    fn next(&mut self) -> Option<ActionPath> {
        if !self.started {
            self.started = true;
            self.lookahead = self.inner.next();
        }
        loop {
            let bound = self.lookahead.as_ref().map(|raw| raw.cost);
            let releasable = self
                .ready
                .peek()
                .is_some_and(|best| bound.map_or(true, |bound| best.path.cost <= bound));
            if releasable {
                return self.ready.pop().map(|ready| ready.path);
            }

            let raw = self.lookahead.take()?;
            self.lookahead = self.inner.next();
            if let Some(path) = self.clean(raw) {
                self.seq += 1;
                self.ready.push(Ready {
                    seq: self.seq,
                    path,
                });
            }
        }
    }
}

/// Enumerates paths for `tree` with the default configuration.
pub fn enumerate<'a>(
    tree: &'a TreeNode,
    holdings: &'a Holdings,
    strategy: Strategy,
) -> PathEnumerator<'a> {
    enumerate_with(tree, holdings, strategy, &PlannerConfig::default())
}

/// Enumerates paths for `tree`, costed with the weights and biases of
/// `config`.
pub fn enumerate_with<'a>(
    tree: &'a TreeNode,
    holdings: &'a Holdings,
    strategy: Strategy,
    config: &PlannerConfig,
) -> PathEnumerator<'a> {
    let model = strategy.cost_model(config);
    let cx = StreamContext::new(holdings, Rc::clone(&model), config.max_expansions);
    PathEnumerator {
        inner: node_stream(tree, &cx),
        holdings,
        strategy,
        model,
        lookahead: None,
        ready: BinaryHeap::new(),
        started: false,
        seq: 0,
    }
}
