//! Path simulation and clean-up.
//!
//! [`simulate`] replays a path against holdings and reports whether every
//! step can be executed. [`sanitize`] removes redundant steps from a path
//! produced by the enumerators without ever making a valid path invalid.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::models::{
    is_persistent, ActionStep, CraftLocation, Holdings, ItemCount, StepAction, CRAFTING_TABLE,
    FURNACE,
};

/// Replays `steps` from `holdings`, using each step's primary option.
///
/// Without `require_stations` only resource flow is checked. With it, table
/// crafts also need a crafting table, smelts a furnace, and tool-gated mining
/// its tool, held at the time of the step.
pub fn simulate(steps: &[ActionStep], holdings: &Holdings, require_stations: bool) -> bool {
    let mut supply = holdings.clone();
    steps
        .iter()
        .all(|step| apply_step(step, &mut supply, require_stations))
}

fn apply_step(step: &ActionStep, supply: &mut Holdings, require_stations: bool) -> bool {
    match &step.action {
        StepAction::Craft(ops) => {
            let Some(op) = ops.primary() else {
                return false;
            };
            if require_stations
                && op.location == CraftLocation::Table
                && !supply.has(CRAFTING_TABLE)
            {
                return false;
            }
            let consumed = op
                .ingredients
                .iter()
                .all(|i| supply.consume(&i.item, i.count.saturating_mul(step.count)));
            if consumed {
                supply.add(&op.result.item, op.result.count.saturating_mul(step.count));
            }
            consumed
        }
        StepAction::Smelt(ops) => {
            let Some(op) = ops.primary() else {
                return false;
            };
            if require_stations && !supply.has(FURNACE) {
                return false;
            }
            if !supply.consume(&op.input.item, op.input.count.saturating_mul(step.count))
                || !supply.consume(&op.fuel.item, op.fuel.count)
            {
                return false;
            }
            supply.add(&op.result.item, op.result.count.saturating_mul(step.count));
            true
        }
        StepAction::Mine(ops) => {
            let Some(op) = ops.primary() else {
                return false;
            };
            if require_stations {
                if let Some(tool) = &op.tool {
                    if !supply.has(tool) {
                        return false;
                    }
                }
            }
            supply.add(&op.drop.item, step.produced());
            true
        }
        StepAction::Hunt(ops) => {
            let Some(op) = ops.primary() else {
                return false;
            };
            supply.add(&op.drop, step.produced());
            true
        }
    }
}

/// Everything a step needs present before it runs, persistent items included.
fn step_needs(step: &ActionStep) -> Vec<ItemCount> {
    match &step.action {
        StepAction::Craft(ops) => ops.primary().map_or_else(Vec::new, |op| {
            let mut needs: Vec<ItemCount> = op
                .ingredients
                .iter()
                .map(|i| ItemCount::new(i.item.clone(), i.count.saturating_mul(step.count)))
                .collect();
            if op.location == CraftLocation::Table {
                needs.push(ItemCount::new(CRAFTING_TABLE, 1));
            }
            needs
        }),
        StepAction::Smelt(ops) => ops.primary().map_or_else(Vec::new, |op| {
            vec![
                ItemCount::new(
                    op.input.item.clone(),
                    op.input.count.saturating_mul(step.count),
                ),
                op.fuel.clone(),
                ItemCount::new(FURNACE, 1),
            ]
        }),
        StepAction::Mine(ops) => ops
            .primary()
            .and_then(|op| op.tool.clone())
            .map(|tool| vec![ItemCount::new(tool, 1)])
            .unwrap_or_default(),
        StepAction::Hunt(_) => Vec::new(),
    }
}

/// Removes repeated acquisitions of persistent items and steps whose output
/// nothing downstream uses.
///
/// Returns the original steps when the cleaned path would not simulate with
/// stations required.
pub fn sanitize(steps: &[ActionStep], holdings: &Holdings) -> Vec<ActionStep> {
    let target = steps.last().and_then(ActionStep::product);
    let deduped = dedupe_persistent(steps, target);
    let trimmed = drop_unneeded(&deduped, holdings, target);
    if trimmed.len() == steps.len() {
        return steps.to_vec();
    }
    if simulate(&trimmed, holdings, true) {
        trace!(removed = steps.len() - trimmed.len(), "sanitized path");
        trimmed
    } else {
        debug!("sanitized path fails simulation, keeping original");
        steps.to_vec()
    }
}

/// Keeps only the first step producing each persistent item other than the
/// target.
fn dedupe_persistent(steps: &[ActionStep], target: Option<&str>) -> Vec<ActionStep> {
    let mut acquired = BTreeSet::new();
    steps
        .iter()
        .filter(|step| match step.product() {
            Some(item) if is_persistent(item) && Some(item) != target => {
                acquired.insert(item.to_string())
            }
            _ => true,
        })
        .cloned()
        .collect()
}

/// Walks backwards from the final step, keeping only steps that satisfy
/// outstanding demand.
///
/// Steps producing the target are always kept.
fn drop_unneeded(
    steps: &[ActionStep],
    holdings: &Holdings,
    target: Option<&str>,
) -> Vec<ActionStep> {
    let mut demand: BTreeMap<String, u32> = BTreeMap::new();
    let mut kept = Vec::with_capacity(steps.len());
    for step in steps.iter().rev() {
        let Some(item) = step.product() else {
            continue;
        };
        let outstanding = demand.get(item).copied().unwrap_or(0);
        if Some(item) == target {
            demand.remove(item);
        } else if outstanding == 0 {
            continue;
        } else if is_persistent(item) {
            demand.remove(item);
            if holdings.has(item) {
                continue;
            }
        } else {
            match outstanding.saturating_sub(step.produced()) {
                0 => demand.remove(item),
                left => demand.insert(item.to_string(), left),
            };
        }

        for need in step_needs(step) {
            let entry = demand.entry(need.item.clone()).or_insert(0);
            if is_persistent(&need.item) {
                *entry = (*entry).max(1);
            } else {
                *entry = entry.saturating_add(need.count);
            }
        }
        kept.push(step.clone());
    }
    kept.reverse();
    kept
}
