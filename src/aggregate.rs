//! Merging and ranking of paths collected from several enumerators.

use tracing::debug;

use crate::models::{ActionPath, ActionStep, Holdings, StepAction, WorldSnapshot};
use crate::stream::{ActionWeight, CostModel};

/// Folds repeated mining of the same blocks with the same tool into the
/// first occurrence, summing counts.
pub fn hoist_mining(steps: &[ActionStep]) -> Vec<ActionStep> {
    let mut hoisted: Vec<ActionStep> = Vec::with_capacity(steps.len());
    for step in steps {
        if let StepAction::Mine(ops) = &step.action {
            let earlier = hoisted
                .iter_mut()
                .find(|seen| matches!(&seen.action, StepAction::Mine(other) if other == ops));
            if let Some(earlier) = earlier {
                earlier.count = earlier.count.saturating_add(step.count);
                continue;
            }
        }
        hoisted.push(step.clone());
    }
    hoisted
}

/// Summed distance to the sources a path mines or hunts. Sources missing
/// from the snapshot count as unreachable.
pub fn travel_distance(steps: &[ActionStep], world: &WorldSnapshot) -> f64 {
    steps
        .iter()
        .map(|step| {
            let sources: Vec<&str> = match &step.action {
                StepAction::Mine(ops) => ops.iter().map(|op| op.block.as_str()).collect(),
                StepAction::Hunt(ops) => ops.iter().map(|op| op.mob.as_str()).collect(),
                _ => return 0.0,
            };
            sources
                .iter()
                .filter_map(|source| world.distances.get(*source).copied())
                .min_by(f64::total_cmp)
                .unwrap_or(f64::INFINITY)
        })
        .sum()
}

/// Hoists mining, removes duplicates and orders the union of `batches` by
/// action weight, breaking ties by travel distance when a snapshot is known.
///
/// Paths are re-costed with `model`, so batches from differently ordered
/// enumerators become comparable.
pub fn aggregate(
    batches: Vec<Vec<ActionPath>>,
    holdings: &Holdings,
    model: &ActionWeight,
    world: Option<&WorldSnapshot>,
) -> Vec<ActionPath> {
    let mut unique: Vec<(ActionPath, f64)> = Vec::new();
    let mut duplicates = 0usize;
    for path in batches.into_iter().flatten() {
        let steps = hoist_mining(&path.steps);
        // Steps carry floats, so equality is checked structurally.
        if unique.iter().any(|(seen, _)| seen.steps == steps) {
            duplicates += 1;
            continue;
        }
        let cost = model.path_cost(&steps, holdings);
        let distance = world.map_or(0.0, |world| travel_distance(&steps, world));
        unique.push((ActionPath::new(steps, cost), distance));
    }
    if duplicates > 0 {
        debug!(duplicates, kept = unique.len(), "dropped duplicate paths");
    }

    unique.sort_by(|(a, da), (b, db)| a.cost.total_cmp(&b.cost).then(da.total_cmp(db)));
    unique.into_iter().map(|(path, _)| path).collect()
}
