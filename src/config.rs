//! Planner configuration.
//!
//! Every field has a default, so a JSON file only needs to name the values it
//! overrides:
//!
//! ```
//! use craftplan::config::PlannerConfig;
//!
//! let config = PlannerConfig::from_json_str(r#"{ "per_generator_limit": 5 }"#).unwrap();
//! assert_eq!(config.per_generator_limit, 5);
//! assert!(config.combine_similar);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{ActionKind, CraftLocation};

/// Per-step weights used by the lowest-weight cost model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionWeights {
    pub inventory_craft: f64,
    pub table_craft: f64,
    pub smelt: f64,
    pub mine: f64,
    pub hunt: f64,
}

impl Default for ActionWeights {
    fn default() -> Self {
        Self {
            inventory_craft: 1.0,
            table_craft: 2.0,
            smelt: 5.0,
            mine: 10.0,
            hunt: 25.0,
        }
    }
}

impl ActionWeights {
    /// Weight of one step of the given kind. Craft location only matters for
    /// crafts.
    pub fn weight(&self, kind: ActionKind, location: Option<CraftLocation>) -> f64 {
        match kind {
            ActionKind::Craft => match location {
                Some(CraftLocation::Table) => self.table_craft,
                _ => self.inventory_craft,
            },
            ActionKind::Smelt => self.smelt,
            ActionKind::Mine => self.mine,
            ActionKind::Hunt => self.hunt,
            ActionKind::Root | ActionKind::Require => 0.0,
        }
    }
}

/// Small cost offsets applied to crafts whose ingredients are not yet held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Biases {
    /// Applied when the crafted item is a consumable
    pub consumable: f64,
    /// Applied when the crafted item is a tool
    pub tool: f64,
}

impl Default for Biases {
    fn default() -> Self {
        Self {
            consumable: 0.001,
            tool: 0.01,
        }
    }
}

/// Tunables for tree construction, enumeration and aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Paths taken from each enumerator before aggregation
    pub per_generator_limit: usize,
    /// Merge structurally identical sibling subtrees into variant sets
    pub combine_similar: bool,
    /// Prune the tree against the world snapshot when one is supplied
    pub prune_with_world: bool,
    /// Combinations examined by a single AND merge before it gives up
    pub max_expansions: usize,
    pub weights: ActionWeights,
    pub biases: Biases,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            per_generator_limit: 20,
            combine_similar: true,
            prune_with_world: true,
            max_expansions: 4096,
            weights: ActionWeights::default(),
            biases: Biases::default(),
        }
    }
}

impl PlannerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}
