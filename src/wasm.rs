//! WebAssembly bindings for craftplan.
//!
//! This module provides JavaScript-accessible functions for the planner.
//! Inputs and outputs are JSON strings; planning runs against the embedded
//! item tables.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::config::PlannerConfig;
use crate::data::GameData;
use crate::display::describe_step;
use crate::models::{ActionPath, ActionStep, Holdings, TreeNode, WorldSnapshot};
use crate::planner::{plan_with, rank_paths, PlanOptions};

fn default_count() -> u32 {
    1
}

/// JavaScript-friendly planning request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsPlanInput {
    pub item: String,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub holdings: Holdings,
    #[serde(default)]
    pub world: Option<WorldSnapshot>,
    #[serde(default)]
    pub config: PlannerConfig,
    /// Include the acquisition tree in the result
    #[serde(default)]
    pub include_tree: bool,
}

/// JavaScript-friendly path output.
#[derive(Debug, Clone, Serialize)]
pub struct JsPath {
    pub cost: f64,
    pub steps: Vec<ActionStep>,
    pub instructions: Vec<String>,
}

impl From<ActionPath> for JsPath {
    fn from(path: ActionPath) -> Self {
        Self {
            cost: path.cost,
            instructions: path.steps.iter().map(describe_step).collect(),
            steps: path.steps,
        }
    }
}

/// JavaScript-friendly planning result.
#[derive(Debug, Clone, Serialize)]
pub struct JsPlanResult {
    pub success: bool,
    pub error: Option<String>,
    pub item: String,
    pub count: u32,
    pub paths: Vec<JsPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeNode>,
    pub elapsed_ms: f64,
}

impl JsPlanResult {
    fn failure(item: String, count: u32, error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            item,
            count,
            paths: vec![],
            tree: None,
            elapsed_ms: 0.0,
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    0.0
}

#[cfg(target_arch = "wasm32")]
fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn warn(message: &str) {
    tracing::warn!("{message}");
}

fn respond(result: &JsPlanResult) -> String {
    serde_json::to_string(result).unwrap_or_default()
}

/// Plan how to obtain an item.
///
/// Takes a JSON string input and returns a JSON string result.
#[wasm_bindgen]
pub fn plan_item(input_json: &str) -> String {
    let started = now_ms();
    let input: JsPlanInput = match serde_json::from_str(input_json) {
        Ok(i) => i,
        Err(e) => {
            warn(&format!("craftplan: invalid input: {e}"));
            return respond(&JsPlanResult::failure(
                String::new(),
                0,
                format!("Invalid input: {}", e),
            ));
        }
    };

    let data = match GameData::embedded() {
        Ok(data) => data,
        Err(e) => {
            warn(&format!("craftplan: embedded tables failed to load: {e}"));
            return respond(&JsPlanResult::failure(
                input.item,
                input.count,
                format!("Item tables failed to load: {}", e),
            ));
        }
    };

    let options = PlanOptions {
        holdings: input.holdings,
        world: input.world,
    };
    let built = plan_with(&data, &input.item, input.count, &options, &input.config);
    let paths = rank_paths(&built, &options, &input.config);
    let tree = input.include_tree.then_some(built);

    let error = paths
        .is_empty()
        .then(|| format!("No way to obtain {} x {} was found.", input.count, input.item));
    respond(&JsPlanResult {
        success: error.is_none(),
        error,
        item: input.item,
        count: input.count,
        paths: paths.into_iter().map(JsPath::from).collect(),
        tree,
        elapsed_ms: now_ms() - started,
    })
}

/// Get the version of the planner.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get the names of all craftable items as a JSON array.
#[wasm_bindgen]
pub fn get_craftable_items() -> String {
    match GameData::embedded() {
        Ok(data) => serde_json::to_string(&data.craftable_items()).unwrap_or_default(),
        Err(e) => {
            warn(&format!("craftplan: embedded tables failed to load: {e}"));
            "[]".to_string()
        }
    }
}
