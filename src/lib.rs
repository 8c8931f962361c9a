//! # craftplan
//!
//! A command-line tool and library for planning how an agent in a block
//! world obtains an item.
//!
//! Given a target item, a quantity, the agent's current holdings and
//! optionally a snapshot of nearby resources, the planner:
//!
//! - Builds an AND/OR acquisition tree over crafting, smelting, mining and
//!   hunting, deducting holdings as it goes
//! - Folds interchangeable material variants into single branches
//! - Prunes branches the surrounding world cannot supply
//! - Lazily enumerates executable step sequences in several orders
//! - Cleans, deduplicates and ranks the resulting paths
//!
//! ## Modules
//!
//! - [`models`] - Core data structures for trees, steps, paths and holdings
//! - [`data`] - Item database trait and CSV-backed implementation
//! - [`builder`] - Acquisition tree construction
//! - [`combine`] - Merging of material variants
//! - [`world`] - Pruning against a world snapshot
//! - [`stream`] - Lazy path stream algebra and cost models
//! - [`enumerate`] - Path enumerators
//! - [`validate`] - Path simulation and sanitization
//! - [`aggregate`] - Ranking of collected paths
//! - [`planner`] - High-level entry points
//! - [`display`] - Output formatting and display utilities
//!
//! ## Example Usage
//!
//! ```no_run
//! use craftplan::{
//!     config::PlannerConfig,
//!     data::GameData,
//!     display::display_paths,
//!     models::Holdings,
//!     planner::{find_best_paths, PlanOptions},
//! };
//!
//! // Load the bundled item tables
//! let data = GameData::embedded().unwrap();
//!
//! // Already holding a crafting table and some planks
//! let holdings: Holdings = [("crafting_table", 1), ("oak_planks", 3)].into_iter().collect();
//! let options = PlanOptions::with_holdings(holdings);
//!
//! let paths = find_best_paths(&data, "wooden_pickaxe", 1, &options, &PlannerConfig::default());
//! display_paths("wooden_pickaxe", 1, &paths);
//! ```
//!
//! ## Enumeration Strategies
//!
//! 1. **All**: every valid path, alternatives in tree order.
//! 2. **Shortest**: fewest steps first.
//! 3. **Lowest weight**: cheapest by per-action weights first (inventory
//!    craft 1, table craft 2, smelt 5, mine 10, hunt 25 by default).

pub mod aggregate;
pub mod builder;
pub mod combine;
pub mod config;
pub mod data;
pub mod display;
pub mod enumerate;
pub mod error;
pub mod models;
pub mod planner;
pub mod stream;
pub mod validate;
pub mod wasm;
pub mod world;
