//! Item database access for craftplan.
//!
//! The planner only sees the [`ItemDatabase`] trait. [`GameData`] is the
//! bundled implementation, filled from six CSV tables located in the `data/`
//! directory (or embedded into the binary at build time):
//!
//! | file            | columns                              |
//! |-----------------|--------------------------------------|
//! | `recipes.csv`   | `result, count, ingredients, table`  |
//! | `smelting.csv`  | `result, input, count`               |
//! | `fuels.csv`     | `item, smelts`                       |
//! | `blocks.csv`    | `block, drop, count, tools`          |
//! | `mobs.csv`      | `mob, drop, chance`                  |
//! | `tools.csv`     | `tool, tier`                         |

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::DataError;
use crate::models::{
    BlockDrop, BlockRow, Fuel, FuelRow, ItemCount, MobDrop, MobRow, Recipe, RecipeRow,
    SmeltingRecipe, SmeltingRow, ToolRow,
};

/// Read-only queries the planner makes against game data.
///
/// Implementations return empty collections for unknown items; the planner
/// treats absence as "no such strategy".
pub trait ItemDatabase {
    /// Crafting recipes producing `item`, in table order.
    fn recipes_for(&self, item: &str) -> Vec<Recipe>;

    /// Furnace recipes producing `item`.
    fn smelting_inputs_for(&self, item: &str) -> Vec<SmeltingRecipe>;

    /// The preferred fuel.
    fn minimal_fuel(&self) -> Option<Fuel>;

    /// Blocks that drop `item` when broken.
    fn blocks_dropping(&self, item: &str) -> Vec<BlockDrop>;

    /// Creatures that drop `item`.
    fn mobs_dropping(&self, item: &str) -> Vec<MobDrop>;

    /// The lowest-tier tool among `candidates`.
    fn minimal_tool(&self, candidates: &[String]) -> Option<String>;
}

/// Raw CSV text for each table.
#[derive(Debug, Clone, Copy)]
pub struct Tables<'a> {
    pub recipes: &'a str,
    pub smelting: &'a str,
    pub fuels: &'a str,
    pub blocks: &'a str,
    pub mobs: &'a str,
    pub tools: &'a str,
}

impl Tables<'static> {
    /// The tables shipped in `data/`.
    pub fn embedded() -> Self {
        Self {
            recipes: include_str!("../data/recipes.csv"),
            smelting: include_str!("../data/smelting.csv"),
            fuels: include_str!("../data/fuels.csv"),
            blocks: include_str!("../data/blocks.csv"),
            mobs: include_str!("../data/mobs.csv"),
            tools: include_str!("../data/tools.csv"),
        }
    }
}

/// In-memory item database keyed by item name.
#[derive(Debug, Clone, Default)]
pub struct GameData {
    recipes: BTreeMap<String, Vec<Recipe>>,
    smelting: BTreeMap<String, Vec<SmeltingRecipe>>,
    fuels: Vec<Fuel>,
    blocks: BTreeMap<String, Vec<BlockDrop>>,
    mobs: BTreeMap<String, Vec<MobDrop>>,
    tool_tiers: BTreeMap<String, u32>,
}

impl GameData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_recipe(&mut self, recipe: Recipe) {
        self.recipes
            .entry(recipe.result.item.clone())
            .or_default()
            .push(recipe);
    }

    pub fn add_smelting(&mut self, smelt: SmeltingRecipe) {
        self.smelting
            .entry(smelt.result.item.clone())
            .or_default()
            .push(smelt);
    }

    /// Registers a fuel. The first fuel added is the preferred one.
    pub fn add_fuel(&mut self, fuel: Fuel) {
        self.fuels.push(fuel);
    }

    pub fn add_block(&mut self, block: BlockDrop) {
        self.blocks
            .entry(block.drop.item.clone())
            .or_default()
            .push(block);
    }

    pub fn add_mob(&mut self, mob: MobDrop) {
        self.mobs.entry(mob.drop.clone()).or_default().push(mob);
    }

    pub fn add_tool(&mut self, tool: &str, tier: u32) {
        self.tool_tiers.insert(tool.to_string(), tier);
    }

    /// Number of distinct items with at least one crafting recipe.
    pub fn craftable_count(&self) -> usize {
        self.recipes.len()
    }

    /// Names of craftable items, sorted.
    pub fn craftable_items(&self) -> Vec<&str> {
        self.recipes.keys().map(String::as_str).collect()
    }

    /// Builds a database from CSV text.
    ///
    /// # Arguments
    ///
    /// * `tables` - Contents of each CSV table
    ///
    /// # Returns
    ///
    /// The populated database, or the first row that fails to parse
    pub fn parse(tables: &Tables<'_>) -> Result<Self, DataError> {
        let mut data = GameData::new();
        for row in read_table::<RecipeRow, _>("recipes.csv", tables.recipes.as_bytes())? {
            data.add_recipe(recipe_from_row(row)?);
        }
        for row in read_table::<SmeltingRow, _>("smelting.csv", tables.smelting.as_bytes())? {
            data.add_smelting(SmeltingRecipe {
                input: row.input,
                result: ItemCount::new(row.result, row.count),
            });
        }
        for row in read_table::<FuelRow, _>("fuels.csv", tables.fuels.as_bytes())? {
            data.add_fuel(Fuel {
                item: row.item,
                smelts_per_unit: row.smelts,
            });
        }
        for row in read_table::<BlockRow, _>("blocks.csv", tables.blocks.as_bytes())? {
            data.add_block(BlockDrop {
                block: row.block,
                drop: ItemCount::new(row.drop, row.count),
                harvest_tools: split_list(row.tools.as_deref()),
            });
        }
        for row in read_table::<MobRow, _>("mobs.csv", tables.mobs.as_bytes())? {
            if !(row.chance > 0.0 && row.chance <= 1.0) {
                return Err(DataError::InvalidField {
                    file: "mobs.csv".to_string(),
                    field: "chance",
                    value: row.chance.to_string(),
                });
            }
            data.add_mob(MobDrop {
                mob: row.mob,
                drop: row.drop,
                chance: row.chance,
            });
        }
        for row in read_table::<ToolRow, _>("tools.csv", tables.tools.as_bytes())? {
            data.add_tool(&row.tool, row.tier);
        }
        debug!(
            craftable = data.recipes.len(),
            smeltable = data.smelting.len(),
            mineable = data.blocks.len(),
            "loaded item tables"
        );
        Ok(data)
    }

    /// The tables bundled with the crate.
    pub fn embedded() -> Result<Self, DataError> {
        Self::parse(&Tables::embedded())
    }

    /// Loads all item tables from a directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Directory holding `recipes.csv`, `smelting.csv`,
    ///   `fuels.csv`, `blocks.csv`, `mobs.csv` and `tools.csv`
    ///
    /// # Returns
    ///
    /// The populated database, or an error naming the unreadable file or row
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use craftplan::data::GameData;
    ///
    /// let data = GameData::load(Path::new("data")).unwrap();
    /// println!("Loaded {} craftable items", data.craftable_count());
    /// ```
    pub fn load(data_dir: &Path) -> Result<Self, DataError> {
        let recipes = read_file(&data_dir.join("recipes.csv"))?;
        let smelting = read_file(&data_dir.join("smelting.csv"))?;
        let fuels = read_file(&data_dir.join("fuels.csv"))?;
        let blocks = read_file(&data_dir.join("blocks.csv"))?;
        let mobs = read_file(&data_dir.join("mobs.csv"))?;
        let tools = read_file(&data_dir.join("tools.csv"))?;
        Self::parse(&Tables {
            recipes: &recipes,
            smelting: &smelting,
            fuels: &fuels,
            blocks: &blocks,
            mobs: &mobs,
            tools: &tools,
        })
    }
}

impl ItemDatabase for GameData {
    fn recipes_for(&self, item: &str) -> Vec<Recipe> {
        self.recipes.get(item).cloned().unwrap_or_default()
    }

    fn smelting_inputs_for(&self, item: &str) -> Vec<SmeltingRecipe> {
        self.smelting.get(item).cloned().unwrap_or_default()
    }

    fn minimal_fuel(&self) -> Option<Fuel> {
        self.fuels.first().cloned()
    }

    fn blocks_dropping(&self, item: &str) -> Vec<BlockDrop> {
        self.blocks.get(item).cloned().unwrap_or_default()
    }

    fn mobs_dropping(&self, item: &str) -> Vec<MobDrop> {
        self.mobs.get(item).cloned().unwrap_or_default()
    }

    fn minimal_tool(&self, candidates: &[String]) -> Option<String> {
        // Unknown tools rank after every known tier; ties keep table order.
        candidates
            .iter()
            .enumerate()
            .min_by_key(|(position, tool)| {
                (
                    self.tool_tiers.get(tool.as_str()).copied().unwrap_or(u32::MAX),
                    *position,
                )
            })
            .map(|(_, tool)| tool.clone())
    }
}

fn read_file(path: &Path) -> Result<String, DataError> {
    let mut text = String::new();
    File::open(path)
        .and_then(|mut file| file.read_to_string(&mut text))
        .map_err(|source| DataError::Io {
            file: path.display().to_string(),
            source,
        })?;
    Ok(text)
}

fn read_table<T: DeserializeOwned, R: Read>(file: &str, reader: R) -> Result<Vec<T>, DataError> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    rdr.deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| DataError::Csv {
            file: file.to_string(),
            source,
        })
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or("")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses an ingredient list such as `"oak_planks:3;stick:2"`.
fn parse_ingredients(value: &str) -> Option<Vec<ItemCount>> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let (item, count) = pair.split_once(':')?;
            let count = count.trim().parse::<u32>().ok().filter(|c| *c > 0)?;
            Some(ItemCount::new(item.trim(), count))
        })
        .collect()
}

fn recipe_from_row(row: RecipeRow) -> Result<Recipe, DataError> {
    let ingredients = parse_ingredients(&row.ingredients)
        .filter(|list| !list.is_empty())
        .ok_or_else(|| DataError::InvalidField {
            file: "recipes.csv".to_string(),
            field: "ingredients",
            value: row.ingredients.clone(),
        })?;
    if row.count == 0 {
        return Err(DataError::InvalidField {
            file: "recipes.csv".to_string(),
            field: "count",
            value: row.count.to_string(),
        });
    }
    Ok(Recipe {
        result: ItemCount::new(row.result, row.count),
        ingredients,
        needs_table: row.table,
    })
}
