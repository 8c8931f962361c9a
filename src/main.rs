//! craftplan - Command Line Interface
//!
//! This is the main entry point for the acquisition planner.
//! Run with `--help` to see all available options.

use clap::{Parser, ValueEnum};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use craftplan::{
    config::PlannerConfig,
    data::GameData,
    display::{display_paths, display_tree},
    models::{Holdings, WorldSnapshot},
    planner::{enumerate_with, plan_with, rank_paths, PlanOptions, Strategy},
};

/// Which enumerator to take paths from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Run every enumerator and rank the union
    Best,
    /// Every valid path in tree order
    All,
    /// Fewest steps first
    Shortest,
    /// Lowest action weight first
    Weight,
}

/// Command-line arguments for craftplan.
#[derive(Parser, Debug)]
#[command(name = "craftplan")]
#[command(author, version, about = "Plan how to craft, smelt, mine or hunt for an item", long_about = None)]
struct Args {
    /// Item to obtain
    #[arg(short, long)]
    item: String,

    /// How many to obtain
    #[arg(short, long, default_value = "1")]
    count: u32,

    /// Item already held, as name=count (repeatable)
    #[arg(long = "have", value_parser = parse_holding)]
    have: Vec<(String, u32)>,

    /// JSON world snapshot with nearby block and entity counts
    #[arg(short, long)]
    world: Option<PathBuf>,

    /// Directory with item tables (defaults to the embedded tables)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// JSON planner configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Paths to take from each enumerator
    #[arg(short, long)]
    limit: Option<usize>,

    /// Enumeration strategy
    #[arg(short, long, value_enum, default_value = "best")]
    strategy: StrategyArg,

    /// Also print the acquisition tree
    #[arg(long, default_value = "false")]
    tree: bool,
}

fn parse_holding(value: &str) -> Result<(String, u32), String> {
    let (item, count) = value
        .split_once('=')
        .ok_or_else(|| format!("expected name=count, got {value:?}"))?;
    let count = count
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid count in {value:?}: {e}"))?;
    Ok((item.trim().to_string(), count))
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    if let Some(limit) = args.limit {
        config.per_generator_limit = limit;
    }

    let data = match &args.data {
        Some(dir) => GameData::load(dir)?,
        None => GameData::embedded()?,
    };
    let world: Option<WorldSnapshot> = match &args.world {
        Some(path) => Some(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => None,
    };
    let holdings: Holdings = args.have.iter().cloned().collect();

    println!("craftplan - Acquisition Planner");
    println!("================================================================");
    println!();
    println!("Configuration:");
    println!("  Target:          {} x {}", args.count, args.item);
    println!("  Strategy:        {:?}", args.strategy);
    println!("  Paths/strategy:  {}", config.per_generator_limit);
    if holdings.is_empty() {
        println!("  Holdings:        (none)");
    } else {
        let held: Vec<String> = holdings.iter().map(|(k, v)| format!("{k} x{v}")).collect();
        println!("  Holdings:        {}", held.join(", "));
    }
    if let Some(world) = &world {
        println!(
            "  World:           {} block types, {} entity types",
            world.blocks.len(),
            world.entities.len()
        );
    }
    println!();
    println!("Loaded {} craftable items.", data.craftable_count());

    let options = PlanOptions { holdings, world };
    let tree = plan_with(&data, &args.item, args.count, &options, &config);
    if args.tree {
        display_tree(&tree);
    }

    let paths = match args.strategy {
        StrategyArg::Best => rank_paths(&tree, &options, &config),
        single => {
            let strategy = match single {
                StrategyArg::All => Strategy::All,
                StrategyArg::Shortest => Strategy::Shortest,
                _ => Strategy::LowestWeight,
            };
            enumerate_with(&tree, &options.holdings, strategy, &config)
                .take(config.per_generator_limit)
                .collect()
        }
    };

    display_paths(&args.item, args.count, &paths);

    Ok(())
}
