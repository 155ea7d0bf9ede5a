#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Zoo Tycoon scenarios headlessly.

mod config;
mod save_transfer;
mod script;
mod simulation;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, LevelFilter};
use zoo_tycoon_core::Persistence;
use zoo_tycoon_world::{query, World};

use crate::{config::ZooConfig, save_transfer::SaveFile, simulation::Simulation};

#[derive(Debug, Parser)]
#[command(author, version, about = "Zoo Tycoon headless simulation runner")]
struct Cli {
    /// TOML configuration file (built-in defaults when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Resume from a save file instead of starting a fresh zoo
    #[arg(long, global = true)]
    load: Option<PathBuf>,

    /// Write the final zoo to a save file
    #[arg(long, global = true)]
    save: Option<PathBuf>,

    /// Idle ticks to simulate after the script finishes
    #[arg(long, global = true, default_value_t = 0)]
    ticks: u32,

    /// Log filter level, overriding RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<LevelFilter>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Play a scenario script (the built-in demo when omitted)
    Run {
        /// Path to the scenario script
        script: Option<PathBuf>,
    },
}

/// Entry point for the Zoo Tycoon command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let config = match &cli.config {
        Some(path) => ZooConfig::load(path)?,
        None => ZooConfig::default(),
    };
    let world = load_world(&config, cli.load.as_ref())?;

    let source = match &cli.command {
        Some(CliCommand::Run {
            script: Some(path),
        }) => fs::read_to_string(path)
            .with_context(|| format!("failed to read script at {}", path.display()))?,
        Some(CliCommand::Run { script: None }) | None => script::DEMO_SCRIPT.to_owned(),
    };
    let actions = script::parse(&source, &config, query::tile_grid(&world))
        .context("invalid scenario script")?;

    let mut simulation = Simulation::new(config, world);
    simulation.run(&actions)?;
    for _ in 0..cli.ticks {
        simulation.tick()?;
    }

    let world = simulation.world();
    let stats = query::stats(world);
    println!("{}", simulation.summary());
    println!(
        "zoo: {} habitats, {} shops, {} animals, {} keepers, balance {}",
        stats.habitats,
        stats.shops,
        stats.animals,
        stats.keepers,
        query::balance(world)
    );

    if let Some(path) = &cli.save {
        let mut store = SaveFile::new(path);
        store
            .save_game(&world.to_saved())
            .with_context(|| format!("failed to save game to {}", store.path().display()))?;
        println!("saved to {}", store.path().display());
    }
    Ok(())
}

fn init_logging(level: Option<LevelFilter>) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(level) = level {
        let _ = builder.filter_level(level);
    }
    builder.init();
}

fn load_world(config: &ZooConfig, load: Option<&PathBuf>) -> Result<World> {
    let Some(path) = load else {
        let world = World::new(&config.world_config()).context("invalid terrain")?;
        info!("started a fresh {}x{} zoo", config.columns, config.rows);
        return Ok(world);
    };

    let mut store = SaveFile::new(path);
    let Some(saved) = store
        .load_game()
        .with_context(|| format!("failed to load game from {}", path.display()))?
    else {
        bail!("no saved game at {}", path.display());
    };
    let terrain = config.terrain(saved.columns, saved.rows);
    let world = World::from_saved(&terrain, &saved)
        .with_context(|| format!("saved game at {} is inconsistent", path.display()))?;
    info!("resumed {}x{} zoo from {}", saved.columns, saved.rows, path.display());
    Ok(world)
}
