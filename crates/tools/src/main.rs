use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use vigor_core::{
    EntityKind, Game, MapGenerator, STARTING_HERO_HP, any_winnable_fight, layout_is_feasible,
    load_map, save_map,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a feasible dungeon and write it as a JSON map file.
    Generate {
        /// Run seed; the same seed always produces the same dungeon.
        #[arg(long)]
        seed: u64,
        /// Output path for the map JSON.
        #[arg(long)]
        out: PathBuf,
    },
    /// Load a map file and report its conquest feasibility.
    Check {
        /// Path of the map JSON to inspect.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Generate { seed, out } => generate(seed, &out),
        Command::Check { path } => check(&path),
    }
}

fn generate(seed: u64, out: &Path) -> Result<()> {
    let (generated, attempts) = MapGenerator::new(seed)
        .generate_with_attempts()
        .map_err(|e| anyhow::anyhow!("generation failed: {e}"))?;

    save_map(out, &generated)
        .with_context(|| format!("failed to write map file: {}", out.display()))?;

    let enemy_count = generated
        .entities
        .iter()
        .filter(|entity| entity.kind != EntityKind::Hero)
        .count();
    println!("Map written to {}", out.display());
    println!("Seed: {seed} (attempt {attempts})");
    println!("Rooms: {}", generated.rooms.len());
    println!("Passages: {}", generated.passages.len());
    println!("Enemies: {enemy_count}");
    println!("Fingerprint: {:016x}", generated.fingerprint());
    Ok(())
}

fn check(path: &Path) -> Result<()> {
    let loaded = load_map(path)
        .map_err(|e| anyhow::anyhow!("failed to load map file {}: {e}", path.display()))?;

    if loaded.rooms.is_empty() {
        println!("Topology: no room metadata, skipping the layout proof");
    } else {
        let feasible = layout_is_feasible(
            &loaded.rooms,
            &loaded.passages,
            &loaded.entities,
            STARTING_HERO_HP,
        );
        println!("Topology: layout is {}", if feasible { "feasible" } else { "NOT feasible" });
    }

    let game = Game::new(0, loaded.map, loaded.entities, 1)
        .map_err(|e| anyhow::anyhow!("invalid roster in {}: {e}", path.display()))?;
    let state = game.state();
    let opening_fight = any_winnable_fight(&state.map, &state.hero, &state.enemies);
    println!(
        "Grid: hero at ({}, {}, {}) with {} HP, opening fight {}",
        state.hero.position.x,
        state.hero.position.y,
        state.hero.position.z,
        state.hero.hp,
        if opening_fight { "available" } else { "NOT available" },
    );
    println!("Enemies remaining: {}", state.enemies.len());

    for event in state.log.iter().rev() {
        println!("log: {}", event.message());
    }
    Ok(())
}
