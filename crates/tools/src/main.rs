use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use delve::mapgen::{MAX_DEPTH, load_mazes};
use delve::visibility::{Viewer, compute_fov};
use delve::{GenConfig, Level, LevelGenerator, Pos, RecordingSpawner, TileRecord, find_path};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod render;

use render::{Overlay, render_level};

#[derive(Parser)]
#[command(author, version, about = "Generate and inspect dungeon levels", long_about = None)]
struct Cli {
    /// TOML file overriding generation defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[arg(short, long, global = true, default_value_t = 42)]
    seed: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a generated level
    Generate(GenerateArgs),
    /// Print the monster route between two tiles of a generated level
    Path(PathArgs),
}

#[derive(Args)]
struct LevelArgs {
    #[arg(short, long, default_value_t = 1)]
    depth: u8,
    /// File of static mazes sized to the configured grid
    #[arg(long)]
    mazes: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    level: LevelArgs,
    /// Only show what is visible from the entry tile
    #[arg(long)]
    fov: bool,
    /// Use the enlightenment radius for the FOV overlay
    #[arg(long, requires = "fov")]
    enlightened: bool,
    /// Write the tile records of the level as JSON
    #[arg(long)]
    records: Option<PathBuf>,
}

#[derive(Args)]
struct PathArgs {
    #[command(flatten)]
    level: LevelArgs,
    /// Start tile as `x,y`; defaults to the entry tile
    #[arg(long, value_parser = parse_pos)]
    from: Option<Pos>,
    /// Goal tile as `x,y`
    #[arg(long, value_parser = parse_pos)]
    to: Pos,
}

#[derive(Serialize)]
struct LevelDump<'a> {
    depth: u8,
    width: usize,
    height: usize,
    entry: Pos,
    fingerprint: u64,
    tiles: &'a [TileRecord],
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Generate(args) => {
            let level = build_level(cli.seed, &config, &args.level)?;
            let viewer = args.fov.then(|| {
                if args.enlightened {
                    Viewer::enlightened(level.entry, config.enlightenment_radius)
                } else {
                    Viewer::new(level.entry, config.fov_radius)
                }
            });
            let visibility = viewer.map(|viewer| compute_fov(&level.grid, viewer));
            let overlay = Overlay {
                viewer: viewer.map(|viewer| viewer.pos),
                visibility: visibility.as_ref(),
                route: &[],
            };
            print!("{}", render_level(&level.grid, &overlay));

            if let Some(path) = args.records {
                write_records(&path, &level)?;
                info!(path = %path.display(), "wrote tile records");
            }
        }
        Command::Path(args) => {
            let level = build_level(cli.seed, &config, &args.level)?;
            let from = args.from.unwrap_or(level.entry);
            for pos in [from, args.to] {
                if !level.grid.in_bounds(pos) {
                    bail!("tile {},{} is outside the level", pos.x, pos.y);
                }
            }
            match find_path(&level.grid, from, args.to) {
                Some(route) => {
                    let overlay = Overlay { viewer: Some(from), visibility: None, route: &route };
                    print!("{}", render_level(&level.grid, &overlay));
                    println!("{} steps", route.len());
                }
                None => {
                    println!("no route from {},{} to {},{}", from.x, from.y, args.to.x, args.to.y);
                }
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(io::stderr)).init();
}

fn load_config(path: Option<&Path>) -> Result<GenConfig> {
    let Some(path) = path else {
        return Ok(GenConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn build_level(seed: u64, config: &GenConfig, args: &LevelArgs) -> Result<Level> {
    if args.depth > MAX_DEPTH {
        bail!("depth {} is deeper than {MAX_DEPTH}", args.depth);
    }
    let mut generator =
        LevelGenerator::new(seed, config.clone()).context("Invalid generation config")?;
    if let Some(path) = &args.mazes {
        let mazes = load_mazes(path, config.width, config.height)
            .with_context(|| format!("Failed to load static mazes: {}", path.display()))?;
        info!(count = mazes.len(), "loaded static mazes");
        generator = generator.with_static_mazes(mazes);
    }

    let mut spawner = RecordingSpawner::new();
    let level = generator.generate(args.depth, &mut spawner);
    info!(
        depth = level.depth,
        source = ?level.source,
        attempts = level.attempts,
        monsters = spawner.monsters.len(),
        items = spawner.items.len(),
        fingerprint = level.fingerprint(),
        "generated level"
    );
    Ok(level)
}

fn write_records(path: &Path, level: &Level) -> Result<()> {
    let records = level.grid.to_records();
    let dump = LevelDump {
        depth: level.depth,
        width: level.grid.width(),
        height: level.grid.height(),
        entry: level.entry,
        fingerprint: level.fingerprint(),
        tiles: &records,
    };
    let json = serde_json::to_string_pretty(&dump).context("Failed to encode tile records")?;
    fs::write(path, json).with_context(|| format!("Failed to write records: {}", path.display()))
}

fn parse_pos(text: &str) -> Result<Pos, String> {
    let (x, y) = text.split_once(',').ok_or_else(|| format!("expected `x,y`, got `{text}`"))?;
    let parse = |part: &str| part.trim().parse::<i32>().map_err(|err| format!("`{part}`: {err}"));
    Ok(Pos::xy(parse(x)?, parse(y)?))
}

#[cfg(test)]
mod tests {
    use delve::Grid;

    use super::*;

    #[test]
    fn parse_pos_reads_x_then_y() {
        assert_eq!(parse_pos("3,7"), Ok(Pos::xy(3, 7)));
        assert_eq!(parse_pos(" 10 , 2 "), Ok(Pos::xy(10, 2)));
        assert!(parse_pos("3").is_err());
        assert!(parse_pos("a,1").is_err());
    }

    #[test]
    fn config_file_overrides_only_named_fields() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("delve.toml");
        fs::write(&path, "width = 40\nheight = 12\ntreasure_room_percent = 50\n").expect("write");

        let config = load_config(Some(&path)).expect("config loads");
        assert_eq!((config.width, config.height), (40, 12));
        assert_eq!(config.treasure_room_percent, 50);
        assert_eq!(config.max_attempts, GenConfig::default().max_attempts);
    }

    #[test]
    fn records_dump_round_trips_into_a_grid() {
        let config = GenConfig::default();
        let args = LevelArgs { depth: 3, mazes: None };
        let level = build_level(9, &config, &args).expect("level builds");
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("level.json");
        write_records(&path, &level).expect("records written");

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read back")).expect("json");
        let tiles: Vec<TileRecord> =
            serde_json::from_value(value["tiles"].clone()).expect("tile records");
        let grid = Grid::from_records(80, 24, &tiles).expect("grid rebuilds");
        assert_eq!(grid, level.grid);
    }

    #[test]
    fn too_deep_levels_are_rejected() {
        let args = LevelArgs { depth: MAX_DEPTH + 1, mazes: None };
        assert!(build_level(1, &GenConfig::default(), &args).is_err());
    }
}
