use anyhow::{Result, bail};
use clap::Parser;
use delve::mapgen::{MAX_DEPTH, unreachable_tiles};
use delve::visibility::{Viewer, compute_fov};
use delve::{GenConfig, Level, LevelGenerator, RecordingSpawner, Stationary, Terrain, find_path};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 500)]
    levels: u32,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn configs() -> Vec<GenConfig> {
    vec![
        GenConfig::default(),
        GenConfig { width: 12, height: 8, ..GenConfig::default() },
        GenConfig { treasure_room_percent: 100, max_attempts: 2, ..GenConfig::default() },
        GenConfig { width: 41, height: 17, treasure_room_percent: 60, ..GenConfig::default() },
    ]
}

fn check_level(level: &Level, monsters: usize, rng: &mut ChaCha8Rng) -> Result<(), String> {
    let grid = &level.grid;
    let stranded = unreachable_tiles(grid, level.entry);
    if !stranded.is_empty() {
        let first = stranded[0];
        return Err(format!("{} tiles unreachable from the entry, first {first:?}", stranded.len()));
    }
    if grid.terrain(level.entry) != Terrain::Floor {
        return Err(format!("entry {:?} is {:?}", level.entry, grid.terrain(level.entry)));
    }
    let open_border =
        grid.positions().find(|&pos| !grid.is_interior(pos) && grid.terrain(pos) != Terrain::Wall);
    if let Some(pos) = open_border {
        return Err(format!("border tile {pos:?} is open"));
    }

    let mut occupants = 0;
    for tile in grid.tiles() {
        if tile.stationary.is_some() && !tile.terrain.is_passable() {
            return Err(format!("{:?} on {:?}", tile.stationary, tile.terrain));
        }
        occupants += usize::from(tile.occupant.is_some());
    }
    if occupants != monsters {
        return Err(format!("{occupants} occupied tiles for {monsters} spawned monsters"));
    }

    let has_doors = grid.tiles().iter().any(|tile| tile.stationary == Some(Stationary::ClosedDoor));
    let goals: Vec<_> = grid.positions().filter(|&pos| grid.is_passable(pos)).collect();
    let goal = choose(rng, &goals);
    match find_path(grid, level.entry, goal) {
        Some(route) if route.last().copied().unwrap_or(level.entry) != goal => {
            return Err(format!("route to {goal:?} ends elsewhere"));
        }
        None if !has_doors => return Err(format!("no route to {goal:?} on a doorless level")),
        _ => {}
    }

    if !compute_fov(grid, Viewer::new(level.entry, 8)).is_visible(level.entry) {
        return Err("viewer cannot see its own tile".to_string());
    }
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();

    let args = Args::parse();
    info!(seed = args.seed, levels = args.levels, "starting generation fuzz");
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let configs = configs();

    let mut failures = 0;
    for _ in 0..args.levels {
        let run_seed = rng.next_u64();
        let depth = (rng.next_u64() % (u64::from(MAX_DEPTH) + 1)) as u8;
        let config = choose(&mut rng, &configs);

        let mut spawner = RecordingSpawner::new();
        let level = LevelGenerator::new(run_seed, config.clone())?.generate(depth, &mut spawner);
        if let Err(reason) = check_level(&level, spawner.monsters.len(), &mut rng) {
            warn!(
                run_seed,
                depth,
                width = config.width,
                height = config.height,
                %reason,
                "invariant failed"
            );
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{failures} of {} levels broke an invariant", args.levels);
    }
    println!("Fuzzing completed successfully.");
    Ok(())
}
