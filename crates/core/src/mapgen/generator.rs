//! Level generation orchestration: carve, validate with bounded retries, then populate.

use tracing::{debug, warn};

use crate::config::{ConfigError, GenConfig};
use crate::grid::Grid;
use crate::spawner::{EntitySpawner, ItemSeed};
use crate::types::Pos;

use super::carver::carve_maze;
use super::model::{Level, LevelSource};
use super::placement::{
    PopulateContext, Slot, place_item_near, place_monster_near, populate_dungeon, probe,
};
use super::progression::{self, MAX_DEPTH};
use super::rooms::{RoomPlan, build_treasure_room, inject_open_rooms};
use super::seed::{LevelRng, derive_level_seed};
use super::static_maze::{MazeMarker, StaticMaze};
use super::town::build_town;
use super::validate::{is_fully_connected, seal_unreachable};

/// Carve origin and canonical entry tile of every carved level.
pub const ENTRY_TILE: Pos = Pos::xy(1, 1);

/// Stream reserved for per-level decisions made before any carve attempt.
const PLAN_STREAM: u32 = u32::MAX;

pub struct LevelGenerator {
    run_seed: u64,
    config: GenConfig,
    static_mazes: Vec<StaticMaze>,
}

impl LevelGenerator {
    pub fn new(run_seed: u64, config: GenConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { run_seed, config, static_mazes: Vec::new() })
    }

    /// Mazes whose size differs from the configured grid are ignored.
    pub fn with_static_mazes(mut self, mazes: Vec<StaticMaze>) -> Self {
        let (width, height) = (self.config.width, self.config.height);
        self.static_mazes = mazes
            .into_iter()
            .filter(|maze| {
                let fits = maze.width == width && maze.height == height;
                if !fits {
                    warn!(
                        maze_width = maze.width,
                        maze_height = maze.height,
                        width,
                        height,
                        "ignoring mis-sized static maze"
                    );
                }
                fits
            })
            .collect();
        self
    }

    pub fn static_maze_count(&self) -> usize {
        self.static_mazes.len()
    }

    /// Builds the level for `depth`. The result is fully connected from its entry tile for
    /// every seed; entities are requested from `spawner` only for the accepted layout.
    pub fn generate(&self, depth: u8, spawner: &mut dyn EntitySpawner) -> Level {
        assert!(depth <= MAX_DEPTH, "depth {depth} is deeper than {MAX_DEPTH}");
        let mut plan_rng = self.rng(depth, PLAN_STREAM);

        if progression::is_town(depth) {
            return self.generate_town(&mut plan_rng);
        }
        if let Some(level) = self.try_static_maze(depth, &mut plan_rng, spawner) {
            return level;
        }

        let wants_treasure = plan_rng.chance(self.config.treasure_room_percent);
        let phases: &[bool] = if wants_treasure { &[true, false] } else { &[false] };

        let mut attempts = 0;
        for &treasure_room in phases {
            for _ in 0..self.config.max_attempts {
                attempts += 1;
                let mut rng = self.rng(depth, attempts);
                let (mut grid, plan) = self.carve(depth, &mut rng, treasure_room);
                if is_fully_connected(&grid, ENTRY_TILE) {
                    let source = LevelSource::Carved { treasure_room: plan.treasure.is_some() };
                    populate(&mut grid, &mut rng, spawner, depth, ENTRY_TILE, &plan);
                    return Level { depth, grid, entry: ENTRY_TILE, attempts, source };
                }
                debug!(depth, attempts, treasure_room, "carved level is disconnected, retrying");
            }
            warn!(depth, attempts, treasure_room, "retry budget spent, relaxing level parameters");
        }

        self.best_effort(depth, attempts + 1, spawner)
    }

    /// Termination guarantee once both retry phases are spent: keeps one more carve and
    /// walls in whatever the entry cannot reach.
    fn best_effort(&self, depth: u8, attempts: u32, spawner: &mut dyn EntitySpawner) -> Level {
        let mut rng = self.rng(depth, attempts);
        let (mut grid, plan) = self.carve(depth, &mut rng, false);
        let sealed = seal_unreachable(&mut grid, ENTRY_TILE);
        warn!(depth, attempts, sealed, "keeping best-effort level with stranded tiles walled in");
        populate(&mut grid, &mut rng, spawner, depth, ENTRY_TILE, &plan);
        Level { depth, grid, entry: ENTRY_TILE, attempts, source: LevelSource::BestEffort }
    }

    fn rng(&self, depth: u8, stream: u32) -> LevelRng {
        LevelRng::seed_from_u64(derive_level_seed(self.run_seed, depth, stream))
    }

    fn generate_town(&self, rng: &mut LevelRng) -> Level {
        let mut grid = Grid::new(self.config.width, self.config.height);
        let entry = build_town(&mut grid, rng);
        let depth = progression::TOWN_DEPTH;
        Level { depth, grid, entry, attempts: 0, source: LevelSource::Town }
    }

    fn carve(&self, depth: u8, rng: &mut LevelRng, treasure_room: bool) -> (Grid, RoomPlan) {
        let mut grid = Grid::new(self.config.width, self.config.height);
        carve_maze(&mut grid, rng, ENTRY_TILE);

        let count = progression::open_room_count(rng, treasure_room);
        let rooms = inject_open_rooms(&mut grid, rng, depth, count);
        let treasure =
            if treasure_room { build_treasure_room(&mut grid, rng, depth) } else { None };
        let guarded_center =
            (!rooms.is_empty() && rng.one_in(2)).then(|| rng.pick(&rooms).center());

        (grid, RoomPlan { rooms, guarded_center, treasure })
    }

    fn try_static_maze(
        &self,
        depth: u8,
        plan_rng: &mut LevelRng,
        spawner: &mut dyn EntitySpawner,
    ) -> Option<Level> {
        if depth < 2 || self.static_mazes.is_empty() {
            return None;
        }
        if !plan_rng.chance(self.config.static_maze_percent) {
            return None;
        }
        let index = plan_rng.below(self.static_mazes.len() as u32) as usize;
        let maze = &self.static_mazes[index];
        let mut grid = maze.to_grid();

        let entry = probe(&grid, ENTRY_TILE, Slot::Stationary);
        if entry.is_sentinel() || !is_fully_connected(&grid, entry) {
            warn!(depth, index, "static maze is disconnected, carving instead");
            return None;
        }
        for (pos, marker) in maze.markers() {
            match marker {
                MazeMarker::Monster => {
                    place_monster_near(&mut grid, spawner, depth, pos, Some(entry));
                }
                MazeMarker::Item => {
                    place_item_near(&grid, spawner, depth, pos, ItemSeed::Random);
                }
                MazeMarker::Artifact => {
                    place_item_near(&grid, spawner, depth, pos, ItemSeed::Artifact);
                }
            }
        }

        let mut rng = self.rng(depth, 0);
        populate(&mut grid, &mut rng, spawner, depth, entry, &RoomPlan::default());
        Some(Level { depth, grid, entry, attempts: 0, source: LevelSource::Static { index } })
    }
}

/// Marks the entry tile and fills an accepted layout with features and entities.
fn populate(
    grid: &mut Grid,
    rng: &mut LevelRng,
    spawner: &mut dyn EntitySpawner,
    depth: u8,
    entry: Pos,
    plan: &RoomPlan,
) {
    grid.set_stationary(entry, Some(progression::entry_feature(depth)));
    populate_dungeon(
        &mut PopulateContext { grid, rng, spawner, depth, player: Some(entry) },
        plan,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::static_maze::parse_mazes;
    use crate::spawner::RecordingSpawner;
    use crate::types::{Stationary, Terrain};

    fn generator(config: GenConfig) -> LevelGenerator {
        LevelGenerator::new(42, config).expect("valid config")
    }

    #[test]
    fn rejects_invalid_config() {
        let config = GenConfig { height: 3, ..GenConfig::default() };
        assert!(matches!(
            LevelGenerator::new(1, config),
            Err(ConfigError::GridTooSmall { width: 80, height: 3 })
        ));
    }

    #[test]
    fn carved_levels_mark_the_entry_with_the_depth_feature() {
        let generator = generator(GenConfig::default());
        for depth in 1..=MAX_DEPTH {
            let level = generator.generate(depth, &mut RecordingSpawner::new());
            assert_eq!(level.entry, ENTRY_TILE);
            assert_eq!(
                level.grid.stationary(level.entry),
                Some(progression::entry_feature(depth)),
                "depth {depth}"
            );
            assert_eq!(level.grid.terrain(level.entry), Terrain::Floor);
            assert!(is_fully_connected(&level.grid, level.entry), "depth {depth}");
        }
    }

    #[test]
    fn same_inputs_produce_the_same_level() {
        let generator = generator(GenConfig::default());
        let mut left = RecordingSpawner::new();
        let mut right = RecordingSpawner::new();
        let a = generator.generate(6, &mut left);
        let b = generator.generate(6, &mut right);
        assert_eq!(a, b);
        assert_eq!(left.items, right.items);
        assert_eq!(left.monsters.len(), right.monsters.len());
    }

    #[test]
    fn forced_treasure_room_stays_connected_or_is_dropped() {
        let config =
            GenConfig { treasure_room_percent: 100, max_attempts: 4, ..GenConfig::default() };
        for seed in 0..12 {
            let generator = LevelGenerator::new(seed, config.clone()).expect("valid config");
            let level = generator.generate(3, &mut RecordingSpawner::new());
            assert!(is_fully_connected(&level.grid, level.entry), "seed {seed}");
            assert!(level.attempts <= 2 * config.max_attempts + 1);
            match level.source {
                LevelSource::Carved { treasure_room: true } => {
                    assert!(level.attempts <= config.max_attempts);
                    let doors = level
                        .grid
                        .positions()
                        .filter(|&pos| level.grid.stationary(pos) == Some(Stationary::ClosedDoor))
                        .count();
                    assert_eq!(doors, 1, "seed {seed}");
                }
                LevelSource::Carved { treasure_room: false } => {
                    assert!(level.attempts > config.max_attempts);
                }
                other => panic!("unexpected source {other:?}"),
            }
        }
    }

    #[test]
    fn best_effort_fallback_is_connected_and_populated() {
        let config = GenConfig { max_attempts: 3, ..GenConfig::default() };
        let generator = generator(config);
        for depth in [1, 7, MAX_DEPTH] {
            let mut spawner = RecordingSpawner::new();
            let level = generator.best_effort(depth, 7, &mut spawner);

            assert_eq!(level.source, LevelSource::BestEffort);
            assert_eq!(level.attempts, 7);
            assert_eq!(level.entry, ENTRY_TILE);
            assert_eq!(level.grid.stationary(ENTRY_TILE), Some(progression::entry_feature(depth)));
            assert!(is_fully_connected(&level.grid, level.entry), "depth {depth}");
            assert!(!spawner.monsters.is_empty());
            assert!(spawner.monsters.values().all(|monster| monster.pos != level.entry));
        }
    }

    #[test]
    fn monsters_never_spawn_on_the_entry_tile() {
        let generator = generator(GenConfig::default());
        for depth in [1, 5, 12] {
            let mut spawner = RecordingSpawner::new();
            let level = generator.generate(depth, &mut spawner);
            assert!(!spawner.monsters.is_empty());
            assert!(spawner.monsters.values().all(|monster| monster.pos != level.entry));
            for (id, monster) in &spawner.monsters {
                assert_eq!(level.grid.occupant(monster.pos), Some(id));
            }
        }
    }

    #[test]
    fn town_holds_the_entrance_and_no_monsters() {
        let generator = generator(GenConfig::default());
        let mut spawner = RecordingSpawner::new();
        let level = generator.generate(0, &mut spawner);
        assert_eq!(level.source, LevelSource::Town);
        assert_eq!(level.grid.stationary(level.entry), Some(Stationary::Entrance));
        assert!(spawner.monsters.is_empty());
    }

    fn static_maze_text(width: usize, height: usize, wall_column: Option<usize>) -> String {
        let mut text = String::new();
        for y in 0..height {
            for x in 0..width {
                let border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                let glyph = if border || wall_column == Some(x) {
                    '#'
                } else if (x, y) == (3, 2) {
                    'm'
                } else if (x, y) == (5, 3) {
                    '~'
                } else {
                    '.'
                };
                text.push(glyph);
            }
            text.push('\n');
        }
        text
    }

    fn static_config() -> GenConfig {
        GenConfig { width: 20, height: 10, static_maze_percent: 100, ..GenConfig::default() }
    }

    #[test]
    fn static_maze_replaces_carving_when_forced() {
        let config = static_config();
        let mazes = parse_mazes(&static_maze_text(20, 10, None), 20, 10).expect("maze parses");
        let generator = generator(config).with_static_mazes(mazes);
        let mut spawner = RecordingSpawner::new();

        let level = generator.generate(4, &mut spawner);
        assert_eq!(level.source, LevelSource::Static { index: 0 });
        assert_eq!(level.entry, Pos::xy(1, 1));
        assert!(spawner.items.iter().any(|item| item.seed == ItemSeed::Artifact));
        assert!(spawner.monsters.values().any(|monster| monster.pos == Pos::xy(3, 2)));
    }

    #[test]
    fn disconnected_static_maze_falls_back_to_carving() {
        let config = static_config();
        let mazes = parse_mazes(&static_maze_text(20, 10, Some(9)), 20, 10).expect("maze parses");
        let generator = generator(config).with_static_mazes(mazes);

        let level = generator.generate(4, &mut RecordingSpawner::new());
        assert!(matches!(level.source, LevelSource::Carved { .. }));
        assert!(is_fully_connected(&level.grid, level.entry));
    }

    #[test]
    fn mis_sized_static_mazes_are_ignored() {
        let mazes = parse_mazes(&static_maze_text(14, 8, None), 14, 8).expect("maze parses");
        let generator = generator(GenConfig::default()).with_static_mazes(mazes);
        assert_eq!(generator.static_maze_count(), 0);
    }

    #[test]
    fn shallow_levels_never_use_static_mazes() {
        let config = static_config();
        let mazes = parse_mazes(&static_maze_text(20, 10, None), 20, 10).expect("maze parses");
        let generator = generator(config).with_static_mazes(mazes);
        let level = generator.generate(1, &mut RecordingSpawner::new());
        assert!(matches!(level.source, LevelSource::Carved { .. }));
    }
}
