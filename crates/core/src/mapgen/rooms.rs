//! Open rooms and the walled treasure room stamped over a carved maze.

use crate::grid::Grid;
use crate::types::{Pos, Stationary, Terrain};

use super::progression;
use super::seed::LevelRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn right(self) -> i32 {
        self.x + self.width - 1
    }

    pub fn bottom(self) -> i32 {
        self.y + self.height - 1
    }

    pub fn center(self) -> Pos {
        Pos { y: self.y + self.height / 2, x: self.x + self.width / 2 }
    }

    pub fn contains(self, pos: Pos) -> bool {
        pos.x >= self.x && pos.x <= self.right() && pos.y >= self.y && pos.y <= self.bottom()
    }

    /// The rectangle shrunk by one tile on every side.
    pub fn inner(self) -> Rect {
        Rect { x: self.x + 1, y: self.y + 1, width: self.width - 2, height: self.height - 2 }
    }

    pub fn is_corner(self, pos: Pos) -> bool {
        (pos.x == self.x || pos.x == self.right()) && (pos.y == self.y || pos.y == self.bottom())
    }

    pub fn positions(self) -> impl Iterator<Item = Pos> {
        (self.y..=self.bottom())
            .flat_map(move |y| (self.x..=self.right()).map(move |x| Pos { y, x }))
    }
}

/// Seeds the treasure room asks the entity system for once the level is accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreasurePlan {
    pub bounds: Rect,
    pub door: Pos,
    pub gold: Vec<(Pos, u32)>,
    pub monsters: Vec<Pos>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoomPlan {
    pub rooms: Vec<Rect>,
    /// Centre of the room chosen to hold a single guardian monster.
    pub guarded_center: Option<Pos>,
    pub treasure: Option<TreasurePlan>,
}

/// Forces `count` randomly sized rooms open. Room width tightens with depth.
pub fn inject_open_rooms(
    grid: &mut Grid,
    rng: &mut LevelRng,
    depth: u8,
    count: usize,
) -> Vec<Rect> {
    let max_width = progression::max_room_width(depth);
    let interior_right = grid.width() as i32 - 2;
    let interior_bottom = grid.height() as i32 - 2;

    let mut rooms = Vec::with_capacity(count);
    for _ in 0..count {
        let width = rng.range(3, max_width.min(interior_right));
        let height = rng.range(3, 5.min(interior_bottom));
        let x = rng.range(1, interior_right - width + 1);
        let y = rng.range(1, interior_bottom - height + 1);
        let room = Rect { x, y, width, height };
        grid.fill_rect(room.x, room.y, room.right(), room.bottom(), Terrain::Floor);
        rooms.push(room);
    }
    rooms
}

/// Builds the walled treasure room. Its wall ring sits on even rows and columns so it never
/// lands on a maze cell, and it stays clear of the carve origin. Returns `None` when the grid
/// is too small to hold one.
pub fn build_treasure_room(grid: &mut Grid, rng: &mut LevelRng, depth: u8) -> Option<TreasurePlan> {
    let interior_right = grid.width() as i32 - 2;
    let interior_bottom = grid.height() as i32 - 2;

    let widths: Vec<i32> = [5, 7, 9].into_iter().filter(|w| 2 + w - 1 <= interior_right).collect();
    let heights: Vec<i32> = [5, 7].into_iter().filter(|h| 2 + h - 1 <= interior_bottom).collect();
    if widths.is_empty() || heights.is_empty() {
        return None;
    }
    let width = rng.pick(&widths);
    let height = rng.pick(&heights);

    let x_slots = (interior_right - (width - 1) - 2) / 2 + 1;
    let y_slots = (interior_bottom - (height - 1) - 2) / 2 + 1;
    let x = 2 + 2 * rng.below(x_slots as u32) as i32;
    let y = 2 + 2 * rng.below(y_slots as u32) as i32;
    let bounds = Rect { x, y, width, height };

    for pos in bounds.positions() {
        let interior = bounds.inner().contains(pos);
        grid.set_terrain(pos, if interior { Terrain::Floor } else { Terrain::Wall });
    }

    let door = pick_door(bounds, rng);
    grid.set_terrain(door, Terrain::Floor);
    grid.set_stationary(door, Some(Stationary::ClosedDoor));

    let mut gold = Vec::new();
    let mut monsters = Vec::new();
    for pos in bounds.inner().positions() {
        if rng.one_in(3) {
            let amount = rng.range(10, 10 + 20 * (i32::from(depth) + 1)) as u32;
            gold.push((pos, amount));
        }
        if rng.one_in(8) {
            monsters.push(pos);
        }
    }

    Some(TreasurePlan { bounds, door, gold, monsters })
}

fn pick_door(bounds: Rect, rng: &mut LevelRng) -> Pos {
    let horizontal_wall = rng.one_in(2);
    let far_side = rng.one_in(2);
    if horizontal_wall {
        let y = if far_side { bounds.bottom() } else { bounds.y };
        Pos { y, x: rng.range(bounds.x + 1, bounds.right() - 1) }
    } else {
        let x = if far_side { bounds.right() } else { bounds.x };
        Pos { y: rng.range(bounds.y + 1, bounds.bottom() - 1), x }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rooms_stay_inside_the_border() {
        let mut grid = Grid::new(40, 16);
        let mut rng = LevelRng::seed_from_u64(9);
        let rooms = inject_open_rooms(&mut grid, &mut rng, 3, 4);

        assert_eq!(rooms.len(), 4);
        for room in rooms {
            assert!(room.x >= 1 && room.y >= 1, "{room:?}");
            assert!(room.right() <= 38 && room.bottom() <= 14, "{room:?}");
            assert!(room.width <= progression::max_room_width(3));
            assert!(room.positions().all(|pos| grid.terrain(pos) == Terrain::Floor));
        }
    }

    #[test]
    fn treasure_room_has_exactly_one_door_off_the_corners() {
        for seed in 0..40 {
            let mut grid = Grid::new(80, 24);
            let mut rng = LevelRng::seed_from_u64(seed);
            let plan = build_treasure_room(&mut grid, &mut rng, 4).expect("80x24 fits a vault");
            let bounds = plan.bounds;

            let doors: Vec<Pos> = bounds
                .positions()
                .filter(|&pos| grid.stationary(pos) == Some(Stationary::ClosedDoor))
                .collect();
            assert_eq!(doors, vec![plan.door]);
            assert!(!bounds.is_corner(plan.door));
            assert!(!bounds.inner().contains(plan.door));

            for pos in bounds.positions() {
                let expected = if bounds.inner().contains(pos) || pos == plan.door {
                    Terrain::Floor
                } else {
                    Terrain::Wall
                };
                assert_eq!(grid.terrain(pos), expected, "seed {seed} tile {pos:?}");
            }
            assert!(!bounds.contains(Pos::xy(1, 1)));
            assert_eq!(bounds.x % 2, 0);
            assert_eq!(bounds.bottom() % 2, 0);
        }
    }

    #[test]
    fn treasure_seeds_only_land_inside_the_room() {
        let mut grid = Grid::new(60, 20);
        let plan = build_treasure_room(&mut grid, &mut LevelRng::seed_from_u64(3), 2)
            .expect("room fits");
        let inner = plan.bounds.inner();
        assert!(plan.gold.iter().all(|(pos, amount)| inner.contains(*pos) && *amount >= 10));
        assert!(plan.monsters.iter().all(|pos| inner.contains(*pos)));
    }

    #[test]
    fn minimum_grid_still_fits_a_treasure_room() {
        let mut grid = Grid::new(12, 8);
        let plan = build_treasure_room(&mut grid, &mut LevelRng::seed_from_u64(1), 1);
        let bounds = plan.expect("12x8 fits the smallest vault").bounds;
        assert!(bounds.right() <= 10 && bounds.bottom() <= 6);
    }
}
