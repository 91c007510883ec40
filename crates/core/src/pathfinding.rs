//! Monster route planning over the grid.
//! The heuristic is inflated near occupants and hazards, so routes are
//! low-risk rather than guaranteed shortest. Every call owns its node arena.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::grid::Grid;
use crate::types::{Direction, Pos};

pub const OCCUPANT_PENALTY: u32 = 10;
pub const HAZARD_PENALTY: u32 = 50;

#[derive(Clone, Copy, Debug)]
struct PathNode {
    pos: Pos,
    g: u32,
    h: u32,
    parent: Option<usize>,
    closed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f: u32,
    h: u32,
    y: i32,
    x: i32,
    g: u32,
    node: usize,
}

/// Chebyshev distance to `goal` plus the risk penalties of standing on `pos`.
pub fn heuristic(grid: &Grid, pos: Pos, goal: Pos) -> u32 {
    let tile = grid.get(pos);
    let mut h = pos.chebyshev(goal);
    if tile.occupant.is_some() {
        h += OCCUPANT_PENALTY;
    }
    if tile.terrain.is_hazardous() {
        h += HAZARD_PENALTY;
    }
    h
}

/// Route from `start` (exclusive) to `goal` (inclusive), or `None` when the goal cannot be
/// reached. Closed doors are never walked through, but one may be the goal itself.
pub fn find_path(grid: &Grid, start: Pos, goal: Pos) -> Option<Vec<Pos>> {
    assert!(
        grid.in_bounds(start) && grid.in_bounds(goal),
        "path endpoints {start:?} -> {goal:?} outside grid"
    );
    if start == goal {
        return Some(vec![]);
    }
    if !can_enter(grid, goal, goal) {
        return None;
    }

    let mut nodes = Vec::new();
    let mut node_at: Vec<Option<usize>> = vec![None; grid.width() * grid.height()];
    let mut open = BinaryHeap::new();

    let h = heuristic(grid, start, goal);
    nodes.push(PathNode { pos: start, g: 0, h, parent: None, closed: false });
    node_at[slot(grid, start)] = Some(0);
    open.push(Reverse(OpenEntry { f: h, h, y: start.y, x: start.x, g: 0, node: 0 }));

    while let Some(Reverse(entry)) = open.pop() {
        let current = nodes[entry.node];
        if current.closed || entry.g != current.g {
            continue;
        }
        nodes[entry.node].closed = true;
        if current.pos == goal {
            return Some(reconstruct_path(&nodes, entry.node));
        }

        for direction in Direction::ALL {
            let next = current.pos.step(direction);
            if !grid.in_bounds(next) || !can_enter(grid, next, goal) {
                continue;
            }
            let g = current.g + 1;
            let id = match node_at[slot(grid, next)] {
                Some(id) if nodes[id].closed || g >= nodes[id].g => continue,
                Some(id) => {
                    nodes[id].g = g;
                    nodes[id].parent = Some(entry.node);
                    id
                }
                None => {
                    let id = nodes.len();
                    let h = heuristic(grid, next, goal);
                    let parent = Some(entry.node);
                    nodes.push(PathNode { pos: next, g, h, parent, closed: false });
                    node_at[slot(grid, next)] = Some(id);
                    id
                }
            };
            let h = nodes[id].h;
            open.push(Reverse(OpenEntry { f: g + h, h, y: next.y, x: next.x, g, node: id }));
        }
    }
    None
}

/// First tile of the route toward `goal`.
pub fn next_step(grid: &Grid, start: Pos, goal: Pos) -> Option<Pos> {
    find_path(grid, start, goal)?.first().copied()
}

fn can_enter(grid: &Grid, pos: Pos, goal: Pos) -> bool {
    grid.is_passable(pos) || (pos == goal && grid.is_passable_or_door(pos))
}

fn slot(grid: &Grid, pos: Pos) -> usize {
    (pos.y as usize) * grid.width() + (pos.x as usize)
}

fn reconstruct_path(nodes: &[PathNode], goal: usize) -> Vec<Pos> {
    let mut path = Vec::new();
    let mut cursor = goal;
    while let Some(parent) = nodes[cursor].parent {
        path.push(nodes[cursor].pos);
        cursor = parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use proptest::prelude::*;

    use super::*;
    use crate::test_support::{corridor, occupant_ids, open_room, two_pocket_grid};
    use crate::types::{Stationary, Terrain};

    fn assert_walkable(grid: &Grid, start: Pos, path: &[Pos]) {
        let mut previous = start;
        for &step in path {
            assert_eq!(previous.chebyshev(step), 1, "{previous:?} -> {step:?} is not one step");
            assert!(grid.is_passable_or_door(step), "{step:?} cannot be entered");
            previous = step;
        }
    }

    /// Fewest 8-way steps between two tiles over movement-passable terrain.
    fn step_distance(grid: &Grid, start: Pos, goal: Pos) -> Option<usize> {
        let mut distance = vec![None; grid.width() * grid.height()];
        distance[slot(grid, start)] = Some(0);
        let mut queue = VecDeque::from([start]);
        while let Some(pos) = queue.pop_front() {
            let here = distance[slot(grid, pos)].unwrap_or(0);
            if pos == goal {
                return Some(here);
            }
            for direction in Direction::ALL {
                let next = pos.step(direction);
                if grid.is_passable(next) && distance[slot(grid, next)].is_none() {
                    distance[slot(grid, next)] = Some(here + 1);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    #[test]
    fn start_equal_to_goal_is_an_empty_route() {
        let grid = corridor(3);
        assert_eq!(find_path(&grid, Pos::xy(2, 1), Pos::xy(2, 1)), Some(vec![]));
        assert_eq!(next_step(&grid, Pos::xy(2, 1), Pos::xy(2, 1)), None);
    }

    #[test]
    fn corridor_route_excludes_start_and_ends_at_goal() {
        let grid = corridor(5);
        let path = find_path(&grid, Pos::xy(1, 1), Pos::xy(5, 1)).expect("corridor is open");
        assert_eq!(path, vec![Pos::xy(2, 1), Pos::xy(3, 1), Pos::xy(4, 1), Pos::xy(5, 1)]);
        assert_eq!(next_step(&grid, Pos::xy(1, 1), Pos::xy(5, 1)), Some(Pos::xy(2, 1)));
    }

    #[test]
    fn walled_off_goal_has_no_route() {
        let grid = two_pocket_grid();
        assert_eq!(find_path(&grid, Pos::xy(1, 1), Pos::xy(6, 1)), None);
        assert_eq!(find_path(&grid, Pos::xy(1, 1), Pos::xy(4, 1)), None, "goal inside a wall");
    }

    #[test]
    fn occupant_on_the_direct_tile_forces_a_detour_when_one_exists() {
        let mut grid = open_room(5, 3);
        let blocker = occupant_ids(1)[0];
        grid.set_occupant(Pos::xy(2, 2), blocker);

        let path = find_path(&grid, Pos::xy(1, 2), Pos::xy(3, 2)).expect("room is open");
        assert_eq!(path.len(), 2);
        assert!(!path.contains(&Pos::xy(2, 2)), "route should step around the occupant: {path:?}");
        assert_eq!(path.last(), Some(&Pos::xy(3, 2)));
    }

    #[test]
    fn occupant_in_a_single_corridor_is_walked_through() {
        let mut grid = corridor(3);
        let blocker = occupant_ids(1)[0];
        grid.set_occupant(Pos::xy(2, 1), blocker);

        let path = find_path(&grid, Pos::xy(1, 1), Pos::xy(3, 1)).expect("occupants never block");
        assert_eq!(path, vec![Pos::xy(2, 1), Pos::xy(3, 1)]);
    }

    #[test]
    fn hazards_are_avoided_when_a_safe_route_exists() {
        let mut grid = open_room(5, 3);
        grid.set_temporary(Pos::xy(2, 2), Terrain::Fire, 5);
        let path = find_path(&grid, Pos::xy(1, 2), Pos::xy(3, 2)).expect("room is open");
        assert!(!path.contains(&Pos::xy(2, 2)), "{path:?}");

        let mut lane = corridor(3);
        lane.set_terrain(Pos::xy(2, 1), Terrain::Water);
        let path = find_path(&lane, Pos::xy(1, 1), Pos::xy(3, 1)).expect("water is passable");
        assert_eq!(path, vec![Pos::xy(2, 1), Pos::xy(3, 1)]);
    }

    #[test]
    fn closed_door_blocks_transit_but_may_be_the_goal() {
        let mut grid = corridor(7);
        let door = Pos::xy(4, 1);
        grid.set_stationary(door, Some(Stationary::ClosedDoor));

        assert_eq!(find_path(&grid, Pos::xy(1, 1), Pos::xy(6, 1)), None);
        let to_door = find_path(&grid, Pos::xy(1, 1), door).expect("door is a valid goal");
        assert_eq!(to_door.last(), Some(&door));

        grid.set_stationary(door, Some(Stationary::OpenDoor));
        assert!(find_path(&grid, Pos::xy(1, 1), Pos::xy(6, 1)).is_some());
    }

    #[test]
    fn lava_is_never_entered() {
        let mut grid = corridor(5);
        grid.set_terrain(Pos::xy(3, 1), Terrain::Lava);
        assert_eq!(find_path(&grid, Pos::xy(1, 1), Pos::xy(5, 1)), None);
    }

    #[test]
    fn shorter_of_two_routes_is_chosen() {
        // Two lanes around a pillar block: the upper one is two tiles shorter.
        let mut grid = Grid::new(11, 8);
        grid.fill_rect(1, 1, 9, 1, Terrain::Floor);
        grid.fill_rect(1, 1, 1, 6, Terrain::Floor);
        grid.fill_rect(9, 1, 9, 6, Terrain::Floor);
        grid.fill_rect(1, 6, 9, 6, Terrain::Floor);
        let start = Pos::xy(1, 3);
        let goal = Pos::xy(9, 3);

        let path = find_path(&grid, start, goal).expect("ring is connected");
        assert_eq!(path.len(), 10);
        assert_eq!(Some(path.len()), step_distance(&grid, start, goal));
        assert!(path.contains(&Pos::xy(5, 1)), "upper lane expected: {path:?}");
        assert_walkable(&grid, start, &path);
    }

    fn room_tile() -> impl Strategy<Value = Pos> {
        (1..=12_i32, 1..=8_i32).prop_map(|(x, y)| Pos::xy(x, y))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(96))]

        #[test]
        fn open_room_routes_reach_the_goal(start in room_tile(), goal in room_tile()) {
            let grid = open_room(12, 8);
            let path = find_path(&grid, start, goal).expect("open room is connected");
            prop_assert_eq!(path.last().copied().unwrap_or(start), goal);
            prop_assert_eq!(path.len() as u32, start.chebyshev(goal));
        }

        #[test]
        fn penalty_free_routes_are_shortest(
            walls in prop::collection::vec(room_tile(), 0..40),
            start in room_tile(),
            goal in room_tile(),
        ) {
            let mut grid = open_room(12, 8);
            for wall in walls {
                if wall != start && wall != goal {
                    grid.set_terrain(wall, Terrain::Wall);
                }
            }
            let path = find_path(&grid, start, goal);
            prop_assert_eq!(path.as_ref().map(Vec::len), step_distance(&grid, start, goal));
            if let Some(path) = path {
                assert_walkable(&grid, start, &path);
                prop_assert!(path.iter().all(|&pos| grid.is_passable(pos)));
            }
        }
    }
}
