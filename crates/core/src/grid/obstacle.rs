//! Transient blocked/open bitmaps for connectivity and area queries.

use std::collections::VecDeque;

use crate::types::{Direction, Pos};

use super::Grid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObstacleMap {
    width: usize,
    height: usize,
    blocked: Vec<bool>,
}

impl ObstacleMap {
    /// Marks every tile for which `is_open` answers `false` as blocked.
    pub fn from_grid(grid: &Grid, is_open: impl Fn(&Grid, Pos) -> bool) -> Self {
        let blocked = grid.positions().map(|pos| !is_open(grid, pos)).collect();
        Self { width: grid.width(), height: grid.height(), blocked }
    }

    /// Connectivity view: closed doors count as open.
    pub fn for_connectivity(grid: &Grid) -> Self {
        Self::from_grid(grid, Grid::is_passable_or_door)
    }

    pub fn is_blocked(&self, pos: Pos) -> bool {
        self.index(pos).is_none_or(|idx| self.blocked[idx])
    }

    pub fn open_count(&self) -> usize {
        self.blocked.iter().filter(|&&blocked| !blocked).count()
    }

    /// 4-neighbour flood fill from `seed`; returns the reached bitmap.
    /// A blocked seed reaches nothing.
    pub fn flood_fill(&self, seed: Pos) -> Vec<bool> {
        let mut reached = vec![false; self.blocked.len()];
        let Some(seed_idx) = self.index(seed).filter(|&idx| !self.blocked[idx]) else {
            return reached;
        };
        reached[seed_idx] = true;
        let mut queue = VecDeque::from([seed]);
        while let Some(current) = queue.pop_front() {
            for direction in Direction::CARDINAL {
                let next = current.step(direction);
                let Some(idx) = self.index(next) else {
                    continue;
                };
                if self.blocked[idx] || reached[idx] {
                    continue;
                }
                reached[idx] = true;
                queue.push_back(next);
            }
        }
        reached
    }

    /// Open tiles the flood fill from `seed` does not reach.
    pub fn unreachable_from(&self, seed: Pos) -> Vec<Pos> {
        let reached = self.flood_fill(seed);
        self.blocked
            .iter()
            .zip(reached)
            .enumerate()
            .filter(|(_, (blocked, reached))| !**blocked && !reached)
            .map(|(idx, _)| Pos { y: (idx / self.width) as i32, x: (idx % self.width) as i32 })
            .collect()
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        let in_bounds = pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height;
        in_bounds.then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }
}
