//! Depth-0 town: one open square inside a wall border, dotted with shops.

use tracing::warn;

use crate::grid::Grid;
use crate::types::{Pos, ShopKind, Stationary, Terrain};

use super::placement::{Slot, probe, random_anchor};
use super::seed::LevelRng;

/// Lays out the town and returns its entry tile, which holds the `Entrance`.
pub(super) fn build_town(grid: &mut Grid, rng: &mut LevelRng) -> Pos {
    let right = grid.width() as i32 - 2;
    let bottom = grid.height() as i32 - 2;
    grid.fill_rect(1, 1, right, bottom, Terrain::Floor);

    let entry = Pos { y: bottom, x: grid.width() as i32 / 2 };
    grid.set_stationary(entry, Some(Stationary::Entrance));

    for shop in ShopKind::ALL {
        let pos = probe(grid, random_anchor(grid, rng), Slot::Stationary);
        if pos.is_sentinel() {
            warn!(?shop, "town has no room left for shop");
            continue;
        }
        grid.set_stationary(pos, Some(Stationary::Shop(shop)));
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::validate::is_fully_connected;

    #[test]
    fn every_shop_appears_exactly_once() {
        let mut grid = Grid::new(40, 12);
        let entry = build_town(&mut grid, &mut LevelRng::seed_from_u64(0));

        assert_eq!(grid.stationary(entry), Some(Stationary::Entrance));
        for shop in ShopKind::ALL {
            let count = grid
                .positions()
                .filter(|&pos| grid.stationary(pos) == Some(Stationary::Shop(shop)))
                .count();
            assert_eq!(count, 1, "{shop:?}");
        }
        assert!(is_fully_connected(&grid, entry));
    }

    #[test]
    fn border_stays_solid() {
        let mut grid = Grid::new(20, 10);
        build_town(&mut grid, &mut LevelRng::seed_from_u64(5));
        let border: Vec<Pos> = grid.positions().filter(|&pos| !grid.is_interior(pos)).collect();
        assert!(border.iter().all(|&pos| grid.terrain(pos) == Terrain::Wall));
    }
}
