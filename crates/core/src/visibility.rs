//! Field-of-view and line-of-sight calculations over a grid.
//! Both share one transparency rule: terrain transparency AND feature transparency.
//! Nothing here mutates the grid; every call allocates its own bitmap.

use std::iter;

use crate::grid::Grid;
use crate::types::Pos;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewer {
    pub pos: Pos,
    pub radius: i32,
    /// Sees every tile inside the radius regardless of walls.
    pub enlightened: bool,
}

impl Viewer {
    pub fn new(pos: Pos, radius: i32) -> Self {
        Self { pos, radius, enlightened: false }
    }

    pub fn enlightened(pos: Pos, radius: i32) -> Self {
        Self { pos, radius, enlightened: true }
    }

    fn in_radius(&self, pos: Pos) -> bool {
        let dx = i64::from(pos.x) - i64::from(self.pos.x);
        let dy = i64::from(pos.y) - i64::from(self.pos.y);
        let r = i64::from(self.radius);
        dx * dx + dy * dy <= r * r
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibilityMap {
    width: usize,
    height: usize,
    visible: Vec<bool>,
}

impl VisibilityMap {
    fn new(width: usize, height: usize) -> Self {
        Self { width, height, visible: vec![false; width * height] }
    }

    pub fn is_visible(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|idx| self.visible[idx])
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|&&visible| visible).count()
    }

    pub fn visible_positions(&self) -> impl Iterator<Item = Pos> + '_ {
        self.visible.iter().enumerate().filter(|(_, visible)| **visible).map(|(idx, _)| Pos {
            y: (idx / self.width) as i32,
            x: (idx % self.width) as i32,
        })
    }

    fn mark(&mut self, pos: Pos) {
        if let Some(idx) = self.index(pos) {
            self.visible[idx] = true;
        }
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        let in_bounds = pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height;
        in_bounds.then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }
}

/// Computes what `viewer` sees this turn. The viewer tile is always visible, and opaque
/// tiles are visible when light reaches them.
pub fn compute_fov(grid: &Grid, viewer: Viewer) -> VisibilityMap {
    assert!(grid.in_bounds(viewer.pos), "viewer {:?} outside grid", viewer.pos);
    let mut map = VisibilityMap::new(grid.width(), grid.height());
    map.mark(viewer.pos);

    if viewer.enlightened {
        // Clipped to the grid.
        let r = viewer.radius.max(0);
        let (top, bottom) = (viewer.pos.y.saturating_sub(r).max(0), viewer.pos.y.saturating_add(r));
        let (left, right) = (viewer.pos.x.saturating_sub(r).max(0), viewer.pos.x.saturating_add(r));
        let bottom = bottom.min(grid.height() as i32 - 1);
        let right = right.min(grid.width() as i32 - 1);
        for y in top..=bottom {
            for x in left..=right {
                let pos = Pos { y, x };
                if viewer.in_radius(pos) {
                    map.mark(pos);
                }
            }
        }
        return map;
    }

    let mut scan = OctantScan { grid, viewer, map: &mut map };
    for octant in 0..8 {
        scan.scan(1, Slope::new(1, 1), Slope::new(0, 1), octant);
    }
    map
}

fn transform_octant(orig: Pos, x: i32, y: i32, oct: u8) -> Pos {
    match oct {
        0 => Pos { y: orig.y - y, x: orig.x + x },
        1 => Pos { y: orig.y - x, x: orig.x + y },
        2 => Pos { y: orig.y - x, x: orig.x - y },
        3 => Pos { y: orig.y - y, x: orig.x - x },
        4 => Pos { y: orig.y + y, x: orig.x - x },
        5 => Pos { y: orig.y + x, x: orig.x - y },
        6 => Pos { y: orig.y + x, x: orig.x + y },
        _ => Pos { y: orig.y + y, x: orig.x + x },
    }
}

#[derive(Clone, Copy, Debug)]
struct Slope {
    y: i32,
    x: i32,
}

impl Slope {
    fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    fn cross(&self, other: &Slope) -> (i64, i64) {
        (
            i64::from(self.y) * i64::from(other.x),
            i64::from(other.y) * i64::from(self.x),
        )
    }

    fn greater_or_equal(&self, other: &Slope) -> bool {
        let (lhs, rhs) = self.cross(other);
        lhs >= rhs
    }

    fn greater_than(&self, other: &Slope) -> bool {
        let (lhs, rhs) = self.cross(other);
        lhs > rhs
    }
}

struct OctantScan<'a> {
    grid: &'a Grid,
    viewer: Viewer,
    map: &'a mut VisibilityMap,
}

impl OctantScan<'_> {
    /// Scans column `dist` of octant `oct` between slopes `start` (high) and `end` (low),
    /// recursing once per gap past an obstruction. Depth is bounded by the radius.
    fn scan(&mut self, dist: i32, start: Slope, end: Slope, oct: u8) {
        if dist > self.viewer.radius || !start.greater_than(&end) {
            return;
        }
        let mut blocked = false;
        let mut cur_start = start;
        for y in (0..=dist).rev() {
            let top = Slope::new(2 * y + 1, 2 * dist - 1);
            let bot = Slope::new(2 * y - 1, 2 * dist + 1);
            if !(cur_start.greater_or_equal(&bot) && top.greater_than(&end)) {
                continue;
            }
            let pos = transform_octant(self.viewer.pos, dist, y, oct);
            if self.viewer.in_radius(pos) {
                self.map.mark(pos);
            }
            if !self.grid.is_transparent(pos) {
                if !blocked {
                    self.scan(dist + 1, cur_start, top, oct);
                    blocked = true;
                }
                cur_start = bot;
            } else if blocked {
                blocked = false;
            }
        }
        if !blocked {
            self.scan(dist + 1, cur_start, end, oct);
        }
    }
}

/// Tiles strictly between `from` and `to` on the Bresenham line, in stepping order.
pub fn line_between(from: Pos, to: Pos) -> impl Iterator<Item = Pos> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut pos = from;

    iter::from_fn(move || {
        if pos == to {
            return None;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            pos.x += sx;
        }
        if e2 <= dx {
            err += dx;
            pos.y += sy;
        }
        Some(pos)
    })
    .take_while(move |&pos| pos != to)
}

/// True when every tile strictly between the endpoints is transparent.
pub fn line_of_sight(grid: &Grid, from: Pos, to: Pos) -> bool {
    line_between(from, to).all(|pos| grid.is_transparent(pos))
}
