use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Reference to a creature owned by the entity system. The grid never owns it.
    pub struct OccupantId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    /// Sentinel returned by placement probes that found no valid tile.
    pub const OUT_OF_BOUNDS: Pos = Pos { y: -1, x: -1 };

    /// Builds a position from column `x` and row `y`.
    pub const fn xy(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { y: self.y + dy, x: self.x + dx }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    pub fn chebyshev(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    pub fn is_sentinel(self) -> bool {
        self == Self::OUT_OF_BOUNDS
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const CARDINAL: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];

    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Wall,
    Floor,
    Water,
    Lava,
    Fire,
    Cloud,
}

impl Terrain {
    pub fn is_passable(self) -> bool {
        matches!(self, Terrain::Floor | Terrain::Water | Terrain::Fire | Terrain::Cloud)
    }

    pub fn is_transparent(self) -> bool {
        !matches!(self, Terrain::Wall | Terrain::Cloud)
    }

    /// Terrain a monster will walk through but would rather avoid.
    pub fn is_hazardous(self) -> bool {
        matches!(self, Terrain::Fire | Terrain::Water | Terrain::Cloud)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShopKind {
    Home,
    GeneralStore,
    Bank,
    College,
    TradingPost,
    TaxOffice,
}

impl ShopKind {
    pub const ALL: [ShopKind; 6] = [
        ShopKind::Home,
        ShopKind::GeneralStore,
        ShopKind::Bank,
        ShopKind::College,
        ShopKind::TradingPost,
        ShopKind::TaxOffice,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stationary {
    Entrance,
    StairsUp,
    StairsDown,
    Elevator,
    Altar,
    Fountain,
    Statue,
    Throne,
    Mirror,
    ClosedDoor,
    OpenDoor,
    Shop(ShopKind),
}

impl Stationary {
    pub fn blocks_movement(self) -> bool {
        self == Stationary::ClosedDoor
    }

    pub fn is_transparent(self) -> bool {
        !matches!(self, Stationary::ClosedDoor | Stationary::Statue)
    }

    pub fn is_door(self) -> bool {
        matches!(self, Stationary::ClosedDoor | Stationary::OpenDoor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Trap {
    Teleport,
    Dart,
    Arrow,
    Trapdoor,
}

impl Trap {
    pub const ALL: [Trap; 4] = [Trap::Teleport, Trap::Dart, Trap::Arrow, Trap::Trapdoor];
}
