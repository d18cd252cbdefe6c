//! Tile coordinates and the fixed 4-neighbour orders.
//!
//! Two neighbour orders are in use and both are part of the deterministic
//! output contract:
//!
//! - [`Dir::NESW`]: flow fields, graph tracing, adjacent-road picking.
//! - [`Dir::EWSN`]: point-to-point A*, road-build planning, edge searches.
//!
//! `y` grows downward, so North is `(0, -1)`.

use std::fmt;

/// Integer tile coordinate.  May be out of bounds; grids check.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn manhattan(self, other: TilePos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The neighbouring position one step in `dir`.
    #[inline]
    pub fn step(self, dir: Dir) -> TilePos {
        let (dx, dy) = dir.delta();
        TilePos::new(self.x + dx, self.y + dy)
    }

    /// `true` when `other` is exactly one orthogonal step away.
    #[inline]
    pub fn is_adjacent(self, other: TilePos) -> bool {
        self.manhattan(other) == 1
    }
}

impl From<(i32, i32)> for TilePos {
    fn from((x, y): (i32, i32)) -> Self {
        TilePos::new(x, y)
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Dir ───────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dir {
    North,
    East,
    South,
    West,
}

impl Dir {
    /// North, East, South, West.
    pub const NESW: [Dir; 4] = [Dir::North, Dir::East, Dir::South, Dir::West];

    /// East, West, South, North: `(1,0), (-1,0), (0,1), (0,-1)`.
    pub const EWSN: [Dir; 4] = [Dir::East, Dir::West, Dir::South, Dir::North];

    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Dir::North => (0, -1),
            Dir::East => (1, 0),
            Dir::South => (0, 1),
            Dir::West => (-1, 0),
        }
    }

    #[inline]
    pub const fn opposite(self) -> Dir {
        match self {
            Dir::North => Dir::South,
            Dir::East => Dir::West,
            Dir::South => Dir::North,
            Dir::West => Dir::East,
        }
    }

    /// Direction of the single step `from → to`, if the tiles are adjacent.
    pub fn between(from: TilePos, to: TilePos) -> Option<Dir> {
        match (to.x - from.x, to.y - from.y) {
            (0, -1) => Some(Dir::North),
            (1, 0) => Some(Dir::East),
            (0, 1) => Some(Dir::South),
            (-1, 0) => Some(Dir::West),
            _ => None,
        }
    }
}
