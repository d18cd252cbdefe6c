//! Path value returned by the grid searches.

use tg_core::{Grid, TilePos};

/// Inclusive start..goal walk of 4-connected tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPath {
    pub tiles: Vec<TilePos>,
}

impl GridPath {
    /// Number of moves, i.e. `tiles.len() - 1`.
    pub fn steps(&self) -> i32 {
        self.tiles.len().saturating_sub(1) as i32
    }

    pub fn start(&self) -> Option<TilePos> {
        self.tiles.first().copied()
    }

    pub fn goal(&self) -> Option<TilePos> {
        self.tiles.last().copied()
    }

    /// `true` when every consecutive pair is one orthogonal step apart.
    pub fn is_contiguous(&self) -> bool {
        self.tiles.windows(2).all(|w| w[0].is_adjacent(w[1]))
    }
}

/// Walk `came_from` back from `goal` to `start` and return the forward path.
pub(crate) fn reconstruct<G: Grid + ?Sized>(
    grid: &G,
    came_from: &[i32],
    start: usize,
    goal: usize,
) -> Vec<TilePos> {
    let mut out = Vec::new();
    let mut cur = goal as i32;
    while cur >= 0 {
        out.push(grid.pos_of(cur as usize));
        if cur as usize == start {
            break;
        }
        cur = came_from[cur as usize];
    }
    out.reverse();
    out
}
