//! Outside-connection queries.
//!
//! A road counts as connected to the outside world when it can reach a road
//! tile on the map border through other road tiles.  The mask produced here
//! is the precomputed form accepted by
//! [`build_road_flow_field`](crate::build_road_flow_field).

use std::collections::VecDeque;

use tg_core::{Dir, Grid, TilePos, usable_slice};

use crate::path::{GridPath, reconstruct};

/// Per-tile mask: `1` for road tiles connected to the border, else `0`.
///
/// Empty for a zero-area grid.
pub fn roads_connected_to_edge<G: Grid + ?Sized>(grid: &G) -> Vec<u8> {
    let n = grid.tile_count();
    let mut mask = vec![0u8; n];
    if n == 0 {
        return mask;
    }
    let (w, h) = (grid.width(), grid.height());
    let mut queue: Vec<usize> = Vec::with_capacity(n / 8);

    let mut seed = |pos: TilePos, mask: &mut Vec<u8>| {
        if grid.is_road(pos) {
            let i = grid.index_of(pos);
            if mask[i] == 0 {
                mask[i] = 1;
                queue.push(i);
            }
        }
    };
    for x in 0..w {
        seed(TilePos::new(x, 0), &mut mask);
        if h > 1 {
            seed(TilePos::new(x, h - 1), &mut mask);
        }
    }
    for y in 1..h - 1 {
        seed(TilePos::new(0, y), &mut mask);
        if w > 1 {
            seed(TilePos::new(w - 1, y), &mut mask);
        }
    }

    let mut head = 0;
    while head < queue.len() {
        let pos = grid.pos_of(queue[head]);
        head += 1;
        for dir in Dir::EWSN {
            let np = pos.step(dir);
            if !grid.is_road(np) {
                continue;
            }
            let i = grid.index_of(np);
            if mask[i] == 0 {
                mask[i] = 1;
                queue.push(i);
            }
        }
    }
    mask
}

/// `true` when a 4-neighbour of `pos` is a road marked in `road_to_edge`.
///
/// A mask of the wrong size answers `false`.
pub fn has_adjacent_road_connected_to_edge<G: Grid + ?Sized>(
    grid: &G,
    road_to_edge: &[u8],
    pos: TilePos,
) -> bool {
    if !grid.in_bounds(pos.x, pos.y) || road_to_edge.len() != grid.tile_count() {
        return false;
    }
    Dir::EWSN.iter().any(|&d| {
        let np = pos.step(d);
        grid.is_road(np) && road_to_edge[grid.index_of(np)] != 0
    })
}

/// First road tile next to `pos` in N, E, S, W order.
///
/// With a usable `road_to_edge` mask only border-connected roads qualify.
/// This is how zone tiles find their road access point.
pub fn pick_adjacent_road_tile<G: Grid + ?Sized>(
    grid: &G,
    road_to_edge: Option<&[u8]>,
    pos: TilePos,
) -> Option<TilePos> {
    if !grid.in_bounds(pos.x, pos.y) {
        return None;
    }
    let mask = usable_slice(road_to_edge, grid.tile_count(), "outside-connection mask");
    Dir::NESW
        .iter()
        .map(|&d| pos.step(d))
        .find(|&np| grid.is_road(np) && mask.is_none_or(|m| m[grid.index_of(np)] != 0))
}

/// Shortest road path from `start` to any road tile on the map border.
///
/// A start already on the border yields a single-tile path.
pub fn find_road_path_to_edge<G: Grid + ?Sized>(grid: &G, start: TilePos) -> Option<GridPath> {
    if !grid.is_road(start) {
        return None;
    }
    let n = grid.tile_count();
    let start_idx = grid.index_of(start);
    let mut came_from = vec![-1i32; n];
    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();
    visited[start_idx] = true;
    queue.push_back(start_idx);

    while let Some(cur) = queue.pop_front() {
        let pos = grid.pos_of(cur);
        if grid.is_border(pos) {
            let tiles = reconstruct(grid, &came_from, start_idx, cur);
            return Some(GridPath { tiles });
        }
        for dir in Dir::EWSN {
            let np = pos.step(dir);
            if !grid.is_road(np) {
                continue;
            }
            let i = grid.index_of(np);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            came_from[i] = cur as i32;
            queue.push_back(i);
        }
    }
    None
}
