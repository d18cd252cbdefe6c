//! Point-to-point A* on the tile grid.
//!
//! All searches expand neighbours in [`Dir::EWSN`] order and pop the open
//! set by `(f, g, variation, tile)`: among equally promising entries the one
//! with less accumulated cost goes first, then the tile with the smaller
//! variation byte.  That keeps equally short paths stable across runs
//! without making them look ruler-straight.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tg_core::road::MIN_STEP_COST_MILLI;
use tg_core::{Dir, Grid, TilePos, usable_slice};

use crate::path::{GridPath, reconstruct};

const INF: i32 = i32::MAX / 4;

// ── Plain step-count searches ─────────────────────────────────────────────────

/// Shortest road-only path by step count.
pub fn find_road_path_astar<G: Grid + ?Sized>(
    grid: &G,
    start: TilePos,
    goal: TilePos,
) -> Option<GridPath> {
    if !grid.is_road(start) || !grid.is_road(goal) {
        return None;
    }
    unit_astar(grid, start, goal, |p| grid.is_road(p))
}

/// Shortest path over non-water tiles by step count.
///
/// Used to route around lakes when laying out new roads.
pub fn find_land_path_astar<G: Grid + ?Sized>(
    grid: &G,
    start: TilePos,
    goal: TilePos,
) -> Option<GridPath> {
    if !grid.is_land(start) || !grid.is_land(goal) {
        return None;
    }
    unit_astar(grid, start, goal, |p| grid.is_land(p))
}

fn unit_astar<G: Grid + ?Sized>(
    grid: &G,
    start: TilePos,
    goal: TilePos,
    passable: impl Fn(TilePos) -> bool,
) -> Option<GridPath> {
    if start == goal {
        return Some(GridPath { tiles: vec![start] });
    }
    let n = grid.tile_count();
    let start_idx = grid.index_of(start);
    let goal_idx = grid.index_of(goal);
    let tie = |p: TilePos| grid.tile_at(p.x, p.y).variation;

    let mut came_from = vec![-1i32; n];
    let mut g_score = vec![INF; n];
    let mut open: BinaryHeap<Reverse<(i32, i32, u8, usize)>> = BinaryHeap::new();
    g_score[start_idx] = 0;
    open.push(Reverse((start.manhattan(goal), 0, tie(start), start_idx)));

    while let Some(Reverse((_, g, _, cur))) = open.pop() {
        if g != g_score[cur] {
            continue;
        }
        if cur == goal_idx {
            let tiles = reconstruct(grid, &came_from, start_idx, goal_idx);
            return Some(GridPath { tiles });
        }
        let pos = grid.pos_of(cur);
        for dir in Dir::EWSN {
            let np = pos.step(dir);
            if !passable(np) {
                continue;
            }
            let ni = grid.index_of(np);
            let tentative = g + 1;
            if tentative < g_score[ni] {
                came_from[ni] = cur as i32;
                g_score[ni] = tentative;
                open.push(Reverse((tentative + np.manhattan(goal), tentative, tie(np), ni)));
            }
        }
    }
    None
}

// ── Weighted road search ──────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoadPathMetric {
    /// Fewest road tiles; identical choice to [`find_road_path_astar`].
    #[default]
    Steps,
    /// Least travel time including extra tile costs and turn penalties.
    TravelTime,
}

#[derive(Clone, Debug, Default)]
pub struct RoadPathConfig<'a> {
    pub metric: RoadPathMetric,
    /// Extra milli-step cost paid on entering a tile.  Must cover the whole
    /// grid or it is ignored.
    pub extra_tile_cost_milli: Option<&'a [i32]>,
    /// Paid whenever consecutive moves change direction.  Shapes the route
    /// only under [`RoadPathMetric::TravelTime`] but is always reported.
    pub turn_penalty_milli: i32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadPathCostBreakdown {
    /// Road-class travel time, bridge penalties included.
    pub travel_time_milli: i32,
    pub extra_cost_milli: i32,
    pub turn_penalty_milli: i32,
}

impl RoadPathCostBreakdown {
    pub fn total_milli(&self) -> i32 {
        self.travel_time_milli + self.extra_cost_milli + self.turn_penalty_milli
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadPathResult {
    pub path: GridPath,
    pub cost: RoadPathCostBreakdown,
}

impl RoadPathResult {
    pub fn steps(&self) -> i32 {
        self.path.steps()
    }
}

/// Cost of walking `path` (inclusive polyline of road tiles).
///
/// The start tile is not entered and costs nothing.  Negative extra costs
/// count as zero.
pub fn road_path_cost<G: Grid + ?Sized>(
    grid: &G,
    path: &[TilePos],
    extra_tile_cost_milli: Option<&[i32]>,
    turn_penalty_milli: i32,
) -> RoadPathCostBreakdown {
    let extra = usable_slice(extra_tile_cost_milli, grid.tile_count(), "extra tile cost");
    let mut out = RoadPathCostBreakdown::default();
    let mut prev_dir: Option<Dir> = None;
    for pair in path.windows(2) {
        let to = pair[1];
        if !grid.in_bounds(to.x, to.y) {
            continue;
        }
        out.travel_time_milli += grid.road_travel_time_milli(to);
        if let Some(e) = extra {
            out.extra_cost_milli += e[grid.index_of(to)].max(0);
        }
        let dir = Dir::between(pair[0], to);
        if prev_dir.is_some() && dir != prev_dir {
            out.turn_penalty_milli += turn_penalty_milli.max(0);
        }
        prev_dir = dir;
    }
    out
}

/// Road search with a selectable metric and a full cost breakdown.
pub fn find_road_path_astar_ex<G: Grid + ?Sized>(
    grid: &G,
    start: TilePos,
    goal: TilePos,
    cfg: &RoadPathConfig<'_>,
) -> Option<RoadPathResult> {
    let path = match cfg.metric {
        RoadPathMetric::Steps => find_road_path_astar(grid, start, goal)?,
        RoadPathMetric::TravelTime => travel_time_astar(grid, start, goal, cfg)?,
    };
    let cost = road_path_cost(grid, &path.tiles, cfg.extra_tile_cost_milli, cfg.turn_penalty_milli);
    Some(RoadPathResult { path, cost })
}

/// A* over `(tile, incoming direction)` states so turn penalties are exact.
/// Direction slot 4 means "no move yet".
fn travel_time_astar<G: Grid + ?Sized>(
    grid: &G,
    start: TilePos,
    goal: TilePos,
    cfg: &RoadPathConfig<'_>,
) -> Option<GridPath> {
    const DIR_NONE: usize = 4;
    const SLOTS: usize = 5;

    if !grid.is_road(start) || !grid.is_road(goal) {
        return None;
    }
    if start == goal {
        return Some(GridPath { tiles: vec![start] });
    }
    let n = grid.tile_count();
    let extra = usable_slice(cfg.extra_tile_cost_milli, n, "extra tile cost");
    let turn = cfg.turn_penalty_milli.max(0);
    let h = |p: TilePos| p.manhattan(goal) * MIN_STEP_COST_MILLI;
    let tie = |p: TilePos| grid.tile_at(p.x, p.y).variation;

    let mut best = vec![(INF, INF); n * SLOTS];
    let mut came_from = vec![-1i32; n * SLOTS];
    // (f, g, steps, variation, state)
    let mut open: BinaryHeap<Reverse<(i32, i32, i32, u8, usize)>> = BinaryHeap::new();
    let start_state = grid.index_of(start) * SLOTS + DIR_NONE;
    best[start_state] = (0, 0);
    open.push(Reverse((h(start), 0, 0, tie(start), start_state)));

    let goal_idx = grid.index_of(goal);
    while let Some(Reverse((_, g, steps, _, state))) = open.pop() {
        if (g, steps) != best[state] {
            continue;
        }
        let (tile, slot) = (state / SLOTS, state % SLOTS);
        if tile == goal_idx {
            let mut tiles = Vec::with_capacity(steps as usize + 1);
            let mut s = state as i32;
            while s >= 0 {
                tiles.push(grid.pos_of(s as usize / SLOTS));
                s = came_from[s as usize];
            }
            tiles.reverse();
            return Some(GridPath { tiles });
        }
        let pos = grid.pos_of(tile);
        for (d, dir) in Dir::EWSN.into_iter().enumerate() {
            let np = pos.step(dir);
            if !grid.is_road(np) {
                continue;
            }
            let ni = grid.index_of(np);
            let mut step_cost = grid.road_travel_time_milli(np);
            if let Some(e) = extra {
                step_cost = step_cost.saturating_add(e[ni].max(0));
            }
            if slot != DIR_NONE && slot != d {
                step_cost = step_cost.saturating_add(turn);
            }
            let ng = g.saturating_add(step_cost).min(INF - 1);
            let ns = steps + 1;
            let nstate = ni * SLOTS + d;
            if (ng, ns) < best[nstate] {
                best[nstate] = (ng, ns);
                came_from[nstate] = state as i32;
                open.push(Reverse((ng.saturating_add(h(np)), ng, ns, tie(np), nstate)));
            }
        }
    }
    None
}
