//! Road-construction planning.
//!
//! The planner walks over tiles where a road *could* exist (empty land, or
//! existing road; water only when bridges are allowed) and minimises, in
//! order:
//!
//! 1. primary cost (new tiles, or money under [`BuildCostModel::Money`]),
//!    including the start tile's own cost and optional slope penalties
//! 2. steps
//! 3. turns
//! 4. the entered tile's variation byte
//! 5. the `(tile, incoming direction)` state id
//!
//! Existing roads can cost zero, so the search runs with a zero heuristic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashSet;
use tg_core::{Dir, Grid, Overlay, Terrain, TilePos, road};

use crate::path::GridPath;

const INF: i32 = i32::MAX / 4;
const DIR_NONE: usize = 4;
const SLOTS: usize = 5;

/// Directed `(from_index, to_index)` moves the planner may not take.
pub type BlockedMoves = FxHashSet<(usize, usize)>;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BuildCostModel {
    /// Count of tiles that would need a new road.  Existing roads are free.
    #[default]
    NewTiles,
    /// Money to build or upgrade each tile to `target_level`, bridges included.
    Money,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadBuildConfig {
    /// Desired road tier; only priced under [`BuildCostModel::Money`].
    pub target_level: i32,
    pub allow_bridges: bool,
    pub cost_model: BuildCostModel,
    /// Cost units per 1.0 of height difference between adjacent tiles.
    /// `0` disables the slope term.
    pub slope_cost: i32,
    /// Also charge slope when stepping onto an existing road.
    pub slope_cost_affects_existing_roads: bool,
}

impl Default for RoadBuildConfig {
    fn default() -> Self {
        Self {
            target_level: 1,
            allow_bridges: false,
            cost_model: BuildCostModel::NewTiles,
            slope_cost: 0,
            slope_cost_affects_existing_roads: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadBuildPath {
    pub path: GridPath,
    pub primary_cost: i32,
}

// ── Cost model ────────────────────────────────────────────────────────────────

struct Pricing<'g, G: Grid + ?Sized> {
    grid: &'g G,
    cfg: &'g RoadBuildConfig,
    target_level: i32,
}

impl<'g, G: Grid + ?Sized> Pricing<'g, G> {
    fn new(grid: &'g G, cfg: &'g RoadBuildConfig) -> Self {
        Self { grid, cfg, target_level: road::clamp_level(cfg.target_level) }
    }

    /// Roads never bulldoze zones or parks.
    fn buildable(&self, pos: TilePos) -> bool {
        self.grid.tile(pos).is_some_and(|t| {
            (self.cfg.allow_bridges || t.terrain != Terrain::Water)
                && matches!(t.overlay, Overlay::None | Overlay::Road)
        })
    }

    fn tile_cost(&self, pos: TilePos) -> i32 {
        let Some(t) = self.grid.tile(pos) else {
            return INF;
        };
        match self.cfg.cost_model {
            BuildCostModel::NewTiles => i32::from(!t.is_road()),
            BuildCostModel::Money => {
                let bridge = t.terrain == Terrain::Water;
                if t.is_road() {
                    road::placement_cost(i32::from(t.level), self.target_level, true, bridge)
                } else {
                    road::placement_cost(1, self.target_level, false, bridge)
                }
            }
        }
    }

    fn slope(&self, from: TilePos, to: TilePos) -> i32 {
        if self.cfg.slope_cost <= 0 {
            return 0;
        }
        let (Some(a), Some(b)) = (self.grid.tile(from), self.grid.tile(to)) else {
            return 0;
        };
        if !self.cfg.slope_cost_affects_existing_roads && b.is_road() {
            return 0;
        }
        let raw = (b.height - a.height).abs() * self.cfg.slope_cost as f32;
        ((raw + 0.5) as i32).clamp(0, INF / 8)
    }

    fn path_cost(&self, tiles: &[TilePos]) -> i32 {
        let tiles_cost: i32 = tiles.iter().map(|&p| self.tile_cost(p)).filter(|&c| c < INF).sum();
        let slope_cost: i32 = tiles.windows(2).map(|w| self.slope(w[0], w[1])).sum();
        tiles_cost + slope_cost
    }

    fn variation(&self, idx: usize) -> u8 {
        let p = self.grid.pos_of(idx);
        self.grid.tile_at(p.x, p.y).variation
    }
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Cheapest road-build path from `start` to `goal`.
///
/// Both ends must be buildable.  `primary_cost` always charges the start
/// tile, so `start == goal` is not free: the single-tile path costs what
/// building that one tile costs (`1` on empty land under
/// [`BuildCostModel::NewTiles`], `0` on an existing road).
pub fn find_road_build_path<G: Grid + ?Sized>(
    grid: &G,
    start: TilePos,
    goal: TilePos,
    cfg: &RoadBuildConfig,
) -> Option<RoadBuildPath> {
    let pricing = Pricing::new(grid, cfg);
    if !pricing.buildable(start) || !pricing.buildable(goal) {
        return None;
    }
    if start == goal {
        let tiles = vec![start];
        let primary_cost = pricing.path_cost(&tiles);
        return Some(RoadBuildPath { path: GridPath { tiles }, primary_cost });
    }
    let goal_idx = grid.index_of(goal);
    let tiles = plan(&pricing, &[grid.index_of(start)], |i| i == goal_idx, None, None)?;
    let primary_cost = pricing.path_cost(&tiles);
    Some(RoadBuildPath { path: GridPath { tiles }, primary_cost })
}

/// Cheapest road-build path from any tile of `starts` to any tile of `goals`.
///
/// Unbuildable entries are dropped from both sets.  `blocked` forbids
/// specific directed moves (see
/// `tg_analysis::resilience::blocked_moves_for_edge`).  When
/// `max_primary_cost` is set, any path costing more is rejected.
pub fn find_road_build_path_between_sets<G: Grid + ?Sized>(
    grid: &G,
    starts: &[TilePos],
    goals: &[TilePos],
    cfg: &RoadBuildConfig,
    blocked: Option<&BlockedMoves>,
    max_primary_cost: Option<i32>,
) -> Option<RoadBuildPath> {
    let pricing = Pricing::new(grid, cfg);
    let mut start_idx: Vec<usize> =
        starts.iter().filter(|&&p| pricing.buildable(p)).map(|&p| grid.index_of(p)).collect();
    let mut goal_idx: Vec<usize> =
        goals.iter().filter(|&&p| pricing.buildable(p)).map(|&p| grid.index_of(p)).collect();
    if start_idx.is_empty() || goal_idx.is_empty() {
        return None;
    }
    start_idx.sort_unstable();
    start_idx.dedup();
    goal_idx.sort_unstable();
    goal_idx.dedup();

    let mut is_goal = vec![false; grid.tile_count()];
    for &g in &goal_idx {
        is_goal[g] = true;
    }
    let within_budget = |c: i32| max_primary_cost.is_none_or(|m| c <= m);

    // A start that is already a goal: cheapest such tile, then lowest index.
    let trivial = start_idx
        .iter()
        .filter(|&&s| is_goal[s])
        .min_by_key(|&&s| (pricing.tile_cost(grid.pos_of(s)), s));
    if let Some(&s) = trivial {
        let tiles = vec![grid.pos_of(s)];
        let primary_cost = pricing.path_cost(&tiles);
        return within_budget(primary_cost)
            .then_some(RoadBuildPath { path: GridPath { tiles }, primary_cost });
    }

    let tiles = plan(&pricing, &start_idx, |i| is_goal[i], blocked, max_primary_cost)?;
    let primary_cost = pricing.path_cost(&tiles);
    within_budget(primary_cost).then_some(RoadBuildPath { path: GridPath { tiles }, primary_cost })
}

// ── Search core ───────────────────────────────────────────────────────────────

/// Label of a search state: (cost, steps, turns).
type Label = (i32, i32, i32);

fn plan<G: Grid + ?Sized>(
    pricing: &Pricing<'_, G>,
    seeds: &[usize],
    is_goal: impl Fn(usize) -> bool,
    blocked: Option<&BlockedMoves>,
    max_cost: Option<i32>,
) -> Option<Vec<TilePos>> {
    let grid = pricing.grid;
    let n = grid.tile_count();
    let over_budget = |c: i32| max_cost.is_some_and(|m| c > m);

    let mut best: Vec<Label> = vec![(INF, INF, INF); n * SLOTS];
    let mut came_from = vec![-1i32; n * SLOTS];
    // (cost, steps, turns, variation, state)
    let mut open: BinaryHeap<Reverse<(i32, i32, i32, u8, usize)>> = BinaryHeap::new();

    for &s in seeds {
        let c = pricing.tile_cost(grid.pos_of(s));
        if c >= INF || over_budget(c) {
            continue;
        }
        let state = s * SLOTS + DIR_NONE;
        if (c, 0, 0) < best[state] {
            best[state] = (c, 0, 0);
            open.push(Reverse((c, 0, 0, pricing.variation(s), state)));
        }
    }

    let mut found = None;
    while let Some(Reverse((cost, steps, turns, _, state))) = open.pop() {
        if (cost, steps, turns) != best[state] || over_budget(cost) {
            continue;
        }
        let (tile, slot) = (state / SLOTS, state % SLOTS);
        if is_goal(tile) {
            found = Some(state);
            break;
        }
        let pos = grid.pos_of(tile);
        for (d, dir) in Dir::EWSN.into_iter().enumerate() {
            let np = pos.step(dir);
            if !pricing.buildable(np) {
                continue;
            }
            let ni = grid.index_of(np);
            if blocked.is_some_and(|b| b.contains(&(tile, ni))) {
                continue;
            }
            let step_cost = pricing.tile_cost(np);
            if step_cost >= INF {
                continue;
            }
            let label: Label = (
                cost + step_cost + pricing.slope(pos, np),
                steps + 1,
                turns + i32::from(slot != DIR_NONE && slot != d),
            );
            if over_budget(label.0) {
                continue;
            }
            let nstate = ni * SLOTS + d;
            if label < best[nstate] {
                best[nstate] = label;
                came_from[nstate] = state as i32;
                open.push(Reverse((label.0, label.1, label.2, pricing.variation(ni), nstate)));
            }
        }
    }

    let mut s = found? as i32;
    let mut tiles = Vec::new();
    while s >= 0 {
        tiles.push(grid.pos_of(s as usize / SLOTS));
        s = came_from[s as usize];
    }
    tiles.reverse();
    Some(tiles)
}
