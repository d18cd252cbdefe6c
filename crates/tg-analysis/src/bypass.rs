//! Bypass suggestions for bridge edges.
//!
//! A bridge edge is a single point of failure: closing it splits the road
//! network in two.  For the worst bridges this module asks the road-build
//! planner for the cheapest new road that reconnects both sides without
//! walking along the bridge itself.
//!
//! Bridges are ranked by the heaviest per-tile traffic on them (when a
//! traffic array is supplied), then by the size of the smaller side of the
//! cut, then by edge id.  Each side seeds the multi-source search with at
//! most `max_nodes_per_side` node positions, always including the bridge's
//! own endpoint on that side; larger sides are sampled by a seeded hash so
//! the result is the same on every run.

use log::debug;
use tg_core::{EdgeId, Grid, NodeId, TilePos, road, splitmix64, usable_slice};
use tg_graph::RoadGraph;
use tg_pathing::{BuildCostModel, GridPath, RoadBuildConfig, find_road_build_path_between_sets};

use crate::resilience::{ResilienceResult, blocked_moves_for_edge, compute_bridge_cut};

const EDGE_SEED: u64 = 0xD6E8_FEB8_6659_FD93;
const START_SALT: u64 = 0xA5A5_A5A5_A5A5_A5A5;
const GOAL_SALT: u64 = 0x5A5A_5A5A_5A5A_5A5A;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BypassConfig {
    /// Bridges to plan for, best ranked first.  `0` disables suggestions.
    pub top: usize,
    /// Seed positions per side of the cut.  Values below 1 act as 1.
    pub max_nodes_per_side: usize,
    /// Plan by money instead of by new-tile count.
    pub money_objective: bool,
    /// Road tier the bypass would be built at.
    pub target_level: i32,
    /// Let the planner cross water.
    pub allow_bridges: bool,
    /// Reject bypasses whose planner cost exceeds this.
    pub max_primary_cost: Option<i32>,
    /// Rank by traffic before cut size when a usable traffic array is given.
    pub rank_by_traffic: bool,
}

impl Default for BypassConfig {
    fn default() -> Self {
        Self {
            top: 5,
            max_nodes_per_side: 256,
            money_objective: true,
            target_level: 1,
            allow_bridges: false,
            max_primary_cost: None,
            rank_by_traffic: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BypassSuggestion {
    pub bridge_edge: EdgeId,
    /// Node count of the smaller side of the cut.
    pub cut_size: usize,
    /// Heaviest per-tile traffic on the bridge, `0` without traffic data.
    pub max_traffic: u16,
    /// Planner cost: money or new tiles, per `money_objective`.
    pub primary_cost: i32,
    pub money_cost: i32,
    pub new_tiles: usize,
    pub target_level: i32,
    pub path: GridPath,
}

impl BypassSuggestion {
    pub fn steps(&self) -> i32 {
        self.path.steps()
    }
}

/// Tiles of `path` that are in bounds and not yet road.
pub fn count_new_road_tiles_in_path<G: Grid + ?Sized>(grid: &G, path: &[TilePos]) -> usize {
    path.iter().filter(|&&p| grid.tile(p).is_some_and(|t| !t.is_road())).count()
}

/// Money to bring every in-bounds tile of `path` to `target_level`.
///
/// Existing roads pay only the upgrade; water tiles are priced as bridges.
pub fn estimate_money_cost_for_road_path<G: Grid + ?Sized>(
    grid: &G,
    path: &[TilePos],
    target_level: i32,
) -> i32 {
    let target = road::clamp_level(target_level);
    path.iter()
        .filter_map(|&p| grid.tile(p))
        .map(|t| {
            let current = if t.is_road() { i32::from(t.level) } else { 1 };
            road::placement_cost(current, target, t.is_road(), !t.is_land())
        })
        .sum()
}

struct RankedBridge {
    edge: EdgeId,
    max_traffic: u16,
    cut_size: usize,
}

/// Node positions to seed one side of the search with.
///
/// `must` comes first.  The rest follow in id order, or, when the side is
/// too large, the lowest `(hash, id)` keys fill the remaining slots.
fn side_seeds(
    graph: &RoadGraph,
    side: &[NodeId],
    must: NodeId,
    max: usize,
    seed: u64,
) -> Vec<TilePos> {
    let max = max.max(1);
    let pos = |id: NodeId| graph.nodes.get(id.index()).map(|n| n.pos);
    let mut out: Vec<TilePos> = pos(must).into_iter().collect();
    let rest = side.iter().copied().filter(|&id| id != must && id.index() < graph.node_count());

    if side.len() <= max {
        out.extend(rest.filter_map(pos));
        return out;
    }

    let mut keyed: Vec<(u64, NodeId)> =
        rest.map(|id| (splitmix64(seed ^ u64::from(id.0)), id)).collect();
    keyed.sort_unstable();
    let take = max.saturating_sub(out.len());
    out.extend(keyed.into_iter().take(take).filter_map(|(_, id)| pos(id)));
    out
}

/// Ranked bypass plans for the bridges in `resilience`.
///
/// `traffic` is a per-tile count sized `width * height`; any other size is
/// ignored.  Bridges the planner cannot reconnect within budget are skipped,
/// so fewer than `cfg.top` suggestions may come back.
pub fn suggest_road_resilience_bypasses<G: Grid + ?Sized>(
    grid: &G,
    graph: &RoadGraph,
    resilience: &ResilienceResult,
    cfg: &BypassConfig,
    traffic: Option<&[u16]>,
) -> Vec<BypassSuggestion> {
    let mut out = Vec::new();
    if cfg.top == 0 || graph.node_count() == 0 || graph.edge_count() == 0 || grid.is_degenerate() {
        return out;
    }
    let traffic = if cfg.rank_by_traffic {
        usable_slice(traffic, grid.tile_count(), "bypass traffic")
    } else {
        None
    };

    let mut ranked: Vec<RankedBridge> = resilience
        .bridge_edges
        .iter()
        .filter_map(|&edge| {
            let e = graph.edge(edge)?;
            let sub = resilience.bridge_subtree_nodes.get(edge.index()).copied().unwrap_or(0);
            let other = resilience.bridge_other_nodes.get(edge.index()).copied().unwrap_or(0);
            let max_traffic = traffic.map_or(0, |t| {
                e.tiles
                    .iter()
                    .filter(|p| grid.in_bounds(p.x, p.y))
                    .map(|&p| t[grid.index_of(p)])
                    .max()
                    .unwrap_or(0)
            });
            Some(RankedBridge { edge, max_traffic, cut_size: sub.min(other) })
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.max_traffic
            .cmp(&a.max_traffic)
            .then(b.cut_size.cmp(&a.cut_size))
            .then(a.edge.cmp(&b.edge))
    });
    ranked.truncate(cfg.top);

    let target_level = road::clamp_level(cfg.target_level);
    let build_cfg = RoadBuildConfig {
        target_level,
        allow_bridges: cfg.allow_bridges,
        cost_model: if cfg.money_objective {
            BuildCostModel::Money
        } else {
            BuildCostModel::NewTiles
        },
        ..RoadBuildConfig::default()
    };

    for bridge in &ranked {
        let Some(cut) = compute_bridge_cut(graph, bridge.edge) else {
            continue;
        };
        let Some(e) = graph.edge(bridge.edge) else {
            continue;
        };
        // Search out of the smaller side.
        let (start_side, start_end, goal_side, goal_end) = if cut.side_b.len() < cut.side_a.len() {
            (&cut.side_b, e.b, &cut.side_a, e.a)
        } else {
            (&cut.side_a, e.a, &cut.side_b, e.b)
        };

        let seed = u64::from(bridge.edge.0).wrapping_mul(EDGE_SEED);
        let per_side = cfg.max_nodes_per_side;
        let starts = side_seeds(graph, start_side, start_end, per_side, seed ^ START_SALT);
        let goals = side_seeds(graph, goal_side, goal_end, per_side, seed ^ GOAL_SALT);
        if starts.is_empty() || goals.is_empty() {
            continue;
        }

        let blocked = blocked_moves_for_edge(graph, bridge.edge, grid.width());
        let Some(plan) = find_road_build_path_between_sets(
            grid,
            &starts,
            &goals,
            &build_cfg,
            Some(&blocked),
            cfg.max_primary_cost,
        ) else {
            continue;
        };
        if plan.path.tiles.len() < 2 {
            continue;
        }

        out.push(BypassSuggestion {
            bridge_edge: bridge.edge,
            cut_size: bridge.cut_size,
            max_traffic: bridge.max_traffic,
            primary_cost: plan.primary_cost,
            money_cost: estimate_money_cost_for_road_path(grid, &plan.path.tiles, target_level),
            new_tiles: count_new_road_tiles_in_path(grid, &plan.path.tiles),
            target_level,
            path: plan.path,
        });
    }

    debug!("bypass: {} of {} ranked bridges reconnected", out.len(), ranked.len());
    out
}
