//! Tile-to-tile routing over the compressed road graph.
//!
//! # Endpoints
//!
//! Start and goal are road *tiles*.  A tile that is a node is used as is.  A
//! tile inside a corridor offers two choices, walking to either end node,
//! each carrying its own tile segment and cost.  Node-to-node A* runs for
//! every start × goal choice (at most four) and the cheapest total wins.
//! Both tiles inside the same corridor short-cut to a slice of that
//! corridor, which is optimal because corridors are straight.
//!
//! # Ordering
//!
//! Totals compare as `(primary, secondary, start choice, goal choice)`.
//! Under [`RoadRouteMetric::TravelTime`] the primary is travel time and the
//! secondary is steps; under [`RoadRouteMetric::Steps`] they swap.  Inside
//! the node search the heap key is `(f, primary, secondary, node)` and equal
//! labels prefer the lower predecessor node, then the lower edge id.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use log::trace;
use tg_core::road::MIN_STEP_COST_MILLI;
use tg_core::{EdgeId, Grid, NodeId, TilePos};

use crate::error::{RouteError, RouteResult};
use crate::graph::RoadGraph;
use crate::index::{RoadGraphIndex, TileLocation, build_road_graph_index};
use crate::weights::{RoadGraphWeights, build_road_graph_weights};

const INF: i32 = i32::MAX / 4;

// ── Config & result ───────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoadRouteMetric {
    /// Least travel time, then fewest steps.
    #[default]
    TravelTime,
    /// Fewest steps, then least travel time.
    Steps,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteConfig {
    pub metric: RoadRouteMetric,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadRoute {
    /// Road tiles from start to goal, inclusive.
    pub path: Vec<TilePos>,
    pub steps: i32,
    /// Sum of entered-tile travel times (the start tile is free).
    pub cost_milli: i32,
}

impl RoadRoute {
    fn from_path<G: Grid + ?Sized>(grid: &G, path: Vec<TilePos>) -> Self {
        let cost_milli = segment_cost(grid, &path);
        Self { steps: path.len() as i32 - 1, cost_milli, path }
    }

    /// `true` when start and goal are the same tile.
    pub fn is_trivial(&self) -> bool {
        self.steps == 0
    }
}

// ── RoadRouter ────────────────────────────────────────────────────────────────

/// A road graph bundled with the index and weights derived from it.
///
/// All three must come from the same grid snapshot; rebuild the router after
/// any road edit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadRouter {
    pub graph: RoadGraph,
    pub index: RoadGraphIndex,
    pub weights: RoadGraphWeights,
}

impl RoadRouter {
    pub fn build<G: Grid + ?Sized>(grid: &G) -> Self {
        let graph = crate::graph::build_road_graph(grid);
        let index = build_road_graph_index(grid, &graph);
        let weights = build_road_graph_weights(grid, &graph);
        Self { graph, index, weights }
    }

    pub fn route<G: Grid + ?Sized>(
        &self,
        grid: &G,
        start: TilePos,
        goal: TilePos,
        cfg: &RouteConfig,
    ) -> RouteResult<RoadRoute> {
        find_road_route(grid, &self.graph, &self.index, &self.weights, start, goal, cfg)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Route between two road tiles using `graph`.
///
/// Never returns a partial path: any malformed input or disconnected pair is
/// an error.
pub fn find_road_route<G: Grid + ?Sized>(
    grid: &G,
    graph: &RoadGraph,
    index: &RoadGraphIndex,
    weights: &RoadGraphWeights,
    start: TilePos,
    goal: TilePos,
    cfg: &RouteConfig,
) -> RouteResult<RoadRoute> {
    if grid.is_degenerate() {
        return Err(RouteError::InvalidGrid);
    }
    for p in [start, goal] {
        if !grid.is_road(p) {
            return Err(RouteError::NotRoad(p));
        }
    }
    if graph.is_empty() {
        return Err(RouteError::EmptyGraph);
    }
    if start == goal {
        return Ok(RoadRoute { path: vec![start], steps: 0, cost_milli: 0 });
    }
    if !index.matches(grid) {
        return Err(RouteError::IndexMismatch {
            index_width: index.width,
            index_height: index.height,
            width: grid.width(),
            height: grid.height(),
        });
    }
    if weights.edge.len() != graph.edge_count() {
        return Err(RouteError::WeightsMismatch {
            weights: weights.edge.len(),
            edges: graph.edge_count(),
        });
    }

    let s_loc = index.lookup(start);
    let g_loc = index.lookup(goal);
    let no_route = RouteError::NoRoute { from: start, to: goal };

    if let (
        TileLocation::EdgeInterior { edge: se, offset: so },
        TileLocation::EdgeInterior { edge: ge, offset: go },
    ) = (s_loc, g_loc)
    {
        if se == ge {
            let tiles = &graph.edge(se).ok_or(RouteError::Unmapped(start))?.tiles;
            let path: Vec<TilePos> = if so <= go {
                tiles.get(so..=go).map(<[TilePos]>::to_vec).unwrap_or_default()
            } else {
                tiles.get(go..=so).map(|s| s.iter().rev().copied().collect()).unwrap_or_default()
            };
            if path.len() < 2 {
                return Err(no_route);
            }
            return Ok(RoadRoute::from_path(grid, path));
        }
    }

    let starts = endpoint_choices(grid, graph, s_loc, start, Side::Start)
        .ok_or(RouteError::Unmapped(start))?;
    let goals = endpoint_choices(grid, graph, g_loc, goal, Side::Goal)
        .ok_or(RouteError::Unmapped(goal))?;

    let metric = cfg.metric;
    let mut best: Option<((i32, i32, usize, usize), NodePath)> = None;
    for (si, sc) in starts.iter().enumerate() {
        for (gi, gc) in goals.iter().enumerate() {
            let Some(np) = node_path(graph, weights, sc.node, gc.node, metric) else {
                continue;
            };
            let (sp, ss) = sc.key(metric);
            let (gp, gs) = gc.key(metric);
            let key = (sp + np.primary + gp, ss + np.secondary + gs, si, gi);
            if best.as_ref().is_none_or(|(k, _)| key < *k) {
                best = Some((key, np));
            }
        }
    }
    let Some(((_, _, si, gi), np)) = best else {
        trace!("no route from {start} to {goal}");
        return Err(no_route);
    };

    let path = assemble(graph, &starts[si], &np, &goals[gi]);
    if path.len() < 2 || path.first() != Some(&start) || path.last() != Some(&goal) {
        return Err(no_route);
    }
    Ok(RoadRoute::from_path(grid, path))
}

// ── Endpoint choices ──────────────────────────────────────────────────────────

fn segment_cost<G: Grid + ?Sized>(grid: &G, seg: &[TilePos]) -> i32 {
    seg.iter().skip(1).map(|&p| grid.road_travel_time_milli(p)).sum()
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Side {
    Start,
    Goal,
}

struct Endpoint {
    node: NodeId,
    /// Start side: tile → node.  Goal side: node → tile.
    segment: Vec<TilePos>,
    steps: i32,
    cost: i32,
}

impl Endpoint {
    fn new<G: Grid + ?Sized>(grid: &G, node: NodeId, segment: Vec<TilePos>) -> Self {
        Self { node, steps: segment.len() as i32 - 1, cost: segment_cost(grid, &segment), segment }
    }

    fn key(&self, metric: RoadRouteMetric) -> (i32, i32) {
        match metric {
            RoadRouteMetric::TravelTime => (self.cost, self.steps),
            RoadRouteMetric::Steps => (self.steps, self.cost),
        }
    }
}

fn endpoint_choices<G: Grid + ?Sized>(
    grid: &G,
    graph: &RoadGraph,
    loc: TileLocation,
    tile: TilePos,
    side: Side,
) -> Option<Vec<Endpoint>> {
    match loc {
        TileLocation::Node(n) => Some(vec![Endpoint::new(grid, n, vec![tile])]),
        TileLocation::EdgeInterior { edge, offset } => {
            let e = graph.edge(edge)?;
            if offset >= e.tiles.len() {
                return None;
            }
            let (to_a, to_b): (Vec<TilePos>, Vec<TilePos>) = match side {
                Side::Start => (
                    e.tiles[..=offset].iter().rev().copied().collect(),
                    e.tiles[offset..].to_vec(),
                ),
                Side::Goal => (
                    e.tiles[..=offset].to_vec(),
                    e.tiles[offset..].iter().rev().copied().collect(),
                ),
            };
            Some(vec![Endpoint::new(grid, e.a, to_a), Endpoint::new(grid, e.b, to_b)])
        }
        TileLocation::Unmapped => None,
    }
}

// ── Node A* ───────────────────────────────────────────────────────────────────

struct NodePath {
    /// `edges[i]` leads from the i-th to the (i+1)-th node of the walk.
    edges: Vec<EdgeId>,
    primary: i32,
    secondary: i32,
}

fn edge_key(
    graph: &RoadGraph,
    weights: &RoadGraphWeights,
    edge: EdgeId,
    from: NodeId,
    metric: RoadRouteMetric,
) -> Option<(i32, i32)> {
    let cost = weights.cost_from(graph, edge, from)?;
    let steps = weights.edge.get(edge.index())?.steps;
    Some(match metric {
        RoadRouteMetric::TravelTime => (cost, steps),
        RoadRouteMetric::Steps => (steps, cost),
    })
}

fn heuristic(graph: &RoadGraph, node: NodeId, goal: NodeId, metric: RoadRouteMetric) -> i32 {
    let md = graph.nodes[node.index()].pos.manhattan(graph.nodes[goal.index()].pos);
    match metric {
        RoadRouteMetric::Steps => md,
        RoadRouteMetric::TravelTime => md * MIN_STEP_COST_MILLI,
    }
}

fn node_path(
    graph: &RoadGraph,
    weights: &RoadGraphWeights,
    start: NodeId,
    goal: NodeId,
    metric: RoadRouteMetric,
) -> Option<NodePath> {
    let n = graph.node_count();
    if start.index() >= n || goal.index() >= n {
        return None;
    }
    if start == goal {
        return Some(NodePath { edges: Vec::new(), primary: 0, secondary: 0 });
    }

    let mut best = vec![(INF, INF); n];
    let mut prev = vec![(NodeId::INVALID, EdgeId::INVALID); n];
    let mut open: BinaryHeap<Reverse<(i32, i32, i32, NodeId)>> = BinaryHeap::new();
    best[start.index()] = (0, 0);
    open.push(Reverse((heuristic(graph, start, goal, metric), 0, 0, start)));

    while let Some(Reverse((_, p, s, node))) = open.pop() {
        if (p, s) != best[node.index()] {
            continue;
        }
        if node == goal {
            break;
        }
        for (edge, next) in graph.neighbours(node) {
            if next.index() >= n {
                continue;
            }
            let Some((dp, ds)) = edge_key(graph, weights, edge, node, metric) else {
                continue;
            };
            let label = (p + dp, s + ds);
            let improve = match label.cmp(&best[next.index()]) {
                Ordering::Less => true,
                Ordering::Equal => {
                    let (old_node, old_edge) = prev[next.index()];
                    !old_node.is_valid() || (node, edge) < (old_node, old_edge)
                }
                Ordering::Greater => false,
            };
            if !improve {
                continue;
            }
            best[next.index()] = label;
            prev[next.index()] = (node, edge);
            open.push(Reverse((label.0 + heuristic(graph, next, goal, metric), label.0, label.1, next)));
        }
    }

    let (primary, secondary) = best[goal.index()];
    if primary >= INF {
        return None;
    }
    let mut edges = Vec::new();
    let mut cur = goal;
    for _ in 0..n + 8 {
        if cur == start {
            break;
        }
        let (p, e) = prev[cur.index()];
        if !p.is_valid() {
            return None;
        }
        edges.push(e);
        cur = p;
    }
    if cur != start {
        return None;
    }
    edges.reverse();
    Some(NodePath { edges, primary, secondary })
}

// ── Path assembly ─────────────────────────────────────────────────────────────

fn assemble(graph: &RoadGraph, start: &Endpoint, np: &NodePath, goal: &Endpoint) -> Vec<TilePos> {
    let mut path = start.segment.clone();
    let mut cur = start.node;
    for &e in &np.edges {
        let Some(edge) = graph.edge(e) else {
            break;
        };
        if cur == edge.a {
            path.extend(edge.tiles.iter().skip(1));
            cur = edge.b;
        } else if cur == edge.b {
            path.extend(edge.tiles.iter().rev().skip(1));
            cur = edge.a;
        } else {
            break;
        }
    }
    path.dedup();
    path.extend(goal.segment.iter().skip(1));
    path
}
