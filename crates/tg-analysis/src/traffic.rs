//! Per-tile traffic folded onto road-graph nodes and edges.
//!
//! Edge endpoints are shared by every edge meeting at a junction, so each
//! edge reports two sets of totals: one over all of its tiles and one over
//! its interior only.  Node incident figures use the interior totals.

use tg_core::{Grid, NodeId, TilePos, road};
use tg_graph::RoadGraph;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrafficConfig {
    /// Vehicles per street tile before tier scaling.
    pub base_tile_capacity: i32,
    /// Scale capacity by road tier; otherwise every road tile gets the base.
    pub use_road_level_capacity: bool,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self { base_tile_capacity: 28, use_road_level_capacity: true }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeTrafficStats {
    pub pos: TilePos,
    pub degree: usize,
    pub traffic: i32,
    pub capacity: i32,
    pub util: f64,
    /// Sum of interior traffic over incident edges.
    pub incident_sum_traffic: u64,
    /// Max interior utilization over incident edges (all-tile max for
    /// edges without an interior).
    pub incident_max_util: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrafficTotals {
    pub sum_traffic: u64,
    pub max_traffic: i32,
    pub sum_capacity: u64,
    /// `0` when no tile was counted.
    pub min_capacity: i32,
    pub max_capacity: i32,
    pub sum_util: f64,
    pub max_util: f64,
    /// Tiles whose traffic exceeds capacity.
    pub congested_tiles: usize,
    /// Sum of `traffic - capacity` over congested tiles.
    pub excess_traffic: u64,
}

impl TrafficTotals {
    fn add(&mut self, traffic: i32, capacity: i32, first: bool) {
        self.sum_traffic += traffic.max(0) as u64;
        self.max_traffic = self.max_traffic.max(traffic);
        self.sum_capacity += capacity.max(0) as u64;
        self.min_capacity = if first { capacity } else { self.min_capacity.min(capacity) };
        self.max_capacity = self.max_capacity.max(capacity);
        if capacity > 0 {
            let u = f64::from(traffic) / f64::from(capacity);
            self.sum_util += u;
            self.max_util = self.max_util.max(u);
            if traffic > capacity {
                self.congested_tiles += 1;
                self.excess_traffic += (traffic - capacity) as u64;
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeTrafficStats {
    pub a: NodeId,
    pub b: NodeId,
    pub length: i32,
    pub tile_count: usize,
    pub interior_tile_count: usize,
    pub all: TrafficTotals,
    pub interior: TrafficTotals,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrafficAggregation {
    pub width: i32,
    pub height: i32,
    pub cfg: TrafficConfig,
    /// Parallel to `RoadGraph::nodes`.
    pub nodes: Vec<NodeTrafficStats>,
    /// Parallel to `RoadGraph::edges`.
    pub edges: Vec<EdgeTrafficStats>,
}

impl TrafficAggregation {
    /// Edges ordered by interior excess traffic, worst first; ties by id.
    pub fn most_congested_edges(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.edges.len()).collect();
        order.sort_by_key(|&i| (std::cmp::Reverse(self.edges[i].interior.excess_traffic), i));
        order
    }
}

/// Capacity of the tile at `pos`; `0` for anything that is not a road.
pub fn tile_capacity<G: Grid + ?Sized>(grid: &G, pos: TilePos, cfg: &TrafficConfig) -> i32 {
    let Some(tile) = grid.tile(pos).filter(|t| t.is_road()) else {
        return 0;
    };
    let base = cfg.base_tile_capacity.max(0);
    if !cfg.use_road_level_capacity {
        return base.max(1);
    }
    road::capacity(base, i32::from(tile.level)).max(1)
}

/// Fold the simulation's per-tile road traffic onto `graph`.
///
/// `traffic` is row-major over `grid`; any other length counts as no
/// traffic at all (capacities are still reported for edges).
pub fn aggregate_traffic_on_road_graph<G: Grid + ?Sized>(
    grid: &G,
    graph: &RoadGraph,
    traffic: &[u16],
    cfg: &TrafficConfig,
) -> TrafficAggregation {
    let usable = tg_core::usable_slice(Some(traffic), grid.tile_count(), "traffic array");
    aggregate(grid, graph, cfg, usable.map(|t| move |i: usize| i32::from(t[i])))
}

/// Same as [`aggregate_traffic_on_road_graph`] for 32-bit flow counts.
/// Values above `i32::MAX` saturate.
pub fn aggregate_flow_on_road_graph<G: Grid + ?Sized>(
    grid: &G,
    graph: &RoadGraph,
    flow: &[u32],
    cfg: &TrafficConfig,
) -> TrafficAggregation {
    let usable = tg_core::usable_slice(Some(flow), grid.tile_count(), "flow array");
    let saturating = usable.map(|f| move |i: usize| i32::try_from(f[i]).unwrap_or(i32::MAX));
    aggregate(grid, graph, cfg, saturating)
}

fn aggregate<G, F>(
    grid: &G,
    graph: &RoadGraph,
    cfg: &TrafficConfig,
    value_at: Option<F>,
) -> TrafficAggregation
where
    G: Grid + ?Sized,
    F: Fn(usize) -> i32,
{
    let mut out = TrafficAggregation {
        width: grid.width(),
        height: grid.height(),
        cfg: cfg.clone(),
        ..TrafficAggregation::default()
    };
    if grid.is_degenerate() {
        return out;
    }
    let traffic_at = |p: TilePos| value_at.as_ref().map_or(0, |f| f(grid.index_of(p)));

    out.nodes = graph
        .nodes
        .iter()
        .map(|node| {
            let mut ns = NodeTrafficStats {
                pos: node.pos,
                degree: node.edges.len(),
                ..NodeTrafficStats::default()
            };
            if value_at.is_some() && grid.in_bounds(node.pos.x, node.pos.y) {
                ns.traffic = traffic_at(node.pos);
                ns.capacity = tile_capacity(grid, node.pos, cfg);
                if ns.capacity > 0 {
                    ns.util = f64::from(ns.traffic) / f64::from(ns.capacity);
                }
            }
            ns
        })
        .collect();

    out.edges = graph
        .edges
        .iter()
        .map(|edge| {
            let n = edge.tiles.len();
            let mut es = EdgeTrafficStats {
                a: edge.a,
                b: edge.b,
                length: edge.length,
                tile_count: n,
                interior_tile_count: n.saturating_sub(2),
                ..EdgeTrafficStats::default()
            };
            let (mut seen_all, mut seen_interior) = (false, false);
            for (i, &p) in edge.tiles.iter().enumerate() {
                if !grid.in_bounds(p.x, p.y) {
                    continue;
                }
                let cap = tile_capacity(grid, p, cfg);
                let v = traffic_at(p);
                es.all.add(v, cap, !seen_all);
                seen_all = true;
                if i > 0 && i + 1 < n {
                    es.interior.add(v, cap, !seen_interior);
                    seen_interior = true;
                }
            }
            es
        })
        .collect();

    for (ns, node) in out.nodes.iter_mut().zip(&graph.nodes) {
        for es in node.edges.iter().filter_map(|e| out.edges.get(e.index())) {
            ns.incident_sum_traffic += es.interior.sum_traffic;
            let u = if es.interior_tile_count > 0 { es.interior.max_util } else { es.all.max_util };
            ns.incident_max_util = ns.incident_max_util.max(u);
        }
    }
    out
}
