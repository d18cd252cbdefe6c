//! Directional edge costs.

use tg_core::{EdgeId, Grid, NodeId, TilePos};

use crate::graph::{RoadGraph, RoadGraphEdge};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeWeights {
    /// Equal to `RoadGraphEdge::length`.
    pub steps: i32,
    /// Travel time walking `a → b`: every tile after `a`, `b` included.
    pub cost_ab_milli: i32,
    /// Travel time walking `b → a`: every tile before `b`, `a` included.
    pub cost_ba_milli: i32,
}

/// Parallel to `RoadGraph::edges`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadGraphWeights {
    pub edge: Vec<EdgeWeights>,
}

impl RoadGraphWeights {
    /// Travel time of `edge` when leaving from `from`.  Any node other than
    /// the edge's `a` end is treated as `b`.  `None` when `edge` is out of
    /// range for either table.
    pub fn cost_from(&self, graph: &RoadGraph, edge: EdgeId, from: NodeId) -> Option<i32> {
        let w = self.edge.get(edge.index())?;
        let e = graph.edge(edge)?;
        Some(if e.a == from { w.cost_ab_milli } else { w.cost_ba_milli })
    }
}

fn entry_cost<G: Grid + ?Sized>(grid: &G, tiles: &[TilePos]) -> i32 {
    tiles
        .iter()
        .filter(|p| grid.in_bounds(p.x, p.y))
        .map(|&p| grid.road_travel_time_milli(p))
        .sum()
}

pub fn edge_weights<G: Grid + ?Sized>(grid: &G, edge: &RoadGraphEdge) -> EdgeWeights {
    let n = edge.tiles.len();
    if n < 2 {
        return EdgeWeights { steps: edge.length, ..EdgeWeights::default() };
    }
    EdgeWeights {
        steps: edge.length,
        cost_ab_milli: entry_cost(grid, &edge.tiles[1..]),
        cost_ba_milli: entry_cost(grid, &edge.tiles[..n - 1]),
    }
}

pub fn build_road_graph_weights<G: Grid + ?Sized>(grid: &G, graph: &RoadGraph) -> RoadGraphWeights {
    RoadGraphWeights { edge: graph.edges.iter().map(|e| edge_weights(grid, e)).collect() }
}
