//! Tile → graph lookup table.
//!
//! Node tiles map to their node.  Only *interior* corridor tiles map to an
//! `(edge, offset)` pair; endpoints are left to the node mapping so a tile
//! shared by several edges at a junction is never ambiguous.

use tg_core::{EdgeId, Grid, NodeId, TilePos};

use crate::graph::RoadGraph;

/// Where a tile sits in the road graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileLocation {
    Node(NodeId),
    /// `offset` indexes `RoadGraphEdge::tiles` and is never an endpoint.
    EdgeInterior { edge: EdgeId, offset: usize },
    Unmapped,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadGraphIndex {
    pub width: i32,
    pub height: i32,
    pub tile_to_node: Vec<NodeId>,
    pub tile_to_edge: Vec<EdgeId>,
    /// Offset into the edge polyline; `u32::MAX` where `tile_to_edge` is unset.
    pub tile_to_edge_offset: Vec<u32>,
}

impl RoadGraphIndex {
    /// `true` when the tables were built for a grid of this size.
    pub fn matches<G: Grid + ?Sized>(&self, grid: &G) -> bool {
        let n = grid.tile_count();
        self.width == grid.width()
            && self.height == grid.height()
            && self.tile_to_node.len() == n
            && self.tile_to_edge.len() == n
            && self.tile_to_edge_offset.len() == n
    }

    fn flat(&self, pos: TilePos) -> Option<usize> {
        let inside = pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height;
        let i = pos.y as usize * self.width as usize + pos.x as usize;
        (inside && i < self.tile_to_node.len()).then_some(i)
    }

    pub fn lookup(&self, pos: TilePos) -> TileLocation {
        let Some(i) = self.flat(pos) else {
            return TileLocation::Unmapped;
        };
        let node = self.tile_to_node[i];
        if node.is_valid() {
            return TileLocation::Node(node);
        }
        let edge = self.tile_to_edge.get(i).copied().unwrap_or(EdgeId::INVALID);
        let offset = self.tile_to_edge_offset.get(i).copied().unwrap_or(u32::MAX);
        if edge.is_valid() && offset != u32::MAX {
            TileLocation::EdgeInterior { edge, offset: offset as usize }
        } else {
            TileLocation::Unmapped
        }
    }

    pub fn node_at(&self, pos: TilePos) -> Option<NodeId> {
        match self.lookup(pos) {
            TileLocation::Node(n) => Some(n),
            _ => None,
        }
    }
}

/// Build the lookup table for `graph` over `grid`.
///
/// Graph tiles outside the grid are skipped.  A zero-area grid yields empty
/// tables.
pub fn build_road_graph_index<G: Grid + ?Sized>(grid: &G, graph: &RoadGraph) -> RoadGraphIndex {
    let n = grid.tile_count();
    let mut idx = RoadGraphIndex {
        width: grid.width(),
        height: grid.height(),
        tile_to_node: vec![NodeId::INVALID; n],
        tile_to_edge: vec![EdgeId::INVALID; n],
        tile_to_edge_offset: vec![u32::MAX; n],
    };
    if n == 0 {
        return idx;
    }

    for (i, node) in graph.nodes.iter().enumerate() {
        if grid.in_bounds(node.pos.x, node.pos.y) {
            idx.tile_to_node[grid.index_of(node.pos)] = NodeId::from_index(i);
        }
    }

    for (ei, edge) in graph.edges.iter().enumerate() {
        let last = edge.tiles.len().saturating_sub(1);
        for (offset, &p) in edge.tiles.iter().enumerate().take(last).skip(1) {
            if !grid.in_bounds(p.x, p.y) {
                continue;
            }
            let flat = grid.index_of(p);
            idx.tile_to_edge[flat] = EdgeId::from_index(ei);
            idx.tile_to_edge_offset[flat] = offset as u32;
        }
    }
    idx
}
