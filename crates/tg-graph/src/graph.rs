//! Road graph representation and builder.
//!
//! # Compression rule
//!
//! A road tile becomes a **node** unless it is a straight pass-through: a
//! tile with exactly two road neighbours on opposite sides.  Dead ends,
//! corners, T-junctions, crossings and isolated tiles are all nodes.
//!
//! Every other road tile lies on exactly one **edge**: the straight corridor
//! between two nodes.  Because corners are nodes, every edge is a straight
//! run of tiles and its `length` is the Manhattan distance between its
//! endpoints.
//!
//! # Determinism
//!
//! Nodes are numbered in row-major scan order.  Edges are discovered by
//! walking from each node (in id order) in N, E, S, W order and are kept
//! only from the lower-id end, so each corridor is stored once with
//! `a < b`.

use log::debug;
use tg_core::{Dir, EdgeId, Grid, NodeId, TilePos};

// ── Graph types ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadGraphNode {
    pub pos: TilePos,
    /// Incident edges in discovery order.
    pub edges: Vec<EdgeId>,
}

/// Undirected corridor between two nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadGraphEdge {
    pub a: NodeId,
    pub b: NodeId,
    /// Steps from `a` to `b`, i.e. `tiles.len() - 1`.
    pub length: i32,
    /// Inclusive polyline from node `a` to node `b`.
    pub tiles: Vec<TilePos>,
}

impl RoadGraphEdge {
    /// The endpoint opposite `node`, or `None` if `node` is not an endpoint.
    #[inline]
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// Polyline tiles strictly between the two endpoints.
    pub fn interior(&self) -> &[TilePos] {
        match self.tiles.len() {
            0..=2 => &[],
            n => &self.tiles[1..n - 1],
        }
    }
}

/// Arena-style road graph: nodes and edges refer to each other by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadGraph {
    pub nodes: Vec<RoadGraphNode>,
    pub edges: Vec<RoadGraphEdge>,
}

impl RoadGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&RoadGraphNode> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&RoadGraphEdge> {
        self.edges.get(id.index())
    }

    /// Number of incident edges; `0` for an unknown node.
    pub fn degree(&self, node: NodeId) -> usize {
        self.node(node).map_or(0, |n| n.edges.len())
    }

    /// The node at the far end of `edge` when leaving from `node`.
    pub fn other_end(&self, edge: EdgeId, node: NodeId) -> Option<NodeId> {
        self.edge(edge)?.other_end(node)
    }

    /// `(edge, neighbour)` pairs around `node`, in incident-edge order.
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, NodeId)> + '_ {
        self.node(node)
            .into_iter()
            .flat_map(|n| n.edges.iter())
            .filter_map(move |&e| Some((e, self.other_end(e, node)?)))
    }

    /// Sum of all edge lengths, i.e. the number of unit road segments.
    pub fn total_length(&self) -> i64 {
        self.edges.iter().map(|e| i64::from(e.length)).sum()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

fn road_degree<G: Grid + ?Sized>(grid: &G, pos: TilePos) -> usize {
    Dir::NESW.iter().filter(|&&d| grid.is_road(pos.step(d))).count()
}

fn is_node_tile<G: Grid + ?Sized>(grid: &G, pos: TilePos) -> bool {
    if !grid.is_road(pos) {
        return false;
    }
    if road_degree(grid, pos) != 2 {
        return true;
    }
    let open = |d: Dir| grid.is_road(pos.step(d));
    let straight = (open(Dir::North) && open(Dir::South)) || (open(Dir::East) && open(Dir::West));
    !straight
}

/// Compress the road tiles of `grid` into a [`RoadGraph`].
///
/// A zero-area grid, or one without roads, yields an empty graph.
pub fn build_road_graph<G: Grid + ?Sized>(grid: &G) -> RoadGraph {
    let mut g = RoadGraph::default();
    let n = grid.tile_count();
    if n == 0 {
        return g;
    }

    // Pass 1: nodes in raster order.
    let mut node_at = vec![NodeId::INVALID; n];
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let pos = TilePos::new(x, y);
            if is_node_tile(grid, pos) {
                node_at[grid.index_of(pos)] = NodeId::from_index(g.nodes.len());
                g.nodes.push(RoadGraphNode { pos, edges: Vec::new() });
            }
        }
    }

    // Pass 2: corridors, kept from the lower-id end only.
    for ai in 0..g.nodes.len() {
        let a = NodeId::from_index(ai);
        let origin = g.nodes[ai].pos;
        for dir in Dir::NESW {
            let first = origin.step(dir);
            if !grid.is_road(first) {
                continue;
            }
            let Some((tiles, b)) = trace(grid, &node_at, origin, first) else {
                continue;
            };
            if b <= a {
                continue;
            }
            let id = EdgeId::from_index(g.edges.len());
            g.edges.push(RoadGraphEdge { a, b, length: tiles.len() as i32 - 1, tiles });
            g.nodes[a.index()].edges.push(id);
            g.nodes[b.index()].edges.push(id);
        }
    }

    debug!(
        "road graph: {} nodes, {} edges, {} road segments",
        g.node_count(),
        g.edge_count(),
        g.total_length()
    );
    g
}

/// Walk from the node at `origin` through `first` until another node.
///
/// Returns the inclusive polyline and the node reached.  Gives up if the
/// corridor forks or the walk exceeds the tile count.
fn trace<G: Grid + ?Sized>(
    grid: &G,
    node_at: &[NodeId],
    origin: TilePos,
    first: TilePos,
) -> Option<(Vec<TilePos>, NodeId)> {
    let mut tiles = vec![origin];
    let (mut prev, mut cur) = (origin, first);

    for _ in 0..node_at.len() + 8 {
        if !grid.is_road(cur) {
            return None;
        }
        tiles.push(cur);
        let id = node_at[grid.index_of(cur)];
        if id.is_valid() {
            return Some((tiles, id));
        }

        let mut forward = Dir::NESW.iter().map(|&d| cur.step(d)).filter(|&p| p != prev && grid.is_road(p));
        let next = forward.next()?;
        if forward.next().is_some() {
            return None;
        }
        prev = cur;
        cur = next;
    }
    None
}
