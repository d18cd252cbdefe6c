//! Snapping arbitrary tiles to graph nodes.
//!
//! Zone tiles, clicks and transit stops rarely sit on a node.  The locator
//! keeps an R-tree over node positions so the nearest node is an
//! `O(log N)` query instead of a scan.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use tg_core::{NodeId, TilePos};

use crate::graph::RoadGraph;

#[derive(Clone, Debug)]
struct NodeEntry {
    point: [i64; 2],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[i64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in tile units.
    fn distance_2(&self, point: &[i64; 2]) -> i64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Nearest-node lookup over a built [`RoadGraph`].
///
/// Distances are Euclidean; equally distant nodes resolve to the lowest id.
#[derive(Clone, Debug)]
pub struct NodeLocator {
    tree: RTree<NodeEntry>,
}

impl NodeLocator {
    pub fn new(graph: &RoadGraph) -> Self {
        let entries: Vec<NodeEntry> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| NodeEntry {
                point: [i64::from(n.pos.x), i64::from(n.pos.y)],
                id: NodeId::from_index(i),
            })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// The node closest to `pos`.  `None` only for an empty graph.
    pub fn nearest(&self, pos: TilePos) -> Option<NodeId> {
        self.k_nearest(pos, 1).first().copied()
    }

    /// Up to `k` nodes ordered by `(distance, id)`.
    pub fn k_nearest(&self, pos: TilePos, k: usize) -> Vec<NodeId> {
        if k == 0 {
            return Vec::new();
        }
        let query = [i64::from(pos.x), i64::from(pos.y)];
        let mut hits: Vec<(i64, NodeId)> = Vec::with_capacity(k);
        for (entry, d2) in self.tree.nearest_neighbor_iter_with_distance_2(&query) {
            // Keep collecting past `k` while the distance still ties the last kept hit.
            if hits.len() >= k && hits.last().is_some_and(|&(last, _)| d2 > last) {
                break;
            }
            hits.push((d2, entry.id));
        }
        hits.sort_unstable();
        hits.truncate(k);
        hits.into_iter().map(|(_, id)| id).collect()
    }
}

impl RoadGraph {
    /// Build a [`NodeLocator`] for this graph.
    pub fn locator(&self) -> NodeLocator {
        NodeLocator::new(self)
    }
}
