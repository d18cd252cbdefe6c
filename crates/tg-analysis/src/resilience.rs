//! Single points of failure in the road network.
//!
//! Articulation nodes and bridge edges come from one iterative Tarjan DFS
//! per connected component.  Only the exact tree edge back to the parent is
//! skipped when looking for back edges, so a second edge between the same
//! pair of nodes correctly cancels a bridge.

use std::collections::VecDeque;

use log::debug;
use tg_core::{EdgeId, NodeId};
use tg_graph::RoadGraph;
use tg_pathing::BlockedMoves;

const UNSEEN: usize = usize::MAX;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResilienceResult {
    /// Parallel to `RoadGraph::nodes`.
    pub is_articulation_node: Vec<bool>,
    /// Parallel to `RoadGraph::edges`.
    pub is_bridge_edge: Vec<bool>,
    /// For a bridge: nodes on the side that was a DFS subtree.  `0` otherwise.
    pub bridge_subtree_nodes: Vec<usize>,
    /// For a bridge: remaining nodes of its component.  `0` otherwise.
    pub bridge_other_nodes: Vec<usize>,
    /// Component id per node, numbered in order of lowest member id.
    pub node_component: Vec<usize>,
    pub component_size: Vec<usize>,
    /// Ascending.
    pub articulation_nodes: Vec<NodeId>,
    /// Ascending.
    pub bridge_edges: Vec<EdgeId>,
}

impl ResilienceResult {
    pub fn component_count(&self) -> usize {
        self.component_size.len()
    }
}

/// Node partition left behind when a bridge is removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BridgeCut {
    /// Reachable from the edge's `a` end, ascending.
    pub side_a: Vec<NodeId>,
    /// Reachable from the edge's `b` end, ascending.
    pub side_b: Vec<NodeId>,
}

struct Frame {
    u: usize,
    next: usize,
}

pub fn compute_road_graph_resilience(graph: &RoadGraph) -> ResilienceResult {
    let n = graph.node_count();
    let m = graph.edge_count();
    let mut out = ResilienceResult {
        is_articulation_node: vec![false; n],
        is_bridge_edge: vec![false; m],
        bridge_subtree_nodes: vec![0; m],
        bridge_other_nodes: vec![0; m],
        node_component: vec![0; n],
        ..ResilienceResult::default()
    };
    if n == 0 {
        return out;
    }

    let mut disc = vec![UNSEEN; n];
    let mut low = vec![UNSEEN; n];
    let mut parent: Vec<Option<(usize, usize)>> = vec![None; n];
    let mut children = vec![0usize; n];
    let mut subtree = vec![0usize; n];
    let mut clock = 0usize;
    let mut stack: Vec<Frame> = Vec::new();

    for root in 0..n {
        if disc[root] != UNSEEN {
            continue;
        }
        let comp = out.component_size.len();
        out.component_size.push(1);
        out.node_component[root] = comp;
        disc[root] = clock;
        low[root] = clock;
        clock += 1;
        subtree[root] = 1;
        stack.push(Frame { u: root, next: 0 });

        while let Some(frame) = stack.last_mut() {
            let u = frame.u;
            let incident = &graph.nodes[u].edges;

            if frame.next < incident.len() {
                let e = incident[frame.next];
                frame.next += 1;
                let Some(v) = graph.edge(e).and_then(|edge| edge.other_end(NodeId::from_index(u)))
                else {
                    continue;
                };
                let v = v.index();
                if v >= n {
                    continue;
                }
                if disc[v] == UNSEEN {
                    parent[v] = Some((u, e.index()));
                    children[u] += 1;
                    disc[v] = clock;
                    low[v] = clock;
                    clock += 1;
                    subtree[v] = 1;
                    out.node_component[v] = comp;
                    out.component_size[comp] += 1;
                    stack.push(Frame { u: v, next: 0 });
                } else if parent[u].is_none_or(|(_, pe)| pe != e.index()) {
                    low[u] = low[u].min(disc[v]);
                }
                continue;
            }

            stack.pop();
            match parent[u] {
                Some((p, pe)) => {
                    subtree[p] += subtree[u];
                    low[p] = low[p].min(low[u]);
                    if low[u] > disc[p] {
                        out.is_bridge_edge[pe] = true;
                        out.bridge_subtree_nodes[pe] = subtree[u];
                    }
                    if parent[p].is_some() && low[u] >= disc[p] {
                        out.is_articulation_node[p] = true;
                    }
                }
                None => {
                    if children[u] > 1 {
                        out.is_articulation_node[u] = true;
                    }
                }
            }
        }
    }

    for (e, edge) in graph.edges.iter().enumerate() {
        if !out.is_bridge_edge[e] || edge.a.index() >= n {
            continue;
        }
        let size = out.component_size[out.node_component[edge.a.index()]];
        out.bridge_other_nodes[e] = size.saturating_sub(out.bridge_subtree_nodes[e]);
    }

    out.articulation_nodes = flagged(&out.is_articulation_node).map(NodeId::from_index).collect();
    out.bridge_edges = flagged(&out.is_bridge_edge).map(EdgeId::from_index).collect();

    debug!(
        "resilience: {} components, {} articulation nodes, {} bridges",
        out.component_size.len(),
        out.articulation_nodes.len(),
        out.bridge_edges.len(),
    );
    out
}

fn flagged(flags: &[bool]) -> impl Iterator<Item = usize> + '_ {
    flags.iter().enumerate().filter(|&(_, &f)| f).map(|(i, _)| i)
}

/// Nodes reachable from `start` without crossing `cut`.
fn reach_without(graph: &RoadGraph, start: NodeId, cut: EdgeId) -> Vec<bool> {
    let n = graph.node_count();
    let mut seen = vec![false; n];
    let mut queue = VecDeque::from([start]);
    seen[start.index()] = true;
    while let Some(u) = queue.pop_front() {
        for (e, v) in graph.neighbours(u) {
            if e == cut || v.index() >= n || seen[v.index()] {
                continue;
            }
            seen[v.index()] = true;
            queue.push_back(v);
        }
    }
    seen
}

/// The two sides left by removing `edge`, or `None` when the edge is out of
/// range or its endpoints stay connected without it.
pub fn compute_bridge_cut(graph: &RoadGraph, edge: EdgeId) -> Option<BridgeCut> {
    let n = graph.node_count();
    let e = graph.edge(edge)?;
    if e.a.index() >= n || e.b.index() >= n {
        return None;
    }

    let from_a = reach_without(graph, e.a, edge);
    if from_a[e.b.index()] {
        return None;
    }
    let from_b = reach_without(graph, e.b, edge);

    let side = |seen: &[bool]| flagged(seen).map(NodeId::from_index).collect::<Vec<_>>();
    Some(BridgeCut { side_a: side(&from_a), side_b: side(&from_b) })
}

/// Both directions of every step along `edge`'s polyline, as row-major
/// tile indices for a grid `width` wide.
///
/// Passing the set to `tg_pathing::find_road_build_path_between_sets` asks
/// the planner for a bypass that does not reuse the edge.  An unknown edge
/// or a non-positive width gives an empty set.
pub fn blocked_moves_for_edge(graph: &RoadGraph, edge: EdgeId, width: i32) -> BlockedMoves {
    let mut blocked = BlockedMoves::default();
    let Some(e) = graph.edge(edge) else {
        return blocked;
    };
    if width <= 0 {
        return blocked;
    }

    let flat = |x: i32, y: i32| -> Option<usize> {
        (x >= 0 && y >= 0 && x < width).then(|| y as usize * width as usize + x as usize)
    };
    for pair in e.tiles.windows(2) {
        let (Some(a), Some(b)) = (flat(pair[0].x, pair[0].y), flat(pair[1].x, pair[1].y)) else {
            continue;
        };
        blocked.insert((a, b));
        blocked.insert((b, a));
    }
    blocked
}
