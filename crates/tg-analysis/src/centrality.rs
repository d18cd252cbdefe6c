//! Weighted Brandes betweenness, plus closeness when every node is a source.
//!
//! # Determinism
//!
//! Adjacency lists are sorted by `(to, edge, weight)` and the Dijkstra heap
//! pops by `(distance, node)`, so predecessor lists and the finishing stack
//! depend only on the graph.  Sampled sources are chosen by
//! [`tg_core::sample_key`], never by an RNG.
//!
//! Every source is reduced to a `SourcePass` of sparse contributions which
//! are folded into the totals in ascending source order.  A source touches
//! each node and each edge at most once, so the fold performs exactly the
//! same floating-point additions whether the passes ran on one thread or on
//! the Rayon pool (`parallel` feature).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::debug;
use tg_core::{Grid, NodeId, sample_key};
use tg_graph::{RoadGraph, RoadGraphEdge};

/// Largest weight a single edge may carry.
const MAX_EDGE_WEIGHT: i64 = (i32::MAX / 4 - 1) as i64;

/// Fallback travel time per tile when no grid is supplied.
const APPROX_TILE_MILLI: i64 = 1000;

#[cfg(feature = "parallel")]
const SOURCES_PER_BATCH: usize = 256;

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeWeightMode {
    /// `max(1, length)`.
    #[default]
    Steps,
    /// Sum of per-tile travel times along the polyline, start tile excluded.
    TravelTimeMilli,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CentralityConfig {
    pub weight_mode: EdgeWeightMode,
    /// `0` (or anything `>= node_count`) processes every node.  Otherwise a
    /// deterministic sample of this many sources is used and closeness is
    /// not computed.
    pub max_sources: usize,
    /// Multiply sampled betweenness by `nodes / sources_used`.
    pub scale_sample_to_full: bool,
    /// Halve betweenness to undo the double count of undirected pairs.
    pub undirected: bool,
    /// Fill the `*_norm` vectors.
    pub normalize: bool,
    /// Scale closeness by `(reachable - 1) / (n - 1)` so nodes in small
    /// components score lower.
    pub closeness_component_scale: bool,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            weight_mode: EdgeWeightMode::Steps,
            max_sources: 0,
            scale_sample_to_full: true,
            undirected: true,
            normalize: true,
            closeness_component_scale: true,
        }
    }
}

/// Per-node vectors are indexed by `NodeId`, per-edge vectors by `EdgeId`.
///
/// The `*_norm` vectors are empty unless `normalize` was set; the closeness
/// vectors are empty unless every node was a source.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CentralityResult {
    pub nodes: usize,
    pub edges: usize,
    pub sources_used: usize,
    pub node_betweenness: Vec<f64>,
    pub node_betweenness_norm: Vec<f64>,
    pub edge_betweenness: Vec<f64>,
    pub edge_betweenness_norm: Vec<f64>,
    pub node_closeness: Vec<f64>,
    pub node_harmonic_closeness: Vec<f64>,
}

impl CentralityResult {
    /// `true` when closeness was computed (no sampling).
    pub fn has_closeness(&self) -> bool {
        !self.node_closeness.is_empty()
    }
}

// ── Weights and sources ───────────────────────────────────────────────────────

/// Positive integer weight of `edge` under `mode`.
///
/// Travel time without a grid falls back to 1000 per step.  With a grid,
/// only in-bounds road tiles after the first contribute; a polyline that
/// contributes nothing falls back to the same approximation.
pub fn centrality_edge_weight<G: Grid + ?Sized>(
    edge: &RoadGraphEdge,
    mode: EdgeWeightMode,
    grid: Option<&G>,
) -> i64 {
    let steps = i64::from(edge.length.max(1));
    let w = match (mode, grid) {
        (EdgeWeightMode::Steps, _) => steps,
        (EdgeWeightMode::TravelTimeMilli, None) => i64::from(edge.length) * APPROX_TILE_MILLI,
        (EdgeWeightMode::TravelTimeMilli, Some(grid)) => {
            let sum: i64 = edge
                .tiles
                .iter()
                .skip(1)
                .filter_map(|&p| grid.tile(p))
                .filter(|t| t.is_road())
                .map(|t| i64::from(t.travel_time_milli().max(1)))
                .sum();
            if sum <= 0 { steps * APPROX_TILE_MILLI } else { sum.min(MAX_EDGE_WEIGHT) }
        }
    };
    w.max(1)
}

/// Source nodes for `n` nodes capped at `max_sources`, ascending.
///
/// The sample keeps the `max_sources` ids with the smallest
/// [`sample_key`], ties broken by id.
pub fn pick_sources(n: usize, max_sources: usize) -> Vec<usize> {
    if max_sources == 0 || max_sources >= n {
        return (0..n).collect();
    }
    let mut keyed: Vec<(u64, usize)> = (0..n).map(|i| (sample_key(i), i)).collect();
    keyed.sort_unstable();
    let mut sources: Vec<usize> = keyed[..max_sources].iter().map(|&(_, i)| i).collect();
    sources.sort_unstable();
    sources
}

// ── Brandes core ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Arc {
    to: usize,
    edge: usize,
    w: i64,
}

/// Reusable per-worker buffers, sized to the node count.
struct Scratch {
    dist: Vec<i64>,
    sigma: Vec<f64>,
    delta: Vec<f64>,
    /// `(predecessor, edge)` on some shortest path.
    preds: Vec<Vec<(usize, usize)>>,
    /// Nodes in the order they were settled.
    settled: Vec<usize>,
    heap: BinaryHeap<Reverse<(i64, usize)>>,
}

impl Scratch {
    fn new(n: usize) -> Self {
        Self {
            dist: vec![i64::MAX; n],
            sigma: vec![0.0; n],
            delta: vec![0.0; n],
            preds: vec![Vec::new(); n],
            settled: Vec::with_capacity(n),
            heap: BinaryHeap::new(),
        }
    }

    fn reset(&mut self) {
        self.dist.fill(i64::MAX);
        self.sigma.fill(0.0);
        self.delta.fill(0.0);
        self.preds.iter_mut().for_each(Vec::clear);
        self.settled.clear();
        self.heap.clear();
    }
}

/// Everything one source adds to the totals.
struct SourcePass {
    source: usize,
    node: Vec<(usize, f64)>,
    edge: Vec<(usize, f64)>,
    /// `(closeness, harmonic)`; `None` when closeness is off.
    closeness: Option<(f64, f64)>,
}

struct Brandes {
    adj: Vec<Vec<Arc>>,
    closeness: bool,
    component_scale: bool,
}

impl Brandes {
    fn new<G: Grid + ?Sized>(
        graph: &RoadGraph,
        cfg: &CentralityConfig,
        grid: Option<&G>,
        closeness: bool,
    ) -> Self {
        let weights: Vec<i64> = graph
            .edges
            .iter()
            .map(|e| centrality_edge_weight(e, cfg.weight_mode, grid))
            .collect();

        let adj = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(u, node)| {
                let u = NodeId::from_index(u);
                let mut arcs: Vec<Arc> = node
                    .edges
                    .iter()
                    .filter_map(|&e| {
                        let to = graph.edge(e)?.other_end(u)?;
                        (to.index() < graph.node_count()).then(|| Arc {
                            to: to.index(),
                            edge: e.index(),
                            w: weights[e.index()],
                        })
                    })
                    .collect();
                arcs.sort_unstable();
                arcs
            })
            .collect();

        Self { adj, closeness, component_scale: cfg.closeness_component_scale }
    }

    fn node_count(&self) -> usize {
        self.adj.len()
    }

    fn pass(&self, sc: &mut Scratch, s: usize) -> SourcePass {
        sc.reset();
        sc.dist[s] = 0;
        sc.sigma[s] = 1.0;
        sc.heap.push(Reverse((0, s)));

        while let Some(Reverse((d, v))) = sc.heap.pop() {
            if d != sc.dist[v] {
                continue;
            }
            sc.settled.push(v);
            for arc in &self.adj[v] {
                let nd = d.saturating_add(arc.w);
                let w = arc.to;
                if nd < sc.dist[w] {
                    sc.dist[w] = nd;
                    sc.heap.push(Reverse((nd, w)));
                    sc.sigma[w] = sc.sigma[v];
                    sc.preds[w].clear();
                    sc.preds[w].push((v, arc.edge));
                } else if nd == sc.dist[w] {
                    sc.sigma[w] += sc.sigma[v];
                    sc.preds[w].push((v, arc.edge));
                }
            }
        }

        let closeness = self.closeness.then(|| self.closeness_of(sc, s));

        let mut node = Vec::with_capacity(sc.settled.len());
        let mut edge = Vec::with_capacity(sc.settled.len());
        for &w in sc.settled.iter().rev() {
            let sigma_w = sc.sigma[w];
            if sigma_w <= 0.0 {
                continue;
            }
            let coeff = 1.0 + sc.delta[w];
            for &(v, e) in &sc.preds[w] {
                let c = (sc.sigma[v] / sigma_w) * coeff;
                sc.delta[v] += c;
                edge.push((e, c));
            }
            if w != s {
                node.push((w, sc.delta[w]));
            }
        }

        SourcePass { source: s, node, edge, closeness }
    }

    fn closeness_of(&self, sc: &Scratch, s: usize) -> (f64, f64) {
        let mut sum_dist = 0.0;
        let mut sum_inv = 0.0;
        let mut reachable = 0usize;
        for (i, &d) in sc.dist.iter().enumerate() {
            if d == i64::MAX {
                continue;
            }
            reachable += 1;
            if i == s {
                continue;
            }
            sum_dist += d as f64;
            if d > 0 {
                sum_inv += 1.0 / d as f64;
            }
        }

        let n = self.node_count();
        let mut closeness = 0.0;
        if reachable > 1 && sum_dist > 0.0 {
            closeness = (reachable - 1) as f64 / sum_dist;
            if self.component_scale && n > 1 {
                closeness *= (reachable - 1) as f64 / (n - 1) as f64;
            }
        }
        (closeness, sum_inv)
    }

    /// Run every source and hand the passes to `fold` in `sources` order.
    fn run(&self, sources: &[usize], mut fold: impl FnMut(SourcePass)) {
        #[cfg(not(feature = "parallel"))]
        {
            let mut scratch = Scratch::new(self.node_count());
            for &s in sources {
                fold(self.pass(&mut scratch, s));
            }
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let n = self.node_count();
            for batch in sources.chunks(SOURCES_PER_BATCH) {
                let passes: Vec<SourcePass> = batch
                    .par_iter()
                    .map_init(|| Scratch::new(n), |scratch, &s| self.pass(scratch, s))
                    .collect();
                passes.into_iter().for_each(&mut fold);
            }
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Betweenness (always) and closeness (exhaustive runs only) for `graph`.
///
/// `grid` is only read for [`EdgeWeightMode::TravelTimeMilli`].  A graph
/// with no nodes or no edges yields empty vectors with the counts filled in.
pub fn compute_road_graph_centrality<G: Grid + ?Sized>(
    graph: &RoadGraph,
    cfg: &CentralityConfig,
    grid: Option<&G>,
) -> CentralityResult {
    let n = graph.node_count();
    let m = graph.edge_count();
    let mut out = CentralityResult { nodes: n, edges: m, ..CentralityResult::default() };
    if n == 0 || m == 0 {
        return out;
    }

    let sources = pick_sources(n, cfg.max_sources);
    let exhaustive = sources.len() == n;
    out.sources_used = sources.len();
    out.node_betweenness = vec![0.0; n];
    out.edge_betweenness = vec![0.0; m];
    if exhaustive {
        out.node_closeness = vec![0.0; n];
        out.node_harmonic_closeness = vec![0.0; n];
    }

    let brandes = Brandes::new(graph, cfg, grid, exhaustive);
    brandes.run(&sources, |pass| {
        for (v, c) in pass.node {
            out.node_betweenness[v] += c;
        }
        for (e, c) in pass.edge {
            out.edge_betweenness[e] += c;
        }
        if let Some((closeness, harmonic)) = pass.closeness {
            out.node_closeness[pass.source] = closeness;
            out.node_harmonic_closeness[pass.source] = harmonic;
        }
    });

    let mut rescale = |factor: f64| {
        out.node_betweenness.iter_mut().for_each(|v| *v *= factor);
        out.edge_betweenness.iter_mut().for_each(|v| *v *= factor);
    };
    if cfg.scale_sample_to_full && !exhaustive {
        rescale(n as f64 / sources.len() as f64);
    }
    if cfg.undirected {
        rescale(0.5);
    }

    if cfg.normalize {
        let pairs = if cfg.undirected { 2.0 } else { 1.0 };
        let node_scale =
            if n > 2 { pairs / ((n - 1) as f64 * (n - 2) as f64) } else { 0.0 };
        let edge_scale = if n > 1 { pairs / (n as f64 * (n - 1) as f64) } else { 0.0 };
        out.node_betweenness_norm = out.node_betweenness.iter().map(|v| v * node_scale).collect();
        out.edge_betweenness_norm = out.edge_betweenness.iter().map(|v| v * edge_scale).collect();
    }

    debug!(
        "centrality: {n} nodes, {m} edges, {} of {n} sources{}",
        out.sources_used,
        if exhaustive { ", closeness computed" } else { "" },
    );
    out
}
