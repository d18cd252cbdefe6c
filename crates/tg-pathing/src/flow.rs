//! Multi-source shortest-path fields over road tiles.
//!
//! A [`FlowField`] answers "how far is every road tile from the nearest
//! source, and which way do I go" in one pass.  Consumers use it for
//! nearest-seed ownership (district assignment), nearest-exit cost
//! (evacuation) and nearest-job accessibility.
//!
//! # Modes
//!
//! - **Unweighted** (default): multi-source BFS.  `dist` counts steps and
//!   drives the search; `cost` is still accumulated from real tile entry
//!   costs but is informational only.
//! - **Travel time** (`use_travel_time`): multi-source Dijkstra keyed by
//!   `(cost, steps, owner, tile)`.  The trailing keys make ties resolve the
//!   same way regardless of heap internals.
//!
//! # Sentinels
//!
//! Every array is sized `width * height`.  Unreached tiles hold
//! [`UNREACHED`] in `dist`, `cost`, and `owner`; `parent` is `UNREACHED` at
//! sources as well.  `dist[i] >= 0` exactly when `cost[i] >= 0`.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tg_core::{Dir, Grid, usable_slice};

use crate::edge::roads_connected_to_edge;

/// Marker for "no value" in every flow-field array.
pub const UNREACHED: i32 = -1;

const INF: i32 = i32::MAX / 4;

// ── Config & inputs ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowFieldConfig {
    /// Only traverse roads that connect to the map border.
    pub require_outside_connection: bool,
    /// Fill [`FlowField::owner`] with the index of the claiming source.
    pub compute_owner: bool,
    /// Order the search by travel time instead of step count.
    pub use_travel_time: bool,
}

/// Optional per-tile and per-source overrides.
///
/// Each slice must match its expected length (`width * height` for tile
/// arrays, `sources.len()` for initial costs); a mismatched slice is ignored
/// as if it were `None`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlowFieldInputs<'a> {
    /// Precomputed outside-connection mask; computed on demand when absent.
    pub road_to_edge: Option<&'a [u8]>,
    /// Extra cost paid on entering a tile (congestion, hazards).  Negative
    /// values count as zero.
    pub extra_cost_milli: Option<&'a [i32]>,
    /// Non-zero entries make a road tile impassable.
    pub block_mask: Option<&'a [u8]>,
    /// Starting cost per source, for soft capacity balancing.  Negative
    /// values count as zero.
    pub source_initial_cost_milli: Option<&'a [i32]>,
}

// ── FlowField ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowField {
    pub width: i32,
    pub height: i32,
    /// Steps along the chosen path to a source.
    pub dist: Vec<i32>,
    /// Travel time to a source in milli-steps.
    pub cost: Vec<i32>,
    /// Next tile index toward the source.
    pub parent: Vec<i32>,
    /// Claiming source index.  Empty unless `compute_owner` was set.
    pub owner: Vec<i32>,
}

impl FlowField {
    fn unreached(width: i32, height: i32, n: usize, with_owner: bool) -> Self {
        Self {
            width,
            height,
            dist: vec![UNREACHED; n],
            cost: vec![UNREACHED; n],
            parent: vec![UNREACHED; n],
            owner: if with_owner { vec![UNREACHED; n] } else { Vec::new() },
        }
    }

    /// `true` for a field built over a zero-area grid.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn len(&self) -> usize {
        self.dist.len()
    }

    #[inline]
    pub fn is_reachable(&self, index: usize) -> bool {
        self.dist.get(index).is_some_and(|&d| d >= 0)
    }

    /// Tile indices from `index` to its source, inclusive.  Empty when
    /// `index` is unreachable.
    pub fn path_to_source(&self, index: usize) -> Vec<usize> {
        let mut path = Vec::new();
        if !self.is_reachable(index) {
            return path;
        }
        let mut cur = index;
        path.push(cur);
        // A well-formed field never needs more hops than it has tiles.
        for _ in 0..self.len() {
            let p = self.parent[cur];
            if p < 0 {
                break;
            }
            cur = p as usize;
            path.push(cur);
        }
        path
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Build a flow field from `sources` (row-major tile indices).
///
/// Sources that are out of range or not traversable are skipped.  An empty
/// or fully-invalid source list yields an all-[`UNREACHED`] field, and a
/// zero-area grid yields an empty one.
pub fn build_road_flow_field<G: Grid + ?Sized>(
    grid: &G,
    sources: &[usize],
    cfg: &FlowFieldConfig,
    inputs: FlowFieldInputs<'_>,
) -> FlowField {
    let (w, h) = (grid.width(), grid.height());
    let n = grid.tile_count();
    if n == 0 {
        return FlowField { width: w, height: h, ..FlowField::default() };
    }
    let mut out = FlowField::unreached(w, h, n, cfg.compute_owner);

    let local_mask;
    let road_to_edge = if cfg.require_outside_connection {
        match usable_slice(inputs.road_to_edge, n, "outside-connection mask") {
            Some(m) => Some(m),
            None => {
                local_mask = roads_connected_to_edge(grid);
                Some(local_mask.as_slice())
            }
        }
    } else {
        None
    };
    let block = usable_slice(inputs.block_mask, n, "road block mask");
    let extra = usable_slice(inputs.extra_cost_milli, n, "extra cost");
    let initial = usable_slice(inputs.source_initial_cost_milli, sources.len(), "source initial cost");

    let traversable = |idx: usize| -> bool {
        if idx >= n {
            return false;
        }
        if !grid.is_road(grid.pos_of(idx)) {
            return false;
        }
        if block.is_some_and(|b| b[idx] != 0) {
            return false;
        }
        road_to_edge.is_none_or(|m| m[idx] != 0)
    };
    let entry_cost = |idx: usize| -> i32 {
        let base = grid.road_travel_time_milli(grid.pos_of(idx));
        base.saturating_add(extra.map_or(0, |e| e[idx].max(0)))
    };
    let initial_cost = |si: usize| initial.map_or(0, |c| c[si].max(0));

    if sources.is_empty() {
        return out;
    }

    if cfg.use_travel_time {
        weighted(grid, sources, cfg, &mut out, traversable, entry_cost, initial_cost);
    } else {
        unweighted(grid, sources, cfg, &mut out, traversable, entry_cost, initial_cost);
    }
    out
}

fn unweighted<G: Grid + ?Sized>(
    grid: &G,
    sources: &[usize],
    cfg: &FlowFieldConfig,
    out: &mut FlowField,
    traversable: impl Fn(usize) -> bool,
    entry_cost: impl Fn(usize) -> i32,
    initial_cost: impl Fn(usize) -> i32,
) {
    let mut queue: Vec<usize> = Vec::with_capacity(sources.len());
    for (si, &s) in sources.iter().enumerate() {
        if !traversable(s) || out.dist[s] == 0 {
            continue;
        }
        out.dist[s] = 0;
        out.cost[s] = initial_cost(si);
        if cfg.compute_owner {
            out.owner[s] = si as i32;
        }
        queue.push(s);
    }

    let mut head = 0;
    while head < queue.len() {
        let u = queue[head];
        head += 1;
        let pos = grid.pos_of(u);
        for dir in Dir::NESW {
            let np = pos.step(dir);
            if !grid.in_bounds(np.x, np.y) {
                continue;
            }
            let v = grid.index_of(np);
            if !traversable(v) || out.dist[v] != UNREACHED {
                continue;
            }
            out.dist[v] = out.dist[u] + 1;
            out.cost[v] = out.cost[u].saturating_add(entry_cost(v));
            out.parent[v] = u as i32;
            if cfg.compute_owner {
                out.owner[v] = out.owner[u];
            }
            queue.push(v);
        }
    }
}

fn weighted<G: Grid + ?Sized>(
    grid: &G,
    sources: &[usize],
    cfg: &FlowFieldConfig,
    out: &mut FlowField,
    traversable: impl Fn(usize) -> bool,
    entry_cost: impl Fn(usize) -> i32,
    initial_cost: impl Fn(usize) -> i32,
) {
    let n = out.len();
    let mut best_cost = vec![INF; n];
    let mut best_steps = vec![INF; n];
    // Owner label used for ordering; stays 0 when owners are not tracked.
    let mut label = vec![0i32; n];

    // Min-heap on (cost, steps, owner, tile).
    let mut heap: BinaryHeap<Reverse<(i32, i32, i32, usize)>> = BinaryHeap::new();

    for (si, &s) in sources.iter().enumerate() {
        if !traversable(s) {
            continue;
        }
        let c = initial_cost(si);
        let owner = if cfg.compute_owner { si as i32 } else { 0 };
        let improves = c < best_cost[s]
            || (c == best_cost[s] && cfg.compute_owner && (out.owner[s] < 0 || owner < out.owner[s]));
        if !improves {
            continue;
        }
        best_cost[s] = c;
        best_steps[s] = 0;
        label[s] = owner;
        out.parent[s] = UNREACHED;
        if cfg.compute_owner {
            out.owner[s] = owner;
        }
        heap.push(Reverse((c, 0, owner, s)));
    }

    while let Some(Reverse((cost, steps, owner, u))) = heap.pop() {
        // Skip stale heap entries.
        if cost != best_cost[u] || steps != best_steps[u] || owner != label[u] {
            continue;
        }
        let pos = grid.pos_of(u);
        for dir in Dir::NESW {
            let np = pos.step(dir);
            if !grid.in_bounds(np.x, np.y) {
                continue;
            }
            let v = grid.index_of(np);
            if !traversable(v) {
                continue;
            }
            let nc = cost.saturating_add(entry_cost(v)).min(INF - 1);
            let ns = steps + 1;
            // Equal cost and steps: lower owner wins, then lower parent tile.
            let candidate = (nc, ns, owner, u as i32);
            let incumbent = (best_cost[v], best_steps[v], label[v], out.parent[v]);
            if best_cost[v] != INF && candidate >= incumbent {
                continue;
            }
            best_cost[v] = nc;
            best_steps[v] = ns;
            label[v] = owner;
            out.parent[v] = u as i32;
            if cfg.compute_owner {
                out.owner[v] = owner;
            }
            heap.push(Reverse((nc, ns, owner, v)));
        }
    }

    for i in 0..n {
        if best_cost[i] == INF {
            continue;
        }
        out.dist[i] = best_steps[i];
        out.cost[i] = best_cost[i];
    }
}
