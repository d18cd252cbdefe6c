//! `tg-analysis` — whole-network measurements over the road graph.
//!
//! Everything here reads a built [`tg_graph::RoadGraph`] (and, where tile
//! data matters, the grid) and returns plain result structs.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`centrality`] | Weighted Brandes betweenness, closeness, source sampling     |
//! | [`traffic`]    | Per-tile traffic and capacity folded onto nodes and edges    |
//! | [`resilience`] | Bridges, articulation nodes, bridge cuts, bypass blocking    |
//! | [`bypass`]     | Ranked road-build bypasses for bridge edges                  |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Centrality sources run on Rayon; output is unchanged.     |
//! | `serde`    | Derives `Serialize`/`Deserialize` on public types.        |

pub mod bypass;
pub mod centrality;
pub mod resilience;
pub mod traffic;


pub use bypass::{
    BypassConfig, BypassSuggestion, count_new_road_tiles_in_path,
    estimate_money_cost_for_road_path, suggest_road_resilience_bypasses,
};
pub use centrality::{
    CentralityConfig, CentralityResult, EdgeWeightMode, centrality_edge_weight,
    compute_road_graph_centrality, pick_sources,
};
pub use resilience::{
    BridgeCut, ResilienceResult, blocked_moves_for_edge, compute_bridge_cut,
    compute_road_graph_resilience,
};
pub use traffic::{
    EdgeTrafficStats, NodeTrafficStats, TrafficAggregation, TrafficConfig, TrafficTotals,
    aggregate_flow_on_road_graph, aggregate_traffic_on_road_graph, tile_capacity,
};
