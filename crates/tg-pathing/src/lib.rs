//! `tg-pathing` — searches that run directly on the tile grid.
//!
//! Nothing here builds an intermediate graph: each call scans the grid
//! through the [`tg_core::Grid`] trait and returns an owned result.  For many
//! repeated point-to-point queries on an unchanged road layout, prefer the
//! compressed graph in `tg-graph`.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                       |
//! |-----------|----------------------------------------------------------------|
//! | [`flow`]  | `build_road_flow_field`, `FlowField`, `FlowFieldConfig`        |
//! | [`edge`]  | outside-connection mask, adjacent-road pick, path to border    |
//! | [`astar`] | road / land A*, travel-time A* with cost breakdown             |
//! | [`build`] | road-construction planner (single pair and set-to-set)         |
//! | [`path`]  | `GridPath`                                                     |
//!
//! Failed searches return `None`; there is no error type.

pub mod astar;
pub mod build;
pub mod edge;
pub mod flow;
pub mod path;

#[cfg(test)]
mod tests;

pub use astar::{
    RoadPathConfig, RoadPathCostBreakdown, RoadPathMetric, RoadPathResult, find_land_path_astar,
    find_road_path_astar, find_road_path_astar_ex, road_path_cost,
};
pub use build::{
    BlockedMoves, BuildCostModel, RoadBuildConfig, RoadBuildPath, find_road_build_path,
    find_road_build_path_between_sets,
};
pub use edge::{
    find_road_path_to_edge, has_adjacent_road_connected_to_edge, pick_adjacent_road_tile,
    roads_connected_to_edge,
};
pub use flow::{FlowField, FlowFieldConfig, FlowFieldInputs, UNREACHED, build_road_flow_field};
pub use path::GridPath;
