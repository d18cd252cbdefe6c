//! `tg-graph` — the compressed road graph and routing over it.
//!
//! Building the graph scans the grid once.  After that, repeated
//! point-to-point queries cost a small A* over junctions instead of a full
//! grid search.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`graph`]   | `RoadGraph`, `RoadGraphNode`, `RoadGraphEdge`, builder      |
//! | [`index`]   | `RoadGraphIndex`, `TileLocation`                            |
//! | [`weights`] | `RoadGraphWeights`, `EdgeWeights`                           |
//! | [`locate`]  | `NodeLocator` (R-tree nearest-node snapping)                |
//! | [`router`]  | `find_road_route`, `RoadRouter`, `RoadRoute`, `RouteConfig` |
//! | [`error`]   | `RouteError`, `RouteResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod graph;
pub mod index;
pub mod locate;
pub mod router;
pub mod weights;


pub use error::{RouteError, RouteResult};
pub use graph::{RoadGraph, RoadGraphEdge, RoadGraphNode, build_road_graph};
pub use index::{RoadGraphIndex, TileLocation, build_road_graph_index};
pub use locate::NodeLocator;
pub use router::{RoadRoute, RoadRouteMetric, RoadRouter, RouteConfig, find_road_route};
pub use weights::{EdgeWeights, RoadGraphWeights, build_road_graph_weights, edge_weights};
