//! Routing error type.

use thiserror::Error;

use tg_core::TilePos;

/// Why [`find_road_route`](crate::find_road_route) produced no path.
///
/// Malformed inputs are reported before any search runs.  `NoRoute` is the
/// ordinary "disconnected" outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("grid has no tiles")]
    InvalidGrid,

    #[error("tile {0} is not a road")]
    NotRoad(TilePos),

    #[error("road graph has no nodes")]
    EmptyGraph,

    #[error("index is {index_width}x{index_height} but the grid is {width}x{height}")]
    IndexMismatch {
        index_width: i32,
        index_height: i32,
        width: i32,
        height: i32,
    },

    #[error("weights cover {weights} edges but the graph has {edges}")]
    WeightsMismatch { weights: usize, edges: usize },

    #[error("road tile {0} is not mapped to a node or edge")]
    Unmapped(TilePos),

    #[error("no route from {from} to {to}")]
    NoRoute { from: TilePos, to: TilePos },
}

pub type RouteResult<T> = Result<T, RouteError>;
