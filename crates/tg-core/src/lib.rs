//! `tg-core` — foundational types for the tilegrid routing workspace.
//!
//! Every other `tg-*` crate depends on this one.  It owns the tile model and
//! the [`Grid`] accessor trait that the searches read from, but never mutates
//! a grid on behalf of a search: every analysis takes `&impl Grid` and returns
//! a freshly allocated result.
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`ids`]     | `NodeId`, `EdgeId`                                        |
//! | [`geom`]    | `TilePos`, `Dir`, the two fixed neighbour orders          |
//! | [`tile`]    | `Tile`, `Terrain`, `Overlay`                              |
//! | [`road`]    | `RoadClass` and the tier → cost/capacity/time tables      |
//! | [`grid`]    | `Grid` trait, `TileGrid` store, ASCII map loader          |
//! | [`hash`]    | `splitmix64` and the sampling key used for determinism    |
//! | [`error`]   | `TgError`, `TgResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geom;
pub mod grid;
pub mod hash;
pub mod ids;
pub mod road;
pub mod tile;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{TgError, TgResult};
pub use geom::{Dir, TilePos};
pub use grid::{Grid, TileGrid, usable_slice};
pub use hash::{sample_key, splitmix64};
pub use ids::{EdgeId, NodeId};
pub use road::RoadClass;
pub use tile::{Overlay, Terrain, Tile};
