//! Grid construction errors.
//!
//! Searches and analyses never fail with an error: they report unreachable
//! or malformed input through empty results.  `TgError` only covers building
//! a [`TileGrid`](crate::TileGrid) from raw parts.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TgError {
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("grid of {width}x{height} needs {expected} tiles, got {actual}")]
    TileCountMismatch {
        width: i32,
        height: i32,
        expected: usize,
        actual: usize,
    },

    #[error("unknown map glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: i32, y: i32 },

    #[error("map row {row} has {len} tiles, expected {expected}")]
    RaggedRows { row: usize, len: usize, expected: usize },
}

/// Shorthand result type for grid construction.
pub type TgResult<T> = Result<T, TgError>;
