//! The grid accessor consumed by every search, and an owned implementation.
//!
//! # Indexing
//!
//! Tiles are addressed row-major: `index = y * width + x`.  Every per-tile
//! array in the workspace (masks, flow fields, graph indexes, traffic maps)
//! uses this layout and is sized `width * height`.
//!
//! # Optional masks
//!
//! Searches accept optional per-tile slices.  A slice whose length does not
//! match the grid is treated exactly as if it had not been passed; see
//! [`usable_slice`].

use crate::error::{TgError, TgResult};
use crate::geom::TilePos;
use crate::hash::splitmix64;
use crate::tile::{Overlay, Terrain, Tile};

// ── Grid trait ────────────────────────────────────────────────────────────────

/// Read-only view of a rectangular tile grid.
///
/// Implementors supply the dimensions and raw tile access; everything else
/// has a default.  Searches only ever call [`tile_at`](Self::tile_at) after
/// an [`in_bounds`](Self::in_bounds) check.
pub trait Grid {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    /// Tile at `(x, y)`.  May panic when out of bounds.
    fn tile_at(&self, x: i32, y: i32) -> &Tile;

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() && y < self.height()
    }

    /// `true` for a zero-area (or negative) grid.
    #[inline]
    fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Number of cells, `0` for a degenerate grid.
    #[inline]
    fn tile_count(&self) -> usize {
        if self.is_degenerate() {
            0
        } else {
            self.width() as usize * self.height() as usize
        }
    }

    #[inline]
    fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.in_bounds(pos.x, pos.y).then(|| self.tile_at(pos.x, pos.y))
    }

    /// Row-major index of an in-bounds position.
    #[inline]
    fn index_of(&self, pos: TilePos) -> usize {
        pos.y as usize * self.width() as usize + pos.x as usize
    }

    #[inline]
    fn pos_of(&self, index: usize) -> TilePos {
        let w = self.width().max(1) as usize;
        TilePos::new((index % w) as i32, (index / w) as i32)
    }

    #[inline]
    fn is_road(&self, pos: TilePos) -> bool {
        self.tile(pos).is_some_and(Tile::is_road)
    }

    #[inline]
    fn is_land(&self, pos: TilePos) -> bool {
        self.tile(pos).is_some_and(Tile::is_land)
    }

    #[inline]
    fn is_bridge(&self, pos: TilePos) -> bool {
        self.tile(pos).is_some_and(Tile::is_bridge)
    }

    /// `true` when `pos` lies on the outermost ring of the grid.
    #[inline]
    fn is_border(&self, pos: TilePos) -> bool {
        self.in_bounds(pos.x, pos.y)
            && (pos.x == 0 || pos.y == 0 || pos.x == self.width() - 1 || pos.y == self.height() - 1)
    }

    /// Milli-step cost of entering the road tile at `pos`.
    #[inline]
    fn road_travel_time_milli(&self, pos: TilePos) -> i32 {
        self.tile_at(pos.x, pos.y).travel_time_milli()
    }
}

/// Return `slice` only if it covers exactly `len` entries.
pub fn usable_slice<'a, T>(slice: Option<&'a [T]>, len: usize, what: &str) -> Option<&'a [T]> {
    match slice {
        Some(s) if s.len() == len => Some(s),
        Some(s) => {
            log::trace!("ignoring {what}: {} entries, expected {len}", s.len());
            None
        }
        None => None,
    }
}

// ── TileGrid ──────────────────────────────────────────────────────────────────

/// Owned row-major grid.
///
/// This is the store used by tests, tools, and the demo.  The simulator that
/// embeds these searches may implement [`Grid`] over its own storage instead.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// A `width × height` grid of empty grass.  Zero-sized grids are allowed.
    pub fn new(width: i32, height: i32) -> TgResult<Self> {
        if width < 0 || height < 0 {
            return Err(TgError::InvalidDimensions { width, height });
        }
        let n = width as usize * height as usize;
        Ok(Self { width, height, tiles: vec![Tile::default(); n] })
    }

    pub fn from_tiles(width: i32, height: i32, tiles: Vec<Tile>) -> TgResult<Self> {
        if width < 0 || height < 0 {
            return Err(TgError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        if tiles.len() != expected {
            return Err(TgError::TileCountMismatch {
                width,
                height,
                expected,
                actual: tiles.len(),
            });
        }
        Ok(Self { width, height, tiles })
    }

    /// Parse a text map, one row per line.  Blank lines and surrounding
    /// whitespace are ignored.
    ///
    /// | Glyph       | Tile                                   |
    /// |-------------|----------------------------------------|
    /// | `.`         | grass                                  |
    /// | `~`         | water                                  |
    /// | `s`         | sand                                   |
    /// | `#` / `1`   | street                                 |
    /// | `2`         | avenue                                 |
    /// | `3`         | highway                                |
    /// | `=`         | street bridge (road on water)          |
    /// | `R C I P`   | residential, commercial, industrial, park |
    pub fn from_ascii(map: &str) -> TgResult<Self> {
        let rows: Vec<&str> = map.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut tiles = Vec::with_capacity(width * rows.len());

        for (y, row) in rows.iter().enumerate() {
            let len = row.chars().count();
            if len != width {
                return Err(TgError::RaggedRows { row: y, len, expected: width });
            }
            for (x, glyph) in row.chars().enumerate() {
                let tile = glyph_tile(glyph).ok_or_else(|| TgError::UnknownGlyph {
                    glyph,
                    x: x as i32,
                    y: y as i32,
                })?;
                tiles.push(tile);
            }
        }
        Self::from_tiles(width as i32, rows.len() as i32, tiles)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile_mut(&mut self, pos: TilePos) -> Option<&mut Tile> {
        if !self.in_bounds(pos.x, pos.y) {
            return None;
        }
        let i = self.index_of(pos);
        self.tiles.get_mut(i)
    }

    /// Lay (or re-tier) a road.  Returns `false` when `pos` is out of bounds.
    pub fn set_road(&mut self, pos: TilePos, level: u8) -> bool {
        match self.tile_mut(pos) {
            Some(t) => {
                t.overlay = Overlay::Road;
                t.level = level;
                true
            }
            None => false,
        }
    }

    pub fn set_overlay(&mut self, pos: TilePos, overlay: Overlay) -> bool {
        self.tile_mut(pos).map(|t| t.overlay = overlay).is_some()
    }

    pub fn set_terrain(&mut self, pos: TilePos, terrain: Terrain) -> bool {
        self.tile_mut(pos).map(|t| t.terrain = terrain).is_some()
    }

    /// Fill every tile's `variation` byte from a seeded hash of its index.
    pub fn scatter_variation(&mut self, seed: u64) {
        for (i, t) in self.tiles.iter_mut().enumerate() {
            t.variation = (splitmix64(seed ^ i as u64) & 0xFF) as u8;
        }
    }
}

impl Grid for TileGrid {
    #[inline]
    fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn tile_at(&self, x: i32, y: i32) -> &Tile {
        &self.tiles[y as usize * self.width as usize + x as usize]
    }
}

fn glyph_tile(glyph: char) -> Option<Tile> {
    let zone = |overlay| Tile { overlay, ..Tile::default() };
    let tile = match glyph {
        '.' => Tile::default(),
        '~' => Tile { terrain: Terrain::Water, ..Tile::default() },
        's' => Tile { terrain: Terrain::Sand, ..Tile::default() },
        '#' | '1' => Tile::road(1),
        '2' => Tile::road(2),
        '3' => Tile::road(3),
        '=' => Tile { terrain: Terrain::Water, ..Tile::road(1) },
        'R' => zone(Overlay::Residential),
        'C' => zone(Overlay::Commercial),
        'I' => zone(Overlay::Industrial),
        'P' => zone(Overlay::Park),
        _ => return None,
    };
    Some(tile)
}
