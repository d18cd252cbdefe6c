//! Per-cell tile attributes.

use crate::road;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Terrain {
    Water,
    Sand,
    #[default]
    Grass,
}

/// What is built on a tile.  Only `Road` takes part in routing.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Overlay {
    #[default]
    None,
    Road,
    Residential,
    Commercial,
    Industrial,
    Park,
}

/// One grid cell.
///
/// `level` is the road tier (1..=3) and is meaningful only when
/// `overlay == Road`; zones reuse it for their own density tier.
/// `variation` is a stable per-tile byte used to break ties between
/// equally good paths.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub terrain: Terrain,
    pub overlay: Overlay,
    pub height: f32,
    pub variation: u8,
    pub level: u8,
    pub occupants: u16,
    pub district: u8,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            terrain: Terrain::Grass,
            overlay: Overlay::None,
            height: 0.0,
            variation: 0,
            level: 1,
            occupants: 0,
            district: 0,
        }
    }
}

impl Tile {
    /// A grass tile carrying a road of the given tier.
    pub fn road(level: u8) -> Self {
        Self { overlay: Overlay::Road, level, ..Self::default() }
    }

    #[inline]
    pub fn is_road(&self) -> bool {
        self.overlay == Overlay::Road
    }

    /// Road on water.
    #[inline]
    pub fn is_bridge(&self) -> bool {
        self.is_road() && self.terrain == Terrain::Water
    }

    #[inline]
    pub fn is_land(&self) -> bool {
        self.terrain != Terrain::Water
    }

    /// Milli-step cost of entering this tile as a road tile.
    ///
    /// Water-borne roads pay the bridge penalty.  The value is defined for
    /// any tile so callers that already filtered on `is_road` need no branch.
    #[inline]
    pub fn travel_time_milli(&self) -> i32 {
        let level = i32::from(self.level);
        if self.terrain == Terrain::Water {
            road::bridge_travel_time_milli(level)
        } else {
            road::travel_time_milli(level)
        }
    }
}
