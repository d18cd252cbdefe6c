//! Road tiers and their cost tables.
//!
//! All functions take a raw integer level and clamp it to `1..=3` first, so
//! a corrupt tile level degrades to the nearest valid tier instead of
//! producing a nonsense cost.
//!
//! | Class   | Level | Travel (milli) | Build | Upkeep | Capacity    |
//! |---------|-------|----------------|-------|--------|-------------|
//! | Street  | 1     | 1000           | 1     | 1      | base        |
//! | Avenue  | 2     | 893            | 3     | 2      | base × 9/5  |
//! | Highway | 3     | 800            | 6     | 4      | base × 13/5 |
//!
//! Bridges (roads on water) add 150 milli-steps of travel time, cost four
//! times as much to build and twice as much to maintain.

pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 3;

pub const BRIDGE_BUILD_COST_MULTIPLIER: i32 = 4;
pub const BRIDGE_MAINTENANCE_MULTIPLIER: i32 = 2;
pub const BRIDGE_TRAVEL_TIME_PENALTY_MILLI: i32 = 150;

/// Cheapest possible cost of entering any road tile.  Multiplying a
/// Manhattan distance by this keeps travel-time heuristics admissible.
pub const MIN_STEP_COST_MILLI: i32 = 800;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoadClass {
    Street = 1,
    Avenue = 2,
    Highway = 3,
}

impl RoadClass {
    pub fn for_level(level: i32) -> Self {
        match clamp_level(level) {
            1 => RoadClass::Street,
            2 => RoadClass::Avenue,
            _ => RoadClass::Highway,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RoadClass::Street => "Street",
            RoadClass::Avenue => "Avenue",
            RoadClass::Highway => "Highway",
        }
    }
}

#[inline]
pub fn clamp_level(level: i32) -> i32 {
    level.clamp(MIN_LEVEL, MAX_LEVEL)
}

pub fn travel_time_milli(level: i32) -> i32 {
    match RoadClass::for_level(level) {
        RoadClass::Street => 1000,
        RoadClass::Avenue => 893,
        RoadClass::Highway => 800,
    }
}

pub fn bridge_travel_time_milli(level: i32) -> i32 {
    travel_time_milli(level) + BRIDGE_TRAVEL_TIME_PENALTY_MILLI
}

pub fn build_cost(level: i32) -> i32 {
    match RoadClass::for_level(level) {
        RoadClass::Street => 1,
        RoadClass::Avenue => 3,
        RoadClass::Highway => 6,
    }
}

pub fn bridge_build_cost(level: i32) -> i32 {
    build_cost(level) * BRIDGE_BUILD_COST_MULTIPLIER
}

pub fn maintenance_units(level: i32) -> i32 {
    match RoadClass::for_level(level) {
        RoadClass::Street => 1,
        RoadClass::Avenue => 2,
        RoadClass::Highway => 4,
    }
}

pub fn bridge_maintenance_units(level: i32) -> i32 {
    maintenance_units(level) * BRIDGE_MAINTENANCE_MULTIPLIER
}

/// Vehicles per tile.  A negative base is treated as zero.
pub fn capacity(base: i32, level: i32) -> i32 {
    let base = base.max(0);
    match RoadClass::for_level(level) {
        RoadClass::Street => base,
        RoadClass::Avenue => base * 9 / 5,
        RoadClass::Highway => base * 13 / 5,
    }
}

/// Money needed to bring one tile to `target` level.
///
/// An empty tile pays the full target cost.  An existing road pays only the
/// difference, and never less than zero (downgrades are free).
pub fn placement_cost(current: i32, target: i32, already_road: bool, is_bridge: bool) -> i32 {
    let cost_of = |level| if is_bridge { bridge_build_cost(level) } else { build_cost(level) };
    let target_cost = cost_of(clamp_level(target));
    if !already_road {
        return target_cost;
    }
    (target_cost - cost_of(clamp_level(current))).max(0)
}
