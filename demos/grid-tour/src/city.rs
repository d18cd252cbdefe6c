//! Synthetic city used by the tour.
//!
//! A 40×28 grid split by a two-tile river.  One highway and one street run
//! edge to edge; four avenues and two more streets form the inner blocks,
//! and a dead-end street runs south to the harbour.

use std::ops::RangeInclusive;

use anyhow::Result;
use tg_core::{Overlay, Terrain, TileGrid, TilePos};

pub const WIDTH: i32 = 40;
pub const HEIGHT: i32 = 28;

/// Named tiles the tour routes between.
pub struct Landmarks {
    /// Border entry of the crosstown street.
    pub depot_west: TilePos,
    /// Border entry of the highway.
    pub depot_east: TilePos,
    pub harbour: TilePos,
    pub market: TilePos,
    pub school: TilePos,
    /// Empty lot that still needs a road.
    pub plot: TilePos,
}

fn hline(grid: &mut TileGrid, y: i32, xs: RangeInclusive<i32>, level: u8) {
    for x in xs {
        grid.set_road(TilePos::new(x, y), level);
    }
}

fn vline(grid: &mut TileGrid, x: i32, ys: RangeInclusive<i32>, level: u8) {
    for y in ys {
        grid.set_road(TilePos::new(x, y), level);
    }
}

fn zone(grid: &mut TileGrid, xs: RangeInclusive<i32>, ys: RangeInclusive<i32>, o: Overlay) {
    for y in ys {
        for x in xs.clone() {
            grid.set_overlay(TilePos::new(x, y), o);
        }
    }
}

pub fn build_city() -> Result<(TileGrid, Landmarks)> {
    let mut grid = TileGrid::new(WIDTH, HEIGHT)?;

    for y in 0..HEIGHT {
        for x in 19..=20 {
            grid.set_terrain(TilePos::new(x, y), Terrain::Water);
        }
    }

    // Streets, then avenues over them, then the highway over everything.
    hline(&mut grid, 2, 4..=35, 1);
    hline(&mut grid, 16, 0..=WIDTH - 1, 1);
    hline(&mut grid, 23, 4..=35, 1);
    vline(&mut grid, 30, 23..=HEIGHT - 1, 1);
    for x in [4, 14, 26, 35] {
        vline(&mut grid, x, 2..=23, 2);
    }
    hline(&mut grid, 9, 0..=WIDTH - 1, 3);

    zone(&mut grid, 6..=12, 4..=7, Overlay::Residential);
    zone(&mut grid, 6..=12, 18..=21, Overlay::Park);
    zone(&mut grid, 22..=24, 11..=14, Overlay::Commercial);
    zone(&mut grid, 28..=33, 18..=21, Overlay::Industrial);

    // Varied but reproducible tie-breaking for the build planner.
    grid.scatter_variation(0x5EED);

    let landmarks = Landmarks {
        depot_west: TilePos::new(0, 16),
        depot_east: TilePos::new(WIDTH - 1, 9),
        harbour: TilePos::new(30, HEIGHT - 1),
        market: TilePos::new(26, 12),
        school: TilePos::new(4, 20),
        plot: TilePos::new(10, 12),
    };
    Ok((grid, landmarks))
}
