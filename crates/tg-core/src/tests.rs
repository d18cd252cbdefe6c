//! Unit tests for tg-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::from_index(42), id);
        assert_eq!(EdgeId::from_index(7), EdgeId(7));
    }

    #[test]
    fn invalid_sentinel() {
        assert_eq!(NodeId::INVALID, NodeId(u32::MAX));
        assert!(!EdgeId::INVALID.is_valid());
        assert!(EdgeId(0).is_valid());
    }
}

#[cfg(test)]
mod geom {
    use crate::{Dir, TilePos};

    #[test]
    fn manhattan_is_symmetric() {
        let a = TilePos::new(1, 2);
        let b = TilePos::new(-3, 5);
        assert_eq!(a.manhattan(b), 7);
        assert_eq!(b.manhattan(a), 7);
    }

    #[test]
    fn neighbour_orders() {
        let o = TilePos::new(0, 0);
        let nesw: Vec<_> = Dir::NESW.iter().map(|&d| o.step(d)).collect();
        let expect: Vec<TilePos> = vec![(0, -1).into(), (1, 0).into(), (0, 1).into(), (-1, 0).into()];
        assert_eq!(nesw, expect);
        let ewsn: Vec<_> = Dir::EWSN.iter().map(|&d| o.step(d)).collect();
        let expect: Vec<TilePos> = vec![(1, 0).into(), (-1, 0).into(), (0, 1).into(), (0, -1).into()];
        assert_eq!(ewsn, expect);
    }

    #[test]
    fn between_and_opposite() {
        let a = TilePos::new(4, 4);
        for d in Dir::NESW {
            assert_eq!(Dir::between(a, a.step(d)), Some(d));
            assert_eq!(a.step(d).step(d.opposite()), a);
        }
        assert_eq!(Dir::between(a, TilePos::new(5, 5)), None);
    }
}

#[cfg(test)]
mod road {
    use crate::road::*;
    use crate::RoadClass;

    #[test]
    fn tier_tables() {
        assert_eq!(travel_time_milli(1), 1000);
        assert_eq!(travel_time_milli(2), 893);
        assert_eq!(travel_time_milli(3), 800);
        assert_eq!(bridge_travel_time_milli(1), 1150);
        assert_eq!(build_cost(3), 6);
        assert_eq!(bridge_build_cost(2), 12);
        assert_eq!(maintenance_units(3), 4);
        assert_eq!(bridge_maintenance_units(3), 8);
        assert_eq!(capacity(28, 1), 28);
        assert_eq!(capacity(28, 2), 50);
        assert_eq!(capacity(28, 3), 72);
        assert_eq!(capacity(-5, 3), 0);
    }

    #[test]
    fn levels_are_clamped() {
        assert_eq!(travel_time_milli(0), 1000);
        assert_eq!(travel_time_milli(9), 800);
        assert_eq!(RoadClass::for_level(-1), RoadClass::Street);
        assert_eq!(RoadClass::for_level(2).name(), "Avenue");
    }

    #[test]
    fn min_step_cost_is_a_lower_bound() {
        for level in MIN_LEVEL..=MAX_LEVEL {
            assert!(travel_time_milli(level) >= MIN_STEP_COST_MILLI);
            assert!(bridge_travel_time_milli(level) >= MIN_STEP_COST_MILLI);
        }
    }

    #[test]
    fn placement_cost_charges_upgrade_delta() {
        assert_eq!(placement_cost(1, 3, false, false), 6);
        assert_eq!(placement_cost(1, 3, true, false), 5);
        assert_eq!(placement_cost(3, 1, true, false), 0);
        assert_eq!(placement_cost(1, 1, false, true), 4);
        assert_eq!(placement_cost(2, 3, true, true), 12);
    }
}

#[cfg(test)]
mod grid {
    use crate::{Grid, Overlay, Terrain, TgError, TileGrid, TilePos, usable_slice};

    #[test]
    fn ascii_legend() {
        let g = TileGrid::from_ascii(
            "
            .~s#
            123=
            RCIP
            ",
        )
        .unwrap();
        assert_eq!((g.width(), g.height()), (4, 3));
        assert_eq!(g.tile_at(1, 0).terrain, Terrain::Water);
        assert_eq!(g.tile_at(2, 0).terrain, Terrain::Sand);
        assert!(g.is_road(TilePos::new(3, 0)));
        assert_eq!(g.tile_at(2, 1).level, 3);
        assert!(g.is_bridge(TilePos::new(3, 1)));
        assert_eq!(g.road_travel_time_milli(TilePos::new(3, 1)), 1150);
        assert_eq!(g.tile_at(3, 2).overlay, Overlay::Park);
    }

    #[test]
    fn ascii_errors() {
        assert_eq!(
            TileGrid::from_ascii("..\n...").unwrap_err(),
            TgError::RaggedRows { row: 1, len: 3, expected: 2 }
        );
        assert!(matches!(
            TileGrid::from_ascii("..x").unwrap_err(),
            TgError::UnknownGlyph { glyph: 'x', x: 2, y: 0 }
        ));
    }

    #[test]
    fn empty_map_is_degenerate() {
        let g = TileGrid::from_ascii("").unwrap();
        assert!(g.is_degenerate());
        assert_eq!(g.tile_count(), 0);
        assert!(TileGrid::new(-1, 3).is_err());
    }

    #[test]
    fn bounds_and_indexing() {
        let g = TileGrid::new(5, 3).unwrap();
        assert!(g.in_bounds(4, 2));
        assert!(!g.in_bounds(5, 0));
        assert!(g.tile(TilePos::new(-1, 0)).is_none());
        let p = TilePos::new(3, 2);
        assert_eq!(g.index_of(p), 13);
        assert_eq!(g.pos_of(13), p);
        assert!(g.is_border(TilePos::new(0, 1)));
        assert!(!g.is_border(TilePos::new(2, 1)));
    }

    #[test]
    fn from_tiles_checks_count() {
        let err = TileGrid::from_tiles(2, 2, Vec::new()).unwrap_err();
        assert!(matches!(err, TgError::TileCountMismatch { expected: 4, actual: 0, .. }));
    }

    #[test]
    fn mutation_helpers() {
        let mut g = TileGrid::new(3, 3).unwrap();
        assert!(g.set_road(TilePos::new(1, 1), 2));
        assert!(!g.set_road(TilePos::new(3, 1), 2));
        assert!(g.set_terrain(TilePos::new(1, 1), Terrain::Water));
        assert!(g.is_bridge(TilePos::new(1, 1)));
        assert!(g.set_overlay(TilePos::new(1, 1), Overlay::None));
        assert!(!g.is_road(TilePos::new(1, 1)));
    }

    #[test]
    fn scatter_variation_is_deterministic() {
        let mut a = TileGrid::new(8, 8).unwrap();
        let mut b = TileGrid::new(8, 8).unwrap();
        a.scatter_variation(7);
        b.scatter_variation(7);
        assert_eq!(a, b);
        assert!(a.tiles().iter().any(|t| t.variation != a.tiles()[0].variation));
    }

    #[test]
    fn wrong_size_slice_is_absent() {
        let v = vec![1u8; 4];
        assert!(usable_slice(Some(&v[..]), 4, "mask").is_some());
        assert!(usable_slice(Some(&v[..]), 5, "mask").is_none());
        assert!(usable_slice::<u8>(None, 4, "mask").is_none());
    }
}

#[cfg(test)]
mod hash {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use crate::{sample_key, splitmix64};

    #[test]
    fn splitmix_reference_values() {
        // First two outputs of the reference splitmix64 stream seeded with 0.
        assert_eq!(splitmix64(0), 0xE220_A839_7B1D_CDAF);
        assert_eq!(splitmix64(0x9E37_79B9_7F4A_7C15), 0x6E78_9E6A_A1B9_65F4);
    }

    #[test]
    fn sample_keys_are_distinct() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..64 {
            let a: usize = rng.gen_range(0..10_000);
            let b = a + rng.gen_range(1..100);
            assert_ne!(sample_key(a), sample_key(b));
        }
    }
}
