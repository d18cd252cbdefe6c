//! Unit tests for tg-pathing.
//!
//! Grids are written as ASCII maps (see `TileGrid::from_ascii`).

#[cfg(test)]
mod helpers {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use tg_core::{Grid, TileGrid, TilePos};

    use crate::FlowField;

    pub fn map(text: &str) -> TileGrid {
        TileGrid::from_ascii(text).unwrap()
    }

    pub fn idx(g: &TileGrid, x: i32, y: i32) -> usize {
        g.index_of(TilePos::new(x, y))
    }

    /// A ring where the short top side is cheap in steps and the long way
    /// round runs over highway.
    ///
    /// ```text
    /// #####
    /// #...#
    /// #...#
    /// 33333
    /// ```
    pub fn ring() -> TileGrid {
        map("
            #####
            #...#
            #...#
            33333
        ")
    }

    /// Random road layout with mixed tiers and scattered variation bytes.
    pub fn random_roads(seed: u64, w: i32, h: i32, density: f64) -> TileGrid {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut g = TileGrid::new(w, h).unwrap();
        for y in 0..h {
            for x in 0..w {
                if rng.gen_bool(density) {
                    g.set_road(TilePos::new(x, y), rng.gen_range(1..=3));
                }
            }
        }
        g.scatter_variation(seed);
        g
    }

    pub fn road_indices(g: &TileGrid) -> Vec<usize> {
        (0..g.tile_count()).filter(|&i| g.is_road(g.pos_of(i))).collect()
    }

    /// Parent pointers are consistent with `dist` and `cost`.
    pub fn assert_consistent(g: &TileGrid, f: &FlowField, extra: Option<&[i32]>) {
        for i in 0..f.len() {
            assert_eq!(f.dist[i] >= 0, f.cost[i] >= 0, "tile {i}");
            if f.dist[i] < 0 || f.parent[i] < 0 {
                continue;
            }
            let p = f.parent[i] as usize;
            assert_eq!(f.dist[i], f.dist[p] + 1, "dist at tile {i}");
            let entry = g.road_travel_time_milli(g.pos_of(i)) + extra.map_or(0, |e| e[i].max(0));
            assert_eq!(f.cost[i], f.cost[p] + entry, "cost at tile {i}");
            let path = f.path_to_source(i);
            assert_eq!(path.len() as i32, f.dist[i] + 1);
            assert_eq!(f.parent[*path.last().unwrap()], -1);
        }
    }
}

// ── Flow fields ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod flow {
    use tg_core::{Grid, TileGrid, TilePos};

    use super::helpers::{assert_consistent, idx, map, random_roads, ring, road_indices};
    use crate::{FlowFieldConfig, FlowFieldInputs, UNREACHED, build_road_flow_field};

    #[test]
    fn straight_line_counts_steps() {
        let mut g = TileGrid::new(8, 8).unwrap();
        for x in 0..8 {
            g.set_road(TilePos::new(x, 3), 1);
        }
        let f = build_road_flow_field(&g, &[idx(&g, 0, 3)], &FlowFieldConfig::default(), FlowFieldInputs::default());
        for y in 0..8 {
            for x in 0..8 {
                let i = idx(&g, x, y);
                if y == 3 {
                    assert_eq!(f.dist[i], x);
                    assert_eq!(f.cost[i], 1000 * x);
                } else {
                    assert_eq!(f.dist[i], UNREACHED);
                    assert_eq!(f.cost[i], UNREACHED);
                }
            }
        }
        assert_eq!(f.parent[idx(&g, 0, 3)], UNREACHED);
        assert_eq!(f.parent[idx(&g, 5, 3)], idx(&g, 4, 3) as i32);
        assert!(f.owner.is_empty());
    }

    #[test]
    fn empty_inputs_are_total() {
        let g = map("###");
        let f = build_road_flow_field(&g, &[], &FlowFieldConfig::default(), FlowFieldInputs::default());
        assert_eq!(f.len(), 3);
        assert!(f.dist.iter().all(|&d| d == UNREACHED));

        let empty = TileGrid::new(0, 0).unwrap();
        let f = build_road_flow_field(&empty, &[0], &FlowFieldConfig::default(), FlowFieldInputs::default());
        assert!(f.is_empty());
        assert_eq!(f.len(), 0);
    }

    #[test]
    fn invalid_sources_are_skipped() {
        let g = map("#.#");
        let f = build_road_flow_field(&g, &[1, 99], &FlowFieldConfig::default(), FlowFieldInputs::default());
        assert!(f.dist.iter().all(|&d| d == UNREACHED));
    }

    #[test]
    fn owners_split_a_line() {
        let g = map("#######");
        let cfg = FlowFieldConfig { compute_owner: true, ..Default::default() };
        let f = build_road_flow_field(&g, &[0, 6], &cfg, FlowFieldInputs::default());
        assert_eq!(f.owner, vec![0, 0, 0, 0, 1, 1, 1]);

        let cfg = FlowFieldConfig { use_travel_time: true, ..cfg };
        let f = build_road_flow_field(&g, &[0, 6], &cfg, FlowFieldInputs::default());
        assert_eq!(f.owner, vec![0, 0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn duplicate_source_keeps_first_owner() {
        let g = map("###");
        let cfg = FlowFieldConfig { compute_owner: true, ..Default::default() };
        let f = build_road_flow_field(&g, &[1, 1], &cfg, FlowFieldInputs::default());
        assert_eq!(f.owner, vec![0, 0, 0]);
    }

    #[test]
    fn travel_time_detours_around_extra_cost() {
        let g = ring();
        let mut extra = vec![0; g.tile_count()];
        extra[idx(&g, 2, 0)] = 10_000;
        let inputs = FlowFieldInputs { extra_cost_milli: Some(&extra), ..Default::default() };
        let goal = idx(&g, 4, 0);

        let steps = build_road_flow_field(&g, &[0], &FlowFieldConfig::default(), inputs);
        assert_eq!((steps.dist[goal], steps.cost[goal]), (4, 14_000));

        let cfg = FlowFieldConfig { use_travel_time: true, ..Default::default() };
        let timed = build_road_flow_field(&g, &[0], &cfg, inputs);
        assert_eq!((timed.dist[goal], timed.cost[goal]), (10, 9_000));
        assert_consistent(&g, &timed, Some(&extra));
    }

    #[test]
    fn wrong_size_extra_cost_is_ignored() {
        let g = ring();
        let extra = vec![10_000; 3];
        let inputs = FlowFieldInputs { extra_cost_milli: Some(&extra), ..Default::default() };
        let cfg = FlowFieldConfig { use_travel_time: true, ..Default::default() };
        let f = build_road_flow_field(&g, &[0], &cfg, inputs);
        assert_eq!(f.cost[idx(&g, 4, 0)], 4_000);
    }

    #[test]
    fn block_mask_closes_tiles() {
        let g = ring();
        let mut block = vec![0u8; g.tile_count()];
        block[idx(&g, 2, 0)] = 1;
        let inputs = FlowFieldInputs { block_mask: Some(&block), ..Default::default() };
        let f = build_road_flow_field(&g, &[0], &FlowFieldConfig::default(), inputs);
        assert_eq!(f.dist[idx(&g, 4, 0)], 10);
        assert_eq!(f.dist[idx(&g, 2, 0)], UNREACHED);

        // A blocked source seeds nothing.
        let f = build_road_flow_field(&g, &[idx(&g, 2, 0)], &FlowFieldConfig::default(), inputs);
        assert!(f.dist.iter().all(|&d| d == UNREACHED));
    }

    #[test]
    fn outside_connection_excludes_islands() {
        let g = map("
            .....
            .##..
            .....
            #####
        ");
        let cfg = FlowFieldConfig { require_outside_connection: true, ..Default::default() };
        let sources = [idx(&g, 1, 1), idx(&g, 0, 3)];
        let f = build_road_flow_field(&g, &sources, &cfg, FlowFieldInputs::default());
        assert_eq!(f.dist[idx(&g, 2, 1)], UNREACHED);
        assert_eq!(f.dist[idx(&g, 1, 1)], UNREACHED);
        assert_eq!(f.dist[idx(&g, 4, 3)], 4);

        // A wrong-size precomputed mask falls back to computing it.
        let bogus = [1u8; 2];
        let inputs = FlowFieldInputs { road_to_edge: Some(&bogus), ..Default::default() };
        assert_eq!(build_road_flow_field(&g, &sources, &cfg, inputs), f);
    }

    #[test]
    fn source_initial_cost_shifts_ownership() {
        let g = map("#######");
        let cfg = FlowFieldConfig { compute_owner: true, use_travel_time: true, ..Default::default() };
        let init = [5_000, 0];
        let inputs = FlowFieldInputs { source_initial_cost_milli: Some(&init), ..Default::default() };
        let f = build_road_flow_field(&g, &[0, 6], &cfg, inputs);
        assert_eq!(f.owner, vec![0, 1, 1, 1, 1, 1, 1]);
        assert_eq!(f.cost[0], 5_000);
        assert_eq!(f.cost[1], 5_000);

        // Negative offsets clamp to zero.
        let init = [-3_000, 0];
        let inputs = FlowFieldInputs { source_initial_cost_milli: Some(&init), ..Default::default() };
        let f = build_road_flow_field(&g, &[0, 6], &cfg, inputs);
        assert_eq!(f.owner, vec![0, 0, 0, 0, 1, 1, 1]);
        assert_eq!(f.cost[0], 0);
    }

    #[test]
    fn random_fields_are_consistent_and_deterministic() {
        for seed in 0..12 {
            let g = random_roads(seed, 18, 14, 0.6);
            let roads = road_indices(&g);
            let sources: Vec<usize> = roads.iter().copied().step_by(17).collect();
            for use_travel_time in [false, true] {
                let cfg = FlowFieldConfig { compute_owner: true, use_travel_time, ..Default::default() };
                let a = build_road_flow_field(&g, &sources, &cfg, FlowFieldInputs::default());
                let b = build_road_flow_field(&g, &sources, &cfg, FlowFieldInputs::default());
                assert_eq!(a, b);
                assert_consistent(&g, &a, None);
                for (si, &s) in sources.iter().enumerate() {
                    assert_eq!(a.dist[s], 0);
                    assert_eq!(a.owner[s], si as i32);
                }
            }
        }
    }
}

// ── Outside connection ────────────────────────────────────────────────────────

#[cfg(test)]
mod edge {
    use tg_core::TilePos;

    use super::helpers::{idx, map};
    use crate::{
        find_road_path_to_edge, has_adjacent_road_connected_to_edge, pick_adjacent_road_tile,
        roads_connected_to_edge,
    };

    fn island() -> tg_core::TileGrid {
        map("
            .....
            .##..
            .....
            #####
        ")
    }

    #[test]
    fn mask_marks_border_reachable_roads() {
        let g = island();
        let m = roads_connected_to_edge(&g);
        assert_eq!(m[idx(&g, 1, 1)], 0);
        assert_eq!(m[idx(&g, 2, 1)], 0);
        assert_eq!(m[idx(&g, 0, 3)], 1);
        assert_eq!(m[idx(&g, 4, 3)], 1);
        assert_eq!(m[idx(&g, 0, 0)], 0);
    }

    #[test]
    fn adjacency_queries() {
        let g = island();
        let m = roads_connected_to_edge(&g);
        assert!(has_adjacent_road_connected_to_edge(&g, &m, TilePos::new(2, 2)));
        assert!(!has_adjacent_road_connected_to_edge(&g, &m, TilePos::new(1, 0)));
        assert!(!has_adjacent_road_connected_to_edge(&g, &m[..3], TilePos::new(2, 2)));

        let p = TilePos::new(2, 2);
        assert_eq!(pick_adjacent_road_tile(&g, None, p), Some(TilePos::new(2, 1)));
        assert_eq!(pick_adjacent_road_tile(&g, Some(&m), p), Some(TilePos::new(2, 3)));
        assert_eq!(pick_adjacent_road_tile(&g, None, TilePos::new(4, 0)), None);
        assert_eq!(pick_adjacent_road_tile(&g, None, TilePos::new(9, 9)), None);
    }

    #[test]
    fn path_to_edge() {
        let g = map("
            .....
            .###.
            ...#.
            ...#.
        ");
        let p = find_road_path_to_edge(&g, TilePos::new(1, 1)).unwrap();
        assert_eq!(p.steps(), 4);
        assert_eq!(p.goal(), Some(TilePos::new(3, 3)));
        assert!(p.is_contiguous());

        let p = find_road_path_to_edge(&g, TilePos::new(3, 3)).unwrap();
        assert_eq!(p.tiles, vec![TilePos::new(3, 3)]);

        assert!(find_road_path_to_edge(&island(), TilePos::new(1, 1)).is_none());
        assert!(find_road_path_to_edge(&g, TilePos::new(0, 0)).is_none());
    }
}

// ── A* ────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod astar {
    use tg_core::{Grid, TilePos};

    use super::helpers::{idx, map, random_roads, ring, road_indices};
    use crate::{
        FlowFieldConfig, FlowFieldInputs, RoadPathConfig, RoadPathMetric, build_road_flow_field,
        find_land_path_astar, find_road_path_astar, find_road_path_astar_ex, road_path_cost,
    };

    #[test]
    fn trivial_and_failed_queries() {
        let g = map("
            ##.#
        ");
        let a = TilePos::new(0, 0);
        assert_eq!(find_road_path_astar(&g, a, a).unwrap().tiles, vec![a]);
        assert!(find_road_path_astar(&g, a, TilePos::new(3, 0)).is_none());
        assert!(find_road_path_astar(&g, a, TilePos::new(2, 0)).is_none());
        assert!(find_road_path_astar(&g, a, TilePos::new(7, 0)).is_none());
    }

    #[test]
    fn steps_match_bfs_on_random_grids() {
        for seed in 20..30 {
            let g = random_roads(seed, 16, 16, 0.65);
            let roads = road_indices(&g);
            let goal = roads[roads.len() / 2];
            let f = build_road_flow_field(&g, &[goal], &FlowFieldConfig::default(), FlowFieldInputs::default());
            for &s in roads.iter().step_by(5) {
                let found = find_road_path_astar(&g, g.pos_of(s), g.pos_of(goal));
                match found {
                    Some(p) => {
                        assert_eq!(p.steps(), f.dist[s], "seed {seed} from {s}");
                        assert!(p.is_contiguous());
                        assert!(p.tiles.iter().all(|&t| g.is_road(t)));
                    }
                    None => assert_eq!(f.dist[s], -1),
                }
            }
        }
    }

    #[test]
    fn land_path_skirts_water() {
        let g = map("
            .....
            .~~~.
            .~~~.
            .....
        ");
        let p = find_land_path_astar(&g, TilePos::new(2, 0), TilePos::new(2, 3)).unwrap();
        assert_eq!(p.steps(), 7);
        assert!(p.tiles.iter().all(|&t| g.is_land(t)));
        assert!(find_land_path_astar(&g, TilePos::new(2, 1), TilePos::new(2, 3)).is_none());
    }

    #[test]
    fn travel_time_metric_avoids_extra_cost() {
        let g = ring();
        let mut extra = vec![0; g.tile_count()];
        extra[idx(&g, 2, 0)] = 10_000;
        let (s, t) = (TilePos::new(0, 0), TilePos::new(4, 0));

        let cfg = RoadPathConfig { extra_tile_cost_milli: Some(&extra), ..Default::default() };
        let by_steps = find_road_path_astar_ex(&g, s, t, &cfg).unwrap();
        assert_eq!(by_steps.steps(), 4);
        assert_eq!(by_steps.cost.travel_time_milli, 4_000);
        assert_eq!(by_steps.cost.extra_cost_milli, 10_000);

        let cfg = RoadPathConfig { metric: RoadPathMetric::TravelTime, ..cfg };
        let by_time = find_road_path_astar_ex(&g, s, t, &cfg).unwrap();
        assert_eq!(by_time.steps(), 10);
        assert_eq!(by_time.cost.travel_time_milli, 9_000);
        assert_eq!(by_time.cost.extra_cost_milli, 0);
        assert_eq!(by_time.cost.total_milli(), 9_000);
    }

    #[test]
    fn turn_penalty_prefers_single_turn() {
        let g = map("
            ###
            ###
            ###
        ");
        let cfg = RoadPathConfig {
            metric: RoadPathMetric::TravelTime,
            turn_penalty_milli: 500,
            ..Default::default()
        };
        let r = find_road_path_astar_ex(&g, TilePos::new(0, 0), TilePos::new(2, 2), &cfg).unwrap();
        assert_eq!(r.steps(), 4);
        assert_eq!(r.cost.travel_time_milli, 4_000);
        assert_eq!(r.cost.turn_penalty_milli, 500);

        let zigzag = [(0, 0), (1, 0), (1, 1), (2, 1), (2, 2)].map(TilePos::from);
        let c = road_path_cost(&g, &zigzag, None, 500);
        assert_eq!(c.turn_penalty_milli, 1_500);
        assert_eq!(c.total_milli(), 5_500);
    }

    #[test]
    fn bridge_costs_more_to_cross() {
        let g = map("#=#");
        let c = road_path_cost(&g, &[(0, 0), (1, 0), (2, 0)].map(TilePos::from), None, 0);
        assert_eq!(c.travel_time_milli, 1_150 + 1_000);
    }
}

// ── Road-build planning ───────────────────────────────────────────────────────

#[cfg(test)]
mod build {
    use tg_core::{Dir, Grid, TileGrid, TilePos};

    use super::helpers::{idx, map};
    use crate::{
        BlockedMoves, BuildCostModel, RoadBuildConfig, find_road_build_path,
        find_road_build_path_between_sets,
    };

    fn turns(tiles: &[TilePos]) -> usize {
        let dirs: Vec<_> = tiles.windows(2).map(|w| Dir::between(w[0], w[1])).collect();
        dirs.windows(2).filter(|d| d[0] != d[1]).count()
    }

    #[test]
    fn builds_across_empty_land() {
        let g = TileGrid::new(6, 3).unwrap();
        let cfg = RoadBuildConfig { cost_model: BuildCostModel::Money, ..Default::default() };
        let r = find_road_build_path(&g, TilePos::new(0, 1), TilePos::new(5, 1), &cfg).unwrap();
        assert_eq!(r.path.steps(), 5);
        assert_eq!(r.primary_cost, 6);
        assert!(r.path.tiles.iter().all(|t| t.y == 1));
    }

    #[test]
    fn reuses_existing_roads() {
        let g = map("
            ......
            .####.
            ......
        ");
        let (s, t) = (TilePos::new(0, 1), TilePos::new(5, 1));
        let r = find_road_build_path(&g, s, t, &RoadBuildConfig::default()).unwrap();
        assert_eq!(r.primary_cost, 2);

        let cfg = RoadBuildConfig { cost_model: BuildCostModel::Money, target_level: 3, ..Default::default() };
        let r = find_road_build_path(&g, s, t, &cfg).unwrap();
        assert_eq!(r.primary_cost, 6 + 4 * 5 + 6);
    }

    #[test]
    fn bridges_are_opt_in() {
        let g = map("
            ..~..
            ..~..
            ..~..
        ");
        let (s, t) = (TilePos::new(0, 1), TilePos::new(4, 1));
        assert!(find_road_build_path(&g, s, t, &RoadBuildConfig::default()).is_none());

        let cfg = RoadBuildConfig {
            allow_bridges: true,
            cost_model: BuildCostModel::Money,
            ..Default::default()
        };
        let r = find_road_build_path(&g, s, t, &cfg).unwrap();
        assert_eq!(r.path.steps(), 4);
        assert_eq!(r.primary_cost, 4 + 4);
    }

    #[test]
    fn zones_are_never_bulldozed() {
        let g = map("
            .R.
            .R.
            ...
        ");
        let r = find_road_build_path(&g, TilePos::new(0, 0), TilePos::new(2, 0), &RoadBuildConfig::default())
            .unwrap();
        assert_eq!(r.path.steps(), 6);
        assert!(find_road_build_path(&g, TilePos::new(1, 0), TilePos::new(2, 0), &RoadBuildConfig::default()).is_none());
    }

    #[test]
    fn ties_prefer_fewer_turns() {
        let g = TileGrid::new(4, 4).unwrap();
        let r = find_road_build_path(&g, TilePos::new(0, 0), TilePos::new(3, 3), &RoadBuildConfig::default())
            .unwrap();
        assert_eq!(r.primary_cost, 7);
        assert_eq!(turns(&r.path.tiles), 1);
    }

    #[test]
    fn slope_cost_detours_around_hills() {
        let mut g = TileGrid::new(3, 3).unwrap();
        g.tile_mut(TilePos::new(1, 1)).unwrap().height = 10.0;
        let (s, t) = (TilePos::new(0, 1), TilePos::new(2, 1));

        let flat = find_road_build_path(&g, s, t, &RoadBuildConfig::default()).unwrap();
        assert_eq!((flat.path.steps(), flat.primary_cost), (2, 3));

        let cfg = RoadBuildConfig { slope_cost: 1, ..Default::default() };
        let hilly = find_road_build_path(&g, s, t, &cfg).unwrap();
        assert_eq!((hilly.path.steps(), hilly.primary_cost), (4, 5));
        assert!(!hilly.path.tiles.contains(&TilePos::new(1, 1)));
    }

    #[test]
    fn trivial_query_prices_the_tile() {
        let g = TileGrid::new(2, 2).unwrap();
        let p = TilePos::new(1, 1);
        let r = find_road_build_path(&g, p, p, &RoadBuildConfig::default()).unwrap();
        assert_eq!(r.path.tiles, vec![p]);
        assert_eq!(r.primary_cost, 1);

        let g = TileGrid::from_ascii("#").unwrap();
        let p = TilePos::new(0, 0);
        let r = find_road_build_path(&g, p, p, &RoadBuildConfig::default()).unwrap();
        assert_eq!(r.primary_cost, 0);
    }

    #[test]
    fn set_to_set_picks_nearest_goal() {
        let g = TileGrid::new(5, 5).unwrap();
        let cfg = RoadBuildConfig::default();
        let goals = [TilePos::new(4, 4), TilePos::new(2, 0)];
        let r = find_road_build_path_between_sets(&g, &[TilePos::new(0, 0)], &goals, &cfg, None, None)
            .unwrap();
        assert_eq!(r.path.goal(), Some(TilePos::new(2, 0)));
        assert_eq!(r.primary_cost, 3);

        let starts = [TilePos::new(1, 1), TilePos::new(3, 3)];
        let r = find_road_build_path_between_sets(&g, &starts, &[TilePos::new(3, 3)], &cfg, None, None)
            .unwrap();
        assert_eq!(r.path.tiles, vec![TilePos::new(3, 3)]);
    }

    #[test]
    fn blocked_moves_and_budget() {
        let g = map("
            #####
            .....
        ");
        let mut blocked = BlockedMoves::default();
        let (a, b) = (idx(&g, 1, 0), idx(&g, 2, 0));
        blocked.insert((a, b));
        blocked.insert((b, a));
        let cfg = RoadBuildConfig::default();
        let (s, t) = ([TilePos::new(0, 0)], [TilePos::new(4, 0)]);

        let open = find_road_build_path_between_sets(&g, &s, &t, &cfg, None, None).unwrap();
        assert_eq!(open.primary_cost, 0);

        let r = find_road_build_path_between_sets(&g, &s, &t, &cfg, Some(&blocked), None).unwrap();
        assert_eq!(r.primary_cost, 2);
        assert!(r.path.is_contiguous());
        assert!(!r.path.tiles.windows(2).any(|w| {
            let (i, j) = (g.index_of(w[0]), g.index_of(w[1]));
            blocked.contains(&(i, j))
        }));

        assert!(find_road_build_path_between_sets(&g, &s, &t, &cfg, Some(&blocked), Some(1)).is_none());
        assert!(find_road_build_path_between_sets(&g, &s, &t, &cfg, Some(&blocked), Some(2)).is_some());
    }
}
