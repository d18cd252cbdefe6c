//! grid-tour — walks one synthetic city through every routing and analysis
//! entry point of the tilegrid workspace, printing a short report and
//! writing `output/grid-tour/summary.json`.

mod city;

use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

use anyhow::{Context, Result};
use serde_json::json;

use tg_analysis::{
    BypassConfig, CentralityConfig, EdgeWeightMode, TrafficConfig,
    aggregate_traffic_on_road_graph, compute_road_graph_centrality,
    compute_road_graph_resilience, suggest_road_resilience_bypasses,
};
use tg_core::{Grid, TilePos};
use tg_graph::{RoadRouteMetric, RoadRouter, RouteConfig};
use tg_pathing::{
    FlowFieldConfig, FlowFieldInputs, RoadBuildConfig, RoadPathConfig, RoadPathMetric,
    build_road_flow_field, find_road_build_path, find_road_path_astar, find_road_path_astar_ex,
    roads_connected_to_edge,
};

use city::build_city;

// ── Constants ─────────────────────────────────────────────────────────────────

const OUTPUT_DIR: &str = "output/grid-tour";
const VEHICLES_PER_TRIP: u16 = 12;
const TOP_N: usize = 5;

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== grid-tour — tilegrid routing core ===");

    // 1. City.
    let (grid, lm) = build_city()?;
    let roads = (0..grid.tile_count()).filter(|&i| grid.is_road(grid.pos_of(i))).count();
    println!("Grid: {}x{}  |  road tiles: {roads}", grid.width(), grid.height());

    // 2. Compressed graph, index and weights.
    let t0 = Instant::now();
    let router = RoadRouter::build(&grid);
    let graph = &router.graph;
    println!(
        "Road graph: {} nodes, {} edges, {} segments  ({:.2} ms)",
        graph.node_count(),
        graph.edge_count(),
        graph.total_length(),
        t0.elapsed().as_secs_f64() * 1e3,
    );

    // 3. Flow field from both depots.
    let road_to_edge = roads_connected_to_edge(&grid);
    let depots = [grid.index_of(lm.depot_west), grid.index_of(lm.depot_east)];
    let flow_cfg = FlowFieldConfig {
        require_outside_connection: true,
        compute_owner: true,
        use_travel_time: true,
    };
    let inputs = FlowFieldInputs { road_to_edge: Some(&road_to_edge), ..Default::default() };
    let field = build_road_flow_field(&grid, &depots, &flow_cfg, inputs);
    let served: Vec<usize> = (0..depots.len())
        .map(|d| field.owner.iter().filter(|&&o| o == d as i32).count())
        .collect();
    let school_hops = field.path_to_source(grid.index_of(lm.school)).len().saturating_sub(1);
    println!("Flow field: west depot serves {} tiles, east depot {}", served[0], served[1]);
    println!("  school -> nearest depot: {school_hops} steps");

    // 4. Point-to-point: grid A*, travel-time A*, and the graph router.
    let steps_path = find_road_path_astar(&grid, lm.school, lm.harbour)
        .context("school and harbour are not connected")?;
    let timed_cfg = RoadPathConfig {
        metric: RoadPathMetric::TravelTime,
        turn_penalty_milli: 200,
        ..Default::default()
    };
    let timed = find_road_path_astar_ex(&grid, lm.school, lm.harbour, &timed_cfg)
        .context("no travel-time path")?;
    let routed = router.route(&grid, lm.school, lm.harbour, &RouteConfig::default())?;
    let routed_steps = router.route(
        &grid,
        lm.school,
        lm.harbour,
        &RouteConfig { metric: RoadRouteMetric::Steps },
    )?;
    println!("School -> harbour:");
    println!("  grid A* (steps)       : {} steps", steps_path.steps());
    println!(
        "  grid A* (travel time) : {} steps, {} milli (turn penalty {})",
        timed.steps(),
        timed.cost.total_milli(),
        timed.cost.turn_penalty_milli,
    );
    println!("  graph route (time)    : {} steps, {} milli", routed.steps, routed.cost_milli);
    println!(
        "  graph route (steps)   : {} steps, {} milli",
        routed_steps.steps, routed_steps.cost_milli,
    );

    let locator = graph.locator();
    if let Some(node) = locator.nearest(lm.plot) {
        println!("Nearest junction to the empty plot: {}", graph.nodes[node.index()].pos);
    }

    // 5. Centrality.
    let t0 = Instant::now();
    let centrality_cfg =
        CentralityConfig { weight_mode: EdgeWeightMode::TravelTimeMilli, ..Default::default() };
    let centrality = compute_road_graph_centrality(graph, &centrality_cfg, Some(&grid));
    let mut busiest: Vec<usize> = (0..centrality.edges).collect();
    busiest.sort_by(|&a, &b| {
        centrality.edge_betweenness[b].total_cmp(&centrality.edge_betweenness[a]).then(a.cmp(&b))
    });
    println!(
        "Centrality over {} sources ({:.2} ms):",
        centrality.sources_used,
        t0.elapsed().as_secs_f64() * 1e3,
    );
    for &e in busiest.iter().take(TOP_N) {
        let edge = &graph.edges[e];
        println!(
            "  edge {e:>3}  {} -> {}  betweenness {:.2}",
            graph.nodes[edge.a.index()].pos,
            graph.nodes[edge.b.index()].pos,
            centrality.edge_betweenness_norm[e],
        );
    }

    // 6. Traffic: replay a handful of trips and fold the counts onto the graph.
    let trips = [
        (lm.depot_west, lm.market),
        (lm.depot_east, lm.school),
        (lm.harbour, lm.market),
        (lm.school, lm.depot_east),
        (lm.market, lm.depot_west),
    ];
    let mut traffic = vec![0u16; grid.tile_count()];
    for &(from, to) in &trips {
        let route = router.route(&grid, from, to, &RouteConfig::default())?;
        for p in route.path {
            let t = &mut traffic[grid.index_of(p)];
            *t = t.saturating_add(VEHICLES_PER_TRIP);
        }
    }
    let traffic_cfg = TrafficConfig { base_tile_capacity: 20, ..Default::default() };
    let load = aggregate_traffic_on_road_graph(&grid, graph, &traffic, &traffic_cfg);
    println!("Traffic from {} trips:", trips.len());
    for &e in load.most_congested_edges().iter().take(TOP_N) {
        let s = &load.edges[e];
        println!(
            "  edge {e:>3}  interior traffic {:>4}  max util {:.2}  congested tiles {}",
            s.interior.sum_traffic, s.interior.max_util, s.interior.congested_tiles,
        );
    }

    // 7. Resilience and bypasses for the busiest bridges.
    let resilience = compute_road_graph_resilience(graph);
    println!(
        "Resilience: {} components, {} bridges, {} articulation nodes",
        resilience.component_count(),
        resilience.bridge_edges.len(),
        resilience.articulation_nodes.len(),
    );
    let bypass_cfg = BypassConfig { top: 3, ..Default::default() };
    let bypasses = suggest_road_resilience_bypasses(
        &grid,
        graph,
        &resilience,
        &bypass_cfg,
        Some(&traffic[..]),
    );
    for s in &bypasses {
        let edge = &graph.edges[s.bridge_edge.index()];
        println!(
            "  bridge {} -> {}  traffic {:>3}  cuts off {} node(s)  bypass: {} new tiles, {} money",
            graph.nodes[edge.a.index()].pos,
            graph.nodes[edge.b.index()].pos,
            s.max_traffic,
            s.cut_size,
            s.new_tiles,
            s.money_cost,
        );
    }

    // 8. Road-build plan from the empty plot to the nearest avenue.
    let target = TilePos::new(14, lm.plot.y);
    let plan = find_road_build_path(&grid, lm.plot, target, &RoadBuildConfig::default())
        .context("plot cannot be connected")?;
    println!("Build plan: plot -> avenue costs {} new tiles", plan.primary_cost);

    // 9. Summary JSON.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let path = format!("{OUTPUT_DIR}/summary.json");
    let summary = json!({
        "grid": { "width": grid.width(), "height": grid.height(), "road_tiles": roads },
        "graph": { "nodes": graph.node_count(), "edges": graph.edge_count() },
        "flow_field": { "served": served, "school_steps": school_hops },
        "route": routed,
        "centrality": centrality,
        "traffic": load,
        "resilience": resilience,
        "bypasses": bypasses,
        "build_plan": plan,
    });
    serde_json::to_writer_pretty(BufWriter::new(File::create(&path)?), &summary)?;
    println!();
    println!("Wrote {path}");

    Ok(())
}
