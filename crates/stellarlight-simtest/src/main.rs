//! Stellarlight Headless Generation Harness
//!
//! Generates galaxies from the bundled catalog and checks the structural
//! guarantees of the pipeline and the route planner. Runs entirely
//! in-process, with no server and no rendering.
//!
//! Usage:
//!   cargo run -p stellarlight-simtest
//!   cargo run -p stellarlight-simtest -- --verbose
//!   cargo run -p stellarlight-simtest -- --seed 7 --systems 400 --out galaxy.json

use std::collections::HashSet;

use serde::Serialize;
use stellarlight_logic::catalog::Catalog;
use stellarlight_logic::galaxy::Galaxy;
use stellarlight_logic::generation::{
    generate_galaxy, validate_config, ConfigError, GalaxyGenerationConfig, GenerationError,
};
use stellarlight_logic::geometry::{Bounds, Point};
use stellarlight_logic::graph::{Graph, NodeId};
use stellarlight_logic::pathfinding::Navigator;

// ── Bundled catalog (same asset format the game loads) ──────────────────
const CATALOG_JSON: &str = include_str!("../../../data/catalog.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    seed: u64,
    systems: usize,
    out: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GalaxyReport<'a> {
    config: &'a GalaxyGenerationConfig,
    hyperlane_count: usize,
    planet_count: usize,
    max_degree: usize,
    galaxy: &'a Galaxy,
}

fn main() {
    let options = match parse_args(std::env::args().skip(1)) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };
    let verbose = options.verbose;
    println!("=== Stellarlight Generation Harness ===\n");

    let mut results = Vec::new();

    // 1. Catalog
    let catalog = match Catalog::from_json_str(CATALOG_JSON) {
        Ok(c) => c,
        Err(e) => {
            println!("  ✗ catalog_parse: {}", e);
            std::process::exit(1);
        }
    };
    results.extend(validate_catalog(&catalog, verbose));

    // 2. Config validation
    results.extend(validate_configs(&catalog, verbose));

    // 3. Generated graph properties over several seeds
    let mut primary = None;
    for offset in 0..3 {
        let config = GalaxyGenerationConfig {
            name: format!("Harness {}", options.seed + offset),
            num_star_systems: options.systems,
            seed: options.seed + offset,
            ..Default::default()
        };
        let (galaxy, checks) = validate_generation(&config, &catalog, verbose);
        results.extend(checks);
        if offset == 0 {
            primary = galaxy.map(|g| (config, g));
        }
    }

    if let Some((config, galaxy)) = &primary {
        // 4. Determinism
        results.extend(validate_determinism(config, &catalog, galaxy));

        // 5. Routing on the generated galaxy
        results.extend(validate_galaxy_routes(galaxy, verbose));

        // 6. Persistence
        results.extend(validate_persistence(galaxy));

        if let Some(path) = &options.out {
            results.push(write_report(path, config, galaxy));
        }
    }

    // 7. Routing on a synthetic graph
    results.extend(validate_synthetic_routes());

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options {
        verbose: false,
        seed: 1,
        systems: 300,
        out: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" | "-v" => options.verbose = true,
            "--seed" => {
                let value = args.next().ok_or("--seed needs a value")?;
                options.seed = value
                    .parse()
                    .map_err(|e| format!("bad --seed {:?}: {}", value, e))?;
            }
            "--systems" => {
                let value = args.next().ok_or("--systems needs a value")?;
                options.systems = value
                    .parse()
                    .map_err(|e| format!("bad --systems {:?}: {}", value, e))?;
            }
            "--out" => options.out = Some(args.next().ok_or("--out needs a path")?),
            other => return Err(format!("unknown argument {:?}", other)),
        }
    }
    Ok(options)
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(catalog: &Catalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Catalog ---");
    let mut results = Vec::new();
    let stars = catalog.star_types();
    let planets = catalog.planet_types();

    results.push(TestResult {
        name: "catalog_not_empty".into(),
        passed: !stars.is_empty() && !planets.is_empty(),
        detail: format!("{} star types, {} planet types", stars.len(), planets.len()),
    });

    let bad_star_sizes: Vec<_> = stars
        .iter()
        .filter(|s| s.min_size >= s.max_size)
        .map(|s| s.name.as_str())
        .collect();
    let bad_planet_sizes: Vec<_> = planets
        .iter()
        .filter(|p| p.min_size >= p.max_size)
        .map(|p| p.name.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_size_ranges".into(),
        passed: bad_star_sizes.is_empty() && bad_planet_sizes.is_empty(),
        detail: if bad_star_sizes.is_empty() && bad_planet_sizes.is_empty() {
            "all size ranges are non-empty".into()
        } else {
            format!("invalid ranges: {:?} {:?}", bad_star_sizes, bad_planet_sizes)
        },
    });

    let bad_planet_counts: Vec<_> = stars
        .iter()
        .filter(|s| s.min_planets > s.max_planets)
        .map(|s| s.name.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_planet_counts".into(),
        passed: bad_planet_counts.is_empty(),
        detail: format!("{} star types with minPlanets > maxPlanets", bad_planet_counts.len()),
    });

    let weighted = stars.iter().filter(|s| s.chance > 0.0).count();
    results.push(TestResult {
        name: "catalog_star_weights".into(),
        passed: weighted > 0,
        detail: format!("{}/{} star types can be drawn", weighted, stars.len()),
    });

    if verbose {
        for s in &stars {
            println!(
                "    star {:>2} {:<14} {} size {:.2}-{:.2} weight {}",
                s.id,
                s.name,
                s.color.to_hex(),
                s.min_size,
                s.max_size,
                s.chance
            );
        }
    }

    results
}

// ── 2. Config validation ────────────────────────────────────────────────

fn validate_configs(catalog: &Catalog, _verbose: bool) -> Vec<TestResult> {
    println!("--- Config Validation ---");
    let mut results = Vec::new();

    let default_errors = validate_config(&GalaxyGenerationConfig::default(), catalog);
    results.push(TestResult {
        name: "config_default_valid".into(),
        passed: default_errors.is_empty(),
        detail: format!("{} errors on default config", default_errors.len()),
    });

    let broken = GalaxyGenerationConfig {
        num_star_systems: 0,
        hyperlane_density: 2.0,
        max_hyperlanes_per_system: 0,
        ..Default::default()
    };
    let errors = validate_config(&broken, catalog);
    results.push(TestResult {
        name: "config_errors_collected".into(),
        passed: errors.contains(&ConfigError::NoStarSystems)
            && errors.contains(&ConfigError::DensityOutOfRange(2.0))
            && errors.contains(&ConfigError::MaxDegreeTooLow(0)),
        detail: format!("{} errors reported", errors.len()),
    });

    let unknown = GalaxyGenerationConfig {
        shape: "ring".into(),
        ..Default::default()
    };
    let result = generate_galaxy(&unknown, catalog);
    results.push(TestResult {
        name: "config_unknown_shape".into(),
        passed: matches!(result, Err(GenerationError::UnknownShape(_))),
        detail: "shape \"ring\" is rejected".into(),
    });

    let result = generate_galaxy(&GalaxyGenerationConfig::default(), &Catalog::default());
    results.push(TestResult {
        name: "config_empty_catalog".into(),
        passed: matches!(result, Err(GenerationError::InvalidConfig(_))),
        detail: "empty catalog is rejected".into(),
    });

    results
}

// ── 3. Generation ───────────────────────────────────────────────────────

fn validate_generation(
    config: &GalaxyGenerationConfig,
    catalog: &Catalog,
    verbose: bool,
) -> (Option<Galaxy>, Vec<TestResult>) {
    println!("--- Generation (seed {}) ---", config.seed);
    let mut results = Vec::new();
    let tag = |name: &str| format!("seed{}_{}", config.seed, name);

    let galaxy = match generate_galaxy(config, catalog) {
        Ok(g) => g,
        Err(e) => {
            results.push(TestResult {
                name: tag("generate"),
                passed: false,
                detail: e.to_string(),
            });
            return (None, results);
        }
    };
    let graph = galaxy.to_graph();

    results.push(TestResult {
        name: tag("system_count"),
        passed: galaxy.len() == config.num_star_systems,
        detail: format!("{}/{} systems", galaxy.len(), config.num_star_systems),
    });

    results.push(TestResult {
        name: tag("connected"),
        passed: graph.is_connected(),
        detail: format!("{} hyperlanes", graph.edge_count()),
    });

    let mut seen = HashSet::new();
    let bad_lanes = galaxy
        .hyperlanes
        .iter()
        .filter(|l| l.a == l.b || !seen.insert((l.a, l.b)))
        .count();
    results.push(TestResult {
        name: tag("no_self_loops_or_duplicates"),
        passed: bad_lanes == 0,
        detail: format!("{} bad hyperlanes", bad_lanes),
    });

    let asymmetric = galaxy
        .systems
        .iter()
        .flat_map(|s| s.connected.iter().map(move |&o| (s.id, o)))
        .filter(|&(a, b)| !galaxy.neighbors(b).contains(&a))
        .count();
    results.push(TestResult {
        name: tag("links_symmetric"),
        passed: asymmetric == 0,
        detail: format!("{} one-way links", asymmetric),
    });

    let removable = removable_over_cap_lanes(&graph, config.max_hyperlanes_per_system);
    let over_cap = graph
        .node_ids()
        .filter(|&n| graph.degree(n) > config.max_hyperlanes_per_system)
        .count();
    results.push(TestResult {
        name: tag("degree_cap"),
        passed: removable == 0,
        detail: format!(
            "max degree {}, {} systems over cap {} (all blocked: {})",
            graph.max_degree(),
            over_cap,
            config.max_hyperlanes_per_system,
            removable == 0
        ),
    });

    let issues = galaxy.validate();
    results.push(TestResult {
        name: tag("validate"),
        passed: issues.is_empty(),
        detail: match issues.first() {
            None => "no validation issues".into(),
            Some(first) => format!("{} issues, first: {}", issues.len(), first.message),
        },
    });

    if verbose {
        let points: Vec<Point> = galaxy.systems.iter().map(|s| s.location()).collect();
        if let Some(bounds) = Bounds::of(&points) {
            println!(
                "    extent {:.2} x {:.2}, {} planets",
                bounds.width(),
                bounds.height(),
                galaxy.planet_count()
            );
        }
    }

    (Some(galaxy), results)
}

/// Lanes at an over-cap system that could still be removed without
/// disconnecting the graph.
fn removable_over_cap_lanes(graph: &Graph, cap: usize) -> usize {
    graph
        .edges()
        .iter()
        .filter(|e| graph.degree(e.a) > cap || graph.degree(e.b) > cap)
        .filter(|e| graph.degree(e.a) > 1 && graph.degree(e.b) > 1)
        .filter(|e| graph.is_connected_without(e))
        .count()
}

// ── 4. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(
    config: &GalaxyGenerationConfig,
    catalog: &Catalog,
    galaxy: &Galaxy,
) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let again = generate_galaxy(config, catalog);
    vec![TestResult {
        name: "same_seed_same_galaxy".into(),
        passed: again.as_ref().map(|g| g == galaxy).unwrap_or(false),
        detail: format!("seed {} regenerated", config.seed),
    }]
}

// ── 5. Routing on the generated galaxy ──────────────────────────────────

fn validate_galaxy_routes(galaxy: &Galaxy, verbose: bool) -> Vec<TestResult> {
    println!("--- Routing (generated) ---");
    let mut results = Vec::new();
    let navigator = Navigator::from_galaxy(galaxy);
    let n = galaxy.len();
    if n < 2 {
        return results;
    }

    let start = NodeId(0);
    let unreachable = galaxy
        .systems
        .iter()
        .filter(|s| navigator.shortest_path(start, s.id).is_none())
        .count();
    results.push(TestResult {
        name: "route_all_reachable".into(),
        passed: unreachable == 0,
        detail: format!("{} of {} systems unreachable from {}", unreachable, n, start),
    });

    let goal = NodeId::from(n - 1);
    let route = navigator.route(start, goal);
    let expected = navigator.graph().dijkstra(start)[goal.index()];
    let consistent = route
        .as_ref()
        .map(|r| {
            navigator.path_cost(&r.steps) == Some(r.cost)
                && (r.cost - expected).abs() < 1e-9
                && r.steps.first() == Some(&start)
                && r.steps.last() == Some(&goal)
        })
        .unwrap_or(false);
    results.push(TestResult {
        name: "route_optimal".into(),
        passed: consistent,
        detail: match &route {
            Some(r) => format!("{} → {}: {} hops, cost {:.4}", start, goal, r.hops(), r.cost),
            None => format!("{} → {}: no route", start, goal),
        },
    });

    if verbose {
        if let Some(r) = &route {
            let names: Vec<&str> = r
                .steps
                .iter()
                .filter_map(|&id| galaxy.system(id).map(|s| s.name.as_str()))
                .collect();
            println!("    {}", names.join(" → "));
        }
    }

    results
}

// ── 6. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(galaxy: &Galaxy) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let json = galaxy.to_json().and_then(|j| Galaxy::from_json(&j));
    results.push(TestResult {
        name: "persist_json".into(),
        passed: json.as_ref().map(|g| g == galaxy).unwrap_or(false),
        detail: match &json {
            Ok(_) => "JSON round trip".into(),
            Err(e) => e.to_string(),
        },
    });

    let bytes = galaxy.to_bytes();
    let size = bytes.as_ref().map(|b| b.len()).unwrap_or(0);
    let restored = bytes.and_then(|b| Galaxy::from_bytes(&b));
    results.push(TestResult {
        name: "persist_snapshot".into(),
        passed: restored.as_ref().map(|g| g == galaxy).unwrap_or(false),
        detail: match &restored {
            Ok(_) => format!("{} byte snapshot", size),
            Err(e) => e.to_string(),
        },
    });

    results
}

fn write_report(path: &str, config: &GalaxyGenerationConfig, galaxy: &Galaxy) -> TestResult {
    let report = GalaxyReport {
        config,
        hyperlane_count: galaxy.hyperlanes.len(),
        planet_count: galaxy.planet_count(),
        max_degree: galaxy.to_graph().max_degree(),
        galaxy,
    };
    let written = serde_json::to_string_pretty(&report)
        .map_err(|e| e.to_string())
        .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
    TestResult {
        name: "write_report".into(),
        passed: written.is_ok(),
        detail: match written {
            Ok(()) => format!("wrote {}", path),
            Err(e) => format!("{}: {}", path, e),
        },
    }
}

// ── 7. Routing on a synthetic graph ─────────────────────────────────────

fn validate_synthetic_routes() -> Vec<TestResult> {
    println!("--- Routing (synthetic) ---");
    let mut results = Vec::new();

    // Unit square, perimeter only.
    let points = vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ];
    let square = Graph::new(
        points.clone(),
        [(0, 1), (1, 2), (2, 3), (3, 0)].map(|(a, b)| (NodeId(a), NodeId(b))),
    );
    let navigator = Navigator::from_graph(&square);

    let route = navigator.route(NodeId(0), NodeId(2));
    results.push(TestResult {
        name: "route_square_diagonal".into(),
        passed: route
            .as_ref()
            .map(|r| r.steps.len() == 3 && (r.cost - 2.0).abs() < 1e-12)
            .unwrap_or(false),
        detail: "(0,0) → (1,1) = 2 hops, cost 2".into(),
    });

    let same = navigator.shortest_path(NodeId(1), NodeId(1));
    results.push(TestResult {
        name: "route_same_system".into(),
        passed: same == Some(vec![NodeId(1)]),
        detail: "start == goal → [start]".into(),
    });

    let split = Graph::new(points, [(NodeId(0), NodeId(1)), (NodeId(2), NodeId(3))]);
    let navigator = Navigator::from_graph(&split);
    results.push(TestResult {
        name: "route_unreachable".into(),
        passed: navigator.shortest_path(NodeId(0), NodeId(3)).is_none(),
        detail: "disjoint components → no route".into(),
    });

    results
}
