//! Integration tests for the full galaxy generation pipeline.
//!
//! Exercises: GalaxyGenerationConfig → spiral points → triangulation
//! → long-edge pruning → degree reduction → content → Navigator
//!
//! All tests are pure logic, with the catalog built in memory.

use std::collections::HashSet;

use stellarlight_logic::catalog::{Catalog, Color, PlanetType, StarType};
use stellarlight_logic::galaxy::Galaxy;
use stellarlight_logic::generation::{
    generate_galaxy, ConfigError, GalaxyGenerationConfig, GenerationError,
};
use stellarlight_logic::graph::NodeId;
use stellarlight_logic::pathfinding::Navigator;

// ── Helpers ────────────────────────────────────────────────────────────

const CATALOG_JSON: &str = r##"[
    {
        "resourceType": "StarType",
        "resources": [
            { "id": 1, "name": "Red Dwarf", "color": "#FF6040", "minSize": 0.3, "maxSize": 0.6,
              "chance": 6, "planetChance": 0.4, "minPlanets": 0, "maxPlanets": 4 },
            { "id": 2, "name": "Yellow Dwarf", "color": "#FFE080", "minSize": 0.8, "maxSize": 1.2,
              "chance": 3, "planetChance": 0.7, "minPlanets": 1, "maxPlanets": 8 },
            { "id": 3, "name": "Blue Giant", "color": "#80A0FF", "minSize": 4.0, "maxSize": 8.0,
              "chance": 1, "planetChance": 0.3, "minPlanets": 0, "maxPlanets": 3 }
        ]
    },
    {
        "resourceType": "PlanetType",
        "resources": [
            { "id": 1, "name": "Barren", "color": "#9A8878", "minSize": 0.1, "maxSize": 0.5,
              "chance": 4, "moonChance": 0.1, "maxMoons": 1 },
            { "id": 2, "name": "Gas Giant", "color": "#D0A060", "minSize": 3.0, "maxSize": 9.0,
              "chance": 2, "moonChance": 0.5, "maxMoons": 10 }
        ]
    }
]"##;

fn catalog() -> Catalog {
    Catalog::from_json_str(CATALOG_JSON).expect("test catalog parses")
}

fn config(seed: u64) -> GalaxyGenerationConfig {
    GalaxyGenerationConfig {
        name: "Test Galaxy".into(),
        num_star_systems: 120,
        seed,
        ..Default::default()
    }
}

fn generate(seed: u64) -> Galaxy {
    generate_galaxy(&config(seed), &catalog()).expect("galaxy generates")
}

// ── Graph properties ───────────────────────────────────────────────────

#[test]
fn generated_galaxy_is_connected() {
    for seed in [1, 2, 3] {
        let galaxy = generate(seed);
        assert_eq!(galaxy.len(), 120);
        assert!(galaxy.to_graph().is_connected(), "seed {} disconnected", seed);
    }
}

#[test]
fn no_self_loops_or_duplicate_hyperlanes() {
    let galaxy = generate(5);
    let mut seen = HashSet::new();
    for lane in &galaxy.hyperlanes {
        assert_ne!(lane.a, lane.b);
        assert!(seen.insert((lane.a, lane.b)), "duplicate lane {:?}", lane);
    }
}

#[test]
fn links_are_symmetric() {
    let galaxy = generate(6);
    for system in &galaxy.systems {
        for &other in &system.connected {
            assert!(
                galaxy.neighbors(other).contains(&system.id),
                "{} lists {} but not the reverse",
                system.id,
                other
            );
        }
    }
    let link_total: usize = galaxy.systems.iter().map(|s| s.connected.len()).sum();
    assert_eq!(link_total, galaxy.hyperlanes.len() * 2);
}

#[test]
fn over_cap_systems_are_blocked() {
    let cfg = GalaxyGenerationConfig {
        max_hyperlanes_per_system: 3,
        ..config(9)
    };
    let galaxy = generate_galaxy(&cfg, &catalog()).unwrap();
    let graph = galaxy.to_graph();
    for id in graph.node_ids() {
        if graph.degree(id) <= 3 {
            continue;
        }
        for lane in graph.edges().iter().filter(|e| e.touches(id)) {
            assert!(
                !graph.is_connected_without(lane),
                "{} still has a removable lane {:?}",
                id,
                lane
            );
        }
    }
}

#[test]
fn validate_reports_nothing() {
    let galaxy = generate(11);
    assert!(galaxy.validate().is_empty(), "{:?}", galaxy.validate());
}

// ── Determinism ────────────────────────────────────────────────────────

#[test]
fn same_seed_same_galaxy() {
    let a = generate(42);
    let b = generate(42);
    assert_eq!(a, b);
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
}

#[test]
fn different_seed_different_galaxy() {
    let a = generate(42);
    let b = generate(43);
    assert_ne!(a.systems, b.systems);
}

// ── Content ────────────────────────────────────────────────────────────

#[test]
fn every_system_has_a_catalog_star() {
    let catalog = catalog();
    let galaxy = generate(13);
    for system in &galaxy.systems {
        assert_eq!(system.stars.len(), 1);
        let star = &system.stars[0];
        let star_type = catalog.star_type(star.star_type).expect("known star type");
        assert_eq!(star.star_type_name, star_type.name);
        assert!(star.size >= star_type.min_size && star.size < star_type.max_size);
        assert!(star.planets.len() <= star_type.max_planets as usize);
        assert!(star.planets.len() >= star_type.min_planets as usize);
        for planet in &star.planets {
            let planet_type = catalog.planet_type(planet.planet_type).expect("known planet type");
            assert!(planet.moons <= planet_type.max_moons);
            assert!(planet.orbit_radius > star.size);
        }
    }
}

#[test]
fn catalog_colors_parse() {
    let catalog = catalog();
    assert_eq!(
        catalog.star_type(1).unwrap().color,
        Color::from_hex("#FF6040").unwrap()
    );
    assert_eq!(catalog.star_types().len(), 3);
    assert_eq!(catalog.planet_types().len(), 2);
}

#[test]
fn single_planet_type_catalog() {
    let catalog = Catalog::new(
        vec![StarType {
            id: 7,
            name: "Sun".into(),
            min_size: 1.0,
            max_size: 1.0,
            chance: 1.0,
            planet_chance: 1.0,
            min_planets: 3,
            max_planets: 3,
            ..Default::default()
        }],
        vec![PlanetType {
            id: 1,
            name: "Rock".into(),
            chance: 1.0,
            ..Default::default()
        }],
    );
    let galaxy = generate_galaxy(&config(3), &catalog).unwrap();
    for system in &galaxy.systems {
        let star = &system.stars[0];
        assert_eq!(star.size, 1.0);
        assert_eq!(star.planets.len(), 3);
        let radii: Vec<f64> = star.planets.iter().map(|p| p.orbit_radius).collect();
        assert_eq!(radii, vec![3.0, 4.0, 5.0]);
    }
    assert_eq!(galaxy.planet_count(), 360);
}

// ── Errors ─────────────────────────────────────────────────────────────

#[test]
fn unknown_shape_is_rejected() {
    let cfg = GalaxyGenerationConfig {
        shape: "elliptical".into(),
        ..config(1)
    };
    assert_eq!(
        generate_galaxy(&cfg, &catalog()),
        Err(GenerationError::UnknownShape("elliptical".into()))
    );
}

#[test]
fn invalid_density_is_rejected() {
    let cfg = GalaxyGenerationConfig {
        hyperlane_density: -0.25,
        ..config(1)
    };
    assert_eq!(
        generate_galaxy(&cfg, &catalog()),
        Err(GenerationError::InvalidConfig(vec![
            ConfigError::DensityOutOfRange(-0.25)
        ]))
    );
}

// ── Persistence ────────────────────────────────────────────────────────

#[test]
fn galaxy_survives_json_and_snapshot() {
    let galaxy = generate(21);
    let from_json = Galaxy::from_json(&galaxy.to_json().unwrap()).unwrap();
    assert_eq!(from_json, galaxy);
    let from_bytes = Galaxy::from_bytes(&galaxy.to_bytes().unwrap()).unwrap();
    assert_eq!(from_bytes, galaxy);
}

// ── Pathfinding on generated galaxies ──────────────────────────────────

#[test]
fn every_system_is_reachable() {
    let galaxy = generate(17);
    let navigator = Navigator::from_galaxy(&galaxy);
    let start = NodeId(0);
    for system in &galaxy.systems {
        let path = navigator
            .shortest_path(start, system.id)
            .unwrap_or_else(|| panic!("no path to {}", system.id));
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&system.id));
        for pair in path.windows(2) {
            assert!(galaxy.neighbors(pair[0]).contains(&pair[1]));
        }
    }
}

#[test]
fn route_cost_matches_walked_lanes() {
    let galaxy = generate(18);
    let navigator = Navigator::from_galaxy(&galaxy);
    let route = navigator.route(NodeId(3), NodeId(111)).unwrap();
    let walked: f64 = route
        .steps
        .windows(2)
        .map(|pair| {
            let a = galaxy.system(pair[0]).unwrap();
            let b = galaxy.system(pair[1]).unwrap();
            a.distance_squared(b)
        })
        .sum();
    assert!((walked - route.cost).abs() < 1e-9);
    assert_eq!(route.hops() + 1, route.steps.len());
}
