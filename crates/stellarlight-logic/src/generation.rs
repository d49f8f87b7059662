//! Galaxy generation pipeline.
//!
//! ```text
//! config ─► spiral points ─► Delaunay graph ─► long-edge pruning ─► degree reduction
//!                ▲                                    │
//!                └──────── retry on failure ──────────┘
//!                                                     ▼
//!                                  star/planet content ─► Galaxy
//! ```
//!
//! Every attempt owns its own points and graph; a failed attempt is thrown
//! away whole. All randomness comes from one `ChaCha8Rng` seeded from
//! `GalaxyGenerationConfig::seed`, so a seed always yields the same galaxy
//! for the same catalog.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, PlanetType, StarType};
use crate::chance::{random_range, roll, weighted_choice};
use crate::galaxy::{Galaxy, Planet, Star, StarSystem, SystemId};
use crate::geometry::Point;
use crate::graph::Graph;
use crate::names::{generate_system_name, planet_name};
use crate::pruning::{reduce_high_degree, remove_long_edges, ReductionReport};
use crate::shape::{generate_points, GalaxyShape, SpiralParams};
use crate::triangulation::build_graph;

/// Long-edge threshold numerator: `max_length = FACTOR / sqrt(N)` at
/// density 0.5.
pub const EDGE_LENGTH_FACTOR: f64 = 4.0;

/// Largest galaxy the generator accepts. Node ids are `u32`, and routing
/// keeps an N×N distance table.
pub const MAX_STAR_SYSTEMS: usize = 100_000;

/// Default number of full pipeline attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// User-facing generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GalaxyGenerationConfig {
    pub name: String,
    /// Number of star systems to generate.
    pub num_star_systems: usize,
    /// Shape name, e.g. `"spiral"`.
    pub shape: String,
    /// 0.0 (sparse, short lanes only) to 1.0 (keep long lanes).
    pub hyperlane_density: f64,
    /// Soft cap on hyperlanes per system.
    pub max_hyperlanes_per_system: usize,
    pub seed: u64,
    pub spiral: SpiralParams,
    pub max_attempts: usize,
}

impl Default for GalaxyGenerationConfig {
    fn default() -> Self {
        Self {
            name: "Generated Galaxy".to_string(),
            num_star_systems: 200,
            shape: GalaxyShape::Spiral.name().to_string(),
            hyperlane_density: 0.5,
            max_hyperlanes_per_system: 5,
            seed: 0,
            spiral: SpiralParams::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("galaxy has no star systems")]
    NoStarSystems,
    /// Triangulation needs at least three systems.
    #[error("need at least 3 star systems, got {0}")]
    TooFewSystems(usize),
    #[error("too many star systems: {0} (limit {max})", max = MAX_STAR_SYSTEMS)]
    TooManySystems(usize),
    #[error("hyperlane density {0} is outside 0.0..=1.0")]
    DensityOutOfRange(f64),
    #[error("max hyperlanes per system must be at least 2, got {0}")]
    MaxDegreeTooLow(usize),
    #[error("unknown galaxy shape: {0}")]
    UnknownShape(String),
    #[error("star type catalog is empty")]
    EmptyStarCatalog,
    #[error("max attempts must be positive")]
    NoAttempts,
    #[error("spiral parameter {name} = {value} is out of range")]
    SpiralParamOutOfRange { name: &'static str, value: f64 },
}

/// Why a single pipeline attempt was thrown away.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttemptFailure {
    #[error("point sampler produced {generated} of {requested} points")]
    InsufficientPoints { requested: usize, generated: usize },
    #[error("graph disconnected after long-edge pruning")]
    DisconnectedAfterPruning,
}

/// Terminal generation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("unknown galaxy shape: {0}")]
    UnknownShape(String),
    #[error("invalid galaxy config: {0:?}")]
    InvalidConfig(Vec<ConfigError>),
    #[error("failed to generate galaxy after {attempts} attempts (last: {last})")]
    GenerationFailure {
        attempts: usize,
        last: AttemptFailure,
    },
}

/// Validate a generation config against a catalog, returning all errors found.
pub fn validate_config(config: &GalaxyGenerationConfig, catalog: &Catalog) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.num_star_systems == 0 {
        errors.push(ConfigError::NoStarSystems);
    } else if config.num_star_systems < 3 {
        errors.push(ConfigError::TooFewSystems(config.num_star_systems));
    } else if config.num_star_systems > MAX_STAR_SYSTEMS {
        errors.push(ConfigError::TooManySystems(config.num_star_systems));
    }
    if !(0.0..=1.0).contains(&config.hyperlane_density) {
        errors.push(ConfigError::DensityOutOfRange(config.hyperlane_density));
    }
    if config.max_hyperlanes_per_system < 2 {
        errors.push(ConfigError::MaxDegreeTooLow(config.max_hyperlanes_per_system));
    }
    if config.shape.parse::<GalaxyShape>().is_err() {
        errors.push(ConfigError::UnknownShape(config.shape.clone()));
    }
    if catalog.star_types().is_empty() {
        errors.push(ConfigError::EmptyStarCatalog);
    }
    if config.max_attempts == 0 {
        errors.push(ConfigError::NoAttempts);
    }
    errors.extend(validate_spiral(&config.spiral));

    errors
}

fn validate_spiral(params: &SpiralParams) -> Vec<ConfigError> {
    let non_negative = |v: f64| v.is_finite() && v >= 0.0;
    let checks = [
        ("coreRadius", params.core_radius, non_negative(params.core_radius)),
        ("minDistance", params.min_distance, non_negative(params.min_distance)),
        (
            "interarmChance",
            params.interarm_chance,
            (0.0..=1.0).contains(&params.interarm_chance),
        ),
        ("armSpread", params.arm_spread, params.arm_spread.is_finite()),
        ("twist", params.twist, params.twist.is_finite()),
    ];
    checks
        .into_iter()
        .filter(|&(_, _, ok)| !ok)
        .map(|(name, value, _)| ConfigError::SpiralParamOutOfRange { name, value })
        .collect()
}

/// Longest hyperlane kept unconditionally for `count` systems.
///
/// More systems pack the same area tighter, so the threshold shrinks with
/// `sqrt(count)`. Density scales it by `0.5 + density`.
pub fn max_edge_length(count: usize, density: f64) -> f64 {
    let count = count.max(1) as f64;
    EDGE_LENGTH_FACTOR / count.sqrt() * (0.5 + density.clamp(0.0, 1.0))
}

/// Settings for the graph half of the pipeline.
#[derive(Debug, Clone)]
pub struct GraphGenerationConfig {
    pub shape: GalaxyShape,
    pub num_points: usize,
    pub max_edge_length: f64,
    pub max_degree: usize,
    pub spiral: SpiralParams,
    pub max_attempts: usize,
}

/// Accepted hyperlane graph plus what the degree pass could not fix.
#[derive(Debug, Clone)]
pub struct HyperlaneGraph {
    pub graph: Graph,
    pub reduction: ReductionReport,
    /// 1-based attempt that succeeded.
    pub attempts: usize,
}

/// Run the sample → triangulate → prune loop until an attempt succeeds.
pub fn generate_hyperlane_graph(
    config: &GraphGenerationConfig,
    rng: &mut impl Rng,
) -> Result<HyperlaneGraph, GenerationError> {
    let mut last = AttemptFailure::InsufficientPoints {
        requested: config.num_points,
        generated: 0,
    };

    for attempt in 1..=config.max_attempts {
        match run_attempt(config, rng) {
            Ok(mut graph) => {
                let reduction = reduce_high_degree(&mut graph, config.max_degree);
                return Ok(HyperlaneGraph {
                    graph,
                    reduction,
                    attempts: attempt,
                });
            }
            Err(failure) => {
                log::debug!("Galaxy attempt {} failed: {}", attempt, failure);
                last = failure;
            }
        }
    }

    Err(GenerationError::GenerationFailure {
        attempts: config.max_attempts,
        last,
    })
}

fn run_attempt(config: &GraphGenerationConfig, rng: &mut impl Rng) -> Result<Graph, AttemptFailure> {
    let points = generate_points(config.shape, config.num_points, &config.spiral, rng);
    if points.len() < config.num_points {
        return Err(AttemptFailure::InsufficientPoints {
            requested: config.num_points,
            generated: points.len(),
        });
    }

    let mut graph = build_graph(&points);
    let removed = remove_long_edges(&mut graph, config.max_edge_length);
    if !graph.is_connected() {
        return Err(AttemptFailure::DisconnectedAfterPruning);
    }
    log::debug!(
        "Removed {} long hyperlanes, {} remain",
        removed,
        graph.edge_count()
    );
    Ok(graph)
}

/// Fills generated systems with stars and planets from a catalog.
pub struct GalaxyBuilder<'a> {
    catalog: &'a Catalog,
    star_types: Vec<&'a StarType>,
    planet_types: Vec<&'a PlanetType>,
}

impl<'a> GalaxyBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            star_types: catalog.star_types(),
            planet_types: catalog.planet_types(),
        }
    }

    /// Generate a complete galaxy.
    pub fn generate_galaxy(
        &self,
        config: &GalaxyGenerationConfig,
    ) -> Result<Galaxy, GenerationError> {
        let shape: GalaxyShape = config
            .shape
            .parse()
            .map_err(GenerationError::UnknownShape)?;
        let errors = validate_config(config, self.catalog);
        if !errors.is_empty() {
            return Err(GenerationError::InvalidConfig(errors));
        }

        log::info!(
            "Generating galaxy '{}': {} systems, shape {}, density {:.2}, max {} lanes/system, seed {}",
            config.name,
            config.num_star_systems,
            shape.name(),
            config.hyperlane_density,
            config.max_hyperlanes_per_system,
            config.seed
        );

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let graph_config = GraphGenerationConfig {
            shape,
            num_points: config.num_star_systems,
            max_edge_length: max_edge_length(config.num_star_systems, config.hyperlane_density),
            max_degree: config.max_hyperlanes_per_system,
            spiral: config.spiral.clone(),
            max_attempts: config.max_attempts,
        };
        let accepted = generate_hyperlane_graph(&graph_config, &mut rng)?;
        let graph = accepted.graph;

        let systems: Vec<StarSystem> = graph
            .node_ids()
            .map(|id| {
                let mut system = self.generate_star_system(id, graph.point(id), &mut rng);
                system.connected = graph.neighbors(id).collect();
                system
            })
            .collect();
        let mut hyperlanes = graph.edges().to_vec();
        hyperlanes.sort();

        let galaxy = Galaxy {
            name: config.name.clone(),
            seed: config.seed,
            systems,
            hyperlanes,
        };

        log::info!(
            "Galaxy '{}' generated in {} attempt(s): {} systems, {} hyperlanes, {} planets, {} over lane cap",
            galaxy.name,
            accepted.attempts,
            galaxy.len(),
            galaxy.hyperlanes.len(),
            galaxy.planet_count(),
            accepted.reduction.over_cap.len()
        );

        Ok(galaxy)
    }

    /// A named system at `location` with one star drawn from the catalog.
    pub fn generate_star_system(
        &self,
        id: SystemId,
        location: Point,
        rng: &mut impl Rng,
    ) -> StarSystem {
        let name = generate_system_name(rng);
        let stars = weighted_choice(&self.star_types, rng)
            .map(|star_type| vec![self.generate_star(&name, star_type, rng)])
            .unwrap_or_default();

        StarSystem {
            id,
            name,
            x: location.x,
            y: location.y,
            connected: Vec::new(),
            stars,
        }
    }

    /// A star of `star_type` with its planets.
    ///
    /// Slots below `min_planets` are always filled. Past that, each slot is
    /// filled with `planet_chance`, and the first miss ends the system.
    pub fn generate_star(&self, name: &str, star_type: &StarType, rng: &mut impl Rng) -> Star {
        let mut star = Star {
            name: name.to_string(),
            star_type: star_type.id,
            star_type_name: star_type.name.clone(),
            size: random_range(rng, star_type.min_size, star_type.max_size),
            planets: Vec::new(),
        };

        for slot in 0..star_type.max_planets {
            if slot >= star_type.min_planets && !roll(rng, star_type.planet_chance) {
                break;
            }
            let Some(planet_type) = weighted_choice(&self.planet_types, rng) else {
                break;
            };
            let planet = generate_planet(&star, slot + 1, planet_type, rng);
            star.planets.push(planet);
        }

        star
    }
}

/// Planet number `orbit` (1-based) around `star`.
pub fn generate_planet(
    star: &Star,
    orbit: u32,
    planet_type: &PlanetType,
    rng: &mut impl Rng,
) -> Planet {
    let moons = (0..planet_type.max_moons)
        .filter(|_| roll(rng, planet_type.moon_chance))
        .count() as u32;

    Planet {
        name: planet_name(&star.name, orbit),
        planet_type: planet_type.id,
        planet_type_name: planet_type.name.clone(),
        size: random_range(rng, planet_type.min_size, planet_type.max_size),
        orbit_radius: star.size + (orbit + 1) as f64 * star.size,
        angle: rng.gen::<f64>() * 360.0,
        moons,
    }
}

/// Generate a galaxy from `config` using the star and planet types in `catalog`.
pub fn generate_galaxy(
    config: &GalaxyGenerationConfig,
    catalog: &Catalog,
) -> Result<Galaxy, GenerationError> {
    GalaxyBuilder::new(catalog).generate_galaxy(config)
}
