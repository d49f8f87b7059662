//! Procedural galaxy generation and routing for Stellarlight.
//!
//! This crate turns a small config into a connected map of star systems
//! joined by hyperlanes, fills the systems with stars and planets from a
//! catalog, and plans routes across the finished map. Everything is plain
//! data in, plain data out; a seed always reproduces the same galaxy.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Star and planet type definitions, JSON asset loading |
//! | [`chance`] | Weighted random selection and ranged draws |
//! | [`galaxy`] | Finished galaxy value, validation, JSON/bincode persistence |
//! | [`generation`] | Config, validation, retrying pipeline, content assignment |
//! | [`geometry`] | 2D points and bounds |
//! | [`graph`] | Node/edge arena with connectivity queries |
//! | [`names`] | Procedural system and planet names |
//! | [`pathfinding`] | Weighted graph view, heuristic table, A* navigator |
//! | [`pruning`] | Connectivity-preserving long-edge and degree reduction |
//! | [`shape`] | Galaxy shapes and point sampling |
//! | [`triangulation`] | Delaunay triangulation into a hyperlane graph |
//!
//! # Example
//!
//! ```
//! use stellarlight_logic::catalog::{Catalog, StarType};
//! use stellarlight_logic::generation::{generate_galaxy, GalaxyGenerationConfig};
//! use stellarlight_logic::pathfinding::Navigator;
//!
//! let catalog = Catalog::new(vec![StarType { id: 1, chance: 1.0, ..Default::default() }], vec![]);
//! let config = GalaxyGenerationConfig { num_star_systems: 60, seed: 9, ..Default::default() };
//! let galaxy = generate_galaxy(&config, &catalog).unwrap();
//!
//! let navigator = Navigator::from_galaxy(&galaxy);
//! let path = navigator.shortest_path(galaxy.systems[0].id, galaxy.systems[59].id).unwrap();
//! assert_eq!(path.first(), Some(&galaxy.systems[0].id));
//! ```

pub mod catalog;
pub mod chance;
pub mod galaxy;
pub mod generation;
pub mod geometry;
pub mod graph;
pub mod names;
pub mod pathfinding;
pub mod pruning;
pub mod shape;
pub mod triangulation;

pub use catalog::{Catalog, PlanetType, StarType};
pub use galaxy::Galaxy;
pub use generation::{generate_galaxy, GalaxyGenerationConfig, GenerationError};
pub use pathfinding::{Navigator, Route};
