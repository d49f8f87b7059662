//! The finished galaxy: star systems, their content, and hyperlanes.
//!
//! A `Galaxy` is produced once by the generator and only read afterwards.
//! It is a plain nested record so it can go to JSON for clients or to
//! bincode for snapshots.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Point;
use crate::graph::{Edge, Graph, NodeId};

/// Version number for binary snapshots (increment when the layout changes)
const SNAPSHOT_VERSION: u32 = 1;

/// Star-system id. Same numbering as the generation graph.
pub type SystemId = NodeId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    pub name: String,
    /// Planet type id from the catalog.
    pub planet_type: u32,
    pub planet_type_name: String,
    pub size: f64,
    /// Distance from the star, in star-size units.
    pub orbit_radius: f64,
    /// Orbit position in degrees.
    pub angle: f64,
    pub moons: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Star {
    pub name: String,
    /// Star type id from the catalog.
    pub star_type: u32,
    pub star_type_name: String,
    pub size: f64,
    pub planets: Vec<Planet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarSystem {
    pub id: SystemId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Systems reachable over one hyperlane, ascending by id.
    pub connected: Vec<SystemId>,
    pub stars: Vec<Star>,
}

impl StarSystem {
    pub fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn distance_squared(&self, other: &StarSystem) -> f64 {
        self.location().distance_squared(&other.location())
    }
}

/// A hyperlane between two systems, stored with `a < b`.
pub type Hyperlane = Edge;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Galaxy {
    pub name: String,
    pub seed: u64,
    /// Indexed by `SystemId`.
    pub systems: Vec<StarSystem>,
    pub hyperlanes: Vec<Hyperlane>,
}

/// A galaxy consistency problem.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

/// Snapshot encode/decode error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("snapshot encoding failed: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("galaxy JSON failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot version {found} is not supported (expected {expected})")]
    Version { found: u32, expected: u32 },
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    galaxy: Galaxy,
}

impl Galaxy {
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn system(&self, id: SystemId) -> Option<&StarSystem> {
        self.systems.get(id.index())
    }

    pub fn find_system(&self, name: &str) -> Option<&StarSystem> {
        self.systems.iter().find(|s| s.name == name)
    }

    pub fn neighbors(&self, id: SystemId) -> &[SystemId] {
        self.system(id).map(|s| s.connected.as_slice()).unwrap_or(&[])
    }

    pub fn degree(&self, id: SystemId) -> usize {
        self.neighbors(id).len()
    }

    pub fn planet_count(&self) -> usize {
        self.systems
            .iter()
            .flat_map(|s| &s.stars)
            .map(|star| star.planets.len())
            .sum()
    }

    /// Rebuild the generation-graph view of this galaxy.
    pub fn to_graph(&self) -> Graph {
        let points = self.systems.iter().map(StarSystem::location).collect();
        Graph::new(points, self.hyperlanes.iter().map(|h| (h.a, h.b)))
    }

    /// Check structural invariants and return every problem found.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        errors.extend(self.check_ids());
        errors.extend(self.check_hyperlanes());
        errors.extend(self.check_links_symmetric());
        errors.extend(self.check_connectivity());
        errors
    }

    fn check_ids(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (idx, s) in self.systems.iter().enumerate() {
            if s.id.index() != idx {
                errors.push(ValidationError {
                    category: "ids",
                    severity: Severity::Error,
                    message: format!("System at index {} carries id {}", idx, s.id),
                });
            }
            if s.stars.is_empty() {
                errors.push(ValidationError {
                    category: "content",
                    severity: Severity::Warning,
                    message: format!("System {} '{}' has no star", s.id, s.name),
                });
            }
        }
        errors
    }

    fn check_hyperlanes(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        for h in &self.hyperlanes {
            if h.a == h.b {
                errors.push(ValidationError {
                    category: "hyperlanes",
                    severity: Severity::Error,
                    message: format!("Hyperlane loops on system {}", h.a),
                });
            }
            if h.a.index() >= self.systems.len() || h.b.index() >= self.systems.len() {
                errors.push(ValidationError {
                    category: "hyperlanes",
                    severity: Severity::Error,
                    message: format!("Hyperlane {}-{} references a missing system", h.a, h.b),
                });
            }
            let key = (h.a.min(h.b), h.a.max(h.b));
            if !seen.insert(key) {
                errors.push(ValidationError {
                    category: "hyperlanes",
                    severity: Severity::Error,
                    message: format!("Duplicate hyperlane {}-{}", h.a, h.b),
                });
            }
        }
        errors
    }

    fn check_links_symmetric(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let lanes: HashSet<(SystemId, SystemId)> = self
            .hyperlanes
            .iter()
            .flat_map(|h| [(h.a, h.b), (h.b, h.a)])
            .collect();
        let mut link_count = 0;
        for s in &self.systems {
            for &other in &s.connected {
                link_count += 1;
                let back = self
                    .system(other)
                    .map(|o| o.connected.contains(&s.id))
                    .unwrap_or(false);
                if !back {
                    errors.push(ValidationError {
                        category: "links",
                        severity: Severity::Error,
                        message: format!("Link {}→{} has no reverse link", s.id, other),
                    });
                }
                if !lanes.contains(&(s.id, other)) {
                    errors.push(ValidationError {
                        category: "links",
                        severity: Severity::Error,
                        message: format!("Link {}→{} has no hyperlane", s.id, other),
                    });
                }
            }
        }
        if link_count != self.hyperlanes.len() * 2 {
            errors.push(ValidationError {
                category: "links",
                severity: Severity::Error,
                message: format!(
                    "{} directed links for {} hyperlanes",
                    link_count,
                    self.hyperlanes.len()
                ),
            });
        }
        errors
    }

    fn check_connectivity(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.systems.is_empty() {
            return errors;
        }

        let mut visited = vec![false; self.systems.len()];
        let mut queue = VecDeque::new();
        visited[0] = true;
        queue.push_back(NodeId(0));

        while let Some(current) = queue.pop_front() {
            for &next in self.neighbors(current) {
                if let Some(seen) = visited.get_mut(next.index()) {
                    if !*seen {
                        *seen = true;
                        queue.push_back(next);
                    }
                }
            }
        }

        let unreached = visited.iter().filter(|v| !**v).count();
        if unreached > 0 {
            errors.push(ValidationError {
                category: "connectivity",
                severity: Severity::Error,
                message: format!(
                    "{} of {} systems unreachable from system #0",
                    unreached,
                    self.systems.len()
                ),
            });
        }
        errors
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Versioned binary snapshot.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistenceError> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            galaxy: self.clone(),
        };
        Ok(bincode::serialize(&snapshot)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistenceError> {
        let snapshot: Snapshot = bincode::deserialize(bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PersistenceError::Version {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot.galaxy)
    }
}
