//! Star and planet type catalogs.
//!
//! Catalogs are read from JSON asset files of the form
//!
//! ```json
//! { "resourceType": "StarType", "resources": [ { "id": 1, "name": "Red Dwarf", ... } ] }
//! ```
//!
//! Entries are keyed by id and later files overwrite earlier ones, so a mod
//! directory loaded after the base assets can replace individual types.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::chance::WeightedChoice;

/// Catalog loading error.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse asset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// RGBA color, serialized as `"#RRGGBBAA"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `"#RRGGBBAA"` or `"#RRGGBB"` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 255 },
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;

        impl Visitor<'_> for HexVisitor {
            type Value = Color;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a \"#RRGGBB\" or \"#RRGGBBAA\" color string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Color, E> {
                Color::from_hex(v).ok_or_else(|| E::custom(format!("invalid color hex: {}", v)))
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}

/// A kind of star that can anchor a system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StarType {
    pub id: u32,
    pub name: String,
    pub color: Color,
    pub description: String,
    pub min_size: f64,
    pub max_size: f64,
    /// Selection weight relative to the other star types.
    pub chance: f64,
    /// Chance that each planet slot past `min_planets` is filled.
    pub planet_chance: f64,
    pub min_planets: u32,
    pub max_planets: u32,
}

impl Default for StarType {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            color: Color::WHITE,
            description: String::new(),
            min_size: 1.0,
            max_size: 1.0,
            chance: 1.0,
            planet_chance: 0.0,
            min_planets: 0,
            max_planets: 0,
        }
    }
}

impl WeightedChoice for StarType {
    fn choice_weight(&self) -> f64 {
        self.chance
    }
}

/// A kind of planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanetType {
    pub id: u32,
    pub name: String,
    pub color: Color,
    pub description: String,
    pub min_size: f64,
    pub max_size: f64,
    /// Selection weight relative to the other planet types.
    pub chance: f64,
    pub moon_chance: f64,
    pub max_moons: u32,
}

impl Default for PlanetType {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            color: Color::WHITE,
            description: String::new(),
            min_size: 1.0,
            max_size: 1.0,
            chance: 1.0,
            moon_chance: 0.0,
            max_moons: 0,
        }
    }
}

impl WeightedChoice for PlanetType {
    fn choice_weight(&self) -> f64 {
        self.chance
    }
}

/// A file holds one asset document or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AssetDocument {
    One(AssetFile),
    Many(Vec<AssetFile>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetFile {
    resource_type: String,
    #[serde(default)]
    resources: Vec<serde_json::Value>,
}

/// Star and planet types, ordered by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    star_types: BTreeMap<u32, StarType>,
    planet_types: BTreeMap<u32, PlanetType>,
}

impl Catalog {
    pub fn new(star_types: Vec<StarType>, planet_types: Vec<PlanetType>) -> Self {
        let mut catalog = Self::default();
        for st in star_types {
            catalog.insert_star_type(st);
        }
        for pt in planet_types {
            catalog.insert_planet_type(pt);
        }
        catalog
    }

    /// Parse an asset document, or a JSON array of them. Unknown resource
    /// types are ignored and malformed entries are skipped with a warning.
    /// An empty array is an empty catalog.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let mut catalog = Self::default();
        catalog.merge_json_str(json, "<inline>")?;
        Ok(catalog)
    }

    /// Load every `.json` file under each directory, recursively, in order.
    /// Files within a directory are visited in name order.
    pub fn load_dirs<P: AsRef<Path>>(dirs: &[P]) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for dir in dirs {
            let mut files = Vec::new();
            collect_json_files(dir.as_ref(), &mut files)?;
            for path in files {
                let json = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                    path: path.clone(),
                    source,
                })?;
                catalog
                    .merge_json_str(&json, &path.display().to_string())
                    .map_err(|source| CatalogError::Parse {
                        path: path.clone(),
                        source,
                    })?;
            }
        }
        log::info!(
            "Loaded catalog: {} star types, {} planet types",
            catalog.star_types.len(),
            catalog.planet_types.len()
        );
        Ok(catalog)
    }

    /// Star types in id order.
    pub fn star_types(&self) -> Vec<&StarType> {
        self.star_types.values().collect()
    }

    /// Planet types in id order.
    pub fn planet_types(&self) -> Vec<&PlanetType> {
        self.planet_types.values().collect()
    }

    pub fn star_type(&self, id: u32) -> Option<&StarType> {
        self.star_types.get(&id)
    }

    pub fn planet_type(&self, id: u32) -> Option<&PlanetType> {
        self.planet_types.get(&id)
    }

    pub fn insert_star_type(&mut self, star_type: StarType) {
        self.star_types.insert(star_type.id, star_type);
    }

    pub fn insert_planet_type(&mut self, planet_type: PlanetType) {
        self.planet_types.insert(planet_type.id, planet_type);
    }

    pub fn is_empty(&self) -> bool {
        self.star_types.is_empty() && self.planet_types.is_empty()
    }

    fn merge_json_str(&mut self, json: &str, source: &str) -> Result<(), serde_json::Error> {
        let files = match serde_json::from_str::<AssetDocument>(json)? {
            AssetDocument::One(file) => vec![file],
            AssetDocument::Many(files) => files,
        };
        for file in files {
            self.merge_asset_file(file, source);
        }
        Ok(())
    }

    fn merge_asset_file(&mut self, file: AssetFile, source: &str) {
        match file.resource_type.as_str() {
            "StarType" => {
                for value in file.resources {
                    match serde_json::from_value::<StarType>(value) {
                        Ok(st) => self.insert_star_type(st),
                        Err(e) => log::warn!("Skipping star type in {}: {}", source, e),
                    }
                }
            }
            "PlanetType" => {
                for value in file.resources {
                    match serde_json::from_value::<PlanetType>(value) {
                        Ok(pt) => self.insert_planet_type(pt),
                        Err(e) => log::warn!("Skipping planet type in {}: {}", source, e),
                    }
                }
            }
            other => log::debug!("Ignoring resource type {:?} in {}", other, source),
        }
    }
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), CatalogError> {
    let io_err = |source| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(io_err)?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}
