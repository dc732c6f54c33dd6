// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Boundary geometry for the world map.
//!
//! The map needs one thing from the outside world: a set of
//! (region code, boundary geometry) pairs, fetched once at startup. The
//! [`BoundarySource`] trait keeps that collaborator swappable; [`WorldAtlas`]
//! is the production implementation backed by the world-atlas TopoJSON
//! published on a public CDN.

pub mod topology;

use anyhow::{Context, Result};
use geo::MultiPolygon;
use log::warn;
use serde_json::Value;

pub use topology::{DecodedRegion, Topology, TopologyError};

/// The dataset the original map shades: world country boundaries at 1:110m.
pub const WORLD_ATLAS_URL: &str =
    "https://cdn.jsdelivr.net/npm/world-atlas@2/countries-110m.json";

/// Boundary polygons for one region.
#[derive(Clone, Debug)]
pub struct RegionBoundary {
    /// ISO 3166-1 alpha-2 region code, uppercase.
    pub code: String,
    /// Display name, falling back to the code when the dataset has none.
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// External collaborator handing out region boundaries.
///
/// Loaded once at startup; the result is held for the session.
pub trait BoundarySource {
    fn load(&self) -> Result<Vec<RegionBoundary>>;
}

/// [`BoundarySource`] backed by a remote world-atlas TopoJSON document.
#[derive(Clone, Debug)]
pub struct WorldAtlas {
    url: String,
    object: String,
}

impl WorldAtlas {
    pub fn new() -> Self {
        Self::with_url(WORLD_ATLAS_URL)
    }

    /// Point the atlas at a different dataset URL, e.g. a mirror. The
    /// polygons are still expected under a `countries` object.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            object: "countries".to_string(),
        }
    }
}

impl Default for WorldAtlas {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundarySource for WorldAtlas {
    fn load(&self) -> Result<Vec<RegionBoundary>> {
        let bytes = reqwest::blocking::get(&self.url)
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Failed to fetch boundary dataset from {}", self.url))?
            .bytes()
            .context("Failed to read boundary dataset body")?;
        let topology = Topology::from_slice(&bytes)
            .context("Failed to decode boundary dataset topology")?;
        regions_from_topology(&topology, &self.object)
            .context("Failed to decode boundary geometries")
    }
}

/// Lift region boundaries out of a parsed topology.
///
/// Regions without a usable ISO code are skipped; they cannot be matched
/// against visited-country codes anyway.
pub fn regions_from_topology(
    topology: &Topology,
    object: &str,
) -> Result<Vec<RegionBoundary>, TopologyError> {
    let decoded = topology.polygons(object)?;
    let mut regions = Vec::with_capacity(decoded.len());
    for region in decoded {
        let name = display_name(&region);
        let Some(code) = region_code(&region) else {
            warn!(
                "skipping region without a usable ISO code: {}",
                name.as_deref().unwrap_or("<unnamed>")
            );
            continue;
        };
        regions.push(RegionBoundary {
            name: name.unwrap_or_else(|| code.clone()),
            code,
            geometry: region.geometry,
        });
    }
    Ok(regions)
}

/// The two-letter region code of a decoded geometry.
///
/// Atlases disagree on where they keep it: some carry an `ISO_A2` property,
/// others use the geometry id itself. Placeholder codes such as `-99` for
/// disputed territories are rejected.
fn region_code(region: &DecodedRegion) -> Option<String> {
    for key in ["ISO_A2", "iso_a2"] {
        if let Some(Value::String(code)) = region.properties.get(key)
            && is_alpha2(code)
        {
            return Some(code.to_ascii_uppercase());
        }
    }
    region
        .id
        .as_deref()
        .filter(|id| is_alpha2(id))
        .map(|id| id.to_ascii_uppercase())
}

fn is_alpha2(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())
}

fn display_name(region: &DecodedRegion) -> Option<String> {
    match region.properties.get("name") {
        Some(Value::String(name)) if !name.is_empty() => Some(name.clone()),
        _ => None,
    }
}

/// Name → code lookup for a country picker, built from a boundary set.
#[derive(Clone, Debug, Default)]
pub struct CountryCatalog {
    /// (display name, code), sorted by name.
    entries: Vec<(String, String)>,
}

impl CountryCatalog {
    pub fn from_boundaries(boundaries: &[RegionBoundary]) -> Self {
        let mut entries: Vec<(String, String)> = boundaries
            .iter()
            .map(|b| (b.name.clone(), b.code.clone()))
            .collect();
        entries.sort();
        entries.dedup();
        Self { entries }
    }

    /// Display names in alphabetical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Resolve a display name to its region code.
    pub fn code_for(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, code)| code.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
