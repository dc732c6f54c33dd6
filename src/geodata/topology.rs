// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Minimal TopoJSON decoder for boundary datasets.
//!
//! Only what a boundary atlas needs is supported: quantized or plain arcs,
//! and `Polygon`/`MultiPolygon` geometries inside a named
//! `GeometryCollection`. Arcs referenced by negative index are the bitwise
//! complement of an arc position and are traversed in reverse, per the
//! TopoJSON convention.

use std::collections::BTreeMap;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Why a topology document could not be decoded.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("failed to parse topology JSON")]
    Parse(#[from] serde_json::Error),
    #[error("topology has no object named {0:?}")]
    MissingObject(String),
    #[error("arc index {0} is out of bounds")]
    ArcIndex(i64),
}

/// Quantization transform: position `p` decodes to
/// `p * scale + translate` per axis.
#[derive(Debug, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

/// A parsed TopoJSON document.
///
/// Objects are kept as raw JSON until a caller asks for one; a dataset may
/// carry objects of types this decoder does not handle (the world atlas
/// ships a `land` MultiPolygon next to its `countries` collection).
#[derive(Debug, Deserialize)]
pub struct Topology {
    arcs: Vec<Vec<[f64; 2]>>,
    #[serde(default)]
    transform: Option<Transform>,
    objects: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct GeometryCollection {
    geometries: Vec<GeometryEntry>,
}

#[derive(Debug, Deserialize)]
struct GeometryEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
    #[serde(default)]
    arcs: Value,
}

/// One polygonal geometry lifted out of a collection, with its metadata.
#[derive(Clone, Debug)]
pub struct DecodedRegion {
    /// The geometry's `id`, rendered as a string when present.
    pub id: Option<String>,
    /// The geometry's `properties` object, verbatim.
    pub properties: serde_json::Map<String, Value>,
    pub geometry: MultiPolygon<f64>,
}

impl Topology {
    /// Parse a TopoJSON document from its serialized bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TopologyError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Decode the polygonal geometries of the named object.
    ///
    /// Non-polygonal geometries in the collection are skipped with a
    /// warning; they carry nothing a boundary consumer can shade.
    pub fn polygons(&self, object: &str) -> Result<Vec<DecodedRegion>, TopologyError> {
        let raw = self
            .objects
            .get(object)
            .ok_or_else(|| TopologyError::MissingObject(object.to_string()))?;
        let collection: GeometryCollection = serde_json::from_value(raw.clone())?;

        let mut regions = Vec::with_capacity(collection.geometries.len());
        for entry in collection.geometries {
            let polygons: Vec<Vec<Vec<i64>>> = match entry.kind.as_str() {
                "Polygon" => vec![serde_json::from_value(entry.arcs)?],
                "MultiPolygon" => serde_json::from_value(entry.arcs)?,
                other => {
                    warn!("skipping {other} geometry in object {object:?}");
                    continue;
                }
            };

            let mut decoded = Vec::with_capacity(polygons.len());
            for rings in &polygons {
                decoded.push(self.decode_polygon(rings)?);
            }
            regions.push(DecodedRegion {
                id: entry.id.as_ref().map(render_id),
                properties: entry.properties,
                geometry: MultiPolygon(decoded),
            });
        }
        Ok(regions)
    }

    fn decode_polygon(&self, rings: &[Vec<i64>]) -> Result<Polygon<f64>, TopologyError> {
        let mut rings = rings.iter();
        let exterior = match rings.next() {
            Some(ring) => self.decode_ring(ring)?,
            None => LineString::new(Vec::new()),
        };
        let interiors = rings
            .map(|ring| self.decode_ring(ring))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Polygon::new(exterior, interiors))
    }

    /// Stitch a ring together from its arcs. Consecutive arcs share their
    /// junction point, so each arc after the first replaces the point the
    /// previous one ended on.
    fn decode_ring(&self, arc_indices: &[i64]) -> Result<LineString<f64>, TopologyError> {
        let mut coords: Vec<Coord<f64>> = Vec::new();
        for &index in arc_indices {
            if !coords.is_empty() {
                coords.pop();
            }
            coords.extend(self.decode_arc(index)?);
        }
        Ok(LineString::from(coords))
    }

    fn decode_arc(&self, index: i64) -> Result<Vec<Coord<f64>>, TopologyError> {
        let (position, reversed) = if index < 0 {
            ((!index) as usize, true)
        } else {
            (index as usize, false)
        };
        let raw = self
            .arcs
            .get(position)
            .ok_or(TopologyError::ArcIndex(index))?;

        let mut coords = Vec::with_capacity(raw.len());
        match &self.transform {
            // Quantized arcs are delta-encoded: each position is an offset
            // from the previous one, in grid units.
            Some(transform) => {
                let (mut x, mut y) = (0.0_f64, 0.0_f64);
                for point in raw {
                    x += point[0];
                    y += point[1];
                    coords.push(Coord {
                        x: x * transform.scale[0] + transform.translate[0],
                        y: y * transform.scale[1] + transform.translate[1],
                    });
                }
            }
            None => {
                coords.extend(raw.iter().map(|point| Coord {
                    x: point[0],
                    y: point[1],
                }));
            }
        }
        if reversed {
            coords.reverse();
        }
        Ok(coords)
    }
}

fn render_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
