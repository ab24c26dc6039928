//! TopoJSON topology decoding.
//!
//! Arcs are shared polyline fragments. With a `transform`, arc positions are
//! quantized and delta-encoded: each position is an offset from the previous
//! one, and absolute values map to degrees via `scale` and `translate`.
//! Geometries reference arcs by index; a negative index `i` means arc `!i`
//! traversed backwards.

use std::collections::BTreeMap;

use options::{Config, Value};
use serde::Deserialize;
use tracing::debug;

use crate::error::TopologyError;
use crate::geometry::{Feature, FeatureCollection, Geometry, Position, normalize_id};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    fn apply(&self, q: [f64; 2]) -> Position {
        [
            q[0] * self.scale[0] + self.translate[0],
            q[1] * self.scale[1] + self.translate[1],
        ]
    }
}

/// One entry of `objects` (or of a collection's `geometries`).
///
/// Kept loosely typed so null geometries (`"type": null`) and unknown
/// members parse; the body is checked when the object is decoded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeometryObject {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub properties: Option<serde_json::Value>,
    #[serde(default)]
    pub arcs: Option<serde_json::Value>,
    #[serde(default)]
    pub coordinates: Option<serde_json::Value>,
    #[serde(default)]
    pub geometries: Option<Vec<GeometryObject>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Topology {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub objects: BTreeMap<String, GeometryObject>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
}

impl Topology {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TopologyError> {
        let topology: Topology = serde_json::from_slice(bytes)?;
        topology.validated()
    }

    pub fn from_json(json: serde_json::Value) -> Result<Self, TopologyError> {
        let topology: Topology = serde_json::from_value(json)?;
        topology.validated()
    }

    fn validated(self) -> Result<Self, TopologyError> {
        if self.kind != "Topology" {
            return Err(TopologyError::NotATopology { found: self.kind });
        }
        Ok(self)
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Decodes `objects[name]` into features. A geometry collection yields one
    /// feature per member; any other object yields a single feature.
    pub fn feature(&self, name: &str) -> Result<FeatureCollection, TopologyError> {
        let object = self
            .objects
            .get(name)
            .ok_or_else(|| TopologyError::MissingObject {
                name: name.to_string(),
            })?;

        let arcs = self.decoded_arcs();
        let members: Vec<&GeometryObject> = match object.kind.as_deref() {
            Some("GeometryCollection") => object.geometries.iter().flatten().collect(),
            _ => vec![object],
        };

        let mut features = Vec::with_capacity(members.len());
        for member in members {
            features.push(Feature {
                id: member.id.as_ref().and_then(normalize_id),
                properties: properties_of(member),
                geometry: self.decode_geometry(member, &arcs)?,
            });
        }
        debug!(object = name, features = features.len(), "topology decoded");
        Ok(FeatureCollection { features })
    }

    /// Absolute positions of every arc.
    fn decoded_arcs(&self) -> Vec<Vec<Position>> {
        self.arcs
            .iter()
            .map(|arc| {
                let mut x = 0.0;
                let mut y = 0.0;
                arc.iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| match &self.transform {
                        Some(t) => {
                            x += p[0];
                            y += p[1];
                            t.apply([x, y])
                        }
                        None => [p[0], p[1]],
                    })
                    .collect()
            })
            .collect()
    }

    fn point(&self, raw: &[f64]) -> Result<Position, TopologyError> {
        if raw.len() < 2 {
            return Err(TopologyError::InvalidGeometry(
                "position needs two coordinates".to_string(),
            ));
        }
        let p = [raw[0], raw[1]];
        Ok(match &self.transform {
            Some(t) => t.apply(p),
            None => p,
        })
    }

    fn decode_geometry(
        &self,
        object: &GeometryObject,
        arcs: &[Vec<Position>],
    ) -> Result<Geometry, TopologyError> {
        let Some(kind) = object.kind.as_deref() else {
            return Ok(Geometry::Null);
        };
        let geometry = match kind {
            "Point" => {
                let raw: Vec<f64> = body(object.coordinates.as_ref(), kind)?;
                Geometry::Point(self.point(&raw)?)
            }
            "MultiPoint" => {
                let raw: Vec<Vec<f64>> = body(object.coordinates.as_ref(), kind)?;
                Geometry::MultiPoint(
                    raw.iter()
                        .map(|p| self.point(p))
                        .collect::<Result<_, _>>()?,
                )
            }
            "LineString" => {
                let refs: Vec<i64> = body(object.arcs.as_ref(), kind)?;
                Geometry::LineString(line(&refs, arcs)?)
            }
            "MultiLineString" => {
                let refs: Vec<Vec<i64>> = body(object.arcs.as_ref(), kind)?;
                Geometry::MultiLineString(
                    refs.iter()
                        .map(|r| line(r, arcs))
                        .collect::<Result<_, _>>()?,
                )
            }
            "Polygon" => {
                let refs: Vec<Vec<i64>> = body(object.arcs.as_ref(), kind)?;
                Geometry::Polygon(polygon(&refs, arcs)?)
            }
            "MultiPolygon" => {
                let refs: Vec<Vec<Vec<i64>>> = body(object.arcs.as_ref(), kind)?;
                Geometry::MultiPolygon(
                    refs.iter()
                        .map(|p| polygon(p, arcs))
                        .collect::<Result<_, _>>()?,
                )
            }
            "GeometryCollection" => {
                return Err(TopologyError::InvalidGeometry(
                    "nested geometry collections are not supported".to_string(),
                ));
            }
            other => {
                return Err(TopologyError::InvalidGeometry(format!(
                    "unknown geometry type {other:?}"
                )));
            }
        };
        Ok(geometry)
    }
}

fn body<T: serde::de::DeserializeOwned>(
    raw: Option<&serde_json::Value>,
    kind: &str,
) -> Result<T, TopologyError> {
    let raw = raw.ok_or_else(|| TopologyError::InvalidGeometry(format!("{kind} has no body")))?;
    serde_json::from_value(raw.clone())
        .map_err(|e| TopologyError::InvalidGeometry(format!("{kind}: {e}")))
}

fn properties_of(object: &GeometryObject) -> Config {
    match object.properties.clone().map(Value::from) {
        Some(Value::Object(config)) => config,
        _ => Config::new(),
    }
}

/// Stitches arcs into one polyline; the shared junction position between
/// consecutive arcs appears once.
fn line(refs: &[i64], arcs: &[Vec<Position>]) -> Result<Vec<Position>, TopologyError> {
    let mut points: Vec<Position> = Vec::new();
    for &r in refs {
        let (index, reversed) = if r < 0 { (!r, true) } else { (r, false) };
        let arc = usize::try_from(index)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or(TopologyError::ArcOutOfRange {
                index: r,
                arcs: arcs.len(),
            })?;
        if !points.is_empty() {
            points.pop();
        }
        if reversed {
            points.extend(arc.iter().rev().copied());
        } else {
            points.extend(arc.iter().copied());
        }
    }
    Ok(points)
}

/// Rings are padded to at least four positions so they stay closed.
fn ring(refs: &[i64], arcs: &[Vec<Position>]) -> Result<Vec<Position>, TopologyError> {
    let mut points = line(refs, arcs)?;
    if let Some(first) = points.first().copied() {
        while points.len() < 4 {
            points.push(first);
        }
    }
    Ok(points)
}

fn polygon(refs: &[Vec<i64>], arcs: &[Vec<Position>]) -> Result<Vec<Vec<Position>>, TopologyError> {
    refs.iter().map(|r| ring(r, arcs)).collect()
}
