use options::{Config, Value, format_number};

/// `[longitude, latitude]` in degrees.
pub type Position = [f64; 2];

/// Decoded feature geometry, GeoJSON-shaped.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
    Null,
}

impl Geometry {
    /// Every position, in order.
    pub fn positions(&self) -> Vec<Position> {
        match self {
            Geometry::Point(p) => vec![*p],
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => ps.clone(),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().flatten().copied().collect()
            }
            Geometry::MultiPolygon(polys) => polys.iter().flatten().flatten().copied().collect(),
            Geometry::Null => Vec::new(),
        }
    }

    pub fn is_areal(&self) -> bool {
        matches!(self, Geometry::Polygon(_) | Geometry::MultiPolygon(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Config,
    pub geometry: Geometry,
}

impl Feature {
    /// Datum bound to a rendered feature: `{id, properties}` without the
    /// geometry.
    pub fn to_value(&self) -> Value {
        Config::new()
            .with("id", self.id.clone())
            .with("properties", self.properties.clone())
            .into()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id.as_deref() == Some(id))
    }

    /// Drops features whose id is listed in `ids`.
    pub fn without_ids(mut self, ids: &[&str]) -> Self {
        self.features
            .retain(|f| f.id.as_deref().is_none_or(|id| !ids.contains(&id)));
        self
    }
}

/// Region ids may be strings or numbers in the payload; both become strings.
pub(crate) fn normalize_id(id: &serde_json::Value) -> Option<String> {
    match id {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => n.as_f64().map(format_number),
        _ => None,
    }
}
