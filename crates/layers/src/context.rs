use formats::FeatureCollection;
use foundation::math::LonLat;
use options::Config;
use scene::{NodeId, Surface};

use crate::engine::GeometryEngine;

/// Collaborators a capability handler draws with.
pub struct RenderContext<'a> {
    pub surface: &'a mut Surface,
    pub engine: &'a dyn GeometryEngine,
    /// Instance-wide fill colors keyed by fill key (`defaultFill` included).
    pub fills: &'a Config,
    /// Instance-wide SVG filter references keyed by filter key.
    pub filters: &'a Config,
    /// Choropleth data keyed by region id.
    pub data: &'a Config,
    /// Regions drawn on the map.
    pub features: &'a FeatureCollection,
    /// The `g.datamaps-subunits` group.
    pub subunits: NodeId,
}

/// Regions whose polygon centroid lands somewhere unhelpful for markers
/// (off the mainland or in open water) are pinned to a fixed point.
const REGION_ANCHORS: &[(&str, LonLat)] = &[
    ("CAN", LonLat::new(-114.665293, 56.624472)),
    ("CHL", LonLat::new(-70.669265, -33.448890)),
    ("IDN", LonLat::new(106.845599, -6.208763)),
    ("JPN", LonLat::new(139.691706, 35.689487)),
    ("MYS", LonLat::new(101.686855, 3.139003)),
    ("NOR", LonLat::new(10.752245, 59.913869)),
    ("USA", LonLat::new(-98.58333, 39.83333)),
    ("VNM", LonLat::new(105.834160, 21.027764)),
];

impl RenderContext<'_> {
    /// Screen position of a region's centroid.
    pub fn region_centroid(&self, id: &str) -> Option<[f64; 2]> {
        let feature = self.features.get(id)?;
        self.engine.centroid(&feature.geometry)
    }

    /// Geographic point used for markers placed "at" a region: its anchor
    /// when it has one, else its inverted centroid.
    pub fn region_location(&self, id: &str) -> Option<LonLat> {
        if let Some((_, anchor)) = REGION_ANCHORS.iter().find(|(k, _)| *k == id) {
            return Some(*anchor);
        }
        self.engine.invert(self.region_centroid(id)?)
    }

    /// Screen position used for markers placed "at" a region.
    pub fn region_point(&self, id: &str) -> Option<[f64; 2]> {
        if let Some((_, anchor)) = REGION_ANCHORS.iter().find(|(k, _)| *k == id) {
            return self.engine.project(*anchor);
        }
        self.region_centroid(id)
    }

    pub fn default_fill(&self) -> Option<&str> {
        self.fills.get_str("defaultFill")
    }
}
