//! Shared fixture for handler tests: a flat one-pixel-per-degree map with
//! two square regions drawn into the subunits group.

use formats::{Feature, FeatureCollection, Geometry};
use foundation::math::{Projection, ProjectionKind};
use options::Config;
use scene::{NodeId, Surface};
use serde_json::json;

use crate::context::RenderContext;
use crate::engine::Cartographer;
use crate::layer::LayerHandle;

pub(crate) struct Fixture {
    pub surface: Surface,
    pub engine: Cartographer,
    pub fills: Config,
    pub filters: Config,
    pub data: Config,
    pub features: FeatureCollection,
    pub subunits: NodeId,
}

fn square(id: &str, name: &str, x: f64, y: f64, size: f64) -> Feature {
    Feature {
        id: Some(id.to_string()),
        properties: Config::new().with("name", name),
        geometry: Geometry::Polygon(vec![vec![
            [x, y],
            [x + size, y],
            [x + size, y + size],
            [x, y + size],
            [x, y],
        ]]),
    }
}

impl Fixture {
    pub fn new() -> Self {
        let mut surface = Surface::new("svg");
        let root = surface.root();
        let subunits = surface.append(root, "g").expect("subunits");
        surface
            .edit(subunits)
            .expect("subunits")
            .class("datamaps-subunits");

        let features = FeatureCollection {
            features: vec![
                square("AAA", "Alpha", 0.0, 0.0, 10.0),
                square("BBB", "Beta", 20.0, 0.0, 10.0),
            ],
        };
        for feature in &features.features {
            let path = surface.append(subunits, "path").expect("path");
            surface
                .edit(path)
                .expect("path")
                .class("datamaps-subunit")
                .class(feature.id.as_deref().unwrap_or_default())
                .datum(feature.to_value());
        }

        Self {
            surface,
            engine: Cartographer::new(
                Projection::new(ProjectionKind::Equirectangular)
                    .with_scale(180.0 / std::f64::consts::PI)
                    .with_translate([0.0, 0.0]),
            ),
            fills: Config::from_json(json!({"defaultFill": "#ABDDA4", "high": "#CC4731"}))
                .expect("fills"),
            filters: Config::new().with("blur", "url(#blur)"),
            data: Config::new(),
            features,
            subunits,
        }
    }

    /// Appends a `g.<name>` layer group under the root.
    pub fn layer(&mut self, name: &str) -> LayerHandle {
        let root = self.surface.root();
        let g = self.surface.append(root, "g").expect("layer");
        self.surface.edit(g).expect("layer").class(name);
        LayerHandle(g)
    }

    pub fn ctx(&mut self) -> RenderContext<'_> {
        RenderContext {
            surface: &mut self.surface,
            engine: &self.engine,
            fills: &self.fills,
            filters: &self.filters,
            data: &self.data,
            features: &self.features,
            subunits: self.subunits,
        }
    }
}
