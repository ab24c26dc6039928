//! Projection set-up for a map instance.

use std::f64::consts::PI;

use formats::FeatureCollection;
use foundation::Aabb2;
use foundation::math::{LonLat, Projection, ProjectionKind};
use layers::{Cartographer, GeometryEngine};
use options::Config;
use tracing::debug;

use crate::error::MapError;

/// Globe radius in pixels.
const ORTHOGRAPHIC_SCALE: f64 = 250.0;

/// Share of the viewport a fitted scope fills.
const FIT_PADDING: f64 = 0.95;

/// Builds the projection named by `projection` for a `width` x `height`
/// viewport.
///
/// The world scope spans the full width; the orthographic globe has a fixed
/// radius and is turned by `projectionConfig.rotation`. Any other scope is
/// fitted to the bounds of its regions. `projectionConfig` may pin `scale`,
/// `translate` and `center` explicitly.
pub fn projection_for(
    options: &Config,
    features: &FeatureCollection,
    width: f64,
    height: f64,
) -> Result<Projection, MapError> {
    let name = options.get_str("projection").unwrap_or("equirectangular");
    let base =
        Projection::by_name(name).ok_or_else(|| MapError::UnknownProjection(name.to_string()))?;
    let config = options.get_object("projectionConfig").cloned().unwrap_or_default();

    let world = options.get_str("scope").unwrap_or("world") == "world";
    let mut projection = if world || base.kind == ProjectionKind::Orthographic {
        let divisor = if base.kind == ProjectionKind::Mercator { 1.45 } else { 1.8 };
        base.with_scale((width + 1.0) / 2.0 / PI)
            .with_translate([width / 2.0, height / divisor])
    } else {
        fit(base, features, width, height)
    };

    if base.kind == ProjectionKind::Orthographic {
        projection = projection.with_scale(ORTHOGRAPHIC_SCALE);
        if let Some(rotation) = config.get_pair("rotation") {
            projection = projection.with_rotation(rotation);
        }
    }
    if let Some(scale) = config.get_f64("scale") {
        projection = projection.with_scale(scale);
    }
    if let Some(translate) = config.get_pair("translate") {
        projection = projection.with_translate(translate);
    }
    if let Some([lon, lat]) = config.get_pair("center") {
        projection = projection.with_center(LonLat::new(lon, lat));
    }

    debug!(
        projection = name,
        scale = projection.scale,
        translate = ?projection.translate,
        "projection set"
    );
    Ok(projection)
}

/// Scales and centers `base` so every region fits the viewport.
fn fit(base: Projection, features: &FeatureCollection, width: f64, height: f64) -> Projection {
    let centered = base.with_translate([width / 2.0, height / 2.0]);
    let unit = Cartographer::new(base.with_scale(1.0).with_translate([0.0, 0.0]));
    let Some(bounds) = features
        .features
        .iter()
        .filter_map(|f| unit.bounds(&f.geometry))
        .reduce(Aabb2::union)
    else {
        return centered;
    };

    let k = FIT_PADDING / (bounds.width() / width).max(bounds.height() / height);
    if !k.is_finite() || k <= 0.0 {
        return centered;
    }
    let [cx, cy] = bounds.center();
    base.with_scale(k)
        .with_translate([width / 2.0 - k * cx, height / 2.0 - k * cy])
}

/// Path data for the outline of an orthographic globe.
pub fn sphere_outline(projection: &Projection) -> String {
    let [x, y] = projection.translate;
    let r = projection.scale;
    let coord = layers::engine::coord;
    format!(
        "M{},{}a{r},{r} 0 1,1 0,{d}a{r},{r} 0 1,1 0,-{d}Z",
        coord(x),
        coord(y - r),
        r = coord(r),
        d = coord(2.0 * r),
    )
}

#[cfg(test)]
mod tests {
    use super::{projection_for, sphere_outline};
    use crate::error::MapError;
    use formats::{Feature, FeatureCollection, Geometry};
    use foundation::math::ProjectionKind;
    use options::Config;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::f64::consts::PI;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {a} ~= {b}");
    }

    fn cfg(v: serde_json::Value) -> Config {
        Config::from_json(v).expect("object")
    }

    fn square(id: &str, x0: f64, y0: f64, side: f64) -> Feature {
        Feature {
            id: Some(id.to_string()),
            properties: Config::new(),
            geometry: Geometry::Polygon(vec![vec![
                [x0, y0],
                [x0 + side, y0],
                [x0 + side, y0 + side],
                [x0, y0 + side],
                [x0, y0],
            ]]),
        }
    }

    #[test]
    fn world_scope_spans_the_width() {
        let options = cfg(json!({"scope": "world", "projection": "equirectangular"}));
        let p = projection_for(&options, &FeatureCollection::default(), 960.0, 540.0)
            .expect("projection");
        assert_close(p.scale, 961.0 / 2.0 / PI);
        assert_close(p.translate[0], 480.0);
        assert_close(p.translate[1], 300.0);

        let options = cfg(json!({"scope": "world", "projection": "mercator"}));
        let p = projection_for(&options, &FeatureCollection::default(), 960.0, 580.0)
            .expect("projection");
        assert_eq!(p.kind, ProjectionKind::Mercator);
        assert_close(p.translate[1], 400.0);
    }

    #[test]
    fn orthographic_uses_fixed_radius_and_rotation() {
        let options = cfg(json!({
            "scope": "world",
            "projection": "orthographic",
            "projectionConfig": {"rotation": [97, -30]}
        }));
        let p = projection_for(&options, &FeatureCollection::default(), 960.0, 540.0)
            .expect("projection");
        assert_eq!(p.scale, 250.0);
        assert_eq!(p.rotation, [97.0, -30.0]);
        assert_eq!(
            sphere_outline(&p),
            "M480,50a250,250 0 1,1 0,500a250,250 0 1,1 0,-500Z"
        );
    }

    #[test]
    fn other_scopes_fit_their_regions() {
        let features = FeatureCollection {
            features: vec![square("A", 0.0, 0.0, 10.0), square("B", 10.0, 0.0, 10.0)],
        };
        let options = cfg(json!({"scope": "regions", "projection": "equirectangular"}));
        let p = projection_for(&options, &features, 400.0, 300.0).expect("projection");

        let engine = layers::Cartographer::new(p);
        let bounds = features
            .features
            .iter()
            .filter_map(|f| layers::GeometryEngine::bounds(&engine, &f.geometry))
            .reduce(foundation::Aabb2::union)
            .expect("bounds");
        // 20 degrees wide, 10 tall: width is the binding side.
        assert_close(bounds.width(), 400.0 * 0.95);
        assert_close(bounds.center()[0], 200.0);
        assert_close(bounds.center()[1], 150.0);
    }

    #[test]
    fn explicit_projection_config_wins() {
        let options = cfg(json!({
            "scope": "world",
            "projectionConfig": {"scale": 100, "translate": [1, 2]}
        }));
        let p = projection_for(&options, &FeatureCollection::default(), 960.0, 540.0)
            .expect("projection");
        assert_eq!(p.scale, 100.0);
        assert_eq!(p.translate, [1.0, 2.0]);
    }

    #[test]
    fn unknown_projection_is_an_error() {
        let options = cfg(json!({"projection": "albersUsa"}));
        let err = projection_for(&options, &FeatureCollection::default(), 960.0, 540.0)
            .unwrap_err();
        assert!(matches!(err, MapError::UnknownProjection(name) if name == "albersUsa"));
    }
}
