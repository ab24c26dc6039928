//! `arc`: curved connectors between two places.
//!
//! Each datum has an `origin` and a `destination`, each either a region id
//! or a `{latitude, longitude}` object. Arcs are drawn as a smooth cubic
//! bump above the straight line, or as the great circle when `greatArc` is
//! set, then revealed with a dash-offset animation.

use foundation::math::{LonLat, angular_distance, great_arc};
use formats::Geometry;
use options::{Config, Value, merge};
use scene::{JoinKey, NodeId, Transition};
use tracing::{debug, warn};

use crate::context::RenderContext;
use crate::engine::coord;
use crate::error::LayerError;
use crate::layer::LayerHandle;
use crate::symbology::val;

const REVEAL_DELAY_MS: u32 = 100;

/// Samples used to measure a bump curve's length.
const LENGTH_SAMPLES: usize = 32;

pub fn handle_arcs(
    ctx: &mut RenderContext<'_>,
    layer: LayerHandle,
    data: &Value,
    options: &Config,
) -> Result<(), LayerError> {
    let Some(items) = data.as_array() else {
        return Err(LayerError::NotAnArray("arcs"));
    };
    let items = items
        .iter()
        .enumerate()
        .map(|(i, item)| normalize(i, item))
        .collect::<Result<Vec<_>, _>>()?;

    let key_of = |datum: &Value, _: usize| datum.to_json_string();
    let join = ctx.surface.join(
        layer.node(),
        "path",
        "datamaps-arc",
        &items,
        JoinKey::Key(&key_of),
    )?;

    for (node, datum) in &join.enter {
        draw_entered(ctx, *node, datum, options)?;
    }
    for node in &join.exit {
        ctx.surface
            .transition(*node, Transition::new().style("opacity", "0").remove())?;
    }

    debug!(
        entered = join.enter.len(),
        exiting = join.exit.len(),
        "arcs drawn"
    );
    Ok(())
}

/// Folds a legacy nested `options` object into the datum itself and checks
/// both endpoints are present. The caller's data is left untouched.
fn normalize(index: usize, item: &Value) -> Result<Value, LayerError> {
    let Some(obj) = item.as_object() else {
        return Err(LayerError::InvalidDatum(format!("arc {index} is not an object")));
    };
    let mut datum = obj.clone();
    if let Some(Value::Object(nested)) = datum.remove("options") {
        merge(&mut datum, &[Some(&nested)]);
    }
    for end in ["origin", "destination"] {
        if !datum.is_set(end) {
            return Err(LayerError::InvalidDatum(format!("arc {index} has no {end}")));
        }
    }
    Ok(Value::Object(datum))
}

/// Geographic position of an arc endpoint.
fn location(ctx: &RenderContext<'_>, end: &Value, datum: &Value) -> Option<LonLat> {
    if let Some(id) = end.as_str() {
        return ctx.region_location(id);
    }
    let lat = end.field("latitude").resolve(datum, &Value::Null).as_f64()?;
    let lon = end.field("longitude").resolve(datum, &Value::Null).as_f64()?;
    Some(LonLat::new(lon, lat))
}

/// Screen position of an arc endpoint.
fn point(ctx: &RenderContext<'_>, end: &Value, datum: &Value) -> Option<[f64; 2]> {
    match end.as_str() {
        Some(id) => ctx.region_point(id),
        None => ctx.engine.project(location(ctx, end, datum)?),
    }
}

fn option_val(datum: &Value, options: &Config, key: &str) -> Value {
    val(datum.field(key), options.get(key).unwrap_or(&Value::Null), datum)
}

/// Path data and its approximate drawn length.
fn arc_path(
    ctx: &RenderContext<'_>,
    datum: &Value,
    options: &Config,
) -> Option<(String, f64)> {
    let origin = datum.field("origin");
    let destination = datum.field("destination");

    if options.get_bool("greatArc").unwrap_or(false) {
        let (a, b) = (
            location(ctx, origin, datum)?,
            location(ctx, destination, datum)?,
        );
        let segments = angular_distance(a, b).to_degrees().ceil().max(1.0) as usize;
        let line: Vec<[f64; 2]> = great_arc(a, b, segments)
            .into_iter()
            .map(|p| [p.lon, p.lat])
            .collect();
        let projected: Vec<[f64; 2]> = line
            .iter()
            .filter_map(|p| ctx.engine.project(LonLat::new(p[0], p[1])))
            .collect();
        let d = ctx.engine.path(&Geometry::LineString(line))?;
        return Some((d, polyline_length(&projected)));
    }

    let p0 = point(ctx, origin, datum)?;
    let p3 = point(ctx, destination, datum)?;
    let sharpness = option_val(datum, options, "arcSharpness")
        .as_f64()
        .unwrap_or(1.0);
    let mid = [(p0[0] + p3[0]) / 2.0, (p0[1] + p3[1]) / 2.0];
    let control = [mid[0] + 50.0 * sharpness, mid[1] - 75.0 * sharpness];
    let d = format!(
        "M{},{}S{},{},{},{}",
        coord(p0[0]),
        coord(p0[1]),
        coord(control[0]),
        coord(control[1]),
        coord(p3[0]),
        coord(p3[1]),
    );
    // A lone `S` reflects no previous control point, so the curve is the
    // cubic (p0, p0, control, p3).
    let samples: Vec<[f64; 2]> = (0..=LENGTH_SAMPLES)
        .map(|i| cubic(p0, p0, control, p3, i as f64 / LENGTH_SAMPLES as f64))
        .collect();
    Some((d, polyline_length(&samples)))
}

fn cubic(p0: [f64; 2], p1: [f64; 2], p2: [f64; 2], p3: [f64; 2], t: f64) -> [f64; 2] {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    [
        a * p0[0] + b * p1[0] + c * p2[0] + d * p3[0],
        a * p0[1] + b * p1[1] + c * p2[1] + d * p3[1],
    ]
}

fn polyline_length(points: &[[f64; 2]]) -> f64 {
    points
        .windows(2)
        .map(|w| ((w[1][0] - w[0][0]).powi(2) + (w[1][1] - w[0][1]).powi(2)).sqrt())
        .sum()
}

fn draw_entered(
    ctx: &mut RenderContext<'_>,
    node: NodeId,
    datum: &Value,
    options: &Config,
) -> Result<(), LayerError> {
    let path = arc_path(ctx, datum, options);
    if path.is_none() {
        warn!(datum = %datum.to_json_string(), "arc endpoint is not visible");
    }
    let speed = option_val(datum, options, "animationSpeed")
        .as_f64()
        .unwrap_or(600.0)
        .max(0.0) as u32;

    let mut el = ctx.surface.edit(node)?;
    el.style("stroke-linecap", "round")
        .style_value("stroke", &option_val(datum, options, "strokeColor"))
        .style("fill", "none")
        .style_value("stroke-width", &option_val(datum, options, "strokeWidth"))
        .attr("data-info", datum.to_json_string())
        .listener_options(options.clone().into());
    let Some((d, length)) = path else {
        return Ok(());
    };
    let length = coord(length);
    el.attr("d", d)
        .style("stroke-dasharray", format!("{length} {length}"))
        .style("stroke-dashoffset", length);

    if options.get_bool("popupOnHover").unwrap_or(false) {
        ctx.surface.on(node, "mouseover", "hover")?;
        ctx.surface.on(node, "mouseout", "unhover")?;
    }
    ctx.surface.transition(
        node,
        Transition::new()
            .delay(REVEAL_DELAY_MS)
            .duration(speed)
            .style("stroke-dashoffset", "0"),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::handle_arcs;
    use crate::error::LayerError;
    use crate::testing::Fixture;
    use options::{Config, Value};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn options() -> Config {
        Config::from_json(json!({
            "strokeColor": "#DD1C77",
            "strokeWidth": 1,
            "arcSharpness": 1,
            "animationSpeed": 600,
            "greatArc": false
        }))
        .expect("options")
    }

    #[test]
    fn non_array_data_fails_before_drawing() {
        let mut fx = Fixture::new();
        let layer = fx.layer("arc");
        let before = fx.surface.len();
        let err = handle_arcs(&mut fx.ctx(), layer, &Value::from("AAA"), &options()).unwrap_err();
        assert_eq!(err, LayerError::NotAnArray("arcs"));
        assert_eq!(fx.surface.len(), before);
    }

    #[test]
    fn missing_endpoint_fails_before_drawing() {
        let mut fx = Fixture::new();
        let layer = fx.layer("arc");
        let before = fx.surface.len();
        let err = handle_arcs(
            &mut fx.ctx(),
            layer,
            &Value::from(json!([{"origin": "AAA"}])),
            &options(),
        )
        .unwrap_err();
        assert!(matches!(err, LayerError::InvalidDatum(_)));
        assert_eq!(fx.surface.len(), before);
    }

    #[test]
    fn bump_path_between_regions() {
        let mut fx = Fixture::new();
        let layer = fx.layer("arc");
        let data = Value::from(json!([{"origin": "AAA", "destination": "BBB"}]));
        handle_arcs(&mut fx.ctx(), layer, &data, &options()).expect("drawn");

        let arc = fx.surface.select_all(layer.node(), "datamaps-arc")[0];
        let node = fx.surface.node(arc).expect("arc");
        // Centroids (5, -5) and (25, -5); midpoint (15, -5).
        assert_eq!(node.attr("d"), Some("M5,-5S65,-80,25,-5"));
        assert_eq!(node.style("stroke"), Some("#DD1C77"));
        assert_eq!(node.style("fill"), Some("none"));
        assert!(node.style("stroke-dasharray").is_some());

        fx.surface.settle();
        let node = fx.surface.node(arc).expect("arc");
        assert_eq!(node.style("stroke-dashoffset"), Some("0"));
    }

    #[test]
    fn nested_options_are_folded_into_the_datum() {
        let mut fx = Fixture::new();
        let layer = fx.layer("arc");
        let data = Value::from(json!([{
            "origin": {"latitude": 0, "longitude": 0},
            "destination": {"latitude": 0, "longitude": 10},
            "options": {"strokeWidth": 3, "arcSharpness": 0}
        }]));
        handle_arcs(&mut fx.ctx(), layer, &data, &options()).expect("drawn");

        let arc = fx.surface.select_all(layer.node(), "datamaps-arc")[0];
        let node = fx.surface.node(arc).expect("arc");
        assert_eq!(node.style("stroke-width"), Some("3"));
        assert_eq!(node.attr("d"), Some("M0,0S5,0,10,0"));
        assert!(!node.attr("data-info").unwrap_or_default().contains("options"));
    }

    #[test]
    fn great_arcs_follow_the_sphere() {
        let mut fx = Fixture::new();
        let layer = fx.layer("arc");
        let data = Value::from(json!([{
            "origin": {"latitude": 0, "longitude": 0},
            "destination": {"latitude": 0, "longitude": 10}
        }]));
        handle_arcs(&mut fx.ctx(), layer, &data, &options().with("greatArc", true)).expect("drawn");

        let arc = fx.surface.select_all(layer.node(), "datamaps-arc")[0];
        let d = fx
            .surface
            .node(arc)
            .and_then(|n| n.attr("d"))
            .expect("d")
            .to_string();
        assert!(d.starts_with("M0,0L1,0"));
        assert!(d.ends_with("L10,0"));
    }

    #[test]
    fn removed_arcs_fade_out() {
        let mut fx = Fixture::new();
        let layer = fx.layer("arc");
        let data = Value::from(json!([{"origin": "AAA", "destination": "BBB"}]));
        handle_arcs(&mut fx.ctx(), layer, &data, &options()).expect("drawn");
        handle_arcs(&mut fx.ctx(), layer, &Value::from(json!([])), &options()).expect("cleared");
        fx.surface.settle();
        assert!(fx.surface.select_all(layer.node(), "datamaps-arc").is_empty());
    }
}
