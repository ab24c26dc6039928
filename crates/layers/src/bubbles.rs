//! `bubbles`: circles placed by latitude/longitude or at a region's
//! centroid.

use foundation::math::LonLat;
use options::{Config, Value};
use scene::{JoinKey, NodeId, Transition};
use tracing::{debug, warn};

use crate::context::RenderContext;
use crate::engine::coord;
use crate::error::LayerError;
use crate::layer::LayerHandle;
use crate::symbology::{fill_for, val};

const GROW_MS: u32 = 400;

pub fn handle_bubbles(
    ctx: &mut RenderContext<'_>,
    layer: LayerHandle,
    data: &Value,
    options: &Config,
) -> Result<(), LayerError> {
    let Some(items) = data.as_array() else {
        return Err(LayerError::NotAnArray("bubbles"));
    };

    let key = options.get("key").cloned().unwrap_or_default();
    let key_of = |datum: &Value, i: usize| join_key(&key, datum, i);
    let join = ctx.surface.join(
        layer.node(),
        "circle",
        "datamaps-bubble",
        items,
        JoinKey::Key(&key_of),
    )?;

    let animate = options.get_bool("animate").unwrap_or(true);
    for (node, datum) in &join.enter {
        draw_entered(ctx, *node, datum, options, animate)?;
    }

    for (node, datum) in join.enter.iter().chain(&join.update) {
        if let Some(r) = option_val(datum, options, "radius").to_attr_string() {
            ctx.surface
                .transition(*node, Transition::new().duration(GROW_MS).attr("r", r))?;
        }
    }

    let exit_delay = options.get_f64("exitDelay").unwrap_or(100.0).max(0.0) as u32;
    for node in &join.exit {
        ctx.surface.transition(
            *node,
            Transition::new().delay(exit_delay).attr("r", "0").remove(),
        )?;
    }

    debug!(
        entered = join.enter.len(),
        updated = join.update.len(),
        exiting = join.exit.len(),
        "bubbles drawn"
    );
    Ok(())
}

/// Join key: the `key` option's result when it is a callback, else the
/// datum's JSON text.
fn join_key(key: &Value, datum: &Value, index: usize) -> String {
    match key {
        Value::Callback(cb) => {
            let k = cb.call(datum, &Value::from(index as f64));
            k.to_attr_string().unwrap_or_else(|| k.to_json_string())
        }
        _ => datum.to_json_string(),
    }
}

fn option_val(datum: &Value, options: &Config, key: &str) -> Value {
    val(
        datum.field(key),
        options.get(key).unwrap_or(&Value::Null),
        datum,
    )
}

fn position(ctx: &RenderContext<'_>, datum: &Value) -> Option<[f64; 2]> {
    if let (Some(lat), Some(lon)) = (
        datum.field("latitude").as_f64(),
        datum.field("longitude").as_f64(),
    ) {
        return ctx.engine.project(LonLat::new(lon, lat));
    }
    ctx.region_point(datum.field("centered").as_str()?)
}

fn draw_entered(
    ctx: &mut RenderContext<'_>,
    node: NodeId,
    datum: &Value,
    options: &Config,
    animate: bool,
) -> Result<(), LayerError> {
    let xy = position(ctx, datum);
    if xy.is_none() {
        warn!(datum = %datum.to_json_string(), "bubble has no visible position");
    }
    let radius = if animate {
        Value::from(0)
    } else {
        option_val(datum, options, "radius")
    };
    let filter = ctx
        .filters
        .get_str(&option_val(datum, options, "filterKey").to_attr_string().unwrap_or_default())
        .map(str::to_string);
    let fill = fill_for(ctx.fills, &option_val(datum, options, "fillKey"))
        .or(ctx.default_fill())
        .map(str::to_string);
    let hover = options.get_bool("highlightOnHover").unwrap_or(false)
        || options.get_bool("popupOnHover").unwrap_or(false);

    let mut el = ctx.surface.edit(node)?;
    if let Some([x, y]) = xy {
        el.attr("cx", coord(x)).attr("cy", coord(y));
    }
    el.attr_value("r", &radius)
        .attr("data-info", datum.to_json_string())
        .listener_options(options.clone().into());
    if let Some(filter) = filter {
        el.attr("filter", filter);
    }
    el.style_value("stroke", &option_val(datum, options, "borderColor"))
        .style_value("stroke-width", &option_val(datum, options, "borderWidth"))
        .style_value("stroke-opacity", &option_val(datum, options, "borderOpacity"))
        .style_value("fill-opacity", &option_val(datum, options, "fillOpacity"));
    if let Some(fill) = fill {
        el.style("fill", fill);
    }

    if hover {
        ctx.surface.on(node, "mouseover", "hover")?;
        ctx.surface.on(node, "mouseout", "unhover")?;
    }
    Ok(())
}
