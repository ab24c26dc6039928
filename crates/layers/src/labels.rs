//! `labels`: one text label per drawn region.
//!
//! Label settings may be passed as the call's data (`map.labels({...})`)
//! or as options; data wins. Labels sit left of and below the region
//! centroid. A handful of US states get hand-tuned offsets, and the small
//! north-eastern states are stacked off the coast with leader lines.

use foundation::math::LonLat;
use options::{Config, Value, format_number, merge};
use tracing::debug;

use crate::context::RenderContext;
use crate::engine::coord;
use crate::error::LayerError;
use crate::layer::LayerHandle;

const X_OFFSET: f64 = 7.5;
const Y_OFFSET: f64 = 5.0;

/// States labelled in a column off the Atlantic coast.
const SMALL_STATES: [&str; 9] = ["VT", "NH", "MA", "RI", "CT", "NJ", "DE", "MD", "DC"];

/// Top of the small-state label column.
const CALLOUT_START: LonLat = LonLat::new(-67.707617, 42.722131);

#[derive(Debug, Clone, PartialEq)]
struct LabelStyle {
    color: String,
    font_size: f64,
    font_family: String,
    line_width: f64,
}

impl LabelStyle {
    fn from_config(c: &Config) -> Self {
        Self {
            color: c.get_str("labelColor").unwrap_or("#000").to_string(),
            font_size: c.get_f64("fontSize").unwrap_or(10.0),
            font_family: c.get_str("fontFamily").unwrap_or("Verdana").to_string(),
            line_width: c.get_f64("lineWidth").unwrap_or(1.0),
        }
    }
}

fn offsets(id: &str) -> (f64, f64) {
    let x = match id {
        "FL" | "KY" | "MI" => -2.5,
        "NY" => -1.0,
        "LA" => 13.0,
        _ => X_OFFSET,
    };
    let y = if id == "MI" { 18.0 } else { Y_OFFSET };
    (x, y)
}

pub fn handle_labels(
    ctx: &mut RenderContext<'_>,
    layer: LayerHandle,
    data: &Value,
    options: &Config,
) -> Result<(), LayerError> {
    let mut settings = data.as_object().cloned().unwrap_or_default();
    merge(&mut settings, &[Some(options)]);
    let style = LabelStyle::from_config(&settings);
    let custom = settings.get_object("customLabelText");

    // Redrawn from scratch on every call.
    for child in ctx.surface.children(layer.node()).to_vec() {
        ctx.surface.remove(child)?;
    }

    let callout = ctx.engine.project(CALLOUT_START);
    let mut drawn = 0;
    for region in ctx.surface.select_all(ctx.subunits, "datamaps-subunit") {
        let Some(id) = ctx
            .surface
            .node(region)
            .and_then(|n| n.datum.as_ref())
            .and_then(|d| d.field("id").as_str())
            .map(str::to_string)
        else {
            continue;
        };
        let Some(center) = ctx.region_centroid(&id) else {
            continue;
        };

        let (dx, dy) = offsets(&id);
        let mut at = [center[0] - dx, center[1] + dy];

        if let (Some(slot), Some(start)) = (
            SMALL_STATES.iter().position(|s| *s == id),
            callout,
        ) {
            at = [start[0], start[1] + slot as f64 * (2.0 + style.font_size)];
            let line = ctx.surface.append(layer.node(), "line")?;
            ctx.surface
                .edit(line)?
                .attr("x1", coord(at[0] - 3.0))
                .attr("y1", coord(at[1] - 5.0))
                .attr("x2", coord(center[0]))
                .attr("y2", coord(center[1]))
                .style("stroke", style.color.as_str())
                .style("stroke-width", format_number(style.line_width));
        }

        let text = custom
            .and_then(|c| c.get(&id))
            .and_then(Value::to_attr_string)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| id.clone());
        let label = ctx.surface.append(layer.node(), "text")?;
        ctx.surface
            .edit(label)?
            .attr("x", coord(at[0]))
            .attr("y", coord(at[1]))
            .style("font-size", format!("{}px", format_number(style.font_size)))
            .style("font-family", style.font_family.as_str())
            .style("fill", style.color.as_str())
            .text(text);
        drawn += 1;
    }

    debug!(labels = drawn, "labels drawn");
    Ok(())
}
