//! Graticule lines and the `graticule` capability.

use formats::{Geometry, Position};
use options::{Config, Value};
use tracing::debug;

use crate::context::RenderContext;
use crate::error::LayerError;
use crate::layer::LayerHandle;

const EPS: f64 = 1e-6;

/// Major lines: meridians every 90° reaching the poles, plus the equator.
const MAJOR_STEP: [f64; 2] = [90.0, 360.0];

/// Meridians and parallels as one multi-line.
///
/// Minor lines every `step` degrees stay within ±80° latitude; major
/// meridians run pole to pole. Lines are sampled every `precision` degrees
/// so they curve under non-cylindrical projections.
pub fn graticule(step: [f64; 2], precision: f64) -> Geometry {
    let precision = if precision > 0.0 { precision } else { 2.5 };
    let [dx, dy] = step.map(|s| if s > 0.0 { s } else { 10.0 });
    let [mdx, mdy] = MAJOR_STEP;
    let (mx0, mx1, my0, my1) = (-180.0, 180.0, -90.0 + EPS, 90.0 - EPS);
    let (x0, x1, y0, y1) = (-180.0, 180.0, -80.0 - EPS, 80.0 + EPS);

    let mut lines = Vec::new();
    for x in range(mx0, mx1, mdx) {
        lines.push(meridian(x, my0, my1, precision));
    }
    for y in range(my0, my1, mdy) {
        lines.push(parallel(y, mx0, mx1, precision));
    }
    for x in range(x0, x1, dx).filter(|x| (x % mdx).abs() > EPS) {
        lines.push(meridian(x, y0, y1, precision));
    }
    for y in range(y0, y1, dy).filter(|y| (y % mdy).abs() > EPS) {
        lines.push(parallel(y, x0, x1, precision));
    }
    Geometry::MultiLineString(lines)
}

/// Multiples of `step` in `[start, end)`.
fn range(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> {
    let first = (start / step).ceil() * step;
    (0_u32..)
        .map(move |i| first + f64::from(i) * step)
        .take_while(move |v| *v < end)
}

fn samples(from: f64, to: f64, precision: f64) -> Vec<f64> {
    let mut out: Vec<f64> = (0_u32..)
        .map(|i| from + f64::from(i) * precision)
        .take_while(|v| *v < to)
        .collect();
    out.push(to);
    out
}

fn meridian(x: f64, y0: f64, y1: f64, precision: f64) -> Vec<Position> {
    samples(y0, y1, precision).into_iter().map(|y| [x, y]).collect()
}

fn parallel(y: f64, x0: f64, x1: f64, precision: f64) -> Vec<Position> {
    samples(x0, x1, precision).into_iter().map(|x| [x, y]).collect()
}

/// Draws one `path.datamaps-graticule` directly under the root, before the
/// subunits group so the lines sit beneath the regions.
///
/// The line spacing can be set per call through `data`
/// (`{"step": [15, 15]}`) or through the `graticuleConfig` defaults.
pub fn handle_graticule(
    ctx: &mut RenderContext<'_>,
    _layer: LayerHandle,
    data: &Value,
    options: &Config,
) -> Result<(), LayerError> {
    let setting = |key: &str| match data.field(key) {
        Value::Null => options.get(key).cloned().unwrap_or_default(),
        v => v.clone(),
    };
    let step = match setting("step").as_array() {
        Some([a, b, ..]) => [a.as_f64().unwrap_or(10.0), b.as_f64().unwrap_or(10.0)],
        _ => [10.0, 10.0],
    };
    let precision = setting("precision").as_f64().unwrap_or(2.5);

    let Some(d) = ctx.engine.path(&graticule(step, precision)) else {
        return Ok(());
    };
    let root = ctx.surface.root();
    let path = ctx.surface.insert_before(root, "path", Some(ctx.subunits))?;
    ctx.surface
        .edit(path)?
        .class("datamaps-graticule")
        .attr("d", d);
    debug!(?step, precision, "graticule drawn");
    Ok(())
}
