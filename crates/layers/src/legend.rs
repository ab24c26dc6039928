//! `legend`: a definition list of the instance fills.

use options::{Config, Value};
use tracing::debug;

use crate::context::RenderContext;
use crate::error::LayerError;
use crate::layer::LayerHandle;

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Renders `div.datamaps-legend` inside a `foreignObject` on the layer.
///
/// Legend settings come in as the call's data: `legendTitle`,
/// `defaultFillName` (the default fill is listed only when named) and
/// `labels` (fill key to label). Fills are listed in the order they were
/// configured.
pub fn handle_legend(
    ctx: &mut RenderContext<'_>,
    layer: LayerHandle,
    data: &Value,
    _options: &Config,
) -> Result<(), LayerError> {
    if ctx.fills.is_empty() {
        return Ok(());
    }

    let mut entries: Vec<(String, String)> = Vec::new();
    for (key, color) in ctx.fills.iter() {
        let Some(color) = color.to_attr_string() else {
            continue;
        };
        let label = if key == "defaultFill" {
            match data.field("defaultFillName").to_attr_string() {
                Some(name) if !name.is_empty() => name,
                _ => continue,
            }
        } else {
            data.field("labels")
                .field(key)
                .to_attr_string()
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| format!("{key}: "))
        };
        entries.push((label, color));
    }

    for child in ctx.surface.children(layer.node()).to_vec() {
        ctx.surface.remove(child)?;
    }

    let host = ctx.surface.append(layer.node(), "foreignObject")?;
    ctx.surface
        .edit(host)?
        .attr("width", "100%")
        .attr("height", "100%");
    let div = ctx.surface.append(host, "div")?;
    ctx.surface
        .edit(div)?
        .class("datamaps-legend")
        .attr("xmlns", XHTML_NS);

    if let Some(title) = data.field("legendTitle").to_attr_string() {
        let h2 = ctx.surface.append(div, "h2")?;
        ctx.surface.edit(h2)?.text(title);
    }
    let dl = ctx.surface.append(div, "dl")?;
    for (label, color) in &entries {
        let dt = ctx.surface.append(dl, "dt")?;
        ctx.surface.edit(dt)?.text(label.as_str());
        let dd = ctx.surface.append(dl, "dd")?;
        ctx.surface
            .edit(dd)?
            .style("background-color", color.as_str())
            .text("\u{a0}");
    }

    debug!(entries = entries.len(), "legend drawn");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::handle_legend;
    use crate::testing::Fixture;
    use options::{Config, Value};
    use pretty_assertions::assert_eq;
    use scene::svg::node_to_svg;
    use serde_json::json;

    #[test]
    fn default_fill_needs_a_name() {
        let mut fx = Fixture::new();
        let layer = fx.layer("legend");
        handle_legend(&mut fx.ctx(), layer, &Value::Null, &Config::new()).expect("drawn");
        assert_eq!(
            node_to_svg(&fx.surface, layer.node()),
            "<g class=\"legend\"><foreignObject width=\"100%\" height=\"100%\">\
             <div class=\"datamaps-legend\" xmlns=\"http://www.w3.org/1999/xhtml\">\
             <dl><dt>high: </dt><dd style=\"background-color: #CC4731\">\u{a0}</dd></dl>\
             </div></foreignObject></g>"
        );
    }

    #[test]
    fn title_labels_and_default_name() {
        let mut fx = Fixture::new();
        let layer = fx.layer("legend");
        let data = Value::from(json!({
            "legendTitle": "Votes",
            "defaultFillName": "No data",
            "labels": {"high": "Lots"}
        }));
        handle_legend(&mut fx.ctx(), layer, &data, &Config::new()).expect("drawn");

        let svg = node_to_svg(&fx.surface, layer.node());
        assert!(svg.contains("<h2>Votes</h2>"));
        assert!(svg.contains("<dt>No data</dt><dd style=\"background-color: #ABDDA4\">"));
        assert!(svg.contains("<dt>Lots</dt>"));
        assert!(!svg.contains("high: "));
    }

    #[test]
    fn no_fills_no_legend() {
        let mut fx = Fixture::new();
        fx.fills = Config::new();
        let layer = fx.layer("legend");
        handle_legend(&mut fx.ctx(), layer, &Value::Null, &Config::new()).expect("drawn");
        assert!(fx.surface.children(layer.node()).is_empty());
    }
}
