//! Region paths (`path.datamaps-subunit`) and their choropleth fill.

use options::{Config, Value};
use scene::JoinKey;
use tracing::debug;

use crate::context::RenderContext;
use crate::error::LayerError;
use crate::symbology::region_fill;

/// Draws every feature in `ctx.features` into the subunits group, keyed by
/// region id. Regions already drawn are left alone.
///
/// `geo` is the instance `geographyConfig`: border width, opacity and color,
/// and whether hover interaction is wired.
pub fn draw_subunits(ctx: &mut RenderContext<'_>, geo: &Config) -> Result<usize, LayerError> {
    let datums: Vec<Value> = ctx.features.features.iter().map(|f| f.to_value()).collect();
    let key_of = |datum: &Value, i: usize| {
        datum
            .field("id")
            .to_attr_string()
            .unwrap_or_else(|| format!("#{i}"))
    };
    let join = ctx.surface.join(
        ctx.subunits,
        "path",
        "datamaps-subunit",
        &datums,
        JoinKey::Key(&key_of),
    )?;

    let hover = geo.get_bool("highlightOnHover").unwrap_or(false)
        || geo.get_bool("popupOnHover").unwrap_or(false);
    let keys: Vec<String> = datums.iter().enumerate().map(|(i, d)| key_of(d, i)).collect();
    let (features, fills, choropleth) = (ctx.features, ctx.fills, ctx.data);
    let none = Value::Null;
    for (node, geography) in &join.enter {
        let Some(feature) = ctx
            .surface
            .node(*node)
            .and_then(|n| n.key.as_deref())
            .and_then(|k| keys.iter().position(|x| x == k))
            .and_then(|i| features.features.get(i))
        else {
            continue;
        };
        let id = feature.id.as_deref().unwrap_or_default();
        let data = choropleth.get(id).unwrap_or(&none);
        let d = ctx.engine.path(&feature.geometry);
        let fill = region_fill(fills, geography, data);

        let mut el = ctx.surface.edit(*node)?;
        el.class(id);
        if let Some(d) = d {
            el.attr("d", d);
        }
        if !data.is_loose_null() {
            el.attr("data-info", data.to_json_string());
        }
        if let Some(fill) = fill {
            el.style("fill", fill);
        }
        el.style_value("stroke-width", geo.get("borderWidth").unwrap_or(&none))
            .style_value("stroke-opacity", geo.get("borderOpacity").unwrap_or(&none))
            .style_value("stroke", geo.get("borderColor").unwrap_or(&none));

        if hover {
            ctx.surface.on(*node, "mouseover", "hover")?;
            ctx.surface.on(*node, "mouseout", "unhover")?;
        }
    }

    debug!(regions = join.enter.len(), "subunits drawn");
    Ok(join.enter.len())
}

#[cfg(test)]
mod tests {
    use super::draw_subunits;
    use crate::testing::Fixture;
    use options::Config;
    use pretty_assertions::assert_eq;
    use scene::Surface;
    use serde_json::json;

    fn geo() -> Config {
        Config::from_json(json!({
            "borderWidth": 1,
            "borderOpacity": 1,
            "borderColor": "#FDFDFD",
            "popupOnHover": true
        }))
        .expect("geo")
    }

    /// The fixture pre-draws its regions; start from an empty group instead.
    fn blank(fx: &mut Fixture) {
        fx.surface = Surface::new("svg");
        let root = fx.surface.root();
        fx.subunits = fx.surface.append(root, "g").expect("g");
    }

    #[test]
    fn regions_get_paths_classes_and_fills() {
        let mut fx = Fixture::new();
        blank(&mut fx);
        fx.data = Config::from_json(json!({"AAA": {"fillKey": "high"}})).expect("data");
        assert_eq!(draw_subunits(&mut fx.ctx(), &geo()).expect("drawn"), 2);

        let paths = fx.surface.children(fx.subunits).to_vec();
        let a = fx.surface.node(paths[0]).expect("a");
        assert!(a.has_class("datamaps-subunit") && a.has_class("AAA"));
        assert_eq!(a.style("fill"), Some("#CC4731"));
        assert_eq!(a.attr("data-info"), Some(r#"{"fillKey":"high"}"#));
        assert_eq!(a.style("stroke"), Some("#FDFDFD"));
        assert!(a.attr("d").is_some_and(|d| d.starts_with('M') && d.ends_with('Z')));
        assert_eq!(a.attr("data-on-mouseover"), Some("hover"));

        let b = fx.surface.node(paths[1]).expect("b");
        assert_eq!(b.style("fill"), Some("#ABDDA4"));
        assert_eq!(b.attr("data-info"), None);
    }

    #[test]
    fn drawing_twice_adds_nothing() {
        let mut fx = Fixture::new();
        blank(&mut fx);
        draw_subunits(&mut fx.ctx(), &geo()).expect("drawn");
        assert_eq!(draw_subunits(&mut fx.ctx(), &geo()).expect("again"), 0);
        assert_eq!(fx.surface.children(fx.subunits).len(), 2);
    }
}
