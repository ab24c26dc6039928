//! Built-in instance options. Caller options are merged over these.

use options::{Callback, Config, Value};
use serde_json::json;

pub const DEFAULT_WIDTH: f64 = 960.0;
pub const DEFAULT_ASPECT_RATIO: f64 = 0.5625;

pub fn default_options() -> Config {
    let mut options = Config::from_json(json!({
        "scope": "world",
        "responsive": false,
        "aspectRatio": DEFAULT_ASPECT_RATIO,
        "width": DEFAULT_WIDTH,
        "height": null,
        "projection": "equirectangular",
        "projectionConfig": {"rotation": [97, 0]},
        "dataType": "json",
        "dataUrl": null,
        "data": {},
        "zoomScale": [1, 10],
        "fills": {"defaultFill": "#ABDDA4"},
        "filters": {},
        "geographyConfig": {
            "dataUrl": null,
            "hideAntarctica": true,
            "hideHawaiiAndAlaska": false,
            "borderWidth": 1,
            "borderOpacity": 1,
            "borderColor": "#FDFDFD",
            "popupOnHover": true,
            "highlightOnHover": true,
            "highlightFillColor": "#FC8D59",
            "highlightBorderColor": "rgba(250, 15, 160, 0.2)",
            "highlightBorderWidth": 2,
            "highlightBorderOpacity": 1
        },
        "bubblesConfig": {
            "borderWidth": 2,
            "borderOpacity": 1,
            "borderColor": "#FFFFFF",
            "popupOnHover": true,
            "radius": null,
            "fillOpacity": 0.75,
            "animate": true,
            "highlightOnHover": true,
            "highlightFillColor": "#FC8D59",
            "highlightBorderColor": "rgba(250, 15, 160, 0.2)",
            "highlightBorderWidth": 2,
            "highlightBorderOpacity": 1,
            "highlightFillOpacity": 0.85,
            "exitDelay": 100
        },
        "arcConfig": {
            "strokeColor": "#DD1C77",
            "strokeWidth": 1,
            "arcSharpness": 1,
            "animationSpeed": 600,
            "greatArc": false,
            "popupOnHover": false
        },
        "labelsConfig": {
            "labelColor": "#000",
            "fontSize": 10,
            "fontFamily": "Verdana",
            "lineWidth": 1
        },
        "graticuleConfig": {
            "step": [10, 10],
            "precision": 2.5
        }
    }))
    .unwrap_or_default();

    if let Some(geo) = options.get_object_mut("geographyConfig") {
        geo.set("popupTemplate", Callback::new(geography_popup));
    }
    if let Some(bubbles) = options.get_object_mut("bubblesConfig") {
        bubbles.set("popupTemplate", Callback::new(bubble_popup));
        bubbles.set("key", Callback::new(|datum, _| datum.to_json_string().into()));
    }
    if let Some(arc) = options.get_object_mut("arcConfig") {
        arc.set("popupTemplate", Callback::new(arc_popup));
    }
    options
}

/// `(geography, data)`: the region's name.
fn geography_popup(geography: &Value, _data: &Value) -> Value {
    let name = geography
        .field("properties")
        .field("name")
        .to_attr_string()
        .unwrap_or_default();
    format!(r#"<div class="hoverinfo"><strong>{name}</strong></div>"#).into()
}

/// `(datum, datum)`: the bubble's `name`.
fn bubble_popup(_datum: &Value, data: &Value) -> Value {
    let name = data.field("name").to_attr_string().unwrap_or_default();
    format!(r#"<div class="hoverinfo"><strong>{name}</strong></div>"#).into()
}

fn arc_popup(_datum: &Value, data: &Value) -> Value {
    let end = |key: &str| {
        let v = data.field(key);
        v.as_str()
            .map(str::to_string)
            .unwrap_or_else(|| v.to_json_string())
    };
    format!(
        r#"<div class="hoverinfo"><strong>Arc</strong><br>Origin: {}<br>Destination: {}</div>"#,
        end("origin"),
        end("destination"),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::default_options;
    use options::Value;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn sections_carry_their_defaults() {
        let options = default_options();
        assert_eq!(options.get_str("scope"), Some("world"));
        assert_eq!(options.get_pair("zoomScale"), Some([1.0, 10.0]));
        assert_eq!(
            options.get_object("fills").map(|f| f.to_json()),
            Some(json!({"defaultFill": "#ABDDA4"}))
        );
        let arc = options.get_object("arcConfig").expect("arcConfig");
        assert_eq!(arc.get_f64("animationSpeed"), Some(600.0));
        assert_eq!(arc.get_bool("greatArc"), Some(false));
        assert!(options.get("height").is_some_and(Value::is_loose_null));
    }

    #[test]
    fn popup_templates_render_names() {
        let options = default_options();
        let geo = options.get_object("geographyConfig").expect("geo");
        let popup = geo.get_callback("popupTemplate").expect("popup");
        let geography = Value::from(json!({"id": "FRA", "properties": {"name": "France"}}));
        assert_eq!(
            popup.call(&geography, &Value::Null).as_str(),
            Some(r#"<div class="hoverinfo"><strong>France</strong></div>"#)
        );

        let arc = options.get_object("arcConfig").expect("arc");
        let popup = arc.get_callback("popupTemplate").expect("popup");
        let datum = Value::from(json!({"origin": "FRA", "destination": {"latitude": 1}}));
        assert_eq!(
            popup.call(&datum, &datum).as_str(),
            Some(
                r#"<div class="hoverinfo"><strong>Arc</strong><br>Origin: FRA<br>Destination: {"latitude":1}</div>"#
            )
        );
    }

    #[test]
    fn each_call_builds_fresh_callbacks() {
        let (a, b) = (default_options(), default_options());
        let key = |o: &options::Config| {
            o.get_object("bubblesConfig")
                .and_then(|b| b.get_callback("key"))
                .cloned()
                .expect("key")
        };
        assert_ne!(key(&a), key(&b));
    }
}
