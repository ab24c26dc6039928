//! Per-datum style resolution.

use options::{Config, Value};

/// A datum's own setting wins over the option; a callback is called with
/// the datum.
pub fn val(own: &Value, option: &Value, datum: &Value) -> Value {
    pick(own, option).resolve(datum, &Value::Null)
}

/// Like [`val`] for region data: callbacks receive `(geography, data)`.
pub fn val_region(own: &Value, option: &Value, geography: &Value, data: &Value) -> Value {
    pick(own, option).resolve(geography, data)
}

fn pick<'v>(own: &'v Value, option: &'v Value) -> &'v Value {
    if own.is_loose_null() { option } else { own }
}

/// Color registered under a fill key.
pub fn fill_for<'f>(fills: &'f Config, key: &Value) -> Option<&'f str> {
    let key = key.to_attr_string()?;
    fills.get_str(&key)
}

/// Fill of a region at draw time: its `fillKey` when that names a fill,
/// then its `fillColor`, then `defaultFill`.
pub fn region_fill(fills: &Config, geography: &Value, data: &Value) -> Option<String> {
    let key = data.field("fillKey");
    if !key.is_loose_null()
        && let Some(color) = fill_for(fills, &val_region(key, &Value::Null, geography, data))
    {
        return Some(color.to_string());
    }
    let default = fills.get("defaultFill").cloned().unwrap_or_default();
    val_region(data.field("fillColor"), &default, geography, data).to_attr_string()
}

/// Fill for a choropleth update entry: a bare string is the color itself;
/// objects use `color`, then `fillColor`, then the fill named by `fillKey`.
pub fn update_fill(fills: &Config, entry: &Value) -> Option<String> {
    if let Some(color) = entry.as_str() {
        return Some(color.to_string());
    }
    for key in ["color", "fillColor"] {
        if let Some(color) = entry.field(key).as_str() {
            return Some(color.to_string());
        }
    }
    fill_for(fills, entry.field("fillKey")).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{fill_for, region_fill, update_fill, val};
    use options::{Callback, Config, Value};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fills() -> Config {
        Config::from_json(json!({"defaultFill": "#ABDDA4", "high": "#CC4731"})).expect("fills")
    }

    #[test]
    fn datum_value_wins_over_option() {
        let datum = Value::from(json!({"radius": 12}));
        assert_eq!(
            val(datum.field("radius"), &Value::from(5), &datum),
            Value::from(12)
        );
        assert_eq!(val(datum.field("borderWidth"), &Value::from(2), &datum), Value::from(2));
    }

    #[test]
    fn callbacks_receive_the_datum() {
        let datum = Value::from(json!({"votes": 8}));
        let radius = Value::from(Callback::new(|d, _| {
            Value::from(d.field("votes").as_f64().unwrap_or(0.0) * 2.0)
        }));
        assert_eq!(val(&Value::Null, &radius, &datum), Value::from(16));
    }

    #[test]
    fn region_fill_precedence() {
        let geo = Value::from(json!({"id": "USA"}));
        assert_eq!(
            region_fill(&fills(), &geo, &Value::from(json!({"fillKey": "high"}))),
            Some("#CC4731".to_string())
        );
        assert_eq!(
            region_fill(&fills(), &geo, &Value::from(json!({"fillKey": "nope", "fillColor": "#111"}))),
            Some("#111".to_string())
        );
        assert_eq!(
            region_fill(&fills(), &geo, &Value::Null),
            Some("#ABDDA4".to_string())
        );
    }

    #[test]
    fn update_fill_precedence() {
        let f = fills();
        assert_eq!(update_fill(&f, &Value::from("#000")), Some("#000".to_string()));
        assert_eq!(
            update_fill(&f, &Value::from(json!({"fillKey": "high", "fillColor": "#222"}))),
            Some("#222".to_string())
        );
        assert_eq!(
            update_fill(&f, &Value::from(json!({"fillKey": "high"}))),
            Some("#CC4731".to_string())
        );
        assert_eq!(update_fill(&f, &Value::from(json!({"fillKey": "none"}))), None);
    }

    #[test]
    fn numeric_fill_keys_are_stringified() {
        let f = Config::new().with("1", "#f00");
        assert_eq!(fill_for(&f, &Value::from(1)), Some("#f00"));
    }
}
