use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::callback::Callback;
use crate::config::Config;

/// Largest integer an `f64` holds exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Option value: plain data or a callback.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Config),
    Callback(Callback),
}

impl Value {
    /// `true` for `Null`. Absent keys are treated the same way by [`Config`].
    pub fn is_loose_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Config> {
        match self {
            Value::Object(config) => Some(config),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Config> {
        match self {
            Value::Object(config) => Some(config),
            _ => None,
        }
    }

    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Value::Callback(cb) => Some(cb),
            _ => None,
        }
    }

    /// Field of an object value; `Null` for anything else.
    pub fn field(&self, key: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.as_object().and_then(|o| o.get(key)).unwrap_or(&NULL)
    }

    /// Calls a callback with `(datum, context)`, or returns a copy of a plain value.
    pub fn resolve(&self, datum: &Value, context: &Value) -> Value {
        match self {
            Value::Callback(cb) => cb.call(datum, context),
            other => other.clone(),
        }
    }

    /// Text form used for attribute and style values. `None` for values
    /// without a scalar rendering.
    pub fn to_attr_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(format_number(*n)),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// `true` when the value (or anything nested in it) has no JSON
    /// representation.
    pub fn has_non_json_number(&self) -> bool {
        match self {
            Value::Number(n) => !n.is_finite(),
            Value::Array(items) => items.iter().any(Value::has_non_json_number),
            Value::Object(config) => config.values().any(Value::has_non_json_number),
            _ => false,
        }
    }

    /// Plain-data view; callbacks become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Callback(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(config) => config.to_json(),
        }
    }

    /// Compact JSON text, matching what a browser `JSON.stringify` produces
    /// for the same plain data.
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

/// Formats a number the way script hosts print it: integral values have no
/// fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Config> for Value {
    fn from(config: Config) -> Self {
        Value::Object(config)
    }
}

impl From<Callback> for Value {
    fn from(cb: Callback) -> Self {
        Value::Callback(cb)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null | Value::Callback(_) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(config) => {
                let mut map = serializer.serialize_map(Some(config.len()))?;
                for (k, v) in config.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::{Value, format_number};
    use crate::{Callback, Config};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn from_json_keeps_shape() {
        let v = Value::from(json!({"a": [1, "x", true, null], "b": {"c": 2.5}}));
        let obj = v.as_object().expect("object");
        let a = obj.get_array("a").expect("array");
        assert_eq!(a[0], Value::Number(1.0));
        assert_eq!(a[1], Value::from("x"));
        assert_eq!(a[2], Value::Bool(true));
        assert!(a[3].is_loose_null());
        assert_eq!(v.field("b").field("c").as_f64(), Some(2.5));
    }

    #[test]
    fn falsy_values_are_not_loose_null() {
        for v in [
            Value::Bool(false),
            Value::Number(0.0),
            Value::from(""),
            Value::Array(Vec::new()),
        ] {
            assert!(!v.is_loose_null(), "{v:?}");
        }
    }

    #[test]
    fn json_string_matches_script_output() {
        let v = Value::from(json!({"radius": 10, "fillKey": "USA", "ratio": 0.5}));
        assert_eq!(
            v.to_json_string(),
            r#"{"radius":10,"fillKey":"USA","ratio":0.5}"#
        );
    }

    #[test]
    fn callbacks_serialize_as_null() {
        let mut config = Config::new();
        config.set("popupTemplate", Callback::new(|_, _| Value::Null));
        config.set("n", 3);
        assert_eq!(
            serde_json::to_string(&Value::Object(config)).expect("serialize"),
            r#"{"popupTemplate":null,"n":3}"#
        );
    }

    #[test]
    fn resolve_calls_callbacks() {
        let cb = Value::Callback(Callback::new(|d, _| d.field("r").clone()));
        let datum = Value::from(json!({"r": 7}));
        assert_eq!(cb.resolve(&datum, &Value::Null), Value::Number(7.0));
        assert_eq!(Value::from(3).resolve(&datum, &Value::Null), Value::Number(3.0));
    }

    #[test]
    fn format_number_drops_integral_fraction() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-0.75), "-0.75");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn non_json_numbers_are_detected() {
        let v = Value::from(vec![Value::from(1.0), Value::from(f64::INFINITY)]);
        assert!(v.has_non_json_number());
        assert!(!Value::from(1.0).has_non_json_number());
    }
}
