//! Defaults merger.
//!
//! `merge(target, fallbacks)` walks each fallback in order and, for every key
//! it defines, copies the value into `target` when the target's value for
//! that key is loose-null (absent or `Null`). `false`, `0`, `""` and empty
//! arrays count as set. The first fallback to supply a key wins; later
//! fallbacks see the key as set and skip it.
//!
//! Copied values are structurally independent of the fallback: arrays and
//! objects are cloned all the way down. Callbacks are shared, never cloned.
//! Fallbacks are only ever borrowed, so a merge can't mutate them.

use tracing::warn;

use crate::config::Config;
use crate::value::Value;

/// Fills loose-null keys of `target` from `fallbacks`, in order.
///
/// `None` entries are skipped. Returns `target` for chaining.
pub fn merge<'a>(target: &'a mut Config, fallbacks: &[Option<&Config>]) -> &'a mut Config {
    for source in fallbacks.iter().flatten() {
        for (key, value) in source.iter() {
            if target.is_set(key) {
                continue;
            }
            target.set(key, copy_for_merge(key, value));
        }
    }
    target
}

/// Like [`merge`], but also fills nested objects that are already present
/// on `target` instead of leaving them untouched.
pub fn merge_deep<'a>(target: &'a mut Config, fallbacks: &[Option<&Config>]) -> &'a mut Config {
    for source in fallbacks.iter().flatten() {
        for (key, value) in source.iter() {
            if !target.is_set(key) {
                target.set(key, copy_for_merge(key, value));
                continue;
            }
            if let (Some(nested), Value::Object(nested_source)) =
                (target.get_object_mut(key), value)
            {
                merge_deep(nested, &[Some(nested_source)]);
            }
        }
    }
    target
}

/// Value-level form of [`merge`] with a single fallback: a loose-null
/// `target` takes a copy of `fallback`, and two objects merge key by key.
/// Any other `target` is left as is.
pub fn merge_value(target: &mut Value, fallback: &Value) {
    match (target, fallback) {
        (Value::Object(t), Value::Object(f)) => {
            merge(t, &[Some(f)]);
        }
        (t, f) if t.is_loose_null() => *t = copy_for_merge("(value)", f),
        _ => {}
    }
}

fn copy_for_merge(key: &str, value: &Value) -> Value {
    // Non-finite numbers have no JSON form; they are kept as-is rather than
    // nulled so the caller sees what the fallback actually held.
    if value.has_non_json_number() {
        warn!(key, "fallback option holds a non-finite number; copied verbatim");
    }
    // `Value::clone` copies plain data structurally and shares callbacks.
    value.clone()
}
