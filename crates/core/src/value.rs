//! Operations over JSON document trees.
//!
//! Documents are plain [`serde_json::Value`]s: `Null`, scalars, sequences and
//! keyed maps. Keyed maps merge recursively; everything else is replaced
//! wholesale, sequences included.

use serde_json::{Map, Value};

/// Recursively merge `source` into `target`.
///
/// - Object into object: keys merge one by one, recursing on nested objects.
/// - Anything else: the target slot is replaced by a clone of `source`.
pub fn deep_merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, incoming) in source_map {
                match target_map.get_mut(key) {
                    Some(existing) if existing.is_object() && incoming.is_object() => {
                        deep_merge(existing, incoming);
                    }
                    _ => {
                        target_map.insert(key.clone(), incoming.clone());
                    }
                }
            }
        }
        (slot, incoming) => *slot = incoming.clone(),
    }
}

/// `true` when a value is missing or JSON `null`.
pub fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Return a copy of `value` with every object's keys sorted, recursively.
///
/// Hashes are computed over the canonical form so that two documents with the
/// same content but different key insertion order hash identically.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Length in bytes of the compact JSON serialization of `value`.
pub fn serialized_len(value: &Value) -> usize {
    serde_json::to_vec(value).map(|bytes| bytes.len()).unwrap_or(0)
}

/// Summarize the keys of an update payload, e.g. `2 changes (primary, status)`.
pub fn summarize_keys(value: &Value) -> String {
    match value.as_object() {
        Some(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            let shown = keys.iter().take(3).copied().collect::<Vec<_>>().join(", ");
            let ellipsis = if keys.len() > 3 { "..." } else { "" };
            format!("{} changes ({shown}{ellipsis})", keys.len())
        }
        None => "Updated".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_merge_recursively() {
        let mut target = json!({"colors": {"primary": {"500": "#000"}, "neutrals": {}}});
        deep_merge(&mut target, &json!({"colors": {"primary": {"600": "#111"}}}));
        assert_eq!(
            target,
            json!({"colors": {"primary": {"500": "#000", "600": "#111"}, "neutrals": {}}})
        );
    }

    #[test]
    fn sequences_are_replaced_not_merged() {
        let mut target = json!({"icons": {"libraries": ["a", "b"]}});
        deep_merge(&mut target, &json!({"icons": {"libraries": ["c"]}}));
        assert_eq!(target["icons"]["libraries"], json!(["c"]));
    }

    #[test]
    fn scalar_replaces_object_and_object_replaces_scalar() {
        let mut target = json!({"theme": {"primaryTheme": null}, "x": 1});
        deep_merge(&mut target, &json!({"theme": "dark", "x": {"nested": true}}));
        assert_eq!(target, json!({"theme": "dark", "x": {"nested": true}}));
    }

    #[test]
    fn new_keys_are_added() {
        let mut target = json!({});
        deep_merge(&mut target, &json!({"layout": {"breakpoints": {"sm": "640px"}}}));
        assert_eq!(target["layout"]["breakpoints"]["sm"], "640px");
    }

    #[test]
    fn canonicalize_sorts_keys_recursively() {
        let value = json!({"b": 1, "a": {"d": [ {"z": 1, "y": 2} ], "c": 2}});
        let canonical = serde_json::to_string(&canonicalize(&value)).unwrap();
        assert_eq!(canonical, r#"{"a":{"c":2,"d":[{"y":2,"z":1}]},"b":1}"#);
    }

    #[test]
    fn absent_covers_missing_and_null() {
        assert!(is_absent(None));
        assert!(is_absent(Some(&Value::Null)));
        assert!(!is_absent(Some(&json!(0))));
    }

    #[test]
    fn summarize_keys_truncates_after_three() {
        let summary = summarize_keys(&json!({"a": 1, "b": 2, "c": 3, "d": 4}));
        assert_eq!(summary, "4 changes (a, b, c...)");
        assert_eq!(summarize_keys(&json!("x")), "Updated");
    }
}
