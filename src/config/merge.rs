//! Field-by-field merging of configuration tiers.

use serde_json::Value;

/// Merge `overlay` onto `base`.
///
/// Objects merge key by key, recursively. Anything else in `overlay`
/// replaces the base value, except `null`, which means "not specified".
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold tiers in order, later tiers taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_sections_merge() {
        let defaults = json!({
            "notice": {"aliases": ["Template:Copied"], "new_target": "copied\n"},
            "edit": {"advert": "(CTE)"}
        });
        let project = json!({"notice": {"new_target": "Copied\n"}});
        let result = deep_merge(defaults, project);
        assert_eq!(result["notice"]["new_target"], "Copied\n");
        assert_eq!(result["notice"]["aliases"], json!(["Template:Copied"]));
        assert_eq!(result["edit"]["advert"], "(CTE)");
    }

    #[test]
    fn test_alias_lists_replaced() {
        let base = json!({"aliases": ["a", "b"]});
        let overlay = json!({"aliases": ["c"]});
        assert_eq!(deep_merge(base, overlay), json!({"aliases": ["c"]}));
    }

    #[test]
    fn test_null_tier_is_ignored() {
        let values = vec![json!({"a": 1}), Value::Null, json!({"b": {"c": null}})];
        assert_eq!(deep_merge_all(values), json!({"a": 1, "b": {"c": null}}));
    }
}
