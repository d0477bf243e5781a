use serde_json::Value;

/// Nesting beyond this is treated as "not found".
pub const MAX_DEPTH: usize = 1000;

/// Check whether any string anywhere inside `node` contains `needle`.
///
/// Object keys are ignored, only values are searched. Numbers, booleans and
/// nulls never match.
pub fn contains(node: &Value, needle: &str) -> bool {
    contains_at(node, needle, 0)
}

fn contains_at(node: &Value, needle: &str, depth: usize) -> bool {
    if depth > MAX_DEPTH {
        return false;
    }
    match node {
        Value::Object(map) => map.values().any(|v| contains_at(v, needle, depth + 1)),
        Value::Array(items) => items.iter().any(|v| contains_at(v, needle, depth + 1)),
        Value::String(s) => s.contains(needle),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contains_nested_string() {
        let obj = json!({"a": {"b": ["xyz123"]}});
        assert!(contains(&obj, "xyz1"));
    }

    #[test]
    fn test_contains_empty_object() {
        assert!(!contains(&json!({}), "x"));
    }

    #[test]
    fn test_contains_array_without_match() {
        assert!(!contains(&json!(["a", "b"]), "c"));
    }

    #[test]
    fn test_contains_ignores_keys_and_non_strings() {
        let obj = json!({"image": 42, "enabled": true, "other": null});
        assert!(!contains(&obj, "image"));
        assert!(!contains(&obj, "42"));
    }

    #[test]
    fn test_contains_image_reference_in_pod_spec() {
        let pod = json!({
            "metadata": {"name": "web-1"},
            "spec": {
                "containers": [
                    {"name": "web", "image": "registry/app/web:108f2be974f8e1e5fec8"}
                ]
            }
        });
        assert!(contains(&pod, "web:108f2be974f8e1e5fec8"));
        assert!(!contains(&pod, "web:0b81a958"));
    }

    #[test]
    fn test_contains_gives_up_beyond_max_depth() {
        let mut deep = json!("needle");
        for _ in 0..MAX_DEPTH + 5 {
            deep = json!([deep]);
        }
        assert!(!contains(&deep, "needle"));

        let mut shallow = json!("needle");
        for _ in 0..10 {
            shallow = json!({ "k": shallow });
        }
        assert!(contains(&shallow, "needle"));
    }
}
