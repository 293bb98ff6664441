//! Canonical JSON serialization: recursively key-sorted, no whitespace.
//! Mirrors `json.dumps(sort_keys=True, separators=(",", ":"))`.

use serde_json::Value as Json;

fn sort_keys(value: &Json) -> Json {
    match value {
        Json::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Json::Object(sorted)
        }
        Json::Array(items) => Json::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

pub fn canonicalize(value: &Json) -> String {
    serde_json::to_string(&sort_keys(value)).expect("canonical JSON values never fail to serialize")
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_sorted_regardless_of_input_order() {
        let a = canonicalize(&json!({"b": 1, "a": 2}));
        let b = canonicalize(&json!({"a": 2, "b": 1}));
        assert_eq!(a, b);
        assert_eq!(a, r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn nested_objects_are_sorted_too() {
        let value = json!({"outer": {"z": 1, "a": 2}});
        assert_eq!(canonicalize(&value), r#"{"outer":{"a":2,"z":1}}"#);
    }
}
