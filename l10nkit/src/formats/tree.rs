//! Flattening of nested JSON/YAML trees into dot-joined keys, and the inverse.
//!
//! Objects contribute `parent.child` segments and sequences contribute `parent[i]`
//! segments. Unflattening only ever builds objects: a `[i]` suffix is kept as part of the
//! object key, and a path that needs a leaf to become a parent replaces the leaf.

use serde_json::{Map, Value as JsonValue};
use serde_yaml::{Mapping, Value as YamlValue};

use crate::types::Entry;

fn child_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn push_leaf(out: &mut Vec<Entry>, key: &str, value: Option<String>) {
    // A scalar document root has no key to file it under.
    if !key.is_empty() {
        out.push(Entry::new(key, value));
    }
}

pub(crate) fn flatten_json(value: &JsonValue, prefix: &str, out: &mut Vec<Entry>) {
    match value {
        JsonValue::Object(map) => {
            for (key, child) in map {
                flatten_json(child, &child_key(prefix, key), out);
            }
        }
        JsonValue::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                flatten_json(child, &format!("{}[{}]", prefix, i), out);
            }
        }
        JsonValue::String(s) => push_leaf(out, prefix, Some(s.clone())),
        JsonValue::Null => push_leaf(out, prefix, None),
        other => push_leaf(out, prefix, Some(other.to_string())),
    }
}

pub(crate) fn unflatten_json(entries: &[Entry]) -> JsonValue {
    let mut root = Map::new();
    for entry in entries {
        let parts: Vec<&str> = entry.key.split('.').collect();
        let leaf = match &entry.value {
            Some(v) => JsonValue::String(v.clone()),
            None => JsonValue::Null,
        };
        insert_json(&mut root, &parts, leaf);
    }
    JsonValue::Object(root)
}

fn insert_json(map: &mut Map<String, JsonValue>, parts: &[&str], leaf: JsonValue) {
    let Some((first, rest)) = parts.split_first() else {
        return;
    };
    if rest.is_empty() {
        map.insert(first.to_string(), leaf);
        return;
    }
    let child = map
        .entry(first.to_string())
        .or_insert_with(|| JsonValue::Object(Map::new()));
    if !child.is_object() {
        *child = JsonValue::Object(Map::new());
    }
    if let JsonValue::Object(child_map) = child {
        insert_json(child_map, rest, leaf);
    }
}

pub(crate) fn flatten_yaml(value: &YamlValue, prefix: &str, out: &mut Vec<Entry>) {
    match value {
        YamlValue::Mapping(map) => {
            for (key, child) in map {
                if let Some(key) = yaml_scalar_text(key) {
                    flatten_yaml(child, &child_key(prefix, &key), out);
                }
            }
        }
        YamlValue::Sequence(items) => {
            for (i, child) in items.iter().enumerate() {
                flatten_yaml(child, &format!("{}[{}]", prefix, i), out);
            }
        }
        YamlValue::Tagged(tagged) => flatten_yaml(&tagged.value, prefix, out),
        YamlValue::Null => push_leaf(out, prefix, None),
        scalar => push_leaf(out, prefix, yaml_scalar_text(scalar)),
    }
}

fn yaml_scalar_text(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Null => Some("null".to_string()),
        YamlValue::Tagged(tagged) => yaml_scalar_text(&tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => None,
    }
}

pub(crate) fn unflatten_yaml(entries: &[Entry]) -> YamlValue {
    let mut root = Mapping::new();
    for entry in entries {
        let parts: Vec<&str> = entry.key.split('.').collect();
        let leaf = match &entry.value {
            Some(v) => YamlValue::String(v.clone()),
            None => YamlValue::Null,
        };
        insert_yaml(&mut root, &parts, leaf);
    }
    YamlValue::Mapping(root)
}

fn insert_yaml(map: &mut Mapping, parts: &[&str], leaf: YamlValue) {
    let Some((first, rest)) = parts.split_first() else {
        return;
    };
    let key = YamlValue::String(first.to_string());
    if rest.is_empty() {
        map.insert(key, leaf);
        return;
    }
    if !matches!(map.get(&key), Some(YamlValue::Mapping(_))) {
        map.insert(key.clone(), YamlValue::Mapping(Mapping::new()));
    }
    if let Some(YamlValue::Mapping(child)) = map.get_mut(&key) {
        insert_yaml(child, rest, leaf);
    }
}
