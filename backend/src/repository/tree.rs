//! Tree value helpers
//!
//! Store semantics shared by the adapters: `null` and empty objects never
//! exist as nodes, writing them deletes, deleting prunes empty ancestors, and
//! arrays are kept as index-keyed objects.

use serde_json::{Map, Value};

/// Drop nulls and empty objects; `None` means "no node"
pub fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => collect_children(map.into_iter()),
        Value::Array(list) => collect_children(
            list.into_iter()
                .enumerate()
                .map(|(index, v)| (index.to_string(), v)),
        ),
        scalar => Some(scalar),
    }
}

fn collect_children(children: impl Iterator<Item = (String, Value)>) -> Option<Value> {
    let map: Map<String, Value> = children
        .filter_map(|(key, v)| normalize(v).map(|v| (key, v)))
        .collect();
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

/// Value at `segments`, if a node exists there
pub fn node_at<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments {
        node = node.as_object()?.get(segment)?;
    }
    if is_absent(node) {
        None
    } else {
        Some(node)
    }
}

/// Snapshot value of a subtree (owned)
pub fn snapshot_at(root: &Value, segments: &[String]) -> Option<Value> {
    node_at(root, segments).cloned()
}

/// Replace the node at `segments`; writing `null` deletes it
pub fn write_at(root: &mut Value, segments: &[String], value: Value) {
    let value = normalize(value);
    write_normalized(root, segments, value);
    if root.is_null() {
        *root = Value::Object(Map::new());
    }
}

fn write_normalized(node: &mut Value, segments: &[String], value: Option<Value>) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value.unwrap_or(Value::Null);
        return;
    };

    if !node.is_object() {
        if value.is_none() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };

    match value {
        Some(value) => {
            let child = map.entry(head.clone()).or_insert(Value::Null);
            write_normalized(child, rest, Some(value));
        }
        None => {
            if let Some(child) = map.get_mut(head) {
                write_normalized(child, rest, None);
                if is_absent(child) {
                    map.remove(head);
                }
            }
        }
    }
}

fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
