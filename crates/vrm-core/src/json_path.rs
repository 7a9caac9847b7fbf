//! Path lookups over a parsed JSON tree.
//!
//! A path is a list of segments. On objects a segment is a key; on arrays it
//! must parse as an index. Lookups never fail: a missing segment, a segment of
//! the wrong kind, or a leaf of the wrong type all yield the caller's default.

use serde_json::{Map, Value};

/// Follows `path` from `root`.
pub fn get<'v>(root: &'v Value, path: &[&str]) -> Option<&'v Value> {
    let mut current = root;
    for segment in path {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

pub fn get_str<'v>(root: &'v Value, path: &[&str]) -> Option<&'v str> {
    get(root, path)?.as_str()
}

/// String at `path`, or `default` when absent or not a string.
pub fn get_str_or<'v>(root: &'v Value, path: &[&str], default: &'v str) -> &'v str {
    get_str(root, path).unwrap_or(default)
}

pub fn get_bool(root: &Value, path: &[&str]) -> Option<bool> {
    get(root, path)?.as_bool()
}

pub fn get_f64(root: &Value, path: &[&str]) -> Option<f64> {
    get(root, path)?.as_f64()
}

/// Non-negative integer at `path`, e.g. an index into a sibling table.
pub fn get_usize(root: &Value, path: &[&str]) -> Option<usize> {
    get(root, path)?.as_u64().and_then(|v| usize::try_from(v).ok())
}

pub fn get_array<'v>(root: &'v Value, path: &[&str]) -> Option<&'v Vec<Value>> {
    get(root, path)?.as_array()
}

/// Array at `path`, or an empty slice.
pub fn get_array_or_empty<'v>(root: &'v Value, path: &[&str]) -> &'v [Value] {
    get_array(root, path).map(Vec::as_slice).unwrap_or(&[])
}

pub fn get_object<'v>(root: &'v Value, path: &[&str]) -> Option<&'v Map<String, Value>> {
    get(root, path)?.as_object()
}

/// Fixed-size float array at `path`; `None` unless every entry is a number.
pub fn get_f32_array<const N: usize>(root: &Value, path: &[&str]) -> Option<[f32; N]> {
    let items = get_array(root, path)?;
    if items.len() != N {
        return None;
    }
    let mut out = [0.0f32; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64()? as f32;
    }
    Some(out)
}

/// List of indices at `path`; `None` unless every entry is a non-negative integer.
pub fn get_usize_array(root: &Value, path: &[&str]) -> Option<Vec<usize>> {
    get_array(root, path)?
        .iter()
        .map(|v| v.as_u64().and_then(|n| usize::try_from(n).ok()))
        .collect()
}
