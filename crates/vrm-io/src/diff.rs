//! Structural comparison of decoded documents.
//!
//! Used to check import/export round trips: both sides are demuxed, their
//! accessors decoded, and the resulting trees compared leaf by leaf. Integers
//! must match exactly; any pairing involving a float is compared with an
//! absolute tolerance.

use serde_json::{Number, Value};
use thiserror::Error;

use crate::error::VrmError;
use crate::reader::create_vrm_dict;

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("{path}: unexpected values left={left} right={right}")]
    Unexpected {
        path: String,
        left: String,
        right: String,
    },

    #[error(transparent)]
    Vrm(#[from] VrmError),
}

/// Name of a value's kind as it appears in difference messages.
fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Compares two JSON trees and returns one message per difference, each
/// prefixed with the path of the differing value. An empty list means equal
/// within `float_tolerance`.
pub fn dict_diff(left: &Value, right: &Value, path: &str, float_tolerance: f64) -> Result<Vec<String>, DiffError> {
    match (left, right) {
        (Value::Array(l), Value::Array(r)) => {
            if l.len() != r.len() {
                return Ok(vec![format!(
                    "{}: left length is {} but right length is {}",
                    path,
                    l.len(),
                    r.len()
                )]);
            }
            let mut diffs = Vec::new();
            for (i, (lv, rv)) in l.iter().zip(r).enumerate() {
                diffs.extend(dict_diff(lv, rv, &format!("{}[{}]", path, i), float_tolerance)?);
            }
            Ok(diffs)
        }

        (Value::Object(l), Value::Object(r)) => {
            let mut keys: Vec<&String> = l.keys().chain(r.keys()).collect();
            keys.sort();
            keys.dedup();

            let mut diffs = Vec::new();
            for key in keys {
                match (l.get(key), r.get(key)) {
                    (None, _) => diffs.push(format!("{}: {} not in left", path, key)),
                    (_, None) => diffs.push(format!("{}: {} not in right", path, key)),
                    (Some(lv), Some(rv)) => {
                        diffs.extend(dict_diff(lv, rv, &format!("{}[\"{}\"]", path, key), float_tolerance)?);
                    }
                }
            }
            Ok(diffs)
        }

        (Value::Bool(l), Value::Bool(r)) => Ok(if l != r {
            vec![format!("{}: left is {} but right is {}", path, l, r)]
        } else {
            Vec::new()
        }),

        (Value::String(l), Value::String(r)) => Ok(if l != r {
            vec![format!("{}: left is \"{}\" but right is \"{}\"", path, l, r)]
        } else {
            Vec::new()
        }),

        (Value::Null, Value::Null) => Ok(Vec::new()),

        (Value::Number(l), Value::Number(r)) => {
            if let (Some(li), Some(ri)) = (as_integer(l), as_integer(r)) {
                return Ok(if li != ri {
                    vec![format!("{}: left is {} but right is {}", path, li, ri)]
                } else {
                    Vec::new()
                });
            }
            let (Some(lf), Some(rf)) = (l.as_f64(), r.as_f64()) else {
                return Err(DiffError::Unexpected {
                    path: path.to_string(),
                    left: l.to_string(),
                    right: r.to_string(),
                });
            };
            let error = (lf - rf).abs();
            Ok(if error > float_tolerance {
                vec![format!(
                    "{}: left is {:20.17} but right is {:20.17}, error={:19.17}",
                    path, lf, rf, error
                )]
            } else {
                Vec::new()
            })
        }

        _ => Ok(vec![format!(
            "{}: left is {} but right is {}",
            path,
            kind(left),
            kind(right)
        )]),
    }
}

/// Decodes two containers and compares them.
pub fn vrm_diff(before: &[u8], after: &[u8], float_tolerance: f64) -> Result<Vec<String>, DiffError> {
    let left = create_vrm_dict(before)?;
    let right = create_vrm_dict(after)?;
    dict_diff(&left, &right, "", float_tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diff(left: Value, right: Value) -> Vec<String> {
        dict_diff(&left, &right, "", 1e-6).unwrap()
    }

    #[test]
    fn test_equal_trees() {
        let doc = json!({"a": [1, 2.5, "x", true, null], "b": {"c": []}});
        assert!(diff(doc.clone(), doc).is_empty());
    }

    #[test]
    fn test_missing_keys_both_sides() {
        let diffs = diff(json!({"a": 1, "b": 2}), json!({"b": 2, "c": 3}));
        assert_eq!(diffs, vec![": a not in right", ": c not in left"]);
    }

    #[test]
    fn test_nested_paths() {
        let diffs = diff(json!({"nodes": [{"name": "a"}]}), json!({"nodes": [{"name": "b"}]}));
        assert_eq!(diffs, vec![r#"["nodes"][0]["name"]: left is "a" but right is "b""#]);
    }

    #[test]
    fn test_length_mismatch() {
        let diffs = diff(json!([1, 2]), json!([1]));
        assert_eq!(diffs, vec![": left length is 2 but right length is 1"]);
    }

    #[test]
    fn test_integers_exact() {
        assert_eq!(diff(json!(3), json!(4)), vec![": left is 3 but right is 4"]);
        assert!(diff(json!(u64::MAX), json!(u64::MAX)).is_empty());
    }

    #[test]
    fn test_float_tolerance() {
        assert!(diff(json!(0.1), json!(0.1000000001)).is_empty());
        assert!(diff(json!(1), json!(1.0)).is_empty());
        let diffs = diff(json!(0.5), json!(0.75));
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].starts_with(": left is "));
        assert!(diffs[0].contains("error=0.25"));
    }

    #[test]
    fn test_type_mismatch() {
        assert_eq!(diff(json!([1]), json!({"a": 1})), vec![": left is list but right is dict"]);
        assert_eq!(diff(json!(true), json!("true")), vec![": left is bool but right is str"]);
        assert_eq!(diff(json!(null), json!(0)), vec![": left is null but right is int"]);
    }
}
