//! Value-kind hooks for opaque leaf types.
//!
//! Trees are plain `serde_json::Value`s, but hosts often embed typed scalars
//! that happen to be encoded as small objects (MongoDB extended JSON being
//! the usual case). A [`ValueHooks`] implementation gets the first look at
//! every node the diff engine compares and every value the applicator
//! clones, and may answer or decline.

use docgit_json_pointer::Pointer;
use serde_json::{Map, Value};

use super::types::Op;

/// Strategy object consulted before the default structural rules.
///
/// Every method returns `None` to decline, letting default handling proceed.
pub trait ValueHooks: Send + Sync {
    /// Custom equality for a pair of values.
    fn equals(&self, _a: &Value, _b: &Value) -> Option<bool> {
        None
    }

    /// Custom diff for a pair of values located at `ptr`.
    fn diff(&self, _input: &Value, _output: &Value, _ptr: &Pointer) -> Option<Vec<Op>> {
        None
    }

    /// Custom deep clone for a value.
    fn clone_value(&self, _value: &Value) -> Option<Value> {
        None
    }
}

/// Declines everything: every value is compared, diffed and cloned
/// structurally.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomicLeaves;

impl ValueHooks for AtomicLeaves {}

/// Extended-JSON type wrappers treated as atomic leaves.
const EXTENDED_JSON_TAGS: &[&str] = &[
    "$oid",
    "$date",
    "$numberDecimal",
    "$numberLong",
    "$numberInt",
    "$numberDouble",
    "$binary",
    "$timestamp",
];

/// Treats single-key extended-JSON wrappers (`{"$oid": "..."}`,
/// `{"$date": ...}`, `{"$numberDecimal": "..."}`, ...) as opaque scalars:
/// they are equal when tag and payload match, and a change is always a
/// single `replace` of the whole wrapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedJsonLeaves;

impl ExtendedJsonLeaves {
    fn wrapper(value: &Value) -> Option<(&str, &Value)> {
        let map = value.as_object()?;
        if map.len() != 1 {
            return None;
        }
        let (tag, payload) = map.iter().next()?;
        EXTENDED_JSON_TAGS
            .contains(&tag.as_str())
            .then_some((tag.as_str(), payload))
    }
}

impl ValueHooks for ExtendedJsonLeaves {
    fn equals(&self, a: &Value, b: &Value) -> Option<bool> {
        match (Self::wrapper(a), Self::wrapper(b)) {
            (Some(x), Some(y)) => Some(x == y),
            (Some(_), None) | (None, Some(_)) => Some(false),
            (None, None) => None,
        }
    }

    fn diff(&self, input: &Value, output: &Value, ptr: &Pointer) -> Option<Vec<Op>> {
        let equal = self.equals(input, output)?;
        if equal {
            return Some(Vec::new());
        }
        Some(vec![Op::Replace {
            path: ptr.clone(),
            value: output.clone(),
        }])
    }

    fn clone_value(&self, value: &Value) -> Option<Value> {
        Self::wrapper(value).map(|_| value.clone())
    }
}

// ── Hook-aware helpers ────────────────────────────────────────────────────

/// Deep value equality that consults `hooks` at every node.
pub fn values_equal(a: &Value, b: &Value, hooks: &dyn ValueHooks) -> bool {
    if let Some(eq) = hooks.equals(a, b) {
        return eq;
    }
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(key, xv)| {
                    y.get(key)
                        .is_some_and(|yv| values_equal(xv, yv, hooks))
                })
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y)
                    .all(|(xv, yv)| values_equal(xv, yv, hooks))
        }
        _ => a == b,
    }
}

/// Deep clone that consults `hooks` at every node.
pub fn deep_clone(value: &Value, hooks: &dyn ValueHooks) -> Value {
    if let Some(cloned) = hooks.clone_value(value) {
        return cloned;
    }
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), deep_clone(v, hooks)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| deep_clone(v, hooks)).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structural_equality_ignores_key_order() {
        let a = json!({"a": 1, "b": [1, {"c": 2}]});
        let b = json!({"b": [1, {"c": 2}], "a": 1});
        assert!(values_equal(&a, &b, &AtomicLeaves));
        assert!(!values_equal(&a, &json!({"a": 1}), &AtomicLeaves));
    }

    #[test]
    fn extended_json_wrappers_are_atomic() {
        let hooks = ExtendedJsonLeaves;
        let a = json!({"$oid": "65f0c0ffee0000000000000a"});
        let b = json!({"$oid": "65f0c0ffee0000000000000b"});
        assert_eq!(hooks.equals(&a, &a.clone()), Some(true));
        assert_eq!(hooks.equals(&a, &b), Some(false));
        assert_eq!(hooks.equals(&json!({"x": 1}), &json!({"x": 1})), None);

        let ops = hooks.diff(&a, &b, &Pointer::root().child("_id")).unwrap();
        assert_eq!(
            ops,
            vec![Op::Replace {
                path: Pointer::root().child("_id"),
                value: b.clone()
            }]
        );
    }

    #[test]
    fn wrapper_with_extra_keys_is_plain_object() {
        let v = json!({"$oid": "x", "extra": 1});
        assert_eq!(ExtendedJsonLeaves.clone_value(&v), None);
        assert_eq!(ExtendedJsonLeaves.equals(&v, &v), None);
    }

    #[test]
    fn deep_clone_matches_source() {
        let v = json!({"a": [1, {"$date": 0}], "b": null});
        assert_eq!(deep_clone(&v, &ExtendedJsonLeaves), v);
    }
}
