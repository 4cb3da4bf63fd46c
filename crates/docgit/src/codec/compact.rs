//! Compact positional codec.
//!
//! Each operation is a JSON array `[symbol, path, value?]`:
//!
//! | symbol | op        | shape                  |
//! |--------|-----------|------------------------|
//! | `+`    | `add`     | `["+", path, value]`   |
//! | `-`    | `remove`  | `["-", path]`          |
//! | `~`    | `replace` | `["~", path, value]`   |
//!
//! Only the three mutations are carried. Arbitrary operation lists are
//! brought into that shape with [`lower`].

use serde_json::{json, Value};

use super::parse_wire_pointer;
use crate::json_patch::apply::apply_op;
use crate::json_patch::hooks::{deep_clone, ValueHooks};
use crate::json_patch::types::{Op, PatchError};

pub const SYM_ADD: &str = "+";
pub const SYM_REMOVE: &str = "-";
pub const SYM_REPLACE: &str = "~";

// ── Encode ─────────────────────────────────────────────────────────────────

/// Encodes one mutation.
///
/// `move`, `copy` and `test` fail with [`PatchError::Unsupported`]; run the
/// list through [`lower`] first.
pub fn encode_op(op: &Op) -> Result<Value, PatchError> {
    match op {
        Op::Add { path, value } => Ok(json!([SYM_ADD, path.to_string(), value])),
        Op::Remove { path } => Ok(json!([SYM_REMOVE, path.to_string()])),
        Op::Replace { path, value } => Ok(json!([SYM_REPLACE, path.to_string(), value])),
        other => Err(PatchError::Unsupported(other.op_name().to_string())),
    }
}

pub fn encode(ops: &[Op]) -> Result<Vec<Value>, PatchError> {
    ops.iter().map(encode_op).collect()
}

// ── Decode ─────────────────────────────────────────────────────────────────

fn arr_get(arr: &[Value], idx: usize) -> Result<&Value, PatchError> {
    arr.get(idx).ok_or_else(|| {
        PatchError::InvalidOperation(format!("compact op array too short, missing index {idx}"))
    })
}

/// Decodes one `[symbol, path, value?]` tuple.
pub fn decode_op(v: &Value) -> Result<Op, PatchError> {
    let arr = v
        .as_array()
        .ok_or_else(|| PatchError::InvalidOperation("compact op must be an array".into()))?;
    let symbol = arr_get(arr, 0)?
        .as_str()
        .ok_or_else(|| PatchError::InvalidOperation("compact op symbol must be a string".into()))?;
    let raw_path = arr_get(arr, 1)?
        .as_str()
        .ok_or_else(|| PatchError::InvalidOperation("compact op path must be a string".into()))?;
    let path = parse_wire_pointer(raw_path)?;

    match symbol {
        SYM_ADD => Ok(Op::Add {
            path,
            value: arr_get(arr, 2)?.clone(),
        }),
        SYM_REMOVE => Ok(Op::Remove {
            path,
        }),
        SYM_REPLACE => Ok(Op::Replace {
            path,
            value: arr_get(arr, 2)?.clone(),
        }),
        other => Err(PatchError::InvalidOperation(format!(
            "unknown compact symbol '{other}'"
        ))),
    }
}

pub fn decode(ops: &[Value]) -> Result<Vec<Op>, PatchError> {
    ops.iter().map(decode_op).collect()
}

// ── Lowering ───────────────────────────────────────────────────────────────

/// Rewrites `ops` into mutations only, by simulating them against a copy of
/// `base`.
///
/// - `move` becomes `remove` at the source plus `add` of the moved value;
///   a move onto itself disappears.
/// - `copy` becomes `add` of a deep clone of the source value.
/// - `test` is checked against the simulated tree and dropped.
///
/// Fails with the same errors applying `ops` to `base` would.
pub fn lower(base: &Value, ops: &[Op], hooks: &dyn ValueHooks) -> Result<Vec<Op>, PatchError> {
    let mut working = base.clone();
    let mut lowered = Vec::with_capacity(ops.len());
    for op in ops {
        match op {
            Op::Move { from, path } if from != path => {
                let value = from
                    .resolve(&working)
                    .map(|v| deep_clone(v, hooks))
                    .ok_or_else(|| PatchError::missing(from))?;
                apply_op(&mut working, op, hooks)?;
                lowered.push(Op::Remove { path: from.clone() });
                lowered.push(Op::Add {
                    path: path.clone(),
                    value,
                });
            }
            Op::Copy { from, path } => {
                let value = from
                    .resolve(&working)
                    .map(|v| deep_clone(v, hooks))
                    .ok_or_else(|| PatchError::missing(from))?;
                apply_op(&mut working, op, hooks)?;
                lowered.push(Op::Add {
                    path: path.clone(),
                    value,
                });
            }
            Op::Move { .. } | Op::Test { .. } => apply_op(&mut working, op, hooks)?,
            mutation => {
                apply_op(&mut working, mutation, hooks)?;
                lowered.push(mutation.clone());
            }
        }
    }
    Ok(lowered)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_patch::apply::apply_patch;
    use crate::json_patch::hooks::AtomicLeaves;
    use docgit_json_pointer::Pointer;

    fn ptr(s: &str) -> Pointer {
        Pointer::parse(s).unwrap()
    }

    #[test]
    fn encodes_positional_tuples() {
        let ops = vec![
            Op::Add { path: ptr("/baz"), value: json!("qux") },
            Op::Remove { path: ptr("/0") },
            Op::Replace { path: ptr(""), value: json!({"a": 1}) },
        ];
        assert_eq!(
            Value::Array(encode(&ops).unwrap()),
            json!([["+", "/baz", "qux"], ["-", "/0"], ["~", "", {"a": 1}]])
        );
        assert_eq!(decode(&encode(&ops).unwrap()).unwrap(), ops);
    }

    #[test]
    fn root_deletion_token_carries_null() {
        let op = Op::Replace { path: ptr(""), value: Value::Null };
        assert_eq!(encode_op(&op).unwrap(), json!(["~", "", null]));
    }

    #[test]
    fn refuses_non_mutations() {
        let err = encode_op(&Op::Copy { from: ptr("/a"), path: ptr("/b") }).unwrap_err();
        assert_eq!(err, PatchError::Unsupported("copy".into()));
    }

    #[test]
    fn rejects_bad_tuples() {
        for bad in [json!(["?", "/a"]), json!(["+", "/a"]), json!(["~"]), json!({"op": "add"}), json!([1, "/a"])] {
            assert!(
                matches!(decode_op(&bad), Err(PatchError::InvalidOperation(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn lowering_preserves_effect() {
        let base = json!({"a": {"x": 1}, "b": [1, 2], "c": 3});
        let ops = vec![
            Op::Test { path: ptr("/c"), value: json!(3) },
            Op::Move { from: ptr("/a"), path: ptr("/b/1") },
            Op::Copy { from: ptr("/b/0"), path: ptr("/d") },
            Op::Move { from: ptr("/c"), path: ptr("/c") },
            Op::Replace { path: ptr("/c"), value: json!(4) },
        ];
        let lowered = lower(&base, &ops, &AtomicLeaves).unwrap();
        assert!(lowered.iter().all(Op::is_mutation));
        assert_eq!(lowered.len(), 4);
        assert_eq!(
            apply_patch(base.clone(), &lowered).unwrap(),
            apply_patch(base, &ops).unwrap()
        );
    }

    #[test]
    fn lowering_checks_tests() {
        let base = json!({"c": 3});
        let ops = vec![Op::Test { path: ptr("/c"), value: json!(4) }];
        assert!(matches!(
            lower(&base, &ops, &AtomicLeaves),
            Err(PatchError::TestAssertion { .. })
        ));
    }
}
