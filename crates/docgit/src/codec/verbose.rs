//! Verbose codec: RFC 6902 operation objects.
//!
//! Each operation is `{"op", "path", "value"?, "from"?}` with pointer
//! strings. All six operations are representable.

use docgit_json_pointer::Pointer;
use serde_json::{json, Map, Value};

use super::parse_wire_pointer;
use crate::json_patch::types::{Op, PatchError};

// ── Path helpers ──────────────────────────────────────────────────────────

fn decode_pointer(obj: &Map<String, Value>, key: &str, op: &str) -> Result<Pointer, PatchError> {
    let raw = obj
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| PatchError::InvalidOperation(format!("{op} requires string '{key}'")))?;
    parse_wire_pointer(raw)
}

fn decode_value(obj: &Map<String, Value>, op: &str) -> Result<Value, PatchError> {
    obj.get("value")
        .cloned()
        .ok_or_else(|| PatchError::InvalidOperation(format!("{op} requires 'value'")))
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize an `Op` to its RFC 6902 object.
pub fn encode_op(op: &Op) -> Value {
    match op {
        Op::Add { path, value } | Op::Replace { path, value } | Op::Test { path, value } => json!({
            "op": op.op_name(),
            "path": path.to_string(),
            "value": value,
        }),
        Op::Remove { path } => json!({
            "op": "remove",
            "path": path.to_string(),
        }),
        Op::Move { from, path } | Op::Copy { from, path } => json!({
            "op": op.op_name(),
            "path": path.to_string(),
            "from": from.to_string(),
        }),
    }
}

pub fn encode(ops: &[Op]) -> Vec<Value> {
    ops.iter().map(encode_op).collect()
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Deserialize one RFC 6902 object into an `Op`.
///
/// Unknown `op` tags fail with [`PatchError::InvalidOperation`].
pub fn decode_op(v: &Value) -> Result<Op, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidOperation("operation must be an object".into()))?;
    let name = obj
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| PatchError::InvalidOperation("missing 'op' field".into()))?;

    match name {
        "add" => Ok(Op::Add {
            path: decode_pointer(obj, "path", name)?,
            value: decode_value(obj, name)?,
        }),
        "remove" => Ok(Op::Remove {
            path: decode_pointer(obj, "path", name)?,
        }),
        "replace" => Ok(Op::Replace {
            path: decode_pointer(obj, "path", name)?,
            value: decode_value(obj, name)?,
        }),
        "move" => Ok(Op::Move {
            from: decode_pointer(obj, "from", name)?,
            path: decode_pointer(obj, "path", name)?,
        }),
        "copy" => Ok(Op::Copy {
            from: decode_pointer(obj, "from", name)?,
            path: decode_pointer(obj, "path", name)?,
        }),
        "test" => Ok(Op::Test {
            path: decode_pointer(obj, "path", name)?,
            value: decode_value(obj, name)?,
        }),
        other => Err(PatchError::InvalidOperation(format!("unknown op '{other}'"))),
    }
}

pub fn decode(ops: &[Value]) -> Result<Vec<Op>, PatchError> {
    ops.iter().map(decode_op).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────
