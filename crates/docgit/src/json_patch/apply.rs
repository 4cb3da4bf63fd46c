//! JSON Patch apply logic.
//!
//! Operations are applied one at a time against a working tree. A failing
//! operation leaves the operations before it applied; callers that need
//! all-or-nothing behaviour apply to a copy and discard it on error.

use docgit_json_pointer::{get, get_mut, parse_index, Pointer, APPEND_MARKER};
use serde_json::Value;

use super::hooks::{deep_clone, values_equal, AtomicLeaves, ValueHooks};
use super::types::{Op, PatchError};

/// Keys that would reach a shared prototype in prototypal hosts.
const FORBIDDEN_KEYS: &[&str] = &["__proto__"];

fn check_forbidden(path: &Pointer) -> Result<(), PatchError> {
    match path
        .tokens()
        .iter()
        .find(|t| FORBIDDEN_KEYS.contains(&t.as_str()))
    {
        Some(token) => Err(PatchError::ForbiddenKey(token.clone())),
        None => Ok(()),
    }
}

// ── Individual operation applicators ─────────────────────────────────────

fn apply_add(doc: &mut Value, path: &Pointer, value: Value) -> Result<(), PatchError> {
    let Some((parent_path, key)) = path.split_last() else {
        *doc = value;
        return Ok(());
    };
    match get_mut(doc, parent_path) {
        Some(Value::Object(map)) => {
            map.insert(key.to_string(), value);
            Ok(())
        }
        Some(Value::Array(arr)) => {
            if key == APPEND_MARKER {
                arr.push(value);
                return Ok(());
            }
            match parse_index(key) {
                Some(idx) if idx <= arr.len() => {
                    arr.insert(idx, value);
                    Ok(())
                }
                _ => Err(PatchError::InvalidIndex {
                    path: path.to_string(),
                }),
            }
        }
        _ => Err(PatchError::missing(path)),
    }
}

fn apply_remove(doc: &mut Value, path: &Pointer) -> Result<Value, PatchError> {
    let Some((parent_path, key)) = path.split_last() else {
        return Ok(std::mem::take(doc));
    };
    match get_mut(doc, parent_path) {
        Some(Value::Object(map)) => map.shift_remove(key).ok_or_else(|| PatchError::missing(path)),
        Some(Value::Array(arr)) => match parse_index(key) {
            Some(idx) if idx < arr.len() => Ok(arr.remove(idx)),
            _ => Err(PatchError::missing(path)),
        },
        _ => Err(PatchError::missing(path)),
    }
}

fn apply_replace(doc: &mut Value, path: &Pointer, value: Value) -> Result<(), PatchError> {
    let target = path.resolve_mut(doc).ok_or_else(|| PatchError::missing(path))?;
    *target = value;
    Ok(())
}

fn apply_move(doc: &mut Value, from: &Pointer, path: &Pointer) -> Result<(), PatchError> {
    if from == path {
        return get(doc, from.tokens())
            .map(|_| ())
            .ok_or_else(|| PatchError::missing(from));
    }
    if docgit_json_pointer::is_child(from.tokens(), path.tokens()) {
        return Err(PatchError::InvalidOperation(format!(
            "cannot move '{from}' into its own child '{path}'"
        )));
    }
    let value = apply_remove(doc, from)?;
    apply_add(doc, path, value)
}

fn apply_copy(
    doc: &mut Value,
    from: &Pointer,
    path: &Pointer,
    hooks: &dyn ValueHooks,
) -> Result<(), PatchError> {
    let source = from.resolve(doc).ok_or_else(|| PatchError::missing(from))?;
    let value = deep_clone(source, hooks);
    apply_add(doc, path, value)
}

fn apply_test(
    doc: &Value,
    path: &Pointer,
    expected: &Value,
    hooks: &dyn ValueHooks,
) -> Result<(), PatchError> {
    match path.resolve(doc) {
        Some(actual) if values_equal(actual, expected, hooks) => Ok(()),
        _ => Err(PatchError::TestAssertion {
            path: path.to_string(),
        }),
    }
}

// ── Main apply function ───────────────────────────────────────────────────

/// Apply a single operation to the document (in-place mutation).
///
/// Forbidden keys are rejected before anything is touched.
pub fn apply_op(doc: &mut Value, op: &Op, hooks: &dyn ValueHooks) -> Result<(), PatchError> {
    check_forbidden(op.path())?;
    if let Some(from) = op.from() {
        check_forbidden(from)?;
    }
    match op {
        Op::Add { path, value } => apply_add(doc, path, deep_clone(value, hooks)),
        Op::Remove { path } => apply_remove(doc, path).map(|_| ()),
        Op::Replace { path, value } => apply_replace(doc, path, deep_clone(value, hooks)),
        Op::Move { from, path } => apply_move(doc, from, path),
        Op::Copy { from, path } => apply_copy(doc, from, path, hooks),
        Op::Test { path, value } => apply_test(doc, path, value, hooks),
    }
}

/// Apply a sequence of operations strictly left to right and return the
/// resulting tree.
///
/// The result may be a different value from `doc` when an operation
/// targets the root.
pub fn apply_ops(mut doc: Value, ops: &[Op], hooks: &dyn ValueHooks) -> Result<Value, PatchError> {
    for op in ops {
        apply_op(&mut doc, op, hooks)?;
    }
    Ok(doc)
}

/// [`apply_ops`] with the default hooks.
pub fn apply_patch(doc: Value, ops: &[Op]) -> Result<Value, PatchError> {
    apply_ops(doc, ops, &AtomicLeaves)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ptr(s: &str) -> Pointer {
        Pointer::parse(s).unwrap()
    }

    fn run(doc: Value, op: Op) -> Result<Value, PatchError> {
        apply_patch(doc, &[op])
    }

    #[test]
    fn add_to_object() {
        let doc = run(json!({"a": 1}), Op::Add { path: ptr("/b"), value: json!(2) }).unwrap();
        assert_eq!(doc, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn add_overwrites_key() {
        let doc = run(json!({"a": 1}), Op::Add { path: ptr("/a"), value: json!(2) }).unwrap();
        assert_eq!(doc, json!({"a": 2}));
    }

    #[test]
    fn add_inserts_into_array() {
        let doc = run(json!([1, 2, 3]), Op::Add { path: ptr("/1"), value: json!(99) }).unwrap();
        assert_eq!(doc, json!([1, 99, 2, 3]));
    }

    #[test]
    fn add_appends_with_marker() {
        let doc = run(json!([1, 2]), Op::Add { path: ptr("/-"), value: json!(3) }).unwrap();
        assert_eq!(doc, json!([1, 2, 3]));
    }

    #[test]
    fn add_at_end_index() {
        let doc = run(json!([1, 2]), Op::Add { path: ptr("/2"), value: json!(3) }).unwrap();
        assert_eq!(doc, json!([1, 2, 3]));
    }

    #[test]
    fn add_past_end_is_invalid_index() {
        let err = run(json!([1]), Op::Add { path: ptr("/5"), value: json!(3) }).unwrap_err();
        assert!(matches!(err, PatchError::InvalidIndex { .. }));
    }

    #[test]
    fn add_without_parent_is_missing_target() {
        let err = run(json!({}), Op::Add { path: ptr("/a/b"), value: json!(1) }).unwrap_err();
        assert_eq!(err, PatchError::MissingTarget { path: "/a/b".into() });
    }

    #[test]
    fn add_at_root_replaces_tree() {
        let doc = run(json!({"a": 1}), Op::Add { path: ptr(""), value: json!([1]) }).unwrap();
        assert_eq!(doc, json!([1]));
    }

    #[test]
    fn remove_from_object_and_array() {
        let doc = run(json!({"a": 1, "b": 2}), Op::Remove { path: ptr("/a") }).unwrap();
        assert_eq!(doc, json!({"b": 2}));
        let doc = run(json!([1, 2, 3]), Op::Remove { path: ptr("/0") }).unwrap();
        assert_eq!(doc, json!([2, 3]));
    }

    #[test]
    fn remove_missing_is_missing_target() {
        let err = run(json!({"a": 1}), Op::Remove { path: ptr("/b") }).unwrap_err();
        assert!(matches!(err, PatchError::MissingTarget { .. }));
        let err = run(json!([1]), Op::Remove { path: ptr("/1") }).unwrap_err();
        assert!(matches!(err, PatchError::MissingTarget { .. }));
    }

    #[test]
    fn remove_root_leaves_null() {
        let doc = run(json!({"a": 1}), Op::Remove { path: ptr("") }).unwrap();
        assert_eq!(doc, Value::Null);
    }

    #[test]
    fn replace_requires_existing_target() {
        let doc = run(json!({"a": 1}), Op::Replace { path: ptr("/a"), value: json!(5) }).unwrap();
        assert_eq!(doc, json!({"a": 5}));
        let err = run(json!({"a": 1}), Op::Replace { path: ptr("/b"), value: json!(5) }).unwrap_err();
        assert!(matches!(err, PatchError::MissingTarget { .. }));
    }

    #[test]
    fn replace_root() {
        let doc = run(Value::Null, Op::Replace { path: ptr(""), value: json!({"a": 1}) }).unwrap();
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn move_op() {
        let doc = run(
            json!({"a": 1, "b": {}}),
            Op::Move { from: ptr("/a"), path: ptr("/b/c") },
        )
        .unwrap();
        assert_eq!(doc, json!({"b": {"c": 1}}));
    }

    #[test]
    fn move_into_own_child_is_rejected() {
        let err = run(
            json!({"a": {"b": 1}}),
            Op::Move { from: ptr("/a"), path: ptr("/a/b/c") },
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::InvalidOperation(_)));
    }

    #[test]
    fn move_missing_source() {
        let err = run(json!({}), Op::Move { from: ptr("/x"), path: ptr("/y") }).unwrap_err();
        assert_eq!(err, PatchError::MissingTarget { path: "/x".into() });
    }

    #[test]
    fn copy_op_is_deep() {
        let doc = run(
            json!({"a": {"n": [1]}}),
            Op::Copy { from: ptr("/a"), path: ptr("/b") },
        )
        .unwrap();
        assert_eq!(doc, json!({"a": {"n": [1]}, "b": {"n": [1]}}));
    }

    #[test]
    fn test_compares_by_value() {
        let doc = json!({"a": {"x": 1, "y": 2}});
        assert!(run(doc.clone(), Op::Test { path: ptr("/a"), value: json!({"y": 2, "x": 1}) }).is_ok());
        let err = run(doc.clone(), Op::Test { path: ptr("/a/x"), value: json!(2) }).unwrap_err();
        assert_eq!(err, PatchError::TestAssertion { path: "/a/x".into() });
        let err = run(doc, Op::Test { path: ptr("/zz"), value: json!(null) }).unwrap_err();
        assert!(matches!(err, PatchError::TestAssertion { .. }));
    }

    #[test]
    fn proto_key_is_rejected() {
        let doc = json!({});
        let err = run(
            doc,
            Op::Add { path: ptr("/__proto__/polluted"), value: json!("x") },
        )
        .unwrap_err();
        assert_eq!(err, PatchError::ForbiddenKey("__proto__".into()));

        let err = run(
            json!({"a": 1}),
            Op::Copy { from: ptr("/__proto__"), path: ptr("/b") },
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::ForbiddenKey(_)));
    }

    #[test]
    fn earlier_ops_stay_applied_on_failure() {
        let mut doc = json!({"a": 1});
        let ops = [
            Op::Add { path: ptr("/b"), value: json!(2) },
            Op::Remove { path: ptr("/missing") },
        ];
        let mut result = Ok(());
        for op in &ops {
            result = apply_op(&mut doc, op, &AtomicLeaves);
            if result.is_err() {
                break;
            }
        }
        assert!(result.is_err());
        assert_eq!(doc, json!({"a": 1, "b": 2}));
    }
}
