//! Patch wire formats.
//!
//! A persisted [`Patch`] is a `{type, ops}` envelope. `type` names the codec
//! the `ops` array was written with:
//!
//! - `"json-patch"`: [`verbose`] RFC 6902 objects;
//! - `"mini-json-patch"`: [`compact`] `[symbol, path, value?]` tuples.

pub mod compact;
pub mod verbose;

use std::fmt;
use std::str::FromStr;

use docgit_json_pointer::{validate_json_pointer, validate_path, Pointer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::json_patch::apply::apply_op;
use crate::json_patch::hooks::ValueHooks;
use crate::json_patch::types::{Op, PatchError};
use crate::json_patch_diff::diff_with;

/// Parse a pointer read from a stored or received patch, enforcing the
/// size limits.
pub(crate) fn parse_wire_pointer(raw: &str) -> Result<Pointer, PatchError> {
    validate_json_pointer(raw)?;
    let pointer = Pointer::parse(raw)?;
    validate_path(pointer.tokens())?;
    Ok(pointer)
}

// ── PatcherKind ───────────────────────────────────────────────────────────

/// Codec selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PatcherKind {
    #[serde(rename = "json-patch")]
    JsonPatch,
    #[default]
    #[serde(rename = "mini-json-patch")]
    MiniJsonPatch,
}

impl PatcherKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PatcherKind::JsonPatch => "json-patch",
            PatcherKind::MiniJsonPatch => "mini-json-patch",
        }
    }
}

impl fmt::Display for PatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatcherKind {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json-patch" => Ok(PatcherKind::JsonPatch),
            "mini-json-patch" => Ok(PatcherKind::MiniJsonPatch),
            other => Err(PatchError::InvalidOperation(format!(
                "unknown patch type '{other}'"
            ))),
        }
    }
}

// ── Patch envelope ────────────────────────────────────────────────────────

/// Encoded operations plus the tag of the codec that wrote them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    #[serde(rename = "type")]
    pub patcher: PatcherKind,
    pub ops: Vec<Value>,
}

impl Patch {
    /// Diff `committed` against `active` and encode the result.
    ///
    /// Returns `None` when there is nothing to record. Under the compact
    /// codec, `move`, `copy` and `test` ops produced by value hooks are
    /// lowered against `committed`.
    ///
    /// # Example
    ///
    /// ```
    /// use docgit::codec::{Patch, PatcherKind};
    /// use docgit::json_patch::AtomicLeaves;
    /// use serde_json::json;
    ///
    /// let patch = Patch::create(PatcherKind::MiniJsonPatch, &json!({"a": 1}), &json!({"a": 2}), &AtomicLeaves)
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(patch.ops, vec![json!(["~", "/a", 2])]);
    /// ```
    pub fn create(
        patcher: PatcherKind,
        committed: &Value,
        active: &Value,
        hooks: &dyn ValueHooks,
    ) -> Result<Option<Patch>, PatchError> {
        let ops = diff_with(committed, active, hooks);
        if ops.is_empty() {
            return Ok(None);
        }
        Self::encode_lowered(patcher, committed, &ops, hooks).map(Some)
    }

    /// Like [`Patch::create`], but an unchanged pair yields an empty patch
    /// instead of `None`. Used by reads such as `diff` and `status`.
    pub fn between(
        patcher: PatcherKind,
        a: &Value,
        b: &Value,
        hooks: &dyn ValueHooks,
    ) -> Result<Patch, PatchError> {
        Ok(Self::create(patcher, a, b, hooks)?.unwrap_or_else(|| Self::empty(patcher)))
    }

    pub fn empty(patcher: PatcherKind) -> Patch {
        Patch {
            patcher,
            ops: Vec::new(),
        }
    }

    /// Encode `ops` as-is.
    ///
    /// The compact codec refuses `move`, `copy` and `test`; use
    /// [`Patch::encode_lowered`] for arbitrary lists.
    pub fn encode(patcher: PatcherKind, ops: &[Op]) -> Result<Patch, PatchError> {
        let ops = match patcher {
            PatcherKind::JsonPatch => verbose::encode(ops),
            PatcherKind::MiniJsonPatch => compact::encode(ops)?,
        };
        Ok(Patch { patcher, ops })
    }

    /// Encode `ops`, first lowering them against `base` when the codec
    /// cannot carry them directly.
    pub fn encode_lowered(
        patcher: PatcherKind,
        base: &Value,
        ops: &[Op],
        hooks: &dyn ValueHooks,
    ) -> Result<Patch, PatchError> {
        match patcher {
            PatcherKind::JsonPatch => Self::encode(patcher, ops),
            PatcherKind::MiniJsonPatch => {
                let lowered = compact::lower(base, ops, hooks)?;
                Self::encode(patcher, &lowered)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    fn decode_op(&self, raw: &Value) -> Result<Op, PatchError> {
        match self.patcher {
            PatcherKind::JsonPatch => verbose::decode_op(raw),
            PatcherKind::MiniJsonPatch => compact::decode_op(raw),
        }
    }

    /// Decode every wire operation.
    pub fn decode(&self) -> Result<Vec<Op>, PatchError> {
        self.ops.iter().map(|raw| self.decode_op(raw)).collect()
    }

    /// Apply to `target`, decoding one wire operation at a time.
    ///
    /// A malformed operation fails before it touches the tree. Operations
    /// already applied are not rolled back, but since `target` is consumed
    /// the partial tree is dropped with the error.
    pub fn apply(&self, mut target: Value, hooks: &dyn ValueHooks) -> Result<Value, PatchError> {
        for raw in &self.ops {
            let op = self.decode_op(raw)?;
            apply_op(&mut target, &op, hooks)?;
        }
        Ok(target)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_patch::hooks::AtomicLeaves;
    use docgit_json_pointer::JsonPointerError;
    use serde_json::json;

    /// Reports a renamed key as a single move.
    struct RenameHook;

    impl ValueHooks for RenameHook {
        fn diff(&self, input: &Value, output: &Value, ptr: &Pointer) -> Option<Vec<Op>> {
            if input.get("old").is_some() && output.get("new") == input.get("old") {
                return Some(vec![Op::Move {
                    from: ptr.child("old"),
                    path: ptr.child("new"),
                }]);
            }
            None
        }
    }

    #[test]
    fn envelope_serde_shape() {
        let patch = Patch {
            patcher: PatcherKind::JsonPatch,
            ops: vec![json!({"op": "remove", "path": "/a"})],
        };
        let wire = serde_json::to_value(&patch).unwrap();
        assert_eq!(wire, json!({"type": "json-patch", "ops": [{"op": "remove", "path": "/a"}]}));
        let back: Patch = serde_json::from_value(wire).unwrap();
        assert_eq!(back, patch);
        assert_eq!(PatcherKind::default(), PatcherKind::MiniJsonPatch);
        assert_eq!("json-patch".parse::<PatcherKind>().unwrap(), PatcherKind::JsonPatch);
    }

    #[test]
    fn create_returns_none_for_no_change() {
        for kind in [PatcherKind::JsonPatch, PatcherKind::MiniJsonPatch] {
            let v = json!({"a": [1, 2]});
            assert_eq!(Patch::create(kind, &v, &v.clone(), &AtomicLeaves).unwrap(), None);
        }
    }

    #[test]
    fn both_codecs_reproduce_output() {
        let input = json!({"foo": ["bar", "baz"], "n": 1});
        let output = json!({"foo": ["bar", "qux", "baz"], "m": {"k": null}});
        for kind in [PatcherKind::JsonPatch, PatcherKind::MiniJsonPatch] {
            let patch = Patch::create(kind, &input, &output, &AtomicLeaves)
                .unwrap()
                .unwrap();
            assert_eq!(patch.patcher, kind);
            assert_eq!(patch.apply(input.clone(), &AtomicLeaves).unwrap(), output);
        }
    }

    #[test]
    fn first_commit_is_single_root_replace() {
        let state = json!({"name": "doc"});
        let compact = Patch::create(PatcherKind::MiniJsonPatch, &Value::Null, &state, &AtomicLeaves)
            .unwrap()
            .unwrap();
        assert_eq!(compact.ops, vec![json!(["~", "", {"name": "doc"}])]);
        let verbose = Patch::create(PatcherKind::JsonPatch, &Value::Null, &state, &AtomicLeaves)
            .unwrap()
            .unwrap();
        assert_eq!(
            verbose.ops,
            vec![json!({"op": "replace", "path": "", "value": {"name": "doc"}})]
        );
    }

    #[test]
    fn unknown_tag_fails_before_mutating_that_op() {
        let patch = Patch {
            patcher: PatcherKind::JsonPatch,
            ops: vec![
                json!({"op": "add", "path": "/a", "value": 1}),
                json!({"op": "frobnicate", "path": "/a"}),
            ],
        };
        let err = patch.apply(json!({}), &AtomicLeaves).unwrap_err();
        assert!(matches!(err, PatchError::InvalidOperation(_)));
        assert!(matches!(patch.decode(), Err(PatchError::InvalidOperation(_))));
    }

    #[test]
    fn encode_lowered_carries_move_in_compact_form() {
        let base = json!({"a": 1});
        let ops = vec![Op::Move {
            from: Pointer::parse("/a").unwrap(),
            path: Pointer::parse("/b").unwrap(),
        }];
        assert!(matches!(
            Patch::encode(PatcherKind::MiniJsonPatch, &ops),
            Err(PatchError::Unsupported(_))
        ));
        let patch = Patch::encode_lowered(PatcherKind::MiniJsonPatch, &base, &ops, &AtomicLeaves).unwrap();
        assert_eq!(patch.ops, vec![json!(["-", "/a"]), json!(["+", "/b", 1])]);
        assert_eq!(patch.apply(base, &AtomicLeaves).unwrap(), json!({"b": 1}));
    }

    #[test]
    fn hook_move_is_lowered_for_compact_codec() {
        let input = json!({"old": 1});
        let output = json!({"new": 1});
        let compact = Patch::create(PatcherKind::MiniJsonPatch, &input, &output, &RenameHook)
            .unwrap()
            .unwrap();
        assert_eq!(compact.ops, vec![json!(["-", "/old"]), json!(["+", "/new", 1])]);
        assert_eq!(compact.apply(input.clone(), &RenameHook).unwrap(), output);

        let verbose = Patch::create(PatcherKind::JsonPatch, &input, &output, &RenameHook)
            .unwrap()
            .unwrap();
        assert_eq!(verbose.ops, vec![json!({"op": "move", "path": "/new", "from": "/old"})]);
        assert_eq!(verbose.apply(input, &RenameHook).unwrap(), output);
    }

    #[test]
    fn oversized_wire_pointers_are_refused() {
        let long = format!("/{}", "a".repeat(2000));
        let deep = "/a".repeat(300);
        for raw in [&long, &deep] {
            let compact = Patch {
                patcher: PatcherKind::MiniJsonPatch,
                ops: vec![json!(["-", raw])],
            };
            assert_eq!(
                compact.decode(),
                Err(PatchError::Pointer(JsonPointerError::TooLong))
            );
            let verbose = Patch {
                patcher: PatcherKind::JsonPatch,
                ops: vec![json!({"op": "remove", "path": raw})],
            };
            assert_eq!(
                verbose.apply(json!({}), &AtomicLeaves),
                Err(PatchError::Pointer(JsonPointerError::TooLong))
            );
        }
    }
}
