//! Core types for the JSON Patch module: the six RFC 6902 operations and the
//! errors raised while applying them.

use docgit_json_pointer::{JsonPointerError, Pointer};
use serde_json::Value;
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    /// The target (or, for `add`, its parent container) does not exist.
    #[error("missing target at '{path}'")]
    MissingTarget { path: String },
    /// A `test` operation found a different value.
    #[error("test failed at '{path}'")]
    TestAssertion { path: String },
    /// A sequence token that is neither an index nor the append marker, or
    /// an index past the end.
    #[error("invalid array index at '{path}'")]
    InvalidIndex { path: String },
    /// Unknown tag or a malformed operation body.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// A key that would reach a shared prototype in prototypal hosts.
    #[error("forbidden key '{0}'")]
    ForbiddenKey(String),
    /// The selected codec cannot carry this operation.
    #[error("unsupported by codec: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Pointer(#[from] JsonPointerError),
}

impl PatchError {
    pub(crate) fn missing(path: &Pointer) -> Self {
        PatchError::MissingTarget {
            path: path.to_string(),
        }
    }
}

// ── Op enum ───────────────────────────────────────────────────────────────

/// A JSON Patch operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add { path: Pointer, value: Value },
    Remove { path: Pointer },
    Replace { path: Pointer, value: Value },
    Move { from: Pointer, path: Pointer },
    Copy { from: Pointer, path: Pointer },
    Test { path: Pointer, value: Value },
}

impl Op {
    /// The wire tag of the operation.
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add { .. } => "add",
            Op::Remove { .. } => "remove",
            Op::Replace { .. } => "replace",
            Op::Move { .. } => "move",
            Op::Copy { .. } => "copy",
            Op::Test { .. } => "test",
        }
    }

    /// Returns the target path of the operation.
    pub fn path(&self) -> &Pointer {
        match self {
            Op::Add { path, .. }
            | Op::Remove { path }
            | Op::Replace { path, .. }
            | Op::Move { path, .. }
            | Op::Copy { path, .. }
            | Op::Test { path, .. } => path,
        }
    }

    /// Returns the source path of `move` and `copy`.
    pub fn from(&self) -> Option<&Pointer> {
        match self {
            Op::Move { from, .. } | Op::Copy { from, .. } => Some(from),
            _ => None,
        }
    }

    /// True for operations that overwrite or drop an existing value.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Op::Remove { .. } | Op::Replace { .. } | Op::Move { .. })
    }

    /// True for `add`, `remove` and `replace`, the only operations the
    /// compact codec can carry.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Op::Add { .. } | Op::Remove { .. } | Op::Replace { .. })
    }
}
