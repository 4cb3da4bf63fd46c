//! docgit: git-like commit history for JSON documents.
//!
//! Provides a structural JSON diff, an RFC 6902 patch applicator, two patch
//! wire formats, and a commit/snapshot engine that rebuilds any past state
//! of a tracked object from a symbolic reference (`HEAD~2`, a date, an id).
//!
//! - [`json_patch`]: operations, the applicator and value hooks;
//! - [`json_patch_diff`]: the structural diff;
//! - [`codec`]: the verbose and compact wire formats;
//! - [`git`]: commits, stores, refs and version contexts.

pub mod codec;
pub mod git;
pub mod json_patch;
pub mod json_patch_diff;

pub use codec::{Patch, PatcherKind};
pub use docgit_json_pointer::Pointer;
pub use json_patch::{Op, PatchError, ValueHooks};
pub use json_patch_diff::{diff, diff_with};
