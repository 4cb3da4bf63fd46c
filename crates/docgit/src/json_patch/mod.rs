//! JSON Patch operations (RFC 6902) and their applicator.
//!
//! All six standard operations are supported:
//! `add`, `remove`, `replace`, `move`, `copy`, `test`.
//!
//! Opaque leaf types are handled through [`ValueHooks`]; the default
//! [`AtomicLeaves`] compares and clones everything structurally.

pub mod apply;
pub mod hooks;
pub mod types;
pub mod util;

pub use apply::{apply_op, apply_ops, apply_patch};
pub use hooks::{deep_clone, values_equal, AtomicLeaves, ExtendedJsonLeaves, ValueHooks};
pub use types::{Op, PatchError};
pub use util::create_tests;
