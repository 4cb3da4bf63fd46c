//! JSON Pointer (RFC 6901) tokens.
//!
//! A [`Pointer`] addresses one location inside a `serde_json::Value` tree.
//! Tokens are held unescaped; `~` is written as `~0` and `/` as `~1` in the
//! string form.
//!
//! # Example
//!
//! ```
//! use docgit_json_pointer::Pointer;
//! use serde_json::json;
//!
//! let doc = json!({"foo": {"bar": 42}});
//! let ptr = Pointer::parse("/foo/bar").unwrap();
//! assert_eq!(ptr.resolve(&doc), Some(&json!(42)));
//! assert_eq!(ptr.to_string(), "/foo/bar");
//! ```

use thiserror::Error;

mod get;
mod pointer;
mod util;
pub mod validate;

pub use get::{get, get_mut};
pub use pointer::Pointer;
pub use util::{
    escape_component, format_json_pointer, is_child, is_valid_index, parent, parse_index,
    parse_json_pointer, unescape_component, Path, PathStep, APPEND_MARKER,
};
pub use validate::{validate_json_pointer, validate_path};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPointerError {
    #[error("malformed JSON pointer '{0}': must be empty or start with '/'")]
    Malformed(String),
    #[error("JSON pointer too long")]
    TooLong,
    #[error("path has no parent")]
    NoParent,
}
