use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::get::{get, get_mut};
use crate::util::{format_json_pointer, parse_index, parse_json_pointer, Path, APPEND_MARKER};
use crate::JsonPointerError;

/// A location inside a tree, held as unescaped tokens.
///
/// The empty token list is the root. `Display` produces the escaped string
/// form and [`Pointer::parse`] is its inverse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pointer {
    tokens: Path,
}

impl Pointer {
    /// The root pointer (`""`).
    pub fn root() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Parse an escaped pointer string.
    ///
    /// # Errors
    ///
    /// [`JsonPointerError::Malformed`] if the string is non-empty and does
    /// not start with `/`.
    ///
    /// # Example
    ///
    /// ```
    /// use docgit_json_pointer::Pointer;
    ///
    /// let ptr = Pointer::parse("/a~1b/0").unwrap();
    /// assert_eq!(ptr.tokens(), ["a/b", "0"]);
    /// assert_eq!(ptr.to_string(), "/a~1b/0");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, JsonPointerError> {
        parse_json_pointer(raw).map(|tokens| Self { tokens })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Path {
        self.tokens
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The last token, or `None` at the root.
    pub fn last(&self) -> Option<&str> {
        self.tokens.last().map(String::as_str)
    }

    /// Split into the parent pointer and the final token.
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        self.tokens
            .split_last()
            .map(|(last, init)| (init, last.as_str()))
    }

    /// Append one unescaped token.
    pub fn push(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    /// A new pointer one level below `self`.
    pub fn child(&self, token: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.push(token);
        next
    }

    /// Walk `tree` one token at a time.
    ///
    /// Missing keys, out-of-range indices and the append marker all yield
    /// `None`; callers decide whether that is fatal.
    pub fn resolve<'a>(&self, tree: &'a Value) -> Option<&'a Value> {
        get(tree, &self.tokens)
    }

    pub fn resolve_mut<'a>(&self, tree: &'a mut Value) -> Option<&'a mut Value> {
        get_mut(tree, &self.tokens)
    }

    /// Write `value` at this location in place.
    ///
    /// Only the immediate parent is written to; nothing is created along the
    /// way. The following are silent no-ops:
    /// - the root pointer (the tree's identity cannot change in place)
    /// - a parent that does not resolve
    /// - a parent that is a scalar
    /// - a sequence index past the end (other than exactly the end)
    ///
    /// # Example
    ///
    /// ```
    /// use docgit_json_pointer::Pointer;
    /// use serde_json::json;
    ///
    /// let mut doc = json!({"obj": {"a": 1}});
    /// Pointer::parse("/obj/b").unwrap().set(&mut doc, json!(2));
    /// Pointer::parse("/missing/c").unwrap().set(&mut doc, json!(3));
    /// assert_eq!(doc, json!({"obj": {"a": 1, "b": 2}}));
    /// ```
    pub fn set(&self, tree: &mut Value, value: Value) {
        let Some((parent, key)) = self.split_last() else {
            return;
        };
        match get_mut(tree, parent) {
            Some(Value::Object(map)) => {
                map.insert(key.to_string(), value);
            }
            Some(Value::Array(arr)) => {
                if key == APPEND_MARKER {
                    arr.push(value);
                    return;
                }
                match parse_index(key) {
                    Some(idx) if idx < arr.len() => arr[idx] = value,
                    Some(idx) if idx == arr.len() => arr.push(value),
                    _ => {}
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_json_pointer(&self.tokens))
    }
}

impl FromStr for Pointer {
    type Err = JsonPointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Path> for Pointer {
    fn from(tokens: Path) -> Self {
        Self { tokens }
    }
}

impl From<&[&str]> for Pointer {
    fn from(tokens: &[&str]) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }
}
