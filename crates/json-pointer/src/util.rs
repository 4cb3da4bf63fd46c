use crate::JsonPointerError;

/// A single unescaped pointer token.
pub type PathStep = String;

/// A pointer as a list of unescaped tokens. The empty list is the root.
pub type Path = Vec<PathStep>;

/// The sequence token meaning "one past the last element".
pub const APPEND_MARKER: &str = "-";

/// Unescapes a JSON Pointer path component.
///
/// `~1` is replaced with `/` first and `~0` with `~` second, so that `~01`
/// decodes to `~1` rather than `/`.
///
/// # Example
///
/// ```
/// use docgit_json_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// assert_eq!(unescape_component("~01"), "~1");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
///
/// `~` is escaped before `/`.
///
/// # Example
///
/// ```
/// use docgit_json_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// assert_eq!(escape_component("no-escapes"), "no-escapes");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Parse a JSON Pointer string into path components.
///
/// - Empty string returns the root path
/// - Anything else must start with `/`
/// - Each component is unescaped
///
/// # Example
///
/// ```
/// use docgit_json_pointer::parse_json_pointer;
///
/// assert_eq!(parse_json_pointer("").unwrap(), Vec::<String>::new());
/// assert_eq!(parse_json_pointer("/").unwrap(), vec![""]);
/// assert_eq!(parse_json_pointer("/a~0b/c~1d").unwrap(), vec!["a~b", "c/d"]);
/// assert!(parse_json_pointer("foo").is_err());
/// ```
pub fn parse_json_pointer(pointer: &str) -> Result<Path, JsonPointerError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    match pointer.strip_prefix('/') {
        Some(rest) => Ok(rest.split('/').map(unescape_component).collect()),
        None => Err(JsonPointerError::Malformed(pointer.to_string())),
    }
}

/// Format path components into a JSON Pointer string.
///
/// Returns an empty string for the root path.
///
/// # Example
///
/// ```
/// use docgit_json_pointer::format_json_pointer;
///
/// assert_eq!(format_json_pointer(&[]), "");
/// assert_eq!(format_json_pointer(&["foo".to_string(), "a/b".to_string()]), "/foo/a~1b");
/// ```
pub fn format_json_pointer(path: &[String]) -> String {
    let mut out = String::with_capacity(path.len() * 8);
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Check if `parent` is a strict ancestor of `child`.
pub fn is_child(parent: &[String], child: &[String]) -> bool {
    parent.len() < child.len() && child[..parent.len()] == *parent
}

/// Get the parent path of a given path.
///
/// # Errors
///
/// Returns [`JsonPointerError::NoParent`] for the root path.
pub fn parent(path: &[String]) -> Result<Path, JsonPointerError> {
    match path.split_last() {
        Some((_, init)) => Ok(init.to_vec()),
        None => Err(JsonPointerError::NoParent),
    }
}

/// Check if a string is a canonical non-negative array index (no sign, no
/// leading zeros).
///
/// # Example
///
/// ```
/// use docgit_json_pointer::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("123"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index("+1"));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    let bytes = index.as_bytes();
    if bytes.is_empty() || (bytes.len() > 1 && bytes[0] == b'0') {
        return false;
    }
    bytes.iter().all(u8::is_ascii_digit)
}

/// Parse a sequence token into an index, if it is a canonical index.
pub fn parse_index(token: &str) -> Option<usize> {
    if is_valid_index(token) {
        token.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_and_unescape() {
        assert_eq!(escape_component("~~"), "~0~0");
        assert_eq!(escape_component("//"), "~1~1");
        assert_eq!(escape_component("a~b/c"), "a~0b~1c");
        assert_eq!(unescape_component("a~0b~1c"), "a~b/c");
        assert_eq!(unescape_component("~1~1"), "//");
    }

    #[test]
    fn parse_root_and_trailing() {
        assert_eq!(parse_json_pointer("").unwrap(), Vec::<String>::new());
        assert_eq!(parse_json_pointer("/foo///").unwrap(), vec!["foo", "", "", ""]);
    }

    #[test]
    fn parse_rejects_relative() {
        assert_eq!(
            parse_json_pointer("foo/bar"),
            Err(JsonPointerError::Malformed("foo/bar".to_string()))
        );
    }

    #[test]
    fn parent_and_child() {
        let p = vec!["a".to_string()];
        let c = vec!["a".to_string(), "b".to_string()];
        assert!(is_child(&p, &c));
        assert!(!is_child(&c, &p));
        assert!(!is_child(&p, &p));
        assert_eq!(parent(&c).unwrap(), p);
        assert_eq!(parent(&[]), Err(JsonPointerError::NoParent));
    }

    #[test]
    fn index_parsing() {
        assert_eq!(parse_index("7"), Some(7));
        assert_eq!(parse_index("007"), None);
        assert_eq!(parse_index("-"), None);
        assert_eq!(parse_index(""), None);
    }
}
