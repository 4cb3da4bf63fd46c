use serde_json::Value;

use crate::util::{parse_index, APPEND_MARKER};

/// Get a value from a JSON document by path.
///
/// Returns `None` if the path doesn't exist. The append marker never
/// resolves, since it names a slot that does not exist yet.
///
/// # Example
///
/// ```
/// use docgit_json_pointer::get;
/// use serde_json::json;
///
/// let doc = json!({"foo": {"bar": [1, 2]}});
/// let path = vec!["foo".to_string(), "bar".to_string(), "1".to_string()];
/// assert_eq!(get(&doc, &path), Some(&json!(2)));
/// assert_eq!(get(&doc, &["missing".to_string()]), None);
/// ```
pub fn get<'a>(val: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = val;
    for step in path {
        current = match current {
            Value::Object(map) => map.get(step)?,
            Value::Array(arr) => {
                if step == APPEND_MARKER {
                    return None;
                }
                arr.get(parse_index(step)?)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Get a mutable reference to a value in a JSON document by path.
pub fn get_mut<'a>(val: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = val;
    for step in path {
        current = match current {
            Value::Object(map) => map.get_mut(step)?,
            Value::Array(arr) => {
                if step == APPEND_MARKER {
                    return None;
                }
                arr.get_mut(parse_index(step)?)?
            }
            _ => return None,
        };
    }
    Some(current)
}
