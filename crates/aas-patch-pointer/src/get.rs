use serde_json::Value;

use crate::types::APPEND_MARKER;
use crate::util::parse_index;

/// Get a value from a JSON document by path.
///
/// Returns `None` if the path doesn't resolve. The append marker never
/// resolves: it names a position, not a value.
///
/// # Example
///
/// ```
/// use aas_patch_pointer::get;
/// use serde_json::json;
///
/// let doc = json!({"items": [{"id": "a"}]});
/// let val = get(&doc, &["items".to_string(), "0".to_string(), "id".to_string()]);
/// assert_eq!(val, Some(&json!("a")));
/// assert_eq!(get(&doc, &["items".to_string(), "-".to_string()]), None);
/// ```
pub fn get<'a>(val: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = val;
    for path_step in path {
        current = match current {
            Value::Array(arr) => {
                if path_step == APPEND_MARKER {
                    return None;
                }
                arr.get(parse_index(path_step)?)?
            }
            Value::Object(map) => map.get(path_step)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Get a mutable reference to a value in a JSON document by path.
///
/// Same resolution rules as [`get`].
pub fn get_mut<'a>(val: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = val;
    for path_step in path {
        current = match current {
            Value::Array(arr) => {
                if path_step == APPEND_MARKER {
                    return None;
                }
                arr.get_mut(parse_index(path_step)?)?
            }
            Value::Object(map) => map.get_mut(path_step)?,
            _ => return None,
        };
    }
    Some(current)
}
