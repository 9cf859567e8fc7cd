//! Inversion engine.
//!
//! Every function here reads the document as it is *before* the operation is
//! applied. The returned operation, applied to the post-operation document,
//! reproduces the pre-operation document exactly.

use aas_patch_pointer::{format_json_pointer, get, is_child, APPEND_MARKER};
use serde_json::Value;
use tracing::warn;

use crate::apply::{apply_remove, apply_with_inverse};
use crate::types::{OpKind, Operation, OperationMeta, PatchError};
use crate::validate::{validate_operation, ValidationError};

/// Inverses of a batch, in undo order.
#[derive(Debug, Clone, PartialEq)]
pub struct InverseBatch {
    pub ops: Vec<Operation>,
    /// Index of the operation that could not be applied, if inversion
    /// stopped early. The list then only covers the operations before it.
    pub stopped_at: Option<usize>,
}

impl InverseBatch {
    /// `true` when `ops` undoes the whole batch.
    pub fn is_complete(&self) -> bool {
        self.stopped_at.is_none()
    }
}

fn lookup<'a>(doc: &'a Value, path: &[String]) -> Result<&'a Value, PatchError> {
    get(doc, path).ok_or_else(|| PatchError::NotFound(format_json_pointer(path)))
}

/// Compute the operation that undoes `op`.
///
/// `pre` must be the document `op` is about to be applied to. Returns
/// `Ok(None)` for `test`, which never mutates.
pub fn invert(pre: &Value, op: &Operation) -> Result<Option<Operation>, PatchError> {
    let path = op.path_steps();
    let inverse = match op.op {
        OpKind::Test => return Ok(None),
        OpKind::Add => invert_insert(pre, &path)?,
        OpKind::Copy => {
            lookup(pre, &source(op)?)?;
            invert_insert(pre, &path)?
        }
        OpKind::Remove => {
            if path.is_empty() {
                return Err(PatchError::InvalidTarget(String::new()));
            }
            Operation::add(op.path.clone(), lookup(pre, &path)?.clone())
        }
        OpKind::Replace => Operation::replace(op.path.clone(), lookup(pre, &path)?.clone()),
        OpKind::Move => invert_move(pre, &source(op)?, &path)?,
    };
    Ok(Some(inverse.with_meta(undo_meta(op))))
}

fn source(op: &Operation) -> Result<Vec<String>, PatchError> {
    op.from_steps().ok_or(PatchError::InvalidOp(ValidationError::MissingFrom))
}

/// Inverse of anything that inserts at `path` (`add`, `copy`).
fn invert_insert(pre: &Value, path: &[String]) -> Result<Operation, PatchError> {
    let Some((key, parent_path)) = path.split_last() else {
        return Ok(Operation::replace("", pre.clone()));
    };
    match lookup(pre, parent_path)? {
        Value::Array(arr) => {
            // The append marker is not a valid remove target.
            let index = if key == APPEND_MARKER { arr.len().to_string() } else { key.clone() };
            let mut target = parent_path.to_vec();
            target.push(index);
            Ok(Operation::remove(format_json_pointer(&target)))
        }
        Value::Object(map) => Ok(match map.get(key) {
            Some(old) => Operation::replace(format_json_pointer(path), old.clone()),
            None => Operation::remove(format_json_pointer(path)),
        }),
        _ => Err(PatchError::InvalidTarget(format_json_pointer(parent_path))),
    }
}

/// Inverse of a move: move the value back from where it landed.
///
/// The landing location is resolved against the document with the source
/// already removed, which is the state the add half of the move sees.
fn invert_move(pre: &Value, from: &[String], path: &[String]) -> Result<Operation, PatchError> {
    if is_child(from, path) {
        return Err(PatchError::MoveIntoSelf {
            from: format_json_pointer(from),
            path: format_json_pointer(path),
        });
    }
    if from == path {
        lookup(pre, from)?;
        let pointer = format_json_pointer(path);
        return Ok(Operation::move_op(pointer.clone(), pointer));
    }
    let Some((key, parent_path)) = path.split_last() else {
        lookup(pre, from)?;
        return Ok(Operation::replace("", pre.clone()));
    };

    let mut mid = pre.clone();
    apply_remove(&mut mid, from)?;

    let landing = match lookup(&mid, parent_path)? {
        Value::Array(arr) => {
            let index = if key == APPEND_MARKER { arr.len().to_string() } else { key.clone() };
            let mut landing = parent_path.to_vec();
            landing.push(index);
            landing
        }
        Value::Object(map) if map.contains_key(key) => return restore_common_ancestor(pre, from, path),
        Value::Object(_) => path.to_vec(),
        _ => return Err(PatchError::InvalidTarget(format_json_pointer(parent_path))),
    };
    // Moving back would be a move into its own child.
    if is_child(&landing, from) {
        return restore_common_ancestor(pre, from, path);
    }
    Ok(Operation::move_op(format_json_pointer(&landing), format_json_pointer(from)))
}

/// Fallback inverse for moves that cannot be undone by a move: replace the
/// smallest subtree holding both affected containers with its old value.
///
/// The common prefix of the two parent paths addresses the same node before
/// and after the move.
fn restore_common_ancestor(pre: &Value, from: &[String], path: &[String]) -> Result<Operation, PatchError> {
    let from_parent = &from[..from.len().saturating_sub(1)];
    let path_parent = &path[..path.len().saturating_sub(1)];
    let common = from_parent
        .iter()
        .zip(path_parent)
        .take_while(|(a, b)| a == b)
        .count();
    let ancestor = &from_parent[..common];
    Ok(Operation::replace(format_json_pointer(ancestor), lookup(pre, ancestor)?.clone()))
}

fn undo_meta(op: &Operation) -> OperationMeta {
    let reason = match &op.meta.reason {
        Some(reason) => format!("Undo: {reason}"),
        None => format!("Undo: {}", op.describe()),
    };
    OperationMeta {
        reason: Some(reason),
        ..op.meta.clone()
    }
}

/// Invert a batch against its pre-batch document.
///
/// Each operation is applied to a running clone, with the same mutation
/// routine the apply engine uses, so later inverses see the right
/// intermediate state. Inversion stops at the first operation that is
/// malformed or fails to apply; see [`InverseBatch::is_complete`].
pub fn invert_many(pre: &Value, ops: &[Operation]) -> InverseBatch {
    let mut working = pre.clone();
    let mut inverse = Vec::with_capacity(ops.len());
    let mut stopped_at = None;
    for (i, op) in ops.iter().enumerate() {
        let step = validate_operation(op)
            .map_err(PatchError::from)
            .and_then(|()| apply_with_inverse(&mut working, op));
        match step {
            Ok(inv) => inverse.extend(inv),
            Err(err) => {
                warn!(stopped_at = i, error = %err, "inversion stopped early");
                stopped_at = Some(i);
                break;
            }
        }
    }
    inverse.reverse();
    InverseBatch { ops: inverse, stopped_at }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply_op;
    use serde_json::json;

    fn round_trip(doc: Value, op: Operation) -> Operation {
        let inverse = invert(&doc, &op).unwrap().unwrap();
        let mut working = doc.clone();
        apply_op(&mut working, &op).unwrap();
        apply_op(&mut working, &inverse).unwrap();
        assert_eq!(working, doc, "inverse {inverse:?} did not restore the document");
        inverse
    }

    #[test]
    fn add_append_resolves_index() {
        let inverse = round_trip(json!({"items": [{"id": "a"}]}), Operation::add("/items/-", json!({"id": "b"})));
        assert_eq!(inverse.op, OpKind::Remove);
        assert_eq!(inverse.path, "/items/1");
    }

    #[test]
    fn add_new_member_inverts_to_remove() {
        let inverse = round_trip(json!({"a": 1}), Operation::add("/b", json!(2)));
        assert_eq!(inverse, Operation::remove("/b").with_reason("Undo: add /b"));
    }

    #[test]
    fn add_over_existing_member_inverts_to_replace() {
        let inverse = round_trip(json!({"a": 1}), Operation::add("/a", json!(2)));
        assert_eq!(inverse.op, OpKind::Replace);
        assert_eq!(inverse.value, Some(json!(1)));
    }

    #[test]
    fn add_at_root_inverts_to_root_replace() {
        let inverse = round_trip(json!({"a": 1}), Operation::add("", json!("x")));
        assert_eq!(inverse.path, "");
        assert_eq!(inverse.value, Some(json!({"a": 1})));
    }

    #[test]
    fn remove_and_replace_capture_old_value() {
        let doc = json!({"items": [{"id": "a"}, {"id": "b"}]});
        let inverse = round_trip(doc.clone(), Operation::remove("/items/0"));
        assert_eq!(inverse.op, OpKind::Add);
        assert_eq!(inverse.value, Some(json!({"id": "a"})));

        let inverse = round_trip(doc, Operation::replace("/items/0/id", json!("z")));
        assert_eq!(inverse.op, OpKind::Replace);
        assert_eq!(inverse.path, "/items/0/id");
        assert_eq!(inverse.value, Some(json!("a")));
    }

    #[test]
    fn copy_inverts_to_remove_at_destination() {
        let inverse = round_trip(json!({"a": {"x": 1}, "b": []}), Operation::copy("/a", "/b/-"));
        assert_eq!(inverse.op, OpKind::Remove);
        assert_eq!(inverse.path, "/b/0");
    }

    #[test]
    fn move_swaps_pointers() {
        let inverse = round_trip(json!({"a": 1, "b": {}}), Operation::move_op("/a", "/b/a"));
        assert_eq!(inverse.op, OpKind::Move);
        assert_eq!(inverse.from.as_deref(), Some("/b/a"));
        assert_eq!(inverse.path, "/a");
    }

    #[test]
    fn move_to_append_in_same_array() {
        let inverse = round_trip(json!({"items": [1, 2, 3]}), Operation::move_op("/items/0", "/items/-"));
        assert_eq!(inverse.from.as_deref(), Some("/items/2"));
        assert_eq!(inverse.path, "/items/0");
    }

    #[test]
    fn move_across_arrays() {
        let doc = json!({"a": [1, 2], "b": [3]});
        let inverse = round_trip(doc.clone(), Operation::move_op("/a/1", "/b/-"));
        assert_eq!(inverse.from.as_deref(), Some("/b/1"));
        round_trip(doc, Operation::move_op("/a/0", "/b/0"));
    }

    #[test]
    fn move_through_shifted_index() {
        let doc = json!({"items": [{"n": 1}, {"n": 2, "tags": []}, {"n": 3, "tags": []}]});
        round_trip(doc.clone(), Operation::move_op("/items/0", "/items/1/tags/-"));
        round_trip(doc, Operation::move_op("/items/0/n", "/items/2/tags/0"));
    }

    #[test]
    fn move_over_existing_member() {
        let doc = json!({"a": {"x": 1}, "b": {"y": 2}});
        let inverse = round_trip(doc.clone(), Operation::move_op("/a/x", "/b/y"));
        assert_eq!(inverse.op, OpKind::Replace);
        assert_eq!(inverse.path, "");
        round_trip(json!({"p": {"a": {"x": 1}}}), Operation::move_op("/p/a/x", "/p/a"));
    }

    #[test]
    fn move_up_into_array_slot() {
        let doc = json!({"rows": [{"cells": [1]}, {"cells": [2, 3]}]});
        let inverse = round_trip(doc, Operation::move_op("/rows/1/cells", "/rows/1"));
        assert_eq!(inverse.op, OpKind::Replace);
        assert_eq!(inverse.path, "/rows");
    }

    #[test]
    fn move_to_root_and_to_itself() {
        round_trip(json!({"a": {"x": 1}}), Operation::move_op("/a", ""));
        round_trip(json!({"a": 1}), Operation::move_op("/a", "/a"));
    }

    #[test]
    fn move_into_self_is_a_target_error() {
        let doc = json!({"a": {"b": {}}});
        let err = invert(&doc, &Operation::move_op("/a", "/a/b")).unwrap_err();
        assert!(matches!(err, PatchError::MoveIntoSelf { .. }));
    }

    #[test]
    fn test_has_no_inverse() {
        assert_eq!(invert(&json!({"a": 1}), &Operation::test("/a", json!(1))), Ok(None));
    }

    #[test]
    fn missing_targets_are_not_found() {
        let doc = json!({"a": 1});
        assert_eq!(
            invert(&doc, &Operation::remove("/b")),
            Err(PatchError::NotFound("/b".into()))
        );
        assert_eq!(
            invert(&doc, &Operation::add("/x/y", json!(1))),
            Err(PatchError::NotFound("/x".into()))
        );
        assert_eq!(
            invert(&doc, &Operation::copy("/z", "/b")),
            Err(PatchError::NotFound("/z".into()))
        );
    }

    #[test]
    fn inverse_reason_references_original() {
        let op = Operation::replace("/a", json!(2)).with_reason("fix typo");
        let inverse = invert(&json!({"a": 1}), &op).unwrap().unwrap();
        assert_eq!(inverse.meta.reason.as_deref(), Some("Undo: fix typo"));
    }

    #[test]
    fn invert_many_prepends() {
        let doc = json!({"items": []});
        let ops = vec![
            Operation::add("/items/-", json!("a")),
            Operation::add("/items/-", json!("b")),
            Operation::test("/items/1", json!("b")),
        ];
        let batch = invert_many(&doc, &ops);
        assert!(batch.is_complete());
        let paths: Vec<_> = batch.ops.iter().map(|op| op.path.as_str()).collect();
        assert_eq!(paths, vec!["/items/1", "/items/0"]);
    }

    #[test]
    fn invert_many_stops_at_failure() {
        let doc = json!({"a": 1});
        let ops = vec![
            Operation::replace("/a", json!(2)),
            Operation::remove("/missing"),
            Operation::remove("/a"),
        ];
        let batch = invert_many(&doc, &ops);
        assert_eq!(batch.stopped_at, Some(1));
        assert!(!batch.is_complete());
        assert_eq!(batch.ops.len(), 1);
        assert_eq!(batch.ops[0].value, Some(json!(1)));
    }
}
