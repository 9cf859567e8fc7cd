//! Apply engine.
//!
//! [`apply_op`] is the one mutation routine: it edits a document in place and
//! is shared by [`apply_one`], [`apply_many`] and
//! [`invert_many`](crate::invert::invert_many). The public entry points never
//! touch the caller's document; they work on a clone and hand it back.

use aas_patch_pointer::{format_json_pointer, get, get_mut, is_child, parse_index, APPEND_MARKER};
use serde_json::Value;
use tracing::{debug, warn};

use crate::invert::invert;
use crate::types::{BatchError, OpKind, OpResult, Operation, PatchError, PatchResult};
use crate::validate::{validate_operation, validate_operations, ValidationError};

// ── Path navigation ───────────────────────────────────────────────────────

fn parent_mut<'a>(doc: &'a mut Value, parent_path: &[String]) -> Result<&'a mut Value, PatchError> {
    get_mut(doc, parent_path).ok_or_else(|| PatchError::NotFound(format_json_pointer(parent_path)))
}

fn array_index(path: &[String], step: &str) -> Result<usize, PatchError> {
    parse_index(step).ok_or_else(|| PatchError::InvalidIndex(format_json_pointer(path)))
}

// ── Individual operation applicators ─────────────────────────────────────

fn apply_add(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PatchError> {
    let Some((key, parent_path)) = path.split_last() else {
        return Ok(Some(std::mem::replace(doc, value)));
    };
    match parent_mut(doc, parent_path)? {
        Value::Object(map) => Ok(map.insert(key.clone(), value)),
        Value::Array(arr) => {
            if key == APPEND_MARKER {
                arr.push(value);
                return Ok(None);
            }
            let idx = array_index(path, key)?;
            if idx > arr.len() {
                return Err(PatchError::InvalidIndex(format_json_pointer(path)));
            }
            arr.insert(idx, value);
            Ok(None)
        }
        _ => Err(PatchError::InvalidTarget(format_json_pointer(parent_path))),
    }
}

pub(crate) fn apply_remove(doc: &mut Value, path: &[String]) -> Result<Value, PatchError> {
    let Some((key, parent_path)) = path.split_last() else {
        return Err(PatchError::InvalidTarget(String::new()));
    };
    match parent_mut(doc, parent_path)? {
        Value::Object(map) => map
            .shift_remove(key)
            .ok_or_else(|| PatchError::NotFound(format_json_pointer(path))),
        Value::Array(arr) => {
            if key == APPEND_MARKER {
                return Err(PatchError::NotFound(format_json_pointer(path)));
            }
            let idx = array_index(path, key)?;
            if idx >= arr.len() {
                return Err(PatchError::NotFound(format_json_pointer(path)));
            }
            Ok(arr.remove(idx))
        }
        _ => Err(PatchError::InvalidTarget(format_json_pointer(parent_path))),
    }
}

fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> Result<Value, PatchError> {
    let target = get_mut(doc, path).ok_or_else(|| PatchError::NotFound(format_json_pointer(path)))?;
    Ok(std::mem::replace(target, value))
}

fn apply_copy(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, PatchError> {
    let src = get(doc, from)
        .ok_or_else(|| PatchError::NotFound(format_json_pointer(from)))?
        .clone();
    apply_add(doc, path, src)
}

fn apply_move(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, PatchError> {
    if is_child(from, path) {
        return Err(PatchError::MoveIntoSelf {
            from: format_json_pointer(from),
            path: format_json_pointer(path),
        });
    }
    if from == path {
        return match get(doc, from) {
            Some(_) => Ok(None),
            None => Err(PatchError::NotFound(format_json_pointer(from))),
        };
    }
    let value = apply_remove(doc, from)?;
    apply_add(doc, path, value)
}

fn apply_test(doc: &Value, path: &[String], value: &Value) -> Result<(), PatchError> {
    let actual = get(doc, path).ok_or_else(|| PatchError::NotFound(format_json_pointer(path)))?;
    if actual == value {
        Ok(())
    } else {
        Err(PatchError::Test(format_json_pointer(path)))
    }
}

// ── Entry points ─────────────────────────────────────────────────────────

fn op_value(op: &Operation) -> Result<&Value, PatchError> {
    op.value.as_ref().ok_or(PatchError::InvalidOp(ValidationError::MissingValue))
}

fn op_from(op: &Operation) -> Result<Vec<String>, PatchError> {
    op.from_steps().ok_or(PatchError::InvalidOp(ValidationError::MissingFrom))
}

/// Apply one operation to `doc` in place, returning the value it displaced
/// (if any).
///
/// This does not validate and does not compute an inverse; on failure `doc`
/// may be partially modified (a `move` whose add half fails). Callers own the
/// clone they pass in.
pub fn apply_op(doc: &mut Value, op: &Operation) -> Result<Option<Value>, PatchError> {
    let path = op.path_steps();
    match op.op {
        OpKind::Add => apply_add(doc, &path, op_value(op)?.clone()),
        OpKind::Remove => apply_remove(doc, &path).map(Some),
        OpKind::Replace => apply_replace(doc, &path, op_value(op)?.clone()).map(Some),
        OpKind::Copy => apply_copy(doc, &path, &op_from(op)?),
        OpKind::Move => apply_move(doc, &path, &op_from(op)?),
        OpKind::Test => {
            apply_test(doc, &path, op_value(op)?)?;
            Ok(None)
        }
    }
}

/// Compute the inverse against the current state of `doc`, then mutate it.
pub(crate) fn apply_with_inverse(doc: &mut Value, op: &Operation) -> Result<Option<Operation>, PatchError> {
    let inverse = invert(doc, op)?;
    apply_op(doc, op)?;
    Ok(inverse)
}

/// Validate and apply a single operation.
///
/// Returns the new document together with the operation that undoes it.
pub fn apply_one(doc: &Value, op: &Operation) -> Result<OpResult, PatchError> {
    validate_operation(op)?;
    let mut working = doc.clone();
    match apply_with_inverse(&mut working, op) {
        Ok(inverse) => Ok(OpResult { doc: working, inverse }),
        Err(err) => {
            warn!(op = %op.describe(), error = %err, "operation failed");
            Err(err)
        }
    }
}

/// Apply a batch atomically.
///
/// Every operation is validated before anything is applied. The returned
/// inverse list undoes the batch when applied front to back. On failure the
/// working copy is dropped and the error names the failing index.
pub fn apply_many(doc: &Value, ops: &[Operation]) -> Result<PatchResult, BatchError> {
    if let Err(err) = validate_operations(ops) {
        warn!(failed_at = err.failed_at, error = %err.error, "batch rejected");
        return Err(err);
    }

    let mut working = doc.clone();
    let mut inverse = Vec::with_capacity(ops.len());
    let mut mutated = false;
    for (i, op) in ops.iter().enumerate() {
        match apply_with_inverse(&mut working, op) {
            Ok(inv) => {
                inverse.extend(inv);
                mutated |= op.op != OpKind::Test;
            }
            Err(error) => {
                warn!(failed_at = i, op = %op.describe(), error = %error, "batch failed");
                return Err(BatchError {
                    failed_at: i,
                    error,
                    mutated,
                });
            }
        }
    }
    inverse.reverse();

    debug!(ops = ops.len(), inverse = inverse.len(), "applied batch");
    Ok(PatchResult { doc: working, inverse })
}

// ── Tests ─────────────────────────────────────────────────────────────────
