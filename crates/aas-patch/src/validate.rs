//! Operation validator.
//!
//! Structural checks only: these functions look at an operation's own shape
//! and never at the document it will be applied to. [`validate_raw_operation`]
//! works on the untyped wire form so untrusted input can be rejected before
//! decoding; [`validate_operation`] re-checks the typed form and is the gate
//! the apply engine runs before any mutation.

use aas_patch_pointer::{parse_json_pointer, validate_json_pointer, validate_path};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::classify::RiskTier;
use crate::types::{BatchError, OpKind, Operation};

// ── Error ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("OP_INVALID")]
    NotAnObject,
    #[error("Not a array.")]
    NotAList,
    #[error("OP_MISSING")]
    MissingOp,
    #[error("OP_UNKNOWN: {0}")]
    UnknownOp(String),
    #[error("OP_PATH_MISSING")]
    MissingPath,
    #[error("OP_PATH_INVALID: {0}")]
    InvalidPath(String),
    #[error("OP_PATH_TOO_DEEP")]
    PathTooDeep,
    #[error("OP_VALUE_MISSING")]
    MissingValue,
    #[error("OP_FROM_MISSING")]
    MissingFrom,
    #[error("OP_FROM_INVALID: {0}")]
    InvalidFrom(String),
    #[error("OP_TIER_INVALID: {0}")]
    InvalidTier(String),
    #[error("OP_FIELD_INVALID: {0}")]
    InvalidField(&'static str),
}

// ── Typed operations ───────────────────────────────────────────────────────

/// Validate a single typed operation.
///
/// Fails when the path is not rooted (non-empty and not starting with `/`),
/// when a kind that needs a `value` or `from` lacks it, or when `from` is not
/// a valid pointer.
pub fn validate_operation(op: &Operation) -> Result<(), ValidationError> {
    validate_pointer(&op.path)?;
    if op.op.requires_value() && op.value.is_none() {
        return Err(ValidationError::MissingValue);
    }
    if op.op.requires_from() {
        let from = op.from.as_deref().ok_or(ValidationError::MissingFrom)?;
        validate_pointer(from).map_err(|_| ValidationError::InvalidFrom(from.to_string()))?;
    }
    Ok(())
}

/// Validate a list of typed operations, reporting the first failing index.
pub fn validate_operations(ops: &[Operation]) -> Result<(), BatchError> {
    for (i, op) in ops.iter().enumerate() {
        validate_operation(op).map_err(|e| BatchError::new(i, e))?;
    }
    Ok(())
}

fn validate_pointer(pointer: &str) -> Result<(), ValidationError> {
    validate_json_pointer(pointer).map_err(|_| ValidationError::InvalidPath(pointer.to_string()))?;
    validate_path(&parse_json_pointer(pointer)).map_err(|_| ValidationError::PathTooDeep)
}

// ── Wire form ──────────────────────────────────────────────────────────────

/// Validate a single operation object in its wire form.
///
/// Beyond the typed checks this catches a missing or unrecognized `op`, a
/// missing `path`, and metadata fields of the wrong JSON type.
pub fn validate_raw_operation(op: &Value) -> Result<(), ValidationError> {
    let map = op.as_object().ok_or(ValidationError::NotAnObject)?;

    let op_name = map.get("op").ok_or(ValidationError::MissingOp)?;
    let kind = op_name
        .as_str()
        .and_then(OpKind::parse)
        .ok_or_else(|| ValidationError::UnknownOp(op_name.to_string()))?;

    let path = map.get("path").ok_or(ValidationError::MissingPath)?;
    let path_str = path
        .as_str()
        .ok_or_else(|| ValidationError::InvalidPath(path.to_string()))?;
    validate_pointer(path_str)?;

    if kind.requires_value() && !map.contains_key("value") {
        return Err(ValidationError::MissingValue);
    }
    if kind.requires_from() {
        let from = map.get("from").ok_or(ValidationError::MissingFrom)?;
        let from_str = from
            .as_str()
            .ok_or_else(|| ValidationError::InvalidFrom(from.to_string()))?;
        validate_pointer(from_str).map_err(|_| ValidationError::InvalidFrom(from_str.to_string()))?;
    }

    validate_meta(map)
}

const STRING_META_FIELDS: [&str; 5] = ["reason", "semanticId", "idShort", "modelType", "constraintRef"];

fn validate_meta(map: &Map<String, Value>) -> Result<(), ValidationError> {
    for field in STRING_META_FIELDS {
        if let Some(v) = map.get(field) {
            if !v.is_string() && !v.is_null() {
                return Err(ValidationError::InvalidField(field));
            }
        }
    }
    if let Some(v) = map.get("automated") {
        if !v.is_boolean() && !v.is_null() {
            return Err(ValidationError::InvalidField("automated"));
        }
    }
    if let Some(v) = map.get("approvalTier") {
        if !v.is_null() {
            decode_tier(v)?;
        }
    }
    Ok(())
}

/// Decode the wire `approvalTier` (integer 1..=4).
pub(crate) fn decode_tier(v: &Value) -> Result<RiskTier, ValidationError> {
    v.as_u64()
        .and_then(|n| u8::try_from(n).ok())
        .and_then(|n| RiskTier::try_from(n).ok())
        .ok_or_else(|| ValidationError::InvalidTier(v.to_string()))
}

/// Validate a list of operations in wire form.
///
/// Errors carry the index of the failing operation.
pub fn validate_raw_operations(ops: &Value) -> Result<(), BatchError> {
    let arr = ops
        .as_array()
        .ok_or_else(|| BatchError::new(0, ValidationError::NotAList))?;
    for (i, op) in arr.iter().enumerate() {
        validate_raw_operation(op).map_err(|e| BatchError::new(i, e))?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────
