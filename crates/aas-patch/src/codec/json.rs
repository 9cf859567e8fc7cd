//! JSON codec for patch operations.
//!
//! The wire shape is RFC 6902 with the metadata flattened into the operation
//! object under camelCase keys:
//!
//! ```json
//! {"op": "replace", "path": "/submodels/0/idShort", "value": "Nameplate",
//!  "reason": "rename", "approvalTier": 2}
//! ```
//!
//! Unknown keys are ignored.

use serde_json::{Map, Value};

use crate::types::{BatchError, OpKind, Operation, OperationMeta};
use crate::validate::{decode_tier, validate_raw_operation, ValidationError};

// ── Field helpers ─────────────────────────────────────────────────────────

fn opt_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn put_string(map: &mut Map<String, Value>, key: &str, v: &Option<String>) {
    if let Some(s) = v {
        map.insert(key.to_string(), Value::String(s.clone()));
    }
}

fn decode_meta(map: &Map<String, Value>) -> Result<OperationMeta, ValidationError> {
    let approval_tier = match map.get("approvalTier") {
        None | Some(Value::Null) => None,
        Some(v) => Some(decode_tier(v)?),
    };
    Ok(OperationMeta {
        semantic_id: opt_string(map, "semanticId"),
        id_short: opt_string(map, "idShort"),
        model_type: opt_string(map, "modelType"),
        reason: opt_string(map, "reason"),
        automated: map.get("automated").and_then(Value::as_bool).unwrap_or(false),
        approval_tier,
        constraint_ref: opt_string(map, "constraintRef"),
    })
}

fn encode_meta(map: &mut Map<String, Value>, meta: &OperationMeta) {
    put_string(map, "semanticId", &meta.semantic_id);
    put_string(map, "idShort", &meta.id_short);
    put_string(map, "modelType", &meta.model_type);
    put_string(map, "reason", &meta.reason);
    if meta.automated {
        map.insert("automated".to_string(), Value::Bool(true));
    }
    if let Some(tier) = meta.approval_tier {
        map.insert("approvalTier".to_string(), Value::from(u8::from(tier)));
    }
    put_string(map, "constraintRef", &meta.constraint_ref);
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize an operation to its wire form.
pub fn to_json(op: &Operation) -> Value {
    let mut map = Map::new();
    map.insert("op".to_string(), Value::String(op.op.as_str().to_string()));
    map.insert("path".to_string(), Value::String(op.path.clone()));
    if let Some(from) = &op.from {
        map.insert("from".to_string(), Value::String(from.clone()));
    }
    if let Some(value) = &op.value {
        map.insert("value".to_string(), value.clone());
    }
    encode_meta(&mut map, &op.meta);
    Value::Object(map)
}

/// Serialize a list of operations to a JSON array.
pub fn to_json_patch(ops: &[Operation]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Decode one operation, rejecting anything
/// [`validate_raw_operation`] rejects.
///
/// `value` and `from` are kept only for the kinds that carry them.
pub fn from_json(v: &Value) -> Result<Operation, ValidationError> {
    validate_raw_operation(v)?;
    let map = v.as_object().ok_or(ValidationError::NotAnObject)?;
    let kind = map
        .get("op")
        .and_then(Value::as_str)
        .and_then(OpKind::parse)
        .ok_or(ValidationError::MissingOp)?;
    let path = map
        .get("path")
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingPath)?;

    let mut op = Operation::new(kind, path).with_meta(decode_meta(map)?);
    if kind.requires_value() {
        op.value = map.get("value").cloned();
    }
    if kind.requires_from() {
        op.from = opt_string(map, "from");
    }
    Ok(op)
}

/// Decode a JSON array of operations. The error names the first entry that
/// failed to decode.
pub fn from_json_patch(v: &Value) -> Result<Vec<Operation>, BatchError> {
    let arr = v
        .as_array()
        .ok_or_else(|| BatchError::new(0, ValidationError::NotAList))?;
    arr.iter()
        .enumerate()
        .map(|(i, op)| from_json(op).map_err(|e| BatchError::new(i, e)))
        .collect()
}
