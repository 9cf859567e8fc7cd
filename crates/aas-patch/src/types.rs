//! Core types for the patch engine.
//!
//! The operation model, the error taxonomy and the result values returned by
//! the apply engine.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

pub use aas_patch_pointer::Path;
use aas_patch_pointer::parse_json_pointer;

use crate::classify::RiskTier;
use crate::validate::ValidationError;

// ── Errors ────────────────────────────────────────────────────────────────

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The operation is malformed; nothing was attempted.
    Structural,
    /// The addressed path does not resolve, or resolves to the wrong kind of node.
    Target,
    /// A `test` operation found a different value.
    TestFailure,
    /// A batch failed after earlier operations had already changed the working copy.
    BatchPartial,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("INVALID_OP: {0}")]
    InvalidOp(#[from] ValidationError),
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("INVALID_INDEX: {0}")]
    InvalidIndex(String),
    #[error("INVALID_TARGET: {0}")]
    InvalidTarget(String),
    #[error("MOVE_INTO_SELF: cannot move {from} into {path}")]
    MoveIntoSelf { from: String, path: String },
    #[error("TEST: value at {0} does not match")]
    Test(String),
}

impl PatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PatchError::InvalidOp(_) => ErrorKind::Structural,
            PatchError::Test(_) => ErrorKind::TestFailure,
            PatchError::NotFound(_)
            | PatchError::InvalidIndex(_)
            | PatchError::InvalidTarget(_)
            | PatchError::MoveIntoSelf { .. } => ErrorKind::Target,
        }
    }
}

/// Failure of a batch: which operation failed and why.
///
/// `mutated` is `true` when operations before `failed_at` had already changed
/// the working copy. The caller's document is untouched either way.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Error in operation [index = {failed_at}] ({error}).")]
pub struct BatchError {
    pub failed_at: usize,
    pub error: PatchError,
    pub mutated: bool,
}

impl BatchError {
    pub fn new(failed_at: usize, error: impl Into<PatchError>) -> Self {
        Self {
            failed_at,
            error: error.into(),
            mutated: false,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        if self.mutated {
            ErrorKind::BatchPartial
        } else {
            self.error.kind()
        }
    }
}

// ── Operation kind ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl OpKind {
    pub const ALL: [OpKind; 6] = [
        OpKind::Add,
        OpKind::Remove,
        OpKind::Replace,
        OpKind::Move,
        OpKind::Copy,
        OpKind::Test,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Remove => "remove",
            OpKind::Replace => "replace",
            OpKind::Move => "move",
            OpKind::Copy => "copy",
            OpKind::Test => "test",
        }
    }

    /// Parse the wire name of an operation. Returns `None` for anything unknown.
    pub fn parse(name: &str) -> Option<Self> {
        OpKind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// `add`, `replace` and `test` carry a `value`.
    pub fn requires_value(&self) -> bool {
        matches!(self, OpKind::Add | OpKind::Replace | OpKind::Test)
    }

    /// `move` and `copy` carry a `from` pointer.
    pub fn requires_from(&self) -> bool {
        matches!(self, OpKind::Move | OpKind::Copy)
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Operation ─────────────────────────────────────────────────────────────

/// Audit and UX metadata carried by an operation.
///
/// None of these fields affect how an operation is applied. The classifier
/// reads `approval_tier`; everything else is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationMeta {
    /// Semantic identifier of the affected element.
    pub semantic_id: Option<String>,
    /// Short name of the affected element.
    pub id_short: Option<String>,
    /// Model-type tag of the affected element (e.g. `Property`).
    pub model_type: Option<String>,
    pub reason: Option<String>,
    /// The operation was produced by a tool rather than typed by a person.
    pub automated: bool,
    /// Manual classification; overrides the classifier when set.
    pub approval_tier: Option<RiskTier>,
    /// Link to the external constraint that motivated the change.
    pub constraint_ref: Option<String>,
}

/// A single patch operation in its wire shape.
///
/// `path` and `from` are JSON Pointer strings. `value` is `Some` only for
/// kinds that carry one; a JSON `null` payload is `Some(Value::Null)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub op: OpKind,
    pub path: String,
    pub value: Option<Value>,
    pub from: Option<String>,
    pub meta: OperationMeta,
}

impl Operation {
    pub fn new(op: OpKind, path: impl Into<String>) -> Self {
        Self {
            op,
            path: path.into(),
            value: None,
            from: None,
            meta: OperationMeta::default(),
        }
    }

    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self::new(OpKind::Add, path).with_value(value)
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self::new(OpKind::Remove, path)
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self::new(OpKind::Replace, path).with_value(value)
    }

    /// Move the value at `from` to `path`.
    pub fn move_op(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(OpKind::Move, path).with_from(from)
    }

    /// Copy the value at `from` to `path`.
    pub fn copy(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(OpKind::Copy, path).with_from(from)
    }

    pub fn test(path: impl Into<String>, value: Value) -> Self {
        Self::new(OpKind::Test, path).with_value(value)
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.meta.reason = Some(reason.into());
        self
    }

    pub fn with_tier(mut self, tier: RiskTier) -> Self {
        self.meta.approval_tier = Some(tier);
        self
    }

    pub fn with_meta(mut self, meta: OperationMeta) -> Self {
        self.meta = meta;
        self
    }

    /// The target pointer parsed into path steps.
    pub fn path_steps(&self) -> Path {
        parse_json_pointer(&self.path)
    }

    /// The source pointer parsed into path steps, for `move` and `copy`.
    pub fn from_steps(&self) -> Option<Path> {
        self.from.as_deref().map(parse_json_pointer)
    }

    /// Short human-readable label, e.g. `move /a/0 -> /b/-`.
    pub fn describe(&self) -> String {
        match &self.from {
            Some(from) => format!("{} {} -> {}", self.op, from, self.path),
            None => format!("{} {}", self.op, self.path),
        }
    }
}

// ── Result types ──────────────────────────────────────────────────────────

/// Result of applying a single operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OpResult {
    /// The document after applying the operation.
    pub doc: Value,
    /// Operation that restores the previous document; `None` for `test`.
    pub inverse: Option<Operation>,
}

/// Result of applying a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchResult {
    pub doc: Value,
    /// Inverse operations in undo order: applying them front to back
    /// restores the document the batch started from.
    pub inverse: Vec<Operation>,
}
