//! Reversible, risk-tiered JSON Patch engine for asset administration shell
//! documents.
//!
//! Operations follow RFC 6902 (`add`, `remove`, `replace`, `move`, `copy`,
//! `test`) and carry optional audit metadata. Every successful apply returns
//! the operations that undo it, computed from the document before it was
//! changed. Batches are atomic: either every operation applies or the
//! caller's document is left as it was.
//!
//! ```
//! use aas_patch::{apply_many, classify_batch_max, Operation, RiskTier};
//! use serde_json::json;
//!
//! let doc = json!({"items": [{"id": "a"}]});
//! let ops = vec![Operation::add("/items/-", json!({"id": "b"}))];
//! assert_eq!(classify_batch_max(&ops), RiskTier::Medium);
//!
//! let result = apply_many(&doc, &ops).unwrap();
//! assert_eq!(result.inverse[0].path, "/items/1");
//!
//! let undone = apply_many(&result.doc, &result.inverse).unwrap();
//! assert_eq!(undone.doc, doc);
//! ```

pub mod apply;
pub mod classify;
pub mod cli;
pub mod codec;
pub mod config;
pub mod history;
pub mod invert;
pub mod types;
pub mod validate;

pub use apply::{apply_many, apply_one, apply_op};
pub use classify::{classify, classify_batch_max, ClassificationRules, Classifier, RiskTier};
pub use codec::json::{from_json, from_json_patch, to_json, to_json_patch};
pub use config::{load_rules, rules_from_env, ConfigError, RulesConfig};
pub use history::{EditSession, History, RedoPolicy, SessionError, UndoEntry};
pub use invert::{invert, invert_many, InverseBatch};
pub use types::{BatchError, ErrorKind, OpKind, OpResult, Operation, OperationMeta, PatchError, PatchResult};
pub use validate::{
    validate_operation, validate_operations, validate_raw_operation, validate_raw_operations, ValidationError,
};
