//! Logic behind the `aas-patch` binary.
//!
//! Each command takes JSON strings and returns a pretty-printed JSON string,
//! so the binary only has to deal with argv, stdin and exit codes.
//!
//! - `apply`: apply a batch to a document, print the result and its inverse
//! - `invert`: compute the inverse of a batch without keeping the result
//! - `classify`: print the risk tier of a batch
//! - `validate`: check a batch's shape

use serde_json::{json, Value};
use thiserror::Error;

use crate::apply::apply_many;
use crate::classify::Classifier;
use crate::codec::json::{from_json_patch, to_json_patch};
use crate::config::ConfigError;
use crate::invert::invert_many;
use crate::types::{BatchError, Operation};

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Patch(#[from] BatchError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Usage(String),
}

/// A command the binary understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Apply,
    Invert,
    Classify,
    Validate,
}

impl Command {
    pub fn parse(name: &str) -> Result<Self, CliError> {
        match name {
            "apply" => Ok(Command::Apply),
            "invert" => Ok(Command::Invert),
            "classify" => Ok(Command::Classify),
            "validate" => Ok(Command::Validate),
            other => Err(CliError::Usage(format!("Unknown command: {other}"))),
        }
    }

    /// `apply` and `invert` read the document from stdin.
    pub fn needs_document(&self) -> bool {
        matches!(self, Command::Apply | Command::Invert)
    }
}

fn parse_patch(patch_json: &str) -> Result<Vec<Operation>, CliError> {
    let raw: Value = serde_json::from_str(patch_json)?;
    Ok(from_json_patch(&raw)?)
}

// ── Commands ──────────────────────────────────────────────────────────────

/// Apply a batch. Prints `{doc, inverse, tier}`.
pub fn apply_json_patch(doc_json: &str, patch_json: &str, classifier: &Classifier) -> Result<String, CliError> {
    let doc: Value = serde_json::from_str(doc_json)?;
    let ops = parse_patch(patch_json)?;
    let tier = classifier.classify_batch_max(&ops);
    let result = apply_many(&doc, &ops)?;
    let out = json!({
        "doc": result.doc,
        "inverse": to_json_patch(&result.inverse),
        "tier": tier,
    });
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Invert a batch against a document. Prints `{inverse, complete}`, plus
/// `stoppedAt` when inversion stopped early.
pub fn invert_json_patch(doc_json: &str, patch_json: &str) -> Result<String, CliError> {
    let doc: Value = serde_json::from_str(doc_json)?;
    let ops = parse_patch(patch_json)?;
    let batch = invert_many(&doc, &ops);
    let mut out = json!({
        "inverse": to_json_patch(&batch.ops),
        "complete": batch.is_complete(),
    });
    if let Some(i) = batch.stopped_at {
        out["stoppedAt"] = json!(i);
    }
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Classify a batch. Prints `{tier, label, ops}` where `ops` lists the tier
/// of each operation.
pub fn classify_json_patch(patch_json: &str, classifier: &Classifier) -> Result<String, CliError> {
    let ops = parse_patch(patch_json)?;
    let per_op: Vec<_> = ops.iter().map(|op| classifier.classify(op)).collect();
    let tier = classifier.classify_batch_max(&ops);
    let out = json!({
        "tier": tier,
        "label": tier.label(),
        "confirm": tier.requires_confirmation(),
        "ops": per_op,
    });
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Validate a batch's shape. Prints `{valid, count}`.
pub fn validate_json_patch(patch_json: &str) -> Result<String, CliError> {
    let ops = parse_patch(patch_json)?;
    Ok(serde_json::to_string_pretty(&json!({"valid": true, "count": ops.len()}))?)
}

/// Dispatch a parsed command. `doc_json` is ignored by commands that do not
/// need a document.
pub fn run(command: Command, patch_json: &str, doc_json: &str, classifier: &Classifier) -> Result<String, CliError> {
    match command {
        Command::Apply => apply_json_patch(doc_json, patch_json, classifier),
        Command::Invert => invert_json_patch(doc_json, patch_json),
        Command::Classify => classify_json_patch(patch_json, classifier),
        Command::Validate => validate_json_patch(patch_json),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn apply_prints_doc_inverse_and_tier() {
        let out = apply_json_patch(
            r#"{"items":[{"id":"a"}]}"#,
            r#"[{"op":"add","path":"/items/-","value":{"id":"b"}}]"#,
            &Classifier::default(),
        )
        .unwrap();
        let v = parse(&out);
        assert_eq!(v["doc"], json!({"items": [{"id": "a"}, {"id": "b"}]}));
        assert_eq!(v["inverse"][0]["op"], "remove");
        assert_eq!(v["inverse"][0]["path"], "/items/1");
        assert_eq!(v["tier"], 2);
    }

    #[test]
    fn apply_reports_failing_index() {
        let err = apply_json_patch(
            r#"{"a":1}"#,
            r#"[{"op":"remove","path":"/a"},{"op":"replace","path":"/a","value":2}]"#,
            &Classifier::default(),
        )
        .unwrap_err();
        match err {
            CliError::Patch(e) => assert_eq!(e.failed_at, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invert_marks_incomplete_batches() {
        let out = invert_json_patch(
            r#"{"a":1}"#,
            r#"[{"op":"replace","path":"/a","value":2},{"op":"remove","path":"/b"}]"#,
        )
        .unwrap();
        let v = parse(&out);
        assert_eq!(v["complete"], false);
        assert_eq!(v["stoppedAt"], 1);
        assert_eq!(v["inverse"][0]["value"], 1);
    }

    #[test]
    fn classify_lists_each_op() {
        let out = classify_json_patch(
            r#"[{"op":"replace","path":"/submodels/0/description/0/text","value":"x"},{"op":"remove","path":"/submodels/0/id"}]"#,
            &Classifier::default(),
        )
        .unwrap();
        let v = parse(&out);
        assert_eq!(v["ops"], json!([1, 4]));
        assert_eq!(v["label"], "CRITICAL");
        assert_eq!(v["confirm"], true);
    }

    #[test]
    fn validate_and_usage_errors() {
        let out = validate_json_patch(r#"[{"op":"test","path":"/a","value":null}]"#).unwrap();
        assert_eq!(parse(&out), json!({"valid": true, "count": 1}));
        assert!(matches!(validate_json_patch("[{"), Err(CliError::Json(_))));
        assert!(matches!(Command::parse("diff"), Err(CliError::Usage(_))));
        assert!(Command::parse("apply").unwrap().needs_document());
        assert!(!Command::parse("classify").unwrap().needs_document());
    }
}
