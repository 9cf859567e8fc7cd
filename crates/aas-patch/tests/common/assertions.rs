#![allow(dead_code)]

use aas_patch::{apply_many, Operation};
use serde_json::Value;

/// Apply `ops`, then apply the returned inverse, and check the document
/// comes back unchanged. Returns the forward result document.
pub fn assert_round_trip(doc: &Value, ops: &[Operation]) -> Value {
    let forward = apply_many(doc, ops).unwrap_or_else(|e| panic!("forward batch failed: {e}"));
    let back = apply_many(&forward.doc, &forward.inverse)
        .unwrap_or_else(|e| panic!("inverse batch failed: {e}\ninverse: {:?}", forward.inverse));
    assert_eq!(&back.doc, doc, "inverse did not restore the document");
    forward.doc
}
