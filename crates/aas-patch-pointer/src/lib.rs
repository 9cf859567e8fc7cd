//! JSON Pointer (RFC 6901) utilities.
//!
//! Pointers address nodes inside an asset-model document. This crate turns
//! pointer strings into [`Path`]s and back, tells whether one path lies inside
//! another and resolves paths against `serde_json` documents.
//!
//! # Example
//!
//! ```
//! use aas_patch_pointer::{parse_json_pointer, format_json_pointer, get};
//!
//! let path = parse_json_pointer("/submodels/0/idShort");
//! assert_eq!(path, vec!["submodels", "0", "idShort"]);
//! assert_eq!(format_json_pointer(&path), "/submodels/0/idShort");
//!
//! let doc = serde_json::json!({"submodels": [{"idShort": "Nameplate"}]});
//! assert_eq!(get(&doc, &path), Some(&serde_json::json!("Nameplate")));
//! ```

pub mod get;
pub mod types;
pub mod util;
pub mod validate;

pub use get::{get, get_mut};
pub use types::{Path, PathStep, APPEND_MARKER};
pub use util::{
    escape_component, format_json_pointer, is_child, is_valid_index, parse_index, parse_json_pointer,
    unescape_component,
};
pub use validate::{validate_json_pointer, validate_path, ValidationError};
