//! Type definitions for JSON Pointer.

/// A step in a JSON Pointer path.
///
/// Object keys and array indices are both carried as strings; an index is
/// only interpreted as a number once the containing node is known to be an
/// array.
pub type PathStep = String;

/// A JSON Pointer path. The empty path addresses the document root.
pub type Path = Vec<PathStep>;

/// Trailing path step meaning "one past the end of the addressed array".
pub const APPEND_MARKER: &str = "-";
