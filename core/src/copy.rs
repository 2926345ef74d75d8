use serde_json::Value;

use crate::classify::primitive_text;

/// Text handed to the clipboard collaborator for a node.
///
/// Primitives copy as their plain string form; containers as pretty-printed
/// JSON in document key order. A subtree that cannot be serialized copies as
/// the empty string.
pub fn copy_text(value: &Value) -> String {
  if let Some(text) = primitive_text(value) {
    return text;
  }
  match serde_json::to_string_pretty(value) {
    Ok(s) => s,
    Err(e) => {
      tracing::warn!(error = %e, "failed to serialize subtree for copy");
      String::new()
    }
  }
}
