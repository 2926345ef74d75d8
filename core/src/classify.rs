use serde_json::Value;

use crate::models::JsonNodeKind;

/// Kind and fan-out of a value. Every JSON value classifies into exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeClass {
  pub kind: JsonNodeKind,
  /// Array length or object key count; 0 for primitives.
  pub child_count: usize,
}

impl NodeClass {
  pub fn is_container(&self) -> bool {
    self.kind.is_container()
  }
}

pub fn classify(value: &Value) -> NodeClass {
  let (kind, child_count) = match value {
    Value::Null => (JsonNodeKind::Null, 0),
    Value::Bool(_) => (JsonNodeKind::Boolean, 0),
    Value::Number(_) => (JsonNodeKind::Number, 0),
    Value::String(_) => (JsonNodeKind::String, 0),
    Value::Array(items) => (JsonNodeKind::Array, items.len()),
    Value::Object(map) => (JsonNodeKind::Object, map.len()),
  };
  NodeClass { kind, child_count }
}

/// String form used for matching and copying primitives: strings as-is,
/// numbers and booleans in canonical form, `null` as `"null"`.
///
/// Containers have no primitive text and yield `None`.
pub fn primitive_text(value: &Value) -> Option<String> {
  match value {
    Value::Null => Some("null".to_string()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Number(n) => Some(n.to_string()),
    Value::String(s) => Some(s.clone()),
    Value::Array(_) | Value::Object(_) => None,
  }
}

/// Short one-line summary shown next to a node's name.
pub fn preview(value: &Value, max_chars: usize) -> String {
  match value {
    Value::Object(map) if map.is_empty() => "{} 0 keys".to_string(),
    Value::Object(map) => format!("{{…}} {} keys", map.len()),
    Value::Array(items) if items.is_empty() => "[] 0 items".to_string(),
    Value::Array(items) => format!("[…] {} items", items.len()),
    Value::String(s) => truncate_chars(s, max_chars),
    other => primitive_text(other).unwrap_or_default(),
  }
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
  if max == 0 {
    return String::new();
  }
  let mut out = String::new();
  for (i, ch) in s.chars().enumerate() {
    if i >= max {
      out.push('…');
      break;
    }
    out.push(ch);
  }
  out
}
