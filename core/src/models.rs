use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::JsonPath;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
  Json,
  Jsonl,
  Unknown,
}

/// A JSON path segment used by the UI to refer to a subtree.
///
/// This is intentionally "untagged" so the IPC payload can be a simple
/// array like `["foo", 0, "bar"]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum JsonPathSegment {
  Key(String),
  Index(usize),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JsonNodeKind {
  Null,
  Boolean,
  Number,
  String,
  Array,
  Object,
}

impl JsonNodeKind {
  pub fn is_container(self) -> bool {
    matches!(self, JsonNodeKind::Array | JsonNodeKind::Object)
  }
}

/// A JSONL line that failed to parse and was skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineError {
  /// 1-based line number in the source.
  pub line_no: u64,
  pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
  pub session_id: String,
  /// File path, or a caller-supplied label for in-memory text.
  pub source: String,
  pub format: FileFormat,
  pub source_bytes: u64,
  pub large_document: bool,
  pub skipped_lines: usize,
  pub line_errors: Vec<LineError>,
  pub created_at_ms: i64,
}

/// One direct child exposed by an expanded container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildEntry {
  /// Object key, or the array index rendered as a string.
  pub name: String,
  pub path: JsonPath,
  pub kind: JsonNodeKind,
  pub child_count: usize,
}

/// Derived, never-persisted projection of one node for the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeView {
  pub path: JsonPath,
  pub name: String,
  pub depth: usize,
  pub kind: JsonNodeKind,
  pub child_count: usize,
  pub is_expanded: bool,
  pub matches_search: bool,
  pub visible_children: Vec<ChildEntry>,
  /// Children not yet exposed by the array window (0 when fully loaded).
  pub remaining: usize,
  /// A search match lies under a child the window does not expose yet.
  pub match_beyond_window: bool,
  pub preview: String,
  /// The raw value for primitives (display/copy); `None` for containers.
  pub primitive: Option<Value>,
}

impl NodeView {
  pub fn can_load_more(&self) -> bool {
    self.remaining > 0
  }
}

/// One line of the flattened visible tree, in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeRow {
  pub path: JsonPath,
  pub name: String,
  pub depth: usize,
  pub kind: JsonNodeKind,
  pub child_count: usize,
  pub is_expanded: bool,
  pub matches_search: bool,
  pub preview: String,
  /// For an expanded, windowed array: how many items are still hidden.
  pub remaining: usize,
  /// A search match lies under one of the hidden items.
  pub match_beyond_window: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadMoreResult {
  pub visible: usize,
  pub total: usize,
  pub remaining: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchMatchKind {
  Key,
  Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchMatch {
  pub kind: SearchMatchKind,
  pub path: JsonPath,
  /// Same text as `path.to_string()`, kept for hosts that only render strings.
  pub display_path: String,
  pub matched_key: Option<String>,
  pub matched_value: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchOutcome {
  pub query: String,
  pub matches: Vec<SearchMatch>,
  /// The result cap was hit; more matches may exist past the last one.
  pub limit_reached: bool,
  /// The depth or breadth cap skipped part of the document.
  pub pruned: bool,
}

/// Byte range `[start, end)` of one query occurrence inside a string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchSpan {
  pub start: usize,
  pub end: usize,
}
