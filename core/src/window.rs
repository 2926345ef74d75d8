use std::collections::HashMap;

use serde_json::Value;

use crate::{
  classify::classify,
  models::{JsonPathSegment, LoadMoreResult},
  path::JsonPath,
};

/// How many items of each windowed array are currently exposed.
///
/// Counts only grow (by whole pages, saturating at the array length) until
/// the state is cleared on document reload or a large-document flag change.
#[derive(Debug, Clone, Default)]
pub struct WindowState {
  visible: HashMap<JsonPath, usize>,
}

impl WindowState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, path: &JsonPath) -> Option<usize> {
    self.visible.get(path).copied()
  }

  pub fn len(&self) -> usize {
    self.visible.len()
  }

  pub fn is_empty(&self) -> bool {
    self.visible.is_empty()
  }

  pub fn clear(&mut self) {
    self.visible.clear();
  }
}

/// Bounds the children exposed for a container.
///
/// Objects always expose every key. Arrays are windowed only for large
/// documents, starting at one page and growing a page per `load_more`.
#[derive(Debug, Clone, Copy)]
pub struct WindowController {
  page_size: usize,
}

impl WindowController {
  pub fn new(page_size: usize) -> Self {
    Self {
      page_size: page_size.max(1),
    }
  }

  pub fn page_size(&self) -> usize {
    self.page_size
  }

  pub fn is_windowed(&self, container: &Value, large_document: bool) -> bool {
    large_document && container.is_array()
  }

  pub fn visible_count(
    &self,
    path: &JsonPath,
    container: &Value,
    large_document: bool,
    state: &WindowState,
  ) -> usize {
    match container {
      Value::Object(map) => map.len(),
      Value::Array(items) if large_document => state
        .get(path)
        .unwrap_or(self.page_size)
        .min(items.len()),
      Value::Array(items) => items.len(),
      _ => 0,
    }
  }

  pub fn remaining(
    &self,
    path: &JsonPath,
    container: &Value,
    large_document: bool,
    state: &WindowState,
  ) -> usize {
    let total = classify(container).child_count;
    total - self.visible_count(path, container, large_document, state)
  }

  pub fn can_load_more(
    &self,
    path: &JsonPath,
    container: &Value,
    large_document: bool,
    state: &WindowState,
  ) -> bool {
    self.remaining(path, container, large_document, state) > 0
  }

  /// Ordered `(segment, child)` pairs currently exposed under `container`.
  pub fn visible_children<'a>(
    &self,
    path: &JsonPath,
    container: &'a Value,
    large_document: bool,
    state: &WindowState,
  ) -> Vec<(JsonPathSegment, &'a Value)> {
    let n = self.visible_count(path, container, large_document, state);
    match container {
      Value::Object(map) => map
        .iter()
        .map(|(k, v)| (JsonPathSegment::Key(k.clone()), v))
        .collect(),
      Value::Array(items) => items
        .iter()
        .take(n)
        .enumerate()
        .map(|(i, v)| (JsonPathSegment::Index(i), v))
        .collect(),
      _ => Vec::new(),
    }
  }

  /// Grow the window at `path` by one page. A no-op for anything that is not
  /// a windowed array, and once every item is visible.
  pub fn load_more(
    &self,
    path: &JsonPath,
    container: &Value,
    large_document: bool,
    state: &mut WindowState,
  ) -> LoadMoreResult {
    let total = classify(container).child_count;
    let mut visible = self.visible_count(path, container, large_document, state);
    if self.is_windowed(container, large_document) && visible < total {
      visible = visible.saturating_add(self.page_size).min(total);
      state.visible.insert(path.clone(), visible);
      tracing::debug!(path = %path, visible, total, "window grown");
    }
    LoadMoreResult {
      visible,
      total,
      remaining: total - visible,
    }
  }
}
