use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::path::JsonPath;

/// Default open/closed state by depth.
///
/// Nodes shallower than the depth limit start expanded. Large documents use a
/// smaller limit so the first render stays bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionPolicy {
  pub small_expand_depth: usize,
  pub large_expand_depth: usize,
}

impl Default for ExpansionPolicy {
  fn default() -> Self {
    Self {
      small_expand_depth: 2,
      large_expand_depth: 1,
    }
  }
}

impl ExpansionPolicy {
  pub fn default_expanded(&self, depth: usize, large_document: bool) -> bool {
    let limit = if large_document {
      self.large_expand_depth
    } else {
      self.small_expand_depth
    };
    depth < limit
  }
}

/// Per-path expansion flags.
///
/// An entry is created from the policy the first time a node is observed and
/// changes only through an explicit toggle. Forced expansion from search is
/// never written here, so clearing a search falls back to these values.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
  entries: HashMap<JsonPath, bool>,
}

impl ExpansionState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, path: &JsonPath) -> Option<bool> {
    self.entries.get(path).copied()
  }

  /// Stored flag for `path`, populating it from `policy` on first observation.
  pub fn observe(
    &mut self,
    path: &JsonPath,
    policy: &ExpansionPolicy,
    large_document: bool,
  ) -> bool {
    if let Some(expanded) = self.entries.get(path) {
      return *expanded;
    }
    let expanded = policy.default_expanded(path.len(), large_document);
    self.entries.insert(path.clone(), expanded);
    expanded
  }

  pub fn set(&mut self, path: JsonPath, expanded: bool) {
    self.entries.insert(path, expanded);
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }
}
