use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  classify::primitive_text,
  models::{JsonPathSegment, SearchMatch, SearchMatchKind, SearchOutcome},
  path::JsonPath,
  search_match::PreparedQuery,
};

/// Caps enforced while traversing, so a search always does bounded work no
/// matter how deep or wide the document is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
  /// Containers at this depth are not descended into (root is depth 0).
  pub max_depth: usize,
  /// Only the first N entries of each container are inspected.
  pub max_children_per_node: usize,
  pub max_results: usize,
}

impl Default for SearchLimits {
  fn default() -> Self {
    Self {
      max_depth: 50,
      max_children_per_node: 1000,
      max_results: 1000,
    }
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchEngine {
  limits: SearchLimits,
}

impl SearchEngine {
  pub fn new(limits: SearchLimits) -> Self {
    Self { limits }
  }

  pub fn limits(&self) -> SearchLimits {
    self.limits
  }

  /// Pre-order, depth-first search over keys and primitive values.
  ///
  /// Object entries are visited in document order and array items by index.
  /// For each object entry the key is tested before its value, so a result
  /// list is always a prefix of the uncapped match sequence.
  pub fn search(&self, document: Option<&Value>, query: &str) -> SearchOutcome {
    let mut outcome = SearchOutcome {
      query: query.to_string(),
      ..SearchOutcome::default()
    };
    let (Some(document), Some(prepared)) = (document, PreparedQuery::new(query)) else {
      return outcome;
    };

    let started = Instant::now();
    let mut walk = Walk {
      query: &prepared,
      limits: self.limits,
      path: JsonPath::root(),
      matches: Vec::new(),
      limit_reached: false,
      pruned: false,
    };
    walk.visit(document, 0);

    tracing::debug!(
      query = prepared.raw(),
      matches = walk.matches.len(),
      limit_reached = walk.limit_reached,
      pruned = walk.pruned,
      elapsed_ms = started.elapsed().as_millis() as u64,
      "search finished"
    );

    outcome.matches = walk.matches;
    outcome.limit_reached = walk.limit_reached;
    outcome.pruned = walk.pruned;
    outcome
  }
}

struct Walk<'q> {
  query: &'q PreparedQuery,
  limits: SearchLimits,
  path: JsonPath,
  matches: Vec<SearchMatch>,
  limit_reached: bool,
  pruned: bool,
}

impl Walk<'_> {
  fn visit(&mut self, value: &Value, depth: usize) {
    if self.limit_reached {
      return;
    }
    match value {
      Value::Object(map) => {
        if !self.may_descend(depth, map.len()) {
          return;
        }
        for (key, child) in map.iter().take(self.limits.max_children_per_node) {
          if self.limit_reached {
            return;
          }
          self.path.push(JsonPathSegment::Key(key.clone()));
          if self.query.matches(key) {
            self.record(SearchMatchKind::Key, Some(key.clone()), None);
          }
          self.visit(child, depth + 1);
          self.path.pop();
        }
      }
      Value::Array(items) => {
        if !self.may_descend(depth, items.len()) {
          return;
        }
        for (idx, child) in items.iter().take(self.limits.max_children_per_node).enumerate() {
          if self.limit_reached {
            return;
          }
          self.path.push(JsonPathSegment::Index(idx));
          self.visit(child, depth + 1);
          self.path.pop();
        }
      }
      primitive => {
        // A value without a text form contributes no match.
        let Some(text) = primitive_text(primitive) else {
          return;
        };
        if self.query.matches(&text) {
          self.record(SearchMatchKind::Value, None, Some(primitive.clone()));
        }
      }
    }
  }

  fn may_descend(&mut self, depth: usize, child_count: usize) -> bool {
    if child_count == 0 {
      return false;
    }
    if depth >= self.limits.max_depth {
      self.pruned = true;
      return false;
    }
    if child_count > self.limits.max_children_per_node {
      self.pruned = true;
    }
    true
  }

  fn record(
    &mut self,
    kind: SearchMatchKind,
    matched_key: Option<String>,
    matched_value: Option<Value>,
  ) {
    if self.matches.len() >= self.limits.max_results {
      self.limit_reached = true;
      return;
    }
    self.matches.push(SearchMatch {
      kind,
      path: self.path.clone(),
      display_path: self.path.to_string(),
      matched_key,
      matched_value,
    });
    if self.matches.len() >= self.limits.max_results {
      self.limit_reached = true;
    }
  }
}
