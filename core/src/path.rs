use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::JsonPathSegment;

/// Structural address of a node, from the document root.
///
/// Expansion and window state are keyed by this value, so two paths are the
/// same node iff their segments are pairwise equal. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonPath(Vec<JsonPathSegment>);

impl JsonPath {
  pub fn root() -> Self {
    Self(Vec::new())
  }

  pub fn is_root(&self) -> bool {
    self.0.is_empty()
  }

  /// Number of segments; equals the node's depth in the tree.
  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn segments(&self) -> &[JsonPathSegment] {
    &self.0
  }

  pub fn last(&self) -> Option<&JsonPathSegment> {
    self.0.last()
  }

  pub fn push(&mut self, segment: JsonPathSegment) {
    self.0.push(segment);
  }

  pub fn pop(&mut self) -> Option<JsonPathSegment> {
    self.0.pop()
  }

  pub fn child(&self, segment: JsonPathSegment) -> Self {
    let mut segments = Vec::with_capacity(self.0.len() + 1);
    segments.extend_from_slice(&self.0);
    segments.push(segment);
    Self(segments)
  }

  pub fn child_key(&self, key: &str) -> Self {
    self.child(JsonPathSegment::Key(key.to_string()))
  }

  pub fn child_index(&self, index: usize) -> Self {
    self.child(JsonPathSegment::Index(index))
  }

  pub fn parent(&self) -> Option<Self> {
    if self.0.is_empty() {
      return None;
    }
    Some(Self(self.0[..self.0.len() - 1].to_vec()))
  }

  /// True if `self` equals `other` or lies on the route from the root to `other`.
  pub fn is_ancestor_or_self_of(&self, other: &JsonPath) -> bool {
    other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
  }

  /// Every prefix of this path, root first, ending with the path itself.
  pub fn ancestors_or_self(&self) -> impl Iterator<Item = JsonPath> + '_ {
    (0..=self.0.len()).map(move |n| JsonPath(self.0[..n].to_vec()))
  }

  /// Walk `root` along this path. Keys only address objects and indices only
  /// address arrays.
  pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
    let mut cur = root;
    for segment in &self.0 {
      cur = match (segment, cur) {
        (JsonPathSegment::Key(k), Value::Object(map)) => map.get(k)?,
        (JsonPathSegment::Index(i), Value::Array(items)) => items.get(*i)?,
        _ => return None,
      };
    }
    Some(cur)
  }

  /// RFC 6901 form, e.g. `/a~1b/0`. The root is the empty string.
  pub fn to_json_pointer(&self) -> String {
    let mut out = String::new();
    for segment in &self.0 {
      out.push('/');
      match segment {
        JsonPathSegment::Key(k) => out.push_str(&k.replace('~', "~0").replace('/', "~1")),
        JsonPathSegment::Index(i) => out.push_str(&i.to_string()),
      }
    }
    out
  }
}

impl From<Vec<JsonPathSegment>> for JsonPath {
  fn from(segments: Vec<JsonPathSegment>) -> Self {
    Self(segments)
  }
}

impl FromIterator<JsonPathSegment> for JsonPath {
  fn from_iter<I: IntoIterator<Item = JsonPathSegment>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

/// Display form: keys joined with `.`, indices as `[i]`, e.g. `a.c[2].name`.
impl fmt::Display for JsonPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, segment) in self.0.iter().enumerate() {
      match segment {
        JsonPathSegment::Key(k) if i == 0 => write!(f, "{k}")?,
        JsonPathSegment::Key(k) => write!(f, ".{k}")?,
        JsonPathSegment::Index(idx) => write!(f, "[{idx}]")?,
      }
    }
    Ok(())
  }
}
