use std::{
  collections::{HashMap, HashSet},
  sync::Arc,
};

use serde_json::Value;

use crate::{
  classify::{classify, preview},
  copy::copy_text,
  engine::CoreError,
  expansion::{ExpansionPolicy, ExpansionState},
  models::{
    ChildEntry, JsonPathSegment, LoadMoreResult, NodeView, SearchOutcome, TreeRow,
  },
  path::JsonPath,
  window::{WindowController, WindowState},
};

#[derive(Debug, Clone, Copy)]
pub struct TreeSettings {
  pub expansion: ExpansionPolicy,
  pub array_page_size: usize,
  pub preview_max_chars: usize,
}

impl Default for TreeSettings {
  fn default() -> Self {
    Self {
      expansion: ExpansionPolicy::default(),
      array_page_size: 100,
      preview_max_chars: 120,
    }
  }
}

#[derive(Debug, Clone)]
struct ActiveSearch {
  outcome: SearchOutcome,
  /// Every path that equals, or is an ancestor of, some match path.
  on_route: HashSet<JsonPath>,
  /// Array path -> largest child index that lies on a route.
  furthest_index: HashMap<JsonPath, usize>,
  /// Forced nodes the user collapsed while this search was active.
  collapsed: HashSet<JsonPath>,
}

impl ActiveSearch {
  fn new(outcome: SearchOutcome) -> Self {
    let mut on_route = HashSet::new();
    let mut furthest_index: HashMap<JsonPath, usize> = HashMap::new();
    for m in &outcome.matches {
      for prefix in m.path.ancestors_or_self() {
        if let (Some(JsonPathSegment::Index(i)), Some(parent)) = (prefix.last(), prefix.parent()) {
          let furthest = furthest_index.entry(parent).or_insert(*i);
          *furthest = (*furthest).max(*i);
        }
        on_route.insert(prefix);
      }
    }
    Self {
      outcome,
      on_route,
      furthest_index,
      collapsed: HashSet::new(),
    }
  }

  /// Open/closed override for a node on the route to a match; `None` off the
  /// route. A collapse made during this search wins over the forced state.
  fn route_state(&self, path: &JsonPath) -> Option<bool> {
    self
      .on_route
      .contains(path)
      .then(|| !self.collapsed.contains(path))
  }

  /// True when some route child of the array at `path` has an index at or
  /// past `visible`.
  fn has_route_child_from(&self, path: &JsonPath, visible: usize) -> bool {
    self
      .furthest_index
      .get(path)
      .is_some_and(|furthest| *furthest >= visible)
  }
}

/// Lazily projected view of one loaded document.
///
/// Owns all per-path UI state (expansion, array windows, active search) so it
/// can be inspected and reset in one place. Nothing is materialized until a
/// node is asked for.
#[derive(Debug, Clone)]
pub struct TreeModel {
  document: Arc<Value>,
  large_document: bool,
  root_label: String,
  settings: TreeSettings,
  window: WindowController,
  expansion: ExpansionState,
  windows: WindowState,
  search: Option<ActiveSearch>,
}

impl TreeModel {
  pub fn new(document: Arc<Value>, large_document: bool, settings: TreeSettings) -> Self {
    Self {
      document,
      large_document,
      root_label: "root".to_string(),
      window: WindowController::new(settings.array_page_size),
      settings,
      expansion: ExpansionState::new(),
      windows: WindowState::new(),
      search: None,
    }
  }

  pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
    self.root_label = label.into();
    self
  }

  pub fn set_root_label(&mut self, label: impl Into<String>) {
    self.root_label = label.into();
  }

  pub fn document(&self) -> &Arc<Value> {
    &self.document
  }

  pub fn is_large_document(&self) -> bool {
    self.large_document
  }

  pub fn root_label(&self) -> &str {
    &self.root_label
  }

  pub fn expansion_state(&self) -> &ExpansionState {
    &self.expansion
  }

  pub fn window_state(&self) -> &WindowState {
    &self.windows
  }

  /// Swap in a new document. All path-keyed state belongs to the old one and
  /// is dropped.
  pub fn replace_document(&mut self, document: Arc<Value>, large_document: bool) {
    self.document = document;
    self.large_document = large_document;
    self.expansion.clear();
    self.windows.clear();
    self.search = None;
  }

  /// Changing the flag restarts every array window at one page.
  pub fn set_large_document(&mut self, large_document: bool) {
    if self.large_document != large_document {
      self.large_document = large_document;
      self.windows.clear();
    }
  }

  pub fn matches_search(&self, path: &JsonPath) -> bool {
    self
      .search
      .as_ref()
      .is_some_and(|s| s.on_route.contains(path))
  }

  pub fn search_outcome(&self) -> Option<&SearchOutcome> {
    self.search.as_ref().map(|s| &s.outcome)
  }

  /// Install results for the active query. An empty query clears the search.
  pub fn apply_search(&mut self, outcome: SearchOutcome) {
    if outcome.query.trim().is_empty() {
      self.clear_search();
      return;
    }
    self.search = Some(ActiveSearch::new(outcome));
  }

  /// Forced expansions disappear; only stored expansion flags remain.
  pub fn clear_search(&mut self) {
    self.search = None;
  }

  pub fn is_expanded(&mut self, path: &JsonPath) -> Result<bool, CoreError> {
    let document = Arc::clone(&self.document);
    let value = resolve(&document, path)?;
    Ok(self.resolve_expanded(path, value))
  }

  fn resolve_expanded(&mut self, path: &JsonPath, value: &Value) -> bool {
    if !classify(value).is_container() {
      return false;
    }
    let stored = self
      .expansion
      .observe(path, &self.settings.expansion, self.large_document);
    self
      .search
      .as_ref()
      .and_then(|s| s.route_state(path))
      .unwrap_or(stored)
  }

  /// An expanded, windowed node hides part of the route to a match; the host
  /// can reveal it with `load_more`.
  fn match_beyond_window(&self, path: &JsonPath, value: &Value, is_expanded: bool) -> bool {
    if !is_expanded || !self.window.is_windowed(value, self.large_document) {
      return false;
    }
    let visible = self
      .window
      .visible_count(path, value, self.large_document, &self.windows);
    self
      .search
      .as_ref()
      .is_some_and(|s| s.has_route_child_from(path, visible))
  }

  /// Flip a container open or closed; returns the new state.
  ///
  /// Collapsing a node that is only open because it leads to a search match
  /// hides it for the rest of that search without touching its stored flag.
  pub fn toggle_expanded(&mut self, path: &JsonPath) -> Result<bool, CoreError> {
    let document = Arc::clone(&self.document);
    let value = resolve(&document, path)?;
    if !classify(value).is_container() {
      return Err(CoreError::InvalidArg(format!(
        "cannot expand a primitive at '{}'",
        path
      )));
    }
    let current = self.resolve_expanded(path, value);

    let expanded = match self.search.as_mut() {
      Some(search) if search.on_route.contains(path) => {
        if current {
          search.collapsed.insert(path.clone());
        } else {
          search.collapsed.remove(path);
        }
        !current
      }
      _ => {
        self.expansion.set(path.clone(), !current);
        !current
      }
    };
    tracing::debug!(path = %path.to_json_pointer(), expanded, "toggled");
    Ok(expanded)
  }

  pub fn load_more(&mut self, path: &JsonPath) -> Result<LoadMoreResult, CoreError> {
    let document = Arc::clone(&self.document);
    let value = resolve(&document, path)?;
    Ok(
      self
        .window
        .load_more(path, value, self.large_document, &mut self.windows),
    )
  }

  pub fn node(&mut self, path: &JsonPath) -> Result<NodeView, CoreError> {
    let document = Arc::clone(&self.document);
    let value = resolve(&document, path)?;
    let class = classify(value);
    let is_expanded = self.resolve_expanded(path, value);
    let matches_search = self.matches_search(path);
    let match_beyond_window = self.match_beyond_window(path, value, is_expanded);

    let (visible_children, remaining) = if is_expanded {
      let children = self
        .window
        .visible_children(path, value, self.large_document, &self.windows)
        .into_iter()
        .map(|(segment, child)| {
          let child_class = classify(child);
          ChildEntry {
            name: segment_name(&segment),
            path: path.child(segment),
            kind: child_class.kind,
            child_count: child_class.child_count,
          }
        })
        .collect();
      let remaining = self
        .window
        .remaining(path, value, self.large_document, &self.windows);
      (children, remaining)
    } else {
      (Vec::new(), 0)
    };

    Ok(NodeView {
      name: self.node_name(path),
      path: path.clone(),
      depth: path.len(),
      kind: class.kind,
      child_count: class.child_count,
      is_expanded,
      matches_search,
      visible_children,
      remaining,
      match_beyond_window,
      preview: preview(value, self.settings.preview_max_chars),
      primitive: if class.is_container() {
        None
      } else {
        Some(value.clone())
      },
    })
  }

  /// Flatten the currently visible tree in display order.
  ///
  /// Iterative, so document depth never turns into call-stack depth; the
  /// amount of output is bounded by expansion and array windows.
  pub fn rows(&mut self) -> Vec<TreeRow> {
    let document = Arc::clone(&self.document);
    let mut out = Vec::new();
    let mut stack: Vec<(JsonPath, &Value)> = vec![(JsonPath::root(), document.as_ref())];

    while let Some((path, value)) = stack.pop() {
      let class = classify(value);
      let is_expanded = self.resolve_expanded(&path, value);
      let mut remaining = 0;
      let match_beyond_window = self.match_beyond_window(&path, value, is_expanded);

      if is_expanded {
        let children = self
          .window
          .visible_children(&path, value, self.large_document, &self.windows);
        remaining = self
          .window
          .remaining(&path, value, self.large_document, &self.windows);
        for (segment, child) in children.into_iter().rev() {
          stack.push((path.child(segment), child));
        }
      }

      out.push(TreeRow {
        name: self.node_name(&path),
        depth: path.len(),
        kind: class.kind,
        child_count: class.child_count,
        is_expanded,
        matches_search: self.matches_search(&path),
        preview: preview(value, self.settings.preview_max_chars),
        remaining,
        match_beyond_window,
        path,
      });
    }
    out
  }

  pub fn copy_text(&self, path: &JsonPath) -> Result<String, CoreError> {
    let value = resolve(&self.document, path)?;
    Ok(copy_text(value))
  }

  fn node_name(&self, path: &JsonPath) -> String {
    match path.last() {
      None => self.root_label.clone(),
      Some(segment) => segment_name(segment),
    }
  }
}

fn resolve<'a>(document: &'a Value, path: &JsonPath) -> Result<&'a Value, CoreError> {
  path
    .resolve(document)
    .ok_or_else(|| CoreError::InvalidPath(path.to_string()))
}

fn segment_name(segment: &JsonPathSegment) -> String {
  match segment {
    JsonPathSegment::Key(k) => k.clone(),
    JsonPathSegment::Index(i) => i.to_string(),
  }
}
