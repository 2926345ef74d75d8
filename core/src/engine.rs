use std::{
  collections::HashMap,
  path::Path,
  sync::Arc,
  time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::{
  debounce::{PendingSearch, SearchScheduler},
  expansion::ExpansionPolicy,
  formats::{self, LoadedDocument},
  models::{FileFormat, LoadMoreResult, NodeView, SearchOutcome, SessionInfo, TreeRow},
  path::JsonPath,
  search::{SearchEngine, SearchLimits},
  tree::{TreeModel, TreeSettings},
};

#[derive(Debug, Error)]
pub enum CoreError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("unsupported format: {0:?}")]
  UnsupportedFormat(FileFormat),
  #[error("unknown session: {0}")]
  UnknownSession(String),
  #[error("invalid argument: {0}")]
  InvalidArg(String),
  #[error("no value at path '{0}'")]
  InvalidPath(String),
  #[error("malformed document: {0}")]
  Malformed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreOptions {
  /// Sources strictly larger than this are treated as large documents.
  pub large_file_threshold_bytes: u64,
  pub expansion: ExpansionPolicy,
  pub array_page_size: usize,
  pub search: SearchLimits,
  pub search_debounce_ms: u64,
  pub preview_max_chars: usize,
}

impl Default for CoreOptions {
  fn default() -> Self {
    Self {
      large_file_threshold_bytes: 5 * 1024 * 1024,
      expansion: ExpansionPolicy::default(),
      array_page_size: 100,
      search: SearchLimits::default(),
      search_debounce_ms: 300,
      preview_max_chars: 120,
    }
  }
}

impl CoreOptions {
  /// Parse a (possibly partial) settings blob; missing fields keep defaults.
  pub fn from_json_str(s: &str) -> Result<Self, CoreError> {
    serde_json::from_str(s).map_err(|e| CoreError::InvalidArg(format!("bad options: {e}")))
  }

  fn tree_settings(&self) -> TreeSettings {
    TreeSettings {
      expansion: self.expansion,
      array_page_size: self.array_page_size,
      preview_max_chars: self.preview_max_chars,
    }
  }
}

/// A released search, carrying the document it was started against.
#[derive(Debug, Clone)]
pub struct SearchJob {
  pending: PendingSearch,
  document: Arc<Value>,
}

impl SearchJob {
  pub fn query(&self) -> &str {
    &self.pending.query
  }

  pub fn generation(&self) -> u64 {
    self.pending.generation
  }
}

#[derive(Debug)]
struct SessionState {
  info: SessionInfo,
  tree: TreeModel,
  scheduler: SearchScheduler,
}

#[derive(Clone)]
pub struct CoreEngine {
  options: CoreOptions,
  search: SearchEngine,
  sessions: Arc<Mutex<HashMap<String, SessionState>>>,
}

impl CoreEngine {
  pub fn new(options: CoreOptions) -> Self {
    Self {
      search: SearchEngine::new(options.search),
      options,
      sessions: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  pub fn options(&self) -> &CoreOptions {
    &self.options
  }

  /// IPC API: open_file(path) -> { session, rows }
  pub fn open_file(&self, path: impl AsRef<Path>) -> Result<(SessionInfo, Vec<TreeRow>), CoreError> {
    let path = path.as_ref();
    let doc = formats::load_document(path)?;
    self.open_document(&path.to_string_lossy(), doc)
  }

  /// Open in-memory text (clipboard, drag-and-drop). `label` names the source.
  pub fn open_text(
    &self,
    label: &str,
    text: &str,
    format: FileFormat,
  ) -> Result<(SessionInfo, Vec<TreeRow>), CoreError> {
    let doc = formats::parse_text(text, format)?;
    self.open_document(label, doc)
  }

  /// Open an already parsed document.
  pub fn open_document(
    &self,
    source: &str,
    doc: LoadedDocument,
  ) -> Result<(SessionInfo, Vec<TreeRow>), CoreError> {
    let session_id = Uuid::new_v4().to_string();
    let large_document = doc.is_large(self.options.large_file_threshold_bytes);
    let label = doc.root_label();
    let info = SessionInfo {
      session_id: session_id.clone(),
      source: source.to_string(),
      format: doc.format,
      source_bytes: doc.source_bytes,
      large_document,
      skipped_lines: doc.skipped_lines,
      line_errors: doc.line_errors.clone(),
      created_at_ms: now_ms(),
    };
    let mut tree = TreeModel::new(
      Arc::new(doc.value),
      large_document,
      self.options.tree_settings(),
    )
    .with_root_label(label);
    let rows = tree.rows();

    tracing::info!(
      session = %session_id,
      source,
      format = ?info.format,
      bytes = info.source_bytes,
      large_document,
      "session opened"
    );
    self.sessions.lock().insert(
      session_id,
      SessionState {
        info: info.clone(),
        tree,
        scheduler: SearchScheduler::new(Duration::from_millis(self.options.search_debounce_ms)),
      },
    );
    Ok((info, rows))
  }

  /// Replace a session's document. Expansion, windows and search all reset.
  pub fn reload(&self, session_id: &str, doc: LoadedDocument) -> Result<(SessionInfo, Vec<TreeRow>), CoreError> {
    self.with_session(session_id, |s| {
      let large_document = doc.is_large(self.options.large_file_threshold_bytes);
      let label = doc.root_label();
      s.scheduler.cancel();
      s.tree.replace_document(Arc::new(doc.value), large_document);
      s.tree.set_root_label(label);
      s.info.format = doc.format;
      s.info.source_bytes = doc.source_bytes;
      s.info.large_document = large_document;
      s.info.skipped_lines = doc.skipped_lines;
      s.info.line_errors = doc.line_errors;
      tracing::debug!(session = %session_id, large_document, "document reloaded");
      Ok((s.info.clone(), s.tree.rows()))
    })
  }

  pub fn close_session(&self, session_id: &str) -> Result<(), CoreError> {
    self
      .sessions
      .lock()
      .remove(session_id)
      .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))?;
    tracing::info!(session = %session_id, "session closed");
    Ok(())
  }

  pub fn session_info(&self, session_id: &str) -> Result<SessionInfo, CoreError> {
    self.with_session(session_id, |s| Ok(s.info.clone()))
  }

  pub fn rows(&self, session_id: &str) -> Result<Vec<TreeRow>, CoreError> {
    self.with_session(session_id, |s| Ok(s.tree.rows()))
  }

  pub fn node(&self, session_id: &str, path: &JsonPath) -> Result<NodeView, CoreError> {
    self.with_session(session_id, |s| s.tree.node(path))
  }

  pub fn toggle_expanded(&self, session_id: &str, path: &JsonPath) -> Result<bool, CoreError> {
    self.with_session(session_id, |s| s.tree.toggle_expanded(path))
  }

  pub fn load_more(&self, session_id: &str, path: &JsonPath) -> Result<LoadMoreResult, CoreError> {
    self.with_session(session_id, |s| s.tree.load_more(path))
  }

  pub fn set_large_document(&self, session_id: &str, large_document: bool) -> Result<(), CoreError> {
    self.with_session(session_id, |s| {
      s.tree.set_large_document(large_document);
      s.info.large_document = large_document;
      Ok(())
    })
  }

  /// Record a keystroke. The search runs from `poll_search` once the query
  /// has been stable for the debounce delay.
  pub fn set_search_query(&self, session_id: &str, query: &str, now: Instant) -> Result<(), CoreError> {
    self.with_session(session_id, |s| {
      s.scheduler.schedule(query, now);
      Ok(())
    })
  }

  /// When the debounce deadline is passed, run the pending search and install
  /// its results. Returns `None` if nothing was due, or if the run was
  /// superseded before it finished.
  pub fn poll_search(&self, session_id: &str, now: Instant) -> Result<Option<SearchOutcome>, CoreError> {
    let job = self.with_session(session_id, |s| {
      Ok(s.scheduler.take_due(now).map(|pending| SearchJob {
        pending,
        document: Arc::clone(s.tree.document()),
      }))
    })?;
    match job {
      Some(job) => self.complete_search(session_id, job),
      None => Ok(None),
    }
  }

  /// Search immediately, superseding any pending or running query.
  pub fn search_now(&self, session_id: &str, query: &str) -> Result<Option<SearchOutcome>, CoreError> {
    let job = self.start_search(session_id, query)?;
    self.complete_search(session_id, job)
  }

  /// Release `query` for a run on any thread. Starting a job supersedes every
  /// earlier one for the session.
  pub fn start_search(&self, session_id: &str, query: &str) -> Result<SearchJob, CoreError> {
    self.with_session(session_id, |s| {
      Ok(SearchJob {
        pending: s.scheduler.run_now(query),
        document: Arc::clone(s.tree.document()),
      })
    })
  }

  /// Run the traversal for `job` without holding the session lock, then
  /// install the results. Returns `None`, and installs nothing, when the job
  /// was superseded or the document was replaced meanwhile.
  pub fn complete_search(&self, session_id: &str, job: SearchJob) -> Result<Option<SearchOutcome>, CoreError> {
    let outcome = self.search.search(Some(job.document.as_ref()), &job.pending.query);
    self.with_session(session_id, |s| {
      if !s.scheduler.is_current(job.pending.generation) || !Arc::ptr_eq(s.tree.document(), &job.document) {
        tracing::warn!(
          session = %session_id,
          generation = job.pending.generation,
          "discarding stale search results"
        );
        return Ok(None);
      }
      s.tree.apply_search(outcome.clone());
      Ok(Some(outcome))
    })
  }

  pub fn clear_search(&self, session_id: &str) -> Result<(), CoreError> {
    self.with_session(session_id, |s| {
      s.scheduler.cancel();
      s.tree.clear_search();
      Ok(())
    })
  }

  pub fn search_results(&self, session_id: &str) -> Result<Option<SearchOutcome>, CoreError> {
    self.with_session(session_id, |s| Ok(s.tree.search_outcome().cloned()))
  }

  /// Text for the clipboard collaborator.
  pub fn copy_value(&self, session_id: &str, path: &JsonPath) -> Result<String, CoreError> {
    self.with_session(session_id, |s| s.tree.copy_text(path))
  }

  fn with_session<T>(
    &self,
    session_id: &str,
    f: impl FnOnce(&mut SessionState) -> Result<T, CoreError>,
  ) -> Result<T, CoreError> {
    let mut sessions = self.sessions.lock();
    let s = sessions
      .get_mut(session_id)
      .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))?;
    f(s)
  }
}

fn now_ms() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_millis() as i64
}
