mod classify;
mod copy;
mod debounce;
mod engine;
mod expansion;
mod formats;
mod models;
mod path;
mod search;
mod search_match;
mod tree;
mod window;

pub use crate::classify::{classify, preview, primitive_text, NodeClass};
pub use crate::copy::copy_text;
pub use crate::debounce::{PendingSearch, SearchScheduler};
pub use crate::engine::{CoreEngine, CoreOptions, SearchJob};
pub use crate::expansion::{ExpansionPolicy, ExpansionState};
pub use crate::formats::{detect_format, load_document, parse_text, LoadedDocument};
pub use crate::models::{
  ChildEntry, FileFormat, JsonNodeKind, JsonPathSegment, LineError, LoadMoreResult, MatchSpan,
  NodeView, SearchMatch, SearchMatchKind, SearchOutcome, SessionInfo, TreeRow,
};
pub use crate::path::JsonPath;
pub use crate::search::{SearchEngine, SearchLimits};
pub use crate::search_match::{match_spans, PreparedQuery};
pub use crate::tree::{TreeModel, TreeSettings};
pub use crate::window::{WindowController, WindowState};

pub use crate::engine::CoreError;
