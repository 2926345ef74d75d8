use crate::models::MatchSpan;

/// A query normalized once per search run.
///
/// Matching is case-insensitive literal substring containment; the query is
/// never interpreted as a pattern.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
  raw: String,
  needle: String,
}

impl PreparedQuery {
  /// `None` for an empty or whitespace-only query.
  pub fn new(query: &str) -> Option<Self> {
    if query.trim().is_empty() {
      return None;
    }
    Some(Self {
      raw: query.to_string(),
      needle: query.to_lowercase(),
    })
  }

  pub fn raw(&self) -> &str {
    &self.raw
  }

  pub fn matches(&self, hay: &str) -> bool {
    if hay.is_ascii() && self.needle.is_ascii() {
      return ascii_contains_ignore_case(hay.as_bytes(), self.needle.as_bytes());
    }
    hay.to_lowercase().contains(&self.needle)
  }
}

// `needle` is already lowercase.
fn ascii_contains_ignore_case(hay: &[u8], needle: &[u8]) -> bool {
  if needle.len() > hay.len() {
    return false;
  }
  hay
    .windows(needle.len())
    .any(|w| w.iter().zip(needle).all(|(a, b)| a.to_ascii_lowercase() == *b))
}

/// Non-overlapping, left-to-right occurrences of `query` in `text`,
/// ignoring case, as byte ranges of `text` on char boundaries.
pub fn match_spans(text: &str, query: &str) -> Vec<MatchSpan> {
  if query.is_empty() || text.is_empty() {
    return Vec::new();
  }
  let needle = query.to_lowercase();

  // Lowercasing can change byte lengths, so remember which source char each
  // lowered byte came from.
  let mut lowered = String::with_capacity(text.len());
  let mut origin: Vec<(usize, usize)> = Vec::with_capacity(text.len());
  for (start, ch) in text.char_indices() {
    let end = start + ch.len_utf8();
    for lc in ch.to_lowercase() {
      lowered.push(lc);
      origin.extend(std::iter::repeat((start, end)).take(lc.len_utf8()));
    }
  }

  let mut spans: Vec<MatchSpan> = Vec::new();
  for (at, m) in lowered.match_indices(&needle) {
    let start = origin[at].0;
    let end = origin[at + m.len() - 1].1;
    // Two matches can map onto the same source char when one char lowercases
    // to several; keep them disjoint in source offsets.
    if spans.last().is_some_and(|prev| start < prev.end) {
      continue;
    }
    spans.push(MatchSpan { start, end });
  }
  spans
}
