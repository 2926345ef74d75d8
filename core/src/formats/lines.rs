use serde_json::Value;

use crate::{engine::CoreError, models::LineError};

#[derive(Debug, Default)]
pub(crate) struct ParsedLines {
  pub records: Vec<Value>,
  pub errors: Vec<LineError>,
}

/// Parse JSON Lines: every non-blank line is one record.
///
/// Lines that fail to parse are skipped and reported; the load only fails
/// when no line parses at all.
pub(crate) fn parse_lines(bytes: &[u8]) -> Result<ParsedLines, CoreError> {
  let mut out = ParsedLines::default();
  let mut non_blank = 0usize;

  for (idx, raw) in bytes.split(|b| *b == b'\n').enumerate() {
    let mut line = raw;
    // Trim common line terminators (CRLF files).
    while let [rest @ .., b'\r'] = line {
      line = rest;
    }
    if line.iter().all(|b| b.is_ascii_whitespace()) {
      continue;
    }
    non_blank += 1;

    match serde_json::from_slice::<Value>(line) {
      Ok(v) => out.records.push(v),
      Err(e) => out.errors.push(LineError {
        line_no: idx as u64 + 1,
        message: e.to_string(),
      }),
    }
  }

  if non_blank > 0 && out.records.is_empty() {
    let first = &out.errors[0];
    return Err(CoreError::Malformed(format!(
      "no valid JSON lines ({} failed; line {}: {})",
      out.errors.len(),
      first.line_no,
      first.message
    )));
  }

  if let Some(first) = out.errors.first() {
    tracing::warn!(
      skipped = out.errors.len(),
      first_line = first.line_no,
      first_error = %first.message,
      "skipped unparseable JSONL lines"
    );
  }
  Ok(out)
}
