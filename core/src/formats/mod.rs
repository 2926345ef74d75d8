use std::path::Path;

use serde_json::Value;

use crate::{
  engine::CoreError,
  models::{FileFormat, LineError},
};

mod json;
mod lines;

pub fn detect_format(path: &Path) -> FileFormat {
  let ext = path
    .extension()
    .and_then(|s| s.to_str())
    .unwrap_or("")
    .to_ascii_lowercase();
  match ext.as_str() {
    "jsonl" | "ndjson" => FileFormat::Jsonl,
    "json" => FileFormat::Json,
    _ => FileFormat::Unknown,
  }
}

/// A parsed document plus the facts about its source the tree needs.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
  pub value: Value,
  pub format: FileFormat,
  pub source_bytes: u64,
  /// JSONL lines that failed to parse. Always 0 for JSON.
  pub skipped_lines: usize,
  pub line_errors: Vec<LineError>,
}

impl LoadedDocument {
  pub fn from_value(value: Value, format: FileFormat, source_bytes: u64) -> Self {
    Self {
      value,
      format,
      source_bytes,
      skipped_lines: 0,
      line_errors: Vec::new(),
    }
  }

  pub fn is_large(&self, threshold_bytes: u64) -> bool {
    self.source_bytes > threshold_bytes
  }

  /// Name of the synthetic root node.
  pub fn root_label(&self) -> &'static str {
    match self.format {
      FileFormat::Jsonl => "records",
      _ => "root",
    }
  }
}

/// Read and parse a `.json` / `.jsonl` file fully into memory.
pub fn load_document(path: &Path) -> Result<LoadedDocument, CoreError> {
  let format = detect_format(path);
  if format == FileFormat::Unknown {
    return Err(CoreError::UnsupportedFormat(format));
  }
  let bytes = std::fs::read(path)?;
  parse_bytes(&bytes, format)
}

/// Parse in-memory text, e.g. a clipboard or drag-and-drop payload.
pub fn parse_text(text: &str, format: FileFormat) -> Result<LoadedDocument, CoreError> {
  parse_bytes(text.as_bytes(), format)
}

fn parse_bytes(bytes: &[u8], format: FileFormat) -> Result<LoadedDocument, CoreError> {
  let source_bytes = bytes.len() as u64;
  let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(bytes);
  let doc = match format {
    FileFormat::Json => {
      LoadedDocument::from_value(json::parse_json(bytes)?, format, source_bytes)
    }
    FileFormat::Jsonl => {
      let parsed = lines::parse_lines(bytes)?;
      LoadedDocument {
        value: Value::Array(parsed.records),
        format,
        source_bytes,
        skipped_lines: parsed.errors.len(),
        line_errors: parsed.errors,
      }
    }
    FileFormat::Unknown => return Err(CoreError::UnsupportedFormat(format)),
  };
  tracing::debug!(
    format = ?doc.format,
    source_bytes = doc.source_bytes,
    skipped_lines = doc.skipped_lines,
    "document parsed"
  );
  Ok(doc)
}
