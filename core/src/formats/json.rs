use serde_json::Value;

use crate::engine::CoreError;

/// Parse a whole JSON document. Object key order is kept as in the source.
pub(crate) fn parse_json(bytes: &[u8]) -> Result<Value, CoreError> {
  serde_json::from_slice(bytes).map_err(|e| CoreError::Malformed(format!("invalid JSON: {e}")))
}
