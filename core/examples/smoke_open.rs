use std::path::PathBuf;

use jv_core::{CoreEngine, CoreOptions};

fn main() -> Result<(), String> {
  let mut args = std::env::args().skip(1);
  let path = args
    .next()
    .ok_or_else(|| "usage: cargo run -p jv_core --example smoke_open -- <file> [query]".to_string())?;
  let path = PathBuf::from(path);
  let query = args.next();

  let eng = CoreEngine::new(CoreOptions::default());
  let (session, mut rows) = eng.open_file(&path).map_err(|e| e.to_string())?;
  println!(
    "format={:?} bytes={} large={} skipped_lines={}",
    session.format, session.source_bytes, session.large_document, session.skipped_lines
  );

  if let Some(query) = query {
    let out = eng
      .search_now(&session.session_id, &query)
      .map_err(|e| e.to_string())?
      .unwrap_or_default();
    println!(
      "matches={} limit_reached={} pruned={}",
      out.matches.len(),
      out.limit_reached,
      out.pruned
    );
    for m in out.matches.iter().take(20) {
      println!("  {:?} {}", m.kind, m.display_path);
    }
    rows = eng.rows(&session.session_id).map_err(|e| e.to_string())?;
  }

  for row in &rows {
    let marker = match (row.kind.is_container(), row.is_expanded) {
      (false, _) => " ",
      (true, true) => "v",
      (true, false) => ">",
    };
    let hit = if row.matches_search { "*" } else { "" };
    println!(
      "{}{} {}{}: {}",
      "  ".repeat(row.depth),
      marker,
      row.name,
      hit,
      row.preview
    );
    if row.remaining > 0 {
      println!("{}  ... {} more", "  ".repeat(row.depth + 1), row.remaining);
    }
  }
  Ok(())
}
