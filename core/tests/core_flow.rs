use std::time::{Duration, Instant};

use jv_core::{CoreEngine, CoreError, CoreOptions, FileFormat, JsonNodeKind, JsonPath};

fn engine() -> CoreEngine {
  CoreEngine::new(CoreOptions::default())
}

#[test]
fn open_json_file_shows_two_levels() {
  let dir = tempfile::tempdir().unwrap();
  let file = dir.path().join("a.json");
  std::fs::write(&file, r#"{"a": {"b": {"c": 1}}, "d": [1, 2]}"#).unwrap();

  let eng = engine();
  let (session, rows) = eng.open_file(&file).unwrap();
  assert_eq!(session.format, FileFormat::Json);
  assert!(!session.large_document);

  let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
  assert_eq!(names, vec!["root", "a", "b", "d", "0", "1"]);
  let b = &rows[2];
  assert_eq!(b.kind, JsonNodeKind::Object);
  assert!(!b.is_expanded);
}

#[test]
fn open_jsonl_file_reports_skipped_lines() {
  let dir = tempfile::tempdir().unwrap();
  let file = dir.path().join("a.jsonl");
  std::fs::write(&file, "{\"id\":1}\nbroken\n{\"id\":3}\n").unwrap();

  let eng = engine();
  let (session, rows) = eng.open_file(&file).unwrap();
  assert_eq!(session.format, FileFormat::Jsonl);
  assert_eq!(session.skipped_lines, 1);
  assert_eq!(session.line_errors[0].line_no, 2);
  assert_eq!(rows[0].name, "records");
  assert_eq!(rows[0].child_count, 2);
}

#[test]
fn large_document_windows_top_level_array() {
  let eng = CoreEngine::new(CoreOptions {
    large_file_threshold_bytes: 64,
    ..CoreOptions::default()
  });
  let values: Vec<u32> = (0..2000).collect();
  let text = serde_json::to_string(&values).unwrap();
  let (session, rows) = eng.open_text("clipboard", &text, FileFormat::Json).unwrap();
  assert!(session.large_document);
  assert_eq!(rows.len(), 101);
  assert_eq!(rows[0].remaining, 1900);

  let sid = session.session_id.as_str();
  let res = eng.load_more(sid, &JsonPath::root()).unwrap();
  assert_eq!(res.visible, 200);
  assert_eq!(res.remaining, 1800);
  assert_eq!(eng.rows(sid).unwrap().len(), 201);

  eng.set_large_document(sid, false).unwrap();
  assert!(!eng.session_info(sid).unwrap().large_document);
  assert_eq!(eng.rows(sid).unwrap().len(), 2001);
}

#[test]
fn debounced_search_runs_after_quiet_period() {
  let eng = engine();
  let (session, _) = eng
    .open_text("t", r#"{"x": {"y": {"z": "needle"}}}"#, FileFormat::Json)
    .unwrap();
  let sid = session.session_id.as_str();

  let t0 = Instant::now();
  eng.set_search_query(sid, "ne", t0).unwrap();
  eng
    .set_search_query(sid, "needle", t0 + Duration::from_millis(100))
    .unwrap();

  assert!(eng
    .poll_search(sid, t0 + Duration::from_millis(350))
    .unwrap()
    .is_none());
  assert!(eng.search_results(sid).unwrap().is_none());

  let out = eng
    .poll_search(sid, t0 + Duration::from_millis(400))
    .unwrap()
    .unwrap();
  assert_eq!(out.query, "needle");
  assert_eq!(out.matches.len(), 1);

  let z = JsonPath::root().child_key("x").child_key("y");
  let node = eng.node(sid, &z).unwrap();
  assert!(node.is_expanded);
  assert!(node.matches_search);
  let rows = eng.rows(sid).unwrap();
  assert_eq!(rows.last().unwrap().name, "z");
}

#[test]
fn clear_search_restores_default_expansion() {
  let eng = engine();
  let (session, _) = eng
    .open_text("t", r#"{"x": {"y": {"z": "needle"}}}"#, FileFormat::Json)
    .unwrap();
  let sid = session.session_id.as_str();
  let y = JsonPath::root().child_key("x").child_key("y");

  let out = eng.search_now(sid, "NEEDLE").unwrap().unwrap();
  assert_eq!(out.matches.len(), 1);
  assert!(eng.node(sid, &y).unwrap().is_expanded);

  eng.clear_search(sid).unwrap();
  assert!(eng.search_results(sid).unwrap().is_none());
  assert!(!eng.node(sid, &y).unwrap().is_expanded);
}

#[test]
fn superseded_search_job_installs_nothing() {
  let eng = engine();
  let (session, _) = eng
    .open_text("t", r#"{"x": {"y": {"z": "needle"}}, "w": "other"}"#, FileFormat::Json)
    .unwrap();
  let sid = session.session_id.as_str();

  let first = eng.start_search(sid, "needle").unwrap();
  let second = eng.start_search(sid, "other").unwrap();
  assert!(second.generation() > first.generation());

  assert!(eng.complete_search(sid, first).unwrap().is_none());
  assert!(eng.search_results(sid).unwrap().is_none());

  let out = eng.complete_search(sid, second).unwrap().unwrap();
  assert_eq!(out.query, "other");
  assert_eq!(eng.search_results(sid).unwrap(), Some(out));
}

#[test]
fn search_job_for_replaced_document_installs_nothing() {
  let eng = engine();
  let (session, _) = eng.open_text("t", r#"{"a": "needle"}"#, FileFormat::Json).unwrap();
  let sid = session.session_id.as_str();

  let job = eng.start_search(sid, "needle").unwrap();
  let doc = jv_core::parse_text(r#"{"b": "needle"}"#, FileFormat::Json).unwrap();
  eng.reload(sid, doc).unwrap();

  assert!(eng.complete_search(sid, job).unwrap().is_none());
  assert!(eng.search_results(sid).unwrap().is_none());
}

#[test]
fn clear_search_drops_pending_query() {
  let eng = engine();
  let (session, _) = eng.open_text("t", r#"{"a": 1}"#, FileFormat::Json).unwrap();
  let sid = session.session_id.as_str();
  let t0 = Instant::now();
  eng.set_search_query(sid, "a", t0).unwrap();
  eng.clear_search(sid).unwrap();
  assert!(eng
    .poll_search(sid, t0 + Duration::from_secs(1))
    .unwrap()
    .is_none());
}

#[test]
fn copy_value_for_primitive_and_subtree() {
  let eng = engine();
  let (session, _) = eng
    .open_text("t", r#"{"a": {"b": "hi"}}"#, FileFormat::Json)
    .unwrap();
  let sid = session.session_id.as_str();
  let a = JsonPath::root().child_key("a");
  assert_eq!(eng.copy_value(sid, &a.child_key("b")).unwrap(), "hi");
  assert_eq!(eng.copy_value(sid, &a).unwrap(), "{\n  \"b\": \"hi\"\n}");
}

#[test]
fn reload_resets_view_state() {
  let eng = engine();
  let (session, _) = eng
    .open_text("t", r#"{"a": {"b": 1}}"#, FileFormat::Json)
    .unwrap();
  let sid = session.session_id.as_str();
  let a = JsonPath::root().child_key("a");
  assert!(!eng.toggle_expanded(sid, &a).unwrap());
  eng.search_now(sid, "b").unwrap();

  let doc = jv_core::parse_text("{\"a\": {\"c\": 2}}\n", FileFormat::Jsonl).unwrap();
  let (info, rows) = eng.reload(sid, doc).unwrap();
  assert_eq!(info.session_id, session.session_id);
  assert_eq!(info.format, FileFormat::Jsonl);
  assert_eq!(rows[0].name, "records");
  assert!(eng.search_results(sid).unwrap().is_none());
}

#[test]
fn unknown_and_closed_sessions_error() {
  let eng = engine();
  assert!(matches!(
    eng.rows("nope"),
    Err(CoreError::UnknownSession(_))
  ));

  let (session, _) = eng.open_text("t", "[]", FileFormat::Json).unwrap();
  let sid = session.session_id.clone();
  eng.close_session(&sid).unwrap();
  assert!(matches!(
    eng.session_info(&sid),
    Err(CoreError::UnknownSession(_))
  ));
  assert!(matches!(
    eng.close_session(&sid),
    Err(CoreError::UnknownSession(_))
  ));
}

#[test]
fn options_from_partial_json() {
  let opts = CoreOptions::from_json_str(
    r#"{"array_page_size": 50, "search": {"max_results": 10}}"#,
  )
  .unwrap();
  assert_eq!(opts.array_page_size, 50);
  assert_eq!(opts.search.max_results, 10);
  assert_eq!(opts.search.max_depth, 50);
  assert_eq!(opts.large_file_threshold_bytes, 5 * 1024 * 1024);
  assert_eq!(opts.expansion.small_expand_depth, 2);

  assert!(matches!(
    CoreOptions::from_json_str("{"),
    Err(CoreError::InvalidArg(_))
  ));
}
