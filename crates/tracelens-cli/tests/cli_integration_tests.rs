//! CLI integration tests
//!
//! Drive the built `tracelens` binary against captured-response fixtures
//! written to a temp dir.

use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

const PIPELINE_EVENTS: &str = r#"[
  {"stage": "FETCH", "action": "completed", "message": "fetched article",
   "timestamp": "2025-03-01T10:00:00Z", "duration_ms": 120, "details": {"bytes": 5120}},
  {"stage": "PARSE", "action": "completed", "message": "parsed body",
   "timestamp": "2025-03-01T10:00:02Z", "details": {}}
]"#;

const TRACES: &str = r#"[
  {"id": "tr-1", "name": "enrich", "environment": "production",
   "url": "https://telemetry.example/trace/tr-1",
   "observations": [
     {"type": "GENERATION", "name": "embed", "status": "COMPLETED",
      "start_time": "2025-03-01T10:00:01Z", "end_time": "2025-03-01T10:00:01.250Z",
      "model": "embed-small", "input_tokens": 1200, "output_tokens": 34}
   ]}
]"#;

const GATED_RUNS: &str = r#"[
  {"run_id": 1, "stage_name": "triage", "status": "completed", "model_id": "m-1",
   "prompt_version": 3, "duration_ms": 800, "created_at": "2025-03-01T10:00:00Z",
   "io": {"parsed": "{\"content_contribution\":\"NONE\",\"contribution_reason\":\"duplicate\"}"}}
]"#;

const ANALYZE_RUNS: &str = r#"[
  {"run_id": 10, "stage_name": "analyze", "status": "superseded", "prompt_version": 1,
   "created_at": "2025-03-01T10:00:00Z", "io": {"input": "doc", "output": "a\nb\nc"}},
  {"run_id": 11, "stage_name": "analyze", "status": "completed", "prompt_version": 2,
   "created_at": "2025-03-01T11:00:00Z", "io": {"input": "doc", "output": "a\nb\nc\nd"}}
]"#;

fn fixture(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

fn tracelens(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tracelens"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn path(p: &PathBuf) -> &str {
    p.to_str().unwrap()
}

// ---------------------------------------------------------------------------
// trace
// ---------------------------------------------------------------------------

#[test]
fn test_trace_merges_both_sources() {
    let dir = TempDir::new().unwrap();
    let pipeline = fixture(&dir, "pipeline.json", PIPELINE_EVENTS);
    let traces = fixture(&dir, "traces.json", TRACES);

    let output = tracelens(&[
        "trace",
        "content-1",
        "--pipeline-file",
        path(&pipeline),
        "--telemetry-file",
        path(&traces),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    let fetch = text.find("FETCH").unwrap();
    let embed = text.find("embed embed-small 1,234 tokens").unwrap();
    let parse = text.find("PARSE").unwrap();
    assert!(fetch < embed && embed < parse);
    assert!(text.contains("3 events (pipeline: 2, telemetry: 1)"));
    assert!(!text.contains('\x1b'), "piped output must not be coloured");
}

#[test]
fn test_trace_json_encoding() {
    let dir = TempDir::new().unwrap();
    let pipeline = fixture(&dir, "pipeline.json", PIPELINE_EVENTS);
    let traces = fixture(&dir, "traces.json", TRACES);

    let output = tracelens(&[
        "--json",
        "trace",
        "content-1",
        "--pipeline-file",
        path(&pipeline),
        "--telemetry-file",
        path(&traces),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let view: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(view["content_id"], "content-1");
    let events = view["events"].as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["details"]["bytes"], "5120");
    assert_eq!(events[1]["source"], "telemetry");
    assert_eq!(events[1]["severity"], "ok");
    assert_eq!(events[1]["duration_ms"], 250);
    assert_eq!(events[1]["details"]["trace_url"], "https://telemetry.example/trace/tr-1");
}

#[test]
fn test_trace_survives_broken_telemetry() {
    let dir = TempDir::new().unwrap();
    let pipeline = fixture(&dir, "pipeline.json", PIPELINE_EVENTS);
    let traces = fixture(&dir, "traces.json", "{truncated");

    let output = tracelens(&[
        "trace",
        "content-1",
        "--pipeline-file",
        path(&pipeline),
        "--telemetry-file",
        path(&traces),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("telemetry: unavailable"));
    assert!(text.contains("warning: telemetry unavailable"));
    assert!(stderr(&output).contains("source unavailable"));
}

#[test]
fn test_trace_without_data_fails() {
    let output = tracelens(&["trace", "content-404"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ERR_NO_TRACE_DATA"));

    let output = tracelens(&["--json", "trace", "content-404"]);
    assert_eq!(output.status.code(), Some(1));
    let envelope: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(envelope["error"]["code"], "ERR_NO_TRACE_DATA");
    assert_eq!(envelope["error"]["id"], "content-404");
    assert_eq!(envelope["error"]["op"], "trace");
}

#[test]
fn test_trace_source_filter() {
    let dir = TempDir::new().unwrap();
    let pipeline = fixture(&dir, "pipeline.json", PIPELINE_EVENTS);
    let traces = fixture(&dir, "traces.json", TRACES);

    let output = tracelens(&[
        "trace",
        "content-1",
        "--source",
        "telemetry",
        "--pipeline-file",
        path(&pipeline),
        "--telemetry-file",
        path(&traces),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(!text.contains("FETCH"));
    assert!(text.contains("1 events (telemetry: 1)"));
}

// ---------------------------------------------------------------------------
// pipeline
// ---------------------------------------------------------------------------

#[test]
fn test_history_reports_gated_stages() {
    let dir = TempDir::new().unwrap();
    let runs = fixture(&dir, "runs.json", GATED_RUNS);

    let output = tracelens(&["pipeline", "history", "42", "--runs-file", path(&runs)]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Gating: content_contribution=NONE (duplicate)"));
    for stage in ["extract_ner", "extract_assertions", "analyze", "embeddings"] {
        assert!(
            text.contains(&format!("{} skipped by gating: duplicate", stage)),
            "missing skip line for {}",
            stage
        );
    }
}

#[test]
fn test_history_uses_configured_topology() {
    let dir = TempDir::new().unwrap();
    let runs = fixture(&dir, "runs.json", GATED_RUNS);
    let config = fixture(
        &dir,
        "tracelens.toml",
        "[stages]\ngating_stage = \"triage\"\ndownstream = [\"summarize\"]\n",
    );

    let output = tracelens(&[
        "--json",
        "--config",
        path(&config),
        "pipeline",
        "history",
        "42",
        "--runs-file",
        path(&runs),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let history: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let skipped = history["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0]["stage_name"], "summarize");
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = fixture(&dir, "tracelens.toml", "[truncation]\nio_limit = 0\n");

    let output = tracelens(&["--config", path(&config), "pipeline", "history", "42"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ERR_INVALID_CONFIG"));
}

#[test]
fn test_inspect_diff_with_single_run_fails() {
    let dir = TempDir::new().unwrap();
    let runs = fixture(&dir, "runs.json", GATED_RUNS);

    let output = tracelens(&[
        "pipeline",
        "inspect",
        "42",
        "--stage",
        "triage",
        "--diff",
        "--runs-file",
        path(&runs),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("ERR_INSUFFICIENT_RUNS"));
    assert!(err.contains("found 1"));
}

#[test]
fn test_inspect_diff_of_latest_runs() {
    let dir = TempDir::new().unwrap();
    let runs = fixture(&dir, "runs.json", ANALYZE_RUNS);

    let output = tracelens(&[
        "pipeline",
        "inspect",
        "42",
        "--stage",
        "analyze",
        "--diff",
        "--runs-file",
        path(&runs),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Run 10 (analyze)"));
    assert!(text.contains("Run 11 (analyze)"));
    assert!(text.contains("Drift: prompt version changed"));
    assert!(text.contains("~ output  1 added, 0 removed, 0 changed, 3 unchanged"));
}

#[test]
fn test_diff_json_by_run_id() {
    let dir = TempDir::new().unwrap();
    let runs = fixture(&dir, "runs.json", ANALYZE_RUNS);

    let output = tracelens(&[
        "--json",
        "pipeline",
        "diff",
        "42",
        "10",
        "11",
        "--slot",
        "output",
        "--runs-file",
        path(&runs),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let diff: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(diff["origin"], "computed");
    assert_eq!(diff["diff_schema_version"], 1);
    let slots = diff["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["slot"], "output");
    assert_eq!(slots[0]["diff"]["counts"]["added"], 1);
    assert_eq!(slots[0]["diff"]["counts"]["changed"], 0);
}

#[test]
fn test_diff_passes_server_result_through() {
    let dir = TempDir::new().unwrap();
    let runs = fixture(&dir, "runs.json", ANALYZE_RUNS);
    let server = fixture(
        &dir,
        "diff.json",
        r#"{"summary": "entities changed", "payload": {"added": ["ACME"]}}"#,
    );

    let output = tracelens(&[
        "--json",
        "pipeline",
        "diff",
        "42",
        "10",
        "11",
        "--runs-file",
        path(&runs),
        "--diff-file",
        path(&server),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let diff: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(diff["origin"], "precomputed");
    assert_eq!(diff["summary"], "entities changed");
    assert_eq!(diff["payload"]["added"][0], "ACME");
}

#[test]
fn test_diff_unknown_run() {
    let dir = TempDir::new().unwrap();
    let runs = fixture(&dir, "runs.json", ANALYZE_RUNS);

    let output = tracelens(&["pipeline", "diff", "42", "10", "99", "--runs-file", path(&runs)]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ERR_NOT_FOUND"));
}
