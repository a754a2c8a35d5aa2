use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use tracelens_core::model::{
    EventSource, IoSnapshot, RawObservation, RawPipelineEvent, RunStatus, Severity,
    StageRunRecord, TraceEvent,
};

/// 2025-03-01 10:MM:SS UTC
#[allow(dead_code)]
pub fn at(minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 10, minute, second).unwrap()
}

#[allow(dead_code)]
pub fn trace_event(source: EventSource, label: &str, ts: DateTime<Utc>) -> TraceEvent {
    TraceEvent {
        timestamp: ts,
        source,
        label: label.to_string(),
        message: label.to_string(),
        duration_ms: None,
        severity: Severity::Neutral,
        details: BTreeMap::new(),
        error: None,
    }
}

#[allow(dead_code)]
pub fn pipeline_event(stage: &str, action: &str, ts: DateTime<Utc>) -> RawPipelineEvent {
    RawPipelineEvent {
        stage: stage.to_string(),
        action: action.to_string(),
        message: format!("{} {}", stage, action),
        timestamp: ts,
        duration_ms: None,
        details: BTreeMap::new(),
    }
}

#[allow(dead_code)]
pub fn observation(name: &str, ts: DateTime<Utc>) -> RawObservation {
    RawObservation {
        id: None,
        kind: "GENERATION".to_string(),
        name: name.to_string(),
        status: "COMPLETED".to_string(),
        start_time: ts,
        end_time: None,
        model: None,
        input_tokens: None,
        output_tokens: None,
        error: None,
    }
}

/// A completed run created at 10:MM:00
#[allow(dead_code)]
pub fn stage_run(run_id: i64, stage: &str, minute: u32) -> StageRunRecord {
    StageRunRecord {
        run_id,
        stage_name: stage.to_string(),
        status: RunStatus::Completed,
        model_id: None,
        prompt_version: None,
        duration_ms: Some(100),
        created_at: at(minute, 0),
        io: None,
    }
}

#[allow(dead_code)]
pub fn with_io(
    mut run: StageRunRecord,
    input: Option<&str>,
    output: Option<&str>,
    parsed: Option<&str>,
) -> StageRunRecord {
    run.io = Some(IoSnapshot {
        input: input.map(String::from),
        output: output.map(String::from),
        parsed: parsed.map(String::from),
    });
    run
}

/// Gating-stage run whose parsed payload is `parsed`
#[allow(dead_code)]
pub fn triage_run(run_id: i64, minute: u32, parsed: &str) -> StageRunRecord {
    with_io(stage_run(run_id, "triage", minute), None, None, Some(parsed))
}
