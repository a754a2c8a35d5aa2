use chrono::{DateTime, TimeZone, Utc};
use std::cell::RefCell;
use std::collections::BTreeMap;
use tracelens_core::diff::model::ServerDiff;
use tracelens_core::errors::TraceLensError;
use tracelens_core::model::{
    IoSnapshot, RawObservation, RawPipelineEvent, RawTrace, RunStatus, StageRunRecord,
};
use tracelens_core::Result;
use tracelens_engine::PipelineService;

/// In-memory service; each RPC answers from its field and records the
/// stage-run calls it received.
#[derive(Default)]
pub struct FakeService {
    pub pipeline: Option<Vec<RawPipelineEvent>>,
    pub traces: Option<Vec<RawTrace>>,
    pub runs: Vec<StageRunRecord>,
    pub server_diff: Option<ServerDiff>,
    pub fail_pipeline: bool,
    pub fail_telemetry: bool,
    pub fail_run_diff: bool,
    pub stage_run_calls: RefCell<Vec<Option<String>>>,
    pub trace_calls: RefCell<usize>,
}

fn unavailable(service: &str) -> TraceLensError {
    TraceLensError::ExternalService {
        service: service.to_string(),
        message: "HTTP 503".to_string(),
    }
}

impl PipelineService for FakeService {
    fn pipeline_events(&self, _content_id: &str) -> Result<Vec<RawPipelineEvent>> {
        if self.fail_pipeline {
            return Err(unavailable("pipeline"));
        }
        Ok(self.pipeline.clone().unwrap_or_default())
    }

    fn traces(&self, _content_id: &str) -> Result<Vec<RawTrace>> {
        *self.trace_calls.borrow_mut() += 1;
        if self.fail_telemetry {
            return Err(unavailable("telemetry"));
        }
        Ok(self.traces.clone().unwrap_or_default())
    }

    fn stage_runs(
        &self,
        _source_id: i64,
        stage: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<StageRunRecord>> {
        self.stage_run_calls
            .borrow_mut()
            .push(stage.map(String::from));
        let runs = self
            .runs
            .iter()
            .filter(|r| stage.map_or(true, |s| r.stage_name == s))
            .cloned();
        Ok(match limit {
            Some(n) => runs.take(n).collect(),
            None => runs.collect(),
        })
    }

    fn run_diff(&self, _run_a: i64, _run_b: i64) -> Result<Option<ServerDiff>> {
        if self.fail_run_diff {
            return Err(unavailable("pipeline"));
        }
        Ok(self.server_diff.clone())
    }
}

/// 2025-03-01 10:MM:SS UTC
#[allow(dead_code)]
pub fn at(minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 10, minute, second).unwrap()
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
pub fn trace_with(
    name: &str,
    environment: Option<&str>,
    observations: Vec<RawObservation>,
) -> RawTrace {
    RawTrace {
        id: format!("tr-{}", name),
        name: name.to_string(),
        url: None,
        environment: environment.map(String::from),
        observations,
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

#[allow(dead_code)]
pub fn stage_run(run_id: i64, stage: &str, minute: u32, output: Option<&str>) -> StageRunRecord {
    StageRunRecord {
        run_id,
        stage_name: stage.to_string(),
        status: RunStatus::Completed,
        model_id: Some("model-a".to_string()),
        prompt_version: Some(1),
        duration_ms: Some(250),
        created_at: at(minute, 0),
        io: output.map(|o| IoSnapshot {
            input: Some("prompt".to_string()),
            output: Some(o.to_string()),
            parsed: None,
        }),
    }
}

#[allow(dead_code)]
pub fn triage_run(run_id: i64, minute: u32, parsed: &str) -> StageRunRecord {
    let mut run = stage_run(run_id, "triage", minute, None);
    run.io = Some(IoSnapshot {
        parsed: Some(parsed.to_string()),
        ..IoSnapshot::default()
    });
    run
}
