//! Engine-level read-only query surface.
//!
//! `apply_engine_query` is the single entry point for every query the CLI
//! issues. Each arm logs one `start` and exactly one `end` / `end_error`
//! event, and failures leave the engine as an `ExError` carrying the op name
//! and request id.

use std::time::Instant;

use serde::Serialize;
use tracelens_core::config::TraceLensConfig;
use tracelens_core::diff::model::{RunDiff, ServerDiff};
use tracelens_core::diff::{diff_runs, differ_for, resolve_run_diff, select_diff_pair};
use tracelens_core::errors::TraceLensError;
use tracelens_core::history::{
    analyze_history, run_io_view, HistoryQuery, RunHistory, RunIoView, StageTopology,
};
use tracelens_core::model::{IoSlot, StageRunRecord};
use tracelens_core::timeline::TraceView;
use tracelens_core::{log_op_end, log_op_error, log_op_start};
use tracelens_core_types::schema::EVENT_SOURCE_DEGRADED;
use tracelens_core_types::RequestContext;

use crate::commands::requests::{DiffRequest, HistoryRequest, InspectRequest, TraceRequest};
use crate::commands::trace::collect_trace;
use crate::errors::{at_boundary, Result};
use crate::service::PipelineService;

// ---------------------------------------------------------------------------
// EngineQuery
// ---------------------------------------------------------------------------

/// Read-only queries supported by the engine.
#[derive(Debug, Clone)]
pub enum EngineQuery {
    /// Merged pipeline + telemetry timeline for one content id.
    Trace(TraceRequest),
    /// Run table and gating annotations for one source.
    History(HistoryRequest),
    /// History plus each run's IO, optionally diffing the latest two runs.
    Inspect(InspectRequest),
    /// Compare two named runs.
    RunDiff(DiffRequest),
}

/// Output of `pipeline inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectResult {
    pub history: RunHistory,
    pub io: Vec<RunIoView>,
    pub diff: Option<RunDiff>,
}

/// Result of applying an engine query.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineQueryResult {
    Trace(TraceView),
    History(RunHistory),
    Inspect(Box<InspectResult>),
    RunDiff(RunDiff),
}

impl EngineQuery {
    /// Operation name used in log events and error context.
    pub fn op_name(&self) -> &'static str {
        match self {
            EngineQuery::Trace(_) => "trace",
            EngineQuery::History(_) => "pipeline_history",
            EngineQuery::Inspect(_) => "pipeline_inspect",
            EngineQuery::RunDiff(_) => "pipeline_diff",
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn finish<T>(
    op: &'static str,
    start: Instant,
    result: tracelens_core::Result<T>,
    ctx: &RequestContext,
) -> Result<T> {
    let elapsed = start.elapsed().as_millis() as u64;
    match result {
        Ok(value) => {
            log_op_end!(op, duration_ms = elapsed, request_id = %ctx.request_id);
            Ok(value)
        }
        Err(err) => {
            log_op_error!(op, err.clone(), duration_ms = elapsed, request_id = %ctx.request_id);
            Err(at_boundary(err, op, ctx))
        }
    }
}

/// Runs needed to analyze a source.
///
/// With a stage filter the service is asked for that stage only, but the
/// gating stage's runs are always fetched too so skip inference still sees
/// the gating decision. Otherwise the full list is fetched and `limit` is
/// left to the analyzer, which caps the table only.
fn fetch_runs(
    service: &dyn PipelineService,
    topology: &dyn StageTopology,
    source_id: i64,
    stage: Option<&str>,
    limit: Option<usize>,
) -> tracelens_core::Result<Vec<StageRunRecord>> {
    match stage {
        Some(stage) if stage != topology.gating_stage() => {
            let mut runs = service.stage_runs(source_id, Some(stage), limit)?;
            runs.extend(service.stage_runs(source_id, Some(topology.gating_stage()), None)?);
            Ok(runs)
        }
        _ => service.stage_runs(source_id, stage, None),
    }
}

/// Ask the service for a precomputed diff. A failure here only means the
/// diff gets computed locally.
fn server_diff(
    service: &dyn PipelineService,
    op: &'static str,
    run_a: i64,
    run_b: i64,
) -> Option<ServerDiff> {
    match service.run_diff(run_a, run_b) {
        Ok(diff) => diff,
        Err(err) => {
            tracing::warn!(
                component = module_path!(),
                op = op,
                event = EVENT_SOURCE_DEGRADED,
                run_a = run_a,
                run_b = run_b,
                error = %err,
                "precomputed diff unavailable, computing locally"
            );
            None
        }
    }
}

fn find_run(
    runs: &[StageRunRecord],
    run_id: i64,
    source_id: i64,
) -> tracelens_core::Result<&StageRunRecord> {
    runs.iter()
        .find(|r| r.run_id == run_id)
        .ok_or(TraceLensError::RunNotFound { run_id, source_id })
}

// ---------------------------------------------------------------------------
// apply_engine_query
// ---------------------------------------------------------------------------

/// Apply a read-only query against `service`.
///
/// # Errors
///
/// The query's domain failure converted to an `ExError` tagged with the op
/// name and `ctx.request_id`: `NoTraceData` for an empty trace,
/// `InsufficientRuns` for a diff without two runs, `NotFound` for an unknown
/// run id, `InvalidInput` for an unusable request, and any service failure
/// that is not absorbed as a degraded source.
pub fn apply_engine_query(
    query: EngineQuery,
    service: &dyn PipelineService,
    config: &TraceLensConfig,
    ctx: &RequestContext,
) -> Result<EngineQueryResult> {
    let op = query.op_name();
    let topology = config.stage_registry();

    match query {
        // ── Trace ─────────────────────────────────────────────────────────────
        EngineQuery::Trace(req) => {
            log_op_start!(op, content_id = %req.content_id, request_id = %ctx.request_id);
            let start = Instant::now();

            let policy = config.body_policy(req.truncate);
            let result = collect_trace(service, &req, &policy);
            if let Ok(view) = &result {
                tracing::debug!(op = op, event_count = view.events.len(), "timeline merged");
            }
            finish(op, start, result, ctx).map(EngineQueryResult::Trace)
        }

        // ── History ───────────────────────────────────────────────────────────
        EngineQuery::History(req) => {
            log_op_start!(op, source_id = req.source_id, request_id = %ctx.request_id);
            let start = Instant::now();

            let result = (|| -> tracelens_core::Result<RunHistory> {
                let runs =
                    fetch_runs(service, &topology, req.source_id, req.stage.as_deref(), req.limit)?;
                let query = HistoryQuery {
                    source_id: req.source_id,
                    stage: req.stage.clone(),
                    limit: req.limit,
                };
                Ok(analyze_history(&runs, &query, &topology))
            })();
            if let Ok(history) = &result {
                tracing::debug!(
                    op = op,
                    run_count = history.runs.len(),
                    skipped_count = history.skipped.len(),
                    "history analyzed"
                );
            }
            finish(op, start, result, ctx).map(EngineQueryResult::History)
        }

        // ── Inspect ───────────────────────────────────────────────────────────
        EngineQuery::Inspect(req) => {
            log_op_start!(op, source_id = req.source_id, request_id = %ctx.request_id);
            let start = Instant::now();

            let result = (|| -> tracelens_core::Result<InspectResult> {
                if req.diff && req.stage.is_none() {
                    return Err(TraceLensError::InvalidInput {
                        reason: "--diff requires --stage".to_string(),
                    });
                }
                let runs =
                    fetch_runs(service, &topology, req.source_id, req.stage.as_deref(), None)?;
                let query = HistoryQuery {
                    source_id: req.source_id,
                    stage: req.stage.clone(),
                    limit: None,
                };
                let history = analyze_history(&runs, &query, &topology);

                let policy = config.io_policy(req.truncate);
                let io = history
                    .runs
                    .iter()
                    .filter(|r| r.io.is_some())
                    .map(|r| run_io_view(r, &policy))
                    .collect();

                let diff = match (req.diff, req.stage.as_deref()) {
                    (true, Some(stage)) => {
                        let (older, newer) = select_diff_pair(&history.runs, stage)?;
                        let server = server_diff(service, op, older.run_id, newer.run_id);
                        Some(resolve_run_diff(
                            server,
                            older,
                            newer,
                            &IoSlot::ALL,
                            differ_for(req.strategy),
                        )?)
                    }
                    _ => None,
                };

                Ok(InspectResult { history, io, diff })
            })();
            finish(op, start, result, ctx).map(|r| EngineQueryResult::Inspect(Box::new(r)))
        }

        // ── RunDiff ───────────────────────────────────────────────────────────
        EngineQuery::RunDiff(req) => {
            log_op_start!(
                op,
                source_id = req.source_id,
                run_a = req.run_a,
                run_b = req.run_b,
                request_id = %ctx.request_id
            );
            let start = Instant::now();

            let result = (|| -> tracelens_core::Result<RunDiff> {
                if req.slots.is_empty() {
                    return Err(TraceLensError::InvalidInput {
                        reason: "at least one slot must be compared".to_string(),
                    });
                }
                // A slot-restricted request is always computed locally
                if req.covers_all_slots() {
                    if let Some(precomputed) = server_diff(service, op, req.run_a, req.run_b) {
                        return Ok(RunDiff::Precomputed(precomputed));
                    }
                }
                let runs = service.stage_runs(req.source_id, None, None)?;
                let a = find_run(&runs, req.run_a, req.source_id)?;
                let b = find_run(&runs, req.run_b, req.source_id)?;
                diff_runs(a, b, &req.slots, differ_for(req.strategy)).map(RunDiff::Computed)
            })();
            finish(op, start, result, ctx).map(EngineQueryResult::RunDiff)
        }
    }
}
