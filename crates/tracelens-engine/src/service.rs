//! Collaborator interface to the pipeline and telemetry services.
//!
//! One method per RPC. The engine never talks to the network itself; the CLI
//! supplies an implementation (file-backed today) and tests supply fakes.

use tracelens_core::diff::model::ServerDiff;
use tracelens_core::model::{RawPipelineEvent, RawTrace, StageRunRecord};
use tracelens_core::Result;

pub trait PipelineService {
    /// Stage lifecycle events recorded for a content id, in any order.
    fn pipeline_events(&self, content_id: &str) -> Result<Vec<RawPipelineEvent>>;

    /// AI telemetry traces (with their observations) for a content id.
    fn traces(&self, content_id: &str) -> Result<Vec<RawTrace>>;

    /// Historical stage runs for a source, optionally narrowed to one stage
    /// and capped at `limit` records.
    fn stage_runs(
        &self,
        source_id: i64,
        stage: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<StageRunRecord>>;

    /// Diff already computed by the pipeline service, if it offers one.
    fn run_diff(&self, run_a: i64, run_b: i64) -> Result<Option<ServerDiff>>;
}
