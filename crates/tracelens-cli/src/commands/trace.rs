//! `tracelens trace <CONTENT_ID>`
//!
//! Merged pipeline + telemetry timeline for one piece of content.

use clap::Args;
use std::path::PathBuf;
use tracelens_core::errors::ExError;
use tracelens_core::render::render_timeline;
use tracelens_core::TruncateMode;
use tracelens_engine::commands::requests::{SourceFilter, TraceRequest};
use tracelens_engine::{EngineQuery, EngineQueryResult};

use crate::commands::{unexpected_result, Session};

#[derive(Debug, Args)]
pub struct TraceArgs {
    /// Content identifier to trace
    pub content_id: String,

    /// Which event sources to fetch: pipeline, telemetry or all
    #[arg(long, default_value = "all")]
    pub source: SourceFilter,

    /// Only show telemetry traces from this environment
    #[arg(long)]
    pub env: Option<String>,

    /// Captured pipeline-events response (JSON array)
    #[arg(long)]
    pub pipeline_file: Option<PathBuf>,

    /// Captured telemetry traces response (JSON array)
    #[arg(long)]
    pub telemetry_file: Option<PathBuf>,

    /// Show event messages in full
    #[arg(long)]
    pub no_truncate: bool,
}

pub fn execute(args: TraceArgs, mut session: Session) -> Result<(), ExError> {
    session.service.pipeline_file = args.pipeline_file;
    session.service.telemetry_file = args.telemetry_file;

    let request = TraceRequest {
        content_id: args.content_id,
        sources: args.source,
        environment: args.env,
        truncate: TruncateMode::from_no_truncate(args.no_truncate),
    };
    match session.query("trace", EngineQuery::Trace(request))? {
        EngineQueryResult::Trace(view) => session.output.emit(&view, render_timeline),
        _ => Err(unexpected_result("trace")),
    }
}
