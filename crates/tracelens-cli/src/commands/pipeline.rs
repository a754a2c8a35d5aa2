//! `tracelens pipeline history|inspect|diff`
//!
//! Per-source stage run history, IO inspection and run-to-run diffs.

use clap::{Args, Subcommand, ValueEnum};
use tracelens_core::diff::model::{DiffStrategy, RunDiff};
use tracelens_core::diff::render_run_diff_summary;
use tracelens_core::errors::ExError;
use tracelens_core::model::IoSlot;
use tracelens_core::render::{render_history, render_run_diff, render_run_io, RenderOptions};
use tracelens_core::TruncateMode;
use tracelens_engine::commands::engine_query::InspectResult;
use tracelens_engine::commands::requests::{DiffRequest, HistoryRequest, InspectRequest};
use tracelens_engine::{EngineQuery, EngineQueryResult};

use crate::commands::{unexpected_result, Session};

#[derive(Debug, Args)]
pub struct PipelineArgs {
    #[command(subcommand)]
    pub command: PipelineCommand,
}

#[derive(Debug, Subcommand)]
pub enum PipelineCommand {
    /// Stage run table with gating annotations
    History(HistoryArgs),
    /// Run table plus each run's recorded input/output/parsed payloads
    Inspect(InspectArgs),
    /// Compare the recorded payloads of two runs
    Diff(DiffArgs),
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Numeric source id
    pub source_id: i64,

    /// Only show runs of this stage
    #[arg(long)]
    pub stage: Option<String>,

    /// Maximum number of runs to fetch
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Numeric source id
    pub source_id: i64,

    /// Only show runs of this stage
    #[arg(long)]
    pub stage: Option<String>,

    /// Diff the two most recent runs of --stage
    #[arg(long, requires = "stage")]
    pub diff: bool,

    /// Show payloads in full
    #[arg(long)]
    pub no_truncate: bool,

    /// Line comparison strategy: positional or lcs
    #[arg(long, default_value = "positional")]
    pub diff_strategy: DiffStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SlotArg {
    Input,
    Output,
    Parsed,
    All,
}

impl SlotArg {
    fn slots(self) -> Vec<IoSlot> {
        match self {
            SlotArg::Input => vec![IoSlot::Input],
            SlotArg::Output => vec![IoSlot::Output],
            SlotArg::Parsed => vec![IoSlot::Parsed],
            SlotArg::All => IoSlot::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Numeric source id both runs belong to
    pub source_id: i64,

    /// Older run id
    pub run_a: i64,

    /// Newer run id
    pub run_b: i64,

    /// Which payload slot to compare
    #[arg(long, value_enum, default_value = "all")]
    pub slot: SlotArg,

    /// Line comparison strategy: positional or lcs
    #[arg(long, default_value = "positional")]
    pub diff_strategy: DiffStrategy,
}

pub fn execute(args: PipelineArgs, session: Session) -> Result<(), ExError> {
    match args.command {
        PipelineCommand::History(a) => execute_history(a, &session),
        PipelineCommand::Inspect(a) => execute_inspect(a, &session),
        PipelineCommand::Diff(a) => execute_diff(a, &session),
    }
}

fn execute_history(args: HistoryArgs, session: &Session) -> Result<(), ExError> {
    let request = HistoryRequest {
        source_id: args.source_id,
        stage: args.stage,
        limit: args.limit,
    };
    match session.query("pipeline.history", EngineQuery::History(request))? {
        EngineQueryResult::History(history) => session.output.emit(&history, render_history),
        _ => Err(unexpected_result("pipeline_history")),
    }
}

fn render_inspect(result: &InspectResult, opts: RenderOptions) -> String {
    let mut out = render_history(&result.history, opts);
    for view in &result.io {
        out.push('\n');
        out.push_str(&render_run_io(view, opts));
    }
    if let Some(diff) = &result.diff {
        out.push('\n');
        out.push_str(&render_run_diff_summary(diff));
    }
    out
}

fn execute_inspect(args: InspectArgs, session: &Session) -> Result<(), ExError> {
    let request = InspectRequest {
        source_id: args.source_id,
        stage: args.stage,
        diff: args.diff,
        truncate: TruncateMode::from_no_truncate(args.no_truncate),
        strategy: args.diff_strategy,
    };
    match session.query("pipeline.inspect", EngineQuery::Inspect(request))? {
        EngineQueryResult::Inspect(result) => session.output.emit(result.as_ref(), render_inspect),
        _ => Err(unexpected_result("pipeline_inspect")),
    }
}

fn render_diff(diff: &RunDiff, opts: RenderOptions) -> String {
    match diff {
        RunDiff::Computed(_) => {
            let mut out = render_run_diff_summary(diff);
            out.push('\n');
            out.push_str(&render_run_diff(diff, opts));
            out
        }
        RunDiff::Precomputed(_) => render_run_diff(diff, opts),
    }
}

fn execute_diff(args: DiffArgs, session: &Session) -> Result<(), ExError> {
    let request = DiffRequest {
        source_id: args.source_id,
        run_a: args.run_a,
        run_b: args.run_b,
        slots: args.slot.slots(),
        strategy: args.diff_strategy,
    };
    match session.query("pipeline.diff", EngineQuery::RunDiff(request))? {
        EngineQueryResult::RunDiff(diff) => session.output.emit(&diff, render_diff),
        _ => Err(unexpected_result("pipeline_diff")),
    }
}
