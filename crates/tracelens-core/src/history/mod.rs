//! Per-source stage run history and gating inference.
//!
//! ```ignore
//! use tracelens_core::history::{analyze_history, HistoryQuery, StageRegistry};
//!
//! let query = HistoryQuery { source_id, ..HistoryQuery::default() };
//! let history = analyze_history(&runs, &query, &StageRegistry::default());
//! for skipped in &history.skipped {
//!     println!("{} skipped: {}", skipped.stage_name, skipped.reason);
//! }
//! ```

pub mod analyzer;
pub mod topology;

pub use analyzer::{
    analyze_history, extract_gating_signal, infer_skipped_stages, latest_run_of, run_io_view,
    runs_for_stage, summarize_stages, HistoryQuery, RunHistory, RunIoView, SkippedStage,
    SlotView, StageSummary,
};
pub use topology::{StageRegistry, StageTopology};
