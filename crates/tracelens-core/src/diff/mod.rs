//! Run snapshot differ.
//!
//! Compares the recorded input/output/parsed payloads of two runs of the
//! same stage to explain behavioural drift (after a prompt or model change).
//!
//! ## Entry point
//!
//! ```ignore
//! use tracelens_core::diff::{diff_runs, differ_for, DiffStrategy};
//!
//! let diff = diff_runs(&older, &newer, &IoSlot::ALL, differ_for(DiffStrategy::Positional))?;
//! let summary = tracelens_core::diff::render_human_summary(&diff);
//! ```
//!
//! ## Guarantees
//!
//! - **Identity**: a payload diffed against itself has no added, removed or
//!   changed lines under either strategy.
//! - **Positional default**: the default strategy compares by line index and
//!   does not realign after insertions; `DiffStrategy::Lcs` does.
//! - **Pass-through**: a diff supplied by the pipeline service is returned
//!   unmodified.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::{
    diff_runs, diff_slot, diff_text, differ_for, resolve_run_diff, select_diff_pair, Differ,
    LcsDiffer, PositionalDiffer,
};
pub use human_summary::{render_human_summary, render_run_diff_summary};
pub use model::{
    DiffCounts, DiffStrategy, LineChange, LineDiff, RunDiff, RunSnapshotDiff, ServerDiff,
    SlotDiff, SlotPresence,
};
