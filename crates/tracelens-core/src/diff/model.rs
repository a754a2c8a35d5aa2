//! Run snapshot diff output types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq` and
//! form the stable `--json` encoding of a diff.

use crate::model::{IoSlot, RunStatus, StageRunRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version of [`RunSnapshotDiff`].
pub const DIFF_SCHEMA_VERSION: u32 = 1;

/// Line comparison strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStrategy {
    /// Lockstep comparison by line index
    #[default]
    Positional,
    /// Longest-common-subsequence alignment
    Lcs,
}

impl std::str::FromStr for DiffStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positional" => Ok(DiffStrategy::Positional),
            "lcs" => Ok(DiffStrategy::Lcs),
            other => Err(format!("unknown diff strategy '{}'", other)),
        }
    }
}

/// Classification of one line.
///
/// `index` is the line position the change is reported at: for the
/// positional strategy the shared position; for LCS the index in A for
/// `Unchanged`/`Removed` and the index in B for `Added`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineChange {
    Unchanged { index: usize, line: String },
    Added { index: usize, line: String },
    Removed { index: usize, line: String },
    Changed { index: usize, old: String, new: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffCounts {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
    pub unchanged: usize,
}

impl DiffCounts {
    pub fn tally(changes: &[LineChange]) -> Self {
        let mut counts = DiffCounts::default();
        for change in changes {
            match change {
                LineChange::Unchanged { .. } => counts.unchanged += 1,
                LineChange::Added { .. } => counts.added += 1,
                LineChange::Removed { .. } => counts.removed += 1,
                LineChange::Changed { .. } => counts.changed += 1,
            }
        }
        counts
    }

    pub fn is_identical(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.changed == 0
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        if self.is_identical() {
            return format!("identical ({} lines)", self.unchanged);
        }
        format!(
            "{} added, {} removed, {} changed, {} unchanged",
            self.added, self.removed, self.changed, self.unchanged
        )
    }
}

/// Line-level diff of two payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiff {
    pub strategy: DiffStrategy,
    pub changes: Vec<LineChange>,
    pub counts: DiffCounts,
    pub summary: String,
}

/// Which side of a comparison holds a payload for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPresence {
    Both,
    OnlyInA,
    OnlyInB,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDiff {
    pub slot: IoSlot,
    pub presence: SlotPresence,
    /// sha256 of A's payload, hex-encoded
    pub a_digest: Option<String>,
    pub b_digest: Option<String>,
    pub identical: bool,
    pub diff: Option<LineDiff>,
    pub summary: String,
}

/// Identity of one side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRef {
    pub run_id: i64,
    pub stage_name: String,
    pub status: RunStatus,
    pub model_id: Option<String>,
    pub prompt_version: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<&StageRunRecord> for RunRef {
    fn from(run: &StageRunRecord) -> Self {
        Self {
            run_id: run.run_id,
            stage_name: run.stage_name.clone(),
            status: run.status,
            model_id: run.model_id.clone(),
            prompt_version: run.prompt_version,
            created_at: run.created_at,
        }
    }
}

/// Locally computed comparison of two runs of the same stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshotDiff {
    pub diff_schema_version: u32,
    pub run_a: RunRef,
    pub run_b: RunRef,
    pub model_changed: bool,
    pub prompt_version_changed: bool,
    pub slots: Vec<SlotDiff>,
    pub summary: String,
}

/// Diff already computed by the pipeline service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerDiff {
    pub summary: String,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

/// Result of a diff request: computed here, or passed through from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum RunDiff {
    Computed(RunSnapshotDiff),
    Precomputed(ServerDiff),
}

impl RunDiff {
    pub fn summary(&self) -> &str {
        match self {
            RunDiff::Computed(d) => &d.summary,
            RunDiff::Precomputed(d) => &d.summary,
        }
    }
}
