//! Historical stage executions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of one stage run. Never mutated after creation; a retry
/// produces a new record and marks the older one `Superseded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    Superseded,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Superseded => "superseded",
        }
    }
}

/// Recorded payloads of a run. Each slot is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoSnapshot {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub parsed: Option<String>,
}

impl IoSnapshot {
    pub fn slot(&self, slot: IoSlot) -> Option<&str> {
        match slot {
            IoSlot::Input => self.input.as_deref(),
            IoSlot::Output => self.output.as_deref(),
            IoSlot::Parsed => self.parsed.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none() && self.parsed.is_none()
    }
}

/// Names one of the three payload slots of an [`IoSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IoSlot {
    Input,
    Output,
    Parsed,
}

impl IoSlot {
    pub const ALL: [IoSlot; 3] = [IoSlot::Input, IoSlot::Output, IoSlot::Parsed];

    pub fn as_str(&self) -> &'static str {
        match self {
            IoSlot::Input => "input",
            IoSlot::Output => "output",
            IoSlot::Parsed => "parsed",
        }
    }
}

/// One historical execution of one stage for one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRunRecord {
    pub run_id: i64,
    pub stage_name: String,
    pub status: RunStatus,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub prompt_version: Option<i32>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub io: Option<IoSnapshot>,
}

impl StageRunRecord {
    /// Payload of one slot, if the run recorded IO and that slot is present
    pub fn payload(&self, slot: IoSlot) -> Option<&str> {
        self.io.as_ref().and_then(|io| io.slot(slot))
    }
}
