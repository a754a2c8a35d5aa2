//! Canonical timeline event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Which stream an event was normalized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Pipeline,
    Telemetry,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Pipeline => "pipeline",
            EventSource::Telemetry => "telemetry",
        }
    }
}

/// Display classification of an event.
///
/// Labels, colours and symbols live in one table (see
/// [`crate::render::style`]); serialization uses the table's label so the JSON
/// encoding and the terminal view can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Ok,
    Warning,
    Error,
    Neutral,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Ok,
        Severity::Warning,
        Severity::Error,
        Severity::Neutral,
    ];

    pub fn label(&self) -> &'static str {
        self.style().label
    }

    /// Inverse of [`Severity::label`]
    pub fn from_label(label: &str) -> Option<Severity> {
        Severity::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Severity::from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown severity '{}'", label)))
    }
}

/// One entry of the merged timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub timestamp: DateTime<Utc>,
    pub source: EventSource,
    /// Stage name for pipeline events, observation type for telemetry
    pub label: String,
    pub message: String,
    pub duration_ms: Option<i64>,
    pub severity: Severity,
    pub details: BTreeMap<String, String>,
    pub error: Option<String>,
}
