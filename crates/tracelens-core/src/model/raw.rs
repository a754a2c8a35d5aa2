//! Wire shapes of the collaborator services' responses.
//!
//! Optional fields default to absent so partially populated records from
//! either service still deserialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A pipeline-stage lifecycle event for one content id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPipelineEvent {
    pub stage: String,
    /// Lifecycle verb, e.g. `started`, `completed`, `failed`
    pub action: String,
    #[serde(default)]
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    /// Free-form detail map; values are arbitrary JSON
    #[serde(default)]
    pub details: BTreeMap<String, serde_json::Value>,
}

/// One AI-observation (span, generation, event) reported by telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub input_tokens: Option<u64>,
    #[serde(default)]
    pub output_tokens: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A named telemetry trace grouping observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTrace {
    pub id: String,
    pub name: String,
    /// "View this trace" link in the telemetry provider's UI
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub observations: Vec<RawObservation>,
}
