//! Explicit parameter structs for each engine query.

use serde::{Deserialize, Serialize};
use tracelens_core::diff::model::DiffStrategy;
use tracelens_core::model::{EventSource, IoSlot};
use tracelens_core::TruncateMode;

/// Which event sources a trace request fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFilter {
    Pipeline,
    Telemetry,
    #[default]
    All,
}

impl SourceFilter {
    pub fn includes(&self, source: EventSource) -> bool {
        matches!(
            (self, source),
            (SourceFilter::All, _)
                | (SourceFilter::Pipeline, EventSource::Pipeline)
                | (SourceFilter::Telemetry, EventSource::Telemetry)
        )
    }
}

impl std::str::FromStr for SourceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pipeline" => Ok(SourceFilter::Pipeline),
            "telemetry" => Ok(SourceFilter::Telemetry),
            "all" => Ok(SourceFilter::All),
            other => Err(format!(
                "unknown source '{}' (expected pipeline, telemetry or all)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRequest {
    pub content_id: String,
    pub sources: SourceFilter,
    /// Only keep telemetry traces tagged with this environment
    pub environment: Option<String>,
    /// Applied to event messages and error text with the body-preview limit
    pub truncate: TruncateMode,
}

impl TraceRequest {
    pub fn new(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            sources: SourceFilter::All,
            environment: None,
            truncate: TruncateMode::Truncate,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryRequest {
    pub source_id: i64,
    pub stage: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectRequest {
    pub source_id: i64,
    pub stage: Option<String>,
    /// Also diff the two most recent runs of `stage`
    pub diff: bool,
    pub truncate: TruncateMode,
    pub strategy: DiffStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRequest {
    /// Source both runs belong to; used to fetch the run records when the
    /// service has no precomputed diff.
    pub source_id: i64,
    pub run_a: i64,
    pub run_b: i64,
    pub slots: Vec<IoSlot>,
    pub strategy: DiffStrategy,
}

impl DiffRequest {
    pub fn new(source_id: i64, run_a: i64, run_b: i64) -> Self {
        Self {
            source_id,
            run_a,
            run_b,
            slots: IoSlot::ALL.to_vec(),
            strategy: DiffStrategy::default(),
        }
    }

    /// True when every slot is requested. A server diff covers whole runs,
    /// so it only answers requests of this shape.
    pub fn covers_all_slots(&self) -> bool {
        IoSlot::ALL.iter().all(|slot| self.slots.contains(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_filter_includes() {
        assert!(SourceFilter::All.includes(EventSource::Telemetry));
        assert!(SourceFilter::Pipeline.includes(EventSource::Pipeline));
        assert!(!SourceFilter::Pipeline.includes(EventSource::Telemetry));
        assert!(!SourceFilter::Telemetry.includes(EventSource::Pipeline));
    }

    #[test]
    fn test_source_filter_parse() {
        assert_eq!("telemetry".parse::<SourceFilter>(), Ok(SourceFilter::Telemetry));
        assert!("langfuse".parse::<SourceFilter>().is_err());
    }

    #[test]
    fn test_diff_request_defaults_to_all_slots() {
        let req = DiffRequest::new(1, 10, 11);
        assert_eq!(req.slots, IoSlot::ALL.to_vec());
        assert_eq!(req.strategy, DiffStrategy::Positional);
        assert!(req.covers_all_slots());

        let narrowed = DiffRequest {
            slots: vec![IoSlot::Input],
            ..req
        };
        assert!(!narrowed.covers_all_slots());
    }
}
