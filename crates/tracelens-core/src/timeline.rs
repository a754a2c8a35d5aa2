//! Timeline merger.
//!
//! Concatenates per-source event lists in argument order and stable-sorts by
//! timestamp, so events with equal timestamps keep the order in which their
//! sources were appended. The output is a permutation of the inputs.

use crate::model::{EventSource, TraceEvent};
use serde::{Deserialize, Serialize};

/// Outcome of fetching one source for a trace request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: EventSource,
    pub event_count: usize,
    /// Set when the fetch failed and the source was left out of the merge
    pub error: Option<String>,
}

/// A merged timeline for one content id, with per-source provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceView {
    pub content_id: String,
    pub events: Vec<TraceEvent>,
    pub sources: Vec<SourceReport>,
    pub warnings: Vec<String>,
}

/// Merge any number of normalized event lists into one chronological list.
pub fn merge_timelines<I>(sources: I) -> Vec<TraceEvent>
where
    I: IntoIterator<Item = Vec<TraceEvent>>,
{
    let mut merged: Vec<TraceEvent> = sources.into_iter().flatten().collect();
    // slice::sort_by_key is stable
    merged.sort_by_key(|event| event.timestamp);
    merged
}

/// True when every adjacent pair is non-decreasing by timestamp.
pub fn is_chronological(events: &[TraceEvent]) -> bool {
    events
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp)
}
