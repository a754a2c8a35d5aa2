//! Trace collection with partial-source degradation.
//!
//! Each requested source is fetched independently. A failed fetch is logged,
//! recorded in the view's source reports and warnings, and the merge carries
//! on with whatever the other source returned.

use tracelens_core::errors::TraceLensError;
use tracelens_core::model::{EventSource, TraceEvent};
use tracelens_core::normalize::{normalize_pipeline_events, normalize_traces};
use tracelens_core::timeline::{merge_timelines, SourceReport, TraceView};
use tracelens_core::{Result, TruncationPolicy};
use tracelens_core_types::schema::EVENT_SOURCE_DEGRADED;

use crate::commands::requests::TraceRequest;
use crate::service::PipelineService;

const SOURCES: [EventSource; 2] = [EventSource::Pipeline, EventSource::Telemetry];

fn fetch_source(
    service: &dyn PipelineService,
    source: EventSource,
    req: &TraceRequest,
) -> Result<Vec<TraceEvent>> {
    match source {
        EventSource::Pipeline => {
            let raw = service.pipeline_events(&req.content_id)?;
            Ok(normalize_pipeline_events(&raw))
        }
        EventSource::Telemetry => {
            let traces = service.traces(&req.content_id)?;
            Ok(normalize_traces(&traces, req.environment.as_deref()))
        }
    }
}

fn preview(event: &mut TraceEvent, policy: &TruncationPolicy) {
    event.message = policy.apply(&event.message).into_owned();
    if let Some(error) = &event.error {
        event.error = Some(policy.apply(error).into_owned());
    }
}

/// Fetch, normalize and merge the requested sources into one view.
///
/// # Errors
///
/// `NoTraceData` when the merged timeline is empty, whether because every
/// source failed or because none recorded anything for the content id.
pub fn collect_trace(
    service: &dyn PipelineService,
    req: &TraceRequest,
    policy: &TruncationPolicy,
) -> Result<TraceView> {
    let mut lists = Vec::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    for source in SOURCES.into_iter().filter(|s| req.sources.includes(*s)) {
        match fetch_source(service, source, req) {
            Ok(events) => {
                sources.push(SourceReport {
                    source,
                    event_count: events.len(),
                    error: None,
                });
                lists.push(events);
            }
            Err(err) => {
                tracing::warn!(
                    component = module_path!(),
                    op = "trace",
                    event = EVENT_SOURCE_DEGRADED,
                    content_id = %req.content_id,
                    source = source.as_str(),
                    error = %err,
                    "source unavailable, continuing without it"
                );
                warnings.push(format!("{} unavailable: {}", source.as_str(), err));
                sources.push(SourceReport {
                    source,
                    event_count: 0,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    let mut events = merge_timelines(lists);
    if events.is_empty() {
        return Err(TraceLensError::NoTraceData {
            content_id: req.content_id.clone(),
        });
    }
    for event in &mut events {
        preview(event, policy);
    }

    Ok(TraceView {
        content_id: req.content_id.clone(),
        events,
        sources,
        warnings,
    })
}
