//! Event normalizer.
//!
//! Converts pipeline-stage lifecycle events and telemetry observations into
//! the canonical [`TraceEvent`] shape. Nothing here fails: malformed optional
//! values degrade to "absent" or to their raw JSON text.

use crate::model::{EventSource, RawObservation, RawPipelineEvent, RawTrace, Severity, TraceEvent};
use serde_json::Value;
use std::collections::BTreeMap;

/// Classify a pipeline lifecycle action.
pub fn pipeline_severity(action: &str) -> Severity {
    match action {
        "failed" => Severity::Error,
        "completed" | "complete" => Severity::Ok,
        _ => Severity::Neutral,
    }
}

/// Classify an observation status as reported by the telemetry provider.
pub fn observation_severity(status: &str) -> Severity {
    match status {
        "ERROR" => Severity::Error,
        "COMPLETED" => Severity::Ok,
        _ => Severity::Neutral,
    }
}

/// Format a count with thousands separators (`12345` -> `12,345`).
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Total tokens of an observation, absent when neither count was reported.
fn total_tokens(obs: &RawObservation) -> Option<u64> {
    match (obs.input_tokens, obs.output_tokens) {
        (None, None) => None,
        (input, output) => Some(input.unwrap_or(0) + output.unwrap_or(0)),
    }
}

/// `name [model] [N tokens]`
pub fn observation_message(obs: &RawObservation) -> String {
    let mut message = obs.name.clone();
    if let Some(model) = obs.model.as_deref().filter(|m| !m.is_empty()) {
        message.push(' ');
        message.push_str(model);
    }
    if let Some(tokens) = total_tokens(obs) {
        message.push(' ');
        message.push_str(&format_count(tokens));
        message.push_str(" tokens");
    }
    message
}

/// Render a detail value for display. Strings pass through unquoted; any
/// other JSON value is kept as its raw JSON text.
fn detail_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalize one pipeline-stage event.
pub fn normalize_pipeline_event(raw: &RawPipelineEvent) -> TraceEvent {
    let details: BTreeMap<String, String> = raw
        .details
        .iter()
        .map(|(k, v)| (k.clone(), detail_to_string(v)))
        .collect();

    let severity = pipeline_severity(&raw.action);
    let error = match severity {
        Severity::Error => details.get("error").cloned(),
        _ => None,
    };

    let message = if raw.message.is_empty() {
        raw.action.clone()
    } else {
        raw.message.clone()
    };

    TraceEvent {
        timestamp: raw.timestamp,
        source: EventSource::Pipeline,
        label: raw.stage.clone(),
        message,
        duration_ms: raw.duration_ms,
        severity,
        details,
        error,
    }
}

/// Normalize one telemetry observation.
pub fn normalize_observation(obs: &RawObservation) -> TraceEvent {
    let mut details = BTreeMap::new();
    details.insert("type".to_string(), obs.kind.clone());
    if let Some(id) = &obs.id {
        details.insert("observation_id".to_string(), id.clone());
    }
    if let Some(model) = &obs.model {
        details.insert("model".to_string(), model.clone());
    }
    if let Some(n) = obs.input_tokens {
        details.insert("input_tokens".to_string(), n.to_string());
    }
    if let Some(n) = obs.output_tokens {
        details.insert("output_tokens".to_string(), n.to_string());
    }

    TraceEvent {
        timestamp: obs.start_time,
        source: EventSource::Telemetry,
        label: obs.kind.clone(),
        message: observation_message(obs),
        duration_ms: obs
            .end_time
            .map(|end| (end - obs.start_time).num_milliseconds()),
        severity: observation_severity(&obs.status),
        details,
        error: obs.error.clone().filter(|e| !e.is_empty()),
    }
}

pub fn normalize_pipeline_events(events: &[RawPipelineEvent]) -> Vec<TraceEvent> {
    events.iter().map(normalize_pipeline_event).collect()
}

pub fn normalize_observations(observations: &[RawObservation]) -> Vec<TraceEvent> {
    observations.iter().map(normalize_observation).collect()
}

/// Flatten named traces into events, tagging each with its trace.
///
/// With an environment filter, only traces whose environment matches
/// (case-insensitively) contribute; traces with no recorded environment are
/// excluded in that case.
pub fn normalize_traces(traces: &[RawTrace], environment: Option<&str>) -> Vec<TraceEvent> {
    traces
        .iter()
        .filter(|trace| match environment {
            None => true,
            Some(env) => trace
                .environment
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(env)),
        })
        .flat_map(|trace| {
            trace.observations.iter().map(move |obs| {
                let mut event = normalize_observation(obs);
                event.details.insert("trace".to_string(), trace.name.clone());
                event.details.insert("trace_id".to_string(), trace.id.clone());
                if let Some(url) = &trace.url {
                    event.details.insert("trace_url".to_string(), url.clone());
                }
                event
            })
        })
        .collect()
}
