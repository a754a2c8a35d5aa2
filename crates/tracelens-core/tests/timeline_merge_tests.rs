//! Timeline merge tests: scenario, sortedness and conservation.

mod common;

use common::{at, observation, pipeline_event, trace_event};
use proptest::prelude::*;
use tracelens_core::model::{EventSource, Severity};
use tracelens_core::normalize::{normalize_observations, normalize_pipeline_events};
use tracelens_core::timeline::{is_chronological, merge_timelines};

#[test]
fn test_merge_scenario_fetch_embed_parse() {
    let pipeline = normalize_pipeline_events(&[
        pipeline_event("FETCH", "completed", at(0, 0)),
        pipeline_event("PARSE", "completed", at(0, 2)),
    ]);
    let telemetry = normalize_observations(&[observation("embed", at(0, 1))]);

    let merged = merge_timelines([pipeline, telemetry]);

    let order: Vec<(&str, EventSource)> = merged
        .iter()
        .map(|e| (e.label.as_str(), e.source))
        .collect();
    assert_eq!(
        order,
        [
            ("FETCH", EventSource::Pipeline),
            ("GENERATION", EventSource::Telemetry),
            ("PARSE", EventSource::Pipeline),
        ]
    );
    assert_eq!(merged[1].message, "embed");
    assert_eq!(merged[0].timestamp, at(0, 0));
    assert_eq!(merged[2].timestamp, at(0, 2));
    assert!(merged.iter().all(|e| e.severity == Severity::Ok));
}

#[test]
fn test_one_source_empty() {
    let pipeline = normalize_pipeline_events(&[pipeline_event("FETCH", "started", at(0, 0))]);
    let merged = merge_timelines([pipeline.clone(), Vec::new()]);
    assert_eq!(merged, pipeline);
}

/// Per source, a list of second offsets; events are labelled `s{source}-{index}`.
fn sources_strategy() -> impl Strategy<Value = Vec<Vec<u32>>> {
    prop::collection::vec(prop::collection::vec(0u32..30, 0..12), 0..5)
}

fn build(sources: &[Vec<u32>]) -> Vec<Vec<tracelens_core::TraceEvent>> {
    sources
        .iter()
        .enumerate()
        .map(|(s, secs)| {
            secs.iter()
                .enumerate()
                .map(|(i, sec)| {
                    let source = if s % 2 == 0 {
                        EventSource::Pipeline
                    } else {
                        EventSource::Telemetry
                    };
                    trace_event(source, &format!("s{}-{}", s, i), at(0, *sec))
                })
                .collect()
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_merged_is_sorted(sources in sources_strategy()) {
        let merged = merge_timelines(build(&sources));
        prop_assert!(is_chronological(&merged));
    }

    #[test]
    fn prop_merge_conserves_events(sources in sources_strategy()) {
        let inputs = build(&sources);
        let expected_len: usize = inputs.iter().map(Vec::len).sum();
        let mut expected: Vec<String> = inputs.iter().flatten().map(|e| e.label.clone()).collect();

        let merged = merge_timelines(inputs);
        prop_assert_eq!(merged.len(), expected_len);

        let mut actual: Vec<String> = merged.iter().map(|e| e.label.clone()).collect();
        expected.sort();
        actual.sort();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_ties_keep_append_order(sources in sources_strategy()) {
        let inputs = build(&sources);
        let append_order: Vec<String> = inputs.iter().flatten().map(|e| e.label.clone()).collect();
        let position = |label: &str| append_order.iter().position(|l| l == label);

        let merged = merge_timelines(inputs);
        for pair in merged.windows(2) {
            if pair[0].timestamp == pair[1].timestamp {
                prop_assert!(position(&pair[0].label) < position(&pair[1].label));
            }
        }
    }
}
