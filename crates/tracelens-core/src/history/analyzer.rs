//! Run history analyzer.
//!
//! Builds the per-stage run table for one source and infers which downstream
//! stages were skipped because the gating stage judged the content low-value.
//! Pure over the run list it is given.

use crate::history::topology::StageTopology;
use crate::model::{ContentContribution, GatingSignal, IoSlot, RunStatus, StageRunRecord};
use crate::truncate::{is_truncated, TruncationPolicy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Parameters of one history request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub source_id: i64,
    /// Restrict the table (and skip annotations) to one stage
    pub stage: Option<String>,
    /// Cap on the rows shown; gating and skip inference still read every run
    pub limit: Option<usize>,
}

/// A downstream stage that never ran because of the gating decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedStage {
    pub stage_name: String,
    pub content_contribution: ContentContribution,
    pub reason: String,
}

/// Per-stage roll-up of the run table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSummary {
    pub stage_name: String,
    pub attempts: usize,
    pub latest_run_id: i64,
    pub latest_status: RunStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHistory {
    pub source_id: i64,
    pub stage_filter: Option<String>,
    pub runs: Vec<StageRunRecord>,
    pub gating: GatingSignal,
    /// Run the gating signal was read from
    pub gating_run_id: Option<i64>,
    pub skipped: Vec<SkippedStage>,
    pub stages: Vec<StageSummary>,
}

/// Most recent run of `stage`: greatest `created_at`, earliest in the list on ties.
pub fn latest_run_of<'a>(runs: &'a [StageRunRecord], stage: &str) -> Option<&'a StageRunRecord> {
    runs.iter()
        .filter(|r| r.stage_name == stage)
        .fold(None, |best: Option<&StageRunRecord>, run| match best {
            Some(b) if run.created_at <= b.created_at => Some(b),
            _ => Some(run),
        })
}

/// Runs of one stage, newest first. Equal timestamps keep list order.
pub fn runs_for_stage<'a>(runs: &'a [StageRunRecord], stage: &str) -> Vec<&'a StageRunRecord> {
    let mut matching: Vec<&StageRunRecord> =
        runs.iter().filter(|r| r.stage_name == stage).collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matching
}

/// Read the gating decision from a gating-stage run's parsed payload.
///
/// Best effort: a missing payload, invalid JSON, a non-object root or a
/// non-string field all degrade to an empty signal.
pub fn extract_gating_signal(run: &StageRunRecord) -> GatingSignal {
    let Some(parsed) = run.payload(IoSlot::Parsed) else {
        return GatingSignal::default();
    };
    let value: Value = match serde_json::from_str(parsed) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(
                run_id = run.run_id,
                stage = run.stage_name.as_str(),
                error = %e,
                "gating payload is not valid JSON; ignoring"
            );
            return GatingSignal::default();
        }
    };
    let Some(obj) = value.as_object() else {
        return GatingSignal::default();
    };

    GatingSignal {
        content_contribution: obj
            .get("content_contribution")
            .and_then(Value::as_str)
            .map(ContentContribution::from_label)
            .unwrap_or_default(),
        reason: obj
            .get("contribution_reason")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Downstream stages absent from `runs`, when the signal gates.
///
/// Absence of a stage is only treated as a skip when the decision was NONE or
/// LOW; otherwise nothing is inferred.
pub fn infer_skipped_stages(
    runs: &[StageRunRecord],
    signal: &GatingSignal,
    topology: &dyn StageTopology,
) -> Vec<SkippedStage> {
    if !signal.content_contribution.gates_downstream() {
        return Vec::new();
    }
    let ran: BTreeSet<&str> = runs.iter().map(|r| r.stage_name.as_str()).collect();
    topology
        .downstream_stages()
        .iter()
        .filter(|stage| !ran.contains(stage.as_str()))
        .map(|stage| SkippedStage {
            stage_name: stage.clone(),
            content_contribution: signal.content_contribution,
            reason: signal.reason.clone(),
        })
        .collect()
}

/// Per-stage attempt counts and latest status, in first-seen order.
pub fn summarize_stages(runs: &[StageRunRecord]) -> Vec<StageSummary> {
    let mut order: Vec<&str> = Vec::new();
    for run in runs {
        if !order.contains(&run.stage_name.as_str()) {
            order.push(&run.stage_name);
        }
    }
    order
        .into_iter()
        .filter_map(|stage| {
            let latest = latest_run_of(runs, stage)?;
            Some(StageSummary {
                stage_name: stage.to_string(),
                attempts: runs.iter().filter(|r| r.stage_name == stage).count(),
                latest_run_id: latest.run_id,
                latest_status: latest.status,
            })
        })
        .collect()
}

/// Build the run table and gating annotations for one source.
pub fn analyze_history(
    runs: &[StageRunRecord],
    query: &HistoryQuery,
    topology: &dyn StageTopology,
) -> RunHistory {
    let gating_run = latest_run_of(runs, topology.gating_stage());
    let gating = gating_run.map(extract_gating_signal).unwrap_or_default();

    let mut skipped = infer_skipped_stages(runs, &gating, topology);
    let mut table: Vec<StageRunRecord> = match &query.stage {
        Some(stage) => {
            skipped.retain(|s| &s.stage_name == stage);
            runs.iter()
                .filter(|r| &r.stage_name == stage)
                .cloned()
                .collect()
        }
        None => runs.to_vec(),
    };
    if let Some(limit) = query.limit {
        table.truncate(limit);
    }

    RunHistory {
        source_id: query.source_id,
        stage_filter: query.stage.clone(),
        stages: summarize_stages(&table),
        runs: table,
        gating,
        gating_run_id: gating_run.map(|r| r.run_id),
        skipped,
    }
}

/// One payload slot prepared for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    pub slot: IoSlot,
    pub content: Option<String>,
    /// Full length in characters before truncation
    pub chars: usize,
    pub truncated: bool,
}

/// A run's IO bounded by a truncation policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIoView {
    pub run_id: i64,
    pub stage_name: String,
    pub slots: Vec<SlotView>,
}

pub fn run_io_view(run: &StageRunRecord, policy: &TruncationPolicy) -> RunIoView {
    let slots = IoSlot::ALL
        .into_iter()
        .map(|slot| match run.payload(slot) {
            Some(text) => {
                let shown = policy.apply(text).into_owned();
                let truncated = shown.len() != text.len() && is_truncated(&shown, policy.limit);
                SlotView {
                    slot,
                    chars: text.chars().count(),
                    content: Some(shown),
                    truncated,
                }
            }
            None => SlotView {
                slot,
                content: None,
                chars: 0,
                truncated: false,
            },
        })
        .collect();
    RunIoView {
        run_id: run.run_id,
        stage_name: run.stage_name.clone(),
        slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::StageRegistry;
    use crate::model::IoSnapshot;
    use crate::truncate::TruncateMode;
    use chrono::{TimeZone, Utc};

    fn run(run_id: i64, stage: &str, minute: u32) -> StageRunRecord {
        StageRunRecord {
            run_id,
            stage_name: stage.to_string(),
            status: RunStatus::Completed,
            model_id: None,
            prompt_version: None,
            duration_ms: Some(10),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, minute, 0).unwrap(),
            io: None,
        }
    }

    fn triage(run_id: i64, minute: u32, parsed: &str) -> StageRunRecord {
        let mut r = run(run_id, "triage", minute);
        r.io = Some(IoSnapshot {
            input: None,
            output: None,
            parsed: Some(parsed.to_string()),
        });
        r
    }

    #[test]
    fn test_latest_run_prefers_newest_then_list_order() {
        let runs = vec![run(1, "analyze", 1), run(2, "analyze", 3), run(3, "analyze", 3)];
        assert_eq!(latest_run_of(&runs, "analyze").map(|r| r.run_id), Some(2));
        assert!(latest_run_of(&runs, "triage").is_none());
    }

    #[test]
    fn test_malformed_gating_payload_is_empty_signal() {
        for payload in ["not json", "[1,2]", r#"{"content_contribution": 3}"#] {
            let signal = extract_gating_signal(&triage(1, 0, payload));
            assert_eq!(signal.content_contribution, ContentContribution::Unspecified);
            assert!(signal.reason.is_empty());
        }
    }

    #[test]
    fn test_low_contribution_only_reports_missing_stages() {
        let runs = vec![
            triage(1, 0, r#"{"content_contribution":"LOW","contribution_reason":"thin"}"#),
            run(2, "extract_ner", 1),
        ];
        let history = analyze_history(&runs, &HistoryQuery::default(), &StageRegistry::default());
        let skipped: Vec<&str> = history.skipped.iter().map(|s| s.stage_name.as_str()).collect();
        assert_eq!(skipped, ["extract_assertions", "analyze", "embeddings"]);
        assert!(history.skipped.iter().all(|s| s.reason == "thin"));
        assert_eq!(history.gating_run_id, Some(1));
    }

    #[test]
    fn test_medium_contribution_infers_nothing() {
        let runs = vec![triage(1, 0, r#"{"content_contribution":"MEDIUM"}"#)];
        let history = analyze_history(&runs, &HistoryQuery::default(), &StageRegistry::default());
        assert!(history.skipped.is_empty());
        assert_eq!(history.gating.content_contribution, ContentContribution::Medium);
    }

    #[test]
    fn test_most_recent_triage_wins() {
        let runs = vec![
            triage(1, 0, r#"{"content_contribution":"NONE","contribution_reason":"old"}"#),
            triage(2, 5, r#"{"content_contribution":"HIGH"}"#),
        ];
        let history = analyze_history(&runs, &HistoryQuery::default(), &StageRegistry::default());
        assert!(history.skipped.is_empty());
        assert_eq!(history.gating_run_id, Some(2));
    }

    #[test]
    fn test_stage_filter_limits_table_but_not_gating() {
        let runs = vec![
            triage(1, 0, r#"{"content_contribution":"NONE","contribution_reason":"dup"}"#),
            run(2, "fetch", 1),
        ];
        let query = HistoryQuery {
            source_id: 9,
            stage: Some("analyze".to_string()),
            limit: None,
        };
        let history = analyze_history(&runs, &query, &StageRegistry::default());
        assert!(history.runs.is_empty());
        assert_eq!(history.skipped.len(), 1);
        assert_eq!(history.skipped[0].stage_name, "analyze");
        assert_eq!(history.gating.reason, "dup");
    }

    #[test]
    fn test_limit_caps_table_but_not_gating() {
        let runs = vec![
            run(2, "fetch", 1),
            run(3, "extract_ner", 2),
            triage(1, 0, r#"{"content_contribution":"LOW","contribution_reason":"thin"}"#),
        ];
        let query = HistoryQuery {
            limit: Some(1),
            ..HistoryQuery::default()
        };
        let history = analyze_history(&runs, &query, &StageRegistry::default());
        assert_eq!(history.runs.len(), 1);
        assert_eq!(history.runs[0].run_id, 2);
        assert_eq!(history.gating_run_id, Some(1));
        let skipped: Vec<&str> = history.skipped.iter().map(|s| s.stage_name.as_str()).collect();
        assert_eq!(skipped, ["extract_assertions", "analyze", "embeddings"]);
    }

    #[test]
    fn test_stage_summaries() {
        let mut failed = run(1, "analyze", 0);
        failed.status = RunStatus::Superseded;
        let runs = vec![failed, run(2, "fetch", 1), run(3, "analyze", 2)];
        let stages = summarize_stages(&runs);
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].stage_name, "analyze");
        assert_eq!(stages[0].attempts, 2);
        assert_eq!(stages[0].latest_run_id, 3);
        assert_eq!(stages[0].latest_status, RunStatus::Completed);
    }

    #[test]
    fn test_run_io_view_truncates_long_payloads() {
        let mut r = run(1, "analyze", 0);
        r.io = Some(IoSnapshot {
            input: Some("abcdefghij".to_string()),
            output: Some("ok".to_string()),
            parsed: None,
        });
        let view = run_io_view(&r, &TruncationPolicy::new(4, TruncateMode::Truncate));
        assert_eq!(view.slots.len(), 3);
        assert!(view.slots[0].truncated);
        assert_eq!(view.slots[0].chars, 10);
        assert!(!view.slots[1].truncated);
        assert_eq!(view.slots[2].content, None);

        let full = run_io_view(&r, &TruncationPolicy::new(4, TruncateMode::Full));
        assert_eq!(full.slots[0].content.as_deref(), Some("abcdefghij"));
    }
}
