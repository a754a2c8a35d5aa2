//! Terminal renderer.
//!
//! Produces the operator-facing text views. Colour is opt-in per call so the
//! same output can be asserted on in tests and piped to files.

use crate::diff::model::{LineChange, RunDiff, RunSnapshotDiff};
use crate::history::{RunHistory, RunIoView};
use crate::model::{Severity, TraceEvent};
use crate::render::style::{paint, paint_severity, ANSI_BOLD, ANSI_DIM};
use crate::timeline::TraceView;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub color: bool,
}

/// `850ms`, `1.25s`, `2m 05s`
pub fn format_duration_ms(ms: i64) -> String {
    if ms < 1_000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1_000.0)
    } else {
        format!("{}m {:02}s", ms / 60_000, (ms % 60_000) / 1_000)
    }
}

fn render_event(out: &mut String, event: &TraceEvent, opts: RenderOptions) {
    let style = event.severity.style();
    let duration = event
        .duration_ms
        .map(|ms| format!(" ({})", format_duration_ms(ms)))
        .unwrap_or_default();
    out.push_str(&format!(
        "{}  {} {:<9} {:<20} {}{}\n",
        paint(&event.timestamp.format("%H:%M:%S%.3f").to_string(), ANSI_DIM, opts.color),
        paint(style.symbol, style.ansi, opts.color),
        event.source.as_str(),
        event.label,
        event.message,
        duration
    ));
    if let Some(error) = &event.error {
        out.push_str(&format!(
            "{:>14}{}\n",
            "",
            paint_severity(&format!("error: {}", error), Severity::Error, opts.color)
        ));
    }
}

/// Render a merged timeline, one event per line.
pub fn render_timeline(view: &TraceView, opts: RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(&paint(
        &format!("Trace for {}", view.content_id),
        ANSI_BOLD,
        opts.color,
    ));
    out.push('\n');

    let mut current_day = None;
    for event in &view.events {
        let day = event.timestamp.date_naive();
        if current_day != Some(day) {
            out.push_str(&format!("-- {} --\n", day));
            current_day = Some(day);
        }
        render_event(&mut out, event, opts);
    }

    let sources: Vec<String> = view
        .sources
        .iter()
        .map(|s| match &s.error {
            Some(_) => format!("{}: unavailable", s.source.as_str()),
            None => format!("{}: {}", s.source.as_str(), s.event_count),
        })
        .collect();
    out.push_str(&format!(
        "\n{} events ({})\n",
        view.events.len(),
        sources.join(", ")
    ));
    for warning in &view.warnings {
        out.push_str(&paint_severity(
            &format!("warning: {}", warning),
            Severity::Warning,
            opts.color,
        ));
        out.push('\n');
    }
    out
}

/// Render the run table plus gating annotations.
pub fn render_history(history: &RunHistory, opts: RenderOptions) -> String {
    let mut out = String::new();
    let title = match &history.stage_filter {
        Some(stage) => format!("Runs for source {} (stage {})", history.source_id, stage),
        None => format!("Runs for source {}", history.source_id),
    };
    out.push_str(&paint(&title, ANSI_BOLD, opts.color));
    out.push('\n');

    if history.runs.is_empty() {
        out.push_str("  (no runs recorded)\n");
    } else {
        out.push_str(&format!(
            "  {:>8}  {:<20} {:<11} {:<24} {:>6} {:>9}  {}\n",
            "RUN", "STAGE", "STATUS", "MODEL", "PROMPT", "DURATION", "CREATED"
        ));
        for run in &history.runs {
            let status = format!("{:<11}", run.status.as_str());
            out.push_str(&format!(
                "  {:>8}  {:<20} {} {:<24} {:>6} {:>9}  {}\n",
                run.run_id,
                run.stage_name,
                paint_severity(&status, run.status.severity(), opts.color),
                run.model_id.as_deref().unwrap_or("-"),
                run.prompt_version
                    .map(|v| format!("v{}", v))
                    .unwrap_or_else(|| "-".to_string()),
                run.duration_ms
                    .map(format_duration_ms)
                    .unwrap_or_else(|| "-".to_string()),
                run.created_at.format("%Y-%m-%d %H:%M:%S"),
            ));
        }
    }

    if !history.gating.is_empty() {
        out.push_str(&format!(
            "\nGating: content_contribution={}",
            history.gating.content_contribution.as_str()
        ));
        if !history.gating.reason.is_empty() {
            out.push_str(&format!(" ({})", history.gating.reason));
        }
        out.push('\n');
    }
    for skipped in &history.skipped {
        let line = format!(
            "  {} {} skipped by gating: {}",
            Severity::Warning.style().symbol,
            skipped.stage_name,
            if skipped.reason.is_empty() {
                skipped.content_contribution.as_str()
            } else {
                skipped.reason.as_str()
            }
        );
        out.push_str(&paint_severity(&line, Severity::Warning, opts.color));
        out.push('\n');
    }
    out
}

/// Render one run's payloads as already bounded by the truncation policy.
pub fn render_run_io(view: &RunIoView, opts: RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(&paint(
        &format!("Run {} ({})", view.run_id, view.stage_name),
        ANSI_BOLD,
        opts.color,
    ));
    out.push('\n');
    for slot in &view.slots {
        match &slot.content {
            Some(content) => {
                out.push_str(&format!("--- {} ({} chars) ---\n", slot.slot.as_str(), slot.chars));
                out.push_str(content);
                out.push('\n');
            }
            None => {
                out.push_str(&paint(
                    &format!("--- {} (not recorded) ---", slot.slot.as_str()),
                    ANSI_DIM,
                    opts.color,
                ));
                out.push('\n');
            }
        }
    }
    out
}

fn render_line_change(out: &mut String, change: &LineChange, opts: RenderOptions) {
    match change {
        LineChange::Unchanged { line, .. } => out.push_str(&format!("  {}\n", line)),
        LineChange::Added { line, .. } => {
            out.push_str(&paint_severity(&format!("+ {}", line), Severity::Ok, opts.color));
            out.push('\n');
        }
        LineChange::Removed { line, .. } => {
            out.push_str(&paint_severity(&format!("- {}", line), Severity::Error, opts.color));
            out.push('\n');
        }
        LineChange::Changed { old, new, .. } => {
            out.push_str(&paint_severity(&format!("- {}", old), Severity::Error, opts.color));
            out.push('\n');
            out.push_str(&paint_severity(&format!("+ {}", new), Severity::Ok, opts.color));
            out.push('\n');
        }
    }
}

fn render_computed(out: &mut String, diff: &RunSnapshotDiff, opts: RenderOptions) {
    out.push_str(&paint(
        &format!(
            "Diff {} run {} -> run {}",
            diff.run_a.stage_name, diff.run_a.run_id, diff.run_b.run_id
        ),
        ANSI_BOLD,
        opts.color,
    ));
    out.push('\n');
    for slot in &diff.slots {
        out.push_str(&format!("=== {}: {} ===\n", slot.slot.as_str(), slot.summary));
        if slot.identical {
            continue;
        }
        if let Some(line_diff) = &slot.diff {
            for change in &line_diff.changes {
                render_line_change(out, change, opts);
            }
        }
    }
    out.push_str(&diff.summary);
    out.push('\n');
}

/// Render a run diff; server-supplied payloads are printed as pretty JSON.
pub fn render_run_diff(diff: &RunDiff, opts: RenderOptions) -> String {
    let mut out = String::new();
    match diff {
        RunDiff::Computed(d) => render_computed(&mut out, d, opts),
        RunDiff::Precomputed(d) => {
            out.push_str(&paint(&d.summary, ANSI_BOLD, opts.color));
            out.push('\n');
            if let Some(payload) = &d.payload {
                let pretty =
                    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
                out.push_str(&pretty);
                out.push('\n');
            }
        }
    }
    out
}
