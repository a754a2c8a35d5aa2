//! Human-readable summary renderer for run diffs.

use crate::diff::model::{RunDiff, RunRef, RunSnapshotDiff, SlotPresence};

fn run_label(run: &RunRef) -> String {
    let mut label = format!("run {} ({})", run.run_id, run.created_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(model) = &run.model_id {
        label.push_str(&format!(", model {}", model));
    }
    if let Some(version) = run.prompt_version {
        label.push_str(&format!(", prompt v{}", version));
    }
    label
}

/// Render a plain-text summary of a [`RunSnapshotDiff`].
///
/// Informational only; the structured diff is the source of truth.
pub fn render_human_summary(diff: &RunSnapshotDiff) -> String {
    let mut out = String::new();

    out.push_str(&format!("Stage `{}`\n", diff.run_a.stage_name));
    out.push_str(&format!("  A: {}\n", run_label(&diff.run_a)));
    out.push_str(&format!("  B: {}\n", run_label(&diff.run_b)));

    let mut drift = Vec::new();
    if diff.model_changed {
        drift.push("model changed");
    }
    if diff.prompt_version_changed {
        drift.push("prompt version changed");
    }
    if !drift.is_empty() {
        out.push_str(&format!("  Drift: {}\n", drift.join(", ")));
    }
    out.push('\n');

    for slot in &diff.slots {
        let marker = match (slot.presence, slot.identical) {
            (SlotPresence::Absent, _) => "-",
            (SlotPresence::Both, true) => "=",
            _ => "~",
        };
        out.push_str(&format!(
            "  {} {:<7} {}\n",
            marker,
            slot.slot.as_str(),
            slot.summary
        ));
    }

    out.push('\n');
    out.push_str(&diff.summary);
    out.push('\n');
    out
}

/// Summary for either a locally computed or a server-supplied diff.
pub fn render_run_diff_summary(diff: &RunDiff) -> String {
    match diff {
        RunDiff::Computed(d) => render_human_summary(d),
        RunDiff::Precomputed(d) => format!("{}\n(computed by pipeline service)\n", d.summary),
    }
}
