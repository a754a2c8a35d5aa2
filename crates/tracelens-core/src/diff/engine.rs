//! Run snapshot diff computation.
//!
//! [`diff_text`] compares two payloads line by line through a [`Differ`];
//! [`diff_runs`] applies it to the IO slots of two runs of the same stage.

use crate::diff::model::{
    DiffCounts, DiffStrategy, LineChange, LineDiff, RunDiff, RunRef, RunSnapshotDiff,
    ServerDiff, SlotDiff, SlotPresence, DIFF_SCHEMA_VERSION,
};
use crate::errors::{Result, TraceLensError};
use crate::history::runs_for_stage;
use crate::model::{IoSlot, StageRunRecord};
use sha2::{Digest as _, Sha256};

/// Largest DP table the LCS strategy builds before falling back to the
/// positional strategy.
pub const LCS_CELL_LIMIT: usize = 4_000_000;

/// Line comparison strategy.
pub trait Differ {
    fn strategy(&self) -> DiffStrategy;

    fn diff_lines(&self, a: &[&str], b: &[&str]) -> Vec<LineChange>;

    /// Line diff stamped with the strategy that produced it.
    fn diff(&self, a: &[&str], b: &[&str]) -> LineDiff {
        finish(self.strategy(), self.diff_lines(a, b))
    }
}

/// Compares line `i` of A with line `i` of B.
///
/// An insertion or deletion partway through shifts every later line, which
/// is then reported as `Changed`; use [`LcsDiffer`] when that matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalDiffer;

impl Differ for PositionalDiffer {
    fn strategy(&self) -> DiffStrategy {
        DiffStrategy::Positional
    }

    fn diff_lines(&self, a: &[&str], b: &[&str]) -> Vec<LineChange> {
        (0..a.len().max(b.len()))
            .filter_map(|index| match (a.get(index), b.get(index)) {
                (Some(old), None) => Some(LineChange::Removed {
                    index,
                    line: old.to_string(),
                }),
                (None, Some(new)) => Some(LineChange::Added {
                    index,
                    line: new.to_string(),
                }),
                (Some(old), Some(new)) if old == new => Some(LineChange::Unchanged {
                    index,
                    line: old.to_string(),
                }),
                (Some(old), Some(new)) => Some(LineChange::Changed {
                    index,
                    old: old.to_string(),
                    new: new.to_string(),
                }),
                (None, None) => None,
            })
            .collect()
    }
}

/// Aligns A and B on their longest common subsequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct LcsDiffer;

impl Differ for LcsDiffer {
    fn strategy(&self) -> DiffStrategy {
        DiffStrategy::Lcs
    }

    fn diff_lines(&self, a: &[&str], b: &[&str]) -> Vec<LineChange> {
        align(a, b).unwrap_or_else(|| PositionalDiffer.diff_lines(a, b))
    }

    /// Falls back to, and reports, the positional strategy when the
    /// alignment table would exceed [`LCS_CELL_LIMIT`].
    fn diff(&self, a: &[&str], b: &[&str]) -> LineDiff {
        match align(a, b) {
            Some(changes) => finish(DiffStrategy::Lcs, changes),
            None => PositionalDiffer.diff(a, b),
        }
    }
}

/// LCS alignment after trimming the common prefix and suffix. `None` when
/// the remaining table is over [`LCS_CELL_LIMIT`].
fn align(a: &[&str], b: &[&str]) -> Option<Vec<LineChange>> {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let a_mid = &a[prefix..a.len() - suffix];
    let b_mid = &b[prefix..b.len() - suffix];

    let (n, m) = (a_mid.len(), b_mid.len());
    if (n + 1).saturating_mul(m + 1) > LCS_CELL_LIMIT {
        tracing::warn!(
            a_lines = a.len(),
            b_lines = b.len(),
            "payload too large for LCS alignment; using positional diff"
        );
        return None;
    }

    let mut changes = Vec::with_capacity(a.len().max(b.len()));
    for (index, line) in a[..prefix].iter().enumerate() {
        changes.push(LineChange::Unchanged {
            index,
            line: line.to_string(),
        });
    }

    // lcs[i][j] = LCS length of a_mid[i..] and b_mid[j..]
    let width = m + 1;
    let mut lcs = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i * width + j] = if a_mid[i] == b_mid[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n || j < m {
        if i < n && j < m && a_mid[i] == b_mid[j] {
            changes.push(LineChange::Unchanged {
                index: prefix + i,
                line: a_mid[i].to_string(),
            });
            i += 1;
            j += 1;
        } else if j == m || (i < n && lcs[(i + 1) * width + j] >= lcs[i * width + j + 1]) {
            changes.push(LineChange::Removed {
                index: prefix + i,
                line: a_mid[i].to_string(),
            });
            i += 1;
        } else {
            changes.push(LineChange::Added {
                index: prefix + j,
                line: b_mid[j].to_string(),
            });
            j += 1;
        }
    }

    for (offset, line) in a[a.len() - suffix..].iter().enumerate() {
        changes.push(LineChange::Unchanged {
            index: a.len() - suffix + offset,
            line: line.to_string(),
        });
    }
    Some(changes)
}

/// Differ implementing `strategy`.
pub fn differ_for(strategy: DiffStrategy) -> &'static dyn Differ {
    match strategy {
        DiffStrategy::Positional => &PositionalDiffer,
        DiffStrategy::Lcs => &LcsDiffer,
    }
}

pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

fn finish(strategy: DiffStrategy, changes: Vec<LineChange>) -> LineDiff {
    let counts = DiffCounts::tally(&changes);
    LineDiff {
        strategy,
        summary: counts.summary(),
        changes,
        counts,
    }
}

/// Line diff of two payloads.
pub fn diff_text(a: &str, b: &str, differ: &dyn Differ) -> LineDiff {
    differ.diff(&split_lines(a), &split_lines(b))
}

fn digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Compare one slot. A payload present on only one side is reported as
/// wholly removed or wholly added.
pub fn diff_slot(slot: IoSlot, a: Option<&str>, b: Option<&str>, differ: &dyn Differ) -> SlotDiff {
    let a_digest = a.map(digest);
    let b_digest = b.map(digest);
    let (presence, diff) = match (a, b) {
        (Some(a), Some(b)) => (SlotPresence::Both, Some(diff_text(a, b, differ))),
        (Some(a), None) => (
            SlotPresence::OnlyInA,
            Some(differ.diff(&split_lines(a), &[])),
        ),
        (None, Some(b)) => (
            SlotPresence::OnlyInB,
            Some(differ.diff(&[], &split_lines(b))),
        ),
        (None, None) => (SlotPresence::Absent, None),
    };

    let identical = presence == SlotPresence::Both && a_digest == b_digest;
    let summary = match (presence, &diff) {
        (SlotPresence::Absent, _) => "not recorded in either run".to_string(),
        (SlotPresence::OnlyInA, _) => "only recorded in run A".to_string(),
        (SlotPresence::OnlyInB, _) => "only recorded in run B".to_string(),
        (SlotPresence::Both, Some(d)) => d.summary.clone(),
        (SlotPresence::Both, None) => String::new(),
    };

    SlotDiff {
        slot,
        presence,
        a_digest,
        b_digest,
        identical,
        diff,
        summary,
    }
}

/// Compare the requested slots of two runs of the same stage.
///
/// # Errors
///
/// `StageMismatch` if the runs belong to different stages.
pub fn diff_runs(
    a: &StageRunRecord,
    b: &StageRunRecord,
    slots: &[IoSlot],
    differ: &dyn Differ,
) -> Result<RunSnapshotDiff> {
    if a.stage_name != b.stage_name {
        return Err(TraceLensError::StageMismatch {
            run_a: a.run_id,
            stage_a: a.stage_name.clone(),
            run_b: b.run_id,
            stage_b: b.stage_name.clone(),
        });
    }

    let slot_diffs: Vec<SlotDiff> = slots
        .iter()
        .map(|&slot| diff_slot(slot, a.payload(slot), b.payload(slot), differ))
        .collect();

    let changed: Vec<&str> = slot_diffs
        .iter()
        .filter(|s| s.presence != SlotPresence::Absent && !s.identical)
        .map(|s| s.slot.as_str())
        .collect();
    let summary = if changed.is_empty() {
        format!("runs {} and {} recorded identical IO", a.run_id, b.run_id)
    } else {
        format!(
            "runs {} and {} differ in {}",
            a.run_id,
            b.run_id,
            changed.join(", ")
        )
    };

    Ok(RunSnapshotDiff {
        diff_schema_version: DIFF_SCHEMA_VERSION,
        model_changed: a.model_id != b.model_id,
        prompt_version_changed: a.prompt_version != b.prompt_version,
        run_a: RunRef::from(a),
        run_b: RunRef::from(b),
        slots: slot_diffs,
        summary,
    })
}

/// Use the server's diff when it supplied one, otherwise compute locally.
///
/// # Errors
///
/// As [`diff_runs`] when computing locally.
pub fn resolve_run_diff(
    server: Option<ServerDiff>,
    a: &StageRunRecord,
    b: &StageRunRecord,
    slots: &[IoSlot],
    differ: &dyn Differ,
) -> Result<RunDiff> {
    match server {
        Some(precomputed) => Ok(RunDiff::Precomputed(precomputed)),
        None => diff_runs(a, b, slots, differ).map(RunDiff::Computed),
    }
}

/// The two most recent runs of `stage`, returned as `(older, newer)`.
///
/// # Errors
///
/// `InsufficientRuns` with the number found when fewer than two exist.
pub fn select_diff_pair<'a>(
    runs: &'a [StageRunRecord],
    stage: &str,
) -> Result<(&'a StageRunRecord, &'a StageRunRecord)> {
    match runs_for_stage(runs, stage).as_slice() {
        [newer, older, ..] => Ok((*older, *newer)),
        found => Err(TraceLensError::InsufficientRuns {
            stage: stage.to_string(),
            found: found.len(),
        }),
    }
}
