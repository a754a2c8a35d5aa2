//! Severity display table.
//!
//! The one place severities map to labels, colours and symbols. Terminal
//! output and the JSON encoding both read from here.

use crate::model::{RunStatus, Severity};

pub const ANSI_RESET: &str = "\x1b[0m";
pub const ANSI_BOLD: &str = "\x1b[1m";
pub const ANSI_DIM: &str = "\x1b[90m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityStyle {
    pub severity: Severity,
    /// Stable lowercase name used in JSON
    pub label: &'static str,
    pub ansi: &'static str,
    pub symbol: &'static str,
}

pub const SEVERITY_STYLES: [SeverityStyle; 4] = [
    SeverityStyle {
        severity: Severity::Ok,
        label: "ok",
        ansi: "\x1b[32m",
        symbol: "✓",
    },
    SeverityStyle {
        severity: Severity::Warning,
        label: "warning",
        ansi: "\x1b[33m",
        symbol: "!",
    },
    SeverityStyle {
        severity: Severity::Error,
        label: "error",
        ansi: "\x1b[31m",
        symbol: "✗",
    },
    SeverityStyle {
        severity: Severity::Neutral,
        label: "neutral",
        ansi: "\x1b[36m",
        symbol: "•",
    },
];

impl Severity {
    pub fn style(&self) -> &'static SeverityStyle {
        let index = match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
            Severity::Neutral => 3,
        };
        &SEVERITY_STYLES[index]
    }
}

impl RunStatus {
    /// Display severity of a run status
    pub fn severity(&self) -> Severity {
        match self {
            RunStatus::Completed => Severity::Ok,
            RunStatus::Failed => Severity::Error,
            RunStatus::Superseded => Severity::Warning,
            RunStatus::Running => Severity::Neutral,
        }
    }
}

/// Wrap `text` in an ANSI sequence when colour is enabled.
pub fn paint(text: &str, ansi: &str, color: bool) -> String {
    if color {
        format!("{}{}{}", ansi, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

pub fn paint_severity(text: &str, severity: Severity, color: bool) -> String {
    paint(text, severity.style().ansi, color)
}
