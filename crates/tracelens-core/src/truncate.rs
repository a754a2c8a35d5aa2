//! Truncation policy for display payloads.
//!
//! Two thresholds are used across the CLI: a short one for content previews
//! and a long one for stage input/output/parsed inspection. Truncation keeps
//! the first `limit` characters and appends a notice naming the limit and the
//! flag that disables it. Applying the policy to its own output is a no-op.

use std::borrow::Cow;

use crate::normalize::format_count;

/// Content body previews
pub const BODY_PREVIEW_LIMIT: usize = 1_000;
/// Stage IO inspection
pub const IO_INSPECT_LIMIT: usize = 10_000;

/// Flag name quoted in the notice.
pub const NO_TRUNCATE_FLAG: &str = "--no-truncate";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TruncateMode {
    #[default]
    Truncate,
    /// Caller asked for the untruncated form
    Full,
}

impl TruncateMode {
    pub fn from_no_truncate(no_truncate: bool) -> Self {
        if no_truncate {
            TruncateMode::Full
        } else {
            TruncateMode::Truncate
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationPolicy {
    pub limit: usize,
    pub mode: TruncateMode,
}

impl TruncationPolicy {
    pub fn new(limit: usize, mode: TruncateMode) -> Self {
        Self { limit, mode }
    }

    pub fn body_preview() -> Self {
        Self::new(BODY_PREVIEW_LIMIT, TruncateMode::Truncate)
    }

    pub fn io_inspect() -> Self {
        Self::new(IO_INSPECT_LIMIT, TruncateMode::Truncate)
    }

    pub fn with_mode(mut self, mode: TruncateMode) -> Self {
        self.mode = mode;
        self
    }

    /// Bound `text` to the policy's limit.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.mode == TruncateMode::Full {
            return Cow::Borrowed(text);
        }
        let Some((cut, _)) = text.char_indices().nth(self.limit) else {
            return Cow::Borrowed(text);
        };
        if is_truncated(text, self.limit) {
            return Cow::Borrowed(text);
        }
        let mut out = String::with_capacity(cut + 96);
        out.push_str(&text[..cut]);
        out.push_str(&truncation_notice(self.limit));
        Cow::Owned(out)
    }
}

/// Notice appended after a truncated prefix.
pub fn truncation_notice(limit: usize) -> String {
    format!(
        "\n... [truncated at {} characters; pass {} for full output]",
        format_count(limit as u64),
        NO_TRUNCATE_FLAG
    )
}

/// Whether `text` is exactly a `limit`-char prefix followed by the notice.
pub fn is_truncated(text: &str, limit: usize) -> bool {
    text.strip_suffix(truncation_notice(limit).as_str())
        .is_some_and(|prefix| prefix.chars().count() == limit)
}
