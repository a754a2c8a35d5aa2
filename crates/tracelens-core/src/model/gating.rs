//! Content-gating decision extracted from the gating stage's parsed output.

use serde::{Deserialize, Serialize};

/// How much a piece of content is expected to contribute downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentContribution {
    None,
    Low,
    Medium,
    High,
    #[default]
    Unspecified,
}

impl ContentContribution {
    /// Case-insensitive parse; anything unrecognised is `Unspecified`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "NONE" => ContentContribution::None,
            "LOW" => ContentContribution::Low,
            "MEDIUM" => ContentContribution::Medium,
            "HIGH" => ContentContribution::High,
            _ => ContentContribution::Unspecified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentContribution::None => "NONE",
            ContentContribution::Low => "LOW",
            ContentContribution::Medium => "MEDIUM",
            ContentContribution::High => "HIGH",
            ContentContribution::Unspecified => "UNSPECIFIED",
        }
    }

    /// Whether this decision causes downstream stages to be skipped.
    pub fn gates_downstream(&self) -> bool {
        matches!(self, ContentContribution::None | ContentContribution::Low)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatingSignal {
    pub content_contribution: ContentContribution,
    pub reason: String,
}

impl GatingSignal {
    pub fn is_empty(&self) -> bool {
        self.content_contribution == ContentContribution::Unspecified && self.reason.is_empty()
    }
}
