//! Stage topology used for gating inference.

/// Describes which stage makes the gating decision and which stages are
/// expected to run after it when content is not gated.
pub trait StageTopology {
    fn gating_stage(&self) -> &str;

    /// Downstream stages, in pipeline order
    fn downstream_stages(&self) -> &[String];
}

/// Static stage registry, usually built from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRegistry {
    pub gating_stage: String,
    pub downstream: Vec<String>,
}

impl StageRegistry {
    pub fn new(gating_stage: impl Into<String>, downstream: Vec<String>) -> Self {
        Self {
            gating_stage: gating_stage.into(),
            downstream,
        }
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::new(
            "triage",
            ["extract_ner", "extract_assertions", "analyze", "embeddings"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }
}

impl StageTopology for StageRegistry {
    fn gating_stage(&self) -> &str {
        &self.gating_stage
    }

    fn downstream_stages(&self) -> &[String] {
        &self.downstream
    }
}
