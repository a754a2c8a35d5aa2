//! Configuration for the diagnostic layer.
//!
//! Loaded from TOML; every key is optional and falls back to the built-in
//! defaults, so an empty file (or no file) is a valid configuration.

use crate::errors::{Result, TraceLensError};
use crate::history::StageRegistry;
use crate::truncate::{TruncateMode, TruncationPolicy, BODY_PREVIEW_LIMIT, IO_INSPECT_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceLensConfig {
    pub truncation: TruncationConfig,
    pub stages: StagesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TruncationConfig {
    pub body_limit: usize,
    pub io_limit: usize,
}

impl Default for TruncationConfig {
    fn default() -> Self {
        Self {
            body_limit: BODY_PREVIEW_LIMIT,
            io_limit: IO_INSPECT_LIMIT,
        }
    }
}

/// Pipeline topology used for gating inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StagesConfig {
    pub gating_stage: String,
    pub downstream: Vec<String>,
}

impl Default for StagesConfig {
    fn default() -> Self {
        let registry = StageRegistry::default();
        Self {
            gating_stage: registry.gating_stage,
            downstream: registry.downstream,
        }
    }
}

impl TraceLensConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when the document is not valid TOML, has unknown keys,
    /// or fails [`TraceLensConfig::validate`].
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TraceLensConfig =
            toml::from_str(text).map_err(|e| TraceLensError::InvalidConfig {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file path.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| TraceLensError::Io {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    ///
    /// `InvalidConfig` for zero limits, an empty gating stage, or a
    /// downstream list that names the gating stage or an empty stage.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(TraceLensError::InvalidConfig {
                reason: reason.to_string(),
            })
        };
        if self.truncation.body_limit == 0 || self.truncation.io_limit == 0 {
            return invalid("truncation limits must be greater than zero");
        }
        if self.stages.gating_stage.trim().is_empty() {
            return invalid("stages.gating_stage must not be empty");
        }
        if self.stages.downstream.iter().any(|s| s.trim().is_empty()) {
            return invalid("stages.downstream must not contain empty names");
        }
        if self.stages.downstream.contains(&self.stages.gating_stage) {
            return invalid("stages.downstream must not include the gating stage");
        }
        Ok(())
    }

    pub fn stage_registry(&self) -> StageRegistry {
        StageRegistry::new(
            self.stages.gating_stage.clone(),
            self.stages.downstream.clone(),
        )
    }

    pub fn body_policy(&self, mode: TruncateMode) -> TruncationPolicy {
        TruncationPolicy::new(self.truncation.body_limit, mode)
    }

    pub fn io_policy(&self, mode: TruncateMode) -> TruncationPolicy {
        TruncationPolicy::new(self.truncation.io_limit, mode)
    }
}
