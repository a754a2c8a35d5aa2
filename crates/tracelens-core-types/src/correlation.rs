//! Correlation types for request tracking
//!
//! Every CLI invocation gets one `RequestContext`; its id is attached to the
//! structured log events and errors produced while serving that invocation,
//! so warnings about a degraded source can be tied back to the command that
//! triggered the fetch.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single diagnostic request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new time-ordered RequestId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried from the command boundary into the engine
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    /// Name of the command being served (e.g. `trace`, `pipeline.inspect`)
    pub command: Option<String>,
}

impl RequestContext {
    /// Create a new context with a fresh RequestId
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            command: None,
        }
    }

    /// Create a context with an existing RequestId
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            command: None,
        }
    }

    /// Tag the context with the command name
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
