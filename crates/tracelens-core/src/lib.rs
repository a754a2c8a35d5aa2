//! TraceLens Core - pure diagnostic transformations
//!
//! This crate reconstructs what happened to a piece of content as it moved
//! through pipeline stages and AI model calls:
//! - Event normalization of pipeline lifecycle events and telemetry observations
//! - Chronological merging of any number of event sources
//! - Per-stage run history with gating-induced skip inference
//! - Line-level diffs of two runs' recorded IO
//! - Uniform truncation of display payloads
//! - Terminal and JSON renderers sharing one severity style table
//!
//! Everything here is synchronous and operates on already-fetched data.

pub mod config;
pub mod diff;
pub mod errors;
pub mod history;
pub mod logging_facility;
pub mod model;
pub mod normalize;
pub mod render;
pub mod timeline;
pub mod truncate;

#[doc(hidden)]
pub use tracelens_core_types as core_types;

// Re-export commonly used types
pub use config::TraceLensConfig;
pub use errors::{ExError, ExErrorKind, Result, TraceLensError};
pub use model::{GatingSignal, IoSnapshot, Severity, StageRunRecord, TraceEvent};
pub use timeline::{merge_timelines, TraceView};
pub use truncate::{TruncateMode, TruncationPolicy};
