//! TraceLens Engine - Orchestration layer
//!
//! Fetches raw records through a [`service::PipelineService`], hands them to
//! the pure components in `tracelens-core`, and owns the op start/end logging
//! and error context for each query.

pub mod commands;
pub mod errors;
pub mod service;

pub use commands::engine_query::{apply_engine_query, EngineQuery, EngineQueryResult};
pub use service::PipelineService;
