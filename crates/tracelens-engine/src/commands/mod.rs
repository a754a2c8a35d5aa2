//! Query orchestration layer.
//!
//! [`engine_query::apply_engine_query`] is the single entry point; the
//! request structs in [`requests`] carry every parameter explicitly.

pub mod engine_query;
pub mod requests;
pub mod trace;
