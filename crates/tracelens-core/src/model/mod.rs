//! Data model for the diagnostic layer.
//!
//! `raw` holds the shapes returned by the pipeline and telemetry services;
//! everything else is the canonical form the components operate on.

pub mod event;
pub mod gating;
pub mod raw;
pub mod stage_run;

pub use event::{EventSource, Severity, TraceEvent};
pub use gating::{ContentContribution, GatingSignal};
pub use raw::{RawObservation, RawPipelineEvent, RawTrace};
pub use stage_run::{IoSlot, IoSnapshot, RunStatus, StageRunRecord};
