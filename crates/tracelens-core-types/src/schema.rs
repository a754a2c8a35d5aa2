//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Entity identifiers
pub const FIELD_CONTENT_ID: &str = "content_id";
pub const FIELD_SOURCE_ID: &str = "source_id";
pub const FIELD_STAGE: &str = "stage";
pub const FIELD_RUN_ID: &str = "run_id";

// Collection sizes
pub const FIELD_EVENT_COUNT: &str = "event_count";
pub const FIELD_RUN_COUNT: &str = "run_count";
pub const FIELD_SKIPPED_COUNT: &str = "skipped_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_SOURCE_DEGRADED: &str = "source_degraded";
