//! Engine boundary errors.
//!
//! Domain failures arrive as `TraceLensError`; the engine attaches the
//! operation name and request id and hands back an `ExError`.

use tracelens_core::errors::{ExError, TraceLensError};
use tracelens_core_types::RequestContext;

pub type Result<T> = std::result::Result<T, ExError>;

/// Convert a domain error into the boundary error for `op`.
pub fn at_boundary(err: TraceLensError, op: &str, ctx: &RequestContext) -> ExError {
    let ex: ExError = err.into();
    // ExternalService errors already name the failing service as their op
    let ex = if ex.op().is_none() { ex.with_op(op) } else { ex };
    ex.with_request_id(ctx.request_id.clone())
}
