//! Output renderers: ANSI terminal views and the JSON encoding.

pub mod json;
pub mod style;
pub mod terminal;

pub use style::{SeverityStyle, SEVERITY_STYLES};
pub use terminal::{
    format_duration_ms, render_history, render_run_diff, render_run_io, render_timeline,
    RenderOptions,
};
