//! Subcommands and the shared output plumbing they print through.

pub mod pipeline;
pub mod trace;

use serde::Serialize;
use std::io::IsTerminal;
use tracelens_core::config::TraceLensConfig;
use tracelens_core::errors::ExError;
use tracelens_core::render::json::to_json;
use tracelens_core::render::RenderOptions;
use tracelens_core_types::RequestContext;
use tracelens_engine::{apply_engine_query, EngineQuery, EngineQueryResult};

use crate::file_service::FileService;

/// Everything a subcommand needs besides its own arguments.
pub struct Session {
    pub config: TraceLensConfig,
    pub service: FileService,
    pub output: Output,
}

impl Session {
    /// Run one engine query under a fresh request context.
    ///
    /// # Errors
    ///
    /// The engine's boundary error for the query.
    pub fn query(&self, command: &str, query: EngineQuery) -> Result<EngineQueryResult, ExError> {
        let ctx = RequestContext::new().with_command(command);
        apply_engine_query(query, &self.service, &self.config, &ctx)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    pub color: bool,
}

impl Output {
    /// Colour only when writing to a terminal and `NO_COLOR` is unset.
    pub fn detect(json: bool) -> Self {
        let color = !json
            && std::io::stdout().is_terminal()
            && std::env::var_os("NO_COLOR").is_none();
        Self { json, color }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions { color: self.color }
    }

    /// # Errors
    ///
    /// `Serialization` if the value cannot be encoded.
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<(), ExError> {
        let text = to_json(value).map_err(ExError::from)?;
        println!("{}", text);
        Ok(())
    }

    /// JSON encoding of `value` with `--json`, otherwise the text `render`
    /// produces.
    ///
    /// # Errors
    ///
    /// As [`Output::print_json`].
    pub fn emit<T, F>(&self, value: &T, render: F) -> Result<(), ExError>
    where
        T: Serialize,
        F: FnOnce(&T, RenderOptions) -> String,
    {
        if self.json {
            self.print_json(value)
        } else {
            print!("{}", render(value, self.render_options()));
            Ok(())
        }
    }
}

/// An engine result of the wrong shape for the query that produced it.
pub fn unexpected_result(op: &str) -> ExError {
    ExError::new(tracelens_core::ExErrorKind::Internal)
        .with_op(op)
        .with_message("engine returned a result for a different query")
}
