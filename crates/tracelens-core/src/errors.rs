use tracelens_core_types::RequestId;
use thiserror::Error;

/// Result type alias using TraceLensError
pub type Result<T> = std::result::Result<T, TraceLensError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and the `--json` error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input/Validation
    InvalidInput,
    NotFound,
    InvalidConfig,

    // Diagnostics
    /// No requested source produced any trace events
    NoTraceData,
    /// Fewer historical runs than a comparison needs
    InsufficientRuns,

    // Integration/IO
    Io,
    Serialization,
    ExternalService,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::NoTraceData => "ERR_NO_TRACE_DATA",
            ExErrorKind::InsufficientRuns => "ERR_INSUFFICIENT_RUNS",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling plus the
/// identifiers (content id, source id, stage, run) that locate the failure.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    stage: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            stage: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (content id, source id or run id)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add stage context
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (id: {})", entity_id)?;
        }
        if let Some(stage) = &self.stage {
            write!(f, " (stage: {})", stage)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for TraceLens operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceLensError {
    /// Every requested source failed or returned nothing
    #[error("no trace data available for {content_id}")]
    NoTraceData { content_id: String },

    /// A comparison needs two runs of a stage and fewer exist
    #[error("need 2 runs of stage '{stage}' to diff, found {found}")]
    InsufficientRuns { stage: String, found: usize },

    /// A run id referenced by a command is not in the run list
    #[error("run {run_id} not found for source {source_id}")]
    RunNotFound { run_id: i64, source_id: i64 },

    /// Two runs being compared belong to different stages
    #[error("cannot diff run {run_a} ({stage_a}) against run {run_b} ({stage_b}): stages differ")]
    StageMismatch {
        run_a: i64,
        stage_a: String,
        run_b: i64,
        stage_b: String,
    },

    /// Configuration failed validation
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Generic invalid input at a command boundary
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A collaborator service (RPC, captured response file) failed
    #[error("{service} request failed: {message}")]
    ExternalService { service: String, message: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("io error: {message}")]
    Io { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl From<TraceLensError> for ExError {
    fn from(err: TraceLensError) -> Self {
        match err {
            TraceLensError::NoTraceData { content_id } => ExError::new(ExErrorKind::NoTraceData)
                .with_entity_id(content_id)
                .with_message("no trace data available"),

            TraceLensError::InsufficientRuns { stage, found } => {
                ExError::new(ExErrorKind::InsufficientRuns)
                    .with_stage(stage)
                    .with_message(format!("need 2 runs to diff, found {}", found))
            }

            TraceLensError::RunNotFound { run_id, source_id } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_entity_id(run_id.to_string())
                    .with_message(format!("run not found for source {}", source_id))
            }

            TraceLensError::StageMismatch {
                run_a,
                stage_a,
                run_b,
                stage_b,
            } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(format!("{}..{}", run_a, run_b))
                .with_message(format!("stages differ: {} vs {}", stage_a, stage_b)),

            TraceLensError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(reason)
            }

            TraceLensError::InvalidInput { reason } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(reason)
            }

            TraceLensError::ExternalService { service, message } => {
                ExError::new(ExErrorKind::ExternalService)
                    .with_op(service)
                    .with_message(message)
            }

            TraceLensError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            TraceLensError::Io { message } => ExError::new(ExErrorKind::Io).with_message(message),

            TraceLensError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to TraceLensError
impl From<serde_json::Error> for TraceLensError {
    fn from(err: serde_json::Error) -> Self {
        TraceLensError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for TraceLensError {
    fn from(err: std::io::Error) -> Self {
        TraceLensError::Io {
            message: err.to_string(),
        }
    }
}
