use signet_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using SignetError
pub type Result<T> = std::result::Result<T, SignetError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Request validation
    InvalidInput,
    InvalidCursor,
    NotFound,

    // Kernel state
    AttachmentNotLoaded,
    PagerExhausted,

    // Integration/IO
    Persistence,
    Serialization,
    Config,
    Timeout,
    Cancelled,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidCursor => "ERR_INVALID_CURSOR",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AttachmentNotLoaded => "ERR_ATTACHMENT_NOT_LOADED",
            ExErrorKind::PagerExhausted => "ERR_PAGER_EXHAUSTED",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Cancelled => "ERR_CANCELLED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// context (operation, entity, correlation ids) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
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

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
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
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for the pure query kernel
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignetError {
    /// Cursor token could not be decoded
    #[error("Invalid cursor: {reason}")]
    InvalidCursor { reason: String },

    /// Cursor was minted for a different sort direction
    #[error("Cursor was issued for {found} ordering but the query orders {expected}")]
    CursorDirectionMismatch { expected: String, found: String },

    /// Requested page size is outside the configured bounds
    #[error("Invalid page limit {limit}: must be between 1 and {max}")]
    InvalidLimit { limit: usize, max: usize },

    /// Pager was advanced after it reported the last page
    #[error("Pager is exhausted: no further pages")]
    PagerExhausted,

    /// Pager received a page it did not ask for
    #[error("Pager received a page while {state}")]
    PagerOutOfSequence { state: &'static str },

    /// Attachment slot read before it was hydrated
    #[error("Document {document_phid} has no attached {attachment}")]
    AttachmentNotLoaded {
        document_phid: String,
        attachment: &'static str,
    },

    /// Stored relation kind code has no RelationKind variant
    #[error("Unknown relation kind code: {code}")]
    UnknownRelationKind { code: i64 },

    /// Configuration could not be parsed
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<SignetError> for ExError {
    fn from(err: SignetError) -> Self {
        match err {
            SignetError::InvalidCursor { reason } => ExError::new(ExErrorKind::InvalidCursor)
                .with_op("decode_cursor")
                .with_message(reason),

            e @ SignetError::CursorDirectionMismatch { .. } => {
                ExError::new(ExErrorKind::InvalidCursor)
                    .with_op("decode_cursor")
                    .with_message(e.to_string())
            }

            e @ SignetError::InvalidLimit { .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("validate_limit")
                .with_message(e.to_string()),

            e @ SignetError::PagerExhausted => ExError::new(ExErrorKind::PagerExhausted)
                .with_op("pager_advance")
                .with_message(e.to_string()),

            e @ SignetError::PagerOutOfSequence { .. } => ExError::new(ExErrorKind::Internal)
                .with_op("pager_complete")
                .with_message(e.to_string()),

            SignetError::AttachmentNotLoaded {
                document_phid,
                attachment,
            } => ExError::new(ExErrorKind::AttachmentNotLoaded)
                .with_message(format!("{} was not requested", attachment))
                .with_entity_id(document_phid),

            e @ SignetError::UnknownRelationKind { .. } => {
                ExError::new(ExErrorKind::Serialization)
                    .with_op("decode_relation_kind")
                    .with_message(e.to_string())
            }

            SignetError::Config { message } => ExError::new(ExErrorKind::Config)
                .with_op("load_config")
                .with_message(message),

            SignetError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}
