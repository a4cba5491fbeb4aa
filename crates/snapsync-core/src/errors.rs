use std::path::{Path, PathBuf};

/// Result type alias using SnapError
pub type Result<T> = std::result::Result<T, SnapError>;

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// in the SnapSync pipeline. Each kind maps to a stable error code that can
/// be used for programmatic handling, testing, and HTTP error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // Configuration
    MissingEnvVar,
    /// A requested select column does not exist on the source relation
    MissingColumn,
    InvalidJob,

    // Database (transient set - eligible for retry)
    Database,
    Timeout,

    // Snapshot files
    Io,
    Serialization,
    /// Snapshot file absent at read time
    SnapshotMissing,
    /// Snapshot file present but not valid JSON (or wrong shape)
    SnapshotMalformed,

    // Git sync
    /// Working directory is not a git checkout (always fatal)
    GitRepository,
    GitCommand,
    GitPush,

    // Internal
    Internal,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::MissingEnvVar => "ERR_MISSING_ENV_VAR",
            ErrorKind::MissingColumn => "ERR_MISSING_COLUMN",
            ErrorKind::InvalidJob => "ERR_INVALID_JOB",
            ErrorKind::Database => "ERR_DATABASE",
            ErrorKind::Timeout => "ERR_TIMEOUT",
            ErrorKind::Io => "ERR_IO",
            ErrorKind::Serialization => "ERR_SERIALIZATION",
            ErrorKind::SnapshotMissing => "ERR_SNAPSHOT_MISSING",
            ErrorKind::SnapshotMalformed => "ERR_SNAPSHOT_MALFORMED",
            ErrorKind::GitRepository => "ERR_GIT_REPOSITORY",
            ErrorKind::GitCommand => "ERR_GIT_COMMAND",
            ErrorKind::GitPush => "ERR_GIT_PUSH",
            ErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a query hitting this kind may be retried with backoff
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::Database | ErrorKind::Timeout)
    }
}

/// Canonical structured error type
///
/// Provides a structured representation of errors with classification fields
/// for programmatic handling and rich context for debugging.
#[derive(Debug, Clone)]
pub struct SnapError {
    kind: ErrorKind,
    op: Option<String>,
    path: Option<PathBuf>,
    message: String,
    source: Option<Box<SnapError>>,
}

impl SnapError {
    /// Create a new error with the specified kind
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add file path context
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: SnapError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the file path context, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&SnapError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for SnapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for SnapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Create an IO error with operation context
pub fn io_error(op: &str, err: std::io::Error) -> SnapError {
    SnapError::new(ErrorKind::Io)
        .with_op(op.to_string())
        .with_message(err.to_string())
}
