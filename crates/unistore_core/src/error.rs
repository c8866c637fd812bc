//! Error types for operator calls.

use std::fmt;
use std::io;
use thiserror::Error as ThisError;
use unistore_storage::StorageError;

pub use unistore_storage::ErrorKind;

/// Result type for operator calls.
pub type Result<T> = std::result::Result<T, Error>;

/// An error returned by the [`Operator`](crate::Operator).
///
/// Carries the unified [`ErrorKind`], the operation and path it happened on,
/// and the backend error that caused it, if any.
#[derive(Debug, ThisError)]
pub struct Error {
    kind: ErrorKind,
    operation: &'static str,
    path: String,
    message: String,
    temporary: bool,
    #[source]
    source: Option<StorageError>,
}

impl Error {
    /// Creates an error with no backend source.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            operation: "",
            path: String::new(),
            message: message.into(),
            temporary: false,
            source: None,
        }
    }

    /// Translates a backend error, keeping it as the source.
    pub fn from_storage(operation: &'static str, path: impl Into<String>, err: StorageError) -> Self {
        Self {
            kind: err.kind(),
            operation,
            path: path.into(),
            message: err.to_string(),
            temporary: err.is_temporary(),
            source: Some(err),
        }
    }

    /// Sets the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        self.operation = operation;
        self
    }

    /// Sets the path the error applies to.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Returns the unified kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the operation that failed, or `""` if unknown.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Returns the caller-relative path, or `""` if none applies.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the human readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if retrying may succeed.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.temporary
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        match (self.operation.is_empty(), self.path.is_empty()) {
            (false, false) => write!(f, " at {} {}", self.operation, self.path)?,
            (false, true) => write!(f, " at {}", self.operation)?,
            (true, false) => write!(f, " at {}", self.path)?,
            (true, true) => {}
        }
        if self.temporary {
            f.write_str(" (temporary)")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self::from_storage("", "", err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match err.kind {
            ErrorKind::NotFound => io::ErrorKind::NotFound,
            ErrorKind::PermissionDenied => io::ErrorKind::PermissionDenied,
            ErrorKind::AlreadyExists => io::ErrorKind::AlreadyExists,
            ErrorKind::IsADirectory => io::ErrorKind::IsADirectory,
            ErrorKind::NotADirectory => io::ErrorKind::NotADirectory,
            ErrorKind::Unsupported => io::ErrorKind::Unsupported,
            ErrorKind::ConfigInvalid => io::ErrorKind::InvalidInput,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
