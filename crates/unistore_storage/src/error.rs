//! Error types for storage operations.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// The unified error taxonomy shared by every backend.
///
/// The discriminants are stable and are exported unchanged through the C ABI.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Catch-all for failures that fit no other kind. Treat as fatal.
    Unexpected = 1,
    /// The backend cannot perform this operation, natively or emulated.
    Unsupported = 2,
    /// Construction options are missing or malformed.
    ConfigInvalid = 3,
    /// The path does not exist.
    NotFound = 4,
    /// The backend refused access.
    PermissionDenied = 5,
    /// A file operation was applied to a directory.
    IsADirectory = 6,
    /// A directory operation was applied to a file.
    NotADirectory = 7,
    /// The target already exists.
    AlreadyExists = 8,
    /// The backend throttled the request.
    RateLimited = 9,
    /// Source and destination of a rename or copy are the same path.
    IsSameFile = 10,
    /// An if-match / if-none-match precondition failed.
    ConditionNotMatch = 11,
}

impl ErrorKind {
    /// Returns the stable numeric code of this kind.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Returns the kind for a numeric code, if it is known.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            1 => Self::Unexpected,
            2 => Self::Unsupported,
            3 => Self::ConfigInvalid,
            4 => Self::NotFound,
            5 => Self::PermissionDenied,
            6 => Self::IsADirectory,
            7 => Self::NotADirectory,
            8 => Self::AlreadyExists,
            9 => Self::RateLimited,
            10 => Self::IsSameFile,
            11 => Self::ConditionNotMatch,
            _ => return None,
        })
    }

    /// Returns a static, human readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unexpected => "Unexpected",
            Self::Unsupported => "Unsupported",
            Self::ConfigInvalid => "ConfigInvalid",
            Self::NotFound => "NotFound",
            Self::PermissionDenied => "PermissionDenied",
            Self::IsADirectory => "IsADirectory",
            Self::NotADirectory => "NotADirectory",
            Self::AlreadyExists => "AlreadyExists",
            Self::RateLimited => "RateLimited",
            Self::IsSameFile => "IsSameFile",
            Self::ConditionNotMatch => "ConditionNotMatch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reported by storage backends.
///
/// Each variant maps onto exactly one [`ErrorKind`] via [`StorageError::kind`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred. The kind is derived from the OS error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The missing path.
        path: String,
    },

    /// Access was refused.
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// The refused path.
        path: String,
    },

    /// The operation is not implemented by this backend.
    #[error("operation {operation} is not supported by {scheme}")]
    Unsupported {
        /// Backend scheme.
        scheme: String,
        /// Operation name.
        operation: &'static str,
    },

    /// A file operation hit a directory.
    #[error("is a directory: {path}")]
    IsADirectory {
        /// The directory path.
        path: String,
    },

    /// A directory operation hit a file.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The file path.
        path: String,
    },

    /// Rename or copy onto the same path.
    #[error("source and target are the same: {path}")]
    IsSameFile {
        /// The path given for both ends.
        path: String,
    },

    /// A conditional request did not match.
    #[error("condition not match on {path}: {message}")]
    ConditionNotMatch {
        /// The object path.
        path: String,
        /// What did not match.
        message: String,
    },

    /// The backend throttled the request.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Encryption or decryption failed.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Anything else.
    #[error("{0}")]
    Unexpected(String),
}

impl StorageError {
    /// Creates an [`StorageError::Unsupported`] error.
    pub fn unsupported(scheme: impl Into<String>, operation: &'static str) -> Self {
        Self::Unsupported {
            scheme: scheme.into(),
            operation,
        }
    }

    /// Creates a [`StorageError::NotFound`] error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Returns the unified kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(e) => io_kind(e),
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::IsADirectory { .. } => ErrorKind::IsADirectory,
            Self::NotADirectory { .. } => ErrorKind::NotADirectory,
            Self::IsSameFile { .. } => ErrorKind::IsSameFile,
            Self::ConditionNotMatch { .. } => ErrorKind::ConditionNotMatch,
            Self::RateLimited(_) => ErrorKind::RateLimited,
            Self::Encryption(_) | Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        match self {
            Self::RateLimited(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}

fn io_kind(err: &io::Error) -> ErrorKind {
    match err.kind() {
        io::ErrorKind::NotFound => ErrorKind::NotFound,
        io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
        io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists,
        io::ErrorKind::Unsupported => ErrorKind::Unsupported,
        io::ErrorKind::IsADirectory => ErrorKind::IsADirectory,
        io::ErrorKind::NotADirectory => ErrorKind::NotADirectory,
        _ => ErrorKind::Unexpected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes_are_stable() {
        assert_eq!(ErrorKind::Unexpected.code(), 1);
        assert_eq!(ErrorKind::NotFound.code(), 4);
        assert_eq!(ErrorKind::ConditionNotMatch.code(), 11);
        for code in 1..=11 {
            let kind = ErrorKind::from_code(code).unwrap();
            assert_eq!(kind.code(), code);
        }
        assert_eq!(ErrorKind::from_code(0), None);
        assert_eq!(ErrorKind::from_code(99), None);
    }

    #[test]
    fn io_errors_map_to_kinds() {
        let err = StorageError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = StorageError::from(io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        let err = StorageError::from(io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn temporary_errors() {
        assert!(StorageError::RateLimited("slow down".into()).is_temporary());
        assert!(StorageError::from(io::Error::new(io::ErrorKind::TimedOut, "t")).is_temporary());
        assert!(!StorageError::not_found("a").is_temporary());
    }

    #[test]
    fn messages_carry_context() {
        let err = StorageError::PermissionDenied {
            path: "/locked".into(),
        };
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert!(err.to_string().contains("/locked"));

        let err = StorageError::unsupported("memory", "rename");
        assert_eq!(err.to_string(), "operation rename is not supported by memory");
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
