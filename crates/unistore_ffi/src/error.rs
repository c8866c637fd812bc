//! Error codes and the error object.

use crate::buffer::unistore_bytes;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use unistore_core::{Error, ErrorKind};

/// Error codes. The values match `unistore_core::ErrorKind`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum unistore_code {
    /// Catch-all. Treat as fatal.
    UNISTORE_UNEXPECTED = 1,
    /// The backend cannot perform this operation.
    UNISTORE_UNSUPPORTED = 2,
    /// Options are missing or malformed.
    UNISTORE_CONFIG_INVALID = 3,
    /// The path does not exist.
    UNISTORE_NOT_FOUND = 4,
    /// Access was refused.
    UNISTORE_PERMISSION_DENIED = 5,
    /// A file operation hit a directory.
    UNISTORE_IS_A_DIRECTORY = 6,
    /// A directory operation hit a file.
    UNISTORE_NOT_A_DIRECTORY = 7,
    /// The target already exists.
    UNISTORE_ALREADY_EXISTS = 8,
    /// The backend throttled the request.
    UNISTORE_RATE_LIMITED = 9,
    /// Source and target of a rename or copy are the same.
    UNISTORE_IS_SAME_FILE = 10,
    /// An etag condition failed.
    UNISTORE_CONDITION_NOT_MATCH = 11,
}

impl From<ErrorKind> for unistore_code {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Unexpected => Self::UNISTORE_UNEXPECTED,
            ErrorKind::Unsupported => Self::UNISTORE_UNSUPPORTED,
            ErrorKind::ConfigInvalid => Self::UNISTORE_CONFIG_INVALID,
            ErrorKind::NotFound => Self::UNISTORE_NOT_FOUND,
            ErrorKind::PermissionDenied => Self::UNISTORE_PERMISSION_DENIED,
            ErrorKind::IsADirectory => Self::UNISTORE_IS_A_DIRECTORY,
            ErrorKind::NotADirectory => Self::UNISTORE_NOT_A_DIRECTORY,
            ErrorKind::AlreadyExists => Self::UNISTORE_ALREADY_EXISTS,
            ErrorKind::RateLimited => Self::UNISTORE_RATE_LIMITED,
            ErrorKind::IsSameFile => Self::UNISTORE_IS_SAME_FILE,
            ErrorKind::ConditionNotMatch => Self::UNISTORE_CONDITION_NOT_MATCH,
        }
    }
}

/// A heap-allocated error.
///
/// Release with [`unistore_error_free`], which also frees the message.
#[repr(C)]
#[derive(Debug)]
pub struct unistore_error {
    /// What went wrong.
    pub code: unistore_code,
    /// Human readable message, not NUL-terminated.
    pub message: unistore_bytes,
}

impl unistore_error {
    /// Boxes a new error and returns the raw pointer.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> *mut Self {
        let message: String = message.into();
        Box::into_raw(Box::new(Self {
            code: kind.into(),
            message: unistore_bytes::from_vec(message.into_bytes()),
        }))
    }

    /// Boxes an operator error.
    pub fn from_error(err: &Error) -> *mut Self {
        Self::new(err.kind(), err.to_string())
    }

    /// Boxes the error for a null handle argument.
    pub fn null_argument(name: &str) -> *mut Self {
        Self::new(ErrorKind::Unexpected, format!("{name} is null"))
    }

    /// Boxes the error for a path that is null or not UTF-8.
    pub fn invalid_path() -> *mut Self {
        Self::new(ErrorKind::Unexpected, "path is null or not valid UTF-8")
    }
}

/// Frees an error and its message.
///
/// # Safety
///
/// `error` must be null or an error returned by this library, not yet freed.
#[no_mangle]
pub unsafe extern "C" fn unistore_error_free(error: *mut unistore_error) {
    if error.is_null() {
        return;
    }
    let mut error = Box::from_raw(error);
    crate::buffer::unistore_bytes_free(&mut error.message);
}

/// Result values that can carry an error instead of a payload.
pub(crate) trait ErrorResult {
    fn from_error(error: *mut unistore_error) -> Self;
}

impl ErrorResult for *mut unistore_error {
    fn from_error(error: *mut unistore_error) -> Self {
        error
    }
}

/// Runs `f`, turning a panic into an `UNISTORE_UNEXPECTED` result.
pub(crate) fn guard<R: ErrorResult>(f: impl FnOnce() -> R) -> R {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(message = %message, "panic caught at the C boundary");
            R::from_error(unistore_error::new(
                ErrorKind::Unexpected,
                format!("internal panic: {message}"),
            ))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_error_kinds() {
        for code in 1..=11 {
            let kind = ErrorKind::from_code(code).unwrap();
            assert_eq!(unistore_code::from(kind) as u32, code);
        }
    }

    #[test]
    fn error_message_is_length_delimited() {
        let err = unistore_error::new(ErrorKind::NotFound, "missing");
        unsafe {
            assert_eq!((*err).code, unistore_code::UNISTORE_NOT_FOUND);
            assert_eq!((*err).message.as_slice(), b"missing");
            unistore_error_free(err);
            unistore_error_free(std::ptr::null_mut());
        }
    }

    #[test]
    fn panics_become_errors() {
        let err: *mut unistore_error = guard(|| panic!("boom"));
        assert!(!err.is_null());
        unsafe {
            assert_eq!((*err).code, unistore_code::UNISTORE_UNEXPECTED);
            let message = String::from_utf8_lossy((*err).message.as_slice()).to_string();
            assert!(message.contains("boom"));
            unistore_error_free(err);
        }
    }
}
