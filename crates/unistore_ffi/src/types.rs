//! Handles, capability and result types.
//!
//! Every result struct has exactly one of its payload or its `error` set.
//! A null `error` means success.

use crate::buffer::unistore_bytes;
use crate::error::{unistore_error, ErrorResult};
use unistore_core::Capability;

/// An opaque operator handle. Free with `unistore_operator_free`.
#[repr(C)]
pub struct unistore_operator {
    _private: [u8; 0],
}

/// An opaque option map. Free with `unistore_operator_options_free`.
#[repr(C)]
pub struct unistore_operator_options {
    _private: [u8; 0],
}

/// An opaque metadata handle. Free with `unistore_metadata_free`.
#[repr(C)]
pub struct unistore_metadata {
    _private: [u8; 0],
}

/// An opaque lister handle. Free with `unistore_lister_free`.
#[repr(C)]
pub struct unistore_lister {
    _private: [u8; 0],
}

/// An opaque entry handle. Free with `unistore_entry_free`.
#[repr(C)]
pub struct unistore_entry {
    _private: [u8; 0],
}

/// An opaque operator info handle. Free with `unistore_operator_info_free`.
#[repr(C)]
pub struct unistore_operator_info {
    _private: [u8; 0],
}

/// An opaque reader handle. Free with `unistore_reader_free`.
#[repr(C)]
pub struct unistore_reader {
    _private: [u8; 0],
}

/// An opaque writer handle. Commit with `unistore_writer_close`, then free
/// with `unistore_writer_free`.
#[repr(C)]
pub struct unistore_writer {
    _private: [u8; 0],
}

/// Capability flags and limits. A limit of `0` means unbounded or unknown.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct unistore_capability {
    /// `stat` is available.
    pub stat: bool,
    /// `stat` honours if-match.
    pub stat_with_if_match: bool,
    /// `stat` honours if-none-match.
    pub stat_with_if_none_match: bool,
    /// `read` is available.
    pub read: bool,
    /// `read` honours if-match.
    pub read_with_if_match: bool,
    /// `read` honours if-none-match.
    pub read_with_if_none_match: bool,
    /// `read` can override cache-control.
    pub read_with_override_cache_control: bool,
    /// `read` can override content-disposition.
    pub read_with_override_content_disposition: bool,
    /// `read` can override content-type.
    pub read_with_override_content_type: bool,
    /// `write` is available.
    pub write: bool,
    /// A writer may take several parts.
    pub write_can_multi: bool,
    /// Empty objects may be written.
    pub write_can_empty: bool,
    /// Writes may append.
    pub write_can_append: bool,
    /// Writes may set cache-control.
    pub write_with_cache_control: bool,
    /// Writes may set content-disposition.
    pub write_with_content_disposition: bool,
    /// Writes may set content-type.
    pub write_with_content_type: bool,
    /// Smallest part of a multi-part write, or 0.
    pub write_multi_min_size: usize,
    /// Largest part of a multi-part write, or 0.
    pub write_multi_max_size: usize,
    /// Largest object, or 0.
    pub write_total_max_size: usize,
    /// `create_dir` is available.
    pub create_dir: bool,
    /// `delete` is available.
    pub delete: bool,
    /// `copy` is available.
    pub copy: bool,
    /// `rename` is available.
    pub rename: bool,
    /// `list` is available.
    pub list: bool,
    /// Listing honours a limit.
    pub list_with_limit: bool,
    /// Listing honours start-after.
    pub list_with_start_after: bool,
    /// Listing can recurse.
    pub list_with_recursive: bool,
    /// Presigning is available.
    pub presign: bool,
    /// Reads can be presigned.
    pub presign_read: bool,
    /// Stats can be presigned.
    pub presign_stat: bool,
    /// Writes can be presigned.
    pub presign_write: bool,
    /// The backend is shared between processes.
    pub shared: bool,
    /// Calls block the calling thread.
    pub blocking: bool,
}

impl From<Capability> for unistore_capability {
    fn from(cap: Capability) -> Self {
        Self {
            stat: cap.stat,
            stat_with_if_match: cap.stat_with_if_match,
            stat_with_if_none_match: cap.stat_with_if_none_match,
            read: cap.read,
            read_with_if_match: cap.read_with_if_match,
            read_with_if_none_match: cap.read_with_if_none_match,
            read_with_override_cache_control: cap.read_with_override_cache_control,
            read_with_override_content_disposition: cap.read_with_override_content_disposition,
            read_with_override_content_type: cap.read_with_override_content_type,
            write: cap.write,
            write_can_multi: cap.write_can_multi,
            write_can_empty: cap.write_can_empty,
            write_can_append: cap.write_can_append,
            write_with_cache_control: cap.write_with_cache_control,
            write_with_content_disposition: cap.write_with_content_disposition,
            write_with_content_type: cap.write_with_content_type,
            write_multi_min_size: cap.write_multi_min_size.unwrap_or(0),
            write_multi_max_size: cap.write_multi_max_size.unwrap_or(0),
            write_total_max_size: cap.write_total_max_size.unwrap_or(0),
            create_dir: cap.create_dir,
            delete: cap.delete,
            copy: cap.copy,
            rename: cap.rename,
            list: cap.list,
            list_with_limit: cap.list_with_limit,
            list_with_start_after: cap.list_with_start_after,
            list_with_recursive: cap.list_with_recursive,
            presign: cap.presign,
            presign_read: cap.presign_read,
            presign_stat: cap.presign_stat,
            presign_write: cap.presign_write,
            shared: cap.shared,
            blocking: cap.blocking,
        }
    }
}

macro_rules! result_type {
    ($(#[$doc:meta])* $name:ident { $field:ident: $ty:ty = $empty:expr }) => {
        $(#[$doc])*
        #[repr(C)]
        #[derive(Debug)]
        pub struct $name {
            /// The payload; unset when `error` is not null.
            pub $field: $ty,
            /// The error, or null on success.
            pub error: *mut unistore_error,
        }

        impl $name {
            pub(crate) fn ok($field: $ty) -> Self {
                Self {
                    $field,
                    error: std::ptr::null_mut(),
                }
            }
        }

        impl ErrorResult for $name {
            fn from_error(error: *mut unistore_error) -> Self {
                Self {
                    $field: $empty,
                    error,
                }
            }
        }
    };
}

result_type! {
    /// Result of `unistore_operator_new`.
    unistore_result_operator_new { op: *mut unistore_operator = std::ptr::null_mut() }
}

result_type! {
    /// Result of `unistore_operator_read`. Free `data` with `unistore_bytes_free`.
    unistore_result_read { data: unistore_bytes = unistore_bytes::empty() }
}

result_type! {
    /// Result of `unistore_operator_stat`.
    unistore_result_stat { meta: *mut unistore_metadata = std::ptr::null_mut() }
}

result_type! {
    /// Result of `unistore_operator_exists`.
    unistore_result_exists { exists: bool = false }
}

result_type! {
    /// Result of `unistore_operator_list`.
    unistore_result_list { lister: *mut unistore_lister = std::ptr::null_mut() }
}

result_type! {
    /// Result of `unistore_lister_next`. Both fields are null at the end.
    unistore_result_lister_next { entry: *mut unistore_entry = std::ptr::null_mut() }
}

result_type! {
    /// Result of `unistore_operator_reader`.
    unistore_result_operator_reader { reader: *mut unistore_reader = std::ptr::null_mut() }
}

result_type! {
    /// Result of `unistore_reader_read`. `size` is 0 at the end of the object.
    unistore_result_reader_read { size: usize = 0 }
}

result_type! {
    /// Result of `unistore_operator_writer`.
    unistore_result_operator_writer { writer: *mut unistore_writer = std::ptr::null_mut() }
}

result_type! {
    /// Result of `unistore_writer_write`. `size` may be less than offered.
    unistore_result_writer_write { size: usize = 0 }
}

/// Moves a value to the heap and returns it as an opaque handle.
pub(crate) fn into_handle<T, H>(value: T) -> *mut H {
    Box::into_raw(Box::new(value)).cast::<H>()
}

/// Borrows the value behind a handle.
///
/// # Safety
///
/// `handle` must be null or come from [`into_handle`] with the same `T`,
/// and must not have been freed.
pub(crate) unsafe fn borrow_handle<'a, T, H>(handle: *const H) -> Option<&'a T> {
    handle.cast::<T>().as_ref()
}

/// Mutably borrows the value behind a handle.
///
/// # Safety
///
/// As [`borrow_handle`], and no other borrow may be live.
pub(crate) unsafe fn borrow_handle_mut<'a, T, H>(handle: *mut H) -> Option<&'a mut T> {
    handle.cast::<T>().as_mut()
}

/// Drops the value behind a handle.
///
/// # Safety
///
/// As [`borrow_handle`]. The handle is invalid afterwards.
pub(crate) unsafe fn free_handle<T, H>(handle: *mut H) {
    if !handle.is_null() {
        drop(Box::from_raw(handle.cast::<T>()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_limits_map_to_zero() {
        let cap = Capability {
            read: true,
            write_total_max_size: Some(64),
            ..Default::default()
        };
        let c: unistore_capability = cap.into();
        assert!(c.read);
        assert!(!c.write);
        assert_eq!(c.write_total_max_size, 64);
        assert_eq!(c.write_multi_max_size, 0);
    }

    #[test]
    fn result_channels_are_exclusive() {
        let ok = unistore_result_exists::ok(true);
        assert!(ok.exists && ok.error.is_null());

        let err = unistore_result_exists::from_error(unistore_error::new(
            unistore_core::ErrorKind::Unexpected,
            "x",
        ));
        assert!(!err.exists && !err.error.is_null());
        unsafe { crate::error::unistore_error_free(err.error) };
    }

    #[test]
    fn handles_round_trip() {
        let handle: *mut unistore_entry = into_handle(String::from("value"));
        unsafe {
            assert_eq!(borrow_handle::<String, _>(handle).map(String::as_str), Some("value"));
            free_handle::<String, _>(handle);
        }
    }
}
