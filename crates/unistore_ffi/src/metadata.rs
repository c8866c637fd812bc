//! Metadata accessors.

use crate::buffer::into_c_string;
use crate::types::{borrow_handle, free_handle, unistore_metadata};
use std::ffi::c_char;
use unistore_core::Metadata;

/// Content length in bytes. Directories report 0.
///
/// # Safety
///
/// `meta` must be null or a live metadata handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_metadata_content_length(meta: *const unistore_metadata) -> u64 {
    borrow_handle::<Metadata, _>(meta).map_or(0, Metadata::content_length)
}

/// Returns true for files.
///
/// # Safety
///
/// `meta` must be null or a live metadata handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_metadata_is_file(meta: *const unistore_metadata) -> bool {
    borrow_handle::<Metadata, _>(meta).is_some_and(Metadata::is_file)
}

/// Returns true for directories.
///
/// # Safety
///
/// `meta` must be null or a live metadata handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_metadata_is_dir(meta: *const unistore_metadata) -> bool {
    borrow_handle::<Metadata, _>(meta).is_some_and(Metadata::is_dir)
}

/// Last modified time in milliseconds since the Unix epoch, or -1 if
/// unknown.
///
/// # Safety
///
/// `meta` must be null or a live metadata handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_metadata_last_modified_ms(
    meta: *const unistore_metadata,
) -> i64 {
    borrow_handle::<Metadata, _>(meta)
        .and_then(Metadata::last_modified_ms)
        .and_then(|ms| i64::try_from(ms).ok())
        .unwrap_or(-1)
}

/// Entity tag, or null if the backend reports none.
/// Free with `unistore_string_free`.
///
/// # Safety
///
/// `meta` must be null or a live metadata handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_metadata_etag(meta: *const unistore_metadata) -> *mut c_char {
    borrow_handle::<Metadata, _>(meta)
        .and_then(Metadata::etag)
        .map_or(std::ptr::null_mut(), into_c_string)
}

/// Content type, or null if unknown. Free with `unistore_string_free`.
///
/// # Safety
///
/// `meta` must be null or a live metadata handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_metadata_content_type(
    meta: *const unistore_metadata,
) -> *mut c_char {
    borrow_handle::<Metadata, _>(meta)
        .and_then(Metadata::content_type)
        .map_or(std::ptr::null_mut(), into_c_string)
}

/// Frees metadata.
///
/// # Safety
///
/// `meta` must be null or a live metadata handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_metadata_free(meta: *mut unistore_metadata) {
    free_handle::<Metadata, _>(meta);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::unistore_bytes;
    use crate::operator::*;
    use std::ffi::CString;
    use std::ptr;

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    #[test]
    fn stat_file_and_dir() {
        unsafe {
            let op = unistore_operator_new(c("memory").as_ptr(), ptr::null()).op;
            let mut payload = b"this_string_length_is_24".to_vec();
            let bytes = unistore_bytes {
                data: payload.as_mut_ptr(),
                len: payload.len(),
                capacity: 0,
            };
            assert!(unistore_operator_write(op, c("/testpath").as_ptr(), &bytes).is_null());

            let stat = unistore_operator_stat(op, c("/testpath").as_ptr());
            assert!(stat.error.is_null());
            assert!(unistore_metadata_is_file(stat.meta));
            assert!(!unistore_metadata_is_dir(stat.meta));
            assert_eq!(unistore_metadata_content_length(stat.meta), 24);
            assert!(unistore_metadata_last_modified_ms(stat.meta) > 0);
            let etag = unistore_metadata_etag(stat.meta);
            assert!(crate::buffer::borrow_str(etag).unwrap().starts_with('"'));
            crate::buffer::unistore_string_free(etag);
            assert!(unistore_metadata_content_type(stat.meta).is_null());
            unistore_metadata_free(stat.meta);

            let stat = unistore_operator_stat(op, c("/").as_ptr());
            assert!(stat.error.is_null());
            assert!(unistore_metadata_is_dir(stat.meta));
            unistore_metadata_free(stat.meta);

            unistore_operator_free(op);
        }
    }

    #[test]
    fn null_metadata_has_defaults() {
        unsafe {
            assert_eq!(unistore_metadata_content_length(ptr::null()), 0);
            assert!(!unistore_metadata_is_file(ptr::null()));
            assert_eq!(unistore_metadata_last_modified_ms(ptr::null()), -1);
            assert!(unistore_metadata_etag(ptr::null()).is_null());
            unistore_metadata_free(ptr::null_mut());
        }
    }
}
