//! Operator construction and whole-object operations.

use crate::buffer::{borrow_str, unistore_bytes};
use crate::error::{guard, unistore_error, ErrorResult};
use crate::types::{
    borrow_handle, borrow_handle_mut, free_handle, into_handle, unistore_lister,
    unistore_metadata, unistore_operator, unistore_operator_options, unistore_result_exists,
    unistore_result_list, unistore_result_operator_new, unistore_result_read,
    unistore_result_stat,
};
use std::collections::HashMap;
use std::ffi::c_char;
use std::ptr;
use unistore_core::{Operator, Result};

type Options = HashMap<String, String>;

/// Converts an operator result into a C result.
pub(crate) fn respond<T, R: ErrorResult>(result: Result<T>, ok: impl FnOnce(T) -> R) -> R {
    match result {
        Ok(value) => ok(value),
        Err(err) => R::from_error(unistore_error::from_error(&err)),
    }
}

/// Borrows an operator handle and a path argument.
///
/// # Safety
///
/// `op` must be null or a live operator handle; `path` must be null or a
/// valid C string.
pub(crate) unsafe fn operator_and_path<'a>(
    op: *const unistore_operator,
    path: *const c_char,
) -> std::result::Result<(&'a Operator, &'a str), *mut unistore_error> {
    let op = borrow_handle::<Operator, _>(op).ok_or_else(|| unistore_error::null_argument("op"))?;
    let path = borrow_str(path).ok_or_else(unistore_error::invalid_path)?;
    Ok((op, path))
}

/// Creates an empty option map.
#[no_mangle]
pub extern "C" fn unistore_operator_options_new() -> *mut unistore_operator_options {
    into_handle(Options::new())
}

/// Sets `key` to `value`, replacing an earlier value.
///
/// Null or non UTF-8 arguments are ignored.
///
/// # Safety
///
/// `options` must be a live option map; `key` and `value` valid C strings.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_options_set(
    options: *mut unistore_operator_options,
    key: *const c_char,
    value: *const c_char,
) {
    let Some(map) = borrow_handle_mut::<Options, _>(options) else {
        return;
    };
    if let (Some(key), Some(value)) = (borrow_str(key), borrow_str(value)) {
        map.insert(key.to_string(), value.to_string());
    }
}

/// Frees an option map.
///
/// # Safety
///
/// `options` must be null or a live option map.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_options_free(options: *mut unistore_operator_options) {
    free_handle::<Options, _>(options);
}

/// Creates an operator for `scheme`.
///
/// `options` may be null. The options are copied; the map may be freed
/// right after this call.
///
/// # Safety
///
/// `scheme` must be a valid C string; `options` null or a live option map.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_new(
    scheme: *const c_char,
    options: *const unistore_operator_options,
) -> unistore_result_operator_new {
    guard(|| {
        let Some(scheme) = borrow_str(scheme) else {
            return unistore_result_operator_new::from_error(unistore_error::null_argument(
                "scheme",
            ));
        };
        let options = borrow_handle::<Options, _>(options)
            .cloned()
            .unwrap_or_default();
        respond(Operator::new(scheme, options), |op| {
            unistore_result_operator_new::ok(into_handle(op))
        })
    })
}

/// Frees an operator. Readers, writers and listers opened from it stay
/// valid.
///
/// # Safety
///
/// `op` must be null or a live operator handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_free(op: *mut unistore_operator) {
    free_handle::<Operator, _>(op);
}

/// Reads a whole object. Free the returned data with `unistore_bytes_free`.
///
/// # Safety
///
/// `op` must be a live operator handle; `path` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_read(
    op: *const unistore_operator,
    path: *const c_char,
) -> unistore_result_read {
    guard(|| {
        let (op, path) = match operator_and_path(op, path) {
            Ok(args) => args,
            Err(err) => return unistore_result_read::from_error(err),
        };
        respond(op.read(path), |data| {
            unistore_result_read::ok(unistore_bytes::from_vec(data.to_vec()))
        })
    })
}

/// Writes a whole object. `bytes` is borrowed and copied.
///
/// Returns null on success, or an error to free with `unistore_error_free`.
///
/// # Safety
///
/// `op` must be a live operator handle; `path` a valid C string; `bytes`
/// must point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_write(
    op: *const unistore_operator,
    path: *const c_char,
    bytes: *const unistore_bytes,
) -> *mut unistore_error {
    guard(|| {
        let (op, path) = match operator_and_path(op, path) {
            Ok(args) => args,
            Err(err) => return err,
        };
        let Some(bytes) = bytes.as_ref() else {
            return unistore_error::null_argument("bytes");
        };
        respond(op.write(path, bytes.as_slice().to_vec()), |_| ptr::null_mut())
    })
}

/// Returns metadata for a path. Free it with `unistore_metadata_free`.
///
/// # Safety
///
/// `op` must be a live operator handle; `path` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_stat(
    op: *const unistore_operator,
    path: *const c_char,
) -> unistore_result_stat {
    guard(|| {
        let (op, path) = match operator_and_path(op, path) {
            Ok(args) => args,
            Err(err) => return unistore_result_stat::from_error(err),
        };
        respond(op.stat(path), |meta| {
            unistore_result_stat::ok(into_handle::<_, unistore_metadata>(meta))
        })
    })
}

/// Checks whether a path exists. A missing path is not an error.
///
/// # Safety
///
/// `op` must be a live operator handle; `path` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_exists(
    op: *const unistore_operator,
    path: *const c_char,
) -> unistore_result_exists {
    guard(|| {
        let (op, path) = match operator_and_path(op, path) {
            Ok(args) => args,
            Err(err) => return unistore_result_exists::from_error(err),
        };
        respond(op.exists(path), unistore_result_exists::ok)
    })
}

/// Creates a directory. The path must end with `/`.
///
/// # Safety
///
/// `op` must be a live operator handle; `path` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_create_dir(
    op: *const unistore_operator,
    path: *const c_char,
) -> *mut unistore_error {
    guard(|| match operator_and_path(op, path) {
        Ok((op, path)) => respond(op.create_dir(path), |()| ptr::null_mut()),
        Err(err) => err,
    })
}

/// Deletes a path. Deleting a missing path succeeds.
///
/// # Safety
///
/// `op` must be a live operator handle; `path` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_delete(
    op: *const unistore_operator,
    path: *const c_char,
) -> *mut unistore_error {
    guard(|| match operator_and_path(op, path) {
        Ok((op, path)) => respond(op.delete(path), |()| ptr::null_mut()),
        Err(err) => err,
    })
}

/// Renames `src` to `dest`.
///
/// # Safety
///
/// `op` must be a live operator handle; `src` and `dest` valid C strings.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_rename(
    op: *const unistore_operator,
    src: *const c_char,
    dest: *const c_char,
) -> *mut unistore_error {
    guard(|| {
        let (op, src) = match operator_and_path(op, src) {
            Ok(args) => args,
            Err(err) => return err,
        };
        let Some(dest) = borrow_str(dest) else {
            return unistore_error::invalid_path();
        };
        respond(op.rename(src, dest), |()| ptr::null_mut())
    })
}

/// Copies `src` to `dest`.
///
/// # Safety
///
/// `op` must be a live operator handle; `src` and `dest` valid C strings.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_copy(
    op: *const unistore_operator,
    src: *const c_char,
    dest: *const c_char,
) -> *mut unistore_error {
    guard(|| {
        let (op, src) = match operator_and_path(op, src) {
            Ok(args) => args,
            Err(err) => return err,
        };
        let Some(dest) = borrow_str(dest) else {
            return unistore_error::invalid_path();
        };
        respond(op.copy(src, dest), |()| ptr::null_mut())
    })
}

/// Lists a directory. Free the lister with `unistore_lister_free`.
///
/// # Safety
///
/// `op` must be a live operator handle; `path` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_list(
    op: *const unistore_operator,
    path: *const c_char,
) -> unistore_result_list {
    guard(|| {
        let (op, path) = match operator_and_path(op, path) {
            Ok(args) => args,
            Err(err) => return unistore_result_list::from_error(err),
        };
        respond(op.list(path), |lister| {
            unistore_result_list::ok(into_handle::<_, unistore_lister>(lister))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::unistore_bytes_free;
    use crate::error::{unistore_code, unistore_error_free};
    use std::ffi::CString;

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    unsafe fn memory_operator() -> *mut unistore_operator {
        let result = unistore_operator_new(c("memory").as_ptr(), ptr::null());
        assert!(result.error.is_null());
        assert!(!result.op.is_null());
        result.op
    }

    #[test]
    fn write_then_read() {
        unsafe {
            let op = memory_operator();
            let path = c("/testpath");
            let mut payload = b"this_string_length_is_24".to_vec();
            let bytes = unistore_bytes {
                data: payload.as_mut_ptr(),
                len: payload.len(),
                capacity: 0,
            };
            assert!(unistore_operator_write(op, path.as_ptr(), &bytes).is_null());

            let mut result = unistore_operator_read(op, path.as_ptr());
            assert!(result.error.is_null());
            assert_eq!(result.data.len, 24);
            assert_eq!(result.data.as_slice(), &payload[..]);
            unistore_bytes_free(&mut result.data);
            unistore_bytes_free(&mut result.data);

            unistore_operator_free(op);
        }
    }

    #[test]
    fn read_missing_reports_not_found() {
        unsafe {
            let op = memory_operator();
            let result = unistore_operator_read(op, c("/testpath").as_ptr());
            assert!(result.data.is_null());
            assert!(!result.error.is_null());
            assert_eq!((*result.error).code, unistore_code::UNISTORE_NOT_FOUND);
            assert!((*result.error).message.len > 0);
            unistore_error_free(result.error);

            let exists = unistore_operator_exists(op, c("/testpath").as_ptr());
            assert!(exists.error.is_null());
            assert!(!exists.exists);
            unistore_operator_free(op);
        }
    }

    #[test]
    fn options_configure_the_operator() {
        unsafe {
            let options = unistore_operator_options_new();
            unistore_operator_options_set(options, c("root").as_ptr(), c("/myroot").as_ptr());
            unistore_operator_options_set(options, c("chunk_size").as_ptr(), c("oops").as_ptr());
            let result = unistore_operator_new(c("memory").as_ptr(), options);
            assert!(result.op.is_null());
            assert_eq!(
                (*result.error).code,
                unistore_code::UNISTORE_CONFIG_INVALID
            );
            unistore_error_free(result.error);

            unistore_operator_options_set(options, c("chunk_size").as_ptr(), c("1024").as_ptr());
            let result = unistore_operator_new(c("memory").as_ptr(), options);
            unistore_operator_options_free(options);
            assert!(result.error.is_null());
            unistore_operator_free(result.op);
        }
    }

    #[test]
    fn unknown_scheme_is_unsupported() {
        unsafe {
            let result = unistore_operator_new(c("s3").as_ptr(), ptr::null());
            assert!(result.op.is_null());
            assert_eq!((*result.error).code, unistore_code::UNISTORE_UNSUPPORTED);
            unistore_error_free(result.error);
        }
    }

    #[test]
    fn null_handles_are_errors() {
        unsafe {
            let result = unistore_operator_read(ptr::null(), c("a").as_ptr());
            assert_eq!((*result.error).code, unistore_code::UNISTORE_UNEXPECTED);
            unistore_error_free(result.error);

            let op = memory_operator();
            let err = unistore_operator_write(op, c("a").as_ptr(), ptr::null());
            assert!(!err.is_null());
            unistore_error_free(err);

            let err = unistore_operator_delete(op, ptr::null());
            assert!(!err.is_null());
            unistore_error_free(err);
            unistore_operator_free(op);
        }
    }

    #[test]
    fn rename_copy_and_delete() {
        unsafe {
            let op = memory_operator();
            let mut payload = b"abc".to_vec();
            let bytes = unistore_bytes {
                data: payload.as_mut_ptr(),
                len: payload.len(),
                capacity: 0,
            };
            assert!(unistore_operator_write(op, c("a").as_ptr(), &bytes).is_null());
            assert!(unistore_operator_copy(op, c("a").as_ptr(), c("b").as_ptr()).is_null());
            assert!(unistore_operator_rename(op, c("b").as_ptr(), c("c").as_ptr()).is_null());
            assert!(!unistore_operator_exists(op, c("b").as_ptr()).exists);
            assert!(unistore_operator_exists(op, c("c").as_ptr()).exists);

            let err = unistore_operator_rename(op, c("c").as_ptr(), c("c").as_ptr());
            assert_eq!((*err).code, unistore_code::UNISTORE_IS_SAME_FILE);
            unistore_error_free(err);

            assert!(unistore_operator_delete(op, c("c").as_ptr()).is_null());
            assert!(unistore_operator_delete(op, c("c").as_ptr()).is_null());
            unistore_operator_free(op);
        }
    }

    #[test]
    fn create_dir_is_idempotent() {
        unsafe {
            let op = memory_operator();
            assert!(unistore_operator_create_dir(op, c("/testdir1/").as_ptr()).is_null());
            assert!(unistore_operator_create_dir(op, c("/testdir1/").as_ptr()).is_null());
            let err = unistore_operator_create_dir(op, c("/file").as_ptr());
            assert_eq!((*err).code, unistore_code::UNISTORE_NOT_A_DIRECTORY);
            unistore_error_free(err);
            unistore_operator_free(op);
        }
    }
}
