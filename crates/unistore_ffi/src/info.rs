//! Operator information.

use crate::buffer::into_c_string;
use crate::types::{
    borrow_handle, free_handle, into_handle, unistore_capability, unistore_operator,
    unistore_operator_info,
};
use std::ffi::c_char;
use unistore_core::{Operator, OperatorInfo};

/// Snapshots an operator's information. Returns null for a null operator.
///
/// # Safety
///
/// `op` must be null or a live operator handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_info_new(
    op: *const unistore_operator,
) -> *mut unistore_operator_info {
    borrow_handle::<Operator, _>(op).map_or(std::ptr::null_mut(), |op| into_handle(op.info()))
}

unsafe fn with_info<R>(
    info: *const unistore_operator_info,
    default: R,
    f: impl FnOnce(&OperatorInfo) -> R,
) -> R {
    borrow_handle::<OperatorInfo, _>(info).map_or(default, f)
}

/// Returns the scheme. Free with `unistore_string_free`.
///
/// # Safety
///
/// `info` must be null or a live info handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_info_get_scheme(
    info: *const unistore_operator_info,
) -> *mut c_char {
    with_info(info, std::ptr::null_mut(), |i| into_c_string(i.scheme()))
}

/// Returns the instance name. Free with `unistore_string_free`.
///
/// # Safety
///
/// `info` must be null or a live info handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_info_get_name(
    info: *const unistore_operator_info,
) -> *mut c_char {
    with_info(info, std::ptr::null_mut(), |i| into_c_string(i.name()))
}

/// Returns the normalized root. Free with `unistore_string_free`.
///
/// # Safety
///
/// `info` must be null or a live info handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_info_get_root(
    info: *const unistore_operator_info,
) -> *mut c_char {
    with_info(info, std::ptr::null_mut(), |i| into_c_string(i.root()))
}

/// Returns native plus emulated capabilities.
///
/// # Safety
///
/// `info` must be null or a live info handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_info_get_full_capability(
    info: *const unistore_operator_info,
) -> unistore_capability {
    with_info(info, unistore_capability::default(), |i| {
        i.full_capability().into()
    })
}

/// Returns the backend's own capabilities.
///
/// # Safety
///
/// `info` must be null or a live info handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_info_get_native_capability(
    info: *const unistore_operator_info,
) -> unistore_capability {
    with_info(info, unistore_capability::default(), |i| {
        i.native_capability().into()
    })
}

/// Frees an info handle.
///
/// # Safety
///
/// `info` must be null or a live info handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_info_free(info: *mut unistore_operator_info) {
    free_handle::<OperatorInfo, _>(info);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{borrow_str, unistore_string_free};
    use crate::operator::*;
    use std::ffi::CString;
    use std::ptr;

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    unsafe fn take_string(ptr: *mut c_char) -> String {
        let s = borrow_str(ptr).unwrap().to_string();
        unistore_string_free(ptr);
        s
    }

    #[test]
    fn info_reports_scheme_and_root() {
        unsafe {
            let options = unistore_operator_options_new();
            unistore_operator_options_set(options, c("root").as_ptr(), c("/myroot").as_ptr());
            let op = unistore_operator_new(c("memory").as_ptr(), options).op;
            unistore_operator_options_free(options);

            let info = unistore_operator_info_new(op);
            assert!(!info.is_null());
            assert_eq!(take_string(unistore_operator_info_get_scheme(info)), "memory");
            assert_eq!(take_string(unistore_operator_info_get_root(info)), "/myroot/");
            let _ = take_string(unistore_operator_info_get_name(info));

            unistore_operator_info_free(info);
            unistore_operator_free(op);
        }
    }

    #[test]
    fn native_is_subset_of_full() {
        unsafe {
            let op = unistore_operator_new(c("memory").as_ptr(), ptr::null()).op;
            let info = unistore_operator_info_new(op);
            let native = unistore_operator_info_get_native_capability(info);
            let full = unistore_operator_info_get_full_capability(info);

            assert!(native.read && full.read);
            assert!(!native.copy && full.copy);
            assert!(!native.rename && full.rename);
            assert!(!native.list_with_recursive && full.list_with_recursive);
            assert!(full.write_can_append);
            assert!(native.blocking && full.blocking);

            unistore_operator_info_free(info);
            unistore_operator_free(op);
        }
    }

    #[test]
    fn null_info_is_empty() {
        unsafe {
            assert!(unistore_operator_info_new(ptr::null()).is_null());
            assert!(unistore_operator_info_get_scheme(ptr::null()).is_null());
            let cap = unistore_operator_info_get_full_capability(ptr::null());
            assert_eq!(cap, unistore_capability::default());
        }
    }
}
