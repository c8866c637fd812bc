//! Directory listing.

use crate::buffer::into_c_string;
use crate::error::{guard, unistore_error, ErrorResult};
use crate::operator::respond;
use crate::types::{
    borrow_handle, borrow_handle_mut, free_handle, into_handle, unistore_entry, unistore_lister,
    unistore_result_lister_next,
};
use std::ffi::c_char;
use unistore_core::{Entry, Lister};

/// Returns the next entry.
///
/// At the end of the listing both `entry` and `error` are null. After an
/// error the lister is exhausted.
///
/// # Safety
///
/// `lister` must be a live lister handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_lister_next(
    lister: *mut unistore_lister,
) -> unistore_result_lister_next {
    guard(|| {
        let Some(lister) = borrow_handle_mut::<Lister, _>(lister) else {
            return unistore_result_lister_next::from_error(unistore_error::null_argument(
                "lister",
            ));
        };
        respond(lister.next_entry(), |entry| {
            unistore_result_lister_next::ok(
                entry.map_or(std::ptr::null_mut(), into_handle::<_, unistore_entry>),
            )
        })
    })
}

/// Frees a lister.
///
/// # Safety
///
/// `lister` must be null or a live lister handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_lister_free(lister: *mut unistore_lister) {
    free_handle::<Lister, _>(lister);
}

/// Returns the entry's path relative to the operator root.
/// Free with `unistore_string_free`.
///
/// # Safety
///
/// `entry` must be null or a live entry handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_entry_path(entry: *const unistore_entry) -> *mut c_char {
    borrow_handle::<Entry, _>(entry).map_or(std::ptr::null_mut(), |e| into_c_string(e.path()))
}

/// Returns the last path segment; directories keep their trailing `/`.
/// Free with `unistore_string_free`.
///
/// # Safety
///
/// `entry` must be null or a live entry handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_entry_name(entry: *const unistore_entry) -> *mut c_char {
    borrow_handle::<Entry, _>(entry).map_or(std::ptr::null_mut(), |e| into_c_string(e.name()))
}

/// Frees an entry.
///
/// # Safety
///
/// `entry` must be null or a live entry handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_entry_free(entry: *mut unistore_entry) {
    free_handle::<Entry, _>(entry);
}
