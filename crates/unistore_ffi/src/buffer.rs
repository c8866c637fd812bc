//! Byte buffers and strings handed across the boundary.

use std::ffi::{c_char, CStr, CString};

/// An owned or borrowed byte buffer.
///
/// Buffers returned by this library are owned by the caller and must be
/// released with [`unistore_bytes_free`]. Buffers passed *into* the library
/// (for example to `unistore_operator_write`) are only borrowed; `capacity`
/// is ignored on input.
///
/// The data is never NUL-terminated. Always use `len`.
#[repr(C)]
#[derive(Debug)]
pub struct unistore_bytes {
    /// Pointer to the first byte, or null for an empty buffer.
    pub data: *mut u8,
    /// Number of valid bytes.
    pub len: usize,
    /// Allocation size. Internal; needed to free the buffer.
    pub capacity: usize,
}

impl unistore_bytes {
    /// Takes ownership of a vector.
    pub fn from_vec(vec: Vec<u8>) -> Self {
        let mut vec = std::mem::ManuallyDrop::new(vec);
        Self {
            data: vec.as_mut_ptr(),
            len: vec.len(),
            capacity: vec.capacity(),
        }
    }

    /// Creates an empty buffer.
    pub fn empty() -> Self {
        Self {
            data: std::ptr::null_mut(),
            len: 0,
            capacity: 0,
        }
    }

    /// Returns true if the buffer holds no allocation.
    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    /// Views the bytes.
    ///
    /// # Safety
    ///
    /// `data` must point to `len` readable bytes, or be null.
    pub unsafe fn as_slice(&self) -> &[u8] {
        if self.data.is_null() || self.len == 0 {
            return &[];
        }
        std::slice::from_raw_parts(self.data, self.len)
    }

    /// Converts back to a vector, consuming the buffer.
    ///
    /// # Safety
    ///
    /// The buffer must have been created by [`unistore_bytes::from_vec`].
    pub unsafe fn into_vec(self) -> Vec<u8> {
        if self.data.is_null() {
            return Vec::new();
        }
        Vec::from_raw_parts(self.data, self.len, self.capacity)
    }
}

/// Frees a buffer returned by this library and resets it to empty.
///
/// Because the buffer is reset, calling this twice on the same buffer is
/// harmless.
///
/// # Safety
///
/// `bytes` must be null or point to a buffer returned by this library.
#[no_mangle]
pub unsafe extern "C" fn unistore_bytes_free(bytes: *mut unistore_bytes) {
    if bytes.is_null() {
        return;
    }
    let bytes = &mut *bytes;
    // capacity 0 marks a caller-owned buffer
    if !bytes.data.is_null() && bytes.capacity != 0 {
        drop(Vec::from_raw_parts(bytes.data, bytes.len, bytes.capacity));
    }
    *bytes = unistore_bytes::empty();
}

/// Frees a string returned by this library.
///
/// # Safety
///
/// `string` must be null or a string returned by this library, not yet
/// freed.
#[no_mangle]
pub unsafe extern "C" fn unistore_string_free(string: *mut c_char) {
    if !string.is_null() {
        drop(CString::from_raw(string));
    }
}

/// Copies a Rust string into a new C string.
///
/// Interior NUL bytes cannot be represented; the string is cut at the
/// first one.
pub(crate) fn into_c_string(s: &str) -> *mut c_char {
    let end = s.find('\0').unwrap_or(s.len());
    CString::new(&s[..end]).map_or(std::ptr::null_mut(), CString::into_raw)
}

/// Borrows a caller-supplied UTF-8 C string.
///
/// # Safety
///
/// `ptr` must be null or a valid NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn borrow_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}
