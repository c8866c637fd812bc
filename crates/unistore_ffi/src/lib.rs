//! # Unistore FFI
//!
//! Stable C ABI over [`unistore_core::Operator`].
//!
//! ## Conventions
//!
//! - Every fallible call returns either a `*mut unistore_error` (null on
//!   success) or a result struct with one payload field and an `error`
//!   field. Exactly one of them is set.
//! - Everything the library returns is owned by the caller and has a
//!   matching `*_free` function. Buffers use `unistore_bytes_free`, which
//!   resets the buffer so a second call is harmless. Strings use
//!   `unistore_string_free`.
//! - Buffers passed into the library are borrowed and copied.
//! - Paths are NUL-terminated UTF-8. A null handle is reported as
//!   `UNISTORE_UNEXPECTED`, never dereferenced.
//! - A panic is caught at the boundary and reported as
//!   `UNISTORE_UNEXPECTED`.
//!
//! ## Example
//!
//! ```c
//! unistore_result_operator_new r = unistore_operator_new("memory", NULL);
//! unistore_bytes data = { (uint8_t *)"hello", 5, 0 };
//! unistore_error *err = unistore_operator_write(r.op, "/testpath", &data);
//! unistore_result_read rr = unistore_operator_read(r.op, "/testpath");
//! unistore_bytes_free(&rr.data);
//! unistore_operator_free(r.op);
//! ```

#![allow(non_camel_case_types)]
#![warn(missing_docs)]

mod buffer;
mod error;
mod info;
mod io;
mod lister;
mod metadata;
mod operator;
mod types;

pub use buffer::{unistore_bytes, unistore_bytes_free, unistore_string_free};
pub use error::{unistore_code, unistore_error, unistore_error_free};
pub use info::*;
pub use io::*;
pub use lister::*;
pub use metadata::*;
pub use operator::{
    unistore_operator_copy, unistore_operator_create_dir, unistore_operator_delete,
    unistore_operator_exists, unistore_operator_free, unistore_operator_list,
    unistore_operator_new, unistore_operator_options_free, unistore_operator_options_new,
    unistore_operator_options_set, unistore_operator_read, unistore_operator_rename,
    unistore_operator_stat, unistore_operator_write,
};
pub use types::{
    unistore_capability, unistore_entry, unistore_lister, unistore_metadata, unistore_operator,
    unistore_operator_info, unistore_operator_options, unistore_reader,
    unistore_result_exists, unistore_result_list, unistore_result_lister_next,
    unistore_result_operator_new, unistore_result_operator_reader,
    unistore_result_operator_writer, unistore_result_read, unistore_result_reader_read,
    unistore_result_stat, unistore_result_writer_write, unistore_writer,
};
