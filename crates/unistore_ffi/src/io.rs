//! Streaming readers and writers.

use crate::buffer::unistore_bytes;
use crate::error::{guard, unistore_error, ErrorResult};
use crate::operator::{operator_and_path, respond};
use crate::types::{
    borrow_handle_mut, free_handle, into_handle, unistore_operator, unistore_reader,
    unistore_result_operator_reader, unistore_result_operator_writer,
    unistore_result_reader_read, unistore_result_writer_write, unistore_writer,
};
use std::ffi::c_char;
use unistore_core::{ErrorKind, Reader, Writer};

/// What a writer handle owns. `None` once the writer is closed.
type WriterSlot = Option<Writer>;

/// Opens a reader on a file. Free with `unistore_reader_free`.
///
/// # Safety
///
/// `op` must be a live operator handle; `path` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_reader(
    op: *const unistore_operator,
    path: *const c_char,
) -> unistore_result_operator_reader {
    guard(|| {
        let (op, path) = match operator_and_path(op, path) {
            Ok(args) => args,
            Err(err) => return unistore_result_operator_reader::from_error(err),
        };
        respond(op.reader(path), |reader| {
            unistore_result_operator_reader::ok(into_handle::<_, unistore_reader>(reader))
        })
    })
}

/// Reads up to `len` bytes into `buf`.
///
/// The buffer is filled completely unless the object ends first; a `size`
/// of 0 means the end was reached.
///
/// # Safety
///
/// `reader` must be a live reader handle; `buf` must point to `len`
/// writable bytes.
#[no_mangle]
pub unsafe extern "C" fn unistore_reader_read(
    reader: *mut unistore_reader,
    buf: *mut u8,
    len: usize,
) -> unistore_result_reader_read {
    guard(|| {
        let Some(reader) = borrow_handle_mut::<Reader, _>(reader) else {
            return unistore_result_reader_read::from_error(unistore_error::null_argument(
                "reader",
            ));
        };
        if len == 0 {
            return unistore_result_reader_read::ok(0);
        }
        if buf.is_null() {
            return unistore_result_reader_read::from_error(unistore_error::null_argument(
                "buf",
            ));
        }
        let buf = std::slice::from_raw_parts_mut(buf, len);
        respond(reader.read(buf), unistore_result_reader_read::ok)
    })
}

/// Frees a reader.
///
/// # Safety
///
/// `reader` must be null or a live reader handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_reader_free(reader: *mut unistore_reader) {
    free_handle::<Reader, _>(reader);
}

/// Opens a writer that replaces the object.
///
/// Commit with `unistore_writer_close` to learn whether the data was
/// stored, then free with `unistore_writer_free`. Freeing an unclosed
/// writer also commits, but a failure there cannot be reported.
///
/// # Safety
///
/// `op` must be a live operator handle; `path` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn unistore_operator_writer(
    op: *const unistore_operator,
    path: *const c_char,
) -> unistore_result_operator_writer {
    guard(|| {
        let (op, path) = match operator_and_path(op, path) {
            Ok(args) => args,
            Err(err) => return unistore_result_operator_writer::from_error(err),
        };
        respond(op.writer(path), |writer| {
            unistore_result_operator_writer::ok(into_handle::<WriterSlot, unistore_writer>(Some(
                writer,
            )))
        })
    })
}

/// Offers bytes to a writer. `size` is how many were accepted, which is
/// less than offered only at the backend's size limit.
///
/// # Safety
///
/// `writer` must be a live writer handle; `bytes` must point to `len`
/// readable bytes.
#[no_mangle]
pub unsafe extern "C" fn unistore_writer_write(
    writer: *mut unistore_writer,
    bytes: *const unistore_bytes,
) -> unistore_result_writer_write {
    guard(|| {
        let Some(slot) = borrow_handle_mut::<WriterSlot, _>(writer) else {
            return unistore_result_writer_write::from_error(unistore_error::null_argument(
                "writer",
            ));
        };
        let Some(writer) = slot.as_mut() else {
            return unistore_result_writer_write::from_error(closed_writer());
        };
        let Some(bytes) = bytes.as_ref() else {
            return unistore_result_writer_write::from_error(unistore_error::null_argument(
                "bytes",
            ));
        };
        respond(writer.write(bytes.as_slice()), unistore_result_writer_write::ok)
    })
}

/// Commits the buffered bytes. Returns null on success.
///
/// The handle stays valid and must still be freed; further writes or a
/// second close fail with `UNISTORE_UNEXPECTED`.
///
/// # Safety
///
/// `writer` must be a live writer handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_writer_close(
    writer: *mut unistore_writer,
) -> *mut unistore_error {
    guard(|| {
        let Some(slot) = borrow_handle_mut::<WriterSlot, _>(writer) else {
            return unistore_error::null_argument("writer");
        };
        let Some(writer) = slot.take() else {
            return closed_writer();
        };
        respond(writer.close(), |_| std::ptr::null_mut())
    })
}

/// Frees a writer, committing it first unless it was closed. A commit
/// failure here is logged and dropped.
///
/// # Safety
///
/// `writer` must be null or a live writer handle.
#[no_mangle]
pub unsafe extern "C" fn unistore_writer_free(writer: *mut unistore_writer) {
    free_handle::<WriterSlot, _>(writer);
}

fn closed_writer() -> *mut unistore_error {
    unistore_error::new(ErrorKind::Unexpected, "writer is already closed")
}
