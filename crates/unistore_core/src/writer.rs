//! Buffered writes with explicit commit.

use crate::error::{Error, ErrorKind, Result};
use crate::operator::Operator;
use bytes::Bytes;
use std::io;
use std::mem;
use unistore_storage::{Metadata, OpWrite};

/// Accumulates bytes for one object and commits them in a single write.
///
/// Nothing is visible to readers until [`Writer::close`]. Dropping a writer
/// that was neither closed nor aborted commits it; a failure on that path is
/// logged with `tracing` and otherwise lost, so prefer `close`.
pub struct Writer {
    op: Operator,
    path: String,
    abs: String,
    args: OpWrite,
    buf: Vec<u8>,
    limit: Option<usize>,
    open: bool,
}

impl Writer {
    pub(crate) fn new(op: Operator, path: String, abs: String, args: OpWrite) -> Self {
        let limit = op.info().full_capability().write_total_max_size;
        Self {
            op,
            path,
            abs,
            args,
            buf: Vec::new(),
            limit,
            open: true,
        }
    }

    /// Returns the object path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the number of bytes accepted so far.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.buf.len()
    }

    /// Accepts bytes, returning how many were taken.
    ///
    /// Fewer than `data.len()` bytes are taken only when the backend's total
    /// size limit would be exceeded.
    ///
    /// # Errors
    ///
    /// Returns an error if the limit is already reached and `data` is not
    /// empty.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        let accepted = match self.limit {
            None => data.len(),
            Some(limit) => data.len().min(limit.saturating_sub(self.buf.len())),
        };
        if accepted == 0 && !data.is_empty() {
            return Err(Error::new(
                ErrorKind::Unexpected,
                format!(
                    "object would exceed the {} byte limit",
                    self.limit.unwrap_or_default()
                ),
            )
            .with_operation("write")
            .with_path(self.path.clone()));
        }
        self.buf.extend_from_slice(&data[..accepted]);
        Ok(accepted)
    }

    /// Commits the buffered bytes and returns the new metadata.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the commit fails. The data is lost.
    pub fn close(mut self) -> Result<Metadata> {
        self.commit()
    }

    /// Discards the buffered bytes. Nothing is written.
    pub fn abort(mut self) {
        self.open = false;
        self.buf = Vec::new();
    }

    fn commit(&mut self) -> Result<Metadata> {
        self.open = false;
        let data = Bytes::from(mem::take(&mut self.buf));
        self.op
            .backend()
            .write(&self.abs, data, &self.args)
            .map_err(|e| Error::from_storage("write", self.path.clone(), e))
    }
}

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Writer::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        if let Err(error) = self.commit() {
            tracing::warn!(path = %self.path, error = %error, "writer commit on drop failed");
        }
    }
}

impl std::fmt::Debug for Writer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Writer")
            .field("path", &self.path)
            .field("buffered", &self.buf.len())
            .field("append", &self.args.append)
            .field("open", &self.open)
            .finish()
    }
}
