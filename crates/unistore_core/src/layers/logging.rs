//! Structured logging of backend calls.

use super::Layer;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use unistore_storage::{
    BackendInfo, EntryStream, ErrorKind, Metadata, OpList, OpRead, OpStat, OpWrite,
    StorageBackend, StorageResult,
};

/// Emits a `tracing` event for every backend call.
///
/// Successful calls log at `debug`, missing paths at `debug` and every other
/// failure at `warn`. Install a subscriber in the application to see them.
///
/// ```rust
/// use unistore_core::{LoggingLayer, Operator};
/// use unistore_storage::MemoryBackend;
///
/// let op = Operator::builder(MemoryBackend::new())
///     .layer(LoggingLayer)
///     .finish();
/// op.write("a.txt", "hi").unwrap();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer;

impl Layer for LoggingLayer {
    fn layer(&self, inner: Arc<dyn StorageBackend>) -> Arc<dyn StorageBackend> {
        let scheme = inner.info().scheme;
        Arc::new(LoggingBackend { inner, scheme })
    }
}

#[derive(Debug)]
struct LoggingBackend {
    inner: Arc<dyn StorageBackend>,
    scheme: String,
}

impl LoggingBackend {
    fn observe<T>(
        &self,
        operation: &'static str,
        path: &str,
        result: StorageResult<T>,
    ) -> StorageResult<T> {
        match &result {
            Ok(_) => debug!(scheme = %self.scheme, operation, path, "finished"),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(scheme = %self.scheme, operation, path, error = %error, "not found");
            }
            Err(error) => {
                warn!(
                    scheme = %self.scheme,
                    operation,
                    path,
                    kind = %error.kind(),
                    error = %error,
                    "failed"
                );
            }
        }
        result
    }
}

impl StorageBackend for LoggingBackend {
    fn info(&self) -> BackendInfo {
        self.inner.info()
    }

    fn stat(&self, path: &str, args: &OpStat) -> StorageResult<Metadata> {
        trace!(scheme = %self.scheme, path, "stat started");
        self.observe("stat", path, self.inner.stat(path, args))
    }

    fn read(&self, path: &str, args: &OpRead) -> StorageResult<Bytes> {
        trace!(scheme = %self.scheme, path, range = ?args.range, "read started");
        let result = self.inner.read(path, args);
        if let Ok(data) = &result {
            trace!(scheme = %self.scheme, path, bytes = data.len(), "read returned");
        }
        self.observe("read", path, result)
    }

    fn write(&self, path: &str, data: Bytes, args: &OpWrite) -> StorageResult<Metadata> {
        trace!(
            scheme = %self.scheme,
            path,
            bytes = data.len(),
            append = args.append,
            "write started"
        );
        self.observe("write", path, self.inner.write(path, data, args))
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        self.observe("delete", path, self.inner.delete(path))
    }

    fn create_dir(&self, path: &str) -> StorageResult<()> {
        self.observe("create_dir", path, self.inner.create_dir(path))
    }

    fn list(&self, path: &str, args: &OpList) -> StorageResult<EntryStream> {
        trace!(scheme = %self.scheme, path, recursive = args.recursive, "list started");
        self.observe("list", path, self.inner.list(path, args))
    }

    fn copy(&self, from: &str, to: &str) -> StorageResult<()> {
        debug!(scheme = %self.scheme, from, to, "copy");
        self.observe("copy", from, self.inner.copy(from, to))
    }

    fn rename(&self, from: &str, to: &str) -> StorageResult<()> {
        debug!(scheme = %self.scheme, from, to, "rename");
        self.observe("rename", from, self.inner.rename(from, to))
    }
}
