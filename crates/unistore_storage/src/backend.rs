//! Storage backend trait definition.

use crate::capability::Capability;
use crate::entry::EntryStream;
use crate::error::{StorageError, StorageResult};
use crate::metadata::Metadata;
use crate::ops::{OpList, OpRead, OpStat, OpWrite};
use bytes::Bytes;
use std::fmt::Debug;

/// Static description of a backend instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    /// Scheme identifier, e.g. `memory` or `fs`.
    pub scheme: String,
    /// Instance name (a bucket, a directory, or the scheme by default).
    pub name: String,
    /// What the backend implements itself.
    pub native_capability: Capability,
}

/// The primitive operations every storage backend plugs in.
///
/// Backends receive **absolute** paths: the operator root is already
/// prepended and the path is normalized (see [`crate::normalize_path`]).
/// A trailing `/` marks a directory path.
///
/// Only `info`, `stat`, `read`, `write` and `delete` are required. The other
/// operations default to [`StorageError::Unsupported`]; a backend that
/// overrides one must also set the matching flag in its native capability,
/// because the operator routes by capability and never probes.
///
/// # Invariants
///
/// - `write` replaces the whole object unless `args.append` is set and the
///   backend reports `write_can_append`
/// - `delete` of a missing path succeeds
/// - `read` of a directory path fails with `IsADirectory`
/// - Backends must be `Send + Sync`; one instance serves concurrent callers
pub trait StorageBackend: Send + Sync + Debug {
    /// Returns the scheme, name and native capability.
    fn info(&self) -> BackendInfo;

    /// Returns metadata for a path.
    ///
    /// # Errors
    ///
    /// `NotFound` if the path does not exist.
    fn stat(&self, path: &str, args: &OpStat) -> StorageResult<Metadata>;

    /// Reads an object, or the range given in `args`.
    ///
    /// # Errors
    ///
    /// `NotFound` if absent, `IsADirectory` for directory paths.
    fn read(&self, path: &str, args: &OpRead) -> StorageResult<Bytes>;

    /// Writes a whole object and returns its new metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be stored.
    fn write(&self, path: &str, data: Bytes, args: &OpWrite) -> StorageResult<Metadata>;

    /// Deletes a path. Missing paths are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry exists but cannot be removed.
    fn delete(&self, path: &str) -> StorageResult<()>;

    /// Creates a directory. Existing directories are not an error.
    ///
    /// # Errors
    ///
    /// `Unsupported` unless the backend overrides it.
    fn create_dir(&self, path: &str) -> StorageResult<()> {
        let _ = path;
        Err(StorageError::unsupported(self.info().scheme, "create_dir"))
    }

    /// Lists a directory.
    ///
    /// # Errors
    ///
    /// `Unsupported` unless the backend overrides it.
    fn list(&self, path: &str, args: &OpList) -> StorageResult<EntryStream> {
        let _ = (path, args);
        Err(StorageError::unsupported(self.info().scheme, "list"))
    }

    /// Copies an object.
    ///
    /// # Errors
    ///
    /// `Unsupported` unless the backend overrides it.
    fn copy(&self, from: &str, to: &str) -> StorageResult<()> {
        let _ = (from, to);
        Err(StorageError::unsupported(self.info().scheme, "copy"))
    }

    /// Renames an object or directory.
    ///
    /// # Errors
    ///
    /// `Unsupported` unless the backend overrides it.
    fn rename(&self, from: &str, to: &str) -> StorageResult<()> {
        let _ = (from, to);
        Err(StorageError::unsupported(self.info().scheme, "rename"))
    }
}
