//! A backend that hides part of another backend's capability.
//!
//! Lets the behavior suite check that the operator routes by capability:
//! masked primitives fail with `Unsupported` and their emulations are
//! either built from what is left or not offered at all.

use bytes::Bytes;
use std::sync::Arc;
use unistore_storage::{
    BackendInfo, Capability, EntryStream, MemoryBackend, Metadata, OpList, OpRead, OpStat,
    OpWrite, StorageBackend, StorageError, StorageResult,
};

/// Scheme reported by [`RestrictedBackend`].
pub const RESTRICTED_SCHEME: &str = "restricted";

/// Wraps a backend and reports a reduced native capability.
#[derive(Debug, Clone)]
pub struct RestrictedBackend {
    inner: Arc<dyn StorageBackend>,
    capability: Capability,
}

impl RestrictedBackend {
    /// Wraps `inner`, initially exposing its full native capability.
    pub fn new(inner: impl StorageBackend + 'static) -> Self {
        let capability = inner.info().native_capability;
        Self {
            inner: Arc::new(inner),
            capability,
        }
    }

    /// A memory backend that can only stat, read and list.
    pub fn read_only(inner: MemoryBackend) -> Self {
        Self::new(inner).into_read_only()
    }

    /// Hides every mutating primitive. Clones made earlier keep writing to
    /// the same data.
    #[must_use]
    pub fn into_read_only(self) -> Self {
        self.restrict(|cap| {
            cap.write = false;
            cap.write_can_empty = false;
            cap.write_with_content_type = false;
            cap.create_dir = false;
            cap.delete = false;
        })
    }

    /// A memory backend without `create_dir`.
    pub fn without_create_dir() -> Self {
        Self::new(MemoryBackend::new()).restrict(|cap| cap.create_dir = false)
    }

    /// Turns flags off. Flags can only be removed, never added.
    #[must_use]
    pub fn restrict(mut self, f: impl FnOnce(&mut Capability)) -> Self {
        let mut cap = self.capability;
        f(&mut cap);
        self.capability = intersect(&cap, &self.capability);
        self
    }

    fn deny(&self, allowed: bool, operation: &'static str) -> StorageResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(StorageError::unsupported(RESTRICTED_SCHEME, operation))
        }
    }
}

fn intersect(a: &Capability, b: &Capability) -> Capability {
    Capability {
        stat: a.stat && b.stat,
        stat_with_if_match: a.stat_with_if_match && b.stat_with_if_match,
        stat_with_if_none_match: a.stat_with_if_none_match && b.stat_with_if_none_match,
        read: a.read && b.read,
        read_with_if_match: a.read_with_if_match && b.read_with_if_match,
        read_with_if_none_match: a.read_with_if_none_match && b.read_with_if_none_match,
        read_with_override_cache_control: a.read_with_override_cache_control
            && b.read_with_override_cache_control,
        read_with_override_content_disposition: a.read_with_override_content_disposition
            && b.read_with_override_content_disposition,
        read_with_override_content_type: a.read_with_override_content_type
            && b.read_with_override_content_type,
        write: a.write && b.write,
        write_can_multi: a.write_can_multi && b.write_can_multi,
        write_can_empty: a.write_can_empty && b.write_can_empty,
        write_can_append: a.write_can_append && b.write_can_append,
        write_with_cache_control: a.write_with_cache_control && b.write_with_cache_control,
        write_with_content_disposition: a.write_with_content_disposition
            && b.write_with_content_disposition,
        write_with_content_type: a.write_with_content_type && b.write_with_content_type,
        write_multi_min_size: b.write_multi_min_size,
        write_multi_max_size: b.write_multi_max_size,
        write_total_max_size: b.write_total_max_size,
        create_dir: a.create_dir && b.create_dir,
        delete: a.delete && b.delete,
        copy: a.copy && b.copy,
        rename: a.rename && b.rename,
        list: a.list && b.list,
        list_with_limit: a.list_with_limit && b.list_with_limit,
        list_with_start_after: a.list_with_start_after && b.list_with_start_after,
        list_with_recursive: a.list_with_recursive && b.list_with_recursive,
        presign: a.presign && b.presign,
        presign_read: a.presign_read && b.presign_read,
        presign_stat: a.presign_stat && b.presign_stat,
        presign_write: a.presign_write && b.presign_write,
        shared: a.shared && b.shared,
        blocking: a.blocking && b.blocking,
    }
}

impl StorageBackend for RestrictedBackend {
    fn info(&self) -> BackendInfo {
        let inner = self.inner.info();
        BackendInfo {
            scheme: RESTRICTED_SCHEME.to_string(),
            name: inner.name,
            native_capability: self.capability,
        }
    }

    fn stat(&self, path: &str, args: &OpStat) -> StorageResult<Metadata> {
        self.deny(self.capability.stat, "stat")?;
        self.inner.stat(path, args)
    }

    fn read(&self, path: &str, args: &OpRead) -> StorageResult<Bytes> {
        self.deny(self.capability.read, "read")?;
        self.inner.read(path, args)
    }

    fn write(&self, path: &str, data: Bytes, args: &OpWrite) -> StorageResult<Metadata> {
        self.deny(self.capability.write, "write")?;
        self.inner.write(path, data, args)
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        self.deny(self.capability.delete, "delete")?;
        self.inner.delete(path)
    }

    fn create_dir(&self, path: &str) -> StorageResult<()> {
        self.deny(self.capability.create_dir, "create_dir")?;
        self.inner.create_dir(path)
    }

    fn list(&self, path: &str, args: &OpList) -> StorageResult<EntryStream> {
        self.deny(self.capability.list, "list")?;
        self.inner.list(path, args)
    }

    fn copy(&self, from: &str, to: &str) -> StorageResult<()> {
        self.deny(self.capability.copy, "copy")?;
        self.inner.copy(from, to)
    }

    fn rename(&self, from: &str, to: &str) -> StorageResult<()> {
        self.deny(self.capability.rename, "rename")?;
        self.inner.rename(from, to)
    }
}
