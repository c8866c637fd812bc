//! In-memory storage backend.

use crate::backend::{BackendInfo, StorageBackend};
use crate::capability::Capability;
use crate::entry::{Entry, EntryStream};
use crate::error::{StorageError, StorageResult};
use crate::metadata::{EntryMode, Metadata};
use crate::ops::{OpList, OpRead, OpStat, OpWrite};
use bytes::Bytes;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::time::SystemTime;

/// Scheme identifier of [`MemoryBackend`].
pub const MEMORY_SCHEME: &str = "memory";

#[derive(Debug, Clone)]
struct MemoryObject {
    data: Bytes,
    mode: EntryMode,
    last_modified: SystemTime,
    etag: Option<String>,
    content_type: Option<String>,
}

impl MemoryObject {
    fn metadata(&self) -> Metadata {
        let mut meta = Metadata::new(self.mode)
            .with_content_length(self.data.len() as u64)
            .with_last_modified(self.last_modified);
        if let Some(etag) = &self.etag {
            meta = meta.with_etag(etag.clone());
        }
        if let Some(ct) = &self.content_type {
            meta = meta.with_content_type(ct.clone());
        }
        meta
    }
}

/// An in-memory storage backend over a flat key space.
///
/// Objects live in a sorted map keyed by absolute path. Directories are
/// either explicit `dir/` keys (from `create_dir`) or implied by any key
/// below them. Because the key space is flat, deleting a directory removes
/// only its own key: objects stored below it stay readable and keep the
/// directory visible in listings.
///
/// This backend is suitable for:
/// - Unit and integration tests
/// - Ephemeral scratch storage
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use unistore_storage::{MemoryBackend, OpRead, OpWrite, StorageBackend};
///
/// let backend = MemoryBackend::new();
/// backend.write("/hello.txt", "Hello, World!".into(), &OpWrite::new()).unwrap();
/// let data = backend.read("/hello.txt", &OpRead::new()).unwrap();
/// assert_eq!(&data[..], b"Hello, World!");
/// ```
#[derive(Debug)]
pub struct MemoryBackend {
    name: String,
    max_object_size: Option<usize>,
    objects: RwLock<BTreeMap<String, MemoryObject>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: MEMORY_SCHEME.to_string(),
            max_object_size: None,
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    /// Sets the instance name reported by [`StorageBackend::info`].
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Caps the size of a single object. Larger writes are rejected.
    #[must_use]
    pub fn with_max_object_size(mut self, limit: usize) -> Self {
        self.max_object_size = Some(limit);
        self
    }

    /// Returns the number of stored keys, directories included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Removes every key.
    pub fn clear(&self) {
        self.objects.write().clear();
    }

    fn has_descendants(objects: &BTreeMap<String, MemoryObject>, dir: &str) -> bool {
        objects
            .range::<str, _>((Bound::Excluded(dir), Bound::Unbounded))
            .next()
            .is_some_and(|(key, _)| key.starts_with(dir))
    }
}

fn etag_of(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("\"{hex}\"")
}

impl StorageBackend for MemoryBackend {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            scheme: MEMORY_SCHEME.to_string(),
            name: self.name.clone(),
            native_capability: Capability {
                stat: true,
                read: true,
                write: true,
                write_can_empty: true,
                write_with_content_type: true,
                write_total_max_size: self.max_object_size,
                create_dir: true,
                delete: true,
                list: true,
                blocking: true,
                ..Default::default()
            },
        }
    }

    fn stat(&self, path: &str, _args: &OpStat) -> StorageResult<Metadata> {
        let objects = self.objects.read();
        if let Some(object) = objects.get(path) {
            return Ok(object.metadata());
        }
        if path.ends_with('/') && Self::has_descendants(&objects, path) {
            return Ok(Metadata::new(EntryMode::Dir));
        }
        Err(StorageError::not_found(path))
    }

    fn read(&self, path: &str, args: &OpRead) -> StorageResult<Bytes> {
        if path.ends_with('/') {
            return Err(StorageError::IsADirectory {
                path: path.to_string(),
            });
        }
        let objects = self.objects.read();
        let object = objects
            .get(path)
            .ok_or_else(|| StorageError::not_found(path))?;

        let data = &object.data;
        match &args.range {
            None => Ok(data.clone()),
            Some(range) => {
                let len = data.len() as u64;
                let start = range.start.min(len) as usize;
                let end = range.end.min(len).max(range.start.min(len)) as usize;
                Ok(data.slice(start..end))
            }
        }
    }

    fn write(&self, path: &str, data: Bytes, args: &OpWrite) -> StorageResult<Metadata> {
        if path.ends_with('/') {
            return Err(StorageError::IsADirectory {
                path: path.to_string(),
            });
        }
        if let Some(limit) = self.max_object_size {
            if data.len() > limit {
                return Err(StorageError::Unexpected(format!(
                    "object of {} bytes exceeds the {limit} byte limit",
                    data.len()
                )));
            }
        }

        let object = MemoryObject {
            etag: Some(etag_of(&data)),
            data,
            mode: EntryMode::File,
            last_modified: SystemTime::now(),
            content_type: args.content_type.clone(),
        };
        let meta = object.metadata();
        self.objects.write().insert(path.to_string(), object);
        Ok(meta)
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        // Only the exact key goes away; descendants of a directory survive.
        self.objects.write().remove(path);
        Ok(())
    }

    fn create_dir(&self, path: &str) -> StorageResult<()> {
        if !path.ends_with('/') {
            return Err(StorageError::NotADirectory {
                path: path.to_string(),
            });
        }
        self.objects
            .write()
            .entry(path.to_string())
            .or_insert_with(|| MemoryObject {
                data: Bytes::new(),
                mode: EntryMode::Dir,
                last_modified: SystemTime::now(),
                etag: None,
                content_type: None,
            });
        Ok(())
    }

    fn list(&self, path: &str, _args: &OpList) -> StorageResult<EntryStream> {
        let objects = self.objects.read();
        let mut entries: Vec<Entry> = Vec::new();

        for key in objects
            .range::<str, _>((Bound::Included(path), Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(path))
        {
            let rest = &key[path.len()..];
            let child = match rest.find('/') {
                _ if rest.is_empty() => path.to_string(),
                Some(idx) => format!("{path}{}", &rest[..=idx]),
                None => key.clone(),
            };
            // Keys under one child directory are contiguous in sorted order.
            if entries.last().map(Entry::path) != Some(child.as_str()) {
                entries.push(Entry::new(child));
            }
        }

        Ok(Box::new(entries.into_iter().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(backend: &MemoryBackend, path: &str, data: &'static [u8]) {
        backend
            .write(path, Bytes::from_static(data), &OpWrite::new())
            .unwrap();
    }

    fn list_paths(backend: &MemoryBackend, path: &str) -> Vec<String> {
        backend
            .list(path, &OpList::new())
            .unwrap()
            .map(|e| e.unwrap().into_path())
            .collect()
    }

    #[test]
    fn memory_new_is_empty() {
        let backend = MemoryBackend::new();
        assert!(backend.is_empty());
        assert_eq!(backend.info().scheme, "memory");
    }

    #[test]
    fn memory_write_then_read() {
        let backend = MemoryBackend::new();
        write(&backend, "/testpath", b"this_string_length_is_24");
        let data = backend.read("/testpath", &OpRead::new()).unwrap();
        assert_eq!(data.len(), 24);
    }

    #[test]
    fn memory_read_missing_fails() {
        let backend = MemoryBackend::new();
        let err = backend.read("/testpath", &OpRead::new()).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn memory_read_range_is_clamped() {
        let backend = MemoryBackend::new();
        write(&backend, "/a", b"hello world");

        let data = backend.read("/a", &OpRead::new().with_range(6..100)).unwrap();
        assert_eq!(&data[..], b"world");

        let data = backend.read("/a", &OpRead::new().with_range(50..60)).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn memory_read_dir_fails() {
        let backend = MemoryBackend::new();
        backend.create_dir("/d/").unwrap();
        let err = backend.read("/d/", &OpRead::new()).unwrap_err();
        assert!(matches!(err, StorageError::IsADirectory { .. }));
    }

    #[test]
    fn memory_overwrite_replaces() {
        let backend = MemoryBackend::new();
        write(&backend, "/a", b"A bigger text with more characters");
        write(&backend, "/a", b"Test message");
        let data = backend.read("/a", &OpRead::new()).unwrap();
        assert_eq!(&data[..], b"Test message");
    }

    #[test]
    fn memory_etag_follows_content() {
        let backend = MemoryBackend::new();
        write(&backend, "/a", b"one");
        let first = backend.stat("/a", &OpStat::new()).unwrap();
        write(&backend, "/a", b"two");
        let second = backend.stat("/a", &OpStat::new()).unwrap();
        assert_ne!(first.etag(), second.etag());
        assert!(first.etag().unwrap().starts_with('"'));
    }

    #[test]
    fn memory_implied_directories() {
        let backend = MemoryBackend::new();
        write(&backend, "/a/b/c.txt", b"x");

        assert!(backend.stat("/a/", &OpStat::new()).unwrap().is_dir());
        assert!(backend.stat("/a/b/", &OpStat::new()).unwrap().is_dir());
        assert!(backend.stat("/a/x/", &OpStat::new()).is_err());
    }

    #[test]
    fn memory_list_immediate_children() {
        let backend = MemoryBackend::new();
        backend.create_dir("/d/").unwrap();
        write(&backend, "/d/a.txt", b"1");
        write(&backend, "/d/a/x", b"2");
        write(&backend, "/d/a/y", b"3");
        write(&backend, "/d/b.txt", b"4");
        write(&backend, "/other", b"5");

        assert_eq!(
            list_paths(&backend, "/d/"),
            vec!["/d/", "/d/a.txt", "/d/a/", "/d/b.txt"]
        );
    }

    #[test]
    fn memory_delete_dir_keeps_children() {
        let backend = MemoryBackend::new();
        backend.create_dir("/d/").unwrap();
        write(&backend, "/d/hello.txt", b"hi");

        backend.delete("/d/").unwrap();

        assert!(backend.read("/d/hello.txt", &OpRead::new()).is_ok());
        assert_eq!(list_paths(&backend, "/"), vec!["/d/"]);
        assert_eq!(list_paths(&backend, "/d/"), vec!["/d/hello.txt"]);
    }

    #[test]
    fn memory_delete_is_idempotent() {
        let backend = MemoryBackend::new();
        backend.delete("/missing").unwrap();
        write(&backend, "/a", b"x");
        backend.delete("/a").unwrap();
        backend.delete("/a").unwrap();
        assert!(backend.is_empty());
    }

    #[test]
    fn memory_create_dir_is_idempotent() {
        let backend = MemoryBackend::new();
        backend.create_dir("/d/").unwrap();
        backend.create_dir("/d/").unwrap();
        assert_eq!(backend.len(), 1);
        assert!(backend.create_dir("/file").is_err());
    }

    #[test]
    fn memory_object_size_limit() {
        let backend = MemoryBackend::new().with_max_object_size(4);
        assert_eq!(backend.info().native_capability.write_total_max_size, Some(4));
        write(&backend, "/ok", b"1234");
        let err = backend
            .write("/big", Bytes::from_static(b"12345"), &OpWrite::new())
            .unwrap_err();
        assert!(matches!(err, StorageError::Unexpected(_)));
    }

    #[test]
    fn memory_clear() {
        let backend = MemoryBackend::new().with_name("scratch");
        write(&backend, "/a", b"x");
        backend.clear();
        assert!(backend.is_empty());
        assert_eq!(backend.info().name, "scratch");
    }
}
