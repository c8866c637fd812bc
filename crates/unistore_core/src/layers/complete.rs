//! Capability completion.
//!
//! Sits on top of the layer stack and fills in what the backend lacks. The
//! routing decision for every operation is made from the native capability
//! captured at construction; the backend is never probed.

use bytes::{Bytes, BytesMut};
use std::collections::VecDeque;
use std::sync::Arc;
use unistore_storage::{
    BackendInfo, Capability, Entry, EntryStream, ErrorKind, Metadata, OpList, OpRead, OpStat,
    OpWrite, StorageBackend, StorageError, StorageResult,
};

/// Computes the full capability for a native one.
///
/// The result is always a superset of `native`. Numeric limits are copied.
#[must_use]
pub(crate) fn complete_capability(native: &Capability) -> Capability {
    let mut full = *native;
    let conditional = native.stat;
    full.stat_with_if_match |= conditional;
    full.stat_with_if_none_match |= conditional;
    full.read_with_if_match |= conditional && native.read;
    full.read_with_if_none_match |= conditional && native.read;

    // The writer buffers parts and commits them in one call.
    full.write_can_multi |= native.write;
    full.write_can_append |= native.write && native.read;

    full.copy |= native.read && native.write;
    full.rename |= native.read && native.write && native.delete;

    full.list_with_recursive |= native.list;
    full.list_with_limit |= native.list;
    full.list_with_start_after |= native.list;
    full
}

/// The topmost backend of every operator.
#[derive(Debug)]
pub(crate) struct CompleteBackend {
    inner: Arc<dyn StorageBackend>,
    info: BackendInfo,
    full: Capability,
}

impl CompleteBackend {
    pub(crate) fn new(inner: Arc<dyn StorageBackend>) -> Self {
        let info = inner.info();
        let full = complete_capability(&info.native_capability);
        Self { inner, info, full }
    }

    pub(crate) fn info(&self) -> &BackendInfo {
        &self.info
    }

    pub(crate) fn native(&self) -> &Capability {
        &self.info.native_capability
    }

    pub(crate) fn full(&self) -> &Capability {
        &self.full
    }

    fn unsupported(&self, operation: &'static str) -> StorageError {
        StorageError::unsupported(self.info.scheme.clone(), operation)
    }

    pub(crate) fn stat(&self, path: &str, args: &OpStat) -> StorageResult<Metadata> {
        let native = self.native();
        if !native.stat {
            return Err(self.unsupported("stat"));
        }
        let emulate = (args.if_match.is_some() && !native.stat_with_if_match)
            || (args.if_none_match.is_some() && !native.stat_with_if_none_match);
        if !emulate {
            return self.inner.stat(path, args);
        }

        let meta = self.inner.stat(path, &OpStat::new())?;
        check_conditions(path, &meta, args)?;
        Ok(meta)
    }

    pub(crate) fn read(&self, path: &str, args: &OpRead) -> StorageResult<Bytes> {
        let native = self.native();
        if !native.read {
            return Err(self.unsupported("read"));
        }
        let emulate = (args.if_match.is_some() && !native.read_with_if_match)
            || (args.if_none_match.is_some() && !native.read_with_if_none_match);
        if !emulate {
            return self.inner.read(path, args);
        }
        if !native.stat {
            return Err(self.unsupported("read_with_if_match"));
        }

        // Not atomic: the object may change between the stat and the read.
        let meta = self.inner.stat(path, &OpStat::new())?;
        check_conditions(path, &meta, &args.conditions())?;
        let plain = OpRead {
            range: args.range.clone(),
            ..OpRead::default()
        };
        self.inner.read(path, &plain)
    }

    pub(crate) fn write(&self, path: &str, data: Bytes, args: &OpWrite) -> StorageResult<Metadata> {
        let native = self.native();
        if !native.write {
            return Err(self.unsupported("write"));
        }
        if !args.append || native.write_can_append {
            return self.write_once(path, data, args);
        }
        if !native.read {
            return Err(self.unsupported("write_can_append"));
        }

        let existing = match self.inner.read(path, &OpRead::new()) {
            Ok(existing) => existing,
            Err(err) if err.kind() == ErrorKind::NotFound => Bytes::new(),
            Err(err) => return Err(err),
        };
        let mut combined = BytesMut::with_capacity(existing.len() + data.len());
        combined.extend_from_slice(&existing);
        combined.extend_from_slice(&data);

        let args = OpWrite {
            append: false,
            content_type: args.content_type.clone(),
        };
        self.write_once(path, combined.freeze(), &args)
    }

    fn write_once(&self, path: &str, data: Bytes, args: &OpWrite) -> StorageResult<Metadata> {
        let native = self.native();
        if data.is_empty() && !args.append && !native.write_can_empty {
            return Err(self.unsupported("write_can_empty"));
        }
        if args.content_type.is_some() && !native.write_with_content_type {
            let args = OpWrite {
                content_type: None,
                ..args.clone()
            };
            return self.inner.write(path, data, &args);
        }
        self.inner.write(path, data, args)
    }

    pub(crate) fn create_dir(&self, path: &str) -> StorageResult<()> {
        if !self.native().create_dir {
            return Err(self.unsupported("create_dir"));
        }
        self.inner.create_dir(path)
    }

    pub(crate) fn delete(&self, path: &str) -> StorageResult<()> {
        if !self.native().delete {
            return Err(self.unsupported("delete"));
        }
        self.inner.delete(path)
    }

    pub(crate) fn list(&self, path: &str, args: &OpList) -> StorageResult<EntryStream> {
        let native = self.native();
        if !native.list {
            return Err(self.unsupported("list"));
        }

        let walk = args.recursive && !native.list_with_recursive;
        let native_start_after = !walk && native.list_with_start_after;
        // A native limit is only usable when nothing is filtered above it.
        let native_limit = native_start_after || args.start_after.is_none();
        let native_limit = !walk && native.list_with_limit && native_limit;

        let mut stream: EntryStream = if walk {
            Box::new(RecursiveWalk::new(Arc::clone(&self.inner), path))
        } else {
            let pushed = OpList {
                recursive: args.recursive,
                limit: args.limit.filter(|_| native_limit),
                start_after: args.start_after.clone().filter(|_| native_start_after),
            };
            self.inner.list(path, &pushed)?
        };

        if let Some(after) = args.start_after.clone().filter(|_| !native_start_after) {
            stream = Box::new(stream.filter(move |item| match item {
                Ok(entry) => entry.path() > after.as_str(),
                Err(_) => true,
            }));
        }
        if let Some(limit) = args.limit.filter(|_| !native_limit) {
            stream = Box::new(stream.take(limit));
        }
        Ok(stream)
    }

    pub(crate) fn copy(&self, from: &str, to: &str) -> StorageResult<()> {
        if from == to {
            return Err(StorageError::IsSameFile {
                path: from.to_string(),
            });
        }
        let native = self.native();
        if native.copy {
            return self.inner.copy(from, to);
        }
        if !(native.read && native.write) {
            return Err(self.unsupported("copy"));
        }
        if from.ends_with('/') {
            return Err(StorageError::IsADirectory {
                path: from.to_string(),
            });
        }

        let data = self.inner.read(from, &OpRead::new())?;
        self.write_once(to, data, &OpWrite::new()).map(|_| ())
    }

    pub(crate) fn rename(&self, from: &str, to: &str) -> StorageResult<()> {
        if from == to {
            return Err(StorageError::IsSameFile {
                path: from.to_string(),
            });
        }
        let native = *self.native();
        if native.rename {
            return self.inner.rename(from, to);
        }
        if !(native.read && native.write && native.delete) {
            return Err(self.unsupported("rename"));
        }
        if !from.ends_with('/') {
            self.copy(from, to)?;
            return self.inner.delete(from);
        }
        if !native.list {
            return Err(self.unsupported("rename"));
        }

        self.inner.stat(from, &OpStat::new())?;
        let entries = self
            .list(from, &OpList::new().with_recursive(true))?
            .collect::<StorageResult<Vec<Entry>>>()?;

        // Everything is copied before anything is deleted.
        if native.create_dir {
            self.inner.create_dir(to)?;
        }
        for entry in &entries {
            let suffix = entry.path().strip_prefix(from).unwrap_or(entry.name());
            let target = format!("{to}{suffix}");
            if entry.path().ends_with('/') {
                if native.create_dir {
                    self.inner.create_dir(&target)?;
                }
            } else {
                self.copy(entry.path(), &target)?;
            }
        }

        // Breadth-first order reversed puts children before their parents.
        for entry in entries.iter().rev() {
            self.inner.delete(entry.path())?;
        }
        self.inner.delete(from)
    }
}

fn check_conditions(path: &str, meta: &Metadata, args: &OpStat) -> StorageResult<()> {
    let etag = meta.etag();
    if let Some(expected) = &args.if_match {
        if expected != "*" && etag != Some(expected.as_str()) {
            return Err(StorageError::ConditionNotMatch {
                path: path.to_string(),
                message: format!(
                    "if-match {expected} against etag {}",
                    etag.unwrap_or("<none>")
                ),
            });
        }
    }
    if let Some(rejected) = &args.if_none_match {
        if rejected == "*" || etag == Some(rejected.as_str()) {
            return Err(StorageError::ConditionNotMatch {
                path: path.to_string(),
                message: format!("if-none-match {rejected} matched"),
            });
        }
    }
    Ok(())
}

/// Breadth-first walk built from single-level listings.
///
/// Self entries are skipped so a directory is never descended twice.
struct RecursiveWalk {
    backend: Arc<dyn StorageBackend>,
    pending: VecDeque<String>,
    current: Option<(String, EntryStream)>,
}

impl RecursiveWalk {
    fn new(backend: Arc<dyn StorageBackend>, root: &str) -> Self {
        Self {
            backend,
            pending: VecDeque::from([root.to_string()]),
            current: None,
        }
    }
}

impl Iterator for RecursiveWalk {
    type Item = StorageResult<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((dir, stream)) = &mut self.current {
                match stream.next() {
                    Some(Ok(entry)) if entry.path() == dir.as_str() => continue,
                    Some(Ok(entry)) => {
                        if entry.path().ends_with('/') {
                            self.pending.push_back(entry.path().to_string());
                        }
                        return Some(Ok(entry));
                    }
                    Some(Err(err)) => return Some(Err(err)),
                    None => self.current = None,
                }
            }

            let dir = self.pending.pop_front()?;
            match self.backend.list(&dir, &OpList::new()) {
                Ok(stream) => self.current = Some((dir, stream)),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
