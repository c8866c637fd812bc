//! The storage-agnostic operator.

use crate::config::{invalid, parse_usize, OperatorConfig, Scheme};
use crate::error::{Error, ErrorKind, Result};
use crate::info::OperatorInfo;
use crate::layers::{CompleteBackend, Layer};
use crate::lister::Lister;
use crate::reader::Reader;
use crate::writer::Writer;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use unistore_storage::{
    build_abs_path, normalize_path, normalize_root, EntryMode, FsBackend, MemoryBackend, Metadata,
    OpList, OpRead, OpStat, OpWrite, StorageBackend, StorageError,
};

/// A handle to one storage backend.
///
/// Caller paths are relative to the operator root and normalized on every
/// call: leading `/` is stripped, duplicate `/` collapsed, `.` dropped and
/// `..` resolved without leaving the root. A trailing `/` marks a directory.
///
/// Operations the backend lacks are emulated where possible; see
/// [`OperatorInfo::full_capability`]. Cloning is cheap and clones share the
/// backend.
///
/// # Example
///
/// ```rust
/// use unistore_core::Operator;
///
/// let op = Operator::new("memory", [("root", "/myroot")]).unwrap();
/// op.write("testdir1/hello.txt", "Hello, World!").unwrap();
///
/// let meta = op.stat("testdir1/hello.txt").unwrap();
/// assert!(meta.is_file());
/// assert_eq!(meta.content_length(), 13);
/// assert!(op.exists("testdir1/").unwrap());
/// ```
#[derive(Clone)]
pub struct Operator {
    inner: Arc<OperatorInner>,
}

struct OperatorInner {
    backend: CompleteBackend,
    info: OperatorInfo,
    chunk_size: usize,
}

impl Operator {
    /// Builds an operator for a scheme from string options.
    ///
    /// Generic options are `root`, `name` and `chunk_size`. The `memory`
    /// scheme also reads `max_object_size`. Unknown keys are ignored.
    ///
    /// For `fs`, `root` is a required host directory, created if missing.
    /// A relative root resolves against the current working directory. The
    /// backend is based there, so the operator's own root is `/` and the
    /// directory is reported as the instance name.
    ///
    /// # Errors
    ///
    /// `Unsupported` for an unknown scheme, `ConfigInvalid` for a missing or
    /// malformed option, or the error of creating the `fs` root.
    pub fn new<I, K, V>(scheme: &str, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let options: HashMap<String, String> = options
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let scheme: Scheme = scheme.parse()?;
        let mut config = OperatorConfig::from_options(&options)?;

        let backend: Arc<dyn StorageBackend> = match scheme {
            Scheme::Memory => {
                let mut backend = MemoryBackend::new();
                if let Some(limit) = parse_usize(&options, "max_object_size")? {
                    backend = backend.with_max_object_size(limit);
                }
                Arc::new(backend)
            }
            Scheme::Fs => {
                if !options.contains_key("root") {
                    return Err(invalid("root", "required by the fs scheme"));
                }
                // The host directory is the backend base, resolved against
                // the working directory when relative. Paths above it start at `/`.
                let backend = FsBackend::new(&config.root)
                    .map_err(|e| Error::from_storage("new", config.root.clone(), e))?
                    .with_name(config.root.clone());
                config.root = "/".to_string();
                Arc::new(backend)
            }
        };

        Ok(OperatorBuilder::from_arc(backend).config(config).finish())
    }

    /// Starts building an operator around an existing backend.
    pub fn builder(backend: impl StorageBackend + 'static) -> OperatorBuilder {
        OperatorBuilder::from_arc(Arc::new(backend))
    }

    pub(crate) fn backend(&self) -> &CompleteBackend {
        &self.inner.backend
    }

    pub(crate) fn chunk_size(&self) -> usize {
        self.inner.chunk_size
    }

    /// Returns scheme, name, root and capabilities.
    #[must_use]
    pub fn info(&self) -> OperatorInfo {
        self.inner.info.clone()
    }

    /// Resolves a caller path to `(normalized, absolute)`.
    fn resolve(&self, path: &str) -> (String, String) {
        let rel = normalize_path(path);
        let abs = build_abs_path(&self.inner.info.root, &rel);
        (rel, abs)
    }

    /// Reads a whole object.
    ///
    /// # Errors
    ///
    /// `NotFound` if absent, `IsADirectory` for a directory path.
    pub fn read(&self, path: &str) -> Result<Bytes> {
        self.read_with(path, OpRead::new())
    }

    /// Reads with a range or etag conditions.
    ///
    /// # Errors
    ///
    /// As [`Operator::read`], plus `ConditionNotMatch`.
    pub fn read_with(&self, path: &str, args: OpRead) -> Result<Bytes> {
        let (rel, abs) = self.resolve(path);
        if rel.ends_with('/') {
            return Err(Error::new(ErrorKind::IsADirectory, "cannot read a directory")
                .with_operation("read")
                .with_path(rel));
        }
        self.backend()
            .read(&abs, &args)
            .map_err(|e| Error::from_storage("read", rel, e))
    }

    /// Writes a whole object, replacing any previous content.
    ///
    /// # Errors
    ///
    /// `IsADirectory` for a directory path, `Unsupported` on a read-only
    /// backend.
    pub fn write(&self, path: &str, data: impl Into<Bytes>) -> Result<Metadata> {
        self.write_with(path, data, OpWrite::new())
    }

    /// Writes with append mode or a content type.
    ///
    /// # Errors
    ///
    /// As [`Operator::write`].
    pub fn write_with(&self, path: &str, data: impl Into<Bytes>, args: OpWrite) -> Result<Metadata> {
        let (rel, abs) = self.resolve(path);
        if rel.ends_with('/') {
            return Err(Error::new(ErrorKind::IsADirectory, "cannot write to a directory")
                .with_operation("write")
                .with_path(rel));
        }
        self.backend()
            .write(&abs, data.into(), &args)
            .map_err(|e| Error::from_storage("write", rel, e))
    }

    /// Returns metadata for a path.
    ///
    /// The root always exists.
    ///
    /// # Errors
    ///
    /// `NotFound` if absent.
    pub fn stat(&self, path: &str) -> Result<Metadata> {
        self.stat_with(path, OpStat::new())
    }

    /// Returns metadata, checking etag conditions.
    ///
    /// # Errors
    ///
    /// As [`Operator::stat`], plus `ConditionNotMatch`.
    pub fn stat_with(&self, path: &str, args: OpStat) -> Result<Metadata> {
        let (rel, abs) = self.resolve(path);
        match self.backend().stat(&abs, &args) {
            Ok(meta) => Ok(meta),
            Err(StorageError::NotFound { .. }) if rel == "/" && !args.has_conditions() => {
                Ok(Metadata::new(EntryMode::Dir))
            }
            Err(e) => Err(Error::from_storage("stat", rel, e)),
        }
    }

    /// Returns true if the path exists.
    ///
    /// # Errors
    ///
    /// Any stat failure other than `NotFound`.
    pub fn exists(&self, path: &str) -> Result<bool> {
        match self.stat(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Creates a directory. Creating an existing directory succeeds.
    ///
    /// # Errors
    ///
    /// `NotADirectory` unless the path ends with `/`.
    pub fn create_dir(&self, path: &str) -> Result<()> {
        let (rel, abs) = self.resolve(path);
        if !rel.ends_with('/') {
            return Err(
                Error::new(ErrorKind::NotADirectory, "directory paths must end with /")
                    .with_operation("create_dir")
                    .with_path(rel),
            );
        }
        self.backend()
            .create_dir(&abs)
            .map_err(|e| Error::from_storage("create_dir", rel, e))
    }

    /// Deletes a path. Deleting a missing path succeeds.
    ///
    /// A directory delete removes the directory entry only; what happens to
    /// its contents depends on the backend.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the entry exists but cannot be removed.
    pub fn delete(&self, path: &str) -> Result<()> {
        let (rel, abs) = self.resolve(path);
        self.backend()
            .delete(&abs)
            .map_err(|e| Error::from_storage("delete", rel, e))
    }

    /// Copies a file.
    ///
    /// # Errors
    ///
    /// `NotFound` if `from` is absent, `IsSameFile` if both paths are equal.
    pub fn copy(&self, from: &str, to: &str) -> Result<()> {
        let ((from_rel, from_abs), (to_rel, to_abs)) = (self.resolve(from), self.resolve(to));
        check_pair("copy", &from_rel, &to_rel)?;
        self.backend()
            .copy(&from_abs, &to_abs)
            .map_err(|e| Error::from_storage("copy", from_rel, e))
    }

    /// Renames a file, or a directory with everything under it.
    ///
    /// # Errors
    ///
    /// `NotFound` if `from` is absent, `IsSameFile` if both paths are equal.
    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        let ((from_rel, from_abs), (to_rel, to_abs)) = (self.resolve(from), self.resolve(to));
        check_pair("rename", &from_rel, &to_rel)?;
        self.backend()
            .rename(&from_abs, &to_abs)
            .map_err(|e| Error::from_storage("rename", from_rel, e))
    }

    /// Lists the immediate children of a directory.
    ///
    /// # Errors
    ///
    /// `NotADirectory` unless the path ends with `/`.
    pub fn list(&self, path: &str) -> Result<Lister> {
        self.list_with(path, OpList::new())
    }

    /// Lists with recursion, a limit or a start-after path.
    ///
    /// `start_after` is a caller path, resolved like `path`.
    ///
    /// # Errors
    ///
    /// As [`Operator::list`].
    pub fn list_with(&self, path: &str, mut args: OpList) -> Result<Lister> {
        let (rel, abs) = self.resolve(path);
        if !rel.ends_with('/') {
            return Err(
                Error::new(ErrorKind::NotADirectory, "only directories can be listed")
                    .with_operation("list")
                    .with_path(rel),
            );
        }
        if let Some(after) = args.start_after.take() {
            args.start_after = Some(self.resolve(&after).1);
        }
        let stream = self
            .backend()
            .list(&abs, &args)
            .map_err(|e| Error::from_storage("list", rel.clone(), e))?;
        Ok(Lister::new(stream, self.inner.info.root.clone(), rel))
    }

    /// Opens a streaming reader.
    ///
    /// # Errors
    ///
    /// `NotFound` if absent, `IsADirectory` for a directory.
    pub fn reader(&self, path: &str) -> Result<Reader> {
        let (rel, abs) = self.resolve(path);
        let meta = self.stat(&rel)?;
        if meta.is_dir() || rel.ends_with('/') {
            return Err(Error::new(ErrorKind::IsADirectory, "cannot read a directory")
                .with_operation("reader")
                .with_path(rel));
        }
        Ok(Reader::new(self.clone(), rel, abs, meta.content_length()))
    }

    /// Opens a buffered writer that replaces the object on close.
    ///
    /// # Errors
    ///
    /// `IsADirectory` for a directory path, `Unsupported` if the backend
    /// cannot write.
    pub fn writer(&self, path: &str) -> Result<Writer> {
        self.writer_with(path, OpWrite::new())
    }

    /// Opens a buffered writer with append mode or a content type.
    ///
    /// # Errors
    ///
    /// As [`Operator::writer`].
    pub fn writer_with(&self, path: &str, args: OpWrite) -> Result<Writer> {
        let (rel, abs) = self.resolve(path);
        if rel.ends_with('/') {
            return Err(Error::new(ErrorKind::IsADirectory, "cannot write to a directory")
                .with_operation("writer")
                .with_path(rel));
        }
        let full = self.inner.info.full;
        if !full.write || (args.append && !full.write_can_append) {
            return Err(Error::new(
                ErrorKind::Unsupported,
                format!("{} cannot write", self.inner.info.scheme),
            )
            .with_operation("writer")
            .with_path(rel));
        }
        Ok(Writer::new(self.clone(), rel, abs, args))
    }
}

fn check_pair(operation: &'static str, from: &str, to: &str) -> Result<()> {
    if from == to {
        return Err(
            Error::new(ErrorKind::IsSameFile, "source and target are the same")
                .with_operation(operation)
                .with_path(from),
        );
    }
    match (from.ends_with('/'), to.ends_with('/')) {
        (true, false) => Err(Error::new(
            ErrorKind::NotADirectory,
            "a directory can only move to a directory path",
        )
        .with_operation(operation)
        .with_path(to)),
        (false, true) => Err(Error::new(
            ErrorKind::IsADirectory,
            "a file cannot move to a directory path",
        )
        .with_operation(operation)
        .with_path(to)),
        _ => Ok(()),
    }
}

impl std::fmt::Debug for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let info = &self.inner.info;
        f.debug_struct("Operator")
            .field("scheme", &info.scheme)
            .field("name", &info.name)
            .field("root", &info.root)
            .finish()
    }
}

/// Assembles an [`Operator`] from a backend, layers and configuration.
///
/// ```rust
/// use unistore_core::{LoggingLayer, Operator};
/// use unistore_storage::MemoryBackend;
///
/// let op = Operator::builder(MemoryBackend::new())
///     .layer(LoggingLayer)
///     .root("/tenant-a")
///     .chunk_size(64 * 1024)
///     .finish();
/// assert_eq!(op.info().root(), "/tenant-a/");
/// ```
#[must_use]
pub struct OperatorBuilder {
    backend: Arc<dyn StorageBackend>,
    config: OperatorConfig,
}

impl OperatorBuilder {
    fn from_arc(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            config: OperatorConfig::default(),
        }
    }

    /// Wraps the current backend in `layer`.
    pub fn layer(mut self, layer: impl Layer) -> Self {
        self.backend = layer.layer(self.backend);
        self
    }

    /// Sets the root.
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.config.root = root.into();
        self
    }

    /// Sets the instance name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Sets the reader chunk size. Zero is treated as one.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: OperatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the operator.
    ///
    /// The emulation strategy is fixed here from the backend's native
    /// capability.
    pub fn finish(self) -> Operator {
        let backend = CompleteBackend::new(self.backend);
        let native = backend.info().clone();
        let info = OperatorInfo {
            scheme: native.scheme,
            name: self.config.name.unwrap_or(native.name),
            root: normalize_root(&self.config.root),
            native: native.native_capability,
            full: *backend.full(),
        };
        debug!(
            scheme = %info.scheme,
            name = %info.name,
            root = %info.root,
            "operator created"
        );
        Operator {
            inner: Arc::new(OperatorInner {
                backend,
                info,
                chunk_size: self.config.chunk_size.max(1),
            }),
        }
    }
}

impl std::fmt::Debug for OperatorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorBuilder")
            .field("backend", &self.backend)
            .field("config", &self.config)
            .finish()
    }
}
