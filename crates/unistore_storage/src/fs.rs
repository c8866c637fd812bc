//! Local filesystem storage backend.

use crate::backend::{BackendInfo, StorageBackend};
use crate::capability::Capability;
use crate::entry::{Entry, EntryStream};
use crate::error::{StorageError, StorageResult};
use crate::metadata::{EntryMode, Metadata};
use crate::ops::{OpList, OpRead, OpStat, OpWrite};
use bytes::Bytes;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use uuid::Uuid;

/// Scheme identifier of [`FsBackend`].
pub const FS_SCHEME: &str = "fs";

/// A storage backend on the local filesystem.
///
/// Absolute operator paths are resolved below a base directory. Directory
/// paths map to real directories, so unlike the memory backend a directory
/// holding files cannot be deleted.
///
/// # Durability
///
/// - Whole-object writes go to a temporary file in the target directory and
///   are renamed into place, so readers never observe a partial object
/// - Appends write in place
///
/// # Thread Safety
///
/// The backend holds no mutable state; concurrency is whatever the OS gives.
///
/// # Example
///
/// ```no_run
/// use unistore_storage::{FsBackend, OpWrite, StorageBackend};
///
/// let backend = FsBackend::new("/tmp/unistore").unwrap();
/// backend.write("/hello.txt", "persistent data".into(), &OpWrite::new()).unwrap();
/// ```
#[derive(Debug)]
pub struct FsBackend {
    base: PathBuf,
    name: String,
}

impl FsBackend {
    /// Opens a backend rooted at `base`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(base: impl AsRef<Path>) -> StorageResult<Self> {
        let base = base.as_ref().to_path_buf();
        fs::create_dir_all(&base)?;
        Ok(Self {
            name: base.display().to_string(),
            base,
        })
    }

    /// Sets the instance name reported by [`StorageBackend::info`].
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base.join(path.trim_start_matches('/'))
    }

    fn metadata_of(meta: &fs::Metadata, content_type: Option<&str>) -> Metadata {
        let mode = if meta.is_dir() {
            EntryMode::Dir
        } else if meta.is_file() {
            EntryMode::File
        } else {
            EntryMode::Unknown
        };
        let len = if meta.is_dir() { 0 } else { meta.len() };
        let mut out = Metadata::new(mode).with_content_length(len);
        if let Ok(modified) = meta.modified() {
            out = out.with_last_modified(modified);
            if mode == EntryMode::File {
                let nanos = modified
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos())
                    .unwrap_or_default();
                out = out.with_etag(format!("\"{nanos:x}-{len:x}\""));
            }
        }
        if let Some(ct) = content_type {
            out = out.with_content_type(ct);
        }
        out
    }

    /// Creates the parent directories of `target`, the storage for `path`.
    fn ensure_parent(path: &str, target: &Path) -> StorageResult<()> {
        let Some(parent) = target.parent() else {
            return Ok(());
        };
        match fs::create_dir_all(parent) {
            Ok(()) => Ok(()),
            // A file sits where a parent directory should be.
            Err(e) if matches!(
                e.kind(),
                io::ErrorKind::AlreadyExists | io::ErrorKind::NotADirectory
            ) =>
            {
                Err(StorageError::NotADirectory {
                    path: path.to_string(),
                })
            }
            Err(e) => Err(lookup_error(path, e)),
        }
    }
}

/// Maps an error from resolving `path` on disk.
///
/// A file in place of one of the parent directories means the path cannot
/// exist, so `ENOTDIR` reads as absence, matching the memory backend.
fn lookup_error(path: &str, err: io::Error) -> StorageError {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => StorageError::not_found(path),
        io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
            path: path.to_string(),
        },
        _ => StorageError::Io(err),
    }
}

impl StorageBackend for FsBackend {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            scheme: FS_SCHEME.to_string(),
            name: self.name.clone(),
            native_capability: Capability {
                stat: true,
                read: true,
                write: true,
                write_can_empty: true,
                write_can_append: true,
                create_dir: true,
                delete: true,
                copy: true,
                rename: true,
                list: true,
                blocking: true,
                ..Default::default()
            },
        }
    }

    fn stat(&self, path: &str, _args: &OpStat) -> StorageResult<Metadata> {
        let meta = fs::metadata(self.resolve(path)).map_err(|e| lookup_error(path, e))?;
        if path.ends_with('/') && !meta.is_dir() {
            return Err(StorageError::NotADirectory {
                path: path.to_string(),
            });
        }
        Ok(Self::metadata_of(&meta, None))
    }

    fn read(&self, path: &str, args: &OpRead) -> StorageResult<Bytes> {
        if path.ends_with('/') {
            return Err(StorageError::IsADirectory {
                path: path.to_string(),
            });
        }
        let target = self.resolve(path);
        let mut file = File::open(&target).map_err(|e| lookup_error(path, e))?;
        if file.metadata()?.is_dir() {
            return Err(StorageError::IsADirectory {
                path: path.to_string(),
            });
        }

        let mut buffer = Vec::new();
        match &args.range {
            None => {
                file.read_to_end(&mut buffer)?;
            }
            Some(range) => {
                file.seek(SeekFrom::Start(range.start))?;
                let len = range.end.saturating_sub(range.start);
                file.take(len).read_to_end(&mut buffer)?;
            }
        }
        Ok(Bytes::from(buffer))
    }

    fn write(&self, path: &str, data: Bytes, args: &OpWrite) -> StorageResult<Metadata> {
        if path.ends_with('/') {
            return Err(StorageError::IsADirectory {
                path: path.to_string(),
            });
        }
        let target = self.resolve(path);
        Self::ensure_parent(path, &target)?;

        if args.append {
            let mut file = OpenOptions::new().create(true).append(true).open(&target)?;
            file.write_all(&data)?;
            file.flush()?;
        } else {
            let file_name = target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let tmp = target.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));
            let result = (|| -> io::Result<()> {
                let mut file = File::create(&tmp)?;
                file.write_all(&data)?;
                file.sync_all()?;
                fs::rename(&tmp, &target)
            })();
            if let Err(e) = result {
                let _ = fs::remove_file(&tmp);
                return Err(e.into());
            }
        }

        let meta = fs::metadata(&target)?;
        Ok(Self::metadata_of(&meta, args.content_type.as_deref()))
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        let target = self.resolve(path);
        let meta = match fs::symlink_metadata(&target).map_err(|e| lookup_error(path, e)) {
            Ok(meta) => meta,
            Err(StorageError::NotFound { .. }) => return Ok(()),
            Err(e) => return Err(e),
        };
        let result = if meta.is_dir() {
            fs::remove_dir(&target)
        } else {
            fs::remove_file(&target)
        };
        match result {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn create_dir(&self, path: &str) -> StorageResult<()> {
        if !path.ends_with('/') {
            return Err(StorageError::NotADirectory {
                path: path.to_string(),
            });
        }
        fs::create_dir_all(self.resolve(path))?;
        Ok(())
    }

    fn list(&self, path: &str, _args: &OpList) -> StorageResult<EntryStream> {
        let dir = match fs::read_dir(self.resolve(path)) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Box::new(std::iter::empty()));
            }
            Err(e) if e.kind() == io::ErrorKind::NotADirectory => {
                return Err(StorageError::NotADirectory {
                    path: path.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let prefix = path.to_string();
        let entries = dir.filter_map(move |item| {
            let item = match item {
                Ok(item) => item,
                Err(e) => return Some(Err(StorageError::Io(e))),
            };
            let name = item.file_name().to_string_lossy().into_owned();
            // Skip in-flight temporary files from concurrent writers.
            if name.starts_with('.') && name.ends_with(".tmp") {
                return None;
            }
            let is_dir = match item.file_type() {
                Ok(ft) => ft.is_dir(),
                Err(e) => return Some(Err(StorageError::Io(e))),
            };
            let suffix = if is_dir { "/" } else { "" };
            Some(Ok(Entry::new(format!("{prefix}{name}{suffix}"))))
        });
        Ok(Box::new(entries))
    }

    fn copy(&self, from: &str, to: &str) -> StorageResult<()> {
        let source = self.resolve(from);
        let meta = fs::metadata(&source).map_err(|e| lookup_error(from, e))?;
        if meta.is_dir() {
            return Err(StorageError::IsADirectory {
                path: from.to_string(),
            });
        }
        let target = self.resolve(to);
        Self::ensure_parent(to, &target)?;
        fs::copy(&source, &target)?;
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> StorageResult<()> {
        let source = self.resolve(from);
        fs::symlink_metadata(&source).map_err(|e| lookup_error(from, e))?;
        let target = self.resolve(to);
        Self::ensure_parent(to, &target)?;
        fs::rename(&source, &target)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn put(backend: &FsBackend, path: &str, data: &'static [u8]) {
        backend
            .write(path, Bytes::from_static(data), &OpWrite::new())
            .unwrap();
    }

    #[test]
    fn fs_write_and_read() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();

        put(&backend, "/nested/path/test.bin", b"hello world");
        assert!(dir.path().join("nested/path/test.bin").exists());

        let data = backend.read("/nested/path/test.bin", &OpRead::new()).unwrap();
        assert_eq!(&data[..], b"hello world");

        let data = backend
            .read("/nested/path/test.bin", &OpRead::new().with_range(6..11))
            .unwrap();
        assert_eq!(&data[..], b"world");
    }

    #[test]
    fn fs_read_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        let err = backend.read("/missing", &OpRead::new()).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn fs_file_in_place_of_a_parent() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        put(&backend, "/a", b"file");

        assert!(matches!(
            backend.stat("/a/b", &OpStat::new()),
            Err(StorageError::NotFound { .. })
        ));
        assert!(matches!(
            backend.read("/a/b", &OpRead::new()),
            Err(StorageError::NotFound { .. })
        ));
        assert!(matches!(
            backend.rename("/a/b", "/c"),
            Err(StorageError::NotFound { .. })
        ));
        backend.delete("/a/b").unwrap();

        let err = backend
            .write("/a/b", Bytes::from_static(b"x"), &OpWrite::new())
            .unwrap_err();
        assert!(matches!(err, StorageError::NotADirectory { .. }));
    }

    #[test]
    fn fs_read_dir_is_a_directory() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        backend.create_dir("/d/").unwrap();
        let err = backend.read("/d", &OpRead::new()).unwrap_err();
        assert!(matches!(err, StorageError::IsADirectory { .. }));
    }

    #[test]
    fn fs_append() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        put(&backend, "/log", b"one");
        backend
            .write("/log", Bytes::from_static(b"two"), &OpWrite::new().with_append(true))
            .unwrap();
        let data = backend.read("/log", &OpRead::new()).unwrap();
        assert_eq!(&data[..], b"onetwo");
    }

    #[test]
    fn fs_overwrite_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        put(&backend, "/a", b"first");
        put(&backend, "/a", b"second");

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
        assert_eq!(&backend.read("/a", &OpRead::new()).unwrap()[..], b"second");
    }

    #[test]
    fn fs_stat() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        put(&backend, "/f", b"12345");
        backend.create_dir("/d/").unwrap();

        let meta = backend.stat("/f", &OpStat::new()).unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.content_length(), 5);
        assert!(meta.last_modified_ms().is_some());
        assert!(meta.etag().is_some());

        assert!(backend.stat("/d/", &OpStat::new()).unwrap().is_dir());
        assert!(matches!(
            backend.stat("/nope", &OpStat::new()),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn fs_list() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        put(&backend, "/d/a.txt", b"1");
        backend.create_dir("/d/sub/").unwrap();

        let mut paths: Vec<_> = backend
            .list("/d/", &OpList::new())
            .unwrap()
            .map(|e| e.unwrap().into_path())
            .collect();
        paths.sort();
        assert_eq!(paths, vec!["/d/a.txt", "/d/sub/"]);

        assert_eq!(backend.list("/missing/", &OpList::new()).unwrap().count(), 0);
    }

    #[test]
    fn fs_delete() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        put(&backend, "/d/a.txt", b"1");

        assert!(backend.delete("/d/").is_err());
        backend.delete("/d/a.txt").unwrap();
        backend.delete("/d/a.txt").unwrap();
        backend.delete("/d/").unwrap();
        assert!(!dir.path().join("d").exists());
    }

    #[test]
    fn fs_copy_and_rename() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        put(&backend, "/src", b"payload");

        backend.copy("/src", "/copy/dst").unwrap();
        assert_eq!(&backend.read("/copy/dst", &OpRead::new()).unwrap()[..], b"payload");

        backend.rename("/src", "/moved").unwrap();
        assert!(backend.read("/src", &OpRead::new()).is_err());
        assert_eq!(&backend.read("/moved", &OpRead::new()).unwrap()[..], b"payload");

        assert!(matches!(
            backend.rename("/src", "/x"),
            Err(StorageError::NotFound { .. })
        ));
    }
}
