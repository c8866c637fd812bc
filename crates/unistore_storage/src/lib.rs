//! # Unistore Storage
//!
//! Backend primitives and reference backends for Unistore.
//!
//! This crate provides the lowest-level storage abstraction. A backend is a
//! **capability provider**: it implements a small set of primitives on
//! absolute paths and reports, through a [`Capability`] snapshot, which of
//! the optional operations it implements natively. Everything else
//! (emulation, root confinement, streaming) lives above it.
//!
//! ## Design Principles
//!
//! - Backends only see normalized absolute paths
//! - Capabilities are reported, never probed
//! - Must be `Send + Sync` for concurrent access
//! - Errors carry a unified [`ErrorKind`]
//!
//! ## Available Backends
//!
//! - [`MemoryBackend`] - flat key space, for tests and scratch storage
//! - [`FsBackend`] - local filesystem
//!
//! ## Example
//!
//! ```rust
//! use unistore_storage::{MemoryBackend, OpRead, OpWrite, StorageBackend};
//!
//! let backend = MemoryBackend::new();
//! backend.write("/hello", "hello world".into(), &OpWrite::new()).unwrap();
//! let data = backend.read("/hello", &OpRead::new()).unwrap();
//! assert_eq!(&data[..], b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod capability;
mod entry;
mod error;
mod fs;
mod memory;
mod metadata;
mod ops;
mod path;

pub use backend::{BackendInfo, StorageBackend};
pub use capability::Capability;
pub use entry::{Entry, EntryStream};
pub use error::{ErrorKind, StorageError, StorageResult};
pub use fs::{FsBackend, FS_SCHEME};
pub use memory::{MemoryBackend, MEMORY_SCHEME};
pub use metadata::{EntryMode, Metadata};
pub use ops::{OpList, OpRead, OpStat, OpWrite};
pub use path::{
    build_abs_path, build_rel_path, get_basename, get_parent, normalize_path, normalize_root,
};
