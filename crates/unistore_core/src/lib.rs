//! # Unistore Core
//!
//! One [`Operator`] in front of any storage backend.
//!
//! The operator normalizes caller paths, confines them to a root, routes
//! each call to the backend's native primitive or to an emulation of it,
//! and reports failures through one [`Error`] type with a stable
//! [`ErrorKind`].
//!
//! ## Capabilities
//!
//! Every operator carries two [`Capability`] snapshots, both fixed at
//! construction:
//!
//! - **native**: what the backend implements itself
//! - **full**: native plus what the operator emulates (conditional reads,
//!   append, copy, rename, recursive and paged listing, multi-part writes)
//!
//! ## Streaming
//!
//! - [`Lister`] walks a directory one entry at a time
//! - [`Reader`] fetches an object in ranged chunks and implements
//!   [`std::io::Read`] and [`std::io::Seek`]
//! - [`Writer`] buffers until [`Writer::close`] and implements
//!   [`std::io::Write`]
//!
//! ## Example
//!
//! ```rust
//! use unistore_core::Operator;
//!
//! let op = Operator::new("memory", [("root", "/myroot")])?;
//! op.create_dir("testdir1/")?;
//! op.write("testdir1/hello.txt", "Hello, World!")?;
//!
//! let names: Vec<String> = op
//!     .list("testdir1/")?
//!     .map(|entry| entry.map(|e| e.name().to_string()))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(names, ["testdir1/", "hello.txt"]);
//! # Ok::<(), unistore_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod info;
pub mod layers;
mod lister;
mod operator;
mod reader;
mod writer;

pub use config::{OperatorConfig, Scheme, DEFAULT_CHUNK_SIZE};
pub use error::{Error, ErrorKind, Result};
pub use info::OperatorInfo;
#[cfg(feature = "encryption")]
pub use layers::{EncryptionKey, EncryptionLayer};
pub use layers::{Layer, LoggingLayer};
pub use lister::Lister;
pub use operator::{Operator, OperatorBuilder};
pub use reader::Reader;
pub use writer::Writer;

// Re-export the data model so most users need only this crate.
pub use unistore_storage::{
    Capability, Entry, EntryMode, Metadata, OpList, OpRead, OpStat, OpWrite, StorageBackend,
};
