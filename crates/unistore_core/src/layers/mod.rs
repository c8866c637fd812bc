//! Backend decorators.
//!
//! A [`Layer`] wraps a backend and returns a new one with the same
//! primitives. Layers are applied by
//! [`OperatorBuilder::layer`](crate::OperatorBuilder::layer) in the order they
//! are added, so the last layer added sees every call first. Emulation of
//! missing capabilities always runs above every user layer.

mod complete;
#[cfg(feature = "encryption")]
mod encryption;
mod logging;

pub(crate) use complete::CompleteBackend;
#[cfg(feature = "encryption")]
pub use encryption::{EncryptionKey, EncryptionLayer, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use logging::LoggingLayer;

use std::sync::Arc;
use unistore_storage::StorageBackend;

/// Wraps a backend in another backend.
pub trait Layer {
    /// Returns `inner` decorated by this layer.
    fn layer(&self, inner: Arc<dyn StorageBackend>) -> Arc<dyn StorageBackend>;
}
