//! Object encryption at rest using AES-256-GCM.
//!
//! Every object is stored as `nonce (12 bytes) || ciphertext || tag (16 bytes)`
//! with a fresh random nonce per write. Metadata reports plaintext lengths.
//!
//! ## Security Model
//!
//! - Authenticated encryption: tampered objects fail to read
//! - Keys are zeroized on drop and never printed
//! - Ranged reads fetch and decrypt the whole object, then slice
//! - Native append is masked; the operator emulates it above this layer

use super::Layer;
use crate::error::{Error, ErrorKind, Result};
use aes_gcm::{
    aead::{generic_array::GenericArray, Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use bytes::Bytes;
use rand::RngCore;
use std::sync::Arc;
use unistore_storage::{
    BackendInfo, EntryStream, Metadata, OpList, OpRead, OpStat, OpWrite, StorageBackend,
    StorageError, StorageResult,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

const OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// Encryption key for AES-256-GCM.
///
/// The key is automatically zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_SIZE],
}

impl EncryptionKey {
    /// Generates a new random key.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// `ConfigInvalid` unless `bytes` is exactly 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                format!("invalid key size: expected {KEY_SIZE} bytes, got {}", bytes.len()),
            ));
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self { bytes: key })
    }

    /// Derives a key from a passphrase and salt using HKDF-SHA256.
    ///
    /// HKDF does not slow down guessing. Use it with high-entropy passphrases.
    ///
    /// # Errors
    ///
    /// Returns an error if the expansion fails.
    pub fn derive_from_passphrase(passphrase: &[u8], salt: &[u8]) -> Result<Self> {
        use hkdf::Hkdf;
        use sha2::Sha256;

        let hk = Hkdf::<Sha256>::new(Some(salt), passphrase);
        let mut bytes = [0u8; KEY_SIZE];
        hk.expand(b"unistore-object-key-v1", &mut bytes)
            .map_err(|_| Error::new(ErrorKind::Unexpected, "HKDF expand failed"))?;
        Ok(Self { bytes })
    }

    /// Returns the raw key bytes. Do not log the result.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Encrypts object contents before they reach the backend.
///
/// Paths and listings are not encrypted.
///
/// ```rust
/// use unistore_core::{EncryptionKey, EncryptionLayer, Operator};
/// use unistore_storage::MemoryBackend;
///
/// let key = EncryptionKey::derive_from_passphrase(b"correct horse battery", b"salt").unwrap();
/// let op = Operator::builder(MemoryBackend::new())
///     .layer(EncryptionLayer::new(key))
///     .finish();
/// op.write("secret.txt", "attack at dawn").unwrap();
/// assert_eq!(op.stat("secret.txt").unwrap().content_length(), 14);
/// ```
#[derive(Clone)]
pub struct EncryptionLayer {
    cipher: Aes256Gcm,
}

impl EncryptionLayer {
    /// Creates a layer that encrypts with `key`.
    #[must_use]
    pub fn new(key: EncryptionKey) -> Self {
        let cipher = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));
        Self { cipher }
    }
}

impl std::fmt::Debug for EncryptionLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionLayer")
            .field("cipher", &"Aes256Gcm")
            .finish()
    }
}

impl Layer for EncryptionLayer {
    fn layer(&self, inner: Arc<dyn StorageBackend>) -> Arc<dyn StorageBackend> {
        Arc::new(EncryptionBackend {
            inner,
            cipher: self.cipher.clone(),
        })
    }
}

struct EncryptionBackend {
    inner: Arc<dyn StorageBackend>,
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for EncryptionBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionBackend")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl EncryptionBackend {
    fn encrypt(&self, plaintext: &[u8]) -> StorageResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| StorageError::Encryption("encryption error".into()))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend(ciphertext);
        Ok(sealed)
    }

    fn decrypt(&self, path: &str, sealed: &[u8]) -> StorageResult<Vec<u8>> {
        if sealed.len() < OVERHEAD {
            return Err(StorageError::Encryption(format!(
                "{path}: ciphertext too short"
            )));
        }
        let nonce = Nonce::from_slice(&sealed[..NONCE_SIZE]);
        self.cipher
            .decrypt(nonce, &sealed[NONCE_SIZE..])
            .map_err(|_| StorageError::Encryption(format!("{path}: decryption error")))
    }
}

fn plaintext_len(meta: &mut Metadata) {
    if meta.is_file() {
        let len = meta.content_length().saturating_sub(OVERHEAD as u64);
        meta.set_content_length(len);
    }
}

impl StorageBackend for EncryptionBackend {
    fn info(&self) -> BackendInfo {
        let mut info = self.inner.info();
        let cap = &mut info.native_capability;
        cap.write_can_append = false;
        cap.write_total_max_size = cap
            .write_total_max_size
            .map(|limit| limit.saturating_sub(OVERHEAD));
        info
    }

    fn stat(&self, path: &str, args: &OpStat) -> StorageResult<Metadata> {
        let mut meta = self.inner.stat(path, args)?;
        plaintext_len(&mut meta);
        Ok(meta)
    }

    fn read(&self, path: &str, args: &OpRead) -> StorageResult<Bytes> {
        let whole = OpRead {
            range: None,
            ..args.clone()
        };
        let sealed = self.inner.read(path, &whole)?;
        let plaintext = Bytes::from(self.decrypt(path, &sealed)?);

        match &args.range {
            None => Ok(plaintext),
            Some(range) => {
                let len = plaintext.len() as u64;
                let start = range.start.min(len);
                let end = range.end.clamp(start, len);
                Ok(plaintext.slice(start as usize..end as usize))
            }
        }
    }

    fn write(&self, path: &str, data: Bytes, args: &OpWrite) -> StorageResult<Metadata> {
        if args.append {
            return Err(StorageError::unsupported(
                self.inner.info().scheme,
                "write_can_append",
            ));
        }
        let sealed = self.encrypt(&data)?;
        let mut meta = self.inner.write(path, Bytes::from(sealed), args)?;
        meta.set_content_length(data.len() as u64);
        Ok(meta)
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        self.inner.delete(path)
    }

    fn create_dir(&self, path: &str) -> StorageResult<()> {
        self.inner.create_dir(path)
    }

    fn list(&self, path: &str, args: &OpList) -> StorageResult<EntryStream> {
        self.inner.list(path, args)
    }

    fn copy(&self, from: &str, to: &str) -> StorageResult<()> {
        self.inner.copy(from, to)
    }

    fn rename(&self, from: &str, to: &str) -> StorageResult<()> {
        self.inner.rename(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unistore_storage::MemoryBackend;

    fn layered() -> (Arc<MemoryBackend>, Arc<dyn StorageBackend>) {
        let raw = Arc::new(MemoryBackend::new());
        let inner: Arc<dyn StorageBackend> = raw.clone();
        let encrypted = EncryptionLayer::new(EncryptionKey::generate()).layer(inner);
        (raw, encrypted)
    }

    #[test]
    fn generate_key() {
        let key1 = EncryptionKey::generate();
        let key2 = EncryptionKey::generate();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn key_wrong_size() {
        assert!(EncryptionKey::from_bytes(&[0u8; 16]).is_err());
        assert!(EncryptionKey::from_bytes(&[0u8; 64]).is_err());
        assert!(EncryptionKey::from_bytes(&[7u8; KEY_SIZE]).is_ok());
    }

    #[test]
    fn derived_keys_are_deterministic() {
        let a = EncryptionKey::derive_from_passphrase(b"pass", b"salt").unwrap();
        let b = EncryptionKey::derive_from_passphrase(b"pass", b"salt").unwrap();
        let c = EncryptionKey::derive_from_passphrase(b"pass", b"pepper").unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_ne!(a.as_bytes(), c.as_bytes());
    }

    #[test]
    fn key_debug_is_redacted() {
        let key = EncryptionKey::from_bytes(&[1u8; KEY_SIZE]).unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));
    }

    #[test]
    fn stored_bytes_are_ciphertext() {
        let (raw, encrypted) = layered();
        let meta = encrypted
            .write("/a", Bytes::from_static(b"plaintext"), &OpWrite::new())
            .unwrap();
        assert_eq!(meta.content_length(), 9);

        let stored = raw.read("/a", &OpRead::new()).unwrap();
        assert_eq!(stored.len(), 9 + OVERHEAD);
        assert!(!stored.windows(9).any(|w| w == b"plaintext"));

        assert_eq!(&encrypted.read("/a", &OpRead::new()).unwrap()[..], b"plaintext");
        assert_eq!(encrypted.stat("/a", &OpStat::new()).unwrap().content_length(), 9);
    }

    #[test]
    fn ranged_read_slices_plaintext() {
        let (_, encrypted) = layered();
        encrypted
            .write("/a", Bytes::from_static(b"hello world"), &OpWrite::new())
            .unwrap();
        let part = encrypted
            .read("/a", &OpRead::new().with_range(6..64))
            .unwrap();
        assert_eq!(&part[..], b"world");
    }

    #[test]
    fn streaming_reader_sees_plaintext() {
        let op = crate::Operator::builder(MemoryBackend::new())
            .layer(EncryptionLayer::new(EncryptionKey::generate()))
            .chunk_size(5)
            .finish();
        op.write("obj", "hello world").unwrap();

        let mut reader = op.reader("obj").unwrap();
        assert_eq!(reader.content_length(), 11);
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"hell");
        assert_eq!(&reader.read_all().unwrap()[..], b"o world");
    }

    #[test]
    fn tampered_object_fails_to_read() {
        let (raw, encrypted) = layered();
        encrypted
            .write("/a", Bytes::from_static(b"data"), &OpWrite::new())
            .unwrap();

        let mut stored = raw.read("/a", &OpRead::new()).unwrap().to_vec();
        let last = stored.len() - 1;
        stored[last] ^= 0xFF;
        raw.write("/a", Bytes::from(stored), &OpWrite::new()).unwrap();

        let err = encrypted.read("/a", &OpRead::new()).unwrap_err();
        assert!(matches!(err, StorageError::Encryption(_)));
    }

    #[test]
    fn append_is_masked() {
        let (_, encrypted) = layered();
        assert!(!encrypted.info().native_capability.write_can_append);
    }
}
