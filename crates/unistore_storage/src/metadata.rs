//! Metadata records.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The kind of a storage entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryMode {
    /// A regular object.
    File,
    /// A directory (explicit or implied by descendants).
    Dir,
    /// The backend cannot tell.
    Unknown,
}

impl EntryMode {
    /// Guesses the mode from a normalized path: a trailing `/` means directory.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        if path.ends_with('/') {
            Self::Dir
        } else {
            Self::File
        }
    }
}

/// Metadata of one storage entry.
///
/// Metadata is produced fresh by every `stat` call and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    mode: EntryMode,
    content_length: u64,
    last_modified: Option<SystemTime>,
    etag: Option<String>,
    content_type: Option<String>,
}

impl Metadata {
    /// Creates metadata with the given mode and everything else unknown.
    #[must_use]
    pub fn new(mode: EntryMode) -> Self {
        Self {
            mode,
            content_length: 0,
            last_modified: None,
            etag: None,
            content_type: None,
        }
    }

    /// Sets the content length.
    #[must_use]
    pub fn with_content_length(mut self, len: u64) -> Self {
        self.content_length = len;
        self
    }

    /// Sets the last modified time.
    #[must_use]
    pub fn with_last_modified(mut self, time: SystemTime) -> Self {
        self.last_modified = Some(time);
        self
    }

    /// Sets the etag.
    #[must_use]
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Returns the entry mode.
    #[must_use]
    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    /// Returns true for regular objects.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.mode == EntryMode::File
    }

    /// Returns true for directories.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.mode == EntryMode::Dir
    }

    /// Content length in bytes. Zero for directories.
    #[must_use]
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Last modified time, if the backend knows it.
    #[must_use]
    pub fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }

    /// Last modified time as milliseconds since the Unix epoch.
    #[must_use]
    pub fn last_modified_ms(&self) -> Option<u64> {
        self.last_modified.map(|t| {
            t.duration_since(UNIX_EPOCH)
                .unwrap_or(Duration::ZERO)
                .as_millis() as u64
        })
    }

    /// Entity tag of the current content, if any.
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// Content type, if one was stored.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Overrides the content length. Used by layers that change object size.
    pub fn set_content_length(&mut self, len: u64) {
        self.content_length = len;
    }
}
