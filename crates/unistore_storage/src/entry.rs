//! Listing entries.

use crate::error::StorageResult;
use crate::metadata::EntryMode;
use crate::path::get_basename;

/// One element produced by a listing.
///
/// An entry is a plain value: it holds no open backend resource and stays
/// valid after the listing that produced it is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    path: String,
    name: String,
    mode: EntryMode,
}

impl Entry {
    /// Creates an entry for a path. The mode follows the trailing `/`.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = get_basename(&path).to_string();
        let mode = EntryMode::from_path(&path);
        Self { path, name, mode }
    }

    /// Returns the entry path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the last path segment (directories keep their trailing `/`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the entry mode.
    #[must_use]
    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    /// Consumes the entry, returning its path.
    #[must_use]
    pub fn into_path(self) -> String {
        self.path
    }
}

/// A lazy stream of entries produced by a backend.
pub type EntryStream = Box<dyn Iterator<Item = StorageResult<Entry>> + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_entry() {
        let entry = Entry::new("/myroot/testdir1/hello.txt");
        assert_eq!(entry.name(), "hello.txt");
        assert_eq!(entry.mode(), EntryMode::File);
    }

    #[test]
    fn dir_entry() {
        let entry = Entry::new("testdir1/subdir/");
        assert_eq!(entry.name(), "subdir/");
        assert_eq!(entry.mode(), EntryMode::Dir);
        assert_eq!(entry.into_path(), "testdir1/subdir/");
    }

    #[test]
    fn root_entry() {
        let entry = Entry::new("/");
        assert_eq!(entry.name(), "/");
        assert_eq!(entry.mode(), EntryMode::Dir);
    }
}
