//! Directory listing cursor.

use crate::error::{Error, Result};
use unistore_storage::{build_rel_path, Entry, EntryStream};

/// A forward-only cursor over the entries of a directory.
///
/// Entry paths are relative to the operator root, like caller paths. Once
/// the cursor returns `None` (or an error) it stays exhausted.
///
/// ```rust
/// use unistore_core::Operator;
///
/// let op = Operator::new("memory", [("root", "/docs")]).unwrap();
/// op.write("guide/intro.md", "# Intro").unwrap();
///
/// let mut lister = op.list("guide/").unwrap();
/// let mut names = Vec::new();
/// while let Some(entry) = lister.next_entry().unwrap() {
///     if !lister.is_self(&entry) {
///         names.push(entry.name().to_string());
///     }
/// }
/// assert_eq!(names, ["intro.md"]);
/// ```
pub struct Lister {
    stream: Option<EntryStream>,
    root: String,
    path: String,
}

impl Lister {
    pub(crate) fn new(stream: EntryStream, root: String, path: String) -> Self {
        Self {
            stream: Some(stream),
            root,
            path,
        }
    }

    /// Returns the directory being listed.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true if `entry` is the listed directory itself.
    #[must_use]
    pub fn is_self(&self, entry: &Entry) -> bool {
        entry.path() == self.path
    }

    /// Returns the next entry, or `None` when exhausted.
    ///
    /// # Errors
    ///
    /// Returns the backend error that interrupted the listing. The cursor is
    /// exhausted afterwards.
    pub fn next_entry(&mut self) -> Result<Option<Entry>> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };
        match stream.next() {
            Some(Ok(entry)) => Ok(Some(Entry::new(build_rel_path(&self.root, entry.path())))),
            Some(Err(err)) => {
                self.stream = None;
                Err(Error::from_storage("list", self.path.clone(), err))
            }
            None => {
                self.stream = None;
                Ok(None)
            }
        }
    }
}

impl Iterator for Lister {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

impl std::iter::FusedIterator for Lister {}

impl std::fmt::Debug for Lister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lister")
            .field("root", &self.root)
            .field("path", &self.path)
            .field("exhausted", &self.stream.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unistore_storage::StorageError;

    fn lister(items: Vec<unistore_storage::StorageResult<Entry>>) -> Lister {
        Lister::new(
            Box::new(items.into_iter()),
            "/root/".to_string(),
            "dir/".to_string(),
        )
    }

    #[test]
    fn paths_are_made_relative() {
        let mut l = lister(vec![
            Ok(Entry::new("/root/dir/")),
            Ok(Entry::new("/root/dir/a.txt")),
        ]);
        let first = l.next_entry().unwrap().unwrap();
        assert!(l.is_self(&first));
        let second = l.next_entry().unwrap().unwrap();
        assert_eq!(second.path(), "dir/a.txt");
        assert_eq!(second.name(), "a.txt");
        assert!(!l.is_self(&second));
    }

    #[test]
    fn exhausted_stays_exhausted() {
        let mut l = lister(vec![Ok(Entry::new("/root/dir/a"))]);
        assert!(l.next().is_some());
        assert!(l.next().is_none());
        assert!(l.next().is_none());
        assert!(l.next_entry().unwrap().is_none());
    }

    #[test]
    fn error_ends_the_listing() {
        let mut l = lister(vec![
            Err(StorageError::Unexpected("broken".into())),
            Ok(Entry::new("/root/dir/a")),
        ]);
        let err = l.next_entry().unwrap_err();
        assert_eq!(err.operation(), "list");
        assert!(l.next().is_none());
    }
}
