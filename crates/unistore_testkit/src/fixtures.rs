//! Test fixtures and operator helpers.
//!
//! Provides ready-made operators over each backend so the same test body
//! can run against all of them.

use crate::restricted::RestrictedBackend;
use std::path::PathBuf;
use tempfile::TempDir;
use unistore_core::{Operator, Result};
use unistore_storage::MemoryBackend;

/// An operator with its backing resources kept alive.
pub struct TestOperator {
    /// The operator instance.
    pub op: Operator,
    label: &'static str,
    // Removed when the fixture drops.
    _temp_dir: Option<TempDir>,
}

impl TestOperator {
    /// An in-memory operator rooted at `/testroot`.
    pub fn memory() -> Self {
        Self {
            op: Operator::new("memory", [("root", "/testroot")])
                .expect("Failed to create memory operator"),
            label: "memory",
            _temp_dir: None,
        }
    }

    /// A filesystem operator rooted in a fresh temporary directory.
    pub fn fs() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("root");
        let op = Operator::new("fs", [("root", root.to_string_lossy().to_string())])
            .expect("Failed to create fs operator");
        Self {
            op,
            label: "fs",
            _temp_dir: Some(temp_dir),
        }
    }

    /// An operator over a memory backend that hides `create_dir`.
    pub fn without_create_dir() -> Self {
        Self::restricted(RestrictedBackend::without_create_dir(), "memory-no-create-dir")
    }

    /// An operator over a memory backend that can only stat, read and list.
    ///
    /// `seed` runs against the writable backend first.
    pub fn read_only(seed: impl FnOnce(&Operator) -> Result<()>) -> Self {
        let backend = RestrictedBackend::new(MemoryBackend::new());
        let writable = Operator::builder(backend.clone()).root("/testroot").finish();
        seed(&writable).expect("Failed to seed read-only backend");
        Self::restricted(backend.into_read_only(), "memory-read-only")
    }

    /// An operator over any restricted backend.
    pub fn restricted(backend: RestrictedBackend, label: &'static str) -> Self {
        Self {
            op: Operator::builder(backend).root("/testroot").finish(),
            label,
            _temp_dir: None,
        }
    }

    /// Short name for assertion messages.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The local directory backing an `fs` fixture.
    pub fn local_root(&self) -> Option<PathBuf> {
        self._temp_dir.as_ref().map(|d| d.path().join("root"))
    }
}

impl std::ops::Deref for TestOperator {
    type Target = Operator;

    fn deref(&self) -> &Self::Target {
        &self.op
    }
}

/// Every fully writable fixture: memory, fs, and memory without
/// `create_dir`.
pub fn writable_operators() -> Vec<TestOperator> {
    vec![
        TestOperator::memory(),
        TestOperator::fs(),
        TestOperator::without_create_dir(),
    ]
}

/// Runs `f` against every writable fixture.
pub fn for_each_operator<F>(mut f: F)
where
    F: FnMut(&TestOperator),
{
    for fixture in writable_operators() {
        f(&fixture);
    }
}

/// Runs a test with a temporary in-memory operator.
///
/// # Example
///
/// ```rust
/// use unistore_testkit::with_memory_operator;
///
/// with_memory_operator(|op| {
///     op.write("hello.txt", "hi").unwrap();
///     assert!(op.exists("hello.txt").unwrap());
/// });
/// ```
pub fn with_memory_operator<F, R>(f: F) -> R
where
    F: FnOnce(&Operator) -> R,
{
    let fixture = TestOperator::memory();
    f(&fixture.op)
}

/// Runs a test with a temporary filesystem operator.
pub fn with_fs_operator<F, R>(f: F) -> R
where
    F: FnOnce(&Operator, &std::path::Path) -> R,
{
    let fixture = TestOperator::fs();
    let root = fixture.local_root().expect("fs fixture should have a root");
    f(&fixture.op, &root)
}

/// Scenario helpers.
pub mod scenarios {
    use super::*;

    /// Writes a small tree:
    ///
    /// ```text
    /// tree/
    ///   a.txt
    ///   b.txt
    ///   sub/
    ///     c.txt
    ///     deeper/
    ///       d.txt
    /// ```
    ///
    /// Directories are created explicitly when the operator supports it.
    /// Returns the file paths written.
    pub fn write_tree(op: &Operator) -> Result<Vec<&'static str>> {
        if op.info().full_capability().create_dir {
            for dir in ["tree/", "tree/sub/", "tree/sub/deeper/"] {
                op.create_dir(dir)?;
            }
        }
        let files = ["tree/a.txt", "tree/b.txt", "tree/sub/c.txt", "tree/sub/deeper/d.txt"];
        for file in files {
            op.write(file, file.as_bytes().to_vec())?;
        }
        Ok(files.to_vec())
    }

    /// Deterministic non-text payload of `len` bytes.
    pub fn binary_payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i.wrapping_mul(31) ^ (i >> 8)) as u8).collect()
    }
}
