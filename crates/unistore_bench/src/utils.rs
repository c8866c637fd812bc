//! Benchmark utilities.

use rand::Rng;
use tempfile::TempDir;
use unistore_core::{Operator, Result};

/// Generate random object data of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// A filesystem operator and the directory that backs it.
///
/// The directory is removed when the pair drops.
pub fn fs_operator() -> (Operator, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let op = Operator::new("fs", [("root", dir.path().to_string_lossy().to_string())])
        .expect("Failed to create fs operator");
    (op, dir)
}

/// Writes `dirs` directories of `files_per_dir` small files under `prefix`.
pub fn populate(op: &Operator, prefix: &str, dirs: usize, files_per_dir: usize) -> Result<()> {
    for d in 0..dirs {
        for f in 0..files_per_dir {
            op.write(&format!("{prefix}dir{d:03}/file{f:04}"), random_data(64))?;
        }
    }
    Ok(())
}
