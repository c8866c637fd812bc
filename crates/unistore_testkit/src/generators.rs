//! Property-based test generators using proptest.

use proptest::prelude::*;

/// Strategy for one path segment.
pub fn segment_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,15}")
        .expect("Invalid regex")
}

/// Strategy for file paths of one to four segments, without a trailing `/`.
pub fn file_path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(segment_strategy(), 1..=4).prop_map(|segments| segments.join("/"))
}

/// Strategy for directory paths, which always end with `/`.
pub fn dir_path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(segment_strategy(), 1..=3)
        .prop_map(|segments| format!("{}/", segments.join("/")))
}

/// Strategy for messy spellings of a path: doubled slashes, `./`, a
/// leading `/`. Yields `(messy, clean)`.
pub fn messy_path_strategy() -> impl Strategy<Value = (String, String)> {
    (file_path_strategy(), any::<bool>(), any::<bool>()).prop_map(|(clean, lead, dot)| {
        let mut messy = clean.replace('/', "//");
        if dot {
            messy = format!("./{messy}");
        }
        if lead {
            messy = format!("/{messy}");
        }
        (messy, clean)
    })
}

/// Strategy for arbitrary payloads, including empty and non-UTF-8 ones.
pub fn payload_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Strategy for a payload together with a chunk size that fits in it.
pub fn chunked_payload_strategy(max_len: usize) -> impl Strategy<Value = (Vec<u8>, usize)> {
    payload_strategy(max_len).prop_flat_map(|data| {
        let upper = data.len().max(1);
        (Just(data), 1..=upper)
    })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 128,
            max_shrink_iters: 500,
        }
    }
}

impl PropTestConfig {
    /// Few cases, for suites that touch the filesystem.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 24,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
