//! Operator configuration.

use crate::error::{Error, ErrorKind, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use unistore_storage::{FS_SCHEME, MEMORY_SCHEME};

/// Default size of one ranged fetch made by a [`Reader`](crate::Reader).
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Backends that [`Operator::new`](crate::Operator::new) can build by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// In-memory backend.
    Memory,
    /// Local filesystem backend.
    Fs,
}

impl Scheme {
    /// Returns the scheme identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => MEMORY_SCHEME,
            Self::Fs => FS_SCHEME,
        }
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            MEMORY_SCHEME => Ok(Self::Memory),
            FS_SCHEME => Ok(Self::Fs),
            other => Err(Error::new(
                ErrorKind::Unsupported,
                format!("unknown scheme: {other}"),
            )),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generic operator settings.
///
/// Backend-specific keys (such as `max_object_size` for memory) are read by
/// the backend factory, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorConfig {
    /// Root every caller path is resolved under.
    pub root: String,
    /// Instance name. Defaults to the backend's own name.
    pub name: Option<String>,
    /// Size of one ranged fetch made by a reader.
    pub chunk_size: usize,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            root: "/".to_string(),
            name: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl OperatorConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root.
    #[must_use]
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Sets the instance name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the reader chunk size.
    #[must_use]
    pub const fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Reads the generic keys (`root`, `name`, `chunk_size`) from an option map.
    ///
    /// Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// `ConfigInvalid` if `chunk_size` is not a positive integer.
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(root) = options.get("root") {
            config.root = root.clone();
        }
        if let Some(name) = options.get("name") {
            config.name = Some(name.clone());
        }
        if let Some(size) = parse_usize(options, "chunk_size")? {
            if size == 0 {
                return Err(invalid("chunk_size", "must be greater than zero"));
            }
            config.chunk_size = size;
        }
        Ok(config)
    }
}

/// Parses an optional unsigned integer option.
pub(crate) fn parse_usize(options: &HashMap<String, String>, key: &str) -> Result<Option<usize>> {
    options
        .get(key)
        .map(|raw| {
            raw.trim()
                .parse::<usize>()
                .map_err(|e| invalid(key, &format!("{raw:?} is not a valid size: {e}")))
        })
        .transpose()
}

pub(crate) fn invalid(key: &str, message: &str) -> Error {
    Error::new(ErrorKind::ConfigInvalid, format!("option {key}: {message}"))
        .with_operation("new")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn default_config() {
        let config = OperatorConfig::default();
        assert_eq!(config.root, "/");
        assert_eq!(config.name, None);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn builder_pattern() {
        let config = OperatorConfig::new()
            .root("/data")
            .name("primary")
            .chunk_size(1024);
        assert_eq!(config.root, "/data");
        assert_eq!(config.name.as_deref(), Some("primary"));
        assert_eq!(config.chunk_size, 1024);
    }

    #[test]
    fn from_options_reads_generic_keys() {
        let config = OperatorConfig::from_options(&options(&[
            ("root", "/myroot"),
            ("chunk_size", "4096"),
            ("bucket", "ignored"),
        ]))
        .unwrap();
        assert_eq!(config.root, "/myroot");
        assert_eq!(config.chunk_size, 4096);
    }

    #[test]
    fn malformed_chunk_size_is_rejected() {
        for bad in ["abc", "-1", "0"] {
            let err = OperatorConfig::from_options(&options(&[("chunk_size", bad)])).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConfigInvalid, "value {bad}");
        }
    }

    #[test]
    fn scheme_parsing() {
        assert_eq!("memory".parse::<Scheme>().unwrap(), Scheme::Memory);
        assert_eq!("fs".parse::<Scheme>().unwrap(), Scheme::Fs);
        let err = "s3".parse::<Scheme>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
