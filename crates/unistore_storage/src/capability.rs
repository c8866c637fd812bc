//! Capability descriptor.

/// A snapshot of what a backend can do.
///
/// Every operator carries two of these: the *native* set (what the backend
/// implements itself) and the *full* set (native plus everything the
/// operator emulates on top). Every flag set in the native set is also set
/// in the full set; see [`Capability::is_subset_of`].
///
/// Numeric limits use `None` for "unbounded or unknown". Limits are never
/// emulated, so the full set reports the native values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capability {
    /// `stat` is available.
    pub stat: bool,
    /// `stat` honours `if_match`.
    pub stat_with_if_match: bool,
    /// `stat` honours `if_none_match`.
    pub stat_with_if_none_match: bool,

    /// `read` is available.
    pub read: bool,
    /// `read` honours `if_match`.
    pub read_with_if_match: bool,
    /// `read` honours `if_none_match`.
    pub read_with_if_none_match: bool,
    /// `read` can override the returned cache-control header.
    pub read_with_override_cache_control: bool,
    /// `read` can override the returned content-disposition header.
    pub read_with_override_content_disposition: bool,
    /// `read` can override the returned content-type header.
    pub read_with_override_content_type: bool,

    /// `write` is available.
    pub write: bool,
    /// Writes may be split over several calls before commit.
    pub write_can_multi: bool,
    /// Empty objects may be written.
    pub write_can_empty: bool,
    /// Writes may append to an existing object.
    pub write_can_append: bool,
    /// `write` stores a cache-control header.
    pub write_with_cache_control: bool,
    /// `write` stores a content-disposition header.
    pub write_with_content_disposition: bool,
    /// `write` stores a content-type header.
    pub write_with_content_type: bool,
    /// Minimum part size for multi-part writes.
    pub write_multi_min_size: Option<usize>,
    /// Maximum part size for multi-part writes.
    pub write_multi_max_size: Option<usize>,
    /// Maximum total object size.
    pub write_total_max_size: Option<usize>,

    /// `create_dir` is available.
    pub create_dir: bool,
    /// `delete` is available.
    pub delete: bool,
    /// `copy` is available.
    pub copy: bool,
    /// `rename` is available.
    pub rename: bool,

    /// `list` is available.
    pub list: bool,
    /// `list` accepts a limit.
    pub list_with_limit: bool,
    /// `list` accepts a start-after key.
    pub list_with_start_after: bool,
    /// `list` can walk the whole subtree.
    pub list_with_recursive: bool,

    /// Presigned requests are available.
    pub presign: bool,
    /// Presigned reads are available.
    pub presign_read: bool,
    /// Presigned stats are available.
    pub presign_stat: bool,
    /// Presigned writes are available.
    pub presign_write: bool,

    /// Storage is shared between processes/hosts.
    pub shared: bool,
    /// Calls can be made without an async runtime.
    pub blocking: bool,
}

impl Capability {
    /// Returns true if every flag set in `self` is also set in `other`.
    ///
    /// Numeric limits are not compared.
    #[must_use]
    pub fn is_subset_of(&self, other: &Capability) -> bool {
        self.flags()
            .iter()
            .zip(other.flags().iter())
            .all(|((_, mine), (_, theirs))| !mine || *theirs)
    }

    /// Returns every boolean flag with its name, in declaration order.
    #[must_use]
    pub fn flags(&self) -> [(&'static str, bool); 30] {
        [
            ("stat", self.stat),
            ("stat_with_if_match", self.stat_with_if_match),
            ("stat_with_if_none_match", self.stat_with_if_none_match),
            ("read", self.read),
            ("read_with_if_match", self.read_with_if_match),
            ("read_with_if_none_match", self.read_with_if_none_match),
            (
                "read_with_override_cache_control",
                self.read_with_override_cache_control,
            ),
            (
                "read_with_override_content_disposition",
                self.read_with_override_content_disposition,
            ),
            (
                "read_with_override_content_type",
                self.read_with_override_content_type,
            ),
            ("write", self.write),
            ("write_can_multi", self.write_can_multi),
            ("write_can_empty", self.write_can_empty),
            ("write_can_append", self.write_can_append),
            ("write_with_cache_control", self.write_with_cache_control),
            (
                "write_with_content_disposition",
                self.write_with_content_disposition,
            ),
            ("write_with_content_type", self.write_with_content_type),
            ("create_dir", self.create_dir),
            ("delete", self.delete),
            ("copy", self.copy),
            ("rename", self.rename),
            ("list", self.list),
            ("list_with_limit", self.list_with_limit),
            ("list_with_start_after", self.list_with_start_after),
            ("list_with_recursive", self.list_with_recursive),
            ("presign", self.presign),
            ("presign_read", self.presign_read),
            ("presign_stat", self.presign_stat),
            ("presign_write", self.presign_write),
            ("shared", self.shared),
            ("blocking", self.blocking),
        ]
    }

    /// Returns the names of all flags that are set.
    #[must_use]
    pub fn enabled(&self) -> Vec<&'static str> {
        self.flags()
            .iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| *name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        let cap = Capability::default();
        assert!(cap.enabled().is_empty());
        assert_eq!(cap.write_total_max_size, None);
    }

    #[test]
    fn subset_checks_every_flag() {
        let native = Capability {
            read: true,
            stat: true,
            ..Default::default()
        };
        let full = Capability {
            read: true,
            stat: true,
            copy: true,
            ..Default::default()
        };
        assert!(native.is_subset_of(&full));
        assert!(!full.is_subset_of(&native));
        assert!(native.is_subset_of(&native));
    }

    #[test]
    fn subset_ignores_limits() {
        let a = Capability {
            write: true,
            write_total_max_size: Some(10),
            ..Default::default()
        };
        let b = Capability {
            write: true,
            ..Default::default()
        };
        assert!(a.is_subset_of(&b));
    }

    #[test]
    fn enabled_lists_names() {
        let cap = Capability {
            list: true,
            blocking: true,
            ..Default::default()
        };
        assert_eq!(cap.enabled(), vec!["list", "blocking"]);
    }
}
