//! Per-operation arguments.
//!
//! Backends receive these unchanged from the operator. A backend must ignore
//! any argument whose capability flag it does not report natively; the
//! operator emulates those arguments before the call reaches the backend.

use std::ops::Range;

/// Arguments for `stat`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpStat {
    /// Fail unless the current etag equals this value.
    pub if_match: Option<String>,
    /// Fail if the current etag equals this value.
    pub if_none_match: Option<String>,
}

impl OpStat {
    /// Creates empty stat arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the if-match condition.
    #[must_use]
    pub fn with_if_match(mut self, etag: impl Into<String>) -> Self {
        self.if_match = Some(etag.into());
        self
    }

    /// Sets the if-none-match condition.
    #[must_use]
    pub fn with_if_none_match(mut self, etag: impl Into<String>) -> Self {
        self.if_none_match = Some(etag.into());
        self
    }

    /// Returns true if any condition is set.
    #[must_use]
    pub fn has_conditions(&self) -> bool {
        self.if_match.is_some() || self.if_none_match.is_some()
    }
}

/// Arguments for `read`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpRead {
    /// Byte range to read. `None` reads the whole object. The end is clamped
    /// to the object size.
    pub range: Option<Range<u64>>,
    /// Fail unless the current etag equals this value.
    pub if_match: Option<String>,
    /// Fail if the current etag equals this value.
    pub if_none_match: Option<String>,
}

impl OpRead {
    /// Creates arguments for a full read.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the read to a byte range.
    #[must_use]
    pub fn with_range(mut self, range: Range<u64>) -> Self {
        self.range = Some(range);
        self
    }

    /// Sets the if-match condition.
    #[must_use]
    pub fn with_if_match(mut self, etag: impl Into<String>) -> Self {
        self.if_match = Some(etag.into());
        self
    }

    /// Sets the if-none-match condition.
    #[must_use]
    pub fn with_if_none_match(mut self, etag: impl Into<String>) -> Self {
        self.if_none_match = Some(etag.into());
        self
    }

    /// Returns the conditions as stat arguments.
    #[must_use]
    pub fn conditions(&self) -> OpStat {
        OpStat {
            if_match: self.if_match.clone(),
            if_none_match: self.if_none_match.clone(),
        }
    }
}

/// Arguments for `write`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpWrite {
    /// Append to the existing object instead of replacing it.
    pub append: bool,
    /// Content type to store with the object.
    pub content_type: Option<String>,
}

impl OpWrite {
    /// Creates arguments for a plain overwrite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to append mode.
    #[must_use]
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Arguments for `list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpList {
    /// Walk the whole subtree instead of immediate children.
    pub recursive: bool,
    /// Yield at most this many entries.
    pub limit: Option<usize>,
    /// Skip entries whose path sorts at or before this path.
    pub start_after: Option<String>,
}

impl OpList {
    /// Creates arguments for a single-level listing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables recursive listing.
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Caps the number of entries.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Starts after the given path.
    #[must_use]
    pub fn with_start_after(mut self, path: impl Into<String>) -> Self {
        self.start_after = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_conditions() {
        let args = OpRead::new().with_range(0..4).with_if_match("\"e\"");
        assert_eq!(args.range, Some(0..4));
        let cond = args.conditions();
        assert!(cond.has_conditions());
        assert_eq!(cond.if_match.as_deref(), Some("\"e\""));
        assert!(!OpStat::new().has_conditions());
    }

    #[test]
    fn write_and_list_builders() {
        let w = OpWrite::new().with_append(true).with_content_type("text/plain");
        assert!(w.append);
        assert_eq!(w.content_type.as_deref(), Some("text/plain"));

        let l = OpList::new().with_recursive(true).with_limit(3).with_start_after("b");
        assert!(l.recursive);
        assert_eq!(l.limit, Some(3));
        assert_eq!(l.start_after.as_deref(), Some("b"));
    }
}
