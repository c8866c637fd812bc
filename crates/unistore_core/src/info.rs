//! Operator information.

use unistore_storage::Capability;

/// Scheme, name, root and capabilities of an [`Operator`](crate::Operator).
///
/// A snapshot taken at construction. Later calls never change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorInfo {
    pub(crate) scheme: String,
    pub(crate) name: String,
    pub(crate) root: String,
    pub(crate) native: Capability,
    pub(crate) full: Capability,
}

impl OperatorInfo {
    /// Returns the backend scheme, e.g. `memory`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the instance name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the normalized root, e.g. `/myroot/`.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns what the backend implements itself.
    #[must_use]
    pub fn native_capability(&self) -> Capability {
        self.native
    }

    /// Returns native plus emulated capabilities.
    #[must_use]
    pub fn full_capability(&self) -> Capability {
        self.full
    }
}
