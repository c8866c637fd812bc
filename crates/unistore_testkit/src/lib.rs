//! # Unistore Testkit
//!
//! Test utilities for Unistore.
//!
//! This crate provides:
//! - Operator fixtures over every backend
//! - A backend wrapper that hides capabilities, to exercise emulation
//! - Property-based test generators using proptest
//!
//! The cross-backend behavior suite lives in this crate's `tests/`.
//!
//! ## Usage
//!
//! ```rust
//! use unistore_testkit::prelude::*;
//!
//! for_each_operator(|fixture| {
//!     fixture.write("hello.txt", "hi").unwrap();
//!     assert_eq!(&fixture.read("hello.txt").unwrap()[..], b"hi");
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod restricted;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::restricted::*;
}

pub use fixtures::*;
pub use generators::*;
pub use restricted::*;
