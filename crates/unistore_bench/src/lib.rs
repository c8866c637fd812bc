//! Shared setup for the Unistore benchmarks.

#![warn(missing_docs)]

pub mod utils;
