//! Common utilities for the Wren HTML processors.
//!
//! This crate provides shared infrastructure used by the tag processor, the
//! HTML processor and the command-line drivers:
//! - **Warning System** - deduplicated, colored diagnostics on stderr

pub mod warning;
