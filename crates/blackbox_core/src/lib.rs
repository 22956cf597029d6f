//! Provide the pure, shared vocabulary of the blackbox harness.
//!
//! This crate is intentionally small and dependency-free. It holds the deterministic rules that both
//! the discovery side and the execution side of the harness must agree on:
//! - how fixture files are named and how case numbers are recovered from file names,
//! - how a transcript is normalized before comparison ("significant lines"),
//! - how namespace-qualified target names map to fixture directories and back.
//!
//! ## Notes
//!
//! - This is a "semantic core" crate: **no IO**, no global state.

pub mod fixtures;
pub mod lines;
pub mod names;

pub use fixtures::{CaseFile, parse_case_number};
pub use lines::significant_lines;
pub use names::{NAMESPACE_SEPARATOR, qualified_name, scope_to_path};
