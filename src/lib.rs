#![forbid(unsafe_code)]
//! Black-box test harness driven by fixture directories.
//!
//! Given a directory tree of fixtures, the harness discovers one case-set per target program, runs each
//! case with its arguments and standard input, and compares the program's standard output with the
//! expected transcript, line by line.
//!
//! ```text
//! tests/
//!   clients/
//!     first/
//!       Summer/
//!         args-1.txt       (optional, one argument per line)
//!         input-1.txt      (optional, fed to stdin)
//!         expected-1.txt   (expected stdout)
//! ```
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `harness`
//!   modules enforce `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//! - **Programs under test**: panics raised by an in-process entry point are caught on the case's worker
//!   thread and reported as failed cases.

pub mod cli;
pub mod harness;
pub mod version;

pub use harness::{
    CaseFailure, CaseRunner, CaseSet, CommandResolver, Discoverer, DynamicTest, EntryPoint, EntryPointResolver,
    HarnessConfig, HarnessError, Outcome, OutcomeNode, Registry, Summary, TestNode, TestReporter, entry_fn,
    run_tree,
};
