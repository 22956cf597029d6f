//! The black-box harness.
//!
//! Components, bottom-up:
//!
//! - [`case::CaseRunner`]: one case, loaded from `args-<n>.txt` / `input-<n>.txt` / `expected-<n>.txt`,
//!   executed on an isolated worker with a timeout;
//! - [`case_set::CaseSet`]: the ordered cases of one target directory;
//! - [`discover::Discoverer`]: recursive discovery of case-sets and shaping into a [`tree::TestNode`]
//!   forest.
//!
//! Entry points are resolved through [`entry::EntryPointResolver`]; [`entry::Registry`] holds in-process
//! programs and [`process::CommandResolver`] runs executables.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod case;
pub mod case_set;
pub mod config;
pub mod discover;
pub mod entry;
pub mod error;
pub mod outcome;
pub mod process;
pub mod redirect;
pub mod report;
pub mod tree;

pub use case::{CaseNumber, CaseRunner};
pub use case_set::CaseSet;
pub use config::HarnessConfig;
pub use discover::Discoverer;
pub use entry::{EntryPoint, EntryPointResolver, Registry, entry_fn};
pub use error::{CaseFailure, HarnessError, InvocationError};
pub use outcome::{Outcome, OutcomeNode, Summary};
pub use process::CommandResolver;
pub use report::{NullReporter, TestReporter};
pub use tree::{DynamicTest, TestNode, run_tree};
