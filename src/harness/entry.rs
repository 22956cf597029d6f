//! The entry-point boundary.
//!
//! The harness never knows how a program under test is located or started. It only needs:
//! - [`EntryPoint`]: something it can call with an argument list, a standard-input stream and a
//!   standard-output sink;
//! - [`EntryPointResolver`]: a lookup from a qualified target name (`clients.first.Summer`) to an entry
//!   point.
//!
//! Streams are passed explicitly; nothing in the harness swaps process-global handles. [`Registry`] is
//! the in-process resolver; [`CommandResolver`](super::process::CommandResolver) runs executables.

use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Write};
use std::sync::Arc;

use super::error::InvocationError;

/// A program under test.
///
/// Implementations must be callable from a worker thread: a case that exceeds its timeout is abandoned
/// while its invocation may still be running.
pub trait EntryPoint: Send + Sync {
    /// Run the program.
    ///
    /// `args` is an owned copy; mutating it cannot affect later cases.
    fn invoke(
        &self,
        args: Vec<String>,
        stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
    ) -> Result<(), InvocationError>;
}

/// Resolve qualified target names to entry points.
pub trait EntryPointResolver: Send + Sync {
    /// Returns `None` when the target does not exist or has no invocable entry point.
    fn resolve(&self, qualified_name: &str) -> Option<Arc<dyn EntryPoint>>;
}

/// Adapter turning a closure into an [`EntryPoint`].
pub struct FnEntryPoint<F>(pub F);

impl<F> EntryPoint for FnEntryPoint<F>
where
    F: Fn(Vec<String>, &mut dyn BufRead, &mut dyn Write) -> Result<(), InvocationError> + Send + Sync,
{
    fn invoke(
        &self,
        args: Vec<String>,
        stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
    ) -> Result<(), InvocationError> {
        (self.0)(args, stdin, stdout)
    }
}

/// Wrap a closure as a shared [`EntryPoint`].
pub fn entry_fn<F>(main: F) -> Arc<dyn EntryPoint>
where
    F: Fn(Vec<String>, &mut dyn BufRead, &mut dyn Write) -> Result<(), InvocationError> + Send + Sync + 'static,
{
    Arc::new(FnEntryPoint(main))
}

/// In-process table of named entry points.
#[derive(Default, Clone)]
pub struct Registry {
    entries: HashMap<String, Arc<dyn EntryPoint>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entry` under `qualified_name`, replacing any previous registration.
    pub fn register(&mut self, qualified_name: impl Into<String>, entry: Arc<dyn EntryPoint>) -> &mut Self {
        self.entries.insert(qualified_name.into(), entry);
        self
    }

    /// Register a closure as the `main` of `qualified_name`.
    pub fn register_fn<F>(&mut self, qualified_name: impl Into<String>, main: F) -> &mut Self
    where
        F: Fn(Vec<String>, &mut dyn BufRead, &mut dyn Write) -> Result<(), InvocationError>
            + Send
            + Sync
            + 'static,
    {
        self.register(qualified_name, entry_fn(main))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EntryPointResolver for Registry {
    fn resolve(&self, qualified_name: &str) -> Option<Arc<dyn EntryPoint>> {
        self.entries.get(qualified_name).cloned()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("Registry").field("entries", &names).finish()
    }
}
