//! Reporting hooks.
//!
//! The harness never prints. Front ends observe a run by implementing [`TestReporter`]; the callbacks
//! fire in execution order while a [`TestNode`](super::tree::TestNode) tree is walked.

use std::time::Duration;

use super::outcome::{Outcome, Summary};

/// Trait for observing test execution.
pub trait TestReporter {
    /// Called when a named group starts; `depth` is 0 for top-level nodes.
    fn on_group_start(&mut self, _name: &str, _depth: usize) {}

    /// Called when a named group has finished.
    fn on_group_end(&mut self, _name: &str, _depth: usize) {}

    /// Called right before a test runs.
    fn on_test_start(&mut self, _name: &str, _depth: usize) {}

    /// Called when a test completes
    fn on_test_complete(&mut self, name: &str, depth: usize, outcome: &Outcome, duration: Duration);

    /// Called when all tests have completed
    fn on_run_complete(&mut self, _summary: &Summary) {}
}

/// Reporter that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl TestReporter for NullReporter {
    fn on_test_complete(&mut self, _name: &str, _depth: usize, _outcome: &Outcome, _duration: Duration) {}
}
