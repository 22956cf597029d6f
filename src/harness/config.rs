//! Harness configuration.
//!
//! The only environment-driven knob is `GENERATE_ACTUAL_FILES`: when the variable is present (its value is
//! ignored) every executed case persists its raw captured output as `actual-<n>.txt` next to its fixtures.

use std::env;
use std::time::Duration;

/// Environment variable enabling `actual-<n>.txt` artifacts.
pub const GENERATE_ACTUAL_FILES_ENV: &str = "GENERATE_ACTUAL_FILES";

/// Wall-clock budget for a single case.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings shared by every case built from one discoverer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Maximum time a case may run before it is abandoned and failed.
    pub timeout: Duration,
    /// Persist captured output as `actual-<n>.txt`.
    pub emit_actual: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            emit_actual: false,
        }
    }
}

impl HarnessConfig {
    /// Default settings, with `emit_actual` taken from the process environment.
    pub fn from_env() -> Self {
        Self::default().with_emit_actual(env::var_os(GENERATE_ACTUAL_FILES_ENV).is_some())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_emit_actual(mut self, emit_actual: bool) -> Self {
        self.emit_actual = emit_actual;
        self
    }
}
