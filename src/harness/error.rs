//! Error taxonomy of the harness.
//!
//! Two families live here:
//! - [`HarnessError`]: structural mistakes found while *setting up* discovery (bad root, unknown scope,
//!   a target outside the root, a negative case number). These are returned to the caller.
//! - [`CaseFailure`]: everything that goes wrong while *loading or running* an individual case. These are
//!   never returned as errors; they become the payload of a failed [`Outcome`](super::outcome::Outcome)
//!   so one broken fixture cannot hide the rest of the suite.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Error returned by an entry point when the program under test faults.
pub type InvocationError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fatal setup errors.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("tests directory not found: {}", .0.display())]
    InvalidRoot(PathBuf),

    #[error("tests directory {} relative to scope '{scope}' not found", .path.display())]
    ScopeNotFound { scope: String, path: PathBuf },

    #[error("trying to produce tests for {} outside of {}", .target.display(), .root.display())]
    OutsideRoot { root: PathBuf, target: PathBuf },

    #[error("case numbers must be non-negative, got {0}")]
    NegativeCaseNumber(i64),

    #[error("case number {0} is out of range")]
    CaseNumberOutOfRange(i64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single test failed.
///
/// Cloneable and owned so outcomes can outlive the fixtures and threads that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseFailure {
    #[error("problems reading test case {}: {reason}", .path.display())]
    FixtureRead { path: PathBuf, reason: String },

    #[error("error executing tests: {0}")]
    Invocation(String),

    #[error("execution timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{}", render_mismatch(.expected, .actual))]
    Mismatch { expected: Vec<String>, actual: Vec<String> },

    #[error("could not write actual output to {}: {reason}", .path.display())]
    ActualOutput { path: PathBuf, reason: String },

    #[error("problems reading tests in {}: {reason}", .path.display())]
    MissingTestsDir { path: PathBuf, reason: String },

    #[error("no test cases found")]
    MissingTestCases,

    #[error("fixture directory {} does not name a target", .0.display())]
    InvalidTargetName(PathBuf),
}

impl CaseFailure {
    /// Short machine-friendly label, used by the JSON report.
    pub fn kind(&self) -> &'static str {
        match self {
            CaseFailure::FixtureRead { .. } => "fixture_read",
            CaseFailure::Invocation(_) => "invocation",
            CaseFailure::Timeout(_) => "timeout",
            CaseFailure::Mismatch { .. } => "mismatch",
            CaseFailure::ActualOutput { .. } => "actual_output",
            CaseFailure::MissingTestsDir { .. } => "missing_tests_dir",
            CaseFailure::MissingTestCases => "missing_test_cases",
            CaseFailure::InvalidTargetName(_) => "invalid_target_name",
        }
    }
}

fn render_mismatch(expected: &[String], actual: &[String]) -> String {
    LineDiff { expected, actual }.to_string()
}

/// Line-by-line rendering of an expected/actual mismatch.
struct LineDiff<'a> {
    expected: &'a [String],
    actual: &'a [String],
}

impl fmt::Display for LineDiff<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "output differs from expected ({} expected lines, {} actual lines)",
            self.expected.len(),
            self.actual.len()
        )?;
        let max_lines = self.expected.len().max(self.actual.len());
        for i in 0..max_lines {
            let expected = self.expected.get(i);
            let actual = self.actual.get(i);
            if expected == actual {
                continue;
            }
            writeln!(f, "line {}:", i + 1)?;
            match expected {
                Some(line) => writeln!(f, "  - {}", line)?,
                None => writeln!(f, "  - <missing>")?,
            }
            match actual {
                Some(line) => writeln!(f, "  + {}", line)?,
                None => writeln!(f, "  + <missing>")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mismatch_renders_changed_lines_only() {
        let failure = CaseFailure::Mismatch {
            expected: lines(&["1", "2", "3"]),
            actual: lines(&["1", "5"]),
        };
        let text = failure.to_string();
        assert!(text.starts_with("output differs from expected (3 expected lines, 2 actual lines)"));
        assert!(!text.contains("line 1:"));
        assert!(text.contains("line 2:\n  - 2\n  + 5\n"));
        assert!(text.contains("line 3:\n  - 3\n  + <missing>\n"));
    }

    #[test]
    fn test_timeout_message() {
        assert_eq!(
            CaseFailure::Timeout(Duration::from_millis(1500)).to_string(),
            "execution timed out after 1500 ms"
        );
        assert_eq!(CaseFailure::Timeout(Duration::from_secs(1)).kind(), "timeout");
    }

    #[test]
    fn test_outside_root_message() {
        let err = HarnessError::OutsideRoot {
            root: PathBuf::from("/tests"),
            target: PathBuf::from("/elsewhere/Foo"),
        };
        assert_eq!(err.to_string(), "trying to produce tests for /elsewhere/Foo outside of /tests");
    }
}
