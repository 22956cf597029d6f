//! Console reporter (pytest-style).

use std::time::Duration;

use crate::harness::{Outcome, Summary, TestReporter};

/// Prints one status line per test, indented by group depth, and a closing summary.
#[derive(Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
    failures: Vec<(String, String)>,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            failures: Vec::new(),
        }
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Colored status text for one outcome.
pub fn status_text(outcome: &Outcome, duration: Duration, verbose: bool) -> String {
    match outcome {
        Outcome::Passed => {
            if verbose {
                format!("\x1b[32mPASSED\x1b[0m ({}ms)", duration.as_millis())
            } else {
                "\x1b[32mPASSED\x1b[0m".to_string()
            }
        }
        Outcome::Failed(_) => {
            if verbose {
                format!("\x1b[31mFAILED\x1b[0m ({}ms)", duration.as_millis())
            } else {
                "\x1b[31mFAILED\x1b[0m".to_string()
            }
        }
        Outcome::Skipped(reason) => {
            if reason.is_empty() {
                "\x1b[33mSKIPPED\x1b[0m".to_string()
            } else {
                format!("\x1b[33mSKIPPED\x1b[0m ({})", reason)
            }
        }
    }
}

/// Plain summary line, e.g. `2 passed, 1 failed in 0.12s`.
pub fn summary_text(summary: &Summary) -> String {
    let mut parts = Vec::new();
    if summary.passed > 0 {
        parts.push(format!("{} passed", summary.passed));
    }
    if summary.failed > 0 {
        parts.push(format!("{} failed", summary.failed));
    }
    if summary.skipped > 0 {
        parts.push(format!("{} skipped", summary.skipped));
    }
    if parts.is_empty() {
        parts.push("no tests ran".to_string());
    }
    format!("{} in {:.2}s", parts.join(", "), summary.duration.as_secs_f64())
}

impl TestReporter for ConsoleReporter {
    fn on_group_start(&mut self, name: &str, depth: usize) {
        println!("{}\x1b[1m{}\x1b[0m", indent(depth), name);
    }

    fn on_test_complete(&mut self, name: &str, depth: usize, outcome: &Outcome, duration: Duration) {
        println!("{}{} {}", indent(depth), name, status_text(outcome, duration, self.verbose));

        if let Outcome::Failed(failure) = outcome {
            if self.verbose {
                for line in failure.to_string().lines() {
                    println!("{}    {}", indent(depth), line);
                }
            }
            self.failures.push((name.to_string(), failure.to_string()));
        }
    }

    fn on_run_complete(&mut self, summary: &Summary) {
        if !self.failures.is_empty() && !self.verbose {
            println!();
            println!("\x1b[1;31m=================== FAILURES ===================\x1b[0m");
            for (name, message) in &self.failures {
                println!();
                println!("\x1b[1m___________ {} ___________\x1b[0m", name);
                println!();
                for line in message.lines() {
                    println!("    {}", line);
                }
            }
        }

        println!();
        let color = if summary.failed > 0 { "\x1b[1;31m" } else { "\x1b[1;32m" };
        println!("{}=================== {} ===================\x1b[0m", color, summary_text(summary));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::CaseFailure;

    #[test]
    fn test_summary_text() {
        let summary = Summary {
            total: 4,
            passed: 2,
            failed: 1,
            skipped: 1,
            duration: Duration::from_millis(1500),
        };
        assert_eq!(summary_text(&summary), "2 passed, 1 failed, 1 skipped in 1.50s");
        assert_eq!(summary_text(&Summary::default()), "no tests ran in 0.00s");
    }

    #[test]
    fn test_status_text() {
        assert!(status_text(&Outcome::Passed, Duration::ZERO, false).contains("PASSED"));
        assert!(
            status_text(&Outcome::Failed(CaseFailure::MissingTestCases), Duration::from_millis(5), true)
                .contains("FAILED\x1b[0m (5ms)")
        );
        assert!(status_text(&Outcome::Skipped("entry point not found".into()), Duration::ZERO, false)
            .contains("(entry point not found)"));
    }

    #[test]
    fn test_failures_are_collected() {
        let mut reporter = ConsoleReporter::new(false);
        reporter.on_test_complete("X - 1", 0, &Outcome::Passed, Duration::ZERO);
        reporter.on_test_complete("X - 2", 0, &Outcome::Failed(CaseFailure::MissingTestCases), Duration::ZERO);
        assert_eq!(reporter.failures, vec![("X - 2".to_string(), "no test cases found".to_string())]);
    }
}
