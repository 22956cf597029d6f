//! Outcomes of executed tests.
//!
//! [`OutcomeNode`] mirrors the shape of the discovered [`TestNode`](super::tree::TestNode) tree: groups
//! keep their names and order, and every test leaf carries its [`Outcome`] and wall-clock duration.

use std::time::Duration;

use serde_json::{Value, json};

use super::error::CaseFailure;

/// PASS / FAIL / SKIP result of one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed(CaseFailure),
    Skipped(String),
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    /// Upper-case status label: `PASSED`, `FAILED` or `SKIPPED`.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASSED",
            Outcome::Failed(_) => "FAILED",
            Outcome::Skipped(_) => "SKIPPED",
        }
    }
}

/// Executed test tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeNode {
    Test {
        name: String,
        outcome: Outcome,
        duration: Duration,
    },
    Group {
        name: String,
        children: Vec<OutcomeNode>,
    },
}

impl OutcomeNode {
    pub fn name(&self) -> &str {
        match self {
            OutcomeNode::Test { name, .. } | OutcomeNode::Group { name, .. } => name,
        }
    }

    /// Count the outcomes of every test below (and including) this node.
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        self.accumulate(&mut summary);
        summary
    }

    fn accumulate(&self, summary: &mut Summary) {
        match self {
            OutcomeNode::Test { outcome, duration, .. } => summary.record(outcome, *duration),
            OutcomeNode::Group { children, .. } => {
                for child in children {
                    child.accumulate(summary);
                }
            }
        }
    }

    /// JSON rendering used by the `--format json` report.
    pub fn to_json(&self) -> Value {
        match self {
            OutcomeNode::Test {
                name,
                outcome,
                duration,
            } => {
                let mut value = json!({
                    "name": name,
                    "status": outcome.label(),
                    "duration_ms": duration.as_millis() as u64,
                });
                match outcome {
                    Outcome::Passed => {}
                    Outcome::Failed(failure) => {
                        value["kind"] = json!(failure.kind());
                        value["message"] = json!(failure.to_string());
                        if let CaseFailure::Mismatch { expected, actual } = failure {
                            value["expected"] = json!(expected);
                            value["actual"] = json!(actual);
                        }
                    }
                    Outcome::Skipped(reason) => {
                        value["reason"] = json!(reason);
                    }
                }
                value
            }
            OutcomeNode::Group { name, children } => json!({
                "name": name,
                "children": children.iter().map(OutcomeNode::to_json).collect::<Vec<_>>(),
            }),
        }
    }
}

/// Counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration: Duration,
}

impl Summary {
    pub fn record(&mut self, outcome: &Outcome, duration: Duration) {
        self.total += 1;
        self.duration += duration;
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::Skipped(_) => self.skipped += 1,
        }
    }

    pub fn merge(&mut self, other: Summary) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.duration += other.duration;
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}
