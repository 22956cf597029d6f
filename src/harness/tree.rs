//! The discovered test tree and its shaping rules.
//!
//! Discovery produces a forest of [`TestNode`]s: named containers holding lazily-executed
//! [`DynamicTest`] leaves. Nothing runs until [`run_tree`] (or [`TestNode::run`]) walks the forest,
//! strictly one test at a time.
//!
//! [`collapse`] is the output-shaping pass applied by the discoverer. It is kept separate from the
//! filesystem walk so the rules can be exercised on plain nodes.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::case::CaseRunner;
use super::config::HarnessConfig;
use super::entry::EntryPoint;
use super::error::CaseFailure;
use super::outcome::{Outcome, OutcomeNode, Summary};
use super::report::TestReporter;

/// Label used for the group of case-sets sitting directly in the scanned scope.
pub const ROOT_GROUP_LABEL: &str = "[pkg]";

/// What a test does when it runs.
pub enum TestBody {
    /// Execute a loaded case against its entry point.
    Case {
        runner: CaseRunner,
        entry: Arc<dyn EntryPoint>,
        config: HarnessConfig,
    },
    /// Report a skip without running anything.
    Skip(String),
    /// Report a failure found before execution (unreadable fixtures, missing directories).
    Fail(CaseFailure),
}

impl fmt::Debug for TestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestBody::Case { runner, config, .. } => f
                .debug_struct("Case")
                .field("runner", runner)
                .field("config", config)
                .finish_non_exhaustive(),
            TestBody::Skip(reason) => f.debug_tuple("Skip").field(reason).finish(),
            TestBody::Fail(failure) => f.debug_tuple("Fail").field(failure).finish(),
        }
    }
}

/// A named, not yet executed test.
#[derive(Debug)]
pub struct DynamicTest {
    name: String,
    body: TestBody,
}

impl DynamicTest {
    pub fn case(runner: CaseRunner, entry: Arc<dyn EntryPoint>, config: HarnessConfig) -> Self {
        Self {
            name: runner.name(),
            body: TestBody::Case { runner, entry, config },
        }
    }

    pub fn skip(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: TestBody::Skip(reason.into()),
        }
    }

    pub fn fail(name: impl Into<String>, failure: CaseFailure) -> Self {
        Self {
            name: name.into(),
            body: TestBody::Fail(failure),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &TestBody {
        &self.body
    }

    /// Execute the test and return its outcome.
    pub fn run(&self) -> Outcome {
        match &self.body {
            TestBody::Case { runner, entry, config } => runner.execute(Arc::clone(entry), config),
            TestBody::Skip(reason) => Outcome::Skipped(reason.clone()),
            TestBody::Fail(failure) => Outcome::Failed(failure.clone()),
        }
    }
}

/// Node of the discovered tree.
#[derive(Debug)]
pub enum TestNode {
    Test(DynamicTest),
    Container { name: String, children: Vec<TestNode> },
}

impl TestNode {
    pub fn container(name: impl Into<String>, children: Vec<TestNode>) -> Self {
        TestNode::Container {
            name: name.into(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TestNode::Test(test) => test.name(),
            TestNode::Container { name, .. } => name,
        }
    }

    /// Number of test leaves below this node.
    pub fn test_count(&self) -> usize {
        match self {
            TestNode::Test(_) => 1,
            TestNode::Container { children, .. } => children.iter().map(TestNode::test_count).sum(),
        }
    }

    /// Run every test below this node, depth-first and in order.
    pub fn run(&self, reporter: &mut dyn TestReporter) -> OutcomeNode {
        self.run_at(reporter, 0)
    }

    fn run_at(&self, reporter: &mut dyn TestReporter, depth: usize) -> OutcomeNode {
        match self {
            TestNode::Test(test) => {
                reporter.on_test_start(test.name(), depth);
                let start = Instant::now();
                let outcome = test.run();
                let duration = start.elapsed();
                reporter.on_test_complete(test.name(), depth, &outcome, duration);
                OutcomeNode::Test {
                    name: test.name().to_string(),
                    outcome,
                    duration,
                }
            }
            TestNode::Container { name, children } => {
                reporter.on_group_start(name, depth);
                let children = children.iter().map(|child| child.run_at(reporter, depth + 1)).collect();
                reporter.on_group_end(name, depth);
                OutcomeNode::Group {
                    name: name.clone(),
                    children,
                }
            }
        }
    }

    /// Indented outline of the tree (names only), one node per line.
    pub fn outline(nodes: &[TestNode]) -> String {
        let mut out = String::new();
        for node in nodes {
            node.write_outline(&mut out, 0);
        }
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        match self {
            TestNode::Test(test) => {
                out.push_str(test.name());
                out.push('\n');
            }
            TestNode::Container { name, children } => {
                out.push_str(name);
                out.push_str("/\n");
                for child in children {
                    child.write_outline(out, depth + 1);
                }
            }
        }
    }
}

/// Run a whole discovered forest and report the final summary.
pub fn run_tree(nodes: &[TestNode], reporter: &mut dyn TestReporter) -> Vec<OutcomeNode> {
    let outcomes: Vec<OutcomeNode> = nodes.iter().map(|node| node.run(reporter)).collect();
    let mut summary = Summary::default();
    for outcome in &outcomes {
        summary.merge(outcome.summary());
    }
    reporter.on_run_complete(&summary);
    outcomes
}

/// One case-set ready for shaping: its display name and its tests.
#[derive(Debug)]
pub struct Member {
    pub name: String,
    pub tests: Vec<TestNode>,
}

impl Member {
    fn wrap(self) -> TestNode {
        TestNode::container(self.name, self.tests)
    }
}

/// Shape grouped case-sets into the final forest.
///
/// `groups` is ordered by key; an empty key is rendered as [`ROOT_GROUP_LABEL`].
///
/// - no groups: empty forest (the caller decides on a placeholder);
/// - one group with one member: that member's tests, unwrapped;
/// - one group with several members: one container per member;
/// - several groups: one container per group, each holding one container per member.
pub fn collapse(mut groups: Vec<(String, Vec<Member>)>) -> Vec<TestNode> {
    match groups.len() {
        0 => Vec::new(),
        1 => {
            let (_, mut members) = groups.remove(0);
            if members.len() == 1 {
                members.remove(0).tests
            } else {
                members.into_iter().map(Member::wrap).collect()
            }
        }
        _ => groups
            .into_iter()
            .map(|(key, members)| {
                let label = if key.is_empty() { ROOT_GROUP_LABEL.to_string() } else { key };
                TestNode::container(label, members.into_iter().map(Member::wrap).collect())
            })
            .collect(),
    }
}
