//! Case-sets: all the cases of one target.
//!
//! A case-set is rooted at the fixture directory of one target, `<root>/<namespace...>/<Target>/`. The
//! target's qualified name is derived from the path below the root, resolved to an entry point, and
//! every `expected-<n>.txt` in the directory becomes one test, ordered by `n`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use blackbox_core::names::{path_to_label, qualified_name};
use blackbox_core::parse_case_number;

use super::case::{CaseNumber, CaseRunner};
use super::config::HarnessConfig;
use super::entry::EntryPointResolver;
use super::error::{CaseFailure, HarnessError};
use super::tree::{DynamicTest, Member, TestNode};

/// The ordered tests of one target.
#[derive(Debug)]
pub struct CaseSet {
    target: String,
    dir: PathBuf,
    tests: Vec<DynamicTest>,
}

impl CaseSet {
    /// Build the case-set for the target whose fixtures live in `dir`.
    ///
    /// ## Errors
    ///
    /// Returns [`HarnessError::OutsideRoot`] when `dir` is not nested under `root`. Every other problem
    /// (a directory name that is not a target name, an unresolvable target, an unlistable directory,
    /// unreadable fixtures) is represented as a test.
    pub fn new(
        root: &Path,
        dir: &Path,
        resolver: &dyn EntryPointResolver,
        config: HarnessConfig,
    ) -> Result<Self, HarnessError> {
        let outside = || HarnessError::OutsideRoot {
            root: root.to_path_buf(),
            target: dir.to_path_buf(),
        };
        let relative = dir.strip_prefix(root).map_err(|_| outside())?;
        let Some(target) = qualified_name(relative) else {
            let target = path_to_label(relative);
            tracing::warn!("{} is not a valid target name", dir.display());
            let test = DynamicTest::fail(
                format!("{} [invalid target name]", target),
                CaseFailure::InvalidTargetName(dir.to_path_buf()),
            );
            return Ok(Self {
                target,
                dir: dir.to_path_buf(),
                tests: vec![test],
            });
        };

        let Some(entry) = resolver.resolve(&target) else {
            tracing::debug!("no entry point for {}", target);
            let test = DynamicTest::skip(format!("{} [missing entry point]", target), "entry point not found");
            return Ok(Self {
                target,
                dir: dir.to_path_buf(),
                tests: vec![test],
            });
        };

        // `None` sorts before every case number, so a listing failure is reported first.
        let mut tests: BTreeMap<Option<CaseNumber>, DynamicTest> = BTreeMap::new();
        let listing = fs::read_dir(dir).and_then(|entries| {
            for entry_result in entries {
                let file_name = entry_result?.file_name();
                let Some(number) = file_name.to_str().and_then(parse_case_number).map(CaseNumber::from) else {
                    continue;
                };
                let test = match CaseRunner::load(dir, target.as_str(), number) {
                    Ok(runner) => DynamicTest::case(runner, entry.clone(), config),
                    Err(failure) => {
                        DynamicTest::fail(format!("{} - {} [problem reading testcase]", target, number), failure)
                    }
                };
                tests.insert(Some(number), test);
            }
            Ok(())
        });
        if let Err(e) = listing {
            tracing::warn!("cannot list tests of {} in {}: {}", target, dir.display(), e);
            let failure = CaseFailure::MissingTestsDir {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            };
            tests.insert(None, DynamicTest::fail(format!("{} [missing tests dir]", target), failure));
        }

        tracing::debug!("{}: {} test(s) from {}", target, tests.len(), dir.display());
        Ok(Self {
            target,
            dir: dir.to_path_buf(),
            tests: tests.into_values().collect(),
        })
    }

    /// Qualified name of the target, e.g. `clients.first.Summer`.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tests(&self) -> &[DynamicTest] {
        &self.tests
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Leaf name of the fixture directory, used as the group name.
    pub fn leaf_name(&self) -> String {
        self.dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.target.clone())
    }

    /// The ordered tests as standalone nodes.
    pub fn into_tests(self) -> Vec<TestNode> {
        self.tests.into_iter().map(TestNode::Test).collect()
    }

    /// The tests wrapped in one container named after the fixture directory.
    pub fn into_group(self) -> TestNode {
        let name = self.leaf_name();
        TestNode::container(name, self.into_tests())
    }

    pub(crate) fn into_member(self) -> Member {
        Member {
            name: self.leaf_name(),
            tests: self.into_tests(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::harness::entry::Registry;
    use crate::harness::outcome::Outcome;
    use std::io::Write;
    use tempfile::TempDir;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register_fn("pkg.Echo", |args, _stdin, stdout| {
            writeln!(stdout, "{}", args.join(" "))?;
            Ok(())
        });
        registry
    }

    fn names(set: &CaseSet) -> Vec<&str> {
        set.tests().iter().map(DynamicTest::name).collect()
    }

    #[test]
    fn test_cases_are_ordered_numerically() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("pkg").join("Echo");
        fs::create_dir_all(&dir).unwrap();
        for n in [10, 2, 1] {
            fs::write(dir.join(format!("expected-{n}.txt")), "").unwrap();
        }
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let set = CaseSet::new(root.path(), &dir, &registry(), HarnessConfig::default()).unwrap();
        assert_eq!(set.target(), "pkg.Echo");
        assert_eq!(names(&set), ["pkg.Echo - 1", "pkg.Echo - 2", "pkg.Echo - 10"]);
        assert_eq!(set.leaf_name(), "Echo");
    }

    #[test]
    fn test_missing_entry_point_is_single_skip() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("pkg").join("Nope");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("expected-1.txt"), "x").unwrap();

        let set = CaseSet::new(root.path(), &dir, &registry(), HarnessConfig::default()).unwrap();
        assert_eq!(names(&set), ["pkg.Nope [missing entry point]"]);
        assert!(set.tests()[0].run().is_skipped());
    }

    #[test]
    fn test_directory_without_cases_yields_no_tests() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("pkg").join("Echo");
        fs::create_dir_all(&dir).unwrap();

        let set = CaseSet::new(root.path(), &dir, &registry(), HarnessConfig::default()).unwrap();
        assert!(set.is_empty());
        assert!(set.into_tests().is_empty());
    }

    #[test]
    fn test_missing_directory_is_single_failure() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("pkg").join("Echo");

        let set = CaseSet::new(root.path(), &dir, &registry(), HarnessConfig::default()).unwrap();
        assert_eq!(names(&set), ["pkg.Echo [missing tests dir]"]);
        assert!(matches!(
            set.tests()[0].run(),
            Outcome::Failed(CaseFailure::MissingTestsDir { .. })
        ));
    }

    #[test]
    fn test_unreadable_case_becomes_failed_placeholder() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("pkg").join("Echo");
        fs::create_dir_all(dir.join("expected-2.txt")).unwrap();
        fs::write(dir.join("args-1.txt"), "hi\n").unwrap();
        fs::write(dir.join("expected-1.txt"), "hi\n").unwrap();

        let set = CaseSet::new(root.path(), &dir, &registry(), HarnessConfig::default()).unwrap();
        assert_eq!(names(&set), ["pkg.Echo - 1", "pkg.Echo - 2 [problem reading testcase]"]);
        assert_eq!(set.tests()[0].run(), Outcome::Passed);
        assert!(matches!(
            set.tests()[1].run(),
            Outcome::Failed(CaseFailure::FixtureRead { .. })
        ));
    }

    #[test]
    fn test_target_outside_root_is_rejected() {
        let root = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let err = CaseSet::new(root.path(), other.path(), &registry(), HarnessConfig::default()).unwrap_err();
        assert!(matches!(err, HarnessError::OutsideRoot { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_directory_is_single_failure() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = TempDir::new().unwrap();
        let dir = root.path().join("pkg").join(OsStr::from_bytes(b"Bad\xff"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("expected-1.txt"), "").unwrap();

        let set = CaseSet::new(root.path(), &dir, &registry(), HarnessConfig::default()).unwrap();
        assert_eq!(names(&set), ["pkg.Bad\u{FFFD} [invalid target name]"]);
        assert!(matches!(
            set.tests()[0].run(),
            Outcome::Failed(CaseFailure::InvalidTargetName(ref path)) if path == &dir
        ));
    }

    #[test]
    fn test_into_group_uses_leaf_name() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("pkg").join("Echo");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("expected-1.txt"), "").unwrap();

        let set = CaseSet::new(root.path(), &dir, &registry(), HarnessConfig::default()).unwrap();
        let group = set.into_group();
        assert_eq!(group.name(), "Echo");
        assert_eq!(group.test_count(), 1);
    }
}
