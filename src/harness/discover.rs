//! Recursive discovery of case-sets below a fixtures root.
//!
//! The fixtures root mirrors the namespace hierarchy of the targets. [`Discoverer::generate`] resolves a
//! dotted scope to a directory, walks it (following symbolic links), treats every directory containing
//! `expected-1.txt` as a case-set root, groups those roots by their parent directory relative to the
//! scope, and shapes the result with [`collapse`].

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use blackbox_core::fixtures::CASE_SET_MARKER;
use blackbox_core::names::{path_to_label, scope_to_path};
use walkdir::WalkDir;

use super::case_set::CaseSet;
use super::config::HarnessConfig;
use super::entry::EntryPointResolver;
use super::error::{CaseFailure, HarnessError};
use super::tree::{DynamicTest, Member, TestNode, collapse};

/// Builds test trees from one fixtures root.
pub struct Discoverer {
    root: PathBuf,
    resolver: Arc<dyn EntryPointResolver>,
    config: HarnessConfig,
}

impl Discoverer {
    /// Create a discoverer for `root`, using [`HarnessConfig::from_env`].
    ///
    /// ## Errors
    ///
    /// Returns [`HarnessError::InvalidRoot`] when `root` is not an existing directory.
    pub fn new(root: impl AsRef<Path>, resolver: Arc<dyn EntryPointResolver>) -> Result<Self, HarnessError> {
        let root = std::path::absolute(root.as_ref())?;
        if !root.is_dir() {
            return Err(HarnessError::InvalidRoot(root));
        }
        Ok(Self {
            root,
            resolver,
            config: HarnessConfig::from_env(),
        })
    }

    pub fn with_config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Generate the tests of every target below the root.
    pub fn generate_all(&self) -> Result<Vec<TestNode>, HarnessError> {
        self.generate("")
    }

    /// Generate the tests of the targets below `scope` (`""` for everything, `clients.first` for a
    /// namespace, `clients.first.Summer` for a single target).
    ///
    /// ## Errors
    ///
    /// Returns [`HarnessError::ScopeNotFound`] when the scope does not name a directory. Walk failures
    /// are reported as a single failing `"<scope> [missing tests dir]"` test instead.
    pub fn generate(&self, scope: &str) -> Result<Vec<TestNode>, HarnessError> {
        let scope_dir = self.root.join(scope_to_path(scope));
        if !scope_dir.is_dir() {
            return Err(HarnessError::ScopeNotFound {
                scope: scope.to_string(),
                path: scope_dir,
            });
        }

        let roots = match find_case_set_roots(&scope_dir) {
            Ok(roots) => roots,
            Err(e) => {
                tracing::warn!("walking {} failed: {}", scope_dir.display(), e);
                let failure = CaseFailure::MissingTestsDir {
                    path: scope_dir,
                    reason: e.to_string(),
                };
                return Ok(vec![TestNode::Test(DynamicTest::fail(
                    format!("{} [missing tests dir]", scope),
                    failure,
                ))]);
            }
        };
        tracing::debug!("found {} case-set root(s) below {}", roots.len(), scope_dir.display());

        let mut groups: BTreeMap<PathBuf, Vec<CaseSet>> = BTreeMap::new();
        for dir in roots {
            let key = group_key(&scope_dir, &dir);
            let set = CaseSet::new(&self.root, &dir, self.resolver.as_ref(), self.config)?;
            groups.entry(key).or_default().push(set);
        }

        if groups.is_empty() {
            return Ok(vec![TestNode::Test(DynamicTest::fail(
                format!("{} [missing test cases]", scope),
                CaseFailure::MissingTestCases,
            ))]);
        }

        let shaped: Vec<(String, Vec<Member>)> = groups
            .into_iter()
            .map(|(key, sets)| (group_label(&key), sets.into_iter().map(CaseSet::into_member).collect()))
            .collect();
        let forest = collapse(shaped);
        tracing::info!(
            "scope '{}': {} test(s)",
            scope,
            forest.iter().map(TestNode::test_count).sum::<usize>()
        );
        Ok(forest)
    }
}

/// Every directory below (and including) `scope_dir` that directly contains the case-set marker, in
/// file-name order.
fn find_case_set_roots(scope_dir: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut roots = Vec::new();
    for entry in WalkDir::new(scope_dir).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() && entry.path().join(CASE_SET_MARKER).exists() {
            roots.push(entry.into_path());
        }
    }
    Ok(roots)
}

/// Parent of `dir` relative to `scope_dir`; `..` when `dir` is the scope directory itself.
fn group_key(scope_dir: &Path, dir: &Path) -> PathBuf {
    dir.parent()
        .and_then(|parent| parent.strip_prefix(scope_dir).ok())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(Component::ParentDir.as_os_str()))
}

fn group_label(key: &Path) -> String {
    if key.components().any(|c| c == Component::ParentDir) {
        return "..".to_string();
    }
    path_to_label(key)
}
