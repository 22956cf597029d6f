//! Mapping between namespace-qualified target names and fixture directories.
//!
//! A target `clients.first.Summer` keeps its fixtures in `<root>/clients/first/Summer/`. Scopes passed to
//! discovery use the same dotted form, with the empty string meaning "the whole root".

use std::path::{Component, Path, PathBuf};

/// Separator between namespace segments in qualified names.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Derive the qualified name of the target whose fixture directory is `relative`.
///
/// ## Returns
/// - `Some(name)` when every component of `relative` is a normal, UTF-8 path segment.
/// - `None` for paths containing `..`, roots, prefixes or non-UTF-8 segments.
pub fn qualified_name(relative: &Path) -> Option<String> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(segments.join(&NAMESPACE_SEPARATOR.to_string()))
}

/// Turn a dotted scope (`clients.first`) into a relative directory path (`clients/first`).
///
/// Empty segments are skipped, so `""` yields an empty path and `"a..b"` is treated as `"a.b"`.
pub fn scope_to_path(scope: &str) -> PathBuf {
    scope
        .split(NAMESPACE_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Render a relative directory path as a dotted group label.
pub fn path_to_label(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(&NAMESPACE_SEPARATOR.to_string())
}
