//! Filtering of tool-generated filesystem churn.

use std::path::{Component, Path};

/// Directory names whose contents never trigger a reload.
const IGNORED_DIRS: &[&str] = &["node_modules", "__pycache__"];

/// Whether a change at `path` should be ignored.
///
/// Paths outside `root`, hidden entries (any component starting with `.`)
/// and anything inside [`IGNORED_DIRS`] are ignored.
pub(crate) fn is_ignored(path: &Path, root: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return true;
    };

    relative.components().any(|component| match component {
        Component::Normal(name) => {
            let name = name.to_string_lossy();
            name.starts_with('.') || IGNORED_DIRS.contains(&name.as_ref())
        }
        _ => false,
    })
}
