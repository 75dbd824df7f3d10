//! Resolving a raw `#include` string against the including file's directory
//! and a list of include roots (`spec.md` §4.4).

use std::path::{Component, Path, PathBuf};

/// Tries `including_file`'s directory first, then each of `include_roots` in
/// order. A candidate is resolved if `root / raw_include` exists as a
/// regular file under `project_root`. Returns a lexically normalized path
/// relative to `project_root`, or `None` if nothing matched (typical for
/// system or vendored headers that aren't part of the tracked graph).
pub fn resolve(
    raw_include: &str,
    including_file: &Path,
    project_root: &Path,
    include_roots: &[PathBuf],
) -> Option<PathBuf> {
    let including_dir = including_file.parent().unwrap_or_else(|| Path::new(""));

    let mut candidate_dirs: Vec<PathBuf> = Vec::with_capacity(1 + include_roots.len());
    candidate_dirs.push(including_dir.to_path_buf());
    candidate_dirs.extend(include_roots.iter().cloned());

    for dir in candidate_dirs {
        let candidate = project_root.join(&dir).join(raw_include);
        if candidate.is_file() {
            let normalized = normalize_lexically(&dir.join(raw_include));
            return Some(normalized);
        }
    }

    None
}

/// Collapses `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(out.components().next_back(), None | Some(Component::ParentDir)) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
