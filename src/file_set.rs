//! Materializing a configuration's tracked file set (`spec.md` §4.5).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::ResolvedConfiguration;

/// One of the two code-file classifications tracked by the build core.
/// Any other extension is non-code and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Source,
    Header,
}

const SOURCE_EXTENSIONS: &[&str] = &["cpp", "cc", "cxx"];
const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx"];

/// Classifies `path` by extension, or `None` for a non-code file.
pub fn classify(path: &Path) -> Option<FileKind> {
    let ext = path.extension()?.to_str()?;
    if SOURCE_EXTENSIONS.contains(&ext) {
        Some(FileKind::Source)
    } else if HEADER_EXTENSIONS.contains(&ext) {
        Some(FileKind::Header)
    } else {
        None
    }
}

pub fn is_source(path: &Path) -> bool {
    classify(path) == Some(FileKind::Source)
}

/// Resolves the full set of tracked files for `configuration`, relative to
/// `project_root`: `source_files` plus everything recursively walked from
/// `source_directories`, minus `excluded_files`, minus everything
/// recursively walked from `excluded_directories`. Exclusions are applied
/// last, after both additions, so they remove entries regardless of how
/// they were added. The result is sorted lexicographically.
pub fn resolve(configuration: &ResolvedConfiguration, project_root: &Path) -> Vec<PathBuf> {
    let mut files: BTreeSet<PathBuf> = BTreeSet::new();

    for entry in &configuration.source_files {
        let full = project_root.join(entry);
        if full.is_file() {
            files.insert(entry.clone());
        }
    }

    for dir in &configuration.source_directories {
        for path in walk_code_files(project_root, dir) {
            files.insert(path);
        }
    }

    for entry in &configuration.excluded_files {
        files.remove(entry);
    }

    for dir in &configuration.excluded_directories {
        for path in walk_code_files(project_root, dir) {
            files.remove(&path);
        }
    }

    files.into_iter().collect()
}

fn walk_code_files(project_root: &Path, relative_dir: &Path) -> Vec<PathBuf> {
    let root = project_root.join(relative_dir);
    let mut found = Vec::new();

    for entry in WalkDir::new(&root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        if classify(entry.path()).is_none() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(project_root) {
            found.push(relative.to_path_buf());
        }
    }

    found
}
