//! Computing the minimal recompile set from old/new hashes and dependency
//! graphs (`spec.md` §4.8, the heart of the system).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::file_set::is_source;
use crate::graph::Graph;
use crate::metadata::{to_forward_slash, HashMapData};

/// The relative path with directory separators replaced by `-`, suffixed
/// with `.o`. `source/utils/hash.cpp` -> `source-utils-hash.cpp.o`.
pub fn object_name_for(path: &Path) -> String {
    format!("{}.o", to_forward_slash(path).replace('/', "-"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub files_to_delete: Vec<PathBuf>,
    pub files_to_compile: Vec<PathBuf>,
}

/// Computes `(files_to_delete, files_to_compile)` per the five-step
/// algorithm in `spec.md` §4.8.
pub fn analyze(
    old_hashes: &HashMapData,
    new_hashes: &HashMapData,
    old_graph: &Graph<String>,
    new_graph: &Graph<String>,
    object_dir: &Path,
) -> ChangeSet {
    let files_to_delete: Vec<PathBuf> =
        old_hashes.keys().filter(|p| !new_hashes.contains_key(*p)).cloned().collect();

    let mut changed: BTreeSet<PathBuf> = BTreeSet::new();
    for (path, new_hash) in new_hashes {
        let object_missing = is_source(path) && !object_dir.join(object_name_for(path)).is_file();
        let hash_changed = old_hashes.get(path).map(|old_hash| old_hash != new_hash).unwrap_or(false);

        if object_missing || hash_changed {
            changed.insert(path.clone());
        }
    }

    let mut affected: BTreeSet<String> = BTreeSet::new();

    for (node, dependents) in old_graph.iter() {
        if !new_graph.contains_node(node) {
            affected.extend(dependents.iter().cloned());
        }
    }

    let changed_as_strings: Vec<String> = changed.iter().map(|p| to_forward_slash(p)).collect();
    let reachable = new_graph.reachable_from(changed_as_strings);
    affected.extend(reachable);

    let files_to_compile: Vec<PathBuf> = affected
        .into_iter()
        .map(PathBuf::from)
        .filter(|p| is_source(p))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    ChangeSet { files_to_delete, files_to_compile }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::ContentHash;

    fn hashes(pairs: &[(&str, ContentHash)]) -> HashMapData {
        pairs.iter().map(|(p, h)| (PathBuf::from(p), *h)).collect()
    }

    #[test]
    fn object_name_replaces_separators_and_appends_o() {
        assert_eq!(object_name_for(Path::new("source/utils/hash.cpp")), "source-utils-hash.cpp.o");
    }

    #[test]
    fn removed_files_are_those_in_old_but_not_new() {
        let old = hashes(&[("a.cpp", 1), ("b.cpp", 2)]);
        let new = hashes(&[("a.cpp", 1)]);
        let dir = tempfile::tempdir().unwrap();
        let changes = analyze(&old, &new, &Graph::new(), &Graph::new(), dir.path());
        assert_eq!(changes.files_to_delete, vec![PathBuf::from("b.cpp")]);
    }

    #[test]
    fn a_source_with_no_object_file_is_recompiled_even_if_hash_matches() {
        let old = hashes(&[("main.cpp", 1)]);
        let new = hashes(&[("main.cpp", 1)]);
        let dir = tempfile::tempdir().unwrap();
        let changes = analyze(&old, &new, &Graph::new(), &Graph::new(), dir.path());
        assert_eq!(changes.files_to_compile, vec![PathBuf::from("main.cpp")]);
    }

    #[test]
    fn a_source_with_existing_object_and_matching_hash_is_not_recompiled() {
        let old = hashes(&[("main.cpp", 1)]);
        let new = hashes(&[("main.cpp", 1)]);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(object_name_for(Path::new("main.cpp"))), "").unwrap();
        let changes = analyze(&old, &new, &Graph::new(), &Graph::new(), dir.path());
        assert!(changes.files_to_compile.is_empty());
    }

    #[test]
    fn a_changed_hash_forces_recompilation() {
        let old = hashes(&[("main.cpp", 1)]);
        let new = hashes(&[("main.cpp", 2)]);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(object_name_for(Path::new("main.cpp"))), "").unwrap();
        let changes = analyze(&old, &new, &Graph::new(), &Graph::new(), dir.path());
        assert_eq!(changes.files_to_compile, vec![PathBuf::from("main.cpp")]);
    }

    #[test]
    fn header_change_fans_out_to_every_includer_via_forward_reachability() {
        let old = hashes(&[("a.hpp", 1), ("main.cpp", 10), ("b.cpp", 20), ("c.cpp", 30)]);
        let new = hashes(&[("a.hpp", 2), ("main.cpp", 10), ("b.cpp", 20), ("c.cpp", 30)]);

        let mut graph: Graph<String> = Graph::new();
        graph.add_edge("a.hpp".to_string(), "main.cpp".to_string());
        graph.add_edge("a.hpp".to_string(), "b.cpp".to_string());
        graph.add_node("c.cpp".to_string());

        let dir = tempfile::tempdir().unwrap();
        for path in ["main.cpp", "b.cpp", "c.cpp"] {
            std::fs::write(dir.path().join(object_name_for(Path::new(path))), "").unwrap();
        }

        let changes = analyze(&old, &new, &graph, &graph, dir.path());
        assert_eq!(changes.files_to_compile, vec![PathBuf::from("b.cpp"), PathBuf::from("main.cpp")]);
    }

    #[test]
    fn a_header_disappearing_from_the_graph_pulls_in_its_old_dependents() {
        let old = hashes(&[("a.hpp", 1), ("main.cpp", 10)]);
        let new = hashes(&[("main.cpp", 10)]);

        let mut old_graph: Graph<String> = Graph::new();
        old_graph.add_edge("a.hpp".to_string(), "main.cpp".to_string());
        let new_graph: Graph<String> = Graph::new();

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(object_name_for(Path::new("main.cpp"))), "").unwrap();

        let changes = analyze(&old, &new, &old_graph, &new_graph, dir.path());
        assert_eq!(changes.files_to_compile, vec![PathBuf::from("main.cpp")]);
    }

    #[test]
    fn headers_are_never_in_files_to_compile() {
        let old = HashMapData::new();
        let new = hashes(&[("a.hpp", 1)]);
        let dir = tempfile::tempdir().unwrap();
        let changes = analyze(&old, &new, &Graph::new(), &Graph::new(), dir.path());
        assert!(changes.files_to_compile.is_empty());
    }
}
