//! Per-configuration persisted state: `build-data.json` (file hashes) and
//! `dependency-graph.json` (include graph), `spec.md` §4.7/§6.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::hash::ContentHash;

const BUILD_DATA_FILE_NAME: &str = "build-data.json";
const DEPENDENCY_GRAPH_FILE_NAME: &str = "dependency-graph.json";

/// Mapping from a project-relative path to its last-recorded content hash.
pub type HashMapData = BTreeMap<PathBuf, ContentHash>;

#[derive(Debug, Serialize, Deserialize)]
struct HashEntry {
    path: String,
    hash: ContentHash,
}

/// Reads and writes the two metadata files under
/// `{project_root}/{build_dir}/{configuration_name}/`.
pub struct MetadataStore<'a> {
    project_root: &'a Path,
    build_dir: &'a str,
}

impl<'a> MetadataStore<'a> {
    pub fn new(project_root: &'a Path, build_dir: &'a str) -> Self {
        MetadataStore { project_root, build_dir }
    }

    pub fn config_dir(&self, configuration_name: &str) -> PathBuf {
        self.project_root.join(self.build_dir).join(configuration_name)
    }

    fn build_data_path(&self, configuration_name: &str) -> PathBuf {
        self.config_dir(configuration_name).join(BUILD_DATA_FILE_NAME)
    }

    fn dependency_graph_path(&self, configuration_name: &str) -> PathBuf {
        self.config_dir(configuration_name).join(DEPENDENCY_GRAPH_FILE_NAME)
    }

    /// Returns an empty map if the file does not exist or cannot be parsed.
    pub fn load_hashes(&self, configuration_name: &str) -> HashMapData {
        let path = self.build_data_path(configuration_name);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return BTreeMap::new(),
        };

        let entries: Vec<HashEntry> = match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("failed to parse {}: {err}; treating as empty", path.display());
                return BTreeMap::new();
            }
        };

        entries.into_iter().map(|entry| (PathBuf::from(entry.path), entry.hash)).collect()
    }

    /// Returns an empty graph if the file does not exist or cannot be parsed.
    pub fn load_graph(&self, configuration_name: &str) -> Graph<String> {
        let path = self.dependency_graph_path(configuration_name);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Graph::new(),
        };

        let raw: BTreeMap<String, Vec<String>> = match serde_json::from_str(&contents) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("failed to parse {}: {err}; treating as empty", path.display());
                return Graph::new();
            }
        };

        let mut graph = Graph::new();
        for (included, includers) in raw {
            graph.add_node(included.clone());
            for includer in includers {
                graph.add_edge(included.clone(), includer);
            }
        }
        graph
    }

    /// Creates the configuration directory and overwrites the hash file.
    pub fn store_hashes(&self, configuration_name: &str, hashes: &HashMapData) -> std::io::Result<()> {
        fs::create_dir_all(self.config_dir(configuration_name))?;

        let mut entries: Vec<HashEntry> = hashes
            .iter()
            .map(|(path, hash)| HashEntry { path: to_forward_slash(path), hash: *hash })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        let json = serde_json::to_string(&entries).expect("HashEntry serialization cannot fail");
        fs::write(self.build_data_path(configuration_name), json)
    }

    /// Creates the configuration directory and overwrites the graph file,
    /// or deletes it, if `graph` is empty, rather than writing an empty
    /// JSON value.
    pub fn store_graph(&self, configuration_name: &str, graph: &Graph<String>) -> std::io::Result<()> {
        fs::create_dir_all(self.config_dir(configuration_name))?;
        let path = self.dependency_graph_path(configuration_name);

        if graph.is_empty() {
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err),
            }
        } else {
            let mut raw: BTreeMap<&String, Vec<&String>> = BTreeMap::new();
            for (node, neighbors) in graph.iter() {
                raw.insert(node, neighbors.iter().collect());
            }
            let json = serde_json::to_string(&raw).expect("graph serialization cannot fail");
            fs::write(path, json)
        }
    }
}

/// Normalizes a path to forward-slash form regardless of host OS, per
/// `spec.md` §9's generic-graph design note.
pub fn to_forward_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::new(dir.path(), "easy-make-build");

        let mut hashes: HashMapData = BTreeMap::new();
        hashes.insert(PathBuf::from("main.cpp"), 42);
        hashes.insert(PathBuf::from("a.hpp"), 7);

        store.store_hashes("debug", &hashes).unwrap();
        assert_eq!(store.load_hashes("debug"), hashes);
    }

    #[test]
    fn missing_hash_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::new(dir.path(), "easy-make-build");
        assert!(store.load_hashes("debug").is_empty());
    }

    #[test]
    fn non_empty_graph_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::new(dir.path(), "easy-make-build");

        let mut graph: Graph<String> = Graph::new();
        graph.add_edge("a.hpp".to_string(), "main.cpp".to_string());
        graph.add_edge("a.hpp".to_string(), "b.cpp".to_string());

        store.store_graph("debug", &graph).unwrap();
        let loaded = store.load_graph("debug");
        assert_eq!(loaded.neighbors(&"a.hpp".to_string()).unwrap().len(), 2);
    }

    #[test]
    fn empty_graph_deletes_the_file_instead_of_writing_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::new(dir.path(), "easy-make-build");

        let mut graph: Graph<String> = Graph::new();
        graph.add_edge("a.hpp".to_string(), "main.cpp".to_string());
        store.store_graph("debug", &graph).unwrap();
        assert!(store.dependency_graph_path("debug").exists());

        store.store_graph("debug", &Graph::new()).unwrap();
        assert!(!store.dependency_graph_path("debug").exists());
    }

    #[test]
    fn missing_graph_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::new(dir.path(), "easy-make-build");
        assert!(store.load_graph("debug").is_empty());
    }
}
