//! The build orchestrator: ties FileSet, hashing, include scanning and
//! resolution, MetadataStore, ChangeAnalyzer, Compiler, and Linker together
//! into one configuration build (`spec.md` §2 data flow,
//! `original_source/source/commands/build/build.cpp`).

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use log::{debug, error, info, warn};

use crate::change_analyzer::{self, object_name_for};
use crate::compiler;
use crate::config::{Configuration, ConfigResolver, ConfigurationFilter, ResolvedConfiguration};
use crate::error::CoreError;
use crate::file_set;
use crate::graph::Graph;
use crate::hash::hash_file;
use crate::include_resolve;
use crate::include_scan;
use crate::linker;
use crate::metadata::{to_forward_slash, HashMapData, MetadataStore};
use crate::progress::ProgressUpdate;

pub const BUILD_DIRECTORY_NAME: &str = "easy-make-build";

/// The outcome of building one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub files_compiled: usize,
    pub compilation_failures: Vec<PathBuf>,
    pub linked: bool,
}

impl BuildResult {
    pub fn success(&self) -> bool {
        self.compilation_failures.is_empty() && self.linked
    }
}

/// Builds the header-include graph for `code_files`: an edge `included ->
/// includer` for every resolvable quoted include.
fn build_dependency_graph(
    project_root: &Path,
    code_files: &[PathBuf],
    include_directories: &[PathBuf],
) -> Graph<String> {
    let mut graph = Graph::new();

    for file in code_files {
        for raw_include in include_scan::scan(&project_root.join(file)) {
            if let Some(resolved) = include_resolve::resolve(&raw_include, file, project_root, include_directories) {
                graph.add_edge(to_forward_slash(&resolved), to_forward_slash(file));
            }
        }
    }

    graph
}

fn hash_all(project_root: &Path, files: &[PathBuf]) -> Result<HashMapData, CoreError> {
    let mut hashes = HashMapData::new();
    for file in files {
        let hash = hash_file(&project_root.join(file))?;
        hashes.insert(file.clone(), hash);
    }
    Ok(hashes)
}

/// Runs one full build of `configuration`, following the critical
/// persistence ordering from `spec.md` §4.8: metadata is written before any
/// object file is deleted or any compiler is invoked, so an interrupted
/// build can never silently reuse a stale object.
pub fn build_once(
    configuration: &ResolvedConfiguration,
    project_root: &Path,
    parallel: bool,
    progress: Option<&Sender<ProgressUpdate>>,
) -> Result<BuildResult, CoreError> {
    info!("building configuration '{}'", configuration.name);

    let code_files = file_set::resolve(configuration, project_root);
    debug!("resolved {} tracked file(s) for '{}'", code_files.len(), configuration.name);

    let store = MetadataStore::new(project_root, BUILD_DIRECTORY_NAME);
    let old_hashes = store.load_hashes(&configuration.name);
    let old_graph = store.load_graph(&configuration.name);

    let new_hashes = hash_all(project_root, &code_files)?;
    let new_graph = build_dependency_graph(project_root, &code_files, &configuration.include_directories);

    if let Some(cycle) = new_graph.find_cycle() {
        error!("circular header dependency in '{}': {cycle}", configuration.name);
        return Err(CoreError::Cycle { cycle });
    }

    let object_dir = store.config_dir(&configuration.name);
    let changes = change_analyzer::analyze(&old_hashes, &new_hashes, &old_graph, &new_graph, &object_dir);
    debug!(
        "'{}': {} file(s) to delete, {} file(s) to compile",
        configuration.name,
        changes.files_to_delete.len(),
        changes.files_to_compile.len()
    );

    // Metadata is persisted *before* compilation begins, reflecting the new
    // intended state, so an interrupted build recovers correctly next time.
    store.store_hashes(&configuration.name, &new_hashes)?;
    store.store_graph(&configuration.name, &new_graph)?;

    remove_objects(&object_dir, &changes.files_to_delete);
    remove_objects(&object_dir, &changes.files_to_compile);

    let failures = compiler::compile_all(
        configuration,
        project_root,
        &object_dir,
        &changes.files_to_compile,
        parallel,
        progress,
    );

    if !failures.is_empty() {
        error!("compilation failed for {} file(s) in '{}'", failures.len(), configuration.name);
        return Ok(BuildResult {
            files_compiled: changes.files_to_compile.len(),
            compilation_failures: failures,
            linked: false,
        });
    }

    let linked = linker::link(configuration, &object_dir)?;
    if !linked {
        error!("linking failed for '{}'", configuration.name);
    }

    Ok(BuildResult { files_compiled: changes.files_to_compile.len(), compilation_failures: Vec::new(), linked })
}

/// Deletes `{object_dir}/{object_name_for(path)}` for each of `paths`,
/// warning (not failing) if a removal is refused.
fn remove_objects(object_dir: &Path, paths: &[PathBuf]) {
    if !object_dir.is_dir() {
        return;
    }

    for path in paths {
        let object_path = object_dir.join(object_name_for(path));
        match std::fs::remove_file(&object_path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!("failed to remove object file '{}': {err}", object_path.display()),
        }
    }
}

/// Resolves and builds a single named configuration.
pub fn build_named(
    name: &str,
    configurations: &[Configuration],
    project_root: &Path,
    parallel: bool,
    progress: Option<&Sender<ProgressUpdate>>,
) -> Result<BuildResult, CoreError> {
    let resolved = ConfigResolver::resolve_one(name, configurations, project_root)?;
    build_once(&resolved, project_root, parallel, progress)
}

/// Builds every complete configuration, in input order.
pub fn build_all(
    configurations: &[Configuration],
    project_root: &Path,
    parallel: bool,
    progress: Option<&Sender<ProgressUpdate>>,
) -> Result<Vec<(String, Result<BuildResult, CoreError>)>, CoreError> {
    let resolved = ConfigResolver::resolve_all(configurations, project_root, ConfigurationFilter::Complete)?;

    let mut results = Vec::with_capacity(resolved.len());
    for configuration in &resolved {
        let result = build_once(configuration, project_root, parallel, progress);
        results.push((configuration.name.clone(), result));
    }
    Ok(results)
}
