//! Fixed-order validation of a raw configuration set, before any
//! inheritance is applied (`spec.md` §4.6 stage 3;
//! `original_source/source/configuration_parsing/value_validation.cpp`).

use std::path::Path;

use crate::config::Configuration;
use crate::error::{ConfigError, CoreError};
use crate::file_set;
use crate::graph::Graph;
use crate::suggest::closest;

const VALID_COMPILERS: &[&str] = &["g++", "clang++"];
const VALID_STANDARDS: &[&str] = &["98", "03", "11", "14", "17", "20", "23", "26"];
const VALID_OPTIMIZATIONS: &[&str] = &["0", "1", "2", "3", "s", "fast"];

/// Runs all validation stages in order, returning the first failure.
pub fn validate_configuration_values(configurations: &[Configuration], project_root: &Path) -> Result<(), CoreError> {
    validate_names(configurations)?;
    validate_parents(configurations)?;
    validate_arguments(configurations, project_root)?;
    Ok(())
}

fn validate_names(configurations: &[Configuration]) -> Result<(), ConfigError> {
    let mut seen: Vec<(String, usize)> = Vec::new();

    for (zero_based_index, configuration) in configurations.iter().enumerate() {
        let index = zero_based_index + 1;

        let name = match &configuration.name {
            Some(name) => name,
            None => return Err(ConfigError::MissingName { index }),
        };

        if let Some((_, first_index)) = seen.iter().find(|(seen_name, _)| seen_name == name) {
            return Err(ConfigError::DuplicateName {
                name: name.clone(),
                first_index: *first_index,
                second_index: index,
            });
        }

        seen.push((name.clone(), index));
    }

    Ok(())
}

fn validate_parents(configurations: &[Configuration]) -> Result<(), ConfigError> {
    let mut names: Vec<&str> = configurations.iter().filter_map(|c| c.name.as_deref()).collect();
    names.sort_unstable();

    let mut parent_graph: Graph<String> = Graph::new();

    for configuration in configurations {
        let name = configuration.name.as_deref().expect("validate_names already ran");

        let parent = match &configuration.parent {
            Some(parent) => parent,
            None => continue,
        };

        if parent == name {
            return Err(ConfigError::SelfParent { name: name.to_string() });
        }

        if names.binary_search(&parent.as_str()).is_ok() {
            parent_graph.add_edge(name.to_string(), parent.clone());
            continue;
        }

        let suggestion = closest(parent, names.iter().map(|n| n.to_string()));
        return Err(ConfigError::MissingParent { name: name.to_string(), parent: parent.clone(), suggestion });
    }

    if let Some(cycle) = parent_graph.find_cycle() {
        return Err(ConfigError::ParentCycle { cycle });
    }

    Ok(())
}

fn validate_arguments(configurations: &[Configuration], project_root: &Path) -> Result<(), ConfigError> {
    for configuration in configurations {
        validate_compiler(configuration)?;
        validate_standard(configuration)?;
        validate_warnings(configuration)?;
        validate_optimization(configuration)?;
        validate_sources_and_excludes(configuration, project_root)?;
    }
    Ok(())
}

fn name_of(configuration: &Configuration) -> String {
    configuration.name.clone().unwrap_or_default()
}

fn validate_compiler(configuration: &Configuration) -> Result<(), ConfigError> {
    let Some(compiler) = &configuration.compiler else { return Ok(()) };
    if VALID_COMPILERS.contains(&compiler.as_str()) {
        return Ok(());
    }

    let suggestion = closest(compiler, VALID_COMPILERS.iter().map(|s| s.to_string()));
    Err(ConfigError::InvalidValue {
        name: name_of(configuration),
        field: "compiler",
        value: compiler.clone(),
        suggestion,
    })
}

fn validate_standard(configuration: &Configuration) -> Result<(), ConfigError> {
    let Some(standard) = &configuration.standard else { return Ok(()) };
    if VALID_STANDARDS.contains(&standard.as_str()) {
        return Ok(());
    }

    Err(ConfigError::InvalidValue {
        name: name_of(configuration),
        field: "standard",
        value: standard.clone(),
        suggestion: None,
    })
}

fn validate_warnings(configuration: &Configuration) -> Result<(), ConfigError> {
    let Some(warnings) = &configuration.warnings else { return Ok(()) };

    for (index, warning) in warnings.iter().enumerate() {
        if !warning.starts_with("-W") || warning == "-W" {
            return Err(ConfigError::InvalidWarning { name: name_of(configuration), value: warning.clone(), index });
        }
    }

    Ok(())
}

fn validate_optimization(configuration: &Configuration) -> Result<(), ConfigError> {
    let Some(optimization) = &configuration.optimization else { return Ok(()) };
    if VALID_OPTIMIZATIONS.contains(&optimization.as_str()) {
        return Ok(());
    }

    Err(ConfigError::InvalidValue {
        name: name_of(configuration),
        field: "optimization",
        value: optimization.clone(),
        suggestion: None,
    })
}

fn validate_sources_and_excludes(configuration: &Configuration, project_root: &Path) -> Result<(), ConfigError> {
    if let Some(source_files) = &configuration.source_files {
        for file in source_files {
            let display = file.to_string_lossy().to_string();

            if file_set::classify(file) == Some(file_set::FileKind::Header) {
                return Err(ConfigError::InvalidSourceFile {
                    name: name_of(configuration),
                    path: display,
                    reason: "is a header file",
                });
            }
            if !file_set::is_source(file) {
                return Err(ConfigError::InvalidSourceFile {
                    name: name_of(configuration),
                    path: display,
                    reason: "has an unsupported file extension",
                });
            }
            if !project_root.join(file).is_file() {
                return Err(ConfigError::MissingPath {
                    name: name_of(configuration),
                    field: "source_files",
                    path: display,
                });
            }
        }
    }

    if let Some(source_directories) = &configuration.source_directories {
        for dir in source_directories {
            if !project_root.join(dir).is_dir() {
                return Err(ConfigError::MissingPath {
                    name: name_of(configuration),
                    field: "source_directories",
                    path: dir.to_string_lossy().to_string(),
                });
            }
        }
    }

    if let Some(excluded_files) = &configuration.excluded_files {
        for file in excluded_files {
            if !project_root.join(file).is_file() {
                return Err(ConfigError::MissingPath {
                    name: name_of(configuration),
                    field: "excluded_files",
                    path: file.to_string_lossy().to_string(),
                });
            }
        }
    }

    if let Some(excluded_directories) = &configuration.excluded_directories {
        for dir in excluded_directories {
            if !project_root.join(dir).is_dir() {
                return Err(ConfigError::MissingPath {
                    name: name_of(configuration),
                    field: "excluded_directories",
                    path: dir.to_string_lossy().to_string(),
                });
            }
        }
    }

    Ok(())
}
