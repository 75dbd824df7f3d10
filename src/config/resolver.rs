//! Single-parent field inheritance across a configuration set
//! (`spec.md` §4.6; `original_source/.../configuration_resolution.cpp`).

use std::collections::HashMap;
use std::path::Path;

use crate::config::validate::validate_configuration_values;
use crate::config::{Configuration, ResolvedConfiguration};
use crate::error::{ConfigError, CoreError};
use crate::suggest::closest;

/// Which subset of resolved configurations a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationFilter {
    All,
    Complete,
    Incomplete,
}

/// Resolves inheritance and validates a configuration set.
pub struct ConfigResolver;

impl ConfigResolver {
    /// Resolves every configuration in `configurations`, after running the
    /// fixed-order validation stages. Returns the resolved configurations in
    /// input order, filtered by `filter`.
    pub fn resolve_all(
        configurations: &[Configuration],
        project_root: &Path,
        filter: ConfigurationFilter,
    ) -> Result<Vec<ResolvedConfiguration>, CoreError> {
        validate_configuration_values(configurations, project_root)?;

        let by_name: HashMap<&str, &Configuration> =
            configurations.iter().map(|c| (c.name.as_deref().expect("validated"), c)).collect();

        let mut resolved: HashMap<String, ResolvedConfiguration> = HashMap::new();

        for configuration in configurations {
            resolve_into(configuration, &by_name, &mut resolved);
        }

        let mut output = Vec::with_capacity(configurations.len());
        for configuration in configurations {
            let name = configuration.name.as_deref().expect("validated");
            let resolved_configuration = resolved.get(name).expect("resolve_into populates every name").clone();

            let is_relevant = match filter {
                ConfigurationFilter::All => true,
                ConfigurationFilter::Complete => resolved_configuration.is_complete(),
                ConfigurationFilter::Incomplete => !resolved_configuration.is_complete(),
            };

            if is_relevant {
                output.push(resolved_configuration);
            }
        }

        Ok(output)
    }

    /// Resolves a single named configuration, failing if it does not exist
    /// (with a closest-name suggestion) or remains incomplete after
    /// resolution.
    pub fn resolve_one(
        target_name: &str,
        configurations: &[Configuration],
        project_root: &Path,
    ) -> Result<ResolvedConfiguration, CoreError> {
        let all = Self::resolve_all(configurations, project_root, ConfigurationFilter::All)?;

        let found = all.into_iter().find(|c| c.name == target_name);

        let configuration = match found {
            Some(c) => c,
            None => {
                let names = configurations.iter().filter_map(|c| c.name.clone());
                let suggestion = closest(target_name, names);
                return Err(ConfigError::UnknownConfiguration { target: target_name.to_string(), suggestion }.into());
            }
        };

        if !configuration.is_complete() {
            let missing_field = if configuration.compiler.is_none() { "compiler" } else { "output_name" };
            return Err(ConfigError::MissingField { name: configuration.name, field: missing_field }.into());
        }

        Ok(configuration)
    }
}

fn resolve_into(
    configuration: &Configuration,
    by_name: &HashMap<&str, &Configuration>,
    resolved: &mut HashMap<String, ResolvedConfiguration>,
) {
    let name = configuration.name.as_deref().expect("validated").to_string();

    if resolved.contains_key(&name) {
        return;
    }

    let resolved_configuration = match &configuration.parent {
        None => from_own_fields(configuration),
        Some(parent_name) => {
            let parent_configuration = by_name.get(parent_name.as_str()).expect("validate_parents already ran");
            resolve_into(parent_configuration, by_name, resolved);
            let resolved_parent = resolved.get(parent_name.as_str()).expect("just resolved").clone();
            inherit_missing_fields(configuration, &resolved_parent)
        }
    };

    resolved.insert(name, resolved_configuration);
}

fn from_own_fields(configuration: &Configuration) -> ResolvedConfiguration {
    ResolvedConfiguration {
        name: configuration.name.clone().expect("validated"),
        compiler: configuration.compiler.clone(),
        standard: configuration.standard.clone(),
        warnings: configuration.warnings.clone().unwrap_or_default(),
        compilation_flags: configuration.compilation_flags.clone().unwrap_or_default(),
        link_flags: configuration.link_flags.clone().unwrap_or_default(),
        optimization: configuration.optimization.clone(),
        defines: configuration.defines.clone().unwrap_or_default(),
        include_directories: configuration.include_directories.clone().unwrap_or_default(),
        source_files: configuration.source_files.clone().unwrap_or_default(),
        source_directories: configuration.source_directories.clone().unwrap_or_default(),
        excluded_files: configuration.excluded_files.clone().unwrap_or_default(),
        excluded_directories: configuration.excluded_directories.clone().unwrap_or_default(),
        output_name: configuration.output_name.clone(),
        output_path: configuration.output_path.clone(),
    }
}

/// Takes every field from `configuration` if present, else from `parent`.
fn inherit_missing_fields(configuration: &Configuration, parent: &ResolvedConfiguration) -> ResolvedConfiguration {
    ResolvedConfiguration {
        name: configuration.name.clone().expect("validated"),
        compiler: configuration.compiler.clone().or_else(|| parent.compiler.clone()),
        standard: configuration.standard.clone().or_else(|| parent.standard.clone()),
        warnings: configuration.warnings.clone().unwrap_or_else(|| parent.warnings.clone()),
        compilation_flags: configuration.compilation_flags.clone().unwrap_or_else(|| parent.compilation_flags.clone()),
        link_flags: configuration.link_flags.clone().unwrap_or_else(|| parent.link_flags.clone()),
        optimization: configuration.optimization.clone().or_else(|| parent.optimization.clone()),
        defines: configuration.defines.clone().unwrap_or_else(|| parent.defines.clone()),
        include_directories: configuration
            .include_directories
            .clone()
            .unwrap_or_else(|| parent.include_directories.clone()),
        source_files: configuration.source_files.clone().unwrap_or_else(|| parent.source_files.clone()),
        source_directories: configuration
            .source_directories
            .clone()
            .unwrap_or_else(|| parent.source_directories.clone()),
        excluded_files: configuration.excluded_files.clone().unwrap_or_else(|| parent.excluded_files.clone()),
        excluded_directories: configuration
            .excluded_directories
            .clone()
            .unwrap_or_else(|| parent.excluded_directories.clone()),
        output_name: configuration.output_name.clone().or_else(|| parent.output_name.clone()),
        output_path: configuration.output_path.clone().or_else(|| parent.output_path.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(name: &str) -> Configuration {
        Configuration { name: Some(name.to_string()), ..Default::default() }
    }

    #[test]
    fn a_configuration_without_a_parent_resolves_to_its_own_fields() {
        let mut base = config("base");
        base.compiler = Some("g++".to_string());
        base.output_name = Some("app".to_string());

        let dir = tempfile::tempdir().unwrap();
        let all = ConfigResolver::resolve_all(&[base], dir.path(), ConfigurationFilter::All).unwrap();
        assert_eq!(all[0].compiler.as_deref(), Some("g++"));
        assert_eq!(all[0].output_name.as_deref(), Some("app"));
    }

    #[test]
    fn a_child_inherits_fields_missing_from_its_own_record() {
        let mut base = config("base");
        base.compiler = Some("g++".to_string());
        base.standard = Some("17".to_string());
        base.output_name = Some("app".to_string());

        let mut child = config("child");
        child.parent = Some("base".to_string());
        child.standard = Some("20".to_string());

        let dir = tempfile::tempdir().unwrap();
        let all = ConfigResolver::resolve_all(&[base, child], dir.path(), ConfigurationFilter::All).unwrap();
        let resolved_child = all.iter().find(|c| c.name == "child").unwrap();
        assert_eq!(resolved_child.compiler.as_deref(), Some("g++"));
        assert_eq!(resolved_child.standard.as_deref(), Some("20"));
        assert_eq!(resolved_child.output_name.as_deref(), Some("app"));
    }

    #[test]
    fn multi_level_inheritance_resolves_through_the_chain() {
        let mut grandparent = config("grandparent");
        grandparent.compiler = Some("clang++".to_string());
        grandparent.output_name = Some("app".to_string());

        let mut parent = config("parent");
        parent.parent = Some("grandparent".to_string());

        let mut child = config("child");
        child.parent = Some("parent".to_string());

        let dir = tempfile::tempdir().unwrap();
        let all = ConfigResolver::resolve_all(&[grandparent, parent, child], dir.path(), ConfigurationFilter::All)
            .unwrap();
        let resolved_child = all.iter().find(|c| c.name == "child").unwrap();
        assert_eq!(resolved_child.compiler.as_deref(), Some("clang++"));
    }

    #[test]
    fn complete_filter_excludes_configurations_missing_compiler_or_output_name() {
        let incomplete = config("incomplete");
        let mut complete = config("complete");
        complete.compiler = Some("g++".to_string());
        complete.output_name = Some("app".to_string());

        let dir = tempfile::tempdir().unwrap();
        let complete_only =
            ConfigResolver::resolve_all(&[incomplete, complete], dir.path(), ConfigurationFilter::Complete).unwrap();
        assert_eq!(complete_only.len(), 1);
        assert_eq!(complete_only[0].name, "complete");
    }

    #[test]
    fn resolve_one_fails_with_suggestion_on_unknown_name() {
        let mut base = config("debug");
        base.compiler = Some("g++".to_string());
        base.output_name = Some("app".to_string());

        let dir = tempfile::tempdir().unwrap();
        let err = ConfigResolver::resolve_one("debgu", &[base], dir.path()).unwrap_err();
        match err {
            CoreError::Config(ConfigError::UnknownConfiguration { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("debug"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn resolve_one_fails_when_still_incomplete() {
        let base = config("debug");
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigResolver::resolve_one("debug", &[base], dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::MissingField { field: "compiler", .. })));
    }

    #[test]
    fn exclusions_are_fields_too_and_are_inherited_when_absent() {
        let mut base = config("base");
        base.compiler = Some("g++".to_string());
        base.output_name = Some("app".to_string());
        base.excluded_files = Some(vec![PathBuf::from("skip.cpp")]);

        let mut child = config("child");
        child.parent = Some("base".to_string());

        let dir = tempfile::tempdir().unwrap();
        let all = ConfigResolver::resolve_all(&[base, child], dir.path(), ConfigurationFilter::All).unwrap();
        let resolved_child = all.iter().find(|c| c.name == "child").unwrap();
        assert_eq!(resolved_child.excluded_files, vec![PathBuf::from("skip.cpp")]);
    }
}
