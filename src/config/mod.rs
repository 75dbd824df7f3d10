//! Per-target build configuration: the raw, partially-specified record read
//! from the configuration file, its fully-inherited form, and the resolver
//! that turns one into the other (`spec.md` §3, §4.6).

mod resolver;
mod validate;

pub use resolver::{ConfigResolver, ConfigurationFilter};

use std::path::PathBuf;

use serde::Deserialize;

/// A configuration record as read from the configuration file. Every field
/// is optional so that single-parent inheritance can fill in whatever is
/// absent. This is a structural deserialization target only; no
/// business-rule validation happens here, that lives entirely in
/// [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Configuration {
    pub name: Option<String>,
    pub parent: Option<String>,
    pub compiler: Option<String>,
    pub standard: Option<String>,
    pub warnings: Option<Vec<String>>,
    pub compilation_flags: Option<Vec<String>>,
    pub link_flags: Option<Vec<String>>,
    pub optimization: Option<String>,
    pub defines: Option<Vec<String>>,
    pub include_directories: Option<Vec<PathBuf>>,
    pub source_files: Option<Vec<PathBuf>>,
    pub source_directories: Option<Vec<PathBuf>>,
    pub excluded_files: Option<Vec<PathBuf>>,
    pub excluded_directories: Option<Vec<PathBuf>>,
    pub output_name: Option<String>,
    pub output_path: Option<PathBuf>,
}

/// A configuration after single-parent field inheritance has been applied.
/// `name`, `compiler`, and `output_name` are the fields required for a
/// configuration to be considered *complete*; `compiler` and `output_name`
/// remain optional here since an *incomplete* configuration is still a
/// valid resolution result (see [`ConfigurationFilter`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    pub name: String,
    pub compiler: Option<String>,
    pub standard: Option<String>,
    pub warnings: Vec<String>,
    pub compilation_flags: Vec<String>,
    pub link_flags: Vec<String>,
    pub optimization: Option<String>,
    pub defines: Vec<String>,
    pub include_directories: Vec<PathBuf>,
    pub source_files: Vec<PathBuf>,
    pub source_directories: Vec<PathBuf>,
    pub excluded_files: Vec<PathBuf>,
    pub excluded_directories: Vec<PathBuf>,
    pub output_name: Option<String>,
    pub output_path: Option<PathBuf>,
}

impl ResolvedConfiguration {
    /// A configuration is complete iff `compiler` and `output_name` both
    /// survived resolution.
    pub fn is_complete(&self) -> bool {
        self.compiler.is_some() && self.output_name.is_some()
    }
}

/// Reads a JSON array of [`Configuration`] records from `contents`. This is
/// the one place the core touches the configuration file's bytes directly;
/// everything else (locating the file, schema ergonomics, flag parsing) is
/// left to the CLI layer.
pub fn load_configurations(contents: &str) -> Result<Vec<Configuration>, serde_json::Error> {
    serde_json::from_str(contents)
}
