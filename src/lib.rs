//! easy-make's incremental build core.
//!
//! Resolves per-target build configurations with single-parent inheritance,
//! tracks a header-include dependency graph alongside content hashes to
//! compute the minimal recompile set, and drives a compiler and linker
//! through a bounded worker pool. Locating the configuration file, argument
//! parsing, and output formatting are left to a CLI layer; this crate is
//! the core that layer drives.

#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::clone_on_ref_ptr)]

pub mod build;
pub mod change_analyzer;
pub mod compiler;
pub mod config;
pub mod error;
pub mod file_set;
pub mod graph;
pub mod hash;
pub mod include_resolve;
pub mod include_scan;
pub mod linker;
pub mod metadata;
pub mod progress;
pub mod suggest;

pub const CONFIGURATIONS_FILE_NAME: &str = "easy-make-configurations.json";
