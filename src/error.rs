//! The error taxonomy for the incremental build core (see `spec.md` §7).
//!
//! Every fallible operation in this crate returns `Result<T, CoreError>`.
//! `anyhow` is reserved for the CLI boundary in `main.rs`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Returns the English ordinal suffix for a 1-based index (`1st`, `2nd`,
/// `3rd`, `4th`, ..., `11th`, `12th`, `13th`, `21st`, ...).
pub fn ordinal(index: usize) -> String {
    let suffix = match (index % 100, index % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{}{}", index, suffix)
}

/// A configuration-resolution or validation failure (`spec.md` §7 `ConfigError`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The `index`-th (1-based) configuration has no `name`.
    MissingName { index: usize },
    /// Two configurations share the same name.
    DuplicateName { name: String, first_index: usize, second_index: usize },
    /// A configuration names itself as its own parent.
    SelfParent { name: String },
    /// A configuration's `parent` does not refer to any known configuration.
    MissingParent { name: String, parent: String, suggestion: Option<String> },
    /// The parent graph contains a cycle.
    ParentCycle { cycle: String },
    /// A configuration could not be resolved because a required field is
    /// still absent after inheritance.
    MissingField { name: String, field: &'static str },
    /// A configuration names a nonexistent target configuration.
    UnknownConfiguration { target: String, suggestion: Option<String> },
    /// An enumerated field (compiler/standard/optimization) has an invalid value.
    InvalidValue { name: String, field: &'static str, value: String, suggestion: Option<String> },
    /// An entry in `warnings` doesn't look like a warning flag.
    InvalidWarning { name: String, value: String, index: usize },
    /// A listed source file is not a recognized source extension, or is a header.
    InvalidSourceFile { name: String, path: String, reason: &'static str },
    /// A listed file or directory does not exist.
    MissingPath { name: String, field: &'static str, path: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingName { index } => {
                write!(f, "the {} configuration does not have a name", ordinal(*index))
            }
            ConfigError::DuplicateName { name, first_index, second_index } => write!(
                f,
                "both the {} and {} configurations have '{}' as name",
                ordinal(*first_index),
                ordinal(*second_index),
                name
            ),
            ConfigError::SelfParent { name } => {
                write!(f, "configuration '{}' has itself as a parent", name)
            }
            ConfigError::MissingParent { name, parent, suggestion } => {
                write!(f, "configuration '{}' has a non-existent parent configuration '{}'", name, parent)?;
                write_suggestion(f, suggestion)
            }
            ConfigError::ParentCycle { cycle } => write!(
                f,
                "circular parent dependency detected.\n\nThe following configurations form a cycle:\n{}",
                cycle
            ),
            ConfigError::MissingField { name, field } => {
                write!(f, "configuration '{}' is incomplete - could not resolve '{}'", name, field)
            }
            ConfigError::UnknownConfiguration { target, suggestion } => {
                write!(f, "no configuration named '{}' was found", target)?;
                write_suggestion(f, suggestion)
            }
            ConfigError::InvalidValue { name, field, value, suggestion } => {
                write!(f, "configuration '{}' has an unknown {} '{}'", name, field, value)?;
                write_suggestion(f, suggestion)
            }
            ConfigError::InvalidWarning { name, value, index } => write!(
                f,
                "configuration '{}' has an invalid warning '{}' at index {}",
                name, value, index
            ),
            ConfigError::InvalidSourceFile { name, path, reason } => write!(
                f,
                "configuration '{}' lists '{}' in source_files, which {}",
                name, path, reason
            ),
            ConfigError::MissingPath { name, field, path } => {
                write!(f, "configuration '{}' has a non-existent {} '{}'", name, field, path)
            }
        }
    }
}

fn write_suggestion(f: &mut fmt::Formatter<'_>, suggestion: &Option<String>) -> fmt::Result {
    match suggestion {
        Some(s) => write!(f, " (did you mean '{}'?)", s),
        None => Ok(()),
    }
}

impl std::error::Error for ConfigError {}

/// The top-level error type for the incremental build core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("circular header dependency detected.\n\nThe following headers form a cycle:\n{cycle}")]
    Cycle { cycle: String },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compilation failed ({} file(s))", failures.len())]
    CompilationFailure { failures: Vec<PathBuf> },

    #[error("linking failed")]
    LinkFailure,
}
