//! Errors raised while locating, loading, merging and emitting layout modules.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::module::ModuleName;

/// Which merged collection a duplicate key was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    /// The `widgets` mapping.
    Widget,
    /// The `data` mapping.
    Data,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Widget => f.write_str("widget"),
            Self::Data => f.write_str("data"),
        }
    }
}

/// Coarse classification of a [`ResolveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A configured search directory is missing or not a directory.
    InvalidSearchPath,
    /// A module name is not a valid dotted identifier.
    InvalidModuleName,
    /// No search directory holds the requested module.
    ModuleNotFound,
    /// A module file could not be read, or its content is unusable.
    Parse,
    /// A widget or data key is defined by two modules.
    DuplicateDefinition,
    /// More than one module contributes an `app` block.
    DuplicateAppSection,
    /// The resolved closure defines no widgets.
    MissingWidgets,
    /// The resolved closure defines no `app` block.
    MissingApp,
    /// Reading or writing through the filesystem failed.
    Io,
    /// The merged document could not be serialized.
    Serialize,
}

/// Error raised by resolution or emission.
///
/// Every variant short-circuits the current call.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A configured search directory does not exist or is not a directory.
    #[error("search path {}: {reason}", path.display())]
    InvalidSearchPath {
        /// The offending directory.
        path: PathBuf,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A dotted module name is empty or contains an unusable segment.
    #[error("invalid module name '{name}': {reason}")]
    InvalidModuleName {
        /// The rejected name as written.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The locator exhausted every search directory.
    #[error("module '{module}' not found in search paths: {}", display_paths(searched))]
    ModuleNotFound {
        /// The module that was requested.
        module: ModuleName,
        /// Directories that were searched, in priority order.
        searched: Vec<PathBuf>,
    },

    /// A module file is not well-formed YAML.
    #[error("failed to parse module '{module}' from {}: {source}", path.display())]
    Parse {
        /// Module being loaded.
        module: ModuleName,
        /// File the module was read from.
        path: PathBuf,
        /// Underlying parser error.
        source: serde_yaml::Error,
    },

    /// A module file is valid YAML but its structure is unusable.
    #[error("malformed module '{module}' in {}: {reason}", path.display())]
    Malformed {
        /// Module being loaded.
        module: ModuleName,
        /// File the module was read from.
        path: PathBuf,
        /// What is wrong with the structure.
        reason: String,
    },

    /// Two modules define the same widget or data key under strict policy.
    #[error("duplicate {kind} definition '{key}' in '{first}' and '{second}'")]
    DuplicateDefinition {
        /// Collection the key lives in.
        kind: DefinitionKind,
        /// The contended key, as stored in the merged document.
        key: String,
        /// Module that defined the key first.
        first: ModuleName,
        /// Module that attempted to define it again.
        second: ModuleName,
    },

    /// A second module contributes an `app` block under strict policy.
    #[error("multiple 'app' sections: first in '{first}', again in '{second}'")]
    DuplicateAppSection {
        /// Module whose `app` block was accepted.
        first: ModuleName,
        /// Module contributing the extra `app` block.
        second: ModuleName,
    },

    /// No widget definitions were found after resolving every module.
    #[error("no widget definitions found after loading all modules")]
    MissingWidgets,

    /// No `app` section was found in any resolved module.
    #[error("no 'app' section found in any module")]
    MissingApp,

    /// Reading or writing a file failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error reported by the filesystem port.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The merged document could not be serialized.
    #[error("failed to serialize merged document: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

impl ResolveError {
    /// Returns the coarse classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSearchPath { .. } => ErrorKind::InvalidSearchPath,
            Self::InvalidModuleName { .. } => ErrorKind::InvalidModuleName,
            Self::ModuleNotFound { .. } => ErrorKind::ModuleNotFound,
            Self::Parse { .. } | Self::Malformed { .. } => ErrorKind::Parse,
            Self::DuplicateDefinition { .. } => ErrorKind::DuplicateDefinition,
            Self::DuplicateAppSection { .. } => ErrorKind::DuplicateAppSection,
            Self::MissingWidgets => ErrorKind::MissingWidgets,
            Self::MissingApp => ErrorKind::MissingApp,
            Self::Io { .. } => ErrorKind::Io,
            Self::Serialize(_) => ErrorKind::Serialize,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    let joined: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    format!("[{}]", joined.join(", "))
}
