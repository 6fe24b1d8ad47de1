//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::module::ModuleName;
use crate::policy::{ConflictPolicy, Namespacing, Policy, Traversal};

/// Top-level CLI parser for `layout`.
#[derive(Debug, Parser)]
#[command(
    name = "layout",
    version,
    about = "Resolve and merge multi-module YAML layouts"
)]
pub struct Cli {
    /// Log every processed module to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate a layout directory into a single YAML file.
    Aggregate {
        /// Root directory holding the layout modules.
        root: PathBuf,
        /// Output file (default: docs/examples/<root-name>.yaml).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Main module name.
        #[arg(short, long, default_value = "app")]
        main: String,
        /// Additional search directories, searched after the root.
        #[arg(short = 's', long = "search-path")]
        search_paths: Vec<PathBuf>,
        /// Policy overrides.
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Resolve a main module and print the merged collections.
    Resolve {
        /// Main module name.
        main: String,
        /// Search directories, in priority order.
        #[arg(short = 's', long = "search-path", required = true)]
        search_paths: Vec<PathBuf>,
        /// Print the resolved document as JSON.
        #[arg(long)]
        json: bool,
        /// Policy overrides.
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

/// Flags overriding individual axes of a policy preset.
#[derive(Debug, Clone, Default, Args)]
pub struct PolicyArgs {
    /// Duplicate and missing-module handling.
    #[arg(long, value_enum)]
    pub conflict: Option<ConflictPolicy>,
    /// Import graph walk order.
    #[arg(long, value_enum)]
    pub traversal: Option<Traversal>,
    /// Widget key namespacing.
    #[arg(long, value_enum)]
    pub namespacing: Option<Namespacing>,
    /// Module seeded alongside the main module.
    #[arg(long)]
    pub bootstrap: Option<String>,
    /// Do not seed any bootstrap module.
    #[arg(long, conflicts_with = "bootstrap")]
    pub no_bootstrap: bool,
    /// Directory searched before all others.
    #[arg(long, env = "LAYOUT_BUILTIN_DIR")]
    pub builtin_dir: Option<PathBuf>,
}

impl PolicyArgs {
    /// Applies the overrides on top of `base`.
    ///
    /// # Errors
    ///
    /// Returns an error string when `--bootstrap` is not a valid module name.
    pub fn apply(&self, base: Policy) -> Result<Policy, String> {
        let mut policy = base;
        if let Some(conflict) = self.conflict {
            policy.conflict = conflict;
        }
        if let Some(traversal) = self.traversal {
            policy.traversal = traversal;
        }
        if let Some(namespacing) = self.namespacing {
            policy.namespacing = namespacing;
        }
        if let Some(bootstrap) = &self.bootstrap {
            policy.bootstrap = Some(ModuleName::parse(bootstrap).map_err(|e| e.to_string())?);
        }
        if self.no_bootstrap {
            policy.bootstrap = None;
        }
        Ok(policy)
    }
}
