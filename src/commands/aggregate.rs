//! `layout aggregate` command.

use std::path::{Path, PathBuf};

use crate::cli::PolicyArgs;
use crate::context::ServiceContext;
use crate::emit;
use crate::locator::Locator;
use crate::policy::Policy;
use crate::resolve::Resolver;
use crate::rewrite::Identity;

/// Directory that receives aggregated files when no output is given.
const DEFAULT_OUTPUT_DIR: &str = "docs/examples";

/// Inputs of one aggregation.
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Layout root directory; always the first search directory.
    pub root: PathBuf,
    /// Output file; derived from the root's name when absent.
    pub output: Option<PathBuf>,
    /// Main module name.
    pub main: String,
    /// Extra search directories after the root.
    pub search_paths: Vec<PathBuf>,
    /// Overrides on top of [`Policy::aggregate`].
    pub policy: PolicyArgs,
}

/// What an aggregation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSummary {
    /// Number of module names visited.
    pub modules: usize,
    /// Number of merged widgets.
    pub widgets: usize,
    /// Number of merged data definitions.
    pub data: usize,
    /// Imported modules that could not be found.
    pub missing: Vec<String>,
    /// File that was written.
    pub output: PathBuf,
}

/// Execute the `aggregate` command and print a summary.
///
/// # Errors
///
/// Returns an error string if the root is not a directory, resolution fails,
/// or the output cannot be written.
pub fn run(ctx: &ServiceContext, options: &AggregateOptions) -> Result<(), String> {
    let summary = aggregate(ctx, options)?;
    println!("Aggregated {} modules", summary.modules);
    println!("  Widgets: {}", summary.widgets);
    println!("  Data: {}", summary.data);
    if !summary.missing.is_empty() {
        println!("  Missing: {}", summary.missing.join(", "));
    }
    println!("  Output: {}", summary.output.display());
    Ok(())
}

/// Resolves the layout under `options.root` and writes it as one file.
///
/// # Errors
///
/// Returns an error string if the root is not a directory, resolution fails,
/// or the output cannot be written.
pub fn aggregate(
    ctx: &ServiceContext,
    options: &AggregateOptions,
) -> Result<AggregateSummary, String> {
    let root = &options.root;
    if !ctx.fs.exists(root) {
        return Err(format!("root directory does not exist: {}", root.display()));
    }
    if !ctx.fs.is_dir(root) {
        return Err(format!("not a directory: {}", root.display()));
    }

    let policy = options.policy.apply(Policy::aggregate())?;
    let search_paths = std::iter::once(root.clone()).chain(options.search_paths.iter().cloned());
    let locator = Locator::new(options.policy.builtin_dir.clone(), search_paths);

    let document = Resolver::new(ctx.fs.as_ref(), locator, policy)
        .resolve_main(&options.main)
        .map_err(|e| e.to_string())?
        .rewrite(&mut Identity);

    let output = options.output.clone().unwrap_or_else(|| default_output(root));
    emit::write(ctx.fs.as_ref(), &output, &document, root).map_err(|e| e.to_string())?;

    Ok(AggregateSummary {
        modules: document.visited.len(),
        widgets: document.widgets.len(),
        data: document.data.len(),
        missing: document.missing.iter().map(ToString::to_string).collect(),
        output,
    })
}

/// `docs/examples/<root-name>.yaml`.
fn default_output(root: &Path) -> PathBuf {
    let name = root
        .file_name()
        .map_or_else(|| "layout".into(), |n| n.to_string_lossy().into_owned());
    Path::new(DEFAULT_OUTPUT_DIR).join(format!("{name}.yaml"))
}
