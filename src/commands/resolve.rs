//! `layout resolve` command.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

use crate::cli::PolicyArgs;
use crate::context::ServiceContext;
use crate::document::{Definition, MergedDocument};
use crate::locator::Locator;
use crate::module::ModuleName;
use crate::policy::Policy;
use crate::resolve::Resolver;

/// JSON view handed to consuming renderers.
#[derive(Debug, Serialize)]
struct ResolvedView<'a> {
    visited: Vec<&'a ModuleName>,
    missing: &'a [ModuleName],
    widgets: &'a IndexMap<String, Definition>,
    data: &'a IndexMap<String, Definition>,
    app: &'a Definition,
}

/// Execute the `resolve` command.
///
/// Resolves `main` with the runtime preset (plus overrides) and prints
/// either a summary or, with `json`, the full document.
///
/// # Errors
///
/// Returns an error string if resolution or JSON serialization fails.
pub fn run(
    ctx: &ServiceContext,
    main: &str,
    search_paths: &[PathBuf],
    policy: &PolicyArgs,
    json: bool,
) -> Result<(), String> {
    let document = resolve(ctx, main, search_paths, policy)?;
    if json {
        println!("{}", to_json(&document)?);
    } else {
        print!("{}", format_summary(&document));
    }
    Ok(())
}

/// Resolves `main` without emitting anything.
///
/// # Errors
///
/// Returns an error string if the policy overrides or resolution fail.
pub fn resolve(
    ctx: &ServiceContext,
    main: &str,
    search_paths: &[PathBuf],
    policy: &PolicyArgs,
) -> Result<MergedDocument, String> {
    let locator = Locator::new(policy.builtin_dir.clone(), search_paths.iter().cloned());
    let policy = policy.apply(Policy::runtime())?;
    Resolver::new(ctx.fs.as_ref(), locator, policy).resolve_main(main).map_err(|e| e.to_string())
}

/// Serializes the document for a consuming renderer.
///
/// # Errors
///
/// Returns an error string if a definition cannot be expressed as JSON
/// (for example a mapping with non-string keys).
pub fn to_json(document: &MergedDocument) -> Result<String, String> {
    let view = ResolvedView {
        visited: document.visited.iter().collect(),
        missing: &document.missing,
        widgets: &document.widgets,
        data: &document.data,
        app: &document.app,
    };
    serde_json::to_string_pretty(&view)
        .map_err(|e| format!("failed to serialize as JSON: {e}"))
}

/// Formats a human-readable summary of a resolved document.
#[must_use]
pub fn format_summary(document: &MergedDocument) -> String {
    let mut lines = Vec::new();
    let visited: Vec<&str> = document.visited.iter().map(ModuleName::as_str).collect();
    let count = visited.len();
    lines.push(format!("Modules ({count}): {}", visited.join(", ")));
    if !document.missing.is_empty() {
        let missing: Vec<&str> = document.missing.iter().map(ModuleName::as_str).collect();
        lines.push(format!("Missing: {}", missing.join(", ")));
    }

    let width = document
        .widgets
        .keys()
        .chain(document.data.keys())
        .map(String::len)
        .max()
        .unwrap_or(0);
    lines.push(format!("Widgets ({}):", document.widgets.len()));
    for (key, definition) in &document.widgets {
        lines.push(format!("  {key:<width$}  ({})", definition.module));
    }
    lines.push(format!("Data ({}):", document.data.len()));
    for (key, definition) in &document.data {
        lines.push(format!("  {key:<width$}  ({})", definition.module));
    }
    lines.push(format!("App: {}", document.app.module));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
