//! Command dispatch and handlers.

pub mod aggregate;
pub mod resolve;

use crate::cli::Command;
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler against the live filesystem.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    dispatch_with_context(command, &ServiceContext::live())
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<(), String> {
    match command {
        Command::Aggregate { root, output, main, search_paths, policy } => {
            let options = aggregate::AggregateOptions {
                root: root.clone(),
                output: output.clone(),
                main: main.clone(),
                search_paths: search_paths.clone(),
                policy: policy.clone(),
            };
            aggregate::run(ctx, &options)
        }
        Command::Resolve { main, search_paths, json, policy } => {
            resolve::run(ctx, main, search_paths, policy, *json)
        }
    }
}
