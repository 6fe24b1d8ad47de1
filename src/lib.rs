//! Core library for the `layout` CLI.
//!
//! Resolves a UI layout spread across many YAML modules into one document.
//! Modules are located by dotted name ([`locator`]), parsed ([`loader`]),
//! walked through their imports ([`resolve`]) and merged ([`merge`]) under a
//! [`policy::Policy`]. The result, a [`document::MergedDocument`], can be
//! rewritten ([`rewrite`]) and written as a single file ([`emit`]).
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use layout_resolver::adapters::live::filesystem::LiveFileSystem;
//! use layout_resolver::policy::Policy;
//! use layout_resolver::resolve::resolve_main;
//!
//! let document = resolve_main(
//!     &LiveFileSystem,
//!     None,
//!     vec![PathBuf::from("layouts")],
//!     "app",
//!     Policy::runtime(),
//! )?;
//! println!("{} widgets", document.widgets.len());
//! # Ok::<(), layout_resolver::error::ResolveError>(())
//! ```

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod context;
pub mod document;
pub mod emit;
pub mod error;
pub mod loader;
pub mod locator;
pub mod logging;
pub mod merge;
pub mod module;
pub mod policy;
pub mod ports;
pub mod resolve;
pub mod rewrite;

pub use document::{Definition, MergedDocument};
pub use error::{ErrorKind, ResolveError};
pub use policy::Policy;
pub use resolve::Resolver;

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => return Err(err.to_string()),
        },
    };
    logging::init_tracing(cli.verbose);
    commands::dispatch(&cli.command)
}
