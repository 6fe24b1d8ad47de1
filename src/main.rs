//! Binary entrypoint for the `layout` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    match layout_resolver::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
