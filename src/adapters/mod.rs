//! Adapter implementations of the port traits.
//!
//! - `live`: real disk access, used by the CLI.
//! - `memory`: an in-process file tree, used by tests and embedders that
//!   assemble layouts without touching the disk.

pub mod live;
pub mod memory;
