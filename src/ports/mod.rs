//! Port traits defining external boundaries.
//!
//! The resolver core only talks to the outside world through these traits.
//! Implementations live in `src/adapters/`.

pub mod filesystem;

pub use filesystem::FileSystem;
