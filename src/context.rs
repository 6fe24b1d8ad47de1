//! Service context bundling the port trait objects.

use crate::adapters::live::filesystem::LiveFileSystem;
use crate::ports::filesystem::FileSystem;

/// Bundles the port trait objects used by command handlers.
///
/// Constructors wire up different adapter implementations so the same
/// handler code runs against the real disk or an in-memory tree.
pub struct ServiceContext {
    /// Filesystem for locating, reading and writing layout files.
    pub fs: Box<dyn FileSystem>,
}

impl ServiceContext {
    /// Creates a live context backed by the real filesystem.
    #[must_use]
    pub fn live() -> Self {
        Self {
            fs: Box::new(LiveFileSystem),
        }
    }

    /// Creates a context around an arbitrary filesystem implementation.
    #[must_use]
    pub fn with_fs(fs: impl FileSystem + 'static) -> Self {
        Self { fs: Box::new(fs) }
    }
}
