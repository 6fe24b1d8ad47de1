//! In-memory filesystem adapter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::ports::filesystem::FileSystem;

/// Filesystem backed by a path → contents map.
///
/// Directories are implicit: a path is a directory when at least one stored
/// file lives underneath it. Every access is a single map operation, so a
/// poisoned lock still guards a consistent map and is recovered.
#[derive(Default)]
pub struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    /// Creates an empty in-memory filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, builder style.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), contents.into());
        self
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, String>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        self.lock()
            .get(path)
            .cloned()
            .ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.lock().insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let is_file = self.lock().contains_key(path);
        is_file || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.lock().keys().any(|k| k.starts_with(path) && k != path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_are_implied_by_files() {
        let fs = MemoryFileSystem::new().with_file("/layouts/widgets/buttons.yaml", "widgets: {}");

        assert!(fs.is_dir(Path::new("/layouts")));
        assert!(fs.is_dir(Path::new("/layouts/widgets")));
        assert!(!fs.is_dir(Path::new("/layouts/widgets/buttons.yaml")));
        assert!(fs.exists(Path::new("/layouts/widgets/buttons.yaml")));
        assert!(!fs.exists(Path::new("/elsewhere")));
    }

    #[test]
    fn write_then_read() {
        let fs = MemoryFileSystem::new();
        let path = Path::new("/out/doc.yaml");
        fs.write(path, "app: {}\n").unwrap();
        assert_eq!(fs.read_to_string(path).unwrap(), "app: {}\n");
        assert!(fs.read_to_string(Path::new("/out/other.yaml")).is_err());
    }

    #[test]
    fn poisoned_lock_is_recovered_by_every_operation() {
        let fs = MemoryFileSystem::new().with_file("/a.yaml", "a");
        std::thread::scope(|scope| {
            let holder = scope.spawn(|| {
                let _guard = fs.files.lock().unwrap();
                panic!("poison the lock");
            });
            assert!(holder.join().is_err());
        });
        assert!(fs.files.is_poisoned());

        fs.write(Path::new("/b.yaml"), "b").unwrap();
        let fs = fs.with_file("/c.yaml", "c");
        for (path, contents) in [("/a.yaml", "a"), ("/b.yaml", "b"), ("/c.yaml", "c")] {
            assert_eq!(fs.read_to_string(Path::new(path)).unwrap(), contents);
        }
        assert!(fs.is_dir(Path::new("/")));
    }
}
