//! Module locator: dotted names to files across ordered search directories.

use std::path::PathBuf;

use tracing::debug;

use crate::error::ResolveError;
use crate::module::ModuleName;
use crate::ports::FileSystem;

/// Extension of module files.
pub const MODULE_EXTENSION: &str = "yaml";

/// Ordered list of search directories; earlier directories win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    search_paths: Vec<PathBuf>,
}

impl Locator {
    /// Creates a locator over `search_paths`, with `builtin_dir` (if any)
    /// prepended as the highest-priority directory.
    #[must_use]
    pub fn new(
        builtin_dir: Option<PathBuf>,
        search_paths: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        Self {
            search_paths: builtin_dir.into_iter().chain(search_paths).collect(),
        }
    }

    /// Search directories in priority order.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Checks that every search directory exists and is a directory.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidSearchPath`] for the first offending
    /// directory.
    pub fn validate(&self, fs: &dyn FileSystem) -> Result<(), ResolveError> {
        for path in &self.search_paths {
            if !fs.exists(path) {
                return Err(ResolveError::InvalidSearchPath {
                    path: path.clone(),
                    reason: "does not exist",
                });
            }
            if !fs.is_dir(path) {
                return Err(ResolveError::InvalidSearchPath {
                    path: path.clone(),
                    reason: "is not a directory",
                });
            }
        }
        Ok(())
    }

    /// Returns the first existing `<dir>/<a/b/c>.yaml` for `module`.
    ///
    /// `None` means no directory holds the module; the caller decides whether
    /// that is fatal.
    #[must_use]
    pub fn locate(&self, fs: &dyn FileSystem, module: &ModuleName) -> Option<PathBuf> {
        let relative = module.relative_path(MODULE_EXTENSION);
        self.search_paths
            .iter()
            .map(|dir| dir.join(&relative))
            .find(|candidate| {
                let found = fs.exists(candidate) && !fs.is_dir(candidate);
                debug!(module = %module, candidate = %candidate.display(), found, "checked");
                found
            })
    }

    /// Builds the error reported when `module` cannot be located.
    #[must_use]
    pub fn not_found(&self, module: &ModuleName) -> ResolveError {
        ResolveError::ModuleNotFound {
            module: module.clone(),
            searched: self.search_paths.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;
    use crate::error::ErrorKind;

    fn name(s: &str) -> ModuleName {
        ModuleName::parse(s).unwrap()
    }

    #[test]
    fn first_directory_wins() {
        let fs = MemoryFileSystem::new()
            .with_file("/one/app.yaml", "")
            .with_file("/two/app.yaml", "")
            .with_file("/two/only_two.yaml", "");
        let locator = Locator::new(None, [PathBuf::from("/one"), PathBuf::from("/two")]);

        assert_eq!(
            locator.locate(&fs, &name("app")),
            Some(PathBuf::from("/one/app.yaml"))
        );
        assert_eq!(
            locator.locate(&fs, &name("only_two")),
            Some(PathBuf::from("/two/only_two.yaml"))
        );
    }

    #[test]
    fn builtin_directory_is_prepended() {
        let fs = MemoryFileSystem::new()
            .with_file("/builtin/app.yaml", "")
            .with_file("/demo/app.yaml", "");
        let locator = Locator::new(Some(PathBuf::from("/builtin")), [PathBuf::from("/demo")]);

        assert_eq!(locator.search_paths()[0], PathBuf::from("/builtin"));
        assert_eq!(
            locator.locate(&fs, &name("app")),
            Some(PathBuf::from("/builtin/app.yaml"))
        );
    }

    #[test]
    fn dotted_names_descend_into_directories() {
        let fs = MemoryFileSystem::new().with_file("/demo/widgets/buttons.yaml", "");
        let locator = Locator::new(None, [PathBuf::from("/demo")]);

        assert_eq!(
            locator.locate(&fs, &name("widgets.buttons")),
            Some(PathBuf::from("/demo/widgets/buttons.yaml"))
        );
        assert_eq!(locator.locate(&fs, &name("widgets")), None);
    }

    #[test]
    fn missing_module_is_none() {
        let fs = MemoryFileSystem::new().with_file("/demo/app.yaml", "");
        let locator = Locator::new(None, [PathBuf::from("/demo")]);
        assert_eq!(locator.locate(&fs, &name("absent")), None);
        let err = locator.not_found(&name("absent"));
        assert_eq!(err.kind(), ErrorKind::ModuleNotFound);
    }

    #[test]
    fn validate_rejects_missing_and_non_directories() {
        let fs = MemoryFileSystem::new().with_file("/demo/app.yaml", "");

        let ok = Locator::new(None, [PathBuf::from("/demo")]);
        assert!(ok.validate(&fs).is_ok());

        let missing = Locator::new(None, [PathBuf::from("/demo"), PathBuf::from("/nope")]);
        let err = missing.validate(&fs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSearchPath);
        assert!(err.to_string().contains("does not exist"));

        let file = Locator::new(None, [PathBuf::from("/demo/app.yaml")]);
        let err = file.validate(&fs).unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }
}
