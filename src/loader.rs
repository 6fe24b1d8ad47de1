//! Module loader: one file to one [`ModuleContent`].

use std::path::Path;

use serde_yaml::Value;

use crate::error::ResolveError;
use crate::module::{ModuleContent, ModuleName};
use crate::ports::FileSystem;

/// Reads and parses the module file at `path`.
///
/// An empty file, or one holding only comments or `~`, is an empty module.
///
/// # Errors
///
/// Returns [`ResolveError::Io`] if the file cannot be read,
/// [`ResolveError::Parse`] if it is not well-formed YAML, and
/// [`ResolveError::Malformed`] if its structure is unusable.
pub fn load(
    fs: &dyn FileSystem,
    module: &ModuleName,
    path: &Path,
) -> Result<ModuleContent, ResolveError> {
    let text = fs.read_to_string(path).map_err(|source| ResolveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = parse_document(&text).map_err(|source| ResolveError::Parse {
        module: module.clone(),
        path: path.to_path_buf(),
        source,
    })?;
    ModuleContent::from_value(module, path, value)
}

/// Parses YAML text into a value, mapping a document with no content
/// (blank, comments only, or a bare `---`) to null.
///
/// # Errors
///
/// Returns the parser error for malformed input.
pub fn parse_document(text: &str) -> Result<Value, serde_yaml::Error> {
    let has_content = text.lines().map(str::trim).any(|line| {
        !line.is_empty() && !line.starts_with('#') && line != "---" && line != "..."
    });
    if !has_content {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;
    use crate::error::ErrorKind;

    fn load_text(text: &str) -> Result<ModuleContent, ResolveError> {
        let fs = MemoryFileSystem::new().with_file("/demo/app.yaml", text);
        load(&fs, &app(), Path::new("/demo/app.yaml"))
    }

    fn app() -> ModuleName {
        ModuleName::parse("app").unwrap()
    }

    #[test]
    fn empty_and_null_documents_are_empty_modules() {
        for text in ["", "\n\n", "# placeholder\n", "---\n", "~\n", "null\n"] {
            let content = load_text(text).unwrap();
            assert_eq!(content, ModuleContent::default(), "{text:?}");
        }
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = load_text("widgets: [unclosed\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("/demo/app.yaml"));
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let fs = MemoryFileSystem::new();
        let err = load(&fs, &app(), Path::new("/demo/app.yaml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn loads_sections() {
        let content = load_text("import: leaf\nwidgets:\n  btn: {type: button}\n").unwrap();
        assert_eq!(content.imports.len(), 1);
        assert!(content.widgets.contains_key("btn"));
    }
}
