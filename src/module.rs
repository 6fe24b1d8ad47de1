//! Module names and per-file module content.
//!
//! A module is one YAML file addressed by a dotted name. Its top level is a
//! mapping with the optional keys:
//!
//! ```yaml
//! import: [widgets.buttons, common]   # or a single name
//! widgets:
//!   btn: { type: button, label: OK }
//! data:
//!   greeting: hi
//! app:
//!   title: Demo
//! ```
//!
//! Any other top-level key is kept in [`ModuleContent::extra`] and otherwise
//! ignored.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::error::ResolveError;

/// Top-level key listing a module's imports.
pub const IMPORT_KEY: &str = "import";
/// Top-level key holding widget definitions.
pub const WIDGETS_KEY: &str = "widgets";
/// Top-level key holding data definitions.
pub const DATA_KEY: &str = "data";
/// Top-level key holding the app configuration.
pub const APP_KEY: &str = "app";

/// A dotted module identifier such as `widgets.buttons`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModuleName(String);

impl ModuleName {
    /// Parses and validates a dotted module name.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidModuleName`] when the name is empty,
    /// has an empty segment, or a segment contains a path separator.
    pub fn parse(name: &str) -> Result<Self, ResolveError> {
        let invalid = |reason| ResolveError::InvalidModuleName {
            name: name.to_string(),
            reason,
        };
        if name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        for segment in name.split('.') {
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }
            if segment.contains(['/', '\\']) {
                return Err(invalid("segment contains a path separator"));
            }
        }
        Ok(Self(name.to_string()))
    }

    /// Wraps a name that is valid by construction.
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(
            Self::parse(name).is_ok(),
            "invalid static module name {name:?}"
        );
        Self(name.to_string())
    }

    /// Returns the name as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Maps the dotted name to a relative file path: `a.b.c` → `a/b/c.<ext>`.
    #[must_use]
    pub fn relative_path(&self, extension: &str) -> PathBuf {
        let mut path: PathBuf = self.0.split('.').collect();
        path.set_extension(extension);
        path
    }

    /// Prefixes a key with this module name: `<module>.<key>`.
    #[must_use]
    pub fn qualify(&self, key: &str) -> String {
        format!("{}.{key}", self.0)
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parsed contributions of one module file.
///
/// Created per file read and dropped once its contributions are merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleContent {
    /// Imported module names, in declaration order.
    pub imports: Vec<ModuleName>,
    /// Widget definitions keyed by bare widget name.
    pub widgets: IndexMap<String, Value>,
    /// Data definitions keyed by data name.
    pub data: IndexMap<String, Value>,
    /// The app configuration block, if this module declares one.
    pub app: Option<Value>,
    /// Unrecognized top-level keys, preserved as found.
    pub extra: Mapping,
}

impl ModuleContent {
    /// Interprets a parsed YAML document as module content.
    ///
    /// A null document is an empty module. `import` may be a single name or a
    /// sequence of names; `app: ~` counts as no app block.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Malformed`] when the top level is not a
    /// mapping or a known section has the wrong shape, and
    /// [`ResolveError::InvalidModuleName`] for an unusable import name.
    pub fn from_value(
        module: &ModuleName,
        path: &Path,
        value: Value,
    ) -> Result<Self, ResolveError> {
        let malformed = |reason: String| ResolveError::Malformed {
            module: module.clone(),
            path: path.to_path_buf(),
            reason,
        };

        let mapping = match value {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(malformed(format!(
                    "top level must be a mapping, found {}",
                    shape_name(&other)
                )))
            }
        };

        let mut content = Self::default();
        for (key, value) in mapping {
            match key.as_str() {
                Some(IMPORT_KEY) => content.imports = parse_imports(value).map_err(malformed)??,
                Some(WIDGETS_KEY) => {
                    content.widgets = parse_definitions(WIDGETS_KEY, value).map_err(malformed)?;
                }
                Some(DATA_KEY) => {
                    content.data = parse_definitions(DATA_KEY, value).map_err(malformed)?;
                }
                Some(APP_KEY) => content.app = Some(value).filter(|v| !v.is_null()),
                _ => {
                    content.extra.insert(key, value);
                }
            }
        }
        Ok(content)
    }
}

/// Outer error: shape problem; inner error: an import name failed validation.
fn parse_imports(value: Value) -> Result<Result<Vec<ModuleName>, ResolveError>, String> {
    let names = match value {
        Value::Null => Vec::new(),
        Value::String(name) => vec![name],
        Value::Sequence(items) => {
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(name) => names.push(name),
                    other => {
                        return Err(format!(
                            "import entries must be strings, found {}",
                            shape_name(&other)
                        ))
                    }
                }
            }
            names
        }
        other => {
            return Err(format!(
                "'import' must be a name or a list of names, found {}",
                shape_name(&other)
            ))
        }
    };
    let parsed = names.iter().map(|name| ModuleName::parse(name)).collect();
    Ok(parsed)
}

fn parse_definitions(section: &str, value: Value) -> Result<IndexMap<String, Value>, String> {
    match value {
        Value::Null => Ok(IndexMap::new()),
        Value::Mapping(mapping) => {
            let mut definitions = IndexMap::with_capacity(mapping.len());
            for (key, definition) in mapping {
                definitions.insert(definition_key(section, key)?, definition);
            }
            Ok(definitions)
        }
        other => Err(format!(
            "'{section}' must be a mapping, found {}",
            shape_name(&other)
        )),
    }
}

/// Scalar keys are stored in their YAML text form; `404:` becomes `"404"`.
fn definition_key(section: &str, key: Value) -> Result<String, String> {
    match key {
        Value::String(name) => Ok(name),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Ok("null".to_string()),
        other => Err(format!(
            "'{section}' keys must be scalars, found {}",
            shape_name(&other)
        )),
    }
}

/// Short human-readable name for the shape of a YAML value.
pub(crate) fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
