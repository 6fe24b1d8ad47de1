//! The merged, fully resolved layout document.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::module::{ModuleName, APP_KEY, DATA_KEY, WIDGETS_KEY};
use crate::rewrite::{rewrite_value, RewritePath, RewriteRule};

/// A definition together with the module that contributed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    /// Owning module.
    pub module: ModuleName,
    /// The definition tree, uninterpreted.
    pub value: Value,
}

/// Result of one resolution call.
///
/// Owned by the caller; nothing in it is shared with other resolutions.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedDocument {
    /// Widget definitions by merged key (`<module>.<widget>` or bare).
    pub widgets: IndexMap<String, Definition>,
    /// Data definitions by key.
    pub data: IndexMap<String, Definition>,
    /// The single app configuration.
    pub app: Definition,
    /// Every module name reached, in visit order.
    pub visited: IndexSet<ModuleName>,
    /// Modules that were imported but could not be located.
    ///
    /// Only non-empty under permissive policy; strict policy fails instead.
    pub missing: Vec<ModuleName>,
}

impl MergedDocument {
    /// Applies `rule` to every scalar of the app, widget and data trees.
    ///
    /// Paths seen by the rule start with the section key (`app`, `widgets`
    /// or `data`), followed by the merged key for widgets and data.
    #[must_use]
    pub fn rewrite(self, rule: &mut dyn RewriteRule) -> Self {
        let mut path = RewritePath::default();

        path.push_key(APP_KEY);
        let app = Definition {
            module: self.app.module,
            value: rewrite_value(self.app.value, &mut path, rule),
        };
        path.pop();

        let widgets = rewrite_section(self.widgets, WIDGETS_KEY, &mut path, rule);
        let data = rewrite_section(self.data, DATA_KEY, &mut path, rule);

        Self {
            widgets,
            data,
            app,
            visited: self.visited,
            missing: self.missing,
        }
    }

    /// Builds the output mapping: `app`, then `widgets`, then `data`.
    ///
    /// Empty `widgets` or `data` sections are omitted.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut root = Mapping::new();
        root.insert(Value::from(APP_KEY), self.app.value.clone());
        if !self.widgets.is_empty() {
            root.insert(Value::from(WIDGETS_KEY), section_value(&self.widgets));
        }
        if !self.data.is_empty() {
            root.insert(Value::from(DATA_KEY), section_value(&self.data));
        }
        Value::Mapping(root)
    }
}

fn rewrite_section(
    section: IndexMap<String, Definition>,
    name: &str,
    path: &mut RewritePath,
    rule: &mut dyn RewriteRule,
) -> IndexMap<String, Definition> {
    path.push_key(name);
    let rewritten = section
        .into_iter()
        .map(|(key, definition)| {
            path.push_key(&key);
            let value = rewrite_value(definition.value, path, rule);
            path.pop();
            let module = definition.module;
            (key, Definition { module, value })
        })
        .collect();
    path.pop();
    rewritten
}

fn section_value(section: &IndexMap<String, Definition>) -> Value {
    Value::Mapping(
        section
            .iter()
            .map(|(key, definition)| {
                (Value::from(key.as_str()), definition.value.clone())
            })
            .collect(),
    )
}
