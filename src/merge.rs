//! Merge engine: folds per-module contributions into one namespace.

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde_yaml::Value;
use tracing::warn;

use crate::document::Definition;
use crate::error::{DefinitionKind, ResolveError};
use crate::module::{ModuleContent, ModuleName};
use crate::policy::{AppRule, DuplicateRule, Namespacing, Policy};

/// Accumulates widget, data and app contributions for one resolution call.
///
/// Keys keep the position where they were first inserted, even when a later
/// module replaces the definition.
#[derive(Debug)]
pub struct MergeEngine {
    namespacing: Namespacing,
    duplicate_rule: DuplicateRule,
    app_rule: AppRule,
    widgets: IndexMap<String, Definition>,
    data: IndexMap<String, Definition>,
    app: Option<Definition>,
}

impl MergeEngine {
    /// Creates an empty engine applying `policy`.
    #[must_use]
    pub fn new(policy: &Policy) -> Self {
        Self {
            namespacing: policy.namespacing,
            duplicate_rule: policy.duplicate_rule(),
            app_rule: policy.app_rule(),
            widgets: IndexMap::new(),
            data: IndexMap::new(),
            app: None,
        }
    }

    /// Rule applied to duplicate widget and data keys.
    #[must_use]
    pub fn duplicate_rule(&self) -> DuplicateRule {
        self.duplicate_rule
    }

    /// Rule applied to a second `app` block.
    #[must_use]
    pub fn app_rule(&self) -> AppRule {
        self.app_rule
    }

    /// Merges every contribution of one module: widgets, then data, then app.
    ///
    /// # Errors
    ///
    /// Propagates the first error from [`Self::merge_widgets`],
    /// [`Self::merge_data`] or [`Self::merge_app`].
    pub fn merge_module(
        &mut self,
        module: &ModuleName,
        content: ModuleContent,
    ) -> Result<(), ResolveError> {
        self.merge_widgets(module, content.widgets)?;
        self.merge_data(module, content.data)?;
        if let Some(app) = content.app {
            self.merge_app(module, app)?;
        }
        Ok(())
    }

    /// Merges `module`'s widgets, qualifying keys when namespacing is
    /// [`Namespacing::Qualified`].
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::DuplicateDefinition`] for a repeated key when
    /// the duplicate rule is [`DuplicateRule::Reject`].
    pub fn merge_widgets(
        &mut self,
        module: &ModuleName,
        widgets: IndexMap<String, Value>,
    ) -> Result<(), ResolveError> {
        for (name, definition) in widgets {
            let key = match self.namespacing {
                Namespacing::Qualified => module.qualify(&name),
                Namespacing::Flat => name,
            };
            insert(
                &mut self.widgets,
                DefinitionKind::Widget,
                self.duplicate_rule,
                key,
                Definition {
                    module: module.clone(),
                    value: definition,
                },
            )?;
        }
        Ok(())
    }

    /// Merges `module`'s data definitions. Data keys are never qualified.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::DuplicateDefinition`] for a repeated key when
    /// the duplicate rule is [`DuplicateRule::Reject`].
    pub fn merge_data(
        &mut self,
        module: &ModuleName,
        data: IndexMap<String, Value>,
    ) -> Result<(), ResolveError> {
        for (key, definition) in data {
            insert(
                &mut self.data,
                DefinitionKind::Data,
                self.duplicate_rule,
                key,
                Definition {
                    module: module.clone(),
                    value: definition,
                },
            )?;
        }
        Ok(())
    }

    /// Records `module`'s app block.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::DuplicateAppSection`] when an app block was
    /// already recorded and the app rule is [`AppRule::Reject`].
    pub fn merge_app(&mut self, module: &ModuleName, app: Value) -> Result<(), ResolveError> {
        let Some(first) = &self.app else {
            self.app = Some(Definition {
                module: module.clone(),
                value: app,
            });
            return Ok(());
        };
        match self.app_rule {
            AppRule::Reject => Err(ResolveError::DuplicateAppSection {
                first: first.module.clone(),
                second: module.clone(),
            }),
            AppRule::KeepFirst => {
                warn!(kept = %first.module, ignored = %module, "ignoring additional 'app' section");
                Ok(())
            }
            AppRule::Replace => {
                warn!(replaced = %first.module, by = %module, "overwriting 'app' section");
                self.app = Some(Definition {
                    module: module.clone(),
                    value: app,
                });
                Ok(())
            }
        }
    }

    /// Widgets merged so far.
    #[must_use]
    pub fn widgets(&self) -> &IndexMap<String, Definition> {
        &self.widgets
    }

    /// Data definitions merged so far.
    #[must_use]
    pub fn data(&self) -> &IndexMap<String, Definition> {
        &self.data
    }

    /// The app block recorded so far.
    #[must_use]
    pub fn app(&self) -> Option<&Definition> {
        self.app.as_ref()
    }

    /// Consumes the engine, returning widgets, data and the app block.
    pub(crate) fn into_parts(
        self,
    ) -> (IndexMap<String, Definition>, IndexMap<String, Definition>, Option<Definition>) {
        (self.widgets, self.data, self.app)
    }
}

fn insert(
    map: &mut IndexMap<String, Definition>,
    kind: DefinitionKind,
    rule: DuplicateRule,
    key: String,
    definition: Definition,
) -> Result<(), ResolveError> {
    match map.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(definition);
        }
        Entry::Occupied(mut slot) => match rule {
            DuplicateRule::Reject => {
                return Err(ResolveError::DuplicateDefinition {
                    kind,
                    first: slot.get().module.clone(),
                    second: definition.module,
                    key: slot.key().clone(),
                });
            }
            DuplicateRule::KeepFirst => {
                warn!(
                    %kind,
                    key = %slot.key(),
                    kept = %slot.get().module,
                    ignored = %definition.module,
                    "duplicate definition, keeping earlier"
                );
            }
            DuplicateRule::Replace => {
                warn!(
                    %kind,
                    key = %slot.key(),
                    replaced = %slot.get().module,
                    by = %definition.module,
                    "duplicate definition, overwriting"
                );
                slot.insert(definition);
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::policy::{ConflictPolicy, Traversal};

    fn name(s: &str) -> ModuleName {
        ModuleName::parse(s).unwrap()
    }

    fn defs(pairs: &[(&str, &str)]) -> IndexMap<String, Value> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), Value::from(*v))).collect()
    }

    fn policy(conflict: ConflictPolicy, traversal: Traversal, namespacing: Namespacing) -> Policy {
        Policy {
            conflict,
            traversal,
            namespacing,
            bootstrap: None,
        }
    }

    #[test]
    fn qualified_widgets_never_collide_across_modules() {
        let mut engine = MergeEngine::new(&policy(
            ConflictPolicy::Strict,
            Traversal::BreadthFirst,
            Namespacing::Qualified,
        ));
        engine.merge_widgets(&name("a"), defs(&[("x", "from a")])).unwrap();
        engine.merge_widgets(&name("b"), defs(&[("x", "from b")])).unwrap();

        let keys: Vec<&str> = engine.widgets().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a.x", "b.x"]);
    }

    #[test]
    fn strict_flat_duplicate_names_both_modules() {
        let mut engine = MergeEngine::new(&policy(
            ConflictPolicy::Strict,
            Traversal::BreadthFirst,
            Namespacing::Flat,
        ));
        engine.merge_widgets(&name("b"), defs(&[("x", "1")])).unwrap();
        let err = engine.merge_widgets(&name("c"), defs(&[("x", "2")])).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DuplicateDefinition);
        match err {
            ResolveError::DuplicateDefinition { kind, key, first, second } => {
                assert_eq!(kind, DefinitionKind::Widget);
                assert_eq!(key, "x");
                assert_eq!(first, name("b"));
                assert_eq!(second, name("c"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn strict_data_duplicates_fail_even_when_widgets_are_qualified() {
        let mut engine = MergeEngine::new(&Policy::runtime());
        engine.merge_data(&name("a"), defs(&[("greeting", "hi")])).unwrap();
        let err = engine
            .merge_data(&name("b"), defs(&[("greeting", "yo")]))
            .unwrap_err();
        let message = err.to_string();
        assert!(
            message.contains("duplicate data definition 'greeting'"),
            "{message}"
        );
    }

    #[test]
    fn replace_keeps_first_position_and_takes_new_value() {
        let mut engine = MergeEngine::new(&Policy::aggregate());
        engine.merge_widgets(&name("c"), defs(&[("x", "c"), ("y", "c")])).unwrap();
        engine.merge_widgets(&name("b"), defs(&[("x", "b")])).unwrap();

        let keys: Vec<&str> = engine.widgets().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["x", "y"]);
        assert_eq!(engine.widgets()["x"].module, name("b"));
        assert_eq!(engine.widgets()["x"].value, Value::from("b"));
    }

    #[test]
    fn keep_first_ignores_later_definition() {
        let mut engine = MergeEngine::new(&policy(
            ConflictPolicy::Permissive,
            Traversal::BreadthFirst,
            Namespacing::Flat,
        ));
        assert_eq!(engine.duplicate_rule(), DuplicateRule::KeepFirst);
        engine.merge_data(&name("b"), defs(&[("x", "b")])).unwrap();
        engine.merge_data(&name("c"), defs(&[("x", "c")])).unwrap();
        assert_eq!(engine.data()["x"].module, name("b"));
    }

    #[test]
    fn second_app_is_fatal_when_strict() {
        let mut engine = MergeEngine::new(&Policy::runtime());
        assert_eq!(engine.app_rule(), AppRule::Reject);
        engine.merge_app(&name("main"), Value::from("first")).unwrap();
        let err = engine.merge_app(&name("other"), Value::from("second")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateAppSection);
        assert!(err.to_string().contains("'main'"));
        assert!(err.to_string().contains("'other'"));
    }

    #[test]
    fn second_app_is_ignored_when_permissive_breadth_first() {
        let mut engine = MergeEngine::new(&policy(
            ConflictPolicy::Permissive,
            Traversal::BreadthFirst,
            Namespacing::Flat,
        ));
        assert_eq!(engine.app_rule(), AppRule::KeepFirst);
        engine.merge_app(&name("main"), Value::from("first")).unwrap();
        engine.merge_app(&name("other"), Value::from("second")).unwrap();
        let app = engine.app().unwrap();
        assert_eq!(app.module, name("main"));
        assert_eq!(app.value, Value::from("first"));
    }

    #[test]
    fn second_app_replaces_when_permissive_depth_first() {
        let mut engine = MergeEngine::new(&Policy::aggregate());
        assert_eq!(engine.app_rule(), AppRule::Replace);
        engine.merge_app(&name("lib"), Value::from("dependency")).unwrap();
        engine.merge_app(&name("main"), Value::from("ancestor")).unwrap();
        let app = engine.app().unwrap();
        assert_eq!(app.module, name("main"));
        assert_eq!(app.value, Value::from("ancestor"));
    }
}
