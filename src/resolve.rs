//! Resolver: walks the import graph and feeds each module to the merge engine.
//!
//! Every module name is loaded and merged at most once per call. A repeat
//! visit is skipped silently, which is all it takes to make self-imports and
//! import cycles terminate.

use std::collections::VecDeque;
use std::mem;
use std::path::PathBuf;

use indexmap::IndexSet;
use tracing::{debug, info, warn};

use crate::document::MergedDocument;
use crate::error::ResolveError;
use crate::loader;
use crate::locator::Locator;
use crate::merge::MergeEngine;
use crate::module::{ModuleContent, ModuleName};
use crate::policy::{ConflictPolicy, Policy, Traversal};
use crate::ports::FileSystem;

/// Working set of one resolution call.
struct ResolutionState {
    visited: IndexSet<ModuleName>,
    missing: Vec<ModuleName>,
    engine: MergeEngine,
}

/// Resolves a set of seed modules into one [`MergedDocument`].
///
/// A `Resolver` holds configuration only; each [`Resolver::resolve`] call
/// builds and owns its own state, so calls are independent.
pub struct Resolver<'a> {
    fs: &'a dyn FileSystem,
    locator: Locator,
    policy: Policy,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver reading through `fs`.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, locator: Locator, policy: Policy) -> Self {
        Self {
            fs,
            locator,
            policy,
        }
    }

    /// Resolves a single main module (plus the bootstrap module, if any).
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    pub fn resolve_main(&self, main: &str) -> Result<MergedDocument, ResolveError> {
        self.resolve(&[ModuleName::parse(main)?])
    }

    /// Resolves `seeds` and everything they transitively import.
    ///
    /// Seeds are visited in order, followed by the policy's bootstrap module
    /// when it is not already a seed.
    ///
    /// # Errors
    ///
    /// Fails on the first of: an invalid search directory (checked before any
    /// module is read), a missing module under strict policy, an unreadable
    /// or malformed module, a rejected duplicate, or a closure with no
    /// widgets or no app block.
    pub fn resolve(&self, seeds: &[ModuleName]) -> Result<MergedDocument, ResolveError> {
        self.locator.validate(self.fs)?;

        let mut seeds: Vec<ModuleName> = seeds.to_vec();
        if let Some(bootstrap) = &self.policy.bootstrap {
            if !seeds.contains(bootstrap) {
                seeds.push(bootstrap.clone());
            }
        }
        debug!(seeds = ?seeds, traversal = ?self.policy.traversal, "resolving");

        let mut state = ResolutionState {
            visited: IndexSet::new(),
            missing: Vec::new(),
            engine: MergeEngine::new(&self.policy),
        };

        match self.policy.traversal {
            Traversal::BreadthFirst => self.breadth_first(&mut state, seeds)?,
            Traversal::DepthFirst => {
                for seed in seeds {
                    self.depth_first(&mut state, seed)?;
                }
            }
        }

        finish(state)
    }

    fn breadth_first(
        &self,
        state: &mut ResolutionState,
        seeds: Vec<ModuleName>,
    ) -> Result<(), ResolveError> {
        let mut queue: VecDeque<ModuleName> = seeds.into();
        while let Some(module) = queue.pop_front() {
            if state.visited.contains(&module) {
                debug!(%module, "already visited");
                continue;
            }
            state.visited.insert(module.clone());

            let Some(mut content) = self.load(state, &module)? else {
                continue;
            };
            let imports = mem::take(&mut content.imports);
            state.engine.merge_module(&module, content)?;
            queue.extend(imports);
        }
        Ok(())
    }

    /// Marks `module` visited, resolves its imports, then merges it.
    fn depth_first(
        &self,
        state: &mut ResolutionState,
        module: ModuleName,
    ) -> Result<(), ResolveError> {
        if state.visited.contains(&module) {
            debug!(%module, "already visited");
            return Ok(());
        }
        state.visited.insert(module.clone());

        let Some(mut content) = self.load(state, &module)? else {
            return Ok(());
        };
        for import in mem::take(&mut content.imports) {
            self.depth_first(state, import)?;
        }
        state.engine.merge_module(&module, content)
    }

    /// Locates and loads `module`. `Ok(None)` means it was missing and the
    /// policy allows skipping it.
    fn load(
        &self,
        state: &mut ResolutionState,
        module: &ModuleName,
    ) -> Result<Option<ModuleContent>, ResolveError> {
        let Some(path) = self.locator.locate(self.fs, module) else {
            return match self.policy.conflict {
                ConflictPolicy::Strict => Err(self.locator.not_found(module)),
                ConflictPolicy::Permissive => {
                    warn!(%module, "module not found, skipping");
                    state.missing.push(module.clone());
                    Ok(None)
                }
            };
        };
        info!(%module, path = %path.display(), "processing");
        loader::load(self.fs, module, &path).map(Some)
    }
}

fn finish(state: ResolutionState) -> Result<MergedDocument, ResolveError> {
    let (widgets, data, app) = state.engine.into_parts();
    if widgets.is_empty() {
        return Err(ResolveError::MissingWidgets);
    }
    let app = app.ok_or(ResolveError::MissingApp)?;
    info!(
        modules = state.visited.len(),
        widgets = widgets.len(),
        data = data.len(),
        "resolution complete"
    );
    Ok(MergedDocument {
        widgets,
        data,
        app,
        visited: state.visited,
        missing: state.missing,
    })
}

/// Convenience for the common case: resolve `main` from `search_paths`.
///
/// # Errors
///
/// See [`Resolver::resolve`].
pub fn resolve_main(
    fs: &dyn FileSystem,
    builtin_dir: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
    main: &str,
    policy: Policy,
) -> Result<MergedDocument, ResolveError> {
    Resolver::new(fs, Locator::new(builtin_dir, search_paths), policy).resolve_main(main)
}
