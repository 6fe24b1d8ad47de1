//! Resolution policy, expressed as data.
//!
//! One resolver serves both the strict runtime loader and the permissive
//! documentation aggregator; the differences between them are the values of
//! a [`Policy`].

use clap::ValueEnum;

use crate::module::ModuleName;

/// Name of the bootstrap module seeded by [`Policy::runtime`].
pub const BUILTIN_MODULE: &str = "builtin";

/// What happens when two modules contribute the same key or a second app block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConflictPolicy {
    /// Duplicates and missing modules are fatal.
    Strict,
    /// Duplicates are resolved by traversal order and logged; missing modules
    /// are logged and skipped.
    Permissive,
}

/// Order in which the import graph is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Traversal {
    /// FIFO queue: every module at import depth k merges before depth k+1.
    BreadthFirst,
    /// A module's imports are fully resolved before its own contributions
    /// merge.
    DepthFirst,
}

/// How widget keys are stored in the merged document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Namespacing {
    /// Keys become `<module>.<widget>`.
    Qualified,
    /// Keys are stored bare.
    Flat,
}

/// How the merge engine treats a key that is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateRule {
    /// Fail with a duplicate-definition error.
    Reject,
    /// Keep the definition merged first and log the later one.
    KeepFirst,
    /// Replace the earlier definition and log the overwrite.
    Replace,
}

/// How the merge engine treats a second `app` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRule {
    /// Fail with a duplicate-app error.
    Reject,
    /// Keep the first app block and log the later one.
    KeepFirst,
    /// Replace the earlier app block and log the overwrite.
    Replace,
}

/// Complete policy for one resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Conflict handling.
    pub conflict: ConflictPolicy,
    /// Graph walk order.
    pub traversal: Traversal,
    /// Widget key namespacing.
    pub namespacing: Namespacing,
    /// Module seeded alongside the caller's seeds, if any.
    pub bootstrap: Option<ModuleName>,
}

impl Policy {
    /// Strict, breadth-first, qualified, with the `builtin` bootstrap module.
    ///
    /// Matches what a rendering runtime needs: every problem is fatal and
    /// widget keys can never collide across modules.
    #[must_use]
    pub fn runtime() -> Self {
        Self {
            conflict: ConflictPolicy::Strict,
            traversal: Traversal::BreadthFirst,
            namespacing: Namespacing::Qualified,
            bootstrap: Some(ModuleName::from_static(BUILTIN_MODULE)),
        }
    }

    /// Permissive, depth-first, flat, no bootstrap module.
    ///
    /// Matches documentation aggregation: a best-effort single file where
    /// ancestors override their dependencies.
    #[must_use]
    pub fn aggregate() -> Self {
        Self {
            conflict: ConflictPolicy::Permissive,
            traversal: Traversal::DepthFirst,
            namespacing: Namespacing::Flat,
            bootstrap: None,
        }
    }

    /// Rule applied to duplicate widget and data keys.
    ///
    /// Permissive breadth-first keeps the nearest import's definition;
    /// permissive depth-first lets the later-merged module win.
    #[must_use]
    pub fn duplicate_rule(&self) -> DuplicateRule {
        match (self.conflict, self.traversal) {
            (ConflictPolicy::Strict, _) => DuplicateRule::Reject,
            (ConflictPolicy::Permissive, Traversal::BreadthFirst) => DuplicateRule::KeepFirst,
            (ConflictPolicy::Permissive, Traversal::DepthFirst) => DuplicateRule::Replace,
        }
    }

    /// Rule applied to a second `app` block.
    ///
    /// Permissive mode picks the same winner as [`Self::duplicate_rule`]:
    /// the nearest app block breadth-first, the later-merged one depth-first.
    #[must_use]
    pub fn app_rule(&self) -> AppRule {
        match self.duplicate_rule() {
            DuplicateRule::Reject => AppRule::Reject,
            DuplicateRule::KeepFirst => AppRule::KeepFirst,
            DuplicateRule::Replace => AppRule::Replace,
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::runtime()
    }
}
