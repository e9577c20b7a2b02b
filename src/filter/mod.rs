// src/filter/mod.rs

//! Deciding which resource paths are eligible for tracking.
//!
//! - [`resource`] defines the view of a run-engine resource the keeper reads.
//! - [`patterns`] compiles the `[keeper].exclude` globs.
//! - [`PathFilter`] applies the eligibility rules to a batch of resources.

pub mod patterns;
pub mod resource;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::paths::{relative_str, TrackedPath};

pub use patterns::ExcludeSet;
pub use resource::{ActionTag, ResourceRecord};

/// Turns run-engine resources into the list of paths worth tracking.
#[derive(Debug, Clone)]
pub struct PathFilter {
    root: PathBuf,
    exclude: ExcludeSet,
}

impl PathFilter {
    pub fn new(root: impl Into<PathBuf>, exclude: ExcludeSet) -> Self {
        Self {
            root: root.into(),
            exclude,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Apply the eligibility rules, in order, to each resource:
    ///
    /// 1. it must expose a path,
    /// 2. strictly below the watched root,
    /// 3. its action must not be a delete,
    /// 4. its own skip predicate must not fire.
    ///
    /// Survivors then go through [`PathFilter::filter_paths`].
    pub fn filter<'a, R>(&self, resources: impl IntoIterator<Item = &'a R>) -> Vec<TrackedPath>
    where
        R: ResourceRecord + ?Sized + 'a,
    {
        let mut eligible: Vec<&Path> = Vec::new();

        for resource in resources {
            let Some(path) = resource.path() else {
                continue;
            };
            if !self.is_below_root(path) {
                trace!(path = %path.display(), "outside watched root");
                continue;
            }
            let action = resource.action();
            if action.is_delete() {
                trace!(path = %path.display(), "delete action; not tracked");
                continue;
            }
            // The record may log on its own here; nothing to add on our side.
            if resource.should_skip(action) {
                continue;
            }
            eligible.push(path);
        }

        self.filter_paths(eligible)
    }

    /// Keep paths strictly below the root, de-duplicate them (first
    /// occurrence wins) and drop those matching an exclusion glob.
    pub fn filter_paths<P: AsRef<Path>>(&self, paths: impl IntoIterator<Item = P>) -> Vec<TrackedPath> {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut candidates: Vec<TrackedPath> = paths
            .into_iter()
            .filter_map(|p| TrackedPath::new(&self.root, p.as_ref()))
            .filter(|t| seen.insert(t.absolute().to_path_buf()))
            .collect();

        candidates.retain(|candidate| {
            let excluded = self.exclude.is_match_path(candidate.absolute());
            if excluded {
                debug!(path = %candidate, "excluded by pattern");
            }
            !excluded
        });

        candidates
    }

    fn is_below_root(&self, path: &Path) -> bool {
        relative_str(&self.root, path).is_some()
    }
}
