// src/engine/mod.rs

//! Reconciliation of tracked paths with the CVS checkout.
//!
//! The engine is driven twice per configuration run:
//! - at run start, [`SyncEngine::reconcile`] brings every candidate path
//!   under CVS and commits a `before` snapshot;
//! - at run completion, [`SyncEngine::commit_changes`] commits the paths the
//!   run actually changed.
//!
//! Both are the same two phases in sequence:
//! [`SyncEngine::ensure_tracked_and_commit_new`] then
//! [`SyncEngine::commit_tracked_delta`].

pub mod sync;

use std::collections::HashSet;

use crate::message::Phase;
use crate::paths::TrackedPath;

pub use sync::SyncEngine;

/// Paths to commit together under one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitBatch {
    pub phase: Phase,
    pub paths: Vec<TrackedPath>,
    /// Free text appended to the phase message after a blank line.
    pub annotation: Option<String>,
}

impl CommitBatch {
    /// De-duplicates `paths`, keeping first occurrences in order.
    pub fn new(phase: Phase, paths: Vec<TrackedPath>, annotation: Option<String>) -> Self {
        let mut seen = HashSet::new();
        let paths = paths
            .into_iter()
            .filter(|p| seen.insert(p.absolute().to_path_buf()))
            .collect();
        Self {
            phase,
            paths,
            annotation,
        }
    }
}

/// What one engine entry point did, as root-relative paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub dirs_added: Vec<String>,
    pub files_added: Vec<String>,
    pub committed: Vec<String>,
    /// Files the status query reported as needing a merge, by repository
    /// path when the client printed one.
    pub drifted: Vec<String>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.dirs_added.is_empty() && self.files_added.is_empty() && self.committed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn batch_dedups_in_order() {
        let root = Path::new("/etc");
        let a = TrackedPath::new(root, Path::new("/etc/a")).unwrap();
        let b = TrackedPath::new(root, Path::new("/etc/b")).unwrap();
        let batch = CommitBatch::new(Phase::After, vec![b.clone(), a.clone(), b.clone()], None);
        assert_eq!(batch.paths, vec![b, a]);
    }
}
