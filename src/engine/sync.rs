// src/engine/sync.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::engine::{CommitBatch, SyncReport};
use crate::errors::Result;
use crate::exec::VcsClient;
use crate::fs::FileSystem;
use crate::inspect::RepositoryInspector;
use crate::message::{self, MessageContext, Phase};
use crate::paths::{ancestor_dirs, relative_str, TrackedPath};
use crate::status;

/// Drives the CVS client so that the given paths end up tracked and
/// committed.
///
/// Filesystem state is re-checked right before each client call: a path that
/// vanished or turned into a symlink since filtering is silently dropped.
/// Any client failure aborts the current entry point.
pub struct SyncEngine {
    fs: Arc<dyn FileSystem>,
    inspector: RepositoryInspector,
    client: VcsClient,
    context: MessageContext,
}

impl SyncEngine {
    pub fn new(fs: Arc<dyn FileSystem>, client: VcsClient, context: MessageContext) -> Self {
        let inspector = RepositoryInspector::new(Arc::clone(&fs), client.root());
        Self {
            fs,
            inspector,
            client,
            context,
        }
    }

    pub fn root(&self) -> &Path {
        self.inspector.root()
    }

    pub fn inspector(&self) -> &RepositoryInspector {
        &self.inspector
    }

    pub fn set_context(&mut self, context: MessageContext) {
        self.context = context;
    }

    /// Run-start entry point: track everything configuration management
    /// cares about, then snapshot the already-tracked files as `before`.
    pub async fn reconcile(&mut self, files: &[TrackedPath]) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        let remaining = self
            .ensure_tracked_and_commit_new(files, None, &mut report)
            .await?;
        let batch = CommitBatch::new(Phase::Before, remaining, None);
        report.committed = self.commit_tracked_delta(&batch).await?;
        Ok(report)
    }

    /// Run-completion entry point: files new to CVS are added and committed
    /// under a "new files" message first, then the rest are committed under
    /// `phase`.
    pub async fn commit_changes(
        &mut self,
        files: &[TrackedPath],
        phase: Phase,
        extra_message: Option<&str>,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        let new_files_message =
            message::compose(&message::new_files_cause(phase), &self.context, extra_message);
        let remaining = self
            .ensure_tracked_and_commit_new(files, Some(&new_files_message), &mut report)
            .await?;
        let batch = CommitBatch::new(phase, remaining, extra_message.map(str::to_string));
        report.committed = self.commit_tracked_delta(&batch).await?;
        Ok(report)
    }

    /// Make sure ancestors are tracked, surface drift, then add and commit
    /// files CVS does not know yet.
    ///
    /// New files are committed with `override_message` if given, otherwise
    /// with the initial-add message. Returns the files that were not added
    /// here, for the caller to commit as a delta.
    pub async fn ensure_tracked_and_commit_new(
        &mut self,
        files: &[TrackedPath],
        override_message: Option<&str>,
        report: &mut SyncReport,
    ) -> Result<Vec<TrackedPath>> {
        report.dirs_added = self.ensure_ancestors_tracked(files).await?;
        report.drifted = self.check_upstream(files).await?;

        let (new, remaining): (Vec<&TrackedPath>, Vec<&TrackedPath>) = files
            .iter()
            .partition(|f| self.is_usable(f.absolute()) && !self.inspector.is_tracked(f.absolute()));

        if !new.is_empty() {
            let rel: Vec<String> = new.iter().map(|f| f.relative().to_string()).collect();
            let commit_message = match override_message {
                Some(m) => m.to_string(),
                None => message::compose(&message::cause(Phase::InitialAdd), &self.context, None),
            };
            self.client.add(&rel).await?;
            self.client.commit(&rel, &commit_message).await?;
            info!(count = rel.len(), "added new files to CVS");
            report.files_added = rel;
        }

        Ok(remaining.into_iter().cloned().collect())
    }

    /// Commit the batch's existing, non-symlink files in one local commit.
    /// Returns the committed relative paths; empty means nothing was run.
    pub async fn commit_tracked_delta(&mut self, batch: &CommitBatch) -> Result<Vec<String>> {
        let rel: Vec<String> = batch
            .paths
            .iter()
            .filter(|f| self.is_usable(f.absolute()))
            .map(|f| f.relative().to_string())
            .collect();

        if rel.is_empty() {
            debug!(phase = %batch.phase, "nothing to commit");
            return Ok(rel);
        }

        let commit_message = message::compose(
            &message::cause(batch.phase),
            &self.context,
            batch.annotation.as_deref(),
        );
        self.client.commit(&rel, &commit_message).await?;
        Ok(rel)
    }

    /// Add every missing ancestor directory, outermost first, in one
    /// non-committing add.
    async fn ensure_ancestors_tracked(&mut self, files: &[TrackedPath]) -> Result<Vec<String>> {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let dirs: Vec<String> = files
            .iter()
            .flat_map(|f| ancestor_dirs(self.root(), f.absolute()))
            .filter(|d| seen.insert(d.clone()))
            .filter(|d| self.fs.is_dir(d) && !self.fs.is_symlink(d))
            .filter(|d| !self.inspector.is_tracked(d) && !self.inspector.has_metadata(d))
            .filter_map(|d| relative_str(self.root(), &d))
            .collect();

        if dirs.is_empty() {
            return Ok(dirs);
        }

        self.client.add(&dirs).await?;
        // The client only rewrites the parents' CVS/Entries for new
        // directories once a status query runs; the output is not needed.
        self.client.status(&[]).await?;
        Ok(dirs)
    }

    /// Query status of the tracked files and log any that need merging.
    async fn check_upstream(&mut self, files: &[TrackedPath]) -> Result<Vec<String>> {
        let rel: Vec<String> = files
            .iter()
            .filter(|f| self.is_usable(f.absolute()) && self.inspector.is_tracked(f.absolute()))
            .map(|f| f.relative().to_string())
            .collect();

        if rel.is_empty() {
            return Ok(Vec::new());
        }

        let result = self.client.status(&rel).await?;
        Ok(status::report_drift(&result.stdout))
    }

    fn is_usable(&self, path: &Path) -> bool {
        self.fs.exists(path) && !self.fs.is_symlink(path)
    }
}
