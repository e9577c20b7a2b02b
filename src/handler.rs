// src/handler.rs

//! Integration surface for the configuration-run engine.
//!
//! The run engine calls [`RunEventHandler::on_run_start`] once convergence
//! begins and [`RunEventHandler::on_run_complete`] once it ends. Both are
//! best-effort: failures are logged and swallowed so that version control
//! can never block a configuration run.

use tracing::{debug, warn};

use crate::engine::{SyncEngine, SyncReport};
use crate::errors::KeeperError;
use crate::exec::BoxFuture;
use crate::filter::{PathFilter, ResourceRecord};
use crate::message::{self, MessageContext, Phase};
use crate::paths::TrackedPath;

/// Identity of the run, captured at start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunIdentity {
    /// Node (host) name the run converges.
    pub node: Option<String>,
}

/// How a callback ended. Informational only; nothing is ever re-raised.
#[derive(Debug)]
pub enum CallbackOutcome {
    /// Nothing to do (no CVS checkout, no prior start, or no paths).
    Skipped,
    Completed(SyncReport),
    /// The engine failed; the error has already been logged.
    Failed(KeeperError),
}

impl CallbackOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, CallbackOutcome::Failed(_))
    }
}

/// The two callbacks a configuration-run engine drives.
pub trait RunEventHandler {
    /// `resources` is every resource the run knows about.
    fn on_run_start<R: ResourceRecord>(
        &mut self,
        resources: &[R],
        identity: RunIdentity,
    ) -> BoxFuture<'_, CallbackOutcome>;

    /// `resources` is the same collection after convergence; only those
    /// marked updated are considered.
    fn on_run_complete<R: ResourceRecord>(&mut self, resources: &[R])
    -> BoxFuture<'_, CallbackOutcome>;
}

/// State captured at run start and consumed at run completion.
#[derive(Debug, Clone)]
struct RunContext {
    identity: RunIdentity,
}

/// [`RunEventHandler`] that keeps the watched root under CVS.
pub struct KeeperHandler {
    engine: SyncEngine,
    filter: PathFilter,
    include_summary: bool,
    acting_user: Option<String>,
    run: Option<RunContext>,
}

impl KeeperHandler {
    /// `acting_user` is resolved once by the caller (usually from
    /// `SUDO_USER`) and attached to every commit message of the run.
    pub fn new(
        engine: SyncEngine,
        filter: PathFilter,
        include_summary: bool,
        acting_user: Option<String>,
    ) -> Self {
        Self {
            engine,
            filter,
            include_summary,
            acting_user,
            run: None,
        }
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    /// Whether a run start was captured and not yet completed.
    pub fn has_active_run(&self) -> bool {
        self.run.is_some()
    }
}

impl RunEventHandler for KeeperHandler {
    fn on_run_start<R: ResourceRecord>(
        &mut self,
        resources: &[R],
        identity: RunIdentity,
    ) -> BoxFuture<'_, CallbackOutcome> {
        self.run = None;

        if !self.engine.inspector().is_repository() {
            debug!(
                root = %self.engine.root().display(),
                "watched root is not a CVS checkout; skipping this run"
            );
            return skipped();
        }

        self.engine.set_context(MessageContext::new(
            identity.node.clone(),
            self.acting_user.clone(),
        ));
        self.run = Some(RunContext { identity });
        let files = self.filter.filter(resources);
        debug!(count = files.len(), "eligible paths at run start");

        self.start(files)
    }

    fn on_run_complete<R: ResourceRecord>(
        &mut self,
        resources: &[R],
    ) -> BoxFuture<'_, CallbackOutcome> {
        let Some(run) = self.run.take() else {
            debug!("no run start captured; skipping run completion");
            return skipped();
        };

        let updated: Vec<&R> = resources.iter().filter(|r| r.updated()).collect();
        let files = self.filter.filter(updated.iter().copied());
        if files.is_empty() {
            debug!(node = ?run.identity.node, "no tracked paths updated in this run");
            return skipped();
        }

        let annotation = self
            .include_summary
            .then(|| message::resource_summary(updated.iter()));

        self.complete(files, annotation)
    }
}

// The futures are built outside the generic callbacks so they do not
// capture the resource type.
impl KeeperHandler {
    fn start(&mut self, files: Vec<TrackedPath>) -> BoxFuture<'_, CallbackOutcome> {
        Box::pin(async move {
            match self.engine.reconcile(&files).await {
                Ok(report) => CallbackOutcome::Completed(report),
                Err(err) => log_failure("on_run_start", err),
            }
        })
    }

    fn complete(
        &mut self,
        files: Vec<TrackedPath>,
        annotation: Option<String>,
    ) -> BoxFuture<'_, CallbackOutcome> {
        Box::pin(async move {
            match self
                .engine
                .commit_changes(&files, Phase::After, annotation.as_deref())
                .await
            {
                Ok(report) => CallbackOutcome::Completed(report),
                Err(err) => log_failure("on_run_complete", err),
            }
        })
    }
}

fn skipped() -> BoxFuture<'static, CallbackOutcome> {
    Box::pin(std::future::ready(CallbackOutcome::Skipped))
}

fn log_failure(callback: &'static str, err: KeeperError) -> CallbackOutcome {
    warn!(callback, error = %error_chain(&err), "cvskeeper failed; configuration run continues");
    CallbackOutcome::Failed(err)
}

/// The error with every cause it wraps, outermost first.
fn error_chain(err: &KeeperError) -> String {
    match err {
        KeeperError::Other(inner) => format!("{inner:#}"),
        other => other.to_string(),
    }
}
