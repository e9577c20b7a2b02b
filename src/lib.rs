// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod filter;
pub mod fs;
pub mod handler;
pub mod inspect;
pub mod logging;
pub mod manifest;
pub mod message;
pub mod paths;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{info, warn};

use crate::cli::{CliArgs, Command};
use crate::config::{load_or_default, ConfigFile};
use crate::engine::{SyncEngine, SyncReport};
use crate::exec::{CommandRunner, DryRunRunner, ShellRunner, VcsClient};
use crate::filter::PathFilter;
use crate::fs::{FileSystem, RealFileSystem};
use crate::handler::{CallbackOutcome, KeeperHandler, RunEventHandler};
use crate::manifest::load_manifest;
use crate::message::{acting_user_from_env, MessageContext, Phase};
use crate::paths::TrackedPath;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the process backend (real or dry-run)
/// - the handler or bare engine, depending on the subcommand
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref())?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let runner: Box<dyn CommandRunner> = if args.dry_run {
        Box::new(DryRunRunner)
    } else {
        Box::new(ShellRunner)
    };
    let acting_user = acting_user_from_env(&cfg.keeper().acting_user_env);

    match args.command {
        Command::Replay { manifest } => {
            let manifest = load_manifest(&manifest)?;
            let mut handler = build_handler(&cfg, fs, runner, acting_user);

            let start = handler
                .on_run_start(&manifest.resources, manifest.identity())
                .await;
            log_outcome("run start", &start);
            let complete = handler.on_run_complete(&manifest.resources).await;
            log_outcome("run completion", &complete);
        }
        Command::Snapshot { host, paths } => {
            let (mut engine, files) =
                prepare_engine(&cfg, fs, runner, MessageContext::new(host, acting_user), paths)?;
            let report = engine.reconcile(&files).await?;
            log_report("snapshot", &report);
        }
        Command::Commit {
            host,
            message,
            paths,
        } => {
            let (mut engine, files) =
                prepare_engine(&cfg, fs, runner, MessageContext::new(host, acting_user), paths)?;
            let report = engine
                .commit_changes(&files, Phase::After, message.as_deref())
                .await?;
            log_report("commit", &report);
        }
    }

    Ok(())
}

/// Assemble a [`KeeperHandler`] from configuration.
pub fn build_handler(
    cfg: &ConfigFile,
    fs: Arc<dyn FileSystem>,
    runner: Box<dyn CommandRunner>,
    acting_user: Option<String>,
) -> KeeperHandler {
    let engine = build_engine(cfg, fs, runner, MessageContext::default());
    KeeperHandler::new(
        engine,
        build_filter(cfg),
        cfg.keeper().updated_resources,
        acting_user,
    )
}

/// Assemble a [`SyncEngine`] from configuration.
pub fn build_engine(
    cfg: &ConfigFile,
    fs: Arc<dyn FileSystem>,
    runner: Box<dyn CommandRunner>,
    context: MessageContext,
) -> SyncEngine {
    let client = VcsClient::from_config(cfg, Arc::clone(&fs), runner);
    SyncEngine::new(fs, client, context)
}

pub fn build_filter(cfg: &ConfigFile) -> PathFilter {
    PathFilter::new(cfg.root(), cfg.exclude().clone())
}

/// Engine plus filtered paths for the path-based subcommands.
fn prepare_engine(
    cfg: &ConfigFile,
    fs: Arc<dyn FileSystem>,
    runner: Box<dyn CommandRunner>,
    context: MessageContext,
    paths: Vec<PathBuf>,
) -> Result<(SyncEngine, Vec<TrackedPath>)> {
    let engine = build_engine(cfg, fs, runner, context);
    if !engine.inspector().is_repository() {
        bail!("{} is not a CVS checkout", cfg.root().display());
    }
    let files = build_filter(cfg).filter_paths(&paths);
    if files.len() < paths.len() {
        warn!(
            given = paths.len(),
            eligible = files.len(),
            "some paths are outside the watched root, duplicated or excluded"
        );
    }
    Ok((engine, files))
}

fn log_outcome(stage: &str, outcome: &CallbackOutcome) {
    match outcome {
        CallbackOutcome::Skipped => info!(stage, "nothing to do"),
        CallbackOutcome::Completed(report) if report.is_noop() => {
            info!(stage, drifted = report.drifted.len(), "nothing to commit")
        }
        CallbackOutcome::Completed(report) => log_report(stage, report),
        // Already logged at the callback boundary.
        CallbackOutcome::Failed(_) => {}
    }
}

fn log_report(stage: &str, report: &SyncReport) {
    info!(
        stage,
        dirs_added = report.dirs_added.len(),
        files_added = report.files_added.len(),
        committed = report.committed.len(),
        drifted = report.drifted.len(),
        "cvskeeper finished"
    );
}
