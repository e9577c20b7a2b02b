// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The [`VcsClient`](super::VcsClient) talks to a `CommandRunner` instead of
//! spawning processes itself. This makes it easy to swap in a fake in tests
//! while keeping the production implementation here.
//!
//! - `ShellRunner` runs the script through `sh -c` with `tokio::process`.
//! - `DryRunRunner` prints the script and reports success.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::info;

use crate::errors::{KeeperError, Result};

use super::command::Invocation;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Exit status and captured output of one client invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

/// Trait abstracting how client invocations are executed.
///
/// Implementations return `Ok` for any process that ran, whatever its exit
/// status; classifying failure is the caller's job. `Err` is reserved for
/// not being able to run the process at all.
pub trait CommandRunner: Send {
    fn run<'a>(&'a mut self, invocation: &'a Invocation) -> BoxFuture<'a, Result<CommandResult>>;
}

/// Real backend used in production.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run<'a>(&'a mut self, invocation: &'a Invocation) -> BoxFuture<'a, Result<CommandResult>> {
        Box::pin(async move {
            let output = Command::new("sh")
                .arg("-c")
                .arg(&invocation.script)
                .current_dir(&invocation.cwd)
                .envs(&invocation.env)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await?;

            Ok::<_, KeeperError>(CommandResult {
                status: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        })
    }
}

/// Backend for `--dry-run`: prints each script to stdout instead of running it.
#[derive(Debug, Clone, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run<'a>(&'a mut self, invocation: &'a Invocation) -> BoxFuture<'a, Result<CommandResult>> {
        Box::pin(async move {
            info!(op = invocation.op.kind(), "dry-run: not executing");
            println!("(cd {} && {})", invocation.cwd.display(), invocation.script);
            Ok::<_, KeeperError>(CommandResult::default())
        })
    }
}
