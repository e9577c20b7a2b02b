// src/exec/client.rs

//! The CVS client facade used by the sync engine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ConfigFile;
use crate::errors::{KeeperError, Result};
use crate::fs::FileSystem;

use super::backend::{CommandResult, CommandRunner};
use super::command::{build_script, Invocation, VcsOp};

/// Environment variable CVS consults for its remote shell.
pub const CVS_RSH_VAR: &str = "CVS_RSH";

/// Issues `add` / `commit` / `status` through a [`CommandRunner`].
///
/// Every invocation runs from the watched root under the configured umask
/// and strict shell mode. A non-zero exit becomes
/// [`KeeperError::VcsCommand`].
pub struct VcsClient {
    runner: Box<dyn CommandRunner>,
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    binary: String,
    umask: u32,
    wrapper: Option<PathBuf>,
}

impl VcsClient {
    pub fn new(
        runner: Box<dyn CommandRunner>,
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
        binary: impl Into<String>,
        umask: u32,
        wrapper: Option<PathBuf>,
    ) -> Self {
        Self {
            runner,
            fs,
            root: root.into(),
            binary: binary.into(),
            umask,
            wrapper,
        }
    }

    pub fn from_config(
        cfg: &ConfigFile,
        fs: Arc<dyn FileSystem>,
        runner: Box<dyn CommandRunner>,
    ) -> Self {
        Self::new(
            runner,
            fs,
            cfg.root(),
            cfg.cvs().binary.clone(),
            cfg.umask(),
            cfg.cvs().cvswrapper.clone(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Schedule `paths` for addition. Does not commit.
    pub async fn add(&mut self, paths: &[String]) -> Result<CommandResult> {
        warn!(paths = %paths.join(", "), "adding to CVS");
        self.execute(VcsOp::Add {
            paths: paths.to_vec(),
        })
        .await
    }

    /// Commit `paths` (non-recursive) with `message`.
    pub async fn commit(&mut self, paths: &[String], message: &str) -> Result<CommandResult> {
        warn!(paths = %paths.join(", "), "committing to CVS");
        self.execute(VcsOp::Commit {
            paths: paths.to_vec(),
            message: message.to_string(),
        })
        .await
    }

    /// Query status for `paths`, or for the whole checkout if empty.
    pub async fn status(&mut self, paths: &[String]) -> Result<CommandResult> {
        self.execute(VcsOp::Status {
            paths: paths.to_vec(),
        })
        .await
    }

    async fn execute(&mut self, op: VcsOp) -> Result<CommandResult> {
        let invocation = self.invocation(op);
        let result = self.runner.run(&invocation).await?;

        debug!(
            command = %invocation.script,
            exit_code = result.status,
            stdout = %result.stdout,
            stderr = %result.stderr,
            "cvs command finished"
        );

        if !result.is_success() {
            return Err(KeeperError::VcsCommand {
                command: invocation.script,
                status: result.status,
                stdout: result.stdout,
                stderr: result.stderr,
            });
        }
        Ok(result)
    }

    fn invocation(&self, op: VcsOp) -> Invocation {
        let script = build_script(self.umask, &op.command_line(&self.binary));
        Invocation {
            op,
            script,
            env: self.environment(),
            cwd: self.root.clone(),
        }
    }

    /// `CVS_RSH` is set only when the configured wrapper actually exists.
    fn environment(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        if let Some(wrapper) = &self.wrapper {
            if self.fs.exists(wrapper) {
                env.insert(CVS_RSH_VAR.to_string(), wrapper.to_string_lossy().into_owned());
            } else {
                debug!(wrapper = %wrapper.display(), "configured cvswrapper missing; not setting CVS_RSH");
            }
        }
        env
    }
}
