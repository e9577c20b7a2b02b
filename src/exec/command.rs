// src/exec/command.rs

//! Building the shell scripts handed to the CVS client.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// One CVS subcommand with its root-relative operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsOp {
    /// `cvs add <paths>`; never commits on its own.
    Add { paths: Vec<String> },
    /// `cvs ci -l -m <message> <paths>`.
    Commit { paths: Vec<String>, message: String },
    /// `cvs status [paths]`; an empty list queries the whole checkout.
    Status { paths: Vec<String> },
}

impl VcsOp {
    /// Short name used in logs and by test doubles.
    pub fn kind(&self) -> &'static str {
        match self {
            VcsOp::Add { .. } => "add",
            VcsOp::Commit { .. } => "commit",
            VcsOp::Status { .. } => "status",
        }
    }

    pub fn paths(&self) -> &[String] {
        match self {
            VcsOp::Add { paths } | VcsOp::Commit { paths, .. } | VcsOp::Status { paths } => paths,
        }
    }

    /// Render as a command line for `binary`, quoting every operand.
    pub fn command_line(&self, binary: &str) -> String {
        let mut words = vec![shell_quote(binary)];
        match self {
            VcsOp::Add { .. } => words.push("add".to_string()),
            VcsOp::Commit { message, .. } => {
                words.push("ci".to_string());
                words.push("-l".to_string());
                words.push("-m".to_string());
                words.push(shell_quote(message));
            }
            VcsOp::Status { .. } => words.push("status".to_string()),
        }
        words.extend(self.paths().iter().map(|p| shell_quote(p)));
        words.join(" ")
    }
}

impl fmt::Display for VcsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.paths().join(" "))
    }
}

/// Everything a [`CommandRunner`](super::CommandRunner) needs to execute one op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub op: VcsOp,
    /// Full `sh -c` script, strict mode and umask included.
    pub script: String,
    pub env: BTreeMap<String, String>,
    pub cwd: PathBuf,
}

/// Compose the script: strict mode first so any failing step aborts, then
/// the file-creation mask, then the command itself.
pub fn build_script(umask: u32, command_line: &str) -> String {
    format!("set -ex; umask {umask:03o}; {command_line}")
}

/// Single-quote `s` for POSIX `sh`.
pub fn shell_quote(s: &str) -> String {
    if !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '+' | ':' | ','))
    {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r"'\''"))
}
