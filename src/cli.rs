// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `cvskeeper`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cvskeeper",
    version,
    about = "Keep configuration files under CVS across configuration-management runs.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `/etc/cvskeeper.toml` is used when present, otherwise
    /// built-in defaults apply.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CVSKEEPER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Log the CVS commands that would run instead of running them.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Replay a recorded run: run-start followed by run-completion.
    Replay {
        /// Run manifest (TOML) listing the run's resources.
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
    },

    /// Bring the given paths under CVS and commit a `before` snapshot.
    Snapshot {
        /// Host name recorded in commit messages.
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,
    },

    /// Commit changes to the given paths as an `after` snapshot.
    Commit {
        /// Host name recorded in commit messages.
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        /// Extra text appended to the commit message.
        #[arg(long, short = 'm', value_name = "TEXT")]
        message: Option<String>,

        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
