// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] renders CVS subcommands into strict-mode shell scripts.
//! - [`backend`] provides the `CommandRunner` trait with the real
//!   `tokio::process` implementation and a dry-run one.
//! - [`client`] is the `VcsClient` facade: environment, working directory,
//!   logging and success classification.

pub mod backend;
pub mod client;
pub mod command;

pub use backend::{BoxFuture, CommandResult, CommandRunner, DryRunRunner, ShellRunner};
pub use client::VcsClient;
pub use command::{Invocation, VcsOp};
