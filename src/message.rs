// src/message.rs

//! Commit message synthesis.

use std::fmt;

/// Why a commit is being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Baseline snapshot taken when a run starts.
    Before,
    /// Delta committed when a run completes.
    After,
    /// First commit of a file that was just added.
    InitialAdd,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Before => "before",
            Phase::After => "after",
            Phase::InitialAdd => "initial-add",
        };
        f.write_str(s)
    }
}

/// Who and where, attached to every message.
///
/// Built once by the outermost caller (the acting user typically comes from
/// `SUDO_USER`) and passed down, so message construction never reads the
/// environment itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageContext {
    pub host: Option<String>,
    pub acting_user: Option<String>,
}

impl MessageContext {
    pub fn new(host: Option<String>, acting_user: Option<String>) -> Self {
        Self { host, acting_user }
    }
}

/// Read the acting user from `var` (e.g. `SUDO_USER`), ignoring empty values.
///
/// Only the outermost caller should use this.
pub fn acting_user_from_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|u| !u.trim().is_empty())
}

/// `- <cause>[ on <host>][ (on behalf of <user>)]`
pub fn build(cause: &str, host: Option<&str>, acting_user: Option<&str>) -> String {
    let mut message = format!("- {cause}");
    if let Some(host) = host {
        message.push_str(" on ");
        message.push_str(host);
    }
    if let Some(user) = acting_user {
        message.push_str(" (on behalf of ");
        message.push_str(user);
        message.push(')');
    }
    message
}

/// Cause line for a phase.
pub fn cause(phase: Phase) -> String {
    match phase {
        Phase::InitialAdd => "Initial add from automated run".to_string(),
        other => format!("Changes {other} automated run"),
    }
}

/// Cause line for files that first appear in a `phase` commit batch.
pub fn new_files_cause(phase: Phase) -> String {
    format!("New files added {phase} automated run")
}

/// Join message parts with a blank line, skipping empty parts.
pub fn join<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .filter(|p| !p.as_ref().trim().is_empty())
        .map(|p| p.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Full message for `cause` in `ctx`, followed by an optional annotation.
pub fn compose(cause: &str, ctx: &MessageContext, extra: Option<&str>) -> String {
    let head = build(cause, ctx.host.as_deref(), ctx.acting_user.as_deref());
    join(std::iter::once(head.as_str()).chain(extra))
}

/// `Updated resources:` followed by one bullet per resource.
pub fn resource_summary<I, D>(resources: I) -> String
where
    I: IntoIterator<Item = D>,
    D: fmt::Display,
{
    let mut lines = vec!["Updated resources:".to_string()];
    lines.extend(resources.into_iter().map(|r| format!("* {r}")));
    lines.join("\n")
}
