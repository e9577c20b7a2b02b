// src/filter/resource.rs

use std::fmt;
use std::path::Path;

use serde::Deserialize;

/// The action a resource was asked to take.
///
/// Run engines report either a single action name or a collection of them
/// (possibly nested), so both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ActionTag {
    Name(String),
    List(Vec<ActionTag>),
}

impl ActionTag {
    pub fn name(name: impl Into<String>) -> Self {
        ActionTag::Name(name.into())
    }

    /// `delete`, or a one-element collection wrapping a delete at any depth.
    pub fn is_delete(&self) -> bool {
        match self {
            ActionTag::Name(name) => name.trim_start_matches(':') == "delete",
            ActionTag::List(items) => items.len() == 1 && items[0].is_delete(),
        }
    }
}

impl Default for ActionTag {
    fn default() -> Self {
        ActionTag::name("nothing")
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionTag::Name(name) => write!(f, "{name}"),
            ActionTag::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Read-only view of one resource from the configuration run.
///
/// The keeper only reads these during a single callback and never keeps
/// them. `Display` is used when listing updated resources in commit
/// messages (e.g. `template[/etc/motd]`).
pub trait ResourceRecord: fmt::Display {
    /// Filesystem path managed by the resource, if it has one.
    fn path(&self) -> Option<&Path>;

    fn action(&self) -> &ActionTag;

    /// Whether the run actually changed this resource.
    fn updated(&self) -> bool;

    /// The resource's own guard evaluation for `action`. May have side
    /// effects (such as logging) on the run-engine side.
    fn should_skip(&self, action: &ActionTag) -> bool;
}
