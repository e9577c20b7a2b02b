// src/status.rs

//! Parsing `cvs status` output for drift detection.
//!
//! Only detection: a file that needs merging is reported in the log and
//! nothing else happens.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

static FILE_STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^File:\s+(?:no file\s+)?(.+?)\s+Status:\s+(.+?)\s*$")
        .expect("static regex is valid")
});

static REPOSITORY_REVISION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Repository revision:\s+\S+\s+(/.+?)(?:,v)?\s*$")
        .expect("static regex is valid")
});

/// Per-file status as reported by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    UpToDate,
    LocallyModified,
    LocallyAdded,
    NeedsPatch,
    NeedsMerge,
    Conflicts,
    Other(String),
}

impl FileStatus {
    fn parse(s: &str) -> Self {
        match s {
            "Up-to-date" => FileStatus::UpToDate,
            "Locally Modified" => FileStatus::LocallyModified,
            "Locally Added" => FileStatus::LocallyAdded,
            "Needs Patch" => FileStatus::NeedsPatch,
            "Needs Merge" => FileStatus::NeedsMerge,
            "File had conflicts on merge" | "Unresolved Conflict" => FileStatus::Conflicts,
            other => FileStatus::Other(other.to_string()),
        }
    }

    /// Local copy and upstream diverged; committing would need a merge first.
    pub fn is_drift(&self) -> bool {
        matches!(self, FileStatus::NeedsMerge | FileStatus::Conflicts)
    }
}

/// One `File:` block of status output.
///
/// The client only prints the basename on the `File:` line, so two files
/// with the same name in different directories are told apart by their
/// repository path when the block carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub file: String,
    /// Archive path from `Repository revision:`, without the `,v` suffix.
    pub repository_path: Option<String>,
    pub status: FileStatus,
}

impl StatusEntry {
    /// Repository path if known, else the basename.
    pub fn name(&self) -> &str {
        self.repository_path.as_deref().unwrap_or(&self.file)
    }
}

/// Extract every status block from the client's output, in output order.
pub fn parse_status(output: &str) -> Vec<StatusEntry> {
    let mut entries: Vec<StatusEntry> = Vec::new();
    for line in output.lines() {
        if let Some(caps) = FILE_STATUS.captures(line) {
            entries.push(StatusEntry {
                file: caps[1].to_string(),
                repository_path: None,
                status: FileStatus::parse(&caps[2]),
            });
        } else if let Some(caps) = REPOSITORY_REVISION.captures(line) {
            if let Some(entry) = entries.last_mut() {
                entry.repository_path.get_or_insert_with(|| caps[1].to_string());
            }
        }
    }
    entries
}

/// Log drifted files at warn and the rest at debug; returns the drifted names.
pub fn report_drift(output: &str) -> Vec<String> {
    let mut drifted = Vec::new();
    for entry in parse_status(output) {
        if entry.status.is_drift() {
            warn!(file = %entry.name(), status = ?entry.status, "file needs merge with upstream; left as is");
            drifted.push(entry.name().to_string());
        } else {
            debug!(file = %entry.name(), status = ?entry.status, "cvs status");
        }
    }
    drifted
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
===================================================================
File: hosts            \tStatus: Up-to-date

   Working revision:\t1.4
   Repository revision:\t1.4\t/cvs/etc/hosts,v

===================================================================
File: motd             \tStatus: Needs Merge

===================================================================
File: no file resolv.conf\t\tStatus: Needs Checkout

===================================================================
File: sshd_config      \tStatus: Locally Modified
";

    #[test]
    fn parses_status_blocks() {
        let entries = parse_status(SAMPLE);
        let summary: Vec<(&str, &FileStatus)> =
            entries.iter().map(|e| (e.name(), &e.status)).collect();
        assert_eq!(
            summary,
            vec![
                ("/cvs/etc/hosts", &FileStatus::UpToDate),
                ("motd", &FileStatus::NeedsMerge),
                ("resolv.conf", &FileStatus::Other("Needs Checkout".to_string())),
                ("sshd_config", &FileStatus::LocallyModified),
            ]
        );
        assert_eq!(entries[0].file, "hosts");
    }

    #[test]
    fn only_merge_states_are_drift() {
        assert_eq!(report_drift(SAMPLE), vec!["motd".to_string()]);
        assert!(report_drift("").is_empty());
    }

    #[test]
    fn same_basename_in_two_directories_keeps_both() {
        let output = "\
File: config           \tStatus: Needs Merge

   Working revision:\t1.2
   Repository revision:\t1.3\t/cvs/etc/ssh/config,v

File: config           \tStatus: Up-to-date

   Working revision:\t1.1
   Repository revision:\t1.1\t/cvs/etc/ssl/config,v
";
        let entries = parse_status(output);
        assert_eq!(entries.len(), 2);
        assert_eq!(report_drift(output), vec!["/cvs/etc/ssh/config".to_string()]);

        let bare = "File: config\tStatus: Needs Merge\n\nFile: config\tStatus: Up-to-date\n";
        assert_eq!(report_drift(bare), vec!["config".to_string()]);
    }
}
