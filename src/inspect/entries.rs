// src/inspect/entries.rs

//! Parsing of `CVS/Entries` lines.
//!
//! Each line looks like `/name/revision/timestamp/options/tagdate` for a file
//! or `D/name////` for a subdirectory. Only the first two fields matter here.

/// Kind of entry recorded in `CVS/Entries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One parsed `CVS/Entries` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord<'a> {
    pub kind: EntryKind,
    pub name: &'a str,
}

/// Parse a single line; blank lines and a bare `D` (the "no subdirs"
/// marker) yield `None`.
pub fn parse_line(line: &str) -> Option<EntryRecord<'_>> {
    let mut fields = line.trim_end_matches(['\r', '\n']).split('/');
    let marker = fields.next()?;
    let name = fields.next()?;
    if name.is_empty() {
        return None;
    }
    let kind = if marker == "D" {
        EntryKind::Directory
    } else {
        EntryKind::File
    };
    Some(EntryRecord { kind, name })
}

/// True if `entries` lists `name` with the given kind. Stops at the first hit.
pub fn contains(entries: &str, name: &str, kind: EntryKind) -> bool {
    entries
        .lines()
        .filter_map(parse_line)
        .any(|record| record.kind == kind && record.name == name)
}
