//! Reconciliation scan over the storage directory.
//!
//! Each directory entry yields exactly one [`ScanOutcome`]. A bad entry is
//! recorded and logged, never raised, so one corrupt file cannot stop the
//! rest of the directory from loading.

use std::{collections::HashMap, fmt, io};

use camino::Utf8Path;
use cap_std::fs_utf8;
use log::{debug, info, warn};

use crate::{Document, DocumentError, DocumentId};

/// Placeholder for entries whose name could not be read.
const UNNAMED_ENTRY: &str = "<unreadable name>";

/// Why an entry was left out of the index.
#[derive(Debug)]
pub enum SkipReason {
    /// The entry is a directory or another non-regular file.
    NotAFile,
    /// The file name is not a canonical document identifier.
    InvalidName,
    /// The entry could not be inspected or read, for example for lack of
    /// permission.
    Unreadable(io::Error),
    /// The file content is not a valid GeoJSON document.
    InvalidDocument(DocumentError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAFile => f.write_str("not a regular file"),
            Self::InvalidName => f.write_str("name is not a document identifier"),
            Self::Unreadable(err) => write!(f, "unreadable: {err}"),
            Self::InvalidDocument(err) => write!(f, "{err}"),
        }
    }
}

/// Result of scanning one directory entry.
#[derive(Debug)]
pub enum ScanOutcome {
    /// The entry was parsed and indexed.
    Loaded(DocumentId),
    /// The entry was ignored.
    Skipped {
        /// Entry name as found in the directory.
        name: String,
        /// Why it was ignored.
        reason: SkipReason,
    },
}

/// Per-entry outcomes of one reconciliation scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    outcomes: Vec<ScanOutcome>,
}

impl ScanReport {
    /// Every outcome in directory listing order.
    #[must_use]
    pub fn outcomes(&self) -> &[ScanOutcome] {
        &self.outcomes
    }

    /// Identifiers that made it into the index.
    pub fn loaded(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            ScanOutcome::Loaded(id) => Some(*id),
            ScanOutcome::Skipped { .. } => None,
        })
    }

    /// Names and reasons of ignored entries.
    pub fn skipped(&self) -> impl Iterator<Item = (&str, &SkipReason)> + '_ {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            ScanOutcome::Loaded(_) => None,
            ScanOutcome::Skipped { name, reason } => Some((name.as_str(), reason)),
        })
    }

    /// Number of indexed documents.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.loaded().count()
    }

    /// Number of ignored entries.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.loaded_count()
    }
}

/// Scan `dir`, inserting every valid document into `index`.
///
/// Only a failure to list the directory itself is an error.
pub(super) fn scan_directory(
    dir: &fs_utf8::Dir,
    root: &Utf8Path,
    index: &mut HashMap<DocumentId, Document>,
) -> io::Result<ScanReport> {
    let mut report = ScanReport::default();
    for entry in dir.entries()? {
        let outcome = match entry {
            Ok(entry) => scan_entry(dir, &entry, index),
            Err(source) => skipped(UNNAMED_ENTRY, SkipReason::Unreadable(source)),
        };
        log_outcome(root, &outcome);
        report.outcomes.push(outcome);
    }
    Ok(report)
}

fn scan_entry(
    dir: &fs_utf8::Dir,
    entry: &fs_utf8::DirEntry,
    index: &mut HashMap<DocumentId, Document>,
) -> ScanOutcome {
    let Ok(name) = entry.file_name() else {
        return skipped(UNNAMED_ENTRY, SkipReason::InvalidName);
    };
    match dir.metadata(&name) {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => return skipped(name, SkipReason::NotAFile),
        Err(source) => return skipped(name, SkipReason::Unreadable(source)),
    }
    let Some(id) = DocumentId::from_file_name(&name) else {
        return skipped(name, SkipReason::InvalidName);
    };
    let text = match dir.read_to_string(&name) {
        Ok(text) => text,
        Err(source) => return skipped(name, SkipReason::Unreadable(source)),
    };
    match Document::parse(&text) {
        Ok(document) => {
            index.insert(id, document);
            ScanOutcome::Loaded(id)
        }
        Err(err) => skipped(name, SkipReason::InvalidDocument(err)),
    }
}

fn skipped(name: impl Into<String>, reason: SkipReason) -> ScanOutcome {
    ScanOutcome::Skipped {
        name: name.into(),
        reason,
    }
}

fn log_outcome(root: &Utf8Path, outcome: &ScanOutcome) {
    match outcome {
        ScanOutcome::Loaded(id) => info!("mapped {}", root.join(id.to_string())),
        ScanOutcome::Skipped {
            name,
            reason: SkipReason::InvalidDocument(err),
        } => warn!("unable to parse GeoJSON {}: {err}", root.join(name)),
        ScanOutcome::Skipped { name, reason } => debug!("skipped {}: {reason}", root.join(name)),
    }
}
