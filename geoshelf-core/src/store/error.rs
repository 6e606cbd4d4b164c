//! Errors raised by [`DocumentStore`](super::DocumentStore) operations.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::{DocumentError, DocumentId};

/// Failure of a store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage directory could not be created.
    #[error("failed to create storage directory {path}: {source}")]
    CreateDirectory {
        /// Requested storage directory.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The storage directory could not be opened.
    #[error("failed to open storage directory {path}: {source}")]
    OpenDirectory {
        /// Storage directory.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The storage directory could not be listed during a scan.
    #[error("failed to list storage directory {path}: {source}")]
    ScanDirectory {
        /// Storage directory.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The submitted text is not a valid GeoJSON document.
    #[error("invalid document: {0}")]
    Validation(#[from] DocumentError),
    /// No document is indexed under the identifier.
    #[error("document {id} not found")]
    NotFound {
        /// Identifier that was looked up.
        id: DocumentId,
    },
    /// Writing the document file failed; the index was left untouched.
    #[error("failed to write document {id} to {path}: {source}")]
    Write {
        /// Identifier being written.
        id: DocumentId,
        /// Target file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Deleting the document file failed; the index entry was restored.
    #[error("failed to remove document {id} at {path}: {source}")]
    Remove {
        /// Identifier being removed.
        id: DocumentId,
        /// File that could not be deleted.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Every generated identifier was already taken.
    #[error("no unused document identifier found after {attempts} attempts")]
    CollisionExhausted {
        /// Number of candidates tried.
        attempts: usize,
    },
}

/// Coarse classification of [`StoreError`] for callers that map errors onto
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Malformed document payload.
    Validation,
    /// Unknown identifier.
    NotFound,
    /// Filesystem failure.
    Io,
    /// Identifier generation gave up.
    CollisionExhausted,
}

impl StoreError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> StoreErrorKind {
        match self {
            Self::Validation(_) => StoreErrorKind::Validation,
            Self::NotFound { .. } => StoreErrorKind::NotFound,
            Self::CreateDirectory { .. }
            | Self::OpenDirectory { .. }
            | Self::ScanDirectory { .. }
            | Self::Write { .. }
            | Self::Remove { .. } => StoreErrorKind::Io,
            Self::CollisionExhausted { .. } => StoreErrorKind::CollisionExhausted,
        }
    }
}
