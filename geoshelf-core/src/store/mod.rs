//! Disk-backed document store.
//!
//! [`DocumentStore`] keeps one file per document in its storage directory and
//! an in-memory index rebuilt from those files. The files are the source of
//! truth; the index is a cache kept in lockstep with them. Every public
//! operation holds the store's single mutex for its whole duration, so the
//! operations are mutually exclusive and each one observes and leaves the
//! index and the directory consistent with each other.

use std::{collections::HashMap, fmt, io};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8;
use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::{Document, DocumentId, IdSource, RandomIdSource};

mod error;
mod scan;

pub use error::{StoreError, StoreErrorKind};
pub use scan::{ScanOutcome, ScanReport, SkipReason};

/// How many generated identifiers [`DocumentStore::add`] tries before giving
/// up with [`StoreError::CollisionExhausted`].
pub const MAX_ID_ATTEMPTS: usize = 16;

type Index = HashMap<DocumentId, Document>;

/// Concurrent store of GeoJSON documents keyed by [`DocumentId`].
///
/// The store is `Send + Sync`; share it between request handlers with an
/// `Arc`.
///
/// # Examples
///
/// ```no_run
/// use geoshelf_core::DocumentStore;
///
/// # fn main() -> Result<(), geoshelf_core::StoreError> {
/// let store = DocumentStore::open("tmp/storage")?;
/// let id = store.add(r#"{"type": "FeatureCollection", "features": []}"#, None)?;
/// assert!(store.list_identifiers().contains(&id));
/// # Ok(())
/// # }
/// ```
pub struct DocumentStore {
    root: Utf8PathBuf,
    index: Mutex<Index>,
    ids: Box<dyn IdSource>,
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("root", &self.root)
            .field("entries", &self.index.try_lock().map(|index| index.len()))
            .finish_non_exhaustive()
    }
}

impl DocumentStore {
    /// Open the store rooted at `path`, creating the directory when missing,
    /// and load every valid document found there.
    pub fn open<P>(path: P) -> Result<Self, StoreError>
    where
        P: AsRef<Utf8Path>,
    {
        Self::open_with_id_source(path, RandomIdSource)
    }

    /// Like [`DocumentStore::open`], drawing new identifiers from `ids`.
    pub fn open_with_id_source<P, S>(path: P, ids: S) -> Result<Self, StoreError>
    where
        P: AsRef<Utf8Path>,
        S: IdSource + 'static,
    {
        let root = path.as_ref().to_path_buf();
        geoshelf_fs::ensure_dir(&root).map_err(|source| StoreError::CreateDirectory {
            path: root.clone(),
            source,
        })?;
        let store = Self {
            root,
            index: Mutex::new(HashMap::new()),
            ids: Box::new(ids),
        };
        store.reload()?;
        Ok(store)
    }

    /// Storage directory.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.root
    }

    /// File that holds (or would hold) the document `id`.
    #[must_use]
    pub fn document_path(&self, id: DocumentId) -> Utf8PathBuf {
        self.root.join(id.to_string())
    }

    /// Rebuild the index from the storage directory.
    ///
    /// Entries with a non-identifier name, unreadable content or invalid
    /// GeoJSON are left out of the index and recorded in the returned report.
    /// Only a failure to open or list the directory is an error, in which case
    /// the index is left empty.
    pub fn reload(&self) -> Result<ScanReport, StoreError> {
        let mut index = self.index.lock();
        index.clear();
        info!("scanning {} for GeoJSON documents", self.root);
        let dir = self.open_dir()?;
        let report = scan::scan_directory(&dir, &self.root, &mut index).map_err(|source| {
            StoreError::ScanDirectory {
                path: self.root.clone(),
                source,
            }
        })?;
        info!(
            "indexed {} documents from {} ({} entries skipped)",
            report.loaded_count(),
            self.root,
            report.skipped_count()
        );
        Ok(report)
    }

    /// Create or replace a document.
    ///
    /// `content` is validated, then written verbatim to the document's file,
    /// then indexed. Without `id` a fresh identifier is generated. Nothing is
    /// written or indexed when validation fails. The text is staged in a
    /// hidden sibling file and renamed into place, so a failed write leaves
    /// both the index and any previous file untouched.
    pub fn add(&self, content: &str, id: Option<DocumentId>) -> Result<DocumentId, StoreError> {
        let mut index = self.index.lock();
        let document = Document::parse(content)?;
        let target = match id {
            Some(id) => id,
            None => self.fresh_id(&index)?,
        };
        let path = self.document_path(target);
        let dir = self.open_dir()?;
        write_replacing(&dir, target, content).map_err(|source| StoreError::Write {
            id: target,
            path: path.clone(),
            source,
        })?;
        index.insert(target, document);
        info!("wrote {path}");
        Ok(target)
    }

    /// Delete a document and its file, echoing the identifier.
    ///
    /// A file that has already vanished counts as deleted. When the file
    /// cannot be deleted for any other reason the index entry is restored.
    pub fn remove(&self, id: DocumentId) -> Result<DocumentId, StoreError> {
        let mut index = self.index.lock();
        let document = index.remove(&id).ok_or(StoreError::NotFound { id })?;
        if let Err(err) = self.delete_file(id) {
            index.insert(id, document);
            return Err(err);
        }
        warn!("removed {}", self.document_path(id));
        Ok(id)
    }

    /// A copy of the document stored under `id`.
    pub fn get(&self, id: DocumentId) -> Result<Document, StoreError> {
        self.index
            .lock()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    /// Snapshot of every indexed identifier, in no particular order.
    #[must_use]
    pub fn list_identifiers(&self) -> Vec<DocumentId> {
        self.index.lock().keys().copied().collect()
    }

    /// Number of indexed documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.lock().len()
    }

    /// Whether the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.lock().is_empty()
    }

    fn open_dir(&self) -> Result<fs_utf8::Dir, StoreError> {
        geoshelf_fs::open_dir(&self.root).map_err(|source| StoreError::OpenDirectory {
            path: self.root.clone(),
            source,
        })
    }

    fn fresh_id(&self, index: &Index) -> Result<DocumentId, StoreError> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let candidate = self.ids.next_id();
            if !index.contains_key(&candidate) {
                return Ok(candidate);
            }
            debug!("generated identifier {candidate} is taken (attempt {attempt})");
        }
        Err(StoreError::CollisionExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    fn delete_file(&self, id: DocumentId) -> Result<(), StoreError> {
        let path = self.document_path(id);
        let dir = self.open_dir()?;
        match dir.remove_file(id.to_string()) {
            Ok(()) => Ok(()),
            Err(err) if geoshelf_fs::is_not_found(&err) => {
                warn!("{path} was already missing; treating {id} as removed");
                Ok(())
            }
            Err(source) => Err(StoreError::Remove { id, path, source }),
        }
    }
}

/// Hidden sibling that `add` stages content in. The leading dot keeps it from
/// parsing as an identifier, so the scan skips any leftover.
fn staging_name(id: DocumentId) -> String {
    format!(".{id}.tmp")
}

fn write_replacing(dir: &fs_utf8::Dir, id: DocumentId, content: &str) -> io::Result<()> {
    let staging = staging_name(id);
    let result = dir
        .write(&staging, content)
        .and_then(|()| dir.rename(&staging, dir, id.to_string()));
    if result.is_err() {
        match dir.remove_file(&staging) {
            Err(err) if !geoshelf_fs::is_not_found(&err) => {
                debug!("could not discard staged file {staging}: {err}");
            }
            _ => {}
        }
    }
    result
}
