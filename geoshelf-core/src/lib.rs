//! Core storage for the Geoshelf GeoJSON server.
//!
//! The crate has three parts:
//! - [`Document`] parses and validates GeoJSON text, keeping the canonical
//!   JSON tree alongside `geo` geometries for spatial helpers.
//! - [`DocumentId`] names documents, both in memory and on disk.
//! - [`DocumentStore`] owns a storage directory, reconciles an in-memory
//!   index from it on start-up and serialises every mutation behind a single
//!   lock so the index and the files never drift apart.
//!
//! # Examples
//!
//! ```no_run
//! use geoshelf_core::DocumentStore;
//!
//! # fn main() -> Result<(), geoshelf_core::StoreError> {
//! let store = DocumentStore::open("tmp/storage")?;
//! let id = store.add(r#"{"type": "Point", "coordinates": [0.0, 51.5]}"#, None)?;
//! let document = store.get(id)?;
//! assert!(document.bounding_rect().is_some());
//! store.remove(id)?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod document;
pub mod id;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use document::{Document, DocumentError, DocumentKind};
pub use id::{DocumentId, IdSource, InvalidIdError, RandomIdSource};
pub use store::{
    DocumentStore, MAX_ID_ATTEMPTS, ScanOutcome, ScanReport, SkipReason, StoreError,
    StoreErrorKind,
};
