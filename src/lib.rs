//! Facade crate for Geoshelf, a disk-backed GeoJSON document store.
//!
//! This crate re-exports the storage types and, behind the default `server`
//! feature, the HTTP server.

#![forbid(unsafe_code)]

pub use geoshelf_core::{
    Document, DocumentError, DocumentId, DocumentKind, DocumentStore, IdSource, InvalidIdError,
    MAX_ID_ATTEMPTS, RandomIdSource, ScanOutcome, ScanReport, SkipReason, StoreError,
    StoreErrorKind,
};

#[cfg(feature = "test-support")]
pub use geoshelf_core::test_support;

#[cfg(feature = "server")]
pub use geoshelf_server as server;
