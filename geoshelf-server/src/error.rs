//! Error types emitted by the server binary.

use std::{io, net::AddrParseError, net::SocketAddr, sync::Arc};

use geoshelf_core::StoreError;
use thiserror::Error;

/// Errors emitted while configuring or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A setting resolved to an unusable empty value.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The listening address does not parse as a socket address.
    #[error("invalid bind address {value:?} (check --bind or {env}): {source}")]
    InvalidBind {
        value: String,
        env: &'static str,
        #[source]
        source: AddrParseError,
    },
    /// The document store could not be opened.
    #[error("failed to open document store: {0}")]
    OpenStore(#[from] StoreError),
    /// The async runtime could not be started.
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[source] io::Error),
    /// Binding the listening socket failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// The HTTP server stopped with an error.
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}
