//! Error types emitted by the Geoshelf client.

use std::io;

use camino::Utf8PathBuf;
use reqwest::Method;
use thiserror::Error;
use url::Url;

/// Errors emitted by the Geoshelf client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// A document URL could not be derived from the base URL.
    #[error("failed to join {segment:?} onto {base}: {source}")]
    InvalidUrl {
        base: Url,
        segment: String,
        #[source]
        source: url::ParseError,
    },
    /// The base URL cannot carry a path, for example `mailto:` URLs.
    #[error("{base} cannot be used as an API base URL")]
    UnsupportedBase { base: Url },
    /// The document file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// Building the HTTP client failed.
    #[error("failed to build HTTP client: {0}")]
    BuildClient(#[source] reqwest::Error),
    /// The request could not be sent or its response read.
    #[error("{method} {url} failed: {source}")]
    Http {
        method: Method,
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    /// The async runtime could not be started.
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[source] io::Error),
}
