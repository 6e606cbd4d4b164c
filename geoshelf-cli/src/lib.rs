//! Command-line client for a Geoshelf server.
//!
//! Each subcommand maps onto one HTTP call against the document API and
//! yields the server's [`Reply`] untouched.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use geoshelf_core::DocumentId;
use log::{debug, info};
use reqwest::{
    Method, StatusCode,
    multipart::{Form, Part},
};
use url::Url;

mod error;

pub use error::ClientError;

/// API base URL used when neither `--host` nor [`ENV_HOST`] is set.
pub const DEFAULT_HOST: &str = "http://127.0.0.1:5000/api/";
/// Environment variable overriding the API base URL.
pub const ENV_HOST: &str = "GEOSHELF_HOST";
/// Multipart field the server reads uploads from.
pub const UPLOAD_FIELD: &str = "geojson";

const FALLBACK_FILE_NAME: &str = "document.geojson";

/// Parse the process arguments and run the selected command.
pub fn run() -> Result<Reply, ClientError> {
    let cli = Cli::try_parse().map_err(ClientError::ArgumentParsing)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ClientError::Runtime)?;
    runtime.block_on(execute(cli))
}

/// Run a parsed command line.
pub async fn execute(cli: Cli) -> Result<Reply, ClientError> {
    let client = Client::new(cli.host)?;
    match cli.command {
        Command::Add { file } => client.add(&file).await,
        Command::Update { file, id } => client.update(&file, id).await,
        Command::Delete { id } => client.delete(id).await,
        Command::Get { id } => client.get(id).await,
        Command::List => client.list().await,
    }
}

/// Top-level command line.
#[derive(Debug, Parser)]
#[command(
    name = "geoshelf",
    about = "Upload, fetch and delete GeoJSON documents on a Geoshelf server",
    version
)]
pub struct Cli {
    /// Base URL of the document API.
    #[arg(long, env = ENV_HOST, default_value = DEFAULT_HOST, global = true)]
    pub host: Url,
    /// Operation to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Client operations.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Upload a new document and print its identifier.
    Add {
        /// GeoJSON file to upload.
        #[arg(short, long, value_name = "path")]
        file: Utf8PathBuf,
    },
    /// Create or replace the document stored under an identifier.
    Update {
        /// GeoJSON file to upload.
        #[arg(short, long, value_name = "path")]
        file: Utf8PathBuf,
        /// Document identifier.
        #[arg(short = 'u', long = "uuid", value_name = "uuid")]
        id: DocumentId,
    },
    /// Delete a document.
    Delete {
        /// Document identifier.
        #[arg(short = 'u', long = "uuid", value_name = "uuid")]
        id: DocumentId,
    },
    /// Print a stored document.
    #[command(alias = "get_uuid")]
    Get {
        /// Document identifier.
        #[arg(short = 'u', long = "uuid", value_name = "uuid")]
        id: DocumentId,
    },
    /// Print every stored identifier.
    #[command(alias = "get_uuids")]
    List,
}

/// Status and body of a server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status.
    pub status: StatusCode,
    /// Response body as text.
    pub body: String,
}

impl Reply {
    /// Whether the server reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base: Url,
}

impl Client {
    /// Create a client for the API rooted at `base`.
    ///
    /// A missing trailing slash is added so document URLs nest under the
    /// base path.
    pub fn new(base: Url) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(ClientError::BuildClient)?;
        Ok(Self {
            http,
            base: with_trailing_slash(base)?,
        })
    }

    /// API base URL.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL of the document `id`.
    pub fn document_url(&self, id: DocumentId) -> Result<Url, ClientError> {
        let segment = id.to_string();
        self.base
            .join(&segment)
            .map_err(|source| ClientError::InvalidUrl {
                base: self.base.clone(),
                segment,
                source,
            })
    }

    /// Upload `file` as a new document.
    pub async fn add(&self, file: &Utf8Path) -> Result<Reply, ClientError> {
        let form = upload_form(file)?;
        self.send(Method::POST, self.base.clone(), Some(form)).await
    }

    /// Upload `file` under `id`, creating or replacing that document.
    pub async fn update(&self, file: &Utf8Path, id: DocumentId) -> Result<Reply, ClientError> {
        let form = upload_form(file)?;
        self.send(Method::POST, self.document_url(id)?, Some(form))
            .await
    }

    /// Delete the document `id`.
    pub async fn delete(&self, id: DocumentId) -> Result<Reply, ClientError> {
        self.send(Method::DELETE, self.document_url(id)?, None).await
    }

    /// Fetch the document `id`.
    pub async fn get(&self, id: DocumentId) -> Result<Reply, ClientError> {
        self.send(Method::GET, self.document_url(id)?, None).await
    }

    /// Fetch the identifier listing.
    pub async fn list(&self) -> Result<Reply, ClientError> {
        self.send(Method::GET, self.base.clone(), None).await
    }

    async fn send(&self, method: Method, url: Url, form: Option<Form>) -> Result<Reply, ClientError> {
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(form) = form {
            request = request.multipart(form);
        }
        let http_error = |source| ClientError::Http {
            method: method.clone(),
            url: url.clone(),
            source,
        };
        let response = request.send().await.map_err(http_error)?;
        let status = response.status();
        debug!("{method} {url} response headers: {:?}", response.headers());
        let body = response.text().await.map_err(http_error)?;
        info!("{method} {url} -> {status}");
        Ok(Reply { status, body })
    }
}

fn with_trailing_slash(mut base: Url) -> Result<Url, ClientError> {
    if base.cannot_be_a_base() {
        return Err(ClientError::UnsupportedBase { base });
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn upload_form(file: &Utf8Path) -> Result<Form, ClientError> {
    let bytes = geoshelf_fs::read_file(file).map_err(|source| ClientError::ReadFile {
        path: file.to_path_buf(),
        source,
    })?;
    let name = file.file_name().unwrap_or(FALLBACK_FILE_NAME).to_owned();
    Ok(Form::new().part(UPLOAD_FIELD, Part::bytes(bytes).file_name(name)))
}

#[cfg(test)]
mod tests;
