//! HTTP server for the Geoshelf document store.
//!
//! The server exposes a [`DocumentStore`] over a small REST API plus a map
//! view per document. See [`routes`] for the route table.
#![forbid(unsafe_code)]

use std::{future::Future, sync::Arc};

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use geoshelf_core::DocumentStore;
use tokio::net::TcpListener;
use tracing::{error, info};

pub mod config;
mod error;
pub mod render;
pub mod routes;

pub use config::{DEFAULT_BIND, DEFAULT_STORAGE_PATH, ServeArgs, ServeConfig};
pub use error::ServerError;
pub use routes::router;

/// Run the server CLI with the current process arguments and environment.
pub fn run() -> Result<(), ServerError> {
    let cli = Cli::try_parse().map_err(ServerError::ArgumentParsing)?;
    match cli.command {
        Command::Serve(args) => {
            let config = args.into_config()?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(ServerError::Runtime)?;
            runtime.block_on(serve(config))
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "geoshelf-server",
    about = "Store GeoJSON documents on disk and serve them over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the storage directory and serve it until interrupted.
    Serve(ServeArgs),
}

/// Open the store and serve it on the configured address until Ctrl-C.
pub async fn serve(config: ServeConfig) -> Result<(), ServerError> {
    let store = open_store(&config.storage_path)?;
    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind,
            source,
        })?;
    serve_with_shutdown(listener, store, shutdown_signal()).await
}

/// Open the document store, logging the outcome of the start-up scan.
pub fn open_store(path: &Utf8Path) -> Result<Arc<DocumentStore>, ServerError> {
    let store = DocumentStore::open(path)?;
    info!("serving {} documents from {path}", store.len());
    Ok(Arc::new(store))
}

/// Serve `store` on an already bound listener until `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    store: Arc<DocumentStore>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("listening on http://{addr}");
    }
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests;
