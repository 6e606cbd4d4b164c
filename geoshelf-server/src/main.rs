//! Entry point for the Geoshelf HTTP server.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use geoshelf_server::ServerError;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    match geoshelf_server::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(ServerError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
