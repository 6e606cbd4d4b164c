//! Entry point for the Geoshelf command-line client.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use geoshelf_cli::ClientError;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    match geoshelf_cli::run() {
        Ok(reply) => {
            println!("{}", reply.body);
            if reply.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(ClientError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("geoshelf: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
