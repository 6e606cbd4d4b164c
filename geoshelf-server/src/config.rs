//! Layered configuration for the `serve` subcommand.

use std::net::SocketAddr;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::ServerError;

/// Address the server listens on when none is configured.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
/// Storage directory used when none is configured.
pub const DEFAULT_STORAGE_PATH: &str = "tmp/storage";

pub(crate) const ARG_BIND: &str = "bind";
pub(crate) const ARG_STORAGE_PATH: &str = "storage-path";
pub(crate) const ENV_BIND: &str = "GEOSHELF_CMDS_SERVE_BIND";
pub(crate) const ENV_STORAGE_PATH: &str = "GEOSHELF_CMDS_SERVE_STORAGE_PATH";

/// CLI arguments for the `serve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Serve the document store over HTTP. Settings can come \
                 from CLI flags, configuration files, or environment \
                 variables.",
    about = "Serve the GeoJSON document store over HTTP"
)]
#[ortho_config(prefix = "GEOSHELF")]
pub struct ServeArgs {
    /// Socket address to listen on, for example `127.0.0.1:5000`.
    #[arg(long = ARG_BIND, value_name = "addr")]
    #[serde(default)]
    pub bind: Option<String>,
    /// Directory holding one file per stored document.
    #[arg(long = ARG_STORAGE_PATH, value_name = "path")]
    #[serde(default)]
    pub storage_path: Option<Utf8PathBuf>,
}

impl ServeArgs {
    /// Merge configuration files and environment into the arguments and
    /// resolve the result.
    pub fn into_config(self) -> Result<ServeConfig, ServerError> {
        let merged = self.load_and_merge().map_err(ServerError::Configuration)?;
        ServeConfig::try_from(merged)
    }
}

/// Fully resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    /// Listening socket.
    pub bind: SocketAddr,
    /// Storage directory.
    pub storage_path: Utf8PathBuf,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            storage_path: Utf8PathBuf::from(DEFAULT_STORAGE_PATH),
        }
    }
}

impl TryFrom<ServeArgs> for ServeConfig {
    type Error = ServerError;

    fn try_from(args: ServeArgs) -> Result<Self, Self::Error> {
        let raw_bind = args.bind.unwrap_or_else(|| DEFAULT_BIND.to_owned());
        let bind = raw_bind
            .parse()
            .map_err(|source| ServerError::InvalidBind {
                value: raw_bind.clone(),
                env: ENV_BIND,
                source,
            })?;
        let storage_path = args
            .storage_path
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_STORAGE_PATH));
        if storage_path.as_str().is_empty() {
            return Err(ServerError::MissingArgument {
                field: ARG_STORAGE_PATH,
                env: ENV_STORAGE_PATH,
            });
        }
        Ok(Self { bind, storage_path })
    }
}
