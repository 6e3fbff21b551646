use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub http_bind_address: SocketAddr,
    /// How long in-flight requests may take to drain after a shutdown signal
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_HTTP_PORT)),
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    /// Merges CLI/env values over the optional config file over defaults.
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            http_bind: cli_http_bind,
            shutdown_timeout_secs: cli_shutdown_timeout_secs,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            http_bind: file_http_bind,
            shutdown_timeout_secs: file_shutdown_timeout_secs,
        } = file_config;

        let defaults = Self::default();
        Ok(Self {
            http_bind_address: cli_http_bind
                .or(file_http_bind)
                .unwrap_or(defaults.http_bind_address),
            shutdown_timeout_secs: cli_shutdown_timeout_secs
                .or(file_shutdown_timeout_secs)
                .unwrap_or(defaults.shutdown_timeout_secs),
        })
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.shutdown_timeout_secs > 0,
            "shutdown timeout must be at least one second"
        );
        Ok(())
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "qrcode-api", about = "QR code image generation service", version)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "QRCODE_API_HTTP_BIND",
        value_name = "ADDR",
        help = "Address the HTTP server listens on"
    )]
    pub http_bind: Option<SocketAddr>,

    #[arg(
        long,
        env = "QRCODE_API_SHUTDOWN_TIMEOUT_SECS",
        value_name = "SECS",
        help = "Seconds to wait for in-flight requests on shutdown",
        value_parser = clap::value_parser!(u64)
    )]
    pub shutdown_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    http_bind: Option<SocketAddr>,
    shutdown_timeout_secs: Option<u64>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
