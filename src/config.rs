//! Server configuration, read from command line flags or the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use crate::url;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8522;

/// Default document directory.
pub const DEFAULT_DATA_DIR: &str = "data/did-documents";

/// Configuration for the DID document server.
#[derive(Clone, Debug, Parser)]
#[command(name = "didweb", version)]
#[command(about = "Serve and generate did:web DID documents", long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind to
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Domain DIDs are issued under, e.g. `example.com` or `localhost%3A8522`
    /// [default: localhost%3A<port>]
    #[arg(long, env = "DID_DOMAIN")]
    pub domain: Option<String>,

    /// Directory holding DID documents
    #[arg(long, env = "DID_DOCUMENTS_PATH", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Maximum log level
    #[arg(long, env = "LOG_LEVEL", default_value_t = Level::INFO)]
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            domain: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: Level::INFO,
        }
    }
}

impl Config {
    /// Configuration serving documents for `domain` from `data_dir`.
    pub fn new(domain: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            domain: Some(domain.into()),
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// The domain in DID form, with any port separator encoded as `%3A`.
    #[must_use]
    pub fn did_domain(&self) -> String {
        self.domain.as_ref().map_or_else(
            || url::did_domain(&format!("localhost:{}", self.port)),
            |domain| url::did_domain(domain),
        )
    }

    /// The domain in URL form, e.g. `localhost:8522`.
    #[must_use]
    pub fn display_domain(&self) -> String {
        url::http_domain(&self.did_domain())
    }

    /// Socket address to listen on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
