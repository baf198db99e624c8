//! Command-line and environment configuration

use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::core::manifest::ManifestSource;

pub const DEFAULT_PORT: u16 = 9001;
pub const DEFAULT_CATALOG_PORT: u16 = 8000;

#[derive(Parser, Debug, Clone)]
#[command(name = "macro-agent")]
#[command(about = "Local agent that runs blocks from the visual macro editor")]
#[command(version)]
pub struct AgentConfig {
    /// Address to listen on
    #[arg(long, env = "MACRO_AGENT_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "MACRO_AGENT_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory of block manifests (*.json); the built-in set is used when
    /// unset or missing
    #[arg(long, env = "MACRO_AGENT_BLOCKS_DIR")]
    pub blocks_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "MACRO_AGENT_LOG", default_value = "info")]
    pub log: String,

    /// Do not send CORS headers
    #[arg(long)]
    pub no_cors: bool,
}

impl AgentConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn cors(&self) -> bool {
        !self.no_cors
    }

    /// Where block manifests come from.
    pub fn manifest_source(&self) -> ManifestSource {
        match &self.blocks_dir {
            Some(dir) if dir.is_dir() => ManifestSource::Directory(dir.clone()),
            _ => ManifestSource::Embedded,
        }
    }
}

/// Options for the `catalog-server` binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "catalog-server")]
#[command(about = "Serve the game catalog directory with caching disabled")]
#[command(version)]
pub struct CatalogConfig {
    /// Directory to serve
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Address to listen on
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_CATALOG_PORT)]
    pub port: u16,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log: String,
}

impl CatalogConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
