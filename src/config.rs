// Vaultline — Server configuration
//
// Resolved once at startup from CLI flags and environment, then handed to
// the TCP server. Paths default to the per-user data directory.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::auth::HashCost;
use crate::error::VaultlineError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 2500;

/// Default directory for Vaultline data files.
pub fn data_dir() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("vaultline")
}

/// Path to the vault database file.
pub fn default_db_path() -> PathBuf {
    data_dir().join("vaultline.db")
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub hash_cost: HashCost,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: default_db_path(),
            hash_cost: HashCost::default(),
        }
    }
}

impl ServerConfig {
    /// Socket address to bind. Host must be an IP literal.
    pub fn bind_addr(&self) -> Result<SocketAddr, VaultlineError> {
        let ip = self
            .host
            .parse::<IpAddr>()
            .map_err(|e| VaultlineError::Config(format!("invalid host '{}': {}", self.host, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
