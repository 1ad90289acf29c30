// Vaultline — CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: serve, init, connect.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{DEFAULT_HOST, DEFAULT_PORT};

pub use commands::execute;

/// Vaultline — a multi-user secret vault served over TCP.
#[derive(Parser, Debug)]
#[command(name = "vaultline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the vault server.
    Serve {
        /// Address to bind (an IP literal).
        #[arg(long, env = "VAULTLINE_HOST", default_value = DEFAULT_HOST)]
        host: String,

        /// TCP port to listen on.
        #[arg(long, env = "VAULTLINE_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Path to the vault database. Defaults to the user data directory.
        #[arg(long, env = "VAULTLINE_DB")]
        db: Option<PathBuf>,

        /// Argon2 memory cost in KiB.
        #[arg(long)]
        hash_memory_kib: Option<u32>,

        /// Argon2 iteration count.
        #[arg(long)]
        hash_iterations: Option<u32>,

        /// Argon2 lanes.
        #[arg(long)]
        hash_parallelism: Option<u32>,
    },

    /// Create the vault database and schema.
    Init {
        /// Path to the vault database. Defaults to the user data directory.
        #[arg(long, env = "VAULTLINE_DB")]
        db: Option<PathBuf>,
    },

    /// Open an interactive session against a running server.
    Connect {
        /// Server address.
        host: String,

        /// Server port.
        port: u16,
    },
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["vaultline", "serve"]).unwrap();
        match cli.command {
            Commands::Serve {
                port,
                hash_memory_kib,
                ..
            } => {
                assert_eq!(port, DEFAULT_PORT);
                assert_eq!(hash_memory_kib, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_connect_requires_host_and_port() {
        assert!(Cli::try_parse_from(["vaultline", "connect", "127.0.0.1"]).is_err());
        let cli = Cli::try_parse_from(["vaultline", "connect", "127.0.0.1", "2500"]).unwrap();
        assert!(matches!(cli.command, Commands::Connect { port: 2500, .. }));
    }
}
