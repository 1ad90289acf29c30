// Vaultline — CLI Command Handlers
//
// Each function handles one CLI subcommand. `serve` wires the store,
// verifier and dispatcher into the TCP server; `connect` is a thin
// line-oriented client for a running server.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::auth::{Argon2Verifier, HashCost};
use crate::config::{default_db_path, ServerConfig};
use crate::error::VaultlineError;
use crate::gateway::{Dispatcher, TcpServer, EXIT_COMMAND, MAX_MESSAGE_LEN};
use crate::store::{Database, SqliteVaultStore};

use super::Commands;

/// Execute the parsed CLI command.
pub async fn execute(command: Commands) -> Result<(), VaultlineError> {
    match command {
        Commands::Serve {
            host,
            port,
            db,
            hash_memory_kib,
            hash_iterations,
            hash_parallelism,
        } => {
            let defaults = HashCost::default();
            let config = ServerConfig {
                host,
                port,
                db_path: db.unwrap_or_else(default_db_path),
                hash_cost: HashCost {
                    memory_kib: hash_memory_kib.unwrap_or(defaults.memory_kib),
                    iterations: hash_iterations.unwrap_or(defaults.iterations),
                    parallelism: hash_parallelism.unwrap_or(defaults.parallelism),
                },
            };
            cmd_serve(config).await
        }
        Commands::Init { db } => cmd_init(db.unwrap_or_else(default_db_path)),
        Commands::Connect { host, port } => cmd_connect(host, port).await,
    }
}

// ─── Init ────────────────────────────────────────────────────────────────────

fn cmd_init(db_path: PathBuf) -> Result<(), VaultlineError> {
    Database::open(&db_path)?;
    println!("✓ Vault database ready at {}", db_path.display());
    Ok(())
}

// ─── Serve ───────────────────────────────────────────────────────────────────

async fn cmd_serve(config: ServerConfig) -> Result<(), VaultlineError> {
    let addr = config.bind_addr()?;
    let db = Arc::new(Database::open(&config.db_path)?);
    let verifier = Argon2Verifier::new(config.hash_cost)?;

    tracing::info!(
        db = %config.db_path.display(),
        memory_kib = config.hash_cost.memory_kib,
        iterations = config.hash_cost.iterations,
        "Vault opened"
    );

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(SqliteVaultStore::new(db)),
        Arc::new(verifier),
    ));
    let server = TcpServer::bind(addr, dispatcher).await?;
    server.run().await?;
    Ok(())
}

// ─── Connect ─────────────────────────────────────────────────────────────────

const USAGE: &str = "\
Available commands:
 REGISTER|username|masterPass
 REGISTER_SEC|username|masterPass|securityQ|securityA
 LOGIN|username|masterPass
 SEC_QUESTION|username
 RECOVER_PASS|username|securityA   (resets the password to \"password\")
 CHANGE_PASS|username|oldPass|newPass
 NEW_CAT|categoryName
 LIST_CATS
 NEW_ENTRY|categoryName|title|user|url|notes|password
 LIST_ENTRIES|categoryName
 MOD_ENTRY|oldTitle|newTitle|newUser|newURL|newNotes|newPass
 DEL_ENTRY|title
 DEL_CAT|categoryName
 LOGOUT
 EXIT";

/// The command to send for one line of input. Only the line terminator is
/// removed; spaces are part of the last field.
fn outbound_command(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(['\r', '\n']);
    (!line.is_empty()).then_some(line)
}

async fn cmd_connect(host: String, port: u16) -> Result<(), VaultlineError> {
    let mut stream = TcpStream::connect((host.as_str(), port)).await?;
    println!("Connected to {}:{}", host, port);
    println!("{}", USAGE);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut buf = vec![0u8; MAX_MESSAGE_LEN + 1];

    loop {
        print!("vaultline> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(line) = outbound_command(&line) else {
            continue;
        };

        stream.write_all(line.as_bytes()).await?;
        if line == EXIT_COMMAND {
            println!("Exiting client...");
            break;
        }

        let mut reply = Vec::new();
        while !reply.ends_with(b"\n") {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                return Err(VaultlineError::Other("Server closed the connection".to_string()));
            }
            reply.extend_from_slice(&buf[..n]);
        }
        println!("Server: {}", String::from_utf8_lossy(&reply).trim_end());
    }

    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
