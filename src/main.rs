// Vaultline — Application Entry Point
//
// Parses CLI arguments, initializes structured logging (commands are logged
// by verb only, never with their arguments), and dispatches to the command
// handler on the tokio runtime.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vaultline::cli::{execute, Cli};

#[tokio::main]
async fn main() {
    // RUST_LOG=vaultline=debug for per-command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vaultline=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
