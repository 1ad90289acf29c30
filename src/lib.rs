// Vaultline — Library root
//
// Re-exports the auth, store, gateway, configuration and CLI modules.

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod store;

pub use error::{Result, VaultlineError};
