// Vaultline — Store Module
//
// Persistence for users, categories and entries on SQLite. Every query is
// parameter-bound and every vault query is scoped to the owning username.

mod db;
mod error;
mod models;
mod repository;

pub use db::Database;
pub use error::StoreError;
pub use models::{Category, Entry, EntryFields, NewUser, User};
pub use repository::{SqliteVaultStore, VaultStore};
