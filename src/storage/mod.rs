//! Persistence — local key-value storage for conversation and search
//! history.
//!
//! Submodules:
//! - `kv`: The `KeyValueStore` capability and its SQLite backing
//! - `history`: Conversation log and search-query persistence
//! - `errors`: Storage error types

pub mod errors;
pub mod history;
pub mod kv;

// Re-exports for convenience
pub use errors::StorageError;
pub use history::HistoryStore;
pub use kv::{KeyValueStore, SqliteStore};
