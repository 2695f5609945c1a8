//! Raffle Storage Layer
//!
//! Implements the [`StateStore`](raffle_domain::StateStore) trait for the
//! single lottery record.
//!
//! # Backends
//!
//! - [`SqliteStore`]: durable storage in a SQLite file, safe to share between
//!   processes through compare-and-set versioning
//! - [`MemoryStore`]: in-process storage for tests and demos; clones share
//!   the same record
//!
//! # Examples
//!
//! ```no_run
//! use raffle_store::SqliteStore;
//!
//! let store = SqliteStore::new("raffle.db", "lottery_data").unwrap();
//! // Store is now ready for load/save
//! ```

#![warn(missing_docs)]

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

/// Key the record is stored under unless configured otherwise
pub const DEFAULT_EVENT_KEY: &str = "lottery_data";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored data does not form a valid lottery state
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The store cannot be used (e.g. a poisoned lock)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
