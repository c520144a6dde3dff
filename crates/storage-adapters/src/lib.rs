//! # storage-adapters
//!
//! Record-store implementations of the `domains` ports.
//!
//! - [`memory::MemoryStore`]: process-local, always compiled
//! - [`postgres::PgStore`]: Postgres via sqlx (feature `db-postgres`)

pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;

use thiserror::Error;

/// Uniqueness violations raised by `insert_user` / `insert_tweet`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreConflict {
    #[error("duplicate {0}: {1}")]
    Duplicate(&'static str, String),
}
