//! rusty-feed/crates/domains/src/lib.rs
//!
//! Domain models, error taxonomy and port traits for rusty-feed.
//! Nothing in here performs I/O; adapters live in `storage-adapters` and `api-adapters`.

pub mod errors;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use models::*;
pub use ports::*;
