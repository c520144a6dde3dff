//! # DomainError
//!
//! Centralized error handling for rusty-feed.
//! Every service operation returns one of these; the HTTP adapter maps them to
//! status codes and nothing below it swallows one.

use thiserror::Error;

/// The primary error type for all service operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Missing or malformed required field. The request is rejected before any mutation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Referenced tweet or user does not exist
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: String },

    /// Optimistic toggle retries were exhausted
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence failure reported by a port
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// A specialized Result type for rusty-feed logic.
pub type Result<T> = std::result::Result<T, DomainError>;
