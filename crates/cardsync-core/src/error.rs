//! Error types for cardsync-core

use thiserror::Error;

use crate::models::ReferenceTier;

/// Result type alias using cardsync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cardsync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The record store answered with a non-success status
    #[error("Record store error (HTTP {status}): {message}")]
    Store { status: u16, message: String },

    /// A record read from a store is missing a required field
    #[error("Invalid record {record_id}: {reason}")]
    InvalidRecord { record_id: String, reason: String },

    /// An origin relation has no counterpart in the identity map
    #[error("Unresolved {tier} relation: origin record {origin_id} has no destination match")]
    UnresolvedRelation {
        tier: ReferenceTier,
        origin_id: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl Error {
    pub(crate) fn invalid_record(record_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            record_id: record_id.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolved(tier: ReferenceTier, origin_id: impl Into<String>) -> Self {
        Self::UnresolvedRelation {
            tier,
            origin_id: origin_id.into(),
        }
    }
}
