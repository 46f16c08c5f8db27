// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for association operations

use thiserror::Error;

/// Errors that can occur while reading, transitioning or notifying on
/// associations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssociationError {
    /// Requested association, user or company does not exist
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// `etag` mismatch when applying an update
    #[error("Concurrency conflict on association {id}: expected etag {expected}")]
    Conflict { id: String, expected: String },

    /// A directory or producer call failed
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A stored value violates a data model invariant
    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    /// Caller supplied parameters are malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AssociationError {
    /// Association lookup miss
    pub fn association_not_found(id: impl Into<String>) -> Self {
        AssociationError::NotFound {
            entity: "association",
            key: id.into(),
        }
    }

    /// User lookup miss
    pub fn user_not_found(key: impl Into<String>) -> Self {
        AssociationError::NotFound {
            entity: "user",
            key: key.into(),
        }
    }

    /// Company lookup miss
    pub fn company_not_found(company_number: impl Into<String>) -> Self {
        AssociationError::NotFound {
            entity: "company",
            key: company_number.into(),
        }
    }

    /// Whether retrying the same operation against a fresh read may succeed
    pub fn is_conflict(&self) -> bool {
        matches!(self, AssociationError::Conflict { .. })
    }
}

/// Result type for association operations
pub type AssociationResult<T> = Result<T, AssociationError>;

impl From<async_nats::Error> for AssociationError {
    fn from(err: async_nats::Error) -> Self {
        AssociationError::UpstreamUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for AssociationError {
    fn from(err: serde_json::Error) -> Self {
        AssociationError::Serialization(err.to_string())
    }
}

#[cfg(feature = "http-directory")]
impl From<reqwest::Error> for AssociationError {
    fn from(err: reqwest::Error) -> Self {
        AssociationError::UpstreamUnavailable(err.to_string())
    }
}
