//! Error types for the Songcast distribution pipeline.
//!
//! This module defines a hierarchy of error types following best practices:
//!
//! - [`MessageError`] - Interchange message parsing/building errors
//! - [`TransportError`] - Delivery transport errors
//! - [`StoreError`] - Deployment store errors
//! - [`CredentialError`] - Credential boundary errors
//! - [`AdapterError`] - Distributor adapter errors
//! - [`DistributionError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

use crate::models::DistributorId;

// =============================================================================
// Interchange Message Errors
// =============================================================================

/// Errors while parsing or building interchange messages.
#[derive(Debug, Error)]
pub enum MessageError {
    /// A required structural element is missing from the document.
    #[error("Malformed message: missing root element ({missing})")]
    MalformedMessage { missing: String },

    /// The document is not valid JSON.
    #[error("Invalid message document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    /// Sales report is too short to carry a header and data.
    #[error("Sales report too short: {0} line(s)")]
    ReportTooShort(usize),

    /// Sales report row could not be read.
    #[error("Sales report row error: {0}")]
    ReportRow(String),

    /// Failed to decode report bytes.
    #[error("Failed to decode report bytes: {0}")]
    Encoding(String),
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors from the delivery transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Operation attempted without an established connection.
    #[error("Transport not connected")]
    NotConnected,

    /// Connection could not be established.
    #[error("Connection to {host} failed: {reason}")]
    ConnectionFailed { host: String, reason: String },

    /// Credentials rejected or absent.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Remote path could not be created or written.
    #[error("Remote path error at '{path}': {reason}")]
    RemotePath { path: String, reason: String },

    /// Underlying filesystem error.
    #[error("Transport IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors from the deployment store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to persist a record.
    #[error("Failed to save deployment: {0}")]
    Save(String),

    /// IO error.
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Credential Errors
// =============================================================================

/// Errors from the credential boundary.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No stored credentials for the distributor.
    #[error("No credentials stored for {0}")]
    NotFound(DistributorId),

    /// IO error.
    #[error("Credential IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Credential JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Adapter Errors
// =============================================================================

/// Errors from a distributor adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Release operation attempted before `connect` succeeded.
    #[error("Not connected to {0}")]
    NotConnected(DistributorId),

    /// Credentials missing a field the adapter requires.
    #[error("{distributor} requires {field}")]
    MissingCredential {
        distributor: DistributorId,
        field: &'static str,
    },

    /// Remote API rejected the request.
    #[error("API error from {distributor}: {message}")]
    Api {
        distributor: DistributorId,
        message: String,
    },

    /// Package could not be staged.
    #[error("Package build failed: {0}")]
    Package(String),

    /// Delivery transport failure.
    #[error("Delivery failed: {0}")]
    Delivery(#[from] TransportError),
}

// =============================================================================
// Distribution Errors (top-level)
// =============================================================================

/// Top-level orchestration errors.
///
/// Public orchestrator operations catch these at the boundary and fold them
/// into structured results; they only cross module boundaries internally.
#[derive(Debug, Error)]
pub enum DistributionError {
    /// Distributor is not registered with the orchestrator.
    #[error("Unknown distributor: {0}")]
    UnknownDistributor(DistributorId),

    /// No credentials supplied and none stored.
    #[error("No credentials found for {0}")]
    NoCredentials(DistributorId),

    /// Adapter failure.
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// Store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Credential boundary failure.
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Message mapping/parsing failure.
    #[error("Message error: {0}")]
    Message(#[from] MessageError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Distribution error.
    #[error("Distribution error: {0}")]
    Distribution(#[from] DistributionError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for message codec operations.
pub type MessageResult<T> = Result<T, MessageError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Result type for orchestration operations.
pub type DistributionResult<T> = Result<T, DistributionError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // AdapterError -> DistributionError
        let adapter_err = AdapterError::NotConnected(DistributorId::Tunecore);
        let dist_err: DistributionError = adapter_err.into();
        assert!(dist_err.to_string().contains("tunecore"));

        // TransportError -> AdapterError -> DistributionError
        let transport_err = TransportError::NotConnected;
        let adapter_err: AdapterError = transport_err.into();
        let dist_err: DistributionError = adapter_err.into();
        assert!(dist_err.to_string().contains("not connected"));
    }

    #[test]
    fn test_malformed_message_names_missing_root() {
        let err = MessageError::MalformedMessage {
            missing: "NewReleaseMessage or PurgeReleaseMessage".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("NewReleaseMessage"));
        assert!(msg.contains("PurgeReleaseMessage"));
    }

    #[test]
    fn test_remote_path_error_format() {
        let err = TransportError::RemotePath {
            path: "/upload/REL-1".into(),
            reason: "permission denied".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/upload/REL-1"));
        assert!(msg.contains("permission denied"));
    }
}
