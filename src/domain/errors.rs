//! Domain error types
//!
//! This module defines the error hierarchy for the registry. Adapter errors are
//! domain-specific and don't expose third-party HTTP client types.

use thiserror::Error;

/// Main registry error type
///
/// This is the primary error type used throughout the application.
/// It wraps the adapter-specific error types and the form/session failures
/// the patient form controller reports to the user.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The form (or a value built from it) failed its constraint set
    #[error("Validation error: {0}")]
    Validation(String),

    /// A write was attempted without an authenticated user
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Record store errors
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    /// Identity provider errors
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Routing errors
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Record store errors
///
/// Errors that occur when talking to the document database holding the
/// `pacientes` collection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to reach the store
    #[error("Failed to connect to record store: {0}")]
    ConnectionFailed(String),

    /// The request was rejected because the session is missing or expired
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// List query failed
    #[error("Failed to query documents: {0}")]
    QueryFailed(String),

    /// Create failed
    #[error("Failed to insert document: {0}")]
    InsertFailed(String),

    /// Update failed
    #[error("Failed to update document: {0}")]
    UpdateFailed(String),

    /// Delete failed
    #[error("Failed to delete document: {0}")]
    DeleteFailed(String),

    /// The store answered with something we could not decode
    #[error("Invalid response from record store: {0}")]
    InvalidResponse(String),
}

/// Identity provider errors
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The interactive step was dismissed before a credential was produced
    #[error("Sign-in cancelled")]
    Cancelled,

    /// The provider rejected the credential
    #[error("Sign-in rejected: {0}")]
    Rejected(String),

    /// The gateway cannot use this kind of credential
    #[error("Unsupported credential: {0}")]
    UnsupportedCredential(String),

    /// Failed to reach the provider
    #[error("Failed to connect to identity provider: {0}")]
    ConnectionFailed(String),

    /// The provider answered with something we could not decode
    #[error("Invalid response from identity provider: {0}")]
    InvalidResponse(String),

    /// Sign-out failed
    #[error("Sign-out failed: {0}")]
    SignOutFailed(String),
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for RegistryError {
    fn from(err: toml::de::Error) -> Self {
        RegistryError::Configuration(format!("TOML parse error: {err}"))
    }
}
