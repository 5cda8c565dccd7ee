//! Error types for the infotag service
//!
//! This module defines all error types used throughout the application,
//! providing consistent error handling and user-friendly error messages.

use thiserror::Error;

/// Main error type for the infotag application
#[derive(Error, Debug)]
pub enum InfotagError {
    /// Errors related to configuration loading/parsing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors related to the patient record store
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    /// Errors related to secret hashing
    #[error("Secret hashing error: {0}")]
    Hasher(#[from] HasherError),

    /// Errors related to caller identity verification
    #[error("Identity verification error: {0}")]
    Identity(#[from] IdentityError),

    /// Errors produced by the unlock protocol
    #[error("Unlock error: {0}")]
    Unlock(#[from] UnlockError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {path}")]
    LoadFailed { path: String },

    #[error("Failed to save configuration file: {path}")]
    SaveFailed { path: String },

    #[error("Invalid collaborator endpoint URL: {url}")]
    InvalidUrl { url: String },

    #[error("Configuration validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// Record store operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    #[error("store request failed: {message}")]
    Backend { message: String },

    #[error("malformed patient record: {message}")]
    InvalidRecord { message: String },

    #[error("invalid store endpoint: {message}")]
    InvalidEndpoint { message: String },
}

/// Secret hashing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HasherError {
    #[error("failed to hash secret: {message}")]
    HashFailed { message: String },
}

/// Caller identity verification errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("identity token rejected")]
    Rejected,

    #[error("identity service unavailable: {message}")]
    Unavailable { message: String },

    #[error("invalid identity endpoint: {message}")]
    InvalidEndpoint { message: String },
}

/// Unlock protocol errors
///
/// These are the failure halves of the unlock contract. User-facing
/// denials (wrong PIN, active lockout) are not errors; they are returned
/// as [`crate::unlock::UnlockOutcome`] variants instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnlockError {
    /// The caller omitted a required field. No state is changed.
    #[error("missing required field: {field}")]
    InvalidRequest { field: &'static str },

    /// No patient record exists for the given id. No state is changed.
    #[error("patient record not found")]
    NotFound,

    /// The security record has no PIN hash. This is a server-side defect,
    /// not a user error, and it never increments the failure counter.
    #[error("security record has no PIN hash configured")]
    Misconfigured,

    /// A collaborator failed mid-attempt. Safe to retry from the caller
    /// side, though a counter write may or may not have landed.
    #[error("record store failure: {0}")]
    Store(#[from] StoreError),

    #[error("secret hashing failure: {0}")]
    Hasher(#[from] HasherError),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, InfotagError>;
