//! Typed error hierarchy for adminhub.
//!
//! Three enums cover the three failure classes of the data layer:
//! - `ConfigError`: programmer errors in endpoint or shape declarations
//! - `TransportError`: network and server failures of a single HTTP call
//! - `StateError`: persisted state that could not be read or written

use thiserror::Error;

/// Misconfiguration of an endpoint registry or a payload shape.
///
/// These are never turned into user notifications. Callers propagate them
/// so they surface during development.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Endpoint '{operation}' is not declared for resource '{resource}'")]
    EndpointNotDeclared { resource: String, operation: String },

    #[error("Endpoint '{operation}' of resource '{resource}' requires an identifier")]
    MissingIdentifier { resource: String, operation: String },

    #[error("{operation}: payload must match shape {expected} ({details})")]
    RequestShapeMismatch {
        operation: String,
        expected: String,
        details: String,
    },

    #[error("{operation}: payload could not be serialized: {message}")]
    Unserializable { operation: String, message: String },

    #[error("Shape {name} has an invalid schema: {message}")]
    InvalidSchema { name: String, message: String },

    #[error("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },
}

/// Failure of a single request against the backend.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Server returned {status} for {url}")]
    Status {
        url: String,
        status: u16,
        /// The `message` field of the error body, when the server sent one.
        server_message: Option<String>,
        /// Field-level validation errors (`errors: [{key, message}]`).
        field_errors: Vec<FieldError>,
    },

    #[error("Response from {url} is not valid JSON: {message}")]
    Decode { url: String, message: String },
}

impl TransportError {
    /// The message the backend attached to this failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            TransportError::Status { server_message, .. } => server_message.as_deref(),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            TransportError::Status { field_errors, .. } => field_errors,
            _ => &[],
        }
    }
}

/// One entry of a server-side validation error list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct FieldError {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub message: String,
}

/// Failures of the key-value stores backing session and durable state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to read state file at {path}: {source}")]
    ReadFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write state file at {path}: {source}")]
    WriteFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("State file at {path} is corrupt: {message}")]
    Corrupt {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("State store lock poisoned")]
    LockPoisoned,
}
