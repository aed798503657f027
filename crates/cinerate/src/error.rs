use std::path::PathBuf;
use thiserror::Error;

use crate::secrets::SecretError;

#[derive(Error, Debug)]
pub enum CinerateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Structured rejection reasons reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// The addressed document, job or model does not exist.
    NotFound,
    /// The resource exists but is not ready yet (e.g. result of a running job).
    NotReady,
    /// The backend lacks resources for the operation (e.g. insufficient memory).
    ResourceExhausted,
    /// The backend refused the request body or parameters.
    Invalid,
    /// The backend refused the credential.
    Unauthorized,
    /// Any other non-success status.
    Server(u16),
}

impl std::fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionKind::NotFound => write!(f, "not found"),
            RejectionKind::NotReady => write!(f, "not ready"),
            RejectionKind::ResourceExhausted => write!(f, "resource exhausted"),
            RejectionKind::Invalid => write!(f, "invalid request"),
            RejectionKind::Unauthorized => write!(f, "unauthorized"),
            RejectionKind::Server(status) => write!(f, "server error {}", status),
        }
    }
}

impl RejectionKind {
    /// Maps an HTTP status code onto a rejection kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => RejectionKind::NotFound,
            409 | 425 => RejectionKind::NotReady,
            429 | 507 => RejectionKind::ResourceExhausted,
            400 | 422 => RejectionKind::Invalid,
            401 | 403 => RejectionKind::Unauthorized,
            other => RejectionKind::Server(other),
        }
    }
}

/// Errors raised by the workflow and provider components.
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    /// Bad input caught before any network call.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Connectivity failure or timeout.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend rejected request ({kind}): {message}")]
    BackendRejected { kind: RejectionKind, message: String },

    /// A mutating operation on the same target is already in flight.
    #[error("'{0}' is busy with another operation")]
    Busy(String),

    /// The response body did not have the shape expected for the endpoint.
    #[error("Unexpected response from {endpoint}: {reason}")]
    Protocol {
        endpoint: &'static str,
        reason: String,
    },

    /// The backend accepted a change that its re-fetched state does not reflect.
    #[error("Backend did not confirm change: {0}")]
    Unconfirmed(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    pub fn rejected(kind: RejectionKind, message: impl Into<String>) -> Self {
        ClientError::BackendRejected {
            kind,
            message: message.into(),
        }
    }

    /// Returns the rejection kind for backend-rejected errors.
    pub fn rejection_kind(&self) -> Option<RejectionKind> {
        match self {
            ClientError::BackendRejected { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, ClientError::Busy(_))
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

pub type Result<T> = std::result::Result<T, CinerateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_kind_from_status() {
        assert_eq!(RejectionKind::from_status(404), RejectionKind::NotFound);
        assert_eq!(RejectionKind::from_status(409), RejectionKind::NotReady);
        assert_eq!(
            RejectionKind::from_status(507),
            RejectionKind::ResourceExhausted
        );
        assert_eq!(RejectionKind::from_status(422), RejectionKind::Invalid);
        assert_eq!(RejectionKind::from_status(502), RejectionKind::Server(502));
    }

    #[test]
    fn test_client_error_display() {
        let err = ClientError::rejected(RejectionKind::NotFound, "model 'x' missing");
        assert_eq!(
            err.to_string(),
            "Backend rejected request (not found): model 'x' missing"
        );
        assert_eq!(err.rejection_kind(), Some(RejectionKind::NotFound));
        assert!(ClientError::Busy("m".to_string()).is_busy());
    }
}
