use std::path::PathBuf;
use thiserror::Error;

use crate::services::archive::ArchiveError;

/// Errors raised by calls against a vRA appliance
#[derive(Debug, Error)]
pub enum ClientError {
    /// No connection to the appliance; the request was never sent
    #[error("Could not connect for {operation}: {message}")]
    Connect {
        operation: &'static str,
        message: String,
    },

    /// The request may have reached the appliance but no answer arrived (timeout, reset)
    #[error("Network error during {operation}: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    /// The appliance answered with a non-success HTTP status
    #[error("{operation} rejected with HTTP {status}: {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {operation}: {message}")]
    InvalidResponse {
        operation: &'static str,
        message: String,
    },

    #[error("Failed to read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },

    #[error("HTTP client setup failed: {message}")]
    Setup { message: String },
}

impl ClientError {
    /// Classify a reqwest failure for `operation`
    pub(crate) fn from_reqwest(operation: &'static str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse {
                operation,
                message: err.to_string(),
            }
        } else if err.is_connect() {
            ClientError::Connect {
                operation,
                message: err.to_string(),
            }
        } else if err.is_builder() {
            ClientError::Setup {
                message: format!("{}: {}", operation, err),
            }
        } else {
            ClientError::Transport {
                operation,
                message: err.to_string(),
            }
        }
    }

    /// Whether the failure is a connectivity problem rather than an answer from the appliance
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Connect { .. } | ClientError::Transport { .. })
    }

    /// Whether the request is known not to have reached the appliance
    pub fn is_connect(&self) -> bool {
        matches!(self, ClientError::Connect { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            ClientError::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
