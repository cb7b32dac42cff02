//! Error types for the Hyperbolic command-line client.
//!
//! Failures are grouped by where they originate: credential resolution,
//! the marketplace API, rental order validation, and local I/O. An instance ID that matches nothing
//! is not an error; lookups report it as `None`.

use std::path::PathBuf;
use thiserror::Error;

/// Where users create API keys.
pub const API_KEY_SETTINGS_URL: &str = "https://app.hyperbolic.ai/settings";

/// The main error type for the Hyperbolic client.
#[derive(Debug, Error)]
pub enum HyperbolicError {
    /// Credential-related errors.
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Marketplace API errors.
    #[error("Hyperbolic API error: {0}")]
    Api(#[from] ApiError),

    /// Rental order errors.
    #[error("Rental error: {0}")]
    Rental(#[from] RentalError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Credential storage and lookup errors.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No credential file exists yet.
    #[error(
        "no API key configured (expected {path})\nPlease run 'hyperbolic auth YOUR_API_KEY' to save your API key\n(Get your API key from {url})",
        url = API_KEY_SETTINGS_URL
    )]
    NotConfigured {
        /// Path where the credential file was expected.
        path: PathBuf,
    },

    /// The stored or supplied API key is empty.
    #[error(
        "API key is empty\nPlease run 'hyperbolic auth YOUR_API_KEY' to save your API key\n(Get your API key from {url})",
        url = API_KEY_SETTINGS_URL
    )]
    EmptyApiKey,

    /// The credential file exists but could not be read.
    #[error("Failed to read credential file {path}: {message}")]
    Unreadable {
        /// Path to the credential file.
        path: PathBuf,
        /// Underlying cause.
        message: String,
    },

    /// The credential file is not valid JSON.
    #[error("Credential file {path} is corrupted: {message}")]
    Corrupted {
        /// Path to the credential file.
        path: PathBuf,
        /// Parse error description.
        message: String,
    },

    /// The credential file could not be written.
    #[error("Failed to write credential file {path}: {message}")]
    WriteFailed {
        /// Path to the credential file.
        path: PathBuf,
        /// Underlying cause.
        message: String,
    },

    /// The user's home directory could not be determined.
    #[error("Cannot determine home directory for credential storage")]
    HomeDirUnavailable,
}

/// Marketplace API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("Network error communicating with Hyperbolic: {message}")]
    Network {
        /// Description of the transport failure.
        message: String,
    },

    /// The API answered with a non-2xx status.
    #[error("API request failed with status {status}: {body}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A collection response could not be decoded.
    #[error("Invalid response for {resource}: {message}")]
    InvalidResponse {
        /// Which resource was being decoded.
        resource: String,
        /// Decode error description.
        message: String,
    },
}

/// Rental orders rejected before any request is sent.
#[derive(Debug, Error)]
pub enum RentalError {
    /// More ports were requested than a spot container exposes.
    #[error("Maximum of {max} ports can be specified, but {count} were provided")]
    TooManyPorts {
        /// Ports requested.
        count: usize,
        /// Ports allowed.
        max: usize,
    },

    /// A port outside 1-65535.
    #[error("Port number '{port}' is out of valid range (1-65535)")]
    InvalidPort {
        /// Offending port.
        port: u16,
    },

    /// A rental must include at least one GPU.
    #[error("GPU count must be at least 1")]
    NoGpus,

    /// Bare-metal rentals need a network type.
    #[error("Network type is required for bare-metal rentals: 'ethernet' or 'infiniband'")]
    NetworkTypeRequired,

    /// The family cannot be rented on demand.
    #[error("Invalid instance type '{family}'. Must be 'virtual-machine' or 'bare-metal'")]
    NotOnDemand {
        /// Requested family.
        family: String,
    },
}

/// Result type alias for Hyperbolic client operations.
pub type Result<T> = std::result::Result<T, HyperbolicError>;

impl HyperbolicError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the HTTP status of an upstream failure, if this is one.
    #[must_use]
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Api(ApiError::Upstream { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl ApiError {
    /// Creates an upstream error from a status and raw body.
    #[must_use]
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a decode error for the named resource.
    #[must_use]
    pub fn invalid_response(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_mentions_remediation() {
        let err = HyperbolicError::from(CredentialError::NotConfigured {
            path: PathBuf::from("/home/u/.hyperbolic/config.json"),
        });
        let message = err.to_string();

        assert!(message.contains("hyperbolic auth YOUR_API_KEY"));
        assert!(message.contains(API_KEY_SETTINGS_URL));
        assert!(message.contains("/home/u/.hyperbolic/config.json"));

        let message = CredentialError::EmptyApiKey.to_string();
        assert!(message.ends_with(&format!("(Get your API key from {API_KEY_SETTINGS_URL})")));
    }

    #[test]
    fn test_rental_error_messages() {
        let err = HyperbolicError::from(RentalError::TooManyPorts { count: 3, max: 2 });
        assert_eq!(
            err.to_string(),
            "Rental error: Maximum of 2 ports can be specified, but 3 were provided"
        );
        assert_eq!(err.upstream_status(), None);
    }

    #[test]
    fn test_upstream_status() {
        let err = HyperbolicError::from(ApiError::upstream(503, "maintenance"));
        assert_eq!(err.upstream_status(), Some(503));
        assert!(err.to_string().contains("maintenance"));

        let err = HyperbolicError::from(ApiError::network("connection refused"));
        assert_eq!(err.upstream_status(), None);
    }
}
