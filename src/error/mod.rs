//! Error types for setup-pubsub-emulator.

use std::time::Duration;
use thiserror::Error;

/// Result type for setup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for setup-pubsub-emulator.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Log level text could not be parsed.
    #[error("failed to parse log level: unknown level {0:?}")]
    UnknownLogLevel(String),

    /// The emulator host could not be resolved to a socket address.
    #[error("Failed to resolve emulator hostname {host}: {reason}")]
    Resolve {
        /// Host as configured.
        host: String,
        /// Resolver failure.
        reason: String,
    },

    /// The emulator never accepted a TCP connection before the deadline.
    #[error("Pub/Sub emulator did not become available within {}s", timeout.as_secs())]
    EmulatorUnavailable {
        /// Address that was polled.
        host: String,
        /// Total time waited.
        timeout: Duration,
    },

    /// Non-success response from the emulator.
    #[error("Pub/Sub API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// A provisioning step failed.
    #[error("Failed to {action}: {source}")]
    Provision {
        /// What was being attempted, e.g. "create DLT topic 'orders-dlt'".
        action: String,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Logging subscriber could not be installed.
    #[error("Failed to configure logger: {0}")]
    Logging(String),
}

/// Validation error types.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Required environment variable missing or empty.
    #[error("{0}")]
    MissingVariable(String),

    /// Invalid project ID.
    #[error("Invalid project ID: {0}")]
    InvalidProjectId(String),

    /// Invalid topic ID.
    #[error("Invalid topic ID: {0}")]
    InvalidTopicId(String),

    /// Invalid subscription ID.
    #[error("Invalid subscription ID: {0}")]
    InvalidSubscriptionId(String),

    /// Invalid parameter.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Reason for invalidity.
        reason: String,
    },
}

impl Error {
    /// Wrap this error with the provisioning step that produced it.
    pub fn during(self, action: impl Into<String>) -> Self {
        Error::Provision {
            action: action.into(),
            source: Box::new(self),
        }
    }

    /// True when the error is an emulator `404 Not Found` response.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Api { status, .. } => *status == 404,
            Error::Provision { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
