//! Result and error types for cockpit end-to-end tests.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for cockpit-e2e operations
pub type E2eResult<T> = Result<T, E2eError>;

/// Errors that can occur while driving the console or preparing a scenario
#[derive(Debug, Error)]
pub enum E2eError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Page error (the browser answered, but the page could not be used)
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// No element matched a locator that was interacted with
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// CSS selector that matched nothing
        selector: String,
    },

    /// Element resolved but the interaction was rejected
    #[error("Interaction with {selector} failed: {message}")]
    InteractionFailed {
        /// CSS selector of the element
        selector: String,
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Fixture file does not exist
    #[error("Resource {name} not found at {}", .path.display())]
    ResourceNotFound {
        /// Requested resource name
        name: String,
        /// Path that was looked up
        path: PathBuf,
    },

    /// No backend mapping for the given operation
    #[error("Unsupported operation {resource}.{action}")]
    UnsupportedOperation {
        /// Resource name
        resource: String,
        /// Action name
        action: String,
    },

    /// Payload is missing a field the backend call needs
    #[error("Invalid payload for {resource}.{action}: {message}")]
    InvalidPayload {
        /// Resource name
        resource: String,
        /// Action name
        action: String,
        /// Error message
        message: String,
    },

    /// Backend answered with a non-success status or could not be reached
    #[error("Backend error{}: {message}", status_suffix(.status))]
    Backend {
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// Response body or transport error
        message: String,
    },

    /// A scenario call failed and the remaining calls were skipped
    #[error("Setup failed at {resource}.{action} payload #{payload_index}: {source}")]
    SetupFailed {
        /// Resource of the failing call
        resource: String,
        /// Action of the failing call
        action: String,
        /// Index of the payload within its operation
        payload_index: usize,
        /// Underlying failure
        #[source]
        source: Box<E2eError>,
    },

    /// Invalid state error (operation called in wrong state)
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" {s}")).unwrap_or_default()
}

impl E2eError {
    /// Create a backend error from a status code and body
    #[must_use]
    pub fn backend(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid payload error
    #[must_use]
    pub fn invalid_payload(
        resource: impl Into<String>,
        action: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidPayload {
            resource: resource.into(),
            action: action.into(),
            message: message.into(),
        }
    }

    /// Check whether this error aborted a scenario
    #[must_use]
    pub const fn is_setup_failure(&self) -> bool {
        matches!(self, Self::SetupFailed { .. })
    }
}
