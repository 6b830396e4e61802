//! Error types for the HTTP transport.

/// Error creating an HTTP transport.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Endpoint URL cannot be used for requests.
    #[error("invalid endpoint URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}
