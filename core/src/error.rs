//! Error types for the subscription-manager client.
//!
//! # Design
//! Every failure surfaces immediately to the caller; the client retries
//! nothing and swallows nothing. Non-2xx responses land in a single `Http`
//! variant carrying the raw status code and body, so callers decide policy
//! with the server's whole answer in hand instead of pattern-matching a
//! taxonomy the client invented.

use thiserror::Error;

/// Errors returned by
/// [`SubscriptionManagerClient`](crate::SubscriptionManagerClient) operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The injected transport failed before producing a response.
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a status outside the 2xx range.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}
