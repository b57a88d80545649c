/// Client error types

use thiserror::Error;

/// Errors surfaced by the client layer
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connection, timeout, decode)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a `success: false` envelope
    #[error("api error: {0}")]
    Api(String),
}
