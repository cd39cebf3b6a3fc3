//! Typed errors for the HTTP backend. The search controller flattens these
//! into its own tagged outcome; the CLI surfaces them directly for the
//! metadata and word-count commands.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connect failure, timeout, or any other transport-level error.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("backend returned {status} for {url}")]
    Status { url: String, status: StatusCode },

    /// The response body was not the expected JSON shape.
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("could not build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}
