//! Error types for the KLADR client

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// KLADR client errors
#[derive(Error, Debug)]
pub enum Error {
    /// No usable HTTP transport could be built at first use.
    #[error("HTTP transport unavailable: {0}")]
    Configuration(String),

    /// A recognized search option holds a value the API does not accept,
    /// or a required option is missing.
    #[error("invalid search option `{key}`: {reason}")]
    Validation { key: &'static str, reason: String },

    /// The network round trip itself failed.
    #[error("HTTP transport error: {0}")]
    Transport(String),

    /// The API answered with a 4xx status.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// The API answered with a 5xx status.
    #[error("HTTP server error: {0}")]
    Server(String),

    /// The response body is not valid JSON.
    #[error("error on parse response: {0}")]
    Decode(#[from] serde_json::Error),
}
