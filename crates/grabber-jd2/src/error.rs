//! JD2 client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Jd2Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] grabber_storage::StorageError),
}

/// Failure to get a 2xx response out of the daemon.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode query: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },
}
