// src/app/table/error.rs
// Error type shared by the table controller, the bootstrap loader and the HTTP layer.

use thiserror::Error;

/// Everything that can go wrong while driving a table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("no grid configuration supplied")]
    MissingConfig,

    #[error("failed to read table description {path}: {source}")]
    BootstrapRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid table description {path}: {source}")]
    BootstrapParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("failed to parse server response: {0}")]
    Decode(String),

    #[error("failed to write download {path}: {source}")]
    Download {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl TableError {
    /// Builds an `InvalidUrl` error from anything that displays a reason.
    pub fn invalid_url(url: &str, reason: impl std::fmt::Display) -> Self {
        TableError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
