use reqwest::StatusCode;
use thiserror::Error;

/// Failure to complete an HTTP exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, DNS, TLS, timeout, or request construction failure.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    /// The response headers arrived but the body could not be read.
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request { source, .. } | Self::Body { source, .. } => source.status(),
        }
    }
}

/// The collection body was not a JSON array of objects.
#[derive(Debug, Error)]
#[error("collection response from {url} is not a JSON array of objects: {source}")]
pub struct DecodeError {
    pub url: String,
    #[source]
    pub source: serde_json::Error,
}

/// Any failure of the read phase. Both variants abort a run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
