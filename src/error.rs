//! Error types for ingestion and configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that end one connection to the event stream.
///
/// Everything except [`TooManyBadLines`](IngestError::TooManyBadLines) is
/// recovered from by backing off and reconnecting.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Could not establish the connection.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The server answered with an error status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Reading from an established connection failed.
    #[error("Read failed: {0}")]
    Read(String),

    /// No complete line arrived within the read timeout.
    #[error("No complete line received within {0:?}")]
    Timeout(Duration),

    /// The server closed the stream.
    #[error("Stream closed by server")]
    Closed,

    /// Too many consecutive lines matched no protocol rule.
    #[error("Too many bad lines: {count} consecutive unrecognized lines (ceiling {ceiling})")]
    TooManyBadLines { count: u32, ceiling: u32 },
}

impl IngestError {
    /// Returns true if the error trips the circuit breaker rather than
    /// triggering a reconnect.
    pub fn is_fatal(&self) -> bool {
        matches!(self, IngestError::TooManyBadLines { .. })
    }
}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            IngestError::Connection(format!("timed out: {}", err))
        } else if err.is_connect() {
            IngestError::Connection(err.to_string())
        } else if err.is_status() {
            IngestError::Http(err.to_string())
        } else if err.is_body() || err.is_decode() {
            IngestError::Read(err.to_string())
        } else {
            IngestError::Connection(err.to_string())
        }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Read(err.to_string())
    }
}

/// Errors that prevent startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file or environment could not be loaded.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A setting has an unusable value.
    #[error("Invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// The URL file could not be read.
    #[error("Failed to read URL file {}: {source}", path.display())]
    UrlFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither a URL nor a non-empty URL file was given.
    #[error("No stream URL configured (use --url or put it in {})", path.display())]
    MissingUrl { path: PathBuf },
}
