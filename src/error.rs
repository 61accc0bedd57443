//! Errors that can happen while talking to the server or writing the export

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Everything that can go wrong in this crate
#[derive(Debug, Error)]
pub enum ExportError {
    /// The server rejected the credentials
    #[error("authentication failed for user {username}")]
    Authentication { username: String },

    /// The server could not be reached (DNS, refused connection, TLS, timeout...)
    #[error("unable to reach the CalDAV server: {0}")]
    Connection(String),

    /// An operation that needs a session was called before `connect()`
    #[error("not connected to the server. Call `connect()` first or enable autoconnect")]
    NotConnected,

    /// The export directory or one of its files could not be created or written
    #[error("unable to write {path:?}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The server answered, but not with something we can use
    #[error("invalid response from the server: {0}")]
    InvalidResponse(String),

    #[error("invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    InvalidArgument(String),

    /// The summary or the report could not be turned into JSON
    #[error("unable to serialize the report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The interactive password prompt failed (e.g. no terminal)
    #[error("unable to read the password: {0}")]
    Prompt(#[source] std::io::Error),
}

impl ExportError {
    pub(crate) fn file_system(path: &Path, source: std::io::Error) -> Self {
        Self::FileSystem { path: path.to_path_buf(), source }
    }
}

impl From<reqwest::Error> for ExportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_body() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}

impl From<minidom::Error> for ExportError {
    fn from(err: minidom::Error) -> Self {
        Self::InvalidResponse(format!("unable to parse XML: {}", err))
    }
}
