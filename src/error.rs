//! Error types for the session store
//!
//! Only validation and write-path failures surface here. Read paths degrade
//! to `None`, `false`, or a rebuilt index and report the cause through logging.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`crate::session::SessionStore`] operations
#[derive(Error, Debug)]
pub enum SessionError {
    /// Session id failed the path-traversal / charset check
    #[error("Invalid session id: {0}")]
    InvalidId(String),

    /// Custom session name could not be turned into a safe id
    #[error("Invalid session name: {0}")]
    InvalidName(String),

    /// Custom session name collides with a control file or device name
    #[error("Session name \"{0}\" is reserved")]
    ReservedName(String),

    /// Filesystem failure while mutating the store
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Outgoing document could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SessionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the store
pub type Result<T> = std::result::Result<T, SessionError>;
