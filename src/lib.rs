//! Convo Store - durable on-disk storage for agent conversation sessions
//!
//! Sessions are saved as one JSON document each, with a rebuildable index for
//! fast listing, a last-session pointer for quick resume, and a retention
//! limit applied after every save. All writes are atomic.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod session;
pub mod storage;
pub mod utils;

pub use crate::config::{SessionStoreConfig, Settings};
pub use crate::core::StoredMessage;
pub use error::{Result, SessionError};
pub use session::{
    RestoredSession, SaveOptions, SessionIndex, SessionMetadata, SessionStore, StoredSession,
};
pub use storage::{FileSystem, MemoryFileSystem, TokioFileSystem};
