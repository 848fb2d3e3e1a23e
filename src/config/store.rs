use crate::storage::{FileSystem, TokioFileSystem};
use crate::utils::DebugLog;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Retention limit used when nothing else is configured
pub const DEFAULT_MAX_SESSIONS: usize = 50;

/// Construction-time configuration for a [`crate::session::SessionStore`]
///
/// # Example
/// ```no_run
/// use convo_store::{SessionStore, SessionStoreConfig};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = SessionStoreConfig::new("./sessions")
///         .max_sessions(20)
///         .debug_log(|note: &str| eprintln!("{}", note));
///     let store = SessionStore::open(config).await?;
///     println!("{} sessions", store.list_sessions().await.len());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct SessionStoreConfig {
    pub session_dir: PathBuf,
    pub max_sessions: usize,
    pub fs: Arc<dyn FileSystem>,
    pub debug_log: Option<DebugLog>,
}

impl SessionStoreConfig {
    pub fn new(session_dir: impl Into<PathBuf>) -> Self {
        Self {
            session_dir: session_dir.into(),
            max_sessions: DEFAULT_MAX_SESSIONS,
            fs: Arc::new(TokioFileSystem::new()),
            debug_log: None,
        }
    }

    /// Clamped to at least 1 so a save never evicts itself
    pub fn max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub fn file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn debug_log(mut self, log: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.debug_log = Some(Arc::new(log));
        self
    }
}

impl fmt::Debug for SessionStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStoreConfig")
            .field("session_dir", &self.session_dir)
            .field("max_sessions", &self.max_sessions)
            .field("debug_log", &self.debug_log.is_some())
            .finish()
    }
}
