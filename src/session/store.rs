//! Session Repository
//!
//! Information Hiding:
//! - File layout (`<id>.json`, `index.json`, `last_session`) hidden from callers
//! - Index maintenance and pointer repair happen inside save/delete
//! - Read failures degrade to "not found" instead of surfacing as errors
//!
//! Single-writer by design: two processes saving into the same directory can
//! race on the index read-modify-write and drop each other's index entry.
//! Session files are unaffected and [`SessionStore::rebuild_index`] restores
//! the missing entries.

use super::atomic::atomic_write;
use super::identity::{generate_id, is_reserved_id, validate_id, validate_writable_id};
use super::index::{IndexManager, POINTER_FILE, SESSION_EXT};
use super::summary::{build_context_summary, first_user_message};
use super::types::{RestoredSession, SaveOptions, SessionIndex, SessionMetadata, StoredSession};
use crate::config::SessionStoreConfig;
use crate::core::StoredMessage;
use crate::error::{Result, SessionError};
use crate::storage::FileSystem;
use crate::utils::Notes;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const UNKNOWN: &str = "unknown";

/// Persistent store of conversation sessions rooted at one directory
pub struct SessionStore {
    session_dir: PathBuf,
    max_sessions: usize,
    fs: Arc<dyn FileSystem>,
    notes: Notes,
    index: IndexManager,
}

impl SessionStore {
    /// Open a store, creating the session directory if needed
    pub async fn open(config: SessionStoreConfig) -> Result<Self> {
        let SessionStoreConfig {
            session_dir,
            max_sessions,
            fs,
            debug_log,
        } = config;

        fs.create_dir_all(&session_dir)
            .await
            .map_err(|e| SessionError::io(&session_dir, e))?;

        let notes = Notes::new(debug_log);
        let index = IndexManager::new(fs.clone(), session_dir.clone(), notes.clone());

        notes.debug(&format!(
            "[SessionStore] Opened {:?} (max {} sessions)",
            session_dir, max_sessions
        ));

        Ok(Self {
            session_dir,
            max_sessions: max_sessions.max(1),
            fs,
            notes,
            index,
        })
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    pub(super) fn notes(&self) -> &Notes {
        &self.notes
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.session_dir.join(format!("{}.{}", id, SESSION_EXT))
    }

    fn pointer_path(&self) -> PathBuf {
        self.session_dir.join(POINTER_FILE)
    }

    /// Save the complete message list of a session (upsert).
    ///
    /// Keeps the original `created_at` (and name/description when omitted) of an
    /// existing session, refreshes the index and the last-session pointer, then
    /// applies the retention limit.
    pub async fn save_session(
        &self,
        messages: &[StoredMessage],
        options: SaveOptions,
    ) -> Result<SessionMetadata> {
        let id = match &options.session_id {
            Some(id) => {
                validate_writable_id(id)?;
                id.clone()
            }
            None => generate_id(options.name.as_deref())?,
        };

        let path = self.session_path(&id);
        let previous = self.read_session(&path).await.map(|s| s.metadata);
        let now = Utc::now();

        let mut metadata = SessionMetadata {
            id: id.clone(),
            name: options
                .name
                .or_else(|| previous.as_ref().map(|p| p.name.clone()))
                .unwrap_or_else(|| id.clone()),
            description: options
                .description
                .or_else(|| previous.as_ref().and_then(|p| p.description.clone())),
            created_at: previous.as_ref().map(|p| p.created_at).unwrap_or(now),
            last_activity_at: now,
            message_count: messages.len(),
            first_message: first_user_message(messages),
            provider: options
                .provider
                .or_else(|| previous.as_ref().map(|p| p.provider.clone()))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            model: options
                .model
                .or_else(|| previous.as_ref().map(|p| p.model.clone()))
                .unwrap_or_else(|| UNKNOWN.to_string()),
        };
        if metadata.last_activity_at < metadata.created_at {
            metadata.last_activity_at = metadata.created_at;
        }

        let session = StoredSession {
            context_summary: Some(build_context_summary(&metadata, messages)),
            metadata: metadata.clone(),
            messages: messages.to_vec(),
        };
        let json = serde_json::to_string_pretty(&session)?;
        atomic_write(self.fs.as_ref(), &path, json.as_bytes()).await?;

        let mut index = self.index.load().await;
        index.sessions.insert(id.clone(), metadata.clone());
        self.index.save(&mut index).await?;

        self.write_pointer(&id).await?;

        self.notes.debug(&format!(
            "[SessionStore] Saved session '{}' with {} messages",
            id,
            messages.len()
        ));

        self.apply_retention().await?;

        Ok(metadata)
    }

    /// Load a session, or `None` if it is missing or unreadable
    pub async fn load_session(&self, id: &str) -> Result<Option<StoredSession>> {
        validate_id(id)?;
        if is_reserved_id(id) {
            return Ok(None);
        }
        Ok(self.read_session(&self.session_path(id)).await)
    }

    async fn read_session(&self, path: &Path) -> Option<StoredSession> {
        match self.fs.exists(path).await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                self.notes
                    .warn(&format!("[SessionStore] Could not stat {:?}: {}", path, e));
                return None;
            }
        }

        let raw = match self.fs.read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) => {
                self.notes
                    .warn(&format!("[SessionStore] Could not read {:?}: {}", path, e));
                return None;
            }
        };

        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                self.notes
                    .warn(&format!("[SessionStore] Corrupt session file {:?}: {}", path, e));
                None
            }
        }
    }

    /// Every indexed session, most recent activity first (ties: id descending)
    pub async fn list_sessions(&self) -> Vec<SessionMetadata> {
        self.index.load().await.sorted()
    }

    /// Delete a session and repair the index and pointer.
    ///
    /// Returns `false` if the session does not exist or its file could not be
    /// removed. Failing to persist the repaired index is an error.
    pub async fn delete_session(&self, id: &str) -> Result<bool> {
        validate_id(id)?;
        // control files are never sessions
        if is_reserved_id(id) {
            return Ok(false);
        }
        let path = self.session_path(id);

        match self.fs.exists(&path).await {
            Ok(true) => {}
            Ok(false) => return Ok(false),
            Err(e) => {
                self.notes
                    .warn(&format!("[SessionStore] Could not stat {:?}: {}", path, e));
                return Ok(false);
            }
        }

        if let Err(e) = self.fs.remove_file(&path).await {
            self.notes
                .warn(&format!("[SessionStore] Could not delete {:?}: {}", path, e));
            return Ok(false);
        }

        let mut index = self.index.load().await;
        index.sessions.remove(id);
        self.index.save(&mut index).await?;

        if self.read_pointer().await.as_deref() == Some(id) {
            self.repoint(&index).await?;
        }

        self.notes
            .debug(&format!("[SessionStore] Deleted session '{}'", id));
        Ok(true)
    }

    /// Point at the newest remaining session, or clear the pointer
    async fn repoint(&self, index: &SessionIndex) -> Result<()> {
        let remaining = index.sorted();
        match remaining.first() {
            Some(newest) => self.write_pointer(&newest.id).await,
            None => {
                let path = self.pointer_path();
                match self.fs.remove_file(&path).await {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(SessionError::io(path, e)),
                }
            }
        }
    }

    async fn write_pointer(&self, id: &str) -> Result<()> {
        atomic_write(self.fs.as_ref(), &self.pointer_path(), id.as_bytes()).await
    }

    async fn read_pointer(&self) -> Option<String> {
        let raw = self.fs.read_to_string(&self.pointer_path()).await.ok()?;
        let id = raw.trim();
        (!id.is_empty()).then(|| id.to_string())
    }

    /// Id of the most recently saved session, if it still exists
    pub async fn get_last_session(&self) -> Option<String> {
        let id = self.read_pointer().await?;

        if let Err(e) = validate_writable_id(&id) {
            self.notes
                .warn(&format!("[SessionStore] Ignoring bad last-session pointer: {}", e));
            return None;
        }

        match self.fs.exists(&self.session_path(&id)).await {
            Ok(true) => Some(id),
            _ => {
                self.notes.debug(&format!(
                    "[SessionStore] Last-session pointer '{}' is stale",
                    id
                ));
                None
            }
        }
    }

    /// Load whatever [`SessionStore::get_last_session`] points at
    pub async fn load_last_session(&self) -> Option<StoredSession> {
        let id = self.get_last_session().await?;
        self.read_session(&self.session_path(&id)).await
    }

    /// Messages and resume summary of a session, for conversation replay
    pub async fn restore_session(&self, id: &str) -> Result<Option<RestoredSession>> {
        Ok(self.load_session(id).await?.map(|session| RestoredSession {
            messages: session.messages,
            context_summary: session.context_summary,
        }))
    }

    pub async fn session_exists(&self, id: &str) -> Result<bool> {
        validate_id(id)?;
        if is_reserved_id(id) {
            return Ok(false);
        }
        Ok(self
            .fs
            .exists(&self.session_path(id))
            .await
            .unwrap_or(false))
    }

    /// Discard the current index and regenerate it from the session files
    pub async fn rebuild_index(&self) -> SessionIndex {
        self.index.rebuild().await
    }
}
