//! Session Index
//!
//! Information Hiding:
//! - Index file location and format hidden from the repository
//! - Corruption recovery (rebuild from session files) hidden behind `load`
//!
//! The index is a cache. Session files are the source of truth, so any read
//! problem here is answered by rebuilding rather than by an error.

use super::atomic::atomic_write;
use super::identity::validate_writable_id;
use super::types::{SessionHeader, SessionIndex};
use crate::error::Result;
use crate::storage::FileSystem;
use crate::utils::Notes;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Index document file name
pub const INDEX_FILE: &str = "index.json";
/// Last-session pointer file name
pub const POINTER_FILE: &str = "last_session";
/// Extension of session files
pub const SESSION_EXT: &str = "json";

/// Loads, saves and rebuilds `<session_dir>/index.json`
#[derive(Clone)]
pub struct IndexManager {
    fs: Arc<dyn FileSystem>,
    session_dir: PathBuf,
    notes: Notes,
}

impl IndexManager {
    pub fn new(fs: Arc<dyn FileSystem>, session_dir: PathBuf, notes: Notes) -> Self {
        Self {
            fs,
            session_dir,
            notes,
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.session_dir.join(INDEX_FILE)
    }

    /// Read the index, rebuilding it if it is unreadable or malformed.
    /// An absent index with no session files yields a fresh, unsaved index.
    pub async fn load(&self) -> SessionIndex {
        let path = self.index_path();

        match self.fs.exists(&path).await {
            Ok(true) => {}
            Ok(false) => return self.load_missing().await,
            Err(e) => {
                self.notes
                    .warn(&format!("[SessionIndex] Could not stat {:?}: {}", path, e));
                return self.rebuild().await;
            }
        }

        let raw = match self.fs.read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                self.notes
                    .warn(&format!("[SessionIndex] Could not read {:?}: {}", path, e));
                return self.rebuild().await;
            }
        };

        match serde_json::from_str::<SessionIndex>(&raw) {
            Ok(index) => {
                self.notes.debug(&format!(
                    "[SessionIndex] Loaded {} entries",
                    index.sessions.len()
                ));
                index
            }
            Err(e) => {
                self.notes
                    .warn(&format!("[SessionIndex] Malformed index, rebuilding: {}", e));
                self.rebuild().await
            }
        }
    }

    async fn load_missing(&self) -> SessionIndex {
        let has_sessions = self
            .session_files()
            .await
            .map(|files| !files.is_empty())
            .unwrap_or(false);

        if has_sessions {
            self.notes
                .debug("[SessionIndex] No index but session files exist, rebuilding");
            self.rebuild().await
        } else {
            SessionIndex::new()
        }
    }

    /// Scan the directory and rebuild the index from every readable session file.
    /// Unreadable files are skipped. The result is persisted best-effort.
    pub async fn rebuild(&self) -> SessionIndex {
        let mut index = SessionIndex::new();

        let files = match self.session_files().await {
            Ok(files) => files,
            Err(e) => {
                self.notes.warn(&format!(
                    "[SessionIndex] Could not list {:?}: {}",
                    self.session_dir, e
                ));
                return index;
            }
        };

        for path in files {
            let Some(id) = file_id(&path) else {
                continue;
            };

            let raw = match self.fs.read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) => {
                    self.notes
                        .warn(&format!("[SessionIndex] Skipping unreadable {:?}: {}", path, e));
                    continue;
                }
            };

            match serde_json::from_str::<SessionHeader>(&raw) {
                Ok(header) => {
                    let mut metadata = header.metadata;
                    if metadata.id != id {
                        self.notes.warn(&format!(
                            "[SessionIndex] {:?} claims id '{}', indexing as '{}'",
                            path, metadata.id, id
                        ));
                        metadata.id = id.clone();
                    }
                    index.sessions.insert(id, metadata);
                }
                Err(e) => {
                    self.notes
                        .warn(&format!("[SessionIndex] Skipping corrupt {:?}: {}", path, e));
                }
            }
        }

        self.notes.debug(&format!(
            "[SessionIndex] Rebuilt index with {} entries",
            index.sessions.len()
        ));

        if let Err(e) = self.save(&mut index).await {
            self.notes
                .warn(&format!("[SessionIndex] Could not persist rebuilt index: {}", e));
        }

        index
    }

    /// Persist the index atomically, refreshing `updated_at`
    pub async fn save(&self, index: &mut SessionIndex) -> Result<()> {
        index.updated_at = Utc::now();
        let json = serde_json::to_string_pretty(index)?;
        atomic_write(self.fs.as_ref(), &self.index_path(), json.as_bytes()).await?;
        self.notes.debug(&format!(
            "[SessionIndex] Saved {} entries",
            index.sessions.len()
        ));
        Ok(())
    }

    /// Session files directly under the directory, control and temp files excluded
    async fn session_files(&self) -> std::io::Result<Vec<PathBuf>> {
        let files = self.fs.list_files(&self.session_dir).await?;
        Ok(files.into_iter().filter(|p| is_session_file(p)).collect())
    }
}

fn is_session_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name != INDEX_FILE
        && name != POINTER_FILE
        && path.extension().and_then(|e| e.to_str()) == Some(SESSION_EXT)
}

/// Session id encoded in a session file name, if it is a valid one
fn file_id(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    validate_writable_id(stem).ok()?;
    Some(stem.to_string())
}
