use super::store::SessionStore;
use crate::error::Result;

impl SessionStore {
    /// Delete every session beyond the `keep_count` most recent ones.
    /// Returns how many were removed.
    pub async fn purge_sessions(&self, keep_count: usize) -> Result<usize> {
        let sessions = self.list_sessions().await;
        if sessions.len() <= keep_count {
            return Ok(0);
        }

        let mut removed = 0;
        for metadata in &sessions[keep_count..] {
            if self.delete_session(&metadata.id).await? {
                removed += 1;
            }
        }

        if removed > 0 {
            self.notes().debug(&format!(
                "[SessionStore] Purged {} sessions, keeping {}",
                removed, keep_count
            ));
        }
        Ok(removed)
    }

    /// [`SessionStore::purge_sessions`] with the configured limit; runs after every save
    pub async fn apply_retention(&self) -> Result<usize> {
        self.purge_sessions(self.max_sessions()).await
    }
}
