//! Write-to-temp-then-rename
//!
//! Every mutation of the store goes through [`atomic_write`], so a reader of a
//! session file, the index, or the last-session pointer only ever sees a
//! complete old version or a complete new version.

use crate::error::{Result, SessionError};
use crate::storage::FileSystem;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Suffix of in-flight temp files; never matches the session-file extension
pub const TEMP_SUFFIX: &str = "tmp";

/// Sibling temp path unique per call: `<file>.<millis>-<random>.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let nonce: u32 = rand::random();
    path.with_file_name(format!(
        "{}.{}-{:08x}.{}",
        file_name,
        Utc::now().timestamp_millis(),
        nonce,
        TEMP_SUFFIX
    ))
}

/// Write `content` to `path` atomically.
///
/// On failure the temp file is removed best-effort and the original error is
/// returned.
pub async fn atomic_write(fs: &dyn FileSystem, path: &Path, content: &[u8]) -> Result<()> {
    let tmp = temp_path_for(path);

    if let Err(e) = fs.write(&tmp, content).await {
        discard_temp(fs, &tmp).await;
        return Err(SessionError::io(path, e));
    }

    if let Err(e) = fs.rename(&tmp, path).await {
        discard_temp(fs, &tmp).await;
        return Err(SessionError::io(path, e));
    }

    tracing::trace!("[AtomicWrite] Wrote {} bytes to {:?}", content.len(), path);
    Ok(())
}

async fn discard_temp(fs: &dyn FileSystem, tmp: &Path) {
    if let Err(e) = fs.remove_file(tmp).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!("[AtomicWrite] Could not remove temp file {:?}: {}", tmp, e);
        }
    }
}
