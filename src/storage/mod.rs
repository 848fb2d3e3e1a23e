//! Filesystem Abstraction
//!
//! Information Hiding:
//! - Storage backend implementation details hidden behind trait
//! - Allows swapping between the real disk and an in-memory tree without API changes
//! - The session store only ever talks to this trait, never to `tokio::fs` directly

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

pub mod filesystem;
pub mod memory;

pub use filesystem::TokioFileSystem;
pub use memory::MemoryFileSystem;

/// Trait defining the filesystem operations the session store needs.
/// Implementations can target a local disk, an in-memory map, or any other backend
/// that offers an atomic rename.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read a whole file as UTF-8
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Create or truncate a file with the given contents
    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Rename `from` onto `to`, replacing `to` if it exists.
    /// Must be atomic with respect to readers of `to`.
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove a single file
    async fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Check if a path exists
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// List the files directly under `dir` (no recursion, no directories)
    async fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Create a directory and all missing parents
    async fn create_dir_all(&self, dir: &Path) -> io::Result<()>;
}
