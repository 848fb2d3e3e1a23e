//! In-Memory Filesystem
//!
//! Information Hiding:
//! - HashMap storage structure hidden from users
//! - Thread-safe access via RwLock hidden behind async interface
//! - Suitable for testing and ephemeral stores
//!
//! Also counts every call and can inject failures, so tests can prove that
//! validation happens before I/O and that atomic writes clean up after themselves.

use super::FileSystem;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tree {
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
}

/// In-memory filesystem using HashMap
/// Data is lost when process terminates
#[derive(Clone, Default)]
pub struct MemoryFileSystem {
    tree: Arc<RwLock<Tree>>,
    ops: Arc<AtomicUsize>,
    fail_next_rename: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trait calls made so far
    pub fn operation_count(&self) -> usize {
        self.ops.load(Ordering::SeqCst)
    }

    /// Make the next `rename` fail after the source file has been written
    pub fn fail_next_rename(&self) {
        self.fail_next_rename.store(true, Ordering::SeqCst);
    }

    /// Make every `write` fail until switched off again
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Paths of every stored file, sorted
    pub async fn paths(&self) -> Vec<PathBuf> {
        let tree = self.tree.read().await;
        let mut paths: Vec<PathBuf> = tree.files.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn tick(&self) {
        self.ops.fetch_add(1, Ordering::SeqCst);
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.tick();
        let tree = self.tree.read().await;
        let bytes = tree.files.get(path).ok_or_else(|| not_found(path))?;
        String::from_utf8(bytes.clone())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.tick();
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected write failure"));
        }
        let mut tree = self.tree.write().await;
        tree.files.insert(path.to_path_buf(), contents.to_vec());
        tracing::trace!("[MemoryFileSystem] Wrote {} bytes to {:?}", contents.len(), path);
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.tick();
        if self.fail_next_rename.swap(false, Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected rename failure"));
        }
        let mut tree = self.tree.write().await;
        let bytes = tree.files.remove(from).ok_or_else(|| not_found(from))?;
        tree.files.insert(to.to_path_buf(), bytes);
        Ok(())
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.tick();
        let mut tree = self.tree.write().await;
        tree.files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    async fn exists(&self, path: &Path) -> io::Result<bool> {
        self.tick();
        let tree = self.tree.read().await;
        Ok(tree.files.contains_key(path) || tree.dirs.contains(path))
    }

    async fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        self.tick();
        let tree = self.tree.read().await;
        if !tree.dirs.contains(dir) {
            return Err(not_found(dir));
        }
        Ok(tree
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect())
    }

    async fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        self.tick();
        let mut tree = self.tree.write().await;
        for ancestor in dir.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                tree.dirs.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }
}
