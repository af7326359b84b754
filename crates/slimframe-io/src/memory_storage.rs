//! In-memory storage backend for testing.
//!
//! Provides a map-based storage that implements the `Storage` trait.
//! Used for the `memory://` cache scheme to avoid file I/O.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::storage::Storage;

/// Thread-safe in-memory storage. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    data: Arc<Mutex<BTreeMap<PathBuf, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<PathBuf, Vec<u8>>>> {
        self.data
            .lock()
            .map_err(|_| Error::Storage("memory storage lock poisoned".into()))
    }

    /// Get the number of stored objects
    pub fn len(&self) -> usize {
        self.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite stored bytes in place (used by tests to simulate corruption).
    pub fn corrupt(&self, path: &Path, f: impl FnOnce(&mut Vec<u8>)) -> Result<()> {
        let mut data = self.lock()?;
        let bytes = data
            .get_mut(path)
            .ok_or_else(|| Error::Storage(format!("path not found: {}", path.display())))?;
        f(bytes);
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.lock()?.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.lock()?
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Storage(format!("path not found: {}", path.display())))
    }

    fn delete(&self, path: &Path) -> Result<()> {
        self.lock()?.remove(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.lock()?.contains_key(path))
    }

    fn list(&self, prefix: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .lock()?
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.write(Path::new("/c/x.sfb"), b"1").unwrap();
        assert!(b.exists(Path::new("/c/x.sfb")).unwrap());
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn list_filters_by_prefix() {
        let s = MemoryStorage::new();
        s.write(Path::new("/c/a_0.sfb"), b"").unwrap();
        s.write(Path::new("/c/a_1.sfb"), b"").unwrap();
        s.write(Path::new("/d/b_0.sfb"), b"").unwrap();
        assert_eq!(
            s.list(Path::new("/c")).unwrap(),
            vec![PathBuf::from("/c/a_0.sfb"), PathBuf::from("/c/a_1.sfb")]
        );
        s.delete(Path::new("/c/a_0.sfb")).unwrap();
        assert_eq!(s.len(), 2);
    }
}
