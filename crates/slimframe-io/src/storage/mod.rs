//! Storage adapters for cache blobs.
//!
//! - `fs`: local filesystem (default).
//! - `crate::memory_storage`: in-process map, selected with `memory://`.
//!
//! `build_storage` picks a backend from the configured cache location
//! (e.g. `/tmp/cache`, `file:///tmp/cache`, `memory://scratch`).

mod fs;
pub use fs::FsStorage;

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::memory_storage::MemoryStorage;

/// Byte-level blob storage.
pub trait Storage: Send + Sync {
    /// Write bytes to a path, replacing any previous content. Creates parent
    /// directories if needed.
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Read the full content of a path.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Delete a path. Idempotent (no error if path doesn't exist).
    fn delete(&self, path: &Path) -> Result<()>;

    fn exists(&self, path: &Path) -> Result<bool>;

    /// List all paths under a prefix, sorted.
    fn list(&self, prefix: &Path) -> Result<Vec<PathBuf>>;
}

/// Split a cache location into a backend and the directory inside it.
pub fn build_storage(location: &str) -> Result<(Box<dyn Storage>, PathBuf)> {
    match location.split_once("://") {
        Some(("memory", rest)) => Ok((Box::new(MemoryStorage::new()), PathBuf::from(rest))),
        Some(("file", rest)) => {
            let dir = if rest.starts_with('/') {
                PathBuf::from(rest)
            } else {
                PathBuf::from(format!("/{rest}"))
            };
            Ok((Box::new(FsStorage::new()), dir))
        }
        Some((other, _)) => Err(Error::Config(format!("unsupported cache scheme '{other}'"))),
        None => Ok((Box::new(FsStorage::new()), PathBuf::from(location))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_path_and_file_uri_use_the_filesystem() {
        let (_, dir) = build_storage("/tmp/slim").unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/slim"));
        let (_, dir) = build_storage("file:///tmp/slim").unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/slim"));
    }

    #[test]
    fn memory_scheme_round_trips_bytes() {
        let (storage, dir) = build_storage("memory://scratch").unwrap();
        let path = dir.join("a.sfb");
        storage.write(&path, b"abc").unwrap();
        assert_eq!(storage.read(&path).unwrap(), b"abc");
    }

    #[test]
    fn unknown_scheme_errors() {
        let err = build_storage("s3://bucket/cache").err().expect("should fail");
        assert!(err.to_string().contains("unsupported cache scheme 's3'"));
    }
}
