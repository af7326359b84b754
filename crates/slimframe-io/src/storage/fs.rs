use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::storage::Storage;

/// Local filesystem storage (rooted at the host filesystem).
///
/// Writes go straight to the target path: no temp file, no rename. A crash
/// mid-write can leave a truncated blob, which `blob::decode_table` rejects.
#[derive(Debug, Clone, Default)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        Self
    }
}

fn storage_err(op: &str, path: &Path, e: std::io::Error) -> Error {
    Error::Storage(format!("{op} {}: {e}", path.display()))
}

impl Storage for FsStorage {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| storage_err("mkparent", parent, e))?;
        }
        let mut f = File::create(path).map_err(|e| storage_err("create", path, e))?;
        f.write_all(bytes).map_err(|e| storage_err("write", path, e))?;
        f.flush().map_err(|e| storage_err("flush", path, e))?;
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| storage_err("read", path, e))
    }

    fn delete(&self, path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path).map_err(|e| storage_err("delete", path, e))?;
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(path.is_file())
    }

    fn list(&self, prefix: &Path) -> Result<Vec<PathBuf>> {
        let mut results = Vec::new();

        if !prefix.exists() {
            return Ok(results);
        }

        if prefix.is_file() {
            results.push(prefix.to_path_buf());
            return Ok(results);
        }

        fn visit_dirs(dir: &Path, results: &mut Vec<PathBuf>) -> std::io::Result<()> {
            for entry in fs::read_dir(dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    visit_dirs(&path, results)?;
                } else {
                    results.push(path);
                }
            }
            Ok(())
        }

        visit_dirs(prefix, &mut results).map_err(|e| storage_err("list", prefix, e))?;
        results.sort();
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/blob.sfb");
        let fs = FsStorage::new();
        fs.write(&path, b"first").unwrap();
        fs.write(&path, b"second").unwrap();
        assert_eq!(fs.read(&path).unwrap(), b"second");
        assert!(fs.exists(&path).unwrap());
        assert_eq!(fs.list(dir.path()).unwrap(), vec![path.clone()]);
        fs.delete(&path).unwrap();
        fs.delete(&path).unwrap();
        assert!(!fs.exists(&path).unwrap());
    }

    #[test]
    fn read_missing_is_storage_error() {
        let err = FsStorage::new().read(Path::new("/no/such/blob.sfb")).unwrap_err();
        assert!(err.to_string().starts_with("storage error: read /no/such/blob.sfb"));
    }
}
