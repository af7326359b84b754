//! `TableCache`: a storage backend, a cache directory, and a codec.
//!
//! The cache directory is always explicit; nothing here reads globals.

use std::path::{Path, PathBuf};

use slimframe_core::config::SlimConfig;
use slimframe_core::types::Table;

use crate::blob::{decode_table, encode_table, BLOB_EXTENSION};
use crate::codec::Codec;
use crate::error::Result;
use crate::storage::{build_storage, Storage};

pub struct TableCache {
    storage: Box<dyn Storage>,
    dir: PathBuf,
    codec: Codec,
}

impl TableCache {
    pub fn new(storage: Box<dyn Storage>, dir: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            dir: dir.into(),
            codec: Codec::None,
        }
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Backend and directory from `cache_dir`, codec from `codec`.
    pub fn from_config(cfg: &SlimConfig) -> Result<Self> {
        let (storage, dir) = build_storage(&cfg.cache_dir)?;
        let codec: Codec = cfg.codec.parse()?;
        Ok(Self::new(storage, dir).with_codec(codec))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// `{dir}/{category}_{index}.sfb`
    pub fn blob_path(&self, category: &str, index: usize) -> PathBuf {
        self.dir
            .join(format!("{category}_{index}.{BLOB_EXTENSION}"))
    }

    /// Write `table` to `path`, replacing whatever is there.
    pub fn store(&self, path: &Path, table: &Table) -> Result<()> {
        let bytes = encode_table(table, self.codec)?;
        self.storage.write(path, &bytes)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), bytes = bytes.len(), codec = %self.codec, "stored blob");
        Ok(())
    }

    /// Store under the derived path for `(category, index)` and return it.
    pub fn store_indexed(&self, category: &str, index: usize, table: &Table) -> Result<PathBuf> {
        let path = self.blob_path(category, index);
        self.store(&path, table)?;
        Ok(path)
    }

    pub fn load(&self, path: &Path) -> Result<Table> {
        let bytes = self.storage.read(path)?;
        decode_table(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_storage::MemoryStorage;
    use slimframe_core::types::{Column, ColumnData};

    #[test]
    fn blob_path_follows_category_and_index() {
        let cache = TableCache::new(Box::new(MemoryStorage::new()), "/cache");
        assert_eq!(cache.blob_path("sales", 0), PathBuf::from("/cache/sales_0.sfb"));
        assert_eq!(cache.blob_path("sales", 12), PathBuf::from("/cache/sales_12.sfb"));
    }

    #[test]
    fn store_then_load() {
        let cache = TableCache::new(Box::new(MemoryStorage::new()), "/cache");
        let table = Table::try_new(vec![Column::new("a", ColumnData::Int16(vec![Some(300)]))]).unwrap();
        let path = cache.store_indexed("x", 3, &table).unwrap();
        assert_eq!(cache.load(&path).unwrap(), table);
        assert!(cache.storage().exists(&path).unwrap());
    }

    #[test]
    fn from_config_parses_codec_and_location() {
        let cfg = SlimConfig {
            cache_dir: "memory://blobs".into(),
            codec: "lz4".into(),
            ..SlimConfig::default()
        };
        let cache = TableCache::from_config(&cfg).unwrap();
        assert_eq!(cache.dir(), Path::new("blobs"));
        assert_eq!(cache.codec(), Codec::Lz4);

        let bad = SlimConfig {
            codec: "gzip".into(),
            ..SlimConfig::default()
        };
        assert!(TableCache::from_config(&bad).is_err());
    }
}
