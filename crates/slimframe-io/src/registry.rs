//! Category registry with an explicit phase per category.
//!
//! A category moves `Sources -> Cached -> Loaded`. Each transition checks the
//! current phase, so stale paths are never mistaken for cache blobs or tables.
//! A failure part-way through a category leaves its phase untouched; blobs
//! already written stay where they are.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use slimframe_core::types::Table;
use slimframe_optimize::{optimize_with, OptimizeOptions};

use crate::cache::TableCache;
use crate::error::{Error, Result};
use crate::readers::csv::{read_csv, CsvOptions};

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryPhase {
    /// Delimited-text source files, not yet cached.
    Sources(Vec<PathBuf>),
    /// Cache blobs, in source order.
    Cached(Vec<PathBuf>),
    /// Tables loaded from the cache blobs, in the same order.
    Loaded(Vec<Table>),
}

impl CategoryPhase {
    pub fn name(&self) -> &'static str {
        match self {
            CategoryPhase::Sources(_) => "sources",
            CategoryPhase::Cached(_) => "cached",
            CategoryPhase::Loaded(_) => "loaded",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CategoryPhase::Sources(p) | CategoryPhase::Cached(p) => p.len(),
            CategoryPhase::Loaded(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tables(&self) -> Option<&[Table]> {
        match self {
            CategoryPhase::Loaded(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryRegistry {
    categories: BTreeMap<String, CategoryPhase>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register source files for a category, returning whatever it replaced.
    pub fn register_sources<I, P>(&mut self, category: impl Into<String>, paths: I) -> Option<CategoryPhase>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths = paths.into_iter().map(Into::into).collect();
        self.categories
            .insert(category.into(), CategoryPhase::Sources(paths))
    }

    /// Register existing cache blobs for a category.
    pub fn register_cached<I, P>(&mut self, category: impl Into<String>, paths: I) -> Option<CategoryPhase>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths = paths.into_iter().map(Into::into).collect();
        self.categories
            .insert(category.into(), CategoryPhase::Cached(paths))
    }

    pub fn phase(&self, category: &str) -> Option<&CategoryPhase> {
        self.categories.get(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn remove(&mut self, category: &str) -> Option<CategoryPhase> {
        self.categories.remove(category)
    }

    /// Loaded tables for a category.
    pub fn tables(&self, category: &str) -> Result<&[Table]> {
        match self.get(category)? {
            CategoryPhase::Loaded(t) => Ok(t),
            other => Err(phase_mismatch(category, "loaded", other)),
        }
    }

    fn get(&self, category: &str) -> Result<&CategoryPhase> {
        self.categories
            .get(category)
            .ok_or_else(|| Error::UnknownCategory(category.to_string()))
    }

    fn paths_in(&self, category: &str, expected: &'static str) -> Result<Vec<PathBuf>> {
        match (self.get(category)?, expected) {
            (CategoryPhase::Sources(p), "sources") | (CategoryPhase::Cached(p), "cached") => {
                Ok(p.clone())
            }
            (other, _) => Err(phase_mismatch(category, expected, other)),
        }
    }

    /// Read, optimize and cache every source file of `category`; the category
    /// moves to `Cached` with the written blob paths.
    pub fn cache_category(
        &mut self,
        category: &str,
        cache: &TableCache,
        csv: &CsvOptions,
        opts: &OptimizeOptions,
    ) -> Result<Vec<PathBuf>> {
        let sources = self.paths_in(category, "sources")?;
        let mut written = Vec::with_capacity(sources.len());
        for (index, source) in sources.iter().enumerate() {
            written.push(cache_one(category, index, source, cache, csv, opts)?);
        }
        self.categories
            .insert(category.to_string(), CategoryPhase::Cached(written.clone()));
        Ok(written)
    }

    /// Cache every category still in the `Sources` phase. Returns the number
    /// of categories cached.
    pub fn cache_all(
        &mut self,
        cache: &TableCache,
        csv: &CsvOptions,
        opts: &OptimizeOptions,
    ) -> Result<usize> {
        let pending: Vec<String> = self
            .categories
            .iter()
            .filter(|(_, p)| matches!(p, CategoryPhase::Sources(_)))
            .map(|(k, _)| k.clone())
            .collect();
        for category in &pending {
            self.cache_category(category, cache, csv, opts)?;
        }
        Ok(pending.len())
    }

    /// Load every blob of `category`; the category moves to `Loaded`.
    pub fn load_category(&mut self, category: &str, cache: &TableCache) -> Result<&[Table]> {
        let blobs = self.paths_in(category, "cached")?;
        let tables = blobs
            .iter()
            .map(|path| {
                #[cfg(feature = "tracing")]
                tracing::info!(category, path = %path.display(), "loading cached table");
                cache.load(path)
            })
            .collect::<Result<Vec<_>>>()?;

        let slot = self
            .categories
            .entry(category.to_string())
            .or_insert(CategoryPhase::Loaded(Vec::new()));
        *slot = CategoryPhase::Loaded(tables);
        Ok(slot.tables().unwrap_or(&[]))
    }

    /// Persistable view of the registry. Loaded categories are omitted.
    pub fn to_manifest(&self) -> RegistryManifest {
        let mut manifest = RegistryManifest::default();
        for (name, phase) in &self.categories {
            match phase {
                CategoryPhase::Sources(p) => {
                    manifest.sources.insert(name.clone(), p.clone());
                }
                CategoryPhase::Cached(p) => {
                    manifest.cached.insert(name.clone(), p.clone());
                }
                CategoryPhase::Loaded(_) => {}
            }
        }
        manifest
    }

    pub fn from_manifest(manifest: RegistryManifest) -> Self {
        let mut reg = Self::new();
        for (name, paths) in manifest.sources {
            reg.register_sources(name, paths);
        }
        for (name, paths) in manifest.cached {
            reg.register_cached(name, paths);
        }
        reg
    }
}

fn cache_one(
    category: &str,
    index: usize,
    source: &Path,
    cache: &TableCache,
    csv: &CsvOptions,
    opts: &OptimizeOptions,
) -> Result<PathBuf> {
    #[cfg(feature = "tracing")]
    tracing::info!(category, index, source = %source.display(), "caching source file");
    let table = read_csv(source, csv)?;
    let optimized = optimize_with(&table, opts);
    cache.store_indexed(category, index, &optimized)
}

fn phase_mismatch(category: &str, expected: &'static str, actual: &CategoryPhase) -> Error {
    Error::PhaseMismatch {
        category: category.to_string(),
        expected,
        actual: actual.name(),
    }
}

/// On-disk form of a registry: category -> paths, split by phase.
///
/// ```yaml
/// sources:
///   sales: [data/sales_2023.csv, data/sales_2024.csv]
/// cached:
///   stores: [/tmp/slimframe-cache/stores_0.sfb]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryManifest {
    #[serde(default)]
    pub sources: BTreeMap<String, Vec<PathBuf>>,
    #[serde(default)]
    pub cached: BTreeMap<String, Vec<PathBuf>>,
}

impl RegistryManifest {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_yaml_string()?)?;
        Ok(())
    }
}
