//! End-to-end: source files -> optimized cache blobs -> loaded tables

use std::fs;
use std::path::{Path, PathBuf};

use slimframe_core::schema::DataType;
use slimframe_io::blob::HEADER_LEN;
use slimframe_io::memory_storage::MemoryStorage;
use slimframe_io::{
    read_csv, CategoryPhase, CategoryRegistry, Codec, CsvOptions, Error, FsStorage,
    RegistryManifest, TableCache,
};
use slimframe_optimize::{optimize, OptimizeOptions};
use tempfile::TempDir;

const SALES: &str = "\
order_id,store,amount,units
1,downtown,19.5,2
2,airport,7.25,1
3,downtown,,4
4,downtown,120.0,3
5,airport,3.5,1
6,downtown,42.0,2
";

const STORES: &str = "\
store,city,staff
downtown,Lyon,12
airport,Lyon,4
";

fn write_source(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("write source");
    path
}

fn fs_cache(dir: &TempDir) -> TableCache {
    TableCache::new(Box::new(FsStorage::new()), dir.path().join("cache"))
}

#[test]
fn test_cache_then_load_matches_optimized_sources() {
    let tmp = TempDir::new().unwrap();
    let sales = write_source(tmp.path(), "sales.csv", SALES);
    let stores = write_source(tmp.path(), "stores.csv", STORES);
    let cache = fs_cache(&tmp);
    let csv = CsvOptions::default();

    let mut reg = CategoryRegistry::new();
    reg.register_sources("sales", [&sales]);
    reg.register_sources("stores", [&stores]);
    assert_eq!(reg.cache_all(&cache, &csv, &OptimizeOptions::default()).unwrap(), 2);

    assert_eq!(
        reg.phase("sales"),
        Some(&CategoryPhase::Cached(vec![cache.blob_path("sales", 0)]))
    );
    assert!(cache.blob_path("stores", 0).exists());

    let loaded = reg.load_category("sales", &cache).unwrap().to_vec();
    let expected = optimize(&read_csv(&sales, &csv).unwrap());
    assert_eq!(loaded, vec![expected.clone()]);

    let types: Vec<DataType> = loaded[0].columns().iter().map(|c| c.data_type()).collect();
    assert_eq!(
        types,
        vec![DataType::Int8, DataType::Categorical, DataType::Float16, DataType::Int8]
    );
    assert_eq!(reg.tables("sales").unwrap(), &[expected][..]);
}

#[test]
fn test_multiple_sources_keep_their_order() {
    let tmp = TempDir::new().unwrap();
    let a = write_source(tmp.path(), "a.csv", "x\n1\n2\n");
    let b = write_source(tmp.path(), "b.csv", "x\n1000\n2000\n");
    let cache = fs_cache(&tmp);

    let mut reg = CategoryRegistry::new();
    reg.register_sources("parts", [a, b]);
    let written = reg
        .cache_category("parts", &cache, &CsvOptions::default(), &OptimizeOptions::default())
        .unwrap();
    assert_eq!(written, vec![cache.blob_path("parts", 0), cache.blob_path("parts", 1)]);

    let tables = reg.load_category("parts", &cache).unwrap();
    assert_eq!(tables[0].columns()[0].data_type(), DataType::Int8);
    assert_eq!(tables[1].columns()[0].data_type(), DataType::Int16);
}

#[test]
fn test_missing_source_leaves_category_in_sources_phase() {
    let tmp = TempDir::new().unwrap();
    let good = write_source(tmp.path(), "good.csv", "x\n1\n");
    let missing = tmp.path().join("missing.csv");
    let cache = fs_cache(&tmp);

    let mut reg = CategoryRegistry::new();
    reg.register_sources("c", [good, missing]);
    let err = reg
        .cache_category("c", &cache, &CsvOptions::default(), &OptimizeOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(reg.phase("c").map(CategoryPhase::name), Some("sources"));
    // The first blob was already written and stays.
    assert!(cache.blob_path("c", 0).exists());
}

#[test]
fn test_corrupted_blob_is_detected_on_load() {
    let storage = MemoryStorage::new();
    let cache = TableCache::new(Box::new(storage.clone()), "/blobs");
    let table = optimize(
        &slimframe_io::CsvReader::from_reader(SALES.as_bytes(), &CsvOptions::default())
            .read_table()
            .unwrap(),
    );
    let path = cache.store_indexed("sales", 0, &table).unwrap();

    storage
        .corrupt(&path, |bytes| bytes[HEADER_LEN + 1] ^= 0xFF)
        .unwrap();

    let mut reg = CategoryRegistry::new();
    reg.register_cached("sales", [&path]);
    assert!(matches!(
        reg.load_category("sales", &cache),
        Err(Error::ChecksumMismatch)
    ));
    assert_eq!(reg.phase("sales").map(CategoryPhase::name), Some("cached"));
}

#[test]
fn test_manifest_survives_save_and_reload() {
    let tmp = TempDir::new().unwrap();
    let sales = write_source(tmp.path(), "sales.csv", SALES);
    let cache = fs_cache(&tmp);
    let manifest_path = tmp.path().join("registry.yaml");

    let mut reg = CategoryRegistry::new();
    reg.register_sources("sales", [&sales]);
    reg.register_sources("later", [tmp.path().join("later.csv")]);
    reg.cache_category("sales", &cache, &CsvOptions::default(), &OptimizeOptions::default())
        .unwrap();
    reg.to_manifest().save(&manifest_path).unwrap();

    let manifest = RegistryManifest::load(&manifest_path).unwrap();
    assert_eq!(manifest.cached["sales"], vec![cache.blob_path("sales", 0)]);
    assert!(manifest.sources.contains_key("later"));

    let mut reloaded = CategoryRegistry::from_manifest(manifest);
    let tables = reloaded.load_category("sales", &cache).unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].num_rows(), 6);
}

#[test]
fn test_recaching_overwrites_previous_blob() {
    let tmp = TempDir::new().unwrap();
    let cache = fs_cache(&tmp);
    let src = write_source(tmp.path(), "v.csv", "x\n1\n");

    let mut reg = CategoryRegistry::new();
    reg.register_sources("v", [&src]);
    reg.cache_all(&cache, &CsvOptions::default(), &OptimizeOptions::default())
        .unwrap();

    fs::write(&src, "x\n100000\n").unwrap();
    reg.register_sources("v", [&src]);
    reg.cache_all(&cache, &CsvOptions::default(), &OptimizeOptions::default())
        .unwrap();

    let tables = reg.load_category("v", &cache).unwrap();
    assert_eq!(tables[0].columns()[0].data_type(), DataType::Int32);
}

#[cfg(feature = "zstd")]
#[test]
fn test_zstd_blobs_load_back() {
    let tmp = TempDir::new().unwrap();
    let sales = write_source(tmp.path(), "sales.csv", SALES);
    let cache = fs_cache(&tmp).with_codec(Codec::Zstd);

    let mut reg = CategoryRegistry::new();
    reg.register_sources("sales", [&sales]);
    reg.cache_all(&cache, &CsvOptions::default(), &OptimizeOptions::default())
        .unwrap();
    let tables = reg.load_category("sales", &cache).unwrap();
    assert_eq!(tables[0].num_rows(), 6);
}

#[cfg(feature = "lz4")]
#[test]
fn test_lz4_blobs_load_back() {
    let tmp = TempDir::new().unwrap();
    let sales = write_source(tmp.path(), "sales.csv", SALES);
    let cache = fs_cache(&tmp).with_codec(Codec::Lz4);

    let mut reg = CategoryRegistry::new();
    reg.register_sources("sales", [&sales]);
    reg.cache_all(&cache, &CsvOptions::default(), &OptimizeOptions::default())
        .unwrap();
    let expected = optimize(&read_csv(&sales, &CsvOptions::default()).unwrap());
    let tables = reg.load_category("sales", &cache).unwrap();
    assert_eq!(tables, &[expected][..]);
}

#[cfg(not(feature = "lz4"))]
#[test]
fn test_codec_without_feature_fails_on_store() {
    let tmp = TempDir::new().unwrap();
    let cache = fs_cache(&tmp).with_codec(Codec::Lz4);
    let table = read_csv(write_source(tmp.path(), "s.csv", STORES), &CsvOptions::default()).unwrap();
    assert!(matches!(
        cache.store_indexed("stores", 0, &table),
        Err(Error::CodecUnsupported(_))
    ));
}
