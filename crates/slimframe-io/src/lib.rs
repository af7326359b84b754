#![forbid(unsafe_code)]
//! slimframe-io: everything that touches bytes or files.
//!
//! - `readers::csv`: delimited text -> `Table` with per-column type inference.
//! - `blob`/`codec`: the on-disk cache format (header, payload, checksum).
//! - `storage`: where blobs live (`FsStorage`, `MemoryStorage`).
//! - `cache`: `TableCache`, which owns the `{category}_{index}` naming rule.
//! - `registry`: phase-tagged category registry (sources -> cached -> loaded).

pub mod blob;
pub mod cache;
pub mod codec;
pub mod error;
pub mod memory_storage;
pub mod readers;
pub mod registry;
pub mod storage;

pub use cache::TableCache;
pub use codec::Codec;
pub use error::{Error, Result};
pub use readers::csv::{read_csv, CsvOptions, CsvReader};
pub use registry::{CategoryPhase, CategoryRegistry, RegistryManifest};
pub use storage::{FsStorage, Storage};
