//! Cache blob layout.
//!
//! Layout on disk:
//! [ magic: u32 ][ version: u16 ][ codec: u8 ][ reserved: u8 ]
//! [ uncompressed_len: u64 ][ compressed_len: u64 ]
//! [ payload bytes … ]
//! [ blake3 checksum over (header || payload): 32 bytes ]
//!
//! The payload is the JSON-serialized `Table`.

use slimframe_core::hash::hash_parts;
use slimframe_core::types::Table;

use crate::codec::{self, Codec};
use crate::error::{Error, Result};

pub const MAGIC: u32 = 0x534C_4D46; // "SLMF"
pub const VERSION: u16 = 1;
pub const HEADER_LEN: usize = 4 + 2 + 1 + 1 + 8 + 8;
pub const CHECKSUM_LEN: usize = 32;

/// File extension for cache blobs.
pub const BLOB_EXTENSION: &str = "sfb";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHeader {
    pub magic: u32,
    pub version: u16,
    pub codec: Codec,
    pub uncompressed_len: u64,
    pub compressed_len: u64,
}

impl BlobHeader {
    pub fn new(codec: Codec, uncompressed_len: u64, compressed_len: u64) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            codec,
            uncompressed_len,
            compressed_len,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN);
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.push(self.codec as u8);
        out.push(0u8); // reserved
        out.extend_from_slice(&self.uncompressed_len.to_le_bytes());
        out.extend_from_slice(&self.compressed_len.to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::Corrupt(format!(
                "short header: {} bytes, need {HEADER_LEN}",
                bytes.len()
            )));
        }
        let magic = u32::from_le_bytes(le_array(&bytes[0..4]));
        let version = u16::from_le_bytes(le_array(&bytes[4..6]));
        if magic != MAGIC || version != VERSION {
            return Err(Error::Corrupt(format!(
                "bad magic/version {magic:#010x}/{version}"
            )));
        }
        let codec = Codec::from_u8(bytes[6])?;
        // bytes[7] reserved
        let uncompressed_len = u64::from_le_bytes(le_array(&bytes[8..16]));
        let compressed_len = u64::from_le_bytes(le_array(&bytes[16..24]));

        Ok(Self {
            magic,
            version,
            codec,
            uncompressed_len,
            compressed_len,
        })
    }
}

/// Copy a fixed-size little-endian field. Callers slice exactly `N` bytes.
fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

/// Serialize a table into a complete blob.
pub fn encode_table(table: &Table, codec: Codec) -> Result<Vec<u8>> {
    let uncompressed = serde_json::to_vec(table)?;
    let compressed = codec::compress(codec, &uncompressed)?;

    let header = BlobHeader::new(codec, uncompressed.len() as u64, compressed.len() as u64);
    let header_bytes = header.to_bytes();
    let checksum = hash_parts(&[header_bytes.as_slice(), compressed.as_slice()]);

    let mut out = Vec::with_capacity(HEADER_LEN + compressed.len() + CHECKSUM_LEN);
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(&compressed);
    out.extend_from_slice(checksum.as_bytes());
    Ok(out)
}

/// Parse and verify a blob produced by `encode_table`.
pub fn decode_table(bytes: &[u8]) -> Result<Table> {
    let header = BlobHeader::from_bytes(bytes)?;

    let expected = (HEADER_LEN as u64)
        .checked_add(header.compressed_len)
        .and_then(|n| n.checked_add(CHECKSUM_LEN as u64))
        .ok_or_else(|| Error::Corrupt("declared length overflows".into()))?;
    if bytes.len() as u64 != expected {
        return Err(Error::Corrupt(format!(
            "blob is {} bytes, header declares {expected}",
            bytes.len()
        )));
    }

    let payload_end = HEADER_LEN + header.compressed_len as usize;
    let payload = &bytes[HEADER_LEN..payload_end];
    let stored = &bytes[payload_end..];
    let actual = hash_parts(&[&bytes[..HEADER_LEN], payload]);
    if actual.as_bytes().as_slice() != stored {
        return Err(Error::ChecksumMismatch);
    }

    let uncompressed = codec::decompress(header.codec, payload)?;
    if uncompressed.len() as u64 != header.uncompressed_len {
        return Err(Error::Corrupt(format!(
            "payload decompressed to {} bytes, header declares {}",
            uncompressed.len(),
            header.uncompressed_len
        )));
    }

    let table: Table = serde_json::from_slice(&uncompressed)?;
    Ok(Table::try_new(table.into_columns())?)
}
