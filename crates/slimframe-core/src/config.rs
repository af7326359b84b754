//! Configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default distinct-ratio below which text columns become categorical.
pub const DEFAULT_CATEGORICAL_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlimConfig {
    /// Directory that receives cached table blobs.
    pub cache_dir: String,

    /// Compression codec name for blobs: `none`, `zstd` or `lz4`.
    pub codec: String,

    /// Text columns with `distinct / rows` strictly below this become categorical.
    pub categorical_threshold: f64,

    /// Only narrow float columns when every value survives the round trip.
    pub lossless_floats: bool,

    /// Field delimiter for delimited-text input.
    pub csv_delimiter: char,
}

impl Default for SlimConfig {
    fn default() -> Self {
        Self {
            cache_dir: "/tmp/slimframe-cache".to_string(),
            codec: "none".to_string(),
            categorical_threshold: DEFAULT_CATEGORICAL_THRESHOLD,
            lossless_floats: false,
            csv_delimiter: ',',
        }
    }
}

impl SlimConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `SLIMFRAME_CACHE_DIR`: cache directory
    /// - `SLIMFRAME_CODEC`: blob codec (`none`, `zstd`, `lz4`)
    /// - `SLIMFRAME_CATEGORICAL_THRESHOLD`: distinct-ratio threshold
    /// - `SLIMFRAME_LOSSLESS_FLOATS`: `true`/`false`
    /// - `SLIMFRAME_CSV_DELIMITER`: single-character delimiter
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    /// Values that fail to parse are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(s) = lookup("SLIMFRAME_CACHE_DIR") {
            cfg.cache_dir = s;
        }

        if let Some(s) = lookup("SLIMFRAME_CODEC") {
            cfg.codec = s.trim().to_ascii_lowercase();
        }

        if let Some(s) = lookup("SLIMFRAME_CATEGORICAL_THRESHOLD") {
            if let Ok(v) = s.trim().parse::<f64>() {
                cfg.categorical_threshold = v;
            }
        }

        if let Some(s) = lookup("SLIMFRAME_LOSSLESS_FLOATS") {
            if let Ok(v) = s.trim().parse::<bool>() {
                cfg.lossless_floats = v;
            }
        }

        if let Some(s) = lookup("SLIMFRAME_CSV_DELIMITER") {
            let mut chars = s.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                cfg.csv_delimiter = c;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.categorical_threshold)?;
        if !self.csv_delimiter.is_ascii() {
            return Err(Error::Config(format!(
                "csv delimiter must be a single ASCII character, got {:?}",
                self.csv_delimiter
            )));
        }
        if self.cache_dir.trim().is_empty() {
            return Err(Error::Config("cache_dir must not be empty".into()));
        }
        Ok(())
    }
}

/// Thresholds outside `(0, 1]` would either never or always convert.
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold.is_nan() || threshold <= 0.0 || threshold > 1.0 {
        return Err(Error::Config(format!(
            "categorical threshold must be in (0, 1], got {threshold}"
        )));
    }
    Ok(())
}
