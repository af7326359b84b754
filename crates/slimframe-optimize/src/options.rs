use serde::{Deserialize, Serialize};

use slimframe_core::config::{validate_threshold, SlimConfig, DEFAULT_CATEGORICAL_THRESHOLD};
use slimframe_core::error::Result;

/// Text columns whose distinct ratio is strictly below this are encoded as
/// categorical unless `OptimizeOptions::categorical_threshold` overrides it.
pub const CATEGORICAL_RATIO_THRESHOLD: f64 = DEFAULT_CATEGORICAL_THRESHOLD;

/// How float columns pick their target width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FloatDowncast {
    /// Narrowest width whose finite range covers min and max. Values inside
    /// the range may still be rounded to the narrower significand.
    #[default]
    RangeOnly,
    /// Narrowest width through which every value round-trips exactly.
    Lossless,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeOptions {
    pub categorical_threshold: f64,
    pub float_downcast: FloatDowncast,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            categorical_threshold: CATEGORICAL_RATIO_THRESHOLD,
            float_downcast: FloatDowncast::RangeOnly,
        }
    }
}

impl OptimizeOptions {
    pub fn from_config(cfg: &SlimConfig) -> Self {
        Self {
            categorical_threshold: cfg.categorical_threshold,
            float_downcast: if cfg.lossless_floats {
                FloatDowncast::Lossless
            } else {
                FloatDowncast::RangeOnly
            },
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.categorical_threshold = threshold;
        self
    }

    pub fn with_float_downcast(mut self, policy: FloatDowncast) -> Self {
        self.float_downcast = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.categorical_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_maps_onto_options() {
        let cfg = SlimConfig {
            categorical_threshold: 0.1,
            lossless_floats: true,
            ..SlimConfig::default()
        };
        let opts = OptimizeOptions::from_config(&cfg);
        assert_eq!(opts.categorical_threshold, 0.1);
        assert_eq!(opts.float_downcast, FloatDowncast::Lossless);
    }

    #[test]
    fn defaults_are_range_only_at_one_half() {
        let opts = OptimizeOptions::default();
        assert_eq!(opts.categorical_threshold, 0.5);
        assert_eq!(opts.float_downcast, FloatDowncast::RangeOnly);
        assert!(opts.validate().is_ok());
        assert!(opts.with_threshold(2.0).validate().is_err());
    }
}
