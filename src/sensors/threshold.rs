//! Threshold comparison for detection flags.

use serde::{Deserialize, Serialize};

/// Default CO alarm threshold in ppm.
pub const DEFAULT_CO_THRESHOLD: f64 = 30.0;

/// Default smoke alarm threshold (raw sensor units).
pub const DEFAULT_SMOKE_THRESHOLD: f64 = 1.0;

/// Strict greater-than check. NaN never exceeds a threshold.
pub fn exceeds(value: f64, threshold: f64) -> bool {
    value > threshold
}

/// Like [`exceeds`], but an absent reading is never detected.
pub fn exceeds_opt(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|v| exceeds(v, threshold))
}

/// Independent CO and smoke thresholds for the combined accessory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub co: f64,
    pub smoke: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            co: DEFAULT_CO_THRESHOLD,
            smoke: DEFAULT_SMOKE_THRESHOLD,
        }
    }
}
