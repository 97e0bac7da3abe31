//! Bridge and accessory configuration.
//!
//! The config file follows the host's accessory layout:
//!
//! ```json
//! {
//!   "accessories": [
//!     { "accessory": "COSensor", "name": "Kitchen CO", "url": "http://10.0.0.40/co" },
//!     { "accessory": "COSmokeSensor", "name": "Garage", "url": "http://10.0.0.41/",
//!       "thresholds": { "co": 35, "smoke": 400 }, "pollingInterval": 30 }
//!   ]
//! }
//! ```
//!
//! Optional fields that are absent, null, zero-length or zero fall back to
//! their defaults. This includes thresholds: a threshold of 0 means 30.

use crate::error::BridgeError;
use crate::sensors::DottedPath;
use crate::sensors::threshold::{DEFAULT_CO_THRESHOLD, DEFAULT_SMOKE_THRESHOLD, Thresholds};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::{Display, EnumString};

/// Default seconds between polls.
pub const DEFAULT_POLLING_INTERVAL_SECS: f64 = 60.0;

/// Default CO path for the CO-only accessory.
pub const DEFAULT_CO_LEVEL_PATH: &str = "co_level";

/// Default CO path for the combined accessory (MQ-7 sensor).
pub const DEFAULT_COMBINED_CO_LEVEL_PATH: &str = "mq7_value";

/// Default smoke path for the combined accessory (MQ-2 sensor).
pub const DEFAULT_SMOKE_PATH: &str = "mq2_value";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub accessories: Vec<AccessoryConfig>,
}

/// Registered accessory kinds, keyed by the `accessory` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum AccessoryKind {
    #[strum(serialize = "COSensor")]
    CoSensor,
    #[strum(serialize = "COSmokeSensor")]
    CoSmokeSensor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "accessory")]
pub enum AccessoryConfig {
    #[serde(rename = "COSensor")]
    CoSensor(CoSensorConfig),
    #[serde(rename = "COSmokeSensor")]
    CoSmokeSensor(CoSmokeSensorConfig),
}

impl AccessoryConfig {
    pub fn kind(&self) -> AccessoryKind {
        match self {
            Self::CoSensor(_) => AccessoryKind::CoSensor,
            Self::CoSmokeSensor(_) => AccessoryKind::CoSmokeSensor,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::CoSensor(c) => &c.name,
            Self::CoSmokeSensor(c) => &c.name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::CoSensor(c) => &c.url,
            Self::CoSmokeSensor(c) => &c.url,
        }
    }

    pub fn polling_interval(&self) -> Duration {
        match self {
            Self::CoSensor(c) => c.polling_interval(),
            Self::CoSmokeSensor(c) => c.polling_interval(),
        }
    }
}

/// Configuration for the CO-only accessory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoSensorConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub polling_interval: Option<f64>,
    #[serde(default)]
    pub co_level_path: Option<String>,
}

impl CoSensorConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            threshold: None,
            polling_interval: None,
            co_level_path: None,
        }
    }

    pub fn threshold(&self) -> f64 {
        threshold_or_default(self.threshold, DEFAULT_CO_THRESHOLD)
    }

    pub fn polling_interval(&self) -> Duration {
        polling_interval_or_default(self.polling_interval)
    }

    pub fn co_level_path(&self) -> DottedPath {
        path_or_default(self.co_level_path.as_deref(), DEFAULT_CO_LEVEL_PATH)
    }
}

/// Configuration for the combined CO and smoke accessory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoSmokeSensorConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub thresholds: Option<Thresholds>,
    #[serde(default)]
    pub polling_interval: Option<f64>,
    #[serde(default)]
    pub co_level_path: Option<String>,
    #[serde(default)]
    pub smoke_detected_path: Option<String>,
}

impl CoSmokeSensorConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            thresholds: None,
            polling_interval: None,
            co_level_path: None,
            smoke_detected_path: None,
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        let configured = self.thresholds.unwrap_or_default();
        Thresholds {
            co: threshold_or_default(Some(configured.co), DEFAULT_CO_THRESHOLD),
            smoke: threshold_or_default(Some(configured.smoke), DEFAULT_SMOKE_THRESHOLD),
        }
    }

    pub fn polling_interval(&self) -> Duration {
        polling_interval_or_default(self.polling_interval)
    }

    pub fn co_level_path(&self) -> DottedPath {
        path_or_default(self.co_level_path.as_deref(), DEFAULT_COMBINED_CO_LEVEL_PATH)
    }

    pub fn smoke_detected_path(&self) -> DottedPath {
        path_or_default(self.smoke_detected_path.as_deref(), DEFAULT_SMOKE_PATH)
    }
}

fn threshold_or_default(threshold: Option<f64>, default: f64) -> f64 {
    threshold
        .filter(|t| *t != 0.0 && !t.is_nan())
        .unwrap_or(default)
}

fn polling_interval_or_default(secs: Option<f64>) -> Duration {
    let secs = secs
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_POLLING_INTERVAL_SECS);
    Duration::from_secs_f64(secs)
}

fn path_or_default(path: Option<&str>, default: &str) -> DottedPath {
    match path {
        Some(p) if !p.is_empty() => DottedPath::new(p),
        _ => DottedPath::new(default),
    }
}

impl BridgeConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let content = fs::read_to_string(path).map_err(|source| BridgeError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, BridgeError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/co-sensor-bridge/config.json`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("co-sensor-bridge").join("config.json"))
    }

    fn validate(&self) -> Result<(), BridgeError> {
        if self.accessories.is_empty() {
            return Err(BridgeError::NoAccessories);
        }

        for accessory in &self.accessories {
            let valid = reqwest::Url::parse(accessory.url())
                .is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
            if !valid {
                return Err(BridgeError::InvalidUrl {
                    name: accessory.name().to_string(),
                    url: accessory.url().to_string(),
                });
            }
        }

        Ok(())
    }
}
