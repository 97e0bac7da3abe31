//! Combined carbon monoxide and smoke accessory.
//!
//! Reads an MQ-7 (CO) and an MQ-2 (smoke) value from the same document.
//! Values that cannot be extracted are reported as null rather than 0, and
//! a null value never counts as detected.

use super::{AccessoryInfo, SensorSource};
use crate::config::CoSmokeSensorConfig;
use crate::error::Result;
use crate::host::{Characteristic, Reading, ServiceKind};
use crate::input::DocumentSource;
use crate::sensors::{DottedPath, Thresholds, coerce_number, exceeds_opt};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;

pub const MODEL: &str = "CO_Smoke_Sensor";

const CHARACTERISTICS: &[(ServiceKind, Characteristic)] = &[
    (
        ServiceKind::CarbonMonoxideSensor,
        Characteristic::CarbonMonoxideDetected,
    ),
    (
        ServiceKind::CarbonMonoxideSensor,
        Characteristic::CarbonMonoxideLevel,
    ),
    (ServiceKind::SmokeSensor, Characteristic::SmokeDetected),
];

/// Evaluated CO and smoke state for one document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoSmokeState {
    pub co_level: Option<f64>,
    pub co_detected: bool,
    pub smoke_level: Option<f64>,
    pub smoke_detected: bool,
}

pub struct CoSmokeSensor {
    info: AccessoryInfo,
    source: Arc<dyn DocumentSource>,
    thresholds: Thresholds,
    co_level_path: DottedPath,
    smoke_path: DottedPath,
}

impl CoSmokeSensor {
    pub fn new(config: &CoSmokeSensorConfig, source: Arc<dyn DocumentSource>) -> Self {
        Self {
            info: AccessoryInfo::new(&config.name, MODEL),
            source,
            thresholds: config.thresholds(),
            co_level_path: config.co_level_path(),
            smoke_path: config.smoke_detected_path(),
        }
    }

    /// Missing or null leaves and broken paths all read as `None`.
    fn extract(&self, path: &DottedPath, what: &str, document: &Value) -> Option<f64> {
        match path.resolve(document) {
            Ok(Value::Null) => {
                warn!("[{}] No {} at `{}`", self.info.name, what, path);
                None
            }
            Ok(value) => Some(coerce_number(value)),
            Err(e) => {
                warn!("[{}] Failed to extract {} from data: {}", self.info.name, what, e);
                None
            }
        }
    }

    pub fn evaluate(&self, document: &Value) -> CoSmokeState {
        let co_level = self.extract(&self.co_level_path, "CO level", document);
        let smoke_level = self.extract(&self.smoke_path, "smoke level", document);

        CoSmokeState {
            co_level,
            co_detected: exceeds_opt(co_level, self.thresholds.co),
            smoke_level,
            smoke_detected: exceeds_opt(smoke_level, self.thresholds.smoke),
        }
    }
}

#[async_trait]
impl SensorSource for CoSmokeSensor {
    fn info(&self) -> &AccessoryInfo {
        &self.info
    }

    fn characteristics(&self) -> &'static [(ServiceKind, Characteristic)] {
        CHARACTERISTICS
    }

    async fn sample(&self) -> Result<Vec<Reading>> {
        let document = self.source.fetch().await.inspect_err(|e| {
            debug!("[{}] GET {} failed: {}", self.info.name, self.source.describe(), e);
        })?;
        let state = self.evaluate(&document);

        match state.co_level {
            Some(level) => info!("[{}] CO level: {}", self.info.name, level),
            None => info!("[{}] CO level: null", self.info.name),
        }

        Ok(vec![
            Reading::new(
                ServiceKind::CarbonMonoxideSensor,
                Characteristic::CarbonMonoxideDetected,
                state.co_detected,
            ),
            Reading::new(
                ServiceKind::CarbonMonoxideSensor,
                Characteristic::CarbonMonoxideLevel,
                state.co_level,
            ),
            Reading::new(
                ServiceKind::SmokeSensor,
                Characteristic::SmokeDetected,
                state.smoke_detected,
            ),
        ])
    }
}
