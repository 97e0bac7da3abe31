//! Carbon monoxide accessory.
//!
//! Exposes a CarbonMonoxideSensor service with CarbonMonoxideDetected and
//! CarbonMonoxideLevel. A missing CO field reads as NaN; a path that cannot
//! be followed to its last segment reads as 0.

use super::{AccessoryInfo, SensorSource};
use crate::config::CoSensorConfig;
use crate::error::Result;
use crate::host::{Characteristic, Reading, ServiceKind};
use crate::input::DocumentSource;
use crate::sensors::{DottedPath, exceeds};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;

pub const MODEL: &str = "CO_Sensor";

const CHARACTERISTICS: &[(ServiceKind, Characteristic)] = &[
    (
        ServiceKind::CarbonMonoxideSensor,
        Characteristic::CarbonMonoxideDetected,
    ),
    (
        ServiceKind::CarbonMonoxideSensor,
        Characteristic::CarbonMonoxideLevel,
    ),
];

/// Evaluated CO state for one document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoState {
    pub level: f64,
    pub detected: bool,
}

pub struct CoSensor {
    info: AccessoryInfo,
    source: Arc<dyn DocumentSource>,
    threshold: f64,
    co_level_path: DottedPath,
}

impl CoSensor {
    pub fn new(config: &CoSensorConfig, source: Arc<dyn DocumentSource>) -> Self {
        Self {
            info: AccessoryInfo::new(&config.name, MODEL),
            source,
            threshold: config.threshold(),
            co_level_path: config.co_level_path(),
        }
    }

    /// CO level from `document`.
    ///
    /// A missing leaf reads as NaN; a path that breaks off before the leaf
    /// reads as 0.
    pub fn co_level(&self, document: &Value) -> f64 {
        match self.co_level_path.resolve_number(document) {
            Ok(level) => level,
            Err(e) => {
                warn!("[{}] Failed to extract CO level from data: {}", self.info.name, e);
                0.0
            }
        }
    }

    pub fn evaluate(&self, document: &Value) -> CoState {
        let level = self.co_level(document);
        CoState {
            level,
            detected: exceeds(level, self.threshold),
        }
    }
}

#[async_trait]
impl SensorSource for CoSensor {
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
        info!("[{}] CO level: {}", self.info.name, state.level);

        Ok(vec![
            Reading::new(
                ServiceKind::CarbonMonoxideSensor,
                Characteristic::CarbonMonoxideDetected,
                state.detected,
            ),
            Reading::new(
                ServiceKind::CarbonMonoxideSensor,
                Characteristic::CarbonMonoxideLevel,
                state.level,
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::CharacteristicValue;
    use crate::input::stub::StubSource;
    use serde_json::json;

    fn sensor(config: CoSensorConfig, doc: Value) -> CoSensor {
        CoSensor::new(&config, Arc::new(StubSource::document(doc)))
    }

    fn value_of(readings: &[Reading], characteristic: Characteristic) -> CharacteristicValue {
        readings
            .iter()
            .find(|r| r.characteristic == characteristic)
            .map(|r| r.value.clone())
            .unwrap()
    }

    #[tokio::test]
    async fn test_level_above_threshold_is_detected() {
        let co = sensor(
            CoSensorConfig::new("Kitchen", "http://h/"),
            json!({"co_level": 45}),
        );
        let readings = co.sample().await.unwrap();

        assert_eq!(
            value_of(&readings, Characteristic::CarbonMonoxideLevel),
            CharacteristicValue::Float(45.0)
        );
        assert_eq!(
            value_of(&readings, Characteristic::CarbonMonoxideDetected),
            CharacteristicValue::Bool(true)
        );
    }

    #[test]
    fn test_level_equal_to_threshold_is_not_detected() {
        let co = sensor(CoSensorConfig::new("Kitchen", "http://h/"), json!({}));
        let state = co.evaluate(&json!({"co_level": 30}));
        assert_eq!(state.level, 30.0);
        assert!(!state.detected);
    }

    #[test]
    fn test_missing_level_field_is_nan() {
        let co = sensor(CoSensorConfig::new("Kitchen", "http://h/"), json!({}));
        let state = co.evaluate(&json!({"other": 99}));
        assert!(state.level.is_nan());
        assert!(!state.detected);

        let state = co.evaluate(&json!({"co_level": null}));
        assert!(state.level.is_nan());
        assert!(!state.detected);
    }

    #[test]
    fn test_missing_intermediate_falls_back_to_zero() {
        let config = CoSensorConfig {
            co_level_path: Some("sensor.co".to_string()),
            ..CoSensorConfig::new("Kitchen", "http://h/")
        };
        let co = sensor(config, json!({}));

        let state = co.evaluate(&json!({"other": 99}));
        assert_eq!(state, CoState { level: 0.0, detected: false });

        let state = co.evaluate(&json!({"sensor": {}}));
        assert!(state.level.is_nan());
    }

    #[test]
    fn test_zero_fallback_detects_below_negative_threshold() {
        let config = CoSensorConfig {
            threshold: Some(-1.0),
            co_level_path: Some("sensor.co".to_string()),
            ..CoSensorConfig::new("Kitchen", "http://h/")
        };
        let co = sensor(config, json!({}));
        assert!(co.evaluate(&json!({"sensor": null})).detected);
    }

    #[tokio::test]
    async fn test_non_numeric_level_is_nan_and_not_detected() {
        let co = sensor(
            CoSensorConfig::new("Kitchen", "http://h/"),
            json!({"co_level": "abc"}),
        );
        let readings = co.sample().await.unwrap();

        let level = value_of(&readings, Characteristic::CarbonMonoxideLevel);
        assert!(level.as_f64().unwrap().is_nan());
        assert_eq!(
            value_of(&readings, Characteristic::CarbonMonoxideDetected),
            CharacteristicValue::Bool(false)
        );
    }

    #[test]
    fn test_custom_nested_path() {
        let config = CoSensorConfig {
            co_level_path: Some("sensor.co.value".to_string()),
            threshold: Some(10.0),
            ..CoSensorConfig::new("Kitchen", "http://h/")
        };
        let co = sensor(config, json!({}));
        let state = co.evaluate(&json!({"sensor": {"co": {"value": "12.5"}}}));
        assert_eq!(state, CoState { level: 12.5, detected: true });
    }
}
