//! Sensor accessories and their host adapter.
//!
//! A [`SensorSource`] knows how to fetch its document, extract values and
//! evaluate thresholds; it knows nothing about the host. [`SensorAccessory`]
//! wraps one and speaks the host's language: services, get-handlers and
//! update pushes.

pub mod co_sensor;
pub mod co_smoke_sensor;

pub use co_sensor::CoSensor;
pub use co_smoke_sensor::CoSmokeSensor;

use crate::error::{Result, SensorError};
use crate::host::{
    Characteristic, CharacteristicValue, Reading, ServiceDescriptor, ServiceKind, UpdatePusher,
};
use async_trait::async_trait;
use log::warn;
use parking_lot::RwLock;
use std::sync::Arc;

/// Manufacturer reported by every accessory.
pub const MANUFACTURER: &str = "Homebridge";

/// Serial number reported by every accessory.
pub const SERIAL_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Static accessory metadata, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryInfo {
    pub name: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub serial_number: &'static str,
}

impl AccessoryInfo {
    pub fn new(name: impl Into<String>, model: &'static str) -> Self {
        Self {
            name: name.into(),
            manufacturer: MANUFACTURER,
            model,
            serial_number: SERIAL_NUMBER,
        }
    }

    fn value_of(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        let text = match characteristic {
            Characteristic::Name => self.name.clone(),
            Characteristic::Manufacturer => self.manufacturer.to_string(),
            Characteristic::Model => self.model.to_string(),
            Characteristic::SerialNumber => self.serial_number.to_string(),
            _ => return None,
        };
        Some(CharacteristicValue::Text(text))
    }
}

/// Host-independent sensor capability: fetch, extract, evaluate.
#[async_trait]
pub trait SensorSource: Send + Sync + 'static {
    fn info(&self) -> &AccessoryInfo;

    /// Sensor characteristics this accessory exposes, grouped by service.
    fn characteristics(&self) -> &'static [(ServiceKind, Characteristic)];

    /// Fetch one document and evaluate every exposed characteristic.
    ///
    /// Only fetch failures are errors; unresolvable fields are replaced by
    /// the accessory's fallback value.
    async fn sample(&self) -> Result<Vec<Reading>>;
}

/// Adapts a [`SensorSource`] to the host's get/update contract.
pub struct SensorAccessory {
    sensor: Arc<dyn SensorSource>,
    pusher: RwLock<Option<UpdatePusher>>,
}

impl SensorAccessory {
    pub fn new(sensor: Arc<dyn SensorSource>) -> Self {
        Self {
            sensor,
            pusher: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.sensor.info().name
    }

    /// Service descriptors, information service first.
    pub fn services(&self) -> Vec<ServiceDescriptor> {
        let mut services = vec![ServiceDescriptor {
            kind: ServiceKind::AccessoryInformation,
            display_name: self.name().to_string(),
            characteristics: vec![
                Characteristic::Name,
                Characteristic::Manufacturer,
                Characteristic::Model,
                Characteristic::SerialNumber,
            ],
        }];

        for &(kind, characteristic) in self.sensor.characteristics() {
            match services.iter_mut().find(|s| s.kind == kind) {
                Some(service) => service.characteristics.push(characteristic),
                None => services.push(ServiceDescriptor {
                    kind,
                    display_name: self.name().to_string(),
                    characteristics: vec![characteristic],
                }),
            }
        }

        services
    }

    /// Get-handler: read one characteristic with a fresh fetch.
    ///
    /// Information characteristics are answered from static metadata
    /// without touching the network.
    pub async fn get(&self, characteristic: Characteristic) -> Result<CharacteristicValue> {
        if let Some(value) = self.sensor.info().value_of(characteristic) {
            return Ok(value);
        }

        if !self
            .sensor
            .characteristics()
            .iter()
            .any(|&(_, c)| c == characteristic)
        {
            return Err(SensorError::UnknownCharacteristic(characteristic.to_string()));
        }

        let readings = self.sensor.sample().await.inspect_err(|e| {
            warn!("Failed to fetch {} for {}: {}", characteristic, self.name(), e);
        })?;

        readings
            .into_iter()
            .find(|r| r.characteristic == characteristic)
            .map(|r| r.value)
            .ok_or_else(|| SensorError::UnknownCharacteristic(characteristic.to_string()))
    }

    /// Get-handler in the host's callback shape: `callback(error, value)`,
    /// with exactly one of the two set.
    pub async fn get_with_callback<F>(&self, characteristic: Characteristic, callback: F)
    where
        F: FnOnce(Option<SensorError>, Option<CharacteristicValue>),
    {
        match self.get(characteristic).await {
            Ok(value) => callback(None, Some(value)),
            Err(e) => callback(Some(e), None),
        }
    }

    /// Register the host callback that receives characteristic updates.
    pub fn set_update_pusher(&self, pusher: UpdatePusher) {
        *self.pusher.write() = Some(pusher);
    }

    /// Hand readings to the registered pusher. Returns how many were pushed.
    pub fn push(&self, readings: &[Reading]) -> usize {
        let pusher = self.pusher.read();
        let Some(pusher) = pusher.as_ref() else {
            return 0;
        };
        for reading in readings {
            pusher(reading);
        }
        readings.len()
    }

    /// Fetch, evaluate and push every characteristic once.
    ///
    /// On fetch failure nothing is pushed and the error is returned.
    pub async fn refresh(&self) -> Result<usize> {
        let readings = self.sensor.sample().await?;
        Ok(self.push(&readings))
    }
}
