//! Accessory registry and bridge orchestration.
//!
//! Builds one [`SensorAccessory`] per configured entry, wires its update
//! pusher into the shared [`CharacteristicStore`], and starts its poller.

use crate::accessory::{CoSensor, CoSmokeSensor, SensorAccessory, SensorSource};
use crate::config::{AccessoryConfig, AccessoryKind, BridgeConfig};
use crate::error::BridgeError;
use crate::host::{Characteristic, CharacteristicStore, CharacteristicValue, ServiceKind};
use crate::input::{DocumentSource, HttpSource};
use crate::poller::Poller;
use futures_util::future::join_all;
use log::info;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// An accessory together with how it was registered.
pub struct RegisteredAccessory {
    pub kind: AccessoryKind,
    pub accessory: Arc<SensorAccessory>,
    pub polling_interval: Duration,
}

/// Result of one on-demand read of a characteristic.
#[derive(Debug, Clone, Serialize)]
pub struct CharacteristicReport {
    pub service: ServiceKind,
    pub characteristic: Characteristic,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<CharacteristicValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// On-demand reads of every characteristic of one accessory.
#[derive(Debug, Clone, Serialize)]
pub struct AccessoryReport {
    pub name: String,
    pub accessory: String,
    pub characteristics: Vec<CharacteristicReport>,
}

pub struct Bridge {
    accessories: Vec<RegisteredAccessory>,
    store: Arc<CharacteristicStore>,
}

impl Bridge {
    /// Build the bridge with HTTP sources sharing one client.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_sources(config, |entry| {
            let source: Arc<dyn DocumentSource> =
                Arc::new(HttpSource::with_client(client.clone(), entry.url()));
            source
        }))
    }

    /// Build the bridge with a caller-provided document source per entry.
    pub fn with_sources<F>(config: &BridgeConfig, mut make_source: F) -> Self
    where
        F: FnMut(&AccessoryConfig) -> Arc<dyn DocumentSource>,
    {
        let store = Arc::new(CharacteristicStore::new());
        let mut bridge = Self {
            accessories: Vec::with_capacity(config.accessories.len()),
            store,
        };

        for entry in &config.accessories {
            let source = make_source(entry);
            bridge.register(entry, source);
        }

        bridge
    }

    /// Register one accessory and route its updates into the store.
    pub fn register(
        &mut self,
        entry: &AccessoryConfig,
        source: Arc<dyn DocumentSource>,
    ) -> Arc<SensorAccessory> {
        let sensor: Arc<dyn SensorSource> = match entry {
            AccessoryConfig::CoSensor(c) => Arc::new(CoSensor::new(c, source)),
            AccessoryConfig::CoSmokeSensor(c) => Arc::new(CoSmokeSensor::new(c, source)),
        };

        let accessory = Arc::new(SensorAccessory::new(sensor));
        accessory.set_update_pusher(self.store.pusher(entry.name()));

        info!(
            "[Bridge] Registered {} accessory '{}' ({})",
            entry.kind(),
            entry.name(),
            entry.url()
        );

        self.accessories.push(RegisteredAccessory {
            kind: entry.kind(),
            accessory: Arc::clone(&accessory),
            polling_interval: entry.polling_interval(),
        });

        accessory
    }

    pub fn accessories(&self) -> &[RegisteredAccessory] {
        &self.accessories
    }

    pub fn store(&self) -> &Arc<CharacteristicStore> {
        &self.store
    }

    /// Start one poller per accessory. The handles live until aborted.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        self.accessories
            .iter()
            .map(|entry| Poller::new(Arc::clone(&entry.accessory), entry.polling_interval).start())
            .collect()
    }

    /// Run every get-handler of every accessory once.
    pub async fn read_all(&self) -> Vec<AccessoryReport> {
        join_all(self.accessories.iter().map(read_accessory)).await
    }
}

async fn read_accessory(entry: &RegisteredAccessory) -> AccessoryReport {
    let mut characteristics = Vec::new();

    for service in entry.accessory.services() {
        for characteristic in service.characteristics {
            let mut report = CharacteristicReport {
                service: service.kind,
                characteristic,
                value: None,
                error: None,
            };
            entry
                .accessory
                .get_with_callback(characteristic, |error, value| {
                    report.error = error.map(|e| e.to_string());
                    report.value = value;
                })
                .await;
            characteristics.push(report);
        }
    }

    AccessoryReport {
        name: entry.accessory.name().to_string(),
        accessory: entry.kind.to_string(),
        characteristics,
    }
}
