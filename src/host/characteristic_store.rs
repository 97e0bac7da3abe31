//! Most-recently-reported characteristic values.
//!
//! Stands in for the host's characteristic model: every pushed reading lands
//! here, keyed by accessory, service and characteristic. Nothing but the
//! latest value is kept.

use super::{Characteristic, CharacteristicValue, Reading, ServiceKind, UpdatePusher};
use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

type Key = (String, ServiceKind, Characteristic);

/// A stored value together with when it was last changed.
#[derive(Debug, Clone)]
struct StoredValue {
    value: CharacteristicValue,
    updated_at: DateTime<Utc>,
}

/// One row of [`CharacteristicStore::snapshot`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedValue {
    pub accessory: String,
    pub service: ServiceKind,
    pub characteristic: Characteristic,
    pub value: CharacteristicValue,
    pub updated_at: DateTime<Utc>,
}

/// Thread-safe store of the latest value per characteristic.
///
/// The version is incremented each time any stored value changes, so
/// callers can cheaply detect whether anything was reported since they
/// last looked.
#[derive(Default)]
pub struct CharacteristicStore {
    values: RwLock<HashMap<Key, StoredValue>>,
    version: AtomicU32,
    updates: AtomicU32,
}

impl CharacteristicStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pushed value. Returns `true` if it differs from the stored one.
    pub fn update_value(&self, accessory: &str, reading: &Reading) -> bool {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let key = (
            accessory.to_string(),
            reading.service,
            reading.characteristic,
        );

        let mut values = self.values.write();
        let changed = values
            .get(&key)
            .is_none_or(|stored| !stored.value.same_as(&reading.value));

        if changed {
            values.insert(
                key,
                StoredValue {
                    value: reading.value.clone(),
                    updated_at: Utc::now(),
                },
            );
            self.version.fetch_add(1, Ordering::SeqCst);
            info!(
                "[Host] {} {} -> {}",
                accessory, reading.characteristic, reading.value
            );
        } else {
            debug!(
                "[Host] {} {} unchanged ({})",
                accessory, reading.characteristic, reading.value
            );
        }

        changed
    }

    pub fn get(
        &self,
        accessory: &str,
        service: ServiceKind,
        characteristic: Characteristic,
    ) -> Option<CharacteristicValue> {
        self.values
            .read()
            .get(&(accessory.to_string(), service, characteristic))
            .map(|stored| stored.value.clone())
    }

    /// Every stored value, ordered by accessory, service and characteristic.
    pub fn snapshot(&self) -> Vec<ReportedValue> {
        let mut reported: Vec<ReportedValue> = self
            .values
            .read()
            .iter()
            .map(|((accessory, service, characteristic), stored)| ReportedValue {
                accessory: accessory.clone(),
                service: *service,
                characteristic: *characteristic,
                value: stored.value.clone(),
                updated_at: stored.updated_at,
            })
            .collect();
        reported.sort_by_cached_key(|r| {
            (
                r.accessory.clone(),
                r.service.to_string(),
                r.characteristic.to_string(),
            )
        });
        reported
    }

    /// Incremented whenever a stored value changes.
    pub fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }

    /// Number of update pushes received, changed or not.
    pub fn update_count(&self) -> u32 {
        self.updates.load(Ordering::SeqCst)
    }

    /// Build a pusher that records readings for `accessory` into this store.
    pub fn pusher(self: &Arc<Self>, accessory: impl Into<String>) -> UpdatePusher {
        let store = Arc::clone(self);
        let accessory = accessory.into();
        Arc::new(move |reading: &Reading| {
            store.update_value(&accessory, reading);
        })
    }
}
