//! Fixed-interval polling of a sensor accessory.
//!
//! Each tick fetches the accessory's document, evaluates it and pushes every
//! characteristic to the host. A failed fetch drops the tick: nothing is
//! pushed and the host keeps its previous values until the next tick.

use crate::accessory::SensorAccessory;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

pub struct Poller {
    accessory: Arc<SensorAccessory>,
    period: Duration,
}

impl Poller {
    pub fn new(accessory: Arc<SensorAccessory>, period: Duration) -> Self {
        Self { accessory, period }
    }

    /// Run one poll cycle to completion. Returns `true` if values were pushed.
    pub async fn tick(&self) -> bool {
        run_tick(&self.accessory).await
    }

    /// Spawn the timer task.
    ///
    /// The first tick fires one full period after start. Every tick runs in
    /// its own task, so a fetch slower than the period overlaps the next one.
    pub fn start(self) -> JoinHandle<()> {
        info!(
            "[Poll] {} polling every {:?}",
            self.accessory.name(),
            self.period
        );

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.period, self.period);
            loop {
                ticker.tick().await;
                let accessory = Arc::clone(&self.accessory);
                tokio::spawn(async move {
                    run_tick(&accessory).await;
                });
            }
        })
    }
}

async fn run_tick(accessory: &SensorAccessory) -> bool {
    match accessory.refresh().await {
        Ok(pushed) => {
            debug!("[Poll] {} pushed {} values", accessory.name(), pushed);
            true
        }
        Err(e) => {
            warn!("[Poll] Failed to fetch {} status: {}", accessory.name(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessory::{CoSensor, CoSmokeSensor};
    use crate::config::{CoSensorConfig, CoSmokeSensorConfig};
    use crate::host::{Characteristic, CharacteristicStore, CharacteristicValue, ServiceKind};
    use crate::input::stub::{StubResponse, StubSource};
    use serde_json::json;

    fn co_poller(stub: Arc<StubSource>, store: &Arc<CharacteristicStore>) -> Poller {
        let config = CoSensorConfig::new("Kitchen", "http://sensor.local/");
        let accessory = Arc::new(SensorAccessory::new(Arc::new(CoSensor::new(&config, stub))));
        accessory.set_update_pusher(store.pusher("Kitchen"));
        Poller::new(accessory, config.polling_interval())
    }

    fn co_level(store: &CharacteristicStore) -> Option<CharacteristicValue> {
        store.get(
            "Kitchen",
            ServiceKind::CarbonMonoxideSensor,
            Characteristic::CarbonMonoxideLevel,
        )
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_tick_reports_level_and_detection() {
        let store = Arc::new(CharacteristicStore::new());
        let stub = Arc::new(StubSource::document(json!({"co_level": 45})));
        let poller = co_poller(stub, &store);

        assert!(poller.tick().await);
        assert_eq!(co_level(&store), Some(CharacteristicValue::Float(45.0)));
        assert_eq!(
            store.get(
                "Kitchen",
                ServiceKind::CarbonMonoxideSensor,
                Characteristic::CarbonMonoxideDetected
            ),
            Some(CharacteristicValue::Bool(true))
        );
    }

    #[tokio::test]
    async fn test_failed_tick_leaves_values_unchanged() {
        let store = Arc::new(CharacteristicStore::new());
        let stub = Arc::new(StubSource::new([
            StubResponse::Document(json!({"co_level": 45})),
            StubResponse::Status(500),
        ]));
        let poller = co_poller(Arc::clone(&stub), &store);

        assert!(poller.tick().await);
        let version = store.version();
        let updates = store.update_count();

        assert!(!poller.tick().await);
        assert_eq!(stub.fetch_count(), 2);
        assert_eq!(store.version(), version);
        assert_eq!(store.update_count(), updates);
        assert_eq!(co_level(&store), Some(CharacteristicValue::Float(45.0)));
    }

    #[tokio::test]
    async fn test_recovery_after_failure() {
        let store = Arc::new(CharacteristicStore::new());
        let stub = Arc::new(StubSource::new([
            StubResponse::Document(json!({"co_level": 10})),
            StubResponse::InvalidJson,
            StubResponse::Document(json!({"co_level": 12})),
        ]));
        let poller = co_poller(stub, &store);

        for _ in 0..3 {
            poller.tick().await;
        }
        assert_eq!(co_level(&store), Some(CharacteristicValue::Float(12.0)));
    }

    #[tokio::test]
    async fn test_combined_tick_pushes_three_values() {
        let store = Arc::new(CharacteristicStore::new());
        let config = CoSmokeSensorConfig::new("Garage", "http://sensor.local/");
        let stub = Arc::new(StubSource::document(json!({"mq7_value": 10, "mq2_value": 2})));
        let accessory = Arc::new(SensorAccessory::new(Arc::new(CoSmokeSensor::new(
            &config, stub,
        ))));
        accessory.set_update_pusher(store.pusher("Garage"));
        let poller = Poller::new(accessory, config.polling_interval());

        assert!(poller.tick().await);
        assert_eq!(store.update_count(), 3);
        assert_eq!(
            store.get("Garage", ServiceKind::SmokeSensor, Characteristic::SmokeDetected),
            Some(CharacteristicValue::Bool(true))
        );
        assert_eq!(
            store.get(
                "Garage",
                ServiceKind::CarbonMonoxideSensor,
                Characteristic::CarbonMonoxideDetected
            ),
            Some(CharacteristicValue::Bool(false))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_each_full_period() {
        let store = Arc::new(CharacteristicStore::new());
        let stub = Arc::new(StubSource::document(json!({"co_level": 5})));
        let handle = co_poller(Arc::clone(&stub), &store).start();
        settle().await;

        tokio::time::advance(Duration::from_secs(59)).await;
        settle().await;
        assert_eq!(stub.fetch_count(), 0);

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(stub.fetch_count(), 1);

        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(stub.fetch_count(), 2);

        handle.abort();
    }
}
