//! In-memory document source for tests.

use super::DocumentSource;
use crate::error::{Result, SensorError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

/// What the stub hands back for one fetch.
#[derive(Debug, Clone)]
pub enum StubResponse {
    Document(Value),
    Status(u16),
    InvalidJson,
}

/// Replays queued responses; the last one repeats once the queue drains.
pub struct StubSource {
    queue: Mutex<VecDeque<StubResponse>>,
    last: Mutex<StubResponse>,
    fetches: AtomicU32,
}

impl StubSource {
    pub fn new(responses: impl IntoIterator<Item = StubResponse>) -> Self {
        Self {
            queue: Mutex::new(responses.into_iter().collect()),
            last: Mutex::new(StubResponse::Status(503)),
            fetches: AtomicU32::new(0),
        }
    }

    pub fn document(doc: Value) -> Self {
        Self::new([StubResponse::Document(doc)])
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSource for StubSource {
    async fn fetch(&self) -> Result<Value> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let response = match self.queue.lock().pop_front() {
            Some(next) => {
                *self.last.lock() = next.clone();
                next
            }
            None => self.last.lock().clone(),
        };

        match response {
            StubResponse::Document(doc) => Ok(doc),
            StubResponse::Status(status) => Err(SensorError::Status { status }),
            StubResponse::InvalidJson => Err(serde_json::from_str::<Value>("{")
                .expect_err("truncated object must not parse")
                .into()),
        }
    }

    fn describe(&self) -> &str {
        "stub"
    }
}
