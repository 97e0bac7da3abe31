//! HTTP input source for polled sensor endpoints.

mod client;

pub use client::HttpSource;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Something that can produce the current sensor document.
///
/// Implemented by [`HttpSource`] for real endpoints; tests substitute an
/// in-memory source.
#[async_trait]
pub trait DocumentSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<Value>;

    /// Short label for log messages (usually the URL).
    fn describe(&self) -> &str;
}
