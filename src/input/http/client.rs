//! HTTP fetcher for sensor JSON documents.

use super::DocumentSource;
use crate::error::{Result, SensorError};
use async_trait::async_trait;
use log::debug;
use serde_json::Value;

/// Fetches the sensor document with a single GET per call.
///
/// No retry and no custom timeout: the client's defaults apply, and the
/// next poll tick is the only retry.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Reuse an existing client so accessories share one connection pool.
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self) -> Result<Value> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SensorError::Status {
                status: status.as_u16(),
            });
        }

        // Decode ourselves so bad JSON surfaces as a parse error rather
        // than a transport error.
        let body = response.bytes().await?;
        debug!("[HTTP] {} returned {} bytes", self.url, body.len());
        Ok(serde_json::from_slice(&body)?)
    }

    fn describe(&self) -> &str {
        &self.url
    }
}
