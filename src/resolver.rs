//! Municipality name resolution
//!
//! [`CityResolver`] memoizes names returned by a [`MunicipalityLookup`]
//! in a process-wide [`CityCache`]. Successful answers are cached, including
//! answers without a name; failed requests are not, so they are retried on
//! the next call.

use crate::error::{RadarError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Source of municipality names.
#[async_trait]
pub trait MunicipalityLookup: Send + Sync {
    /// `Ok(None)` means the service answered but carried no name.
    async fn fetch_name(&self, municipio_id: &str) -> Result<Option<String>>;
}

/// HTTP client for the IBGE localities API (`GET {base_url}/{id}`).
#[derive(Clone)]
pub struct IbgeClient {
    client: reqwest::Client,
    base_url: String,
}

impl IbgeClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RadarError::Lookup(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn url_for(&self, municipio_id: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), municipio_id)
    }
}

#[async_trait]
impl MunicipalityLookup for IbgeClient {
    async fn fetch_name(&self, municipio_id: &str) -> Result<Option<String>> {
        let url = self.url_for(municipio_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RadarError::Lookup(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RadarError::Lookup(format!(
                "Lookup API error ({}) for {}",
                status, url
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RadarError::Lookup(format!("Failed to parse lookup response: {}", e)))?;

        // Unknown ids come back as an empty list, which has no name either.
        Ok(body
            .get("nome")
            .and_then(|n| n.as_str())
            .map(|s| s.to_string()))
    }
}

/// Memo of municipality id → name. Grows for the life of the process.
#[derive(Debug, Default)]
pub struct CityCache {
    entries: DashMap<String, Option<String>>,
}

impl CityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` on a miss; `Some(None)` for an id that resolved without a name.
    pub fn get(&self, municipio_id: &str) -> Option<Option<String>> {
        self.entries.get(municipio_id).map(|entry| entry.value().clone())
    }

    pub fn put(&self, municipio_id: String, name: Option<String>) {
        self.entries.insert(municipio_id, name);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone)]
pub struct CityResolver {
    lookup: Arc<dyn MunicipalityLookup>,
    cache: Arc<CityCache>,
}

impl CityResolver {
    pub fn new(lookup: Arc<dyn MunicipalityLookup>, cache: Arc<CityCache>) -> Self {
        Self { lookup, cache }
    }

    pub fn cache(&self) -> &CityCache {
        &self.cache
    }

    /// Resolve an id to a city name. Lookup failures are logged and yield `None`.
    pub async fn resolve(&self, municipio_id: &str) -> Option<String> {
        let id = municipio_id.trim();
        if id.is_empty() {
            return None;
        }

        if let Some(cached) = self.cache.get(id) {
            return cached;
        }

        debug!(municipio_id = id, "Resolving municipality");
        match self.lookup.fetch_name(id).await {
            Ok(name) => {
                self.cache.put(id.to_string(), name.clone());
                name
            }
            Err(e) => {
                warn!("Error fetching data for municipio-id {}: {}", id, e);
                None
            }
        }
    }
}
