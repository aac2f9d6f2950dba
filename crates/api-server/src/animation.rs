//! Best-effort fetch of the decorative hero animation (a Lottie JSON).
//!
//! Strictly cosmetic: a timeout, a non-200 response, or a body that is not
//! JSON all degrade to "no animation". Nothing here may surface an error
//! to the rest of the system.

use dashmap::DashMap;
use std::time::Duration;
use tracing::debug;

pub struct AnimationFetcher {
    client: reqwest::Client,
    cache: DashMap<String, serde_json::Value>,
}

impl AnimationFetcher {
    pub fn new(timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                debug!(error = %e, "animation client builder failed, using default client");
                reqwest::Client::new()
            });
        Self {
            client,
            cache: DashMap::new(),
        }
    }

    /// Fetch the animation JSON, caching successes per URL. Every failure
    /// path returns `None`.
    pub async fn fetch(&self, url: &str) -> Option<serde_json::Value> {
        if let Some(cached) = self.cache.get(url) {
            return Some(cached.clone());
        }

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(url, error = %e, "animation fetch failed");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(url, status = %response.status(), "animation fetch non-200");
            return None;
        }
        match response.json::<serde_json::Value>().await {
            Ok(body) => {
                self.cache.insert(url.to_string(), body.clone());
                Some(body)
            }
            Err(e) => {
                debug!(url, error = %e, "animation body was not JSON");
                None
            }
        }
    }
}
