//! REST client for the metrics/pomodoro backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ApiError, ConfigError, Result};
use crate::metrics::{MetricReading, MetricsSource};
use crate::storage::{ApiConfig, ConfigSource, TimerConfig};

const USER_AGENT: &str = concat!("wellpulse/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// # Errors
    ///
    /// Fails when `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: "api.base_url".into(),
            message,
        };
        let base = Url::parse(base_url.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base.scheme())).into());
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| invalid(e.to_string()))?;
        Ok(Self { client, base })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs.max(1)))
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let joined = format!("{}{}", self.base.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url
    }

    /// `GET /metrics/current`
    pub async fn current_metrics(&self) -> Result<MetricReading, ApiError> {
        let url = self.endpoint("/metrics/current");
        self.send_json(self.client.get(url.clone()), &url).await
    }

    /// `GET /metrics/history?limit=N`
    pub async fn metrics_history(&self, limit: usize) -> Result<Vec<MetricReading>, ApiError> {
        let mut url = self.endpoint("/metrics/history");
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        self.send_json(self.client.get(url.clone()), &url).await
    }

    /// `GET /pomodoro/config`
    pub async fn pomodoro_config(&self) -> Result<TimerConfig, ApiError> {
        let url = self.endpoint("/pomodoro/config");
        self.send_json(self.client.get(url.clone()), &url).await
    }

    /// `POST /pomodoro/calculate?mental_state=&stress_level=`
    pub async fn calculate_pomodoro(
        &self,
        mental_state: &str,
        stress_level: f64,
    ) -> Result<TimerConfig, ApiError> {
        let mut url = self.endpoint("/pomodoro/calculate");
        url.query_pairs_mut()
            .append_pair("mental_state", mental_state)
            .append_pair("stress_level", &stress_level.to_string());
        self.send_json(self.client.post(url.clone()), &url).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, ApiError> {
        tracing::debug!(%url, "api request");
        let resp = request
            .send()
            .await
            .map_err(|e| ApiError::fetch(url.as_str(), e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::fetch(url.as_str(), format!("HTTP {status}")));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::fetch(url.as_str(), e))?;
        serde_json::from_str(&body).map_err(|e| ApiError::parse(url.as_str(), e))
    }
}

#[async_trait]
impl MetricsSource for ApiClient {
    async fn current(&self) -> Result<MetricReading, ApiError> {
        self.current_metrics().await
    }

    async fn history(&self, limit: usize) -> Result<Vec<MetricReading>, ApiError> {
        self.metrics_history(limit).await
    }
}

#[async_trait]
impl ConfigSource for ApiClient {
    async fn timer_config(&self) -> Result<TimerConfig, ApiError> {
        self.pomodoro_config().await
    }
}
