use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::kv::{get_json, set_json, KeyValueStore};
use crate::error::{ApiError, ConfigError};

pub const TIMER_CONFIG_KEY: &str = "wellpulse.pomodoro.config";

/// Pomodoro durations in seconds, as served by `GET /pomodoro/config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    pub work: u64,
    pub short_break: u64,
    pub long_break: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work: 25 * 60,
            short_break: 5 * 60,
            long_break: 15 * 60,
        }
    }
}

#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn timer_config(&self) -> Result<TimerConfig, ApiError>;
}

/// Where a loaded [`TimerConfig`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Backend,
    Cache,
    Default,
    /// Derived locally from a metrics baseline.
    Adaptive,
}

/// Fetch the timer config, falling back to the cached copy, then defaults.
///
/// Never fails: an unreachable backend is logged and recovered from.
pub async fn load_timer_config(
    source: &dyn ConfigSource,
    store: &dyn KeyValueStore,
) -> (TimerConfig, ConfigOrigin) {
    match source.timer_config().await {
        Ok(config) => {
            if let Err(e) = set_json(store, TIMER_CONFIG_KEY, &config) {
                tracing::warn!(error = %e, "failed to cache timer config");
            }
            (config, ConfigOrigin::Backend)
        }
        Err(e) => {
            let err = ConfigError::ConfigUnavailable(e);
            match get_json::<TimerConfig>(store, TIMER_CONFIG_KEY) {
                Ok(Some(cached)) => {
                    tracing::info!(error = %err, "using cached timer config");
                    (cached, ConfigOrigin::Cache)
                }
                Ok(None) => {
                    tracing::info!(error = %err, "using default timer config");
                    (TimerConfig::default(), ConfigOrigin::Default)
                }
                Err(cache_err) => {
                    tracing::warn!(error = %err, cache_error = %cache_err, "using default timer config");
                    (TimerConfig::default(), ConfigOrigin::Default)
                }
            }
        }
    }
}
