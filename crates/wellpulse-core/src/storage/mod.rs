mod config;
pub mod database;
pub mod kv;
mod timer_config;

pub use config::{ApiConfig, AudioConfig, Config, MetricsConfig, PomodoroConfig, TimerUiConfig};
pub use database::CacheDb;
pub use kv::{KeyValueStore, MemoryStore};
pub use timer_config::{load_timer_config, ConfigOrigin, ConfigSource, TimerConfig, TIMER_CONFIG_KEY};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/wellpulse[-dev]/` based on WELLPULSE_ENV.
///
/// Set WELLPULSE_ENV=dev to use development data directory, or
/// WELLPULSE_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("WELLPULSE_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("WELLPULSE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("wellpulse-dev")
            } else {
                base_dir.join("wellpulse")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
