pub mod completions;
pub mod concentration;
pub mod config;
pub mod home;
pub mod metrics;
pub mod pomodoro;
pub mod route;
mod shell;
pub mod stress;

use std::io::Write;
use std::sync::Arc;

use wellpulse_core::storage::KeyValueStore;
use wellpulse_core::{ApiClient, AudioSink, CacheDb, Config, Cue, MemoryStore, MetricsPoller, MetricsSource, MusicKind};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a page command needs from the environment.
pub struct Context {
    pub config: Config,
    pub store: Arc<dyn KeyValueStore>,
    pub api: Arc<ApiClient>,
}

impl Context {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load_or_default();
        let store: Arc<dyn KeyValueStore> = match CacheDb::open() {
            Ok(db) => Arc::new(db),
            Err(e) => {
                tracing::warn!(error = %e, "cache unavailable, using memory");
                Arc::new(MemoryStore::new())
            }
        };
        let api = Arc::new(ApiClient::from_config(&config.api)?);
        Ok(Self { config, store, api })
    }

    pub fn poller(&self) -> MetricsPoller {
        let source: Arc<dyn MetricsSource> = self.api.clone();
        MetricsPoller::new(source, Arc::clone(&self.store), self.config.metrics.history_cap)
    }
}

pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread().enable_all().build()
}

/// Audio for a terminal: the bell for cues, a note on stderr for music.
pub struct TerminalAudio;

impl AudioSink for TerminalAudio {
    fn play(&mut self, kind: MusicKind, volume: u32) {
        eprintln!("\n♪ now playing: {kind} ({volume}%)");
    }

    fn silence(&mut self) {
        eprintln!("\n♪ silence");
    }

    fn cue(&mut self, _cue: Cue, _volume: u32) {
        let mut err = std::io::stderr();
        let _ = err.write_all(b"\x07");
        let _ = err.flush();
    }
}
