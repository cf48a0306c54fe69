use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use super::{Page, Route};
use crate::audio::{AudioSession, Cue};
use crate::error::Result;
use crate::events::Event;
use crate::metrics::MetricsPoller;
use crate::storage::{load_timer_config, ConfigOrigin, ConfigSource, KeyValueStore, PomodoroConfig, TimerConfig};
use crate::timer::{PomodoroCycle, PomodoroPhase, TimerSession, TimerSnapshot};

/// Pomodoro page: work/break session, its durations and the chime.
pub struct PomodoroPage {
    session: TimerSession<PomodoroCycle>,
    timer_config: TimerConfig,
    origin: ConfigOrigin,
    settings: PomodoroConfig,
    audio: Arc<Mutex<AudioSession>>,
    chime: JoinHandle<()>,
    poller: Option<MetricsPoller>,
}

impl PomodoroPage {
    /// Load durations (backend, then cache, then defaults) and build the page.
    pub async fn load(
        source: &dyn ConfigSource,
        store: &dyn KeyValueStore,
        settings: PomodoroConfig,
        audio: Arc<Mutex<AudioSession>>,
        progress_interval: Duration,
    ) -> Result<Self> {
        let (config, origin) = load_timer_config(source, store).await;
        Self::new(config, origin, settings, audio, progress_interval)
    }

    /// Must be called from within a Tokio runtime.
    pub fn new(
        timer_config: TimerConfig,
        origin: ConfigOrigin,
        settings: PomodoroConfig,
        audio: Arc<Mutex<AudioSession>>,
        progress_interval: Duration,
    ) -> Result<Self> {
        let session = TimerSession::with_progress_interval(cycle(&timer_config, &settings), progress_interval)?;
        let chime = spawn_chime(session.subscribe(), Arc::clone(&audio));
        Ok(Self {
            session,
            timer_config,
            origin,
            settings,
            audio,
            chime,
            poller: None,
        })
    }

    pub fn with_metrics(mut self, poller: MetricsPoller) -> Self {
        self.poller = Some(poller);
        self
    }

    pub fn timer_config(&self) -> TimerConfig {
        self.timer_config
    }

    pub fn config_origin(&self) -> ConfigOrigin {
        self.origin
    }

    pub fn mode(&self) -> PomodoroPhase {
        PomodoroPhase::from_name(&self.session.snapshot().phase).unwrap_or(PomodoroPhase::Work)
    }

    /// Completed work sessions.
    pub fn completed(&self) -> u32 {
        self.session.snapshot().counter
    }

    /// Start or pause. Returns whether the timer is now running.
    pub fn toggle(&self) -> bool {
        if self.session.is_active() {
            self.session.stop();
        } else {
            self.session.start();
        }
        self.session.is_active()
    }

    /// Pause and rewind the current phase to its full length.
    pub fn reset(&self) {
        self.session.stop();
    }

    /// Swap in new durations, keeping the current mode and count.
    pub fn apply_config(&mut self, timer_config: TimerConfig, origin: ConfigOrigin) -> Result<()> {
        self.session.configure(cycle(&timer_config, &self.settings))?;
        self.timer_config = timer_config;
        self.origin = origin;
        Ok(())
    }

    pub fn session(&self) -> &TimerSession<PomodoroCycle> {
        &self.session
    }

    pub fn audio(&self) -> &Arc<Mutex<AudioSession>> {
        &self.audio
    }
}

impl Page for PomodoroPage {
    fn route(&self) -> Route {
        Route::Pomodoro
    }

    fn start(&self) {
        self.session.start();
    }

    fn stop(&self) {
        self.session.stop();
    }

    fn snapshot(&self) -> Option<TimerSnapshot> {
        Some(self.session.snapshot())
    }

    fn metrics(&self) -> Option<&MetricsPoller> {
        self.poller.as_ref()
    }
}

impl Drop for PomodoroPage {
    fn drop(&mut self) {
        self.chime.abort();
    }
}

fn cycle(config: &TimerConfig, settings: &PomodoroConfig) -> PomodoroCycle {
    PomodoroCycle::new(config)
        .with_long_break_every(settings.sessions_before_long_break)
        .with_auto_advance(settings.auto_advance)
}

fn spawn_chime(mut events: broadcast::Receiver<Event>, audio: Arc<Mutex<AudioSession>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(Event::PhaseCompleted { phase, .. }) => {
                    let played = audio
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .cue(Cue::Chime);
                    tracing::debug!(%phase, played, "phase complete chime");
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "chime listener fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::AudioConfig;
    use crate::timer::DEFAULT_PROGRESS_INTERVAL;

    async fn advance_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn short() -> TimerConfig {
        TimerConfig {
            work: 2,
            short_break: 1,
            long_break: 3,
        }
    }

    fn page(auto_advance: bool) -> PomodoroPage {
        let settings = PomodoroConfig {
            auto_advance,
            ..PomodoroConfig::default()
        };
        let audio = Arc::new(Mutex::new(AudioSession::new(&AudioConfig::default())));
        PomodoroPage::new(short(), ConfigOrigin::Default, settings, audio, DEFAULT_PROGRESS_INTERVAL).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn work_completion_chimes_and_waits() {
        let page = page(false);
        assert!(page.toggle());
        advance_ms(2_100).await;

        assert_eq!(page.mode(), PomodoroPhase::ShortBreak);
        assert_eq!(page.completed(), 1);
        assert!(!page.session().is_active());
        assert_eq!(page.audio().lock().unwrap().cues_played(), 1);
        assert_eq!(page.snapshot().unwrap().remaining_ms, 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_advance_runs_through() {
        let page = page(true);
        page.start();
        // work 2s, short 1s, work 2s
        advance_ms(5_100).await;
        assert_eq!(page.mode(), PomodoroPhase::ShortBreak);
        assert_eq!(page.completed(), 2);
        assert_eq!(page.audio().lock().unwrap().cues_played(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn new_durations_keep_mode() {
        let mut page = page(false);
        page.start();
        advance_ms(2_100).await;
        let longer = TimerConfig {
            short_break: 30,
            ..short()
        };
        page.apply_config(longer, ConfigOrigin::Backend).unwrap();
        assert_eq!(page.mode(), PomodoroPhase::ShortBreak);
        assert_eq!(page.completed(), 1);
        assert_eq!(page.snapshot().unwrap().duration_ms, 30_000);
        assert_eq!(page.config_origin(), ConfigOrigin::Backend);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_rewinds_phase() {
        let page = page(false);
        page.start();
        advance_ms(1200).await;
        page.reset();
        let snap = page.snapshot().unwrap();
        assert_eq!(snap.phase, "work");
        assert_eq!(snap.remaining_ms, 2000);
        assert!(!snap.active);
    }
}
