use std::time::Duration;

use tokio::time::Instant;

use super::{Page, Route};
use crate::error::Result;
use crate::metrics::MetricsPoller;
use crate::timer::{MatchOutcome, ReflexConfig, ReflexGame, TimerSession, TimerSnapshot};

/// Reflex game page: colors change on a random delay until the player stops.
pub struct ConcentrationPage {
    session: TimerSession<ReflexGame>,
    poller: Option<MetricsPoller>,
}

impl ConcentrationPage {
    pub fn new(config: ReflexConfig, progress_interval: Duration) -> Result<Self> {
        Self::with_game(ReflexGame::new(config)?, progress_interval)
    }

    pub fn with_game(game: ReflexGame, progress_interval: Duration) -> Result<Self> {
        Ok(Self {
            session: TimerSession::with_progress_interval(game, progress_interval)?,
            poller: None,
        })
    }

    pub fn with_metrics(mut self, poller: MetricsPoller) -> Self {
        self.poller = Some(poller);
        self
    }

    /// Player says the colors match. `None` while the game is not running.
    pub fn signal(&self) -> Option<MatchOutcome> {
        if !self.session.is_active() {
            return None;
        }
        let now = Instant::now();
        let outcome = self.session.with_transition(|game| game.signal_match(now));
        tracing::debug!(?outcome, "match signalled");
        Some(outcome)
    }

    pub fn score(&self) -> u32 {
        self.session.with_transition(|game| game.score())
    }

    pub fn last_reaction_ms(&self) -> Option<u64> {
        self.session.with_transition(|game| game.last_reaction_ms())
    }

    pub fn current_color(&self) -> String {
        self.session.with_transition(|game| game.current_color().to_string())
    }

    pub fn target_color(&self) -> String {
        self.session.with_transition(|game| game.target_color().to_string())
    }

    pub fn session(&self) -> &TimerSession<ReflexGame> {
        &self.session
    }
}

impl Page for ConcentrationPage {
    fn route(&self) -> Route {
        Route::Concentration
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::DEFAULT_PROGRESS_INTERVAL;

    fn page(seed: u64) -> ConcentrationPage {
        let game = ReflexGame::seeded(ReflexConfig::default(), seed).unwrap();
        ConcentrationPage::with_game(game, DEFAULT_PROGRESS_INTERVAL).unwrap()
    }

    async fn advance_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn signal_requires_running_game() {
        let page = page(11);
        assert_eq!(page.signal(), None);
        page.start();
        let matched = page.current_color() == page.target_color();
        let outcome = page.signal().unwrap();
        assert_eq!(matches!(outcome, MatchOutcome::Hit { .. }), matched);
    }

    #[tokio::test(start_paused = true)]
    async fn colors_change_within_max_delay() {
        let page = page(12);
        page.start();
        let before = page.session().snapshot().counter;
        advance_ms(2_600).await;
        assert!(page.session().snapshot().counter > before);
    }

    #[tokio::test(start_paused = true)]
    async fn hit_counts_reaction_since_change() {
        let page = page(13);
        page.start();
        let mut guard = 0;
        while page.current_color() != page.target_color() {
            advance_ms(2_500).await;
            guard += 1;
            assert!(guard < 200, "target never shown");
        }
        let outcome = page.signal().unwrap();
        assert!(matches!(outcome, MatchOutcome::Hit { score: 1, .. }));
        assert_eq!(page.score(), 1);
        assert!(page.last_reaction_ms().is_some());
    }
}
