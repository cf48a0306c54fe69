use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Page, Route};
use crate::error::Result;
use crate::metrics::MetricsPoller;
use crate::timer::breathing::{IDLE_INSTRUCTION, IDLE_TITLE};
use crate::timer::{sleep_sequence, BreathingPattern, PhaseSequence, TimerSession, TimerSnapshot, TimerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exercise {
    /// Looping breathing pattern.
    #[default]
    Breathing,
    /// One-shot body-scan relaxation.
    Sleep,
}

impl Exercise {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "breathing" | "box" => Some(Self::Breathing),
            "sleep" => Some(Self::Sleep),
            _ => None,
        }
    }
}

/// Stress-reduction page: one session running either exercise.
pub struct StressPage {
    pattern: BreathingPattern,
    exercise: Exercise,
    session: TimerSession<PhaseSequence>,
    poller: Option<MetricsPoller>,
}

impl StressPage {
    /// # Errors
    ///
    /// Fails when the breathing pattern cannot form a sequence.
    pub fn new(pattern: BreathingPattern, progress_interval: Duration) -> Result<Self> {
        let session = TimerSession::with_progress_interval(pattern.sequence()?, progress_interval)?;
        Ok(Self {
            pattern,
            exercise: Exercise::Breathing,
            session,
            poller: None,
        })
    }

    pub fn with_metrics(mut self, poller: MetricsPoller) -> Self {
        self.poller = Some(poller);
        self
    }

    pub fn exercise(&self) -> Exercise {
        self.exercise
    }

    pub fn pattern(&self) -> &BreathingPattern {
        &self.pattern
    }

    /// Switch exercise. The running session is stopped first.
    pub fn select(&mut self, exercise: Exercise) -> Result<()> {
        if exercise == self.exercise {
            return Ok(());
        }
        let sequence = match exercise {
            Exercise::Breathing => self.pattern.sequence()?,
            Exercise::Sleep => sleep_sequence()?,
        };
        self.session.stop();
        self.session.configure(sequence)?;
        self.exercise = exercise;
        tracing::debug!(?exercise, "stress exercise selected");
        Ok(())
    }

    pub fn session(&self) -> &TimerSession<PhaseSequence> {
        &self.session
    }

    /// Title and instruction to show, with the idle prompt before the first start.
    pub fn prompt(&self) -> (String, String) {
        let snap = self.session.snapshot();
        if snap.state == TimerState::Idle {
            (IDLE_TITLE.to_string(), IDLE_INSTRUCTION.to_string())
        } else {
            (snap.title, snap.instruction)
        }
    }
}

impl Page for StressPage {
    fn route(&self) -> Route {
        Route::Stress
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
    use crate::timer::breathing::{HOLD_IN, INHALE};
    use crate::timer::sleep::COMPLETE;
    use crate::timer::DEFAULT_PROGRESS_INTERVAL;

    async fn advance_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn breathing_runs_on_timers() {
        let page = StressPage::new(BreathingPattern::box_breathing(), DEFAULT_PROGRESS_INTERVAL).unwrap();
        assert_eq!(page.prompt().0, IDLE_TITLE);
        page.start();
        assert_eq!(page.snapshot().unwrap().phase, INHALE);
        advance_ms(4000).await;
        assert_eq!(page.snapshot().unwrap().phase, HOLD_IN);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_to_sleep_stops_and_restarts() {
        let mut page = StressPage::new(BreathingPattern::box_breathing(), DEFAULT_PROGRESS_INTERVAL).unwrap();
        page.start();
        advance_ms(1000).await;
        page.select(Exercise::Sleep).unwrap();
        let snap = page.snapshot().unwrap();
        assert!(!snap.active);
        assert_eq!(snap.phase, "intro");

        page.start();
        advance_ms(56_000).await;
        let snap = page.snapshot().unwrap();
        assert_eq!(snap.phase, COMPLETE);
        assert!(!snap.active);
        assert_eq!(page.session().pending_timers(), 0);
    }

    #[test]
    fn exercise_names() {
        assert_eq!(Exercise::from_name("Sleep"), Some(Exercise::Sleep));
        assert_eq!(Exercise::from_name("box"), Some(Exercise::Breathing));
        assert_eq!(Exercise::from_name("yoga"), None);
    }
}
