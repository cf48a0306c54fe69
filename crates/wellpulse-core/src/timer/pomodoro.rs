//! Pomodoro cycle.
//!
//! Unlike breathing, the successor of a phase depends on how many work
//! sessions have been completed, so the cycle is a transition function
//! rather than a static list.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::sequence::{Phase, Transition};
use crate::storage::TimerConfig;

/// Completed work sessions between long breaks.
pub const SESSIONS_BEFORE_LONG_BREAK: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PomodoroPhase {
    Work,
    ShortBreak,
    LongBreak,
}

impl PomodoroPhase {
    pub const ALL: [PomodoroPhase; 3] = [Self::Work, Self::ShortBreak, Self::LongBreak];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::ShortBreak => "shortBreak",
            Self::LongBreak => "longBreak",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    fn index(self) -> usize {
        match self {
            Self::Work => 0,
            Self::ShortBreak => 1,
            Self::LongBreak => 2,
        }
    }

    fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(Self::Work)
    }
}

/// `next(phase, completed)` with the default long-break spacing.
///
/// ```
/// use wellpulse_core::timer::pomodoro::{next, PomodoroPhase::*};
/// assert_eq!(next(Work, 3), (LongBreak, 4));
/// assert_eq!(next(Work, 0), (ShortBreak, 1));
/// assert_eq!(next(ShortBreak, 2), (Work, 2));
/// ```
pub fn next(phase: PomodoroPhase, completed: u32) -> (PomodoroPhase, u32) {
    next_with(phase, completed, SESSIONS_BEFORE_LONG_BREAK)
}

/// Finishing work bumps the counter; every `every`-th completion earns a long
/// break. Finishing any break goes back to work.
pub fn next_with(phase: PomodoroPhase, completed: u32, every: u32) -> (PomodoroPhase, u32) {
    match phase {
        PomodoroPhase::Work => {
            let completed = completed.saturating_add(1);
            if completed % every.max(1) == 0 {
                (PomodoroPhase::LongBreak, completed)
            } else {
                (PomodoroPhase::ShortBreak, completed)
            }
        }
        PomodoroPhase::ShortBreak | PomodoroPhase::LongBreak => (PomodoroPhase::Work, completed),
    }
}

fn secs_for(config: &TimerConfig, phase: PomodoroPhase) -> u64 {
    match phase {
        PomodoroPhase::Work => config.work,
        PomodoroPhase::ShortBreak => config.short_break,
        PomodoroPhase::LongBreak => config.long_break,
    }
}

const MAX_BLOCK_SECS: u64 = 24 * 60 * 60;

/// One block of a laid-out pomodoro plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedStep {
    pub phase: PomodoroPhase,
    /// Work session this block belongs to, starting at 1.
    pub number: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Most work sessions a single plan lays out.
pub const MAX_PLAN_SESSIONS: u32 = 100;

/// Lay out `sessions` work blocks, each followed by its break, from `start`.
///
/// `sessions` is capped at [`MAX_PLAN_SESSIONS`].
pub fn plan(config: &TimerConfig, sessions: u32, every: u32, start: DateTime<Utc>) -> Vec<PlannedStep> {
    let sessions = sessions.min(MAX_PLAN_SESSIONS);
    let mut steps = Vec::with_capacity(sessions as usize * 2);
    let mut at = start;
    let mut completed = 0;
    while completed < sessions {
        let number = completed + 1;
        for phase in [PomodoroPhase::Work, next_with(PomodoroPhase::Work, completed, every).0] {
            let secs = secs_for(config, phase).min(MAX_BLOCK_SECS) as i64;
            let end = at + Duration::seconds(secs);
            steps.push(PlannedStep {
                phase,
                number,
                start: at,
                end,
            });
            at = end;
        }
        completed = number;
    }
    steps
}

/// Pomodoro transition fed by a [`TimerConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomodoroCycle {
    phases: Vec<Phase>,
    every: u32,
    auto_advance: bool,
}

impl PomodoroCycle {
    pub fn new(config: &TimerConfig) -> Self {
        let phases = PomodoroPhase::ALL
            .into_iter()
            .map(|p| {
                let secs = secs_for(config, p);
                // Never zero: a zero duration would end the cycle.
                let ms = secs.max(1).saturating_mul(1000);
                let (title, instruction) = match p {
                    PomodoroPhase::Work => ("Time to work", "Focus on the task"),
                    PomodoroPhase::ShortBreak => ("Short break", "Take a moment to rest"),
                    PomodoroPhase::LongBreak => ("Long break", "Relax properly"),
                };
                Phase::new(p.as_str(), ms).with_text(title, instruction)
            })
            .collect();
        Self {
            phases,
            every: SESSIONS_BEFORE_LONG_BREAK,
            auto_advance: true,
        }
    }

    pub fn with_long_break_every(mut self, every: u32) -> Self {
        self.every = every.max(1);
        self
    }

    /// When false, the engine waits for `start()` after every phase.
    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    pub fn long_break_every(&self) -> u32 {
        self.every
    }
}

impl Transition for PomodoroCycle {
    fn phases(&self) -> &[Phase] {
        &self.phases
    }

    fn next(&mut self, current: usize, counter: u32) -> (usize, u32) {
        let (phase, counter) = next_with(PomodoroPhase::from_index(current), counter, self.every);
        (phase.index(), counter)
    }

    fn pauses_between_phases(&self) -> bool {
        !self.auto_advance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::engine::{PhaseEngine, TimerState};

    #[test]
    fn transition_table() {
        use PomodoroPhase::*;
        assert_eq!(next(Work, 3), (LongBreak, 4));
        assert_eq!(next(Work, 0), (ShortBreak, 1));
        assert_eq!(next(ShortBreak, 7), (Work, 7));
        assert_eq!(next(LongBreak, 4), (Work, 4));
        assert_eq!(next(Work, 7), (LongBreak, 8));
    }

    #[test]
    fn plan_ends_with_long_break() {
        let start = Utc::now();
        let config = TimerConfig::default();
        let steps = plan(&config, 4, SESSIONS_BEFORE_LONG_BREAK, start);
        assert_eq!(steps.len(), 8);
        assert_eq!(steps[1].phase, PomodoroPhase::ShortBreak);
        assert_eq!(steps[7].phase, PomodoroPhase::LongBreak);
        assert_eq!(steps[7].number, 4);
        assert!(steps.windows(2).all(|w| w[0].end == w[1].start));
        let total = 4 * 1500 + 3 * 300 + 900;
        assert_eq!(steps[7].end, start + Duration::seconds(total));
    }

    #[test]
    fn plan_is_capped() {
        let steps = plan(&TimerConfig::default(), u32::MAX, SESSIONS_BEFORE_LONG_BREAK, Utc::now());
        assert_eq!(steps.len(), MAX_PLAN_SESSIONS as usize * 2);
        assert_eq!(steps.last().map(|s| s.number), Some(MAX_PLAN_SESSIONS));
        assert!(plan(&TimerConfig::default(), 0, 4, Utc::now()).is_empty());
    }

    #[test]
    fn names_round_trip() {
        for p in PomodoroPhase::ALL {
            assert_eq!(PomodoroPhase::from_name(p.as_str()), Some(p));
        }
        assert_eq!(PomodoroPhase::from_name("nap"), None);
    }

    #[test]
    fn engine_takes_long_break_after_four() {
        let config = TimerConfig {
            work: 10,
            short_break: 2,
            long_break: 5,
        };
        let mut engine = PhaseEngine::new(PomodoroCycle::new(&config)).unwrap();
        engine.start();
        let mut visited = vec![engine.current_phase().name.clone()];
        for _ in 0..8 {
            let ms = engine.remaining_ms();
            engine.elapse(ms);
            visited.push(engine.current_phase().name.clone());
        }
        assert_eq!(
            visited,
            [
                "work", "shortBreak", "work", "shortBreak", "work", "shortBreak", "work",
                "longBreak", "work"
            ]
        );
        assert_eq!(engine.counter(), 4);
    }

    #[test]
    fn manual_mode_stops_after_each_phase() {
        let cycle = PomodoroCycle::new(&TimerConfig::default()).with_auto_advance(false);
        let mut engine = PhaseEngine::new(cycle).unwrap();
        engine.start();
        engine.elapse(1_500_000);
        assert_eq!(engine.current_phase().name, "shortBreak");
        assert_eq!(engine.state(), TimerState::Stopped);
        assert_eq!(engine.remaining_ms(), 300_000);
        assert_eq!(engine.counter(), 1);
    }
}
