//! Reflex / concentration game.
//!
//! A single "color" phase repeats with a random delay. Every entry swaps the
//! shown color for a different one; the player signals when the shown color
//! matches the target. The target only changes on a hit.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::sequence::{Entry, Phase, Transition};
use crate::error::{Result, ValidationError};

pub const COLOR_PHASE: &str = "color";

pub const DEFAULT_PALETTE: [&str; 4] = ["red", "blue", "green", "yellow"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflexConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub palette: Vec<String>,
}

impl Default for ReflexConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 500,
            max_delay_ms: 2500,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ReflexConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.min_delay_ms == 0 || self.min_delay_ms > self.max_delay_ms {
            return Err(ValidationError::InvalidValue {
                field: "reflex delay".into(),
                message: format!(
                    "need 0 < min <= max, got {}..{}",
                    self.min_delay_ms, self.max_delay_ms
                ),
            });
        }
        if self.palette.len() < 2 {
            return Err(ValidationError::InvalidValue {
                field: "reflex palette".into(),
                message: "at least two colors are required".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum MatchOutcome {
    Hit { reaction_ms: u64, score: u32 },
    Miss,
}

#[derive(Debug, Clone)]
pub struct ReflexGame<R = Pcg64> {
    phases: Vec<Phase>,
    config: ReflexConfig,
    rng: R,
    current: usize,
    target: usize,
    changed_at: Option<Instant>,
    score: u32,
    last_reaction_ms: Option<u64>,
}

impl ReflexGame<Pcg64> {
    pub fn new(config: ReflexConfig) -> Result<Self> {
        Self::with_rng(config, Pcg64::from_entropy())
    }

    /// Deterministic game for replays and tests.
    pub fn seeded(config: ReflexConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, Pcg64::seed_from_u64(seed))
    }
}

impl<R: Rng> ReflexGame<R> {
    pub fn with_rng(config: ReflexConfig, mut rng: R) -> Result<Self> {
        config.validate()?;
        let target = rng.gen_range(0..config.palette.len());
        let phases = vec![Phase::new(COLOR_PHASE, config.max_delay_ms)
            .with_text("Press when the colors match", "Wait for the target color...")];
        Ok(Self {
            phases,
            rng,
            current: 0,
            target,
            changed_at: None,
            score: 0,
            last_reaction_ms: None,
            config,
        })
    }

    pub fn current_color(&self) -> &str {
        &self.config.palette[self.current]
    }

    pub fn target_color(&self) -> &str {
        &self.config.palette[self.target]
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn last_reaction_ms(&self) -> Option<u64> {
        self.last_reaction_ms
    }

    pub fn config(&self) -> &ReflexConfig {
        &self.config
    }

    /// Clear score and pick a fresh target.
    pub fn reset(&mut self, at: Instant) {
        self.score = 0;
        self.last_reaction_ms = None;
        self.changed_at = Some(at);
        self.pick_target();
    }

    /// Uniform delay in `[min_delay_ms, max_delay_ms]`.
    pub fn next_delay_ms(&mut self) -> u64 {
        self.rng
            .gen_range(self.config.min_delay_ms..=self.config.max_delay_ms)
    }

    /// Show a different color, chosen uniformly among the others.
    pub fn change_color(&mut self, at: Instant) -> &str {
        let others = self.config.palette.len() - 1;
        let pick = self.rng.gen_range(0..others);
        self.current = if pick >= self.current { pick + 1 } else { pick };
        self.changed_at = Some(at);
        self.current_color()
    }

    pub fn pick_target(&mut self) -> &str {
        self.target = self.rng.gen_range(0..self.config.palette.len());
        self.target_color()
    }

    /// The player claims the colors match.
    pub fn signal_match(&mut self, at: Instant) -> MatchOutcome {
        if self.current != self.target {
            self.last_reaction_ms = None;
            return MatchOutcome::Miss;
        }
        let since = self.changed_at.unwrap_or(at);
        let reaction_ms =
            u64::try_from(at.saturating_duration_since(since).as_millis()).unwrap_or(u64::MAX);
        self.score += 1;
        self.last_reaction_ms = Some(reaction_ms);
        self.pick_target();
        MatchOutcome::Hit {
            reaction_ms,
            score: self.score,
        }
    }
}

impl<R: Rng + Send + 'static> Transition for ReflexGame<R> {
    fn phases(&self) -> &[Phase] {
        &self.phases
    }

    fn next(&mut self, current: usize, counter: u32) -> (usize, u32) {
        (current, counter.saturating_add(1))
    }

    fn duration_ms(&mut self, _index: usize) -> u64 {
        self.next_delay_ms()
    }

    fn on_enter(&mut self, _index: usize, _counter: u32, entry: Entry) {
        let now = Instant::now();
        match entry {
            Entry::Start => self.reset(now),
            Entry::Advance => {
                self.change_color(now);
            }
            Entry::Reconfigure => {}
        }
    }
}
