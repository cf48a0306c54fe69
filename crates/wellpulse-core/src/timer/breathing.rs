//! Breathing patterns.
//!
//! A pattern is four phase timings. Holds of zero length are left out of the
//! generated sequence, since a zero duration would make them terminal.

use serde::{Deserialize, Serialize};

use super::sequence::{Phase, PhaseSequence};
use crate::error::{Result, ValidationError};

pub const INHALE: &str = "inhale";
pub const HOLD_IN: &str = "hold-in";
pub const EXHALE: &str = "exhale";
pub const HOLD_OUT: &str = "hold-out";

/// Text shown before a session starts.
pub const IDLE_TITLE: &str = "Ready?";
pub const IDLE_INSTRUCTION: &str = "Press start to begin";

const COUNTDOWN_STEP_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingPattern {
    pub inhale_ms: u64,
    pub hold_in_ms: u64,
    pub exhale_ms: u64,
    pub hold_out_ms: u64,
    /// Seconds of "3, 2, 1" before the first inhale. Runs once per session.
    #[serde(default)]
    pub countdown_secs: u32,
}

impl BreathingPattern {
    /// 4-4-4-4 box breathing.
    pub fn box_breathing() -> Self {
        Self {
            inhale_ms: 4000,
            hold_in_ms: 4000,
            exhale_ms: 4000,
            hold_out_ms: 4000,
            countdown_secs: 0,
        }
    }

    /// 4-7-8 relaxing breath.
    pub fn four_seven_eight() -> Self {
        Self {
            inhale_ms: 4000,
            hold_in_ms: 7000,
            exhale_ms: 8000,
            hold_out_ms: 0,
            countdown_secs: 0,
        }
    }

    /// Resonant breathing at about six breaths a minute.
    pub fn coherence() -> Self {
        Self {
            inhale_ms: 5000,
            hold_in_ms: 0,
            exhale_ms: 5000,
            hold_out_ms: 0,
            countdown_secs: 0,
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "box" => Some(Self::box_breathing()),
            "4-7-8" => Some(Self::four_seven_eight()),
            "coherence" => Some(Self::coherence()),
            _ => None,
        }
    }

    pub fn with_countdown(mut self, secs: u32) -> Self {
        self.countdown_secs = secs;
        self
    }

    pub fn cycle_ms(&self) -> u64 {
        self.inhale_ms + self.hold_in_ms + self.exhale_ms + self.hold_out_ms
    }

    pub fn breaths_per_minute(&self) -> f64 {
        match self.cycle_ms() {
            0 => 0.0,
            ms => 60_000.0 / ms as f64,
        }
    }

    /// Build the cyclic phase sequence, countdown prefix first.
    ///
    /// # Errors
    ///
    /// Fails when inhale or exhale is zero.
    pub fn sequence(&self) -> Result<PhaseSequence> {
        if self.inhale_ms == 0 || self.exhale_ms == 0 {
            return Err(ValidationError::InvalidValue {
                field: "breathing pattern".into(),
                message: "inhale and exhale must be longer than zero".into(),
            }
            .into());
        }

        let mut phases: Vec<Phase> = (1..=self.countdown_secs)
            .rev()
            .map(|n| {
                Phase::new(format!("countdown-{n}"), COUNTDOWN_STEP_MS)
                    .with_text(n.to_string(), "Get comfortable")
            })
            .collect();
        let loop_start = phases.len();

        phases.push(
            Phase::new(INHALE, self.inhale_ms)
                .with_text("Inhale", "Breathe in slowly through your nose..."),
        );
        if self.hold_in_ms > 0 {
            phases.push(
                Phase::new(HOLD_IN, self.hold_in_ms)
                    .with_text("Hold", "Keep the air in your lungs"),
            );
        }
        phases.push(
            Phase::new(EXHALE, self.exhale_ms)
                .with_text("Exhale", "Breathe out through your mouth..."),
        );
        if self.hold_out_ms > 0 {
            phases.push(
                Phase::new(HOLD_OUT, self.hold_out_ms)
                    .with_text("Hold", "Don't breathe in yet"),
            );
        }

        PhaseSequence::cyclic_from(phases, loop_start)
    }
}

impl Default for BreathingPattern {
    fn default() -> Self {
        Self::box_breathing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::sequence::Transition;

    fn names(seq: &PhaseSequence) -> Vec<&str> {
        seq.phases().iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn box_has_four_phases() {
        let seq = BreathingPattern::box_breathing().sequence().unwrap();
        assert_eq!(names(&seq), [INHALE, HOLD_IN, EXHALE, HOLD_OUT]);
        assert_eq!(seq.cycle_duration_ms(), 16_000);
    }

    #[test]
    fn zero_holds_are_omitted() {
        let seq = BreathingPattern::coherence().sequence().unwrap();
        assert_eq!(names(&seq), [INHALE, EXHALE]);
        let seq = BreathingPattern::four_seven_eight().sequence().unwrap();
        assert_eq!(names(&seq), [INHALE, HOLD_IN, EXHALE]);
    }

    #[test]
    fn countdown_runs_once() {
        let mut seq = BreathingPattern::box_breathing()
            .with_countdown(3)
            .sequence()
            .unwrap();
        assert_eq!(
            names(&seq)[..4],
            ["countdown-3", "countdown-2", "countdown-1", INHALE]
        );
        let last = seq.len() - 1;
        assert_eq!(seq.next(last, 0), (3, 1));
    }

    #[test]
    fn rejects_zero_inhale() {
        let pattern = BreathingPattern {
            inhale_ms: 0,
            ..BreathingPattern::box_breathing()
        };
        assert!(pattern.sequence().is_err());
    }

    #[test]
    fn presets_by_name() {
        assert_eq!(BreathingPattern::preset("box"), Some(BreathingPattern::box_breathing()));
        assert!(BreathingPattern::preset("unknown").is_none());
        assert!((BreathingPattern::coherence().breaths_per_minute() - 6.0).abs() < 1e-9);
    }
}
