//! Adaptive pomodoro lengths driven by a focus/tiredness baseline.
//!
//! A baseline is collected from the first few samples. Once unlocked, work
//! length scales with baseline focus and break length with baseline
//! tiredness. During a session a sample whose focus or score falls below
//! `threshold` times the baseline suggests cutting the session short.

use serde::{Deserialize, Serialize};

use crate::metrics::MetricSample;
use crate::storage::TimerConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    pub baseline_samples: usize,
    pub min_session_min: u32,
    pub max_session_min: u32,
    pub min_break_min: u32,
    pub max_break_min: u32,
    pub long_break_min: u32,
    /// Fraction of baseline below which a session should end early.
    pub threshold: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            baseline_samples: 10,
            min_session_min: 15,
            max_session_min: 40,
            min_break_min: 5,
            max_break_min: 20,
            long_break_min: 20,
            threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub focus: f64,
    pub tiredness: f64,
}

impl Baseline {
    pub fn score(&self) -> f64 {
        score(self.focus, self.tiredness)
    }
}

pub fn score(focus: f64, tiredness: f64) -> f64 {
    focus - tiredness
}

#[derive(Debug, Clone, Default)]
pub struct AdaptivePlanner {
    config: AdaptiveConfig,
    focus: Vec<f64>,
    tiredness: Vec<f64>,
    baseline: Option<Baseline>,
}

impl AdaptivePlanner {
    pub fn new(config: AdaptiveConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    /// Feed a baseline sample. Returns the baseline once enough were seen.
    pub fn observe(&mut self, sample: &MetricSample) -> Option<Baseline> {
        if self.baseline.is_some() {
            return self.baseline;
        }
        self.focus.push(sample.focus_level);
        self.tiredness.push(sample.tiredness_level);
        if self.focus.len() >= self.config.baseline_samples.max(1) {
            let baseline = Baseline {
                focus: mean(&self.focus).trunc(),
                tiredness: mean(&self.tiredness).trunc(),
            };
            tracing::info!(focus = baseline.focus, tiredness = baseline.tiredness, "baseline collected");
            self.baseline = Some(baseline);
        }
        self.baseline
    }

    pub fn baseline(&self) -> Option<Baseline> {
        self.baseline
    }

    pub fn is_unlocked(&self) -> bool {
        self.baseline.is_some()
    }

    /// Samples still needed before recommendations unlock.
    pub fn remaining_samples(&self) -> usize {
        if self.baseline.is_some() {
            0
        } else {
            self.config.baseline_samples.max(1) - self.focus.len()
        }
    }

    pub fn reset(&mut self) {
        self.focus.clear();
        self.tiredness.clear();
        self.baseline = None;
    }

    /// Higher baseline focus means a longer session.
    pub fn session_minutes(&self) -> Option<u32> {
        let b = self.baseline?;
        Some(scale(self.config.min_session_min, self.config.max_session_min, b.focus))
    }

    /// Higher baseline tiredness means a longer break.
    pub fn break_minutes(&self) -> Option<u32> {
        let b = self.baseline?;
        Some(scale(self.config.min_break_min, self.config.max_break_min, b.tiredness))
    }

    pub fn recommend(&self) -> Option<TimerConfig> {
        Some(TimerConfig {
            work: u64::from(self.session_minutes()?) * 60,
            short_break: u64::from(self.break_minutes()?) * 60,
            long_break: u64::from(self.config.long_break_min) * 60,
        })
    }

    /// False when focus or score dropped below the threshold of the baseline.
    /// Without a baseline there is nothing to compare against, so keep going.
    pub fn should_continue(&self, sample: &MetricSample) -> bool {
        let Some(b) = self.baseline else {
            return true;
        };
        let t = self.config.threshold;
        let focus_ok = sample.focus_level >= b.focus * t;
        let score_ok = sample.score() >= b.score() * t;
        focus_ok && score_ok
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn scale(min: u32, max: u32, level: f64) -> u32 {
    let norm = (level / 100.0).clamp(0.0, 1.0);
    let span = f64::from(max.saturating_sub(min));
    min + (span * norm) as u32
}
