use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::sample::MetricSample;

pub const DEFAULT_HISTORY_CAP: usize = 50;

/// Bounded, insertion-ordered window of samples. Oldest entries fall out first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricHistory {
    cap: usize,
    samples: VecDeque<MetricSample>,
}

impl Default for MetricHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl MetricHistory {
    /// A cap of zero is treated as one.
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            samples: VecDeque::with_capacity(cap),
        }
    }

    /// Build from oldest-first samples, keeping only the newest `cap`.
    pub fn from_samples(cap: usize, samples: impl IntoIterator<Item = MetricSample>) -> Self {
        let mut history = Self::new(cap);
        for sample in samples {
            history.push(sample);
        }
        history
    }

    /// Append, returning the evicted sample if the window was full.
    pub fn push(&mut self, sample: MetricSample) -> Option<MetricSample> {
        let evicted = if self.samples.len() == self.cap {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&MetricSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &MetricSample> + '_ {
        self.samples.iter()
    }

    pub fn to_vec(&self) -> Vec<MetricSample> {
        self.samples.iter().copied().collect()
    }

    /// Mean of each series over the window as (stress, focus, tiredness).
    pub fn mean(&self) -> Option<(f64, f64, f64)> {
        if self.samples.is_empty() {
            return None;
        }
        let n = self.samples.len() as f64;
        let (s, f, t) = self.samples.iter().fold((0.0, 0.0, 0.0), |acc, m| {
            (
                acc.0 + m.stress_level,
                acc.1 + m.focus_level,
                acc.2 + m.tiredness_level,
            )
        });
        Some((s / n, f / n, t / n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample(i: i64) -> MetricSample {
        let level = (i % 100) as f64;
        MetricSample::new(level, level, level, Utc::now() + Duration::seconds(i)).unwrap()
    }

    #[test]
    fn evicts_oldest_beyond_cap() {
        let mut history = MetricHistory::new(3);
        for i in 0..5 {
            history.push(sample(i));
        }
        assert_eq!(history.len(), 3);
        let levels: Vec<f64> = history.iter().map(|s| s.stress_level).collect();
        assert_eq!(levels, [2.0, 3.0, 4.0]);
        assert_eq!(history.latest().map(|s| s.stress_level), Some(4.0));
    }

    #[test]
    fn from_samples_keeps_newest() {
        let history = MetricHistory::from_samples(2, (0..10).map(sample));
        assert_eq!(history.to_vec().iter().map(|s| s.focus_level).collect::<Vec<_>>(), [8.0, 9.0]);
    }

    #[test]
    fn zero_cap_holds_one() {
        let mut history = MetricHistory::new(0);
        history.push(sample(1));
        history.push(sample(2));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn mean_of_window() {
        let history = MetricHistory::from_samples(10, [sample(10), sample(20)]);
        assert_eq!(history.mean(), Some((15.0, 15.0, 15.0)));
        assert_eq!(MetricHistory::new(5).mean(), None);
    }
}
