use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// One named step of a timed cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    /// Duration in milliseconds. Zero marks a terminal phase.
    pub duration_ms: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub instruction: String,
}

impl Phase {
    pub fn new(name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            duration_ms,
            title: String::new(),
            instruction: String::new(),
        }
    }

    pub fn with_text(mut self, title: impl Into<String>, instruction: impl Into<String>) -> Self {
        self.title = title.into();
        self.instruction = instruction.into();
        self
    }

    /// A terminal phase never advances; entering it ends the session.
    pub fn is_terminal(&self) -> bool {
        self.duration_ms == 0
    }
}

/// How an engine got into the phase it is entering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// `start()` from idle, stopped or completed.
    Start,
    /// The previous phase's deadline elapsed.
    Advance,
    /// The transition was swapped while the session was running.
    Reconfigure,
}

/// Decides which phase follows which.
///
/// Static sequences only need `phases` and `next`; variants with computed
/// durations (the reflex game) or side effects on entry override the rest.
pub trait Transition: Send + 'static {
    fn phases(&self) -> &[Phase];

    /// Index a fresh session begins at.
    fn initial(&self) -> usize {
        0
    }

    /// Successor of `current` and the updated cycle counter.
    fn next(&mut self, current: usize, counter: u32) -> (usize, u32);

    /// Duration to arm for `index` when it is entered.
    fn duration_ms(&mut self, index: usize) -> u64 {
        self.phases().get(index).map(|p| p.duration_ms).unwrap_or(0)
    }

    /// Called every time a phase is entered.
    fn on_enter(&mut self, _index: usize, _counter: u32, _entry: Entry) {}

    /// Whether the engine waits for an explicit `start()` after each
    /// completed phase instead of running straight into the next one.
    fn pauses_between_phases(&self) -> bool {
        false
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.phases().iter().position(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SequenceMode {
    /// After the last phase, wrap to `loop_start`. Phases before it run once.
    Cyclic { loop_start: usize },
    /// Run once and finish on the last phase, which is terminal.
    Linear,
}

/// A fixed, ordered list of phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSequence {
    phases: Vec<Phase>,
    mode: SequenceMode,
}

impl PhaseSequence {
    /// Cyclic sequence that wraps back to the first phase.
    pub fn cyclic(phases: Vec<Phase>) -> Result<Self> {
        Self::cyclic_from(phases, 0)
    }

    /// Cyclic sequence whose loop begins at `loop_start`.
    pub fn cyclic_from(phases: Vec<Phase>, loop_start: usize) -> Result<Self> {
        ensure_not_empty(&phases)?;
        if loop_start >= phases.len() {
            return Err(ValidationError::OutOfBounds {
                collection: "phase sequence".into(),
                index: loop_start,
                len: phases.len(),
            }
            .into());
        }
        Ok(Self {
            phases,
            mode: SequenceMode::Cyclic { loop_start },
        })
    }

    /// One-shot sequence. The last phase must be terminal so the run ends.
    ///
    /// # Errors
    ///
    /// Fails when `phases` is empty or its last phase has a duration.
    pub fn linear(phases: Vec<Phase>) -> Result<Self> {
        ensure_not_empty(&phases)?;
        if phases.last().is_some_and(|p| !p.is_terminal()) {
            return Err(ValidationError::InvalidValue {
                field: "phase sequence".into(),
                message: "a linear sequence must end in a zero-length phase".into(),
            }
            .into());
        }
        Ok(Self {
            phases,
            mode: SequenceMode::Linear,
        })
    }

    pub fn mode(&self) -> SequenceMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Sum of every phase duration, prefix included.
    pub fn total_duration_ms(&self) -> u64 {
        self.phases.iter().map(|p| p.duration_ms).sum()
    }

    /// Sum of the durations that repeat on every lap.
    pub fn cycle_duration_ms(&self) -> u64 {
        let start = match self.mode {
            SequenceMode::Cyclic { loop_start } => loop_start,
            SequenceMode::Linear => 0,
        };
        self.phases[start..].iter().map(|p| p.duration_ms).sum()
    }
}

impl Transition for PhaseSequence {
    fn phases(&self) -> &[Phase] {
        &self.phases
    }

    fn next(&mut self, current: usize, counter: u32) -> (usize, u32) {
        if current + 1 < self.phases.len() {
            return (current + 1, counter);
        }
        match self.mode {
            SequenceMode::Cyclic { loop_start } => (loop_start, counter.saturating_add(1)),
            SequenceMode::Linear => (current, counter),
        }
    }
}

pub(crate) fn ensure_not_empty(phases: &[Phase]) -> Result<(), ValidationError> {
    if phases.is_empty() {
        return Err(ValidationError::EmptyCollection("phase sequence".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Vec<Phase> {
        vec![Phase::new("a", 10), Phase::new("b", 20), Phase::new("c", 30)]
    }

    #[test]
    fn empty_sequence_is_rejected() {
        assert!(PhaseSequence::cyclic(Vec::new()).is_err());
        assert!(PhaseSequence::linear(Vec::new()).is_err());
    }

    #[test]
    fn loop_start_must_be_in_range() {
        assert!(PhaseSequence::cyclic_from(abc(), 3).is_err());
        assert!(PhaseSequence::cyclic_from(abc(), 2).is_ok());
    }

    #[test]
    fn cyclic_wraps_and_counts_laps() {
        let mut seq = PhaseSequence::cyclic(abc()).unwrap();
        assert_eq!(seq.next(0, 0), (1, 0));
        assert_eq!(seq.next(1, 0), (2, 0));
        assert_eq!(seq.next(2, 0), (0, 1));
    }

    #[test]
    fn cyclic_from_skips_prefix_on_wrap() {
        let mut seq = PhaseSequence::cyclic_from(abc(), 1).unwrap();
        assert_eq!(seq.next(2, 4), (1, 5));
        assert_eq!(seq.cycle_duration_ms(), 50);
        assert_eq!(seq.total_duration_ms(), 60);
    }

    fn abc_done() -> Vec<Phase> {
        let mut phases = abc();
        phases.push(Phase::new("done", 0));
        phases
    }

    #[test]
    fn linear_stays_on_last() {
        let mut seq = PhaseSequence::linear(abc_done()).unwrap();
        assert_eq!(seq.next(3, 0), (3, 0));
    }

    #[test]
    fn linear_must_end_terminal() {
        let err = PhaseSequence::linear(abc()).unwrap_err();
        assert!(err.to_string().contains("zero-length"), "{err}");
        assert!(PhaseSequence::linear(vec![Phase::new("a", 100), Phase::new("b", 100)]).is_err());
        assert!(PhaseSequence::linear(vec![Phase::new("only", 0)]).is_ok());
    }

    #[test]
    fn position_finds_by_name() {
        let seq = PhaseSequence::linear(abc_done()).unwrap();
        assert_eq!(seq.position("b"), Some(1));
        assert_eq!(seq.position("z"), None);
    }

    #[test]
    fn zero_duration_is_terminal() {
        assert!(Phase::new("done", 0).is_terminal());
        assert!(!Phase::new("inhale", 4000).is_terminal());
    }
}
