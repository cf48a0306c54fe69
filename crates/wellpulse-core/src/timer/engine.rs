//! Phase timer engine implementation.
//!
//! The engine is a synchronous state machine over a [`Transition`]. It owns no
//! timers: a host either calls [`PhaseEngine::advance`] when the current
//! phase's deadline fires (see [`TimerSession`](super::TimerSession)) or feeds
//! elapsed time through [`PhaseEngine::elapse`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Stopped -> Running -> ... -> Completed -> Running
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = PhaseEngine::new(BreathingPattern::box_breathing().sequence()?)?;
//! engine.start();
//! engine.elapse(4000); // now in "hold-in"
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::sequence::{ensure_not_empty, Entry, Phase, Transition};
use crate::error::{Result, ValidationError};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    /// Stopped by the user; the last phase is still shown.
    Stopped,
    /// A terminal phase was reached.
    Completed,
}

/// Serializable view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub active: bool,
    pub phase: String,
    pub title: String,
    pub instruction: String,
    pub index: usize,
    pub counter: u32,
    pub duration_ms: u64,
    pub remaining_ms: u64,
    /// 0.0 .. 1.0 within the current phase.
    pub progress: f64,
}

/// Core phase engine.
///
/// Operates on caller-supplied time -- no internal thread.
#[derive(Debug, Clone)]
pub struct PhaseEngine<T: Transition> {
    transition: T,
    state: TimerState,
    index: usize,
    counter: u32,
    elapsed_ms: u64,
    /// Duration armed when the current phase was entered.
    duration_ms: u64,
}

impl<T: Transition> PhaseEngine<T> {
    /// Create an engine in the `Idle` state, positioned at the initial phase.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the transition has no phases or its
    /// initial index is out of range.
    pub fn new(transition: T) -> Result<Self> {
        let index = validate(&transition)?;
        let duration_ms = transition.phases()[index].duration_ms;
        Ok(Self {
            transition,
            state: TimerState::Idle,
            index,
            counter: 0,
            elapsed_ms: 0,
            duration_ms,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn current_phase(&self) -> &Phase {
        &self.transition.phases()[self.index]
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.duration_ms.saturating_sub(self.elapsed_ms)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        if self.duration_ms == 0 {
            return if self.state == TimerState::Completed { 1.0 } else { 0.0 };
        }
        (self.elapsed_ms as f64 / self.duration_ms as f64).min(1.0)
    }

    pub fn transition(&self) -> &T {
        &self.transition
    }

    pub fn transition_mut(&mut self) -> &mut T {
        &mut self.transition
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let phase = self.current_phase();
        TimerSnapshot {
            state: self.state,
            active: self.is_active(),
            phase: phase.name.clone(),
            title: phase.title.clone(),
            instruction: phase.instruction.clone(),
            index: self.index,
            counter: self.counter,
            duration_ms: self.duration_ms,
            remaining_ms: self.remaining_ms(),
            progress: self.progress(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin or resume. Does nothing when already running.
    ///
    /// Resuming restarts the shown phase from zero; starting after a
    /// terminal phase restarts the whole sequence.
    pub fn start(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        match self.state {
            TimerState::Running => return events,
            TimerState::Completed => {
                self.index = self.transition.initial();
                self.counter = 0;
            }
            TimerState::Idle | TimerState::Stopped => {}
        }
        self.state = TimerState::Running;
        tracing::info!(phase = %self.current_phase().name, "timer session started");
        events.push(Event::SessionStarted {
            phase: self.current_phase().name.clone(),
            index: self.index,
            at: Utc::now(),
        });
        self.enter(Entry::Start, &mut events);
        events
    }

    /// Deactivate and reset elapsed time. The current phase is kept.
    pub fn stop(&mut self) -> Option<Event> {
        self.elapsed_ms = 0;
        if self.state != TimerState::Running {
            return None;
        }
        self.state = TimerState::Stopped;
        tracing::info!(phase = %self.current_phase().name, "timer session stopped");
        Some(Event::SessionStopped {
            phase: self.current_phase().name.clone(),
            index: self.index,
            at: Utc::now(),
        })
    }

    /// Move to the successor phase. Called when the current deadline fires.
    pub fn advance(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state != TimerState::Running {
            return events;
        }
        events.push(Event::PhaseCompleted {
            phase: self.current_phase().name.clone(),
            index: self.index,
            counter: self.counter,
            at: Utc::now(),
        });

        let (next, counter) = self.transition.next(self.index, self.counter);
        let len = self.transition.phases().len();
        if next >= len {
            tracing::error!(next, len, "transition returned an out-of-range phase");
            self.finish(&mut events);
            return events;
        }
        self.index = next;
        self.counter = counter;
        self.enter(Entry::Advance, &mut events);

        if self.state == TimerState::Running && self.transition.pauses_between_phases() {
            self.state = TimerState::Stopped;
            events.push(Event::SessionStopped {
                phase: self.current_phase().name.clone(),
                index: self.index,
                at: Utc::now(),
            });
        }
        events
    }

    /// Feed `dt_ms` of elapsed time, crossing as many phases as it covers.
    pub fn elapse(&mut self, mut dt_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        while self.state == TimerState::Running && dt_ms > 0 {
            let left = self.remaining_ms();
            if dt_ms < left {
                self.elapsed_ms += dt_ms;
                break;
            }
            dt_ms -= left;
            self.elapsed_ms = self.duration_ms;
            events.extend(self.advance());
        }
        events
    }

    /// Record that `elapsed_ms` have passed since the phase was entered and
    /// return the new progress. Never moves progress backwards.
    pub fn sample(&mut self, elapsed_ms: u64) -> f64 {
        if self.state == TimerState::Running {
            let clamped = elapsed_ms.min(self.duration_ms);
            self.elapsed_ms = self.elapsed_ms.max(clamped);
        }
        self.progress()
    }

    /// Swap the transition.
    ///
    /// The current phase survives when the new transition has a phase with the
    /// same name; otherwise, or when the session had completed, the engine
    /// moves to the new initial phase.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty transition; the engine is left
    /// untouched in that case.
    pub fn configure(&mut self, transition: T) -> Result<Vec<Event>> {
        let initial = validate(&transition)?;
        let name = self.current_phase().name.clone();
        self.transition = transition;
        // A finished session rewinds like `start()` would.
        let position = match self.state {
            TimerState::Completed => None,
            _ => self.transition.position(&name),
        };
        self.index = match position {
            Some(pos) => pos,
            None => {
                self.counter = 0;
                initial
            }
        };
        self.elapsed_ms = 0;
        self.duration_ms = self.current_phase().duration_ms;

        let mut events = vec![Event::Reconfigured {
            phase: self.current_phase().name.clone(),
            index: self.index,
            at: Utc::now(),
        }];
        match self.state {
            TimerState::Running => self.enter(Entry::Reconfigure, &mut events),
            TimerState::Completed => self.state = TimerState::Idle,
            TimerState::Idle | TimerState::Stopped => {}
        }
        Ok(events)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter(&mut self, entry: Entry, events: &mut Vec<Event>) {
        self.elapsed_ms = 0;
        self.duration_ms = self.transition.duration_ms(self.index);
        self.transition.on_enter(self.index, self.counter, entry);
        tracing::debug!(
            phase = %self.current_phase().name,
            counter = self.counter,
            duration_ms = self.duration_ms,
            "phase entered"
        );
        events.push(Event::PhaseEntered {
            phase: self.current_phase().name.clone(),
            index: self.index,
            counter: self.counter,
            duration_ms: self.duration_ms,
            at: Utc::now(),
        });
        if self.duration_ms == 0 {
            self.finish(events);
        }
    }

    fn finish(&mut self, events: &mut Vec<Event>) {
        self.state = TimerState::Completed;
        self.elapsed_ms = 0;
        tracing::info!(phase = %self.current_phase().name, "timer session completed");
        events.push(Event::SessionCompleted {
            phase: self.current_phase().name.clone(),
            counter: self.counter,
            at: Utc::now(),
        });
    }
}

fn validate<T: Transition>(transition: &T) -> Result<usize> {
    let phases = transition.phases();
    ensure_not_empty(phases)?;
    let initial = transition.initial();
    if initial >= phases.len() {
        return Err(ValidationError::OutOfBounds {
            collection: "phase sequence".into(),
            index: initial,
            len: phases.len(),
        }
        .into());
    }
    Ok(initial)
}
