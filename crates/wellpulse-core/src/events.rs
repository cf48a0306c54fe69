use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in the system produces an Event.
/// Pages render from snapshots; events drive one-off reactions (chimes, logs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        phase: String,
        index: usize,
        at: DateTime<Utc>,
    },
    PhaseEntered {
        phase: String,
        index: usize,
        counter: u32,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// The previous phase ran its full duration.
    PhaseCompleted {
        phase: String,
        index: usize,
        counter: u32,
        at: DateTime<Utc>,
    },
    SessionStopped {
        phase: String,
        index: usize,
        at: DateTime<Utc>,
    },
    /// A terminal phase was reached; the session is no longer active.
    SessionCompleted {
        phase: String,
        counter: u32,
        at: DateTime<Utc>,
    },
    Reconfigured {
        phase: String,
        index: usize,
        at: DateTime<Utc>,
    },
    MetricsUpdated {
        len: usize,
        at: DateTime<Utc>,
    },
    MetricsFetchFailed {
        message: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Phase name carried by timer events.
    pub fn phase(&self) -> Option<&str> {
        match self {
            Event::SessionStarted { phase, .. }
            | Event::PhaseEntered { phase, .. }
            | Event::PhaseCompleted { phase, .. }
            | Event::SessionStopped { phase, .. }
            | Event::SessionCompleted { phase, .. }
            | Event::Reconfigured { phase, .. } => Some(phase),
            Event::MetricsUpdated { .. } | Event::MetricsFetchFailed { .. } => None,
        }
    }
}
