mod engine;
mod sequence;
mod session;

pub mod breathing;
pub mod pomodoro;
pub mod reflex;
pub mod sleep;

pub use breathing::BreathingPattern;
pub use engine::{PhaseEngine, TimerSnapshot, TimerState};
pub use pomodoro::{PomodoroCycle, PomodoroPhase};
pub use reflex::{MatchOutcome, ReflexConfig, ReflexGame};
pub use sequence::{Entry, Phase, PhaseSequence, SequenceMode, Transition};
pub use session::{TimerSession, DEFAULT_PROGRESS_INTERVAL};
pub use sleep::sleep_sequence;
