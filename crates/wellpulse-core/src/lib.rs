//! # WellPulse Core Library
//!
//! Domain logic for the WellPulse wellness app: breathing and sleep
//! exercises, an adaptive Pomodoro timer, a reflex game and a live chart of
//! mental metrics polled from a REST backend. The CLI binary is a thin
//! presentation host over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: one phase engine parameterized by a [`Transition`], driven
//!   by a tokio [`TimerSession`] (deadline task plus progress sampler)
//! - **Metrics**: bounded [`MetricHistory`] filled by the [`MetricsPoller`]
//! - **Storage**: key-value warm-start cache (SQLite or memory) and the
//!   TOML [`Config`]
//! - **Pages**: controllers that own their sessions and pollers
//!
//! ## Key Components
//!
//! - [`PhaseEngine`]: synchronous phase state machine
//! - [`ApiClient`]: backend client implementing the metrics and config ports
//! - [`AudioSession`]: music and cue state owned by the host
//! - [`Route`]: navigation targets parsed from location fragments

pub mod adaptive;
pub mod api;
pub mod audio;
pub mod chart;
pub mod error;
pub mod events;
pub mod metrics;
pub mod pages;
pub mod storage;
pub mod timer;

pub use adaptive::{AdaptiveConfig, AdaptivePlanner, Baseline};
pub use api::ApiClient;
pub use audio::{AudioSession, AudioSink, Cue, MusicKind};
pub use error::{ApiError, ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use metrics::{MetricHistory, MetricReading, MetricSample, MetricsPoller, MetricsSource, PollerStatus};
pub use pages::{ConcentrationPage, Exercise, HomePage, Page, PomodoroPage, Route, StressPage};
pub use storage::{CacheDb, Config, KeyValueStore, MemoryStore, TimerConfig};
pub use timer::{
    BreathingPattern, Phase, PhaseEngine, PhaseSequence, PomodoroCycle, PomodoroPhase, ReflexGame,
    TimerSession, TimerSnapshot, TimerState, Transition,
};
