//! Tokio driver for a [`PhaseEngine`].
//!
//! Each active phase owns two tasks: a one-shot deadline that performs the
//! transition and a progress sampler on a fixed interval. Both are aborted
//! before anything new is armed, on `stop()`, on `configure()` and on drop.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use super::engine::{PhaseEngine, TimerSnapshot};
use super::sequence::Transition;
use crate::error::Result;
use crate::events::Event;

pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(50);

const EVENT_CAPACITY: usize = 64;

struct Shared<T: Transition> {
    engine: PhaseEngine<T>,
    /// Bumped whenever timers are disarmed; stale tasks compare against it.
    generation: u64,
    phase_started: Option<Instant>,
    progress: f64,
    deadline: Option<JoinHandle<()>>,
    sampler: Option<JoinHandle<()>>,
}

struct Core<T: Transition> {
    id: Uuid,
    progress_interval: Duration,
    shared: Mutex<Shared<T>>,
    snapshots: watch::Sender<TimerSnapshot>,
    events: broadcast::Sender<Event>,
}

/// A live phase engine driving one page.
///
/// All commands must be issued from within a Tokio runtime.
pub struct TimerSession<T: Transition> {
    core: Arc<Core<T>>,
}

impl<T: Transition> TimerSession<T> {
    /// # Errors
    ///
    /// Fails when the transition has no phases.
    pub fn new(transition: T) -> Result<Self> {
        Self::with_progress_interval(transition, DEFAULT_PROGRESS_INTERVAL)
    }

    pub fn with_progress_interval(transition: T, progress_interval: Duration) -> Result<Self> {
        let engine = PhaseEngine::new(transition)?;
        let (snapshots, _) = watch::channel(engine.snapshot());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let progress_interval = progress_interval.max(Duration::from_millis(1));
        Ok(Self {
            core: Arc::new(Core {
                id: Uuid::new_v4(),
                progress_interval,
                shared: Mutex::new(Shared {
                    engine,
                    generation: 0,
                    phase_started: None,
                    progress: 0.0,
                    deadline: None,
                    sampler: None,
                }),
                snapshots,
                events,
            }),
        })
    }

    pub fn id(&self) -> Uuid {
        self.core.id
    }

    pub fn start(&self) {
        let mut shared = self.core.lock();
        let events = shared.engine.start();
        if events.is_empty() {
            return;
        }
        Core::rearm(&self.core, &mut shared);
        self.core.publish(&shared, events);
    }

    pub fn stop(&self) {
        let mut shared = self.core.lock();
        let event = shared.engine.stop();
        disarm(&mut shared);
        shared.progress = 0.0;
        self.core.publish(&shared, event.into_iter().collect());
    }

    /// Swap the transition, keeping the current phase when its name survives.
    ///
    /// # Errors
    ///
    /// Fails when the new transition has no phases; the session is unchanged.
    pub fn configure(&self, transition: T) -> Result<()> {
        let mut shared = self.core.lock();
        let events = shared.engine.configure(transition)?;
        disarm(&mut shared);
        shared.progress = 0.0;
        Core::rearm(&self.core, &mut shared);
        self.core.publish(&shared, events);
        Ok(())
    }

    /// Run `f` against the transition, e.g. to forward user input to a game.
    pub fn with_transition<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut shared = self.core.lock();
        let out = f(shared.engine.transition_mut());
        let snapshot = snapshot_of(&shared);
        self.core.snapshots.send_replace(snapshot);
        out
    }

    pub fn is_active(&self) -> bool {
        self.core.lock().engine.is_active()
    }

    /// Progress as last sampled by the progress task.
    pub fn progress(&self) -> f64 {
        self.core.lock().progress
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        snapshot_of(&self.core.lock())
    }

    pub fn watch(&self) -> watch::Receiver<TimerSnapshot> {
        self.core.snapshots.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.core.events.subscribe()
    }

    /// Number of timer tasks that are still scheduled.
    pub fn pending_timers(&self) -> usize {
        let shared = self.core.lock();
        [&shared.deadline, &shared.sampler]
            .into_iter()
            .flatten()
            .filter(|h| !h.is_finished())
            .count()
    }
}

impl<T: Transition> Drop for TimerSession<T> {
    fn drop(&mut self) {
        let mut shared = self.core.lock();
        disarm(&mut shared);
    }
}

impl<T: Transition> Core<T> {
    fn lock(&self) -> MutexGuard<'_, Shared<T>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Disarm, then arm fresh timers for the current phase if still active.
    fn rearm(core: &Arc<Self>, shared: &mut Shared<T>) {
        disarm(shared);
        shared.progress = 0.0;
        if !shared.engine.is_active() {
            shared.phase_started = None;
            return;
        }

        let now = Instant::now();
        let generation = shared.generation;
        let deadline_at = now + Duration::from_millis(shared.engine.duration_ms());
        shared.phase_started = Some(now);

        let weak: Weak<Self> = Arc::downgrade(core);
        shared.deadline = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline_at).await;
            if let Some(core) = weak.upgrade() {
                Core::fire_deadline(&core, generation);
            }
        }));

        let weak: Weak<Self> = Arc::downgrade(core);
        let period = core.progress_interval;
        shared.sampler = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(now + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(core) = weak.upgrade() else { break };
                if !core.sample(generation) {
                    break;
                }
            }
        }));
    }

    fn fire_deadline(core: &Arc<Self>, generation: u64) {
        let mut shared = core.lock();
        if shared.generation != generation || !shared.engine.is_active() {
            return;
        }
        // This task is the deadline; detach it rather than abort itself.
        shared.deadline.take();
        let events = shared.engine.advance();
        Core::rearm(core, &mut shared);
        core.publish(&shared, events);
    }

    fn sample(&self, generation: u64) -> bool {
        let mut shared = self.lock();
        if shared.generation != generation || !shared.engine.is_active() {
            return false;
        }
        let Some(started) = shared.phase_started else {
            return false;
        };
        let elapsed = Instant::now().saturating_duration_since(started);
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        shared.progress = shared.engine.sample(elapsed_ms);
        self.snapshots.send_replace(snapshot_of(&shared));
        true
    }

    fn publish(&self, shared: &Shared<T>, events: Vec<Event>) {
        self.snapshots.send_replace(snapshot_of(shared));
        for event in events {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }
}

fn disarm<T: Transition>(shared: &mut Shared<T>) {
    shared.generation = shared.generation.wrapping_add(1);
    if let Some(handle) = shared.deadline.take() {
        handle.abort();
    }
    if let Some(handle) = shared.sampler.take() {
        handle.abort();
    }
}

fn snapshot_of<T: Transition>(shared: &Shared<T>) -> TimerSnapshot {
    let mut snapshot = shared.engine.snapshot();
    if snapshot.active {
        snapshot.progress = shared.progress;
    }
    snapshot
}
