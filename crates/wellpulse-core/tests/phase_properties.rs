//! Property tests for the phase engine over arbitrary cyclic sequences.

use proptest::prelude::*;
use wellpulse_core::timer::{Phase, PhaseEngine, PhaseSequence, TimerState};
use wellpulse_core::Event;

fn durations() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..5_000, 1..6)
}

fn entered(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::PhaseEntered { phase, .. } => Some(phase.clone()),
            _ => None,
        })
        .collect()
}

fn sequence(durations: &[u64]) -> PhaseSequence {
    let phases = durations
        .iter()
        .enumerate()
        .map(|(i, d)| Phase::new(format!("p{i}"), *d))
        .collect();
    PhaseSequence::cyclic(phases).unwrap()
}

#[test]
fn k_cycles_visit_each_phase_k_times_in_order() {
    proptest!(|(ds in durations(), k in 1u32..5)| {
        let seq = sequence(&ds);
        let cycle_ms = seq.cycle_duration_ms();
        let mut engine = PhaseEngine::new(seq).unwrap();

        let mut events = engine.start();
        events.extend(engine.elapse(cycle_ms * u64::from(k)));
        let visits = entered(&events);

        let n = ds.len();
        prop_assert_eq!(visits.len(), n * k as usize + 1);
        for (i, name) in visits.iter().take(n * k as usize).enumerate() {
            prop_assert_eq!(name, &format!("p{}", i % n));
        }
        prop_assert_eq!(engine.counter(), k);
        prop_assert_eq!(engine.index(), 0);
    });
}

#[test]
fn elapse_in_pieces_matches_elapse_at_once() {
    proptest!(|(ds in durations(), steps in prop::collection::vec(0u64..3_000, 1..40))| {
        let mut whole = PhaseEngine::new(sequence(&ds)).unwrap();
        let mut pieces = PhaseEngine::new(sequence(&ds)).unwrap();
        whole.start();
        pieces.start();

        let mut pieces_events = Vec::new();
        for dt in &steps {
            pieces_events.extend(pieces.elapse(*dt));
        }
        let whole_events = whole.elapse(steps.iter().sum());

        prop_assert_eq!(entered(&pieces_events), entered(&whole_events));
        prop_assert_eq!(pieces.index(), whole.index());
        prop_assert_eq!(pieces.counter(), whole.counter());
        prop_assert_eq!(pieces.elapsed_ms(), whole.elapsed_ms());
    });
}

#[test]
fn progress_never_decreases_within_a_phase() {
    proptest!(|(d in 1u64..10_000, samples in prop::collection::vec(0u64..12_000, 1..30))| {
        let seq = PhaseSequence::cyclic(vec![Phase::new("only", d), Phase::new("next", d)]).unwrap();
        let mut engine = PhaseEngine::new(seq).unwrap();
        engine.start();
        let mut last = engine.progress();
        for s in samples {
            let p = engine.sample(s);
            prop_assert!(p >= last);
            prop_assert!((0.0..=1.0).contains(&p));
            last = p;
        }
        prop_assert_eq!(engine.state(), TimerState::Running);
    });
}

#[test]
fn linear_sequences_without_terminal_are_rejected() {
    proptest!(|(ds in durations())| {
        let phases: Vec<Phase> = ds
            .iter()
            .enumerate()
            .map(|(i, d)| Phase::new(format!("p{i}"), *d))
            .collect();
        prop_assert!(PhaseSequence::linear(phases).is_err());
    });
}

#[test]
fn linear_sequences_end_inactive() {
    proptest!(|(ds in durations())| {
        let mut phases: Vec<Phase> = ds
            .iter()
            .enumerate()
            .map(|(i, d)| Phase::new(format!("p{i}"), *d))
            .collect();
        phases.push(Phase::new("done", 0));
        let total: u64 = ds.iter().sum();
        let mut engine = PhaseEngine::new(PhaseSequence::linear(phases).unwrap()).unwrap();
        engine.start();
        let events = engine.elapse(total + 10_000);

        prop_assert_eq!(engine.state(), TimerState::Completed);
        prop_assert!(!engine.is_active());
        prop_assert_eq!(engine.current_phase().name.as_str(), "done");
        let completed = events
            .iter()
            .filter(|e| matches!(e, Event::SessionCompleted { .. }))
            .count();
        prop_assert_eq!(completed, 1);
    });
}
