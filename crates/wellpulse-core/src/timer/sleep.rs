//! Progressive body-scan relaxation before sleep.

use super::sequence::{Phase, PhaseSequence};
use crate::error::Result;

pub const COMPLETE: &str = "complete";

/// intro -> feet -> legs -> stomach -> shoulders -> face -> complete.
///
/// `complete` is terminal: reaching it ends the session.
pub fn sleep_sequence() -> Result<PhaseSequence> {
    PhaseSequence::linear(vec![
        Phase::new("intro", 5_000).with_text(
            "Getting ready for sleep",
            "Lie down comfortably and close your eyes...",
        ),
        Phase::new("feet", 10_000).with_text(
            "Feet and ankles",
            "Feel the weight of your feet. Tense them lightly, then let go completely...",
        ),
        Phase::new("legs", 10_000).with_text(
            "Calves and thighs",
            "Feel warmth spreading through your legs. Let them sink into the mattress...",
        ),
        Phase::new("stomach", 10_000).with_text(
            "Stomach and breath",
            "Breathe deep into your belly. Every exhale releases tension...",
        ),
        Phase::new("shoulders", 10_000).with_text(
            "Shoulders and neck",
            "Drop your shoulders. Let the stress of the day drain away...",
        ),
        Phase::new("face", 10_000).with_text(
            "Face and eyes",
            "Relax your jaw. Let your eyelids grow pleasantly heavy...",
        ),
        Phase::new(COMPLETE, 0).with_text("Calm", "You are ready for sleep. Good night."),
    ])
}
