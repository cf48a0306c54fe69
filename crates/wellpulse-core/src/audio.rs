//! Background music and cue state, owned explicitly by the host.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::storage::AudioConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MusicKind {
    #[default]
    None,
    Focus,
    Relax,
    Energy,
    DeepRelax,
}

impl MusicKind {
    /// Playable kinds in rotation order.
    pub const ROTATION: [MusicKind; 4] = [Self::Focus, Self::Relax, Self::Energy, Self::DeepRelax];

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Silence",
            Self::Focus => "Focus",
            Self::Relax => "Relax",
            Self::Energy => "Energy",
            Self::DeepRelax => "Deep Relax",
        }
    }

    /// Next kind in the rotation; `None` starts at `Focus`.
    pub fn cycle_next(self) -> Self {
        let pos = Self::ROTATION.iter().position(|k| *k == self);
        match pos {
            Some(i) => Self::ROTATION[(i + 1) % Self::ROTATION.len()],
            None => Self::Focus,
        }
    }
}

impl fmt::Display for MusicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One-shot sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// End of a work session.
    Chime,
}

/// Where sound actually goes. Hosts without audio can skip it.
pub trait AudioSink: Send {
    fn play(&mut self, kind: MusicKind, volume: u32);
    fn silence(&mut self);
    fn cue(&mut self, cue: Cue, volume: u32);
}

#[derive(Default)]
pub struct AudioSession {
    current: MusicKind,
    muted: bool,
    volume: u32,
    cues_played: u32,
    sink: Option<Box<dyn AudioSink>>,
}

impl fmt::Debug for AudioSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioSession")
            .field("current", &self.current)
            .field("muted", &self.muted)
            .field("volume", &self.volume)
            .field("cues_played", &self.cues_played)
            .finish_non_exhaustive()
    }
}

impl AudioSession {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            muted: config.muted,
            volume: config.volume.min(100),
            ..Self::default()
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn current(&self) -> MusicKind {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.current != MusicKind::None
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> u32 {
        self.volume
    }

    pub fn cues_played(&self) -> u32 {
        self.cues_played
    }

    /// Switch tracks. Returns false if `kind` is already playing.
    pub fn play(&mut self, kind: MusicKind) -> bool {
        if self.current == kind {
            return false;
        }
        self.current = kind;
        tracing::info!(music = %kind, "music changed");
        self.sync_sink();
        true
    }

    pub fn cycle_next(&mut self) -> MusicKind {
        let next = self.current.cycle_next();
        self.play(next);
        next
    }

    pub fn stop(&mut self) {
        self.play(MusicKind::None);
    }

    /// Returns the new muted state.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.sync_sink();
        self.muted
    }

    pub fn set_volume(&mut self, volume: u32) {
        self.volume = volume.min(100);
        self.sync_sink();
    }

    /// Play a cue. Muted sessions swallow it and return false.
    pub fn cue(&mut self, cue: Cue) -> bool {
        if self.muted {
            return false;
        }
        self.cues_played += 1;
        let volume = self.volume;
        if let Some(sink) = self.sink.as_mut() {
            sink.cue(cue, volume);
        }
        true
    }

    fn sync_sink(&mut self) {
        let (current, muted, volume) = (self.current, self.muted, self.volume);
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if muted || current == MusicKind::None {
            sink.silence();
        } else {
            sink.play(current, volume);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl AudioSink for Recorder {
        fn play(&mut self, kind: MusicKind, volume: u32) {
            self.0.lock().unwrap().push(format!("play {kind} {volume}"));
        }
        fn silence(&mut self) {
            self.0.lock().unwrap().push("silence".into());
        }
        fn cue(&mut self, cue: Cue, _volume: u32) {
            self.0.lock().unwrap().push(format!("{cue:?}"));
        }
    }

    #[test]
    fn rotation_wraps() {
        let mut kind = MusicKind::None;
        let mut seen = Vec::new();
        for _ in 0..5 {
            kind = kind.cycle_next();
            seen.push(kind);
        }
        use MusicKind::*;
        assert_eq!(seen, [Focus, Relax, Energy, DeepRelax, Focus]);
    }

    #[test]
    fn replaying_same_kind_is_noop() {
        let mut audio = AudioSession::new(&AudioConfig::default());
        assert!(audio.play(MusicKind::Relax));
        assert!(!audio.play(MusicKind::Relax));
        assert!(audio.is_playing());
        audio.stop();
        assert!(!audio.is_playing());
    }

    #[test]
    fn mute_silences_sink_and_cues() {
        let log = Recorder::default();
        let mut audio = AudioSession::new(&AudioConfig::default()).with_sink(Box::new(log.clone()));
        audio.cycle_next();
        assert!(audio.cue(Cue::Chime));
        assert!(audio.toggle_mute());
        assert!(!audio.cue(Cue::Chime));
        assert_eq!(audio.cues_played(), 1);
        assert_eq!(*log.0.lock().unwrap(), ["play Focus 50", "Chime", "silence"]);
    }
}
