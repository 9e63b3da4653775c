//! Audio cues derived from simulation events
//!
//! The simulation never plays sound itself. The driver feeds tick events to an
//! `AudioManager`, which maps them to effects and forwards them to a backend.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Jump,
    Footstep,
    /// Hint revealed
    Click,
    Correct,
    Wrong,
    /// Key collected
    Collect,
    DoorOpen,
    /// Enemy contact
    EnemyHit,
    LevelComplete,
    Victory,
}

impl SoundEffect {
    /// Effect for a simulation event, if it makes a sound
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        Some(match event {
            GameEvent::Jumped => SoundEffect::Jump,
            GameEvent::Footstep => SoundEffect::Footstep,
            GameEvent::HintShown { .. } => SoundEffect::Click,
            GameEvent::AnswerCorrect { .. } => SoundEffect::Correct,
            GameEvent::AnswerIncorrect { .. } => SoundEffect::Wrong,
            GameEvent::KeyCollected { .. } => SoundEffect::Collect,
            GameEvent::DoorOpened => SoundEffect::DoorOpen,
            GameEvent::EnemyContact { .. } => SoundEffect::EnemyHit,
            GameEvent::LevelCompleted(_) => SoundEffect::LevelComplete,
            GameEvent::Victory { .. } => SoundEffect::Victory,
            _ => return None,
        })
    }

    /// Mix level relative to other effects
    pub fn base_volume(&self) -> f32 {
        match self {
            SoundEffect::Footstep => 0.3,
            SoundEffect::Collect => 0.4,
            SoundEffect::Click => 0.6,
            _ => 0.5,
        }
    }
}

/// Something that can actually make noise
pub trait AudioSink {
    /// Fire-and-forget playback at `volume` (0.0 - 1.0)
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Backend for headless runs: traces cues to the log
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::debug!("sound {:?} at {:.2}", effect, volume);
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Manager configured from user settings
    pub fn from_settings(sink: S, settings: &Settings) -> Self {
        let mut audio = Self::new(sink);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(!settings.sound_enabled);
        audio
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume() * effect.base_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    /// Play every cue in a tick's events
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
