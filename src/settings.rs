//! Game settings and preferences
//!
//! Stored as JSON next to the player's progress. Missing fields take their
//! defaults, and an unreadable file falls back to defaults entirely.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_TICK_DT;
use crate::error::SimError;

/// Proficiency tags questions are grouped by, easiest first
pub const PROFICIENCY_TAGS: [&str; 6] = ["A1", "A2", "B1", "B2", "C1", "C2"];

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    pub sound_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Simulation ===
    /// Longest frame handed to one tick, in seconds
    pub max_frame_dt: f32,

    // === Player ===
    /// Question difficulty (A1..C2)
    pub proficiency: String,
    pub player_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            master_volume: 0.8,
            sfx_volume: 1.0,

            max_frame_dt: MAX_TICK_DT,

            proficiency: "A1".to_string(),
            player_name: "Player".to_string(),
        }
    }
}

impl Settings {
    /// True if `tag` is a known proficiency tag
    pub fn is_valid_proficiency(tag: &str) -> bool {
        PROFICIENCY_TAGS.contains(&tag)
    }

    /// Clamp out-of-range values back to something usable
    pub fn sanitize(&mut self) {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        if !(self.max_frame_dt > 0.0 && self.max_frame_dt <= MAX_TICK_DT) {
            self.max_frame_dt = MAX_TICK_DT;
        }
        if !Self::is_valid_proficiency(&self.proficiency) {
            log::warn!("Unknown proficiency {:?}, using A1", self.proficiency);
            self.proficiency = "A1".to_string();
        }
        if self.player_name.trim().is_empty() {
            self.player_name = "Player".to_string();
        }
    }

    /// Parse settings JSON
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("Using default settings ({}: {e})", path.display());
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring unreadable settings {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to `path` as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
