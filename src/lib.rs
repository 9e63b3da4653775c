//! Keymaze - a maze platformer where quizzes unlock the exit
//!
//! Core modules:
//! - `sim`: Deterministic simulation (collision, motion, patrols, quiz progression)
//! - `audio`: Sound cues derived from simulation events
//! - `persistence`: Player progress and leaderboard storage
//! - `settings`: User preferences

pub mod audio;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use error::SimError;
pub use highscores::HighScores;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one step per rendered frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest step the simulation accepts; longer frames are clamped
    pub const MAX_TICK_DT: f32 = 0.05;

    /// Playfield dimensions
    pub const SCREEN_WIDTH: f32 = 1000.0;
    pub const SCREEN_HEIGHT: f32 = 750.0;

    /// Player hitbox (integer halves of 35x50)
    pub const PLAYER_HALF_WIDTH: f32 = 17.0;
    pub const PLAYER_HALF_HEIGHT: f32 = 25.0;
    /// Horizontal walk speed (units/s)
    pub const PLAYER_SPEED: f32 = 280.0;
    pub const PLAYER_SPAWN: (f32, f32) = (100.0, 150.0);

    /// Gravity per frame-normalised step
    pub const GRAVITY: f32 = 0.8;
    /// Terminal fall velocity
    pub const TERMINAL_VELOCITY: f32 = -15.0;
    /// Vertical velocity set by a jump
    pub const JUMP_POWER: f32 = 22.0;
    /// Scale applied to vertical velocity when stepping a jump
    pub const JUMP_STEP_SCALE: f32 = 40.0;
    /// Bottom-to-top distance that still counts as standing on a platform
    pub const GROUND_EPSILON: f32 = 5.0;
    /// Height of the implicit floor surface
    pub const FLOOR_HEIGHT: f32 = 45.0;

    /// Enemy defaults
    pub const ENEMY_SPEED: f32 = 120.0;
    pub const ENEMY_WAYPOINT_RADIUS: f32 = 10.0;
    pub const ENEMY_DWELL_MIN: f32 = 0.3;
    pub const ENEMY_DWELL_MAX: f32 = 1.0;
    /// Waypoints are kept this far from the playfield edges
    pub const PATROL_MARGIN: f32 = 80.0;
    /// Waypoints allowed in a patrol loop
    pub const PATROL_WAYPOINTS: std::ops::RangeInclusive<usize> = 4..=8;
    /// Enemy centres are kept this far from the playfield edges
    pub const ENEMY_BOUNDS_MARGIN: f32 = 40.0;

    /// Interaction ranges (centre to centre)
    pub const STATION_RANGE: f32 = 40.0;
    pub const DOOR_RANGE: f32 = 40.0;
    pub const ENEMY_CONTACT_RANGE: f32 = 35.0;

    /// Door animation rate (progress per second)
    pub const DOOR_OPEN_RATE: f32 = 2.0;
    /// How long the locked-door notice stays up
    pub const DOOR_NOTICE_SECS: f32 = 2.0;
    /// Footstep cadence while walking on the ground
    pub const FOOTSTEP_INTERVAL: f32 = 0.3;

    /// Progression
    pub const NUM_LEVELS: u8 = 5;
    pub const KEYS_PER_LEVEL: u8 = 5;

    /// Scoring
    pub const SCORE_FIRST_TRY: u64 = 10;
    pub const SCORE_FIRST_TRY_HINT: u64 = 7;
    pub const SCORE_RETRY: u64 = 5;
    pub const LEVEL_COMPLETION_BONUS: u64 = 100;
    pub const TIME_BONUS_CAP: u64 = 100;
    pub const PERFECT_BONUS: u64 = 50;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}
