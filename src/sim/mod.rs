//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod geometry;
pub mod level;
pub mod motion;
pub mod patrol;
pub mod questions;
pub mod state;
pub mod tick;

pub use collision::{CollisionField, Side, boxes_overlap, overlaps, penetration_side};
pub use geometry::AxisBox;
pub use level::{LevelDef, LevelTable};
pub use motion::{Intent, PlayerPose, resolve_motion, step_player};
pub use patrol::Enemy;
pub use questions::{
    PoolKey, Question, QuestionAllocator, QuestionBank, QuestionKind, QuestionPair, QuestionSource,
};
pub use state::{
    Door, GameEvent, GameState, KeyStation, LevelReport, LevelSession, QuizState, RunConfig,
    SessionPhase, Snapshot,
};
pub use tick::{QuizCommand, TickInput, completion_award, score_for_answer, tick};
