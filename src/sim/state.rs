//! Game state and level session types
//!
//! `GameState` spans a whole run (campaign level, cumulative score, answer
//! statistics). `LevelSession` holds one attempt at one level and is thrown
//! away on restart or when advancing.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::CollisionField;
use super::level::{LevelDef, LevelTable};
use super::motion::PlayerPose;
use super::patrol::Enemy;
use super::questions::{PoolKey, Question, QuestionAllocator, QuestionBank, QuestionSource};
use crate::consts::*;
use crate::error::SimError;

/// A quiz point that awards a key
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyStation {
    pub id: usize,
    pub pos: Vec2,
    pub collected: bool,
}

/// The level exit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub pos: Vec2,
    pub locked: bool,
    /// Opening animation, 0 (shut) to 1 (open)
    pub open_progress: f32,
}

impl Door {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            locked: true,
            open_progress: 0.0,
        }
    }

    /// Advance the opening animation once unlocked
    pub fn animate(&mut self, dt: f32) {
        if !self.locked {
            self.open_progress = (self.open_progress + DOOR_OPEN_RATE * dt).min(1.0);
        }
    }
}

/// An open quiz at a station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizState {
    pub station: usize,
    pub question: Question,
    /// Answers submitted so far
    pub attempts: u32,
    pub hint_used: bool,
}

/// Phase of a level attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Being built; never observed between ticks
    Setup,
    /// Normal play: motion, patrols and interaction checks
    Active,
    /// Motion and patrols suspended while a question is open
    Quiz(QuizState),
    Paused,
    /// Reached the unlocked door
    Completed,
    /// Enemy contact; immediately rebuilt as a fresh attempt
    Failed,
}

/// Everything reported when a level is completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelReport {
    pub player_name: String,
    pub proficiency: String,
    pub level: u8,
    pub keys_collected: u8,
    /// Completion award (base + time bonus + all-keys bonus)
    pub score_delta: u64,
    /// Cumulative run score including the award
    pub total_score: u64,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub elapsed: f32,
}

/// Side effects requested by a tick, executed by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    Footstep,
    QuizOpened { station: usize, question_id: String },
    HintShown { station: usize },
    AnswerCorrect { station: usize, points: u64 },
    AnswerIncorrect { station: usize, attempts: u32 },
    QuizLeft { station: usize },
    KeyCollected { station: usize, keys: u8 },
    DoorLocked { keys_needed: u8 },
    DoorOpened,
    EnemyContact { enemy: u32 },
    LevelRestarted { level: u8 },
    LevelCompleted(LevelReport),
    Victory { score: u64 },
    Paused,
    Resumed,
}

/// One attempt at a level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSession {
    pub level: u8,
    pub phase: SessionPhase,
    pub player: PlayerPose,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    pub stations: Vec<KeyStation>,
    pub door: Door,
    pub keys_collected: u8,
    pub keys_required: u8,
    /// Seconds since the attempt started (keeps running in quiz and pause)
    pub elapsed: f32,
    /// Cumulative score when the attempt began
    pub score_before_attempt: u64,
    /// Points earned during this attempt, discarded on failure
    pub attempt_score: u64,
    /// Station ids in collection order
    pub collected: Vec<usize>,
    /// Remaining display time of the locked-door notice
    pub door_notice: f32,
    /// Time until the next footstep may sound
    pub footstep_timer: f32,
    /// Station left mid-quiz; it re-arms once the player walks out of range
    pub lingering_station: Option<usize>,
}

impl LevelSession {
    /// Fresh attempt in `Setup` with the level's stations, door and player
    pub fn new(def: &LevelDef, enemies: Vec<Enemy>, score_before_attempt: u64) -> Self {
        let stations = def
            .stations
            .iter()
            .enumerate()
            .map(|(id, &pos)| KeyStation {
                id,
                pos,
                collected: false,
            })
            .collect();

        Self {
            level: def.level,
            phase: SessionPhase::Setup,
            player: PlayerPose::new(def.player_spawn),
            enemies,
            stations,
            door: Door::new(def.door),
            keys_collected: 0,
            keys_required: KEYS_PER_LEVEL,
            elapsed: 0.0,
            score_before_attempt,
            attempt_score: 0,
            collected: Vec::new(),
            door_notice: 0.0,
            footstep_timer: 0.0,
            lingering_station: None,
        }
    }

    #[inline]
    pub fn has_all_keys(&self) -> bool {
        self.keys_collected >= self.keys_required
    }

    pub fn keys_needed(&self) -> u8 {
        self.keys_required.saturating_sub(self.keys_collected)
    }

    /// Mark `station` collected and record it. Returns false if it already was.
    pub fn collect(&mut self, station: usize) -> bool {
        match self.stations.get_mut(station) {
            Some(s) if !s.collected => {
                s.collected = true;
                self.keys_collected += 1;
                self.collected.push(station);
                true
            }
            _ => false,
        }
    }
}

/// Run configuration
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub seed: u64,
    pub player_name: String,
    /// Proficiency tag used to pick questions (A1..C2)
    pub proficiency: String,
    pub start_level: u8,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            player_name: "Player".to_string(),
            proficiency: "A1".to_string(),
            start_level: 1,
        }
    }
}

/// Read-only view handed to render and other collaborators
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub level: u8,
    pub phase: SessionPhase,
    pub player: PlayerPose,
    /// (id, position) per enemy
    pub enemies: Vec<(u32, Vec2)>,
    pub stations: Vec<KeyStation>,
    pub door: Door,
    pub keys_collected: u8,
    pub keys_required: u8,
    pub elapsed: f32,
    pub score: u64,
    /// Keys still needed while the locked-door notice is visible
    pub door_notice: Option<u8>,
    pub finished: bool,
}

/// Complete run state
pub struct GameState {
    pub seed: u64,
    pub player_name: String,
    pub proficiency: String,
    /// Current campaign level (1-based)
    pub level: u8,
    /// Committed score: everything earned before the current attempt plus
    /// completion awards
    pub score: u64,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub session: LevelSession,
    /// Set once the last level is completed
    pub finished: bool,
    /// Static geometry of the current level
    pub field: CollisionField,
    pub(crate) levels: LevelTable,
    pub(crate) source: Box<dyn QuestionSource>,
    pub(crate) allocator: QuestionAllocator,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// New run using the built-in level and question tables
    pub fn new(config: RunConfig) -> Result<Self, SimError> {
        Self::with_data(
            config,
            LevelTable::builtin()?,
            Box::new(QuestionBank::builtin()?),
        )
    }

    /// New run with caller-supplied tables
    pub fn with_data(
        config: RunConfig,
        levels: LevelTable,
        source: Box<dyn QuestionSource>,
    ) -> Result<Self, SimError> {
        let def = levels.get(config.start_level)?;
        let session = LevelSession::new(def, Vec::new(), 0);
        let field = def.collision_field();

        let mut state = Self {
            seed: config.seed,
            player_name: config.player_name,
            proficiency: config.proficiency,
            level: config.start_level,
            score: 0,
            correct_answers: 0,
            wrong_answers: 0,
            session,
            finished: false,
            field,
            levels,
            source,
            allocator: QuestionAllocator::new(),
            rng: Pcg32::seed_from_u64(config.seed),
        };
        state.start_level(config.start_level)?;
        Ok(state)
    }

    /// Build a fresh attempt at `level` and enter `Active`
    pub fn start_level(&mut self, level: u8) -> Result<(), SimError> {
        let def = self.levels.get(level)?;

        let key = PoolKey::new(self.proficiency.clone(), level);
        self.allocator
            .initialize(&key, self.source.as_mut(), &mut self.rng);

        let enemies = def
            .enemy_spawns
            .iter()
            .enumerate()
            .map(|(i, &pos)| {
                Enemy::new(
                    i as u32,
                    pos,
                    def.enemy_speed,
                    def.patrol_path.clone(),
                    &mut self.rng,
                )
            })
            .collect();

        self.level = level;
        self.field = def.collision_field();
        self.session = LevelSession::new(def, enemies, self.score);
        self.session.phase = SessionPhase::Active;

        log::info!(
            "Level {} started ({} enemies, score {})",
            level,
            self.session.enemies.len(),
            self.score
        );
        Ok(())
    }

    /// Discard the current attempt and rebuild the same level
    pub fn restart_level(&mut self) {
        log::info!(
            "Restarting level {} (dropping {} points)",
            self.level,
            self.session.attempt_score
        );
        if let Err(e) = self.start_level(self.level) {
            log::error!("Failed to restart level {}: {e}", self.level);
        }
    }

    /// Move on from a completed level. No-op (false) outside `Completed` or
    /// after the last level.
    pub fn advance_level(&mut self) -> bool {
        if self.session.phase != SessionPhase::Completed || self.finished {
            return false;
        }
        let next = self.level + 1;
        match self.start_level(next) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Cannot advance to level {next}: {e}");
                false
            }
        }
    }

    /// Committed score plus points earned in the current attempt
    pub fn total_score(&self) -> u64 {
        self.score + self.session.attempt_score
    }

    pub fn is_last_level(&self) -> bool {
        self.level >= self.levels.last_level()
    }

    pub fn allocator(&self) -> &QuestionAllocator {
        &self.allocator
    }

    pub fn snapshot(&self) -> Snapshot {
        let s = &self.session;
        Snapshot {
            level: self.level,
            phase: s.phase.clone(),
            player: s.player,
            enemies: s.enemies.iter().map(|e| (e.id, e.pos)).collect(),
            stations: s.stations.clone(),
            door: s.door,
            keys_collected: s.keys_collected,
            keys_required: s.keys_required,
            elapsed: s.elapsed,
            score: self.total_score(),
            door_notice: (s.door_notice > 0.0).then(|| s.keys_needed()),
            finished: self.finished,
        }
    }
}
