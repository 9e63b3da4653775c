//! Player progress and leaderboard storage
//!
//! Features:
//! - Per-player progress keyed by name
//! - Top 10 leaderboard
//! - Atomic JSON writes (tmp → rename)
//!
//! Storage failures never reach the simulation: `record_completion` logs and
//! drops them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::highscores::{HighScoreEntry, HighScores};
use crate::sim::LevelReport;

/// Accumulated progress for one player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProgress {
    /// Highest level completed
    pub best_level: u8,
    pub levels_completed: u32,
    pub keys_collected: u32,
    /// Sum of completion awards
    pub total_score: u64,
    /// Answer counts of the most recent run, as of its latest completion
    pub correct_answers: u32,
    pub wrong_answers: u32,
}

impl PlayerProgress {
    fn apply(&mut self, report: &LevelReport) {
        self.best_level = self.best_level.max(report.level);
        self.levels_completed += 1;
        self.keys_collected += u32::from(report.keys_collected);
        self.total_score += report.score_delta;
        self.correct_answers = report.correct_answers;
        self.wrong_answers = report.wrong_answers;
    }
}

/// Everything kept on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressData {
    pub players: BTreeMap<String, PlayerProgress>,
    pub high_scores: HighScores,
}

impl ProgressData {
    /// Fold a completion into the data. Returns the leaderboard rank, if any.
    pub fn apply(&mut self, report: &LevelReport) -> Option<usize> {
        self.players
            .entry(report.player_name.clone())
            .or_default()
            .apply(report);
        self.high_scores.add_score(HighScoreEntry::from(report))
    }
}

/// Where completed levels are reported
pub trait ProgressStore {
    /// Persist a completion. Returns the leaderboard rank achieved, if any.
    fn record(&mut self, report: &LevelReport) -> Result<Option<usize>, SimError>;

    fn high_scores(&self) -> &HighScores;
}

/// In-memory store, for tests and runs without a save path
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub data: ProgressData,
}

impl ProgressStore for MemoryStore {
    fn record(&mut self, report: &LevelReport) -> Result<Option<usize>, SimError> {
        Ok(self.data.apply(report))
    }

    fn high_scores(&self) -> &HighScores {
        &self.data.high_scores
    }
}

/// Progress stored as a single JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: ProgressData,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file starts empty; a corrupt one
    /// is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SimError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No progress at {}, starting fresh", path.display());
                ProgressData::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &ProgressData {
        &self.data
    }

    fn write(&self) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(&self.data)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ProgressStore for JsonFileStore {
    fn record(&mut self, report: &LevelReport) -> Result<Option<usize>, SimError> {
        let rank = self.data.apply(report);
        self.write()?;
        log::info!(
            "Saved progress for {} ({} high scores)",
            report.player_name,
            self.data.high_scores.entries.len()
        );
        Ok(rank)
    }

    fn high_scores(&self) -> &HighScores {
        &self.data.high_scores
    }
}

/// Report a completion, swallowing storage failures
pub fn record_completion<S: ProgressStore + ?Sized>(
    store: &mut S,
    report: &LevelReport,
) -> Option<usize> {
    match store.record(report) {
        Ok(rank) => rank,
        Err(e) => {
            log::warn!("Could not save progress for level {}: {e}", report.level);
            None
        }
    }
}
