//! Keymaze headless driver
//!
//! Runs the simulation at a fixed timestep with a scripted autopilot standing
//! in for keyboard input, and dispatches tick events to audio and storage.

use std::path::PathBuf;

use clap::Parser;

use keymaze::audio::{AudioManager, LogSink};
use keymaze::consts::*;
use keymaze::persistence::{JsonFileStore, MemoryStore, ProgressStore, record_completion};
use keymaze::settings::Settings;
use keymaze::sim::{
    GameEvent, GameState, QuizCommand, RunConfig, SessionPhase, Snapshot, TickInput, tick,
};
use keymaze::{SimError, distance};

/// Headless Keymaze run
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Run seed (question order, enemy dwell times)
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Level to start on
    #[arg(long, default_value_t = 1)]
    level: u8,

    /// Proficiency tag (overrides settings)
    #[arg(long)]
    proficiency: Option<String>,

    /// Player name (overrides settings)
    #[arg(long)]
    name: Option<String>,

    /// Number of simulation ticks to run
    #[arg(long, default_value_t = 60 * 60 * 5)]
    ticks: u32,

    /// Settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Progress/leaderboard file; kept in memory when omitted
    #[arg(long)]
    progress: Option<PathBuf>,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

/// Steer toward the nearest open station, then the door. Answers every
/// question correctly after peeking at the hint.
fn autopilot(snap: &Snapshot) -> TickInput {
    if let SessionPhase::Quiz(quiz) = &snap.phase {
        let command = if quiz.hint_used {
            QuizCommand::Answer(quiz.question.correct)
        } else {
            QuizCommand::ShowHint
        };
        return TickInput {
            quiz: Some(command),
            ..Default::default()
        };
    }

    let player = snap.player.pos;
    let target = snap
        .stations
        .iter()
        .filter(|s| !s.collected)
        .min_by(|a, b| distance(player, a.pos).total_cmp(&distance(player, b.pos)))
        .map_or(snap.door.pos, |s| s.pos);

    let dx = target.x - player.x;
    let move_x = if dx.abs() < 5.0 { 0 } else { dx.signum() as i8 };
    TickInput {
        move_x,
        jump: snap.player.grounded && target.y > player.y + 30.0,
        ..Default::default()
    }
}

fn main() -> Result<(), SimError> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = args
        .settings
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();
    if let Some(tag) = args.proficiency {
        settings.proficiency = tag;
    }
    if let Some(name) = args.name {
        settings.player_name = name;
    }
    settings.sanitize();

    let mut store: Box<dyn ProgressStore> = match &args.progress {
        Some(path) => match JsonFileStore::open(path) {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("Progress file unusable ({e}), keeping progress in memory");
                Box::new(MemoryStore::default())
            }
        },
        None => Box::new(MemoryStore::default()),
    };
    let mut audio = AudioManager::from_settings(LogSink, &settings);

    let mut state = GameState::new(RunConfig {
        seed: args.seed,
        player_name: settings.player_name.clone(),
        proficiency: settings.proficiency.clone(),
        start_level: args.level,
    })?;
    log::info!(
        "Keymaze starting: {} at {} on level {} (seed {})",
        settings.player_name,
        settings.proficiency,
        args.level,
        args.seed
    );

    let dt = SIM_DT.min(settings.max_frame_dt);
    for n in 0..args.ticks {
        if state.finished {
            break;
        }
        if state.session.phase == SessionPhase::Completed {
            state.advance_level();
            continue;
        }

        let input = autopilot(&state.snapshot());
        let events = tick(&mut state, &input, dt);
        audio.handle_events(&events);

        for event in &events {
            log::debug!("tick {n}: {event:?}");
            match event {
                GameEvent::LevelCompleted(report) => {
                    if let Some(rank) = record_completion(store.as_mut(), report) {
                        log::info!("New high score, rank {rank}");
                    }
                }
                GameEvent::DoorLocked { keys_needed } => {
                    log::info!("The door needs {keys_needed} more key(s)");
                }
                GameEvent::Victory { score } => {
                    println!("All levels cleared with {score} points");
                }
                _ => {}
            }
        }
    }

    let snap = state.snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
    } else {
        println!(
            "Level {} | keys {}/{} | score {} | {:.1}s",
            snap.level, snap.keys_collected, snap.keys_required, snap.score, snap.elapsed
        );
    }

    for (i, entry) in store.high_scores().entries.iter().enumerate() {
        println!(
            "{:>2}. {:<16} {:>6}  level {} ({})",
            i + 1,
            entry.player_name,
            entry.score,
            entry.level,
            entry.proficiency
        );
    }
    Ok(())
}
