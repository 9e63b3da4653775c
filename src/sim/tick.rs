//! Fixed timestep simulation tick
//!
//! Advances one level session by one step and returns the side effects the
//! caller should carry out (sounds, persistence, notices).

use super::motion::step_player;
use super::state::{GameEvent, GameState, LevelReport, QuizState, SessionPhase};
use crate::consts::*;
use crate::distance;

/// Player response while a quiz is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizCommand {
    /// Submit an option index (0..4)
    Answer(usize),
    ShowHint,
    /// Close the quiz without collecting the key
    Leave,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Horizontal intent in {-1, 0, 1}
    pub move_x: i8,
    /// Jump (edge-triggered, only honoured when grounded)
    pub jump: bool,
    /// Pause toggle
    pub pause: bool,
    /// Abandon the attempt and restart the level
    pub restart: bool,
    pub quiz: Option<QuizCommand>,
}

/// Points for a correct answer given the attempt it was found on
pub fn score_for_answer(attempts: u32, hint_used: bool) -> u64 {
    match (attempts, hint_used) {
        (1, false) => SCORE_FIRST_TRY,
        (1, true) => SCORE_FIRST_TRY_HINT,
        _ => SCORE_RETRY,
    }
}

/// Award for reaching the open door
pub fn completion_award(elapsed: f32, keys_collected: u8) -> u64 {
    let seconds = elapsed.max(0.0).floor() as u64;
    let time_bonus = TIME_BONUS_CAP.saturating_sub(seconds);
    let perfect = if keys_collected >= KEYS_PER_LEVEL {
        PERFECT_BONUS
    } else {
        0
    };
    LEVEL_COMPLETION_BONUS + time_bonus + perfect
}

/// Advance the game state by one step.
///
/// `dt` is clamped to `MAX_TICK_DT` so long frames cannot tunnel through walls.
/// A NaN `dt` counts as zero.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let dt = if dt.is_nan() {
        0.0
    } else {
        dt.clamp(0.0, MAX_TICK_DT)
    };
    let mut events = Vec::new();

    if state.finished {
        return events;
    }

    if input.restart
        && matches!(
            state.session.phase,
            SessionPhase::Active | SessionPhase::Quiz(_) | SessionPhase::Paused
        )
    {
        state.restart_level();
        events.push(GameEvent::LevelRestarted { level: state.level });
        return events;
    }

    // Handle pause toggle
    if input.pause {
        match state.session.phase {
            SessionPhase::Active => {
                state.session.phase = SessionPhase::Paused;
                events.push(GameEvent::Paused);
                return events;
            }
            SessionPhase::Paused => {
                state.session.phase = SessionPhase::Active;
                events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    match state.session.phase {
        SessionPhase::Setup | SessionPhase::Failed => {}
        SessionPhase::Completed => state.session.door.animate(dt),
        SessionPhase::Paused => state.session.elapsed += dt,
        SessionPhase::Quiz(_) => {
            state.session.elapsed += dt;
            state.session.door.animate(dt);
            if let Some(command) = input.quiz {
                handle_quiz(state, command, &mut events);
            }
        }
        SessionPhase::Active => tick_active(state, input, dt, &mut events),
    }

    events
}

fn tick_active(state: &mut GameState, input: &TickInput, dt: f32, events: &mut Vec<GameEvent>) {
    let session = &mut state.session;
    session.elapsed += dt;
    session.door.animate(dt);
    session.door_notice = (session.door_notice - dt).max(0.0);

    let player = &mut session.player;
    if input.jump && player.grounded {
        player.velocity_y = JUMP_POWER;
        player.grounded = false;
        events.push(GameEvent::Jumped);
    }

    step_player(player, input.move_x, dt, &state.field);

    if player.grounded && input.move_x != 0 {
        session.footstep_timer -= dt;
        if session.footstep_timer <= 0.0 {
            session.footstep_timer = FOOTSTEP_INTERVAL;
            events.push(GameEvent::Footstep);
        }
    } else {
        session.footstep_timer = 0.0;
    }

    let player_pos = player.pos;
    for enemy in &mut session.enemies {
        enemy.update(player_pos, dt, &mut state.rng);
    }

    check_interactions(state, events);
}

/// Stations first, then enemies, then the door. The first match ends the
/// checks for this tick.
fn check_interactions(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let session = &mut state.session;
    let player = session.player.pos;

    if let Some(id) = session.lingering_station {
        let out_of_range = session
            .stations
            .get(id)
            .is_none_or(|s| distance(player, s.pos) >= STATION_RANGE);
        if out_of_range {
            session.lingering_station = None;
        }
    }

    let station = session
        .stations
        .iter()
        .find(|s| {
            !s.collected
                && session.lingering_station != Some(s.id)
                && distance(player, s.pos) < STATION_RANGE
        })
        .map(|s| s.id);
    if let Some(station) = station {
        let question = state.allocator.allocate(station);
        log::debug!("Station {} opened question {}", station, question.id);
        events.push(GameEvent::QuizOpened {
            station,
            question_id: question.id.clone(),
        });
        session.phase = SessionPhase::Quiz(QuizState {
            station,
            question,
            attempts: 0,
            hint_used: false,
        });
        return;
    }

    let contact = session
        .enemies
        .iter()
        .find(|e| distance(player, e.pos) < ENEMY_CONTACT_RANGE)
        .map(|e| e.id);
    if let Some(enemy) = contact {
        session.phase = SessionPhase::Failed;
        events.push(GameEvent::EnemyContact { enemy });
        state.restart_level();
        events.push(GameEvent::LevelRestarted { level: state.level });
        return;
    }

    if distance(player, session.door.pos) < DOOR_RANGE {
        if !session.door.locked {
            complete_level(state, events);
        } else if session.has_all_keys() {
            session.door.locked = false;
            log::info!("Door unlocked on level {}", session.level);
            events.push(GameEvent::DoorOpened);
        } else {
            if session.door_notice <= 0.0 {
                events.push(GameEvent::DoorLocked {
                    keys_needed: session.keys_needed(),
                });
            }
            session.door_notice = DOOR_NOTICE_SECS;
        }
    }
}

fn handle_quiz(state: &mut GameState, command: QuizCommand, events: &mut Vec<GameEvent>) {
    let session = &mut state.session;
    let SessionPhase::Quiz(quiz) = &mut session.phase else {
        return;
    };
    let station = quiz.station;

    match command {
        QuizCommand::ShowHint => {
            if !quiz.hint_used {
                quiz.hint_used = true;
                events.push(GameEvent::HintShown { station });
            }
        }
        QuizCommand::Leave => {
            session.phase = SessionPhase::Active;
            session.lingering_station = Some(station);
            events.push(GameEvent::QuizLeft { station });
        }
        QuizCommand::Answer(option) => {
            if option >= quiz.question.options.len() {
                return;
            }
            quiz.attempts += 1;
            if !quiz.question.is_correct(option) {
                state.wrong_answers += 1;
                events.push(GameEvent::AnswerIncorrect {
                    station,
                    attempts: quiz.attempts,
                });
                return;
            }

            let points = score_for_answer(quiz.attempts, quiz.hint_used);
            state.correct_answers += 1;
            session.attempt_score += points;
            session.collect(station);
            session.phase = SessionPhase::Active;
            events.push(GameEvent::AnswerCorrect { station, points });
            events.push(GameEvent::KeyCollected {
                station,
                keys: session.keys_collected,
            });
        }
    }
}

fn complete_level(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let session = &mut state.session;
    let award = completion_award(session.elapsed, session.keys_collected);
    state.score += session.attempt_score + award;
    session.phase = SessionPhase::Completed;

    let report = LevelReport {
        player_name: state.player_name.clone(),
        proficiency: state.proficiency.clone(),
        level: state.level,
        keys_collected: session.keys_collected,
        score_delta: award,
        total_score: state.score,
        correct_answers: state.correct_answers,
        wrong_answers: state.wrong_answers,
        elapsed: session.elapsed,
    };
    log::info!(
        "Level {} completed in {:.1}s: +{} (total {})",
        report.level,
        report.elapsed,
        award,
        state.score
    );
    events.push(GameEvent::LevelCompleted(report));

    if state.is_last_level() {
        state.finished = true;
        log::info!("Campaign finished with {} points", state.score);
        events.push(GameEvent::Victory { score: state.score });
    }
}
