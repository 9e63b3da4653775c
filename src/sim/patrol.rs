//! Enemy patrols
//!
//! Each enemy walks a closed loop of waypoints, pausing briefly at each one.
//! Patrols ignore the player entirely.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Clamp raw waypoints into the patrol margin
pub fn build_patrol_path(points: &[Vec2]) -> Vec<Vec2> {
    points
        .iter()
        .map(|p| {
            Vec2::new(
                p.x.clamp(PATROL_MARGIN, SCREEN_WIDTH - PATROL_MARGIN),
                p.y.clamp(PATROL_MARGIN, SCREEN_HEIGHT - PATROL_MARGIN),
            )
        })
        .collect()
}

/// Draw a fresh dwell duration in [0.3, 1.0)
pub fn roll_dwell<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random_range(ENEMY_DWELL_MIN..ENEMY_DWELL_MAX)
}

/// A patrolling enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub speed: f32,
    /// Closed loop of waypoints (never empty)
    pub path: Vec<Vec2>,
    /// Index of the waypoint being approached
    pub target: usize,
    /// Time spent at the current waypoint
    pub dwell_timer: f32,
    /// How long to wait at the current waypoint
    pub dwell_duration: f32,
}

impl Enemy {
    /// Spawn an enemy. An empty path degrades to a single waypoint at the
    /// spawn point so the enemy idles in place.
    pub fn new<R: Rng + ?Sized>(id: u32, pos: Vec2, speed: f32, path: Vec<Vec2>, rng: &mut R) -> Self {
        let path = if path.is_empty() { vec![pos] } else { path };
        Self {
            id,
            pos,
            speed,
            path,
            target: 0,
            dwell_timer: 0.0,
            dwell_duration: roll_dwell(rng),
        }
    }

    #[inline]
    pub fn current_waypoint(&self) -> Vec2 {
        self.path[self.target]
    }

    /// Advance the patrol by `dt`.
    ///
    /// `_player` is part of the update contract but does not steer the patrol.
    pub fn update<R: Rng + ?Sized>(&mut self, _player: Vec2, dt: f32, rng: &mut R) {
        let to_target = self.current_waypoint() - self.pos;
        let dist = to_target.length();

        if dist < ENEMY_WAYPOINT_RADIUS {
            self.dwell_timer += dt;
            if self.dwell_timer >= self.dwell_duration {
                self.target = (self.target + 1) % self.path.len();
                self.dwell_timer = 0.0;
                self.dwell_duration = roll_dwell(rng);
            }
        } else {
            self.pos += to_target / dist * self.speed * dt;
        }

        self.pos = Vec2::new(
            self.pos.x.clamp(ENEMY_BOUNDS_MARGIN, SCREEN_WIDTH - ENEMY_BOUNDS_MARGIN),
            self.pos.y.clamp(ENEMY_BOUNDS_MARGIN, SCREEN_HEIGHT - ENEMY_BOUNDS_MARGIN),
        );
    }
}
