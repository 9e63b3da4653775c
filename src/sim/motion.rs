//! Player motion: gravity, per-axis movement and grounding
//!
//! Each axis is tested once per step against the walls. A move that would end
//! inside a wall is rejected outright (no sliding, no push-out). Diagonal moves
//! into a concave corner can therefore reject both axes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::CollisionField;
use super::geometry::AxisBox;
use crate::consts::*;

/// Discrete movement intent, each axis in {-1, 0, 1}
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub dx: i8,
    pub dy: i8,
}

impl Intent {
    pub fn new(dx: i8, dy: i8) -> Self {
        Self {
            dx: dx.signum(),
            dy: dy.signum(),
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Player position and vertical state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerPose {
    pub pos: Vec2,
    pub velocity_y: f32,
    pub grounded: bool,
}

impl PlayerPose {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            velocity_y: 0.0,
            grounded: false,
        }
    }

    #[inline]
    pub fn hitbox(&self) -> AxisBox {
        AxisBox::player_at(self.pos)
    }
}

/// Lowest y the player's centre may occupy above the implicit floor
#[inline]
pub fn floor_y() -> f32 {
    FLOOR_HEIGHT + PLAYER_HALF_HEIGHT
}

/// Integrate gravity into the vertical velocity.
///
/// Airborne bodies accelerate downward up to terminal velocity; grounded
/// bodies have their velocity zeroed.
pub fn apply_gravity(velocity_y: f32, grounded: bool, dt: f32) -> f32 {
    if grounded {
        return 0.0;
    }
    (velocity_y - GRAVITY * dt * 60.0).max(TERMINAL_VELOCITY)
}

/// Grounded test against platforms only
pub fn check_grounded(pos: Vec2, field: &CollisionField) -> bool {
    field.on_platform(&AxisBox::player_at(pos))
}

/// Move `pos` by `intent` for one step, rejecting each axis that would end
/// inside a wall. Returns the new position and grounded flag.
pub fn resolve_motion(pos: Vec2, intent: Intent, dt: f32, field: &CollisionField) -> (Vec2, bool) {
    if intent.is_idle() {
        let grounded = check_grounded(pos, field) || pos.y <= floor_y();
        return (pos, grounded);
    }

    let step = PLAYER_SPEED * dt;
    let mut new_pos = pos;

    if intent.dx != 0 {
        let x = pos.x + intent.dx as f32 * step;
        if !field.blocked(&AxisBox::player_at(Vec2::new(x, pos.y))) {
            new_pos.x = x;
        }
    }

    if intent.dy != 0 {
        let y = pos.y + intent.dy as f32 * step;
        // Tested from the old x so the axes stay independent
        if !field.blocked(&AxisBox::player_at(Vec2::new(pos.x, y))) {
            new_pos.y = y;
        }
    }

    let mut grounded = check_grounded(new_pos, field);

    if !grounded && intent.dy <= 0 && new_pos.y <= floor_y() {
        new_pos.y = floor_y();
        grounded = true;
    }

    (new_pos, grounded)
}

/// Vertical jump/fall step, tested against walls only so the body passes
/// through platforms. Returns the resulting y and velocity; a blocked step
/// keeps `resolved_y` and kills the velocity.
pub fn apply_jump_step(
    origin: Vec2,
    resolved_y: f32,
    velocity_y: f32,
    dt: f32,
    field: &CollisionField,
) -> (f32, f32) {
    if velocity_y == 0.0 {
        return (resolved_y, velocity_y);
    }
    let test_y = origin.y + velocity_y * dt * JUMP_STEP_SCALE;
    if field.blocked(&AxisBox::player_at(Vec2::new(origin.x, test_y))) {
        (resolved_y, 0.0)
    } else {
        (test_y, velocity_y)
    }
}

/// Keep the player's centre inside the playfield
pub fn clamp_to_playfield(pos: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.clamp(35.0, SCREEN_WIDTH - 35.0),
        pos.y.clamp(70.0, SCREEN_HEIGHT - 70.0),
    )
}

/// Top of the platform a descending body should snap onto, if any.
///
/// Uses a wider catch box than the hitbox so a falling body does not slip
/// past a platform edge between steps.
pub fn landing_surface(pos: Vec2, velocity_y: f32, field: &CollisionField) -> Option<f32> {
    if velocity_y > 0.0 {
        return None;
    }
    let feet = pos.y - PLAYER_HALF_HEIGHT;
    field
        .platforms
        .iter()
        .find(|p| {
            pos.x + 25.0 > p.left()
                && pos.x - 25.0 < p.right()
                && feet <= p.top()
                && feet >= p.bottom()
        })
        .map(|p| p.top())
}

/// Advance the player one step with a horizontal intent.
///
/// Vertical intent comes from the sign of the current vertical velocity.
pub fn step_player(pose: &mut PlayerPose, move_x: i8, dt: f32, field: &CollisionField) {
    pose.velocity_y = apply_gravity(pose.velocity_y, pose.grounded, dt);

    let vertical = pose.velocity_y * dt;
    let dy = if vertical > 0.0 {
        1
    } else if vertical < 0.0 {
        -1
    } else {
        0
    };

    let origin = pose.pos;
    let (mut new_pos, grounded) = resolve_motion(origin, Intent::new(move_x, dy), dt, field);
    let (y, velocity_y) = apply_jump_step(origin, new_pos.y, pose.velocity_y, dt, field);
    new_pos.y = y;
    pose.velocity_y = velocity_y;
    pose.grounded = grounded;
    pose.pos = clamp_to_playfield(new_pos);

    if !pose.grounded {
        if let Some(top) = landing_surface(pose.pos, pose.velocity_y, field) {
            pose.grounded = true;
            pose.velocity_y = 0.0;
            pose.pos.y = top + PLAYER_HALF_HEIGHT;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bx(x: f32, y: f32, w: f32, h: f32) -> AxisBox {
        AxisBox::from_size(Vec2::new(x, y), w, h).unwrap()
    }

    fn walls(w: Vec<AxisBox>) -> CollisionField {
        CollisionField::new(w, Vec::new())
    }

    #[test]
    fn test_gravity() {
        let v = apply_gravity(0.0, false, SIM_DT);
        assert!((v - -0.8).abs() < 1e-5);
        assert_eq!(apply_gravity(-14.9, false, SIM_DT), TERMINAL_VELOCITY);
        assert_eq!(apply_gravity(-7.0, true, SIM_DT), 0.0);
        assert_eq!(apply_gravity(5.0, true, SIM_DT), 0.0);
    }

    #[test]
    fn test_free_horizontal_move() {
        let field = walls(Vec::new());
        let (pos, _) = resolve_motion(Vec2::new(500.0, 300.0), Intent::new(1, 0), 0.05, &field);
        assert!((pos.x - 514.0).abs() < 1e-4);
        assert_eq!(pos.y, 300.0);
    }

    #[test]
    fn test_wall_rejects_horizontal_move() {
        let field = walls(vec![bx(300.0, 300.0, 20.0, 200.0)]);
        let start = Vec2::new(270.0, 300.0);
        let (pos, _) = resolve_motion(start, Intent::new(1, 0), 0.05, &field);
        assert_eq!(pos, start);

        // Moving away is fine
        let (pos, _) = resolve_motion(start, Intent::new(-1, 0), 0.05, &field);
        assert!(pos.x < start.x);
    }

    #[test]
    fn test_wall_rejects_vertical_move_only() {
        // Ceiling directly above
        let field = walls(vec![bx(300.0, 340.0, 400.0, 20.0)]);
        let start = Vec2::new(300.0, 300.0);
        let (pos, _) = resolve_motion(start, Intent::new(1, 1), 0.05, &field);
        assert_eq!(pos.y, 300.0);
        assert!((pos.x - 314.0).abs() < 1e-4);
    }

    #[test]
    fn test_concave_corner_rejects_both_axes() {
        // Wall to the right and a ceiling above, corner pocket at top-right
        let field = walls(vec![
            bx(300.0, 300.0, 20.0, 200.0),
            bx(200.0, 340.0, 160.0, 20.0),
        ]);
        let start = Vec2::new(270.0, 300.0);
        let (pos, _) = resolve_motion(start, Intent::new(1, 1), 0.05, &field);
        assert_eq!(pos, start);
    }

    #[test]
    fn test_floor_clamp() {
        let field = walls(Vec::new());
        let (pos, grounded) = resolve_motion(Vec2::new(500.0, 72.0), Intent::new(0, -1), 0.05, &field);
        assert_eq!(pos.y, floor_y());
        assert!(grounded);
    }

    #[test]
    fn test_idle_rechecks_ground() {
        let platform = bx(200.0, 250.0, 120.0, 20.0);
        let field = CollisionField::new(Vec::new(), vec![platform]);

        let (pos, grounded) = resolve_motion(Vec2::new(200.0, 285.0), Intent::default(), 0.05, &field);
        assert_eq!(pos, Vec2::new(200.0, 285.0));
        assert!(grounded);

        let (_, grounded) = resolve_motion(Vec2::new(600.0, 285.0), Intent::default(), 0.05, &field);
        assert!(!grounded);

        let (_, grounded) = resolve_motion(Vec2::new(600.0, floor_y()), Intent::default(), 0.05, &field);
        assert!(grounded);
    }

    #[test]
    fn test_walking_off_platform_edge_loses_ground() {
        let platform = bx(200.0, 250.0, 120.0, 20.0); // x 140..260
        let field = CollisionField::new(Vec::new(), vec![platform]);
        let mut pose = PlayerPose::new(Vec2::new(255.0, 285.0));
        pose.grounded = true;
        for _ in 0..10 {
            step_player(&mut pose, 1, SIM_DT, &field);
        }
        assert!(pose.pos.x > 277.0);
        assert!(!pose.grounded);
    }

    #[test]
    fn test_jump_rises_through_platform_and_settles_on_top() {
        let platform = bx(500.0, 160.0, 120.0, 20.0); // top 170
        let field = CollisionField::new(Vec::new(), vec![platform]);
        let mut pose = PlayerPose::new(Vec2::new(500.0, floor_y()));
        pose.velocity_y = JUMP_POWER;

        for _ in 0..30 {
            step_player(&mut pose, 0, SIM_DT, &field);
        }
        let feet = pose.pos.y - PLAYER_HALF_HEIGHT;
        assert!(pose.grounded);
        assert!(feet > platform.top() - GROUND_EPSILON);
        assert!(feet < platform.top() + GROUND_EPSILON);
    }

    #[test]
    fn test_jump_blocked_by_ceiling_kills_velocity() {
        let field = walls(vec![bx(500.0, 130.0, 200.0, 20.0)]); // bottom = 120
        let origin = Vec2::new(500.0, 90.0); // top = 115
        let (y, v) = apply_jump_step(origin, 90.0, JUMP_POWER, SIM_DT, &field);
        assert_eq!(y, 90.0);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_lands_on_platform_while_falling() {
        let platform = bx(200.0, 250.0, 120.0, 20.0); // top 260
        let field = CollisionField::new(Vec::new(), vec![platform]);
        let mut pose = PlayerPose::new(Vec2::new(200.0, 320.0));
        for _ in 0..120 {
            step_player(&mut pose, 0, SIM_DT, &field);
        }
        assert!(pose.grounded);
        assert!((pose.pos.y - (platform.top() + PLAYER_HALF_HEIGHT)).abs() < GROUND_EPSILON);
        assert_eq!(pose.velocity_y, 0.0);
    }

    #[test]
    fn test_resting_on_floor_is_stable() {
        let field = walls(Vec::new());
        let mut pose = PlayerPose::new(Vec2::new(500.0, 200.0));
        for _ in 0..240 {
            step_player(&mut pose, 0, SIM_DT, &field);
        }
        assert_eq!(pose.pos.y, floor_y());
        for _ in 0..10 {
            step_player(&mut pose, 0, SIM_DT, &field);
            assert!(pose.grounded);
        }
    }

    proptest! {
        #[test]
        fn prop_blocked_axis_is_rejected(
            px in 100.0f32..900.0, py in 100.0f32..600.0,
            wx in 100.0f32..900.0, wy in 100.0f32..600.0,
            ww in 4.0f32..120.0, wh in 4.0f32..120.0,
            dx in -1i8..=1,
        ) {
            let wall = AxisBox::new(Vec2::new(wx, wy), ww, wh).unwrap();
            let field = walls(vec![wall]);
            let start = Vec2::new(px, py);
            let dt = 0.05;
            let (pos, _) = resolve_motion(start, Intent::new(dx, 0), dt, &field);

            let tentative = Vec2::new(px + dx as f32 * PLAYER_SPEED * dt, py);
            if dx != 0 && field.blocked(&AxisBox::player_at(tentative)) {
                prop_assert_eq!(pos.x, px);
            } else {
                prop_assert_eq!(pos.x, tentative.x);
            }
        }

        #[test]
        fn prop_idle_never_moves(px in 0.0f32..1000.0, py in 70.0f32..700.0) {
            let field = walls(vec![bx(500.0, 400.0, 100.0, 100.0)]);
            let (pos, _) = resolve_motion(Vec2::new(px, py), Intent::default(), 0.05, &field);
            prop_assert_eq!(pos, Vec2::new(px, py));
        }
    }
}
