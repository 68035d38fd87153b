//! Player movement
//!
//! Velocity eases toward the input direction with an exponential response:
//! quick to accelerate, a little slower to coast to a stop.

use glam::Vec2;

use super::geometry::clamp_to_world;
use super::state::{GameState, TelegraphShape};
use super::tick::TickInput;
use crate::consts::{MOVING_THRESHOLD, PLAYER_ACCEL_RATE, PLAYER_FRICTION_RATE, WORLD_HEIGHT, WORLD_WIDTH};

/// Resolve the movement direction from input (drag wins over the axes)
pub fn input_direction(input: &TickInput) -> Vec2 {
    if let Some(drag) = input.drag {
        if drag.is_finite() {
            return drag.normalize_or_zero();
        }
        return Vec2::ZERO;
    }
    let mut dir = Vec2::ZERO;
    if input.left {
        dir.x -= 1.0;
    }
    if input.right {
        dir.x += 1.0;
    }
    if input.up {
        dir.y -= 1.0;
    }
    if input.down {
        dir.y += 1.0;
    }
    dir.normalize_or_zero()
}

/// Radius inside which the autopilot flees monsters
const AUTOPILOT_DANGER_RADIUS: f32 = 260.0;
/// Distance from the walls the autopilot starts steering inward
const AUTOPILOT_WALL_MARGIN: f32 = 160.0;

/// Demo-mode steering: flee nearby monsters and telegraphs, otherwise collect gems
pub fn autopilot_direction(state: &GameState) -> Vec2 {
    let pos = state.player.pos;
    let mut steer = Vec2::ZERO;

    for monster in state.monsters.iter().filter(|m| m.is_alive()) {
        let away = pos - monster.pos;
        let dist = away.length();
        let danger = AUTOPILOT_DANGER_RADIUS + monster.radius;
        if dist < danger && dist > 0.0 {
            steer += away / dist * (1.0 - dist / danger) * if monster.is_boss { 3.0 } else { 1.0 };
        }
    }

    for telegraph in &state.telegraphs {
        if !super::telegraph::contains(&telegraph.shape, pos) {
            continue;
        }
        let escape = match telegraph.shape {
            TelegraphShape::Circle { center, .. } => pos - center,
            TelegraphShape::Line { start, end, .. } => {
                let along = (end - start).normalize_or_zero();
                along.perp() * along.perp().dot(pos - start).signum()
            }
            TelegraphShape::Cone { origin, facing, .. } => {
                let side = crate::direction_from_angle(facing).perp();
                side * side.dot(pos - origin).signum()
            }
        };
        steer += escape.normalize_or_zero() * 4.0;
    }

    let inward = Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0) - pos;
    let near_wall = pos.x < AUTOPILOT_WALL_MARGIN
        || pos.y < AUTOPILOT_WALL_MARGIN
        || pos.x > WORLD_WIDTH - AUTOPILOT_WALL_MARGIN
        || pos.y > WORLD_HEIGHT - AUTOPILOT_WALL_MARGIN;
    if near_wall {
        steer += inward.normalize_or_zero();
    }

    if steer.length_squared() < 0.01 {
        let nearest_gem = state
            .gems
            .iter()
            .min_by(|a, b| a.pos.distance_squared(pos).total_cmp(&b.pos.distance_squared(pos)));
        if let Some(gem) = nearest_gem {
            steer = gem.pos - pos;
        }
    }
    steer.normalize_or_zero()
}

/// Advance player motion and personal timers by `dt`
pub fn update_player(state: &mut GameState, dir: Vec2, dt: f32) {
    let player = &mut state.player;
    let dir = dir.normalize_or_zero();
    let target = dir * player.speed;
    let rate = if dir == Vec2::ZERO {
        PLAYER_FRICTION_RATE
    } else {
        PLAYER_ACCEL_RATE
    };
    let blend = 1.0 - (-rate * dt).exp();
    player.vel += (target - player.vel) * blend;
    player.pos = clamp_to_world(player.pos + player.vel * dt, player.radius);

    let speed = player.vel.length();
    player.speed_ratio = if player.speed > 0.0 {
        (speed / player.speed).min(1.0)
    } else {
        0.0
    };
    player.moving = speed > MOVING_THRESHOLD;
    if player.moving {
        player.last_move_dir = player.vel / speed;
    }
    if dir.x.abs() > 0.01 {
        player.facing = dir.x.signum();
    }
    player.invincible = (player.invincible - dt).max(0.0);
}
