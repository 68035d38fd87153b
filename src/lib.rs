//! Survivor Arena - stage-based arena survival simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, combat, bosses, progression, session flow)
//! - `tuning`: Data-driven game balance (stages, characters, monsters)
//! - `settings`: Host-supplied presentation preferences
//! - `audio`: Audio intent queue handed to the mixer every frame
//! - `records`: Finished-run summaries and leaderboard

pub mod audio;
pub mod error;
pub mod records;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use audio::{AudioCue, AudioEvent};
pub use error::TuningError;
pub use records::{RunOutcome, RunRecords, RunSummary};
pub use settings::{QualityPreset, Settings};
pub use tuning::{AttackStyle, CharacterKind, MonsterKind, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation step (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest frame delta the simulation accepts (seconds)
    pub const MAX_DT: f32 = 0.05;

    /// World dimensions (origin at top-left)
    pub const WORLD_WIDTH: f32 = 2400.0;
    pub const WORLD_HEIGHT: f32 = 1600.0;

    /// Player movement response
    pub const PLAYER_RADIUS: f32 = 18.0;
    pub const PLAYER_ACCEL_RATE: f32 = 14.0;
    pub const PLAYER_FRICTION_RATE: f32 = 9.0;
    /// Below this speed (units/s) the player counts as standing still
    pub const MOVING_THRESHOLD: f32 = 8.0;

    /// Invincibility windows (seconds)
    pub const CONTACT_INVINCIBILITY: f32 = 0.5;
    pub const TELEGRAPH_INVINCIBILITY: f32 = 0.8;

    /// Population caps
    pub const MAX_PARTICLES: usize = 300;
    pub const MAX_GEMS: usize = 200;
    pub const MAX_DAMAGE_TEXTS: usize = 80;
    pub const MAX_SLASH_EFFECTS: usize = 24;
    pub const MAX_BEAM_EFFECTS: usize = 12;
    pub const MAX_LIGHTNING_EFFECTS: usize = 24;
    pub const MAX_AUDIO_EVENTS: usize = 128;
    pub const BASE_MONSTER_CAP: usize = 90;
    pub const MONSTER_CAP_PER_STAGE: usize = 20;

    /// Projectiles
    pub const PROJECTILE_BOUNDS_MARGIN: f32 = 80.0;
    pub const PIERCE_UNLIMITED: u32 = u32::MAX;
    pub const EXTENDED_RANGE_FACTOR: f32 = 1.35;

    /// Gems
    pub const GEM_RADIUS: f32 = 7.0;
    pub const GEM_PULL_BASE: f32 = 180.0;
    pub const GEM_PULL_BONUS: f32 = 520.0;

    /// Damage math
    pub const DAMAGE_ROLL_MIN: f32 = 0.9;
    pub const DAMAGE_ROLL_MAX: f32 = 1.1;
    pub const CRIT_MULTIPLIER: f32 = 1.8;
    pub const KNOCKBACK: f32 = 18.0;
    pub const BOSS_KNOCKBACK_SCALE: f32 = 0.2;

    /// Skills
    pub const MAX_SKILL_LEVEL: u8 = 8;
    pub const MAX_BLADES: u32 = 6;
    pub const BLADE_TICK_INTERVAL: f32 = 0.25;
    pub const BLADE_HIT_RADIUS: f32 = 22.0;
    pub const LIGHTNING_SEARCH_RANGE: f32 = 560.0;
    pub const SKILL_REFRESH_COOLDOWN: f32 = 0.3;

    /// Spawning
    pub const SPAWN_RING_MIN: f32 = 520.0;
    pub const SPAWN_RING_MAX: f32 = 680.0;
    pub const BOSS_SPAWN_DISTANCE: f32 = 420.0;

    /// Progression
    pub const BASE_EXP_TO_NEXT: u32 = 10;
    pub const MAX_LEVEL_UPS_PER_TICK: u32 = 8;
    pub const UPGRADE_CHOICES: usize = 3;
    pub const MELEE_SUBSTITUTE_DAMAGE: f32 = 4.0;
    pub const MAX_ARMOR: f32 = 0.6;

    /// Session flow
    pub const STAGE_CLEAR_READY_DELAY: f32 = 1.2;
    pub const STAGE_CLEAR_AUTO_ADVANCE: f32 = 4.0;
    pub const STAGE_HEAL_FRACTION: f32 = 0.3;

    /// Hit-stop: gameplay frozen, cosmetics slowed to this fraction
    pub const HIT_STOP_TIME_SCALE: f32 = 0.2;
    pub const MAX_SHAKE_SCALE: f32 = 1.6;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector for an angle (radians)
#[inline]
pub fn direction_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Angle of a vector (radians, 0 when degenerate)
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    if v == Vec2::ZERO { 0.0 } else { v.y.atan2(v.x) }
}

/// Clamp a frame delta into the range the simulation accepts
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, consts::MAX_DT)
    } else {
        0.0
    }
}
