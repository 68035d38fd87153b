//! Game-feel side channels
//!
//! Hit-stop, impact flash, and camera shake accumulate with `max` semantics
//! and decay on their own. Gameplay never reads them back, except hit-stop,
//! which holds gameplay for its (very short) duration.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

/// Longest single hit-stop (seconds)
pub const MAX_HIT_STOP: f32 = 0.08;
/// Largest shake offset (world units)
pub const MAX_SHAKE: f32 = 24.0;
/// Camera catch-up rate (1/s)
pub const CAMERA_FOLLOW_RATE: f32 = 8.0;

/// Accumulated feedback intensities
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Feedback {
    /// Remaining freeze time (seconds)
    pub hit_stop: f32,
    /// Screen flash (0-1)
    pub impact_flash: f32,
    /// Shake magnitude (world units)
    pub shake: f32,
}

impl Feedback {
    pub fn add_hit_stop(&mut self, secs: f32) {
        self.hit_stop = self.hit_stop.max(secs.clamp(0.0, MAX_HIT_STOP));
    }

    pub fn flash(&mut self, amount: f32) {
        self.impact_flash = self.impact_flash.max(amount.clamp(0.0, 1.0));
    }

    pub fn add_shake(&mut self, magnitude: f32) {
        self.shake = self.shake.max(magnitude.clamp(0.0, MAX_SHAKE));
    }

    /// Fade flash and shake
    pub fn decay(&mut self, dt: f32) {
        self.impact_flash = (self.impact_flash - dt * 4.0).max(0.0);
        self.shake *= (-10.0 * dt).exp();
        if self.shake < 0.05 {
            self.shake = 0.0;
        }
    }

    /// Count hit-stop down; returns true while gameplay should stay frozen
    pub fn consume_hit_stop(&mut self, dt: f32) -> bool {
        if self.hit_stop <= 0.0 {
            return false;
        }
        self.hit_stop = (self.hit_stop - dt).max(0.0);
        true
    }
}

/// Camera following the player
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Camera {
    /// Smoothed focus point
    pub pos: Vec2,
    /// Shake displacement to add when drawing
    pub offset: Vec2,
}

impl Camera {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            offset: Vec2::ZERO,
        }
    }

    /// Ease toward `target` and roll a new shake offset
    pub fn follow<R: Rng>(&mut self, target: Vec2, dt: f32, shake: f32, rng: &mut R) {
        let blend = 1.0 - (-CAMERA_FOLLOW_RATE * dt).exp();
        self.pos += (target - self.pos) * blend;
        self.offset = if shake > 0.0 {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            Vec2::new(angle.cos(), angle.sin()) * shake
        } else {
            Vec2::ZERO
        };
    }
}
