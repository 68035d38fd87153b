//! Presentation preferences supplied by the host
//!
//! The engine only reads these; storing them is the host's job. The JSON
//! helpers give the host a stable encoding to persist.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_PARTICLES, MAX_SHAKE_SCALE};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Maximum particles for this preset (never above the hard cap)
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 200,
            QualityPreset::High => MAX_PARTICLES,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Particle effects (hit sparks, death bursts)
    pub particles: bool,
    /// Camera shake multiplier (0.0 - 1.6)
    pub shake_scale: f32,
    /// Reduced motion (no shake, no impact flash)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            shake_scale: 1.0,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Set the camera shake multiplier, clamped to the supported range
    pub fn set_shake_scale(&mut self, scale: f32) {
        self.shake_scale = if scale.is_finite() {
            scale.clamp(0.0, MAX_SHAKE_SCALE)
        } else {
            1.0
        };
    }

    /// Effective camera shake multiplier (respects reduced_motion)
    pub fn effective_shake_scale(&self) -> f32 {
        if self.reduced_motion {
            0.0
        } else {
            self.shake_scale.clamp(0.0, MAX_SHAKE_SCALE)
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Decode settings, falling back to defaults on malformed input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(mut settings) => {
                settings.set_shake_scale(settings.shake_scale);
                settings
            }
            Err(err) => {
                log::warn!("Ignoring malformed settings ({err}), using defaults");
                Self::default()
            }
        }
    }

    /// Encode settings for the host to store
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shake_scale_clamped() {
        let mut settings = Settings::default();
        settings.set_shake_scale(5.0);
        assert_eq!(settings.shake_scale, MAX_SHAKE_SCALE);
        settings.set_shake_scale(-1.0);
        assert_eq!(settings.shake_scale, 0.0);
    }

    #[test]
    fn test_reduced_motion_disables_shake() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert_eq!(settings.effective_shake_scale(), 0.0);
    }

    #[test]
    fn test_particle_cap_follows_preset() {
        assert_eq!(Settings::from_preset(QualityPreset::Low).max_particles(), 100);
        assert_eq!(Settings::from_preset(QualityPreset::High).max_particles(), MAX_PARTICLES);
        let off = Settings {
            particles: false,
            ..Settings::default()
        };
        assert_eq!(off.max_particles(), 0);
    }

    #[test]
    fn test_json_fallback() {
        let settings = Settings::from_json("{ broken");
        assert_eq!(settings.quality, QualityPreset::Medium);
        let parsed = Settings::from_json(r#"{"quality":"High","shake_scale":9.0}"#);
        assert_eq!(parsed.quality, QualityPreset::High);
        assert_eq!(parsed.shake_scale, MAX_SHAKE_SCALE);
        assert!(parsed.particles);
    }
}
