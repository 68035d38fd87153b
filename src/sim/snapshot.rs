//! Read-only frame view for renderers and HUDs
//!
//! A snapshot owns copies of everything a frame needs. Holding one never
//! blocks the simulation.

use glam::Vec2;
use serde::Serialize;

use super::feedback::{Camera, Feedback};
use super::progression::UpgradeOption;
use super::skills::{blade_positions, skill_cooldown};
use super::state::{
    BeamEffect, BossTelegraph, DamageText, GamePhase, GameState, Gem, LightningEffect, Monster, Particle, Player,
    Projectile, SkillKind, SlashEffect,
};
use crate::tuning::CharacterKind;

/// Boss health bar
#[derive(Debug, Clone, Serialize)]
pub struct BossHud {
    pub name: String,
    pub hp: f32,
    pub max_hp: f32,
}

/// One skill icon
#[derive(Debug, Clone, Serialize)]
pub struct SkillHud {
    pub kind: SkillKind,
    pub level: u8,
    /// Seconds until the next activation
    pub cooldown: f32,
    /// Full cooldown at this level, for the radial fill
    pub max_cooldown: f32,
}

/// Heads-up display values
#[derive(Debug, Clone, Serialize)]
pub struct Hud {
    pub character: CharacterKind,
    pub hp: f32,
    pub max_hp: f32,
    pub level: u32,
    pub exp: u32,
    pub exp_to_next: u32,
    pub kills: u32,
    pub combo: u32,
    pub best_combo: u32,
    /// 1-based
    pub stage_number: usize,
    pub stage_count: usize,
    pub stage_name: String,
    pub stage_time_left: f32,
    pub elapsed: f32,
    pub boss: Option<BossHud>,
    pub skills: Vec<SkillHud>,
}

/// Session gates and phase, flattened for UI logic
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SessionFlags {
    pub phase: GamePhase,
    pub paused: bool,
    pub awaiting_upgrade: bool,
    pub pending_level_ups: u32,
    pub stage_clear: bool,
    /// An advance request would be honored now
    pub stage_clear_ready: bool,
    pub game_over: bool,
    pub victory: bool,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub player: Player,
    pub monsters: Vec<Monster>,
    pub projectiles: Vec<Projectile>,
    pub gems: Vec<Gem>,
    pub telegraphs: Vec<BossTelegraph>,
    pub particles: Vec<Particle>,
    pub damage_texts: Vec<DamageText>,
    pub slashes: Vec<SlashEffect>,
    pub beams: Vec<BeamEffect>,
    pub lightning: Vec<LightningEffect>,
    pub blades: Vec<Vec2>,
    pub camera: Camera,
    /// Shake already multiplied by the player's shake setting
    pub shake: f32,
    pub feedback: Feedback,
    pub hud: Hud,
    pub flags: SessionFlags,
    pub choices: Vec<UpgradeOption>,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let stage = state.tuning.stage(state.stage_index);
        let boss = state.boss().map(|b| BossHud {
            name: stage.map(|s| s.boss.name.clone()).unwrap_or_default(),
            hp: b.hp,
            max_hp: b.max_hp,
        });
        let skills = SkillKind::ALL
            .iter()
            .map(|&kind| {
                let slot = state.skills.slot(kind);
                SkillHud {
                    kind,
                    level: slot.level,
                    cooldown: slot.cooldown.max(0.0),
                    max_cooldown: skill_cooldown(kind, slot.level),
                }
            })
            .collect();

        let hud = Hud {
            character: state.character,
            hp: state.player.hp,
            max_hp: state.player.max_hp,
            level: state.player.level,
            exp: state.player.exp,
            exp_to_next: state.player.exp_to_next,
            kills: state.kills,
            combo: state.combo,
            best_combo: state.best_combo,
            stage_number: state.stage_number(),
            stage_count: state.tuning.stage_count(),
            stage_name: stage.map(|s| s.name.clone()).unwrap_or_default(),
            stage_time_left: state.stage_time_left(),
            elapsed: state.elapsed,
            boss,
            skills,
        };

        let flags = SessionFlags {
            phase: state.phase,
            paused: state.phase == GamePhase::Paused,
            awaiting_upgrade: state.awaiting_upgrade(),
            pending_level_ups: state.pending_level_ups,
            stage_clear: state.stage_clear.is_some(),
            stage_clear_ready: state.stage_clear_ready(),
            game_over: state.phase == GamePhase::GameOver,
            victory: state.phase == GamePhase::Victory,
        };

        Self {
            tick: state.time_ticks,
            player: state.player.clone(),
            monsters: state.monsters.clone(),
            projectiles: state.projectiles.clone(),
            gems: state.gems.clone(),
            telegraphs: state.telegraphs.clone(),
            particles: state.particles.iter().cloned().collect(),
            damage_texts: state.damage_texts.iter().cloned().collect(),
            slashes: state.slashes.iter().cloned().collect(),
            beams: state.beams.iter().cloned().collect(),
            lightning: state.lightning.iter().cloned().collect(),
            blades: blade_positions(state),
            camera: state.camera,
            shake: state.feedback.shake * state.settings.effective_shake_scale(),
            feedback: state.feedback,
            hud,
            flags,
            choices: state.offered.clone(),
        }
    }
}
