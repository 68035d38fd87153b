//! Fixed timestep simulation tick
//!
//! Core game loop plus the session state machine: pause, the level-up gate,
//! the stage-clear wait, and the two terminal phases.

use glam::Vec2;

use super::combat::{reap_dead_monsters, update_auto_attack};
use super::director::update_director;
use super::feedback::MAX_HIT_STOP;
use super::entities::{update_cosmetics, update_gems, update_monsters, update_projectiles};
use super::player::{autopilot_direction, input_direction, update_player};
use super::progression::{self, UpgradeId};
use super::skills::update_skills;
use super::snapshot::Snapshot;
use super::state::{GamePhase, GameState, Monster, StageClear};
use super::telegraph::update_telegraphs;
use crate::audio::{AudioCue, AudioEvent};
use crate::clamp_dt;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Analog drag/joystick vector; overrides the four axes when present
    pub drag: Option<Vec2>,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - the player steers itself
    pub idle_mode: bool,
}

/// Advance the game state by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = clamp_dt(dt);
    state.time_ticks += 1;

    if input.pause {
        state.toggle_pause();
    }

    // Cosmetics run slowed while gameplay is frozen by hit-stop
    let cosmetic_dt = if state.phase == GamePhase::Playing && state.feedback.hit_stop > 0.0 {
        dt * HIT_STOP_TIME_SCALE
    } else {
        dt
    };
    let shake = state.feedback.shake * state.settings.effective_shake_scale();
    state.camera.follow(state.player.pos, cosmetic_dt, shake, &mut state.fx_rng);

    match state.phase {
        GamePhase::Paused => return,
        GamePhase::GameOver | GamePhase::Victory => {
            state.feedback.decay(dt);
            update_cosmetics(state, dt);
            return;
        }
        GamePhase::Playing => {}
    }

    state.feedback.decay(cosmetic_dt);
    if state.feedback.consume_hit_stop(dt) {
        update_cosmetics(state, cosmetic_dt);
        return;
    }

    // Leftovers from a large experience burst
    progression::process_level_ups(state);
    if state.awaiting_upgrade() {
        update_cosmetics(state, dt);
        return;
    }

    if let Some(clear) = state.stage_clear.as_mut() {
        clear.elapsed += dt;
        let due = clear.elapsed >= STAGE_CLEAR_AUTO_ADVANCE;
        update_cosmetics(state, dt);
        if due && state.pending_level_ups == 0 {
            advance_stage(state);
        }
        return;
    }

    state.elapsed += dt;
    let dir = if input.idle_mode && input.drag.is_none() {
        autopilot_direction(state)
    } else {
        input_direction(input)
    };
    update_player(state, dir, dt);
    update_director(state, dt);

    update_monsters(state, dt);
    if state.phase != GamePhase::Playing {
        update_cosmetics(state, dt);
        return;
    }

    update_auto_attack(state, dt);
    update_skills(state, dt);
    update_projectiles(state, dt);
    update_telegraphs(state, dt);
    if state.phase != GamePhase::Playing {
        update_cosmetics(state, dt);
        return;
    }

    reap_dead_monsters(state);
    if state.phase == GamePhase::Playing && state.stage_clear.is_none() {
        update_gems(state, dt);
    }
    update_cosmetics(state, dt);
}

/// Boss death: victory on the last stage, otherwise the stage-clear wait
pub(crate) fn on_boss_defeated(state: &mut GameState, boss: &Monster) {
    state.register_kill();
    state.boss_id = None;
    state.telegraphs.clear();
    state.emit_burst(boss.pos, boss.color, 40, 320.0);
    state.feedback.add_hit_stop(MAX_HIT_STOP);
    state.feedback.add_shake(20.0);
    state.feedback.flash(1.0);

    if state.is_final_stage() {
        state.phase = GamePhase::Victory;
        state.offered.clear();
        state.pending_level_ups = 0;
        state.audio.push(AudioCue::Victory, 1.0);
        log::info!(
            "Victory after {:.1}s: {} kills, best combo {}",
            state.elapsed,
            state.kills,
            state.best_combo
        );
        return;
    }

    let loot: u32 = state.gems.drain(..).map(|g| g.value).sum::<u32>() + boss.exp;
    state.monsters.clear();
    state.projectiles.clear();
    state.combo = 0;
    state.stage_clear = Some(StageClear::default());
    state.audio.push(AudioCue::StageClear, 1.0);
    log::info!("Stage {} cleared ({} exp collected)", state.stage_number(), loot);
    progression::gain_exp(state, loot);
}

/// Move on to the next stage
fn advance_stage(state: &mut GameState) {
    if state.is_final_stage() {
        return;
    }
    state.stage_index += 1;
    state.stage_elapsed = 0.0;
    state.spawn_timer = state
        .tuning
        .stage(state.stage_index)
        .map(|s| s.spawn_interval_base)
        .unwrap_or(1.0);
    state.boss_spawned = false;
    state.boss_id = None;
    state.boss_attack_cooldown = 0.0;
    state.stage_clear = None;

    state.monsters.clear();
    state.projectiles.clear();
    state.telegraphs.clear();
    state.gems.clear();
    state.slashes.clear();
    state.beams.clear();
    state.lightning.clear();

    let heal = state.player.max_hp * STAGE_HEAL_FRACTION;
    state.player.heal(heal);
    state.combo = 0;
    state.audio.push(AudioCue::StageStart, 0.9);
    log::info!(
        "Stage {} begins: {}",
        state.stage_number(),
        state
            .tuning
            .stage(state.stage_index)
            .map(|s| s.name.as_str())
            .unwrap_or("?")
    );
}

impl GameState {
    /// Toggle between playing and paused; false when a gate or terminal phase blocks it
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Playing if !self.awaiting_upgrade() && self.stage_clear.is_none() => {
                self.phase = GamePhase::Paused;
                true
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Playing;
                true
            }
            _ => false,
        }
    }

    /// Pick one of the offered upgrades
    pub fn choose_upgrade(&mut self, id: UpgradeId) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        progression::choose(self, id)
    }

    /// Whether an explicit stage advance would be accepted right now
    pub fn stage_clear_ready(&self) -> bool {
        self.phase == GamePhase::Playing
            && self.pending_level_ups == 0
            && !self.awaiting_upgrade()
            && self.stage_clear.is_some_and(|c| c.grace_elapsed())
    }

    /// Leave the stage-clear wait early
    pub fn request_stage_advance(&mut self) -> bool {
        if !self.stage_clear_ready() {
            log::debug!("Stage advance requested too early");
            return false;
        }
        advance_stage(self);
        true
    }

    /// Hand over queued audio intents (each is delivered once)
    pub fn drain_audio(&mut self) -> Vec<AudioEvent> {
        self.audio.drain()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}
