//! Entity motion and collision
//!
//! Monsters chase the player, projectiles fly and strike, gems get vacuumed
//! up, and cosmetic records count down. Combat math lives in `combat`.

use super::combat::{damage_monster, splash_damage};
use super::geometry::{circles_overlap, clamp_to_world, within_world};
use super::progression::gain_exp;
use super::state::{GameState, ProjectileKind};
use crate::audio::AudioCue;
use crate::consts::*;

/// Drag applied to particle velocity (1/s)
const PARTICLE_DRAG: f32 = 3.0;
/// Rise speed of damage numbers (units/s)
const DAMAGE_TEXT_RISE: f32 = 40.0;
/// Hit flash fade rate (1/s)
const HIT_FLASH_DECAY: f32 = 6.0;

/// Steer monsters at the player and apply contact damage
pub fn update_monsters(state: &mut GameState, dt: f32) {
    let target = state.player.pos;
    for monster in state.monsters.iter_mut().filter(|m| m.is_alive()) {
        monster.vel = (target - monster.pos).normalize_or_zero() * monster.speed;
        monster.pos = clamp_to_world(monster.pos + monster.vel * dt, monster.radius);
    }

    if state.player.is_invincible() {
        return;
    }
    let (pos, radius) = (state.player.pos, state.player.radius);
    // Hardest hitter among everything touching the player
    let contact = state
        .monsters
        .iter()
        .filter(|m| m.is_alive() && circles_overlap(pos, radius, m.pos, m.radius))
        .map(|m| m.damage)
        .fold(None, |best: Option<f32>, d| Some(best.map_or(d, |b| b.max(d))));
    if let Some(damage) = contact {
        let reduced = damage * (1.0 - state.player.armor);
        state.hurt_player(reduced, CONTACT_INVINCIBILITY);
    }
}

/// Move projectiles, resolve hits, and drop the spent ones
pub fn update_projectiles(state: &mut GameState, dt: f32) {
    let mut projectiles = std::mem::take(&mut state.projectiles);

    for proj in projectiles.iter_mut() {
        proj.pos += proj.vel * dt;
        proj.life -= dt;
        if proj.life <= 0.0 || !within_world(proj.pos, PROJECTILE_BOUNDS_MARGIN) {
            proj.life = 0.0;
            continue;
        }

        for idx in 0..state.monsters.len() {
            let monster = &state.monsters[idx];
            if !monster.is_alive()
                || proj.hit_ids.contains(&monster.id)
                || !circles_overlap(proj.pos, proj.radius, monster.pos, monster.radius)
            {
                continue;
            }
            let monster_id = monster.id;
            proj.hit_ids.push(monster_id);
            // The killing blow is voiced by the kill cue when the body is reaped
            let hit = damage_monster(state, idx, proj.damage, proj.crit_chance);
            if hit.is_some_and(|h| !h.killed) {
                state.audio.push(AudioCue::Hit, 0.4);
            }

            match proj.kind {
                ProjectileKind::Magic { aoe_radius } => {
                    splash_damage(state, proj.pos, aoe_radius, proj.damage, proj.crit_chance, monster_id);
                    proj.life = 0.0;
                }
                _ if proj.pierce == PIERCE_UNLIMITED => {}
                _ if proj.pierce == 0 => proj.life = 0.0,
                _ => proj.pierce -= 1,
            }
            if proj.life <= 0.0 {
                break;
            }
        }
    }

    projectiles.retain(|p| p.life > 0.0);
    projectiles.append(&mut state.projectiles);
    state.projectiles = projectiles;
}

/// Pull gems inside the magnet radius and collect the ones touching the player
pub fn update_gems(state: &mut GameState, dt: f32) {
    let player_pos = state.player.pos;
    let pickup = state.player.radius;
    let magnet = state.player.magnet_radius.max(0.0);

    let mut collected = 0u32;
    let mut count = 0usize;
    state.gems.retain_mut(|gem| {
        let dist = gem.pos.distance(player_pos);
        if magnet > 0.0 && dist <= magnet && dist > 0.0 {
            let speed = GEM_PULL_BASE + (1.0 - dist / magnet) * GEM_PULL_BONUS;
            let step = (speed * dt).min(dist);
            gem.pos += (player_pos - gem.pos) / dist * step;
        }
        if circles_overlap(player_pos, pickup, gem.pos, gem.radius) {
            collected += gem.value;
            count += 1;
            return false;
        }
        true
    });

    if count > 0 {
        state.audio.push(AudioCue::GemPickup, (0.3 + 0.05 * count as f32).min(1.0));
        gain_exp(state, collected);
    }
}

/// Advance cosmetic records and cull the expired ones
pub fn update_cosmetics(state: &mut GameState, dt: f32) {
    let drag = (-PARTICLE_DRAG * dt).exp();
    state.particles.retain_mut(|p| {
        p.pos = clamp_to_world(p.pos + p.vel * dt, 0.0);
        p.vel *= drag;
        p.life -= dt;
        p.life > 0.0
    });
    state.damage_texts.retain_mut(|t| {
        t.pos.y -= DAMAGE_TEXT_RISE * dt;
        t.life -= dt;
        t.life > 0.0
    });
    state.slashes.retain_mut(|s| {
        s.life -= dt;
        s.life > 0.0
    });
    state.beams.retain_mut(|b| {
        b.life -= dt;
        b.life > 0.0
    });
    state.lightning.retain_mut(|l| {
        l.life -= dt;
        l.life > 0.0
    });
    for monster in &mut state.monsters {
        monster.hit_flash = (monster.hit_flash - HIT_FLASH_DECAY * dt).max(0.0);
    }
}
