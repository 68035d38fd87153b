//! Unlockable skills: chain lightning, orbiting blades, piercing laser
//!
//! Each skill is dormant at level 0. Level formulas are kept as free
//! functions so the HUD and tests can read them without a live session.

use glam::Vec2;
use rand::seq::IndexedRandom;

use super::combat::{damage_monster, nearest_monsters};
use super::geometry::distance_to_segment;
use super::state::{GameState, SkillKind};
use crate::audio::AudioCue;
use crate::consts::*;
use crate::{direction_from_angle, normalize_angle};

/// Height the lightning bolt visual drops from
const BOLT_DROP: f32 = 240.0;

pub fn lightning_cooldown(level: u8) -> f32 {
    (2.6 - 0.22 * level as f32).max(0.6)
}

pub fn lightning_candidates(level: u8) -> usize {
    6 + 2 * level as usize
}

pub fn lightning_multiplier(level: u8) -> f32 {
    1.2 + 0.25 * level as f32
}

pub fn blade_count(level: u8) -> u32 {
    if level == 0 {
        return 0;
    }
    (1 + level as u32).min(MAX_BLADES)
}

pub fn blade_radius(level: u8) -> f32 {
    70.0 + 8.0 * level as f32
}

/// Ring spin (rad/s)
pub fn blade_spin(level: u8) -> f32 {
    3.2 + 0.2 * level as f32
}

pub fn blade_multiplier(level: u8) -> f32 {
    0.45 + 0.1 * level as f32
}

pub fn laser_cooldown(level: u8) -> f32 {
    (3.4 - 0.25 * level as f32).max(1.2)
}

pub fn laser_length(level: u8) -> f32 {
    620.0 + 30.0 * level as f32
}

pub fn laser_half_width(level: u8) -> f32 {
    14.0 + 2.0 * level as f32
}

pub fn laser_multiplier(level: u8) -> f32 {
    1.6 + 0.3 * level as f32
}

/// Nominal cooldown at a level (blades report their tick interval)
pub fn skill_cooldown(kind: SkillKind, level: u8) -> f32 {
    match kind {
        SkillKind::Lightning => lightning_cooldown(level),
        SkillKind::Blades => BLADE_TICK_INTERVAL,
        SkillKind::Laser => laser_cooldown(level),
    }
}

/// World positions of every blade on the ring
pub fn blade_positions(state: &GameState) -> Vec<Vec2> {
    let level = state.skills.blades.level;
    let count = blade_count(level);
    if count == 0 {
        return Vec::new();
    }
    let radius = blade_radius(level);
    let step = std::f32::consts::TAU / count as f32;
    (0..count)
        .map(|i| state.player.pos + direction_from_angle(state.skills.blade_angle + step * i as f32) * radius)
        .collect()
}

/// Run every unlocked skill for one tick
pub fn update_skills(state: &mut GameState, dt: f32) {
    update_lightning(state, dt);
    update_blades(state, dt);
    update_laser(state, dt);
}

fn update_lightning(state: &mut GameState, dt: f32) {
    let level = state.skills.lightning.level;
    if level == 0 {
        return;
    }
    let slot = &mut state.skills.lightning;
    slot.cooldown = (slot.cooldown - dt).max(0.0);
    if slot.cooldown > 0.0 {
        return;
    }

    let origin = state.player.pos;
    let candidates = nearest_monsters(state, origin, Some(LIGHTNING_SEARCH_RANGE), lightning_candidates(level));
    if candidates.is_empty() {
        return;
    }
    let strikes = (1 + level as usize).min(candidates.len());
    let targets: Vec<usize> = candidates.choose_multiple(&mut state.rng, strikes).copied().collect();

    let base = state.player.damage * lightning_multiplier(level);
    let crit = state.player.crit_chance;
    for idx in targets {
        let to = state.monsters[idx].pos;
        damage_monster(state, idx, base, crit);
        state.push_lightning(to - Vec2::Y * BOLT_DROP, to);
    }
    state.feedback.flash(0.25);
    state.feedback.add_shake(4.0);
    state.audio.push(AudioCue::Lightning, 0.7);
    state.skills.lightning.cooldown = lightning_cooldown(level);
}

fn update_blades(state: &mut GameState, dt: f32) {
    let level = state.skills.blades.level;
    if level == 0 {
        return;
    }
    state.skills.blade_angle = normalize_angle(state.skills.blade_angle + blade_spin(level) * dt);
    let slot = &mut state.skills.blades;
    slot.cooldown -= dt;
    if slot.cooldown > 0.0 {
        return;
    }
    slot.cooldown = BLADE_TICK_INTERVAL;

    let blades = blade_positions(state);
    // One hit per monster per tick, however many blades overlap it
    let victims: Vec<usize> = state
        .monsters
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_alive())
        .filter(|(_, m)| blades.iter().any(|b| b.distance(m.pos) <= BLADE_HIT_RADIUS + m.radius))
        .map(|(i, _)| i)
        .collect();
    if victims.is_empty() {
        return;
    }

    let base = state.player.damage * blade_multiplier(level);
    let crit = state.player.crit_chance;
    for idx in victims {
        damage_monster(state, idx, base, crit);
    }
    state.audio.push(AudioCue::Blade, 0.5);
}

fn update_laser(state: &mut GameState, dt: f32) {
    let level = state.skills.laser.level;
    if level == 0 {
        return;
    }
    let slot = &mut state.skills.laser;
    slot.cooldown = (slot.cooldown - dt).max(0.0);
    if slot.cooldown > 0.0 {
        return;
    }

    let start = state.player.pos;
    let length = laser_length(level);
    let Some(&target) = nearest_monsters(state, start, Some(length), 1).first() else {
        return;
    };
    let mut dir = (state.monsters[target].pos - start).normalize_or_zero();
    if dir == Vec2::ZERO {
        dir = state.player.last_move_dir;
    }
    let end = start + dir * length;
    let half_width = laser_half_width(level);

    let victims: Vec<usize> = state
        .monsters
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_alive() && distance_to_segment(m.pos, start, end) <= half_width + m.radius)
        .map(|(i, _)| i)
        .collect();
    let base = state.player.damage * laser_multiplier(level);
    let crit = state.player.crit_chance;
    for idx in victims {
        damage_monster(state, idx, base, crit);
    }

    state.push_beam(start, end, half_width * 2.0);
    state.feedback.add_shake(6.0);
    state.feedback.add_hit_stop(0.02);
    state.audio.push(AudioCue::Laser, 0.8);
    state.skills.laser.cooldown = laser_cooldown(level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Monster;
    use crate::tuning::{CharacterKind, MonsterKind};

    fn add_monster(state: &mut GameState, offset: Vec2) {
        let id = state.next_entity_id();
        let pos = state.player.pos + offset;
        state.monsters.push(Monster {
            id,
            kind: MonsterKind::Golem,
            pos,
            vel: Vec2::ZERO,
            radius: 20.0,
            hp: 5000.0,
            max_hp: 5000.0,
            speed: 0.0,
            damage: 0.0,
            exp: 1,
            is_boss: false,
            color: 0,
            hit_flash: 0.0,
        });
    }

    #[test]
    fn test_level_formulas() {
        assert_eq!(lightning_cooldown(0), 2.6);
        assert!((lightning_cooldown(8) - 0.84).abs() < 1e-5);
        assert!((laser_cooldown(8) - 1.4).abs() < 1e-5);
        assert_eq!(laser_cooldown(20), 1.2);
        assert_eq!(blade_count(0), 0);
        assert_eq!(blade_count(3), 4);
        assert_eq!(blade_count(8), MAX_BLADES);
        assert_eq!(lightning_candidates(2), 10);
    }

    #[test]
    fn test_locked_skills_do_nothing() {
        let mut state = GameState::new(8, CharacterKind::Knight);
        add_monster(&mut state, Vec2::new(100.0, 0.0));
        update_skills(&mut state, 0.1);
        assert_eq!(state.monsters[0].hp, 5000.0);
        assert!(state.beams.is_empty() && state.lightning.is_empty());
    }

    #[test]
    fn test_lightning_strikes_limited_targets() {
        let mut state = GameState::new(8, CharacterKind::Knight);
        state.skills.lightning.level = 1;
        for i in 0..5 {
            add_monster(&mut state, Vec2::new(60.0 * (i as f32 + 1.0), 0.0));
        }
        update_skills(&mut state, 0.016);
        let struck = state.monsters.iter().filter(|m| m.hp < 5000.0).count();
        assert_eq!(struck, 2);
        assert_eq!(state.lightning.len(), 2);
        assert_eq!(state.skills.lightning.cooldown, lightning_cooldown(1));
    }

    #[test]
    fn test_lightning_waits_for_targets() {
        let mut state = GameState::new(8, CharacterKind::Knight);
        state.skills.lightning.level = 2;
        update_skills(&mut state, 0.016);
        assert_eq!(state.skills.lightning.cooldown, 0.0);
        add_monster(&mut state, Vec2::new(900.0, 0.0));
        update_skills(&mut state, 0.016);
        assert_eq!(state.monsters[0].hp, 5000.0);
    }

    #[test]
    fn test_blades_hit_on_ring() {
        let mut state = GameState::new(8, CharacterKind::Knight);
        state.skills.blades.level = 8;
        // Six blades at radius 134: a monster on the ring gets clipped
        add_monster(&mut state, Vec2::new(blade_radius(8), 0.0));
        add_monster(&mut state, Vec2::new(600.0, 0.0));
        assert_eq!(blade_positions(&state).len(), 6);
        update_skills(&mut state, 0.0);
        assert!(state.monsters[0].hp < 5000.0);
        assert_eq!(state.monsters[1].hp, 5000.0);
        assert_eq!(state.skills.blades.cooldown, BLADE_TICK_INTERVAL);
    }

    #[test]
    fn test_laser_pierces_line() {
        let mut state = GameState::new(8, CharacterKind::Knight);
        state.skills.laser.level = 1;
        add_monster(&mut state, Vec2::new(100.0, 0.0));
        add_monster(&mut state, Vec2::new(400.0, 10.0));
        add_monster(&mut state, Vec2::new(0.0, 300.0));
        update_skills(&mut state, 0.016);
        assert!(state.monsters[0].hp < 5000.0);
        assert!(state.monsters[1].hp < 5000.0);
        assert_eq!(state.monsters[2].hp, 5000.0);
        assert_eq!(state.beams.len(), 1);
    }
}
