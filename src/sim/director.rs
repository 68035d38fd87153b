//! Spawn director
//!
//! Drives the stage clock, trickles monsters in from just off-screen at a
//! rate that ramps over the stage, and summons the boss when time runs out.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::geometry::{clamp_to_world, random_point_on_annulus};
use super::state::{GameState, Monster};
use super::telegraph::roll_cooldown;
use crate::audio::AudioCue;
use crate::consts::*;
use crate::direction_from_angle;
use crate::tuning::MonsterKind;

/// Random spread applied to each spawn interval
const INTERVAL_JITTER: (f32, f32) = (0.85, 1.15);

/// Stat multipliers for a monster spawned at `stage_index` and `progress`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub exp: f32,
}

pub fn scaling(stage_index: usize, progress: f32) -> Scaling {
    let s = stage_index as f32;
    let p = progress.clamp(0.0, 1.0);
    Scaling {
        hp: (1.0 + 0.35 * s) * (1.0 + 0.5 * p),
        damage: (1.0 + 0.2 * s) * (1.0 + 0.25 * p),
        speed: 1.0 + 0.05 * s,
        exp: 1.0 + 0.25 * s,
    }
}

/// Un-jittered spawn interval at a point in the stage
pub fn spawn_interval(base: f32, min: f32, progress: f32) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    base + (min - base) * p
}

/// Fraction of the stage timer used up (0-1)
pub fn stage_progress(state: &GameState) -> f32 {
    state
        .tuning
        .stage(state.stage_index)
        .map(|s| (state.stage_elapsed / s.duration).clamp(0.0, 1.0))
        .unwrap_or(1.0)
}

/// Advance the stage clock and spawn what is due
pub fn update_director(state: &mut GameState, dt: f32) {
    state.stage_elapsed += dt;
    let Some(stage) = state.tuning.stage(state.stage_index) else {
        return;
    };
    let (duration, base, min) = (stage.duration, stage.spawn_interval_base, stage.spawn_interval_min);

    if !state.boss_spawned && state.stage_elapsed >= duration {
        spawn_boss(state);
        return;
    }
    if state.boss_id.is_some() {
        return;
    }

    state.spawn_timer -= dt;
    if state.spawn_timer > 0.0 {
        return;
    }
    spawn_monster(state);
    let jitter = state.rng.random_range(INTERVAL_JITTER.0..=INTERVAL_JITTER.1);
    state.spawn_timer = spawn_interval(base, min, stage_progress(state)) * jitter;
}

/// Spawn one monster from the stage pool on the ring around the player
///
/// Returns false when the population cap is reached.
pub fn spawn_monster(state: &mut GameState) -> bool {
    if state.monsters.len() >= state.monster_cap() {
        return false;
    }
    let Some(stage) = state.tuning.stages.get(state.stage_index) else {
        return false;
    };
    let Some(&kind) = stage.monster_pool.choose(&mut state.rng) else {
        return false;
    };
    let Some(base) = state.tuning.monster(kind).cloned() else {
        return false;
    };

    let mult = scaling(state.stage_index, stage_progress(state));
    let pos = random_point_on_annulus(&mut state.rng, state.player.pos, SPAWN_RING_MIN, SPAWN_RING_MAX);
    let hp = base.hp * mult.hp;
    let id = state.next_entity_id();
    state.monsters.push(Monster {
        id,
        kind,
        pos: clamp_to_world(pos, base.radius),
        vel: glam::Vec2::ZERO,
        radius: base.radius,
        hp,
        max_hp: hp,
        speed: base.speed * mult.speed,
        damage: base.damage * mult.damage,
        exp: (base.exp as f32 * mult.exp).round() as u32,
        is_boss: false,
        color: base.color,
        hit_flash: 0.0,
    });
    true
}

/// Summon the stage boss and arm its telegraph timer
pub fn spawn_boss(state: &mut GameState) {
    let Some(cfg) = state.tuning.stage(state.stage_index).map(|s| s.boss.clone()) else {
        return;
    };
    let angle = state.rng.random_range(0.0..std::f32::consts::TAU);
    let pos = clamp_to_world(
        state.player.pos + direction_from_angle(angle) * BOSS_SPAWN_DISTANCE,
        cfg.radius,
    );
    make_room_for_boss(state);
    let id = state.next_entity_id();
    state.monsters.push(Monster {
        id,
        kind: MonsterKind::Boss,
        pos,
        vel: glam::Vec2::ZERO,
        radius: cfg.radius,
        hp: cfg.hp,
        max_hp: cfg.hp,
        speed: cfg.speed,
        damage: cfg.damage,
        exp: cfg.exp,
        is_boss: true,
        color: cfg.color,
        hit_flash: 0.0,
    });
    state.boss_id = Some(id);
    state.boss_spawned = true;
    state.boss_attack_cooldown = roll_cooldown(&mut state.rng, state.stage_index);
    state.feedback.add_shake(12.0);
    state.audio.push(AudioCue::BossSpawn, 1.0);
    log::info!("Boss {} appears on stage {}", cfg.name, state.stage_number());
}

/// Drop the ordinary monsters farthest from the player until the boss fits under the cap
fn make_room_for_boss(state: &mut GameState) {
    let cap = state.monster_cap();
    while state.monsters.len() >= cap {
        let player = state.player.pos;
        let farthest = state
            .monsters
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_boss)
            .max_by(|(_, a), (_, b)| a.pos.distance_squared(player).total_cmp(&b.pos.distance_squared(player)))
            .map(|(idx, _)| idx);
        let Some(idx) = farthest else {
            break;
        };
        state.monsters.swap_remove(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::CharacterKind;

    #[test]
    fn test_scaling_formulas() {
        let s = scaling(0, 0.0);
        assert_eq!(s, Scaling { hp: 1.0, damage: 1.0, speed: 1.0, exp: 1.0 });
        let late = scaling(2, 1.0);
        assert!((late.hp - 1.7 * 1.5).abs() < 1e-5);
        assert!((late.damage - 1.4 * 1.25).abs() < 1e-5);
        assert!((late.speed - 1.1).abs() < 1e-5);
        assert!((late.exp - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_interval_ramps_down() {
        assert_eq!(spawn_interval(0.9, 0.35, 0.0), 0.9);
        assert!((spawn_interval(0.9, 0.35, 1.0) - 0.35).abs() < 1e-6);
        assert!((spawn_interval(0.9, 0.35, 5.0) - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_first_spawn_on_base_interval() {
        let mut state = GameState::new(21, CharacterKind::Knight);
        for _ in 0..17 {
            update_director(&mut state, 0.05);
        }
        assert!(state.monsters.is_empty());
        for _ in 0..2 {
            update_director(&mut state, 0.05);
        }
        assert_eq!(state.monsters.len(), 1);
        let m = &state.monsters[0];
        let dist = m.pos.distance(state.player.pos);
        assert!(dist >= SPAWN_RING_MIN - 1.0 && dist <= SPAWN_RING_MAX + 1.0);
        assert!(matches!(m.kind, MonsterKind::Slime | MonsterKind::Bat));
    }

    #[test]
    fn test_cap_blocks_spawns() {
        let mut state = GameState::new(21, CharacterKind::Knight);
        while spawn_monster(&mut state) {}
        assert_eq!(state.monsters.len(), state.monster_cap());
    }

    #[test]
    fn test_boss_arrives_and_halts_spawns() {
        let mut state = GameState::new(21, CharacterKind::Knight);
        state.stage_elapsed = 64.99;
        update_director(&mut state, 0.05);
        let boss = state.boss().expect("boss spawned");
        assert!((boss.pos.distance(state.player.pos) - BOSS_SPAWN_DISTANCE).abs() < 1.0);
        assert!(state.boss_spawned);
        assert!(state.boss_attack_cooldown >= 3.2);

        let count = state.monsters.len();
        for _ in 0..200 {
            update_director(&mut state, 0.05);
        }
        assert_eq!(state.monsters.len(), count);
    }

    #[test]
    fn test_boss_displaces_farthest_at_cap() {
        let mut state = GameState::new(21, CharacterKind::Knight);
        while spawn_monster(&mut state) {}
        let cap = state.monster_cap();
        let player = state.player.pos;
        let far_id = state
            .monsters
            .iter()
            .max_by(|a, b| a.pos.distance_squared(player).total_cmp(&b.pos.distance_squared(player)))
            .map(|m| m.id)
            .unwrap();

        state.stage_elapsed = 64.99;
        update_director(&mut state, 0.05);
        assert!(state.boss_id.is_some());
        assert_eq!(state.monsters.len(), cap);
        assert!(state.monsters.iter().all(|m| m.id != far_id));
    }
}
