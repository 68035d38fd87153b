//! Boss telegraphs
//!
//! While a boss lives it forewarns attacks as shapes on the ground. Each
//! telegraph counts down and resolves exactly once against wherever the
//! player stands at that moment, then disappears. A new one is only
//! scheduled while none is pending.

use glam::Vec2;
use rand::Rng;

use super::geometry::{distance_to_segment, in_sector, weighted_pick};
use super::state::{BossTelegraph, GameState, TelegraphKind, TelegraphShape};
use crate::angle_of;
use crate::audio::AudioCue;
use crate::consts::TELEGRAPH_INVINCIBILITY;

pub const LINE_LENGTH: f32 = 900.0;
pub const LINE_HALF_WIDTH: f32 = 38.0;
pub const CONE_RANGE: f32 = 420.0;
pub const CONE_HALF_SPAN: f32 = 0.45;

/// Cooldown bounds between telegraphs for a stage
pub fn cooldown_range(stage_index: usize) -> (f32, f32) {
    let s = stage_index as f32;
    let lo = (3.2 - 0.3 * s).max(1.4);
    let hi = (4.6 - 0.35 * s).max(2.0);
    (lo, hi.max(lo))
}

pub fn roll_cooldown<R: Rng>(rng: &mut R, stage_index: usize) -> f32 {
    let (lo, hi) = cooldown_range(stage_index);
    if hi > lo { rng.random_range(lo..=hi) } else { lo }
}

/// Attack patterns unlocked at a stage, with roll weights
pub fn kind_weights(stage_index: usize) -> &'static [(TelegraphKind, f32)] {
    match stage_index {
        0 | 1 => &[(TelegraphKind::Circle, 1.0)],
        2 => &[(TelegraphKind::Circle, 0.6), (TelegraphKind::Line, 0.4)],
        _ => &[
            (TelegraphKind::Circle, 0.4),
            (TelegraphKind::Line, 0.3),
            (TelegraphKind::Cone, 0.3),
        ],
    }
}

/// Build a telegraph aimed at the player from the boss
pub fn build(kind: TelegraphKind, stage_index: usize, boss_pos: Vec2, player_pos: Vec2, id: u32) -> BossTelegraph {
    let s = stage_index as f32;
    let aim = angle_of(player_pos - boss_pos);
    let dir = (player_pos - boss_pos).normalize_or_zero();
    let dir = if dir == Vec2::ZERO { Vec2::X } else { dir };

    let (shape, life, damage, armor_factor) = match kind {
        TelegraphKind::Circle => (
            TelegraphShape::Circle {
                center: player_pos,
                radius: 110.0 + 10.0 * s,
            },
            1.2,
            28.0 + 6.0 * s,
            0.65,
        ),
        TelegraphKind::Line => (
            TelegraphShape::Line {
                start: boss_pos,
                end: boss_pos + dir * LINE_LENGTH,
                half_width: LINE_HALF_WIDTH,
            },
            0.9,
            34.0 + 7.0 * s,
            1.0,
        ),
        TelegraphKind::Cone => (
            TelegraphShape::Cone {
                origin: boss_pos,
                facing: aim,
                half_span: CONE_HALF_SPAN,
                range: CONE_RANGE,
            },
            1.0,
            30.0 + 6.0 * s,
            1.0,
        ),
    };
    BossTelegraph {
        id,
        kind,
        shape,
        life,
        max_life: life,
        damage,
        armor_factor,
        resolved: false,
    }
}

/// Whether `point` lies inside the telegraphed area
pub fn contains(shape: &TelegraphShape, point: Vec2) -> bool {
    match *shape {
        TelegraphShape::Circle { center, radius } => point.distance(center) <= radius,
        TelegraphShape::Line { start, end, half_width } => distance_to_segment(point, start, end) <= half_width,
        TelegraphShape::Cone {
            origin,
            facing,
            half_span,
            range,
        } => in_sector(point, origin, facing, half_span, range),
    }
}

/// Count down, resolve, and schedule boss telegraphs
pub fn update_telegraphs(state: &mut GameState, dt: f32) {
    let Some(boss_pos) = state.boss().map(|b| b.pos) else {
        state.telegraphs.clear();
        return;
    };

    let mut due = Vec::new();
    for telegraph in state.telegraphs.iter_mut() {
        telegraph.life -= dt;
        if telegraph.life <= 0.0 && !telegraph.resolved {
            telegraph.resolved = true;
            due.push(telegraph.clone());
        }
    }
    state.telegraphs.retain(|t| !t.resolved);
    if !due.is_empty() {
        for telegraph in &due {
            resolve(state, telegraph);
        }
        state.boss_attack_cooldown = roll_cooldown(&mut state.rng, state.stage_index);
    }

    if !state.phase.is_terminal() && state.telegraphs.is_empty() {
        state.boss_attack_cooldown -= dt;
        if state.boss_attack_cooldown <= 0.0 {
            emit(state, boss_pos);
        }
    }
}

fn emit(state: &mut GameState, boss_pos: Vec2) {
    let kind = weighted_pick(&mut state.rng, kind_weights(state.stage_index)).unwrap_or(TelegraphKind::Circle);
    let id = state.next_entity_id();
    let telegraph = build(kind, state.stage_index, boss_pos, state.player.pos, id);
    log::debug!("Boss telegraph {kind:?} (id={id}, {:.1}s warning)", telegraph.life);
    state.telegraphs.push(telegraph);
    state.audio.push(AudioCue::BossWarning, 0.8);
}

fn resolve(state: &mut GameState, telegraph: &BossTelegraph) {
    let hit = contains(&telegraph.shape, state.player.pos);
    let landed = hit && {
        let armor = state.player.armor * telegraph.armor_factor;
        let amount = telegraph.damage * (1.0 - armor);
        state.hurt_player(amount, TELEGRAPH_INVINCIBILITY)
    };
    log::debug!("Telegraph {} resolved ({:?}, hit={landed})", telegraph.id, telegraph.kind);
    state.feedback.add_shake(if landed { 14.0 } else { 8.0 });
    state.audio.push(AudioCue::BossSlam, if landed { 1.0 } else { 0.6 });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::director::spawn_boss;
    use crate::sim::state::GamePhase;
    use crate::tuning::CharacterKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_cooldown_range_floors() {
        assert_eq!(cooldown_range(0), (3.2, 4.6));
        assert_eq!(cooldown_range(10), (1.4, 2.0));
        let mut rng = Pcg32::seed_from_u64(3);
        for stage in 0..5 {
            let (lo, hi) = cooldown_range(stage);
            let cd = roll_cooldown(&mut rng, stage);
            assert!(cd >= lo && cd <= hi);
        }
    }

    #[test]
    fn test_kind_gating() {
        assert_eq!(kind_weights(1).len(), 1);
        assert!(kind_weights(2).iter().all(|(k, _)| *k != TelegraphKind::Cone));
        assert_eq!(kind_weights(4).len(), 3);
    }

    #[test]
    fn test_shapes_contain() {
        let boss = Vec2::new(0.0, 0.0);
        let player = Vec2::new(200.0, 0.0);
        let circle = build(TelegraphKind::Circle, 0, boss, player, 1);
        assert!(contains(&circle.shape, player + Vec2::new(100.0, 0.0)));
        assert!(!contains(&circle.shape, player + Vec2::new(120.0, 0.0)));

        let line = build(TelegraphKind::Line, 2, boss, player, 2);
        assert!(contains(&line.shape, Vec2::new(800.0, 30.0)));
        assert!(!contains(&line.shape, Vec2::new(800.0, 50.0)));
        assert!(!contains(&line.shape, Vec2::new(-100.0, 0.0)));

        let cone = build(TelegraphKind::Cone, 3, boss, player, 3);
        assert!(contains(&cone.shape, Vec2::new(300.0, 100.0)));
        assert!(!contains(&cone.shape, Vec2::new(300.0, 200.0)));
        assert!(!contains(&cone.shape, Vec2::new(500.0, 0.0)));
    }

    #[test]
    fn test_no_boss_clears_telegraphs() {
        let mut state = GameState::new(1, CharacterKind::Knight);
        let id = state.next_entity_id();
        let t = build(TelegraphKind::Circle, 0, Vec2::ZERO, state.player.pos, id);
        state.telegraphs.push(t);
        update_telegraphs(&mut state, 0.016);
        assert!(state.telegraphs.is_empty());
    }

    #[test]
    fn test_resolves_exactly_once() {
        let mut state = GameState::new(1, CharacterKind::Knight);
        spawn_boss(&mut state);
        state.boss_attack_cooldown = 0.0;
        update_telegraphs(&mut state, 0.01);
        assert_eq!(state.telegraphs.len(), 1);
        let hp = state.player.hp;

        let mut slams = 0;
        for _ in 0..200 {
            update_telegraphs(&mut state, 0.01);
            slams += state
                .drain_audio()
                .iter()
                .filter(|e| e.cue == AudioCue::BossSlam)
                .count();
            if state.telegraphs.is_empty() {
                break;
            }
        }
        assert_eq!(slams, 1);
        assert!(state.player.hp < hp);
        assert!(state.boss_attack_cooldown >= 1.4);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_armor_factor_applies() {
        let mut state = GameState::new(1, CharacterKind::Ranger);
        spawn_boss(&mut state);
        state.player.armor = 0.5;
        let id = state.next_entity_id();
        let mut t = build(TelegraphKind::Circle, 0, Vec2::ZERO, state.player.pos, id);
        t.life = 0.0;
        state.telegraphs.push(t);
        update_telegraphs(&mut state, 0.0);
        let expected = 100.0 - 28.0 * (1.0 - 0.5 * 0.65);
        assert!((state.player.hp - expected).abs() < 1e-3);
        assert_eq!(state.player.invincible, TELEGRAPH_INVINCIBILITY);
    }
}
