//! Combat resolution
//!
//! Player auto-attacks, the shared damage roll, knockback, and turning dead
//! monsters into gems (or, for the boss, into stage progression).

use glam::Vec2;
use rand::Rng;

use super::geometry::clamp_to_world;
use super::state::{GameState, Projectile, ProjectileKind};
use super::tick::on_boss_defeated;
use crate::audio::AudioCue;
use crate::consts::*;
use crate::tuning::AttackStyle;
use crate::{angle_of, direction_from_angle};

pub const SLASH_SPEED: f32 = 520.0;
pub const SLASH_RADIUS: f32 = 34.0;
pub const SLASH_LIFE: f32 = 0.6;
pub const ARROW_SPEED: f32 = 820.0;
pub const ARROW_RADIUS: f32 = 6.0;
pub const ARROW_LIFE: f32 = 1.1;
pub const MAGIC_SPEED: f32 = 460.0;
pub const MAGIC_RADIUS: f32 = 10.0;
pub const MAGIC_LIFE: f32 = 1.4;
pub const MAGIC_AOE_RADIUS: f32 = 70.0;
/// Random aim error per ranged shot (radians, ±)
pub const AIM_JITTER: f32 = 0.06;

/// Outcome of one damage application
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    pub crit: bool,
    pub killed: bool,
}

/// Roll final damage: base × band × optional crit
pub fn roll_damage<R: Rng>(rng: &mut R, base: f32, crit_chance: f32) -> (f32, bool) {
    let band = rng.random_range(DAMAGE_ROLL_MIN..=DAMAGE_ROLL_MAX);
    let crit = rng.random::<f32>() < crit_chance.clamp(0.0, 1.0);
    let mult = if crit { CRIT_MULTIPLIER } else { 1.0 };
    (base.max(0.0) * band * mult, crit)
}

/// Damage the monster at `idx`, knocking it away from the player
///
/// Dead monsters stay in the list until [`reap_dead_monsters`] runs, so
/// indices remain valid for the rest of the tick. Returns `None` when the
/// monster was already dead.
pub fn damage_monster(state: &mut GameState, idx: usize, base: f32, crit_chance: f32) -> Option<HitResult> {
    if !state.monsters.get(idx)?.is_alive() {
        return None;
    }
    let (damage, crit) = roll_damage(&mut state.rng, base, crit_chance);
    let player_pos = state.player.pos;

    let monster = &mut state.monsters[idx];
    monster.hp = (monster.hp - damage).max(0.0);
    monster.hit_flash = 1.0;
    let away = (monster.pos - player_pos).normalize_or_zero();
    let push = if monster.is_boss {
        KNOCKBACK * BOSS_KNOCKBACK_SCALE
    } else {
        KNOCKBACK
    };
    monster.pos = clamp_to_world(monster.pos + away * push, monster.radius);
    let killed = monster.hp <= 0.0;
    let pos = monster.pos;
    let color = monster.color;

    state.push_damage_text(pos, damage, crit);
    state.emit_burst(pos, color, if crit { 5 } else { 3 }, 140.0);
    if crit {
        state.feedback.flash(0.3);
        state.feedback.add_hit_stop(0.035);
        state.feedback.add_shake(5.0);
        state.audio.push(AudioCue::Crit, 0.8);
    } else {
        state.feedback.flash(0.12);
        state.feedback.add_hit_stop(0.012);
        state.feedback.add_shake(2.0);
    }
    Some(HitResult { crit, killed })
}

/// Indices of live monsters nearest to `origin`, closest first
///
/// Ties break by id so the order never depends on vector layout.
pub fn nearest_monsters(state: &GameState, origin: Vec2, max_range: Option<f32>, limit: usize) -> Vec<usize> {
    if limit == 0 {
        return Vec::new();
    }
    let mut found: Vec<(usize, f32, u32)> = state
        .monsters
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_alive())
        .map(|(i, m)| (i, m.pos.distance_squared(origin), m.id))
        .filter(|(_, d2, _)| max_range.is_none_or(|r| *d2 <= r * r))
        .collect();
    found.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)));
    found.truncate(limit);
    found.into_iter().map(|(i, _, _)| i).collect()
}

/// Count down the attack timer and fire when ready
pub fn update_auto_attack(state: &mut GameState, dt: f32) {
    let player = &mut state.player;
    player.attack_cooldown = (player.attack_cooldown - dt).max(0.0);
    if player.attack_cooldown > 0.0 {
        return;
    }
    if !state.monsters.iter().any(|m| m.is_alive()) {
        return;
    }
    let fired = match state.style {
        AttackStyle::Melee => fire_melee(state),
        AttackStyle::Ranged => fire_volley(state, false),
        AttackStyle::AreaCaster => fire_volley(state, true),
    };
    if fired {
        state.player.attack_cooldown = state.player.attack_interval;
    }
}

fn fire_melee(state: &mut GameState) -> bool {
    let origin = state.player.pos;
    let Some(&target) = nearest_monsters(state, origin, None, 1).first() else {
        return false;
    };
    let aim = angle_of(state.monsters[target].pos - origin);
    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        kind: ProjectileKind::Slash,
        pos: origin,
        vel: direction_from_angle(aim) * SLASH_SPEED,
        radius: SLASH_RADIUS,
        damage: state.player.damage,
        life: SLASH_LIFE,
        max_life: SLASH_LIFE,
        pierce: PIERCE_UNLIMITED,
        crit_chance: state.player.crit_chance,
        angle: aim,
        hit_ids: Vec::new(),
    });
    state.push_slash(origin, aim, state.player.range * 0.5);
    face_toward(state, aim);
    state.audio.push(AudioCue::Slash, 0.6);
    true
}

fn fire_volley(state: &mut GameState, magic: bool) -> bool {
    let origin = state.player.pos;
    let shots = state.player.projectile_count.max(1) as usize;
    let reach = state.player.range * EXTENDED_RANGE_FACTOR;
    let targets = nearest_monsters(state, origin, Some(reach), shots);
    if targets.is_empty() {
        return false;
    }
    let (kind, speed, radius, life, pierce) = if magic {
        (
            ProjectileKind::Magic {
                aoe_radius: MAGIC_AOE_RADIUS,
            },
            MAGIC_SPEED,
            MAGIC_RADIUS,
            MAGIC_LIFE,
            0,
        )
    } else {
        (ProjectileKind::Arrow, ARROW_SPEED, ARROW_RADIUS, ARROW_LIFE, state.player.pierce)
    };

    let mut last_aim = 0.0;
    for shot in 0..shots {
        let target_pos = state.monsters[targets[shot % targets.len()]].pos;
        let jitter = state.rng.random_range(-AIM_JITTER..=AIM_JITTER);
        let aim = angle_of(target_pos - origin) + jitter;
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            kind,
            pos: origin,
            vel: direction_from_angle(aim) * speed,
            radius,
            damage: state.player.damage,
            life,
            max_life: life,
            pierce,
            crit_chance: state.player.crit_chance,
            angle: aim,
            hit_ids: Vec::new(),
        });
        last_aim = aim;
    }
    face_toward(state, last_aim);
    state.audio.push(AudioCue::Shoot, (0.4 + 0.1 * shots as f32).min(1.0));
    true
}

fn face_toward(state: &mut GameState, aim: f32) {
    let x = aim.cos();
    if x.abs() > 0.01 {
        state.player.facing = x.signum();
    }
}

/// Damage every live monster within `radius` of `center` except `skip_id`
pub fn splash_damage(state: &mut GameState, center: Vec2, radius: f32, base: f32, crit_chance: f32, skip_id: u32) {
    let victims: Vec<usize> = state
        .monsters
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_alive() && m.id != skip_id)
        .filter(|(_, m)| m.pos.distance(center) <= radius + m.radius)
        .map(|(i, _)| i)
        .collect();
    for idx in victims {
        damage_monster(state, idx, base, crit_chance);
    }
    state.emit_burst(center, 0xb388ff, 10, 220.0);
    state.feedback.add_shake(4.0);
    state.audio.push(AudioCue::Explosion, 0.7);
}

/// Remove dead monsters: gems for the rank and file, progression for the boss
pub fn reap_dead_monsters(state: &mut GameState) {
    if state.monsters.iter().all(|m| m.is_alive()) {
        return;
    }
    let (dead, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut state.monsters)
        .into_iter()
        .partition(|m| !m.is_alive());
    state.monsters = alive;

    let mut boss = None;
    for monster in dead {
        if monster.is_boss {
            boss = Some(monster);
            continue;
        }
        state.register_kill();
        state.spawn_gem(monster.pos, monster.exp);
        state.emit_burst(monster.pos, monster.color, 8, 180.0);
        state.feedback.add_hit_stop(0.02);
        let combo_bonus = (state.combo as f32 / 50.0).min(0.5);
        state.audio.push(AudioCue::Kill, 0.5 + combo_bonus);
    }
    if let Some(boss) = boss {
        on_boss_defeated(state, &boss);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Monster;
    use crate::tuning::{CharacterKind, MonsterKind};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn add_monster(state: &mut GameState, pos: Vec2, hp: f32) -> u32 {
        let id = state.next_entity_id();
        state.monsters.push(Monster {
            id,
            kind: MonsterKind::Slime,
            pos,
            vel: Vec2::ZERO,
            radius: 14.0,
            hp,
            max_hp: hp,
            speed: 0.0,
            damage: 5.0,
            exp: 3,
            is_boss: false,
            color: 0x00ff00,
            hit_flash: 0.0,
        });
        id
    }

    #[test]
    fn test_roll_damage_band() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..200 {
            let (dmg, crit) = roll_damage(&mut rng, 10.0, 0.0);
            assert!(!crit);
            assert!((9.0..=11.0 + 1e-4).contains(&dmg));
        }
        let (dmg, crit) = roll_damage(&mut rng, 10.0, 1.0);
        assert!(crit);
        assert!(dmg >= 9.0 * CRIT_MULTIPLIER - 1e-3);
    }

    #[test]
    fn test_nearest_monsters_sorted() {
        let mut state = GameState::new(2, CharacterKind::Ranger);
        let p = state.player.pos;
        add_monster(&mut state, p + Vec2::new(300.0, 0.0), 10.0);
        add_monster(&mut state, p + Vec2::new(100.0, 0.0), 10.0);
        add_monster(&mut state, p + Vec2::new(200.0, 0.0), 0.0);
        let near = nearest_monsters(&state, p, None, 5);
        assert_eq!(near, vec![1, 0]);
        let limited = nearest_monsters(&state, p, Some(150.0), 5);
        assert_eq!(limited, vec![1]);
    }

    #[test]
    fn test_knockback_pushes_away() {
        let mut state = GameState::new(2, CharacterKind::Knight);
        let p = state.player.pos;
        add_monster(&mut state, p + Vec2::new(50.0, 0.0), 1000.0);
        let hit = damage_monster(&mut state, 0, 10.0, 0.0).expect("alive");
        assert!(!hit.killed);
        assert!((state.monsters[0].pos.x - (p.x + 50.0 + KNOCKBACK)).abs() < 1e-3);
        assert!(state.monsters[0].hp < 1000.0);
    }

    #[test]
    fn test_ranged_volley_cycles_targets() {
        let mut state = GameState::new(4, CharacterKind::Ranger);
        state.player.projectile_count = 3;
        state.player.attack_cooldown = 0.0;
        let p = state.player.pos;
        add_monster(&mut state, p + Vec2::new(120.0, 0.0), 50.0);
        update_auto_attack(&mut state, 0.016);
        assert_eq!(state.projectiles.len(), 3);
        assert!(state.projectiles.iter().all(|pr| pr.kind == ProjectileKind::Arrow));
        assert_eq!(state.player.attack_cooldown, state.player.attack_interval);
    }

    #[test]
    fn test_melee_fires_single_unlimited_slash() {
        let mut state = GameState::new(4, CharacterKind::Knight);
        state.player.attack_cooldown = 0.0;
        let p = state.player.pos;
        add_monster(&mut state, p + Vec2::new(-900.0, 0.0), 50.0);
        update_auto_attack(&mut state, 0.016);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].pierce, PIERCE_UNLIMITED);
        assert_eq!(state.slashes.len(), 1);
        assert_eq!(state.player.facing, -1.0);
    }

    #[test]
    fn test_no_attack_without_targets() {
        let mut state = GameState::new(4, CharacterKind::Mage);
        state.player.attack_cooldown = 0.0;
        update_auto_attack(&mut state, 0.016);
        assert!(state.projectiles.is_empty());
        // Out of reach: caster holds fire
        let p = state.player.pos;
        add_monster(&mut state, p + Vec2::new(1000.0, 0.0), 50.0);
        update_auto_attack(&mut state, 0.016);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.player.attack_cooldown, 0.0);
    }

    #[test]
    fn test_reap_drops_gem_and_counts_combo() {
        let mut state = GameState::new(4, CharacterKind::Mage);
        let p = state.player.pos;
        add_monster(&mut state, p + Vec2::new(300.0, 0.0), 0.0);
        add_monster(&mut state, p + Vec2::new(400.0, 0.0), 5.0);
        reap_dead_monsters(&mut state);
        assert_eq!(state.monsters.len(), 1);
        assert_eq!(state.gems.len(), 1);
        assert_eq!(state.gems[0].value, 3);
        assert_eq!(state.kills, 1);
        assert_eq!(state.combo, 1);
    }
}
