//! Experience, level-ups, and the upgrade draft
//!
//! Every level-up banks a pending choice. While a choice is on offer the
//! session holds gameplay; picking one applies it and, if more level-ups
//! are banked, immediately opens the next draft.

use rand::seq::{IndexedRandom, SliceRandom};
use serde::Serialize;

use super::state::{GameState, SkillKind};
use crate::audio::AudioCue;
use crate::consts::*;
use crate::tuning::AttackStyle;

pub const MAX_PROJECTILE_COUNT: u32 = 8;
pub const MAX_PIERCE: u32 = 6;
pub const MAX_CRIT_CHANCE: f32 = 0.75;
pub const MIN_ATTACK_INTERVAL: f32 = 0.15;

/// Permanent stat boosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatUpgrade {
    Damage,
    AttackSpeed,
    MaxHp,
    MoveSpeed,
    ProjectileCount,
    Pierce,
    CritChance,
    Armor,
    Magnet,
    Range,
}

impl StatUpgrade {
    pub const ALL: [StatUpgrade; 10] = [
        StatUpgrade::Damage,
        StatUpgrade::AttackSpeed,
        StatUpgrade::MaxHp,
        StatUpgrade::MoveSpeed,
        StatUpgrade::ProjectileCount,
        StatUpgrade::Pierce,
        StatUpgrade::CritChance,
        StatUpgrade::Armor,
        StatUpgrade::Magnet,
        StatUpgrade::Range,
    ];
}

/// Identity of an upgrade choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UpgradeId {
    Stat(StatUpgrade),
    Skill(SkillKind),
}

impl UpgradeId {
    /// Display text for the draft card
    pub fn option(self) -> UpgradeOption {
        let (title, description) = match self {
            UpgradeId::Stat(StatUpgrade::Damage) => ("Sharpened Edge", "+15% damage"),
            UpgradeId::Stat(StatUpgrade::AttackSpeed) => ("Quick Hands", "Attack 10% faster"),
            UpgradeId::Stat(StatUpgrade::MaxHp) => ("Vitality", "+20 max HP and heal 20"),
            UpgradeId::Stat(StatUpgrade::MoveSpeed) => ("Fleet Foot", "+8% move speed"),
            UpgradeId::Stat(StatUpgrade::ProjectileCount) => ("Multishot", "+1 projectile"),
            UpgradeId::Stat(StatUpgrade::Pierce) => ("Piercing", "Projectiles pass through +1 enemy"),
            UpgradeId::Stat(StatUpgrade::CritChance) => ("Keen Eye", "+5% critical chance"),
            UpgradeId::Stat(StatUpgrade::Armor) => ("Iron Skin", "+5% damage reduction"),
            UpgradeId::Stat(StatUpgrade::Magnet) => ("Magnetism", "+25% pickup radius"),
            UpgradeId::Stat(StatUpgrade::Range) => ("Long Reach", "+10% attack range"),
            UpgradeId::Skill(SkillKind::Lightning) => ("Chain Lightning", "Bolts strike random nearby foes"),
            UpgradeId::Skill(SkillKind::Blades) => ("Orbiting Blades", "Blades circle and cut nearby foes"),
            UpgradeId::Skill(SkillKind::Laser) => ("Piercing Laser", "A beam burns through a line of foes"),
        };
        UpgradeOption {
            id: self,
            title,
            description,
        }
    }
}

/// One card in the upgrade draft
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UpgradeOption {
    pub id: UpgradeId,
    pub title: &'static str,
    pub description: &'static str,
}

/// Threshold for the level after one at `current`
pub fn next_exp_threshold(current: u32) -> u32 {
    (current as f32 * 1.25 + 5.0).floor() as u32
}

/// Add experience and bank any level-ups it earns
pub fn gain_exp(state: &mut GameState, amount: u32) {
    if amount == 0 || state.phase.is_terminal() {
        return;
    }
    state.player.exp = state.player.exp.saturating_add(amount);
    process_level_ups(state);
}

/// Convert banked experience into level-ups (bounded per call)
///
/// Returns the number of levels gained. Leftover experience is picked up on
/// the next call.
pub fn process_level_ups(state: &mut GameState) -> u32 {
    if state.phase.is_terminal() {
        return 0;
    }
    let mut gained = 0;
    while gained < MAX_LEVEL_UPS_PER_TICK && state.player.exp >= state.player.exp_to_next {
        let player = &mut state.player;
        player.exp -= player.exp_to_next;
        player.exp_to_next = next_exp_threshold(player.exp_to_next);
        player.level += 1;
        state.pending_level_ups += 1;
        gained += 1;
        log::info!("Level up: {}", state.player.level);
    }
    if gained > 0 {
        state.audio.push(AudioCue::LevelUp, 1.0);
        state.feedback.flash(0.4);
        open_choices(state);
    }
    gained
}

fn stat_capped(state: &GameState, stat: StatUpgrade) -> bool {
    let p = &state.player;
    match stat {
        StatUpgrade::AttackSpeed => p.attack_interval <= MIN_ATTACK_INTERVAL,
        StatUpgrade::ProjectileCount => p.projectile_count >= MAX_PROJECTILE_COUNT,
        StatUpgrade::Pierce => p.pierce >= MAX_PIERCE,
        StatUpgrade::CritChance => p.crit_chance >= MAX_CRIT_CHANCE,
        StatUpgrade::Armor => p.armor >= MAX_ARMOR,
        _ => false,
    }
}

/// Stats with no effect on how a style attacks
fn useless_for_style(style: AttackStyle, stat: StatUpgrade) -> bool {
    match style {
        AttackStyle::Melee => matches!(stat, StatUpgrade::ProjectileCount | StatUpgrade::Pierce),
        // Magic bolts burst on first contact
        AttackStyle::AreaCaster => stat == StatUpgrade::Pierce,
        AttackStyle::Ranged => false,
    }
}

/// Stat upgrades the current character can still take
pub fn stat_pool(state: &GameState) -> Vec<StatUpgrade> {
    StatUpgrade::ALL
        .into_iter()
        .filter(|s| !useless_for_style(state.style, *s))
        .filter(|s| !stat_capped(state, *s))
        .collect()
}

/// Skills still below max level
pub fn skill_pool(state: &GameState) -> Vec<SkillKind> {
    SkillKind::ALL
        .into_iter()
        .filter(|k| state.skills.level(*k) < MAX_SKILL_LEVEL)
        .collect()
}

/// Draw up to [`UPGRADE_CHOICES`] distinct options
///
/// A locked skill is guaranteed a slot while any remain.
pub fn draft(state: &mut GameState) -> Vec<UpgradeOption> {
    let skills = skill_pool(state);
    let locked: Vec<SkillKind> = skills
        .iter()
        .copied()
        .filter(|k| state.skills.level(*k) == 0)
        .collect();

    let mut picks: Vec<UpgradeId> = Vec::with_capacity(UPGRADE_CHOICES);
    if let Some(&skill) = locked.choose(&mut state.rng) {
        picks.push(UpgradeId::Skill(skill));
    }

    let mut rest: Vec<UpgradeId> = stat_pool(state)
        .into_iter()
        .map(UpgradeId::Stat)
        .chain(skills.into_iter().map(UpgradeId::Skill))
        .filter(|id| !picks.contains(id))
        .collect();
    rest.shuffle(&mut state.rng);
    picks.extend(rest.into_iter().take(UPGRADE_CHOICES.saturating_sub(picks.len())));

    picks.into_iter().map(UpgradeId::option).collect()
}

/// Open a draft if level-ups are banked and none is showing
pub fn open_choices(state: &mut GameState) {
    if state.pending_level_ups == 0 || !state.offered.is_empty() || state.phase.is_terminal() {
        return;
    }
    state.offered = draft(state);
    if state.offered.is_empty() {
        // Everything maxed: nothing left to choose
        log::debug!("Upgrade pool exhausted, dropping {} level-ups", state.pending_level_ups);
        state.pending_level_ups = 0;
    }
}

/// Take one of the offered upgrades; false if `id` is not on offer
pub fn choose(state: &mut GameState, id: UpgradeId) -> bool {
    if state.phase.is_terminal() || !state.offered.iter().any(|o| o.id == id) {
        log::warn!("Rejected upgrade choice {id:?}");
        return false;
    }
    apply_upgrade(state, id);
    log::debug!("Upgrade chosen: {id:?}");
    state.offered.clear();
    state.pending_level_ups = state.pending_level_ups.saturating_sub(1);
    state.audio.push(AudioCue::Upgrade, 0.8);
    open_choices(state);
    true
}

/// Apply an upgrade's effect to the player
pub fn apply_upgrade(state: &mut GameState, id: UpgradeId) {
    let melee = state.style == AttackStyle::Melee;
    let p = &mut state.player;
    match id {
        UpgradeId::Stat(stat) => match stat {
            StatUpgrade::Damage => p.damage *= 1.15,
            StatUpgrade::AttackSpeed => p.attack_interval = (p.attack_interval * 0.9).max(MIN_ATTACK_INTERVAL),
            StatUpgrade::MaxHp => {
                p.max_hp += 20.0;
                p.heal(20.0);
            }
            StatUpgrade::MoveSpeed => p.speed *= 1.08,
            StatUpgrade::ProjectileCount | StatUpgrade::Pierce if melee => {
                p.damage += MELEE_SUBSTITUTE_DAMAGE;
            }
            StatUpgrade::ProjectileCount => p.projectile_count = (p.projectile_count + 1).min(MAX_PROJECTILE_COUNT),
            StatUpgrade::Pierce => p.pierce = (p.pierce + 1).min(MAX_PIERCE),
            StatUpgrade::CritChance => p.crit_chance = (p.crit_chance + 0.05).min(MAX_CRIT_CHANCE),
            StatUpgrade::Armor => p.armor = (p.armor + 0.05).min(MAX_ARMOR),
            StatUpgrade::Magnet => p.magnet_radius *= 1.25,
            StatUpgrade::Range => p.range *= 1.10,
        },
        UpgradeId::Skill(kind) => {
            let slot = state.skills.slot_mut(kind);
            slot.level = (slot.level + 1).min(MAX_SKILL_LEVEL);
            slot.cooldown = slot.cooldown.min(SKILL_REFRESH_COOLDOWN);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::CharacterKind;
    use std::collections::HashSet;

    #[test]
    fn test_threshold_curve() {
        assert_eq!(next_exp_threshold(10), 17);
        assert_eq!(next_exp_threshold(17), 26);
    }

    #[test]
    fn test_level_up_opens_three_unique_choices() {
        let mut state = GameState::new(4, CharacterKind::Ranger);
        gain_exp(&mut state, 10);
        assert_eq!(state.player.level, 2);
        assert_eq!(state.player.exp, 0);
        assert_eq!(state.player.exp_to_next, 17);
        assert_eq!(state.pending_level_ups, 1);
        assert_eq!(state.offered.len(), UPGRADE_CHOICES);
        let ids: HashSet<_> = state.offered.iter().map(|o| o.id).collect();
        assert_eq!(ids.len(), UPGRADE_CHOICES);
        // Fresh character: a skill unlock is always on the table
        assert!(ids.iter().any(|id| matches!(id, UpgradeId::Skill(_))));
    }

    #[test]
    fn test_level_ups_bounded_per_call() {
        let mut state = GameState::new(4, CharacterKind::Ranger);
        state.player.exp = 1_000_000;
        assert_eq!(process_level_ups(&mut state), MAX_LEVEL_UPS_PER_TICK);
        assert_eq!(state.pending_level_ups, MAX_LEVEL_UPS_PER_TICK);
        assert_eq!(process_level_ups(&mut state), MAX_LEVEL_UPS_PER_TICK);
    }

    #[test]
    fn test_choose_requires_offered_id() {
        let mut state = GameState::new(4, CharacterKind::Ranger);
        assert!(!choose(&mut state, UpgradeId::Stat(StatUpgrade::Damage)));
        gain_exp(&mut state, 10);
        let pick = state.offered[0].id;
        assert!(choose(&mut state, pick));
        assert!(state.offered.is_empty());
        assert_eq!(state.pending_level_ups, 0);
    }

    #[test]
    fn test_pending_choices_reopen() {
        let mut state = GameState::new(4, CharacterKind::Mage);
        gain_exp(&mut state, 27);
        assert_eq!(state.pending_level_ups, 2);
        let pick = state.offered[0].id;
        assert!(choose(&mut state, pick));
        assert_eq!(state.pending_level_ups, 1);
        assert_eq!(state.offered.len(), UPGRADE_CHOICES);
    }

    #[test]
    fn test_melee_pool_and_substitution() {
        let mut state = GameState::new(4, CharacterKind::Knight);
        let pool = stat_pool(&state);
        assert!(!pool.contains(&StatUpgrade::ProjectileCount));
        assert!(!pool.contains(&StatUpgrade::Pierce));
        let dmg = state.player.damage;
        apply_upgrade(&mut state, UpgradeId::Stat(StatUpgrade::Pierce));
        assert_eq!(state.player.damage, dmg + MELEE_SUBSTITUTE_DAMAGE);
        assert_eq!(state.player.pierce, 0);
    }

    #[test]
    fn test_caster_never_drafts_pierce() {
        let mut state = GameState::new(9, CharacterKind::Mage);
        let pool = stat_pool(&state);
        assert!(!pool.contains(&StatUpgrade::Pierce));
        assert!(pool.contains(&StatUpgrade::ProjectileCount));
        for _ in 0..50 {
            let offered = draft(&mut state);
            assert!(offered.iter().all(|o| o.id != UpgradeId::Stat(StatUpgrade::Pierce)));
        }
    }

    #[test]
    fn test_stat_caps() {
        let mut state = GameState::new(4, CharacterKind::Ranger);
        for _ in 0..20 {
            apply_upgrade(&mut state, UpgradeId::Stat(StatUpgrade::Armor));
            apply_upgrade(&mut state, UpgradeId::Stat(StatUpgrade::ProjectileCount));
            apply_upgrade(&mut state, UpgradeId::Stat(StatUpgrade::AttackSpeed));
        }
        assert_eq!(state.player.armor, MAX_ARMOR);
        assert_eq!(state.player.projectile_count, MAX_PROJECTILE_COUNT);
        assert_eq!(state.player.attack_interval, MIN_ATTACK_INTERVAL);
        let pool = stat_pool(&state);
        assert!(!pool.contains(&StatUpgrade::Armor));
        assert!(!pool.contains(&StatUpgrade::ProjectileCount));
    }

    #[test]
    fn test_max_hp_heals() {
        let mut state = GameState::new(4, CharacterKind::Ranger);
        state.player.hp = 50.0;
        apply_upgrade(&mut state, UpgradeId::Stat(StatUpgrade::MaxHp));
        assert_eq!(state.player.max_hp, 120.0);
        assert_eq!(state.player.hp, 70.0);
    }

    #[test]
    fn test_skill_upgrade_levels_and_refreshes() {
        let mut state = GameState::new(4, CharacterKind::Ranger);
        state.skills.laser.cooldown = 2.0;
        for _ in 0..12 {
            apply_upgrade(&mut state, UpgradeId::Skill(SkillKind::Laser));
        }
        assert_eq!(state.skills.laser.level, MAX_SKILL_LEVEL);
        assert_eq!(state.skills.laser.cooldown, SKILL_REFRESH_COOLDOWN);
        assert!(!skill_pool(&state).contains(&SkillKind::Laser));
    }
}
