//! Game state and core simulation types
//!
//! Everything a session mutates lives in [`GameState`]. Sub-systems receive it
//! by `&mut` for the duration of a tick; nothing is global.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::feedback::{Camera, Feedback};
use super::geometry::clamp_to_world;
use super::progression::UpgradeOption;
use crate::audio::{AudioCue, AudioQueue};
use crate::consts::*;
use crate::settings::Settings;
use crate::tuning::{AttackStyle, CharacterConfig, CharacterKind, MonsterKind, Tuning};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Active gameplay (gates may still hold the simulation)
    Playing,
    /// Frozen by the player
    Paused,
    /// Player died (terminal)
    GameOver,
    /// Final boss defeated (terminal)
    Victory,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }
}

/// The player character
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    pub damage: f32,
    /// Seconds between auto-attacks
    pub attack_interval: f32,
    pub attack_cooldown: f32,
    pub range: f32,
    pub projectile_count: u32,
    pub crit_chance: f32,
    /// Fractional damage reduction (0-1)
    pub armor: f32,
    pub magnet_radius: f32,
    pub pierce: u32,
    pub exp: u32,
    pub exp_to_next: u32,
    pub level: u32,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub last_move_dir: Vec2,
    /// Remaining invincibility (seconds)
    pub invincible: f32,
    /// Current speed / max speed (for animation)
    pub speed_ratio: f32,
    pub moving: bool,
}

impl Player {
    pub fn from_config(cfg: &CharacterConfig, pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            hp: cfg.max_hp,
            max_hp: cfg.max_hp,
            speed: cfg.speed,
            damage: cfg.damage,
            attack_interval: cfg.attack_interval,
            attack_cooldown: cfg.attack_interval,
            range: cfg.range,
            projectile_count: cfg.projectile_count.max(1),
            crit_chance: cfg.crit_chance,
            armor: cfg.armor.clamp(0.0, MAX_ARMOR),
            magnet_radius: cfg.magnet_radius,
            pierce: cfg.pierce,
            exp: 0,
            exp_to_next: BASE_EXP_TO_NEXT,
            level: 1,
            facing: 1.0,
            last_move_dir: Vec2::X,
            invincible: 0.0,
            speed_ratio: 0.0,
            moving: false,
        }
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.invincible > 0.0
    }

    /// Restore hp without exceeding max
    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount.max(0.0)).min(self.max_hp);
    }
}

/// A hostile entity
#[derive(Debug, Clone, Serialize)]
pub struct Monster {
    pub id: u32,
    pub kind: MonsterKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    /// Contact damage
    pub damage: f32,
    pub exp: u32,
    pub is_boss: bool,
    pub color: u32,
    /// White flash after being hit (cosmetic, decays)
    pub hit_flash: f32,
}

impl Monster {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }
}

/// Projectile flavors
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ProjectileKind {
    /// Melee sweep
    Slash,
    Arrow,
    /// Explodes on impact
    Magic { aoe_radius: f32 },
}

/// A player projectile
#[derive(Debug, Clone, Serialize)]
pub struct Projectile {
    pub id: u32,
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub life: f32,
    pub max_life: f32,
    /// Extra monsters this projectile may still hit
    pub pierce: u32,
    pub crit_chance: f32,
    pub angle: f32,
    /// Monsters already struck (never hit twice)
    #[serde(skip)]
    pub hit_ids: Vec<u32>,
}

/// An experience drop
#[derive(Debug, Clone, Serialize)]
pub struct Gem {
    pub id: u32,
    pub pos: Vec2,
    pub value: u32,
    pub radius: f32,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
}

/// Floating damage number
#[derive(Debug, Clone, Serialize)]
pub struct DamageText {
    pub id: u32,
    pub pos: Vec2,
    pub amount: f32,
    pub crit: bool,
    pub life: f32,
    pub max_life: f32,
}

/// Melee sweep arc drawn at the player
#[derive(Debug, Clone, Serialize)]
pub struct SlashEffect {
    pub id: u32,
    pub pos: Vec2,
    pub angle: f32,
    pub radius: f32,
    pub life: f32,
    pub max_life: f32,
}

/// Laser beam visual
#[derive(Debug, Clone, Serialize)]
pub struct BeamEffect {
    pub id: u32,
    pub start: Vec2,
    pub end: Vec2,
    pub width: f32,
    pub life: f32,
    pub max_life: f32,
}

/// Lightning bolt visual
#[derive(Debug, Clone, Serialize)]
pub struct LightningEffect {
    pub id: u32,
    pub from: Vec2,
    pub to: Vec2,
    pub life: f32,
    pub max_life: f32,
}

/// Boss attack pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TelegraphKind {
    Circle,
    Line,
    Cone,
}

/// Hit area of a telegraph
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TelegraphShape {
    Circle { center: Vec2, radius: f32 },
    Line { start: Vec2, end: Vec2, half_width: f32 },
    Cone { origin: Vec2, facing: f32, half_span: f32, range: f32 },
}

/// A forewarned boss attack
#[derive(Debug, Clone, Serialize)]
pub struct BossTelegraph {
    pub id: u32,
    pub kind: TelegraphKind,
    pub shape: TelegraphShape,
    /// Warning time left; resolves when this reaches zero
    pub life: f32,
    pub max_life: f32,
    pub damage: f32,
    /// How much of the player's armor applies (0-1)
    pub armor_factor: f32,
    pub resolved: bool,
}

/// Optional skills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SkillKind {
    Lightning,
    Blades,
    Laser,
}

impl SkillKind {
    pub const ALL: [SkillKind; 3] = [SkillKind::Lightning, SkillKind::Blades, SkillKind::Laser];
}

/// Level and cooldown for one skill
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SkillSlot {
    /// 0 = locked
    pub level: u8,
    pub cooldown: f32,
}

/// All skill slots plus the shared blade rotation
#[derive(Debug, Clone, Default, Serialize)]
pub struct Skills {
    pub lightning: SkillSlot,
    pub blades: SkillSlot,
    pub laser: SkillSlot,
    /// Current blade ring rotation (radians)
    pub blade_angle: f32,
}

impl Skills {
    pub fn slot(&self, kind: SkillKind) -> &SkillSlot {
        match kind {
            SkillKind::Lightning => &self.lightning,
            SkillKind::Blades => &self.blades,
            SkillKind::Laser => &self.laser,
        }
    }

    pub fn slot_mut(&mut self, kind: SkillKind) -> &mut SkillSlot {
        match kind {
            SkillKind::Lightning => &mut self.lightning,
            SkillKind::Blades => &mut self.blades,
            SkillKind::Laser => &mut self.laser,
        }
    }

    pub fn level(&self, kind: SkillKind) -> u8 {
        self.slot(kind).level
    }
}

/// Stage-clear wait after a boss falls
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StageClear {
    /// Seconds since the boss died
    pub elapsed: f32,
}

impl StageClear {
    /// Whether an explicit advance request would be honored (ignores level-ups)
    pub fn grace_elapsed(&self) -> bool {
        self.elapsed >= STAGE_CLEAR_READY_DELAY
    }
}

/// Push onto a bounded deque, evicting the oldest entries first
pub fn push_capped<T>(items: &mut VecDeque<T>, item: T, cap: usize) {
    if cap == 0 {
        return;
    }
    while items.len() >= cap {
        items.pop_front();
    }
    items.push_back(item);
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub character: CharacterKind,
    pub style: AttackStyle,
    pub tuning: Tuning,
    pub settings: Settings,
    pub phase: GamePhase,
    pub player: Player,
    pub monsters: Vec<Monster>,
    pub projectiles: Vec<Projectile>,
    pub gems: Vec<Gem>,
    pub telegraphs: Vec<BossTelegraph>,
    /// Visual-only records (not gameplay-affecting)
    pub particles: VecDeque<Particle>,
    pub damage_texts: VecDeque<DamageText>,
    pub slashes: VecDeque<SlashEffect>,
    pub beams: VecDeque<BeamEffect>,
    pub lightning: VecDeque<LightningEffect>,
    pub skills: Skills,
    /// Current stage (0-based)
    pub stage_index: usize,
    pub stage_elapsed: f32,
    pub spawn_timer: f32,
    pub boss_spawned: bool,
    pub boss_id: Option<u32>,
    pub boss_attack_cooldown: f32,
    pub stage_clear: Option<StageClear>,
    /// Level-ups whose upgrade has not been chosen yet
    pub pending_level_ups: u32,
    /// Upgrade choices currently on offer (empty = gate closed)
    pub offered: Vec<UpgradeOption>,
    pub kills: u32,
    pub combo: u32,
    pub best_combo: u32,
    /// Total simulated gameplay seconds
    pub elapsed: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub feedback: Feedback,
    pub camera: Camera,
    pub audio: AudioQueue,
    /// Gameplay RNG
    pub(crate) rng: Pcg32,
    /// Cosmetic RNG (never consulted by gameplay)
    pub(crate) fx_rng: Pcg32,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new session with the shipped balance and default settings
    pub fn new(seed: u64, character: CharacterKind) -> Self {
        Self::with_config(seed, character, Tuning::default(), Settings::default())
    }

    /// Create a new session with explicit balance data and settings
    ///
    /// Invalid tuning is replaced by the defaults rather than failing.
    pub fn with_config(seed: u64, character: CharacterKind, tuning: Tuning, settings: Settings) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(err) => {
                log::warn!("Rejected tuning ({err}), falling back to defaults");
                Tuning::default()
            }
        };
        let cfg = tuning
            .character(character)
            .cloned()
            .unwrap_or_else(|| crate::tuning::default_character(character));
        let start = Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0);
        let player = Player::from_config(&cfg, start);
        let style = cfg.style;
        let first_interval = tuning.stages[0].spawn_interval_base;

        log::info!(
            "New session: seed={seed}, character={}, style={style:?}",
            character.as_str()
        );

        Self {
            seed,
            character,
            style,
            phase: GamePhase::Playing,
            player,
            monsters: Vec::new(),
            projectiles: Vec::new(),
            gems: Vec::new(),
            telegraphs: Vec::new(),
            particles: VecDeque::new(),
            damage_texts: VecDeque::new(),
            slashes: VecDeque::new(),
            beams: VecDeque::new(),
            lightning: VecDeque::new(),
            skills: Skills::default(),
            stage_index: 0,
            stage_elapsed: 0.0,
            spawn_timer: first_interval,
            boss_spawned: false,
            boss_id: None,
            boss_attack_cooldown: 0.0,
            stage_clear: None,
            pending_level_ups: 0,
            offered: Vec::new(),
            kills: 0,
            combo: 0,
            best_combo: 0,
            elapsed: 0.0,
            time_ticks: 0,
            feedback: Feedback::default(),
            camera: Camera::new(start),
            audio: AudioQueue::new(),
            rng: Pcg32::seed_from_u64(seed),
            fx_rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
            next_id: 1,
            tuning,
            settings,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// 1-based stage number for display
    pub fn stage_number(&self) -> usize {
        self.stage_index + 1
    }

    pub fn is_final_stage(&self) -> bool {
        self.stage_index + 1 >= self.tuning.stage_count()
    }

    /// Monster population limit for the current stage
    pub fn monster_cap(&self) -> usize {
        BASE_MONSTER_CAP + self.stage_index * MONSTER_CAP_PER_STAGE
    }

    /// Seconds until the boss arrives (0 once overdue)
    pub fn stage_time_left(&self) -> f32 {
        self.tuning
            .stage(self.stage_index)
            .map(|s| (s.duration - self.stage_elapsed).max(0.0))
            .unwrap_or(0.0)
    }

    /// The live boss, if the tracked id still points at one
    pub fn boss(&self) -> Option<&Monster> {
        let id = self.boss_id?;
        self.monsters.iter().find(|m| m.id == id && m.is_alive())
    }

    pub fn awaiting_upgrade(&self) -> bool {
        !self.offered.is_empty()
    }

    /// Spawn an experience gem, merging into an existing one at the cap
    pub fn spawn_gem(&mut self, pos: Vec2, value: u32) {
        if value == 0 {
            return;
        }
        if self.gems.len() >= MAX_GEMS {
            let idx = self.rng.random_range(0..self.gems.len());
            self.gems[idx].value += value;
            return;
        }
        let id = self.next_entity_id();
        self.gems.push(Gem {
            id,
            pos: clamp_to_world(pos, GEM_RADIUS),
            value,
            radius: GEM_RADIUS,
        });
    }

    /// Spray `count` particles from `pos`
    pub fn emit_burst(&mut self, pos: Vec2, color: u32, count: usize, speed: f32) {
        let cap = self.settings.max_particles().min(MAX_PARTICLES);
        if cap == 0 {
            return;
        }
        for _ in 0..count {
            let angle = self.fx_rng.random_range(0.0..std::f32::consts::TAU);
            let spd = speed * self.fx_rng.random_range(0.4..1.0);
            let life = self.fx_rng.random_range(0.25..0.6);
            let size = self.fx_rng.random_range(2.0..5.0);
            let id = self.next_entity_id();
            push_capped(
                &mut self.particles,
                Particle {
                    id,
                    pos,
                    vel: Vec2::new(angle.cos(), angle.sin()) * spd,
                    color,
                    life,
                    max_life: life,
                    size,
                },
                cap,
            );
        }
    }

    pub fn push_damage_text(&mut self, pos: Vec2, amount: f32, crit: bool) {
        let id = self.next_entity_id();
        let jitter = Vec2::new(self.fx_rng.random_range(-8.0..8.0), 0.0);
        push_capped(
            &mut self.damage_texts,
            DamageText {
                id,
                pos: pos + jitter,
                amount,
                crit,
                life: 0.7,
                max_life: 0.7,
            },
            MAX_DAMAGE_TEXTS,
        );
    }

    pub fn push_slash(&mut self, pos: Vec2, angle: f32, radius: f32) {
        let id = self.next_entity_id();
        push_capped(
            &mut self.slashes,
            SlashEffect {
                id,
                pos,
                angle,
                radius,
                life: 0.18,
                max_life: 0.18,
            },
            MAX_SLASH_EFFECTS,
        );
    }

    pub fn push_beam(&mut self, start: Vec2, end: Vec2, width: f32) {
        let id = self.next_entity_id();
        push_capped(
            &mut self.beams,
            BeamEffect {
                id,
                start,
                end,
                width,
                life: 0.25,
                max_life: 0.25,
            },
            MAX_BEAM_EFFECTS,
        );
    }

    pub fn push_lightning(&mut self, from: Vec2, to: Vec2) {
        let id = self.next_entity_id();
        push_capped(
            &mut self.lightning,
            LightningEffect {
                id,
                from,
                to,
                life: 0.3,
                max_life: 0.3,
            },
            MAX_LIGHTNING_EFFECTS,
        );
    }

    /// Apply damage to the player
    ///
    /// Ignored while invincible or after the run ended. Returns whether the
    /// hit landed. Reaching zero hp ends the run immediately.
    pub fn hurt_player(&mut self, amount: f32, invincibility: f32) -> bool {
        if self.phase.is_terminal() || self.player.is_invincible() {
            return false;
        }
        let amount = amount.max(0.0);
        self.player.hp = (self.player.hp - amount).clamp(0.0, self.player.max_hp);
        self.player.invincible = invincibility;
        self.combo = 0;
        let severity = (amount / self.player.max_hp.max(1.0)).clamp(0.2, 1.0);
        self.audio.push(AudioCue::PlayerHurt, severity);
        self.feedback.add_shake(8.0 + 14.0 * severity);
        self.feedback.flash(0.5);

        if self.player.hp <= 0.0 {
            self.player.hp = 0.0;
            self.phase = GamePhase::GameOver;
            self.stage_clear = None;
            self.offered.clear();
            self.pending_level_ups = 0;
            self.audio.push(AudioCue::GameOver, 1.0);
            log::info!(
                "Game over on stage {} after {:.1}s ({} kills)",
                self.stage_number(),
                self.elapsed,
                self.kills
            );
        }
        true
    }

    /// Register a kill for the combo counter
    pub fn register_kill(&mut self) {
        self.kills += 1;
        self.combo += 1;
        self.best_combo = self.best_combo.max(self.combo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut state = GameState::new(1, CharacterKind::Knight);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_push_capped_evicts_oldest() {
        let mut items = VecDeque::new();
        for i in 0..5 {
            push_capped(&mut items, i, 3);
        }
        assert_eq!(items, VecDeque::from(vec![2, 3, 4]));
        push_capped(&mut items, 9, 0);
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_gem_cap_merges_value() {
        let mut state = GameState::new(5, CharacterKind::Ranger);
        for _ in 0..MAX_GEMS {
            state.spawn_gem(Vec2::new(100.0, 100.0), 1);
        }
        assert_eq!(state.gems.len(), MAX_GEMS);
        state.spawn_gem(Vec2::new(100.0, 100.0), 7);
        assert_eq!(state.gems.len(), MAX_GEMS);
        let total: u32 = state.gems.iter().map(|g| g.value).sum();
        assert_eq!(total, MAX_GEMS as u32 + 7);
    }

    #[test]
    fn test_hurt_player_respects_invincibility() {
        let mut state = GameState::new(5, CharacterKind::Ranger);
        state.combo = 4;
        assert!(state.hurt_player(10.0, 0.5));
        assert_eq!(state.player.hp, 90.0);
        assert_eq!(state.combo, 0);
        assert!(!state.hurt_player(10.0, 0.5));
        assert_eq!(state.player.hp, 90.0);
    }

    #[test]
    fn test_lethal_damage_ends_run() {
        let mut state = GameState::new(5, CharacterKind::Mage);
        state.hurt_player(10_000.0, 0.5);
        assert_eq!(state.player.hp, 0.0);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_particles_respect_settings_cap() {
        let mut state = GameState::with_config(
            9,
            CharacterKind::Knight,
            Tuning::default(),
            Settings::from_preset(crate::settings::QualityPreset::Low),
        );
        state.emit_burst(Vec2::new(50.0, 50.0), 0xffffff, 500, 100.0);
        assert_eq!(state.particles.len(), 100);
    }

    #[test]
    fn test_invalid_tuning_falls_back() {
        let mut tuning = Tuning::default();
        tuning.stages.clear();
        let state = GameState::with_config(1, CharacterKind::Knight, tuning, Settings::default());
        assert_eq!(state.tuning.stage_count(), 5);
    }
}
