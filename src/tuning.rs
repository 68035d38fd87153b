//! Data-driven game balance
//!
//! Static stage, character, and monster tables. [`Tuning::default`] carries the
//! shipped balance; hosts may load a JSON override with [`Tuning::from_json`].
//! Any top-level key missing from the document falls back to the defaults.
//! A session reads its tuning but never mutates it.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// Number of stages in a run
pub const STAGE_COUNT: usize = 5;

/// Monster types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    Slime,
    Bat,
    Skeleton,
    Ghost,
    Golem,
    Demon,
    /// Stage boss (stats come from the stage, not the monster table)
    Boss,
}

impl MonsterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonsterKind::Slime => "Slime",
            MonsterKind::Bat => "Bat",
            MonsterKind::Skeleton => "Skeleton",
            MonsterKind::Ghost => "Ghost",
            MonsterKind::Golem => "Golem",
            MonsterKind::Demon => "Demon",
            MonsterKind::Boss => "Boss",
        }
    }
}

/// Player attack behavior, fixed for the whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackStyle {
    /// Sweeping slash toward the nearest monster
    Melee,
    /// Several fast arrows at the nearest monsters
    Ranged,
    /// Bolts that explode on impact
    AreaCaster,
}

/// Playable archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CharacterKind {
    #[default]
    Knight,
    Ranger,
    Mage,
}

impl CharacterKind {
    pub const ALL: [CharacterKind; 3] = [CharacterKind::Knight, CharacterKind::Ranger, CharacterKind::Mage];

    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterKind::Knight => "Knight",
            CharacterKind::Ranger => "Ranger",
            CharacterKind::Mage => "Mage",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "knight" | "melee" => Some(CharacterKind::Knight),
            "ranger" | "archer" => Some(CharacterKind::Ranger),
            "mage" | "caster" => Some(CharacterKind::Mage),
            _ => None,
        }
    }
}

/// Base stats for an ordinary monster type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonsterBaseConfig {
    pub kind: MonsterKind,
    pub hp: f32,
    pub speed: f32,
    pub radius: f32,
    /// Contact damage
    pub damage: f32,
    pub exp: u32,
    /// 0xRRGGBB tint for the renderer
    pub color: u32,
}

/// Fixed boss stats for one stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossConfig {
    pub name: String,
    pub hp: f32,
    pub speed: f32,
    pub radius: f32,
    pub damage: f32,
    pub exp: u32,
    pub color: u32,
}

/// One timed stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    pub name: String,
    /// Seconds until the boss appears
    pub duration: f32,
    /// Spawn interval at stage start (seconds)
    pub spawn_interval_base: f32,
    /// Spawn interval once stage time has run out
    pub spawn_interval_min: f32,
    pub monster_pool: Vec<MonsterKind>,
    pub boss: BossConfig,
}

/// Starting stats for a playable archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterConfig {
    pub kind: CharacterKind,
    pub style: AttackStyle,
    pub max_hp: f32,
    pub speed: f32,
    pub damage: f32,
    pub attack_interval: f32,
    pub range: f32,
    pub projectile_count: u32,
    pub crit_chance: f32,
    pub armor: f32,
    pub magnet_radius: f32,
    pub pierce: u32,
}

/// Complete balance table for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub stages: Vec<StageConfig>,
    pub characters: Vec<CharacterConfig>,
    pub monsters: Vec<MonsterBaseConfig>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            stages: default_stages(),
            characters: default_characters(),
            monsters: default_monsters(),
        }
    }
}

impl Tuning {
    /// Parse a JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check the structural rules the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.stages.len() != STAGE_COUNT {
            return Err(TuningError::StageCount {
                expected: STAGE_COUNT,
                found: self.stages.len(),
            });
        }
        for (stage, cfg) in self.stages.iter().enumerate() {
            if !positive(cfg.duration) {
                return Err(TuningError::InvalidDuration {
                    stage,
                    duration: cfg.duration,
                });
            }
            if !positive(cfg.spawn_interval_min)
                || !positive(cfg.spawn_interval_base)
                || cfg.spawn_interval_base < cfg.spawn_interval_min
            {
                return Err(TuningError::InvalidSpawnInterval {
                    stage,
                    base: cfg.spawn_interval_base,
                    min: cfg.spawn_interval_min,
                });
            }
            if cfg.monster_pool.is_empty() {
                return Err(TuningError::EmptyMonsterPool { stage });
            }
            if let Some(kind) = cfg.monster_pool.iter().find(|k| self.monster(**k).is_none()) {
                return Err(TuningError::MissingMonster {
                    stage,
                    kind: kind.as_str().to_string(),
                });
            }
        }
        for kind in CharacterKind::ALL {
            if self.character(kind).is_none() {
                return Err(TuningError::MissingCharacter(kind.as_str().to_string()));
            }
        }
        Ok(())
    }

    pub fn stage(&self, index: usize) -> Option<&StageConfig> {
        self.stages.get(index)
    }

    pub fn character(&self, kind: CharacterKind) -> Option<&CharacterConfig> {
        self.characters.iter().find(|c| c.kind == kind)
    }

    pub fn monster(&self, kind: MonsterKind) -> Option<&MonsterBaseConfig> {
        self.monsters.iter().find(|m| m.kind == kind)
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

fn boss(name: &str, hp: f32, speed: f32, radius: f32, damage: f32, exp: u32, color: u32) -> BossConfig {
    BossConfig {
        name: name.to_string(),
        hp,
        speed,
        radius,
        damage,
        exp,
        color,
    }
}

fn stage(
    name: &str,
    duration: f32,
    base: f32,
    min: f32,
    monster_pool: &[MonsterKind],
    boss: BossConfig,
) -> StageConfig {
    StageConfig {
        name: name.to_string(),
        duration,
        spawn_interval_base: base,
        spawn_interval_min: min,
        monster_pool: monster_pool.to_vec(),
        boss,
    }
}

fn default_stages() -> Vec<StageConfig> {
    use MonsterKind::*;
    vec![
        stage(
            "Mossy Meadow",
            65.0,
            0.9,
            0.35,
            &[Slime, Bat],
            boss("Slime King", 900.0, 70.0, 46.0, 20.0, 40, 0x4caf50),
        ),
        stage(
            "Twilight Caves",
            75.0,
            0.8,
            0.30,
            &[Slime, Bat, Skeleton],
            boss("Bat Lord", 1600.0, 85.0, 44.0, 24.0, 60, 0x7e57c2),
        ),
        stage(
            "Bone Yard",
            85.0,
            0.7,
            0.26,
            &[Bat, Skeleton, Ghost],
            boss("Bone Colossus", 2600.0, 65.0, 52.0, 28.0, 80, 0xe0d6b8),
        ),
        stage(
            "Haunted Keep",
            95.0,
            0.6,
            0.22,
            &[Skeleton, Ghost, Golem],
            boss("Wraith Queen", 3800.0, 90.0, 48.0, 32.0, 100, 0x4dd0e1),
        ),
        stage(
            "Infernal Gate",
            105.0,
            0.55,
            0.18,
            &[Ghost, Golem, Demon],
            boss("Demon Lord", 5400.0, 80.0, 58.0, 38.0, 0, 0xc62828),
        ),
    ]
}

fn default_monsters() -> Vec<MonsterBaseConfig> {
    let row = |kind, hp, speed, radius, damage, exp, color| MonsterBaseConfig {
        kind,
        hp,
        speed,
        radius,
        damage,
        exp,
        color,
    };
    vec![
        row(MonsterKind::Slime, 22.0, 70.0, 14.0, 8.0, 2, 0x66bb6a),
        row(MonsterKind::Bat, 14.0, 115.0, 11.0, 6.0, 1, 0x9575cd),
        row(MonsterKind::Skeleton, 38.0, 85.0, 15.0, 11.0, 3, 0xefebe9),
        row(MonsterKind::Ghost, 30.0, 120.0, 14.0, 10.0, 3, 0x80deea),
        row(MonsterKind::Golem, 110.0, 55.0, 24.0, 18.0, 8, 0x8d8d8d),
        row(MonsterKind::Demon, 70.0, 105.0, 18.0, 16.0, 6, 0xd32f2f),
    ]
}

fn default_characters() -> Vec<CharacterConfig> {
    CharacterKind::ALL.iter().map(|k| default_character(*k)).collect()
}

/// Shipped starting stats for an archetype
pub fn default_character(kind: CharacterKind) -> CharacterConfig {
    match kind {
        CharacterKind::Knight => CharacterConfig {
            kind,
            style: AttackStyle::Melee,
            max_hp: 140.0,
            speed: 210.0,
            damage: 26.0,
            attack_interval: 0.7,
            range: 200.0,
            projectile_count: 1,
            crit_chance: 0.05,
            armor: 0.1,
            magnet_radius: 110.0,
            pierce: 0,
        },
        CharacterKind::Ranger => CharacterConfig {
            kind,
            style: AttackStyle::Ranged,
            max_hp: 100.0,
            speed: 230.0,
            damage: 14.0,
            attack_interval: 0.55,
            range: 420.0,
            projectile_count: 2,
            crit_chance: 0.12,
            armor: 0.0,
            magnet_radius: 120.0,
            pierce: 0,
        },
        CharacterKind::Mage => CharacterConfig {
            kind,
            style: AttackStyle::AreaCaster,
            max_hp: 90.0,
            speed: 215.0,
            damage: 18.0,
            attack_interval: 0.9,
            range: 380.0,
            projectile_count: 1,
            crit_chance: 0.08,
            armor: 0.0,
            magnet_radius: 130.0,
            pierce: 0,
        },
    }
}

/// Finite and above zero (NaN fails)
fn positive(x: f32) -> bool {
    x.is_finite() && x > 0.0
}
