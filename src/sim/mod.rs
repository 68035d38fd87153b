//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Variable timestep, clamped to `MAX_DT`
//! - Seeded RNG only (gameplay and cosmetics on separate streams)
//! - Stable iteration order (insertion order, ties broken by entity ID)
//! - No rendering, audio playback, or platform dependencies

pub mod combat;
pub mod director;
pub mod entities;
pub mod feedback;
pub mod geometry;
pub mod player;
pub mod progression;
pub mod skills;
pub mod snapshot;
pub mod state;
pub mod telegraph;
pub mod tick;

pub use feedback::{Camera, Feedback};
pub use progression::{StatUpgrade, UpgradeId, UpgradeOption};
pub use snapshot::{BossHud, Hud, SessionFlags, SkillHud, Snapshot};
pub use state::{
    BossTelegraph, GamePhase, GameState, Gem, Monster, Player, Projectile, ProjectileKind, SkillKind, StageClear,
    TelegraphKind, TelegraphShape,
};
pub use tick::{TickInput, tick};
