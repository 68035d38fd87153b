//! Configuration errors
//!
//! The simulation itself never fails; only loading balance data can.

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::Tuning`] override.
#[derive(Debug, Error)]
pub enum TuningError {
    /// The override document is not valid JSON for the tuning schema.
    #[error("failed to parse tuning document: {0}")]
    Parse(#[from] serde_json::Error),
    /// A session needs exactly the configured number of stages.
    #[error("expected {expected} stages, found {found}")]
    StageCount { expected: usize, found: usize },
    /// A stage has nothing to spawn.
    #[error("stage {stage} has an empty monster pool")]
    EmptyMonsterPool { stage: usize },
    /// Spawn intervals must be positive with base >= min.
    #[error("stage {stage} has invalid spawn interval (base {base}, min {min})")]
    InvalidSpawnInterval { stage: usize, base: f32, min: f32 },
    /// Stage duration must be positive.
    #[error("stage {stage} has non-positive duration {duration}")]
    InvalidDuration { stage: usize, duration: f32 },
    /// A stage pool names a monster with no base stats.
    #[error("stage {stage} references {kind} without a monster config")]
    MissingMonster { stage: usize, kind: String },
    /// Every character archetype needs a config row.
    #[error("no character config for {0}")]
    MissingCharacter(String),
}
