//! Run records leaderboard
//!
//! Tracks the top 10 finished runs. The host decides where the JSON lives.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::sim::{GamePhase, GameState};
use crate::tuning::CharacterKind;

/// Maximum number of runs to keep
pub const MAX_RECORDS: usize = 10;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Victory,
    Defeat,
    /// Stopped before either terminal phase
    Abandoned,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Victory => "Victory",
            RunOutcome::Defeat => "Defeat",
            RunOutcome::Abandoned => "Abandoned",
        }
    }
}

/// Summary of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub character: CharacterKind,
    pub outcome: RunOutcome,
    /// 1-based stage the run ended on
    pub stage: usize,
    pub level: u32,
    pub kills: u32,
    pub best_combo: u32,
    /// Gameplay seconds survived
    pub elapsed: f32,
}

impl RunSummary {
    pub fn from_state(state: &GameState) -> Self {
        let outcome = match state.phase {
            GamePhase::Victory => RunOutcome::Victory,
            GamePhase::GameOver => RunOutcome::Defeat,
            GamePhase::Playing | GamePhase::Paused => RunOutcome::Abandoned,
        };
        Self {
            seed: state.seed,
            character: state.character,
            outcome,
            stage: state.stage_number(),
            level: state.player.level,
            kills: state.kills,
            best_combo: state.best_combo,
            elapsed: state.elapsed,
        }
    }

    /// Leaderboard order: victories, then deeper stages, then more kills
    fn rank_cmp(&self, other: &Self) -> Ordering {
        let won = |s: &Self| s.outcome == RunOutcome::Victory;
        won(other)
            .cmp(&won(self))
            .then(other.stage.cmp(&self.stage))
            .then(other.kills.cmp(&self.kills))
    }

    fn beats(&self, other: &Self) -> bool {
        self.rank_cmp(other) == Ordering::Less
    }
}

/// Top runs, best first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunRecords {
    pub entries: Vec<RunSummary>,
}

impl RunRecords {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Check if a run would make the board
    pub fn qualifies(&self, run: &RunSummary) -> bool {
        if run.kills == 0 && run.outcome != RunOutcome::Victory {
            return false;
        }
        if self.entries.len() < MAX_RECORDS {
            return true;
        }
        self.entries.last().map(|e| run.beats(e)).unwrap_or(true)
    }

    /// Get the rank a run would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, run: &RunSummary) -> Option<usize> {
        if !self.qualifies(run) {
            return None;
        }
        let rank = self.entries.iter().position(|e| run.beats(e));
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a run; returns the rank achieved (1-indexed) or None
    pub fn add(&mut self, run: RunSummary) -> Option<usize> {
        let rank = self.potential_rank(&run)?;
        self.entries.insert(rank - 1, run);
        self.entries.truncate(MAX_RECORDS);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&RunSummary> {
        self.entries.first()
    }

    /// Parse a stored board, starting fresh when it is unreadable
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<RunRecords>(json) {
            Ok(mut records) => {
                records.entries.sort_by(|a, b| a.rank_cmp(b));
                records.entries.truncate(MAX_RECORDS);
                log::info!("Loaded {} run records", records.entries.len());
                records
            }
            Err(err) => {
                log::warn!("Discarding unreadable run records: {err}");
                Self::new()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(outcome: RunOutcome, stage: usize, kills: u32) -> RunSummary {
        RunSummary {
            seed: 1,
            character: CharacterKind::Knight,
            outcome,
            stage,
            level: 5,
            kills,
            best_combo: 10,
            elapsed: 120.0,
        }
    }

    #[test]
    fn test_ranking_order() {
        let mut records = RunRecords::new();
        assert_eq!(records.add(run(RunOutcome::Defeat, 2, 300)), Some(1));
        assert_eq!(records.add(run(RunOutcome::Defeat, 3, 100)), Some(1));
        assert_eq!(records.add(run(RunOutcome::Victory, 5, 50)), Some(1));
        assert_eq!(records.add(run(RunOutcome::Defeat, 3, 200)), Some(2));
        let stages: Vec<usize> = records.entries.iter().map(|e| e.stage).collect();
        assert_eq!(stages, vec![5, 3, 3, 2]);
        assert_eq!(records.best().map(|b| b.outcome), Some(RunOutcome::Victory));
    }

    #[test]
    fn test_board_is_bounded() {
        let mut records = RunRecords::new();
        for kills in 1..=15 {
            records.add(run(RunOutcome::Defeat, 1, kills));
        }
        assert_eq!(records.entries.len(), MAX_RECORDS);
        assert_eq!(records.entries[0].kills, 15);
        assert!(!records.qualifies(&run(RunOutcome::Defeat, 1, 3)));
        assert_eq!(records.potential_rank(&run(RunOutcome::Defeat, 2, 1)), Some(1));
    }

    #[test]
    fn test_empty_runs_skipped() {
        let records = RunRecords::new();
        assert!(!records.qualifies(&run(RunOutcome::Defeat, 1, 0)));
    }

    #[test]
    fn test_json_roundtrip_and_garbage() {
        let mut records = RunRecords::new();
        records.add(run(RunOutcome::Defeat, 2, 40));
        let restored = RunRecords::from_json(&records.to_json());
        assert_eq!(restored.entries, records.entries);
        assert!(RunRecords::from_json("{oops").is_empty());
    }

    #[test]
    fn test_summary_from_fresh_state() {
        let state = GameState::new(77, CharacterKind::Mage);
        let summary = RunSummary::from_state(&state);
        assert_eq!(summary.outcome, RunOutcome::Abandoned);
        assert_eq!(summary.stage, 1);
        assert_eq!(summary.character, CharacterKind::Mage);
        assert_eq!(summary.seed, 77);
    }
}
