//! Audio intents
//!
//! The simulation never plays sound. It records what happened as [`AudioEvent`]s
//! and the mixer drains them once per frame. Coalescing same-cue events is the
//! mixer's job.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_AUDIO_EVENTS;

/// Sound cues the mixer knows how to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// Melee sweep swung
    Slash,
    /// Arrow or bolt fired
    Shoot,
    /// Projectile connected
    Hit,
    /// Critical hit landed
    Crit,
    /// Magic bolt detonated
    Explosion,
    /// Monster died
    Kill,
    /// Player took damage
    PlayerHurt,
    /// Gem collected
    GemPickup,
    /// Level gained
    LevelUp,
    /// Upgrade chosen
    Upgrade,
    /// Lightning skill fired
    Lightning,
    /// Orbiting blade connected
    Blade,
    /// Laser skill fired
    Laser,
    /// Boss entered the arena
    BossSpawn,
    /// Boss attack warning appeared
    BossWarning,
    /// Boss attack resolved
    BossSlam,
    /// Boss defeated, stage cleared
    StageClear,
    /// Next stage started
    StageStart,
    /// Run lost
    GameOver,
    /// Run won
    Victory,
}

/// One discrete sound request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioEvent {
    pub cue: AudioCue,
    /// Loudness hint (0.0 - 1.0)
    pub intensity: f32,
}

/// Bounded queue of audio intents produced during ticks
#[derive(Debug, Clone, Default)]
pub struct AudioQueue {
    events: VecDeque<AudioEvent>,
}

impl AudioQueue {
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(MAX_AUDIO_EVENTS),
        }
    }

    /// Record a cue (oldest dropped when full)
    pub fn push(&mut self, cue: AudioCue, intensity: f32) {
        if self.events.len() >= MAX_AUDIO_EVENTS {
            self.events.pop_front();
        }
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.events.push_back(AudioEvent { cue, intensity });
    }

    /// Hand every pending event to the caller, leaving the queue empty
    pub fn drain(&mut self) -> Vec<AudioEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_is_idempotent() {
        let mut queue = AudioQueue::new();
        queue.push(AudioCue::Hit, 0.5);
        queue.push(AudioCue::Kill, 2.0);
        let first = queue.drain();
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].intensity, 1.0);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_queue_is_bounded() {
        let mut queue = AudioQueue::new();
        for _ in 0..MAX_AUDIO_EVENTS {
            queue.push(AudioCue::Hit, 0.1);
        }
        queue.push(AudioCue::Victory, 1.0);
        assert_eq!(queue.len(), MAX_AUDIO_EVENTS);
        let events = queue.drain();
        assert_eq!(events.last().map(|e| e.cue), Some(AudioCue::Victory));
    }
}
