//! Time-bounded modifiers triggered by power-ups.
//!
//! Every kind runs its own countdown. Kinds never cancel each other, and
//! re-activating a kind restarts its countdown at the full duration. An
//! expired kind stays in the registry with its flag lowered until it is
//! activated again.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::config::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    DoublePoints,
    SlowMotion,
    Invulnerable,
    Phase,
}

impl EffectKind {
    pub const ALL: [EffectKind; 4] = [
        EffectKind::DoublePoints,
        EffectKind::SlowMotion,
        EffectKind::Invulnerable,
        EffectKind::Phase,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EffectKind::DoublePoints => "2x Points",
            EffectKind::SlowMotion => "Slow Motion",
            EffectKind::Invulnerable => "Invulnerable",
            EffectKind::Phase => "Phase",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Countdown {
    active: bool,
    remaining: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectRegistry {
    durations: BTreeMap<EffectKind, Duration>,
    countdowns: BTreeMap<EffectKind, Countdown>,
}

impl EffectRegistry {
    pub fn new(config: &GameConfig) -> Self {
        let durations = EffectKind::ALL
            .iter()
            .map(|&kind| (kind, config.effect_duration(kind)))
            .collect();
        Self {
            durations,
            countdowns: BTreeMap::new(),
        }
    }

    pub fn duration(&self, kind: EffectKind) -> Duration {
        self.durations.get(&kind).copied().unwrap_or_default()
    }

    /// Raise the flag for `kind` and restart its countdown at the full duration
    pub fn activate(&mut self, kind: EffectKind) {
        let remaining = self.duration(kind);
        self.countdowns.insert(
            kind,
            Countdown {
                active: !remaining.is_zero(),
                remaining,
            },
        );
    }

    /// Run every live countdown forward; returns the kinds that expired
    pub fn advance(&mut self, elapsed: Duration) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        for (&kind, countdown) in self.countdowns.iter_mut() {
            if !countdown.active {
                continue;
            }
            countdown.remaining = countdown.remaining.saturating_sub(elapsed);
            if countdown.remaining.is_zero() {
                countdown.active = false;
                expired.push(kind);
            }
        }
        expired
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.countdowns.get(&kind).is_some_and(|c| c.active)
    }

    /// Time left on an active effect
    pub fn remaining(&self, kind: EffectKind) -> Option<Duration> {
        self.countdowns
            .get(&kind)
            .filter(|c| c.active)
            .map(|c| c.remaining)
    }

    /// Flags for every kind that has ever been activated this round
    pub fn snapshot(&self) -> BTreeMap<EffectKind, bool> {
        self.countdowns
            .iter()
            .map(|(&kind, countdown)| (kind, countdown.active))
            .collect()
    }

    pub fn clear(&mut self) {
        self.countdowns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> EffectRegistry {
        EffectRegistry::new(&GameConfig {
            double_points_ms: 10_000,
            invulnerable_ms: 5_000,
            ..GameConfig::default()
        })
    }

    #[test]
    fn test_effects_run_independently() {
        let mut effects = registry();

        effects.activate(EffectKind::DoublePoints);
        assert!(effects.advance(Duration::from_secs(2)).is_empty());
        effects.activate(EffectKind::Invulnerable);

        assert!(effects.is_active(EffectKind::DoublePoints));
        assert!(effects.is_active(EffectKind::Invulnerable));

        // t = 7s: invulnerability (started at 2s) runs out first
        let expired = effects.advance(Duration::from_secs(5));
        assert_eq!(expired, vec![EffectKind::Invulnerable]);
        assert!(effects.is_active(EffectKind::DoublePoints));

        // t = 10s: double points expires at its original mark
        let expired = effects.advance(Duration::from_secs(3));
        assert_eq!(expired, vec![EffectKind::DoublePoints]);
        assert!(!effects.is_active(EffectKind::DoublePoints));
    }

    #[test]
    fn test_reactivation_resets_to_full_duration() {
        let mut effects = registry();

        effects.activate(EffectKind::DoublePoints);
        effects.advance(Duration::from_secs(6));
        assert_eq!(
            effects.remaining(EffectKind::DoublePoints),
            Some(Duration::from_secs(4))
        );

        effects.activate(EffectKind::DoublePoints);
        assert_eq!(
            effects.remaining(EffectKind::DoublePoints),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_expired_effect_stays_in_snapshot() {
        let mut effects = registry();
        effects.activate(EffectKind::Invulnerable);
        effects.advance(Duration::from_secs(5));

        let snapshot = effects.snapshot();
        assert_eq!(snapshot.get(&EffectKind::Invulnerable), Some(&false));
        assert!(!snapshot.contains_key(&EffectKind::Phase));
        assert_eq!(effects.remaining(EffectKind::Invulnerable), None);
    }

    #[test]
    fn test_expired_effect_not_reported_twice() {
        let mut effects = registry();
        effects.activate(EffectKind::Invulnerable);
        assert_eq!(effects.advance(Duration::from_secs(9)).len(), 1);
        assert!(effects.advance(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut effects = registry();
        effects.activate(EffectKind::Phase);
        effects.clear();
        assert!(effects.snapshot().is_empty());
        assert!(!effects.is_active(EffectKind::Phase));
    }
}
