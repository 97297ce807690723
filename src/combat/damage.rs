//! Trait-driven damage resolution.
//!
//! multiplier = (1 + weakness_bonus * matched_weaknesses) * (critical ? critical_multiplier : 1)
//! final = round(base * multiplier), rounding half away from zero.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::DamageConfig;
use crate::traits::TraitType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageOutcome {
    pub base: i32,
    pub final_damage: i32,
    pub multiplier: f32,
    /// Attacker traits that hit a weakness, in attacker order
    pub matched_weaknesses: Vec<TraitType>,
    pub critical: bool,
}

pub fn resolve_damage(
    base: i32,
    attacker_traits: &[TraitType],
    defender_weaknesses: &[TraitType],
    hidden_critical: Option<TraitType>,
    config: &DamageConfig,
) -> DamageOutcome {
    let matched_weaknesses: Vec<TraitType> = attacker_traits
        .iter()
        .copied()
        .filter(|t| defender_weaknesses.contains(t))
        .collect();

    let mut multiplier = 1.0 + config.weakness_bonus * matched_weaknesses.len() as f32;

    let critical = hidden_critical.is_some_and(|c| attacker_traits.contains(&c));
    if critical {
        multiplier *= config.critical_multiplier;
    }

    let final_damage = (base as f32 * multiplier).round() as i32;

    DamageOutcome {
        base,
        final_damage,
        multiplier,
        matched_weaknesses,
        critical,
    }
}

/// Tracks which weaknesses and critical trait have been announced this run
#[derive(Debug, Clone, Default)]
pub struct RevealTracker {
    weaknesses: HashSet<TraitType>,
    critical: bool,
}

/// Announcements produced by one damage outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reveals {
    pub weaknesses: Vec<TraitType>,
    pub critical: Option<TraitType>,
}

impl RevealTracker {
    /// Record an outcome and return only what is new this run
    pub fn observe(&mut self, outcome: &DamageOutcome, hidden_critical: Option<TraitType>) -> Reveals {
        let weaknesses = outcome
            .matched_weaknesses
            .iter()
            .copied()
            .filter(|t| self.weaknesses.insert(*t))
            .collect();
        let critical = if outcome.critical && !self.critical {
            self.critical = true;
            hidden_critical
        } else {
            None
        };
        Reveals {
            weaknesses,
            critical,
        }
    }

    pub fn is_weakness_revealed(&self, trait_type: TraitType) -> bool {
        self.weaknesses.contains(&trait_type)
    }

    pub fn is_critical_revealed(&self) -> bool {
        self.critical
    }

    pub fn reset(&mut self) {
        self.weaknesses.clear();
        self.critical = false;
    }
}

/// One-shot attack escalation at low health
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrageState {
    pub enraged: bool,
}

impl EnrageState {
    /// Returns true the one time the threshold is crossed
    pub fn check(&mut self, health_fraction: f32, threshold: f32) -> bool {
        if self.enraged || health_fraction > threshold {
            return false;
        }
        self.enraged = true;
        true
    }
}
