//! Lineage tracker: generation counter and inherited traits.
//!
//! Each player death advances the lineage one generation. Traits picked along
//! the way are kept in acquisition order and carried into every later battle.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::traits::TraitType;

/// Upper bound on generations for a run, regardless of weakness count
pub const MAX_GENERATIONS_CAP: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineageError {
    #[error("trait {0:?} is already inherited")]
    DuplicateTrait(TraitType),
}

/// Outcome of advancing to the next generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A new generation begins
    Next(u32),
    /// Max generations reached; reported once
    Exhausted,
    /// Already exhausted; nothing changes
    AlreadyExhausted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageState {
    current_generation: u32,
    inherited_traits: Vec<TraitType>,
    max_generations: u32,
    exhausted: bool,
}

impl Default for LineageState {
    fn default() -> Self {
        Self::new(MAX_GENERATIONS_CAP)
    }
}

impl LineageState {
    pub fn new(max_generations: u32) -> Self {
        Self {
            current_generation: 1,
            inherited_traits: Vec::new(),
            max_generations: max_generations.max(1),
            exhausted: false,
        }
    }

    /// Generation budget derived from the boss: one per weakness plus one,
    /// capped at [`MAX_GENERATIONS_CAP`]
    pub fn max_generations_for(weakness_count: usize) -> u32 {
        (weakness_count as u32 + 1).min(MAX_GENERATIONS_CAP)
    }

    pub fn current_generation(&self) -> u32 {
        self.current_generation
    }

    pub fn max_generations(&self) -> u32 {
        self.max_generations
    }

    pub fn inherited_traits(&self) -> &[TraitType] {
        &self.inherited_traits
    }

    pub fn has_trait(&self, trait_type: TraitType) -> bool {
        self.inherited_traits.contains(&trait_type)
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Record a newly acquired trait. Duplicates are rejected and change nothing.
    pub fn add_trait(&mut self, trait_type: TraitType) -> Result<(), LineageError> {
        if self.has_trait(trait_type) {
            debug!(trait_type = trait_type.as_str(), "duplicate trait ignored");
            return Err(LineageError::DuplicateTrait(trait_type));
        }
        self.inherited_traits.push(trait_type);
        info!(
            trait_type = trait_type.as_str(),
            generation = self.current_generation,
            count = self.inherited_traits.len(),
            "trait inherited"
        );
        Ok(())
    }

    /// Move to the next generation. Exhaustion is reported exactly once.
    pub fn advance_generation(&mut self) -> Advance {
        if self.exhausted {
            return Advance::AlreadyExhausted;
        }
        if self.current_generation >= self.max_generations {
            self.exhausted = true;
            info!(
                generations = self.current_generation,
                "lineage exhausted"
            );
            return Advance::Exhausted;
        }
        self.current_generation += 1;
        info!(generation = self.current_generation, "generation advanced");
        Advance::Next(self.current_generation)
    }

    /// Reset to generation 1 with no traits
    pub fn start_new_game(&mut self, max_generations: u32) {
        *self = Self::new(max_generations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_lineage() {
        let lineage = LineageState::new(5);
        assert_eq!(lineage.current_generation(), 1);
        assert_eq!(lineage.max_generations(), 5);
        assert!(lineage.inherited_traits().is_empty());
        assert!(!lineage.is_exhausted());
    }

    #[test]
    fn test_add_trait_rejects_duplicates() {
        let mut lineage = LineageState::new(5);
        assert!(lineage.add_trait(TraitType::Fire).is_ok());
        assert_eq!(
            lineage.add_trait(TraitType::Fire),
            Err(LineageError::DuplicateTrait(TraitType::Fire))
        );
        assert_eq!(lineage.inherited_traits(), &[TraitType::Fire]);
    }

    #[test]
    fn test_acquisition_order_kept() {
        let mut lineage = LineageState::new(5);
        lineage.add_trait(TraitType::Steel).unwrap();
        lineage.add_trait(TraitType::Earth).unwrap();
        lineage.add_trait(TraitType::Wind).unwrap();
        assert_eq!(
            lineage.inherited_traits(),
            &[TraitType::Steel, TraitType::Earth, TraitType::Wind]
        );
    }

    #[test]
    fn test_exhaustion_reported_once() {
        let mut lineage = LineageState::new(2);
        assert_eq!(lineage.advance_generation(), Advance::Next(2));
        assert_eq!(lineage.advance_generation(), Advance::Exhausted);
        assert_eq!(lineage.advance_generation(), Advance::AlreadyExhausted);
        assert_eq!(lineage.current_generation(), 2);
        assert!(lineage.is_exhausted());
    }

    #[test]
    fn test_start_new_game_resets() {
        let mut lineage = LineageState::new(3);
        lineage.add_trait(TraitType::Ice).unwrap();
        lineage.advance_generation();
        lineage.start_new_game(4);
        assert_eq!(lineage.current_generation(), 1);
        assert_eq!(lineage.max_generations(), 4);
        assert!(lineage.inherited_traits().is_empty());
        assert!(!lineage.is_exhausted());
    }

    #[test]
    fn test_max_generations_for() {
        assert_eq!(LineageState::max_generations_for(4), 5);
        assert_eq!(LineageState::max_generations_for(0), 1);
        assert_eq!(LineageState::max_generations_for(10), MAX_GENERATIONS_CAP);
    }
}
