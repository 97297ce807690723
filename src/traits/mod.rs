//! Elemental trait catalog.
//!
//! Ten fixed trait types, each with display metadata and effect coefficients.
//! The catalog is built once and handed to the encounter; it is never mutated
//! afterwards.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    EARTH_HEALTH_BONUS, PLAYER_BASE_ATTACK, PLAYER_BASE_HEALTH, STEEL_ATTACK_BONUS,
};

/// Elemental trait identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TraitType {
    Fire,
    Ice,
    Lightning,
    Earth,
    Wind,
    Water,
    Light,
    Shadow,
    Poison,
    Steel,
}

impl TraitType {
    pub const ALL: [TraitType; 10] = [
        TraitType::Fire,
        TraitType::Ice,
        TraitType::Lightning,
        TraitType::Earth,
        TraitType::Wind,
        TraitType::Water,
        TraitType::Light,
        TraitType::Shadow,
        TraitType::Poison,
        TraitType::Steel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Ice => "ice",
            Self::Lightning => "lightning",
            Self::Earth => "earth",
            Self::Wind => "wind",
            Self::Water => "water",
            Self::Light => "light",
            Self::Shadow => "shadow",
            Self::Poison => "poison",
            Self::Steel => "steel",
        }
    }
}

/// Linear RGB display colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl TraitColor {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Static definition of a trait
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trait {
    pub trait_type: TraitType,
    pub display_name: String,
    pub description: String,
    pub color: TraitColor,
    pub damage_multiplier: f32,
    pub dodge_time_bonus: f32,
    pub causes_dot: bool,
    pub can_stun: bool,
    pub critical_chance: f32,
}

impl Trait {
    fn neutral(trait_type: TraitType, display_name: &str, description: &str, color: TraitColor) -> Self {
        Self {
            trait_type,
            display_name: display_name.to_string(),
            description: description.to_string(),
            color,
            damage_multiplier: 1.0,
            dodge_time_bonus: 0.0,
            causes_dot: false,
            can_stun: false,
            critical_chance: 0.0,
        }
    }
}

/// Read-only registry of every trait definition
#[derive(Debug, Clone)]
pub struct TraitCatalog {
    traits: Vec<Trait>,
}

impl Default for TraitCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TraitCatalog {
    /// The shipped set of ten traits
    pub fn standard() -> Self {
        let traits = vec![
            Trait {
                causes_dot: true,
                ..Trait::neutral(
                    TraitType::Fire,
                    "Fire",
                    "Burns enemies over time",
                    TraitColor::new(1.0, 0.4, 0.1),
                )
            },
            Trait::neutral(
                TraitType::Ice,
                "Ice",
                "Slows enemy attacks",
                TraitColor::new(0.7, 0.9, 1.0),
            ),
            Trait {
                can_stun: true,
                ..Trait::neutral(
                    TraitType::Lightning,
                    "Lightning",
                    "Has a chance to stun",
                    TraitColor::new(1.0, 1.0, 0.4),
                )
            },
            Trait::neutral(
                TraitType::Earth,
                "Earth",
                "Increases damage resistance",
                TraitColor::new(0.6, 0.4, 0.2),
            ),
            Trait {
                dodge_time_bonus: 0.1,
                ..Trait::neutral(
                    TraitType::Wind,
                    "Wind",
                    "Improves dodge timing",
                    TraitColor::new(0.8, 1.0, 0.8),
                )
            },
            Trait::neutral(
                TraitType::Water,
                "Water",
                "Recovers health over time",
                TraitColor::new(0.2, 0.6, 1.0),
            ),
            Trait {
                critical_chance: 0.15,
                ..Trait::neutral(
                    TraitType::Light,
                    "Light",
                    "Increases critical hit chance",
                    TraitColor::new(1.0, 1.0, 0.8),
                )
            },
            Trait::neutral(
                TraitType::Shadow,
                "Shadow",
                "Has a chance to dodge automatically",
                TraitColor::new(0.4, 0.4, 0.5),
            ),
            Trait {
                causes_dot: true,
                ..Trait::neutral(
                    TraitType::Poison,
                    "Poison",
                    "Applies strong damage over time",
                    TraitColor::new(0.6, 1.0, 0.4),
                )
            },
            Trait {
                damage_multiplier: 1.3,
                ..Trait::neutral(
                    TraitType::Steel,
                    "Steel",
                    "Increases base damage",
                    TraitColor::new(0.7, 0.7, 0.7),
                )
            },
        ];
        Self { traits }
    }

    pub fn get(&self, trait_type: TraitType) -> Option<&Trait> {
        self.traits.iter().find(|t| t.trait_type == trait_type)
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    pub fn types(&self) -> impl Iterator<Item = TraitType> + '_ {
        self.traits.iter().map(|t| t.trait_type)
    }

    /// Sample `count` distinct trait types (fewer if the catalog is smaller)
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<TraitType> {
        let pool: Vec<TraitType> = self.types().collect();
        pool.choose_multiple(rng, count).copied().collect()
    }

    /// Traits the player can be offered: distinct, none already owned
    pub fn offer<R: Rng + ?Sized>(
        &self,
        owned: &[TraitType],
        count: usize,
        rng: &mut R,
    ) -> Vec<TraitType> {
        let pool: Vec<TraitType> = self.types().filter(|t| !owned.contains(t)).collect();
        pool.choose_multiple(rng, count).copied().collect()
    }

    /// Summed dodge window bonus across the given traits
    pub fn dodge_time_bonus(&self, traits: &[TraitType]) -> f32 {
        traits
            .iter()
            .filter_map(|t| self.get(*t))
            .map(|t| t.dodge_time_bonus)
            .sum()
    }
}

/// Player stat block derived from inherited traits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitStats {
    pub max_health: i32,
    pub attack_power: i32,
}

impl Default for TraitStats {
    fn default() -> Self {
        Self {
            max_health: PLAYER_BASE_HEALTH,
            attack_power: PLAYER_BASE_ATTACK,
        }
    }
}

/// Apply traits in acquisition order on top of the base stats.
///
/// Each trait scales attack by its damage multiplier (rounded), then applies
/// its flat bonus: Earth adds max health, Steel adds attack.
pub fn apply_trait_stats(catalog: &TraitCatalog, base: TraitStats, traits: &[TraitType]) -> TraitStats {
    let mut stats = base;
    for trait_type in traits {
        let Some(def) = catalog.get(*trait_type) else {
            continue;
        };
        stats.attack_power = (stats.attack_power as f32 * def.damage_multiplier).round() as i32;
        match trait_type {
            TraitType::Earth => stats.max_health += EARTH_HEALTH_BONUS,
            TraitType::Steel => stats.attack_power += STEEL_ATTACK_BONUS,
            _ => {}
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_standard_catalog_has_all_types() {
        let catalog = TraitCatalog::standard();
        assert_eq!(catalog.len(), 10);
        for t in TraitType::ALL {
            assert!(catalog.get(t).is_some(), "missing {:?}", t);
        }
    }

    #[test]
    fn test_trait_coefficients() {
        let catalog = TraitCatalog::standard();
        assert!((catalog.get(TraitType::Steel).unwrap().damage_multiplier - 1.3).abs() < f32::EPSILON);
        assert!((catalog.get(TraitType::Wind).unwrap().dodge_time_bonus - 0.1).abs() < f32::EPSILON);
        assert!(catalog.get(TraitType::Fire).unwrap().causes_dot);
        assert!(catalog.get(TraitType::Lightning).unwrap().can_stun);
        assert!((catalog.get(TraitType::Light).unwrap().critical_chance - 0.15).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sample_without_replacement() {
        let catalog = TraitCatalog::standard();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let picked = catalog.sample(4, &mut rng);
        assert_eq!(picked.len(), 4);
        let mut dedup = picked.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), 4);

        // Asking for more than exists caps at the catalog size
        let all = catalog.sample(50, &mut rng);
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn test_offer_excludes_owned() {
        let catalog = TraitCatalog::standard();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let owned = [TraitType::Fire, TraitType::Ice, TraitType::Steel];
        for _ in 0..20 {
            let offer = catalog.offer(&owned, 3, &mut rng);
            assert_eq!(offer.len(), 3);
            assert!(offer.iter().all(|t| !owned.contains(t)));
        }

        let everything: Vec<TraitType> = TraitType::ALL.to_vec();
        assert!(catalog.offer(&everything, 3, &mut rng).is_empty());
    }

    #[test]
    fn test_apply_trait_stats() {
        let catalog = TraitCatalog::standard();
        let base = TraitStats::default();

        assert_eq!(apply_trait_stats(&catalog, base, &[]), base);

        let earth = apply_trait_stats(&catalog, base, &[TraitType::Earth]);
        assert_eq!(earth.max_health, 125);
        assert_eq!(earth.attack_power, 10);

        // round(10 * 1.3) = 13, then +5
        let steel = apply_trait_stats(&catalog, base, &[TraitType::Steel]);
        assert_eq!(steel.attack_power, 18);
        assert_eq!(steel.max_health, 100);
    }

    #[test]
    fn test_dodge_time_bonus_sums() {
        let catalog = TraitCatalog::standard();
        assert_eq!(catalog.dodge_time_bonus(&[TraitType::Fire]), 0.0);
        let bonus = catalog.dodge_time_bonus(&[TraitType::Wind, TraitType::Fire]);
        assert!((bonus - 0.1).abs() < f32::EPSILON);
    }
}
