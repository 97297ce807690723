//! Player and boss state.

use bevy::math::Vec2;

use crate::combat::attack::AttackKind;
use crate::combat::damage::EnrageState;
use crate::combat::dodge::DodgeStreak;
use crate::combat::{AttackDirection, Health};
use crate::config::{BossConfig, PlayerConfig};
use crate::traits::{apply_trait_stats, TraitCatalog, TraitStats, TraitType};

#[derive(Debug, Clone)]
pub struct Player {
    pub health: Health,
    pub attack_power: i32,
    pub charge_stacks: u32,
    pub streak: DodgeStreak,
    pub home: Vec2,
}

impl Player {
    /// Fresh player at full health with stats rebuilt from `traits`
    pub fn from_traits(catalog: &TraitCatalog, config: &PlayerConfig, traits: &[TraitType]) -> Self {
        let base = TraitStats {
            max_health: config.base_health,
            attack_power: config.base_attack,
        };
        let stats = apply_trait_stats(catalog, base, traits);
        Self {
            health: Health::new(stats.max_health),
            attack_power: stats.attack_power,
            charge_stacks: 0,
            streak: DodgeStreak::default(),
            home: Vec2::from(config.home),
        }
    }

    pub fn add_charge(&mut self, cap: u32) -> u32 {
        self.charge_stacks = (self.charge_stacks + 1).min(cap);
        self.charge_stacks
    }

    /// Attack power scaled by banked charges; consumes the charges
    pub fn take_charged_attack(&mut self) -> i32 {
        let base = self
            .attack_power
            .saturating_mul(1 + self.charge_stacks as i32);
        self.charge_stacks = 0;
        base
    }
}

/// Result of damaging the boss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossHit {
    pub dealt: i32,
    pub enraged: bool,
    pub killed: bool,
}

#[derive(Debug, Clone)]
pub struct Boss {
    pub health: Health,
    pub attack_power: i32,
    pub enrage: EnrageState,
    pub position: Vec2,
    pub current_direction: AttackDirection,
    pub current_kind: Option<AttackKind>,
    /// An attack is executing; a second one may not start
    pub busy: bool,
}

impl Boss {
    pub fn new(config: &BossConfig) -> Self {
        Self {
            health: Health::new(config.max_health),
            attack_power: config.attack_power,
            enrage: EnrageState::default(),
            position: Vec2::from(config.position),
            current_direction: AttackDirection::None,
            current_kind: None,
            busy: false,
        }
    }

    pub fn apply_damage(&mut self, amount: i32, config: &BossConfig) -> BossHit {
        let dealt = self.health.take_damage(amount);
        let killed = !self.health.is_alive();
        let enraged = !killed
            && self
                .enrage
                .check(self.health.fraction(), config.enrage_health_fraction);
        if enraged {
            self.attack_power += config.enrage_attack_bonus;
        }
        BossHit {
            dealt,
            enraged,
            killed,
        }
    }

    /// Drop any in-flight attack state
    pub fn stand_down(&mut self) {
        self.current_direction = AttackDirection::None;
        self.current_kind = None;
        self.busy = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_from_traits() {
        let catalog = TraitCatalog::standard();
        let player = Player::from_traits(
            &catalog,
            &PlayerConfig::default(),
            &[TraitType::Earth, TraitType::Steel],
        );
        assert_eq!(player.health.max, 125);
        assert_eq!(player.health.current, 125);
        assert_eq!(player.attack_power, 18);
    }

    #[test]
    fn test_charge_capped_and_consumed() {
        let catalog = TraitCatalog::standard();
        let mut player = Player::from_traits(&catalog, &PlayerConfig::default(), &[]);
        for _ in 0..5 {
            player.add_charge(3);
        }
        assert_eq!(player.charge_stacks, 3);
        assert_eq!(player.take_charged_attack(), 40);
        assert_eq!(player.charge_stacks, 0);
        assert_eq!(player.take_charged_attack(), 10);
    }

    #[test]
    fn test_boss_enrages_once() {
        let config = BossConfig::default();
        let mut boss = Boss::new(&config);
        let hit = boss.apply_damage(140, &config);
        assert!(!hit.enraged);
        let hit = boss.apply_damage(10, &config);
        assert!(hit.enraged);
        assert_eq!(boss.attack_power, 30);
        let hit = boss.apply_damage(10, &config);
        assert!(!hit.enraged);
        assert_eq!(boss.attack_power, 30);
    }

    #[test]
    fn test_boss_killed_does_not_enrage() {
        let config = BossConfig::default();
        let mut boss = Boss::new(&config);
        let hit = boss.apply_damage(500, &config);
        assert!(hit.killed);
        assert!(!hit.enraged);
        assert_eq!(hit.dealt, 200);
        assert_eq!(boss.health.current, 0);
    }
}
