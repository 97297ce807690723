//! Picks the boss's next attack from the enabled set.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::attack::AttackKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Uniform pick each turn
    #[default]
    Random,
    /// Cycle through the list in order
    RoundRobin,
}

#[derive(Debug, Clone, Default)]
pub struct AttackSelector {
    policy: SelectionPolicy,
    cursor: usize,
}

impl AttackSelector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy, cursor: 0 }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Next attack, or `None` when nothing is enabled
    pub fn select_next_attack<R: Rng + ?Sized>(
        &mut self,
        available: &[AttackKind],
        rng: &mut R,
    ) -> Option<AttackKind> {
        match self.policy {
            SelectionPolicy::Random => available.choose(rng).copied(),
            SelectionPolicy::RoundRobin => {
                if available.is_empty() {
                    return None;
                }
                let kind = available[self.cursor % available.len()];
                self.cursor = self.cursor.wrapping_add(1);
                Some(kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_empty_selects_nothing() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut random = AttackSelector::new(SelectionPolicy::Random);
        let mut rr = AttackSelector::new(SelectionPolicy::RoundRobin);
        assert_eq!(random.select_next_attack(&[], &mut rng), None);
        assert_eq!(rr.select_next_attack(&[], &mut rng), None);
    }

    #[test]
    fn test_round_robin_cycles() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut rr = AttackSelector::new(SelectionPolicy::RoundRobin);
        let list = [AttackKind::LeftSwipe, AttackKind::Projectile];
        let picks: Vec<_> = (0..4)
            .filter_map(|_| rr.select_next_attack(&list, &mut rng))
            .collect();
        assert_eq!(
            picks,
            vec![
                AttackKind::LeftSwipe,
                AttackKind::Projectile,
                AttackKind::LeftSwipe,
                AttackKind::Projectile
            ]
        );
    }

    #[test]
    fn test_random_stays_in_set() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut random = AttackSelector::new(SelectionPolicy::Random);
        let list = [AttackKind::SpecialAttack, AttackKind::RightSwipe];
        for _ in 0..50 {
            let kind = random.select_next_attack(&list, &mut rng).unwrap();
            assert!(list.contains(&kind));
        }
    }
}
