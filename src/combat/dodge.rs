//! Timed directional dodge.
//!
//! - Dodging: invulnerability window (0.2s plus trait bonuses), offset toward the dodge side
//! - Returning: offset eases back to the home position (0.15s)
//! - Cooldown: no new dodge (0.5s)
//!
//! A dodge only counts when it goes toward the side the current attack
//! publishes as its escape. Each dodge is judged once, by the first hit that
//! samples it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AttackDirection, DodgeDirection};
use crate::config::TimingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DodgePhase {
    #[default]
    Idle,
    Dodging,
    Returning,
    Cooldown,
}

/// Correctness table for (attack direction, dodge direction)
pub fn is_correct_dodge(attack: AttackDirection, dodge: DodgeDirection) -> bool {
    match (attack, dodge) {
        (AttackDirection::Both, _) => true,
        (AttackDirection::Left, DodgeDirection::Left) => true,
        (AttackDirection::Right, DodgeDirection::Right) => true,
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DodgeTiming {
    pub window: f32,
    pub return_time: f32,
    pub cooldown: f32,
    pub distance: f32,
}

impl DodgeTiming {
    pub fn from_config(timing: &TimingConfig, distance: f32) -> Self {
        Self {
            window: timing.dodge_window,
            return_time: timing.dodge_return,
            cooldown: timing.dodge_cooldown,
            distance,
        }
    }
}

/// Result of sampling an active dodge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Judgement {
    pub correct: bool,
    /// True only for the sample that judged this dodge
    pub first: bool,
}

/// Phase change reported by [`DodgeEngine::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DodgeEvent {
    WindowEnded,
    Ready,
}

#[derive(Debug, Clone)]
pub struct DodgeEngine {
    timing: DodgeTiming,
    phase: DodgePhase,
    elapsed: f32,
    window: f32,
    direction: Option<DodgeDirection>,
    verdict: Option<bool>,
}

impl DodgeEngine {
    pub fn new(timing: DodgeTiming) -> Self {
        Self {
            timing,
            phase: DodgePhase::Idle,
            elapsed: 0.0,
            window: timing.window,
            direction: None,
            verdict: None,
        }
    }

    pub fn phase(&self) -> DodgePhase {
        self.phase
    }

    pub fn is_invulnerable(&self) -> bool {
        self.phase == DodgePhase::Dodging
    }

    /// Direction latched at the start of the current (or last) dodge
    pub fn direction(&self) -> Option<DodgeDirection> {
        self.direction
    }

    /// Window length of the current dodge, bonus included
    pub fn window(&self) -> f32 {
        self.window
    }

    /// Start a dodge. Only accepted from Idle while the enemy is acting.
    pub fn try_start(&mut self, direction: DodgeDirection, enemy_turn: bool, bonus: f32) -> bool {
        if !enemy_turn {
            debug!(direction = direction.as_str(), "dodge ignored outside enemy turn");
            return false;
        }
        if self.phase != DodgePhase::Idle {
            debug!(phase = ?self.phase, "dodge ignored, not idle");
            return false;
        }
        self.phase = DodgePhase::Dodging;
        self.elapsed = 0.0;
        self.window = self.timing.window + bonus.max(0.0);
        self.direction = Some(direction);
        self.verdict = None;
        debug!(direction = direction.as_str(), window = self.window, "dodge started");
        true
    }

    /// Judge the active dodge against the attack direction. `None` when not
    /// dodging. The verdict is fixed on the first call.
    pub fn judge(&mut self, attack: AttackDirection) -> Option<Judgement> {
        if !self.is_invulnerable() {
            return None;
        }
        let direction = self.direction?;
        match self.verdict {
            Some(correct) => Some(Judgement {
                correct,
                first: false,
            }),
            None => {
                let correct = is_correct_dodge(attack, direction);
                self.verdict = Some(correct);
                Some(Judgement {
                    correct,
                    first: true,
                })
            }
        }
    }

    /// Advance the phase timers. Returns every phase change that happened.
    pub fn tick(&mut self, dt: f32) -> Vec<DodgeEvent> {
        let mut events = Vec::new();
        let mut remaining = dt.max(0.0);
        loop {
            let limit = match self.phase {
                DodgePhase::Idle => return events,
                DodgePhase::Dodging => self.window,
                DodgePhase::Returning => self.timing.return_time,
                DodgePhase::Cooldown => self.timing.cooldown,
            };
            let left = limit - self.elapsed;
            if remaining < left {
                self.elapsed += remaining;
                return events;
            }
            remaining -= left.max(0.0);
            self.elapsed = 0.0;
            self.phase = match self.phase {
                DodgePhase::Dodging => {
                    events.push(DodgeEvent::WindowEnded);
                    DodgePhase::Returning
                }
                DodgePhase::Returning => DodgePhase::Cooldown,
                _ => {
                    events.push(DodgeEvent::Ready);
                    DodgePhase::Idle
                }
            };
        }
    }

    /// Horizontal offset from the home position
    pub fn offset(&self) -> f32 {
        let Some(direction) = self.direction else {
            return 0.0;
        };
        let full = direction.sign() * self.timing.distance;
        match self.phase {
            DodgePhase::Dodging => full,
            DodgePhase::Returning => {
                if self.timing.return_time <= 0.0 {
                    return 0.0;
                }
                let t = (self.elapsed / self.timing.return_time).clamp(0.0, 1.0);
                full * (1.0 - t)
            }
            DodgePhase::Idle | DodgePhase::Cooldown => 0.0,
        }
    }

    /// Back to Idle with no offset
    pub fn reset(&mut self) {
        self.phase = DodgePhase::Idle;
        self.elapsed = 0.0;
        self.direction = None;
        self.verdict = None;
    }
}

/// Consecutive successful dodges, banked toward a counter-attack
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DodgeStreak {
    count: u32,
}

impl DodgeStreak {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn record_success(&mut self) -> u32 {
        self.count += 1;
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Spend the whole streak if it reached `threshold`. Returns the bonus
    /// damage (`attack_power * streak`) and the streak that was spent.
    pub fn spend(&mut self, attack_power: i32, threshold: u32) -> Option<(i32, u32)> {
        if self.count == 0 || self.count < threshold {
            return None;
        }
        let streak = self.count;
        self.count = 0;
        Some((attack_power.saturating_mul(streak as i32), streak))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> DodgeEngine {
        DodgeEngine::new(DodgeTiming {
            window: 0.2,
            return_time: 0.15,
            cooldown: 0.5,
            distance: 1.5,
        })
    }

    #[test]
    fn test_correctness_table() {
        use AttackDirection as A;
        use DodgeDirection as D;
        assert!(is_correct_dodge(A::Both, D::Left));
        assert!(is_correct_dodge(A::Both, D::Right));
        assert!(is_correct_dodge(A::Left, D::Left));
        assert!(!is_correct_dodge(A::Left, D::Right));
        assert!(!is_correct_dodge(A::Right, D::Left));
        assert!(is_correct_dodge(A::Right, D::Right));
        assert!(!is_correct_dodge(A::None, D::Left));
        assert!(!is_correct_dodge(A::None, D::Right));
    }

    #[test]
    fn test_only_starts_in_enemy_turn_from_idle() {
        let mut dodge = engine();
        assert!(!dodge.try_start(DodgeDirection::Left, false, 0.0));
        assert!(dodge.try_start(DodgeDirection::Left, true, 0.0));
        assert!(!dodge.try_start(DodgeDirection::Right, true, 0.0));
        assert_eq!(dodge.direction(), Some(DodgeDirection::Left));
    }

    #[test]
    fn test_phase_sequence() {
        let mut dodge = engine();
        dodge.try_start(DodgeDirection::Right, true, 0.0);
        assert!(dodge.is_invulnerable());
        assert!(dodge.tick(0.1).is_empty());
        assert_eq!(dodge.tick(0.15), vec![DodgeEvent::WindowEnded]);
        assert_eq!(dodge.phase(), DodgePhase::Returning);
        dodge.tick(0.15);
        assert_eq!(dodge.phase(), DodgePhase::Cooldown);
        assert!(!dodge.try_start(DodgeDirection::Right, true, 0.0));
        assert_eq!(dodge.tick(0.6), vec![DodgeEvent::Ready]);
        assert_eq!(dodge.phase(), DodgePhase::Idle);
    }

    #[test]
    fn test_large_tick_crosses_all_phases() {
        let mut dodge = engine();
        dodge.try_start(DodgeDirection::Left, true, 0.0);
        let events = dodge.tick(5.0);
        assert_eq!(events, vec![DodgeEvent::WindowEnded, DodgeEvent::Ready]);
        assert_eq!(dodge.phase(), DodgePhase::Idle);
    }

    #[test]
    fn test_wind_bonus_extends_window() {
        let mut dodge = engine();
        dodge.try_start(DodgeDirection::Left, true, 0.1);
        assert!((dodge.window() - 0.3).abs() < 1e-6);
        dodge.tick(0.25);
        assert!(dodge.is_invulnerable());
        dodge.tick(0.1);
        assert!(!dodge.is_invulnerable());
    }

    #[test]
    fn test_judged_once() {
        let mut dodge = engine();
        assert_eq!(dodge.judge(AttackDirection::Both), None);
        dodge.try_start(DodgeDirection::Left, true, 0.0);
        assert_eq!(
            dodge.judge(AttackDirection::Left),
            Some(Judgement { correct: true, first: true })
        );
        // A later sample in the same window keeps the first verdict
        assert_eq!(
            dodge.judge(AttackDirection::Right),
            Some(Judgement { correct: true, first: false })
        );
    }

    #[test]
    fn test_offset_follows_phase() {
        let mut dodge = engine();
        assert_eq!(dodge.offset(), 0.0);
        dodge.try_start(DodgeDirection::Left, true, 0.0);
        assert_eq!(dodge.offset(), -1.5);
        dodge.tick(0.2);
        assert_eq!(dodge.phase(), DodgePhase::Returning);
        dodge.tick(0.075);
        assert!((dodge.offset() + 0.75).abs() < 1e-4);
        dodge.tick(0.1);
        assert_eq!(dodge.offset(), 0.0);
    }

    #[test]
    fn test_streak_spend() {
        let mut streak = DodgeStreak::default();
        streak.record_success();
        streak.record_success();
        assert_eq!(streak.spend(10, 3), None);
        streak.record_success();
        assert_eq!(streak.spend(10, 3), Some((30, 3)));
        assert_eq!(streak.count(), 0);
    }

    #[test]
    fn test_fourth_dodge_needs_unbroken_streak() {
        let mut streak = DodgeStreak::default();
        for _ in 0..4 {
            streak.record_success();
        }
        assert_eq!(streak.spend(10, 3), Some((40, 4)));

        for _ in 0..2 {
            streak.record_success();
        }
        streak.reset();
        for _ in 0..2 {
            streak.record_success();
        }
        assert_eq!(streak.count(), 2);
        assert_eq!(streak.spend(10, 3), None);
    }
}
