//! Boss attack patterns, player dodges, and damage math.
//!
//! Everything here is plain data and pure functions; the encounter owns the
//! clock and wires these pieces together.

use serde::{Deserialize, Serialize};

pub mod attack;
pub mod damage;
pub mod dodge;
pub mod projectile;
pub mod selection;

/// Side the player must dodge toward to escape the current attack.
///
/// This is the inverse of the side a swipe covers: a left swipe hits the left
/// columns and is escaped to the `Right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackDirection {
    #[default]
    None,
    Left,
    Right,
    Both,
}

impl AttackDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Left => "left",
            Self::Right => "right",
            Self::Both => "both",
        }
    }
}

/// Player dodge input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DodgeDirection {
    Left,
    Right,
}

impl DodgeDirection {
    /// Horizontal sign of the dodge offset
    pub fn sign(&self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Health pool clamped to `[0, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(0);
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }

    /// Subtract damage, clamped at zero. Returns the amount actually removed.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0);
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }

    pub fn restore_full(&mut self) {
        self.current = self.max;
    }
}
