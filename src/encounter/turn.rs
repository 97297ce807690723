//! Turn state machine.
//!
//! PlayerTurn -> EnemyTurn <-> Dodging -> PlayerTurn, with GameOver reachable
//! from anywhere. Hand-overs between sides are two-step: `request` marks a
//! pending transition (the caller schedules the pause), `commit` applies it.
//! Requests that do not fit the current state are ignored. A new machine is
//! inactive (GameOver) until the first battle resets it.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnState {
    PlayerTurn,
    EnemyTurn,
    Dodging,
    GameOver,
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayerTurn => "player_turn",
            Self::EnemyTurn => "enemy_turn",
            Self::Dodging => "dodging",
            Self::GameOver => "game_over",
        }
    }

    /// Enemy is acting (with or without an active dodge)
    pub fn is_enemy_phase(&self) -> bool {
        matches!(self, Self::EnemyTurn | Self::Dodging)
    }
}

/// A committed state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: TurnState,
    pub to: TurnState,
}

#[derive(Debug, Clone)]
pub struct TurnMachine {
    state: TurnState,
    pending: Option<TurnState>,
}

impl Default for TurnMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnMachine {
    pub fn new() -> Self {
        Self {
            state: TurnState::GameOver,
            pending: None,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn pending(&self) -> Option<TurnState> {
        self.pending
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Ask for a hand-over to `target`. Only PlayerTurn -> EnemyTurn and
    /// enemy phase -> PlayerTurn are accepted, one at a time.
    pub fn request(&mut self, target: TurnState) -> bool {
        if self.pending.is_some() {
            debug!(target = target.as_str(), "turn request ignored, transition pending");
            return false;
        }
        let allowed = match (self.state, target) {
            (TurnState::PlayerTurn, TurnState::EnemyTurn) => true,
            (from, TurnState::PlayerTurn) => from.is_enemy_phase(),
            _ => false,
        };
        if !allowed {
            debug!(
                state = self.state.as_str(),
                target = target.as_str(),
                "turn request ignored"
            );
            return false;
        }
        self.pending = Some(target);
        true
    }

    /// Apply the pending transition if it is the one named
    pub fn commit(&mut self, target: TurnState) -> Option<Transition> {
        if self.pending != Some(target) || self.state == TurnState::GameOver {
            debug!(target = target.as_str(), "stale turn commit dropped");
            return None;
        }
        self.pending = None;
        let from = self.state;
        self.state = target;
        Some(Transition { from, to: target })
    }

    pub fn enter_dodging(&mut self) -> Option<Transition> {
        if self.state != TurnState::EnemyTurn {
            return None;
        }
        self.state = TurnState::Dodging;
        Some(Transition {
            from: TurnState::EnemyTurn,
            to: TurnState::Dodging,
        })
    }

    pub fn leave_dodging(&mut self) -> Option<Transition> {
        if self.state != TurnState::Dodging {
            return None;
        }
        self.state = TurnState::EnemyTurn;
        Some(Transition {
            from: TurnState::Dodging,
            to: TurnState::EnemyTurn,
        })
    }

    /// Immediate, from any state. Drops any pending hand-over.
    pub fn game_over(&mut self) -> Option<Transition> {
        self.pending = None;
        if self.state == TurnState::GameOver {
            return None;
        }
        let from = self.state;
        self.state = TurnState::GameOver;
        Some(Transition {
            from,
            to: TurnState::GameOver,
        })
    }

    /// Fresh battle: PlayerTurn with nothing pending
    pub fn reset(&mut self) -> Transition {
        let from = self.state;
        self.state = TurnState::PlayerTurn;
        self.pending = None;
        Transition {
            from,
            to: TurnState::PlayerTurn,
        }
    }
}
