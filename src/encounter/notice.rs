//! Outgoing notices for the presentation layer.

use bevy::math::Vec2;

use super::turn::TurnState;
use crate::combat::attack::{Animation, AttackKind, VolleySide};
use crate::combat::DodgeDirection;
use crate::traits::TraitType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Player,
    Boss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Lightning(VolleySide),
    SwipeImpact,
    SpecialImpact,
    Slash,
    ProjectileLaunch,
    ProjectileImpact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    PlayerAttack,
    CounterAttack,
    BossAttack(AttackKind),
    Projectile,
}

/// Everything a HUD needs to redraw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudSnapshot {
    pub player_health: i32,
    pub player_max_health: i32,
    pub boss_health: i32,
    pub boss_max_health: i32,
    pub generation: u32,
    pub max_generations: u32,
    pub charge_stacks: u32,
    pub dodge_streak: u32,
    pub turn: TurnState,
    /// Boss weaknesses uncovered so far this run
    pub revealed_weaknesses: u32,
    pub critical_revealed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CombatNotice {
    TurnChanged {
        from: TurnState,
        to: TurnState,
    },
    GenerationChanged {
        generation: u32,
        traits: Vec<TraitType>,
    },
    ShowTraitSelection {
        options: Vec<TraitType>,
    },
    ShowGameOver {
        victory: bool,
    },
    UpdateHud(HudSnapshot),
    PlayAnimation {
        actor: Actor,
        animation: Animation,
    },
    AttackIndicator {
        visible: bool,
    },
    SpawnEffect {
        effect: EffectKind,
        position: Vec2,
    },
    WeaknessRevealed(TraitType),
    CriticalTraitRevealed(TraitType),
    DamageDealt {
        target: Actor,
        source: DamageSource,
        amount: i32,
        multiplier: f32,
        critical: bool,
    },
    DodgeResolved {
        direction: DodgeDirection,
        success: bool,
        streak: u32,
    },
    CounterAttack {
        streak: u32,
        damage: i32,
    },
    BossEnraged {
        attack_power: i32,
    },
}
